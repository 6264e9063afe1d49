//! The content service.
//!
//! [`Site`] ties a [`Store`] to the block registry and the URL layout of the
//! public pages and the console. Operations are split across modules by
//! concern (menus, composition, blurbs, pages) as `impl Site` blocks.

use std::sync::Arc;

use quire_store::Store;

use crate::paths::ConsolePaths;
use crate::registry::BlockRegistry;

/// URL layout of the site.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SiteConfig {
    /// Base URL menu slugs are joined to.
    pub menu_base_url: String,
    /// Prefix placeholder images are served under.
    pub static_url: String,
    /// Console locations.
    pub console: ConsolePaths,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            menu_base_url: "/".to_owned(),
            static_url: "/static".to_owned(),
            console: ConsolePaths::default(),
        }
    }
}

/// Menus, sections, blocks and blurbs of one site.
///
/// Cheap to share behind an `Arc`; all state lives in the store.
pub struct Site {
    pub(crate) store: Arc<dyn Store>,
    pub(crate) registry: BlockRegistry,
    pub(crate) config: SiteConfig,
}

impl Site {
    /// Create a site with the built-in block kinds.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, config: SiteConfig) -> Self {
        Self::with_registry(store, BlockRegistry::with_builtin_kinds(), config)
    }

    /// Create a site with a custom block registry.
    #[must_use]
    pub fn with_registry(store: Arc<dyn Store>, registry: BlockRegistry, config: SiteConfig) -> Self {
        Self {
            store,
            registry,
            config,
        }
    }

    #[must_use]
    pub fn registry(&self) -> &BlockRegistry {
        &self.registry
    }

    #[must_use]
    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    #[must_use]
    pub fn paths(&self) -> &ConsolePaths {
        &self.config.console
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;
    use quire_store::{
        BlockId, BlockPayload, Blurb, BlurbId, ContentBlock, ContentSection, ImageBlurb,
        ImageBlurbId, MemoryStore, Menu, MenuId, NewBlock, NewBlurb, NewImageBlurb, NewMenu,
        NewSection, SectionId, Store, StoreError,
    };

    use super::{Site, SiteConfig};
    use crate::kind::BlockKind;
    use crate::paths::ConsolePaths;

    pub(crate) fn site() -> Site {
        Site::new(Arc::new(MemoryStore::new()), SiteConfig::default())
    }

    pub(crate) fn new_menu(title: &str, slug: &str, parent: Option<MenuId>) -> NewMenu {
        NewMenu {
            title: title.to_owned(),
            url_slug: slug.to_owned(),
            parent_id: parent,
            ..Default::default()
        }
    }

    /// Root "About" with child "Team", inserted straight into the store.
    pub(crate) async fn about_team(site: &Site) -> (Menu, Menu) {
        let about = site
            .store
            .insert_menu(new_menu("About", "about", None))
            .await
            .unwrap();
        let team = site
            .store
            .insert_menu(new_menu("Team", "team", Some(about.id)))
            .await
            .unwrap();
        (about, team)
    }

    /// Block kind without a dedicated payload variant.
    pub(crate) struct VideoBlock;

    impl BlockKind for VideoBlock {
        fn type_name(&self) -> &'static str {
            "VideoBlock"
        }

        fn template_name(&self) -> &'static str {
            "content/video_block.html"
        }

        fn default_payload(&self) -> BlockPayload {
            BlockPayload::custom("video_block")
        }

        fn create_path(&self, _paths: &ConsolePaths) -> Option<String> {
            None
        }

        fn update_path(&self, _paths: &ConsolePaths, _id: BlockId) -> Option<String> {
            None
        }
    }

    /// Memory store whose static section and block lookups miss a number of
    /// times, as if another request inserted the row in between.
    pub(crate) struct RacingStore {
        inner: MemoryStore,
        stale_lookups: AtomicU32,
    }

    impl RacingStore {
        pub(crate) fn new(stale_lookups: u32) -> Self {
            Self {
                inner: MemoryStore::new(),
                stale_lookups: AtomicU32::new(stale_lookups),
            }
        }

        fn stale(&self) -> bool {
            self.stale_lookups
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
        }
    }

    #[async_trait]
    impl Store for RacingStore {
        async fn menus(&self) -> Result<Vec<Menu>, StoreError> {
            self.inner.menus().await
        }

        async fn menu(&self, id: MenuId) -> Result<Option<Menu>, StoreError> {
            self.inner.menu(id).await
        }

        async fn find_menu(
            &self,
            parent: Option<MenuId>,
            url_slug: &str,
        ) -> Result<Option<Menu>, StoreError> {
            self.inner.find_menu(parent, url_slug).await
        }

        async fn child_menus(&self, parent: MenuId) -> Result<Vec<Menu>, StoreError> {
            self.inner.child_menus(parent).await
        }

        async fn insert_menu(&self, menu: NewMenu) -> Result<Menu, StoreError> {
            self.inner.insert_menu(menu).await
        }

        async fn update_menu(&self, menu: &Menu) -> Result<(), StoreError> {
            self.inner.update_menu(menu).await
        }

        async fn delete_menu(&self, id: MenuId) -> Result<(), StoreError> {
            self.inner.delete_menu(id).await
        }

        async fn set_menu_order(
            &self,
            parent: Option<MenuId>,
            order: &[MenuId],
        ) -> Result<(), StoreError> {
            self.inner.set_menu_order(parent, order).await
        }

        async fn section(&self, id: SectionId) -> Result<Option<ContentSection>, StoreError> {
            self.inner.section(id).await
        }

        async fn section_for_menu(&self, menu: MenuId) -> Result<Option<ContentSection>, StoreError> {
            self.inner.section_for_menu(menu).await
        }

        async fn static_section(&self, key: &str) -> Result<Option<ContentSection>, StoreError> {
            if self.stale() {
                return Ok(None);
            }
            self.inner.static_section(key).await
        }

        async fn static_sections(&self) -> Result<Vec<ContentSection>, StoreError> {
            self.inner.static_sections().await
        }

        async fn insert_section(&self, section: NewSection) -> Result<ContentSection, StoreError> {
            self.inner.insert_section(section).await
        }

        async fn delete_section(&self, id: SectionId) -> Result<(), StoreError> {
            self.inner.delete_section(id).await
        }

        async fn block(&self, id: BlockId) -> Result<Option<ContentBlock>, StoreError> {
            self.inner.block(id).await
        }

        async fn static_block(
            &self,
            kind_key: &str,
            key: &str,
        ) -> Result<Option<ContentBlock>, StoreError> {
            if self.stale() {
                return Ok(None);
            }
            self.inner.static_block(kind_key, key).await
        }

        async fn section_blocks(&self, section: SectionId) -> Result<Vec<ContentBlock>, StoreError> {
            self.inner.section_blocks(section).await
        }

        async fn static_blocks(&self) -> Result<Vec<ContentBlock>, StoreError> {
            self.inner.static_blocks().await
        }

        async fn insert_block(&self, block: NewBlock) -> Result<ContentBlock, StoreError> {
            self.inner.insert_block(block).await
        }

        async fn update_block(&self, block: &ContentBlock) -> Result<(), StoreError> {
            self.inner.update_block(block).await
        }

        async fn delete_block(&self, id: BlockId) -> Result<(), StoreError> {
            self.inner.delete_block(id).await
        }

        async fn set_block_order(
            &self,
            section: SectionId,
            order: &[BlockId],
        ) -> Result<(), StoreError> {
            self.inner.set_block_order(section, order).await
        }

        async fn blurbs(&self) -> Result<Vec<Blurb>, StoreError> {
            self.inner.blurbs().await
        }

        async fn blurb(&self, id: BlurbId) -> Result<Option<Blurb>, StoreError> {
            self.inner.blurb(id).await
        }

        async fn blurb_by_identifier(&self, identifier: &str) -> Result<Option<Blurb>, StoreError> {
            self.inner.blurb_by_identifier(identifier).await
        }

        async fn insert_blurb(&self, blurb: NewBlurb) -> Result<Blurb, StoreError> {
            self.inner.insert_blurb(blurb).await
        }

        async fn update_blurb(&self, blurb: &Blurb) -> Result<(), StoreError> {
            self.inner.update_blurb(blurb).await
        }

        async fn image_blurbs(&self) -> Result<Vec<ImageBlurb>, StoreError> {
            self.inner.image_blurbs().await
        }

        async fn image_blurb(&self, id: ImageBlurbId) -> Result<Option<ImageBlurb>, StoreError> {
            self.inner.image_blurb(id).await
        }

        async fn image_blurb_by_identifier(
            &self,
            identifier: &str,
        ) -> Result<Option<ImageBlurb>, StoreError> {
            self.inner.image_blurb_by_identifier(identifier).await
        }

        async fn insert_image_blurb(&self, blurb: NewImageBlurb) -> Result<ImageBlurb, StoreError> {
            self.inner.insert_image_blurb(blurb).await
        }

        async fn update_image_blurb(&self, blurb: &ImageBlurb) -> Result<(), StoreError> {
            self.inner.update_image_blurb(blurb).await
        }
    }
}
