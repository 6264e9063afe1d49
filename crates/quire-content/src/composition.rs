//! Content sections and blocks.
//!
//! Every menu owns at most one section, created the first time the menu's page
//! is requested. Static sections and static blocks are embedded in templates
//! by key and are created the same lazy way. Section-bound blocks are created
//! by administration and keep a manual order.

use quire_store::{
    BlockId, BlockPayload, ContentBlock, ContentSection, MenuId, NewBlock, NewSection, SectionId,
};
use serde::Serialize;

use crate::error::ContentError;
use crate::site::Site;

/// Template rendering a section.
pub const SECTION_TEMPLATE: &str = "content/content_section.html";

/// A section with its blocks in order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SectionBlocks {
    pub section: ContentSection,
    pub blocks: Vec<ContentBlock>,
}

impl SectionBlocks {
    /// True if the section has no blocks at all.
    #[must_use]
    pub fn empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Blocks a visitor sees; disabled blocks only show in preview mode.
    pub fn visible(&self, preview: bool) -> impl Iterator<Item = &ContentBlock> {
        self.blocks.iter().filter(move |b| preview || !b.disabled)
    }
}

/// A block with its kind's presentation details.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BlockView {
    #[serde(flatten)]
    pub block: ContentBlock,
    pub label: String,
    pub type_key: String,
    pub template: &'static str,
    pub update_path: Option<String>,
}

impl Site {
    /// The section bound to `menu`, created on first request.
    pub async fn section_for_menu(&self, menu: MenuId) -> Result<ContentSection, ContentError> {
        get_or_create!(
            "content_section",
            fetch: self.store.section_for_menu(menu),
            insert: self.store.insert_section(NewSection::for_menu(menu)),
        )
    }

    /// The static section `key`, created on first request.
    ///
    /// `location` is recorded only when the section is created.
    pub async fn static_section(
        &self,
        key: &str,
        location: Option<&str>,
    ) -> Result<ContentSection, ContentError> {
        get_or_create!(
            "content_section",
            fetch: self.store.static_section(key),
            insert: self
                .store
                .insert_section(NewSection::with_key(key, location.map(str::to_owned))),
        )
    }

    /// The static block `key` of kind `type_key`, created on first request.
    ///
    /// # Errors
    ///
    /// [`ContentError::Configuration`] when `type_key` is not registered.
    pub async fn static_block(
        &self,
        key: &str,
        type_key: &str,
        location: Option<&str>,
    ) -> Result<ContentBlock, ContentError> {
        let kind = self.registry.get(type_key)?;
        let kind_key = kind.type_key();
        get_or_create!(
            "content_block",
            fetch: self.store.static_block(&kind_key, key),
            insert: self.store.insert_block(NewBlock {
                section_id: None,
                disabled: false,
                key: Some(key.to_owned()),
                static_location: location.map(str::to_owned),
                payload: kind.default_payload(),
            }),
        )
    }

    /// Section `id`.
    ///
    /// # Errors
    ///
    /// [`ContentError::NotFound`] for an unknown id.
    pub async fn section(&self, id: SectionId) -> Result<ContentSection, ContentError> {
        self.store
            .section(id)
            .await?
            .ok_or_else(|| ContentError::not_found(format!("content section {id}")))
    }

    /// Block `id`.
    ///
    /// # Errors
    ///
    /// [`ContentError::NotFound`] for an unknown id.
    pub async fn block(&self, id: BlockId) -> Result<ContentBlock, ContentError> {
        self.store
            .block(id)
            .await?
            .ok_or_else(|| ContentError::not_found(format!("content block {id}")))
    }

    /// All blocks of `section` in order.
    pub async fn list_blocks(&self, section: &ContentSection) -> Result<SectionBlocks, ContentError> {
        let blocks = self.store.section_blocks(section.id).await?;
        Ok(SectionBlocks {
            section: section.clone(),
            blocks,
        })
    }

    /// Attach kind label, template and console path to a block.
    ///
    /// # Errors
    ///
    /// [`ContentError::Configuration`] when the block's kind is not registered.
    pub fn describe_block(&self, block: &ContentBlock) -> Result<BlockView, ContentError> {
        let kind = self.registry.kind_of(block)?;
        Ok(BlockView {
            block: block.clone(),
            label: kind.label(),
            type_key: kind.type_key(),
            template: kind.template_name(),
            update_path: kind.update_path(self.paths(), block.id),
        })
    }

    /// Append a block of kind `type_key` to `section`.
    ///
    /// Uses the kind's default payload when `payload` is `None`. Static blocks
    /// are never created this way.
    ///
    /// # Errors
    ///
    /// [`ContentError::Configuration`] for an unregistered kind,
    /// [`ContentError::Validation`] for a kind without a create surface or a
    /// payload of another kind, [`ContentError::NotFound`] for a missing section.
    pub async fn create_block(
        &self,
        section: SectionId,
        type_key: &str,
        payload: Option<BlockPayload>,
    ) -> Result<ContentBlock, ContentError> {
        let kind = self.registry.get(type_key)?;
        if kind.create_path(self.paths()).is_none() {
            return Err(ContentError::validation(
                Some("kind"),
                format!("{} blocks cannot be created", kind.label()),
            ));
        }
        let payload = payload.unwrap_or_else(|| kind.default_payload());
        if payload.kind_key() != kind.type_key() {
            return Err(ContentError::validation(
                Some("kind"),
                format!("Payload of kind {} does not match {type_key}", payload.kind_key()),
            ));
        }
        let section = self.section(section).await?;

        let block = self
            .store
            .insert_block(NewBlock {
                section_id: Some(section.id),
                disabled: false,
                key: None,
                static_location: None,
                payload,
            })
            .await?;
        tracing::info!(block = %block.id, section = %section.id, kind = type_key, "Created block");
        Ok(block)
    }

    /// Replace the content of a rich text block.
    ///
    /// # Errors
    ///
    /// [`ContentError::Validation`] if the block is of another kind.
    pub async fn update_rich_text(&self, id: BlockId, content: String) -> Result<ContentBlock, ContentError> {
        let mut block = self.block(id).await?;
        match &mut block.payload {
            BlockPayload::RichTextBlock { content: current } => *current = content,
            other => {
                return Err(ContentError::validation(
                    Some("content"),
                    format!("Block {id} is a {}, not a rich text block", other.kind_key()),
                ));
            }
        }
        self.store.update_block(&block).await?;
        Ok(block)
    }

    /// Hide or show a block without deleting it.
    pub async fn set_block_disabled(&self, id: BlockId, disabled: bool) -> Result<ContentBlock, ContentError> {
        let mut block = self.block(id).await?;
        block.disabled = disabled;
        self.store.update_block(&block).await?;
        Ok(block)
    }

    /// Move a section-bound block to `position` within its section (clamped).
    ///
    /// # Errors
    ///
    /// [`ContentError::Validation`] for static blocks, which have no order.
    pub async fn move_block(&self, id: BlockId, position: usize) -> Result<(), ContentError> {
        let block = self.block(id).await?;
        let Some(section) = block.section_id else {
            return Err(ContentError::validation(
                None,
                "Static blocks are not ordered within a section",
            ));
        };

        let mut order: Vec<BlockId> = self
            .store
            .section_blocks(section)
            .await?
            .iter()
            .map(|b| b.id)
            .filter(|b| *b != id)
            .collect();
        order.insert(position.min(order.len()), id);
        self.store.set_block_order(section, &order).await?;
        Ok(())
    }

    /// Delete a block. Returns the deleted block.
    pub async fn delete_block(&self, id: BlockId) -> Result<ContentBlock, ContentError> {
        let block = self.block(id).await?;
        self.store.delete_block(id).await?;
        tracing::info!(block = %id, "Deleted block");
        Ok(block)
    }

    /// Delete a section and its blocks. Returns the deleted section.
    pub async fn delete_section(&self, id: SectionId) -> Result<ContentSection, ContentError> {
        let section = self.section(id).await?;
        self.store.delete_section(id).await?;
        tracing::info!(section = %id, "Deleted section with its blocks");
        Ok(section)
    }

    /// The bound menu's display name, or the key of a static section.
    pub async fn section_display_name(&self, section: &ContentSection) -> Result<String, ContentError> {
        match section.menu_id {
            Some(menu) => Ok(self.menu(menu).await?.display_name()),
            None => Ok(section.key.clone().unwrap_or_default()),
        }
    }

    /// `"{label} in {section}"`, or `"Static {label} ({key})"` for static blocks.
    pub async fn block_display_name(&self, block: &ContentBlock) -> Result<String, ContentError> {
        let label = self.registry.kind_of(block)?.label();
        match block.section_id {
            Some(section) => {
                let section = self.section(section).await?;
                let section_name = self.section_display_name(&section).await?;
                Ok(format!("{label} in {section_name}"))
            }
            None => Ok(format!(
                "Static {label} ({})",
                block.key.as_deref().unwrap_or_default()
            )),
        }
    }

    /// Console page listing `section`: the bound menu's page, or the static
    /// section list.
    pub async fn section_console_list_path(&self, section: &ContentSection) -> Result<String, ContentError> {
        match section.menu_id {
            Some(menu) => Ok(self.menu(menu).await?.update_path(self.paths())),
            None => Ok(self.paths().content_section_list()),
        }
    }

    /// Console page listing `block`.
    ///
    /// Menu-bound sections list their blocks on the menu's page, static
    /// sections on their own page, static blocks on the block list.
    pub async fn block_console_list_path(&self, block: &ContentBlock) -> Result<String, ContentError> {
        let Some(section) = block.section_id else {
            return Ok(self.paths().content_block_list());
        };
        let section = self.section(section).await?;
        match section.menu_id {
            Some(menu) => Ok(self.menu(menu).await?.update_path(self.paths())),
            None => Ok(self.paths().content_section_update(section.id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use quire_store::Store;

    use std::sync::Arc;

    use super::*;
    use crate::registry::BlockRegistry;
    use crate::site::SiteConfig;
    use crate::site::test_support::{RacingStore, VideoBlock, about_team, site};

    fn racing_site(stale_lookups: u32) -> Site {
        Site::new(Arc::new(RacingStore::new(stale_lookups)), SiteConfig::default())
    }

    fn rich_text(content: &str) -> Option<BlockPayload> {
        Some(BlockPayload::RichTextBlock {
            content: content.to_owned(),
        })
    }

    #[tokio::test]
    async fn test_section_for_menu_is_idempotent() {
        let site = site();
        let (about, _) = about_team(&site).await;

        let first = site.section_for_menu(about.id).await.unwrap();
        let second = site.section_for_menu(about.id).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.menu_id, Some(about.id));
    }

    #[tokio::test]
    async fn test_static_section_keeps_first_location() {
        let site = site();

        let first = site.static_section("footer", Some("/")).await.unwrap();
        let second = site.static_section("footer", Some("/about")).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.static_location.as_deref(), Some("/"));
        assert!(second.is_static());
    }

    #[tokio::test]
    async fn test_static_section_returns_row_inserted_elsewhere() {
        let site = site();
        let existing = site
            .store
            .insert_section(NewSection::with_key("footer", None))
            .await
            .unwrap();

        let section = site.static_section("footer", Some("/")).await.unwrap();

        assert_eq!(section, existing);
    }

    #[tokio::test]
    async fn test_empty_section() {
        let site = site();
        let (about, _) = about_team(&site).await;
        let section = site.section_for_menu(about.id).await.unwrap();

        let blocks = site.list_blocks(&section).await.unwrap();

        assert!(blocks.empty());
        assert_eq!(blocks.visible(true).count(), 0);
    }

    #[tokio::test]
    async fn test_static_block_by_kind_and_key() {
        let site = site();

        let first = site
            .static_block("hero", "rich_text_block", Some("/"))
            .await
            .unwrap();
        let again = site
            .static_block("hero", "rich_text_block", Some("/other"))
            .await
            .unwrap();
        let carousel = site
            .static_block("hero", "carousel_block", None)
            .await
            .unwrap();

        assert_eq!(first, again);
        assert_eq!(first.payload, BlockPayload::RichTextBlock { content: String::new() });
        assert_ne!(first.id, carousel.id);
        assert_eq!(carousel.payload, BlockPayload::CarouselBlock);
    }

    #[tokio::test]
    async fn test_static_block_unknown_kind() {
        let site = site();

        let err = site.static_block("hero", "video_block", None).await.unwrap_err();

        assert!(matches!(err, ContentError::Configuration(_)));
    }

    #[tokio::test]
    async fn test_static_block_of_registered_kind_is_idempotent() {
        let mut registry = BlockRegistry::with_builtin_kinds();
        registry.register(VideoBlock).unwrap();
        let site = Site::with_registry(
            Arc::new(quire_store::MemoryStore::new()),
            registry,
            SiteConfig::default(),
        );

        let first = site.static_block("intro", "video_block", Some("/")).await.unwrap();
        let again = site.static_block("intro", "video_block", None).await.unwrap();
        let view = site.describe_block(&again).unwrap();

        assert_eq!(first, again);
        assert_eq!(first.kind_key(), "video_block");
        assert_eq!(view.label, "Video Block");
        assert_eq!(view.template, "content/video_block.html");
    }

    #[tokio::test]
    async fn test_static_section_lost_insert_race_fetches_again() {
        let site = racing_site(1);
        let existing = site
            .store
            .insert_section(NewSection::with_key("footer", Some("/".to_owned())))
            .await
            .unwrap();

        let section = site.static_section("footer", Some("/about")).await.unwrap();

        assert_eq!(section, existing);
        assert_eq!(site.static_sections().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_static_block_lost_insert_race_fetches_again() {
        let site = racing_site(2);
        let existing = site.static_block("hero", "rich_text_block", Some("/")).await.unwrap();

        let block = site.static_block("hero", "rich_text_block", None).await.unwrap();

        assert_eq!(block, existing);
    }

    #[tokio::test]
    async fn test_get_or_create_gives_up_after_three_attempts() {
        let site = racing_site(3);
        site.store
            .insert_section(NewSection::with_key("footer", None))
            .await
            .unwrap();

        let err = site.static_section("footer", None).await.unwrap_err();

        match err {
            ContentError::Store(err) => assert!(err.is_already_exists()),
            other => panic!("expected a store error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_blocks_keep_order_and_move() {
        let site = site();
        let section = site.static_section("home", None).await.unwrap();
        let one = site.create_block(section.id, "rich_text_block", rich_text("one")).await.unwrap();
        let two = site.create_block(section.id, "rich_text_block", rich_text("two")).await.unwrap();
        let three = site.create_block(section.id, "rich_text_block", None).await.unwrap();

        site.move_block(three.id, 0).await.unwrap();

        let ids: Vec<BlockId> = site
            .list_blocks(&section)
            .await
            .unwrap()
            .blocks
            .iter()
            .map(|b| b.id)
            .collect();
        assert_eq!(ids, vec![three.id, one.id, two.id]);
    }

    #[tokio::test]
    async fn test_create_block_rejects_carousel_and_mismatched_payload() {
        let site = site();
        let section = site.static_section("home", None).await.unwrap();

        let carousel = site
            .create_block(section.id, "carousel_block", None)
            .await
            .unwrap_err();
        let mismatch = site
            .create_block(section.id, "rich_text_block", Some(BlockPayload::CarouselBlock))
            .await
            .unwrap_err();

        assert_eq!(carousel.to_string(), "Carousel Block blocks cannot be created");
        assert!(matches!(mismatch, ContentError::Validation { field: Some("kind"), .. }));
    }

    #[tokio::test]
    async fn test_update_and_disable_block() {
        let site = site();
        let section = site.static_section("home", None).await.unwrap();
        let block = site.create_block(section.id, "rich_text_block", None).await.unwrap();

        site.update_rich_text(block.id, "<p>Hello</p>".to_owned()).await.unwrap();
        let disabled = site.set_block_disabled(block.id, true).await.unwrap();

        assert_eq!(disabled.payload, BlockPayload::RichTextBlock { content: "<p>Hello</p>".to_owned() });
        let blocks = site.list_blocks(&section).await.unwrap();
        assert_eq!(blocks.visible(false).count(), 0);
        assert_eq!(blocks.visible(true).count(), 1);
    }

    #[tokio::test]
    async fn test_update_rich_text_on_carousel() {
        let site = site();
        let carousel = site.static_block("slides", "carousel_block", None).await.unwrap();

        let err = site
            .update_rich_text(carousel.id, "text".to_owned())
            .await
            .unwrap_err();

        assert!(matches!(err, ContentError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_display_names_and_list_paths() {
        let site = site();
        let (_, team) = about_team(&site).await;
        let menu_section = site.section_for_menu(team.id).await.unwrap();
        let footer = site.static_section("footer", None).await.unwrap();
        let in_menu = site.create_block(menu_section.id, "rich_text_block", None).await.unwrap();
        let in_footer = site.create_block(footer.id, "rich_text_block", None).await.unwrap();
        let hero = site.static_block("hero", "carousel_block", None).await.unwrap();

        assert_eq!(site.section_display_name(&menu_section).await.unwrap(), "About > Team");
        assert_eq!(site.section_display_name(&footer).await.unwrap(), "footer");
        assert_eq!(
            site.block_display_name(&in_menu).await.unwrap(),
            "Rich Text Block in About > Team"
        );
        assert_eq!(
            site.block_display_name(&hero).await.unwrap(),
            "Static Carousel Block (hero)"
        );

        assert_eq!(
            site.block_console_list_path(&in_menu).await.unwrap(),
            format!("/console/submenus/{}", team.id)
        );
        assert_eq!(
            site.block_console_list_path(&in_footer).await.unwrap(),
            format!("/console/content-sections/{}", footer.id)
        );
        assert_eq!(site.block_console_list_path(&hero).await.unwrap(), "/console/content-blocks");
    }

    #[tokio::test]
    async fn test_describe_block() {
        let site = site();
        let section = site.static_section("home", None).await.unwrap();
        let block = site.create_block(section.id, "rich_text_block", None).await.unwrap();

        let view = site.describe_block(&block).unwrap();

        assert_eq!(view.label, "Rich Text Block");
        assert_eq!(view.template, "content/rich_text_block.html");
        assert_eq!(
            view.update_path,
            Some(format!("/console/rich-text-blocks/{}", block.id))
        );
    }

    #[tokio::test]
    async fn test_delete_section_removes_blocks() {
        let site = site();
        let section = site.static_section("home", None).await.unwrap();
        let block = site.create_block(section.id, "rich_text_block", None).await.unwrap();

        site.delete_section(section.id).await.unwrap();

        assert!(matches!(site.block(block.id).await, Err(ContentError::NotFound { .. })));
        let recreated = site.static_section("home", None).await.unwrap();
        assert_ne!(recreated.id, section.id);
    }
}
