//! In-memory store for testing.
//!
//! Provides [`MemoryStore`], which keeps every table behind one lock so that
//! constraint checks and inserts happen atomically, mirroring what a
//! relational backend guarantees with unique indexes.

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use crate::model::{
    BlockId, Blurb, BlurbId, ContentBlock, ContentSection, ImageBlurb, ImageBlurbId, Menu, MenuId,
    NewBlock, NewBlurb, NewImageBlurb, NewMenu, NewSection, SectionId,
};
use crate::store::{Store, StoreError, StoreErrorKind};

/// Backend identifier for error messages.
const BACKEND: &str = "Memory";

#[derive(Debug, Default)]
struct Tables {
    next_id: i64,
    menus: BTreeMap<MenuId, Menu>,
    sections: BTreeMap<SectionId, ContentSection>,
    blocks: BTreeMap<BlockId, ContentBlock>,
    blurbs: BTreeMap<BlurbId, Blurb>,
    image_blurbs: BTreeMap<ImageBlurbId, ImageBlurb>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn slug_taken(&self, parent: Option<MenuId>, slug: &str, exclude: Option<MenuId>) -> bool {
        self.menus.values().any(|m| {
            m.parent_id == parent && m.url_slug == slug && Some(m.id) != exclude
        })
    }

    fn remove_section(&mut self, id: SectionId) {
        self.sections.remove(&id);
        self.blocks.retain(|_, b| b.section_id != Some(id));
    }

    fn remove_menu(&mut self, id: MenuId) {
        let children: Vec<MenuId> = self
            .menus
            .values()
            .filter(|m| m.parent_id == Some(id))
            .map(|m| m.id)
            .collect();
        for child in children {
            self.remove_menu(child);
        }

        let sections: Vec<SectionId> = self
            .sections
            .values()
            .filter(|s| s.menu_id == Some(id))
            .map(|s| s.id)
            .collect();
        for section in sections {
            self.remove_section(section);
        }

        self.menus.remove(&id);
    }
}

/// Mock store for testing.
///
/// # Example
///
/// ```ignore
/// use quire_store::{MemoryStore, NewMenu, Store};
///
/// let store = MemoryStore::new();
/// let about = store.insert_menu(NewMenu { title: "About".into(), url_slug: "about".into(), ..Default::default() }).await?;
/// assert!(store.find_menu(None, "about").await?.is_some());
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, StoreError> {
        self.tables.read().map_err(|_| poisoned())
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, StoreError> {
        self.tables.write().map_err(|_| poisoned())
    }
}

fn poisoned() -> StoreError {
    StoreError::new(StoreErrorKind::Unavailable).with_backend(BACKEND)
}

fn not_found(entity: &'static str) -> StoreError {
    StoreError::not_found(entity).with_backend(BACKEND)
}

fn already_exists(entity: &'static str) -> StoreError {
    StoreError::already_exists(entity).with_backend(BACKEND)
}

fn invalid_reference(entity: &'static str) -> StoreError {
    StoreError::new(StoreErrorKind::InvalidReference)
        .with_entity(entity)
        .with_backend(BACKEND)
}

#[async_trait]
impl Store for MemoryStore {
    async fn menus(&self) -> Result<Vec<Menu>, StoreError> {
        let tables = self.read()?;
        let mut menus: Vec<Menu> = tables.menus.values().cloned().collect();
        menus.sort_by_key(|m| (m.parent_id, m.position, m.id));
        Ok(menus)
    }

    async fn menu(&self, id: MenuId) -> Result<Option<Menu>, StoreError> {
        Ok(self.read()?.menus.get(&id).cloned())
    }

    async fn find_menu(
        &self,
        parent: Option<MenuId>,
        url_slug: &str,
    ) -> Result<Option<Menu>, StoreError> {
        Ok(self
            .read()?
            .menus
            .values()
            .find(|m| m.parent_id == parent && m.url_slug == url_slug)
            .cloned())
    }

    async fn child_menus(&self, parent: MenuId) -> Result<Vec<Menu>, StoreError> {
        let tables = self.read()?;
        let mut children: Vec<Menu> = tables
            .menus
            .values()
            .filter(|m| m.parent_id == Some(parent))
            .cloned()
            .collect();
        children.sort_by_key(|m| (m.position, m.id));
        Ok(children)
    }

    async fn insert_menu(&self, menu: NewMenu) -> Result<Menu, StoreError> {
        let mut tables = self.write()?;
        if let Some(parent) = menu.parent_id
            && !tables.menus.contains_key(&parent)
        {
            return Err(invalid_reference("menu"));
        }
        if tables.slug_taken(menu.parent_id, &menu.url_slug, None) {
            return Err(already_exists("menu"));
        }

        let position = tables
            .menus
            .values()
            .filter(|m| m.parent_id == menu.parent_id)
            .map(|m| m.position + 1)
            .max()
            .unwrap_or(0);
        let id = MenuId(tables.next_id());
        let stored = Menu {
            id,
            title: menu.title,
            url_slug: menu.url_slug,
            disabled: menu.disabled,
            parent_id: menu.parent_id,
            redirect_to: menu.redirect_to,
            position,
        };
        tables.menus.insert(id, stored.clone());
        Ok(stored)
    }

    async fn update_menu(&self, menu: &Menu) -> Result<(), StoreError> {
        let mut tables = self.write()?;
        if !tables.menus.contains_key(&menu.id) {
            return Err(not_found("menu"));
        }
        if let Some(parent) = menu.parent_id
            && !tables.menus.contains_key(&parent)
        {
            return Err(invalid_reference("menu"));
        }
        if tables.slug_taken(menu.parent_id, &menu.url_slug, Some(menu.id)) {
            return Err(already_exists("menu"));
        }
        tables.menus.insert(menu.id, menu.clone());
        Ok(())
    }

    async fn delete_menu(&self, id: MenuId) -> Result<(), StoreError> {
        let mut tables = self.write()?;
        if !tables.menus.contains_key(&id) {
            return Err(not_found("menu"));
        }
        tables.remove_menu(id);
        tracing::debug!(menu = %id, "Deleted menu with dependents");
        Ok(())
    }

    async fn set_menu_order(
        &self,
        parent: Option<MenuId>,
        order: &[MenuId],
    ) -> Result<(), StoreError> {
        let mut tables = self.write()?;
        let in_scope = |id: &MenuId| tables.menus.get(id).is_some_and(|m| m.parent_id == parent);
        if !order.iter().all(in_scope) {
            return Err(not_found("menu"));
        }
        for (position, id) in (0_i64..).zip(order) {
            if let Some(menu) = tables.menus.get_mut(id) {
                menu.position = position;
            }
        }
        Ok(())
    }

    async fn section(&self, id: SectionId) -> Result<Option<ContentSection>, StoreError> {
        Ok(self.read()?.sections.get(&id).cloned())
    }

    async fn section_for_menu(&self, menu: MenuId) -> Result<Option<ContentSection>, StoreError> {
        Ok(self
            .read()?
            .sections
            .values()
            .find(|s| s.menu_id == Some(menu))
            .cloned())
    }

    async fn static_section(&self, key: &str) -> Result<Option<ContentSection>, StoreError> {
        Ok(self
            .read()?
            .sections
            .values()
            .find(|s| s.menu_id.is_none() && s.key.as_deref() == Some(key))
            .cloned())
    }

    async fn static_sections(&self) -> Result<Vec<ContentSection>, StoreError> {
        Ok(self
            .read()?
            .sections
            .values()
            .filter(|s| s.is_static())
            .cloned()
            .collect())
    }

    async fn insert_section(&self, section: NewSection) -> Result<ContentSection, StoreError> {
        let mut tables = self.write()?;
        let taken = match (section.menu_id, section.key.as_deref()) {
            (Some(menu), _) => {
                if !tables.menus.contains_key(&menu) {
                    return Err(invalid_reference("content_section"));
                }
                tables.sections.values().any(|s| s.menu_id == Some(menu))
            }
            (None, Some(key)) => tables
                .sections
                .values()
                .any(|s| s.menu_id.is_none() && s.key.as_deref() == Some(key)),
            (None, None) => false,
        };
        if taken {
            return Err(already_exists("content_section"));
        }

        let id = SectionId(tables.next_id());
        let stored = ContentSection {
            id,
            key: section.key,
            static_location: section.static_location,
            menu_id: section.menu_id,
        };
        tables.sections.insert(id, stored.clone());
        Ok(stored)
    }

    async fn delete_section(&self, id: SectionId) -> Result<(), StoreError> {
        let mut tables = self.write()?;
        if !tables.sections.contains_key(&id) {
            return Err(not_found("content_section"));
        }
        tables.remove_section(id);
        Ok(())
    }

    async fn block(&self, id: BlockId) -> Result<Option<ContentBlock>, StoreError> {
        Ok(self.read()?.blocks.get(&id).cloned())
    }

    async fn static_block(
        &self,
        kind_key: &str,
        key: &str,
    ) -> Result<Option<ContentBlock>, StoreError> {
        Ok(self
            .read()?
            .blocks
            .values()
            .find(|b| b.is_static() && b.kind_key() == kind_key && b.key.as_deref() == Some(key))
            .cloned())
    }

    async fn section_blocks(&self, section: SectionId) -> Result<Vec<ContentBlock>, StoreError> {
        let tables = self.read()?;
        let mut blocks: Vec<ContentBlock> = tables
            .blocks
            .values()
            .filter(|b| b.section_id == Some(section))
            .cloned()
            .collect();
        blocks.sort_by_key(|b| (b.position, b.id));
        Ok(blocks)
    }

    async fn static_blocks(&self) -> Result<Vec<ContentBlock>, StoreError> {
        Ok(self
            .read()?
            .blocks
            .values()
            .filter(|b| b.is_static())
            .cloned()
            .collect())
    }

    async fn insert_block(&self, block: NewBlock) -> Result<ContentBlock, StoreError> {
        let mut tables = self.write()?;
        match (block.section_id, block.key.as_deref()) {
            (Some(section), _) => {
                if !tables.sections.contains_key(&section) {
                    return Err(invalid_reference("content_block"));
                }
            }
            (None, Some(key)) => {
                let kind = block.payload.kind_key();
                let taken = tables.blocks.values().any(|b| {
                    b.is_static() && b.kind_key() == kind && b.key.as_deref() == Some(key)
                });
                if taken {
                    return Err(already_exists("content_block"));
                }
            }
            (None, None) => {}
        }

        let position = tables
            .blocks
            .values()
            .filter(|b| b.section_id == block.section_id)
            .map(|b| b.position + 1)
            .max()
            .unwrap_or(0);
        let id = BlockId(tables.next_id());
        let stored = ContentBlock {
            id,
            section_id: block.section_id,
            disabled: block.disabled,
            key: block.key,
            static_location: block.static_location,
            position,
            payload: block.payload,
        };
        tables.blocks.insert(id, stored.clone());
        Ok(stored)
    }

    async fn update_block(&self, block: &ContentBlock) -> Result<(), StoreError> {
        let mut tables = self.write()?;
        match tables.blocks.get_mut(&block.id) {
            Some(existing) => {
                *existing = block.clone();
                Ok(())
            }
            None => Err(not_found("content_block")),
        }
    }

    async fn delete_block(&self, id: BlockId) -> Result<(), StoreError> {
        let mut tables = self.write()?;
        tables
            .blocks
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| not_found("content_block"))
    }

    async fn set_block_order(
        &self,
        section: SectionId,
        order: &[BlockId],
    ) -> Result<(), StoreError> {
        let mut tables = self.write()?;
        let in_section =
            |id: &BlockId| tables.blocks.get(id).is_some_and(|b| b.section_id == Some(section));
        if !order.iter().all(in_section) {
            return Err(not_found("content_block"));
        }
        for (position, id) in (0_i64..).zip(order) {
            if let Some(block) = tables.blocks.get_mut(id) {
                block.position = position;
            }
        }
        Ok(())
    }

    async fn blurbs(&self) -> Result<Vec<Blurb>, StoreError> {
        let tables = self.read()?;
        let mut blurbs: Vec<Blurb> = tables.blurbs.values().cloned().collect();
        blurbs.sort_by(|a, b| {
            (&a.last_known_location, &a.identifier).cmp(&(&b.last_known_location, &b.identifier))
        });
        Ok(blurbs)
    }

    async fn blurb(&self, id: BlurbId) -> Result<Option<Blurb>, StoreError> {
        Ok(self.read()?.blurbs.get(&id).cloned())
    }

    async fn blurb_by_identifier(&self, identifier: &str) -> Result<Option<Blurb>, StoreError> {
        Ok(self
            .read()?
            .blurbs
            .values()
            .find(|b| b.identifier.as_deref() == Some(identifier))
            .cloned())
    }

    async fn insert_blurb(&self, blurb: NewBlurb) -> Result<Blurb, StoreError> {
        let mut tables = self.write()?;
        if let Some(identifier) = blurb.identifier.as_deref()
            && tables
                .blurbs
                .values()
                .any(|b| b.identifier.as_deref() == Some(identifier))
        {
            return Err(already_exists("blurb"));
        }

        let id = BlurbId(tables.next_id());
        let stored = Blurb {
            id,
            identifier: blurb.identifier,
            label: blurb.label,
            content: blurb.content,
            plain_text: blurb.plain_text,
            last_known_location: blurb.last_known_location,
        };
        tables.blurbs.insert(id, stored.clone());
        Ok(stored)
    }

    async fn update_blurb(&self, blurb: &Blurb) -> Result<(), StoreError> {
        let mut tables = self.write()?;
        if !tables.blurbs.contains_key(&blurb.id) {
            return Err(not_found("blurb"));
        }
        if let Some(identifier) = blurb.identifier.as_deref()
            && tables
                .blurbs
                .values()
                .any(|b| b.id != blurb.id && b.identifier.as_deref() == Some(identifier))
        {
            return Err(already_exists("blurb"));
        }
        tables.blurbs.insert(blurb.id, blurb.clone());
        Ok(())
    }

    async fn image_blurbs(&self) -> Result<Vec<ImageBlurb>, StoreError> {
        let tables = self.read()?;
        let mut blurbs: Vec<ImageBlurb> = tables.image_blurbs.values().cloned().collect();
        blurbs.sort_by(|a, b| {
            (&a.last_known_location, &a.identifier).cmp(&(&b.last_known_location, &b.identifier))
        });
        Ok(blurbs)
    }

    async fn image_blurb(&self, id: ImageBlurbId) -> Result<Option<ImageBlurb>, StoreError> {
        Ok(self.read()?.image_blurbs.get(&id).cloned())
    }

    async fn image_blurb_by_identifier(
        &self,
        identifier: &str,
    ) -> Result<Option<ImageBlurb>, StoreError> {
        Ok(self
            .read()?
            .image_blurbs
            .values()
            .find(|b| b.identifier.as_deref() == Some(identifier))
            .cloned())
    }

    async fn insert_image_blurb(&self, blurb: NewImageBlurb) -> Result<ImageBlurb, StoreError> {
        let mut tables = self.write()?;
        if let Some(identifier) = blurb.identifier.as_deref()
            && tables
                .image_blurbs
                .values()
                .any(|b| b.identifier.as_deref() == Some(identifier))
        {
            return Err(already_exists("image_blurb"));
        }

        let id = ImageBlurbId(tables.next_id());
        let stored = ImageBlurb {
            id,
            identifier: blurb.identifier,
            label: blurb.label,
            image: blurb.image,
            placeholder: blurb.placeholder,
            last_known_location: blurb.last_known_location,
        };
        tables.image_blurbs.insert(id, stored.clone());
        Ok(stored)
    }

    async fn update_image_blurb(&self, blurb: &ImageBlurb) -> Result<(), StoreError> {
        let mut tables = self.write()?;
        if !tables.image_blurbs.contains_key(&blurb.id) {
            return Err(not_found("image_blurb"));
        }
        if let Some(identifier) = blurb.identifier.as_deref()
            && tables
                .image_blurbs
                .values()
                .any(|b| b.id != blurb.id && b.identifier.as_deref() == Some(identifier))
        {
            return Err(already_exists("image_blurb"));
        }
        tables.image_blurbs.insert(blurb.id, blurb.clone());
        Ok(())
    }
}
