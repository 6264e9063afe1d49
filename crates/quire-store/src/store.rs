//! Store trait and error types.
//!
//! Provides the [`Store`] trait the content layer persists through, along with
//! [`StoreError`] for unified error handling across backends.
//!
//! # Constraints
//!
//! Every backend enforces the same relational contract:
//! - root menu slugs are unique, child slugs are unique per parent
//! - at most one section per menu, static section keys are unique
//! - static block keys are unique per block kind
//! - blurb and image blurb identifiers are unique
//! - deleting a menu deletes its children, its section and that section's blocks
//!
//! Violating a uniqueness rule yields [`StoreErrorKind::AlreadyExists`]. Callers
//! implementing get-or-create insert first and re-fetch on that error instead of
//! reading before writing.

use async_trait::async_trait;

use crate::model::{
    BlockId, Blurb, BlurbId, ContentBlock, ContentSection, ImageBlurb, ImageBlurbId, Menu, MenuId,
    NewBlock, NewBlurb, NewImageBlurb, NewMenu, NewSection, SectionId,
};

/// Semantic error categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum StoreErrorKind {
    /// Row does not exist.
    NotFound,
    /// A uniqueness constraint was violated.
    AlreadyExists,
    /// A foreign key points at a missing row.
    InvalidReference,
    /// Backend is temporarily unavailable (locked database, closed pool).
    Unavailable,
    /// Other/unknown error category.
    Other,
}

/// Store error with semantic kind and backend-specific source.
#[derive(Debug)]
pub struct StoreError {
    kind: StoreErrorKind,
    entity: Option<&'static str>,
    backend: Option<&'static str>,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl StoreError {
    /// Create a new store error.
    #[must_use]
    pub fn new(kind: StoreErrorKind) -> Self {
        Self {
            kind,
            entity: None,
            backend: None,
            source: None,
        }
    }

    /// Attach the entity (table) the error refers to.
    #[must_use]
    pub fn with_entity(mut self, entity: &'static str) -> Self {
        self.entity = Some(entity);
        self
    }

    /// Attach backend identifier.
    #[must_use]
    pub fn with_backend(mut self, backend: &'static str) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Attach the underlying error source.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Create a not found error for `entity`.
    #[must_use]
    pub fn not_found(entity: &'static str) -> Self {
        Self::new(StoreErrorKind::NotFound).with_entity(entity)
    }

    /// Create a uniqueness violation error for `entity`.
    #[must_use]
    pub fn already_exists(entity: &'static str) -> Self {
        Self::new(StoreErrorKind::AlreadyExists).with_entity(entity)
    }

    #[must_use]
    pub fn kind(&self) -> StoreErrorKind {
        self.kind
    }

    #[must_use]
    pub fn entity(&self) -> Option<&'static str> {
        self.entity
    }

    #[must_use]
    pub fn backend(&self) -> Option<&'static str> {
        self.backend
    }

    /// True if the error reports a uniqueness violation.
    #[must_use]
    pub fn is_already_exists(&self) -> bool {
        self.kind == StoreErrorKind::AlreadyExists
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Format: "[Backend] Kind: message (entity: menu)"
        if let Some(backend) = self.backend {
            write!(f, "[{backend}] ")?;
        }

        let kind_str = match self.kind {
            StoreErrorKind::NotFound => "Not found",
            StoreErrorKind::AlreadyExists => "Already exists",
            StoreErrorKind::InvalidReference => "Invalid reference",
            StoreErrorKind::Unavailable => "Unavailable",
            StoreErrorKind::Other => "Error",
        };

        write!(f, "{kind_str}")?;

        if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }

        if let Some(entity) = self.entity {
            write!(f, " (entity: {entity})")?;
        }

        Ok(())
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|s| s.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Persistence abstraction for menus, sections, blocks and blurbs.
///
/// Lookups return `Ok(None)` for missing rows; mutations of missing rows
/// return [`StoreErrorKind::NotFound`].
#[async_trait]
pub trait Store: Send + Sync {
    /// All menus, ordered by parent then sibling position.
    async fn menus(&self) -> Result<Vec<Menu>, StoreError>;

    async fn menu(&self, id: MenuId) -> Result<Option<Menu>, StoreError>;

    /// Find a menu by slug within a sibling scope (`None` = root menus).
    async fn find_menu(
        &self,
        parent: Option<MenuId>,
        url_slug: &str,
    ) -> Result<Option<Menu>, StoreError>;

    /// Children of `parent` in sibling order.
    async fn child_menus(&self, parent: MenuId) -> Result<Vec<Menu>, StoreError>;

    /// Insert a menu after its existing siblings.
    ///
    /// # Errors
    ///
    /// [`StoreErrorKind::AlreadyExists`] on a slug collision within the sibling
    /// scope, [`StoreErrorKind::InvalidReference`] if the parent is missing.
    async fn insert_menu(&self, menu: NewMenu) -> Result<Menu, StoreError>;

    /// Overwrite a stored menu.
    async fn update_menu(&self, menu: &Menu) -> Result<(), StoreError>;

    /// Delete a menu with its children, sections and blocks.
    async fn delete_menu(&self, id: MenuId) -> Result<(), StoreError>;

    /// Reassign sibling positions to follow `order`.
    async fn set_menu_order(
        &self,
        parent: Option<MenuId>,
        order: &[MenuId],
    ) -> Result<(), StoreError>;

    async fn section(&self, id: SectionId) -> Result<Option<ContentSection>, StoreError>;

    async fn section_for_menu(&self, menu: MenuId) -> Result<Option<ContentSection>, StoreError>;

    async fn static_section(&self, key: &str) -> Result<Option<ContentSection>, StoreError>;

    /// Sections not bound to a menu.
    async fn static_sections(&self) -> Result<Vec<ContentSection>, StoreError>;

    /// Insert a section.
    ///
    /// # Errors
    ///
    /// [`StoreErrorKind::AlreadyExists`] if the menu already has a section or a
    /// static section with the same key exists.
    async fn insert_section(&self, section: NewSection) -> Result<ContentSection, StoreError>;

    /// Delete a section and its blocks.
    async fn delete_section(&self, id: SectionId) -> Result<(), StoreError>;

    async fn block(&self, id: BlockId) -> Result<Option<ContentBlock>, StoreError>;

    /// Static block of the given kind and key.
    async fn static_block(
        &self,
        kind_key: &str,
        key: &str,
    ) -> Result<Option<ContentBlock>, StoreError>;

    /// Blocks of a section in position order.
    async fn section_blocks(&self, section: SectionId) -> Result<Vec<ContentBlock>, StoreError>;

    /// Blocks not bound to a section.
    async fn static_blocks(&self) -> Result<Vec<ContentBlock>, StoreError>;

    /// Insert a block after the existing blocks of its section.
    ///
    /// # Errors
    ///
    /// [`StoreErrorKind::AlreadyExists`] if a static block with the same kind and
    /// key exists, [`StoreErrorKind::InvalidReference`] if the section is missing.
    async fn insert_block(&self, block: NewBlock) -> Result<ContentBlock, StoreError>;

    /// Overwrite a stored block (payload, disabled flag, position).
    async fn update_block(&self, block: &ContentBlock) -> Result<(), StoreError>;

    async fn delete_block(&self, id: BlockId) -> Result<(), StoreError>;

    /// Reassign block positions within a section to follow `order`.
    async fn set_block_order(&self, section: SectionId, order: &[BlockId])
    -> Result<(), StoreError>;

    /// All blurbs, ordered by last known location then identifier.
    async fn blurbs(&self) -> Result<Vec<Blurb>, StoreError>;

    async fn blurb(&self, id: BlurbId) -> Result<Option<Blurb>, StoreError>;

    async fn blurb_by_identifier(&self, identifier: &str) -> Result<Option<Blurb>, StoreError>;

    async fn insert_blurb(&self, blurb: NewBlurb) -> Result<Blurb, StoreError>;

    async fn update_blurb(&self, blurb: &Blurb) -> Result<(), StoreError>;

    /// All image blurbs, ordered by last known location then identifier.
    async fn image_blurbs(&self) -> Result<Vec<ImageBlurb>, StoreError>;

    async fn image_blurb(&self, id: ImageBlurbId) -> Result<Option<ImageBlurb>, StoreError>;

    async fn image_blurb_by_identifier(
        &self,
        identifier: &str,
    ) -> Result<Option<ImageBlurb>, StoreError>;

    async fn insert_image_blurb(&self, blurb: NewImageBlurb) -> Result<ImageBlurb, StoreError>;

    async fn update_image_blurb(&self, blurb: &ImageBlurb) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_with_backend_and_entity() {
        let err = StoreError::already_exists("menu").with_backend("Sqlite");

        assert_eq!(err.to_string(), "[Sqlite] Already exists (entity: menu)");
    }

    #[test]
    fn test_display_includes_source() {
        let io = std::io::Error::other("database is locked");
        let err = StoreError::new(StoreErrorKind::Unavailable).with_source(io);

        assert_eq!(err.to_string(), "Unavailable: database is locked");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_accessors() {
        let err = StoreError::not_found("content_block").with_backend("Memory");

        assert_eq!(err.kind(), StoreErrorKind::NotFound);
        assert_eq!(err.entity(), Some("content_block"));
        assert_eq!(err.backend(), Some("Memory"));
        assert!(!err.is_already_exists());
    }
}
