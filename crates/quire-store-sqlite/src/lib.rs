//! SQLite storage implementation for Quire.
//!
//! This crate provides [`SqliteStore`], a [`Store`](quire_store::Store) backed
//! by a sqlx connection pool. It handles:
//!
//! - Schema creation on connect
//! - Sibling and block ordering through a `position` column
//! - Uniqueness rules via partial unique indexes
//! - Cascading deletes via foreign keys
//!
//! # Example
//!
//! ```ignore
//! use quire_store::{NewMenu, Store};
//! use quire_store_sqlite::SqliteStore;
//!
//! let store = SqliteStore::connect("sqlite://.quire/content.db").await?;
//! let menus = store.menus().await?;
//! ```

mod rows;
mod schema;

use std::str::FromStr;

use async_trait::async_trait;
use quire_store::{
    BlockId, Blurb, BlurbId, ContentBlock, ContentSection, ImageBlurb, ImageBlurbId, Menu, MenuId,
    NewBlock, NewBlurb, NewImageBlurb, NewMenu, NewSection, SectionId, Store, StoreError,
    StoreErrorKind,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteQueryResult};

use rows::{
    BLOCK_COLUMNS, BLURB_COLUMNS, BlockRow, BlurbRow, IMAGE_BLURB_COLUMNS, ImageBlurbRow,
    MENU_COLUMNS, MenuRow, SECTION_COLUMNS, SectionRow, encode_payload,
};
use schema::SCHEMA;

/// Backend identifier for error messages.
const BACKEND: &str = "Sqlite";

/// Map a sqlx error onto the store's semantic kinds.
fn store_error(entity: &'static str) -> impl FnOnce(sqlx::Error) -> StoreError {
    move |err| {
        let kind = match &err {
            sqlx::Error::RowNotFound => StoreErrorKind::NotFound,
            sqlx::Error::Database(db) if db.is_unique_violation() => StoreErrorKind::AlreadyExists,
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                StoreErrorKind::InvalidReference
            }
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                StoreErrorKind::Unavailable
            }
            _ => StoreErrorKind::Other,
        };
        StoreError::new(kind)
            .with_entity(entity)
            .with_backend(BACKEND)
            .with_source(err)
    }
}

fn not_found(entity: &'static str) -> StoreError {
    StoreError::not_found(entity).with_backend(BACKEND)
}

/// Fail with `NotFound` when a statement touched no rows.
fn expect_row(result: SqliteQueryResult, entity: &'static str) -> Result<(), StoreError> {
    if result.rows_affected() == 0 {
        return Err(not_found(entity));
    }
    Ok(())
}

/// SQLite-backed store.
#[derive(Clone, Debug)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if missing) the database at `url` and apply the schema.
    ///
    /// # Errors
    ///
    /// Returns [`StoreErrorKind::Unavailable`] if the database cannot be opened,
    /// or [`StoreErrorKind::Other`] for a malformed URL or schema failure.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(store_error("database"))?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .connect_with(options)
            .await
            .map_err(store_error("database"))?;

        let store = Self { pool };
        store.migrate().await?;
        tracing::info!(url, "Opened SQLite store");
        Ok(store)
    }

    /// Private in-memory database, for tests and throwaway previews.
    ///
    /// # Errors
    ///
    /// Returns an error if the schema cannot be applied.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(store_error("database"))?
            .foreign_keys(true);
        // One connection that never expires, or the database vanishes.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(store_error("database"))?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(store_error("schema"))?;
        }
        tracing::debug!(statements = SCHEMA.len(), "Applied schema");
        Ok(())
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn menus(&self) -> Result<Vec<Menu>, StoreError> {
        let rows = sqlx::query_as::<_, MenuRow>(&format!(
            "SELECT {MENU_COLUMNS} FROM menus ORDER BY parent_id, position, id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(store_error("menu"))?;
        Ok(rows.into_iter().map(Menu::from).collect())
    }

    async fn menu(&self, id: MenuId) -> Result<Option<Menu>, StoreError> {
        let row = sqlx::query_as::<_, MenuRow>(&format!(
            "SELECT {MENU_COLUMNS} FROM menus WHERE id = ?"
        ))
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error("menu"))?;
        Ok(row.map(Menu::from))
    }

    async fn find_menu(
        &self,
        parent: Option<MenuId>,
        url_slug: &str,
    ) -> Result<Option<Menu>, StoreError> {
        let row = sqlx::query_as::<_, MenuRow>(&format!(
            "SELECT {MENU_COLUMNS} FROM menus WHERE parent_id IS ? AND url_slug = ?"
        ))
        .bind(parent.map(|p| p.0))
        .bind(url_slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error("menu"))?;
        Ok(row.map(Menu::from))
    }

    async fn child_menus(&self, parent: MenuId) -> Result<Vec<Menu>, StoreError> {
        let rows = sqlx::query_as::<_, MenuRow>(&format!(
            "SELECT {MENU_COLUMNS} FROM menus WHERE parent_id = ? ORDER BY position, id"
        ))
        .bind(parent.0)
        .fetch_all(&self.pool)
        .await
        .map_err(store_error("menu"))?;
        Ok(rows.into_iter().map(Menu::from).collect())
    }

    async fn insert_menu(&self, menu: NewMenu) -> Result<Menu, StoreError> {
        let parent = menu.parent_id.map(|p| p.0);
        let row = sqlx::query_as::<_, MenuRow>(&format!(
            "INSERT INTO menus (title, url_slug, disabled, parent_id, redirect_to, position)
             VALUES (?, ?, ?, ?, ?,
                 (SELECT COALESCE(MAX(position) + 1, 0) FROM menus WHERE parent_id IS ?))
             RETURNING {MENU_COLUMNS}"
        ))
        .bind(&menu.title)
        .bind(&menu.url_slug)
        .bind(menu.disabled)
        .bind(parent)
        .bind(&menu.redirect_to)
        .bind(parent)
        .fetch_one(&self.pool)
        .await
        .map_err(store_error("menu"))?;
        Ok(Menu::from(row))
    }

    async fn update_menu(&self, menu: &Menu) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE menus
             SET title = ?, url_slug = ?, disabled = ?, parent_id = ?, redirect_to = ?, position = ?
             WHERE id = ?",
        )
        .bind(&menu.title)
        .bind(&menu.url_slug)
        .bind(menu.disabled)
        .bind(menu.parent_id.map(|p| p.0))
        .bind(&menu.redirect_to)
        .bind(menu.position)
        .bind(menu.id.0)
        .execute(&self.pool)
        .await
        .map_err(store_error("menu"))?;
        expect_row(result, "menu")
    }

    async fn delete_menu(&self, id: MenuId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM menus WHERE id = ?")
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(store_error("menu"))?;
        expect_row(result, "menu")?;
        tracing::debug!(menu = %id, "Deleted menu with dependents");
        Ok(())
    }

    async fn set_menu_order(
        &self,
        parent: Option<MenuId>,
        order: &[MenuId],
    ) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await.map_err(store_error("menu"))?;
        for (position, id) in (0_i64..).zip(order) {
            let result = sqlx::query("UPDATE menus SET position = ? WHERE id = ? AND parent_id IS ?")
                .bind(position)
                .bind(id.0)
                .bind(parent.map(|p| p.0))
                .execute(&mut *tx)
                .await
                .map_err(store_error("menu"))?;
            expect_row(result, "menu")?;
        }
        tx.commit().await.map_err(store_error("menu"))
    }

    async fn section(&self, id: SectionId) -> Result<Option<ContentSection>, StoreError> {
        let row = sqlx::query_as::<_, SectionRow>(&format!(
            "SELECT {SECTION_COLUMNS} FROM content_sections WHERE id = ?"
        ))
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error("content_section"))?;
        Ok(row.map(ContentSection::from))
    }

    async fn section_for_menu(&self, menu: MenuId) -> Result<Option<ContentSection>, StoreError> {
        let row = sqlx::query_as::<_, SectionRow>(&format!(
            "SELECT {SECTION_COLUMNS} FROM content_sections WHERE menu_id = ?"
        ))
        .bind(menu.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error("content_section"))?;
        Ok(row.map(ContentSection::from))
    }

    async fn static_section(&self, key: &str) -> Result<Option<ContentSection>, StoreError> {
        let row = sqlx::query_as::<_, SectionRow>(&format!(
            "SELECT {SECTION_COLUMNS} FROM content_sections WHERE menu_id IS NULL AND key = ?"
        ))
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error("content_section"))?;
        Ok(row.map(ContentSection::from))
    }

    async fn static_sections(&self) -> Result<Vec<ContentSection>, StoreError> {
        let rows = sqlx::query_as::<_, SectionRow>(&format!(
            "SELECT {SECTION_COLUMNS} FROM content_sections WHERE menu_id IS NULL ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(store_error("content_section"))?;
        Ok(rows.into_iter().map(ContentSection::from).collect())
    }

    async fn insert_section(&self, section: NewSection) -> Result<ContentSection, StoreError> {
        let row = sqlx::query_as::<_, SectionRow>(&format!(
            "INSERT INTO content_sections (key, static_location, menu_id)
             VALUES (?, ?, ?)
             RETURNING {SECTION_COLUMNS}"
        ))
        .bind(&section.key)
        .bind(&section.static_location)
        .bind(section.menu_id.map(|m| m.0))
        .fetch_one(&self.pool)
        .await
        .map_err(store_error("content_section"))?;
        Ok(ContentSection::from(row))
    }

    async fn delete_section(&self, id: SectionId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM content_sections WHERE id = ?")
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(store_error("content_section"))?;
        expect_row(result, "content_section")
    }

    async fn block(&self, id: BlockId) -> Result<Option<ContentBlock>, StoreError> {
        sqlx::query_as::<_, BlockRow>(&format!(
            "SELECT {BLOCK_COLUMNS} FROM content_blocks WHERE id = ?"
        ))
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error("content_block"))?
        .map(ContentBlock::try_from)
        .transpose()
    }

    async fn static_block(
        &self,
        kind_key: &str,
        key: &str,
    ) -> Result<Option<ContentBlock>, StoreError> {
        sqlx::query_as::<_, BlockRow>(&format!(
            "SELECT {BLOCK_COLUMNS} FROM content_blocks
             WHERE section_id IS NULL AND kind = ? AND key = ?"
        ))
        .bind(kind_key)
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error("content_block"))?
        .map(ContentBlock::try_from)
        .transpose()
    }

    async fn section_blocks(&self, section: SectionId) -> Result<Vec<ContentBlock>, StoreError> {
        sqlx::query_as::<_, BlockRow>(&format!(
            "SELECT {BLOCK_COLUMNS} FROM content_blocks WHERE section_id = ? ORDER BY position, id"
        ))
        .bind(section.0)
        .fetch_all(&self.pool)
        .await
        .map_err(store_error("content_block"))?
        .into_iter()
        .map(ContentBlock::try_from)
        .collect()
    }

    async fn static_blocks(&self) -> Result<Vec<ContentBlock>, StoreError> {
        sqlx::query_as::<_, BlockRow>(&format!(
            "SELECT {BLOCK_COLUMNS} FROM content_blocks WHERE section_id IS NULL ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(store_error("content_block"))?
        .into_iter()
        .map(ContentBlock::try_from)
        .collect()
    }

    async fn insert_block(&self, block: NewBlock) -> Result<ContentBlock, StoreError> {
        let payload = encode_payload(&block.payload)?;
        let section = block.section_id.map(|s| s.0);
        let row = sqlx::query_as::<_, BlockRow>(&format!(
            "INSERT INTO content_blocks
                 (section_id, disabled, key, static_location, position, kind, payload)
             VALUES (?, ?, ?, ?,
                 (SELECT COALESCE(MAX(position) + 1, 0) FROM content_blocks WHERE section_id IS ?),
                 ?, ?)
             RETURNING {BLOCK_COLUMNS}"
        ))
        .bind(section)
        .bind(block.disabled)
        .bind(&block.key)
        .bind(&block.static_location)
        .bind(section)
        .bind(block.payload.kind_key())
        .bind(payload)
        .fetch_one(&self.pool)
        .await
        .map_err(store_error("content_block"))?;
        ContentBlock::try_from(row)
    }

    async fn update_block(&self, block: &ContentBlock) -> Result<(), StoreError> {
        let payload = encode_payload(&block.payload)?;
        let result = sqlx::query(
            "UPDATE content_blocks
             SET section_id = ?, disabled = ?, key = ?, static_location = ?, position = ?,
                 kind = ?, payload = ?
             WHERE id = ?",
        )
        .bind(block.section_id.map(|s| s.0))
        .bind(block.disabled)
        .bind(&block.key)
        .bind(&block.static_location)
        .bind(block.position)
        .bind(block.kind_key())
        .bind(payload)
        .bind(block.id.0)
        .execute(&self.pool)
        .await
        .map_err(store_error("content_block"))?;
        expect_row(result, "content_block")
    }

    async fn delete_block(&self, id: BlockId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM content_blocks WHERE id = ?")
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(store_error("content_block"))?;
        expect_row(result, "content_block")
    }

    async fn set_block_order(
        &self,
        section: SectionId,
        order: &[BlockId],
    ) -> Result<(), StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(store_error("content_block"))?;
        for (position, id) in (0_i64..).zip(order) {
            let result =
                sqlx::query("UPDATE content_blocks SET position = ? WHERE id = ? AND section_id = ?")
                    .bind(position)
                    .bind(id.0)
                    .bind(section.0)
                    .execute(&mut *tx)
                    .await
                    .map_err(store_error("content_block"))?;
            expect_row(result, "content_block")?;
        }
        tx.commit().await.map_err(store_error("content_block"))
    }

    async fn blurbs(&self) -> Result<Vec<Blurb>, StoreError> {
        let rows = sqlx::query_as::<_, BlurbRow>(&format!(
            "SELECT {BLURB_COLUMNS} FROM blurbs ORDER BY last_known_location, identifier"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(store_error("blurb"))?;
        Ok(rows.into_iter().map(Blurb::from).collect())
    }

    async fn blurb(&self, id: BlurbId) -> Result<Option<Blurb>, StoreError> {
        let row = sqlx::query_as::<_, BlurbRow>(&format!(
            "SELECT {BLURB_COLUMNS} FROM blurbs WHERE id = ?"
        ))
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error("blurb"))?;
        Ok(row.map(Blurb::from))
    }

    async fn blurb_by_identifier(&self, identifier: &str) -> Result<Option<Blurb>, StoreError> {
        let row = sqlx::query_as::<_, BlurbRow>(&format!(
            "SELECT {BLURB_COLUMNS} FROM blurbs WHERE identifier = ?"
        ))
        .bind(identifier)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error("blurb"))?;
        Ok(row.map(Blurb::from))
    }

    async fn insert_blurb(&self, blurb: NewBlurb) -> Result<Blurb, StoreError> {
        let row = sqlx::query_as::<_, BlurbRow>(&format!(
            "INSERT INTO blurbs (identifier, label, content, plain_text, last_known_location)
             VALUES (?, ?, ?, ?, ?)
             RETURNING {BLURB_COLUMNS}"
        ))
        .bind(&blurb.identifier)
        .bind(&blurb.label)
        .bind(&blurb.content)
        .bind(blurb.plain_text)
        .bind(&blurb.last_known_location)
        .fetch_one(&self.pool)
        .await
        .map_err(store_error("blurb"))?;
        Ok(Blurb::from(row))
    }

    async fn update_blurb(&self, blurb: &Blurb) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE blurbs
             SET identifier = ?, label = ?, content = ?, plain_text = ?, last_known_location = ?
             WHERE id = ?",
        )
        .bind(&blurb.identifier)
        .bind(&blurb.label)
        .bind(&blurb.content)
        .bind(blurb.plain_text)
        .bind(&blurb.last_known_location)
        .bind(blurb.id.0)
        .execute(&self.pool)
        .await
        .map_err(store_error("blurb"))?;
        expect_row(result, "blurb")
    }

    async fn image_blurbs(&self) -> Result<Vec<ImageBlurb>, StoreError> {
        let rows = sqlx::query_as::<_, ImageBlurbRow>(&format!(
            "SELECT {IMAGE_BLURB_COLUMNS} FROM image_blurbs ORDER BY last_known_location, identifier"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(store_error("image_blurb"))?;
        Ok(rows.into_iter().map(ImageBlurb::from).collect())
    }

    async fn image_blurb(&self, id: ImageBlurbId) -> Result<Option<ImageBlurb>, StoreError> {
        let row = sqlx::query_as::<_, ImageBlurbRow>(&format!(
            "SELECT {IMAGE_BLURB_COLUMNS} FROM image_blurbs WHERE id = ?"
        ))
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error("image_blurb"))?;
        Ok(row.map(ImageBlurb::from))
    }

    async fn image_blurb_by_identifier(
        &self,
        identifier: &str,
    ) -> Result<Option<ImageBlurb>, StoreError> {
        let row = sqlx::query_as::<_, ImageBlurbRow>(&format!(
            "SELECT {IMAGE_BLURB_COLUMNS} FROM image_blurbs WHERE identifier = ?"
        ))
        .bind(identifier)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error("image_blurb"))?;
        Ok(row.map(ImageBlurb::from))
    }

    async fn insert_image_blurb(&self, blurb: NewImageBlurb) -> Result<ImageBlurb, StoreError> {
        let row = sqlx::query_as::<_, ImageBlurbRow>(&format!(
            "INSERT INTO image_blurbs (identifier, label, image, placeholder, last_known_location)
             VALUES (?, ?, ?, ?, ?)
             RETURNING {IMAGE_BLURB_COLUMNS}"
        ))
        .bind(&blurb.identifier)
        .bind(&blurb.label)
        .bind(&blurb.image)
        .bind(&blurb.placeholder)
        .bind(&blurb.last_known_location)
        .fetch_one(&self.pool)
        .await
        .map_err(store_error("image_blurb"))?;
        Ok(ImageBlurb::from(row))
    }

    async fn update_image_blurb(&self, blurb: &ImageBlurb) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE image_blurbs
             SET identifier = ?, label = ?, image = ?, placeholder = ?, last_known_location = ?
             WHERE id = ?",
        )
        .bind(&blurb.identifier)
        .bind(&blurb.label)
        .bind(&blurb.image)
        .bind(&blurb.placeholder)
        .bind(&blurb.last_known_location)
        .bind(blurb.id.0)
        .execute(&self.pool)
        .await
        .map_err(store_error("image_blurb"))?;
        expect_row(result, "image_blurb")
    }
}
