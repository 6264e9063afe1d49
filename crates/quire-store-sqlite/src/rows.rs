//! Row types and conversion into store entities.

use quire_store::{
    BlockId, BlockPayload, Blurb, BlurbId, ContentBlock, ContentSection, ImageBlurb, ImageBlurbId,
    Menu, MenuId, SectionId, StoreError, StoreErrorKind,
};
use sqlx::FromRow;

use crate::BACKEND;

pub(crate) const MENU_COLUMNS: &str = "id, title, url_slug, disabled, parent_id, redirect_to, position";
pub(crate) const SECTION_COLUMNS: &str = "id, key, static_location, menu_id";
pub(crate) const BLOCK_COLUMNS: &str =
    "id, section_id, disabled, key, static_location, position, kind, payload";
pub(crate) const BLURB_COLUMNS: &str =
    "id, identifier, label, content, plain_text, last_known_location";
pub(crate) const IMAGE_BLURB_COLUMNS: &str =
    "id, identifier, label, image, placeholder, last_known_location";

#[derive(FromRow)]
pub(crate) struct MenuRow {
    id: i64,
    title: String,
    url_slug: String,
    disabled: bool,
    parent_id: Option<i64>,
    redirect_to: Option<String>,
    position: i64,
}

impl From<MenuRow> for Menu {
    fn from(row: MenuRow) -> Self {
        Self {
            id: MenuId(row.id),
            title: row.title,
            url_slug: row.url_slug,
            disabled: row.disabled,
            parent_id: row.parent_id.map(MenuId),
            redirect_to: row.redirect_to,
            position: row.position,
        }
    }
}

#[derive(FromRow)]
pub(crate) struct SectionRow {
    id: i64,
    key: Option<String>,
    static_location: Option<String>,
    menu_id: Option<i64>,
}

impl From<SectionRow> for ContentSection {
    fn from(row: SectionRow) -> Self {
        Self {
            id: SectionId(row.id),
            key: row.key,
            static_location: row.static_location,
            menu_id: row.menu_id.map(MenuId),
        }
    }
}

#[derive(FromRow)]
pub(crate) struct BlockRow {
    id: i64,
    section_id: Option<i64>,
    disabled: bool,
    key: Option<String>,
    static_location: Option<String>,
    position: i64,
    kind: String,
    payload: String,
}

impl TryFrom<BlockRow> for ContentBlock {
    type Error = StoreError;

    fn try_from(row: BlockRow) -> Result<Self, Self::Error> {
        let payload: BlockPayload = serde_json::from_str(&row.payload).map_err(|e| {
            StoreError::new(StoreErrorKind::Other)
                .with_entity("content_block")
                .with_backend(BACKEND)
                .with_source(e)
        })?;
        if payload.kind_key() != row.kind {
            tracing::warn!(
                block = row.id,
                column = %row.kind,
                payload = payload.kind_key(),
                "Block kind column disagrees with payload"
            );
        }

        Ok(Self {
            id: BlockId(row.id),
            section_id: row.section_id.map(SectionId),
            disabled: row.disabled,
            key: row.key,
            static_location: row.static_location,
            position: row.position,
            payload,
        })
    }
}

#[derive(FromRow)]
pub(crate) struct BlurbRow {
    id: i64,
    identifier: Option<String>,
    label: Option<String>,
    content: Option<String>,
    plain_text: bool,
    last_known_location: Option<String>,
}

impl From<BlurbRow> for Blurb {
    fn from(row: BlurbRow) -> Self {
        Self {
            id: BlurbId(row.id),
            identifier: row.identifier,
            label: row.label,
            content: row.content,
            plain_text: row.plain_text,
            last_known_location: row.last_known_location,
        }
    }
}

#[derive(FromRow)]
pub(crate) struct ImageBlurbRow {
    id: i64,
    identifier: Option<String>,
    label: Option<String>,
    image: Option<String>,
    placeholder: Option<String>,
    last_known_location: Option<String>,
}

impl From<ImageBlurbRow> for ImageBlurb {
    fn from(row: ImageBlurbRow) -> Self {
        Self {
            id: ImageBlurbId(row.id),
            identifier: row.identifier,
            label: row.label,
            image: row.image,
            placeholder: row.placeholder,
            last_known_location: row.last_known_location,
        }
    }
}

/// Serialize a payload for the `payload` column.
pub(crate) fn encode_payload(payload: &BlockPayload) -> Result<String, StoreError> {
    serde_json::to_string(payload).map_err(|e| {
        StoreError::new(StoreErrorKind::Other)
            .with_entity("content_block")
            .with_backend(BACKEND)
            .with_source(e)
    })
}
