//! Console section and block endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use quire_content::{BlockView, ContentError, Site};
use quire_store::{BlockId, BlockPayload, ContentBlock, ContentSection, SectionId};
use serde::{Deserialize, Serialize};

use crate::error::ServerError;
use crate::handlers::console::menus::MoveForm;
use crate::handlers::{NextQuery, Saved};
use crate::state::AppState;

#[derive(Serialize)]
pub(crate) struct SectionListItem {
    section: ContentSection,
    update_path: String,
}

/// Handle GET {console}/content-sections. Lists static sections only.
pub(crate) async fn list_sections(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<SectionListItem>>, ServerError> {
    let paths = state.site.paths();
    let items = state
        .site
        .static_sections()
        .await?
        .into_iter()
        .map(|section| SectionListItem {
            update_path: paths.content_section_update(section.id),
            section,
        })
        .collect();
    Ok(Json(items))
}

#[derive(Serialize)]
pub(crate) struct SectionDetail {
    section: ContentSection,
    display_name: String,
    blocks: Vec<BlockView>,
    rich_text_block_create_path: String,
    list_path: String,
}

fn describe_all(site: &Site, blocks: &[ContentBlock]) -> Result<Vec<BlockView>, ContentError> {
    blocks.iter().map(|block| site.describe_block(block)).collect()
}

/// Handle GET {console}/content-sections/{id}.
pub(crate) async fn get_section(
    Path(id): Path<SectionId>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<SectionDetail>, ServerError> {
    let site = &state.site;
    let section = site.section(id).await?;
    let listed = site.list_blocks(&section).await?;

    Ok(Json(SectionDetail {
        display_name: site.section_display_name(&section).await?,
        blocks: describe_all(site, &listed.blocks)?,
        rich_text_block_create_path: format!(
            "{}?section={id}",
            site.paths().rich_text_block_create()
        ),
        list_path: site.section_console_list_path(&section).await?,
        section,
    }))
}

/// Handle DELETE {console}/content-sections/{id}.
pub(crate) async fn delete_section(
    Path(id): Path<SectionId>,
    State(state): State<Arc<AppState>>,
    Query(next): Query<NextQuery>,
) -> Result<Json<Saved<ContentSection>>, ServerError> {
    let site = &state.site;
    let fallback = site.section_console_list_path(&site.section(id).await?).await?;
    let deleted = site.delete_section(id).await?;
    Ok(Json(Saved {
        item: deleted,
        next: next.or(fallback),
    }))
}

/// Handle GET {console}/content-blocks. Lists static blocks only.
pub(crate) async fn list_blocks(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<BlockView>>, ServerError> {
    let blocks = state.site.static_blocks().await?;
    Ok(Json(describe_all(&state.site, &blocks)?))
}

#[derive(Serialize)]
pub(crate) struct BlockDetail {
    #[serde(flatten)]
    block: BlockView,
    display_name: String,
    list_path: String,
}

/// Handle GET {console}/content-blocks/{id}.
pub(crate) async fn get_block(
    Path(id): Path<BlockId>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<BlockDetail>, ServerError> {
    let site = &state.site;
    let block = site.block(id).await?;
    Ok(Json(BlockDetail {
        display_name: site.block_display_name(&block).await?,
        list_path: site.block_console_list_path(&block).await?,
        block: site.describe_block(&block)?,
    }))
}

/// Handle DELETE {console}/content-blocks/{id}.
pub(crate) async fn delete_block(
    Path(id): Path<BlockId>,
    State(state): State<Arc<AppState>>,
    Query(next): Query<NextQuery>,
) -> Result<Json<Saved<ContentBlock>>, ServerError> {
    let site = &state.site;
    let fallback = site.block_console_list_path(&site.block(id).await?).await?;
    let deleted = site.delete_block(id).await?;
    Ok(Json(Saved {
        item: deleted,
        next: next.or(fallback),
    }))
}

#[derive(Debug, Deserialize)]
pub(crate) struct DisabledForm {
    disabled: bool,
}

/// Handle PUT {console}/content-blocks/{id}/disabled.
pub(crate) async fn set_block_disabled(
    Path(id): Path<BlockId>,
    State(state): State<Arc<AppState>>,
    Query(next): Query<NextQuery>,
    Json(form): Json<DisabledForm>,
) -> Result<Json<Saved<BlockView>>, ServerError> {
    let site = &state.site;
    let block = site.set_block_disabled(id, form.disabled).await?;
    let fallback = site.block_console_list_path(&block).await?;
    Ok(Json(Saved {
        item: site.describe_block(&block)?,
        next: next.or(fallback),
    }))
}

/// Handle POST {console}/content-blocks/{id}/move.
pub(crate) async fn move_block(
    Path(id): Path<BlockId>,
    State(state): State<Arc<AppState>>,
    Json(form): Json<MoveForm>,
) -> Result<StatusCode, ServerError> {
    state.site.move_block(id, form.position).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreateBlockQuery {
    section: Option<SectionId>,
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RichTextForm {
    #[serde(default)]
    content: String,
}

/// Handle POST {console}/rich-text-blocks?section={id}.
pub(crate) async fn create_rich_text_block(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CreateBlockQuery>,
    Json(form): Json<RichTextForm>,
) -> Result<(StatusCode, Json<Saved<BlockView>>), ServerError> {
    let section = query
        .section
        .ok_or_else(|| ServerError::BadRequest("Missing query parameter: section".to_owned()))?;
    let site = &state.site;
    let payload = BlockPayload::RichTextBlock {
        content: form.content,
    };
    let block = match site.create_block(section, "rich_text_block", Some(payload)).await {
        Ok(block) => block,
        Err(ContentError::NotFound { .. }) => {
            return Err(ServerError::BadRequest(format!(
                "Could not find section {section}"
            )));
        }
        Err(e) => return Err(e.into()),
    };

    let fallback = site.block_console_list_path(&block).await?;
    let next = NextQuery { next: query.next }.or(fallback);
    Ok((
        StatusCode::CREATED,
        Json(Saved {
            item: site.describe_block(&block)?,
            next,
        }),
    ))
}

/// Handle PUT {console}/rich-text-blocks/{id}.
pub(crate) async fn update_rich_text_block(
    Path(id): Path<BlockId>,
    State(state): State<Arc<AppState>>,
    Query(next): Query<NextQuery>,
    Json(form): Json<RichTextForm>,
) -> Result<Json<Saved<BlockView>>, ServerError> {
    let site = &state.site;
    let block = site.update_rich_text(id, form.content).await?;
    let fallback = site.block_console_list_path(&block).await?;
    Ok(Json(Saved {
        item: site.describe_block(&block)?,
        next: next.or(fallback),
    }))
}
