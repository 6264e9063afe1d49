//! Template lookups.
//!
//! Endpoints a renderer calls while rendering a page: static sections and
//! blocks, blurbs and image blurbs. Each creates its row on first use and
//! returns what the template needs to render and link it.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use quire_content::{BLURB_TEMPLATE, BlockView, SECTION_TEMPLATE};
use quire_store::{Blurb, ContentSection, ImageBlurb};
use serde::{Deserialize, Serialize};

use crate::error::ServerError;
use crate::handlers::LocationQuery;
use crate::state::AppState;

/// Response for GET /api/static/sections/{key}.
#[derive(Serialize)]
pub(crate) struct StaticSectionResponse {
    section: ContentSection,
    blocks: Vec<BlockView>,
    template: &'static str,
    update_path: String,
}

/// Handle GET /api/static/sections/{key}.
pub(crate) async fn get_static_section(
    Path(key): Path<String>,
    State(state): State<Arc<AppState>>,
    Query(query): Query<LocationQuery>,
) -> Result<Json<StaticSectionResponse>, ServerError> {
    let site = &state.site;
    let section = site.static_section(&key, query.location.as_deref()).await?;
    let listed = site.list_blocks(&section).await?;
    let blocks = listed
        .blocks
        .iter()
        .map(|block| site.describe_block(block))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(StaticSectionResponse {
        update_path: site.paths().content_section_update(section.id),
        section,
        blocks,
        template: SECTION_TEMPLATE,
    }))
}

/// Handle GET /api/static/blocks/{type_key}/{key}.
pub(crate) async fn get_static_block(
    Path((type_key, key)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
    Query(query): Query<LocationQuery>,
) -> Result<Json<BlockView>, ServerError> {
    let site = &state.site;
    let block = site
        .static_block(&key, &type_key, query.location.as_deref())
        .await?;
    Ok(Json(site.describe_block(&block)?))
}

#[derive(Debug, Deserialize)]
pub(crate) struct BlurbQuery {
    #[serde(default)]
    plain_text: bool,
    location: Option<String>,
}

/// Response for GET /api/blurbs/{identifier}.
#[derive(Serialize)]
pub(crate) struct BlurbResponse {
    blurb: Blurb,
    /// Content was set at least once.
    authored: bool,
    html_id: String,
    template: &'static str,
    update_path: String,
}

/// Handle GET /api/blurbs/{*identifier}.
pub(crate) async fn get_blurb(
    Path(identifier): Path<String>,
    State(state): State<Arc<AppState>>,
    Query(query): Query<BlurbQuery>,
) -> Result<Json<BlurbResponse>, ServerError> {
    let site = &state.site;
    let blurb = site
        .blurb(&identifier, query.plain_text, query.location.as_deref())
        .await?;

    Ok(Json(BlurbResponse {
        authored: blurb.is_authored(),
        html_id: blurb.html_id(),
        template: BLURB_TEMPLATE,
        update_path: site.paths().blurb_update(blurb.id),
        blurb,
    }))
}

#[derive(Debug, Deserialize)]
pub(crate) struct ImageBlurbQuery {
    /// Static path shown until an image is uploaded.
    placeholder: Option<String>,
    location: Option<String>,
}

/// Response for GET /api/image-blurbs/{identifier}.
#[derive(Serialize)]
pub(crate) struct ImageBlurbResponse {
    image_blurb: ImageBlurb,
    /// Uploaded image, else the placeholder under the static URL.
    src: Option<String>,
    html_id: String,
    update_path: String,
}

/// Handle GET /api/image-blurbs/{*identifier}.
pub(crate) async fn get_image_blurb(
    Path(identifier): Path<String>,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ImageBlurbQuery>,
) -> Result<Json<ImageBlurbResponse>, ServerError> {
    let site = &state.site;
    let image_blurb = site
        .image_blurb(
            &identifier,
            query.placeholder.as_deref(),
            query.location.as_deref(),
        )
        .await?;

    Ok(Json(ImageBlurbResponse {
        src: site.image_src(&image_blurb),
        html_id: image_blurb.html_id(),
        update_path: site.paths().image_blurb_update(image_blurb.id),
        image_blurb,
    }))
}
