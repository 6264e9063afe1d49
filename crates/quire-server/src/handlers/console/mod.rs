//! Operator console endpoints.
//!
//! JSON counterparts of the console pages. Writes answer with the saved item
//! and the page to show next: `?next=` when given, else the item's list page.

pub(crate) mod blurbs;
pub(crate) mod content;
pub(crate) mod menus;

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::http::header::SET_COOKIE;
use axum::response::{IntoResponse, Redirect, Response};
use quire_content::{ConsoleOverview, preview};
use serde::{Deserialize, Serialize};

use crate::error::ServerError;
use crate::state::AppState;

/// Links from the console index.
#[derive(Serialize)]
struct ConsoleLinks {
    menus: String,
    content_sections: String,
    content_blocks: String,
    blurbs: String,
    image_blurbs: String,
    toggle_preview_mode: String,
}

/// Response for GET {console}/.
#[derive(Serialize)]
pub(crate) struct IndexResponse {
    overview: ConsoleOverview,
    preview_mode: bool,
    links: ConsoleLinks,
}

/// Handle GET {console}/.
pub(crate) async fn index(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<IndexResponse>, ServerError> {
    let paths = state.site.paths();
    Ok(Json(IndexResponse {
        overview: state.site.console_overview().await?,
        preview_mode: state.preview_mode(&headers),
        links: ConsoleLinks {
            menus: paths.menu_list(),
            content_sections: paths.content_section_list(),
            content_blocks: paths.content_block_list(),
            blurbs: paths.blurb_list(),
            image_blurbs: paths.image_blurb_list(),
            toggle_preview_mode: paths.toggle_preview_mode(),
        },
    }))
}

#[derive(Debug, Deserialize)]
pub(crate) struct ToggleQuery {
    /// `"true"` or `"false"` to set the flag; absent to flip it.
    mode: Option<String>,
    next: Option<String>,
}

/// Handle GET {console}/toggle-preview-mode.
pub(crate) async fn toggle_preview_mode(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<ToggleQuery>,
) -> Response {
    let session = state.session_id(&headers);
    let preview_mode = preview::apply(state.sessions.preview_mode(session), query.mode.as_deref());
    let session = state.sessions.set_preview_mode(session, preview_mode);
    tracing::info!(preview_mode, "Preview mode set");

    let target = preview::redirect_target(query.next.as_deref(), state.site.paths());
    (
        [(SET_COOKIE, state.session_cookie(session))],
        Redirect::to(&target),
    )
        .into_response()
}
