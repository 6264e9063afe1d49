//! Pages API endpoint.
//!
//! Resolves `/{root}/{child}` to the page context: current menu, its section
//! and blocks, the navigation list and the session's preview flag.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use quire_content::PageContext;
use serde::Deserialize;

use crate::error::ServerError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct PageQuery {
    /// Request path for active navigation entries; defaults to the menu path
    /// under the menu base URL.
    path: Option<String>,
}

/// Handle GET /api/pages/ (index page).
pub(crate) async fn get_root_page(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<PageQuery>,
) -> Result<Json<PageContext>, ServerError> {
    page(&state, &headers, "", query).await
}

/// Handle GET /api/pages/{*menu_path}.
pub(crate) async fn get_page(
    Path(menu_path): Path<String>,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<PageQuery>,
) -> Result<Json<PageContext>, ServerError> {
    page(&state, &headers, &menu_path, query).await
}

async fn page(
    state: &AppState,
    headers: &HeaderMap,
    menu_path: &str,
    query: PageQuery,
) -> Result<Json<PageContext>, ServerError> {
    let request_path = query.path.unwrap_or_else(|| {
        let base = state.site.config().menu_base_url.trim_end_matches('/');
        format!("{base}/{}", menu_path.trim_matches('/'))
    });
    let context = state
        .site
        .page_context(menu_path, &request_path, state.preview_mode(headers))
        .await?;
    Ok(Json(context))
}
