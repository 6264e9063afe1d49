//! Navigation API endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use quire_content::NavNode;
use serde::{Deserialize, Serialize};

use crate::error::ServerError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub(crate) struct NavigationQuery {
    /// Request path used to mark active entries.
    path: Option<String>,
}

/// Response for GET /api/navigation.
#[derive(Serialize)]
pub(crate) struct NavigationResponse {
    items: Vec<NavNode>,
    preview_mode: bool,
}

/// Handle GET /api/navigation.
pub(crate) async fn get_navigation(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<NavigationQuery>,
) -> Result<Json<NavigationResponse>, ServerError> {
    let items = state.site.navigation(query.path.as_deref()).await?;
    Ok(Json(NavigationResponse {
        items,
        preview_mode: state.preview_mode(&headers),
    }))
}
