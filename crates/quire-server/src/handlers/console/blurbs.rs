//! Console blurb and image blurb endpoints.
//!
//! An update sent with `?next=` also records `next` as the blurb's last
//! known location.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use quire_store::{Blurb, BlurbId, ImageBlurb, ImageBlurbId};
use serde::{Deserialize, Serialize};

use crate::error::ServerError;
use crate::handlers::{NextQuery, Saved};
use crate::state::AppState;

#[derive(Serialize)]
pub(crate) struct BlurbItem {
    #[serde(flatten)]
    blurb: Blurb,
    display_name: String,
    /// Link to the blurb where it was last seen.
    href: String,
    update_path: String,
}

impl BlurbItem {
    fn new(state: &AppState, blurb: Blurb) -> Self {
        Self {
            display_name: blurb.display_name(),
            href: blurb.href(),
            update_path: state.site.paths().blurb_update(blurb.id),
            blurb,
        }
    }
}

/// Handle GET {console}/blurbs.
pub(crate) async fn list_blurbs(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<BlurbItem>>, ServerError> {
    let blurbs = state.site.blurbs().await?;
    Ok(Json(
        blurbs
            .into_iter()
            .map(|blurb| BlurbItem::new(&state, blurb))
            .collect(),
    ))
}

/// Handle GET {console}/blurbs/{id}.
pub(crate) async fn get_blurb(
    Path(id): Path<BlurbId>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<BlurbItem>, ServerError> {
    let blurb = state.site.blurb_by_id(id).await?;
    Ok(Json(BlurbItem::new(&state, blurb)))
}

#[derive(Debug, Deserialize)]
pub(crate) struct BlurbForm {
    /// Empty string marks the blurb as intentionally blank.
    #[serde(default)]
    content: String,
}

/// Handle PUT {console}/blurbs/{id}.
pub(crate) async fn update_blurb(
    Path(id): Path<BlurbId>,
    State(state): State<Arc<AppState>>,
    Query(next): Query<NextQuery>,
    Json(form): Json<BlurbForm>,
) -> Result<Json<Saved<BlurbItem>>, ServerError> {
    let blurb = state
        .site
        .update_blurb(id, form.content, next.next.as_deref())
        .await?;
    Ok(Json(Saved {
        item: BlurbItem::new(&state, blurb),
        next: next.or(state.site.paths().blurb_list()),
    }))
}

#[derive(Serialize)]
pub(crate) struct ImageBlurbItem {
    #[serde(flatten)]
    image_blurb: ImageBlurb,
    display_name: String,
    src: Option<String>,
    href: String,
    update_path: String,
}

impl ImageBlurbItem {
    fn new(state: &AppState, image_blurb: ImageBlurb) -> Self {
        Self {
            display_name: image_blurb.display_name(),
            src: state.site.image_src(&image_blurb),
            href: image_blurb.href(),
            update_path: state.site.paths().image_blurb_update(image_blurb.id),
            image_blurb,
        }
    }
}

/// Handle GET {console}/image-blurbs.
pub(crate) async fn list_image_blurbs(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ImageBlurbItem>>, ServerError> {
    let image_blurbs = state.site.image_blurbs().await?;
    Ok(Json(
        image_blurbs
            .into_iter()
            .map(|image_blurb| ImageBlurbItem::new(&state, image_blurb))
            .collect(),
    ))
}

/// Handle GET {console}/image-blurbs/{id}.
pub(crate) async fn get_image_blurb(
    Path(id): Path<ImageBlurbId>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<ImageBlurbItem>, ServerError> {
    let image_blurb = state.site.image_blurb_by_id(id).await?;
    Ok(Json(ImageBlurbItem::new(&state, image_blurb)))
}

#[derive(Debug, Deserialize)]
pub(crate) struct ImageBlurbForm {
    /// Image URL; `null` or empty clears it.
    image: Option<String>,
}

/// Handle PUT {console}/image-blurbs/{id}.
pub(crate) async fn update_image_blurb(
    Path(id): Path<ImageBlurbId>,
    State(state): State<Arc<AppState>>,
    Query(next): Query<NextQuery>,
    Json(form): Json<ImageBlurbForm>,
) -> Result<Json<Saved<ImageBlurbItem>>, ServerError> {
    let image_blurb = state
        .site
        .update_image_blurb(id, form.image, next.next.as_deref())
        .await?;
    Ok(Json(Saved {
        item: ImageBlurbItem::new(&state, image_blurb),
        next: next.or(state.site.paths().image_blurb_list()),
    }))
}
