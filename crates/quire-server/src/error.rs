//! Error types for the HTTP server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use quire_content::ContentError;
use serde_json::json;

/// Server error type.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Content operation failed.
    #[error(transparent)]
    Content(#[from] ContentError),

    /// Request is missing a required parameter or carries a malformed one.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::Content(ContentError::Validation { field, message }) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({"error": message, "field": field}),
            ),
            Self::Content(ContentError::NotFound { what }) => (
                StatusCode::NOT_FOUND,
                json!({"error": "Not found", "what": what}),
            ),
            Self::Content(e @ (ContentError::Configuration(_) | ContentError::Store(_))) => {
                tracing::error!(error = %e, "Content operation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({"error": e.to_string()}),
                )
            }
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, json!({"error": message})),
        };

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quire_store::StoreError;

    fn status(err: ContentError) -> StatusCode {
        ServerError::from(err).into_response().status()
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            status(ContentError::Validation {
                field: Some("url_slug"),
                message: "taken".to_owned(),
            }),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status(ContentError::NotFound {
                what: "menu 7".to_owned(),
            }),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status(ContentError::Configuration("Unknown block type: video".to_owned())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status(ContentError::Store(StoreError::already_exists("blurb"))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ServerError::BadRequest("missing parent".to_owned())
                .into_response()
                .status(),
            StatusCode::BAD_REQUEST
        );
    }
}
