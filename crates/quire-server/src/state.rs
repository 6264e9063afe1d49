//! Application state.
//!
//! Shared state for all request handlers.

use axum::http::HeaderMap;
use quire_content::Site;
use uuid::Uuid;

use crate::session::{self, SessionStore};

/// Application state shared across all handlers.
pub(crate) struct AppState {
    pub(crate) site: Site,
    pub(crate) sessions: SessionStore,
    /// Name of the session cookie.
    pub(crate) cookie_name: String,
}

impl AppState {
    pub(crate) fn new(site: Site, cookie_name: impl Into<String>) -> Self {
        Self {
            site,
            sessions: SessionStore::default(),
            cookie_name: cookie_name.into(),
        }
    }

    pub(crate) fn session_id(&self, headers: &HeaderMap) -> Option<Uuid> {
        session::session_id(headers, &self.cookie_name)
    }

    /// Preview flag of the requesting session.
    pub(crate) fn preview_mode(&self, headers: &HeaderMap) -> bool {
        self.sessions.preview_mode(self.session_id(headers))
    }

    pub(crate) fn session_cookie(&self, id: Uuid) -> String {
        session::session_cookie(&self.cookie_name, id)
    }
}
