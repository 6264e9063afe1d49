//! In-memory sessions.
//!
//! A session is a random id in a cookie; the server keeps the preview flag
//! for it. Sessions idle for longer than the time-to-live are dropped, and
//! the least recently seen session makes room once the store is full.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use axum::http::HeaderMap;
use axum::http::header::COOKIE;
use cookie::{Cookie, SameSite};
use uuid::Uuid;

/// Idle time after which a session is forgotten.
const SESSION_TTL: Duration = Duration::from_secs(12 * 60 * 60);

/// Most sessions kept at once.
const MAX_SESSIONS: usize = 10_000;

/// Per-session state.
#[derive(Clone, Copy, Debug)]
struct Session {
    preview_mode: bool,
    last_seen: Instant,
    /// Access counter value at the last access; orders eviction.
    touched: u64,
}

/// Sessions keyed by id.
#[derive(Debug)]
pub(crate) struct SessionStore {
    sessions: Mutex<HashMap<Uuid, Session>>,
    accesses: AtomicU64,
    ttl: Duration,
    capacity: usize,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_limits(SESSION_TTL, MAX_SESSIONS)
    }
}

impl SessionStore {
    pub(crate) fn with_limits(ttl: Duration, capacity: usize) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            accesses: AtomicU64::new(0),
            ttl,
            capacity: capacity.max(1),
        }
    }

    /// Preview flag of `id`; unknown and expired sessions are not previewing.
    pub(crate) fn preview_mode(&self, id: Option<Uuid>) -> bool {
        let Some(id) = id else {
            return false;
        };
        let now = Instant::now();
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        match sessions.get_mut(&id) {
            Some(session) if now.duration_since(session.last_seen) < self.ttl => {
                session.last_seen = now;
                session.touched = self.accesses.fetch_add(1, Ordering::Relaxed);
                session.preview_mode
            }
            _ => false,
        }
    }

    /// Store the preview flag, starting a new session when `id` is unknown
    /// or expired.
    ///
    /// Returns the id the client should keep.
    pub(crate) fn set_preview_mode(&self, id: Option<Uuid>, preview_mode: bool) -> Uuid {
        let now = Instant::now();
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        sessions.retain(|_, session| now.duration_since(session.last_seen) < self.ttl);

        let id = match id.filter(|id| sessions.contains_key(id)) {
            Some(id) => id,
            None => {
                if sessions.len() >= self.capacity {
                    let oldest = sessions
                        .iter()
                        .min_by_key(|(_, session)| session.touched)
                        .map(|(id, _)| *id);
                    if let Some(oldest) = oldest {
                        sessions.remove(&oldest);
                        tracing::debug!(
                            session = %oldest,
                            "Session store full, evicted oldest session"
                        );
                    }
                }
                Uuid::new_v4()
            }
        };
        sessions.insert(
            id,
            Session {
                preview_mode,
                last_seen: now,
                touched: self.accesses.fetch_add(1, Ordering::Relaxed),
            },
        );
        id
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

/// Session id carried by the `name` cookie, if well-formed.
pub(crate) fn session_id(headers: &HeaderMap, name: &str) -> Option<Uuid> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == name)
        .and_then(|cookie| Uuid::parse_str(cookie.value()).ok())
}

/// `Set-Cookie` value for session `id`.
pub(crate) fn session_cookie(name: &str, id: Uuid) -> String {
    Cookie::build((name.to_owned(), id.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
        .to_string()
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_unknown_session_is_not_previewing() {
        let store = SessionStore::default();

        assert!(!store.preview_mode(None));
        assert!(!store.preview_mode(Some(Uuid::new_v4())));
    }

    #[test]
    fn test_set_preview_mode_keeps_known_session() {
        let store = SessionStore::default();
        let id = store.set_preview_mode(None, true);

        assert_eq!(store.set_preview_mode(Some(id), false), id);
        assert!(!store.preview_mode(Some(id)));
    }

    #[test]
    fn test_set_preview_mode_replaces_forged_session() {
        let store = SessionStore::default();
        let forged = Uuid::new_v4();

        let id = store.set_preview_mode(Some(forged), true);

        assert_ne!(id, forged);
        assert!(store.preview_mode(Some(id)));
        assert!(!store.preview_mode(Some(forged)));
    }

    #[test]
    fn test_full_store_evicts_least_recently_seen() {
        let store = SessionStore::with_limits(SESSION_TTL, 2);
        let first = store.set_preview_mode(None, true);
        let second = store.set_preview_mode(None, true);

        assert!(store.preview_mode(Some(first)));

        let third = store.set_preview_mode(None, true);

        assert_eq!(store.len(), 2);
        assert!(store.preview_mode(Some(first)));
        assert!(!store.preview_mode(Some(second)));
        assert!(store.preview_mode(Some(third)));
    }

    #[test]
    fn test_repeated_anonymous_toggles_stay_bounded() {
        let store = SessionStore::with_limits(SESSION_TTL, 16);

        for _ in 0..100 {
            store.set_preview_mode(None, true);
        }

        assert_eq!(store.len(), 16);
    }

    #[test]
    fn test_expired_sessions_are_dropped() {
        let store = SessionStore::with_limits(Duration::ZERO, 8);
        let stale = store.set_preview_mode(None, true);

        assert!(!store.preview_mode(Some(stale)));

        let fresh = store.set_preview_mode(Some(stale), true);
        assert_ne!(fresh, stale);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_session_id_from_cookie_header() {
        let id = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&format!("theme=dark; quire_session={id}")).unwrap(),
        );

        assert_eq!(session_id(&headers, "quire_session"), Some(id));
        assert_eq!(session_id(&headers, "other"), None);
    }

    #[test]
    fn test_session_id_rejects_garbage() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("quire_session=not-a-uuid"));

        assert_eq!(session_id(&headers, "quire_session"), None);
    }

    #[test]
    fn test_session_cookie_attributes() {
        let id = Uuid::nil();
        let cookie = session_cookie("quire_session", id);

        assert!(cookie.starts_with(&format!("quire_session={id}")));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Path=/"));
    }
}
