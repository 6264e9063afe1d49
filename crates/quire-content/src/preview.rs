//! Preview mode.
//!
//! A per-session flag letting operators see disabled content. The session
//! store lives with the HTTP layer; these helpers decide the new value and
//! where to send the operator afterwards.

use crate::paths::ConsolePaths;

/// New preview flag for a toggle request.
///
/// A `mode` of `"true"` turns the flag on and any other non-empty `mode`
/// turns it off; an absent or empty `mode` flips `previous`.
#[must_use]
pub fn apply(previous: bool, mode: Option<&str>) -> bool {
    match mode.filter(|m| !m.is_empty()) {
        Some(mode) => mode == "true",
        None => !previous,
    }
}

/// Where to redirect after a toggle: `next`, else the console index.
#[must_use]
pub fn redirect_target(next: Option<&str>, paths: &ConsolePaths) -> String {
    match next.filter(|n| !n.is_empty()) {
        Some(next) => next.to_owned(),
        None => {
            tracing::warn!("Preview mode toggled without next url");
            paths.index()
        }
    }
}
