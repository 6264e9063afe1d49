//! HTTP request handlers.

pub(crate) mod console;
pub(crate) mod lookups;
pub(crate) mod navigation;
pub(crate) mod pages;

use serde::{Deserialize, Serialize};

/// `?location=` on template lookups: the page the lookup renders on.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct LocationQuery {
    pub(crate) location: Option<String>,
}

/// `?next=` on console writes: where the operator goes afterwards.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct NextQuery {
    pub(crate) next: Option<String>,
}

impl NextQuery {
    /// `next` when given, else `fallback`.
    pub(crate) fn or(&self, fallback: String) -> String {
        self.next
            .as_deref()
            .filter(|next| !next.is_empty())
            .map_or(fallback, str::to_owned)
    }
}

/// Result of a console write.
#[derive(Debug, Serialize)]
pub(crate) struct Saved<T> {
    pub(crate) item: T,
    /// Page to show next.
    pub(crate) next: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_or_fallback() {
        let given = NextQuery {
            next: Some("/about".to_owned()),
        };
        let blank = NextQuery {
            next: Some(String::new()),
        };

        assert_eq!(given.or("/console/menus".to_owned()), "/about");
        assert_eq!(blank.or("/console/menus".to_owned()), "/console/menus");
        assert_eq!(NextQuery::default().or("/console/".to_owned()), "/console/");
    }
}
