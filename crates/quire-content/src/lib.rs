//! Menus, content sections and blocks for Quire.
//!
//! This crate provides:
//! - [`Site`]: the content service over a [`Store`](quire_store::Store)
//! - The two-level menu tree with path resolution
//! - Lazily created sections, static blocks and blurbs
//! - [`BlockRegistry`] mapping type keys to [`BlockKind`] descriptors
//! - Navigation list building and preview mode helpers
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use quire_content::{Site, SiteConfig};
//! use quire_store_sqlite::SqliteStore;
//!
//! let store = Arc::new(SqliteStore::connect("sqlite://content.db").await?);
//! let site = Site::new(store, SiteConfig::default());
//!
//! let page = site.page_context("about/team", "/about/team", false).await?;
//! for block in &page.blocks {
//!     println!("{} -> {}", block.label, block.template);
//! }
//! ```

/// Insert attempts before a get-or-create gives up.
const GET_OR_CREATE_ATTEMPTS: u32 = 3;

/// Fetch a row, inserting it when missing.
///
/// A unique violation on insert means a concurrent request created the row
/// first; the loop then fetches that row.
macro_rules! get_or_create {
    ($entity:literal, fetch: $fetch:expr, insert: $insert:expr $(,)?) => {{
        let mut row = None;
        for attempt in 1..=$crate::GET_OR_CREATE_ATTEMPTS {
            if let Some(existing) = $fetch.await? {
                row = Some(existing);
                break;
            }
            match $insert.await {
                Ok(created) => {
                    tracing::debug!(entity = $entity, "Created on first request");
                    row = Some(created);
                    break;
                }
                Err(err) if err.is_already_exists() => {
                    tracing::debug!(entity = $entity, attempt, "Lost insert race, fetching again");
                }
                Err(err) => return Err(err.into()),
            }
        }
        row.ok_or_else(|| {
            $crate::ContentError::Store(quire_store::StoreError::already_exists($entity))
        })
    }};
}

mod blurb;
mod composition;
mod console;
mod error;
mod kind;
mod menu;
mod navigation;
mod page;
mod paths;
pub mod preview;
mod registry;
mod site;

pub use blurb::BLURB_TEMPLATE;
pub use composition::{BlockView, SECTION_TEMPLATE, SectionBlocks};
pub use console::ConsoleOverview;
pub use error::ContentError;
pub use kind::{BlockKind, CarouselBlock, RichTextBlock};
pub use menu::ResolvedMenu;
pub use navigation::{NavNode, build_nav_list, match_current};
pub use page::{PageContext, parse_menu_path};
pub use paths::ConsolePaths;
pub use registry::BlockRegistry;
pub use site::{Site, SiteConfig};
