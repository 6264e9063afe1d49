//! Block kinds.
//!
//! A [`BlockKind`] describes one concrete variant of [`BlockPayload`]: how it
//! is labelled, which template renders it and where the console edits it.
//! Stored blocks carry only their payload; everything kind-specific is
//! reached through the descriptor looked up in the
//! [`BlockRegistry`](crate::BlockRegistry).

use convert_case::{Case, Casing};
use quire_store::{BlockId, BlockPayload};

use crate::paths::ConsolePaths;

/// Descriptor of a concrete block kind.
pub trait BlockKind: Send + Sync {
    /// Rust-style type name, e.g. `RichTextBlock`. Label and key derive from it.
    fn type_name(&self) -> &'static str;

    /// Template that renders blocks of this kind.
    fn template_name(&self) -> &'static str;

    /// Payload of a freshly created block.
    fn default_payload(&self) -> BlockPayload;

    /// Console page creating a block of this kind, if the console supports it.
    fn create_path(&self, paths: &ConsolePaths) -> Option<String>;

    /// Console page editing block `id`, if the console supports it.
    fn update_path(&self, paths: &ConsolePaths, id: BlockId) -> Option<String>;

    /// Human-readable label ("Rich Text Block").
    fn label(&self) -> String {
        self.type_name().to_case(Case::Title)
    }

    /// Registry key ("`rich_text_block`"), also the payload tag.
    fn type_key(&self) -> String {
        self.type_name().to_case(Case::Snake)
    }
}

/// Formatted text authored in the console.
#[derive(Clone, Copy, Debug, Default)]
pub struct RichTextBlock;

impl BlockKind for RichTextBlock {
    fn type_name(&self) -> &'static str {
        "RichTextBlock"
    }

    fn template_name(&self) -> &'static str {
        "content/rich_text_block.html"
    }

    fn default_payload(&self) -> BlockPayload {
        BlockPayload::RichTextBlock {
            content: String::new(),
        }
    }

    fn create_path(&self, paths: &ConsolePaths) -> Option<String> {
        Some(paths.rich_text_block_create())
    }

    fn update_path(&self, paths: &ConsolePaths, id: BlockId) -> Option<String> {
        Some(paths.rich_text_block_update(id))
    }
}

/// Image carousel placeholder. It has no editing surface yet.
#[derive(Clone, Copy, Debug, Default)]
pub struct CarouselBlock;

impl BlockKind for CarouselBlock {
    fn type_name(&self) -> &'static str {
        "CarouselBlock"
    }

    fn template_name(&self) -> &'static str {
        "content/carousel_block.html"
    }

    fn default_payload(&self) -> BlockPayload {
        BlockPayload::CarouselBlock
    }

    fn create_path(&self, _paths: &ConsolePaths) -> Option<String> {
        None
    }

    fn update_path(&self, _paths: &ConsolePaths, _id: BlockId) -> Option<String> {
        None
    }
}
