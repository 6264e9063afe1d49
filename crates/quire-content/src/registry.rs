//! Registry of block kinds.
//!
//! Maps a type key (`rich_text_block`) to its [`BlockKind`] descriptor. Built
//! once at startup; templates and console forms refer to kinds by key.

use std::collections::BTreeMap;
use std::sync::Arc;

use quire_store::ContentBlock;

use crate::error::ContentError;
use crate::kind::{BlockKind, CarouselBlock, RichTextBlock};

/// Type key to kind descriptor.
#[derive(Clone, Default)]
pub struct BlockRegistry {
    kinds: BTreeMap<String, Arc<dyn BlockKind>>,
}

impl BlockRegistry {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the rich text and carousel kinds.
    #[must_use]
    pub fn with_builtin_kinds() -> Self {
        let mut registry = Self::new();
        registry.insert(RichTextBlock);
        registry.insert(CarouselBlock);
        registry
    }

    /// Register `kind` under its type key, replacing any previous entry.
    ///
    /// # Errors
    ///
    /// [`ContentError::Configuration`] when the kind's default payload is
    /// tagged with another type key; its blocks could not be found again.
    pub fn register(&mut self, kind: impl BlockKind + 'static) -> Result<(), ContentError> {
        let key = kind.type_key();
        let payload = kind.default_payload();
        if payload.kind_key() != key {
            return Err(ContentError::Configuration(format!(
                "Block kind {key} creates {} payloads",
                payload.kind_key()
            )));
        }
        self.insert(kind);
        Ok(())
    }

    fn insert(&mut self, kind: impl BlockKind + 'static) {
        let key = kind.type_key();
        if self.kinds.insert(key.clone(), Arc::new(kind)).is_some() {
            tracing::warn!(type_key = %key, "Block kind registered twice, keeping the latest");
        }
    }

    /// Look up a kind by type key.
    ///
    /// # Errors
    ///
    /// [`ContentError::Configuration`] when no kind is registered under `type_key`.
    pub fn get(&self, type_key: &str) -> Result<&dyn BlockKind, ContentError> {
        self.kinds
            .get(type_key)
            .map(|kind| &**kind)
            .ok_or_else(|| ContentError::Configuration(format!("Unknown block type: {type_key}")))
    }

    /// Descriptor of a stored block's kind.
    ///
    /// # Errors
    ///
    /// [`ContentError::Configuration`] when the block's kind is not registered.
    pub fn kind_of(&self, block: &ContentBlock) -> Result<&dyn BlockKind, ContentError> {
        self.get(block.kind_key())
    }

    /// Registered kinds in type key order.
    pub fn kinds(&self) -> impl Iterator<Item = &dyn BlockKind> {
        self.kinds.values().map(|kind| &**kind)
    }
}

impl std::fmt::Debug for BlockRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.kinds.keys()).finish()
    }
}
