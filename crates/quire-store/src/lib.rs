//! Storage abstraction for Quire content.
//!
//! This crate provides a [`Store`] trait for persisting menus, content sections,
//! content blocks and blurbs independently of the backing database. This enables:
//!
//! - **Unit testing** without a database
//! - **Backend flexibility** (`SQLite` via `quire-store-sqlite`, in-memory)
//! - **Clean separation** between hierarchy rules and I/O
//!
//! # Architecture
//!
//! The crate provides:
//! - Entity types ([`Menu`], [`ContentSection`], [`ContentBlock`], [`Blurb`], [`ImageBlurb`])
//! - [`Store`] trait with lookups, inserts, updates and cascading deletes
//! - [`MemoryStore`] for testing (behind `mock` feature flag)

#[cfg(feature = "mock")]
mod memory;
mod model;
mod store;

#[cfg(feature = "mock")]
pub use memory::MemoryStore;
pub use model::{
    BlockId, BlockPayload, Blurb, BlurbId, ContentBlock, ContentSection, ImageBlurb, ImageBlurbId,
    Menu, MenuId, NewBlock, NewBlurb, NewImageBlurb, NewMenu, NewSection, SectionId,
};
pub use store::{Store, StoreError, StoreErrorKind};
