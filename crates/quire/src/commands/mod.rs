//! CLI command implementations.

pub(crate) mod menus;
pub(crate) mod serve;

pub(crate) use menus::MenusArgs;
pub(crate) use serve::ServeArgs;
