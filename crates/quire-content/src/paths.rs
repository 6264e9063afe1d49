//! Console locations.
//!
//! Menus, sections, blocks and blurbs link back to the console pages that
//! edit them. All paths hang off one configurable prefix.

use std::fmt::Display;

/// Builds console paths under a prefix such as `/console`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConsolePaths {
    prefix: String,
}

impl ConsolePaths {
    /// Create paths under `prefix`. A trailing slash is ignored.
    #[must_use]
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.trim_end_matches('/').to_owned(),
        }
    }

    /// Prefix without trailing slash (empty when mounted at the root).
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    fn join(&self, tail: &str) -> String {
        format!("{}/{tail}", self.prefix)
    }

    fn item(&self, collection: &str, id: impl Display) -> String {
        format!("{}/{collection}/{id}", self.prefix)
    }

    #[must_use]
    pub fn index(&self) -> String {
        self.join("")
    }

    #[must_use]
    pub fn toggle_preview_mode(&self) -> String {
        self.join("toggle-preview-mode")
    }

    #[must_use]
    pub fn menu_list(&self) -> String {
        self.join("menus")
    }

    #[must_use]
    pub fn menu_update(&self, id: impl Display) -> String {
        self.item("menus", id)
    }

    #[must_use]
    pub fn submenu_create(&self, parent: impl Display) -> String {
        format!("{}?parent={parent}", self.join("submenus"))
    }

    #[must_use]
    pub fn submenu_update(&self, id: impl Display) -> String {
        self.item("submenus", id)
    }

    #[must_use]
    pub fn content_section_list(&self) -> String {
        self.join("content-sections")
    }

    #[must_use]
    pub fn content_section_update(&self, id: impl Display) -> String {
        self.item("content-sections", id)
    }

    #[must_use]
    pub fn content_block_list(&self) -> String {
        self.join("content-blocks")
    }

    #[must_use]
    pub fn rich_text_block_create(&self) -> String {
        self.join("rich-text-blocks")
    }

    #[must_use]
    pub fn rich_text_block_update(&self, id: impl Display) -> String {
        self.item("rich-text-blocks", id)
    }

    #[must_use]
    pub fn blurb_list(&self) -> String {
        self.join("blurbs")
    }

    #[must_use]
    pub fn blurb_update(&self, id: impl Display) -> String {
        self.item("blurbs", id)
    }

    #[must_use]
    pub fn image_blurb_list(&self) -> String {
        self.join("image-blurbs")
    }

    #[must_use]
    pub fn image_blurb_update(&self, id: impl Display) -> String {
        self.item("image-blurbs", id)
    }
}

impl Default for ConsolePaths {
    fn default() -> Self {
        Self::new("/console")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prefix() {
        let paths = ConsolePaths::default();

        assert_eq!(paths.index(), "/console/");
        assert_eq!(paths.menu_update(4), "/console/menus/4");
        assert_eq!(paths.submenu_create(4), "/console/submenus?parent=4");
    }

    #[test]
    fn test_trailing_slash_and_root_prefix() {
        assert_eq!(ConsolePaths::new("/admin/").blurb_list(), "/admin/blurbs");
        assert_eq!(ConsolePaths::new("").index(), "/");
        assert_eq!(ConsolePaths::new("/").image_blurb_update(2), "/image-blurbs/2");
    }
}
