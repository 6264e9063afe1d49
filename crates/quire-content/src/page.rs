//! Page resolution.
//!
//! Turns a request for `/{root}/{child}` into everything a page template
//! needs: the current menu, its section and blocks, and the navigation list.

use serde::Serialize;

use crate::composition::{BlockView, SectionBlocks};
use crate::error::ContentError;
use crate::menu::ResolvedMenu;
use crate::navigation::{NavNode, build_nav_list, match_current};
use crate::site::Site;

/// Split a menu path into slugs, ignoring empty segments.
#[must_use]
pub fn parse_menu_path(menu_path: &str) -> Vec<&str> {
    menu_path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Context of one rendered page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PageContext {
    /// Resolved menu; `None` for the index page.
    pub menu: Option<ResolvedMenu>,
    /// Section of the resolved menu with its blocks.
    pub section: Option<SectionBlocks>,
    /// Blocks of the section with kind details, in order.
    pub blocks: Vec<BlockView>,
    pub nav_menu_list: Vec<NavNode>,
    /// Node of the resolved menu in `nav_menu_list`.
    pub nav_menu: Option<NavNode>,
    pub preview_mode: bool,
}

impl Site {
    /// Navigation list for a request to `request_path`.
    pub async fn navigation(&self, request_path: Option<&str>) -> Result<Vec<NavNode>, ContentError> {
        let menus = self.store.menus().await?;
        Ok(build_nav_list(&menus, &self.config.menu_base_url, request_path))
    }

    /// Resolve `menu_path` and assemble the page context.
    ///
    /// An empty path is the index page: no menu, no section. The section of a
    /// resolved menu is created if missing. Filtering disabled content is left
    /// to the renderer; `preview_mode` is passed through.
    ///
    /// # Errors
    ///
    /// [`ContentError::NotFound`] when the path matches no menu.
    pub async fn page_context(
        &self,
        menu_path: &str,
        request_path: &str,
        preview_mode: bool,
    ) -> Result<PageContext, ContentError> {
        let slugs = parse_menu_path(menu_path);
        let menu = if slugs.is_empty() {
            None
        } else {
            Some(self.resolve_path(&slugs).await?)
        };

        let nav_menu_list = self.navigation(Some(request_path)).await?;

        let Some(menu) = menu else {
            return Ok(PageContext {
                menu: None,
                section: None,
                blocks: Vec::new(),
                nav_menu_list,
                nav_menu: None,
                preview_mode,
            });
        };

        let nav_menu = match_current(&nav_menu_list, &menu).cloned();
        let section = self.section_for_menu(menu.menu.id).await?;
        let section = self.list_blocks(&section).await?;
        let blocks = section
            .blocks
            .iter()
            .map(|block| self.describe_block(block))
            .collect::<Result<Vec<_>, _>>()?;
        tracing::debug!(
            menu = %menu.menu.id,
            blocks = blocks.len(),
            preview_mode,
            "Resolved page"
        );

        Ok(PageContext {
            menu: Some(menu),
            section: Some(section),
            blocks,
            nav_menu_list,
            nav_menu,
            preview_mode,
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::site::test_support::{about_team, site};

    #[test]
    fn test_parse_menu_path() {
        assert_eq!(parse_menu_path(""), Vec::<&str>::new());
        assert_eq!(parse_menu_path("/about/"), vec!["about"]);
        assert_eq!(parse_menu_path("about//team"), vec!["about", "team"]);
    }

    #[tokio::test]
    async fn test_index_page() {
        let site = site();
        about_team(&site).await;

        let page = site.page_context("", "/", false).await.unwrap();

        assert_eq!(page.menu, None);
        assert_eq!(page.section, None);
        assert_eq!(page.nav_menu_list.len(), 1);
        assert!(page.nav_menu.is_none());
    }

    #[tokio::test]
    async fn test_child_page() {
        let site = site();
        let (_, team) = about_team(&site).await;

        let page = site
            .page_context("about/team", "/about/team", true)
            .await
            .unwrap();

        assert_eq!(page.menu.as_ref().map(|m| m.menu.id), Some(team.id));
        let section = page.section.unwrap();
        assert_eq!(section.section.menu_id, Some(team.id));
        assert!(section.empty());
        assert_eq!(page.nav_menu.map(|n| n.id), Some(team.id));
        assert!(page.nav_menu_list[0].active);
        assert!(page.preview_mode);
    }

    #[tokio::test]
    async fn test_page_lists_described_blocks() {
        let site = site();
        let (about, _) = about_team(&site).await;
        let section = site.section_for_menu(about.id).await.unwrap();
        site.create_block(section.id, "rich_text_block", None).await.unwrap();

        let page = site.page_context("about", "/about", false).await.unwrap();

        assert_eq!(page.blocks.len(), 1);
        assert_eq!(page.blocks[0].template, "content/rich_text_block.html");
    }

    #[tokio::test]
    async fn test_unknown_page() {
        let site = site();

        let err = site.page_context("missing", "/missing", false).await.unwrap_err();

        assert!(matches!(err, ContentError::NotFound { .. }));
    }
}
