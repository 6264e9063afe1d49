//! Navigation list.
//!
//! Builds one node per root menu with its children nested below, each with
//! the link it renders and whether the current request falls under it.

use std::collections::BTreeMap;

use quire_store::{Menu, MenuId};
use serde::Serialize;

use crate::menu::ResolvedMenu;

/// One entry of the navigation list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NavNode {
    pub id: MenuId,
    pub title: String,
    pub href: String,
    /// The request path starts with `href`.
    pub active: bool,
    pub disabled: bool,
    pub children: Vec<NavNode>,
}

impl NavNode {
    /// Whether visitors see this node; disabled nodes only show in preview mode.
    #[must_use]
    pub fn visible(&self, preview: bool) -> bool {
        preview || !self.disabled
    }
}

/// Join URL segments the way `os.path.join` does: an absolute `tail`
/// replaces `base`.
fn join_url(base: &str, tail: &str) -> String {
    if tail.starts_with('/') || base.is_empty() {
        tail.to_owned()
    } else if base.ends_with('/') {
        format!("{base}{tail}")
    } else {
        format!("{base}/{tail}")
    }
}

// Prefix match only: "/aboutus" also activates "/about".
fn is_active(request_path: Option<&str>, href: &str) -> bool {
    request_path.is_some_and(|path| path.starts_with(href))
}

fn node(menu: &Menu, href: String, request_path: Option<&str>) -> NavNode {
    NavNode {
        id: menu.id,
        title: menu.title.clone(),
        active: is_active(request_path, &href),
        href,
        disabled: menu.disabled,
        children: Vec::new(),
    }
}

/// Build the navigation list from `menus` in sibling order.
///
/// Root hrefs are the redirect target if set, else `base_url` joined with the
/// slug. Child hrefs join the parent's href instead. A child whose parent is
/// not among `menus` is logged and skipped.
#[must_use]
pub fn build_nav_list(menus: &[Menu], base_url: &str, request_path: Option<&str>) -> Vec<NavNode> {
    let mut roots: Vec<NavNode> = Vec::new();
    let mut index: BTreeMap<MenuId, usize> = BTreeMap::new();

    for menu in menus.iter().filter(|m| m.is_root()) {
        let href = menu
            .redirect_to
            .clone()
            .unwrap_or_else(|| join_url(base_url, &menu.url_slug));
        index.insert(menu.id, roots.len());
        roots.push(node(menu, href, request_path));
    }

    for menu in menus {
        let Some(parent_id) = menu.parent_id else {
            continue;
        };
        let Some(parent) = index.get(&parent_id).and_then(|&i| roots.get_mut(i)) else {
            tracing::warn!(menu = %menu.id, parent = %parent_id, "Parent menu missing from navigation list");
            continue;
        };
        let href = menu
            .redirect_to
            .clone()
            .unwrap_or_else(|| join_url(&parent.href, &menu.url_slug));
        parent.children.push(node(menu, href, request_path));
    }

    roots
}

/// Find the node of `current` in `nav`: the parent node first, then the child
/// below it. Failures are logged and yield the closest node found.
#[must_use]
pub fn match_current<'a>(nav: &'a [NavNode], current: &ResolvedMenu) -> Option<&'a NavNode> {
    let (root_id, child_id) = match &current.parent {
        Some(parent) => (parent.id, Some(current.menu.id)),
        None => (current.menu.id, None),
    };

    let Some(root) = nav.iter().find(|n| n.id == root_id) else {
        tracing::warn!(menu = %root_id, "Could not find current parent menu in navigation list");
        return None;
    };
    let Some(child_id) = child_id else {
        return Some(root);
    };
    match root.children.iter().find(|n| n.id == child_id) {
        Some(child) => Some(child),
        None => {
            tracing::warn!(menu = %child_id, "Could not find current child menu in navigation list");
            Some(root)
        }
    }
}
