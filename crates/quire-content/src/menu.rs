//! Menu tree.
//!
//! Menus form a two-level tree: root menus and their children. Slugs are
//! unique among root menus and, separately, among the children of one parent.
//! Menus are created by administration only; they are never get-or-created.

use quire_store::{Menu, MenuId, NewMenu};
use serde::Serialize;

use crate::error::ContentError;
use crate::paths::ConsolePaths;
use crate::site::Site;

const ROOT_SLUG_TAKEN: &str = "A menu with the same url already exists";
const CHILD_SLUG_TAKEN: &str = "A submenu with the same url already exists";
const TOO_DEEP: &str = "Multi-level submenus are not supported (only menu and sub-menu)";

const MAX_TITLE_LEN: usize = 256;
const MAX_SLUG_LEN: usize = 32;

/// A menu together with its parent, if it is a child.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ResolvedMenu {
    pub menu: Menu,
    pub parent: Option<Menu>,
}

impl ResolvedMenu {
    /// `"{parent_slug}/{slug}"` for children, `"{slug}"` for roots.
    #[must_use]
    pub fn url_path(&self) -> String {
        match &self.parent {
            Some(parent) => format!("{}/{}", parent.url_slug, self.menu.url_slug),
            None => self.menu.url_slug.clone(),
        }
    }

    /// `"{parent title} > {title}"` for children, the title for roots.
    #[must_use]
    pub fn display_name(&self) -> String {
        match &self.parent {
            Some(parent) => format!("{} > {}", parent.title, self.menu.title),
            None => self.menu.title.clone(),
        }
    }

    /// Console page editing this menu.
    #[must_use]
    pub fn update_path(&self, paths: &ConsolePaths) -> String {
        if self.parent.is_some() {
            paths.submenu_update(self.menu.id)
        } else {
            paths.menu_update(self.menu.id)
        }
    }

    /// Console page listing this menu: the parent's page for children.
    #[must_use]
    pub fn console_list_path(&self, paths: &ConsolePaths) -> String {
        match &self.parent {
            Some(parent) => paths.menu_update(parent.id),
            None => paths.menu_list(),
        }
    }
}

fn slug_taken(parent: Option<MenuId>) -> ContentError {
    let message = if parent.is_some() {
        CHILD_SLUG_TAKEN
    } else {
        ROOT_SLUG_TAKEN
    };
    ContentError::validation(Some("url_slug"), message)
}

fn is_slug(slug: &str) -> bool {
    slug.chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn is_http_url(url: &str) -> bool {
    ["http://", "https://"].iter().any(|scheme| {
        url.strip_prefix(scheme)
            .is_some_and(|rest| !rest.is_empty() && !rest.starts_with('/'))
    })
}

/// Field-level checks that need no store access.
fn clean_fields(input: &mut NewMenu) -> Result<(), ContentError> {
    input.title = input.title.trim().to_owned();
    input.url_slug = input.url_slug.trim().to_owned();

    if input.title.is_empty() {
        return Err(ContentError::validation(Some("title"), "This field is required."));
    }
    if input.title.chars().count() > MAX_TITLE_LEN {
        return Err(ContentError::validation(
            Some("title"),
            format!("Ensure this value has at most {MAX_TITLE_LEN} characters."),
        ));
    }
    if input.url_slug.is_empty() {
        return Err(ContentError::validation(Some("url_slug"), "This field is required."));
    }
    if input.url_slug.chars().count() > MAX_SLUG_LEN {
        return Err(ContentError::validation(
            Some("url_slug"),
            format!("Ensure this value has at most {MAX_SLUG_LEN} characters."),
        ));
    }
    if !is_slug(&input.url_slug) {
        return Err(ContentError::validation(
            Some("url_slug"),
            "Enter a valid slug consisting of letters, numbers, underscores or hyphens.",
        ));
    }

    input.redirect_to = input
        .redirect_to
        .take()
        .map(|url| url.trim().to_owned())
        .filter(|url| !url.is_empty());
    if let Some(url) = &input.redirect_to
        && !is_http_url(url)
    {
        return Err(ContentError::validation(Some("redirect_to"), "Enter a valid URL."));
    }

    Ok(())
}

impl Site {
    /// Check `input` against the tree; `id` is the menu being updated.
    async fn validate_menu(&self, input: &mut NewMenu, id: Option<MenuId>) -> Result<(), ContentError> {
        clean_fields(input)?;

        if let Some(parent_id) = input.parent_id {
            if Some(parent_id) == id {
                return Err(ContentError::validation(
                    Some("parent"),
                    "A menu cannot be its own parent.",
                ));
            }
            let parent = self
                .store
                .menu(parent_id)
                .await?
                .ok_or_else(|| ContentError::validation(Some("parent"), "Parent menu does not exist."))?;
            if !parent.is_root() {
                return Err(ContentError::validation(None, TOO_DEEP));
            }
            if let Some(id) = id
                && !self.store.child_menus(id).await?.is_empty()
            {
                return Err(ContentError::validation(None, TOO_DEEP));
            }
        }

        if let Some(existing) = self.store.find_menu(input.parent_id, &input.url_slug).await?
            && Some(existing.id) != id
        {
            return Err(slug_taken(input.parent_id));
        }

        Ok(())
    }

    /// Create a root menu, or a child when `input.parent_id` is set.
    ///
    /// # Errors
    ///
    /// [`ContentError::Validation`] for a slug already used in the sibling
    /// scope, a parent that is itself a child, or malformed fields.
    pub async fn create_menu(&self, mut input: NewMenu) -> Result<Menu, ContentError> {
        self.validate_menu(&mut input, None).await?;

        let parent = input.parent_id;
        let menu = self.store.insert_menu(input).await.map_err(|e| {
            if e.is_already_exists() {
                slug_taken(parent)
            } else {
                e.into()
            }
        })?;
        tracing::info!(menu = %menu.id, slug = %menu.url_slug, "Created menu");
        Ok(menu)
    }

    /// Replace the editable fields of menu `id`.
    ///
    /// Position is kept. The uniqueness check excludes the menu itself.
    ///
    /// # Errors
    ///
    /// [`ContentError::NotFound`] for an unknown id, otherwise as
    /// [`create_menu`](Self::create_menu). A child that has children of its
    /// own is never saved.
    pub async fn update_menu(&self, id: MenuId, mut changes: NewMenu) -> Result<Menu, ContentError> {
        let mut menu = self
            .store
            .menu(id)
            .await?
            .ok_or_else(|| ContentError::not_found(format!("menu {id}")))?;
        self.validate_menu(&mut changes, Some(id)).await?;

        let reparented = menu.parent_id != changes.parent_id;
        menu.title = changes.title;
        menu.url_slug = changes.url_slug;
        menu.disabled = changes.disabled;
        menu.parent_id = changes.parent_id;
        menu.redirect_to = changes.redirect_to;
        if reparented {
            // Append after the new siblings.
            let siblings = match menu.parent_id {
                Some(parent) => self.store.child_menus(parent).await?,
                None => self.root_menus().await?,
            };
            menu.position = siblings.iter().map(|m| m.position + 1).max().unwrap_or(0);
        }

        let parent = menu.parent_id;
        self.store.update_menu(&menu).await.map_err(|e| {
            if e.is_already_exists() {
                slug_taken(parent)
            } else {
                e.into()
            }
        })?;
        tracing::info!(menu = %id, "Updated menu");
        Ok(menu)
    }

    /// Delete a menu with its children, section and blocks.
    ///
    /// Returns the deleted menu so callers can link back to its list page.
    pub async fn delete_menu(&self, id: MenuId) -> Result<ResolvedMenu, ContentError> {
        let resolved = self.menu(id).await?;
        self.store.delete_menu(id).await?;
        tracing::info!(menu = %id, "Deleted menu");
        Ok(resolved)
    }

    /// Menu `id` with its parent.
    ///
    /// # Errors
    ///
    /// [`ContentError::NotFound`] for an unknown id.
    pub async fn menu(&self, id: MenuId) -> Result<ResolvedMenu, ContentError> {
        let menu = self
            .store
            .menu(id)
            .await?
            .ok_or_else(|| ContentError::not_found(format!("menu {id}")))?;
        self.resolve_parent(menu).await
    }

    pub(crate) async fn resolve_parent(&self, menu: Menu) -> Result<ResolvedMenu, ContentError> {
        let parent = match menu.parent_id {
            Some(parent_id) => {
                let parent = self.store.menu(parent_id).await?;
                if parent.is_none() {
                    tracing::warn!(menu = %menu.id, parent = %parent_id, "Menu parent is missing");
                }
                parent
            }
            None => None,
        };
        Ok(ResolvedMenu { menu, parent })
    }

    /// Resolve one or two slugs to a root menu or one of its children.
    ///
    /// Other segment counts are logged and only the first segment is
    /// resolved.
    ///
    /// # Errors
    ///
    /// [`ContentError::NotFound`] when a segment matches no menu.
    pub async fn resolve_path(&self, slugs: &[&str]) -> Result<ResolvedMenu, ContentError> {
        if !(1..=2).contains(&slugs.len()) {
            tracing::warn!(path = %slugs.join("/"), "Invalid menu path");
        }
        let Some(root_slug) = slugs.first() else {
            return Err(ContentError::not_found("menu path"));
        };

        let root = self
            .store
            .find_menu(None, root_slug)
            .await?
            .ok_or_else(|| ContentError::not_found(format!("menu '{root_slug}'")))?;

        let [_, child_slug] = slugs else {
            return Ok(ResolvedMenu {
                menu: root,
                parent: None,
            });
        };
        let child = self
            .store
            .find_menu(Some(root.id), child_slug)
            .await?
            .ok_or_else(|| ContentError::not_found(format!("menu '{root_slug}/{child_slug}'")))?;
        Ok(ResolvedMenu {
            menu: child,
            parent: Some(root),
        })
    }

    /// Root menus in sibling order.
    pub async fn root_menus(&self) -> Result<Vec<Menu>, ContentError> {
        let menus = self.store.menus().await?;
        Ok(menus.into_iter().filter(Menu::is_root).collect())
    }

    /// Children of menu `id` in sibling order.
    pub async fn children(&self, id: MenuId) -> Result<Vec<Menu>, ContentError> {
        Ok(self.store.child_menus(id).await?)
    }

    /// Move menu `id` to `position` among its siblings (clamped).
    pub async fn move_menu(&self, id: MenuId, position: usize) -> Result<(), ContentError> {
        let menu = self
            .store
            .menu(id)
            .await?
            .ok_or_else(|| ContentError::not_found(format!("menu {id}")))?;
        let siblings = match menu.parent_id {
            Some(parent) => self.store.child_menus(parent).await?,
            None => self.root_menus().await?,
        };

        let mut order: Vec<MenuId> = siblings.iter().map(|m| m.id).filter(|m| *m != id).collect();
        order.insert(position.min(order.len()), id);
        self.store.set_menu_order(menu.parent_id, &order).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::site::test_support::{about_team, new_menu, site};

    fn validation_message(err: ContentError) -> String {
        match err {
            ContentError::Validation { message, .. } => message,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_url_path_and_resolve_path() {
        let site = site();
        let (about, team) = about_team(&site).await;

        let resolved = site.resolve_path(&["about", "team"]).await.unwrap();

        assert_eq!(resolved.menu, team);
        assert_eq!(resolved.parent, Some(about.clone()));
        assert_eq!(resolved.url_path(), "about/team");
        assert_eq!(site.resolve_path(&["about"]).await.unwrap().url_path(), "about");
        assert_eq!(resolved.display_name(), "About > Team");
    }

    #[tokio::test]
    async fn test_resolve_path_not_found() {
        let site = site();
        about_team(&site).await;

        let missing_root = site.resolve_path(&["contact"]).await.unwrap_err();
        let missing_child = site.resolve_path(&["about", "history"]).await.unwrap_err();
        let empty = site.resolve_path(&[]).await.unwrap_err();

        assert!(matches!(missing_root, ContentError::NotFound { .. }));
        assert!(matches!(missing_child, ContentError::NotFound { .. }));
        assert!(matches!(empty, ContentError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_resolve_path_with_extra_segments_uses_root() {
        let site = site();
        let (about, _) = about_team(&site).await;

        let known_child = site.resolve_path(&["about", "team", "bio"]).await.unwrap();
        let unknown_child = site.resolve_path(&["about", "nope", "bio"]).await.unwrap();

        assert_eq!(known_child.menu.id, about.id);
        assert_eq!(known_child.parent, None);
        assert_eq!(unknown_child.menu.id, about.id);
    }

    #[tokio::test]
    async fn test_third_level_is_rejected() {
        let site = site();
        let (_, team) = about_team(&site).await;

        let err = site
            .create_menu(new_menu("Bio", "bio", Some(team.id)))
            .await
            .unwrap_err();

        assert_eq!(validation_message(err), TOO_DEEP);
    }

    #[tokio::test]
    async fn test_parent_with_children_cannot_become_child() {
        let site = site();
        let (about, _) = about_team(&site).await;
        let news = site.create_menu(new_menu("News", "news", None)).await.unwrap();

        let err = site
            .update_menu(about.id, new_menu("About", "about", Some(news.id)))
            .await
            .unwrap_err();

        assert_eq!(validation_message(err), TOO_DEEP);
    }

    #[tokio::test]
    async fn test_slug_uniqueness_per_scope() {
        let site = site();
        let (about, _) = about_team(&site).await;
        let news = site.create_menu(new_menu("News", "news", None)).await.unwrap();

        let root_dup = site
            .create_menu(new_menu("About us", "about", None))
            .await
            .unwrap_err();
        let child_dup = site
            .create_menu(new_menu("The team", "team", Some(about.id)))
            .await
            .unwrap_err();
        let other_parent = site
            .create_menu(new_menu("Team", "team", Some(news.id)))
            .await;

        assert_eq!(validation_message(root_dup), ROOT_SLUG_TAKEN);
        assert_eq!(validation_message(child_dup), CHILD_SLUG_TAKEN);
        assert!(other_parent.is_ok());
    }

    #[tokio::test]
    async fn test_update_keeps_own_slug() {
        let site = site();
        let (about, _) = about_team(&site).await;

        let updated = site
            .update_menu(about.id, new_menu("About Us", "about", None))
            .await
            .unwrap();

        assert_eq!(updated.title, "About Us");
        assert_eq!(updated.position, about.position);
    }

    #[tokio::test]
    async fn test_field_validation() {
        let site = site();

        let bad_slug = site
            .create_menu(new_menu("About", "about us", None))
            .await
            .unwrap_err();
        let long_slug = site
            .create_menu(new_menu("About", &"a".repeat(33), None))
            .await
            .unwrap_err();
        let mut redirect = new_menu("Shop", "shop", None);
        redirect.redirect_to = Some("shop.example.com".to_owned());
        let bad_redirect = site.create_menu(redirect).await.unwrap_err();

        assert!(matches!(bad_slug, ContentError::Validation { field: Some("url_slug"), .. }));
        assert!(matches!(long_slug, ContentError::Validation { field: Some("url_slug"), .. }));
        assert!(matches!(bad_redirect, ContentError::Validation { field: Some("redirect_to"), .. }));
    }

    #[tokio::test]
    async fn test_blank_redirect_is_cleared() {
        let site = site();
        let mut input = new_menu("Shop", "shop", None);
        input.redirect_to = Some("  ".to_owned());

        let menu = site.create_menu(input).await.unwrap();

        assert_eq!(menu.redirect_to, None);
    }

    #[tokio::test]
    async fn test_delete_cascades_to_children() {
        let site = site();
        let (about, team) = about_team(&site).await;

        let deleted = site.delete_menu(about.id).await.unwrap();

        assert_eq!(deleted.menu.id, about.id);
        assert!(matches!(site.menu(team.id).await, Err(ContentError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_console_paths() {
        let site = site();
        let (about, team) = about_team(&site).await;
        let paths = site.paths();

        let root = site.menu(about.id).await.unwrap();
        let child = site.menu(team.id).await.unwrap();

        assert_eq!(root.update_path(paths), format!("/console/menus/{}", about.id));
        assert_eq!(root.console_list_path(paths), "/console/menus");
        assert_eq!(child.update_path(paths), format!("/console/submenus/{}", team.id));
        assert_eq!(child.console_list_path(paths), format!("/console/menus/{}", about.id));
    }

    #[tokio::test]
    async fn test_move_menu() {
        let site = site();
        let a = site.create_menu(new_menu("A", "a", None)).await.unwrap();
        let b = site.create_menu(new_menu("B", "b", None)).await.unwrap();
        let c = site.create_menu(new_menu("C", "c", None)).await.unwrap();

        site.move_menu(c.id, 0).await.unwrap();

        let order: Vec<MenuId> = site.root_menus().await.unwrap().iter().map(|m| m.id).collect();
        assert_eq!(order, vec![c.id, a.id, b.id]);
    }
}
