//! Console menu endpoints.
//!
//! Root menus live under `{console}/menus`, children under
//! `{console}/submenus`. Reading a menu through the other collection
//! redirects to the right one.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use quire_content::{BlockView, ContentError, ResolvedMenu, SectionBlocks};
use quire_store::{Menu, MenuId, NewMenu};
use serde::{Deserialize, Serialize};

use crate::error::ServerError;
use crate::handlers::{NextQuery, Saved};
use crate::state::AppState;

/// Editable menu fields.
#[derive(Debug, Deserialize)]
pub(crate) struct MenuForm {
    title: String,
    url_slug: String,
    #[serde(default)]
    disabled: bool,
    redirect_to: Option<String>,
    /// Parent for children; ignored on create, where the route decides.
    #[serde(default)]
    parent_id: Option<MenuId>,
}

impl MenuForm {
    fn into_new(self, parent_id: Option<MenuId>) -> NewMenu {
        NewMenu {
            title: self.title,
            url_slug: self.url_slug,
            disabled: self.disabled,
            parent_id,
            redirect_to: self.redirect_to,
        }
    }
}

#[derive(Serialize)]
pub(crate) struct MenuListItem {
    menu: Menu,
    update_path: String,
    children: Vec<MenuListItem>,
}

/// Handle GET {console}/menus.
pub(crate) async fn list(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<MenuListItem>>, ServerError> {
    let site = &state.site;
    let paths = site.paths();
    let mut items = Vec::new();
    for root in site.root_menus().await? {
        let children = site
            .children(root.id)
            .await?
            .into_iter()
            .map(|child| MenuListItem {
                update_path: paths.submenu_update(child.id),
                menu: child,
                children: Vec::new(),
            })
            .collect();
        items.push(MenuListItem {
            update_path: paths.menu_update(root.id),
            menu: root,
            children,
        });
    }
    Ok(Json(items))
}

/// Menu with everything its console page shows.
#[derive(Serialize)]
pub(crate) struct MenuDetail {
    #[serde(flatten)]
    menu: ResolvedMenu,
    display_name: String,
    url_path: String,
    children: Vec<Menu>,
    section: SectionBlocks,
    blocks: Vec<BlockView>,
    /// Create a child below this menu; `None` for children.
    submenu_create_path: Option<String>,
    rich_text_block_create_path: String,
    list_path: String,
}

async fn detail(state: &AppState, resolved: ResolvedMenu) -> Result<MenuDetail, ContentError> {
    let site = &state.site;
    let paths = site.paths();
    let id = resolved.menu.id;

    let section = site.section_for_menu(id).await?;
    let section = site.list_blocks(&section).await?;
    let blocks = section
        .blocks
        .iter()
        .map(|block| site.describe_block(block))
        .collect::<Result<Vec<_>, _>>()?;
    let (children, submenu_create_path) = if resolved.menu.is_root() {
        (site.children(id).await?, Some(paths.submenu_create(id)))
    } else {
        (Vec::new(), None)
    };

    Ok(MenuDetail {
        display_name: resolved.display_name(),
        url_path: resolved.url_path(),
        list_path: resolved.console_list_path(paths),
        rich_text_block_create_path: format!(
            "{}?section={}",
            paths.rich_text_block_create(),
            section.section.id
        ),
        children,
        section,
        blocks,
        submenu_create_path,
        menu: resolved,
    })
}

/// Handle GET {console}/menus/{id}.
pub(crate) async fn get_menu(
    Path(id): Path<MenuId>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ServerError> {
    let resolved = state.site.menu(id).await?;
    if !resolved.menu.is_root() {
        return Ok(Redirect::to(&state.site.paths().submenu_update(id)).into_response());
    }
    Ok(Json(detail(&state, resolved).await?).into_response())
}

/// Handle GET {console}/submenus/{id}.
pub(crate) async fn get_submenu(
    Path(id): Path<MenuId>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ServerError> {
    let resolved = state.site.menu(id).await?;
    if resolved.menu.is_root() {
        return Ok(Redirect::to(&state.site.paths().menu_update(id)).into_response());
    }
    Ok(Json(detail(&state, resolved).await?).into_response())
}

/// Handle POST {console}/menus.
pub(crate) async fn create_menu(
    State(state): State<Arc<AppState>>,
    Query(next): Query<NextQuery>,
    Json(form): Json<MenuForm>,
) -> Result<(StatusCode, Json<Saved<Menu>>), ServerError> {
    let menu = state.site.create_menu(form.into_new(None)).await?;
    let next = next.or(state.site.paths().menu_update(menu.id));
    Ok((StatusCode::CREATED, Json(Saved { item: menu, next })))
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubmenuQuery {
    parent: Option<MenuId>,
    next: Option<String>,
}

/// Handle POST {console}/submenus?parent={id}.
pub(crate) async fn create_submenu(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SubmenuQuery>,
    Json(form): Json<MenuForm>,
) -> Result<(StatusCode, Json<Saved<Menu>>), ServerError> {
    let parent = query
        .parent
        .ok_or_else(|| ServerError::BadRequest("Missing query parameter: parent".to_owned()))?;
    let parent = match state.site.menu(parent).await {
        Ok(parent) => parent.menu,
        Err(ContentError::NotFound { .. }) => {
            return Err(ServerError::BadRequest(format!(
                "Could not find parent menu {parent}"
            )));
        }
        Err(e) => return Err(e.into()),
    };

    let menu = state.site.create_menu(form.into_new(Some(parent.id))).await?;
    let next = NextQuery { next: query.next }.or(state.site.paths().menu_update(parent.id));
    Ok((StatusCode::CREATED, Json(Saved { item: menu, next })))
}

/// Handle PUT {console}/menus/{id} and {console}/submenus/{id}.
pub(crate) async fn update_menu(
    Path(id): Path<MenuId>,
    State(state): State<Arc<AppState>>,
    Query(next): Query<NextQuery>,
    Json(form): Json<MenuForm>,
) -> Result<Json<Saved<Menu>>, ServerError> {
    let parent = form.parent_id;
    let menu = state.site.update_menu(id, form.into_new(parent)).await?;
    let paths = state.site.paths();
    let fallback = if menu.is_root() {
        paths.menu_update(id)
    } else {
        paths.submenu_update(id)
    };
    Ok(Json(Saved {
        item: menu,
        next: next.or(fallback),
    }))
}

/// Handle DELETE {console}/menus/{id} and {console}/submenus/{id}.
pub(crate) async fn delete_menu(
    Path(id): Path<MenuId>,
    State(state): State<Arc<AppState>>,
    Query(next): Query<NextQuery>,
) -> Result<Json<Saved<ResolvedMenu>>, ServerError> {
    let deleted = state.site.delete_menu(id).await?;
    let fallback = deleted.console_list_path(state.site.paths());
    Ok(Json(Saved {
        item: deleted,
        next: next.or(fallback),
    }))
}

#[derive(Debug, Deserialize)]
pub(crate) struct MoveForm {
    pub(crate) position: usize,
}

/// Handle POST {console}/menus/{id}/move.
pub(crate) async fn move_menu(
    Path(id): Path<MenuId>,
    State(state): State<Arc<AppState>>,
    Json(form): Json<MoveForm>,
) -> Result<StatusCode, ServerError> {
    state.site.move_menu(id, form.position).await?;
    Ok(StatusCode::NO_CONTENT)
}
