//! Router construction.
//!
//! Builds the axum router with all routes and middleware.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post, put};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::handlers::{console, lookups, navigation, pages};
use crate::middleware::security;
use crate::state::AppState;

/// Create the application router.
///
/// Console routes hang off the configured console prefix.
pub(crate) fn create_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        .route("/api/navigation", get(navigation::get_navigation))
        .route("/api/pages/", get(pages::get_root_page))
        .route("/api/pages/{*menu_path}", get(pages::get_page))
        .route("/api/static/sections/{key}", get(lookups::get_static_section))
        .route(
            "/api/static/blocks/{type_key}/{key}",
            get(lookups::get_static_block),
        )
        .route("/api/blurbs/{*identifier}", get(lookups::get_blurb))
        .route("/api/image-blurbs/{*identifier}", get(lookups::get_image_blurb));

    let p = state.site.paths().prefix().to_owned();
    let console_routes = Router::new()
        .route(&format!("{p}/"), get(console::index))
        .route(
            &format!("{p}/toggle-preview-mode"),
            get(console::toggle_preview_mode),
        )
        .route(
            &format!("{p}/menus"),
            get(console::menus::list).post(console::menus::create_menu),
        )
        .route(
            &format!("{p}/menus/{{id}}"),
            get(console::menus::get_menu)
                .put(console::menus::update_menu)
                .delete(console::menus::delete_menu),
        )
        .route(
            &format!("{p}/menus/{{id}}/move"),
            post(console::menus::move_menu),
        )
        .route(
            &format!("{p}/submenus"),
            post(console::menus::create_submenu),
        )
        .route(
            &format!("{p}/submenus/{{id}}"),
            get(console::menus::get_submenu)
                .put(console::menus::update_menu)
                .delete(console::menus::delete_menu),
        )
        .route(
            &format!("{p}/content-sections"),
            get(console::content::list_sections),
        )
        .route(
            &format!("{p}/content-sections/{{id}}"),
            get(console::content::get_section).delete(console::content::delete_section),
        )
        .route(
            &format!("{p}/content-blocks"),
            get(console::content::list_blocks),
        )
        .route(
            &format!("{p}/content-blocks/{{id}}"),
            get(console::content::get_block).delete(console::content::delete_block),
        )
        .route(
            &format!("{p}/content-blocks/{{id}}/disabled"),
            put(console::content::set_block_disabled),
        )
        .route(
            &format!("{p}/content-blocks/{{id}}/move"),
            post(console::content::move_block),
        )
        .route(
            &format!("{p}/rich-text-blocks"),
            post(console::content::create_rich_text_block),
        )
        .route(
            &format!("{p}/rich-text-blocks/{{id}}"),
            put(console::content::update_rich_text_block),
        )
        .route(&format!("{p}/blurbs"), get(console::blurbs::list_blurbs))
        .route(
            &format!("{p}/blurbs/{{id}}"),
            get(console::blurbs::get_blurb).put(console::blurbs::update_blurb),
        )
        .route(
            &format!("{p}/image-blurbs"),
            get(console::blurbs::list_image_blurbs),
        )
        .route(
            &format!("{p}/image-blurbs/{{id}}"),
            get(console::blurbs::get_image_blurb).put(console::blurbs::update_image_blurb),
        );

    Router::new()
        .merge(api_routes)
        .merge(console_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(security::csp_layer())
                .layer(security::content_type_options_layer())
                .layer(security::frame_options_layer()),
        )
        .with_state(state)
}
