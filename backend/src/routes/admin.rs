use crate::{AppState, GuardState, handlers, permissions::Permission, route_guard};
use axum::{Router, middleware, routing::get};

/// Admin Router Module
///
/// Every route here is wrapped in `route_guard`. The view routes only require admin
/// status at the layer; each view's own permission is checked by the handler, because it
/// depends on the path. The permission table additionally requires `manage_roles`.
pub fn admin_routes(state: AppState) -> Router<AppState> {
    let views = Router::new()
        // GET /admin/views
        // Navigation entries the caller may open.
        .route("/views", get(handlers::list_admin_views))
        // GET /admin/views/{view}
        // Opens one view; 403 with the missing permission when the role falls short.
        .route("/views/{view}", get(handlers::open_admin_view))
        .route_layer(middleware::from_fn_with_state(
            GuardState::new(state.clone(), None),
            route_guard,
        ));

    let roles = Router::new()
        // GET /admin/permissions
        // The role -> permission table, for the Roles & Permissions screen.
        .route("/permissions", get(handlers::get_permission_table))
        .route_layer(middleware::from_fn_with_state(
            GuardState::new(state, Some(Permission::ManageRoles)),
            route_guard,
        ));

    views.merge(roles)
}
