use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Public Router Module
///
/// Session introspection for the web client. These endpoints never deny: they report
/// what the guard would decide so the client can pick which screen to render.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for load balancers.
        .route("/health", get(|| async { "ok" }))
        // GET /session
        // The caller's AdminSession ({ is_admin, role }).
        .route("/session", get(handlers::get_session))
        // GET /session/permissions/{permission}
        // Single permission check; unknown labels answer allowed=false.
        .route(
            "/session/permissions/{permission}",
            get(handlers::check_permission),
        )
        // GET /session/views/{view}
        // Guard decision for an admin view without opening it.
        .route("/session/views/{view}", get(handlers::preview_view))
}
