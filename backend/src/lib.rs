use axum::{
    Router,
    extract::{FromRef, Request, State},
    http::HeaderName,
    middleware::Next,
    response::{IntoResponse, Response},
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Authorization core: permission table, role resolution, guard, view catalog.
pub mod guard;
pub mod permissions;
pub mod session;
pub mod views;

// Identity collaborator and HTTP plumbing.
pub mod auth;
pub mod config;
pub mod handlers;
pub mod models;
pub mod repository;

// Module for routing segregation (Public, Admin).
pub mod routes;
use auth::CurrentSession;
use permissions::Permission;
use routes::{admin, public};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use guard::{Denial, Guarded, can, can_label, guard, guard_with};
pub use permissions::{PermissionTable, Role};
pub use repository::{PostgresRepository, RepositoryState};
pub use session::{AdminSession, RoleResolver, resolve_admin_session};
pub use views::{AdminView, visible_views};

/// ApiDoc
///
/// OpenAPI document for the authorization API, served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::get_session, handlers::check_permission, handlers::preview_view,
        handlers::list_admin_views, handlers::open_admin_view, handlers::get_permission_table
    ),
    components(
        schemas(
            session::AdminSession, permissions::Role, permissions::Permission,
            guard::GuardDecision, views::AdminView, views::ViewGrant,
            models::PermissionCheck, models::RoleGrants,
        )
    ),
    tags(
        (name = "crew-portal-authz", description = "Admin authorization API for the crew portal")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single, cloneable container shared by every request.
#[derive(Clone)]
pub struct AppState {
    /// Identity lookup (profile role labels).
    pub repo: RepositoryState,
    /// The loaded, immutable environment configuration.
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// GuardState
///
/// State handed to one `route_guard` layer: the application state plus the permission the
/// guarded sub-router requires (`None` means admin status alone is enough).
#[derive(Clone)]
pub struct GuardState {
    pub app: AppState,
    pub required: Option<Permission>,
}

impl GuardState {
    pub fn new(app: AppState, required: Option<Permission>) -> Self {
        Self { app, required }
    }
}

impl FromRef<GuardState> for RepositoryState {
    fn from_ref(guard_state: &GuardState) -> RepositoryState {
        guard_state.app.repo.clone()
    }
}

impl FromRef<GuardState> for AppConfig {
    fn from_ref(guard_state: &GuardState) -> AppConfig {
        guard_state.app.config.clone()
    }
}

/// route_guard
///
/// Middleware running the route guard in front of a sub-router. The session is resolved
/// from the current profile once per request and handed to the handler as an
/// `Extension<CurrentSession>`; nothing is cached between requests.
/// Denials short-circuit with a 403 before the handler runs.
pub async fn route_guard(
    State(guard_state): State<GuardState>,
    current: CurrentSession,
    mut request: Request,
    next: Next,
) -> Response {
    let target = request.uri().path().to_string();
    request.extensions_mut().insert(current.clone());

    match guard::guard(&current.session, guard_state.required, request).into_result() {
        Ok(request) => next.run(request).await,
        Err(denial) => {
            handlers::log_denial(current.user_id, &current.session, &denial, &target);
            denial.into_response()
        }
    }
}

/// create_router
///
/// Assembles the routing structure, applies the guard and observability layers,
/// and registers the application state.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header name constant for Request Correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        // Admin Routes: nested under '/admin', each sub-router behind its own guard layer.
        .nest("/admin", admin::admin_routes(state.clone()))
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Span factory for `TraceLayer`: tags every log line of a request with its `x-request-id`.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
