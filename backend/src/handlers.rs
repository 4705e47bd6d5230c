use crate::{
    auth::CurrentSession,
    guard::{Denial, GuardDecision, can_label},
    models::{PermissionCheck, RoleGrants},
    permissions::PermissionTable,
    session::AdminSession,
    views::{AdminView, ViewGrant},
};
use axum::{
    Extension, Json,
    extract::Path,
    http::StatusCode,
    response::{IntoResponse, Response},
};

// --- Session Handlers ---

/// get_session
///
/// [Public Route] Resolves the caller's admin session. Anonymous callers and users whose
/// role label is not an admin role both receive `{ is_admin: false, role: null }`.
#[utoipa::path(
    get,
    path = "/session",
    responses((status = 200, description = "Admin session of the caller", body = AdminSession))
)]
pub async fn get_session(CurrentSession { session, .. }: CurrentSession) -> Json<AdminSession> {
    Json(session)
}

/// check_permission
///
/// [Public Route] Answers whether the caller holds `permission`.
/// Unknown permission labels are answered with `allowed: false`, never an error.
#[utoipa::path(
    get,
    path = "/session/permissions/{permission}",
    params(("permission" = String, Path, description = "Permission label, e.g. manage_users")),
    responses((status = 200, description = "Permission check", body = PermissionCheck))
)]
pub async fn check_permission(
    CurrentSession { session, .. }: CurrentSession,
    Path(permission): Path<String>,
) -> Json<PermissionCheck> {
    let allowed = can_label(&session, &permission);
    Json(PermissionCheck {
        permission,
        allowed,
    })
}

/// preview_view
///
/// [Public Route] Runs the guard for an admin view without opening it, so the client can
/// decide which screen to render. Always 200 for known views.
#[utoipa::path(
    get,
    path = "/session/views/{view}",
    params(("view" = String, Path, description = "Admin view slug")),
    responses(
        (status = 200, description = "Guard decision", body = GuardDecision),
        (status = 404, description = "Unknown view")
    )
)]
pub async fn preview_view(
    CurrentSession { session, .. }: CurrentSession,
    Path(view): Path<String>,
) -> Result<Json<GuardDecision>, StatusCode> {
    let view = view.parse::<AdminView>().map_err(|_| StatusCode::NOT_FOUND)?;
    Ok(Json(view.open(&session).decision()))
}

// --- Admin Handlers ---

/// list_admin_views
///
/// [Admin Route] The dashboard navigation: every view the caller's role may open.
/// The session comes from `route_guard`, so the profile is looked up once per request.
#[utoipa::path(
    get,
    path = "/admin/views",
    responses(
        (status = 200, description = "Visible admin views", body = [ViewGrant]),
        (status = 403, description = "Not an admin")
    )
)]
pub async fn list_admin_views(
    Extension(CurrentSession { session, .. }): Extension<CurrentSession>,
) -> Json<Vec<ViewGrant>> {
    let grants = AdminView::ALL
        .into_iter()
        .filter_map(|view| view.open(&session).into_result().ok())
        .collect();
    Json(grants)
}

/// open_admin_view
///
/// [Admin Route] Opens a single admin view through the route guard.
///
/// *Authorization*: 403 `access_denied` for non-admins, 403 `permission_denied` naming the
/// missing permission when the role lacks the view's requirement.
#[utoipa::path(
    get,
    path = "/admin/views/{view}",
    params(("view" = String, Path, description = "Admin view slug")),
    responses(
        (status = 200, description = "View granted", body = ViewGrant),
        (status = 403, description = "Access or permission denied"),
        (status = 404, description = "Unknown view")
    )
)]
pub async fn open_admin_view(
    Extension(CurrentSession { user_id, session }): Extension<CurrentSession>,
    Path(view): Path<String>,
) -> Response {
    let Ok(view) = view.parse::<AdminView>() else {
        return StatusCode::NOT_FOUND.into_response();
    };

    match view.open(&session).into_result() {
        Ok(grant) => Json(grant).into_response(),
        Err(denial) => {
            log_denial(user_id, &session, &denial, view.slug());
            denial.into_response()
        }
    }
}

/// get_permission_table
///
/// [Admin Route] The full role -> permissions table. Requires `manage_roles`.
#[utoipa::path(
    get,
    path = "/admin/permissions",
    responses(
        (status = 200, description = "Permission table", body = [RoleGrants]),
        (status = 403, description = "Access or permission denied")
    )
)]
pub async fn get_permission_table() -> Json<Vec<RoleGrants>> {
    let table = PermissionTable::global()
        .entries()
        .map(|(role, permissions)| RoleGrants {
            role,
            permissions: permissions.iter().copied().collect(),
        })
        .collect();
    Json(table)
}

/// Structured log line for every guard refusal.
pub(crate) fn log_denial(
    user_id: Option<uuid::Uuid>,
    session: &AdminSession,
    denial: &Denial,
    target: &str,
) {
    tracing::info!(
        user_id = ?user_id,
        role = ?session.role(),
        denial = ?denial,
        target,
        "admin guard denied access"
    );
}
