use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;
use ts_rs::TS;
use utoipa::ToSchema;

use crate::{
    permissions::{Permission, PermissionTable, Role},
    session::AdminSession,
};

/// can
///
/// Answers "may `role` exercise `permission`". No role means no permissions.
pub fn can(role: Option<Role>, permission: Permission) -> bool {
    match role {
        Some(role) => PermissionTable::global().grants(role, permission),
        None => false,
    }
}

/// Same as `can` for a permission label coming off the wire. Unknown labels are never granted.
pub fn can_label(session: &AdminSession, label: &str) -> bool {
    label
        .parse::<Permission>()
        .is_ok_and(|permission| session.can(permission))
}

/// Guarded
///
/// Outcome of a single guard evaluation over some protected content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Guarded<T> {
    Allowed(T),
    NotAdmin,
    InsufficientPermission(Permission),
}

impl<T> Guarded<T> {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Guarded::Allowed(_))
    }

    pub fn into_result(self) -> Result<T, Denial> {
        match self {
            Guarded::Allowed(content) => Ok(content),
            Guarded::NotAdmin => Err(Denial::NotAdmin),
            Guarded::InsufficientPermission(permission) => {
                Err(Denial::InsufficientPermission(permission))
            }
        }
    }

    /// The outcome with the content dropped, for logging and API responses.
    pub fn decision(&self) -> GuardDecision {
        match self {
            Guarded::Allowed(_) => GuardDecision::Allowed,
            Guarded::NotAdmin => GuardDecision::NotAdmin,
            Guarded::InsufficientPermission(permission) => GuardDecision::InsufficientPermission {
                permission: *permission,
            },
        }
    }
}

/// guard
///
/// Evaluates the route guard in its fixed order:
/// 1. not an admin -> `NotAdmin`
/// 2. a required permission the role lacks -> `InsufficientPermission`
/// 3. otherwise the content passes through unchanged.
pub fn guard<T>(session: &AdminSession, required: Option<Permission>, content: T) -> Guarded<T> {
    guard_with(session, required, || content)
}

/// Lazy form of `guard`: `render` only runs when access is allowed.
pub fn guard_with<T, F>(session: &AdminSession, required: Option<Permission>, render: F) -> Guarded<T>
where
    F: FnOnce() -> T,
{
    // Admin status requires a resolved role, not just the flag.
    let Some(role) = session.role().filter(|_| session.is_admin()) else {
        return Guarded::NotAdmin;
    };

    if let Some(permission) = required
        && !can(Some(role), permission)
    {
        return Guarded::InsufficientPermission(permission);
    }

    Guarded::Allowed(render())
}

/// GuardDecision
///
/// Content-free view of a guard outcome, shared with the web client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS, ToSchema)]
#[serde(tag = "outcome", rename_all = "snake_case")]
#[ts(export)]
pub enum GuardDecision {
    Allowed,
    NotAdmin,
    InsufficientPermission { permission: Permission },
}

/// Denial
///
/// The two ways a guard can refuse. Both map to 403 Forbidden with a JSON body the client
/// uses to pick between the generic "access denied" screen and the "permission denied" one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    NotAdmin,
    InsufficientPermission(Permission),
}

impl IntoResponse for Denial {
    fn into_response(self) -> Response {
        let body = match self {
            Denial::NotAdmin => json!({
                "error": "access_denied",
                "message": "You do not have access to the admin area.",
            }),
            Denial::InsufficientPermission(permission) => json!({
                "error": "permission_denied",
                "permission": permission,
                "message": format!("This action requires the '{permission}' permission."),
            }),
        };

        (StatusCode::FORBIDDEN, Json(body)).into_response()
    }
}
