use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::permissions::{Permission, Role};

// --- Identity Record (Mapped to Database) ---

/// User
///
/// The profile row the authorization layer reads from `public.profiles`.
/// `role` is free-form and may be NULL; it is only trusted after the Role Resolver
/// has normalized it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, Default)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub role: Option<String>,
}

// --- Response Schemas (Output) ---

/// PermissionCheck
///
/// Output of GET /session/permissions/{permission}. `permission` echoes the requested
/// label, even when it is not a known permission.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, PartialEq, Eq)]
#[ts(export)]
pub struct PermissionCheck {
    pub permission: String,
    pub allowed: bool,
}

/// RoleGrants
///
/// One row of the permission table (GET /admin/permissions).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, PartialEq, Eq)]
#[ts(export)]
pub struct RoleGrants {
    pub role: Role,
    pub permissions: Vec<Permission>,
}
