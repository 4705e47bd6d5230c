use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;
use utoipa::ToSchema;

use crate::permissions::{Permission, PermissionTable, Role};

/// The legacy label that predates per-role admin accounts.
pub const LEGACY_ADMIN_LABEL: &str = "admin";

/// Role granted to profiles still carrying the legacy `"admin"` label.
pub const DEFAULT_FALLBACK_ROLE: Role = Role::ContentManager;

/// AdminSession
///
/// The authorization view of the current user, recomputed on every request from the
/// identity record and never stored. `is_admin` is true exactly when `role` is set; the
/// fields are private so only `NONE` and `for_role` can build one, and deserialization
/// rejects pairs that disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS, ToSchema)]
#[serde(try_from = "SessionFields")]
#[ts(export)]
pub struct AdminSession {
    is_admin: bool,
    role: Option<Role>,
}

/// Unchecked wire shape of an `AdminSession`.
#[derive(Deserialize)]
struct SessionFields {
    is_admin: bool,
    role: Option<Role>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("inconsistent admin session: is_admin={is_admin} but role={role:?}")]
pub struct InconsistentSession {
    pub is_admin: bool,
    pub role: Option<Role>,
}

impl TryFrom<SessionFields> for AdminSession {
    type Error = InconsistentSession;

    fn try_from(fields: SessionFields) -> Result<Self, Self::Error> {
        match (fields.is_admin, fields.role) {
            (true, Some(role)) => Ok(AdminSession::for_role(role)),
            (false, None) => Ok(AdminSession::NONE),
            (is_admin, role) => Err(InconsistentSession { is_admin, role }),
        }
    }
}

impl AdminSession {
    /// The session of anyone who is not an administrator (including anonymous callers).
    pub const NONE: AdminSession = AdminSession {
        is_admin: false,
        role: None,
    };

    pub fn for_role(role: Role) -> Self {
        Self {
            is_admin: true,
            role: Some(role),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    pub fn role(&self) -> Option<Role> {
        self.role
    }

    /// Fail-closed permission check for this session.
    pub fn can(&self, permission: Permission) -> bool {
        crate::guard::can(self.role, permission)
    }

    /// Permissions held by this session, in table order.
    pub fn permissions(&self) -> Vec<Permission> {
        self.role
            .map(|role| {
                PermissionTable::global()
                    .permissions_for(role)
                    .iter()
                    .copied()
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// RoleResolver
///
/// Normalizes the free-form role label of a profile into an `AdminSession`.
/// Matching is exact: no trimming, no case folding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleResolver {
    fallback: Role,
}

impl Default for RoleResolver {
    fn default() -> Self {
        Self::new(DEFAULT_FALLBACK_ROLE)
    }
}

impl RoleResolver {
    pub fn new(fallback: Role) -> Self {
        Self { fallback }
    }

    pub fn fallback(&self) -> Role {
        self.fallback
    }

    pub fn resolve(&self, raw: Option<&str>) -> AdminSession {
        let Some(label) = raw else {
            return AdminSession::NONE;
        };

        if let Ok(role) = label.parse::<Role>() {
            return AdminSession::for_role(role);
        }

        // Legacy accounts get a baseline role instead of being locked out.
        if label == LEGACY_ADMIN_LABEL {
            return AdminSession::for_role(self.fallback);
        }

        AdminSession::NONE
    }
}

/// Resolves with the default fallback role.
pub fn resolve_admin_session(raw: Option<&str>) -> AdminSession {
    RoleResolver::default().resolve(raw)
}
