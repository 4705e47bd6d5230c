use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeSet, HashMap},
    fmt,
    str::FromStr,
    sync::LazyLock,
};
use thiserror::Error;
use ts_rs::TS;
use utoipa::ToSchema;

/// Role
///
/// The closed set of administrative roles a profile can carry.
/// Anything outside this set is rejected at the Role Resolver boundary
/// (see `session::RoleResolver`) and never reaches a permission lookup.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Role {
    /// Full access, including user and role management.
    SuperAdmin,
    /// Curates job listings, showcased projects and editorial content.
    ContentManager,
    /// Read-only dashboard and hiring analytics.
    Recruiter,
    /// Reviews flagged messages, profiles and pending job posts.
    Moderator,
}

impl Role {
    /// Every role, in a stable order.
    pub const ALL: [Role; 4] = [
        Role::SuperAdmin,
        Role::ContentManager,
        Role::Recruiter,
        Role::Moderator,
    ];

    /// The wire label stored in `public.profiles.role`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "super_admin",
            Role::ContentManager => "content_manager",
            Role::Recruiter => "recruiter",
            Role::Moderator => "moderator",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}

/// Permission
///
/// A named capability guarded by the admin area. Flat: no hierarchy and no wildcard,
/// a role holds a permission only if the table lists it explicitly.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Permission {
    ViewDashboard,
    ManageUsers,
    ManageRoles,
    EditJobs,
    ApproveJobs,
    DeleteJobs,
    ManageProjects,
    EditContent,
    ModerateMessages,
    ModerateProfiles,
    ViewAnalytics,
    ManageSettings,
}

impl Permission {
    pub const ALL: [Permission; 12] = [
        Permission::ViewDashboard,
        Permission::ManageUsers,
        Permission::ManageRoles,
        Permission::EditJobs,
        Permission::ApproveJobs,
        Permission::DeleteJobs,
        Permission::ManageProjects,
        Permission::EditContent,
        Permission::ModerateMessages,
        Permission::ModerateProfiles,
        Permission::ViewAnalytics,
        Permission::ManageSettings,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::ViewDashboard => "view_dashboard",
            Permission::ManageUsers => "manage_users",
            Permission::ManageRoles => "manage_roles",
            Permission::EditJobs => "edit_jobs",
            Permission::ApproveJobs => "approve_jobs",
            Permission::DeleteJobs => "delete_jobs",
            Permission::ManageProjects => "manage_projects",
            Permission::EditContent => "edit_content",
            Permission::ModerateMessages => "moderate_messages",
            Permission::ModerateProfiles => "moderate_profiles",
            Permission::ViewAnalytics => "view_analytics",
            Permission::ManageSettings => "manage_settings",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown permission: {0}")]
pub struct UnknownPermission(pub String);

impl FromStr for Permission {
    type Err = UnknownPermission;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Permission::ALL
            .into_iter()
            .find(|permission| permission.as_str() == s)
            .ok_or_else(|| UnknownPermission(s.to_string()))
    }
}

/// PermissionTable
///
/// Static Role -> Permission set mapping, built once on first use and read-only afterwards.
/// Concurrent readers need no locking.
#[derive(Debug)]
pub struct PermissionTable {
    grants: HashMap<Role, BTreeSet<Permission>>,
}

static TABLE: LazyLock<PermissionTable> = LazyLock::new(PermissionTable::build);

/// Shared empty set returned for roles without an entry.
static NO_PERMISSIONS: BTreeSet<Permission> = BTreeSet::new();

impl PermissionTable {
    /// The process-wide table.
    pub fn global() -> &'static PermissionTable {
        &TABLE
    }

    fn build() -> Self {
        use Permission::*;

        let mut grants: HashMap<Role, BTreeSet<Permission>> = HashMap::new();
        grants.insert(Role::SuperAdmin, Permission::ALL.into_iter().collect());
        grants.insert(
            Role::ContentManager,
            BTreeSet::from([
                ViewDashboard,
                EditJobs,
                ApproveJobs,
                DeleteJobs,
                ManageProjects,
                EditContent,
            ]),
        );
        grants.insert(
            Role::Recruiter,
            BTreeSet::from([ViewDashboard, ViewAnalytics]),
        );
        grants.insert(
            Role::Moderator,
            BTreeSet::from([
                ViewDashboard,
                ApproveJobs,
                ModerateMessages,
                ModerateProfiles,
            ]),
        );

        Self { grants }
    }

    /// Permissions granted to `role`. Never panics: a missing entry is the empty set.
    pub fn permissions_for(&self, role: Role) -> &BTreeSet<Permission> {
        self.grants.get(&role).unwrap_or(&NO_PERMISSIONS)
    }

    pub fn grants(&self, role: Role, permission: Permission) -> bool {
        self.permissions_for(role).contains(&permission)
    }

    /// Iterates the table in `Role::ALL` order.
    pub fn entries(&self) -> impl Iterator<Item = (Role, &BTreeSet<Permission>)> {
        Role::ALL
            .into_iter()
            .map(move |role| (role, self.permissions_for(role)))
    }
}
