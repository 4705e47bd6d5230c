use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;
use ts_rs::TS;
use utoipa::ToSchema;

use crate::{
    guard::{Guarded, guard},
    permissions::{Permission, Role},
    session::AdminSession,
};

/// AdminView
///
/// The sections of the admin dashboard in the web client. Each one sits behind the route
/// guard with its own required permission; `Overview` only requires admin status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum AdminView {
    Overview,
    Users,
    Roles,
    Jobs,
    JobApprovals,
    Projects,
    Content,
    Messages,
    Profiles,
    Analytics,
    Settings,
}

impl AdminView {
    /// Catalog order, which is also the navigation order in the client.
    pub const ALL: [AdminView; 11] = [
        AdminView::Overview,
        AdminView::Users,
        AdminView::Roles,
        AdminView::Jobs,
        AdminView::JobApprovals,
        AdminView::Projects,
        AdminView::Content,
        AdminView::Messages,
        AdminView::Profiles,
        AdminView::Analytics,
        AdminView::Settings,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            AdminView::Overview => "overview",
            AdminView::Users => "users",
            AdminView::Roles => "roles",
            AdminView::Jobs => "jobs",
            AdminView::JobApprovals => "job_approvals",
            AdminView::Projects => "projects",
            AdminView::Content => "content",
            AdminView::Messages => "messages",
            AdminView::Profiles => "profiles",
            AdminView::Analytics => "analytics",
            AdminView::Settings => "settings",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            AdminView::Overview => "Dashboard",
            AdminView::Users => "User Management",
            AdminView::Roles => "Roles & Permissions",
            AdminView::Jobs => "Job Listings",
            AdminView::JobApprovals => "Pending Job Approvals",
            AdminView::Projects => "Projects",
            AdminView::Content => "Site Content",
            AdminView::Messages => "Message Moderation",
            AdminView::Profiles => "Profile Moderation",
            AdminView::Analytics => "Analytics",
            AdminView::Settings => "Settings",
        }
    }

    /// Client-side route of the view.
    pub fn path(&self) -> String {
        format!("/admin/{}", self.slug())
    }

    pub fn required_permission(&self) -> Option<Permission> {
        match self {
            AdminView::Overview => None,
            AdminView::Users => Some(Permission::ManageUsers),
            AdminView::Roles => Some(Permission::ManageRoles),
            AdminView::Jobs => Some(Permission::EditJobs),
            AdminView::JobApprovals => Some(Permission::ApproveJobs),
            AdminView::Projects => Some(Permission::ManageProjects),
            AdminView::Content => Some(Permission::EditContent),
            AdminView::Messages => Some(Permission::ModerateMessages),
            AdminView::Profiles => Some(Permission::ModerateProfiles),
            AdminView::Analytics => Some(Permission::ViewAnalytics),
            AdminView::Settings => Some(Permission::ManageSettings),
        }
    }

    /// Runs the route guard for this view.
    pub fn open(self, session: &AdminSession) -> Guarded<ViewGrant> {
        match guard(session, self.required_permission(), ()) {
            Guarded::Allowed(()) => Guarded::Allowed(ViewGrant::new(self, session.role())),
            Guarded::NotAdmin => Guarded::NotAdmin,
            Guarded::InsufficientPermission(p) => Guarded::InsufficientPermission(p),
        }
    }
}

impl fmt::Display for AdminView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown admin view: {0}")]
pub struct UnknownView(pub String);

impl FromStr for AdminView {
    type Err = UnknownView;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AdminView::ALL
            .into_iter()
            .find(|view| view.slug() == s)
            .ok_or_else(|| UnknownView(s.to_string()))
    }
}

/// ViewGrant
///
/// What the client needs to render an admin view the guard let through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ViewGrant {
    pub view: AdminView,
    pub title: String,
    pub path: String,
    pub required_permission: Option<Permission>,
    pub role: Option<Role>,
}

impl ViewGrant {
    fn new(view: AdminView, role: Option<Role>) -> Self {
        Self {
            view,
            title: view.title().to_string(),
            path: view.path(),
            required_permission: view.required_permission(),
            role,
        }
    }
}

/// Views the session may open, in catalog order. Empty for non-admins.
pub fn visible_views(session: &AdminSession) -> Vec<AdminView> {
    AdminView::ALL
        .into_iter()
        .filter(|view| view.open(session).is_allowed())
        .collect()
}
