use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
    response::Response,
};
use crew_portal_authz::{
    AdminSession, AppConfig, AppState, Role, create_router,
    models::{PermissionCheck, RoleGrants, User},
    permissions::Permission,
    repository::Repository,
    views::{AdminView, ViewGrant},
};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::{
    collections::HashMap,
    sync::{
        Arc, RwLock,
        atomic::{AtomicUsize, Ordering},
    },
};
use tower::ServiceExt;
use uuid::Uuid;

// --- MOCK REPOSITORY IMPLEMENTATION ---

// Profiles keyed by ID. Behind a lock so a test can change a role between requests.
#[derive(Default, Clone)]
struct MockProfiles {
    roles: Arc<RwLock<HashMap<Uuid, Option<String>>>>,
    lookups: Arc<AtomicUsize>,
}

impl MockProfiles {
    fn with(self, id: Uuid, role: Option<&str>) -> Self {
        self.set_role(id, role);
        self
    }

    fn set_role(&self, id: Uuid, role: Option<&str>) {
        self.roles
            .write()
            .unwrap()
            .insert(id, role.map(str::to_string));
    }
}

#[async_trait]
impl Repository for MockProfiles {
    async fn get_user(&self, id: Uuid) -> Option<User> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        let roles = self.roles.read().unwrap();
        roles.get(&id).map(|role| User {
            id,
            email: format!("{}@crew.test", id.simple()),
            role: role.clone(),
        })
    }
}

// --- TEST UTILITIES ---

const SUPER_ADMIN_ID: Uuid = Uuid::from_u128(1);
const RECRUITER_ID: Uuid = Uuid::from_u128(2);
const MODERATOR_ID: Uuid = Uuid::from_u128(3);
const LEGACY_ADMIN_ID: Uuid = Uuid::from_u128(4);
const CREW_MEMBER_ID: Uuid = Uuid::from_u128(5);
const NO_ROLE_ID: Uuid = Uuid::from_u128(6);

fn profiles() -> MockProfiles {
    MockProfiles::default()
        .with(SUPER_ADMIN_ID, Some("super_admin"))
        .with(RECRUITER_ID, Some("recruiter"))
        .with(MODERATOR_ID, Some("moderator"))
        .with(LEGACY_ADMIN_ID, Some("admin"))
        .with(CREW_MEMBER_ID, Some("crew"))
        .with(NO_ROLE_ID, None)
}

fn test_app(repo: MockProfiles) -> Router {
    create_router(AppState {
        repo: Arc::new(repo),
        config: AppConfig::default(),
    })
}

async fn get(app: &Router, uri: &str, user: Option<Uuid>) -> Response {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(id) = user {
        builder = builder.header("x-user-id", id.to_string());
    }

    app.clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn body_json<T: DeserializeOwned>(response: Response) -> T {
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body_bytes).unwrap()
}

// --- SESSION ROUTES ---

#[tokio::test]
async fn test_health_check() {
    let app = test_app(profiles());
    let response = get(&app, "/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_session_for_each_kind_of_caller() {
    let app = test_app(profiles());

    let cases = [
        (Some(SUPER_ADMIN_ID), AdminSession::for_role(Role::SuperAdmin)),
        (Some(RECRUITER_ID), AdminSession::for_role(Role::Recruiter)),
        (Some(LEGACY_ADMIN_ID), AdminSession::for_role(Role::ContentManager)),
        (Some(CREW_MEMBER_ID), AdminSession::NONE),
        (Some(NO_ROLE_ID), AdminSession::NONE),
        (Some(Uuid::from_u128(999)), AdminSession::NONE),
        (None, AdminSession::NONE),
    ];

    for (user, expected) in cases {
        let response = get(&app, "/session", user).await;
        assert_eq!(response.status(), StatusCode::OK);
        let session: AdminSession = body_json(response).await;
        assert_eq!(session, expected, "caller {user:?}");
    }
}

#[tokio::test]
async fn test_permission_check() {
    let app = test_app(profiles());

    let response = get(&app, "/session/permissions/view_analytics", Some(RECRUITER_ID)).await;
    let check: PermissionCheck = body_json(response).await;
    assert!(check.allowed);

    let response = get(&app, "/session/permissions/edit_jobs", Some(RECRUITER_ID)).await;
    let check: PermissionCheck = body_json(response).await;
    assert!(!check.allowed);
    assert_eq!(check.permission, "edit_jobs");

    let response = get(&app, "/session/permissions/edit_jobs", None).await;
    let check: PermissionCheck = body_json(response).await;
    assert!(!check.allowed);
}

#[tokio::test]
async fn test_unknown_permission_fails_closed() {
    let app = test_app(profiles());

    let response = get(&app, "/session/permissions/delete_everything", Some(SUPER_ADMIN_ID)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let check: PermissionCheck = body_json(response).await;
    assert_eq!(
        check,
        PermissionCheck {
            permission: "delete_everything".to_string(),
            allowed: false,
        }
    );
}

#[tokio::test]
async fn test_view_preview_reports_decision() {
    let app = test_app(profiles());

    let response = get(&app, "/session/views/jobs", Some(RECRUITER_ID)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let decision: Value = body_json(response).await;
    assert_eq!(
        decision,
        json!({ "outcome": "insufficient_permission", "permission": "edit_jobs" })
    );

    let response = get(&app, "/session/views/jobs", None).await;
    let decision: Value = body_json(response).await;
    assert_eq!(decision, json!({ "outcome": "not_admin" }));

    let response = get(&app, "/session/views/jobs", Some(SUPER_ADMIN_ID)).await;
    let decision: Value = body_json(response).await;
    assert_eq!(decision, json!({ "outcome": "allowed" }));

    let response = get(&app, "/session/views/backstage", Some(SUPER_ADMIN_ID)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// --- ADMIN ROUTES ---

#[tokio::test]
async fn test_recruiter_denied_job_editing_view() {
    let app = test_app(profiles());

    let response = get(&app, "/admin/views/jobs", Some(RECRUITER_ID)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let body: Value = body_json(response).await;
    assert_eq!(body["error"], "permission_denied");
    assert_eq!(body["permission"], "edit_jobs");
}

#[tokio::test]
async fn test_unauthenticated_denied_as_not_admin() {
    let app = test_app(profiles());

    for uri in ["/admin/views", "/admin/views/overview", "/admin/permissions"] {
        let response = get(&app, uri, None).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{uri}");
        let body: Value = body_json(response).await;
        assert_eq!(body["error"], "access_denied", "{uri}");
    }
}

#[tokio::test]
async fn test_non_admin_role_denied_as_not_admin() {
    let app = test_app(profiles());

    let response = get(&app, "/admin/views/users", Some(CREW_MEMBER_ID)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body: Value = body_json(response).await;
    assert_eq!(body["error"], "access_denied");
}

#[tokio::test]
async fn test_super_admin_opens_user_management() {
    let app = test_app(profiles());

    let response = get(&app, "/admin/views/users", Some(SUPER_ADMIN_ID)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let grant: ViewGrant = body_json(response).await;
    assert_eq!(grant.view, AdminView::Users);
    assert_eq!(grant.path, "/admin/users");
    assert_eq!(grant.required_permission, Some(Permission::ManageUsers));
    assert_eq!(grant.role, Some(Role::SuperAdmin));
}

#[tokio::test]
async fn test_unknown_admin_view_is_not_found() {
    let app = test_app(profiles());
    let response = get(&app, "/admin/views/backstage", Some(SUPER_ADMIN_ID)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_navigation_lists_visible_views() {
    let app = test_app(profiles());

    let response = get(&app, "/admin/views", Some(MODERATOR_ID)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let grants: Vec<ViewGrant> = body_json(response).await;
    let views: Vec<AdminView> = grants.into_iter().map(|g| g.view).collect();
    assert_eq!(
        views,
        vec![
            AdminView::Overview,
            AdminView::JobApprovals,
            AdminView::Messages,
            AdminView::Profiles,
        ]
    );
}

#[tokio::test]
async fn test_permission_table_requires_manage_roles() {
    let app = test_app(profiles());

    let response = get(&app, "/admin/permissions", Some(LEGACY_ADMIN_ID)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body: Value = body_json(response).await;
    assert_eq!(body["error"], "permission_denied");
    assert_eq!(body["permission"], "manage_roles");

    let response = get(&app, "/admin/permissions", Some(SUPER_ADMIN_ID)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let table: Vec<RoleGrants> = body_json(response).await;
    assert_eq!(table.len(), Role::ALL.len());
    assert_eq!(table[0].role, Role::SuperAdmin);
    assert_eq!(table[0].permissions, Permission::ALL.to_vec());
}

#[tokio::test]
async fn test_role_change_applies_on_next_request() {
    let repo = profiles();
    let app = test_app(repo.clone());

    let response = get(&app, "/admin/views/settings", Some(MODERATOR_ID)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    repo.set_role(MODERATOR_ID, Some("super_admin"));
    let response = get(&app, "/admin/views/settings", Some(MODERATOR_ID)).await;
    assert_eq!(response.status(), StatusCode::OK);

    repo.set_role(MODERATOR_ID, None);
    let response = get(&app, "/admin/views/overview", Some(MODERATOR_ID)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_guarded_routes_look_up_the_profile_once() {
    let repo = profiles();
    let app = test_app(repo.clone());

    for uri in ["/admin/views", "/admin/views/users", "/admin/views/settings"] {
        let before = repo.lookups.load(Ordering::SeqCst);
        let response = get(&app, uri, Some(SUPER_ADMIN_ID)).await;
        assert_eq!(response.status(), StatusCode::OK, "{uri}");
        assert_eq!(repo.lookups.load(Ordering::SeqCst) - before, 1, "{uri}");
    }

    // A per-view denial reuses the session the guard already resolved.
    let before = repo.lookups.load(Ordering::SeqCst);
    let response = get(&app, "/admin/views/users", Some(RECRUITER_ID)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(repo.lookups.load(Ordering::SeqCst) - before, 1);
}

#[tokio::test]
async fn test_request_id_is_propagated() {
    let app = test_app(profiles());
    let response = get(&app, "/health", None).await;
    assert!(response.headers().contains_key("x-request-id"));
}
