use crate::models::User;
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

/// Repository Trait
///
/// The identity lookup the authorization layer depends on. The profile store itself
/// belongs to the job-board backend; this crate only reads the role label from it.
///
/// **Send + Sync + async_trait** are required to share `Arc<dyn Repository>` across
/// Axum's request tasks.
#[async_trait]
pub trait Repository: Send + Sync {
    /// Looks up a profile by ID. `None` when the profile is missing or the lookup failed.
    async fn get_user(&self, id: Uuid) -> Option<User>;
}

/// RepositoryState
///
/// The concrete type used to share the identity lookup across the application state.
pub type RepositoryState = Arc<dyn Repository>;

/// PostgresRepository
///
/// `Repository` backed by the job board's PostgreSQL database.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    /// get_user
    ///
    /// Reads the current role on every call so a role change applies on the next request.
    /// Database errors are logged and treated as "no such user", which the extractor turns
    /// into a 401.
    async fn get_user(&self, id: Uuid) -> Option<User> {
        let result = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, role
            FROM public.profiles
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;

        match result {
            Ok(user) => user,
            Err(e) => {
                tracing::error!("get_user error: {:?}", e);
                None
            }
        }
    }
}
