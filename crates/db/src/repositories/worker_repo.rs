//! Repositories for the `workers` and `authorizing_users` tables.

use sitesafe_core::types::DbId;
use sqlx::PgPool;

use crate::models::worker::{AuthorizingUserRow, CreateAuthorizingUser, CreateWorker, WorkerRow};

/// Column list for workers queries.
const WORKER_COLUMNS: &str = "id, first_name, last_name, company_id, created_at, updated_at";

/// Column list for authorizing_users queries.
const USER_COLUMNS: &str = "id, first_name, last_name, role, created_at, updated_at";

/// Provides data access for workers.
pub struct WorkerRepo;

impl WorkerRepo {
    /// Insert a new worker, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateWorker) -> Result<WorkerRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO workers (first_name, last_name, company_id)
             VALUES ($1, $2, $3)
             RETURNING {WORKER_COLUMNS}"
        );
        sqlx::query_as::<_, WorkerRow>(&query)
            .bind(&input.first_name)
            .bind(&input.last_name)
            .bind(input.company_id)
            .fetch_one(pool)
            .await
    }

    /// Whether a worker with this ID exists.
    pub async fn exists(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM workers WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// Workers with an active selection on `site_id`, ordered by name.
    pub async fn list_selected_for_site(
        pool: &PgPool,
        site_id: DbId,
    ) -> Result<Vec<WorkerRow>, sqlx::Error> {
        sqlx::query_as::<_, WorkerRow>(
            "SELECT w.id, w.first_name, w.last_name, w.company_id, w.created_at, w.updated_at
             FROM workers w
             JOIN worker_site_selections s ON s.worker_id = w.id
             WHERE s.site_id = $1 AND s.is_selected = true
             ORDER BY w.last_name, w.first_name",
        )
        .bind(site_id)
        .fetch_all(pool)
        .await
    }
}

/// Provides data access for authorizing users.
pub struct AuthorizingUserRepo;

impl AuthorizingUserRepo {
    /// Insert a new authorizing user, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateAuthorizingUser,
    ) -> Result<AuthorizingUserRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO authorizing_users (first_name, last_name, role)
             VALUES ($1, $2, $3)
             RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, AuthorizingUserRow>(&query)
            .bind(&input.first_name)
            .bind(&input.last_name)
            .bind(&input.role)
            .fetch_one(pool)
            .await
    }

    /// Whether an authorizing user with this ID exists.
    pub async fn exists(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM authorizing_users WHERE id = $1)",
        )
        .bind(id)
        .fetch_one(pool)
        .await
    }
}
