//! Repository for the `work_sites` table.

use sitesafe_core::types::DbId;
use sqlx::PgPool;

use crate::models::work_site::{CreateWorkSite, WorkSiteRow};

/// Column list for work_sites queries.
const COLUMNS: &str = "id, name, start_date, end_date, hour_count, is_annual, \
    is_dangerous_work, authorizing_user_id, terminal_status, created_at, updated_at";

/// Provides data access for work sites.
pub struct WorkSiteRepo;

impl WorkSiteRepo {
    /// Insert a new site, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateWorkSite) -> Result<WorkSiteRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO work_sites
                (name, start_date, end_date, hour_count, is_annual, is_dangerous_work,
                 authorizing_user_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WorkSiteRow>(&query)
            .bind(&input.name)
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(input.hour_count)
            .bind(input.is_annual)
            .bind(input.is_dangerous_work)
            .bind(input.authorizing_user_id)
            .fetch_one(pool)
            .await
    }

    /// Whether a site with this ID exists.
    pub async fn exists(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM work_sites WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// List every site, ordered by start date then name.
    pub async fn list(pool: &PgPool) -> Result<Vec<WorkSiteRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM work_sites ORDER BY start_date, name");
        sqlx::query_as::<_, WorkSiteRow>(&query).fetch_all(pool).await
    }
}
