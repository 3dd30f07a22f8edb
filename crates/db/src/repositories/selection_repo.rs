//! Repository for the `worker_site_selections` table.
//!
//! Rows are never deleted: deselection flips `is_selected` so the history
//! of who was on a site survives.

use sitesafe_core::types::DbId;
use sqlx::PgPool;

use crate::models::selection::SelectionRow;

/// Column list for the `worker_site_selections` table.
const COLUMNS: &str = "id, worker_id, site_id, is_selected, selection_date, note, \
    selected_by, created_at, updated_at";

/// Provides data access for worker selections.
pub struct SelectionRepo;

impl SelectionRepo {
    /// Select a worker for a site.
    ///
    /// - No row: insert an active one.
    /// - Active row: returned unchanged.
    /// - Deselected row: reactivated in place with a fresh selection date;
    ///   `note` and `selected_by` are replaced only when provided.
    pub async fn select(
        pool: &PgPool,
        worker_id: DbId,
        site_id: DbId,
        note: Option<&str>,
        selected_by: Option<DbId>,
    ) -> Result<SelectionRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO worker_site_selections (worker_id, site_id, is_selected, note, selected_by) \
             VALUES ($1, $2, true, $3, $4) \
             ON CONFLICT (worker_id, site_id) DO UPDATE SET \
                is_selected = true, \
                selection_date = CASE WHEN worker_site_selections.is_selected \
                    THEN worker_site_selections.selection_date ELSE now() END, \
                note = CASE WHEN worker_site_selections.is_selected \
                    THEN worker_site_selections.note \
                    ELSE COALESCE(EXCLUDED.note, worker_site_selections.note) END, \
                selected_by = CASE WHEN worker_site_selections.is_selected \
                    THEN worker_site_selections.selected_by \
                    ELSE COALESCE(EXCLUDED.selected_by, worker_site_selections.selected_by) END, \
                updated_at = CASE WHEN worker_site_selections.is_selected \
                    THEN worker_site_selections.updated_at ELSE now() END \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SelectionRow>(&query)
            .bind(worker_id)
            .bind(site_id)
            .bind(note)
            .bind(selected_by)
            .fetch_one(pool)
            .await
    }

    /// Flip an active selection to deselected.
    ///
    /// Returns `true` if a row changed.
    pub async fn deselect(pool: &PgPool, worker_id: DbId, site_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE worker_site_selections \
             SET is_selected = false, updated_at = now() \
             WHERE worker_id = $1 AND site_id = $2 AND is_selected = true",
        )
        .bind(worker_id)
        .bind(site_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Every selection row for a site, active or not, ordered by worker.
    pub async fn list_for_site(pool: &PgPool, site_id: DbId) -> Result<Vec<SelectionRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM worker_site_selections WHERE site_id = $1 ORDER BY worker_id"
        );
        sqlx::query_as::<_, SelectionRow>(&query)
            .bind(site_id)
            .fetch_all(pool)
            .await
    }
}
