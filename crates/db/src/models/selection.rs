//! Worker-to-site selection models.

use serde::Serialize;
use sitesafe_core::assignment::AssignmentRecord;
use sitesafe_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `worker_site_selections` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SelectionRow {
    pub id: DbId,
    pub worker_id: DbId,
    pub site_id: DbId,
    pub is_selected: bool,
    pub selection_date: Timestamp,
    pub note: Option<String>,
    pub selected_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<SelectionRow> for AssignmentRecord {
    fn from(row: SelectionRow) -> Self {
        AssignmentRecord {
            worker_id: row.worker_id,
            site_id: row.site_id,
            is_selected: row.is_selected,
            selection_date: row.selection_date,
            note: row.note,
            selected_by: row.selected_by,
        }
    }
}
