//! Work site models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sitesafe_core::error::CoreError;
use sitesafe_core::site::{validate_hour_count, validate_site_name, DateRange, WorkSite};
use sitesafe_core::site_status::TerminalStatus;
use sitesafe_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `work_sites` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WorkSiteRow {
    pub id: DbId,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub hour_count: i32,
    pub is_annual: bool,
    pub is_dangerous_work: bool,
    pub authorizing_user_id: DbId,
    pub terminal_status: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TryFrom<WorkSiteRow> for WorkSite {
    type Error = CoreError;

    fn try_from(row: WorkSiteRow) -> Result<Self, Self::Error> {
        let terminal_status = row
            .terminal_status
            .as_deref()
            .map(TerminalStatus::from_str_value)
            .transpose()
            .map_err(CoreError::Internal)?;

        Ok(WorkSite {
            id: row.id,
            name: row.name,
            dates: DateRange::new(row.start_date, row.end_date)?,
            hour_count: row.hour_count,
            is_annual: row.is_annual,
            is_dangerous_work: row.is_dangerous_work,
            authorizing_user_id: row.authorizing_user_id,
            terminal_status,
        })
    }
}

/// DTO for creating a work site.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateWorkSite {
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub hour_count: i32,
    pub is_annual: bool,
    pub is_dangerous_work: bool,
    pub authorizing_user_id: DbId,
}

impl CreateWorkSite {
    /// Check the input before it reaches the database.
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_site_name(&self.name)?;
        validate_hour_count(self.hour_count)?;
        DateRange::new(self.start_date, self.end_date)?;
        Ok(())
    }
}
