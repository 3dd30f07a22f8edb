//! Worker and authorizing user models.

use serde::{Deserialize, Serialize};
use sitesafe_core::site::{AuthorizingUser, Worker};
use sitesafe_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `workers` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WorkerRow {
    pub id: DbId,
    pub first_name: String,
    pub last_name: String,
    pub company_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<WorkerRow> for Worker {
    fn from(row: WorkerRow) -> Self {
        Worker {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            company_id: row.company_id,
        }
    }
}

/// DTO for creating a worker.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateWorker {
    pub first_name: String,
    pub last_name: String,
    pub company_id: DbId,
}

/// A row from the `authorizing_users` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AuthorizingUserRow {
    pub id: DbId,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<AuthorizingUserRow> for AuthorizingUser {
    fn from(row: AuthorizingUserRow) -> Self {
        AuthorizingUser {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            role: row.role,
        }
    }
}

/// DTO for creating an authorizing user.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAuthorizingUser {
    pub first_name: String,
    pub last_name: String,
    pub role: String,
}
