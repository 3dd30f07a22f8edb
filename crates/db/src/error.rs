//! Translation of `sqlx` errors into the domain taxonomy.

use sitesafe_core::error::CoreError;
use sitesafe_core::types::DbId;

/// PostgreSQL `unique_violation`.
const PG_UNIQUE_VIOLATION: &str = "23505";

/// PostgreSQL `foreign_key_violation`.
const PG_FOREIGN_KEY_VIOLATION: &str = "23503";

/// PostgreSQL `check_violation`.
const PG_CHECK_VIOLATION: &str = "23514";

/// Classify a sqlx error.
///
/// - `RowNotFound` and foreign key violations become `NotFound` for
///   `entity`/`id`.
/// - Unique violations become `Conflict`.
/// - Check violations become `Validation`.
/// - I/O, TLS and pool errors become `Network`.
/// - Everything else is `Internal`.
pub fn map_sqlx_error(err: sqlx::Error, entity: &'static str, id: DbId) -> CoreError {
    match &err {
        sqlx::Error::RowNotFound => CoreError::not_found(entity, id),
        sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
            Some(PG_UNIQUE_VIOLATION) => CoreError::Conflict(format!(
                "Duplicate value violates unique constraint: {}",
                db_err.constraint().unwrap_or("unknown")
            )),
            Some(PG_FOREIGN_KEY_VIOLATION) => CoreError::not_found(entity, id),
            Some(PG_CHECK_VIOLATION) => CoreError::Validation(format!(
                "Value violates check constraint: {}",
                db_err.constraint().unwrap_or("unknown")
            )),
            _ => {
                tracing::error!(error = %db_err, entity, id, "Database error");
                CoreError::Internal(db_err.to_string())
            }
        },
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => {
            tracing::warn!(error = %err, entity, id, "Database transport error");
            CoreError::Network(err.to_string())
        }
        other => {
            tracing::error!(error = %other, entity, id, "Database error");
            CoreError::Internal(other.to_string())
        }
    }
}
