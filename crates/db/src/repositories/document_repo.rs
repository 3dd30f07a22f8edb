//! Repository for the `documents` table.

use sitesafe_core::types::DbId;
use sqlx::PgPool;

use crate::models::document::{CreateDocument, DocumentRow};

/// Column list for documents queries.
const COLUMNS: &str = "id, site_id, kind, created_at, updated_at";

/// Provides data access for site documents.
pub struct DocumentRepo;

impl DocumentRepo {
    /// Insert a new document, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateDocument) -> Result<DocumentRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO documents (site_id, kind) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DocumentRow>(&query)
            .bind(input.site_id)
            .bind(input.kind.as_str())
            .fetch_one(pool)
            .await
    }

    /// Whether a document with this ID exists.
    pub async fn exists(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM documents WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// Documents attached to a site, oldest first.
    pub async fn list_for_site(pool: &PgPool, site_id: DbId) -> Result<Vec<DocumentRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM documents WHERE site_id = $1 ORDER BY created_at, id"
        );
        sqlx::query_as::<_, DocumentRow>(&query)
            .bind(site_id)
            .fetch_all(pool)
            .await
    }
}
