//! Document models.

use serde::{Deserialize, Serialize};
use sitesafe_core::document::{Document, DocumentKind};
use sitesafe_core::error::CoreError;
use sitesafe_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `documents` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DocumentRow {
    pub id: DbId,
    pub site_id: DbId,
    pub kind: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TryFrom<DocumentRow> for Document {
    type Error = CoreError;

    fn try_from(row: DocumentRow) -> Result<Self, Self::Error> {
        Ok(Document {
            id: row.id,
            site_id: row.site_id,
            kind: DocumentKind::from_str_value(&row.kind).map_err(CoreError::Internal)?,
        })
    }
}

/// DTO for creating a document.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateDocument {
    pub site_id: DbId,
    pub kind: DocumentKind,
}
