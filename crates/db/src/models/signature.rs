//! Signature models.

use serde::Serialize;
use sitesafe_core::error::CoreError;
use sitesafe_core::identity::SignerRef;
use sitesafe_core::signature::Signature;
use sitesafe_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `signatures` table, without the image payload.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SignatureRow {
    pub id: DbId,
    pub document_id: DbId,
    pub worker_id: Option<DbId>,
    pub user_id: Option<DbId>,
    pub signer_name: String,
    pub created_at: Timestamp,
}

impl TryFrom<SignatureRow> for Signature {
    type Error = CoreError;

    fn try_from(row: SignatureRow) -> Result<Self, Self::Error> {
        Ok(Signature {
            id: row.id,
            document_id: row.document_id,
            signer: SignerRef::from_parts(row.worker_id, row.user_id)?,
            signer_name: row.signer_name,
            created_at: row.created_at,
        })
    }
}

/// Insert payload: the request fields plus the resolved signer columns.
#[derive(Debug, Clone)]
pub struct NewSignature<'a> {
    pub document_id: DbId,
    pub signer: SignerRef,
    pub signer_name: &'a str,
    pub signature_image: &'a str,
}
