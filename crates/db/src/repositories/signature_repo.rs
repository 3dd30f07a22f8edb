//! Repository for the `signatures` table.

use sitesafe_core::identity::SignerRef;
use sitesafe_core::types::DbId;
use sqlx::PgPool;

use crate::models::signature::{NewSignature, SignatureRow};

/// Column list for signature listings. The image is not read back.
const COLUMNS: &str = "id, document_id, worker_id, user_id, signer_name, created_at";

/// Provides data access for document signatures.
pub struct SignatureRepo;

impl SignatureRepo {
    /// Insert a signature.
    ///
    /// The partial unique indexes reject a second active signature for the
    /// same signer with a unique violation.
    pub async fn create(pool: &PgPool, input: &NewSignature<'_>) -> Result<SignatureRow, sqlx::Error> {
        let parts = input.signer.into_parts();
        let query = format!(
            "INSERT INTO signatures (document_id, worker_id, user_id, signer_name, signature_image)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SignatureRow>(&query)
            .bind(input.document_id)
            .bind(parts.worker_id)
            .bind(parts.user_id)
            .bind(input.signer_name)
            .bind(input.signature_image)
            .fetch_one(pool)
            .await
    }

    /// Delete `signature_id` if it belongs to `signer`.
    ///
    /// Returns `true` if a row was removed.
    pub async fn delete_for_signer(
        pool: &PgPool,
        signer: SignerRef,
        signature_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let column = match signer {
            SignerRef::Worker(_) => "worker_id",
            SignerRef::User(_) => "user_id",
        };
        let query = format!("DELETE FROM signatures WHERE id = $1 AND {column} = $2");
        let result = sqlx::query(&query)
            .bind(signature_id)
            .bind(signer.id())
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Signatures on a document, oldest first.
    pub async fn list_for_document(
        pool: &PgPool,
        document_id: DbId,
    ) -> Result<Vec<SignatureRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM signatures WHERE document_id = $1 ORDER BY created_at, id"
        );
        sqlx::query_as::<_, SignatureRow>(&query)
            .bind(document_id)
            .fetch_all(pool)
            .await
    }
}
