//! PostgreSQL implementations of the `sitesafe_core` storage contracts.

use async_trait::async_trait;
use sitesafe_core::assignment::AssignmentRecord;
use sitesafe_core::backend::{AssignmentBackend, SelectWorker, SignatureBackend};
use sitesafe_core::error::CoreError;
use sitesafe_core::identity::SignerRef;
use sitesafe_core::signature::{SignRequest, Signature};
use sitesafe_core::site::{join_name, Worker};
use sitesafe_core::types::DbId;

use crate::error::map_sqlx_error;
use crate::models::signature::NewSignature;
use crate::repositories::{
    AuthorizingUserRepo, DocumentRepo, SelectionRepo, SignatureRepo, WorkSiteRepo, WorkerRepo,
};
use crate::DbPool;

// ---------------------------------------------------------------------------
// Assignments
// ---------------------------------------------------------------------------

/// Assignment storage backed by `worker_site_selections`.
#[derive(Clone)]
pub struct PgAssignmentBackend {
    pool: DbPool,
}

impl PgAssignmentBackend {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn ensure_site(&self, site_id: DbId) -> Result<(), CoreError> {
        let exists = WorkSiteRepo::exists(&self.pool, site_id)
            .await
            .map_err(|e| map_sqlx_error(e, "work_site", site_id))?;
        if exists {
            Ok(())
        } else {
            Err(CoreError::not_found("work_site", site_id))
        }
    }

    async fn ensure_worker(&self, worker_id: DbId) -> Result<(), CoreError> {
        let exists = WorkerRepo::exists(&self.pool, worker_id)
            .await
            .map_err(|e| map_sqlx_error(e, "worker", worker_id))?;
        if exists {
            Ok(())
        } else {
            Err(CoreError::not_found("worker", worker_id))
        }
    }
}

#[async_trait]
impl AssignmentBackend for PgAssignmentBackend {
    async fn select_worker_for_site(&self, input: &SelectWorker) -> Result<AssignmentRecord, CoreError> {
        self.ensure_site(input.site_id).await?;
        self.ensure_worker(input.worker_id).await?;
        if let Some(user_id) = input.selected_by {
            let exists = AuthorizingUserRepo::exists(&self.pool, user_id)
                .await
                .map_err(|e| map_sqlx_error(e, "authorizing_user", user_id))?;
            if !exists {
                return Err(CoreError::not_found("authorizing_user", user_id));
            }
        }
        let row = SelectionRepo::select(
            &self.pool,
            input.worker_id,
            input.site_id,
            input.note.as_deref(),
            input.selected_by,
        )
        .await
        .map_err(|e| map_sqlx_error(e, "worker", input.worker_id))?;

        tracing::debug!(
            worker_id = input.worker_id,
            site_id = input.site_id,
            "Worker selected for site",
        );
        Ok(row.into())
    }

    async fn deselect_worker_from_site(&self, worker_id: DbId, site_id: DbId) -> Result<bool, CoreError> {
        self.ensure_site(site_id).await?;
        self.ensure_worker(worker_id).await?;
        let changed = SelectionRepo::deselect(&self.pool, worker_id, site_id)
            .await
            .map_err(|e| map_sqlx_error(e, "worker", worker_id))?;

        tracing::debug!(worker_id, site_id, changed, "Worker deselected from site");
        Ok(changed)
    }

    async fn get_workers_for_site(&self, site_id: DbId) -> Result<Vec<Worker>, CoreError> {
        self.ensure_site(site_id).await?;
        let rows = WorkerRepo::list_selected_for_site(&self.pool, site_id)
            .await
            .map_err(|e| map_sqlx_error(e, "work_site", site_id))?;
        Ok(rows.into_iter().map(Worker::from).collect())
    }

    async fn get_selections_for_site(&self, site_id: DbId) -> Result<Vec<AssignmentRecord>, CoreError> {
        self.ensure_site(site_id).await?;
        let rows = SelectionRepo::list_for_site(&self.pool, site_id)
            .await
            .map_err(|e| map_sqlx_error(e, "work_site", site_id))?;
        Ok(rows.into_iter().map(AssignmentRecord::from).collect())
    }
}

// ---------------------------------------------------------------------------
// Signatures
// ---------------------------------------------------------------------------

/// Signature storage backed by `signatures`.
#[derive(Clone)]
pub struct PgSignatureBackend {
    pool: DbPool,
}

impl PgSignatureBackend {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn insert(&self, request: &SignRequest, signer: SignerRef) -> Result<Signature, CoreError> {
        // Reject undecodable payloads before they are stored.
        request.decode_image()?;
        self.ensure_document(request.document_id).await?;

        let signer_name = join_name(&request.first_name, &request.last_name);
        let input = NewSignature {
            document_id: request.document_id,
            signer,
            signer_name: &signer_name,
            signature_image: &request.signature_image,
        };
        // The document was just checked, so a foreign key miss is the signer.
        let row = SignatureRepo::create(&self.pool, &input)
            .await
            .map_err(|e| map_sqlx_error(e, signer_entity(signer), signer.id()))?;
        row.try_into()
    }

    async fn ensure_document(&self, document_id: DbId) -> Result<(), CoreError> {
        let exists = DocumentRepo::exists(&self.pool, document_id)
            .await
            .map_err(|e| map_sqlx_error(e, "document", document_id))?;
        if exists {
            Ok(())
        } else {
            Err(CoreError::not_found("document", document_id))
        }
    }

    async fn remove(&self, signer: SignerRef, signature_id: DbId) -> Result<(), CoreError> {
        let removed = SignatureRepo::delete_for_signer(&self.pool, signer, signature_id)
            .await
            .map_err(|e| map_sqlx_error(e, "signature", signature_id))?;
        if removed {
            Ok(())
        } else {
            Err(CoreError::not_found("signature", signature_id))
        }
    }
}

#[async_trait]
impl SignatureBackend for PgSignatureBackend {
    async fn sign_by_worker(&self, request: &SignRequest) -> Result<Signature, CoreError> {
        self.insert(request, SignerRef::Worker(request.signer_id)).await
    }

    async fn sign_by_user(&self, request: &SignRequest) -> Result<Signature, CoreError> {
        self.insert(request, SignerRef::User(request.signer_id)).await
    }

    async fn unsign_by_worker(&self, worker_id: DbId, signature_id: DbId) -> Result<(), CoreError> {
        self.remove(SignerRef::Worker(worker_id), signature_id).await
    }

    async fn unsign_by_user(&self, user_id: DbId, signature_id: DbId) -> Result<(), CoreError> {
        self.remove(SignerRef::User(user_id), signature_id).await
    }

    async fn get_signatures_by_document(&self, document_id: DbId) -> Result<Vec<Signature>, CoreError> {
        self.ensure_document(document_id).await?;

        let rows = SignatureRepo::list_for_document(&self.pool, document_id)
            .await
            .map_err(|e| map_sqlx_error(e, "document", document_id))?;
        rows.into_iter().map(Signature::try_from).collect()
    }
}

fn signer_entity(signer: SignerRef) -> &'static str {
    match signer {
        SignerRef::Worker(_) => "worker",
        SignerRef::User(_) => "authorizing_user",
    }
}
