//! Contracts for the server of record.
//!
//! The reconciler and the ledger talk to storage only through these traits.
//! Implementations own transport concerns (timeouts, retries, pooling).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::assignment::AssignmentRecord;
use crate::error::CoreError;
use crate::signature::{SignRequest, Signature};
use crate::site::Worker;
use crate::types::DbId;

/// Arguments of a `select` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectWorker {
    pub worker_id: DbId,
    pub site_id: DbId,
    pub note: Option<String>,
    pub selected_by: Option<DbId>,
}

/// Worker-to-site assignment storage.
///
/// `select_worker_for_site` must be idempotent: an already active pair is
/// returned unchanged and a soft-deselected pair is reactivated in place.
#[async_trait]
pub trait AssignmentBackend: Send + Sync {
    async fn select_worker_for_site(&self, input: &SelectWorker)
        -> Result<AssignmentRecord, CoreError>;

    /// Flip the pair to deselected. Returns `true` if a row changed.
    async fn deselect_worker_from_site(&self, worker_id: DbId, site_id: DbId)
        -> Result<bool, CoreError>;

    /// Workers with an active selection on the site.
    async fn get_workers_for_site(&self, site_id: DbId) -> Result<Vec<Worker>, CoreError>;

    /// Every record for the site, active or not. `NotFound` for an unknown
    /// site.
    async fn get_selections_for_site(&self, site_id: DbId)
        -> Result<Vec<AssignmentRecord>, CoreError>;
}

/// Signature storage, split by signer population.
#[async_trait]
pub trait SignatureBackend: Send + Sync {
    async fn sign_by_worker(&self, request: &SignRequest) -> Result<Signature, CoreError>;

    async fn sign_by_user(&self, request: &SignRequest) -> Result<Signature, CoreError>;

    async fn unsign_by_worker(&self, worker_id: DbId, signature_id: DbId) -> Result<(), CoreError>;

    async fn unsign_by_user(&self, user_id: DbId, signature_id: DbId) -> Result<(), CoreError>;

    async fn get_signatures_by_document(&self, document_id: DbId)
        -> Result<Vec<Signature>, CoreError>;
}
