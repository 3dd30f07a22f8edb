//! Signature ledger.
//!
//! Records signatures on a document from two disjoint signer populations.
//! At most one active signature exists per (document, signer); replacing a
//! signature takes an explicit [`unsign`](SignatureLedger::unsign) first.
//! Completion is recomputed from a fresh listing on every call.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::backend::SignatureBackend;
use crate::error::CoreError;
use crate::identity::SignerRef;
use crate::keyed_lock::KeyedLocks;
use crate::signature::{evaluate_completion, sort_for_display, DocumentCompletion, SignRequest, Signature};
use crate::types::DbId;

pub struct SignatureLedger {
    backend: Arc<dyn SignatureBackend>,
    document_locks: KeyedLocks,
}

impl SignatureLedger {
    pub fn new(backend: Arc<dyn SignatureBackend>) -> Self {
        Self {
            backend,
            document_locks: KeyedLocks::new(),
        }
    }

    /// Sign `document_id` as `signer`.
    ///
    /// Input is validated before any backend call. Fails with `Conflict`
    /// when the signer already has an active signature on the document.
    pub async fn sign(
        &self,
        document_id: DbId,
        signer: SignerRef,
        display_name: &str,
        signature_image: &[u8],
    ) -> Result<Signature, CoreError> {
        let request = SignRequest::build(document_id, signer, display_name, signature_image)?;

        let _guard = self.document_locks.acquire(document_id).await;

        let existing = self.backend.get_signatures_by_document(document_id).await?;
        if let Some(active) = existing.iter().find(|s| s.signer == signer) {
            return Err(CoreError::Conflict(format!(
                "{signer} already signed document {document_id} (signature {}); unsign first",
                active.id
            )));
        }

        let signature = match signer {
            SignerRef::Worker(_) => self.backend.sign_by_worker(&request).await?,
            SignerRef::User(_) => self.backend.sign_by_user(&request).await?,
        };

        tracing::info!(
            document_id,
            signer = %signer,
            signature_id = signature.id,
            "Document signed",
        );
        Ok(signature)
    }

    /// Remove the signature `signature_id` held by `signer` on
    /// `document_id`.
    ///
    /// `NotFound` means the caller's list is stale: refresh with
    /// [`list_signatures`](Self::list_signatures) instead of retrying.
    pub async fn unsign(
        &self,
        document_id: DbId,
        signer: SignerRef,
        signature_id: DbId,
    ) -> Result<(), CoreError> {
        let _guard = self.document_locks.acquire(document_id).await;

        let existing = self.backend.get_signatures_by_document(document_id).await?;
        let addressed = existing
            .iter()
            .any(|s| s.id == signature_id && s.signer == signer);
        if !addressed {
            return Err(CoreError::not_found("signature", signature_id));
        }

        match signer {
            SignerRef::Worker(worker_id) => {
                self.backend.unsign_by_worker(worker_id, signature_id).await?
            }
            SignerRef::User(user_id) => self.backend.unsign_by_user(user_id, signature_id).await?,
        }

        tracing::info!(document_id, signer = %signer, signature_id, "Signature removed");
        Ok(())
    }

    /// Active signatures on `document_id`, oldest first.
    pub async fn list_signatures(&self, document_id: DbId) -> Result<Vec<Signature>, CoreError> {
        let mut signatures = self.backend.get_signatures_by_document(document_id).await?;
        sort_for_display(&mut signatures);
        Ok(signatures)
    }

    /// Whether every signer in `required` has an active signature.
    pub async fn is_fully_signed(
        &self,
        document_id: DbId,
        required: &BTreeSet<SignerRef>,
    ) -> Result<bool, CoreError> {
        Ok(self.completion(document_id, required).await?.is_complete())
    }

    /// Signed/missing breakdown for `document_id` against `required`.
    pub async fn completion(
        &self,
        document_id: DbId,
        required: &BTreeSet<SignerRef>,
    ) -> Result<DocumentCompletion, CoreError> {
        let signatures = self.backend.get_signatures_by_document(document_id).await?;
        Ok(evaluate_completion(document_id, required, &signatures))
    }
}
