//! In-process backend implementing both storage contracts.
//!
//! Records live in id-keyed maps. Every call is appended to a call log,
//! individual workers can be made to fail, and an artificial latency can be
//! added to mutating calls. Used by tests and local tooling.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use crate::assignment::AssignmentRecord;
use crate::backend::{AssignmentBackend, SelectWorker, SignatureBackend};
use crate::document::Document;
use crate::error::CoreError;
use crate::identity::{AssignmentKey, SignerRef};
use crate::signature::{SignRequest, Signature};
use crate::site::{join_name, AuthorizingUser, WorkSite, Worker};
use crate::types::DbId;

/// One backend call, as observed by [`InMemoryBackend`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendCall {
    Select { worker_id: DbId, site_id: DbId },
    Deselect { worker_id: DbId, site_id: DbId },
    ReadSelections { site_id: DbId },
    Sign { document_id: DbId, signer: SignerRef },
    Unsign { signer: SignerRef, signature_id: DbId },
}

impl BackendCall {
    /// Worker referenced by an assignment mutation.
    pub fn mutated_worker(&self) -> Option<DbId> {
        match self {
            Self::Select { worker_id, .. } | Self::Deselect { worker_id, .. } => Some(*worker_id),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct State {
    sites: HashMap<DbId, WorkSite>,
    workers: HashMap<DbId, Worker>,
    users: HashMap<DbId, AuthorizingUser>,
    documents: HashMap<DbId, Document>,
    selections: BTreeMap<AssignmentKey, AssignmentRecord>,
    signatures: BTreeMap<DbId, Signature>,
    next_signature_id: DbId,
    failing_workers: HashSet<DbId>,
    failing_reads: bool,
    calls: Vec<BackendCall>,
}

#[derive(Debug, Default)]
pub struct InMemoryBackend {
    state: Mutex<State>,
    latency: Option<Duration>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every mutating call by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    async fn delay(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }

    // ---- seeding ----

    pub fn insert_site(&self, site: WorkSite) {
        self.state().sites.insert(site.id, site);
    }

    pub fn insert_worker(&self, worker: Worker) {
        self.state().workers.insert(worker.id, worker);
    }

    pub fn insert_user(&self, user: AuthorizingUser) {
        self.state().users.insert(user.id, user);
    }

    pub fn insert_document(&self, document: Document) {
        self.state().documents.insert(document.id, document);
    }

    /// Make every assignment mutation for `worker_id` fail with a network
    /// error.
    pub fn fail_worker(&self, worker_id: DbId) {
        self.state().failing_workers.insert(worker_id);
    }

    pub fn heal_worker(&self, worker_id: DbId) {
        self.state().failing_workers.remove(&worker_id);
    }

    /// Make `get_selections_for_site` fail with a network error.
    pub fn fail_selection_reads(&self) {
        self.state().failing_reads = true;
    }

    pub fn heal_selection_reads(&self) {
        self.state().failing_reads = false;
    }

    // ---- inspection ----

    pub fn calls(&self) -> Vec<BackendCall> {
        self.state().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }

    /// Number of stored records for the pair, active or not.
    pub fn record_count(&self, worker_id: DbId, site_id: DbId) -> usize {
        let key = AssignmentKey::new(worker_id, site_id);
        usize::from(self.state().selections.contains_key(&key))
    }

    pub fn record(&self, worker_id: DbId, site_id: DbId) -> Option<AssignmentRecord> {
        let key = AssignmentKey::new(worker_id, site_id);
        self.state().selections.get(&key).cloned()
    }

    // ---- shared helpers ----

    fn check_assignment_target(state: &State, worker_id: DbId, site_id: DbId) -> Result<(), CoreError> {
        if !state.sites.contains_key(&site_id) {
            return Err(CoreError::not_found("work_site", site_id));
        }
        if !state.workers.contains_key(&worker_id) {
            return Err(CoreError::not_found("worker", worker_id));
        }
        if state.failing_workers.contains(&worker_id) {
            return Err(CoreError::Network(format!(
                "connection reset while updating worker {worker_id}"
            )));
        }
        Ok(())
    }

    fn insert_signature(&self, request: &SignRequest, signer: SignerRef) -> Result<Signature, CoreError> {
        let mut state = self.state();
        state.calls.push(BackendCall::Sign {
            document_id: request.document_id,
            signer,
        });

        if !state.documents.contains_key(&request.document_id) {
            return Err(CoreError::not_found("document", request.document_id));
        }
        let known = match signer {
            SignerRef::Worker(id) => state.workers.contains_key(&id),
            SignerRef::User(id) => state.users.contains_key(&id),
        };
        if !known {
            let entity = if signer.is_worker() { "worker" } else { "authorizing_user" };
            return Err(CoreError::not_found(entity, signer.id()));
        }
        if state
            .signatures
            .values()
            .any(|s| s.document_id == request.document_id && s.signer == signer)
        {
            return Err(CoreError::Conflict(format!(
                "{signer} already signed document {}",
                request.document_id
            )));
        }

        state.next_signature_id += 1;
        let signature = Signature {
            id: state.next_signature_id,
            document_id: request.document_id,
            signer,
            signer_name: join_name(&request.first_name, &request.last_name),
            created_at: Utc::now(),
        };
        state.signatures.insert(signature.id, signature.clone());
        Ok(signature)
    }

    fn remove_signature(&self, signer: SignerRef, signature_id: DbId) -> Result<(), CoreError> {
        let mut state = self.state();
        state.calls.push(BackendCall::Unsign { signer, signature_id });

        match state.signatures.get(&signature_id) {
            Some(s) if s.signer == signer => {
                state.signatures.remove(&signature_id);
                Ok(())
            }
            _ => Err(CoreError::not_found("signature", signature_id)),
        }
    }
}

#[async_trait]
impl AssignmentBackend for InMemoryBackend {
    async fn select_worker_for_site(&self, input: &SelectWorker) -> Result<AssignmentRecord, CoreError> {
        self.delay().await;
        let mut state = self.state();
        state.calls.push(BackendCall::Select {
            worker_id: input.worker_id,
            site_id: input.site_id,
        });
        Self::check_assignment_target(&state, input.worker_id, input.site_id)?;
        if let Some(user_id) = input.selected_by {
            if !state.users.contains_key(&user_id) {
                return Err(CoreError::not_found("authorizing_user", user_id));
            }
        }

        let key = AssignmentKey::new(input.worker_id, input.site_id);
        let record = state
            .selections
            .entry(key)
            .and_modify(|existing| {
                if !existing.is_selected {
                    existing.is_selected = true;
                    existing.selection_date = Utc::now();
                    if input.note.is_some() {
                        existing.note = input.note.clone();
                    }
                    if input.selected_by.is_some() {
                        existing.selected_by = input.selected_by;
                    }
                }
            })
            .or_insert_with(|| AssignmentRecord {
                worker_id: input.worker_id,
                site_id: input.site_id,
                is_selected: true,
                selection_date: Utc::now(),
                note: input.note.clone(),
                selected_by: input.selected_by,
            });
        Ok(record.clone())
    }

    async fn deselect_worker_from_site(&self, worker_id: DbId, site_id: DbId) -> Result<bool, CoreError> {
        self.delay().await;
        let mut state = self.state();
        state.calls.push(BackendCall::Deselect { worker_id, site_id });
        Self::check_assignment_target(&state, worker_id, site_id)?;

        match state.selections.get_mut(&AssignmentKey::new(worker_id, site_id)) {
            Some(record) if record.is_selected => {
                record.is_selected = false;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn get_workers_for_site(&self, site_id: DbId) -> Result<Vec<Worker>, CoreError> {
        let state = self.state();
        if !state.sites.contains_key(&site_id) {
            return Err(CoreError::not_found("work_site", site_id));
        }
        Ok(state
            .selections
            .values()
            .filter(|r| r.site_id == site_id && r.is_selected)
            .filter_map(|r| state.workers.get(&r.worker_id).cloned())
            .collect())
    }

    async fn get_selections_for_site(&self, site_id: DbId) -> Result<Vec<AssignmentRecord>, CoreError> {
        let mut state = self.state();
        state.calls.push(BackendCall::ReadSelections { site_id });
        if state.failing_reads {
            return Err(CoreError::Network(format!(
                "read timed out for site {site_id} selections"
            )));
        }
        if !state.sites.contains_key(&site_id) {
            return Err(CoreError::not_found("work_site", site_id));
        }
        Ok(state
            .selections
            .values()
            .filter(|r| r.site_id == site_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl SignatureBackend for InMemoryBackend {
    async fn sign_by_worker(&self, request: &SignRequest) -> Result<Signature, CoreError> {
        self.delay().await;
        self.insert_signature(request, SignerRef::Worker(request.signer_id))
    }

    async fn sign_by_user(&self, request: &SignRequest) -> Result<Signature, CoreError> {
        self.delay().await;
        self.insert_signature(request, SignerRef::User(request.signer_id))
    }

    async fn unsign_by_worker(&self, worker_id: DbId, signature_id: DbId) -> Result<(), CoreError> {
        self.delay().await;
        self.remove_signature(SignerRef::Worker(worker_id), signature_id)
    }

    async fn unsign_by_user(&self, user_id: DbId, signature_id: DbId) -> Result<(), CoreError> {
        self.delay().await;
        self.remove_signature(SignerRef::User(user_id), signature_id)
    }

    async fn get_signatures_by_document(&self, document_id: DbId) -> Result<Vec<Signature>, CoreError> {
        let state = self.state();
        if !state.documents.contains_key(&document_id) {
            return Err(CoreError::not_found("document", document_id));
        }
        Ok(state
            .signatures
            .values()
            .filter(|s| s.document_id == document_id)
            .cloned()
            .collect())
    }
}
