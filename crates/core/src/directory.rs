//! Explicit lookup context for one site.
//!
//! Holds the workers attached to a site (and any authorizing users the
//! caller registers) keyed by id, so signing and selection surfaces can
//! resolve names without keeping their own ad-hoc maps.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use crate::backend::AssignmentBackend;
use crate::error::CoreError;
use crate::identity::SignerRef;
use crate::site::{AuthorizingUser, Worker};
use crate::types::DbId;

pub struct SiteDirectory {
    backend: Arc<dyn AssignmentBackend>,
    site_id: DbId,
    workers: HashMap<DbId, Worker>,
    users: HashMap<DbId, AuthorizingUser>,
}

impl SiteDirectory {
    /// Load the workers currently selected on `site_id`.
    pub async fn load(backend: Arc<dyn AssignmentBackend>, site_id: DbId) -> Result<Self, CoreError> {
        let mut directory = Self {
            backend,
            site_id,
            workers: HashMap::new(),
            users: HashMap::new(),
        };
        directory.refresh().await?;
        Ok(directory)
    }

    /// Re-read workers from the backend. Registered users are kept.
    pub async fn refresh(&mut self) -> Result<(), CoreError> {
        let workers = self.backend.get_workers_for_site(self.site_id).await?;
        self.workers = workers.into_iter().map(|w| (w.id, w)).collect();
        tracing::debug!(site_id = self.site_id, workers = self.workers.len(), "Site directory refreshed");
        Ok(())
    }

    pub fn site_id(&self) -> DbId {
        self.site_id
    }

    /// Register an authorizing user (loaded by an external collaborator).
    pub fn insert_user(&mut self, user: AuthorizingUser) {
        self.users.insert(user.id, user);
    }

    /// Register a worker created during the session, before the next
    /// refresh picks it up.
    pub fn insert_worker(&mut self, worker: Worker) {
        self.workers.insert(worker.id, worker);
    }

    pub fn worker(&self, id: DbId) -> Option<&Worker> {
        self.workers.get(&id)
    }

    pub fn user(&self, id: DbId) -> Option<&AuthorizingUser> {
        self.users.get(&id)
    }

    /// Current display name for a signer, if known.
    pub fn display_name(&self, signer: SignerRef) -> Option<String> {
        match signer {
            SignerRef::Worker(id) => self.worker(id).map(Worker::display_name),
            SignerRef::User(id) => self.user(id).map(AuthorizingUser::display_name),
        }
    }

    /// Known workers among `ids`, sorted by last then first name.
    pub fn selected_workers(&self, ids: &BTreeSet<DbId>) -> Vec<&Worker> {
        let mut workers: Vec<&Worker> = ids.iter().filter_map(|id| self.workers.get(id)).collect();
        workers.sort_by(|a, b| {
            a.last_name
                .cmp(&b.last_name)
                .then_with(|| a.first_name.cmp(&b.first_name))
        });
        workers
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }
}
