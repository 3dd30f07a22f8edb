//! Selection reconciler.
//!
//! Converges a locally edited worker selection for one site with the server
//! of record using the minimum number of mutating calls:
//!
//! 1. [`SelectionReconciler::load_selection`] reads the confirmed set and
//!    seeds a [`PendingSelection`] from it.
//! 2. The caller edits the pending map with [`PendingSelection::toggle`].
//! 3. [`SelectionReconciler::commit`] applies the diff concurrently, then
//!    re-reads the authoritative selection, which the caller must adopt.
//!
//! Commits on the same site are queued behind each other.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;

use crate::assignment::{active_worker_ids, AssignmentRecord, PendingSelection, SelectionDiff};
use crate::backend::{AssignmentBackend, SelectWorker};
use crate::error::CoreError;
use crate::keyed_lock::KeyedLocks;
use crate::types::DbId;

/// Confirmed selection for a site plus a pending map seeded from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadedSelection {
    pub site_id: DbId,
    pub confirmed: BTreeSet<DbId>,
    pub pending: PendingSelection,
}

/// Result of a commit. Partial success is an expected outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommitOutcome {
    /// Workers whose `select`/`deselect` call succeeded.
    pub succeeded: BTreeSet<DbId>,
    /// Per-worker failures. Not retried.
    pub failed: BTreeMap<DbId, CoreError>,
    /// Authoritative selection read after every call settled. When that
    /// read fails this is the caller's set with the successful changes
    /// applied, and `refresh_error` is set.
    pub confirmed: BTreeSet<DbId>,
    /// Failure of the final authoritative read, if any. The caller must
    /// reload before trusting `confirmed`.
    pub refresh_error: Option<CoreError>,
}

impl CommitOutcome {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty() && self.refresh_error.is_none()
    }

    /// Whether `confirmed` came from the server.
    pub fn is_authoritative(&self) -> bool {
        self.refresh_error.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Change {
    Select,
    Deselect,
}

/// Applies selection diffs for any number of sites.
pub struct SelectionReconciler {
    backend: Arc<dyn AssignmentBackend>,
    site_locks: KeyedLocks,
    actor: Option<DbId>,
    note: Option<String>,
}

impl SelectionReconciler {
    pub fn new(backend: Arc<dyn AssignmentBackend>) -> Self {
        Self {
            backend,
            site_locks: KeyedLocks::new(),
            actor: None,
            note: None,
        }
    }

    /// Record `user_id` as `selected_by` on new selections.
    pub fn with_actor(mut self, user_id: DbId) -> Self {
        self.actor = Some(user_id);
        self
    }

    /// Attach `note` to new selections.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Read the confirmed selection for `site_id`.
    pub async fn load_selection(&self, site_id: DbId) -> Result<LoadedSelection, CoreError> {
        let confirmed = self.fetch_confirmed(site_id).await?;
        Ok(LoadedSelection {
            site_id,
            pending: PendingSelection::from_confirmed(&confirmed),
            confirmed,
        })
    }

    /// Select one worker. Idempotent at the backend.
    pub async fn select(&self, worker_id: DbId, site_id: DbId) -> Result<AssignmentRecord, CoreError> {
        let input = SelectWorker {
            worker_id,
            site_id,
            note: self.note.clone(),
            selected_by: self.actor,
        };
        self.backend.select_worker_for_site(&input).await
    }

    /// Deselect one worker. Idempotent at the backend.
    pub async fn deselect(&self, worker_id: DbId, site_id: DbId) -> Result<bool, CoreError> {
        self.backend.deselect_worker_from_site(worker_id, site_id).await
    }

    /// Apply the difference between `confirmed` and `pending`.
    ///
    /// One call per changed worker, issued concurrently; failures are
    /// collected per worker and never abort the rest. The batch itself
    /// never fails: a failed final read is reported in
    /// [`CommitOutcome::refresh_error`] next to the per-worker results.
    pub async fn commit(
        &self,
        site_id: DbId,
        confirmed: &BTreeSet<DbId>,
        pending: &PendingSelection,
    ) -> CommitOutcome {
        let _guard = self.site_locks.acquire(site_id).await;

        let diff = SelectionDiff::compute(confirmed, pending);
        tracing::debug!(
            site_id,
            to_add = diff.to_add.len(),
            to_remove = diff.to_remove.len(),
            unchanged = diff.unchanged.len(),
            "Committing selection diff",
        );

        let calls = diff
            .to_add
            .iter()
            .map(|id| (*id, Change::Select))
            .chain(diff.to_remove.iter().map(|id| (*id, Change::Deselect)))
            .map(move |(worker_id, change)| async move {
                let result = match change {
                    Change::Select => self.select(worker_id, site_id).await.map(|_| ()),
                    Change::Deselect => self.deselect(worker_id, site_id).await.map(|_| ()),
                };
                (worker_id, change, result)
            });

        let mut outcome = CommitOutcome::default();
        for (worker_id, change, result) in join_all(calls).await {
            match result {
                Ok(()) => {
                    outcome.succeeded.insert(worker_id);
                }
                Err(e) => {
                    tracing::warn!(
                        site_id,
                        worker_id,
                        change = ?change,
                        error = %e,
                        "Selection change failed",
                    );
                    outcome.failed.insert(worker_id, e);
                }
            }
        }

        match self.fetch_confirmed(site_id).await {
            Ok(fresh) => outcome.confirmed = fresh,
            Err(e) => {
                tracing::warn!(site_id, error = %e, "Selection re-read failed after commit");
                outcome.confirmed = projected(confirmed, &diff, &outcome.succeeded);
                outcome.refresh_error = Some(e);
            }
        }

        tracing::info!(
            site_id,
            succeeded = outcome.succeeded.len(),
            failed = outcome.failed.len(),
            confirmed = outcome.confirmed.len(),
            authoritative = outcome.is_authoritative(),
            "Selection committed",
        );

        outcome
    }

    async fn fetch_confirmed(&self, site_id: DbId) -> Result<BTreeSet<DbId>, CoreError> {
        let records = self.backend.get_selections_for_site(site_id).await?;
        Ok(active_worker_ids(&records, site_id))
    }
}

/// `confirmed` with the successful calls of `diff` applied.
fn projected(confirmed: &BTreeSet<DbId>, diff: &SelectionDiff, succeeded: &BTreeSet<DbId>) -> BTreeSet<DbId> {
    let mut next = confirmed.clone();
    for id in diff.to_add.iter().filter(|id| succeeded.contains(id)) {
        next.insert(*id);
    }
    for id in diff.to_remove.iter().filter(|id| succeeded.contains(id)) {
        next.remove(id);
    }
    next
}
