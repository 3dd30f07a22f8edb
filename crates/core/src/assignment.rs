//! Worker-to-site assignment records and the local selection state.
//!
//! [`PendingSelection`] is the client-held "desired" set. It is edited
//! synchronously with [`PendingSelection::toggle`] and compared against the
//! server-confirmed set with [`SelectionDiff::compute`].

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// AssignmentRecord
// ---------------------------------------------------------------------------

/// Server-side record of a worker's selection for a site.
///
/// Deselection flips `is_selected` instead of removing the row so that the
/// selection history survives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentRecord {
    pub worker_id: DbId,
    pub site_id: DbId,
    pub is_selected: bool,
    pub selection_date: Timestamp,
    pub note: Option<String>,
    /// Authorizing user who made the selection, when known.
    pub selected_by: Option<DbId>,
}

/// Ids of the workers whose records for `site_id` are active.
pub fn active_worker_ids(records: &[AssignmentRecord], site_id: DbId) -> BTreeSet<DbId> {
    records
        .iter()
        .filter(|r| r.site_id == site_id && r.is_selected)
        .map(|r| r.worker_id)
        .collect()
}

// ---------------------------------------------------------------------------
// PendingSelection
// ---------------------------------------------------------------------------

/// Locally edited membership map. Never touches the network.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingSelection {
    entries: BTreeMap<DbId, bool>,
}

impl PendingSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from the confirmed set: every confirmed worker is selected.
    pub fn from_confirmed(confirmed: &BTreeSet<DbId>) -> Self {
        Self {
            entries: confirmed.iter().map(|id| (*id, true)).collect(),
        }
    }

    /// Flip membership for `worker_id` and return the new state. A worker
    /// not seen before is inserted as selected.
    pub fn toggle(&mut self, worker_id: DbId) -> bool {
        let entry = self.entries.entry(worker_id).or_insert(false);
        *entry = !*entry;
        *entry
    }

    /// By-value form of [`toggle`](Self::toggle).
    pub fn toggled(mut self, worker_id: DbId) -> Self {
        self.toggle(worker_id);
        self
    }

    pub fn is_selected(&self, worker_id: DbId) -> bool {
        self.entries.get(&worker_id).copied().unwrap_or(false)
    }

    /// The desired set: every worker currently marked selected.
    pub fn desired(&self) -> BTreeSet<DbId> {
        self.entries
            .iter()
            .filter(|(_, selected)| **selected)
            .map(|(id, _)| *id)
            .collect()
    }
}

impl FromIterator<DbId> for PendingSelection {
    fn from_iter<I: IntoIterator<Item = DbId>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|id| (id, true)).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// SelectionDiff
// ---------------------------------------------------------------------------

/// Minimal change set between a confirmed and a desired selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SelectionDiff {
    /// Desired but not confirmed: needs a `select` call.
    pub to_add: BTreeSet<DbId>,
    /// Confirmed but no longer desired: needs a `deselect` call.
    pub to_remove: BTreeSet<DbId>,
    /// Present on both sides: no call.
    pub unchanged: BTreeSet<DbId>,
}

impl SelectionDiff {
    pub fn compute(confirmed: &BTreeSet<DbId>, pending: &PendingSelection) -> Self {
        let desired = pending.desired();
        Self {
            to_add: desired.difference(confirmed).copied().collect(),
            to_remove: confirmed.difference(&desired).copied().collect(),
            unchanged: confirmed.intersection(&desired).copied().collect(),
        }
    }

    /// Number of mutating calls the diff requires.
    pub fn call_count(&self) -> usize {
        self.to_add.len() + self.to_remove.len()
    }

    pub fn is_empty(&self) -> bool {
        self.call_count() == 0
    }
}
