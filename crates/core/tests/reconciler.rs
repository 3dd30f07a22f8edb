//! Integration tests for `SelectionReconciler` against the in-process
//! backend.
//!
//! Covers diff minimality, idempotent selection, partial failure handling,
//! and per-site commit serialization.

mod common;

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use sitesafe_core::assignment::PendingSelection;
use sitesafe_core::error::CoreError;
use sitesafe_core::memory::{BackendCall, InMemoryBackend};
use sitesafe_core::reconciler::SelectionReconciler;
use sitesafe_core::types::DbId;

use common::{seeded_backend, shared, AUTHORIZER_ID, SITE_ID};

fn set(ids: &[DbId]) -> BTreeSet<DbId> {
    ids.iter().copied().collect()
}

async fn assign(reconciler: &SelectionReconciler, ids: &[DbId]) {
    for id in ids {
        reconciler.select(*id, SITE_ID).await.unwrap();
    }
}

// ---------------------------------------------------------------------------
// Test: loading an unknown site fails with NotFound
// ---------------------------------------------------------------------------

#[tokio::test]
async fn load_unknown_site_is_not_found() {
    let reconciler = SelectionReconciler::new(shared(seeded_backend()));

    let result = reconciler.load_selection(999).await;

    assert_matches!(result, Err(CoreError::NotFound { entity: "work_site", id: 999 }));
}

// ---------------------------------------------------------------------------
// Test: load seeds the pending map from active records only
// ---------------------------------------------------------------------------

#[tokio::test]
async fn load_seeds_pending_from_active_records() {
    let reconciler = SelectionReconciler::new(shared(seeded_backend()));
    assign(&reconciler, &[1, 2, 3]).await;
    reconciler.deselect(2, SITE_ID).await.unwrap();

    let loaded = reconciler.load_selection(SITE_ID).await.unwrap();

    assert_eq!(loaded.confirmed, set(&[1, 3]));
    assert_eq!(loaded.pending.desired(), set(&[1, 3]));
    assert!(!loaded.pending.is_selected(2));
}

// ---------------------------------------------------------------------------
// Test: commit issues exactly the minimal set of calls
// ---------------------------------------------------------------------------

#[tokio::test]
async fn commit_issues_only_the_diff() {
    let backend = shared(seeded_backend());
    let reconciler = SelectionReconciler::new(backend.clone());
    assign(&reconciler, &[1, 2, 3]).await;

    let loaded = reconciler.load_selection(SITE_ID).await.unwrap();
    let pending = loaded.pending.toggled(1).toggled(4);
    assert_eq!(pending.desired(), set(&[2, 3, 4]));
    backend.clear_calls();

    let outcome = reconciler.commit(SITE_ID, &loaded.confirmed, &pending).await;

    let mutations: Vec<BackendCall> = backend
        .calls()
        .into_iter()
        .filter(|c| c.mutated_worker().is_some())
        .collect();
    assert_eq!(mutations.len(), 2);
    assert!(mutations.contains(&BackendCall::Deselect { worker_id: 1, site_id: SITE_ID }));
    assert!(mutations.contains(&BackendCall::Select { worker_id: 4, site_id: SITE_ID }));
    assert!(!mutations.iter().any(|c| matches!(c.mutated_worker(), Some(2) | Some(3))));

    assert_eq!(outcome.succeeded, set(&[1, 4]));
    assert!(outcome.is_clean());
    assert_eq!(outcome.confirmed, set(&[2, 3, 4]));
}

// ---------------------------------------------------------------------------
// Test: an unchanged selection issues no mutating call
// ---------------------------------------------------------------------------

#[tokio::test]
async fn empty_diff_only_rereads() {
    let backend = shared(seeded_backend());
    let reconciler = SelectionReconciler::new(backend.clone());
    assign(&reconciler, &[1]).await;
    let loaded = reconciler.load_selection(SITE_ID).await.unwrap();
    backend.clear_calls();

    let outcome = reconciler
        .commit(SITE_ID, &loaded.confirmed, &loaded.pending)
        .await;

    assert_eq!(backend.calls(), vec![BackendCall::ReadSelections { site_id: SITE_ID }]);
    assert!(outcome.succeeded.is_empty());
    assert_eq!(outcome.confirmed, set(&[1]));
}

// ---------------------------------------------------------------------------
// Test: selecting twice keeps a single active record
// ---------------------------------------------------------------------------

#[tokio::test]
async fn select_is_idempotent() {
    let backend = shared(seeded_backend());
    let reconciler = SelectionReconciler::new(backend.clone()).with_actor(AUTHORIZER_ID);

    let first = reconciler.select(1, SITE_ID).await.unwrap();
    let second = reconciler.select(1, SITE_ID).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(backend.record_count(1, SITE_ID), 1);
    assert_eq!(second.selected_by, Some(AUTHORIZER_ID));
    let loaded = reconciler.load_selection(SITE_ID).await.unwrap();
    assert_eq!(loaded.confirmed, set(&[1]));
}

// ---------------------------------------------------------------------------
// Test: reselecting a deselected worker reactivates the same record
// ---------------------------------------------------------------------------

#[tokio::test]
async fn reselect_reactivates_soft_deselected_record() {
    let backend = shared(seeded_backend());
    let reconciler = SelectionReconciler::new(backend.clone()).with_note("night shift");

    reconciler.select(2, SITE_ID).await.unwrap();
    assert!(reconciler.deselect(2, SITE_ID).await.unwrap());
    assert!(!reconciler.deselect(2, SITE_ID).await.unwrap());

    let soft = backend.record(2, SITE_ID).unwrap();
    assert!(!soft.is_selected);

    let reactivated = reconciler.select(2, SITE_ID).await.unwrap();
    assert!(reactivated.is_selected);
    assert_eq!(reactivated.note.as_deref(), Some("night shift"));
    assert_eq!(backend.record_count(2, SITE_ID), 1);
}

// ---------------------------------------------------------------------------
// Test: one failing worker does not block the others
// ---------------------------------------------------------------------------

#[tokio::test]
async fn partial_failure_is_reported_per_worker() {
    let backend = shared(seeded_backend());
    let reconciler = SelectionReconciler::new(backend.clone());
    assign(&reconciler, &[1, 2]).await;
    backend.fail_worker(5);
    backend.fail_worker(2);

    let loaded = reconciler.load_selection(SITE_ID).await.unwrap();
    let pending = loaded.pending.toggled(2).toggled(4).toggled(5);

    let outcome = reconciler.commit(SITE_ID, &loaded.confirmed, &pending).await;

    assert_eq!(outcome.succeeded, set(&[4]));
    assert_eq!(outcome.failed.len(), 2);
    assert_matches!(outcome.failed.get(&5), Some(CoreError::Network(_)));
    assert_matches!(outcome.failed.get(&2), Some(CoreError::Network(_)));
    // The server still has 2 selected and never got 5.
    assert_eq!(outcome.confirmed, set(&[1, 2, 4]));

    // Retrying from the authoritative state only touches the failed workers.
    backend.heal_worker(5);
    backend.heal_worker(2);
    backend.clear_calls();
    let retry = reconciler.commit(SITE_ID, &outcome.confirmed, &pending).await;

    assert!(retry.is_clean());
    assert_eq!(retry.succeeded, set(&[2, 5]));
    assert_eq!(retry.confirmed, set(&[1, 4, 5]));
    let touched: BTreeSet<DbId> = backend.calls().iter().filter_map(|c| c.mutated_worker()).collect();
    assert_eq!(touched, set(&[2, 5]));
}

// ---------------------------------------------------------------------------
// Test: a failed re-read still reports every per-worker result
// ---------------------------------------------------------------------------

#[tokio::test]
async fn failed_reread_keeps_per_worker_results() {
    let backend = shared(seeded_backend());
    let reconciler = SelectionReconciler::new(backend.clone());
    backend.fail_worker(2);
    backend.fail_selection_reads();

    let pending = PendingSelection::from_iter([1, 2]);
    let outcome = reconciler.commit(SITE_ID, &BTreeSet::new(), &pending).await;

    assert_eq!(outcome.succeeded, set(&[1]));
    assert_matches!(outcome.failed.get(&2), Some(CoreError::Network(_)));
    assert_matches!(outcome.refresh_error, Some(CoreError::Network(_)));
    assert!(!outcome.is_authoritative());
    assert!(!outcome.is_clean());
    // Best local view: only the write that went through.
    assert_eq!(outcome.confirmed, set(&[1]));
    assert_eq!(backend.record(1, SITE_ID).map(|r| r.is_selected), Some(true));

    // Once reads recover, a reload agrees with the projection.
    backend.heal_selection_reads();
    let loaded = reconciler.load_selection(SITE_ID).await.unwrap();
    assert_eq!(loaded.confirmed, outcome.confirmed);
}

// ---------------------------------------------------------------------------
// Test: a worker unknown to the backend fails alone
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unknown_worker_fails_without_aborting_batch() {
    let reconciler = SelectionReconciler::new(shared(seeded_backend()));

    let pending = PendingSelection::new().toggled(3).toggled(99);
    let outcome = reconciler.commit(SITE_ID, &BTreeSet::new(), &pending).await;

    assert_eq!(outcome.succeeded, set(&[3]));
    assert_matches!(
        outcome.failed.get(&99),
        Some(CoreError::NotFound { entity: "worker", id: 99 })
    );
    assert_eq!(outcome.confirmed, set(&[3]));
}

// ---------------------------------------------------------------------------
// Test: commits on the same site never interleave
// ---------------------------------------------------------------------------

#[tokio::test]
async fn concurrent_commits_on_same_site_are_serialized() {
    let backend = Arc::new(InMemoryBackend::new().with_latency(Duration::from_millis(20)));
    common::seed(&backend);
    let reconciler = Arc::new(SelectionReconciler::new(backend.clone()));

    let first = PendingSelection::from_iter([1, 2]);
    let second = PendingSelection::from_iter([3]);

    let a = {
        let reconciler = reconciler.clone();
        tokio::spawn(async move { reconciler.commit(SITE_ID, &BTreeSet::new(), &first).await })
    };
    let b = {
        let reconciler = reconciler.clone();
        tokio::spawn(async move { reconciler.commit(SITE_ID, &BTreeSet::new(), &second).await })
    };
    let a = a.await.unwrap();
    let b = b.await.unwrap();

    // Everything before the first authoritative read belongs to one commit.
    let calls = backend.calls();
    let first_read = calls
        .iter()
        .position(|c| matches!(c, BackendCall::ReadSelections { .. }))
        .unwrap();
    let before: BTreeSet<DbId> = calls[..first_read].iter().filter_map(|c| c.mutated_worker()).collect();
    assert!(before == set(&[1, 2]) || before == set(&[3]), "interleaved: {calls:?}");

    let last = if a.confirmed.len() > b.confirmed.len() { &a } else { &b };
    assert_eq!(last.confirmed, set(&[1, 2, 3]));
}

// ---------------------------------------------------------------------------
// Test: unknown worker or acting user on single calls is NotFound
// ---------------------------------------------------------------------------

#[tokio::test]
async fn single_calls_reject_unknown_references() {
    let backend = shared(seeded_backend());

    let plain = SelectionReconciler::new(backend.clone());
    assert_matches!(
        plain.deselect(99, SITE_ID).await,
        Err(CoreError::NotFound { entity: "worker", id: 99 })
    );

    let ghost_actor = SelectionReconciler::new(backend.clone()).with_actor(4_040);
    assert_matches!(
        ghost_actor.select(1, SITE_ID).await,
        Err(CoreError::NotFound { entity: "authorizing_user", id: 4_040 })
    );
    assert_eq!(backend.record_count(1, SITE_ID), 0);
}
