//! Per-site compliance report.
//!
//! Gathers assignment and signature state through the storage contracts
//! and runs the status derivation for a given day. Nothing computed here
//! is written back.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use sitesafe_core::assignment::active_worker_ids;
use sitesafe_core::backend::{AssignmentBackend, SignatureBackend};
use sitesafe_core::document::{required_signers, Document, DocumentKind};
use sitesafe_core::error::CoreError;
use sitesafe_core::ledger::SignatureLedger;
use sitesafe_core::signature::DocumentCompletion;
use sitesafe_core::site::WorkSite;
use sitesafe_core::site_status::{derive_site_status, SiteStatus, StatusInputs};
use sitesafe_core::types::{DbId, Day};

/// One line of the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteReport {
    pub site_id: DbId,
    pub site_name: String,
    pub date: Day,
    pub status: SiteStatus,
    pub assigned_workers: usize,
    pub pdp_required: bool,
    /// Best PDP on the site, if any.
    pub pdp: Option<DocumentCompletion>,
    /// Best BDT on the site, if any.
    pub bdt: Option<DocumentCompletion>,
}

/// Status counts across a report run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub total: usize,
    pub by_status: BTreeMap<&'static str, usize>,
    pub failed: usize,
}

impl ReportSummary {
    pub fn record(&mut self, status: SiteStatus) {
        self.total += 1;
        *self.by_status.entry(status.as_str()).or_default() += 1;
    }

    pub fn record_failure(&mut self) {
        self.total += 1;
        self.failed += 1;
    }
}

pub struct ReportBuilder {
    assignments: Arc<dyn AssignmentBackend>,
    ledger: SignatureLedger,
}

impl ReportBuilder {
    pub fn new(assignments: Arc<dyn AssignmentBackend>, signatures: Arc<dyn SignatureBackend>) -> Self {
        Self {
            assignments,
            ledger: SignatureLedger::new(signatures),
        }
    }

    /// Build the report line for `site` on `today`.
    ///
    /// A site counts as having a fully signed PDP (or BDT) when any one of
    /// its documents of that kind is complete.
    pub async fn site_report(
        &self,
        site: &WorkSite,
        documents: &[Document],
        today: Day,
    ) -> Result<SiteReport, CoreError> {
        let selections = self.assignments.get_selections_for_site(site.id).await?;

        let mut pdp: Option<DocumentCompletion> = None;
        let mut bdt: Option<DocumentCompletion> = None;
        for document in documents.iter().filter(|d| d.site_id == site.id) {
            let required = required_signers(document, site, &selections)?;
            let completion = self.ledger.completion(document.id, &required).await?;
            let slot = match document.kind {
                DocumentKind::Pdp => &mut pdp,
                DocumentKind::Bdt => &mut bdt,
            };
            if slot.as_ref().map_or(true, |best| better(&completion, best)) {
                *slot = Some(completion);
            }
        }

        let is_complete = |c: &Option<DocumentCompletion>| c.as_ref().is_some_and(|c| c.is_complete());
        let inputs = StatusInputs::for_site(site, is_complete(&pdp), is_complete(&bdt));
        let status = derive_site_status(&inputs, today);

        tracing::debug!(site_id = site.id, status = status.as_str(), "Site status derived");

        Ok(SiteReport {
            site_id: site.id,
            site_name: site.name.clone(),
            date: today,
            status,
            assigned_workers: active_worker_ids(&selections, site.id).len(),
            pdp_required: site.requires_pdp(),
            pdp,
            bdt,
        })
    }
}

/// Complete beats incomplete, then the higher percentage wins.
fn better(candidate: &DocumentCompletion, best: &DocumentCompletion) -> bool {
    (candidate.is_complete(), candidate.complete_pct) > (best.is_complete(), best.complete_pct)
}
