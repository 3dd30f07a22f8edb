#![allow(dead_code)]

use std::sync::Arc;

use chrono::NaiveDate;
use sitesafe_core::document::{Document, DocumentKind};
use sitesafe_core::memory::InMemoryBackend;
use sitesafe_core::site::{AuthorizingUser, DateRange, WorkSite, Worker};
use sitesafe_core::types::DbId;

pub const SITE_ID: DbId = 1;
pub const AUTHORIZER_ID: DbId = 500;
pub const PDP_ID: DbId = 10;
pub const BDT_ID: DbId = 11;

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn new_site(id: DbId, hour_count: i32) -> WorkSite {
    WorkSite {
        id,
        name: format!("Site {id}"),
        dates: DateRange::new(day(2024, 9, 1), day(2024, 9, 30)).unwrap(),
        hour_count,
        is_annual: false,
        is_dangerous_work: false,
        authorizing_user_id: AUTHORIZER_ID,
        terminal_status: None,
    }
}

pub fn new_worker(id: DbId, first: &str, last: &str) -> Worker {
    Worker {
        id,
        first_name: first.to_string(),
        last_name: last.to_string(),
        company_id: 1,
    }
}

/// Backend seeded with one 500-hour site, its authorizer, a PDP and a BDT,
/// and workers 1 through 6.
pub fn seeded_backend() -> InMemoryBackend {
    let backend = InMemoryBackend::new();
    seed(&backend);
    backend
}

pub fn seed(backend: &InMemoryBackend) {
    backend.insert_site(new_site(SITE_ID, 500));
    backend.insert_user(AuthorizingUser {
        id: AUTHORIZER_ID,
        first_name: "Claire".to_string(),
        last_name: "Martin".to_string(),
        role: "site_manager".to_string(),
    });
    backend.insert_document(Document { id: PDP_ID, site_id: SITE_ID, kind: DocumentKind::Pdp });
    backend.insert_document(Document { id: BDT_ID, site_id: SITE_ID, kind: DocumentKind::Bdt });
    for id in 1..=6 {
        backend.insert_worker(new_worker(id, &format!("Worker{id}"), "Test"));
    }
}

pub fn shared(backend: InMemoryBackend) -> Arc<InMemoryBackend> {
    Arc::new(backend)
}
