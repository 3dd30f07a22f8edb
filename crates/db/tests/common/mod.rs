#![allow(dead_code)]

use chrono::NaiveDate;
use sitesafe_core::document::DocumentKind;
use sitesafe_core::types::DbId;
use sitesafe_db::models::document::CreateDocument;
use sitesafe_db::models::work_site::CreateWorkSite;
use sitesafe_db::models::worker::{CreateAuthorizingUser, CreateWorker};
use sitesafe_db::repositories::{AuthorizingUserRepo, DocumentRepo, WorkSiteRepo, WorkerRepo};
use sqlx::PgPool;

/// Ids created by [`seed`].
pub struct Fixture {
    pub site_id: DbId,
    pub user_id: DbId,
    pub workers: Vec<DbId>,
    pub pdp_id: DbId,
    pub bdt_id: DbId,
}

pub async fn new_worker(pool: &PgPool, first: &str, last: &str) -> DbId {
    let input = CreateWorker {
        first_name: first.to_string(),
        last_name: last.to_string(),
        company_id: 1,
    };
    WorkerRepo::create(pool, &input).await.unwrap().id
}

/// One 450-hour site with its authorizer, a PDP, a BDT and three workers.
pub async fn seed(pool: &PgPool) -> Fixture {
    let user = AuthorizingUserRepo::create(
        pool,
        &CreateAuthorizingUser {
            first_name: "Claire".to_string(),
            last_name: "Martin".to_string(),
            role: "site_manager".to_string(),
        },
    )
    .await
    .unwrap();

    let site_input = CreateWorkSite {
        name: "Harbour wall".to_string(),
        start_date: NaiveDate::from_ymd_opt(2024, 9, 1).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2024, 9, 30).unwrap(),
        hour_count: 450,
        is_annual: false,
        is_dangerous_work: true,
        authorizing_user_id: user.id,
    };
    site_input.validate().unwrap();
    let site = WorkSiteRepo::create(pool, &site_input).await.unwrap();

    let pdp = DocumentRepo::create(pool, &CreateDocument { site_id: site.id, kind: DocumentKind::Pdp })
        .await
        .unwrap();
    let bdt = DocumentRepo::create(pool, &CreateDocument { site_id: site.id, kind: DocumentKind::Bdt })
        .await
        .unwrap();

    let mut workers = Vec::new();
    for (first, last) in [("Lea", "Roux"), ("Hugo", "Blanc"), ("Ines", "Blanc")] {
        workers.push(new_worker(pool, first, last).await);
    }

    Fixture {
        site_id: site.id,
        user_id: user.id,
        workers,
        pdp_id: pdp.id,
        bdt_id: bdt.id,
    }
}
