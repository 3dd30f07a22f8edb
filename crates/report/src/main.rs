use std::sync::Arc;

use anyhow::Context;
use sitesafe_core::document::Document;
use sitesafe_core::site::WorkSite;
use sitesafe_db::backend::{PgAssignmentBackend, PgSignatureBackend};
use sitesafe_db::repositories::{DocumentRepo, WorkSiteRepo};
use sitesafe_report::config::ReportConfig;
use sitesafe_report::report::{ReportBuilder, ReportSummary};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sitesafe_report=info,sitesafe_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = ReportConfig::from_env()?;
    let today = config.effective_date();
    tracing::info!(%today, "Building site compliance report");

    let pool = sitesafe_db::create_pool(
        &config.database_url,
        config.max_connections,
        config.acquire_timeout,
    )
    .await
    .context("Failed to connect to database")?;

    if config.run_migrations {
        sitesafe_db::run_migrations(&pool)
            .await
            .context("Failed to run migrations")?;
        tracing::info!("Migrations applied");
    }

    let builder = ReportBuilder::new(
        Arc::new(PgAssignmentBackend::new(pool.clone())),
        Arc::new(PgSignatureBackend::new(pool.clone())),
    );

    let rows = WorkSiteRepo::list(&pool).await.context("Failed to list work sites")?;
    let mut summary = ReportSummary::default();

    for row in rows {
        let site_id = row.id;
        let site = match WorkSite::try_from(row) {
            Ok(site) => site,
            Err(e) => {
                tracing::warn!(site_id, error = %e, "Skipping malformed work site");
                summary.record_failure();
                continue;
            }
        };

        let documents = DocumentRepo::list_for_site(&pool, site.id)
            .await
            .with_context(|| format!("Failed to list documents for site {}", site.id))?
            .into_iter()
            .map(Document::try_from)
            .collect::<Result<Vec<_>, _>>();
        let documents = match documents {
            Ok(documents) => documents,
            Err(e) => {
                tracing::warn!(site_id, error = %e, "Skipping site with malformed documents");
                summary.record_failure();
                continue;
            }
        };

        match builder.site_report(&site, &documents, today).await {
            Ok(report) => {
                summary.record(report.status);
                println!("{}", serde_json::to_string(&report)?);
            }
            Err(e) if e.is_retryable() => {
                return Err(e).context("Storage unavailable while building report");
            }
            Err(e) => {
                tracing::warn!(site_id, error = %e, "Failed to build site report");
                summary.record_failure();
            }
        }
    }

    tracing::info!(
        total = summary.total,
        failed = summary.failed,
        by_status = ?summary.by_status,
        "Site compliance report complete",
    );
    Ok(())
}
