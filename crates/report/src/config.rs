use std::time::Duration;

use anyhow::{bail, Context};
use chrono::NaiveDate;

/// Report configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportConfig {
    /// PostgreSQL connection string (required).
    pub database_url: String,
    /// Pool size (default: `5`).
    pub max_connections: u32,
    /// How long to wait for a pooled connection (default: `10` seconds).
    pub acquire_timeout: Duration,
    /// Day to evaluate statuses for. `None` means today (UTC).
    pub report_date: Option<NaiveDate>,
    /// Apply pending migrations before reporting (default: `false`).
    pub run_migrations: bool,
}

impl ReportConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default      |
    /// |---------------------------|--------------|
    /// | `DATABASE_URL`            | (required)   |
    /// | `DB_MAX_CONNECTIONS`      | `5`          |
    /// | `DB_ACQUIRE_TIMEOUT_SECS` | `10`         |
    /// | `REPORT_DATE`             | today (UTC)  |
    /// | `RUN_MIGRATIONS`          | `false`      |
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let database_url = match lookup("DATABASE_URL") {
            Some(url) if !url.trim().is_empty() => url,
            _ => bail!("DATABASE_URL must be set"),
        };

        let max_connections: u32 = lookup("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|| "5".into())
            .parse()
            .context("DB_MAX_CONNECTIONS must be a valid u32")?;
        if max_connections == 0 {
            bail!("DB_MAX_CONNECTIONS must be at least 1");
        }

        let acquire_timeout_secs: u64 = lookup("DB_ACQUIRE_TIMEOUT_SECS")
            .unwrap_or_else(|| "10".into())
            .parse()
            .context("DB_ACQUIRE_TIMEOUT_SECS must be a valid u64")?;

        let report_date = lookup("REPORT_DATE")
            .map(|raw| {
                NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                    .with_context(|| format!("REPORT_DATE '{raw}' must be YYYY-MM-DD"))
            })
            .transpose()?;

        let run_migrations = matches!(
            lookup("RUN_MIGRATIONS").as_deref().map(str::trim),
            Some("1" | "true" | "yes")
        );

        Ok(Self {
            database_url,
            max_connections,
            acquire_timeout: Duration::from_secs(acquire_timeout_secs),
            report_date,
            run_migrations,
        })
    }

    /// The day statuses are evaluated for.
    pub fn effective_date(&self) -> NaiveDate {
        self.report_date
            .unwrap_or_else(|| chrono::Utc::now().date_naive())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> anyhow::Result<ReportConfig> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ReportConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("DATABASE_URL", "postgres://localhost/sitesafe")]).unwrap();
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.acquire_timeout, Duration::from_secs(10));
        assert_eq!(config.report_date, None);
        assert!(!config.run_migrations);
    }

    #[test]
    fn test_missing_database_url() {
        assert!(load(&[]).is_err());
        assert!(load(&[("DATABASE_URL", "  ")]).is_err());
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("DATABASE_URL", "postgres://db/sitesafe"),
            ("DB_MAX_CONNECTIONS", "12"),
            ("DB_ACQUIRE_TIMEOUT_SECS", "3"),
            ("REPORT_DATE", "2024-09-15"),
            ("RUN_MIGRATIONS", "true"),
        ])
        .unwrap();
        assert_eq!(config.max_connections, 12);
        assert_eq!(config.acquire_timeout, Duration::from_secs(3));
        assert_eq!(config.effective_date(), NaiveDate::from_ymd_opt(2024, 9, 15).unwrap());
        assert!(config.run_migrations);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let url = ("DATABASE_URL", "postgres://db/sitesafe");
        assert!(load(&[url, ("DB_MAX_CONNECTIONS", "many")]).is_err());
        assert!(load(&[url, ("DB_MAX_CONNECTIONS", "0")]).is_err());
        assert!(load(&[url, ("REPORT_DATE", "15/09/2024")]).is_err());
    }
}
