//! Site operational status derivation.
//!
//! The status is never the primary record: it is recomputed on demand from
//! site attributes and document completion. Any stored copy is an advisory
//! cache.

use serde::{Deserialize, Serialize};

use crate::site::{pdp_required, DateRange, WorkSite};
use crate::types::Day;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const STATUS_CANCELED: &str = "canceled";
pub const STATUS_COMPLETED: &str = "completed";
pub const STATUS_INACTIVE_TODAY: &str = "inactive_today";
pub const STATUS_PENDING_PDP: &str = "pending_pdp";
pub const STATUS_PENDING_BDT: &str = "pending_bdt";
pub const STATUS_ACTIVE: &str = "active";

/// All valid status strings.
pub const VALID_SITE_STATUSES: &[&str] = &[
    STATUS_CANCELED,
    STATUS_COMPLETED,
    STATUS_INACTIVE_TODAY,
    STATUS_PENDING_PDP,
    STATUS_PENDING_BDT,
    STATUS_ACTIVE,
];

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Explicit end-of-life state set by whoever owns the site record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminalStatus {
    Canceled,
    Completed,
}

impl TerminalStatus {
    /// Convert from a database string value.
    pub fn from_str_value(s: &str) -> Result<Self, String> {
        match s {
            STATUS_CANCELED => Ok(Self::Canceled),
            STATUS_COMPLETED => Ok(Self::Completed),
            _ => Err(format!(
                "Invalid terminal status '{s}'. Must be one of: {STATUS_CANCELED}, {STATUS_COMPLETED}"
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        SiteStatus::from(*self).as_str()
    }
}

/// Derived operational status of a site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SiteStatus {
    Canceled,
    Completed,
    InactiveToday,
    PendingPdp,
    PendingBdt,
    Active,
}

impl SiteStatus {
    /// Convert from a string value.
    pub fn from_str_value(s: &str) -> Result<Self, String> {
        match s {
            STATUS_CANCELED => Ok(Self::Canceled),
            STATUS_COMPLETED => Ok(Self::Completed),
            STATUS_INACTIVE_TODAY => Ok(Self::InactiveToday),
            STATUS_PENDING_PDP => Ok(Self::PendingPdp),
            STATUS_PENDING_BDT => Ok(Self::PendingBdt),
            STATUS_ACTIVE => Ok(Self::Active),
            _ => Err(format!(
                "Invalid site status '{s}'. Must be one of: {}",
                VALID_SITE_STATUSES.join(", ")
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Canceled => STATUS_CANCELED,
            Self::Completed => STATUS_COMPLETED,
            Self::InactiveToday => STATUS_INACTIVE_TODAY,
            Self::PendingPdp => STATUS_PENDING_PDP,
            Self::PendingBdt => STATUS_PENDING_BDT,
            Self::Active => STATUS_ACTIVE,
        }
    }

    /// Whether the status is an explicit end state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Canceled | Self::Completed)
    }

    /// Whether the site is waiting on a signed document.
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::PendingPdp | Self::PendingBdt)
    }
}

impl From<TerminalStatus> for SiteStatus {
    fn from(terminal: TerminalStatus) -> Self {
        match terminal {
            TerminalStatus::Canceled => Self::Canceled,
            TerminalStatus::Completed => Self::Completed,
        }
    }
}

// ---------------------------------------------------------------------------
// Derivation
// ---------------------------------------------------------------------------

/// Everything the derivation looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusInputs {
    pub hour_count: i32,
    pub is_annual: bool,
    pub dates: DateRange,
    pub terminal: Option<TerminalStatus>,
    pub has_fully_signed_pdp: bool,
    pub has_fully_signed_bdt: bool,
}

impl StatusInputs {
    /// Take the site attributes from `site` and the document flags from
    /// the caller.
    pub fn for_site(site: &WorkSite, has_fully_signed_pdp: bool, has_fully_signed_bdt: bool) -> Self {
        Self {
            hour_count: site.hour_count,
            is_annual: site.is_annual,
            dates: site.dates,
            terminal: site.terminal_status,
            has_fully_signed_pdp,
            has_fully_signed_bdt,
        }
    }
}

/// Derive the status of a site on `today`.
///
/// Total and deterministic:
/// 1. an explicit terminal status wins;
/// 2. a day outside the date range is `InactiveToday`;
/// 3. a required but unsigned PDP is `PendingPdp`;
/// 4. an unsigned BDT is `PendingBdt`;
/// 5. otherwise `Active`.
pub fn derive_site_status(inputs: &StatusInputs, today: Day) -> SiteStatus {
    if let Some(terminal) = inputs.terminal {
        return terminal.into();
    }
    if !inputs.dates.contains(today) {
        return SiteStatus::InactiveToday;
    }
    if pdp_required(inputs.hour_count, inputs.is_annual) && !inputs.has_fully_signed_pdp {
        return SiteStatus::PendingPdp;
    }
    if !inputs.has_fully_signed_bdt {
        return SiteStatus::PendingBdt;
    }
    SiteStatus::Active
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> Day {
        Day::from_ymd_opt(y, m, d).unwrap()
    }

    fn inputs(hour_count: i32) -> StatusInputs {
        StatusInputs {
            hour_count,
            is_annual: false,
            dates: DateRange::new(day(2024, 3, 1), day(2024, 3, 31)).unwrap(),
            terminal: None,
            has_fully_signed_pdp: false,
            has_fully_signed_bdt: false,
        }
    }

    fn today() -> Day {
        day(2024, 3, 15)
    }

    #[test]
    fn test_large_site_progresses_to_active() {
        let mut i = inputs(500);
        assert_eq!(derive_site_status(&i, today()), SiteStatus::PendingPdp);

        i.has_fully_signed_pdp = true;
        assert_eq!(derive_site_status(&i, today()), SiteStatus::PendingBdt);

        i.has_fully_signed_bdt = true;
        assert_eq!(derive_site_status(&i, today()), SiteStatus::Active);
    }

    #[test]
    fn test_cancel_overrides_every_stage() {
        let mut i = inputs(500);
        i.terminal = Some(TerminalStatus::Canceled);
        assert_eq!(derive_site_status(&i, today()), SiteStatus::Canceled);

        i.has_fully_signed_pdp = true;
        assert_eq!(derive_site_status(&i, today()), SiteStatus::Canceled);

        i.has_fully_signed_bdt = true;
        assert_eq!(derive_site_status(&i, today()), SiteStatus::Canceled);

        assert_eq!(derive_site_status(&i, day(2030, 1, 1)), SiteStatus::Canceled);
    }

    #[test]
    fn test_completed_overrides_date_range() {
        let mut i = inputs(10);
        i.terminal = Some(TerminalStatus::Completed);
        assert_eq!(derive_site_status(&i, day(2020, 1, 1)), SiteStatus::Completed);
    }

    #[test]
    fn test_outside_range_is_inactive_even_when_signed() {
        let mut i = inputs(10);
        i.has_fully_signed_bdt = true;
        assert_eq!(derive_site_status(&i, day(2024, 2, 29)), SiteStatus::InactiveToday);
        assert_eq!(derive_site_status(&i, day(2024, 4, 1)), SiteStatus::InactiveToday);
        assert_eq!(derive_site_status(&i, day(2024, 3, 31)), SiteStatus::Active);
    }

    #[test]
    fn test_small_site_skips_pdp() {
        let i = inputs(399);
        assert_eq!(derive_site_status(&i, today()), SiteStatus::PendingBdt);
    }

    #[test]
    fn test_annual_site_needs_pdp() {
        let mut i = inputs(8);
        i.is_annual = true;
        assert_eq!(derive_site_status(&i, today()), SiteStatus::PendingPdp);
    }

    #[test]
    fn test_status_string_mapping() {
        for s in VALID_SITE_STATUSES {
            let status = SiteStatus::from_str_value(s).unwrap();
            assert_eq!(status.as_str(), *s);
        }
        assert!(SiteStatus::from_str_value("paused").is_err());
    }

    #[test]
    fn test_terminal_string_mapping() {
        assert_eq!(TerminalStatus::from_str_value("canceled"), Ok(TerminalStatus::Canceled));
        assert_eq!(TerminalStatus::Completed.as_str(), "completed");
        assert!(TerminalStatus::from_str_value("active").is_err());
    }

    #[test]
    fn test_status_predicates() {
        assert!(SiteStatus::Canceled.is_terminal());
        assert!(!SiteStatus::Active.is_terminal());
        assert!(SiteStatus::PendingBdt.is_pending());
        assert!(!SiteStatus::InactiveToday.is_pending());
    }
}
