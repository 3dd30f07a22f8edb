//! Work sites and the two signer populations attached to them.
//!
//! These records are owned by external collaborators; the core only reads
//! their attributes. Cross-record references are plain ids.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::site_status::TerminalStatus;
use crate::types::{DbId, Day};

/// Declared hour count at or above which a site needs a prevention plan.
pub const PDP_HOUR_THRESHOLD: i32 = 400;

// ---------------------------------------------------------------------------
// DateRange
// ---------------------------------------------------------------------------

/// Inclusive calendar range during which a site operates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawDateRange")]
pub struct DateRange {
    start: Day,
    end: Day,
}

#[derive(Deserialize)]
struct RawDateRange {
    start: Day,
    end: Day,
}

impl DateRange {
    /// Build a range, rejecting `start > end`.
    pub fn new(start: Day, end: Day) -> Result<Self, CoreError> {
        if start > end {
            return Err(CoreError::Validation(format!(
                "Date range start {start} is after end {end}"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> Day {
        self.start
    }

    pub fn end(&self) -> Day {
        self.end
    }

    /// Whether `day` falls inside the range, bounds included.
    pub fn contains(&self, day: Day) -> bool {
        self.start <= day && day <= self.end
    }
}

impl TryFrom<RawDateRange> for DateRange {
    type Error = CoreError;

    fn try_from(raw: RawDateRange) -> Result<Self, Self::Error> {
        Self::new(raw.start, raw.end)
    }
}

// ---------------------------------------------------------------------------
// WorkSite
// ---------------------------------------------------------------------------

/// A temporary work location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkSite {
    pub id: DbId,
    pub name: String,
    pub dates: DateRange,
    /// Declared number of work hours.
    pub hour_count: i32,
    pub is_annual: bool,
    pub is_dangerous_work: bool,
    pub authorizing_user_id: DbId,
    /// Explicit terminal state set by the site owner.
    pub terminal_status: Option<TerminalStatus>,
}

impl WorkSite {
    /// Whether this site needs a signed prevention plan before it can run.
    pub fn requires_pdp(&self) -> bool {
        pdp_required(self.hour_count, self.is_annual)
    }
}

/// PDP rule: large sites and annual sites need a prevention plan.
pub fn pdp_required(hour_count: i32, is_annual: bool) -> bool {
    hour_count >= PDP_HOUR_THRESHOLD || is_annual
}

/// Validate a site name.
pub fn validate_site_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Site name must not be empty".to_string());
    }
    Ok(())
}

/// Validate a declared hour count.
pub fn validate_hour_count(hours: i32) -> Result<(), String> {
    if hours < 0 {
        return Err(format!("Hour count must not be negative, got {hours}"));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Signer populations
// ---------------------------------------------------------------------------

/// A site worker, employed by a company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Worker {
    pub id: DbId,
    pub first_name: String,
    pub last_name: String,
    pub company_id: DbId,
}

impl Worker {
    pub fn display_name(&self) -> String {
        join_name(&self.first_name, &self.last_name)
    }
}

/// A user allowed to authorize work on a site. Ids are disjoint from
/// [`Worker`] ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizingUser {
    pub id: DbId,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
}

impl AuthorizingUser {
    pub fn display_name(&self) -> String {
        join_name(&self.first_name, &self.last_name)
    }
}

/// Join first and last names, tolerating either being blank.
pub fn join_name(first: &str, last: &str) -> String {
    format!("{} {}", first.trim(), last.trim()).trim().to_string()
}

/// Split a display name into first and last name on the first run of
/// whitespace. A single word becomes the first name.
pub fn split_name(display_name: &str) -> (String, String) {
    let trimmed = display_name.trim();
    match trimmed.split_once(char::is_whitespace) {
        Some((first, last)) => (first.to_string(), last.trim().to_string()),
        None => (trimmed.to_string(), String::new()),
    }
}
