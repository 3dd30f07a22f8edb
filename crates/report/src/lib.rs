//! Daily compliance report over every work site.

pub mod config;
pub mod report;
