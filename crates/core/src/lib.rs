//! Safety compliance core for temporary work sites.
//!
//! Worker-to-site selection reconciliation, the per-document signature
//! ledger, and on-demand site status derivation. Storage is reached only
//! through the contracts in [`backend`].

pub mod assignment;
pub mod backend;
pub mod directory;
pub mod document;
pub mod error;
pub mod identity;
pub mod keyed_lock;
pub mod ledger;
pub mod memory;
pub mod reconciler;
pub mod signature;
pub mod site;
pub mod site_status;
pub mod types;
