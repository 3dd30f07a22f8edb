//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod document_repo;
pub mod selection_repo;
pub mod signature_repo;
pub mod work_site_repo;
pub mod worker_repo;

pub use document_repo::DocumentRepo;
pub use selection_repo::SelectionRepo;
pub use signature_repo::SignatureRepo;
pub use work_site_repo::WorkSiteRepo;
pub use worker_repo::{AuthorizingUserRepo, WorkerRepo};
