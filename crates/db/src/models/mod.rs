//! Row structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` row struct matching the table
//! - A conversion into the matching `sitesafe_core` model
//! - A `Deserialize` create DTO where the table accepts inserts

pub mod document;
pub mod selection;
pub mod signature;
pub mod work_site;
pub mod worker;
