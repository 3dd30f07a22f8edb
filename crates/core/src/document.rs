//! Safety documents and their required-signer sets.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::assignment::{active_worker_ids, AssignmentRecord};
use crate::error::CoreError;
use crate::identity::SignerRef;
use crate::site::WorkSite;
use crate::types::DbId;

pub const KIND_PDP: &str = "pdp";
pub const KIND_BDT: &str = "bdt";

/// All valid document kind strings.
pub const VALID_DOCUMENT_KINDS: &[&str] = &[KIND_PDP, KIND_BDT];

/// Prevention plan or daily work authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Pdp,
    Bdt,
}

impl DocumentKind {
    /// Convert from a database string value.
    pub fn from_str_value(s: &str) -> Result<Self, String> {
        match s {
            KIND_PDP => Ok(Self::Pdp),
            KIND_BDT => Ok(Self::Bdt),
            _ => Err(format!(
                "Invalid document kind '{s}'. Must be one of: {}",
                VALID_DOCUMENT_KINDS.join(", ")
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdp => KIND_PDP,
            Self::Bdt => KIND_BDT,
        }
    }
}

/// A signable document attached to one site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: DbId,
    pub site_id: DbId,
    pub kind: DocumentKind,
}

/// Compute who must sign `document`.
///
/// Every worker with an active assignment on the document's site, plus the
/// site's authorizing user for a PDP. The set is derived on every call and
/// never stored.
pub fn required_signers(
    document: &Document,
    site: &WorkSite,
    selections: &[AssignmentRecord],
) -> Result<BTreeSet<SignerRef>, CoreError> {
    if document.site_id != site.id {
        return Err(CoreError::Validation(format!(
            "Document {} belongs to site {}, not site {}",
            document.id, document.site_id, site.id
        )));
    }

    let mut required: BTreeSet<SignerRef> = active_worker_ids(selections, site.id)
        .into_iter()
        .map(SignerRef::Worker)
        .collect();

    if document.kind == DocumentKind::Pdp {
        required.insert(SignerRef::User(site.authorizing_user_id));
    }

    Ok(required)
}
