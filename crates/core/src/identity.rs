//! Identity and key types shared by the reconciler and the ledger.
//!
//! Workers and authorizing users live in disjoint id spaces. A
//! [`SignerRef`] carries the space alongside the id so the two can never
//! be confused, and an [`AssignmentKey`] names the single assignment row
//! allowed per worker/site pair.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// SignerRef
// ---------------------------------------------------------------------------

/// Who produced (or must produce) a signature.
///
/// Exactly one of the two identity spaces is populated. Raw optional parts
/// coming from rows or request bodies go through [`SignerRef::from_parts`],
/// so an invalid value cannot be constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "SignerParts", into = "SignerParts")]
pub enum SignerRef {
    Worker(DbId),
    User(DbId),
}

/// Wire shape of a [`SignerRef`]: two nullable id columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignerParts {
    pub worker_id: Option<DbId>,
    pub user_id: Option<DbId>,
}

impl SignerRef {
    /// Build a signer from two nullable ids, rejecting both-set and
    /// neither-set combinations.
    pub fn from_parts(worker_id: Option<DbId>, user_id: Option<DbId>) -> Result<Self, CoreError> {
        match (worker_id, user_id) {
            (Some(id), None) => Ok(Self::Worker(id)),
            (None, Some(id)) => Ok(Self::User(id)),
            (Some(w), Some(u)) => Err(CoreError::Validation(format!(
                "Signer must be a worker or a user, not both (worker_id={w}, user_id={u})"
            ))),
            (None, None) => Err(CoreError::Validation(
                "Signer must reference a worker or a user".to_string(),
            )),
        }
    }

    /// The id inside whichever space this signer belongs to.
    pub fn id(&self) -> DbId {
        match self {
            Self::Worker(id) | Self::User(id) => *id,
        }
    }

    pub fn worker_id(&self) -> Option<DbId> {
        match self {
            Self::Worker(id) => Some(*id),
            Self::User(_) => None,
        }
    }

    pub fn user_id(&self) -> Option<DbId> {
        match self {
            Self::User(id) => Some(*id),
            Self::Worker(_) => None,
        }
    }

    pub fn is_worker(&self) -> bool {
        matches!(self, Self::Worker(_))
    }

    /// Split back into the two nullable columns.
    pub fn into_parts(self) -> SignerParts {
        SignerParts {
            worker_id: self.worker_id(),
            user_id: self.user_id(),
        }
    }
}

impl TryFrom<SignerParts> for SignerRef {
    type Error = CoreError;

    fn try_from(parts: SignerParts) -> Result<Self, Self::Error> {
        Self::from_parts(parts.worker_id, parts.user_id)
    }
}

impl From<SignerRef> for SignerParts {
    fn from(signer: SignerRef) -> Self {
        signer.into_parts()
    }
}

impl fmt::Display for SignerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Worker(id) => write!(f, "worker:{id}"),
            Self::User(id) => write!(f, "user:{id}"),
        }
    }
}

// ---------------------------------------------------------------------------
// AssignmentKey
// ---------------------------------------------------------------------------

/// Natural key of an assignment record. At most one record exists per key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AssignmentKey {
    pub worker_id: DbId,
    pub site_id: DbId,
}

impl AssignmentKey {
    pub fn new(worker_id: DbId, site_id: DbId) -> Self {
        Self { worker_id, site_id }
    }
}
