//! Signatures, sign requests, and the pure completion check.

use std::collections::BTreeSet;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::identity::SignerRef;
use crate::site::split_name;
use crate::types::{DbId, Timestamp};

/// Upper bound on a decoded signature image.
pub const MAX_SIGNATURE_IMAGE_BYTES: usize = 2 * 1024 * 1024;

/// Upper bound on a captured display name.
pub const MAX_DISPLAY_NAME_LENGTH: usize = 200;

// ---------------------------------------------------------------------------
// Signature
// ---------------------------------------------------------------------------

/// An active signature on a document.
///
/// `signer_name` is a snapshot taken when signing; later renames of the
/// worker or user do not touch it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    pub id: DbId,
    pub document_id: DbId,
    pub signer: SignerRef,
    pub signer_name: String,
    pub created_at: Timestamp,
}

impl Signature {
    pub fn is_worker_signed(&self) -> bool {
        self.signer.is_worker()
    }
}

/// Order signatures for display: oldest first, id as tie-breaker.
pub fn sort_for_display(signatures: &mut [Signature]) {
    signatures.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
}

// ---------------------------------------------------------------------------
// SignRequest
// ---------------------------------------------------------------------------

/// Payload sent to the signature backend. `signer_id` lives in the space
/// chosen by the backend call (worker or user).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignRequest {
    pub signer_id: DbId,
    pub document_id: DbId,
    pub first_name: String,
    pub last_name: String,
    /// Base64-encoded image.
    pub signature_image: String,
}

impl SignRequest {
    /// Validate inputs and build the backend payload.
    pub fn build(
        document_id: DbId,
        signer: SignerRef,
        display_name: &str,
        signature_image: &[u8],
    ) -> Result<Self, CoreError> {
        validate_display_name(display_name)?;
        validate_signature_image(signature_image)?;

        let (first_name, last_name) = split_name(display_name);
        Ok(Self {
            signer_id: signer.id(),
            document_id,
            first_name,
            last_name,
            signature_image: STANDARD.encode(signature_image),
        })
    }

    /// Decode the image payload.
    pub fn decode_image(&self) -> Result<Vec<u8>, CoreError> {
        STANDARD
            .decode(&self.signature_image)
            .map_err(|e| CoreError::Validation(format!("Signature image is not valid base64: {e}")))
    }
}

/// Validate the name captured on a signature.
pub fn validate_display_name(name: &str) -> Result<(), String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err("Signer display name must not be empty".to_string());
    }
    if trimmed.chars().count() > MAX_DISPLAY_NAME_LENGTH {
        return Err(format!(
            "Signer display name exceeds {MAX_DISPLAY_NAME_LENGTH} characters"
        ));
    }
    Ok(())
}

/// Validate the raw signature image.
pub fn validate_signature_image(image: &[u8]) -> Result<(), String> {
    if image.is_empty() {
        return Err("Signature image must not be empty".to_string());
    }
    if image.len() > MAX_SIGNATURE_IMAGE_BYTES {
        return Err(format!(
            "Signature image is {} bytes, limit is {MAX_SIGNATURE_IMAGE_BYTES}",
            image.len()
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Completion
// ---------------------------------------------------------------------------

/// Who has signed and who is still missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentCompletion {
    pub document_id: DbId,
    pub required: usize,
    pub signed: usize,
    pub missing: Vec<SignerRef>,
    pub complete_pct: u8,
}

impl DocumentCompletion {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Compare `signatures` against `required`.
///
/// Signatures from signers outside the required set are ignored. An empty
/// required set is trivially complete.
pub fn evaluate_completion(
    document_id: DbId,
    required: &BTreeSet<SignerRef>,
    signatures: &[Signature],
) -> DocumentCompletion {
    let present: BTreeSet<SignerRef> = signatures
        .iter()
        .filter(|s| s.document_id == document_id)
        .map(|s| s.signer)
        .collect();

    let missing: Vec<SignerRef> = required.difference(&present).copied().collect();
    let signed = required.len() - missing.len();
    let complete_pct = if required.is_empty() {
        100
    } else {
        ((signed as f64 / required.len() as f64) * 100.0).round() as u8
    };

    DocumentCompletion {
        document_id,
        required: required.len(),
        signed,
        missing,
        complete_pct,
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::{Duration, Utc};

    use super::*;

    fn signature(id: DbId, signer: SignerRef) -> Signature {
        Signature {
            id,
            document_id: 1,
            signer,
            signer_name: "Test Signer".into(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_build_request_splits_name_and_encodes() {
        let req = SignRequest::build(3, SignerRef::Worker(8), "Ana Lopez", b"png").unwrap();
        assert_eq!(req.signer_id, 8);
        assert_eq!(req.first_name, "Ana");
        assert_eq!(req.last_name, "Lopez");
        assert_eq!(req.signature_image, "cG5n");
        assert_eq!(req.decode_image().unwrap(), b"png");
    }

    #[test]
    fn test_blank_name_rejected() {
        assert_matches!(
            SignRequest::build(3, SignerRef::User(1), "   ", b"x"),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn test_empty_image_rejected() {
        assert_matches!(
            SignRequest::build(3, SignerRef::User(1), "Ana", b""),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn test_oversized_name_rejected() {
        let name = "x".repeat(MAX_DISPLAY_NAME_LENGTH + 1);
        assert!(validate_display_name(&name).is_err());
    }

    #[test]
    fn test_completion_counts_required_only() {
        let required: BTreeSet<_> = [SignerRef::Worker(1), SignerRef::User(2)].into();
        let sigs = vec![signature(1, SignerRef::Worker(1)), signature(2, SignerRef::Worker(99))];

        let completion = evaluate_completion(1, &required, &sigs);
        assert_eq!(completion.signed, 1);
        assert_eq!(completion.missing, vec![SignerRef::User(2)]);
        assert_eq!(completion.complete_pct, 50);
        assert!(!completion.is_complete());
    }

    #[test]
    fn test_same_id_other_space_does_not_count() {
        let required: BTreeSet<_> = [SignerRef::User(1)].into();
        let sigs = vec![signature(1, SignerRef::Worker(1))];
        assert!(!evaluate_completion(1, &required, &sigs).is_complete());
    }

    #[test]
    fn test_empty_requirement_is_complete() {
        let completion = evaluate_completion(1, &BTreeSet::new(), &[]);
        assert!(completion.is_complete());
        assert_eq!(completion.complete_pct, 100);
    }

    #[test]
    fn test_sort_for_display_by_time_then_id() {
        let now = Utc::now();
        let mut a = signature(2, SignerRef::Worker(1));
        a.created_at = now;
        let mut b = signature(1, SignerRef::User(1));
        b.created_at = now;
        let mut c = signature(3, SignerRef::Worker(2));
        c.created_at = now - Duration::seconds(5);

        let mut list = vec![a, b, c];
        sort_for_display(&mut list);
        let ids: Vec<_> = list.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }
}
