// src/utils/hash.rs

//! Content-addressed identifier derivation.
//!
//! One shared hashing utility, used by the pipeline after extraction. The
//! same input always yields the same id, which is what makes the merge in
//! reconciliation idempotent.

use sha2::{Digest, Sha256};

/// Number of hex characters kept from the digest.
const ID_HEX_LEN: usize = 12;

/// Derive a stable tender id from arbitrary source content.
pub fn content_id(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    let digest = hex::encode(hasher.finalize());
    format!("t-{}", &digest[..ID_HEX_LEN])
}
