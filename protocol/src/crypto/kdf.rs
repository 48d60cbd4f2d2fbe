//! # Key Derivation (HKDF-SHA256)
//!
//! Every symmetric key and every derived secret in Veil comes out of
//! [`derive_key`]. The salt names the *purpose* of the key and is always one
//! of the fixed constants in [`crate::config`]; the `info` argument binds the
//! key to its context (an epoch, a pair of public keys).
//!
//! Raw Diffie-Hellman output and raw master secrets are never used as keys
//! directly. DH outputs are curve points with algebraic structure, not
//! uniform bytes, and a master secret reused verbatim for two purposes is
//! one secret compromised twice.

use hkdf::Hkdf;
use sha2::Sha256;
use thiserror::Error;

use crate::config::HKDF_MAX_OUTPUT_LENGTH;

/// Errors from key derivation.
#[derive(Debug, Error)]
pub enum KdfError {
    #[error("requested {requested} bytes of key material, HKDF-SHA256 allows at most {}", HKDF_MAX_OUTPUT_LENGTH)]
    OutputTooLong { requested: usize },
}

/// HKDF-SHA256 extract-then-expand into `length` bytes.
///
/// # Example
///
/// ```
/// use veil_protocol::crypto::kdf::derive_key;
///
/// let key = derive_key(b"input keying material", b"purpose-salt", b"context", 32).unwrap();
/// assert_eq!(key.len(), 32);
/// ```
pub fn derive_key(ikm: &[u8], salt: &[u8], info: &[u8], length: usize) -> Result<Vec<u8>, KdfError> {
    let mut okm = vec![0u8; length];
    expand_into(ikm, salt, info, &mut okm)?;
    Ok(okm)
}

/// Same as [`derive_key`] with a compile-time output size, for keys that go
/// straight into a fixed-size cipher or curve type.
pub fn derive_key_array<const N: usize>(
    ikm: &[u8],
    salt: &[u8],
    info: &[u8],
) -> Result<[u8; N], KdfError> {
    let mut okm = [0u8; N];
    expand_into(ikm, salt, info, &mut okm)?;
    Ok(okm)
}

fn expand_into(ikm: &[u8], salt: &[u8], info: &[u8], okm: &mut [u8]) -> Result<(), KdfError> {
    let hk = Hkdf::<Sha256>::new(Some(salt), ikm);
    hk.expand(info, okm).map_err(|_| KdfError::OutputTooLong {
        requested: okm.len(),
    })
}
