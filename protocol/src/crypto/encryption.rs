//! # AES-256-GCM
//!
//! The symmetric AEAD underneath every sealed payload in Veil. Callers never
//! hand this module a password or a raw DH output: keys come out of
//! [`crate::crypto::kdf`], one per message.
//!
//! ## Nonces
//!
//! GCM is unforgiving about nonce reuse under one key: it leaks the XOR of
//! the plaintexts and lets an attacker forge tags. We draw a fresh random
//! 96-bit nonce from the OS for every call. Since each sealed payload also
//! gets its own key, the birthday bound on random nonces never comes into
//! play.
//!
//! ## Wire format
//!
//! [`seal`] returns `nonce (12) || ciphertext || tag (16)` as one buffer, and
//! [`open`] expects exactly that. The nonce travels with the ciphertext so
//! the caller has nothing extra to manage.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use rand::RngCore;
use thiserror::Error;

use crate::config::{AES_KEY_LENGTH, AES_NONCE_LENGTH, AES_TAG_LENGTH};

/// Errors that can occur during symmetric encryption.
///
/// Deliberately coarse: "wrong key" and "tampered ciphertext" are the same
/// error, and neither tells an attacker which it was.
#[derive(Debug, Error)]
pub enum EncryptionError {
    #[error("encryption failed")]
    EncryptFailed,

    #[error("decryption failed")]
    DecryptFailed,

    #[error("ciphertext too short: must be at least {} bytes", AES_NONCE_LENGTH + AES_TAG_LENGTH)]
    CiphertextTooShort,
}

/// Encrypt under a fresh random nonce. Returns `nonce || ciphertext || tag`.
///
/// # Example
///
/// ```
/// use veil_protocol::crypto::encryption::{open, seal};
///
/// let key = [0x42u8; 32]; // real keys come from the KDF
/// let sealed = seal(&key, b"meet at dawn").unwrap();
/// assert_eq!(open(&key, &sealed).unwrap(), b"meet at dawn");
/// ```
pub fn seal(key: &[u8; AES_KEY_LENGTH], plaintext: &[u8]) -> Result<Vec<u8>, EncryptionError> {
    let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| EncryptionError::EncryptFailed)?;

    let mut nonce_bytes = [0u8; AES_NONCE_LENGTH];
    rand::rngs::OsRng.fill_bytes(&mut nonce_bytes);

    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce_bytes), plaintext)
        .map_err(|_| EncryptionError::EncryptFailed)?;

    let mut out = Vec::with_capacity(AES_NONCE_LENGTH + ciphertext.len());
    out.extend_from_slice(&nonce_bytes);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

/// Decrypt a buffer produced by [`seal`].
pub fn open(key: &[u8; AES_KEY_LENGTH], sealed: &[u8]) -> Result<Vec<u8>, EncryptionError> {
    if sealed.len() < AES_NONCE_LENGTH + AES_TAG_LENGTH {
        return Err(EncryptionError::CiphertextTooShort);
    }

    let (nonce_bytes, ciphertext) = sealed.split_at(AES_NONCE_LENGTH);
    let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| EncryptionError::DecryptFailed)?;

    cipher
        .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
        .map_err(|_| EncryptionError::DecryptFailed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key() -> [u8; 32] {
        let mut key = [0u8; 32];
        for (i, byte) in key.iter_mut().enumerate() {
            *byte = i as u8;
        }
        key
    }

    #[test]
    fn test_seal_open_roundtrip() {
        let key = test_key();
        let sealed = seal(&key, b"the quick brown fox").unwrap();
        assert_eq!(open(&key, &sealed).unwrap(), b"the quick brown fox");
    }

    #[test]
    fn test_empty_plaintext() {
        // Nothing in, nonce + tag out.
        let key = test_key();
        let sealed = seal(&key, b"").unwrap();
        assert_eq!(sealed.len(), AES_NONCE_LENGTH + AES_TAG_LENGTH);
        assert!(open(&key, &sealed).unwrap().is_empty());
    }

    #[test]
    fn test_sealed_length() {
        let key = test_key();
        let plaintext = b"exactly 26 bytes of input!";
        let sealed = seal(&key, plaintext).unwrap();
        assert_eq!(sealed.len(), AES_NONCE_LENGTH + plaintext.len() + AES_TAG_LENGTH);
    }

    #[test]
    fn test_wrong_key_fails() {
        let key = test_key();
        let sealed = seal(&key, b"secret").unwrap();
        let mut wrong = test_key();
        wrong[0] ^= 0xFF;
        assert!(matches!(open(&wrong, &sealed), Err(EncryptionError::DecryptFailed)));
    }

    #[test]
    fn test_tampering_detected() {
        let key = test_key();
        let sealed = seal(&key, b"secret").unwrap();
        for i in [0, AES_NONCE_LENGTH, sealed.len() - 1] {
            let mut tampered = sealed.clone();
            tampered[i] ^= 0x01;
            assert!(open(&key, &tampered).is_err(), "flip at byte {i} went unnoticed");
        }
    }

    #[test]
    fn test_unique_nonces() {
        let key = test_key();
        let a = seal(&key, b"message").unwrap();
        let b = seal(&key, b"message").unwrap();
        assert_ne!(&a[..AES_NONCE_LENGTH], &b[..AES_NONCE_LENGTH]);
    }

    #[test]
    fn test_too_short_rejected() {
        let key = test_key();
        assert!(matches!(
            open(&key, &[0u8; AES_NONCE_LENGTH + AES_TAG_LENGTH - 1]),
            Err(EncryptionError::CiphertextTooShort)
        ));
    }
}
