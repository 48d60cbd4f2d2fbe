//! # Sealed Envelopes
//!
//! One-shot, forward-secret encryption of a message to someone's X25519
//! public key.
//!
//! ## Construction
//!
//! 1. Generate a fresh ephemeral X25519 key pair. Its secret lives for the
//!    duration of this call and is consumed by the Diffie-Hellman step.
//! 2. `shared = X25519(ephemeral_secret, recipient_public)`.
//! 3. `key = HKDF-SHA256(shared, MESSAGE_ENCRYPTION_SALT,
//!    info = ephemeral_public || recipient_public, 32)`.
//! 4. AES-256-GCM the UTF-8 message under `key` with a random nonce.
//!
//! The payload is `{ephemeral_public_key, ciphertext}`. Decryption runs the
//! same steps from the recipient's side: `X25519(recipient_secret,
//! ephemeral_public)` gives the same shared secret.
//!
//! Both public keys go into the HKDF info so that a derived key is bound to
//! this exact sender/recipient pairing, even in the absurd event that two
//! different pairings produce the same DH output.
//!
//! Since each payload has its own ephemeral secret, and that secret is gone
//! once `encrypt` returns, compromising one payload's key material exposes
//! nothing about any other payload.
//!
//! ## Failure
//!
//! Every decryption problem (wrong recipient, tampered bytes, keys converted
//! inconsistently, plaintext that isn't UTF-8) surfaces as the single
//! [`EnvelopeError::DecryptFailed`]. One layer up that means "this payload
//! was not addressed to me", and that is all it should mean.

use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use x25519_dalek::{EphemeralSecret, PublicKey, StaticSecret};

use super::convert::{ExchangeKeypair, ExchangePublicKey};
use super::encryption;
use super::kdf::derive_key_array;
use super::keys::{IdentityKeypair, IdentityPublicKey, KeyError};
use crate::config::{AES_KEY_LENGTH, MESSAGE_ENCRYPTION_SALT, X25519_KEY_LENGTH};

/// Errors from sealing or opening an envelope.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("invalid recipient public key")]
    InvalidPublicKey,

    #[error("sealing failed")]
    Sealing,

    #[error("decryption failed")]
    DecryptFailed,
}

impl From<KeyError> for EnvelopeError {
    fn from(_: KeyError) -> Self {
        EnvelopeError::InvalidPublicKey
    }
}

/// A sealed message. Serializes as
/// `{"ephemeralPublicKey": "<hex64>", "ciphertext": "<hex>"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedPayload {
    /// The sender's single-use X25519 public key.
    pub ephemeral_public_key: ExchangePublicKey,
    /// `nonce || ciphertext || tag`.
    #[serde(with = "hex_bytes")]
    pub ciphertext: Vec<u8>,
}

/// Encrypt `message` so only the holder of `recipient`'s secret can read it.
pub fn encrypt(message: &str, recipient: &ExchangePublicKey) -> Result<EncryptedPayload, EnvelopeError> {
    let ephemeral_secret = EphemeralSecret::random_from_rng(OsRng);
    let ephemeral_public = ExchangePublicKey::from_bytes(PublicKey::from(&ephemeral_secret).to_bytes());

    let shared = ephemeral_secret.diffie_hellman(&recipient.to_dalek());
    // A low-order recipient key forces the shared secret to zero, and then
    // anyone can derive the message key.
    if !shared.was_contributory() {
        return Err(EnvelopeError::InvalidPublicKey);
    }

    let key = message_key(shared.as_bytes(), &ephemeral_public, recipient)
        .ok_or(EnvelopeError::Sealing)?;
    let ciphertext = encryption::seal(&key, message.as_bytes()).map_err(|_| EnvelopeError::Sealing)?;

    Ok(EncryptedPayload {
        ephemeral_public_key: ephemeral_public,
        ciphertext,
    })
}

/// Open a payload with the recipient's exchange key pair.
pub fn decrypt(payload: &EncryptedPayload, recipient: &ExchangeKeypair) -> Result<String, EnvelopeError> {
    open_parts(
        &payload.ephemeral_public_key,
        &payload.ciphertext,
        &recipient.secret_bytes(),
        Some(recipient.public_key()),
    )
}

/// Open from loose parts with a raw X25519 secret scalar.
///
/// When `recipient_public` is `None` it is recomputed from the secret, at the
/// cost of one extra scalar multiplication.
pub fn open_parts(
    ephemeral_public: &ExchangePublicKey,
    ciphertext: &[u8],
    recipient_secret: &[u8; X25519_KEY_LENGTH],
    recipient_public: Option<ExchangePublicKey>,
) -> Result<String, EnvelopeError> {
    let secret = StaticSecret::from(*recipient_secret);
    let recipient_public = recipient_public
        .unwrap_or_else(|| ExchangePublicKey::from_bytes(PublicKey::from(&secret).to_bytes()));

    let shared = secret.diffie_hellman(&ephemeral_public.to_dalek());
    if !shared.was_contributory() {
        return Err(EnvelopeError::DecryptFailed);
    }

    let key = message_key(shared.as_bytes(), ephemeral_public, &recipient_public)
        .ok_or(EnvelopeError::DecryptFailed)?;
    let plaintext = encryption::open(&key, ciphertext).map_err(|_| EnvelopeError::DecryptFailed)?;
    String::from_utf8(plaintext).map_err(|_| EnvelopeError::DecryptFailed)
}

/// Encrypt to an identity's Ed25519 public key, converting it on the way.
pub fn encrypt_for_identity(
    message: &str,
    recipient: &IdentityPublicKey,
) -> Result<EncryptedPayload, EnvelopeError> {
    encrypt(message, &recipient.to_exchange_public()?)
}

/// Open a payload addressed to [`encrypt_for_identity`]'s recipient.
pub fn decrypt_as_identity(
    payload: &EncryptedPayload,
    identity: &IdentityKeypair,
) -> Result<String, EnvelopeError> {
    decrypt(payload, &identity.exchange_keypair())
}

fn message_key(
    shared: &[u8; 32],
    ephemeral_public: &ExchangePublicKey,
    recipient_public: &ExchangePublicKey,
) -> Option<[u8; AES_KEY_LENGTH]> {
    let mut info = [0u8; 2 * X25519_KEY_LENGTH];
    info[..X25519_KEY_LENGTH].copy_from_slice(ephemeral_public.as_bytes());
    info[X25519_KEY_LENGTH..].copy_from_slice(recipient_public.as_bytes());
    derive_key_array(shared, MESSAGE_ENCRYPTION_SALT, &info).ok()
}

/// Serde adapter rendering byte vectors as lowercase hex strings.
pub(crate) mod hex_bytes {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(s).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AES_NONCE_LENGTH, AES_TAG_LENGTH};

    #[test]
    fn test_roundtrip() {
        let bob = IdentityKeypair::generate().exchange_keypair();
        let payload = encrypt("hello bob", &bob.public_key()).unwrap();
        assert_eq!(decrypt(&payload, &bob).unwrap(), "hello bob");
    }

    #[test]
    fn test_roundtrip_empty_and_unicode() {
        let bob = IdentityKeypair::generate().exchange_keypair();
        for message in ["", "ünïcödé ✓", "日本語のテキスト", "🦀🔐"] {
            let payload = encrypt(message, &bob.public_key()).unwrap();
            assert_eq!(decrypt(&payload, &bob).unwrap(), message);
        }
    }

    #[test]
    fn test_wrong_recipient_fails() {
        let bob = IdentityKeypair::generate().exchange_keypair();
        let carol = IdentityKeypair::generate().exchange_keypair();
        let payload = encrypt("for bob only", &bob.public_key()).unwrap();
        assert!(matches!(decrypt(&payload, &carol), Err(EnvelopeError::DecryptFailed)));
    }

    #[test]
    fn test_fresh_ephemeral_key_per_message() {
        let bob = IdentityKeypair::generate().exchange_keypair();
        let a = encrypt("same", &bob.public_key()).unwrap();
        let b = encrypt("same", &bob.public_key()).unwrap();
        assert_ne!(a.ephemeral_public_key, b.ephemeral_public_key);
        assert_ne!(a.ciphertext, b.ciphertext);
    }

    #[test]
    fn test_ciphertext_layout() {
        let bob = IdentityKeypair::generate().exchange_keypair();
        let payload = encrypt("12345", &bob.public_key()).unwrap();
        assert_eq!(payload.ciphertext.len(), AES_NONCE_LENGTH + 5 + AES_TAG_LENGTH);
    }

    #[test]
    fn test_tampered_ciphertext_fails() {
        let bob = IdentityKeypair::generate().exchange_keypair();
        let mut payload = encrypt("integrity", &bob.public_key()).unwrap();
        let last = payload.ciphertext.len() - 1;
        payload.ciphertext[last] ^= 0x80;
        assert!(decrypt(&payload, &bob).is_err());
    }

    #[test]
    fn test_swapped_ephemeral_key_fails() {
        let bob = IdentityKeypair::generate().exchange_keypair();
        let a = encrypt("one", &bob.public_key()).unwrap();
        let b = encrypt("two", &bob.public_key()).unwrap();
        let franken = EncryptedPayload {
            ephemeral_public_key: b.ephemeral_public_key,
            ciphertext: a.ciphertext,
        };
        assert!(decrypt(&franken, &bob).is_err());
    }

    #[test]
    fn test_open_parts_rederives_public_key() {
        let bob = IdentityKeypair::generate().exchange_keypair();
        let payload = encrypt("no public key needed", &bob.public_key()).unwrap();
        let opened = open_parts(
            &payload.ephemeral_public_key,
            &payload.ciphertext,
            &bob.secret_bytes(),
            None,
        )
        .unwrap();
        assert_eq!(opened, "no public key needed");
    }

    #[test]
    fn test_open_parts_with_wrong_public_key_fails() {
        // The recipient key is bound into the KDF info.
        let bob = IdentityKeypair::generate().exchange_keypair();
        let carol = IdentityKeypair::generate().exchange_keypair();
        let payload = encrypt("bound", &bob.public_key()).unwrap();
        assert!(open_parts(
            &payload.ephemeral_public_key,
            &payload.ciphertext,
            &bob.secret_bytes(),
            Some(carol.public_key()),
        )
        .is_err());
    }

    #[test]
    fn test_identity_helpers_convert_both_sides() {
        let bob = IdentityKeypair::generate();
        let payload = encrypt_for_identity("via ed25519", &bob.public_key()).unwrap();
        assert_eq!(decrypt_as_identity(&payload, &bob).unwrap(), "via ed25519");
    }

    #[test]
    fn test_unconverted_seed_cannot_decrypt() {
        // Using the Ed25519 seed as the X25519 secret "works" without error
        // at the DH level but derives a different key.
        let bob = IdentityKeypair::generate();
        let payload = encrypt_for_identity("hazard", &bob.public_key()).unwrap();
        assert!(open_parts(
            &payload.ephemeral_public_key,
            &payload.ciphertext,
            &bob.secret_key_bytes(),
            None,
        )
        .is_err());
    }

    #[test]
    fn test_low_order_recipient_rejected() {
        // The all-zero u-coordinate is a low-order point.
        let zero = ExchangePublicKey::from_bytes([0u8; 32]);
        assert!(matches!(encrypt("x", &zero), Err(EnvelopeError::InvalidPublicKey)));
    }

    #[test]
    fn test_wire_format() {
        let bob = IdentityKeypair::generate().exchange_keypair();
        let payload = encrypt("wire", &bob.public_key()).unwrap();
        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(json["ephemeralPublicKey"].as_str().unwrap().len(), 64);
        assert_eq!(
            json["ciphertext"].as_str().unwrap(),
            hex::encode(&payload.ciphertext)
        );

        let back: EncryptedPayload = serde_json::from_value(json).unwrap();
        assert_eq!(decrypt(&back, &bob).unwrap(), "wire");
    }
}
