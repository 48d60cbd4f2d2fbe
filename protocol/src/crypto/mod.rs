//! # Cryptographic Primitives
//!
//! Everything in the protocol that touches key material goes through here.
//! The building blocks are deliberately ordinary:
//!
//! - **Ed25519** for identities and signatures.
//! - **X25519** for key agreement, on keys derived from the Ed25519 identity.
//! - **HKDF-SHA256** for every derived key.
//! - **AES-256-GCM** for symmetric encryption.
//! - **SHA-256** for hashing and commitments.
//!
//! Nothing here implements a primitive itself. These are typed wrappers over
//! audited crates, plus the protocol's own domain separation and encodings.
//!
//! ## Failure style
//!
//! Malformed *input* (a 31-byte key, bad hex) is an `Err`. A failed
//! *verification* (wrong signature, wrong recipient, tampered ciphertext) is
//! `false` or `None`, with no detail about which check failed.

pub mod convert;
pub mod encryption;
pub mod envelope;
pub mod hash;
pub mod kdf;
pub mod keys;
pub mod rotation;
pub mod signatures;

pub use convert::{ed25519_priv_to_x25519, ed25519_to_x25519, ExchangeKeypair, ExchangePublicKey};
pub use envelope::{EncryptedPayload, EnvelopeError};
pub use hash::{hash, hash_object, sha256, stable_stringify, HashInput};
pub use kdf::derive_key;
pub use keys::{IdentityKeypair, IdentityPublicKey, KeyError, Signature};
pub use rotation::{
    create_ephemeral_key_proof, derive_current_ephemeral_key, derive_ephemeral_key,
    verify_ephemeral_key_proof, EphemeralKeypair,
};
pub use signatures::{sign, verify};
