//! # Ephemeral Key Rotation
//!
//! Time-windowed X25519 keys derived from a long-term master secret, with no
//! state to persist.
//!
//! Time is cut into epochs of `rotation_period_ms`. The key for an epoch is
//!
//! ```text
//! epoch  = floor(timestamp_ms / rotation_period_ms)
//! info   = epoch (u64 BE) || rotation_period_ms (u64 BE)
//! secret = HKDF-SHA256(master, salt = EPHEMERAL_KEY_SALT, info, 32)
//! public = X25519(secret, basepoint)
//! ```
//!
//! Anyone holding the master secret and agreeing on the period can recompute
//! the key for the current epoch, or any past one, on demand. Keys of
//! different epochs are unlinkable without the master secret.
//!
//! An ephemeral key is tied back to its owner by a proof: an Ed25519
//! signature by the identity key over
//! `"EPHEMERAL_KEY_PROOF_V1:" || ephemeral_public`. The proof carries no
//! expiry; how long to honour it (usually "while its epoch is current") is
//! the relying party's call.

use thiserror::Error;

use super::convert::{ExchangeKeypair, ExchangePublicKey};
use super::kdf::{derive_key_array, KdfError};
use super::keys::{IdentityKeypair, IdentityPublicKey, Signature};
use crate::config::{EPHEMERAL_KEY_PROOF_DOMAIN, EPHEMERAL_KEY_SALT, X25519_KEY_LENGTH};

/// Errors from ephemeral key derivation.
#[derive(Debug, Error)]
pub enum RotationError {
    #[error("rotation period must be greater than zero")]
    ZeroPeriod,

    #[error("ephemeral key derivation failed: {0}")]
    Kdf(#[from] KdfError),
}

/// The ephemeral key pair of one epoch.
#[derive(Clone)]
pub struct EphemeralKeypair {
    epoch: u64,
    rotation_period_ms: u64,
    keys: ExchangeKeypair,
}

impl EphemeralKeypair {
    /// Epoch number this key belongs to.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// The public half.
    pub fn public_key(&self) -> ExchangePublicKey {
        self.keys.public_key()
    }

    /// The 32-byte HKDF output used as the X25519 secret.
    pub fn secret_bytes(&self) -> [u8; X25519_KEY_LENGTH] {
        self.keys.secret_bytes()
    }

    /// Usable as an ordinary exchange key pair (e.g. to open sealed payloads
    /// addressed to this epoch's key).
    pub fn exchange_keypair(&self) -> &ExchangeKeypair {
        &self.keys
    }

    /// First millisecond of this epoch.
    pub fn valid_from_ms(&self) -> u64 {
        self.epoch.saturating_mul(self.rotation_period_ms)
    }

    /// First millisecond of the *next* epoch.
    pub fn valid_until_ms(&self) -> u64 {
        self.epoch
            .saturating_add(1)
            .saturating_mul(self.rotation_period_ms)
    }
}

impl std::fmt::Debug for EphemeralKeypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "EphemeralKeypair(epoch={}, pub={})",
            self.epoch,
            self.public_key().to_hex()
        )
    }
}

/// `floor(timestamp_ms / rotation_period_ms)`.
pub fn epoch_for(timestamp_ms: u64, rotation_period_ms: u64) -> Result<u64, RotationError> {
    if rotation_period_ms == 0 {
        return Err(RotationError::ZeroPeriod);
    }
    Ok(timestamp_ms / rotation_period_ms)
}

/// Derive the ephemeral key pair for the epoch containing `timestamp_ms`.
///
/// # Example
///
/// ```
/// use veil_protocol::crypto::rotation::derive_ephemeral_key;
///
/// let master = [7u8; 32];
/// let hour = 3_600_000;
/// let a = derive_ephemeral_key(&master, hour, 10 * hour + 1).unwrap();
/// let b = derive_ephemeral_key(&master, hour, 10 * hour + 59_000).unwrap();
/// assert_eq!(a.public_key(), b.public_key());
/// assert_eq!(a.epoch(), 10);
/// ```
pub fn derive_ephemeral_key(
    master_secret: &[u8],
    rotation_period_ms: u64,
    timestamp_ms: u64,
) -> Result<EphemeralKeypair, RotationError> {
    let epoch = epoch_for(timestamp_ms, rotation_period_ms)?;

    let mut info = [0u8; 16];
    info[..8].copy_from_slice(&epoch.to_be_bytes());
    info[8..].copy_from_slice(&rotation_period_ms.to_be_bytes());

    let secret: [u8; X25519_KEY_LENGTH] =
        derive_key_array(master_secret, EPHEMERAL_KEY_SALT, &info)?;

    Ok(EphemeralKeypair {
        epoch,
        rotation_period_ms,
        keys: ExchangeKeypair::from_scalar(secret),
    })
}

/// Derive the key pair for the epoch containing the current wall-clock time.
pub fn derive_current_ephemeral_key(
    master_secret: &[u8],
    rotation_period_ms: u64,
) -> Result<EphemeralKeypair, RotationError> {
    derive_ephemeral_key(master_secret, rotation_period_ms, now_millis())
}

/// Milliseconds since the Unix epoch. Clocks set before 1970 read as zero.
pub fn now_millis() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0)
}

fn proof_message(ephemeral_public: &[u8]) -> Vec<u8> {
    let mut message = Vec::with_capacity(EPHEMERAL_KEY_PROOF_DOMAIN.len() + ephemeral_public.len());
    message.extend_from_slice(EPHEMERAL_KEY_PROOF_DOMAIN.as_bytes());
    message.extend_from_slice(ephemeral_public);
    message
}

/// Sign `ephemeral_public` with the long-term identity, vouching that the
/// ephemeral key speaks for it.
pub fn create_ephemeral_key_proof(
    ephemeral_public: &ExchangePublicKey,
    master: &IdentityKeypair,
) -> Signature {
    master.sign(&proof_message(ephemeral_public.as_bytes()))
}

/// Check a proof made by [`create_ephemeral_key_proof`].
pub fn verify_ephemeral_key_proof(
    ephemeral_public: &ExchangePublicKey,
    proof: &Signature,
    master_public: &IdentityPublicKey,
) -> bool {
    master_public.verify(&proof_message(ephemeral_public.as_bytes()), proof)
}

/// Same check over raw wire bytes. Any length or encoding problem is `false`.
pub fn verify_ephemeral_key_proof_raw(
    ephemeral_public: &[u8],
    proof: &[u8],
    master_public: &[u8],
) -> bool {
    if ephemeral_public.len() != X25519_KEY_LENGTH {
        return false;
    }
    super::signatures::verify_raw(master_public, &proof_message(ephemeral_public), proof)
}
