//! Creating and verifying encrypted trust signals.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, trace};

use super::commitment::{commit_to_trustee, random_nonce, Commitment};
use super::weight::canonical_weight;
use crate::config::{COMMITMENT_NONCE_LENGTH, SIGNING_KEY_LENGTH, TRUST_SIGNAL_DOMAIN};
use crate::crypto::convert::{ExchangeKeypair, ExchangePublicKey};
use crate::crypto::envelope::{self, EncryptedPayload, EnvelopeError};
use crate::crypto::keys::{decode_fixed, IdentityKeypair, IdentityPublicKey, KeyError, Signature};

/// Errors on the *create* and *parse* paths. Verification never returns
/// these; it returns `false` or `None`.
#[derive(Debug, Error)]
pub enum TrustError {
    #[error("trust weight must be a finite number in (0, 1], got {0}")]
    InvalidWeight(f64),

    #[error("invalid key material: {0}")]
    Key(#[from] KeyError),

    #[error("could not encrypt trustee: {0}")]
    Envelope(#[from] EnvelopeError),

    #[error("malformed trust signal JSON: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A directed, weighted trust edge whose target is hidden from everyone but
/// the target.
///
/// Immutable once created. A changed relationship is a new signal, never an
/// edited one. The serde form is the wire submission shape:
///
/// ```text
/// {
///   "truster": "<hex64>",
///   "trusteeCommitment": "<hex64>",
///   "encryptedTrustee": {"ephemeralPublicKey": "<hex64>", "ciphertext": "<hex>"},
///   "signature": "<hex128>",
///   "weight": 0.75,
///   "timestamp": 1700000000000
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrustSignal {
    pub truster: IdentityPublicKey,
    pub trustee_commitment: Commitment,
    pub encrypted_trustee: EncryptedPayload,
    pub signature: Signature,
    pub weight: f64,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
}

/// What the trustee learns by opening a signal addressed to them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecryptedTrust {
    pub trustee: IdentityPublicKey,
    pub nonce: [u8; COMMITMENT_NONCE_LENGTH],
}

/// Plaintext sealed inside `encrypted_trustee`.
#[derive(Serialize, Deserialize)]
struct TrusteeEnvelope {
    trustee: String,
    nonce: String,
}

impl TrustSignal {
    /// Parse the JSON wire form.
    pub fn from_json(json: &str) -> Result<Self, TrustError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Render the JSON wire form.
    pub fn to_json(&self) -> Result<String, TrustError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Third-party check of this signal against its own `truster` field.
    pub fn verify_signature(&self) -> bool {
        verify_encrypted_trust_signature(
            &self.trustee_commitment,
            &self.truster,
            &self.signature,
            self.weight,
            self.timestamp,
        )
    }
}

/// `TRUST_SIGNAL_V1:<commitment hex>:<weight, 2dp>:<timestamp>`.
pub fn signature_input(commitment: &Commitment, canonical_weight: &str, timestamp: u64) -> String {
    format!(
        "{}:{}:{}:{}",
        TRUST_SIGNAL_DOMAIN,
        commitment.to_hex(),
        canonical_weight,
        timestamp
    )
}

/// Attest that `truster` trusts `trustee` with `weight` at `timestamp`.
///
/// Only the trustee can learn who the edge points at; anyone can check that
/// `truster` signed it.
///
/// # Errors
///
/// [`TrustError::InvalidWeight`] for weights outside `(0, 1]`, and
/// [`TrustError::Key`] / [`TrustError::Envelope`] if `trustee` is not a
/// usable public key.
pub fn create_trust_signal(
    truster: &IdentityKeypair,
    trustee: &IdentityPublicKey,
    weight: f64,
    timestamp: u64,
) -> Result<TrustSignal, TrustError> {
    let canonical = canonical_weight(weight).ok_or(TrustError::InvalidWeight(weight))?;

    let nonce = random_nonce();
    let commitment = commit_to_trustee(trustee, &nonce);

    let plaintext = serde_json::to_string(&TrusteeEnvelope {
        trustee: trustee.to_hex(),
        nonce: hex::encode(nonce),
    })?;
    let encrypted_trustee = envelope::encrypt(&plaintext, &trustee.to_exchange_public()?)?;

    let signature = truster.sign(signature_input(&commitment, &canonical, timestamp).as_bytes());

    let truster_public = truster.public_key();
    let truster_hex = truster_public.to_hex();
    debug!(truster = &truster_hex[..16], timestamp, "trust signal created");

    Ok(TrustSignal {
        truster: truster_public,
        trustee_commitment: commitment,
        encrypted_trustee,
        signature,
        weight,
        timestamp,
    })
}

/// Trustee-side verification: decrypt, check the commitment, check the
/// signature.
///
/// Returns `None` if *any* step fails. The caller cannot tell which one, and
/// neither can anyone probing the protocol through the caller.
pub fn decrypt_trust_signal(
    signal: &TrustSignal,
    truster: &IdentityPublicKey,
    recipient: &IdentityKeypair,
) -> Option<DecryptedTrust> {
    open_with_exchange_keys(signal, truster, &recipient.exchange_keypair())
}

/// [`decrypt_trust_signal`] for callers holding the raw Ed25519 seed.
///
/// `recipient_public` is the recipient's X25519 public key. When omitted it
/// is recomputed from the seed.
pub fn decrypt_trust_signal_with_seed(
    signal: &TrustSignal,
    truster: &IdentityPublicKey,
    recipient_seed: &[u8; SIGNING_KEY_LENGTH],
    recipient_public: Option<ExchangePublicKey>,
) -> Option<DecryptedTrust> {
    let keys = ExchangeKeypair::from_identity_seed(recipient_seed);
    let opened = envelope::open_parts(
        &signal.encrypted_trustee.ephemeral_public_key,
        &signal.encrypted_trustee.ciphertext,
        &keys.secret_bytes(),
        recipient_public,
    );
    check_opened(signal, truster, opened)
}

fn open_with_exchange_keys(
    signal: &TrustSignal,
    truster: &IdentityPublicKey,
    keys: &ExchangeKeypair,
) -> Option<DecryptedTrust> {
    let opened = envelope::decrypt(&signal.encrypted_trustee, keys);
    check_opened(signal, truster, opened)
}

fn check_opened(
    signal: &TrustSignal,
    truster: &IdentityPublicKey,
    opened: Result<String, EnvelopeError>,
) -> Option<DecryptedTrust> {
    let verified = opened
        .ok()
        .and_then(|plaintext| parse_envelope(&plaintext))
        .filter(|d| commit_to_trustee(&d.trustee, &d.nonce) == signal.trustee_commitment)
        .filter(|_| {
            verify_encrypted_trust_signature(
                &signal.trustee_commitment,
                truster,
                &signal.signature,
                signal.weight,
                signal.timestamp,
            )
        });

    if verified.is_none() {
        trace!("trust signal not accepted by this recipient");
    }
    verified
}

fn parse_envelope(plaintext: &str) -> Option<DecryptedTrust> {
    let envelope: TrusteeEnvelope = serde_json::from_str(plaintext).ok()?;
    Some(DecryptedTrust {
        trustee: IdentityPublicKey::from_hex(&envelope.trustee).ok()?,
        nonce: decode_fixed::<COMMITMENT_NONCE_LENGTH>(&envelope.nonce)?,
    })
}

/// Third-party verification: did `truster` sign this commitment, weight and
/// timestamp? Learns nothing about the trustee.
///
/// A weight outside `(0, 1]` cannot have been signed by a conforming
/// implementation and yields `false`.
pub fn verify_encrypted_trust_signature(
    commitment: &Commitment,
    truster: &IdentityPublicKey,
    signature: &Signature,
    weight: f64,
    timestamp: u64,
) -> bool {
    let Some(canonical) = canonical_weight(weight) else {
        return false;
    };
    truster.verify(
        signature_input(commitment, &canonical, timestamp).as_bytes(),
        signature,
    )
}
