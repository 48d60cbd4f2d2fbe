//! # Protocol Configuration & Constants
//!
//! Every magic number in Veil lives here. If you're hardcoding a constant
//! somewhere else, you're doing it wrong.
//!
//! The domain-separation literals below are part of the interoperability
//! contract between independent implementations. Changing the *meaning* of
//! anything signed or derived under one of them requires a new literal
//! (`..._V2`), never an edit to the existing one. Reusing an old tag with new
//! semantics lets a peer running the old code accept something it would
//! never have produced.

use std::time::Duration;

/// Wire protocol revision. Tracks the `_V1` domain literals below.
pub const PROTOCOL_VERSION: &str = "1";

// ---------------------------------------------------------------------------
// Domain Separation
// ---------------------------------------------------------------------------

/// Prefix of every trust-signal signature input.
pub const TRUST_SIGNAL_DOMAIN: &str = "TRUST_SIGNAL_V1";

/// Prefix of the message an identity signs to vouch for one of its
/// ephemeral keys. Includes the trailing colon; the raw 32-byte ephemeral
/// public key follows directly.
pub const EPHEMERAL_KEY_PROOF_DOMAIN: &str = "EPHEMERAL_KEY_PROOF_V1:";

/// HKDF salt for time-windowed ephemeral key derivation.
pub const EPHEMERAL_KEY_SALT: &[u8] = b"veil-ephemeral-key-v1";

/// HKDF salt for per-message encryption keys. Must differ from
/// [`EPHEMERAL_KEY_SALT`] so the two purposes never share key material.
pub const MESSAGE_ENCRYPTION_SALT: &[u8] = b"veil-message-encryption-v1";

// ---------------------------------------------------------------------------
// Key Sizes
// ---------------------------------------------------------------------------

/// Ed25519 signing seed length in bytes.
pub const SIGNING_KEY_LENGTH: usize = 32;

/// Ed25519 public (verifying) key length in bytes.
pub const VERIFYING_KEY_LENGTH: usize = 32;

/// Ed25519 signature length. Always 64 bytes.
pub const SIGNATURE_LENGTH: usize = 64;

/// X25519 secret scalar and public key length.
pub const X25519_KEY_LENGTH: usize = 32;

/// SHA-256 digest length, and therefore commitment length.
pub const HASH_OUTPUT_LENGTH: usize = 32;

/// Random nonce folded into every trustee commitment.
pub const COMMITMENT_NONCE_LENGTH: usize = 32;

// ---------------------------------------------------------------------------
// Symmetric Encryption
// ---------------------------------------------------------------------------

/// AES-256-GCM key length in bytes.
pub const AES_KEY_LENGTH: usize = 32;

/// AES-256-GCM nonce length in bytes. 96 bits. Twelve. Not sixteen.
pub const AES_NONCE_LENGTH: usize = 12;

/// AES-256-GCM authentication tag length in bytes.
pub const AES_TAG_LENGTH: usize = 16;

/// Largest output HKDF-SHA256 can produce (255 blocks of 32 bytes).
pub const HKDF_MAX_OUTPUT_LENGTH: usize = 255 * HASH_OUTPUT_LENGTH;

// ---------------------------------------------------------------------------
// Key Rotation
// ---------------------------------------------------------------------------

/// Default ephemeral key rotation period: one day.
pub const DEFAULT_ROTATION_PERIOD: Duration = Duration::from_secs(24 * 60 * 60);

/// Same period in milliseconds, since timestamps on the wire are ms.
/// Keep in sync with [`DEFAULT_ROTATION_PERIOD`].
pub const DEFAULT_ROTATION_PERIOD_MS: u64 = 86_400_000;

// ---------------------------------------------------------------------------
// Proof of Work
// ---------------------------------------------------------------------------

/// Hard ceiling on solver iterations. Hitting it means the difficulty is
/// misconfigured, not that the solver was unlucky: at 20 bits the expected
/// work is about a million hashes.
pub const POW_MAX_ATTEMPTS: u64 = 10_000_000;

/// How many nonces the cancellable solver tries between checks of its
/// cancellation flag.
pub const POW_CANCEL_CHECK_INTERVAL: u64 = 4_096;

/// Difficulty beyond which no SHA-256 output can qualify.
pub const POW_MAX_DIFFICULTY: u32 = (HASH_OUTPUT_LENGTH * 8) as u32;

// ---------------------------------------------------------------------------
// Trust Signals
// ---------------------------------------------------------------------------

/// Decimal places used when a weight is rendered into a signature input.
pub const TRUST_WEIGHT_DECIMALS: usize = 2;

/// Upper bound (inclusive) of a trust weight. The lower bound is an
/// exclusive zero.
pub const MAX_TRUST_WEIGHT: f64 = 1.0;
