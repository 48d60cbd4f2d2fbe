//! # Dark Social Graph
//!
//! Encrypted, signed trust edges. A signal says "this truster vouches for
//! someone, with this weight, at this time". Everyone can check the truster
//! signed it. Only the trustee can find out who "someone" is.
//!
//! A signal carries three views of the trustee:
//!
//! - a **commitment** `SHA-256(trustee || nonce)` that is signed,
//! - an **envelope** holding `{trustee, nonce}` encrypted to the trustee,
//! - and nothing else. The trustee key never appears in clear.
//!
//! The trustee opens the envelope, recomputes the commitment, and checks the
//! signature. Third parties can only do the last step, over the commitment.
//!
//! Signals are immutable. Re-issuing one for the same edge produces an
//! unrelated commitment and ciphertext, so observers cannot link the two.

pub mod commitment;
pub mod signal;
pub mod weight;

pub use commitment::{commit_to_trustee, create_commitment, verify_commitment, Commitment};
pub use signal::{
    create_trust_signal, decrypt_trust_signal, decrypt_trust_signal_with_seed,
    verify_encrypted_trust_signature, DecryptedTrust, TrustError, TrustSignal,
};
pub use weight::{canonical_weight, is_valid_weight};
