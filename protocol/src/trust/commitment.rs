//! Hash commitments used by trust signals.
//!
//! A trustee commitment is `SHA-256(trustee_public_key || nonce)` with a
//! fresh 32-byte random nonce per signal. It hides who the trustee is from
//! anyone without the nonce, and lets the trustee (who recovers the nonce by
//! decrypting) check that the signed commitment really names them.
//!
//! Because the nonce is fresh every time, two signals for the same edge have
//! unrelated commitments. That is the privacy property working as intended,
//! and it also means a commitment alone can never be used to spot duplicate
//! edges.

use rand::RngCore;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::config::{COMMITMENT_NONCE_LENGTH, HASH_OUTPUT_LENGTH};
use crate::crypto::hash::hash;
use crate::crypto::keys::{decode_fixed, IdentityPublicKey, KeyError};

/// A 32-byte commitment digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Commitment {
    bytes: [u8; HASH_OUTPUT_LENGTH],
}

impl Commitment {
    pub fn from_bytes(bytes: [u8; HASH_OUTPUT_LENGTH]) -> Self {
        Self { bytes }
    }

    /// Parse 64 hex characters.
    pub fn from_hex(s: &str) -> Result<Self, KeyError> {
        // Reported as a key error: it is the same class of malformed input.
        let bytes = decode_fixed::<HASH_OUTPUT_LENGTH>(s).ok_or(KeyError::InvalidPublicKey)?;
        Ok(Self { bytes })
    }

    pub fn as_bytes(&self) -> &[u8; HASH_OUTPUT_LENGTH] {
        &self.bytes
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }
}

impl fmt::Debug for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Commitment({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Commitment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Commitment {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        decode_fixed::<HASH_OUTPUT_LENGTH>(&s)
            .map(Self::from_bytes)
            .ok_or_else(|| de::Error::custom("commitment must be 64 hex characters"))
    }
}

/// 32 fresh bytes from the OS random source.
pub fn random_nonce() -> [u8; COMMITMENT_NONCE_LENGTH] {
    let mut nonce = [0u8; COMMITMENT_NONCE_LENGTH];
    rand::rngs::OsRng.fill_bytes(&mut nonce);
    nonce
}

/// `SHA-256(trustee || nonce)`.
pub fn commit_to_trustee(
    trustee: &IdentityPublicKey,
    nonce: &[u8; COMMITMENT_NONCE_LENGTH],
) -> Commitment {
    Commitment::from_bytes(hash(&[trustee.as_bytes().into(), nonce.into()]))
}

/// Commit to an arbitrary value with a random blinding factor. Returns the
/// commitment and the blinding factor needed to open it.
///
/// PLACEHOLDER: this is a bare salted hash, pending a stronger blinding
/// scheme. It is binding and hiding only as far as SHA-256 is, and offers no
/// homomorphic or zero-knowledge opening. Replacing it changes what
/// commitments mean on the wire and must ship under a new protocol version.
pub fn create_commitment(value: &[u8]) -> (Commitment, [u8; COMMITMENT_NONCE_LENGTH]) {
    let blinding = random_nonce();
    let commitment = Commitment::from_bytes(hash(&[value.into(), (&blinding).into()]));
    (commitment, blinding)
}

/// Open a [`create_commitment`] commitment.
pub fn verify_commitment(
    commitment: &Commitment,
    value: &[u8],
    blinding: &[u8; COMMITMENT_NONCE_LENGTH],
) -> bool {
    hash(&[value.into(), blinding.into()]) == commitment.bytes
}
