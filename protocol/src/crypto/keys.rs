//! # Identity Keys
//!
//! Ed25519 key material for Veil identities.
//!
//! An identity is a 32-byte signing seed and the Ed25519 public key derived
//! from it. The public key is the participant's name on the network: trust
//! signals are authored by it, ephemeral keys are vouched for by it, and
//! sealed messages are addressed to (the Montgomery form of) it.
//!
//! ## Security considerations
//!
//! - Signing keys are zeroized on drop (ed25519-dalek does this for us).
//! - Key generation uses `OsRng`.
//! - Secret bytes are never logged and never appear in `Debug` output.
//! - `IdentityKeypair` is deliberately not `Serialize`. Exporting a secret
//!   should be a conscious `secret_key_hex()` call, not a side effect of
//!   putting a struct into a JSON response.
//!
//! Public keys and signatures serialize as lowercase hex strings (64 and 128
//! characters), which is the wire convention everywhere in the protocol.

use ed25519_dalek::{Signature as DalekSignature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::hash::{Hash, Hasher};
use thiserror::Error;

use crate::config::{SIGNATURE_LENGTH, SIGNING_KEY_LENGTH, VERIFYING_KEY_LENGTH};

/// Errors that can occur while parsing or validating key material.
///
/// Intentionally vague about *why*. Leaking details about key material
/// through error messages is a classic footgun.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("invalid secret key: expected {} bytes of hex", SIGNING_KEY_LENGTH)]
    InvalidSecretKey,

    #[error("invalid public key: not a {}-byte Ed25519 point", VERIFYING_KEY_LENGTH)]
    InvalidPublicKey,

    #[error("invalid signature: expected {} bytes of hex", SIGNATURE_LENGTH)]
    InvalidSignature,
}

/// A Veil identity: an Ed25519 signing key and its public half.
///
/// # Examples
///
/// ```
/// use veil_protocol::crypto::keys::IdentityKeypair;
///
/// let kp = IdentityKeypair::generate();
/// let sig = kp.sign(b"hello");
/// assert!(kp.public_key().verify(b"hello", &sig));
/// ```
pub struct IdentityKeypair {
    signing_key: SigningKey,
}

/// The public half of an identity. Safe to share, log, and put on the wire.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct IdentityPublicKey {
    bytes: [u8; VERIFYING_KEY_LENGTH],
}

/// A 64-byte Ed25519 signature.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    bytes: [u8; SIGNATURE_LENGTH],
}

impl IdentityKeypair {
    /// Generate a fresh identity from the OS random source.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Build an identity deterministically from a 32-byte seed.
    pub fn from_seed(seed: &[u8; SIGNING_KEY_LENGTH]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    /// Parse a hex-encoded 32-byte seed.
    pub fn from_hex(hex_str: &str) -> Result<Self, KeyError> {
        let seed = decode_fixed::<SIGNING_KEY_LENGTH>(hex_str).ok_or(KeyError::InvalidSecretKey)?;
        Ok(Self::from_seed(&seed))
    }

    /// The public key of this identity.
    pub fn public_key(&self) -> IdentityPublicKey {
        IdentityPublicKey {
            bytes: self.signing_key.verifying_key().to_bytes(),
        }
    }

    /// Sign a message. Ed25519 is deterministic: same key, same message,
    /// same signature.
    pub fn sign(&self, message: &[u8]) -> Signature {
        Signature {
            bytes: self.signing_key.sign(message).to_bytes(),
        }
    }

    /// The raw 32-byte seed. Handle with care.
    pub fn secret_key_bytes(&self) -> [u8; SIGNING_KEY_LENGTH] {
        self.signing_key.to_bytes()
    }

    /// Hex-encoded seed, for key files.
    pub fn secret_key_hex(&self) -> String {
        hex::encode(self.secret_key_bytes())
    }
}

impl Clone for IdentityKeypair {
    fn clone(&self) -> Self {
        Self::from_seed(&self.signing_key.to_bytes())
    }
}

impl fmt::Debug for IdentityKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IdentityKeypair(pub={})", self.public_key().to_hex())
    }
}

impl PartialEq for IdentityKeypair {
    /// Compares public keys only; no non-constant-time comparison of secrets.
    fn eq(&self, other: &Self) -> bool {
        self.public_key() == other.public_key()
    }
}

impl Eq for IdentityKeypair {}

// ---------------------------------------------------------------------------
// IdentityPublicKey
// ---------------------------------------------------------------------------

impl IdentityPublicKey {
    /// Wrap raw bytes without checking that they decode to a curve point.
    ///
    /// Verification against such a key simply fails; use
    /// [`try_from_slice`](Self::try_from_slice) at trust boundaries where you
    /// want malformed keys rejected up front.
    pub fn from_bytes(bytes: [u8; VERIFYING_KEY_LENGTH]) -> Self {
        Self { bytes }
    }

    /// Parse and validate a public key from a byte slice.
    pub fn try_from_slice(slice: &[u8]) -> Result<Self, KeyError> {
        let bytes: [u8; VERIFYING_KEY_LENGTH] =
            slice.try_into().map_err(|_| KeyError::InvalidPublicKey)?;
        VerifyingKey::from_bytes(&bytes).map_err(|_| KeyError::InvalidPublicKey)?;
        Ok(Self { bytes })
    }

    /// Parse and validate a hex-encoded public key.
    pub fn from_hex(s: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(s).map_err(|_| KeyError::InvalidPublicKey)?;
        Self::try_from_slice(&bytes)
    }

    /// The raw bytes.
    pub fn as_bytes(&self) -> &[u8; VERIFYING_KEY_LENGTH] {
        &self.bytes
    }

    /// Lowercase hex, 64 characters.
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }

    /// Convert to ed25519-dalek's type. Fails if the bytes are not a point.
    pub fn to_verifying_key(&self) -> Result<VerifyingKey, KeyError> {
        VerifyingKey::from_bytes(&self.bytes).map_err(|_| KeyError::InvalidPublicKey)
    }

    /// Verify a signature made by this identity.
    ///
    /// Returns a plain `bool`: malformed key, wrong message and forged
    /// signature are all just "no".
    pub fn verify(&self, message: &[u8], signature: &Signature) -> bool {
        let Ok(verifying_key) = self.to_verifying_key() else {
            return false;
        };
        let sig = DalekSignature::from_bytes(&signature.bytes);
        verifying_key.verify(message, &sig).is_ok()
    }
}

impl Hash for IdentityPublicKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bytes.hash(state);
    }
}

impl fmt::Display for IdentityPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for IdentityPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IdentityPublicKey({})", &self.to_hex()[..16])
    }
}

impl Serialize for IdentityPublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for IdentityPublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Signature
// ---------------------------------------------------------------------------

impl Signature {
    /// Wrap raw signature bytes.
    pub fn from_bytes(bytes: [u8; SIGNATURE_LENGTH]) -> Self {
        Self { bytes }
    }

    /// Parse a signature from a byte slice of exactly 64 bytes.
    pub fn try_from_slice(slice: &[u8]) -> Result<Self, KeyError> {
        let bytes = slice.try_into().map_err(|_| KeyError::InvalidSignature)?;
        Ok(Self { bytes })
    }

    /// Parse a hex-encoded signature (128 characters).
    pub fn from_hex(s: &str) -> Result<Self, KeyError> {
        let bytes = decode_fixed::<SIGNATURE_LENGTH>(s).ok_or(KeyError::InvalidSignature)?;
        Ok(Self { bytes })
    }

    /// The raw bytes.
    pub fn as_bytes(&self) -> &[u8; SIGNATURE_LENGTH] {
        &self.bytes
    }

    /// Lowercase hex, 128 characters.
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex_str = self.to_hex();
        write!(f, "Signature({}...{})", &hex_str[..8], &hex_str[120..])
    }
}

impl Serialize for Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(de::Error::custom)
    }
}

/// Decode hex into a fixed-size array, rejecting anything of the wrong length.
pub(crate) fn decode_fixed<const N: usize>(s: &str) -> Option<[u8; N]> {
    let bytes = hex::decode(s).ok()?;
    bytes.as_slice().try_into().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keypair_sign_verify_roundtrip() {
        let kp = IdentityKeypair::generate();
        let sig = kp.sign(b"trust, but verify");
        assert!(kp.public_key().verify(b"trust, but verify", &sig));
    }

    #[test]
    fn wrong_message_fails_verification() {
        let kp = IdentityKeypair::generate();
        let sig = kp.sign(b"correct message");
        assert!(!kp.public_key().verify(b"wrong message", &sig));
    }

    #[test]
    fn wrong_key_fails_verification() {
        let kp1 = IdentityKeypair::generate();
        let kp2 = IdentityKeypair::generate();
        let sig = kp1.sign(b"message");
        assert!(!kp2.public_key().verify(b"message", &sig));
    }

    #[test]
    fn deterministic_from_seed() {
        let seed = [42u8; 32];
        let kp1 = IdentityKeypair::from_seed(&seed);
        let kp2 = IdentityKeypair::from_seed(&seed);
        assert_eq!(kp1.public_key(), kp2.public_key());
        assert_eq!(kp1.sign(b"m"), kp2.sign(b"m"));
    }

    #[test]
    fn test_rfc8032_test_vector_1() {
        // RFC 8032 section 7.1, TEST 1 (empty message).
        let seed: [u8; 32] =
            decode_fixed("9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60")
                .unwrap();
        let kp = IdentityKeypair::from_seed(&seed);
        assert_eq!(
            kp.public_key().to_hex(),
            "d75a980182b10ab7d54bfed3c964073a0ee172f3daa62325af021a68f707511a"
        );
        assert_eq!(
            kp.sign(b"").to_hex(),
            "e5564300c360ac729086e2cc806e828a84877f1eb8e5d974d873e065224901555fb8821590a33bacc61e39701cf9b46bd25bf5f0595bbe24655141438e7a100b"
        );
    }

    #[test]
    fn test_secret_hex_roundtrip() {
        let kp = IdentityKeypair::generate();
        let restored = IdentityKeypair::from_hex(&kp.secret_key_hex()).unwrap();
        assert_eq!(kp, restored);
    }

    #[test]
    fn test_invalid_secret_hex_rejected() {
        assert!(IdentityKeypair::from_hex("deadbeef").is_err());
        assert!(IdentityKeypair::from_hex("not-hex-at-all").is_err());
    }

    #[test]
    fn public_key_hex_roundtrip() {
        let pk = IdentityKeypair::generate().public_key();
        let hex_str = pk.to_hex();
        assert_eq!(hex_str.len(), 64);
        assert_eq!(IdentityPublicKey::from_hex(&hex_str).unwrap(), pk);
    }

    #[test]
    fn public_key_rejects_wrong_length() {
        assert!(IdentityPublicKey::try_from_slice(&[0u8; 16]).is_err());
        assert!(IdentityPublicKey::from_hex("abcd").is_err());
    }

    #[test]
    fn signature_hex_roundtrip() {
        let sig = IdentityKeypair::generate().sign(b"test");
        let hex_str = sig.to_hex();
        assert_eq!(hex_str.len(), 128);
        assert_eq!(Signature::from_hex(&hex_str).unwrap(), sig);
    }

    #[test]
    fn signature_rejects_wrong_length() {
        assert!(Signature::from_hex(&"ab".repeat(63)).is_err());
        assert!(Signature::try_from_slice(&[0u8; 65]).is_err());
    }

    #[test]
    fn serde_uses_hex_strings() {
        let kp = IdentityKeypair::generate();
        let pk = kp.public_key();
        let json = serde_json::to_string(&pk).unwrap();
        assert_eq!(json, format!("\"{}\"", pk.to_hex()));
        let back: IdentityPublicKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, pk);

        let sig = kp.sign(b"x");
        let json = serde_json::to_string(&sig).unwrap();
        let back: Signature = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sig);
    }

    #[test]
    fn debug_does_not_leak_secret() {
        let kp = IdentityKeypair::generate();
        let debug_str = format!("{:?}", kp);
        assert!(debug_str.starts_with("IdentityKeypair(pub="));
        assert!(!debug_str.contains(&kp.secret_key_hex()));
    }

    #[test]
    fn two_generated_keypairs_differ() {
        let kp1 = IdentityKeypair::generate();
        let kp2 = IdentityKeypair::generate();
        assert_ne!(kp1.public_key(), kp2.public_key());
    }
}
