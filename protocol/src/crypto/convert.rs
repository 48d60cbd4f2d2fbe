//! # Edwards ↔ Montgomery Conversion
//!
//! A Veil identity is an Ed25519 key, but key exchange happens over X25519.
//! Rather than making every participant publish a second key, the X25519
//! pair is *derived* from the identity through the birational map between
//! the twisted Edwards and Montgomery forms of Curve25519.
//!
//! The two halves must be converted with the matching functions in this
//! module:
//!
//! - public: decompress the Edwards point, map `(x, y) → u = (1 + y)/(1 - y)`;
//! - secret: `SHA-512(seed)[0..32]`, clamped. This is the same scalar
//!   Ed25519 uses internally, *not* the raw seed.
//!
//! Feed the raw seed to X25519 instead and nothing errors. The two parties
//! just compute different shared secrets and every decryption fails. That is
//! why [`ExchangeKeypair`] can only be built from an identity, never from
//! arbitrary bytes.

use curve25519_dalek::edwards::CompressedEdwardsY;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha512};
use std::fmt;
use x25519_dalek::{PublicKey, SharedSecret, StaticSecret};

use super::keys::{decode_fixed, IdentityKeypair, IdentityPublicKey, KeyError};
use crate::config::{SIGNING_KEY_LENGTH, X25519_KEY_LENGTH};

/// Map an Ed25519 public key to its X25519 (Montgomery u-coordinate) form.
///
/// Fails if the bytes do not decompress to a point on the curve.
pub fn ed25519_to_x25519(ed_public: &[u8; 32]) -> Result<[u8; X25519_KEY_LENGTH], KeyError> {
    let point = CompressedEdwardsY(*ed_public)
        .decompress()
        .ok_or(KeyError::InvalidPublicKey)?;
    Ok(point.to_montgomery().to_bytes())
}

/// Map an Ed25519 seed to the X25519 secret scalar of the same identity.
pub fn ed25519_priv_to_x25519(ed_seed: &[u8; SIGNING_KEY_LENGTH]) -> [u8; X25519_KEY_LENGTH] {
    let digest = Sha512::digest(ed_seed);
    let mut scalar = [0u8; X25519_KEY_LENGTH];
    scalar.copy_from_slice(&digest[..X25519_KEY_LENGTH]);
    // RFC 7748 clamping. X25519 would apply it anyway; doing it here means the
    // exported bytes are exactly the scalar in use.
    scalar[0] &= 248;
    scalar[31] &= 127;
    scalar[31] |= 64;
    scalar
}

/// The X25519 public key of an identity (or of an ephemeral sender).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExchangePublicKey {
    bytes: [u8; X25519_KEY_LENGTH],
}

impl ExchangePublicKey {
    /// Wrap raw Montgomery u-coordinate bytes. Every 32-byte string is a
    /// valid X25519 input, so there is nothing to validate here.
    pub fn from_bytes(bytes: [u8; X25519_KEY_LENGTH]) -> Self {
        Self { bytes }
    }

    /// Parse 64 hex characters.
    pub fn from_hex(s: &str) -> Result<Self, KeyError> {
        let bytes = decode_fixed::<X25519_KEY_LENGTH>(s).ok_or(KeyError::InvalidPublicKey)?;
        Ok(Self { bytes })
    }

    /// The raw bytes.
    pub fn as_bytes(&self) -> &[u8; X25519_KEY_LENGTH] {
        &self.bytes
    }

    /// Lowercase hex, 64 characters.
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }

    pub(crate) fn to_dalek(self) -> PublicKey {
        PublicKey::from(self.bytes)
    }
}

impl fmt::Debug for ExchangePublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ExchangePublicKey({})", &self.to_hex()[..16])
    }
}

impl Serialize for ExchangePublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ExchangePublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(de::Error::custom)
    }
}

/// The X25519 key pair derived from an identity.
///
/// Only constructible from Ed25519 material, so the secret half always
/// matches what [`ed25519_to_x25519`] produces for the public half.
#[derive(Clone)]
pub struct ExchangeKeypair {
    secret: StaticSecret,
    public: ExchangePublicKey,
}

impl ExchangeKeypair {
    /// Derive from a raw Ed25519 seed.
    pub fn from_identity_seed(ed_seed: &[u8; SIGNING_KEY_LENGTH]) -> Self {
        Self::from_scalar(ed25519_priv_to_x25519(ed_seed))
    }

    /// Derive from an identity key pair.
    pub fn from_identity(identity: &IdentityKeypair) -> Self {
        Self::from_identity_seed(&identity.secret_key_bytes())
    }

    /// Wrap an X25519 secret scalar. Crate-internal so that outside callers
    /// cannot hand in an unconverted seed.
    pub(crate) fn from_scalar(scalar: [u8; X25519_KEY_LENGTH]) -> Self {
        let secret = StaticSecret::from(scalar);
        let public = ExchangePublicKey::from_bytes(PublicKey::from(&secret).to_bytes());
        Self { secret, public }
    }

    /// The public half.
    pub fn public_key(&self) -> ExchangePublicKey {
        self.public
    }

    /// The secret scalar bytes.
    pub fn secret_bytes(&self) -> [u8; X25519_KEY_LENGTH] {
        self.secret.to_bytes()
    }

    /// Raw X25519 Diffie-Hellman with a peer. Callers that need a key must
    /// run the output through [`crate::crypto::kdf`].
    pub fn diffie_hellman(&self, peer: &ExchangePublicKey) -> SharedSecret {
        self.secret.diffie_hellman(&peer.to_dalek())
    }
}

impl fmt::Debug for ExchangeKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ExchangeKeypair(pub={})", self.public.to_hex())
    }
}

impl IdentityKeypair {
    /// The X25519 key pair of this identity.
    pub fn exchange_keypair(&self) -> ExchangeKeypair {
        ExchangeKeypair::from_identity(self)
    }
}

impl IdentityPublicKey {
    /// The X25519 public key of this identity.
    pub fn to_exchange_public(&self) -> Result<ExchangePublicKey, KeyError> {
        ed25519_to_x25519(self.as_bytes()).map(ExchangePublicKey::from_bytes)
    }
}
