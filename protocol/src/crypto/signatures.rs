//! # Digital Signatures
//!
//! Ed25519 signing and verification for Veil.
//!
//! Verification in this module never fails loudly. Its main caller is code
//! chewing through gossip from peers it has no reason to trust, and one
//! malformed message must not take that loop down. So every verifier returns
//! `bool`, and "bad key bytes", "bad signature bytes" and "forged signature"
//! are all the same `false`. We don't hand out an error oracle.

use super::keys::{IdentityKeypair, IdentityPublicKey, Signature};
use crate::config::SIGNING_KEY_LENGTH;

/// Sign a message with an identity.
///
/// # Example
///
/// ```
/// use veil_protocol::crypto::{sign, verify, IdentityKeypair};
///
/// let keypair = IdentityKeypair::generate();
/// let signature = sign(&keypair, b"hello, graph");
/// assert!(verify(&keypair.public_key(), b"hello, graph", &signature));
/// ```
pub fn sign(keypair: &IdentityKeypair, message: &[u8]) -> Signature {
    keypair.sign(message)
}

/// Sign with a raw 32-byte seed, for callers that hold the seed rather than
/// a constructed key pair.
pub fn sign_with_seed(seed: &[u8; SIGNING_KEY_LENGTH], message: &[u8]) -> Signature {
    IdentityKeypair::from_seed(seed).sign(message)
}

/// Verify a signature. `true` only if it is valid for this key and message.
pub fn verify(public_key: &IdentityPublicKey, message: &[u8], signature: &Signature) -> bool {
    public_key.verify(message, signature)
}

/// Verify using raw byte slices straight off the wire.
///
/// Wrong-length keys or signatures are reported as `false`, same as any
/// other failure.
pub fn verify_raw(public_key_bytes: &[u8], message: &[u8], signature_bytes: &[u8]) -> bool {
    let Ok(public_key) = IdentityPublicKey::try_from_slice(public_key_bytes) else {
        return false;
    };
    let Ok(signature) = Signature::try_from_slice(signature_bytes) else {
        return false;
    };
    public_key.verify(message, &signature)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_and_verify() {
        let kp = IdentityKeypair::generate();
        let sig = sign(&kp, b"hello, world");
        assert!(verify(&kp.public_key(), b"hello, world", &sig));
    }

    #[test]
    fn test_sign_with_seed_matches_keypair() {
        let kp = IdentityKeypair::generate();
        let seed = kp.secret_key_bytes();
        assert_eq!(sign_with_seed(&seed, b"m"), sign(&kp, b"m"));
    }

    #[test]
    fn test_wrong_message_fails() {
        let kp = IdentityKeypair::generate();
        let sig = sign(&kp, b"correct message");
        assert!(!verify(&kp.public_key(), b"wrong message", &sig));
    }

    #[test]
    fn test_wrong_key_fails() {
        let kp1 = IdentityKeypair::generate();
        let kp2 = IdentityKeypair::generate();
        let sig = sign(&kp1, b"test message");
        assert!(!verify(&kp2.public_key(), b"test message", &sig));
    }

    #[test]
    fn test_verify_raw_roundtrip() {
        let kp = IdentityKeypair::generate();
        let sig = sign(&kp, b"bytes in, bool out");
        assert!(verify_raw(
            kp.public_key().as_bytes(),
            b"bytes in, bool out",
            sig.as_bytes()
        ));
    }

    #[test]
    fn test_verify_raw_malformed_inputs_are_false() {
        let kp = IdentityKeypair::generate();
        let sig = sign(&kp, b"m");

        assert!(!verify_raw(&[0u8; 31], b"m", sig.as_bytes()));
        assert!(!verify_raw(kp.public_key().as_bytes(), b"m", &[0u8; 63]));
        assert!(!verify_raw(&[], b"m", &[]));
    }

    #[test]
    fn test_tampered_signature_fails() {
        let kp = IdentityKeypair::generate();
        let mut bytes = *sign(&kp, b"m").as_bytes();
        bytes[10] ^= 0x01;
        assert!(!verify(&kp.public_key(), b"m", &Signature::from_bytes(bytes)));
    }

    #[test]
    fn test_empty_message() {
        let kp = IdentityKeypair::generate();
        let sig = sign(&kp, b"");
        assert!(verify(&kp.public_key(), b"", &sig));
    }
}
