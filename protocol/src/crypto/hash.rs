//! # Hashing & Canonicalization
//!
//! SHA-256 is the only hash function in Veil. Everything that is committed
//! to, proof-of-worked over, or fingerprinted goes through here.
//!
//! ## Mixed-input hashing
//!
//! [`hash`] digests a sequence of typed inputs fed back to back into one
//! SHA-256 state:
//!
//! | Input                | Encoding                     |
//! |----------------------|------------------------------|
//! | `HashInput::Str`     | UTF-8 bytes                  |
//! | `HashInput::U64`     | 8 bytes, big-endian          |
//! | `HashInput::Bytes`   | passed through unchanged     |
//!
//! There are no length prefixes or separators. Order is significant and the
//! producer and verifier must agree on it; every call site in this crate
//! uses a fixed layout.
//!
//! ## Canonical JSON
//!
//! [`stable_stringify`] renders a JSON value with object keys sorted at every
//! level, so two structurally equal objects built in different insertion
//! orders produce the same bytes. [`hash_object`] hashes that rendering and
//! is what you want whenever a signature has to cover a structured payload.

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

/// One element of a [`hash`] input sequence.
///
/// Build these with `.into()` from `&str`, `u64` or byte slices rather than
/// naming the variants, e.g. `hash(&["challenge".into(), 42u64.into()])`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashInput<'a> {
    /// UTF-8 text.
    Str(&'a str),
    /// An unsigned integer, hashed as 8 big-endian bytes.
    U64(u64),
    /// Raw bytes.
    Bytes(&'a [u8]),
}

impl<'a> From<&'a str> for HashInput<'a> {
    fn from(s: &'a str) -> Self {
        HashInput::Str(s)
    }
}

impl<'a> From<&'a String> for HashInput<'a> {
    fn from(s: &'a String) -> Self {
        HashInput::Str(s.as_str())
    }
}

impl From<u64> for HashInput<'_> {
    fn from(n: u64) -> Self {
        HashInput::U64(n)
    }
}

impl<'a> From<&'a [u8]> for HashInput<'a> {
    fn from(b: &'a [u8]) -> Self {
        HashInput::Bytes(b)
    }
}

impl<'a, const N: usize> From<&'a [u8; N]> for HashInput<'a> {
    fn from(b: &'a [u8; N]) -> Self {
        HashInput::Bytes(b.as_slice())
    }
}

impl<'a> From<&'a Vec<u8>> for HashInput<'a> {
    fn from(b: &'a Vec<u8>) -> Self {
        HashInput::Bytes(b.as_slice())
    }
}

/// SHA-256 over the concatenated encodings of `inputs`.
///
/// # Example
///
/// ```
/// use veil_protocol::crypto::hash::{hash, sha256};
///
/// let mut manual = b"abc".to_vec();
/// manual.extend_from_slice(&7u64.to_be_bytes());
/// assert_eq!(hash(&["abc".into(), 7u64.into()]), sha256(&manual));
/// ```
pub fn hash(inputs: &[HashInput<'_>]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for input in inputs {
        match input {
            HashInput::Str(s) => hasher.update(s.as_bytes()),
            HashInput::U64(n) => hasher.update(n.to_be_bytes()),
            HashInput::Bytes(b) => hasher.update(b),
        }
    }
    hasher.finalize().into()
}

/// Plain SHA-256 of a single byte string.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// Hex-encoded SHA-256 of a single byte string.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(sha256(data))
}

/// Serialize a JSON value with object keys sorted lexicographically at every
/// nesting level. Arrays keep their order. Output is compact (no whitespace).
///
/// Keys are ordered by UTF-16 code units, which is how JavaScript's default
/// sort compares strings. For keys inside the Basic Multilingual Plane this is
/// identical to plain byte order.
///
/// Floats with an integral value are written without a fractional part
/// (`1.0` as `1`, `-0.0` as `0`), matching `JSON.stringify`. Magnitudes of
/// `1e21` and above keep serde_json's exponent form, which differs from
/// JavaScript's `1e+21`; keep such values out of hashed payloads.
pub fn stable_stringify(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|(a, _), (b, _)| a.encode_utf16().cmp(b.encode_utf16()));

            out.push('{');
            for (i, (key, child)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                // A `Value::String` renders as a quoted, escaped JSON string.
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(child, out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        Value::Number(n) => match n.as_f64().filter(|_| n.is_f64()) {
            Some(f) => write_float(f, n, out),
            None => out.push_str(&n.to_string()),
        },
        scalar => out.push_str(&scalar.to_string()),
    }
}

/// Integral floats below `1e21` print as integers. Rust's `Display` for
/// `f64` already gives the shortest round-trip digits without an exponent.
fn write_float(f: f64, n: &serde_json::Number, out: &mut String) {
    if f == 0.0 {
        out.push('0');
    } else if f.fract() == 0.0 && f.abs() < 1e21 {
        out.push_str(&f.to_string());
    } else {
        out.push_str(&n.to_string());
    }
}

/// Hex-encoded SHA-256 of the canonical JSON rendering of `value`.
///
/// Fails only if `value` cannot be represented as JSON at all (e.g. a map
/// with non-string keys).
pub fn hash_object<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    let json = serde_json::to_value(value)?;
    Ok(sha256_hex(stable_stringify(&json).as_bytes()))
}
