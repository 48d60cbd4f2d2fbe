//! Canonical rendering of trust weights.
//!
//! The weight is signed as text, not as a float. Two implementations that
//! agree on the value `0.3` may still disagree on whether it prints as
//! `0.3`, `0.30` or `0.29999999999999999`, and any such difference silently
//! breaks signature verification between them. So the signed form is always
//! exactly two decimals, rounded half-up on the exact binary value of the
//! float (the rule `Number.prototype.toFixed(2)` follows). Rust's own
//! `{:.2}` rounds ties to even, which disagrees on values like `0.125`.

use crate::config::{MAX_TRUST_WEIGHT, TRUST_WEIGHT_DECIMALS};

/// Digits of the exact decimal expansion we look at. Far more than a double
/// in `(0, 1]` can make ambiguous at the third decimal place.
const EXPANSION_DIGITS: usize = 40;

/// Is `weight` a legal trust weight, i.e. finite and in `(0, 1]`?
pub fn is_valid_weight(weight: f64) -> bool {
    weight.is_finite() && weight > 0.0 && weight <= MAX_TRUST_WEIGHT
}

/// Two-decimal canonical form of a valid weight. `None` for anything
/// [`is_valid_weight`] rejects.
///
/// ```
/// use veil_protocol::trust::canonical_weight;
///
/// assert_eq!(canonical_weight(0.75).as_deref(), Some("0.75"));
/// assert_eq!(canonical_weight(0.1 + 0.2).as_deref(), Some("0.30"));
/// assert_eq!(canonical_weight(0.125).as_deref(), Some("0.13"));
/// assert_eq!(canonical_weight(1.0).as_deref(), Some("1.00"));
/// assert_eq!(canonical_weight(1.5), None);
/// ```
pub fn canonical_weight(weight: f64) -> Option<String> {
    if !is_valid_weight(weight) {
        return None;
    }

    let expanded = format!("{:.*}", EXPANSION_DIGITS, weight);
    let (int_part, frac_part) = expanded.split_once('.')?;
    let whole: u64 = int_part.parse().ok()?;

    let digits: Vec<u64> = frac_part
        .bytes()
        .take(TRUST_WEIGHT_DECIMALS + 1)
        .map(|b| u64::from(b - b'0'))
        .collect();
    if digits.len() != TRUST_WEIGHT_DECIMALS + 1 {
        return None;
    }

    let mut hundredths = whole * 100 + digits[0] * 10 + digits[1];
    if digits[2] >= 5 {
        hundredths += 1;
    }

    Some(format!("{}.{:02}", hundredths / 100, hundredths % 100))
}
