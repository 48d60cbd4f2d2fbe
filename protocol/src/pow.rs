//! # Proof-of-Work Challenges
//!
//! An admission-control puzzle: find a nonce such that
//! `SHA-256(challenge || nonce_u64_be)` starts with at least `difficulty`
//! zero bits.
//!
//! The point is the cost asymmetry. Solving takes about `2^difficulty`
//! hashes; checking takes one. A peer that wants to push something at us
//! pays for it up front, and we pay almost nothing to check the receipt.
//!
//! ## Latency
//!
//! [`solve`] is a plain CPU loop with no yield points. Its running time is
//! unbounded apart from the hard [`POW_MAX_ATTEMPTS`] ceiling, so never call
//! it on a latency-sensitive path. Interactive callers should use
//! [`solve_with_timeout`], which runs the search on tokio's blocking pool and
//! stops it via a cancellation flag when the deadline passes.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::{POW_CANCEL_CHECK_INTERVAL, POW_MAX_ATTEMPTS, POW_MAX_DIFFICULTY};
use crate::crypto::hash::hash;

/// Errors from the solver. Verification never errors.
#[derive(Debug, Error)]
pub enum PowError {
    /// The attempt ceiling was hit. At any sane difficulty this is
    /// statistically unreachable, so it means the difficulty is misconfigured.
    #[error("no solution within {attempts} attempts at difficulty {difficulty}")]
    Exhausted { attempts: u64, difficulty: u32 },

    #[error("difficulty {0} exceeds the {}-bit hash width", POW_MAX_DIFFICULTY)]
    DifficultyTooHigh(u32),

    #[error("proof-of-work search cancelled")]
    Cancelled,

    #[error("proof-of-work search timed out after {0:?}")]
    TimedOut(Duration),

    #[error("proof-of-work worker failed: {0}")]
    Worker(String),
}

/// A solved challenge. Validity is a pure function of the three fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PowSolution {
    pub challenge: String,
    pub difficulty: u32,
    pub nonce: u64,
}

impl PowSolution {
    /// Re-check this solution. One hash.
    pub fn is_valid(&self) -> bool {
        verify(&self.challenge, self.nonce, self.difficulty)
    }
}

/// Does `digest` start with at least `difficulty` zero bits?
///
/// Whole zero bytes first, then a mask over the leading bits of the next
/// byte for difficulties that are not a multiple of 8.
pub fn meets_difficulty(digest: &[u8; 32], difficulty: u32) -> bool {
    if difficulty > POW_MAX_DIFFICULTY {
        return false;
    }
    let full_bytes = (difficulty / 8) as usize;
    if digest[..full_bytes].iter().any(|b| *b != 0) {
        return false;
    }
    let partial_bits = difficulty % 8;
    if partial_bits == 0 {
        return true;
    }
    let mask = 0xFFu8 << (8 - partial_bits);
    digest[full_bytes] & mask == 0
}

/// The puzzle hash for one candidate nonce.
pub fn pow_hash(challenge: &str, nonce: u64) -> [u8; 32] {
    hash(&[challenge.into(), nonce.into()])
}

/// Check a claimed solution.
pub fn verify(challenge: &str, nonce: u64, difficulty: u32) -> bool {
    meets_difficulty(&pow_hash(challenge, nonce), difficulty)
}

/// Search nonces `0, 1, 2, …` until one satisfies `difficulty`.
///
/// # Errors
///
/// [`PowError::Exhausted`] after [`POW_MAX_ATTEMPTS`] misses, and
/// [`PowError::DifficultyTooHigh`] for difficulties no hash can meet.
///
/// # Example
///
/// ```
/// use veil_protocol::pow::{solve, verify};
///
/// let solution = solve("join:room-42", 8).unwrap();
/// assert!(verify("join:room-42", solution.nonce, 8));
/// ```
pub fn solve(challenge: &str, difficulty: u32) -> Result<PowSolution, PowError> {
    search(challenge, difficulty, POW_MAX_ATTEMPTS, None)
}

/// Like [`solve`], but gives up with [`PowError::Cancelled`] soon after
/// `cancel` is set.
pub fn solve_cancellable(
    challenge: &str,
    difficulty: u32,
    cancel: &AtomicBool,
) -> Result<PowSolution, PowError> {
    search(challenge, difficulty, POW_MAX_ATTEMPTS, Some(cancel))
}

/// Run the search on a blocking worker thread with a deadline.
///
/// On timeout the worker is told to stop and this returns
/// [`PowError::TimedOut`] straight away; the worker exits at its next
/// cancellation check.
pub async fn solve_with_timeout(
    challenge: String,
    difficulty: u32,
    timeout: Duration,
) -> Result<PowSolution, PowError> {
    let cancel = Arc::new(AtomicBool::new(false));
    let worker_flag = Arc::clone(&cancel);
    let worker =
        tokio::task::spawn_blocking(move || solve_cancellable(&challenge, difficulty, &worker_flag));

    match tokio::time::timeout(timeout, worker).await {
        Ok(joined) => joined.map_err(|e| PowError::Worker(e.to_string()))?,
        Err(_) => {
            cancel.store(true, Ordering::Relaxed);
            warn!(difficulty, ?timeout, "proof-of-work search timed out");
            Err(PowError::TimedOut(timeout))
        }
    }
}

fn search(
    challenge: &str,
    difficulty: u32,
    max_attempts: u64,
    cancel: Option<&AtomicBool>,
) -> Result<PowSolution, PowError> {
    if difficulty > POW_MAX_DIFFICULTY {
        return Err(PowError::DifficultyTooHigh(difficulty));
    }
    debug!(difficulty, "proof-of-work search started");

    for nonce in 0..max_attempts {
        if let Some(flag) = cancel {
            if nonce % POW_CANCEL_CHECK_INTERVAL == 0 && flag.load(Ordering::Relaxed) {
                return Err(PowError::Cancelled);
            }
        }
        if verify(challenge, nonce, difficulty) {
            debug!(difficulty, nonce, "proof-of-work solved");
            return Ok(PowSolution {
                challenge: challenge.to_owned(),
                difficulty,
                nonce,
            });
        }
    }

    warn!(difficulty, attempts = max_attempts, "proof-of-work attempt cap reached");
    Err(PowError::Exhausted {
        attempts: max_attempts,
        difficulty,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meets_difficulty_bit_boundaries() {
        let mut digest = [0xFFu8; 32];
        assert!(meets_difficulty(&digest, 0));
        assert!(!meets_difficulty(&digest, 1));

        digest[0] = 0x00;
        digest[1] = 0x0F; // 8 + 4 leading zero bits
        assert!(meets_difficulty(&digest, 8));
        assert!(meets_difficulty(&digest, 12));
        assert!(!meets_difficulty(&digest, 13));

        digest[1] = 0x10; // 8 + 3
        assert!(meets_difficulty(&digest, 11));
        assert!(!meets_difficulty(&digest, 12));
    }

    #[test]
    fn test_all_zero_digest_meets_everything() {
        let digest = [0u8; 32];
        assert!(meets_difficulty(&digest, 256));
        assert!(!meets_difficulty(&digest, 257));
    }

    #[test]
    fn test_pow_hash_layout() {
        // challenge bytes, then the nonce as 8 big-endian bytes.
        let mut manual = b"abc".to_vec();
        manual.extend_from_slice(&5u64.to_be_bytes());
        assert_eq!(pow_hash("abc", 5), crate::crypto::hash::sha256(&manual));
    }

    #[test]
    fn test_solve_then_verify() {
        for difficulty in [4, 8, 12, 16] {
            let solution = solve("veil-test-challenge", difficulty).unwrap();
            assert!(verify("veil-test-challenge", solution.nonce, difficulty));
            assert!(solution.is_valid());
        }
    }

    #[test]
    fn test_solver_returns_first_nonce() {
        let solution = solve("first", 8).unwrap();
        for earlier in 0..solution.nonce {
            assert!(!verify("first", earlier, 8));
        }
    }

    #[test]
    fn test_neighbour_nonce_and_other_challenge_fail() {
        let solution = solve("neighbour", 16).unwrap();
        assert!(!verify("neighbour", solution.nonce + 1, 16));
        assert!(!verify("someone-else", solution.nonce, 16));
    }

    #[test]
    fn test_zero_difficulty_is_trivial() {
        assert_eq!(solve("anything", 0).unwrap().nonce, 0);
    }

    #[test]
    fn test_cap_exhaustion_is_an_error() {
        let err = search("never", 64, 100, None).unwrap_err();
        assert!(matches!(err, PowError::Exhausted { attempts: 100, difficulty: 64 }));
    }

    #[test]
    fn test_impossible_difficulty_rejected_up_front() {
        assert!(matches!(solve("x", 300), Err(PowError::DifficultyTooHigh(300))));
    }

    #[test]
    fn test_cancel_flag_stops_search() {
        let cancel = AtomicBool::new(true);
        assert!(matches!(
            solve_cancellable("x", 64, &cancel),
            Err(PowError::Cancelled)
        ));
    }

    #[test]
    fn test_solution_serializes_camel_case() {
        let solution = PowSolution {
            challenge: "c".into(),
            difficulty: 4,
            nonce: 9,
        };
        let json = serde_json::to_string(&solution).unwrap();
        assert_eq!(json, r#"{"challenge":"c","difficulty":4,"nonce":9}"#);
    }

    #[tokio::test]
    async fn test_solve_with_timeout_succeeds_when_easy() {
        let solution = solve_with_timeout("easy".into(), 8, Duration::from_secs(30))
            .await
            .unwrap();
        assert!(solution.is_valid());
    }

    #[tokio::test]
    async fn test_solve_with_timeout_gives_up() {
        let result = solve_with_timeout("hard".into(), 128, Duration::from_millis(20)).await;
        assert!(matches!(result, Err(PowError::TimedOut(_))));
    }
}
