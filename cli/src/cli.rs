//! # CLI Interface
//!
//! Argument structure for the `veil` binary, via `clap` derive.

use clap::{Args, Parser, Subcommand};

use veil_protocol::config::DEFAULT_ROTATION_PERIOD_MS;

/// Veil identity and privacy toolkit.
///
/// Generates identities, derives rotating ephemeral keys, encrypts to peers,
/// issues and checks encrypted trust signals, and solves proof-of-work
/// challenges. Every command prints JSON to stdout.
#[derive(Parser, Debug)]
#[command(
    name = "veil",
    about = "Veil identity and privacy toolkit",
    version,
    propagate_version = true
)]
pub struct VeilCli {
    /// Log output format: "pretty" or "json". Logs go to stderr.
    #[arg(long, global = true, env = "VEIL_LOG_FORMAT", default_value = "pretty")]
    pub log_format: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a fresh identity.
    Keygen,
    /// Derive the ephemeral X25519 key for an epoch, with its ownership proof.
    Ephemeral(EphemeralArgs),
    /// Encrypt a message to an identity's public key.
    Encrypt(EncryptArgs),
    /// Decrypt a payload addressed to your identity.
    Decrypt(DecryptArgs),
    /// Encrypted trust signals.
    Trust {
        #[command(subcommand)]
        command: TrustCommands,
    },
    /// Proof-of-work challenges.
    Pow {
        #[command(subcommand)]
        command: PowCommands,
    },
    /// Print version information and exit.
    Version,
}

#[derive(Subcommand, Debug)]
pub enum TrustCommands {
    /// Sign a trust edge toward a trustee. Prints the submission JSON.
    Create(TrustCreateArgs),
    /// Open a signal addressed to you. Prints `{trustee, nonce}` or `null`.
    Open(TrustOpenArgs),
    /// Check the truster's signature without learning the trustee.
    Verify(TrustVerifyArgs),
}

#[derive(Subcommand, Debug)]
pub enum PowCommands {
    /// Search for a nonce meeting the difficulty.
    Solve(PowSolveArgs),
    /// Check a claimed nonce.
    Verify(PowVerifyArgs),
}

/// Hex-encoded Ed25519 secret seed.
///
/// Prefer the environment variable over the flag so the key stays out of
/// shell history.
#[derive(Args, Debug)]
pub struct KeyArg {
    #[arg(long = "key", short = 'k', env = "VEIL_KEY", hide_env_values = true)]
    pub key: String,
}

#[derive(Args, Debug)]
pub struct EphemeralArgs {
    #[command(flatten)]
    pub key: KeyArg,

    /// Rotation period in milliseconds.
    #[arg(long, env = "VEIL_ROTATION_PERIOD_MS", default_value_t = DEFAULT_ROTATION_PERIOD_MS)]
    pub period_ms: u64,

    /// Timestamp (ms since the Unix epoch) to derive for. Defaults to now.
    #[arg(long)]
    pub at: Option<u64>,
}

#[derive(Args, Debug)]
pub struct EncryptArgs {
    /// Recipient's Ed25519 public key, hex.
    #[arg(long)]
    pub to: String,

    /// UTF-8 message to encrypt.
    #[arg(long, short = 'm')]
    pub message: String,
}

#[derive(Args, Debug)]
pub struct DecryptArgs {
    #[command(flatten)]
    pub key: KeyArg,

    /// Encrypted payload JSON, or `@path` to read it from a file.
    #[arg(long)]
    pub payload: String,
}

#[derive(Args, Debug)]
pub struct TrustCreateArgs {
    #[command(flatten)]
    pub key: KeyArg,

    /// Trustee's Ed25519 public key, hex.
    #[arg(long)]
    pub trustee: String,

    /// Trust weight in (0, 1].
    #[arg(long, short = 'w')]
    pub weight: f64,

    /// Timestamp (ms since the Unix epoch). Defaults to now.
    #[arg(long)]
    pub timestamp: Option<u64>,
}

#[derive(Args, Debug)]
pub struct TrustOpenArgs {
    #[command(flatten)]
    pub key: KeyArg,

    /// Truster's Ed25519 public key, hex. Must match the one that signed.
    #[arg(long)]
    pub truster: String,

    /// Trust signal JSON, or `@path` to read it from a file.
    #[arg(long)]
    pub signal: String,
}

#[derive(Args, Debug)]
pub struct TrustVerifyArgs {
    /// Truster's Ed25519 public key, hex. Defaults to the signal's own
    /// `truster` field.
    #[arg(long)]
    pub truster: Option<String>,

    /// Trust signal JSON, or `@path` to read it from a file.
    #[arg(long)]
    pub signal: String,
}

#[derive(Args, Debug)]
pub struct PowSolveArgs {
    #[arg(long, short = 'c')]
    pub challenge: String,

    /// Required leading zero bits.
    #[arg(long, short = 'd')]
    pub difficulty: u32,

    /// Give up after this many seconds.
    #[arg(long, env = "VEIL_POW_TIMEOUT_SECS", default_value_t = 60)]
    pub timeout_secs: u64,
}

#[derive(Args, Debug)]
pub struct PowVerifyArgs {
    #[arg(long, short = 'c')]
    pub challenge: String,

    #[arg(long, short = 'n')]
    pub nonce: u64,

    #[arg(long, short = 'd')]
    pub difficulty: u32,
}
