// Copyright (c) 2026 Veil Contributors. MIT License.
// See LICENSE for details.

//! # Veil CLI
//!
//! Entry point for the `veil` binary. Parses arguments, initializes logging,
//! and runs one protocol operation, printing its result as JSON on stdout.
//!
//! - `keygen`    — new identity
//! - `ephemeral` — epoch key and ownership proof
//! - `encrypt` / `decrypt` — envelope encryption between identities
//! - `trust`     — create, open and verify encrypted trust signals
//! - `pow`       — solve and verify proof-of-work challenges
//! - `version`   — build version information

mod cli;
mod logging;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::{json, Value};
use std::time::Duration;

use veil_protocol::crypto::envelope::{self, EncryptedPayload};
use veil_protocol::crypto::rotation::{
    create_ephemeral_key_proof, derive_ephemeral_key, now_millis,
};
use veil_protocol::crypto::{IdentityKeypair, IdentityPublicKey};
use veil_protocol::pow;
use veil_protocol::trust::{
    create_trust_signal, decrypt_trust_signal, verify_encrypted_trust_signature, TrustSignal,
};

use cli::{Commands, PowCommands, TrustCommands, VeilCli};
use logging::LogFormat;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = VeilCli::parse();
    logging::init_logging(
        logging::DEFAULT_DIRECTIVE,
        LogFormat::from_str_lossy(&cli.log_format),
    );

    let output = match cli.command {
        Commands::Keygen => keygen(),
        Commands::Ephemeral(args) => ephemeral(args)?,
        Commands::Encrypt(args) => encrypt(args)?,
        Commands::Decrypt(args) => decrypt(args)?,
        Commands::Trust { command } => match command {
            TrustCommands::Create(args) => trust_create(args)?,
            TrustCommands::Open(args) => trust_open(args)?,
            TrustCommands::Verify(args) => trust_verify(args)?,
        },
        Commands::Pow { command } => match command {
            PowCommands::Solve(args) => pow_solve(args).await?,
            PowCommands::Verify(args) => json!({
                "valid": pow::verify(&args.challenge, args.nonce, args.difficulty)
            }),
        },
        Commands::Version => version(),
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn keygen() -> Value {
    let identity = IdentityKeypair::generate();
    let public = identity.public_key();
    tracing::info!(public_key = %public, "identity generated");

    json!({
        "secretKey": identity.secret_key_hex(),
        "publicKey": public.to_hex(),
        "x25519PublicKey": identity.exchange_keypair().public_key().to_hex(),
    })
}

fn ephemeral(args: cli::EphemeralArgs) -> Result<Value> {
    let identity = load_identity(&args.key)?;
    let at = args.at.unwrap_or_else(now_millis);

    let ephemeral = derive_ephemeral_key(&identity.secret_key_bytes(), args.period_ms, at)
        .context("failed to derive ephemeral key")?;
    let proof = create_ephemeral_key_proof(&ephemeral.public_key(), &identity);

    Ok(json!({
        "epoch": ephemeral.epoch(),
        "validFrom": ephemeral.valid_from_ms(),
        "validUntil": ephemeral.valid_until_ms(),
        "publicKey": ephemeral.public_key().to_hex(),
        "proof": proof.to_hex(),
        "identity": identity.public_key().to_hex(),
    }))
}

fn encrypt(args: cli::EncryptArgs) -> Result<Value> {
    let recipient = IdentityPublicKey::from_hex(&args.to).context("invalid recipient key")?;
    let payload = envelope::encrypt_for_identity(&args.message, &recipient)
        .context("encryption failed")?;
    Ok(serde_json::to_value(payload)?)
}

fn decrypt(args: cli::DecryptArgs) -> Result<Value> {
    let identity = load_identity(&args.key)?;
    let payload: EncryptedPayload =
        serde_json::from_str(&read_json_arg(&args.payload)?).context("malformed payload JSON")?;
    let message = envelope::decrypt_as_identity(&payload, &identity)
        .context("payload could not be decrypted with this key")?;
    Ok(json!({ "message": message }))
}

fn trust_create(args: cli::TrustCreateArgs) -> Result<Value> {
    let identity = load_identity(&args.key)?;
    let trustee = IdentityPublicKey::from_hex(&args.trustee).context("invalid trustee key")?;
    let timestamp = args.timestamp.unwrap_or_else(now_millis);

    let signal = create_trust_signal(&identity, &trustee, args.weight, timestamp)
        .context("failed to create trust signal")?;
    Ok(serde_json::to_value(signal)?)
}

fn trust_open(args: cli::TrustOpenArgs) -> Result<Value> {
    let identity = load_identity(&args.key)?;
    let truster = IdentityPublicKey::from_hex(&args.truster).context("invalid truster key")?;
    let signal = load_signal(&args.signal)?;

    Ok(match decrypt_trust_signal(&signal, &truster, &identity) {
        Some(opened) => json!({
            "trustee": opened.trustee.to_hex(),
            "nonce": hex::encode(opened.nonce),
        }),
        None => Value::Null,
    })
}

fn trust_verify(args: cli::TrustVerifyArgs) -> Result<Value> {
    let signal = load_signal(&args.signal)?;
    let truster = match args.truster {
        Some(hex_key) => IdentityPublicKey::from_hex(&hex_key).context("invalid truster key")?,
        None => signal.truster,
    };

    let valid = verify_encrypted_trust_signature(
        &signal.trustee_commitment,
        &truster,
        &signal.signature,
        signal.weight,
        signal.timestamp,
    );
    Ok(json!({ "valid": valid }))
}

async fn pow_solve(args: cli::PowSolveArgs) -> Result<Value> {
    let timeout = Duration::from_secs(args.timeout_secs);
    tracing::info!(difficulty = args.difficulty, ?timeout, "solving proof-of-work");

    let solution = pow::solve_with_timeout(args.challenge, args.difficulty, timeout)
        .await
        .context("proof-of-work search failed")?;
    Ok(serde_json::to_value(solution)?)
}

fn version() -> Value {
    json!({
        "veil": env!("CARGO_PKG_VERSION"),
        "protocol": veil_protocol::config::PROTOCOL_VERSION,
    })
}

fn load_identity(key: &cli::KeyArg) -> Result<IdentityKeypair> {
    IdentityKeypair::from_hex(key.key.trim()).context("invalid secret key (expected 64 hex characters)")
}

fn load_signal(arg: &str) -> Result<TrustSignal> {
    TrustSignal::from_json(&read_json_arg(arg)?).context("malformed trust signal JSON")
}

/// Inline JSON, or `@path` to read it from a file.
fn read_json_arg(arg: &str) -> Result<String> {
    match arg.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path)),
        None => Ok(arg.to_owned()),
    }
}
