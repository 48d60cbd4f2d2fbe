//! Walkthrough of the Veil privacy layer, told as a short story.
//!
//! Alice vouches for Bob without anyone but Bob learning it, Bob publishes a
//! rotating key, Alice writes to it, and Carol tries (and fails) to join in.
//!
//! Run with:
//!   cargo run --example demo --release

use std::time::Instant;

use veil_protocol::crypto::envelope;
use veil_protocol::crypto::keys::IdentityKeypair;
use veil_protocol::crypto::rotation::{
    create_ephemeral_key_proof, derive_ephemeral_key, verify_ephemeral_key_proof,
};
use veil_protocol::pow;
use veil_protocol::trust::{create_trust_signal, decrypt_trust_signal};

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";

const NOW_MS: u64 = 1_700_000_000_000;
const DAY_MS: u64 = 86_400_000;

fn step(num: u32, title: &str) {
    println!();
    println!("{BOLD}{CYAN}== Step {num}: {title} {RESET}");
}

fn ok(text: &str) {
    println!("{GREEN}  [OK] {text}{RESET}");
}

fn denied(text: &str) {
    println!("{RED}  [--] {text}{RESET}");
}

fn show(label: &str, value: &str) {
    println!("  {BOLD}{label}:{RESET} {YELLOW}{value}{RESET}");
}

fn short(hex: &str) -> String {
    format!("{}…{}", &hex[..8], &hex[hex.len() - 8..])
}

fn timed<T>(label: &str, f: impl FnOnce() -> T) -> T {
    let start = Instant::now();
    let out = f();
    println!("{DIM}  [{label}: {:.2} ms]{RESET}", start.elapsed().as_secs_f64() * 1000.0);
    out
}

fn main() {
    println!("{BOLD}Veil protocol demo{RESET}");

    step(1, "Three identities");
    let alice = IdentityKeypair::generate();
    let bob = IdentityKeypair::generate();
    let carol = IdentityKeypair::generate();
    for (name, id) in [("alice", &alice), ("bob", &bob), ("carol", &carol)] {
        show(name, &short(&id.public_key().to_hex()));
    }

    step(2, "Alice earns the right to post");
    let solution = timed("pow d=16", || pow::solve("veil:join:general", 16));
    match solution {
        Ok(s) => ok(&format!("nonce {} verifies: {}", s.nonce, s.is_valid())),
        Err(e) => denied(&e.to_string()),
    }

    step(3, "Alice vouches for Bob, in the dark");
    let signal = match timed("create", || {
        create_trust_signal(&alice, &bob.public_key(), 0.75, NOW_MS)
    }) {
        Ok(signal) => signal,
        Err(e) => {
            denied(&e.to_string());
            return;
        }
    };
    show("commitment", &short(&signal.trustee_commitment.to_hex()));
    show("weight", &signal.weight.to_string());
    if signal.verify_signature() {
        ok("anyone can see Alice signed *something*");
    }

    step(4, "Who can open it?");
    match decrypt_trust_signal(&signal, &alice.public_key(), &bob) {
        Some(opened) if opened.trustee == bob.public_key() => ok("Bob: it names me"),
        _ => denied("Bob could not open his own signal"),
    }
    match decrypt_trust_signal(&signal, &alice.public_key(), &carol) {
        Some(_) => denied("Carol opened a signal not meant for her"),
        None => ok("Carol: nothing"),
    }

    step(5, "Bob publishes today's key");
    let today = match derive_ephemeral_key(&bob.secret_key_bytes(), DAY_MS, NOW_MS) {
        Ok(key) => key,
        Err(e) => {
            denied(&e.to_string());
            return;
        }
    };
    let proof = create_ephemeral_key_proof(&today.public_key(), &bob);
    show("epoch", &today.epoch().to_string());
    show("key", &short(&today.public_key().to_hex()));
    if verify_ephemeral_key_proof(&today.public_key(), &proof, &bob.public_key()) {
        ok("proof checks out against Bob's identity");
    }

    step(6, "Alice writes to Bob's key of the day");
    let payload = match envelope::encrypt("thanks for the intro", &today.public_key()) {
        Ok(p) => p,
        Err(e) => {
            denied(&e.to_string());
            return;
        }
    };
    show("ciphertext", &format!("{} bytes", payload.ciphertext.len()));
    match envelope::decrypt(&payload, today.exchange_keypair()) {
        Ok(message) => ok(&format!("Bob reads: {message:?}")),
        Err(e) => denied(&e.to_string()),
    }
    match envelope::decrypt(&payload, &carol.exchange_keypair()) {
        Ok(_) => denied("Carol read Bob's mail"),
        Err(_) => ok("Carol: nothing"),
    }

    println!();
}
