// Copyright (c) 2026 Veil Contributors. MIT License.
// See LICENSE for details.

//! # Veil Protocol
//!
//! The identity and privacy layer of the Veil peer-to-peer social network.
//!
//! A Veil identity is a single Ed25519 key. From it the protocol derives
//! everything else a peer needs to talk privately:
//!
//! - **crypto** — Hashing, canonical JSON, HKDF, Ed25519 signing, the
//!   Ed25519→X25519 conversion, rotating ephemeral keys with ownership
//!   proofs, and ECDH envelope encryption.
//! - **pow** — Proof-of-work puzzles for admission control.
//! - **trust** — The dark social graph: signed trust edges whose target only
//!   the target can read.
//! - **config** — Protocol constants and domain-separation strings.
//!
//! Every byte layout and domain string in this crate is part of the wire
//! protocol. Changing one breaks interop with every other implementation.

pub mod config;
pub mod crypto;
pub mod pow;
pub mod trust;
