//! Cryptographic utilities for the ledger
//!
//! This module provides:
//! - SHA-256 hashing
//! - ECDSA key management (secp256k1)
//! - Account identifier derivation
//! - Merkle root calculation

pub mod address;
pub mod hash;
pub mod keys;
pub mod merkle;

pub use address::{address_from_key_bytes, derive_address, is_valid_address, ADDRESS_PAYLOAD_LEN};
pub use hash::{double_sha256, double_sha256_hex, sha256, sha256_hex};
pub use keys::{public_key_from_hex, sign_message, verify_signature, KeyError, KeyPair};
pub use merkle::{calculate_merkle_root, calculate_merkle_root_hex};
