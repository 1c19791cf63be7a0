//! Merkle root over transaction identities
//!
//! Binds a block header to the exact ordered list of transactions it carries.

use super::hash::sha256;

/// Calculate the merkle root from a list of transaction hashes
pub fn calculate_merkle_root(hashes: &[Vec<u8>]) -> Vec<u8> {
    if hashes.is_empty() {
        return sha256(b"");
    }

    if hashes.len() == 1 {
        return hashes[0].clone();
    }

    let mut current_level: Vec<Vec<u8>> = hashes.to_vec();

    while current_level.len() > 1 {
        let mut next_level = Vec::with_capacity(current_level.len().div_ceil(2));

        for chunk in current_level.chunks(2) {
            // Odd levels pair the last hash with itself
            let right = chunk.get(1).unwrap_or(&chunk[0]);
            let mut data = chunk[0].clone();
            data.extend_from_slice(right);
            next_level.push(sha256(&data));
        }

        current_level = next_level;
    }

    current_level.remove(0)
}

/// Calculate merkle root from hex-encoded hashes.
///
/// Entries that are not valid hex are hashed as text so that a malformed id
/// still changes the root instead of silently disappearing.
pub fn calculate_merkle_root_hex(hex_hashes: &[String]) -> String {
    let hashes: Vec<Vec<u8>> = hex_hashes
        .iter()
        .map(|h| hex::decode(h).unwrap_or_else(|_| sha256(h.as_bytes())))
        .collect();
    hex::encode(calculate_merkle_root(&hashes))
}
