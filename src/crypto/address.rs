//! Account identifiers
//!
//! An account identifier is `ticker || base58(sha256(pubkey)[..20])`, using
//! the Bitcoin base-58 alphabet. The compressed SEC1 encoding of the key is
//! what gets hashed.

use secp256k1::PublicKey;

use super::hash::sha256;

/// Number of digest bytes kept in the identifier payload
pub const ADDRESS_PAYLOAD_LEN: usize = 20;

/// Derive the account identifier for a verification key
pub fn derive_address(ticker: &str, public_key: &PublicKey) -> String {
    address_from_key_bytes(ticker, &public_key.serialize())
}

/// Derive an identifier from raw serialized key bytes
pub fn address_from_key_bytes(ticker: &str, key_bytes: &[u8]) -> String {
    let digest = sha256(key_bytes);
    let payload = &digest[..ADDRESS_PAYLOAD_LEN];
    format!("{}{}", ticker, bs58::encode(payload).into_string())
}

/// Cheap syntactic check: right prefix and a base-58 payload of the right size.
pub fn is_valid_address(ticker: &str, address: &str) -> bool {
    match address.strip_prefix(ticker) {
        Some(payload) => bs58::decode(payload)
            .into_vec()
            .map(|bytes| bytes.len() == ADDRESS_PAYLOAD_LEN)
            .unwrap_or(false),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::KeyPair;
    use secp256k1::SecretKey;

    fn fixed_key(byte: u8) -> KeyPair {
        KeyPair::from_secret_key(SecretKey::from_slice(&[byte; 32]).unwrap())
    }

    #[test]
    fn test_address_is_deterministic() {
        let kp = fixed_key(7);
        assert_eq!(derive_address("BFC", &kp.public_key), kp.address("BFC"));
        assert_eq!(kp.address("BFC"), fixed_key(7).address("BFC"));
    }

    #[test]
    fn test_distinct_keys_distinct_addresses() {
        assert_ne!(fixed_key(1).address("BFC"), fixed_key(2).address("BFC"));
    }

    #[test]
    fn test_address_matches_manual_encoding() {
        let kp = fixed_key(3);
        let digest = sha256(&kp.public_key.serialize());
        let expected = format!("BFC{}", bs58::encode(&digest[..20]).into_string());
        assert_eq!(kp.address("BFC"), expected);
    }

    #[test]
    fn test_address_validation() {
        let addr = fixed_key(9).address("BFC");
        assert!(is_valid_address("BFC", &addr));
        assert!(!is_valid_address("XYZ", &addr));
        assert!(!is_valid_address("BFC", "BFC0OIl"));
        assert!(!is_valid_address("BFC", "BFC2g"));
    }
}
