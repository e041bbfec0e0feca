//! Repeating-key XOR
//!
//! Scripts emit `XOR-ENCRYPTED:` followed by base64 of `hex[:hint]`,
//! where the hint is the first two characters of the key. Bare hex is
//! accepted too.

use crate::error::{DecryptError, DecryptResult};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

/// Prefix of the XOR envelope
pub const XOR_PREFIX: &str = "XOR-ENCRYPTED:";

/// Key characters carried as a hint
pub const HINT_CHARS: usize = 2;

/// XOR `data` with `key` repeated; an empty key leaves data unchanged
#[must_use]
pub fn xor_bytes(data: &[u8], key: &[u8]) -> Vec<u8> {
    if key.is_empty() {
        return data.to_vec();
    }
    data.iter().zip(key.iter().cycle()).map(|(b, k)| b ^ k).collect()
}

/// Encrypt `plaintext` into the envelope scripts produce
#[must_use]
pub fn encrypt_xor(plaintext: &str, key: &str) -> String {
    let hex_data = hex::encode(xor_bytes(plaintext.as_bytes(), key.as_bytes()));
    let hint: String = key.chars().take(HINT_CHARS).collect();
    format!("{XOR_PREFIX}{}", STANDARD.encode(format!("{hex_data}:{hint}")))
}

/// Decrypt an envelope or bare hex
///
/// # Errors
/// Returns error for an empty key, malformed envelope or hex, or output
/// that is not UTF-8
pub fn decrypt_xor(data: &str, key: &str) -> DecryptResult<String> {
    if key.is_empty() {
        return Err(DecryptError::EmptyKey);
    }
    let data = data.trim();
    let hex_data = match data.strip_prefix(XOR_PREFIX) {
        Some(rest) => {
            let encoded = rest.split(':').next().unwrap_or_default().trim();
            if encoded.is_empty() {
                return Err(DecryptError::InvalidXor("empty payload".to_string()));
            }
            let decoded = STANDARD.decode(encoded)?;
            let decoded = String::from_utf8(decoded)
                .map_err(|_| DecryptError::InvalidXor("payload is not text".to_string()))?;
            match decoded.split_once(':') {
                Some((hex_data, hint)) => {
                    tracing::debug!(hex_len = hex_data.len(), hint = %hint, "parsed XOR envelope");
                    hex_data.to_string()
                }
                None => decoded,
            }
        }
        None => data.to_string(),
    };

    let bytes = hex::decode(hex_data.trim())?;
    String::from_utf8(xor_bytes(&bytes, key.as_bytes())).map_err(|_| DecryptError::NotUtf8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn decrypts_script_envelope() {
        assert_eq!(decrypt_xor("XOR-ENCRYPTED:MTgwMDFhNDMwZTExNTk1NTBhMTExODprZQ==", "key1").unwrap(), "secret data");
        assert_eq!(decrypt_xor("XOR-ENCRYPTED:MDMwMjpr\n", "k").unwrap(), "hi");
    }

    #[test]
    fn decrypts_bare_hex() {
        assert_eq!(decrypt_xor("18001a430e1159550a1118", "key1").unwrap(), "secret data");
    }

    #[test]
    fn envelope_matches_script_output() {
        assert_eq!(encrypt_xor("hi", "k"), "XOR-ENCRYPTED:MDMwMjpr");
    }

    #[test]
    fn rejects_bad_input() {
        assert!(matches!(decrypt_xor("0302", ""), Err(DecryptError::EmptyKey)));
        assert!(matches!(decrypt_xor("zz", "k"), Err(DecryptError::InvalidHex(_))));
        assert!(matches!(decrypt_xor("XOR-ENCRYPTED:", "k"), Err(DecryptError::InvalidXor(_))));
        assert!(matches!(decrypt_xor("XOR-ENCRYPTED:***", "k"), Err(DecryptError::InvalidBase64(_))));
        // 0xff ^ 'k' is not valid UTF-8 on its own
        assert!(matches!(decrypt_xor("ff", "k"), Err(DecryptError::NotUtf8)));
    }

    proptest! {
        #[test]
        fn xor_is_an_involution(data in proptest::collection::vec(any::<u8>(), 0..64), key in proptest::collection::vec(any::<u8>(), 1..16)) {
            prop_assert_eq!(xor_bytes(&xor_bytes(&data, &key), &key), data);
        }

        #[test]
        fn envelope_decrypts_with_same_key(text in "\\PC{0,40}", key in "[a-zA-Z0-9]{1,12}") {
            prop_assert_eq!(decrypt_xor(&encrypt_xor(&text, &key), &key).unwrap(), text);
        }
    }
}
