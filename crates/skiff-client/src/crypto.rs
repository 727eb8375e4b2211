// Copyright (c) Walrus Foundation
// SPDX-License-Identifier: Apache-2.0

//! Decoding of the signer key material used to authorize uploads.

use std::fmt;

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use jsonwebtoken::EncodingKey;

use crate::error::ConfigError;

/// The length of the raw signer key, in bytes.
pub const SIGNER_KEY_LEN: usize = 32;

/// The scheme flag prepended to the raw key in the keystore encoding.
const KEYSTORE_FLAG_ED25519: u8 = 0x00;

/// The 32-byte key material authorizing uploads; loaded once at startup.
///
/// Accepted encodings, tried in fixed order: the network-native keystore form (base64 of the
/// scheme flag followed by the raw key), raw hex with an optional `0x` prefix, and raw base64.
#[derive(Clone)]
pub struct SignerKey([u8; SIGNER_KEY_LEN]);

impl SignerKey {
    /// Decodes the key from any of the supported encodings.
    pub fn decode(encoded: &str) -> Result<Self, ConfigError> {
        let encoded = encoded.trim();

        if let Ok(bytes) = BASE64.decode(encoded) {
            if bytes.len() == SIGNER_KEY_LEN + 1 && bytes[0] == KEYSTORE_FLAG_ED25519 {
                let mut key = [0u8; SIGNER_KEY_LEN];
                key.copy_from_slice(&bytes[1..]);
                return Ok(Self(key));
            }
        }

        // Remember the first decodable-but-wrongly-sized candidate for the error message.
        let mut wrong_length = None;
        let hex_encoded = encoded.strip_prefix("0x").unwrap_or(encoded);
        let candidates = [hex::decode(hex_encoded).ok(), BASE64.decode(encoded).ok()];
        for bytes in candidates.into_iter().flatten() {
            match <[u8; SIGNER_KEY_LEN]>::try_from(bytes.as_slice()) {
                Ok(key) => return Ok(Self(key)),
                Err(_) => {
                    wrong_length.get_or_insert(bytes.len());
                }
            }
        }

        Err(match wrong_length {
            Some(actual) => ConfigError::InvalidSignerKeyLength {
                actual,
                expected: SIGNER_KEY_LEN,
            },
            None => ConfigError::InvalidSignerKey,
        })
    }

    /// Returns the raw key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the JWT encoding key derived from this key material.
    pub fn encoding_key(&self) -> EncodingKey {
        EncodingKey::from_secret(&self.0)
    }
}

impl fmt::Debug for SignerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Key material never appears in logs.
        f.write_str("SignerKey(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn example_key() -> [u8; SIGNER_KEY_LEN] {
        core::array::from_fn(|i| i as u8)
    }

    #[test]
    fn all_three_encodings_decode_to_the_same_bytes() {
        let raw = example_key();

        let mut flagged = vec![KEYSTORE_FLAG_ED25519];
        flagged.extend_from_slice(&raw);
        let keystore = BASE64.encode(&flagged);
        let hex_encoded = hex::encode(raw);
        let plain_base64 = BASE64.encode(raw);

        for encoded in [keystore, hex_encoded, plain_base64] {
            let key = SignerKey::decode(&encoded).expect("supported encoding");
            assert_eq!(key.as_bytes(), raw);
        }
    }

    #[test]
    fn hex_with_0x_prefix_decodes() {
        let raw = example_key();
        let key = SignerKey::decode(&format!("0x{}", hex::encode(raw))).expect("valid hex");
        assert_eq!(key.as_bytes(), raw);
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        let raw = example_key();
        let key = SignerKey::decode(&format!("  {}\n", hex::encode(raw))).expect("valid hex");
        assert_eq!(key.as_bytes(), raw);
    }

    #[test]
    fn wrongly_sized_keys_are_rejected() {
        for len in [31, 33] {
            let error = SignerKey::decode(&hex::encode(vec![7u8; len]))
                .expect_err("wrong length must be rejected");
            let ConfigError::InvalidSignerKeyLength { actual, expected } = error else {
                panic!("expected a length error, got {error}");
            };
            assert_eq!(actual, len);
            assert_eq!(expected, SIGNER_KEY_LEN);
        }
    }

    #[test]
    fn keystore_material_with_an_unknown_flag_is_rejected() {
        let mut flagged = vec![0x01];
        flagged.extend_from_slice(&example_key());
        let error =
            SignerKey::decode(&BASE64.encode(&flagged)).expect_err("unknown flag must be rejected");
        assert!(matches!(
            error,
            ConfigError::InvalidSignerKeyLength { actual: 33, .. }
        ));
    }

    #[test]
    fn undecodable_material_is_rejected() {
        assert!(matches!(
            SignerKey::decode("definitely !!! not a key"),
            Err(ConfigError::InvalidSignerKey)
        ));
    }

    #[test]
    fn debug_output_redacts_the_key() {
        let key = SignerKey::decode(&hex::encode(example_key())).expect("valid key");
        assert_eq!(format!("{key:?}"), "SignerKey(..)");
    }
}
