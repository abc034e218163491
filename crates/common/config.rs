use ethwire_rlp::{decode_with_limit, encode::RLPItem, error::RLPDecodeError};
use serde::{Deserialize, Serialize};

use crate::{
    constants::{ADDRESS_CACHE_SIZE, VERSIONED_HASH_VERSION_KZG},
    errors::ConfigError,
};

/// Tunables for the codec, deserializable from camelCase JSON. Missing
/// fields take their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CodecConfig {
    /// Capacity of each address cache.
    pub address_cache_size: usize,
    /// Maximum number of re-reads of one position while decoding RLP.
    /// `None` disables the guard.
    pub recursive_read_limit: Option<usize>,
    /// Version byte written into derived blob versioned hashes.
    pub blob_version: u8,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            address_cache_size: ADDRESS_CACHE_SIZE,
            recursive_read_limit: Some(ethwire_rlp::constants::DEFAULT_RECURSIVE_READ_LIMIT),
            blob_version: VERSIONED_HASH_VERSION_KZG,
        }
    }
}

impl CodecConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Decodes RLP under the configured recursive read limit.
    pub fn decode_rlp(&self, rlp: &[u8]) -> Result<RLPItem, RLPDecodeError> {
        decode_with_limit(rlp, self.recursive_read_limit)
    }
}

/// [`ethwire_rlp::decode`] with the limits of `config`.
pub fn decode_with_config(rlp: &[u8], config: &CodecConfig) -> Result<RLPItem, RLPDecodeError> {
    config.decode_rlp(rlp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethwire_rlp::error::CursorError;
    use hex_literal::hex;

    #[test]
    fn empty_json_yields_defaults() {
        assert_eq!(CodecConfig::from_json_str("{}").unwrap(), CodecConfig::default());
    }

    #[test]
    fn partial_json_overrides_fields() {
        let config =
            CodecConfig::from_json_str(r#"{"addressCacheSize": 16, "recursiveReadLimit": null}"#)
                .unwrap();
        assert_eq!(config.address_cache_size, 16);
        assert_eq!(config.recursive_read_limit, None);
        assert_eq!(config.blob_version, 1);
    }

    #[test]
    fn round_trips_through_json() {
        let config = CodecConfig {
            address_cache_size: 4,
            recursive_read_limit: Some(2),
            blob_version: 1,
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"recursiveReadLimit\":2"));
        assert_eq!(CodecConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(
            CodecConfig::from_json_str(r#"{"blobVersion": "one"}"#),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn decoding_honors_the_read_limit() {
        let config = CodecConfig {
            recursive_read_limit: Some(1),
            ..Default::default()
        };
        // two single-byte items in one list
        let rlp = hex!("c20102");
        assert!(matches!(
            decode_with_config(&rlp, &config),
            Err(RLPDecodeError::Cursor(CursorError::RecursiveReadLimitExceeded { .. }))
        ));
        assert!(CodecConfig::default().decode_rlp(&rlp).is_ok());
    }
}
