//! EIP-55 / EIP-1191 checksumming and address validation.

use std::sync::{LazyLock, Mutex, MutexGuard, PoisonError};

use ethwire_crypto::keccak256;
use tracing::trace;

use crate::{
    config::CodecConfig, constants::ADDRESS_CACHE_SIZE, errors::AddressError, utils::lru::LruMap,
};

static DEFAULT_CACHE: LazyLock<AddressCache> = LazyLock::new(AddressCache::default);

/// Memoizes checksum and validity results.
///
/// Checksums are keyed by `"{address}.{chain_id}"` (an empty chain id when
/// absent) and validity by `"{address}.{strict}"`.
#[derive(Debug)]
pub struct AddressCache {
    checksums: Mutex<LruMap<String, String>>,
    validity: Mutex<LruMap<String, bool>>,
}

impl Default for AddressCache {
    fn default() -> Self {
        Self::with_capacity(ADDRESS_CACHE_SIZE)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // the maps stay consistent even if a holder panicked
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl AddressCache {
    pub fn with_capacity(size: usize) -> Self {
        Self {
            checksums: Mutex::new(LruMap::new(size)),
            validity: Mutex::new(LruMap::new(size)),
        }
    }

    pub fn from_config(config: &CodecConfig) -> Self {
        Self::with_capacity(config.address_cache_size)
    }

    /// The process-wide cache used by the free functions of this module.
    pub fn global() -> &'static AddressCache {
        &DEFAULT_CACHE
    }

    pub fn clear(&self) {
        lock(&self.checksums).clear();
        lock(&self.validity).clear();
    }

    /// Mixed-case checksum form of `address`. A non-zero `chain_id` selects
    /// the EIP-1191 variant.
    pub fn checksum_address(&self, address: &str, chain_id: Option<u64>) -> String {
        let key = format!(
            "{address}.{}",
            chain_id.map(|id| id.to_string()).unwrap_or_default()
        );
        if let Some(cached) = lock(&self.checksums).get(key.as_str()) {
            trace!(%key, "Checksum cache hit");
            return cached.clone();
        }

        let checksummed = compute_checksum(address, chain_id.filter(|id| *id != 0));
        lock(&self.checksums).insert(key, checksummed.clone());
        checksummed
    }

    /// Whether `address` is 20 bytes of `0x`-prefixed hex. With `strict`, a
    /// mixed-case address must also match its EIP-55 checksum.
    pub fn is_address(&self, address: &str, strict: bool) -> bool {
        let key = format!("{address}.{strict}");
        if let Some(cached) = lock(&self.validity).get(key.as_str()) {
            trace!(%key, "Address cache hit");
            return *cached;
        }

        let valid = if !has_address_format(address) {
            false
        } else if address.to_lowercase() == address {
            true
        } else if strict {
            self.checksum_address(address, None) == address
        } else {
            true
        };
        lock(&self.validity).insert(key, valid);
        valid
    }

    /// Checksummed form of a loosely valid address.
    pub fn get_address(&self, address: &str, chain_id: Option<u64>) -> Result<String, AddressError> {
        if !self.is_address(address, false) {
            return Err(AddressError::InvalidAddress {
                address: address.to_owned(),
            });
        }
        Ok(self.checksum_address(address, chain_id))
    }
}

fn has_address_format(address: &str) -> bool {
    address
        .strip_prefix("0x")
        .is_some_and(|digits| digits.len() == 40 && digits.bytes().all(|b| b.is_ascii_hexdigit()))
}

fn compute_checksum(address: &str, chain_id: Option<u64>) -> String {
    let lower = address.get(2..).unwrap_or_default().to_lowercase();
    let hash = match chain_id {
        Some(chain_id) => keccak256(format!("{chain_id}0x{lower}").as_bytes()),
        None => keccak256(lower.as_bytes()),
    };

    let mut out = String::with_capacity(lower.len() + 2);
    out.push_str("0x");
    for (i, digit) in lower.chars().enumerate() {
        let uppercase = hash.get(i / 2).is_some_and(|byte| {
            let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0f };
            nibble >= 8
        });
        out.push(if uppercase {
            digit.to_ascii_uppercase()
        } else {
            digit
        });
    }
    out
}

pub fn checksum_address(address: &str, chain_id: Option<u64>) -> String {
    AddressCache::global().checksum_address(address, chain_id)
}

pub fn is_address(address: &str, strict: bool) -> bool {
    AddressCache::global().is_address(address, strict)
}

pub fn get_address(address: &str, chain_id: Option<u64>) -> Result<String, AddressError> {
    AddressCache::global().get_address(address, chain_id)
}
