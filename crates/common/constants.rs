/// Largest integer a plain (unsized) number may hold when rendered as hex.
pub const MAX_SAFE_INTEGER: u64 = (1 << 53) - 1;

pub const ADDRESS_CACHE_SIZE: usize = 8192;

pub const GWEI_DECIMALS: u32 = 9;
pub const ETHER_DECIMALS: u32 = 18;

// Blobs
pub const VERSIONED_HASH_VERSION_KZG: u8 = 1;
pub const BLOBS_PER_TRANSACTION: usize = 6;
pub const BYTES_PER_FIELD_ELEMENT: usize = 32;
pub const FIELD_ELEMENTS_PER_BLOB: usize = 4096;
pub const BYTES_PER_BLOB: usize = BYTES_PER_FIELD_ELEMENT * FIELD_ELEMENTS_PER_BLOB;
/// Usable payload across all blobs of one transaction: every field element
/// loses its leading byte, and one byte is reserved for the terminator.
pub const MAX_BYTES_PER_TRANSACTION: usize =
    BYTES_PER_BLOB * BLOBS_PER_TRANSACTION - 1 - FIELD_ELEMENTS_PER_BLOB * BLOBS_PER_TRANSACTION;
