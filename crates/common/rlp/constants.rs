pub const RLP_NULL: u8 = 0x80;
pub const RLP_EMPTY_LIST: u8 = 0xc0;

/// Longest payload that still fits in the prefix byte itself.
pub const SHORT_PAYLOAD_MAX_LEN: usize = 55;

pub const LONG_STRING_OFFSET: u8 = 0xb7;
pub const LONG_LIST_OFFSET: u8 = 0xf7;

/// The length of a payload may be written with at most this many bytes.
pub const MAX_LENGTH_OF_LENGTH: usize = 4;

pub const DEFAULT_RECURSIVE_READ_LIMIT: usize = 8192;

/// Deepest list nesting accepted by the decoder.
pub const MAX_DECODE_DEPTH: usize = 1024;
