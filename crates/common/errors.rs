use std::fmt::Display;

use ethereum_types::U256;
use ethwire_crypto::KzgError;
use ethwire_rlp::error::{CursorError, RLPEncodeError};
use thiserror::Error;

use crate::utils::unit::format_gwei;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataKind {
    Hex,
    Bytes,
}

impl Display for DataKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataKind::Hex => write!(f, "Hex"),
            DataKind::Bytes => write!(f, "Bytes"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliceBound {
    Start,
    End,
}

impl Display for SliceBound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SliceBound::Start => write!(f, "starting"),
            SliceBound::End => write!(f, "ending"),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodingError {
    #[error("Number \"{value}\" is not in safe {}integer range (0 to {max})", bit_width(.size))]
    IntegerOutOfRange {
        value: String,
        max: String,
        size: Option<usize>,
    },
    #[error("Size cannot exceed {max} bytes. Given size: {given} bytes.")]
    SizeOverflow { given: usize, max: usize },
    #[error("{kind} size ({size}) exceeds padding size ({target_size}).")]
    SizeExceedsPaddingSize {
        size: usize,
        target_size: usize,
        kind: DataKind,
    },
    #[error("Slice {bound} at offset \"{offset}\" is out-of-bounds (size: {size}).")]
    SliceOffsetOutOfBounds {
        offset: usize,
        bound: SliceBound,
        size: usize,
    },
    #[error("Invalid byte sequence (\"{sequence}\" in \"{hex}\").")]
    InvalidByteSequence { sequence: String, hex: String },
    #[error("Hex value \"{0}\" is not a valid hex string.")]
    InvalidHex(String),
}

fn bit_width(size: &Option<usize>) -> String {
    size.map(|size| format!("{}-bit unsigned ", size * 8))
        .unwrap_or_default()
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("Address \"{address}\" is invalid.")]
    InvalidAddress { address: String },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransactionError {
    #[error("Cannot infer a transaction type from provided transaction.")]
    InvalidSerializableTransaction,
    #[error("Address \"{address}\" is invalid.")]
    InvalidAddress { address: String },
    #[error("Chain ID \"{chain_id}\" is invalid.")]
    InvalidChainId { chain_id: u64 },
    #[error("Size for storage key \"{storage_key}\" is invalid. Expected 32 bytes. Got {size} bytes.")]
    InvalidStorageKeySize { storage_key: String, size: usize },
    #[error("Versioned hash \"{hash}\" size is invalid. Expected: 32. Got: {size}")]
    InvalidVersionedHashSize { hash: String, size: usize },
    #[error("Versioned hash \"{hash}\" version is invalid. Expected: {expected}. Got: {version}")]
    InvalidVersionedHashVersion {
        hash: String,
        version: u8,
        expected: u8,
    },
    #[error("Invalid `v` value \"{v}\". Expected 27 or 28.")]
    InvalidLegacyV { v: u64 },
    #[error("Blob data must not be empty.")]
    EmptyBlob,
    #[error("Blob size is too large. Max: {max_size} bytes. Given: {size} bytes.")]
    BlobSizeTooLarge { max_size: usize, size: usize },
    /// The fee is carried pre-formatted in gwei since it does not fit a `U256`.
    #[error(
        "The fee cap (`maxFeePerGas` = {max_fee_per_gas} gwei) cannot be higher than the maximum allowed value (2^256-1)."
    )]
    FeeCapTooHigh { max_fee_per_gas: String },
    #[error(
        "The provided tip (`maxPriorityFeePerGas` = {} gwei) cannot be higher than the fee cap (`maxFeePerGas` = {} gwei).",
        format_gwei(.max_priority_fee_per_gas),
        format_gwei(.max_fee_per_gas)
    )]
    TipAboveFeeCap {
        max_priority_fee_per_gas: U256,
        max_fee_per_gas: U256,
    },
    #[error("`maxFeePerGas`/`maxPriorityFeePerGas` is not a valid {tx_type} Transaction attribute.")]
    InvalidAttribute { tx_type: &'static str },
    #[error("Invalid signature: {0}")]
    InvalidSignature(String),
    #[error("A KZG backend is required to derive blob commitments and proofs.")]
    MissingKzg,
    #[error(transparent)]
    Kzg(#[from] KzgError),
    #[error(transparent)]
    Encoding(#[from] EncodingError),
    #[error(transparent)]
    RLPEncode(#[from] RLPEncodeError),
    #[error(transparent)]
    Cursor(#[from] CursorError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid codec configuration: {0}")]
    Json(#[from] serde_json::Error),
}
