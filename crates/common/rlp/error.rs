use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CursorError {
    #[error("Offset `{offset}` cannot be negative.")]
    NegativeOffset { offset: isize },
    #[error("Position `{position}` is out of bounds (`0 < position < {length}`).")]
    PositionOutOfBounds { position: isize, length: usize },
    #[error("Recursive read limit of `{limit}` exceeded (recursive read count: `{count}`).")]
    RecursiveReadLimitExceeded { count: usize, limit: usize },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RLPEncodeError {
    #[error("Length is too large.")]
    LengthTooLarge(usize),
    #[error(transparent)]
    Cursor(#[from] CursorError),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RLPDecodeError {
    #[error("Invalid RLP prefix: {0:#04x}")]
    InvalidPrefix(u8),
    #[error("List payload overruns its declared length")]
    InvalidLength,
    #[error("Lists nested deeper than {0} levels")]
    MaxDepthExceeded(usize),
    #[error("Found {0} trailing bytes after the RLP item")]
    TrailingBytes(usize),
    #[error(transparent)]
    Cursor(#[from] CursorError),
}
