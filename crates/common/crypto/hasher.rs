use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HashError {
    #[error("Hash#digest() has already been called")]
    AlreadyFinalized,
    #[error("Hash instance has been destroyed")]
    Destroyed,
    #[error("XOF is not possible for this instance")]
    XofNotEnabled,
    #[error("digestInto() expects output buffer of length at least {expected}, got {got}")]
    OutputTooShort { expected: usize, got: usize },
}

/// A streaming hash.
///
/// `update` may be called any number of times before a single `digest`;
/// digesting wipes the internal state and any later call fails.
pub trait Hasher {
    fn block_len(&self) -> usize;

    fn output_len(&self) -> usize;

    fn update(&mut self, data: &[u8]) -> Result<&mut Self, HashError>;

    fn digest_into(&mut self, out: &mut [u8]) -> Result<(), HashError>;

    fn digest(&mut self) -> Result<Vec<u8>, HashError> {
        let mut out = vec![0u8; self.output_len()];
        self.digest_into(&mut out)?;
        Ok(out)
    }

    /// Wipes the state without producing a digest.
    fn destroy(&mut self);
}
