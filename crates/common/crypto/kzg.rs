use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("KZG backend failure: {0}")]
pub struct KzgError(pub String);

/// Commitment scheme used to derive blob commitments and proofs.
///
/// No implementation ships with this crate; callers plug in a binding to a
/// trusted-setup library.
pub trait KzgBackend {
    fn blob_to_kzg_commitment(&self, blob: &[u8]) -> Result<Vec<u8>, KzgError>;

    fn compute_blob_kzg_proof(&self, blob: &[u8], commitment: &[u8]) -> Result<Vec<u8>, KzgError>;
}
