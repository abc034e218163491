use bytes::Bytes;
use ethwire_crypto::{KzgBackend, sha256};
use ethwire_rlp::Cursor;
use serde::{Deserialize, Serialize};

use crate::{
    constants::{
        BYTES_PER_BLOB, BYTES_PER_FIELD_ELEMENT, FIELD_ELEMENTS_PER_BLOB, MAX_BYTES_PER_TRANSACTION,
    },
    errors::TransactionError,
};

/// Data bytes carried by one field element; its leading byte stays zero so
/// the element is below the BLS modulus.
const DATA_BYTES_PER_FIELD_ELEMENT: usize = BYTES_PER_FIELD_ELEMENT - 1;

/// Marks the end of the data inside the last blob.
const BLOB_TERMINATOR: u8 = 0x80;

/// A blob with its KZG commitment and proof.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobSidecar {
    #[serde(with = "crate::serde_utils::bytes")]
    pub blob: Bytes,
    #[serde(with = "crate::serde_utils::bytes")]
    pub commitment: Bytes,
    #[serde(with = "crate::serde_utils::bytes")]
    pub proof: Bytes,
}

/// Blobs together with the commitments and proofs derived from them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlobsBundle {
    pub blobs: Vec<Bytes>,
    pub commitments: Vec<Bytes>,
    pub proofs: Vec<Bytes>,
}

impl BlobsBundle {
    pub fn create_from_blobs(blobs: Vec<Bytes>, kzg: &dyn KzgBackend) -> Result<Self, TransactionError> {
        let commitments = blobs_to_commitments(&blobs, kzg)?;
        let proofs = blobs_to_proofs(&blobs, &commitments, kzg)?;
        Ok(Self {
            blobs,
            commitments,
            proofs,
        })
    }

    pub fn versioned_hashes(&self, version: u8) -> Vec<Bytes> {
        commitments_to_versioned_hashes(&self.commitments, version)
    }

    pub fn sidecars(&self) -> Vec<BlobSidecar> {
        to_blob_sidecars(&self.blobs, &self.commitments, &self.proofs)
    }
}

/// Packs arbitrary data into blobs, 31 bytes per field element, followed by
/// a `0x80` terminator.
pub fn to_blobs(data: &[u8]) -> Result<Vec<Bytes>, TransactionError> {
    if data.is_empty() {
        return Err(TransactionError::EmptyBlob);
    }
    if data.len() > MAX_BYTES_PER_TRANSACTION {
        return Err(TransactionError::BlobSizeTooLarge {
            max_size: MAX_BYTES_PER_TRANSACTION,
            size: data.len(),
        });
    }

    let mut blobs = Vec::new();
    let mut chunks = data.chunks(DATA_BYTES_PER_FIELD_ELEMENT);
    let mut done = false;
    while !done {
        let mut blob = Cursor::unbounded(vec![0u8; BYTES_PER_BLOB]);
        for _ in 0..FIELD_ELEMENTS_PER_BLOB {
            let chunk = chunks.next().unwrap_or_default();
            blob.push_u8(0x00)?;
            blob.push_bytes(chunk)?;
            if chunk.len() < DATA_BYTES_PER_FIELD_ELEMENT {
                blob.push_u8(BLOB_TERMINATOR)?;
                done = true;
                break;
            }
        }
        blobs.push(Bytes::from(blob.into_inner()));
    }
    Ok(blobs)
}

pub fn blobs_to_commitments(blobs: &[Bytes], kzg: &dyn KzgBackend) -> Result<Vec<Bytes>, TransactionError> {
    blobs
        .iter()
        .map(|blob| {
            kzg.blob_to_kzg_commitment(blob)
                .map(Bytes::from)
                .map_err(TransactionError::from)
        })
        .collect()
}

pub fn blobs_to_proofs(
    blobs: &[Bytes],
    commitments: &[Bytes],
    kzg: &dyn KzgBackend,
) -> Result<Vec<Bytes>, TransactionError> {
    blobs
        .iter()
        .zip(commitments)
        .map(|(blob, commitment)| {
            kzg.compute_blob_kzg_proof(blob, commitment)
                .map(Bytes::from)
                .map_err(TransactionError::from)
        })
        .collect()
}

/// SHA-256 of the commitment with its first byte replaced by `version`.
pub fn commitment_to_versioned_hash(commitment: &[u8], version: u8) -> Bytes {
    let mut hash = sha256(commitment);
    hash[0] = version;
    Bytes::copy_from_slice(&hash)
}

pub fn commitments_to_versioned_hashes(commitments: &[Bytes], version: u8) -> Vec<Bytes> {
    commitments
        .iter()
        .map(|commitment| commitment_to_versioned_hash(commitment, version))
        .collect()
}

pub fn to_blob_sidecars(blobs: &[Bytes], commitments: &[Bytes], proofs: &[Bytes]) -> Vec<BlobSidecar> {
    blobs
        .iter()
        .zip(commitments)
        .zip(proofs)
        .map(|((blob, commitment), proof)| BlobSidecar {
            blob: blob.clone(),
            commitment: commitment.clone(),
            proof: proof.clone(),
        })
        .collect()
}
