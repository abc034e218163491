pub mod hasher;
pub mod keccak;
pub mod kzg;
pub mod md;
pub mod sha256;

pub use hasher::{HashError, Hasher};
pub use keccak::{Keccak, keccak256};
pub use kzg::{KzgBackend, KzgError};
pub use sha256::{Sha256, sha256};
