mod blobs_bundle;
mod transaction;

pub use blobs_bundle::*;
pub use transaction::*;
