pub use ethereum_types::{H160, H256, U256, U512};
pub mod address;
pub mod config;
pub mod constants;
pub mod errors;
pub mod serde_utils;
pub mod types;
pub mod utils;

pub use address::{AddressCache, checksum_address, get_address, is_address};
pub use config::CodecConfig;
pub use ethwire_rlp::{decode, encode::RLPItem, to_rlp};
pub use types::{
    GenericTransaction, Signature, Transaction, TransactionSerializer, TxKind, TxType,
    serialize_generic_transaction, serialize_transaction, serialize_transaction_hex,
};
