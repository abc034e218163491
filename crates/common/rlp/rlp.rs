pub mod constants;
pub mod cursor;
pub mod decode;
pub mod encode;
pub mod error;
pub mod structs;

pub use cursor::Cursor;
pub use decode::{decode, decode_with_limit};
pub use encode::{Encodable, RLPEncode, RLPItem, to_rlp};
