pub mod data;
pub mod encoding;
pub mod lru;
pub mod unit;
