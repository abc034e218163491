use ethereum_types::U256;
use ethwire_rlp::{encode::RLPItem, error::RLPEncodeError, to_rlp};

use crate::{
    constants::MAX_SAFE_INTEGER,
    errors::EncodingError,
    utils::data::{Direction, HexOrBytes, pad_bytes, pad_hex, size},
};

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

const HEX_TABLE: [[u8; 2]; 256] = {
    let mut table = [[0u8; 2]; 256];
    let mut i = 0;
    while i < 256 {
        table[i] = [HEX_DIGITS[i >> 4], HEX_DIGITS[i & 0x0f]];
        i += 1;
    }
    table
};

/// Lowercase `0x`-prefixed hex of `bytes`.
pub fn encode_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(2 + bytes.len() * 2);
    out.push_str("0x");
    for byte in bytes {
        let [high, low] = HEX_TABLE[*byte as usize];
        out.push(char::from(high));
        out.push(char::from(low));
    }
    out
}

fn nibble(digit: u8) -> Option<u8> {
    match digit {
        b'0'..=b'9' => Some(digit - b'0'),
        b'a'..=b'f' => Some(digit - b'a' + 10),
        b'A'..=b'F' => Some(digit - b'A' + 10),
        _ => None,
    }
}

/// A value that can be rendered as hex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToHexValue<'a> {
    Number(u64),
    BigInt(U256),
    Bool(bool),
    Str(&'a str),
    Bytes(&'a [u8]),
}

pub fn to_hex(value: ToHexValue<'_>, size: Option<usize>) -> Result<String, EncodingError> {
    match value {
        ToHexValue::Number(value) => number_to_hex(value, size),
        ToHexValue::BigInt(value) => u256_to_hex(value, size),
        ToHexValue::Bool(value) => bool_to_hex(value, size),
        ToHexValue::Str(value) => string_to_hex(value, size),
        ToHexValue::Bytes(value) => bytes_to_hex(value, size),
    }
}

/// Largest value representable in `size` bytes, saturating at `U256::MAX`.
fn max_for_size(size: usize) -> U256 {
    if size >= 32 {
        U256::MAX
    } else {
        (U256::one() << (size * 8)) - 1
    }
}

/// Minimal hex of a plain number, left-padded to `size` bytes when given.
/// Without a size the value must not exceed `MAX_SAFE_INTEGER`.
pub fn number_to_hex(value: u64, size: Option<usize>) -> Result<String, EncodingError> {
    let max = match size {
        Some(size) => max_for_size(size),
        None => U256::from(MAX_SAFE_INTEGER),
    };
    if U256::from(value) > max {
        return Err(EncodingError::IntegerOutOfRange {
            value: value.to_string(),
            max: max.to_string(),
            size,
        });
    }
    pad_hex(&format!("0x{value:x}"), Direction::Left, size)
}

pub fn u256_to_hex(value: U256, size: Option<usize>) -> Result<String, EncodingError> {
    if let Some(size) = size {
        let max = max_for_size(size);
        if value > max {
            return Err(EncodingError::IntegerOutOfRange {
                value: value.to_string(),
                max: max.to_string(),
                size: Some(size),
            });
        }
    }
    pad_hex(&format!("0x{value:x}"), Direction::Left, size)
}

pub fn bool_to_hex(value: bool, size: Option<usize>) -> Result<String, EncodingError> {
    let hex = if value { "0x01" } else { "0x00" };
    if let Some(size) = size {
        assert_size(HexOrBytes::Hex(hex), size)?;
    }
    pad_hex(hex, Direction::Left, size)
}

pub fn string_to_hex(value: &str, size: Option<usize>) -> Result<String, EncodingError> {
    bytes_to_hex(value.as_bytes(), size)
}

/// Hex of a byte array, right-padded to `size` bytes when given.
pub fn bytes_to_hex(value: &[u8], size: Option<usize>) -> Result<String, EncodingError> {
    let hex = encode_hex(value);
    match size {
        Some(size) => {
            assert_size(HexOrBytes::Hex(&hex), size)?;
            pad_hex(&hex, Direction::Right, Some(size))
        }
        None => Ok(hex),
    }
}

/// A value that can be converted to bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToBytesValue<'a> {
    Number(u64),
    BigInt(U256),
    Bool(bool),
    Hex(&'a str),
    Str(&'a str),
}

pub fn to_bytes(value: ToBytesValue<'_>, size: Option<usize>) -> Result<Vec<u8>, EncodingError> {
    match value {
        ToBytesValue::Number(value) => hex_to_bytes(&number_to_hex(value, size)?, None),
        ToBytesValue::BigInt(value) => hex_to_bytes(&u256_to_hex(value, size)?, None),
        ToBytesValue::Bool(value) => bool_to_bytes(value, size),
        ToBytesValue::Hex(value) => hex_to_bytes(value, size),
        ToBytesValue::Str(value) => string_to_bytes(value, size),
    }
}

pub fn bool_to_bytes(value: bool, size: Option<usize>) -> Result<Vec<u8>, EncodingError> {
    let bytes = [u8::from(value)];
    if let Some(size) = size {
        assert_size(HexOrBytes::Bytes(&bytes), size)?;
    }
    pad_bytes(&bytes, Direction::Left, size)
}

pub fn string_to_bytes(value: &str, size: Option<usize>) -> Result<Vec<u8>, EncodingError> {
    let bytes = value.as_bytes();
    if let Some(size) = size {
        assert_size(HexOrBytes::Bytes(bytes), size)?;
    }
    pad_bytes(bytes, Direction::Right, size)
}

/// Decodes a `0x`-prefixed hex string. Odd digit counts are left-padded with
/// a zero nibble; with `size` the result is right-padded to that many bytes.
pub fn hex_to_bytes(hex: &str, size: Option<usize>) -> Result<Vec<u8>, EncodingError> {
    if !hex.starts_with("0x") {
        return Err(EncodingError::InvalidHex(hex.to_owned()));
    }
    let padded;
    let hex = match size {
        Some(size) => {
            assert_size(HexOrBytes::Hex(hex), size)?;
            padded = pad_hex(hex, Direction::Right, Some(size))?;
            padded.as_str()
        }
        None => hex,
    };
    let digits = &hex[2..];
    let digits = if digits.len() % 2 == 1 {
        format!("0{digits}")
    } else {
        digits.to_owned()
    };

    digits
        .as_bytes()
        .chunks_exact(2)
        .map(|pair| match (nibble(pair[0]), nibble(pair[1])) {
            (Some(high), Some(low)) => Ok((high << 4) | low),
            _ => Err(EncodingError::InvalidByteSequence {
                sequence: String::from_utf8_lossy(pair).into_owned(),
                hex: digits.clone(),
            }),
        })
        .collect()
}

/// Parses a hex quantity; `0x` decodes to zero.
pub fn hex_to_u256(hex: &str, size: Option<usize>) -> Result<U256, EncodingError> {
    if let Some(size) = size {
        assert_size(HexOrBytes::Hex(hex), size)?;
    }
    let bytes = hex_to_bytes(hex, None)?;
    let first_non_zero = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
    let significant = &bytes[first_non_zero..];
    if significant.len() > 32 {
        return Err(EncodingError::IntegerOutOfRange {
            value: hex.to_owned(),
            max: U256::MAX.to_string(),
            size,
        });
    }
    Ok(U256::from_big_endian(significant))
}

/// Parses a hex quantity that must fit `MAX_SAFE_INTEGER`.
pub fn hex_to_number(hex: &str, size: Option<usize>) -> Result<u64, EncodingError> {
    let value = hex_to_u256(hex, size)?;
    if value > U256::from(MAX_SAFE_INTEGER) {
        return Err(EncodingError::IntegerOutOfRange {
            value: value.to_string(),
            max: MAX_SAFE_INTEGER.to_string(),
            size,
        });
    }
    Ok(value.low_u64())
}

pub fn concat_hex<S: AsRef<str>>(values: &[S]) -> String {
    values.iter().fold(String::from("0x"), |mut acc, value| {
        let value = value.as_ref();
        acc.push_str(value.strip_prefix("0x").unwrap_or(value));
        acc
    })
}

pub fn concat_bytes<B: AsRef<[u8]>>(values: &[B]) -> Vec<u8> {
    values.iter().flat_map(|value| value.as_ref().iter().copied()).collect()
}

/// Fails with `SizeOverflow` when the value is longer than `size` bytes.
pub fn assert_size(value: HexOrBytes<'_>, max: usize) -> Result<(), EncodingError> {
    let given = size(value);
    if given > max {
        return Err(EncodingError::SizeOverflow { given, max });
    }
    Ok(())
}

pub fn to_rlp_hex(item: &RLPItem) -> Result<String, RLPEncodeError> {
    Ok(encode_hex(&to_rlp(item)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;
    use proptest::prelude::*;

    #[test]
    fn numbers_to_hex() {
        assert_eq!(number_to_hex(0, None).unwrap(), "0x0");
        assert_eq!(number_to_hex(420, None).unwrap(), "0x1a4");
        assert_eq!(number_to_hex(420, Some(32)).unwrap().len(), 66);
        assert_eq!(number_to_hex(255, Some(1)).unwrap(), "0xff");
        assert_eq!(
            number_to_hex(256, Some(1)),
            Err(EncodingError::IntegerOutOfRange {
                value: "256".to_owned(),
                max: "255".to_owned(),
                size: Some(1)
            })
        );
        assert!(matches!(
            number_to_hex(MAX_SAFE_INTEGER + 1, None),
            Err(EncodingError::IntegerOutOfRange { size: None, .. })
        ));
        assert!(number_to_hex(MAX_SAFE_INTEGER + 1, Some(8)).is_ok());
    }

    #[test]
    fn out_of_range_message_names_the_width() {
        let err = number_to_hex(256, Some(1)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Number \"256\" is not in safe 8-bit unsigned integer range (0 to 255)"
        );
    }

    #[test]
    fn big_ints_to_hex() {
        assert_eq!(u256_to_hex(U256::MAX, None).unwrap(), format!("0x{}", "f".repeat(64)));
        assert_eq!(u256_to_hex(U256::from(1), Some(2)).unwrap(), "0x0001");
        assert!(u256_to_hex(U256::from(0x10000), Some(2)).is_err());
    }

    #[test]
    fn bools_and_strings_to_hex() {
        assert_eq!(bool_to_hex(true, None).unwrap(), "0x01");
        assert_eq!(bool_to_hex(false, Some(2)).unwrap(), "0x0000");
        assert_eq!(string_to_hex("Hello", None).unwrap(), "0x48656c6c6f");
        assert_eq!(
            to_hex(ToHexValue::Str("Hi"), Some(4)).unwrap(),
            "0x48690000"
        );
        assert_eq!(
            bytes_to_hex(&[1, 2, 3], Some(2)),
            Err(EncodingError::SizeOverflow { given: 3, max: 2 })
        );
    }

    #[test]
    fn hex_to_bytes_decoding() {
        assert_eq!(hex_to_bytes("0x", None).unwrap(), Vec::<u8>::new());
        assert_eq!(hex_to_bytes("0xdeadBEEF", None).unwrap(), hex!("deadbeef").to_vec());
        assert_eq!(hex_to_bytes("0xabc", None).unwrap(), hex!("0abc").to_vec());
        assert_eq!(hex_to_bytes("0x01", Some(3)).unwrap(), hex!("010000").to_vec());
        assert_eq!(
            hex_to_bytes("0xzz", None),
            Err(EncodingError::InvalidByteSequence {
                sequence: "zz".to_owned(),
                hex: "zz".to_owned()
            })
        );
        assert_eq!(
            hex_to_bytes("dead", None),
            Err(EncodingError::InvalidHex("dead".to_owned()))
        );
    }

    #[test]
    fn values_to_bytes() {
        assert_eq!(to_bytes(ToBytesValue::Number(420), None).unwrap(), hex!("01a4").to_vec());
        assert_eq!(to_bytes(ToBytesValue::Number(0), None).unwrap(), vec![0]);
        assert_eq!(to_bytes(ToBytesValue::Number(1), Some(4)).unwrap(), hex!("00000001").to_vec());
        assert_eq!(to_bytes(ToBytesValue::Bool(true), Some(2)).unwrap(), vec![0, 1]);
        assert_eq!(to_bytes(ToBytesValue::Str("ab"), Some(3)).unwrap(), vec![b'a', b'b', 0]);
        assert_eq!(
            to_bytes(ToBytesValue::BigInt(U256::from(0x1234)), None).unwrap(),
            hex!("1234").to_vec()
        );
    }

    #[test]
    fn hex_quantities() {
        assert_eq!(hex_to_u256("0x", None).unwrap(), U256::zero());
        assert_eq!(hex_to_u256("0x1a4", None).unwrap(), U256::from(420));
        let padded_max = format!("0x00{}", "f".repeat(64));
        assert_eq!(hex_to_u256(&padded_max, None).unwrap(), U256::MAX);
        assert!(hex_to_u256(&format!("0x1{}", "0".repeat(64)), None).is_err());
        assert_eq!(hex_to_number("0xff", None).unwrap(), 255);
        assert!(hex_to_number("0x20000000000000", None).is_err());
        assert_eq!(
            hex_to_number("0x0102", Some(1)),
            Err(EncodingError::SizeOverflow { given: 2, max: 1 })
        );
    }

    #[test]
    fn concatenation() {
        assert_eq!(concat_hex(&["0x01", "0x", "0xabcd"]), "0x01abcd");
        assert_eq!(concat_bytes(&[&[1u8][..], &[], &[2, 3]]), vec![1, 2, 3]);
    }

    #[test]
    fn rlp_hex() {
        assert_eq!(to_rlp_hex(&RLPItem::List(vec![])).unwrap(), "0xc0");
    }

    proptest! {
        /// Bytes survive a trip through their hex rendering.
        #[test]
        fn bytes_round_trip(bytes in prop::collection::vec(any::<u8>(), 0..128)) {
            let hex = bytes_to_hex(&bytes, None).unwrap();
            prop_assert_eq!(hex.clone(), format!("0x{}", hex::encode(&bytes)));
            prop_assert_eq!(hex_to_bytes(&hex, None).unwrap(), bytes);
        }

        /// Even-length hex decodes and re-encodes to its lowercase form.
        #[test]
        fn hex_round_trip(digits in "([0-9a-fA-F]{2}){0,64}") {
            let hex = format!("0x{digits}");
            let bytes = hex_to_bytes(&hex, None).unwrap();
            prop_assert_eq!(bytes_to_hex(&bytes, None).unwrap(), hex.to_lowercase());
        }

        #[test]
        fn numbers_round_trip(value in 0..=MAX_SAFE_INTEGER) {
            let hex = number_to_hex(value, None).unwrap();
            prop_assert_eq!(hex_to_number(&hex, None).unwrap(), value);
        }
    }
}
