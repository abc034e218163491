//! Size, padding, trimming and slicing over hex strings and byte arrays.

use crate::errors::{DataKind, EncodingError, SliceBound};

pub const DEFAULT_PAD_SIZE: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Left,
    Right,
}

/// Borrowed hex string or byte array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HexOrBytes<'a> {
    Hex(&'a str),
    Bytes(&'a [u8]),
}

impl<'a> From<&'a str> for HexOrBytes<'a> {
    fn from(value: &'a str) -> Self {
        HexOrBytes::Hex(value)
    }
}

impl<'a> From<&'a [u8]> for HexOrBytes<'a> {
    fn from(value: &'a [u8]) -> Self {
        HexOrBytes::Bytes(value)
    }
}

/// Owned counterpart of [`HexOrBytes`], of the same kind as the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HexOrBytesBuf {
    Hex(String),
    Bytes(Vec<u8>),
}

impl HexOrBytesBuf {
    pub fn as_ref(&self) -> HexOrBytes<'_> {
        match self {
            HexOrBytesBuf::Hex(hex) => HexOrBytes::Hex(hex),
            HexOrBytesBuf::Bytes(bytes) => HexOrBytes::Bytes(bytes),
        }
    }
}

fn strip_prefix(hex: &str) -> &str {
    hex.strip_prefix("0x").unwrap_or(hex)
}

/// `strict` requires `^0x[0-9a-fA-F]*$`, otherwise only the prefix is checked.
pub fn is_hex(value: &str, strict: bool) -> bool {
    match value.strip_prefix("0x") {
        Some(digits) if strict => digits.bytes().all(|b| b.is_ascii_hexdigit()),
        Some(_) => true,
        None => false,
    }
}

/// Byte length of a value; odd hex digit counts round up.
pub fn size<'a>(value: impl Into<HexOrBytes<'a>>) -> usize {
    match value.into() {
        HexOrBytes::Hex(hex) => hex_size(hex),
        HexOrBytes::Bytes(bytes) => bytes.len(),
    }
}

fn hex_size(hex: &str) -> usize {
    if is_hex(hex, false) {
        (hex.len() - 2).div_ceil(2)
    } else {
        hex.len()
    }
}

/// Pads to `size` bytes; `None` returns the value unchanged.
pub fn pad<'a>(
    value: impl Into<HexOrBytes<'a>>,
    dir: Direction,
    size: Option<usize>,
) -> Result<HexOrBytesBuf, EncodingError> {
    match value.into() {
        HexOrBytes::Hex(hex) => pad_hex(hex, dir, size).map(HexOrBytesBuf::Hex),
        HexOrBytes::Bytes(bytes) => pad_bytes(bytes, dir, size).map(HexOrBytesBuf::Bytes),
    }
}

pub fn pad_hex(hex: &str, dir: Direction, size: Option<usize>) -> Result<String, EncodingError> {
    let Some(size) = size else {
        return Ok(hex.to_owned());
    };
    let digits = strip_prefix(hex);
    if digits.len() > size * 2 {
        return Err(EncodingError::SizeExceedsPaddingSize {
            size: digits.len().div_ceil(2),
            target_size: size,
            kind: DataKind::Hex,
        });
    }
    let width = size * 2;
    Ok(match dir {
        Direction::Left => format!("0x{digits:0>width$}"),
        Direction::Right => format!("0x{digits:0<width$}"),
    })
}

pub fn pad_bytes(bytes: &[u8], dir: Direction, size: Option<usize>) -> Result<Vec<u8>, EncodingError> {
    let Some(size) = size else {
        return Ok(bytes.to_vec());
    };
    if bytes.len() > size {
        return Err(EncodingError::SizeExceedsPaddingSize {
            size: bytes.len(),
            target_size: size,
            kind: DataKind::Bytes,
        });
    }
    let mut padded = vec![0u8; size];
    match dir {
        Direction::Left => padded[size - bytes.len()..].copy_from_slice(bytes),
        Direction::Right => padded[..bytes.len()].copy_from_slice(bytes),
    }
    Ok(padded)
}

/// Strips zero digits (hex) or zero bytes from one end, always keeping at
/// least one. Hex output is re-padded to an even number of digits.
pub fn trim<'a>(value: impl Into<HexOrBytes<'a>>, dir: Direction) -> HexOrBytesBuf {
    match value.into() {
        HexOrBytes::Hex(hex) => HexOrBytesBuf::Hex(trim_hex(hex, dir)),
        HexOrBytes::Bytes(bytes) => HexOrBytesBuf::Bytes(trim_bytes(bytes, dir).to_vec()),
    }
}

pub fn trim_hex(hex: &str, dir: Direction) -> String {
    let digits = strip_prefix(hex);
    let zeros = count_zeros(digits.as_bytes(), dir, b'0');
    let kept = match dir {
        Direction::Left => &digits[zeros..],
        Direction::Right => &digits[..digits.len() - zeros],
    };
    if kept.len() == 1 && dir == Direction::Right {
        return format!("0x{kept}0");
    }
    if kept.len() % 2 == 1 {
        format!("0x0{kept}")
    } else {
        format!("0x{kept}")
    }
}

pub fn trim_bytes(bytes: &[u8], dir: Direction) -> &[u8] {
    let zeros = count_zeros(bytes, dir, 0);
    match dir {
        Direction::Left => &bytes[zeros..],
        Direction::Right => &bytes[..bytes.len() - zeros],
    }
}

/// Counts `zero` units from the trimmed end, never consuming the last unit.
fn count_zeros(units: &[u8], dir: Direction, zero: u8) -> usize {
    let scan = units.len().saturating_sub(1);
    let matching = |unit: &&u8| **unit == zero;
    match dir {
        Direction::Left => units.iter().take(scan).take_while(matching).count(),
        Direction::Right => units.iter().rev().take(scan).take_while(matching).count(),
    }
}

/// Returns the `[start, end)` byte range of a value.
///
/// A start past the last byte fails; with `strict` the result must also be
/// exactly `end - start` bytes long.
pub fn slice<'a>(
    value: impl Into<HexOrBytes<'a>>,
    start: Option<usize>,
    end: Option<usize>,
    strict: bool,
) -> Result<HexOrBytesBuf, EncodingError> {
    match value.into() {
        HexOrBytes::Hex(hex) => slice_hex(hex, start, end, strict).map(HexOrBytesBuf::Hex),
        HexOrBytes::Bytes(bytes) => slice_bytes(bytes, start, end, strict).map(HexOrBytesBuf::Bytes),
    }
}

pub fn slice_hex(
    hex: &str,
    start: Option<usize>,
    end: Option<usize>,
    strict: bool,
) -> Result<String, EncodingError> {
    let digits = strip_prefix(hex);
    // offsets are counted in digits, so every digit must be a single byte
    if !digits.is_ascii() {
        return Err(EncodingError::InvalidHex(hex.to_owned()));
    }
    assert_start_offset(hex_size(hex), start)?;
    let from = start.unwrap_or(0).saturating_mul(2).min(digits.len());
    let to = end
        .map_or(digits.len(), |end| end.saturating_mul(2))
        .clamp(from, digits.len());
    let sliced = format!("0x{}", &digits[from..to]);
    if strict {
        assert_end_offset(hex_size(&sliced), start, end)?;
    }
    Ok(sliced)
}

pub fn slice_bytes(
    bytes: &[u8],
    start: Option<usize>,
    end: Option<usize>,
    strict: bool,
) -> Result<Vec<u8>, EncodingError> {
    assert_start_offset(bytes.len(), start)?;
    let from = start.unwrap_or(0).min(bytes.len());
    let to = end.unwrap_or(bytes.len()).clamp(from, bytes.len());
    let sliced = bytes[from..to].to_vec();
    if strict {
        assert_end_offset(sliced.len(), start, end)?;
    }
    Ok(sliced)
}

fn assert_start_offset(size: usize, start: Option<usize>) -> Result<(), EncodingError> {
    match start {
        Some(start) if start > 0 && start >= size => Err(EncodingError::SliceOffsetOutOfBounds {
            offset: start,
            bound: SliceBound::Start,
            size,
        }),
        _ => Ok(()),
    }
}

fn assert_end_offset(size: usize, start: Option<usize>, end: Option<usize>) -> Result<(), EncodingError> {
    if let (Some(start), Some(end)) = (start, end) {
        if end.checked_sub(start) != Some(size) {
            return Err(EncodingError::SliceOffsetOutOfBounds {
                offset: end,
                bound: SliceBound::End,
                size,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;
    use proptest::prelude::*;

    #[test]
    fn hex_detection() {
        assert!(is_hex("0x", true));
        assert!(is_hex("0xdeadBEEF", true));
        assert!(!is_hex("0xzz", true));
        assert!(is_hex("0xzz", false));
        assert!(!is_hex("deadbeef", false));
    }

    #[test]
    fn sizes() {
        assert_eq!(size("0x"), 0);
        assert_eq!(size("0x1"), 1);
        assert_eq!(size("0x1234"), 2);
        assert_eq!(size("0x12345"), 3);
        assert_eq!(size(&hex!("010203")[..]), 3);
    }

    #[test]
    fn pads_hex_and_bytes() {
        assert_eq!(pad_hex("0xa4", Direction::Left, Some(4)).unwrap(), "0x000000a4");
        assert_eq!(pad_hex("0xa4", Direction::Right, Some(4)).unwrap(), "0xa4000000");
        assert_eq!(pad_hex("0xa4", Direction::Left, None).unwrap(), "0xa4");
        assert_eq!(
            pad_bytes(&[1, 2], Direction::Left, Some(4)).unwrap(),
            vec![0, 0, 1, 2]
        );
        assert_eq!(
            pad_bytes(&[1, 2], Direction::Right, Some(4)).unwrap(),
            vec![1, 2, 0, 0]
        );
        assert_eq!(
            pad("0x1234567890", Direction::Left, Some(4)),
            Err(EncodingError::SizeExceedsPaddingSize {
                size: 5,
                target_size: 4,
                kind: DataKind::Hex
            })
        );
        assert_eq!(
            pad(&[0u8; 5][..], Direction::Right, Some(4)),
            Err(EncodingError::SizeExceedsPaddingSize {
                size: 5,
                target_size: 4,
                kind: DataKind::Bytes
            })
        );
    }

    #[test]
    fn trims_hex() {
        assert_eq!(trim_hex("0x00000000a4", Direction::Left), "0xa4");
        assert_eq!(trim_hex("0x000a4", Direction::Left), "0x0a4");
        assert_eq!(trim_hex("0x0000", Direction::Left), "0x00");
        assert_eq!(trim_hex("0x00", Direction::Left), "0x00");
        assert_eq!(trim_hex("0x", Direction::Left), "0x");
        assert_eq!(trim_hex("0xa4000000", Direction::Right), "0xa4");
        assert_eq!(trim_hex("0xa0000", Direction::Right), "0xa0");
        assert_eq!(trim_hex("0x0000", Direction::Right), "0x00");
    }

    #[test]
    fn trims_bytes() {
        assert_eq!(trim_bytes(&[0, 0, 1, 0], Direction::Left), &[1, 0]);
        assert_eq!(trim_bytes(&[0, 1, 0, 0], Direction::Right), &[0, 1]);
        assert_eq!(trim_bytes(&[0, 0, 0], Direction::Left), &[0]);
        assert_eq!(trim_bytes(&[], Direction::Left), &[] as &[u8]);
    }

    #[test]
    fn slices_hex() {
        assert_eq!(slice_hex("0x0123456789", Some(1), Some(3), false).unwrap(), "0x2345");
        assert_eq!(slice_hex("0x0123456789", Some(2), None, false).unwrap(), "0x456789");
        assert_eq!(slice_hex("0x0123456789", None, None, false).unwrap(), "0x0123456789");
        assert_eq!(
            slice_hex("0x0123", Some(2), None, false),
            Err(EncodingError::SliceOffsetOutOfBounds {
                offset: 2,
                bound: SliceBound::Start,
                size: 2
            })
        );
        assert_eq!(
            slice_hex("0x0123", Some(0), Some(4), true),
            Err(EncodingError::SliceOffsetOutOfBounds {
                offset: 4,
                bound: SliceBound::End,
                size: 2
            })
        );
        // lenient slicing clamps the end
        assert_eq!(slice_hex("0x0123", Some(0), Some(4), false).unwrap(), "0x0123");
    }

    #[test]
    fn slicing_rejects_multibyte_digits() {
        assert_eq!(
            slice_hex("0xaé", Some(0), Some(1), false),
            Err(EncodingError::InvalidHex("0xaé".to_owned()))
        );
        assert!(matches!(
            slice("0xé0", None, None, false),
            Err(EncodingError::InvalidHex(_))
        ));
    }

    #[test]
    fn slices_bytes() {
        let bytes = hex!("0102030405");
        assert_eq!(slice_bytes(&bytes, Some(1), Some(3), true).unwrap(), vec![2, 3]);
        assert_eq!(slice_bytes(&bytes, Some(3), None, false).unwrap(), vec![4, 5]);
        assert!(slice_bytes(&bytes, Some(5), None, false).is_err());
        assert!(slice_bytes(&bytes, Some(3), Some(9), true).is_err());
        assert_eq!(slice_bytes(&[], Some(0), None, false).unwrap(), Vec::<u8>::new());
    }

    proptest! {
        /// Padding to 32 bytes twice is the same as padding once.
        #[test]
        fn padding_is_idempotent(bytes in prop::collection::vec(any::<u8>(), 0..=32), right in any::<bool>()) {
            let dir = if right { Direction::Right } else { Direction::Left };
            let once = pad_bytes(&bytes, dir, Some(DEFAULT_PAD_SIZE)).unwrap();
            prop_assert_eq!(pad_bytes(&once, dir, Some(DEFAULT_PAD_SIZE)).unwrap(), once.clone());

            let hex = format!("0x{}", hex::encode(&bytes));
            let once = pad_hex(&hex, dir, Some(DEFAULT_PAD_SIZE)).unwrap();
            prop_assert_eq!(pad_hex(&once, dir, Some(DEFAULT_PAD_SIZE)).unwrap(), once.clone());
        }
    }
}
