use bytes::Bytes;

use crate::{
    constants::{
        DEFAULT_RECURSIVE_READ_LIMIT, MAX_DECODE_DEPTH, RLP_EMPTY_LIST, RLP_NULL,
        SHORT_PAYLOAD_MAX_LEN,
    },
    cursor::Cursor,
    encode::RLPItem,
    error::RLPDecodeError,
};

/// Decodes a single RLP value spanning all of `rlp`.
///
/// Single-byte values are read twice from the same position, so the cursor's
/// recursive read guard caps how many of them a payload may contain. List
/// nesting is capped at [`MAX_DECODE_DEPTH`] regardless of the limit.
pub fn decode(rlp: &[u8]) -> Result<RLPItem, RLPDecodeError> {
    decode_with_limit(rlp, Some(DEFAULT_RECURSIVE_READ_LIMIT))
}

pub fn decode_with_limit(rlp: &[u8], recursive_read_limit: Option<usize>) -> Result<RLPItem, RLPDecodeError> {
    if rlp.is_empty() {
        return Ok(RLPItem::default());
    }
    let mut cursor = Cursor::with_recursive_read_limit(rlp, recursive_read_limit);
    let item = decode_item(&mut cursor, 0)?;
    match cursor.remaining() {
        0 => Ok(item),
        trailing => Err(RLPDecodeError::TrailingBytes(trailing)),
    }
}

fn decode_item(cursor: &mut Cursor<&[u8]>, depth: usize) -> Result<RLPItem, RLPDecodeError> {
    let prefix = cursor.read_byte()?;
    if prefix < RLP_NULL {
        cursor.decrement_position(1)?;
    }

    if prefix < RLP_EMPTY_LIST {
        let length = read_length(cursor, prefix, RLP_NULL)?;
        let bytes = cursor.read_bytes(length, None)?;
        return Ok(RLPItem::Bytes(Bytes::copy_from_slice(bytes)));
    }

    if depth >= MAX_DECODE_DEPTH {
        return Err(RLPDecodeError::MaxDepthExceeded(MAX_DECODE_DEPTH));
    }
    let length = read_length(cursor, prefix, RLP_EMPTY_LIST)?;
    let start = cursor.position();
    let mut items = Vec::new();
    while cursor.position() - start < length {
        items.push(decode_item(cursor, depth + 1)?);
    }
    if cursor.position() - start > length {
        return Err(RLPDecodeError::InvalidLength);
    }
    Ok(RLPItem::List(items))
}

fn read_length(cursor: &mut Cursor<&[u8]>, prefix: u8, offset: u8) -> Result<usize, RLPDecodeError> {
    if offset == RLP_NULL && prefix < RLP_NULL {
        return Ok(1);
    }
    let short_max = offset as usize + SHORT_PAYLOAD_MAX_LEN;
    if prefix as usize <= short_max {
        return Ok((prefix - offset) as usize);
    }
    let length = match prefix as usize - short_max {
        1 => cursor.read_u8()? as usize,
        2 => cursor.read_u16()? as usize,
        3 => cursor.read_u24()? as usize,
        4 => cursor.read_u32()? as usize,
        _ => return Err(RLPDecodeError::InvalidPrefix(prefix)),
    };
    Ok(length)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{encode::to_rlp, error::CursorError};
    use hex_literal::hex;
    use proptest::prelude::*;

    #[test]
    fn decodes_strings_and_lists() {
        assert_eq!(decode(&[0x80]).unwrap(), RLPItem::Bytes(Bytes::new()));
        assert_eq!(decode(&[0x05]).unwrap(), RLPItem::from(vec![0x05]));
        assert_eq!(
            decode(&hex!("c88363617483646f67")).unwrap(),
            RLPItem::List(vec![
                RLPItem::from(b"cat".to_vec()),
                RLPItem::from(b"dog".to_vec())
            ])
        );
        assert_eq!(decode(&[]).unwrap(), RLPItem::default());
    }

    #[test]
    fn rejects_trailing_bytes() {
        assert_eq!(
            decode(&hex!("8180aa")),
            Err(RLPDecodeError::TrailingBytes(1))
        );
    }

    #[test]
    fn rejects_truncated_payloads() {
        assert!(matches!(
            decode(&hex!("83646f")),
            Err(RLPDecodeError::Cursor(CursorError::PositionOutOfBounds { .. }))
        ));
    }

    #[test]
    fn rejects_overlong_length_of_length() {
        assert_eq!(
            decode(&hex!("bf0000000000000001aa")),
            Err(RLPDecodeError::InvalidPrefix(0xbf))
        );
        assert_eq!(
            decode(&hex!("ff0000000000000001aa")),
            Err(RLPDecodeError::InvalidPrefix(0xff))
        );
    }

    #[test]
    fn rejects_items_overrunning_their_list() {
        // list claims 1 byte of body but holds a 2-byte string
        assert_eq!(
            decode(&hex!("c18180")),
            Err(RLPDecodeError::InvalidLength)
        );
    }

    #[test]
    fn recursive_read_guard_bounds_single_byte_items() {
        let item = RLPItem::List(vec![RLPItem::from(vec![0x01]); 4]);
        let encoded = to_rlp(&item).unwrap();
        assert_eq!(decode_with_limit(&encoded, Some(4)).unwrap(), item);
        assert!(matches!(
            decode_with_limit(&encoded, Some(3)),
            Err(RLPDecodeError::Cursor(
                CursorError::RecursiveReadLimitExceeded { count: 4, limit: 3 }
            ))
        ));
        assert_eq!(decode_with_limit(&encoded, None).unwrap(), item);
    }

    #[test]
    fn rejects_deeply_nested_lists() {
        assert_eq!(
            decode(&vec![0xc1u8; 200_000]),
            Err(RLPDecodeError::MaxDepthExceeded(MAX_DECODE_DEPTH))
        );
        assert_eq!(
            decode_with_limit(&vec![0xc1u8; 200_000], None),
            Err(RLPDecodeError::MaxDepthExceeded(MAX_DECODE_DEPTH))
        );
    }

    #[test]
    fn accepts_nesting_up_to_the_bound() {
        let mut item = RLPItem::List(vec![]);
        for _ in 1..MAX_DECODE_DEPTH {
            item = RLPItem::List(vec![item]);
        }
        let encoded = to_rlp(&item).unwrap();
        assert_eq!(decode(&encoded).unwrap(), item);
        let deeper = to_rlp(&RLPItem::List(vec![item])).unwrap();
        assert_eq!(
            decode(&deeper),
            Err(RLPDecodeError::MaxDepthExceeded(MAX_DECODE_DEPTH))
        );
    }

    fn arb_item() -> impl Strategy<Value = RLPItem> {
        let leaf = prop::collection::vec(any::<u8>(), 0..80).prop_map(RLPItem::from);
        leaf.prop_recursive(4, 64, 8, |inner| {
            prop::collection::vec(inner, 0..8).prop_map(RLPItem::List)
        })
    }

    proptest! {
        /// Decoding an encoding yields the original value.
        #[test]
        fn decode_inverts_encode(item in arb_item()) {
            let encoded = to_rlp(&item).unwrap();
            prop_assert_eq!(decode(&encoded).unwrap(), item);
        }
    }
}
