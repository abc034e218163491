use bytes::Bytes;
use ethereum_types::{H160, H256, U256};

use crate::{
    constants::{
        LONG_LIST_OFFSET, LONG_STRING_OFFSET, MAX_LENGTH_OF_LENGTH, RLP_EMPTY_LIST, RLP_NULL,
        SHORT_PAYLOAD_MAX_LEN,
    },
    cursor::Cursor,
    error::{CursorError, RLPEncodeError},
};

/// An RLP value: a byte string or a list of values.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RLPItem {
    Bytes(Bytes),
    List(Vec<RLPItem>),
}

impl Default for RLPItem {
    fn default() -> Self {
        RLPItem::Bytes(Bytes::new())
    }
}

impl RLPItem {
    pub fn is_list(&self) -> bool {
        matches!(self, RLPItem::List(_))
    }

    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            RLPItem::Bytes(bytes) => Some(bytes),
            RLPItem::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[RLPItem]> {
        match self {
            RLPItem::List(items) => Some(items),
            RLPItem::Bytes(_) => None,
        }
    }
}

impl From<Bytes> for RLPItem {
    fn from(value: Bytes) -> Self {
        RLPItem::Bytes(value)
    }
}

impl From<Vec<u8>> for RLPItem {
    fn from(value: Vec<u8>) -> Self {
        RLPItem::Bytes(value.into())
    }
}

impl From<&[u8]> for RLPItem {
    fn from(value: &[u8]) -> Self {
        RLPItem::Bytes(Bytes::copy_from_slice(value))
    }
}

impl From<Vec<RLPItem>> for RLPItem {
    fn from(value: Vec<RLPItem>) -> Self {
        RLPItem::List(value)
    }
}

/// Types that have a canonical RLP value.
pub trait RLPEncode {
    fn to_rlp_item(&self) -> RLPItem;

    fn encode_to_vec(&self) -> Result<Vec<u8>, RLPEncodeError> {
        to_rlp(&self.to_rlp_item())
    }
}

impl RLPEncode for RLPItem {
    fn to_rlp_item(&self) -> RLPItem {
        self.clone()
    }
}

/// Numbers encode as their minimal big-endian bytes, zero being the empty string.
fn minimal_be(bytes: &[u8]) -> RLPItem {
    let first_non_zero = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
    RLPItem::from(&bytes[first_non_zero..])
}

impl RLPEncode for u8 {
    fn to_rlp_item(&self) -> RLPItem {
        minimal_be(&[*self])
    }
}

impl RLPEncode for u64 {
    fn to_rlp_item(&self) -> RLPItem {
        minimal_be(&self.to_be_bytes())
    }
}

impl RLPEncode for bool {
    fn to_rlp_item(&self) -> RLPItem {
        u8::from(*self).to_rlp_item()
    }
}

impl RLPEncode for U256 {
    fn to_rlp_item(&self) -> RLPItem {
        minimal_be(&self.to_big_endian())
    }
}

impl RLPEncode for H256 {
    fn to_rlp_item(&self) -> RLPItem {
        RLPItem::from(self.as_bytes())
    }
}

impl RLPEncode for H160 {
    fn to_rlp_item(&self) -> RLPItem {
        RLPItem::from(self.as_bytes())
    }
}

impl RLPEncode for Bytes {
    fn to_rlp_item(&self) -> RLPItem {
        RLPItem::Bytes(self.clone())
    }
}

impl RLPEncode for [u8] {
    fn to_rlp_item(&self) -> RLPItem {
        RLPItem::from(self)
    }
}

impl<T: RLPEncode> RLPEncode for Vec<T> {
    fn to_rlp_item(&self) -> RLPItem {
        RLPItem::List(self.iter().map(RLPEncode::to_rlp_item).collect())
    }
}

/// A measured RLP value, ready to be written into a buffer of exactly
/// [`Encodable::len`] bytes.
#[derive(Debug)]
pub struct Encodable<'a> {
    length: usize,
    kind: EncodableKind<'a>,
}

#[derive(Debug)]
enum EncodableKind<'a> {
    Bytes {
        bytes: &'a [u8],
        size_of_length: usize,
    },
    List {
        items: Vec<Encodable<'a>>,
        body_length: usize,
        size_of_length: usize,
    },
}

impl<'a> Encodable<'a> {
    pub fn new(item: &'a RLPItem) -> Result<Self, RLPEncodeError> {
        match item {
            RLPItem::Bytes(bytes) => Self::from_bytes(bytes),
            RLPItem::List(items) => Self::from_list(items),
        }
    }

    fn from_bytes(bytes: &'a [u8]) -> Result<Self, RLPEncodeError> {
        let size_of_length = size_of_length(bytes.len())?;
        let length = if bytes.len() == 1 && bytes[0] < RLP_NULL {
            1
        } else if bytes.len() <= SHORT_PAYLOAD_MAX_LEN {
            1 + bytes.len()
        } else {
            1 + size_of_length + bytes.len()
        };
        Ok(Self {
            length,
            kind: EncodableKind::Bytes {
                bytes,
                size_of_length,
            },
        })
    }

    fn from_list(list: &'a [RLPItem]) -> Result<Self, RLPEncodeError> {
        let items = list
            .iter()
            .map(Encodable::new)
            .collect::<Result<Vec<_>, _>>()?;
        let body_length = items.iter().map(Encodable::len).sum();
        let size_of_length = size_of_length(body_length)?;
        let length = if body_length <= SHORT_PAYLOAD_MAX_LEN {
            1 + body_length
        } else {
            1 + size_of_length + body_length
        };
        Ok(Self {
            length,
            kind: EncodableKind::List {
                items,
                body_length,
                size_of_length,
            },
        })
    }

    /// Total encoded length, prefix included.
    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn encode<B>(&self, cursor: &mut Cursor<B>) -> Result<(), CursorError>
    where
        B: AsRef<[u8]> + AsMut<[u8]>,
    {
        match &self.kind {
            EncodableKind::Bytes {
                bytes,
                size_of_length,
            } => {
                if bytes.len() == 1 && bytes[0] < RLP_NULL {
                    cursor.push_byte(bytes[0])?;
                } else if bytes.len() <= SHORT_PAYLOAD_MAX_LEN {
                    cursor.push_byte(RLP_NULL + bytes.len() as u8)?;
                    cursor.push_bytes(bytes)?;
                } else {
                    cursor.push_byte(LONG_STRING_OFFSET + *size_of_length as u8)?;
                    push_length(cursor, *size_of_length, bytes.len())?;
                    cursor.push_bytes(bytes)?;
                }
            }
            EncodableKind::List {
                items,
                body_length,
                size_of_length,
            } => {
                if *body_length <= SHORT_PAYLOAD_MAX_LEN {
                    cursor.push_byte(RLP_EMPTY_LIST + *body_length as u8)?;
                } else {
                    cursor.push_byte(LONG_LIST_OFFSET + *size_of_length as u8)?;
                    push_length(cursor, *size_of_length, *body_length)?;
                }
                for item in items {
                    item.encode(cursor)?;
                }
            }
        }
        Ok(())
    }
}

/// Number of big-endian bytes needed to write `length`.
fn size_of_length(length: usize) -> Result<usize, RLPEncodeError> {
    let size = match length {
        0..0x100 => 1,
        0x100..0x1_0000 => 2,
        0x1_0000..0x100_0000 => 3,
        _ if (length as u64) < 0x1_0000_0000 => 4,
        _ => return Err(RLPEncodeError::LengthTooLarge(length)),
    };
    debug_assert!(size <= MAX_LENGTH_OF_LENGTH);
    Ok(size)
}

fn push_length<B>(cursor: &mut Cursor<B>, size_of_length: usize, length: usize) -> Result<(), CursorError>
where
    B: AsRef<[u8]> + AsMut<[u8]>,
{
    // `size_of_length` already bounds `length` to the chosen width
    match size_of_length {
        1 => cursor.push_u8(length as u8),
        2 => cursor.push_u16(length as u16),
        3 => cursor.push_u24(length as u32),
        _ => cursor.push_u32(length as u32),
    }
}

/// Encodes an RLP value in two passes: measure, then emit into a buffer of
/// exactly the measured size.
pub fn to_rlp(item: &RLPItem) -> Result<Vec<u8>, RLPEncodeError> {
    let encodable = Encodable::new(item)?;
    let mut cursor = Cursor::new(vec![0u8; encodable.len()]);
    encodable.encode(&mut cursor)?;
    Ok(cursor.into_inner())
}
