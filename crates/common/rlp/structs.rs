use crate::encode::{RLPEncode, RLPItem};

/// Builds an RLP list field by field.
///
/// ```
/// use ethwire_rlp::structs::Encoder;
/// let item = Encoder::new()
///     .encode_field(&1u64)
///     .encode_field(&b"cat"[..])
///     .finish();
/// assert_eq!(item.as_list().map(|l| l.len()), Some(2));
/// ```
#[derive(Debug, Default)]
#[must_use = "`Encoder` must be consumed with `finish` to produce the list"]
pub struct Encoder {
    items: Vec<RLPItem>,
}

impl Encoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn encode_field<T: RLPEncode + ?Sized>(mut self, value: &T) -> Self {
        self.items.push(value.to_rlp_item());
        self
    }

    /// Appends the field only when present.
    pub fn encode_optional_field<T: RLPEncode>(mut self, value: &Option<T>) -> Self {
        if let Some(value) = value {
            self.items.push(value.to_rlp_item());
        }
        self
    }

    pub fn encode_item(mut self, item: RLPItem) -> Self {
        self.items.push(item);
        self
    }

    pub fn encode_items(mut self, items: impl IntoIterator<Item = RLPItem>) -> Self {
        self.items.extend(items);
        self
    }

    pub fn finish(self) -> RLPItem {
        RLPItem::List(self.items)
    }
}
