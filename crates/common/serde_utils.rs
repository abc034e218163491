//! Serde helpers for JSON-RPC style quantities and byte strings.

mod quantity {
    use serde::Deserialize;

    /// A quantity as found in loosely typed JSON: a hex or decimal string, or
    /// a plain number.
    #[derive(Deserialize)]
    #[serde(untagged)]
    pub(super) enum Quantity {
        Number(u64),
        Text(String),
    }

    /// Splits a textual quantity into its digits and radix.
    pub(super) fn digits(text: &str) -> (&str, u32) {
        match text.strip_prefix("0x") {
            Some(digits) => (digits, 16),
            None => (text, 10),
        }
    }
}

pub mod u64 {
    pub mod hex_str {
        use super::super::quantity::{Quantity, digits};
        use serde::{Deserialize, Deserializer, Serializer, de::Error};

        pub fn serialize<S>(value: &u64, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            serializer.serialize_str(&format!("{value:#x}"))
        }

        pub fn deserialize<'de, D>(d: D) -> Result<u64, D::Error>
        where
            D: Deserializer<'de>,
        {
            match Quantity::deserialize(d)? {
                Quantity::Number(value) => Ok(value),
                Quantity::Text(text) => {
                    let (digits, radix) = digits(&text);
                    if digits.is_empty() {
                        return Ok(0);
                    }
                    u64::from_str_radix(digits, radix)
                        .map_err(|_| D::Error::custom(format!("Failed to deserialize u64 value {text}")))
                }
            }
        }
    }

    pub mod hex_str_opt {
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S>(value: &Option<u64>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match value {
                Some(value) => super::hex_str::serialize(value, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D>(d: D) -> Result<Option<u64>, D::Error>
        where
            D: Deserializer<'de>,
        {
            #[derive(Deserialize)]
            struct Wrapper(#[serde(with = "super::hex_str")] u64);
            Ok(Option::<Wrapper>::deserialize(d)?.map(|Wrapper(value)| value))
        }
    }
}

pub mod u8 {
    pub mod hex_str_opt {
        use serde::{Deserialize, Deserializer, Serializer, de::Error};

        pub fn serialize<S>(value: &Option<u8>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match value {
                Some(value) => serializer.serialize_str(&format!("{value:#x}")),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D>(d: D) -> Result<Option<u8>, D::Error>
        where
            D: Deserializer<'de>,
        {
            #[derive(Deserialize)]
            struct Wrapper(#[serde(with = "super::super::u64::hex_str")] u64);
            Option::<Wrapper>::deserialize(d)?
                .map(|Wrapper(value)| {
                    u8::try_from(value)
                        .map_err(|_| D::Error::custom(format!("Value {value} does not fit in a u8")))
                })
                .transpose()
        }
    }
}

pub mod u256 {
    use super::quantity::{Quantity, digits};
    use ethereum_types::U256;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    fn parse<E: Error>(quantity: Quantity) -> Result<U256, E> {
        match quantity {
            Quantity::Number(value) => Ok(U256::from(value)),
            Quantity::Text(text) => {
                let (digits, radix) = digits(&text);
                if digits.is_empty() {
                    return Ok(U256::zero());
                }
                U256::from_str_radix(digits, radix)
                    .map_err(|_| E::custom(format!("Failed to deserialize U256 value {text}")))
            }
        }
    }

    pub fn serialize<S>(value: &U256, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("{value:#x}"))
    }

    pub fn deserialize<'de, D>(d: D) -> Result<U256, D::Error>
    where
        D: Deserializer<'de>,
    {
        parse(Quantity::deserialize(d)?)
    }

    pub mod hex_str_opt {
        use super::{Quantity, U256, parse};
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S>(value: &Option<U256>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match value {
                Some(value) => super::serialize(value, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D>(d: D) -> Result<Option<U256>, D::Error>
        where
            D: Deserializer<'de>,
        {
            Option::<Quantity>::deserialize(d)?.map(parse).transpose()
        }
    }
}

/// Quantities that may exceed 256 bits, so range checks can report them
/// instead of failing to parse.
pub mod u512 {
    pub mod hex_str_opt {
        use super::super::quantity::{Quantity, digits};
        use ethereum_types::U512;
        use serde::{Deserialize, Deserializer, de::Error};

        pub fn deserialize<'de, D>(d: D) -> Result<Option<U512>, D::Error>
        where
            D: Deserializer<'de>,
        {
            let Some(quantity) = Option::<Quantity>::deserialize(d)? else {
                return Ok(None);
            };
            match quantity {
                Quantity::Number(value) => Ok(Some(U512::from(value))),
                Quantity::Text(text) => {
                    let (digits, radix) = digits(&text);
                    if digits.is_empty() {
                        return Ok(Some(U512::zero()));
                    }
                    U512::from_str_radix(digits, radix).map(Some).map_err(|_| {
                        D::Error::custom(format!("Failed to deserialize U512 value {text}"))
                    })
                }
            }
        }
    }
}

pub mod bytes {
    use ::bytes::Bytes;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn decode_hex<E: Error>(value: &str) -> Result<Bytes, E> {
        let digits = value
            .strip_prefix("0x")
            .ok_or_else(|| E::custom(format!("Hex value {value} must start with '0x'")))?;
        let bytes = if digits.len() % 2 == 1 {
            hex::decode(format!("0{digits}"))
        } else {
            hex::decode(digits)
        };
        bytes
            .map(Bytes::from)
            .map_err(|e| E::custom(e.to_string()))
    }

    pub fn serialize<S>(value: &Bytes, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("0x{}", hex::encode(value)))
    }

    pub fn deserialize<'de, D>(d: D) -> Result<Bytes, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(d)?;
        decode_hex(&value)
    }

    pub mod vec {
        use super::*;
        use serde::ser::SerializeSeq;

        pub fn serialize<S>(value: &[Bytes], serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            let mut seq = serializer.serialize_seq(Some(value.len()))?;
            for bytes in value {
                seq.serialize_element(&format!("0x{}", hex::encode(bytes)))?;
            }
            seq.end()
        }

        pub fn deserialize<'de, D>(d: D) -> Result<Vec<Bytes>, D::Error>
        where
            D: Deserializer<'de>,
        {
            Vec::<String>::deserialize(d)?
                .iter()
                .map(|value| decode_hex(value))
                .collect()
        }
    }

    pub mod vec_opt {
        use super::*;

        pub fn deserialize<'de, D>(d: D) -> Result<Option<Vec<Bytes>>, D::Error>
        where
            D: Deserializer<'de>,
        {
            Option::<Vec<String>>::deserialize(d)?
                .map(|values| values.iter().map(|value| decode_hex(value)).collect())
                .transpose()
        }
    }
}
