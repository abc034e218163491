use std::fmt::Display;

use bytes::Bytes;
use ethereum_types::{H256, U256};
use ethwire_crypto::KzgBackend;
use ethwire_rlp::{
    encode::{RLPEncode, RLPItem},
    structs::Encoder,
    to_rlp,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use serde_impl::{GenericTransaction, deserialize_input};

use crate::{
    address::AddressCache,
    config::CodecConfig,
    constants::VERSIONED_HASH_VERSION_KZG,
    errors::TransactionError,
    types::{
        BlobSidecar, blobs_to_commitments, blobs_to_proofs, commitments_to_versioned_hashes,
        to_blob_sidecars,
    },
    utils::encoding::{encode_hex, hex_to_bytes, number_to_hex},
};

/// A transaction of any supported envelope type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Transaction {
    LegacyTransaction(LegacyTransaction),
    EIP2930Transaction(EIP2930Transaction),
    EIP1559Transaction(EIP1559Transaction),
    EIP4844Transaction(EIP4844Transaction),
    EIP7702Transaction(EIP7702Transaction),
    DepositTransaction(DepositTransaction),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Hash)]
pub enum TxType {
    #[default]
    Legacy = 0x00,
    EIP2930 = 0x01,
    EIP1559 = 0x02,
    EIP4844 = 0x03,
    EIP7702 = 0x04,
    // OP-Stack deposited transaction type
    Deposit = 0x7e,
}

impl From<TxType> for u8 {
    fn from(val: TxType) -> Self {
        match val {
            TxType::Legacy => 0x00,
            TxType::EIP2930 => 0x01,
            TxType::EIP1559 => 0x02,
            TxType::EIP4844 => 0x03,
            TxType::EIP7702 => 0x04,
            TxType::Deposit => 0x7e,
        }
    }
}

impl Display for TxType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TxType::Legacy => write!(f, "Legacy"),
            TxType::EIP2930 => write!(f, "EIP2930"),
            TxType::EIP1559 => write!(f, "EIP1559"),
            TxType::EIP4844 => write!(f, "EIP4844"),
            TxType::EIP7702 => write!(f, "EIP7702"),
            TxType::Deposit => write!(f, "Deposit"),
        }
    }
}

impl TxType {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x00 => Some(Self::Legacy),
            0x01 => Some(Self::EIP2930),
            0x02 => Some(Self::EIP1559),
            0x03 => Some(Self::EIP4844),
            0x04 => Some(Self::EIP7702),
            0x7e => Some(Self::Deposit),
            _ => None,
        }
    }

    /// Parses the lowercase names used by JSON requests (`"eip1559"`, `"deposit"`, ...).
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "legacy" => Some(Self::Legacy),
            "eip2930" => Some(Self::EIP2930),
            "eip1559" => Some(Self::EIP1559),
            "eip4844" => Some(Self::EIP4844),
            "eip7702" => Some(Self::EIP7702),
            "deposit" => Some(Self::Deposit),
            _ => None,
        }
    }
}

/// The transaction's kind: call or create.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum TxKind {
    Call(String),
    #[default]
    Create,
}

impl From<Option<String>> for TxKind {
    fn from(value: Option<String>) -> Self {
        match value {
            Some(address) if !address.is_empty() => Self::Call(address),
            _ => Self::Create,
        }
    }
}

impl TxKind {
    fn to_rlp_item(&self) -> Result<RLPItem, TransactionError> {
        match self {
            Self::Call(address) => address_item(address),
            Self::Create => Ok(RLPItem::default()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessListItem {
    pub address: String,
    #[serde(with = "crate::serde_utils::bytes::vec")]
    pub storage_keys: Vec<Bytes>,
}

pub type AccessList = Vec<AccessListItem>;

/// An ECDSA signature, with either a legacy `v` or a `y_parity`.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signature {
    #[serde(with = "crate::serde_utils::u256")]
    pub r: U256,
    #[serde(with = "crate::serde_utils::u256")]
    pub s: U256,
    #[serde(
        default,
        with = "crate::serde_utils::u64::hex_str_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub v: Option<u64>,
    #[serde(
        default,
        with = "crate::serde_utils::u8::hex_str_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub y_parity: Option<u8>,
}

impl Signature {
    pub fn from_v(r: U256, s: U256, v: u64) -> Self {
        Self {
            r,
            s,
            v: Some(v),
            y_parity: None,
        }
    }

    pub fn from_y_parity(r: U256, s: U256, y_parity: u8) -> Self {
        Self {
            r,
            s,
            v: None,
            y_parity: Some(y_parity),
        }
    }

    pub fn check(&self) -> Result<(), TransactionError> {
        match (self.v, self.y_parity) {
            (None, None) => Err(TransactionError::InvalidSignature(
                "one of `v` or `yParity` is required".to_owned(),
            )),
            (_, Some(y_parity)) if y_parity > 1 => Err(TransactionError::InvalidSignature(format!(
                "`yParity` must be 0 or 1, got {y_parity}"
            ))),
            _ => Ok(()),
        }
    }

    fn y_parity_item(&self) -> RLPItem {
        let odd = match (self.y_parity, self.v) {
            (Some(y_parity), _) => y_parity == 1,
            (None, Some(0 | 27)) | (None, None) => false,
            (None, Some(_)) => true,
        };
        u8::from(odd).to_rlp_item()
    }

    /// `[yParity, r, s]` as appended to typed envelopes and authorizations.
    fn typed_items(&self) -> Result<[RLPItem; 3], TransactionError> {
        self.check()?;
        Ok([self.y_parity_item(), self.r.to_rlp_item(), self.s.to_rlp_item()])
    }

    /// Recovers the legacy `v`, folding in `chain_id` as EIP-155 does.
    fn legacy_v(&self, chain_id: Option<u64>) -> Result<U256, TransactionError> {
        self.check()?;
        let v = match (self.v, self.y_parity) {
            (Some(v), _) => v,
            (None, y_parity) => 27 + u64::from(y_parity.unwrap_or_default()),
        };
        if v >= 35 {
            let inferred_chain_id = (v - 35) / 2;
            if inferred_chain_id > 0 {
                return Ok(U256::from(v));
            }
            return Ok(U256::from(27 + u64::from(v != 35)));
        }
        if let Some(chain_id) = chain_id.filter(|id| *id > 0) {
            return Ok(U256::from(chain_id) * 2 + U256::from(35 + v - 27));
        }
        let expected = 27 + u64::from(v != 27);
        if v != expected {
            return Err(TransactionError::InvalidLegacyV { v });
        }
        Ok(U256::from(expected))
    }
}

/// An EIP-7702 delegation.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Authorization {
    #[serde(with = "crate::serde_utils::u64::hex_str")]
    pub chain_id: u64,
    pub address: String,
    #[serde(with = "crate::serde_utils::u64::hex_str")]
    pub nonce: u64,
    #[serde(flatten)]
    pub signature: Signature,
}

pub type AuthorizationList = Vec<Authorization>;

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct LegacyTransaction {
    /// Folded into `v` (or appended when unsigned) as described by EIP-155.
    pub chain_id: Option<u64>,
    pub nonce: u64,
    pub gas_price: U256,
    pub gas: u64,
    /// The recipient of the transaction.
    /// Create transactions contain a [`null`](ethwire_rlp::constants::RLP_NULL) value in this field.
    pub to: TxKind,
    pub value: U256,
    pub data: Bytes,
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct EIP2930Transaction {
    pub chain_id: u64,
    pub nonce: u64,
    pub gas_price: U256,
    pub gas: u64,
    pub to: TxKind,
    pub value: U256,
    pub data: Bytes,
    pub access_list: AccessList,
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct EIP1559Transaction {
    pub chain_id: u64,
    pub nonce: u64,
    pub max_priority_fee_per_gas: U256,
    pub max_fee_per_gas: U256,
    pub gas: u64,
    pub to: TxKind,
    pub value: U256,
    pub data: Bytes,
    pub access_list: AccessList,
}

/// A blob transaction. When `blobs` are given without versioned hashes or
/// sidecars, the missing parts are derived through a [`KzgBackend`].
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct EIP4844Transaction {
    pub chain_id: u64,
    pub nonce: u64,
    pub max_priority_fee_per_gas: U256,
    pub max_fee_per_gas: U256,
    pub gas: u64,
    pub to: TxKind,
    pub value: U256,
    pub data: Bytes,
    pub access_list: AccessList,
    pub max_fee_per_blob_gas: U256,
    pub blob_versioned_hashes: Option<Vec<Bytes>>,
    pub blobs: Option<Vec<Bytes>>,
    pub sidecars: Option<Vec<BlobSidecar>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct EIP7702Transaction {
    pub chain_id: u64,
    pub nonce: u64,
    pub max_priority_fee_per_gas: U256,
    pub max_fee_per_gas: U256,
    pub gas: u64,
    pub to: TxKind,
    pub value: U256,
    pub data: Bytes,
    pub access_list: AccessList,
    pub authorization_list: AuthorizationList,
}

/// An OP-Stack deposited transaction. It is never signed.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct DepositTransaction {
    pub source_hash: H256,
    pub from: String,
    pub to: TxKind,
    pub mint: U256,
    pub value: U256,
    pub gas: u64,
    pub is_system_tx: bool,
    pub data: Bytes,
}

impl Transaction {
    pub fn tx_type(&self) -> TxType {
        match self {
            Transaction::LegacyTransaction(_) => TxType::Legacy,
            Transaction::EIP2930Transaction(_) => TxType::EIP2930,
            Transaction::EIP1559Transaction(_) => TxType::EIP1559,
            Transaction::EIP4844Transaction(_) => TxType::EIP4844,
            Transaction::EIP7702Transaction(_) => TxType::EIP7702,
            Transaction::DepositTransaction(_) => TxType::Deposit,
        }
    }

    /// Runs the checks performed before serialization, stopping at the
    /// first violation.
    pub fn validate(&self) -> Result<(), TransactionError> {
        TransactionSerializer::new().validate(self)
    }
}

macro_rules! impl_from_for_transaction {
    ($($variant:ident),*) => {
        $(impl From<$variant> for Transaction {
            fn from(tx: $variant) -> Self {
                Transaction::$variant(tx)
            }
        })*
    };
}

impl_from_for_transaction!(
    LegacyTransaction,
    EIP2930Transaction,
    EIP1559Transaction,
    EIP4844Transaction,
    EIP7702Transaction,
    DepositTransaction
);

fn address_item(address: &str) -> Result<RLPItem, TransactionError> {
    Ok(RLPItem::from(hex_to_bytes(address, None)?))
}

/// Numbers bounded like plain JSON numbers (chain ids, nonces).
fn safe_number_item(value: u64) -> Result<RLPItem, TransactionError> {
    Ok(RLPItem::from(hex_to_bytes(&number_to_hex(value, None)?, None)?))
}

/// As [`safe_number_item`], with zero encoded as the empty string.
fn optional_number_item(value: u64) -> Result<RLPItem, TransactionError> {
    if value == 0 {
        return Ok(RLPItem::default());
    }
    safe_number_item(value)
}

fn typed_envelope(tx_type: TxType, payload: &RLPItem) -> Result<Vec<u8>, TransactionError> {
    let rlp = to_rlp(payload)?;
    let mut out = Vec::with_capacity(rlp.len() + 1);
    out.push(u8::from(tx_type));
    out.extend_from_slice(&rlp);
    Ok(out)
}

fn signature_items(signature: Option<&Signature>) -> Result<Vec<RLPItem>, TransactionError> {
    match signature {
        Some(signature) => Ok(signature.typed_items()?.into()),
        None => Ok(Vec::new()),
    }
}

/// Validates and encodes transactions into their wire envelopes.
#[derive(Clone, Copy)]
pub struct TransactionSerializer<'a> {
    kzg: Option<&'a dyn KzgBackend>,
    blob_version: u8,
    address_cache: &'a AddressCache,
}

impl Default for TransactionSerializer<'_> {
    fn default() -> Self {
        Self {
            kzg: None,
            blob_version: VERSIONED_HASH_VERSION_KZG,
            address_cache: AddressCache::global(),
        }
    }
}

impl<'a> TransactionSerializer<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_kzg(mut self, kzg: &'a dyn KzgBackend) -> Self {
        self.kzg = Some(kzg);
        self
    }

    pub fn with_config(mut self, config: &CodecConfig) -> Self {
        self.blob_version = config.blob_version;
        self
    }

    pub fn with_address_cache(mut self, address_cache: &'a AddressCache) -> Self {
        self.address_cache = address_cache;
        self
    }

    pub fn validate(&self, tx: &Transaction) -> Result<(), TransactionError> {
        match tx {
            Transaction::LegacyTransaction(tx) => {
                self.check_to(&tx.to)?;
                if tx.chain_id == Some(0) {
                    return Err(TransactionError::InvalidChainId { chain_id: 0 });
                }
                Ok(())
            }
            Transaction::EIP2930Transaction(tx) => {
                check_chain_id(tx.chain_id)?;
                self.check_to(&tx.to)
            }
            Transaction::EIP1559Transaction(tx) => self.check_fee_market(
                tx.chain_id,
                &tx.to,
                tx.max_priority_fee_per_gas,
                tx.max_fee_per_gas,
            ),
            Transaction::EIP4844Transaction(tx) => {
                if let Some(hashes) = &tx.blob_versioned_hashes {
                    self.check_versioned_hashes(hashes)?;
                }
                self.check_fee_market(
                    tx.chain_id,
                    &tx.to,
                    tx.max_priority_fee_per_gas,
                    tx.max_fee_per_gas,
                )
            }
            Transaction::EIP7702Transaction(tx) => {
                for authorization in &tx.authorization_list {
                    if !self.address_cache.is_address(&authorization.address, true) {
                        return Err(TransactionError::InvalidAddress {
                            address: authorization.address.clone(),
                        });
                    }
                }
                self.check_fee_market(
                    tx.chain_id,
                    &tx.to,
                    tx.max_priority_fee_per_gas,
                    tx.max_fee_per_gas,
                )
            }
            Transaction::DepositTransaction(tx) => {
                if !self.address_cache.is_address(&tx.from, true) {
                    return Err(TransactionError::InvalidAddress {
                        address: tx.from.clone(),
                    });
                }
                self.check_to(&tx.to)
            }
        }
    }

    fn check_to(&self, to: &TxKind) -> Result<(), TransactionError> {
        match to {
            TxKind::Call(address) if !self.address_cache.is_address(address, true) => {
                Err(TransactionError::InvalidAddress {
                    address: address.clone(),
                })
            }
            _ => Ok(()),
        }
    }

    fn check_fee_market(
        &self,
        chain_id: u64,
        to: &TxKind,
        max_priority_fee_per_gas: U256,
        max_fee_per_gas: U256,
    ) -> Result<(), TransactionError> {
        check_chain_id(chain_id)?;
        self.check_to(to)?;
        // an unset fee (zero) disables the comparison
        if !max_priority_fee_per_gas.is_zero()
            && !max_fee_per_gas.is_zero()
            && max_priority_fee_per_gas > max_fee_per_gas
        {
            return Err(TransactionError::TipAboveFeeCap {
                max_priority_fee_per_gas,
                max_fee_per_gas,
            });
        }
        Ok(())
    }

    fn check_versioned_hashes(&self, hashes: &[Bytes]) -> Result<(), TransactionError> {
        if hashes.is_empty() {
            return Err(TransactionError::EmptyBlob);
        }
        for hash in hashes {
            if hash.len() != 32 {
                return Err(TransactionError::InvalidVersionedHashSize {
                    hash: encode_hex(hash),
                    size: hash.len(),
                });
            }
            if hash[0] != self.blob_version {
                return Err(TransactionError::InvalidVersionedHashVersion {
                    hash: encode_hex(hash),
                    version: hash[0],
                    expected: self.blob_version,
                });
            }
        }
        Ok(())
    }

    /// Validates `tx` and encodes it, appending `signature` when given.
    /// Deposit transactions ignore the signature.
    pub fn serialize(&self, tx: &Transaction, signature: Option<&Signature>) -> Result<Bytes, TransactionError> {
        self.validate(tx)?;
        self.encode(tx, signature)
    }

    /// Encodes an already validated transaction.
    fn encode(&self, tx: &Transaction, signature: Option<&Signature>) -> Result<Bytes, TransactionError> {
        let encoded = match tx {
            Transaction::LegacyTransaction(tx) => self.encode_legacy(tx, signature)?,
            Transaction::EIP2930Transaction(tx) => self.encode_eip2930(tx, signature)?,
            Transaction::EIP1559Transaction(tx) => self.encode_eip1559(tx, signature)?,
            Transaction::EIP4844Transaction(tx) => self.encode_eip4844(tx, signature)?,
            Transaction::EIP7702Transaction(tx) => self.encode_eip7702(tx, signature)?,
            Transaction::DepositTransaction(tx) => self.encode_deposit(tx)?,
        };
        debug!(
            tx_type = %tx.tx_type(),
            signed = signature.is_some(),
            len = encoded.len(),
            "Serialized transaction"
        );
        Ok(Bytes::from(encoded))
    }

    pub fn serialize_hex(&self, tx: &Transaction, signature: Option<&Signature>) -> Result<String, TransactionError> {
        Ok(encode_hex(&self.serialize(tx, signature)?))
    }

    /// Serializes a loosely typed request. An explicit `signature` takes
    /// precedence over one embedded in the request.
    pub fn serialize_generic(
        &self,
        generic: GenericTransaction,
        signature: Option<&Signature>,
    ) -> Result<Bytes, TransactionError> {
        let embedded = generic.signature();
        let (tx, deferred) = generic.into_transaction()?;
        self.validate(&tx)?;
        if let Some(err) = deferred {
            return Err(err);
        }
        match signature {
            Some(signature) => self.encode(&tx, Some(signature)),
            None => self.encode(&tx, embedded?.as_ref()),
        }
    }

    fn encode_access_list(&self, access_list: &[AccessListItem]) -> Result<RLPItem, TransactionError> {
        let mut items = Vec::with_capacity(access_list.len());
        for item in access_list {
            if let Some(key) = item.storage_keys.iter().find(|key| key.len() != 32) {
                return Err(TransactionError::InvalidStorageKeySize {
                    storage_key: encode_hex(key),
                    size: key.len(),
                });
            }
            if !self.address_cache.is_address(&item.address, false) {
                return Err(TransactionError::InvalidAddress {
                    address: item.address.clone(),
                });
            }
            items.push(
                Encoder::new()
                    .encode_item(address_item(&item.address)?)
                    .encode_field(&item.storage_keys)
                    .finish(),
            );
        }
        Ok(RLPItem::List(items))
    }

    fn encode_authorization_list(&self, authorization_list: &[Authorization]) -> Result<RLPItem, TransactionError> {
        authorization_list
            .iter()
            .map(|authorization| {
                Ok(Encoder::new()
                    .encode_item(optional_number_item(authorization.chain_id)?)
                    .encode_item(address_item(&authorization.address)?)
                    .encode_item(optional_number_item(authorization.nonce)?)
                    .encode_items(authorization.signature.typed_items()?)
                    .finish())
            })
            .collect::<Result<Vec<_>, TransactionError>>()
            .map(RLPItem::List)
    }

    fn encode_legacy(&self, tx: &LegacyTransaction, signature: Option<&Signature>) -> Result<Vec<u8>, TransactionError> {
        let mut encoder = Encoder::new()
            .encode_item(optional_number_item(tx.nonce)?)
            .encode_field(&tx.gas_price)
            .encode_field(&tx.gas)
            .encode_item(tx.to.to_rlp_item()?)
            .encode_field(&tx.value)
            .encode_field(&tx.data);
        match (signature, tx.chain_id) {
            (Some(signature), chain_id) => {
                encoder = encoder
                    .encode_field(&signature.legacy_v(chain_id)?)
                    .encode_field(&signature.r)
                    .encode_field(&signature.s);
            }
            (None, Some(chain_id)) if chain_id > 0 => {
                encoder = encoder
                    .encode_item(safe_number_item(chain_id)?)
                    .encode_item(RLPItem::default())
                    .encode_item(RLPItem::default());
            }
            (None, _) => {}
        }
        Ok(to_rlp(&encoder.finish())?)
    }

    fn encode_eip2930(&self, tx: &EIP2930Transaction, signature: Option<&Signature>) -> Result<Vec<u8>, TransactionError> {
        let payload = Encoder::new()
            .encode_item(safe_number_item(tx.chain_id)?)
            .encode_item(optional_number_item(tx.nonce)?)
            .encode_field(&tx.gas_price)
            .encode_field(&tx.gas)
            .encode_item(tx.to.to_rlp_item()?)
            .encode_field(&tx.value)
            .encode_field(&tx.data)
            .encode_item(self.encode_access_list(&tx.access_list)?)
            .encode_items(signature_items(signature)?)
            .finish();
        typed_envelope(TxType::EIP2930, &payload)
    }

    fn encode_eip1559(&self, tx: &EIP1559Transaction, signature: Option<&Signature>) -> Result<Vec<u8>, TransactionError> {
        let payload = Encoder::new()
            .encode_item(safe_number_item(tx.chain_id)?)
            .encode_item(optional_number_item(tx.nonce)?)
            .encode_field(&tx.max_priority_fee_per_gas)
            .encode_field(&tx.max_fee_per_gas)
            .encode_field(&tx.gas)
            .encode_item(tx.to.to_rlp_item()?)
            .encode_field(&tx.value)
            .encode_field(&tx.data)
            .encode_item(self.encode_access_list(&tx.access_list)?)
            .encode_items(signature_items(signature)?)
            .finish();
        typed_envelope(TxType::EIP1559, &payload)
    }

    fn encode_eip4844(&self, tx: &EIP4844Transaction, signature: Option<&Signature>) -> Result<Vec<u8>, TransactionError> {
        let mut blob_versioned_hashes = tx.blob_versioned_hashes.clone();
        let mut sidecars = tx.sidecars.clone();
        if let Some(blobs) = &tx.blobs {
            if blob_versioned_hashes.is_none() || sidecars.is_none() {
                let kzg = self.kzg.ok_or(TransactionError::MissingKzg)?;
                let commitments = blobs_to_commitments(blobs, kzg)?;
                if blob_versioned_hashes.is_none() {
                    blob_versioned_hashes = Some(commitments_to_versioned_hashes(
                        &commitments,
                        self.blob_version,
                    ));
                }
                if sidecars.is_none() {
                    let proofs = blobs_to_proofs(blobs, &commitments, kzg)?;
                    sidecars = Some(to_blob_sidecars(blobs, &commitments, &proofs));
                }
            }
        }

        let fields = Encoder::new()
            .encode_item(safe_number_item(tx.chain_id)?)
            .encode_item(optional_number_item(tx.nonce)?)
            .encode_field(&tx.max_priority_fee_per_gas)
            .encode_field(&tx.max_fee_per_gas)
            .encode_field(&tx.gas)
            .encode_item(tx.to.to_rlp_item()?)
            .encode_field(&tx.value)
            .encode_field(&tx.data)
            .encode_item(self.encode_access_list(&tx.access_list)?)
            .encode_field(&tx.max_fee_per_blob_gas)
            .encode_field(&blob_versioned_hashes.unwrap_or_default())
            .encode_items(signature_items(signature)?)
            .finish();

        let payload = match sidecars {
            Some(sidecars) => {
                let (mut blobs, mut commitments, mut proofs) = (Vec::new(), Vec::new(), Vec::new());
                for sidecar in sidecars {
                    blobs.push(sidecar.blob);
                    commitments.push(sidecar.commitment);
                    proofs.push(sidecar.proof);
                }
                Encoder::new()
                    .encode_item(fields)
                    .encode_field(&blobs)
                    .encode_field(&commitments)
                    .encode_field(&proofs)
                    .finish()
            }
            None => fields,
        };
        typed_envelope(TxType::EIP4844, &payload)
    }

    fn encode_eip7702(&self, tx: &EIP7702Transaction, signature: Option<&Signature>) -> Result<Vec<u8>, TransactionError> {
        let payload = Encoder::new()
            .encode_item(safe_number_item(tx.chain_id)?)
            .encode_item(optional_number_item(tx.nonce)?)
            .encode_field(&tx.max_priority_fee_per_gas)
            .encode_field(&tx.max_fee_per_gas)
            .encode_field(&tx.gas)
            .encode_item(tx.to.to_rlp_item()?)
            .encode_field(&tx.value)
            .encode_field(&tx.data)
            .encode_item(self.encode_access_list(&tx.access_list)?)
            .encode_item(self.encode_authorization_list(&tx.authorization_list)?)
            .encode_items(signature_items(signature)?)
            .finish();
        typed_envelope(TxType::EIP7702, &payload)
    }

    fn encode_deposit(&self, tx: &DepositTransaction) -> Result<Vec<u8>, TransactionError> {
        let payload = Encoder::new()
            .encode_field(&tx.source_hash)
            .encode_item(address_item(&tx.from)?)
            .encode_item(tx.to.to_rlp_item()?)
            .encode_field(&tx.mint)
            .encode_field(&tx.value)
            .encode_field(&tx.gas)
            .encode_field(&tx.is_system_tx)
            .encode_field(&tx.data)
            .finish();
        typed_envelope(TxType::Deposit, &payload)
    }
}

fn check_chain_id(chain_id: u64) -> Result<(), TransactionError> {
    if chain_id == 0 {
        return Err(TransactionError::InvalidChainId { chain_id });
    }
    Ok(())
}

pub fn serialize_transaction(tx: &Transaction, signature: Option<&Signature>) -> Result<Bytes, TransactionError> {
    TransactionSerializer::new().serialize(tx, signature)
}

pub fn serialize_transaction_hex(tx: &Transaction, signature: Option<&Signature>) -> Result<String, TransactionError> {
    TransactionSerializer::new().serialize_hex(tx, signature)
}

pub fn serialize_generic_transaction(
    generic: GenericTransaction,
    signature: Option<&Signature>,
) -> Result<Bytes, TransactionError> {
    TransactionSerializer::new().serialize_generic(generic, signature)
}

mod serde_impl {
    use std::collections::HashMap;

    use ethereum_types::U512;
    use serde::{Deserializer, de::Error};
    use serde_json::Value;

    use super::*;
    use crate::utils::unit::format_gwei;

    impl Serialize for TxType {
        fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: serde::Serializer,
        {
            serializer.serialize_str(&format!("{:#x}", u8::from(*self)))
        }
    }

    impl<'de> Deserialize<'de> for TxType {
        fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where
            D: serde::Deserializer<'de>,
        {
            let str = String::deserialize(deserializer)?;
            if let Some(tx_type) = TxType::from_name(&str) {
                return Ok(tx_type);
            }
            let tx_num = u8::from_str_radix(str.trim_start_matches("0x"), 16).map_err(|_| {
                serde::de::Error::custom(format!("Failed to deserialize hex value {str}"))
            })?;
            TxType::from_u8(tx_num).ok_or_else(|| {
                serde::de::Error::custom(format!("Invalid transaction type {tx_num}"))
            })
        }
    }

    /// A transaction request as found in JSON, with every field optional.
    /// The envelope type is inferred from the fields present.
    #[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
    #[serde(rename_all = "camelCase", default)]
    pub struct GenericTransaction {
        pub r#type: Option<TxType>,
        #[serde(with = "crate::serde_utils::u64::hex_str_opt")]
        pub chain_id: Option<u64>,
        #[serde(with = "crate::serde_utils::u64::hex_str_opt")]
        pub nonce: Option<u64>,
        #[serde(with = "crate::serde_utils::u64::hex_str_opt")]
        pub gas: Option<u64>,
        pub to: Option<String>,
        pub from: Option<String>,
        #[serde(with = "crate::serde_utils::u256::hex_str_opt")]
        pub value: Option<U256>,
        #[serde(deserialize_with = "crate::serde_utils::u512::hex_str_opt::deserialize")]
        pub gas_price: Option<U512>,
        #[serde(deserialize_with = "crate::serde_utils::u512::hex_str_opt::deserialize")]
        pub max_fee_per_gas: Option<U512>,
        #[serde(deserialize_with = "crate::serde_utils::u512::hex_str_opt::deserialize")]
        pub max_priority_fee_per_gas: Option<U512>,
        #[serde(with = "crate::serde_utils::u256::hex_str_opt")]
        pub max_fee_per_blob_gas: Option<U256>,
        pub access_list: Option<Vec<AccessListItem>>,
        pub authorization_list: Option<Vec<Authorization>>,
        #[serde(deserialize_with = "crate::serde_utils::bytes::vec_opt::deserialize")]
        pub blob_versioned_hashes: Option<Vec<Bytes>>,
        #[serde(deserialize_with = "crate::serde_utils::bytes::vec_opt::deserialize")]
        pub blobs: Option<Vec<Bytes>>,
        pub sidecars: Option<Vec<BlobSidecar>>,
        pub source_hash: Option<H256>,
        #[serde(with = "crate::serde_utils::u256::hex_str_opt")]
        pub mint: Option<U256>,
        pub is_system_tx: Option<bool>,
        #[serde(with = "crate::serde_utils::u256::hex_str_opt")]
        pub r: Option<U256>,
        #[serde(with = "crate::serde_utils::u256::hex_str_opt")]
        pub s: Option<U256>,
        #[serde(with = "crate::serde_utils::u64::hex_str_opt")]
        pub v: Option<u64>,
        #[serde(with = "crate::serde_utils::u8::hex_str_opt")]
        pub y_parity: Option<u8>,
        // rename is needed here so we dont attempt to deserialize the `input` field rather than the remainder of the fields
        #[serde(flatten, rename = "input_or_data", deserialize_with = "deserialize_input")]
        pub input: Bytes,
    }

    /// Custom deserialization function to parse either `data` or `input` fields, or both as long as they have the same value
    pub fn deserialize_input<'de, D>(deserializer: D) -> Result<Bytes, D::Error>
    where
        D: Deserializer<'de>,
    {
        let variables = HashMap::<String, Value>::deserialize(deserializer)?;
        let data = variables.get("data").filter(|value| !value.is_null());
        let input = variables.get("input").filter(|value| !value.is_null());
        let value = match (data, input) {
            (None, None) => return Ok(Bytes::new()),
            (None, Some(val)) | (Some(val), None) => val,
            (Some(val_a), Some(val_b)) => {
                if val_a == val_b {
                    val_a
                } else {
                    return Err(D::Error::custom(
                        "Transaction has both `data` and `input` fields with different values",
                    ));
                }
            }
        };
        let value = String::deserialize(value).map_err(D::Error::custom)?;
        crate::serde_utils::bytes::decode_hex(&value)
    }

    /// A fee that fits 256 bits, or the oversized value.
    fn split_fee(fee: Option<U512>) -> Result<U256, U512> {
        match fee {
            None => Ok(U256::zero()),
            Some(fee) => U256::try_from(fee).map_err(|_| fee),
        }
    }

    /// Zero fees count as unset on gas-price envelopes.
    fn fee_is_set(fee: Option<U512>) -> bool {
        fee.is_some_and(|fee| !fee.is_zero())
    }

    fn fee_cap_too_high(fee: U512) -> TransactionError {
        TransactionError::FeeCapTooHigh {
            max_fee_per_gas: format_gwei(fee),
        }
    }

    impl GenericTransaction {
        pub fn is_deposit(&self) -> bool {
            self.r#type == Some(TxType::Deposit) || self.source_hash.is_some()
        }

        /// The explicit type if any, otherwise the type implied by the
        /// fields present, checked from the newest envelope down.
        pub fn tx_type(&self) -> Result<TxType, TransactionError> {
            if self.is_deposit() {
                return Ok(TxType::Deposit);
            }
            if let Some(tx_type) = self.r#type {
                return Ok(tx_type);
            }
            if self.authorization_list.is_some() {
                return Ok(TxType::EIP7702);
            }
            if self.blobs.is_some()
                || self.blob_versioned_hashes.is_some()
                || self.max_fee_per_blob_gas.is_some()
                || self.sidecars.is_some()
            {
                return Ok(TxType::EIP4844);
            }
            if self.max_fee_per_gas.is_some() || self.max_priority_fee_per_gas.is_some() {
                return Ok(TxType::EIP1559);
            }
            match (self.gas_price, &self.access_list) {
                (Some(_), Some(_)) => Ok(TxType::EIP2930),
                (Some(_), None) => Ok(TxType::Legacy),
                (None, _) => Err(TransactionError::InvalidSerializableTransaction),
            }
        }

        /// The embedded signature; `None` when no signature field is set.
        pub fn signature(&self) -> Result<Option<Signature>, TransactionError> {
            match (self.r, self.s, self.v, self.y_parity) {
                (None, None, None, None) => Ok(None),
                (Some(r), Some(s), v, y_parity) if v.is_some() || y_parity.is_some() => {
                    let signature = Signature { r, s, v, y_parity };
                    signature.check()?;
                    Ok(Some(signature))
                }
                _ => Err(TransactionError::InvalidSignature(
                    "`r`, `s` and one of `v` or `yParity` must be set together".to_owned(),
                )),
            }
        }

        /// Builds the typed transaction. Violations that a typed transaction
        /// cannot carry (oversized fees, fee fields on a gas-price envelope)
        /// are returned separately so they can be reported after the typed
        /// checks that precede them.
        pub(crate) fn into_transaction(
            self,
        ) -> Result<(Transaction, Option<TransactionError>), TransactionError> {
            let tx_type = self.tx_type()?;
            let to = TxKind::from(self.to);
            let nonce = self.nonce.unwrap_or_default();
            let gas = self.gas.unwrap_or_default();
            let value = self.value.unwrap_or_default();
            let chain_id = self.chain_id.unwrap_or_default();
            let access_list = self.access_list.unwrap_or_default();
            let max_priority_fee_per_gas =
                split_fee(self.max_priority_fee_per_gas).unwrap_or(U256::MAX);
            let max_fee_per_gas = split_fee(self.max_fee_per_gas);
            let gas_price = split_fee(self.gas_price);

            let (tx, deferred): (Transaction, _) = match tx_type {
                TxType::Legacy => {
                    let misused = fee_is_set(self.max_fee_per_gas)
                        || fee_is_set(self.max_priority_fee_per_gas);
                    let deferred = if misused {
                        Some(TransactionError::InvalidAttribute { tx_type: "Legacy" })
                    } else {
                        gas_price.err().map(fee_cap_too_high)
                    };
                    let tx = LegacyTransaction {
                        chain_id: self.chain_id,
                        nonce,
                        gas_price: gas_price.unwrap_or_default(),
                        gas,
                        to,
                        value,
                        data: self.input,
                    };
                    (tx.into(), deferred)
                }
                TxType::EIP2930 => {
                    let misused = fee_is_set(self.max_fee_per_gas)
                        || fee_is_set(self.max_priority_fee_per_gas);
                    let deferred = if misused {
                        Some(TransactionError::InvalidAttribute { tx_type: "EIP-2930" })
                    } else {
                        gas_price.err().map(fee_cap_too_high)
                    };
                    let tx = EIP2930Transaction {
                        chain_id,
                        nonce,
                        gas_price: gas_price.unwrap_or_default(),
                        gas,
                        to,
                        value,
                        data: self.input,
                        access_list,
                    };
                    (tx.into(), deferred)
                }
                TxType::EIP1559 => {
                    let tx = EIP1559Transaction {
                        chain_id,
                        nonce,
                        max_priority_fee_per_gas,
                        max_fee_per_gas: max_fee_per_gas.unwrap_or_default(),
                        gas,
                        to,
                        value,
                        data: self.input,
                        access_list,
                    };
                    (tx.into(), max_fee_per_gas.err().map(fee_cap_too_high))
                }
                TxType::EIP4844 => {
                    let tx = EIP4844Transaction {
                        chain_id,
                        nonce,
                        max_priority_fee_per_gas,
                        max_fee_per_gas: max_fee_per_gas.unwrap_or_default(),
                        gas,
                        to,
                        value,
                        data: self.input,
                        access_list,
                        max_fee_per_blob_gas: self.max_fee_per_blob_gas.unwrap_or_default(),
                        blob_versioned_hashes: self.blob_versioned_hashes,
                        blobs: self.blobs,
                        sidecars: self.sidecars,
                    };
                    (tx.into(), max_fee_per_gas.err().map(fee_cap_too_high))
                }
                TxType::EIP7702 => {
                    let tx = EIP7702Transaction {
                        chain_id,
                        nonce,
                        max_priority_fee_per_gas,
                        max_fee_per_gas: max_fee_per_gas.unwrap_or_default(),
                        gas,
                        to,
                        value,
                        data: self.input,
                        access_list,
                        authorization_list: self.authorization_list.unwrap_or_default(),
                    };
                    (tx.into(), max_fee_per_gas.err().map(fee_cap_too_high))
                }
                TxType::Deposit => {
                    let tx = DepositTransaction {
                        source_hash: self.source_hash.unwrap_or_default(),
                        from: self.from.unwrap_or_default(),
                        to,
                        mint: self.mint.unwrap_or_default(),
                        value,
                        gas,
                        is_system_tx: self.is_system_tx.unwrap_or_default(),
                        data: self.input,
                    };
                    (tx.into(), None)
                }
            };
            Ok((tx, deferred))
        }
    }

    impl TryFrom<GenericTransaction> for Transaction {
        type Error = TransactionError;

        fn try_from(value: GenericTransaction) -> Result<Self, Self::Error> {
            let (tx, deferred) = value.into_transaction()?;
            if let Some(err) = deferred {
                tx.validate()?;
                return Err(err);
            }
            Ok(tx)
        }
    }
}
