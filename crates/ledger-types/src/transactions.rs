//! # Transactions
//!
//! Transaction bodies form an open set selected by the `TransactionType`
//! field. [`Transaction::from_value`] is the kind-dispatching decoder: it reads
//! the discriminator first and then decodes the whole payload into the shape
//! registered for that kind. Kinds without a dedicated shape decode into
//! [`OtherTransaction`], which keeps every field.

use crate::errors::ModelError;
use crate::paths::PathSet;
use crate::primitives::{Account, Amount, Drops, Hash256, RippleTime, VariableLength};
use crate::tagged::{decode_as, discriminator, with_discriminator};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value as Json};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Name of the transaction discriminator field.
pub const TRANSACTION_TYPE_FIELD: &str = "TransactionType";

// =============================================================================
// DISCRIMINATOR
// =============================================================================

/// Transaction kind as named by the `TransactionType` field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TransactionKind {
    Payment,
    OfferCreate,
    OfferCancel,
    TrustSet,
    AccountSet,
    OracleSet,
    OracleDelete,
    /// Any kind without a dedicated shape.
    Other(String),
}

impl TransactionKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Payment => "Payment",
            Self::OfferCreate => "OfferCreate",
            Self::OfferCancel => "OfferCancel",
            Self::TrustSet => "TrustSet",
            Self::AccountSet => "AccountSet",
            Self::OracleSet => "OracleSet",
            Self::OracleDelete => "OracleDelete",
            Self::Other(name) => name,
        }
    }
}

impl FromStr for TransactionKind {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "Payment" => Self::Payment,
            "OfferCreate" => Self::OfferCreate,
            "OfferCancel" => Self::OfferCancel,
            "TrustSet" => Self::TrustSet,
            "AccountSet" => Self::AccountSet,
            "OracleSet" => Self::OracleSet,
            "OracleDelete" => Self::OracleDelete,
            other => Self::Other(other.to_string()),
        })
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// BODIES
// =============================================================================

/// Fields shared by every transaction kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TxCommon {
    pub account: Account,
    pub fee: Drops,
    pub sequence: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flags: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_ledger_sequence: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signing_pub_key: Option<VariableLength>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub txn_signature: Option<VariableLength>,
    #[serde(rename = "hash", default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<Hash256>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Payment {
    #[serde(flatten)]
    pub common: TxCommon,
    pub amount: Amount,
    pub destination: Account,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_tag: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub send_max: Option<Amount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deliver_min: Option<Amount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paths: Option<PathSet>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OfferCreate {
    #[serde(flatten)]
    pub common: TxCommon,
    pub taker_pays: Amount,
    pub taker_gets: Amount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offer_sequence: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OfferCancel {
    #[serde(flatten)]
    pub common: TxCommon,
    pub offer_sequence: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TrustSet {
    #[serde(flatten)]
    pub common: TxCommon,
    pub limit_amount: Amount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality_in: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality_out: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AccountSet {
    #[serde(flatten)]
    pub common: TxCommon,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<VariableLength>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set_flag: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clear_flag: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transfer_rate: Option<u32>,
}

/// One price quote of an oracle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PriceData {
    pub base_asset: String,
    pub quote_asset: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<u8>,
}

/// Array wrapper used by the ledger's object notation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceDataEntry {
    #[serde(rename = "PriceData")]
    pub price_data: PriceData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OracleSet {
    #[serde(flatten)]
    pub common: TxCommon,
    #[serde(rename = "OracleDocumentID")]
    pub oracle_document_id: u32,
    pub last_update_time: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<VariableLength>,
    #[serde(rename = "URI", default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<VariableLength>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_class: Option<VariableLength>,
    #[serde(default)]
    pub price_data_series: Vec<PriceDataEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OracleDelete {
    #[serde(flatten)]
    pub common: TxCommon,
    #[serde(rename = "OracleDocumentID")]
    pub oracle_document_id: u32,
}

/// A transaction of a kind without a dedicated shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OtherTransaction {
    #[serde(skip)]
    pub kind: String,
    #[serde(flatten)]
    pub common: TxCommon,
    #[serde(flatten)]
    pub fields: Map<String, Json>,
}

// =============================================================================
// POLYMORPHIC TRANSACTION
// =============================================================================

/// A transaction body of any kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Transaction {
    Payment(Payment),
    OfferCreate(OfferCreate),
    OfferCancel(OfferCancel),
    TrustSet(TrustSet),
    AccountSet(AccountSet),
    OracleSet(OracleSet),
    OracleDelete(OracleDelete),
    Other(OtherTransaction),
}

impl Transaction {
    /// Decodes a transaction body, choosing its shape from `TransactionType`.
    pub fn from_value(mut value: Json) -> Result<Self, ModelError> {
        let name = discriminator(&value, TRANSACTION_TYPE_FIELD)?;
        let kind: TransactionKind = match name.parse() {
            Ok(kind) => kind,
            Err(never) => match never {},
        };
        let tx = match kind {
            TransactionKind::Payment => Self::Payment(decode_as(&name, value)?),
            TransactionKind::OfferCreate => Self::OfferCreate(decode_as(&name, value)?),
            TransactionKind::OfferCancel => Self::OfferCancel(decode_as(&name, value)?),
            TransactionKind::TrustSet => Self::TrustSet(decode_as(&name, value)?),
            TransactionKind::AccountSet => Self::AccountSet(decode_as(&name, value)?),
            TransactionKind::OracleSet => Self::OracleSet(decode_as(&name, value)?),
            TransactionKind::OracleDelete => Self::OracleDelete(decode_as(&name, value)?),
            TransactionKind::Other(_) => {
                if let Json::Object(map) = &mut value {
                    map.remove(TRANSACTION_TYPE_FIELD);
                }
                let mut other: OtherTransaction = decode_as(&name, value)?;
                other.kind = name;
                Self::Other(other)
            }
        };
        Ok(tx)
    }

    pub fn kind(&self) -> TransactionKind {
        match self {
            Self::Payment(_) => TransactionKind::Payment,
            Self::OfferCreate(_) => TransactionKind::OfferCreate,
            Self::OfferCancel(_) => TransactionKind::OfferCancel,
            Self::TrustSet(_) => TransactionKind::TrustSet,
            Self::AccountSet(_) => TransactionKind::AccountSet,
            Self::OracleSet(_) => TransactionKind::OracleSet,
            Self::OracleDelete(_) => TransactionKind::OracleDelete,
            Self::Other(other) => TransactionKind::Other(other.kind.clone()),
        }
    }

    pub fn common(&self) -> &TxCommon {
        match self {
            Self::Payment(tx) => &tx.common,
            Self::OfferCreate(tx) => &tx.common,
            Self::OfferCancel(tx) => &tx.common,
            Self::TrustSet(tx) => &tx.common,
            Self::AccountSet(tx) => &tx.common,
            Self::OracleSet(tx) => &tx.common,
            Self::OracleDelete(tx) => &tx.common,
            Self::Other(tx) => &tx.common,
        }
    }

    pub fn hash(&self) -> Option<&Hash256> {
        self.common().hash.as_ref()
    }

    fn to_value(&self) -> Result<Json, serde_json::Error> {
        let kind = self.kind();
        let field = TRANSACTION_TYPE_FIELD;
        match self {
            Self::Payment(tx) => with_discriminator(tx, field, kind.as_str()),
            Self::OfferCreate(tx) => with_discriminator(tx, field, kind.as_str()),
            Self::OfferCancel(tx) => with_discriminator(tx, field, kind.as_str()),
            Self::TrustSet(tx) => with_discriminator(tx, field, kind.as_str()),
            Self::AccountSet(tx) => with_discriminator(tx, field, kind.as_str()),
            Self::OracleSet(tx) => with_discriminator(tx, field, kind.as_str()),
            Self::OracleDelete(tx) => with_discriminator(tx, field, kind.as_str()),
            Self::Other(tx) => with_discriminator(tx, field, kind.as_str()),
        }
    }
}

impl<'de> Deserialize<'de> for Transaction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Json::deserialize(deserializer)?;
        Transaction::from_value(value).map_err(serde::de::Error::custom)
    }
}

impl Serialize for Transaction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value()
            .map_err(serde::ser::Error::custom)?
            .serialize(serializer)
    }
}

// =============================================================================
// METADATA
// =============================================================================

/// Engine result code such as `tesSUCCESS` or `tecUNFUNDED_OFFER`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionResult(pub String);

impl TransactionResult {
    pub fn is_success(&self) -> bool {
        self.0 == "tesSUCCESS"
    }

    /// `tec` results claim a fee and are recorded in a ledger.
    pub fn is_claimed(&self) -> bool {
        self.0.starts_with("tec")
    }
}

impl fmt::Display for TransactionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// State change applied to one ledger entry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NodeEffect {
    pub ledger_entry_type: String,
    pub ledger_index: Hash256,
    #[serde(default)]
    pub final_fields: Option<Map<String, Json>>,
    #[serde(default)]
    pub previous_fields: Option<Map<String, Json>>,
    #[serde(default)]
    pub new_fields: Option<Map<String, Json>>,
    #[serde(rename = "PreviousTxnID", default)]
    pub previous_txn_id: Option<Hash256>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub enum AffectedNode {
    CreatedNode(NodeEffect),
    ModifiedNode(NodeEffect),
    DeletedNode(NodeEffect),
}

impl AffectedNode {
    pub fn effect(&self) -> &NodeEffect {
        match self {
            Self::CreatedNode(e) | Self::ModifiedNode(e) | Self::DeletedNode(e) => e,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MetaData {
    #[serde(default)]
    pub affected_nodes: Vec<AffectedNode>,
    #[serde(default)]
    pub transaction_index: u32,
    pub transaction_result: TransactionResult,
}

// =============================================================================
// TRANSACTION WITH METADATA
// =============================================================================

/// A transaction body together with its execution metadata.
///
/// Accepts both shapes the node emits: the flat one (`tx`, `ledger` with
/// `expand`) where body fields sit at the top level next to `meta` or
/// `metaData`, and the nested one (`account_tx`) where the body sits under
/// `tx` or `tx_json`.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionWithMetaData {
    pub transaction: Transaction,
    pub meta: Option<MetaData>,
    pub date: Option<RippleTime>,
    pub ledger_index: Option<u32>,
    pub hash: Option<Hash256>,
}

impl TransactionWithMetaData {
    pub fn from_value(value: Json) -> Result<Self, ModelError> {
        let Json::Object(mut outer) = value else {
            return Err(ModelError::body("transaction", "expected a JSON object"));
        };
        let meta = outer.remove("meta").or_else(|| outer.remove("metaData"));
        let body = match outer.remove("tx").or_else(|| outer.remove("tx_json")) {
            Some(Json::Object(inner)) => inner,
            Some(_) => return Err(ModelError::body("transaction", "tx is not an object")),
            None => std::mem::take(&mut outer),
        };

        let date = pick(&mut outer, &body, "date")
            .map(|v| decode_as::<RippleTime>("date", v))
            .transpose()?;
        let ledger_index = pick(&mut outer, &body, "ledger_index")
            .map(|v| decode_as::<u32>("ledger_index", v))
            .transpose()?;
        let hash = pick(&mut outer, &body, "hash")
            .map(|v| decode_as::<Hash256>("hash", v))
            .transpose()?;
        let meta = meta
            .map(|v| decode_as::<MetaData>("meta", v))
            .transpose()?;
        let transaction = Transaction::from_value(Json::Object(body))?;

        Ok(Self {
            transaction,
            meta,
            date,
            ledger_index,
            hash,
        })
    }

    pub fn hash(&self) -> Option<&Hash256> {
        self.hash.as_ref().or_else(|| self.transaction.hash())
    }

    pub fn kind(&self) -> TransactionKind {
        self.transaction.kind()
    }
}

impl<'de> Deserialize<'de> for TransactionWithMetaData {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Json::deserialize(deserializer)?;
        TransactionWithMetaData::from_value(value).map_err(serde::de::Error::custom)
    }
}

/// Envelope field from the outer object, falling back to the body.
fn pick(outer: &mut Map<String, Json>, body: &Map<String, Json>, name: &str) -> Option<Json> {
    outer
        .remove(name)
        .or_else(|| body.get(name).cloned())
        .filter(|v| !v.is_null())
}
