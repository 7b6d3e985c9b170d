//! # Ledger Headers and State
//!
//! Ledger headers, the polymorphic state entries keyed by `LedgerEntryType`,
//! and the per-account listings (trust lines, offers, order-book offers).

use crate::errors::ModelError;
use crate::primitives::{Account, Amount, Currency, Drops, Hash256, RippleTime, Value};
use crate::tagged::{decode_as, discriminator};
use crate::transactions::TransactionWithMetaData;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value as Json};
use serde_with::{serde_as, DisplayFromStr, PickFirst};

/// Name of the ledger entry discriminator field.
pub const LEDGER_ENTRY_TYPE_FIELD: &str = "LedgerEntryType";

// =============================================================================
// LEDGER HEADER
// =============================================================================

/// One transaction of a ledger: only its hash, or the full body with
/// metadata when the ledger was requested with `expand`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LedgerTransaction {
    Hash(Hash256),
    Full(Box<TransactionWithMetaData>),
}

impl LedgerTransaction {
    pub fn hash(&self) -> Option<&Hash256> {
        match self {
            Self::Hash(hash) => Some(hash),
            Self::Full(tx) => tx.hash(),
        }
    }
}

/// A ledger header as rendered by `ledger` and `ledger_header`.
///
/// The node renders `ledger_index` as a number or as numeric text depending
/// on the command; both are accepted.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Ledger {
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub ledger_index: u32,
    /// Legacy duplicate of `ledger_index` that nodes still send.
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    #[serde(rename = "seqNum")]
    pub seq_num: Option<u32>,
    #[serde(default)]
    pub ledger_hash: Option<Hash256>,
    #[serde(default)]
    pub parent_hash: Option<Hash256>,
    #[serde(default)]
    pub account_hash: Option<Hash256>,
    #[serde(default)]
    pub transaction_hash: Option<Hash256>,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub total_coins: Option<u64>,
    #[serde(default)]
    pub close_time: Option<RippleTime>,
    #[serde(default)]
    pub parent_close_time: Option<RippleTime>,
    #[serde(default)]
    pub close_time_resolution: Option<u8>,
    #[serde(default)]
    pub close_flags: Option<u8>,
    #[serde(default)]
    pub closed: bool,
    #[serde(default)]
    pub accepted: bool,
    #[serde(default)]
    pub transactions: Vec<LedgerTransaction>,
}

impl Ledger {
    pub fn total_coins(&self) -> Option<Drops> {
        self.total_coins.map(Drops)
    }
}

// =============================================================================
// LEDGER ENTRIES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LedgerEntryKind {
    AccountRoot,
    RippleState,
    Offer,
    DirectoryNode,
    Other(String),
}

impl LedgerEntryKind {
    fn from_name(name: &str) -> Self {
        match name {
            "AccountRoot" => Self::AccountRoot,
            "RippleState" => Self::RippleState,
            "Offer" => Self::Offer,
            "DirectoryNode" => Self::DirectoryNode,
            other => Self::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AccountRoot {
    pub account: Account,
    pub balance: Drops,
    pub sequence: u32,
    #[serde(default)]
    pub owner_count: u32,
    #[serde(default)]
    pub flags: u32,
    #[serde(rename = "PreviousTxnID", default)]
    pub previous_txn_id: Option<Hash256>,
    #[serde(default)]
    pub previous_txn_lgr_seq: Option<u32>,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(rename = "index", default)]
    pub index: Option<Hash256>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RippleState {
    pub balance: Amount,
    pub high_limit: Amount,
    pub low_limit: Amount,
    #[serde(default)]
    pub flags: u32,
    #[serde(rename = "index", default)]
    pub index: Option<Hash256>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Offer {
    pub account: Account,
    pub sequence: u32,
    pub taker_pays: Amount,
    pub taker_gets: Amount,
    #[serde(default)]
    pub book_directory: Option<Hash256>,
    #[serde(default)]
    pub expiration: Option<u32>,
    #[serde(default)]
    pub flags: u32,
    #[serde(rename = "index", default)]
    pub index: Option<Hash256>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DirectoryNode {
    #[serde(default)]
    pub indexes: Vec<Hash256>,
    pub root_index: Hash256,
    #[serde(default)]
    pub owner: Option<Account>,
    #[serde(default)]
    pub flags: u32,
    #[serde(rename = "index", default)]
    pub index: Option<Hash256>,
}

/// A state entry of a kind without a dedicated shape.
#[derive(Debug, Clone, PartialEq)]
pub struct OtherEntry {
    pub kind: String,
    pub fields: Map<String, Json>,
}

/// A ledger state entry of any kind.
#[derive(Debug, Clone, PartialEq)]
pub enum LedgerEntry {
    AccountRoot(AccountRoot),
    RippleState(RippleState),
    Offer(Offer),
    DirectoryNode(DirectoryNode),
    Other(OtherEntry),
}

impl LedgerEntry {
    pub fn from_value(value: Json) -> Result<Self, ModelError> {
        let name = discriminator(&value, LEDGER_ENTRY_TYPE_FIELD)?;
        Ok(match LedgerEntryKind::from_name(&name) {
            LedgerEntryKind::AccountRoot => Self::AccountRoot(decode_as(&name, value)?),
            LedgerEntryKind::RippleState => Self::RippleState(decode_as(&name, value)?),
            LedgerEntryKind::Offer => Self::Offer(decode_as(&name, value)?),
            LedgerEntryKind::DirectoryNode => Self::DirectoryNode(decode_as(&name, value)?),
            LedgerEntryKind::Other(kind) => {
                let Json::Object(mut fields) = value else {
                    return Err(ModelError::body(kind, "expected a JSON object"));
                };
                fields.remove(LEDGER_ENTRY_TYPE_FIELD);
                Self::Other(OtherEntry { kind, fields })
            }
        })
    }

    pub fn kind(&self) -> LedgerEntryKind {
        match self {
            Self::AccountRoot(_) => LedgerEntryKind::AccountRoot,
            Self::RippleState(_) => LedgerEntryKind::RippleState,
            Self::Offer(_) => LedgerEntryKind::Offer,
            Self::DirectoryNode(_) => LedgerEntryKind::DirectoryNode,
            Self::Other(other) => LedgerEntryKind::Other(other.kind.clone()),
        }
    }
}

impl<'de> Deserialize<'de> for LedgerEntry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Json::deserialize(deserializer)?;
        LedgerEntry::from_value(value).map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// ACCOUNT LISTINGS
// =============================================================================

/// One trust line as listed by `account_lines`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AccountLine {
    pub account: Account,
    pub balance: Value,
    pub currency: Currency,
    pub limit: Value,
    pub limit_peer: Value,
    #[serde(default)]
    pub quality_in: u32,
    #[serde(default)]
    pub quality_out: u32,
    #[serde(default)]
    pub no_ripple: bool,
    #[serde(default)]
    pub no_ripple_peer: bool,
    #[serde(default)]
    pub freeze: bool,
}

/// One offer as listed by `account_offers`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AccountOffer {
    #[serde(default)]
    pub flags: u32,
    pub seq: u32,
    pub taker_gets: Amount,
    pub taker_pays: Amount,
    #[serde(default)]
    pub quality: Option<String>,
    #[serde(default)]
    pub expiration: Option<u32>,
}

/// An order-book offer as returned by `book_offers`: the offer entry plus
/// the funding view computed by the node.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OrderBookOffer {
    #[serde(flatten)]
    pub offer: Offer,
    #[serde(default)]
    pub owner_funds: Option<Value>,
    #[serde(default)]
    pub quality: Option<String>,
    #[serde(default)]
    pub taker_gets_funded: Option<Amount>,
    #[serde(default)]
    pub taker_pays_funded: Option<Amount>,
}
