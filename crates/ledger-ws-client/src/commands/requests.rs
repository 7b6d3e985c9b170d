//! Request parameters, one type per command kind.
//!
//! These carry only the kind-specific fields; `id` and `command` are added by
//! the envelope at issue time.

use crate::commands::pagination::Marker;
use ledger_types::{Account, Amount, Asset, Hash256};
use serde::{Serialize, Serializer};
use std::fmt;

// =============================================================================
// LEDGER SELECTOR
// =============================================================================

/// Which ledger a command reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LedgerSelector {
    /// Most recent ledger validated by consensus
    #[default]
    Validated,
    /// Most recent closed ledger, possibly not yet validated
    Closed,
    /// The open ledger
    Current,
    Sequence(u32),
    Hash(Hash256),
}

impl Serialize for LedgerSelector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Validated => serializer.serialize_str("validated"),
            Self::Closed => serializer.serialize_str("closed"),
            Self::Current => serializer.serialize_str("current"),
            Self::Sequence(seq) => serializer.serialize_u32(*seq),
            Self::Hash(hash) => serializer.collect_str(hash),
        }
    }
}

impl fmt::Display for LedgerSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validated => f.write_str("validated"),
            Self::Closed => f.write_str("closed"),
            Self::Current => f.write_str("current"),
            Self::Sequence(seq) => write!(f, "{seq}"),
            Self::Hash(hash) => write!(f, "{hash}"),
        }
    }
}

impl From<u32> for LedgerSelector {
    fn from(seq: u32) -> Self {
        Self::Sequence(seq)
    }
}

impl From<Hash256> for LedgerSelector {
    fn from(hash: Hash256) -> Self {
        Self::Hash(hash)
    }
}

fn is_false(b: &bool) -> bool {
    !*b
}

// =============================================================================
// TRANSACTIONS
// =============================================================================

/// `account_tx`: transactions affecting an account, paginated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountTxRequest {
    pub account: Account,
    /// `-1` means the earliest available ledger
    #[serde(rename = "ledger_index_min")]
    pub min_ledger: i64,
    /// `-1` means the most recent validated ledger
    #[serde(rename = "ledger_index_max")]
    pub max_ledger: i64,
    #[serde(skip_serializing_if = "is_false")]
    pub binary: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub forward: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<Marker>,
}

impl AccountTxRequest {
    /// All validated history of `account`, `page_size` entries per page.
    pub fn new(account: Account, page_size: u32) -> Self {
        Self {
            account,
            min_ledger: -1,
            max_ledger: -1,
            binary: false,
            forward: false,
            limit: Some(page_size),
            marker: None,
        }
    }

    pub fn ledger_range(mut self, min_ledger: i64, max_ledger: i64) -> Self {
        self.min_ledger = min_ledger;
        self.max_ledger = max_ledger;
        self
    }
}

/// `tx`: one transaction by hash.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TxRequest {
    pub transaction: Hash256,
}

/// `submit`: a signed transaction blob.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmitRequest {
    /// Hex-encoded signed transaction
    pub tx_blob: String,
}

// =============================================================================
// LEDGERS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerRequest {
    pub ledger_index: LedgerSelector,
    pub accounts: bool,
    pub transactions: bool,
    pub expand: bool,
}

impl LedgerRequest {
    /// Ledger with its transactions expanded to full bodies with metadata.
    pub fn expanded(ledger_index: LedgerSelector) -> Self {
        Self {
            ledger_index,
            accounts: false,
            transactions: true,
            expand: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerHeaderRequest {
    pub ledger: LedgerSelector,
}

/// `ledger_data`: state entries decoded to JSON, paginated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerDataRequest {
    pub ledger: LedgerSelector,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<Marker>,
}

/// `ledger_data` with `binary: true`: state entries as hex blobs, paginated.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryLedgerDataRequest {
    pub ledger: LedgerSelector,
    pub limit: Option<u32>,
    pub marker: Option<Marker>,
}

impl Serialize for BinaryLedgerDataRequest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Wire<'a> {
            ledger: LedgerSelector,
            binary: bool,
            #[serde(skip_serializing_if = "Option::is_none")]
            limit: Option<u32>,
            #[serde(skip_serializing_if = "Option::is_none")]
            marker: Option<&'a Marker>,
        }
        Wire {
            ledger: self.ledger,
            binary: true,
            limit: self.limit,
            marker: self.marker.as_ref(),
        }
        .serialize(serializer)
    }
}

// =============================================================================
// ACCOUNTS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountInfoRequest {
    pub account: Account,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ledger_index: Option<LedgerSelector>,
}

/// `account_lines`: trust lines of an account, paginated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountLinesRequest {
    pub account: Account,
    pub limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ledger_index: Option<LedgerSelector>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<Marker>,
}

/// `account_offers`: open offers of an account, paginated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountOffersRequest {
    pub account: Account,
    pub limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ledger_index: Option<LedgerSelector>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<Marker>,
}

// =============================================================================
// PATHS AND BOOKS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RipplePathFindRequest {
    pub source_account: Account,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_currencies: Option<Vec<Asset>>,
    pub destination_account: Account,
    pub destination_amount: Amount,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookOffersRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ledger_index: Option<LedgerSelector>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub taker: Option<Account>,
    pub taker_pays: Asset,
    pub taker_gets: Asset,
    pub limit: u32,
}

// =============================================================================
// SERVER
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FeeRequest {}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ServerStateRequest {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn account() -> Account {
        "rwpxNWdpKu2QVgrh5LQXEygYLshhgnRL1Y".parse().unwrap()
    }

    #[test]
    fn test_ledger_selector_forms() {
        assert_eq!(serde_json::to_value(LedgerSelector::Validated).unwrap(), json!("validated"));
        assert_eq!(serde_json::to_value(LedgerSelector::from(42)).unwrap(), json!(42));
        let hash = Hash256([0xAB; 32]);
        assert_eq!(
            serde_json::to_value(LedgerSelector::from(hash)).unwrap(),
            json!(hash.to_string())
        );
    }

    #[test]
    fn test_account_tx_omits_defaults() {
        let value = serde_json::to_value(AccountTxRequest::new(account(), 20)).unwrap();
        assert_eq!(
            value,
            json!({
                "account": "rwpxNWdpKu2QVgrh5LQXEygYLshhgnRL1Y",
                "ledger_index_min": -1,
                "ledger_index_max": -1,
                "limit": 20
            })
        );
    }

    #[test]
    fn test_binary_ledger_data_always_binary() {
        let request = BinaryLedgerDataRequest {
            ledger: LedgerSelector::Closed,
            limit: None,
            marker: None,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value, json!({ "ledger": "closed", "binary": true }));
    }

    #[test]
    fn test_book_offers_assets() {
        let request = BookOffersRequest {
            ledger_index: None,
            taker: None,
            taker_pays: Asset::native(),
            taker_gets: Asset::issued("USD".parse().unwrap(), account()),
            limit: 10,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["taker_pays"], json!({ "currency": "XRP" }));
        assert_eq!(value["taker_gets"]["issuer"], "rwpxNWdpKu2QVgrh5LQXEygYLshhgnRL1Y");
    }
}
