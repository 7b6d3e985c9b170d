//! Typed results, one per command kind.

use crate::commands::pagination::Marker;
use ledger_types::{
    Account, AccountLine, AccountOffer, AccountRoot, Amount, Currency, Hash256, Ledger,
    LedgerEntry, OrderBookOffer, PathSet, Transaction, TransactionResult,
    TransactionWithMetaData, Value, VariableLength,
};
use serde::Deserialize;
use serde_with::{serde_as, DisplayFromStr, PickFirst};
use std::collections::BTreeMap;

/// Decoded result of any command kind.
#[allow(clippy::large_enum_variant)]
#[derive(Debug, Clone, PartialEq)]
pub enum CommandResult {
    AccountTx(AccountTxResult),
    Tx(TxResult),
    Submit(SubmitResult),
    Ledger(LedgerResult),
    LedgerHeader(LedgerHeaderResult),
    LedgerData(LedgerDataResult),
    BinaryLedgerData(BinaryLedgerDataResult),
    RipplePathFind(RipplePathFindResult),
    AccountInfo(AccountInfoResult),
    AccountLines(AccountLinesResult),
    AccountOffers(AccountOffersResult),
    BookOffers(BookOffersResult),
    Fee(FeeResult),
    ServerState(ServerStateResult),
}

// =============================================================================
// TRANSACTIONS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AccountTxResult {
    #[serde(default)]
    pub account: Option<Account>,
    #[serde(default)]
    pub marker: Option<Marker>,
    #[serde(default)]
    pub transactions: Vec<TransactionWithMetaData>,
}

/// A single transaction and whether the network has finalised it.
///
/// `validated` is false for provisional results, including when the node
/// omits the flag.
#[derive(Debug, Clone, PartialEq)]
pub struct TxResult {
    pub validated: bool,
    pub transaction: TransactionWithMetaData,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SubmitResult {
    pub engine_result: TransactionResult,
    pub engine_result_code: i32,
    pub engine_result_message: String,
    pub tx_blob: String,
    #[serde(default)]
    pub tx_json: Option<Transaction>,
}

// =============================================================================
// LEDGERS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LedgerResult {
    pub ledger: Ledger,
    #[serde(default)]
    pub ledger_hash: Option<Hash256>,
    #[serde(default)]
    pub validated: bool,
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LedgerHeaderResult {
    pub ledger: Ledger,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub ledger_index: u32,
    #[serde(default)]
    pub ledger_hash: Option<Hash256>,
    pub ledger_data: VariableLength,
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LedgerDataResult {
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub ledger_index: u32,
    pub ledger_hash: Hash256,
    #[serde(default)]
    pub marker: Option<Marker>,
    #[serde(default)]
    pub state: Vec<LedgerEntry>,
}

/// One state entry in binary form.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BinaryLedgerData {
    pub data: VariableLength,
    pub index: Hash256,
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BinaryLedgerDataResult {
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub ledger_index: u32,
    pub ledger_hash: Hash256,
    #[serde(default)]
    pub marker: Option<Marker>,
    #[serde(default)]
    pub state: Vec<BinaryLedgerData>,
}

// =============================================================================
// PATHS, ACCOUNTS AND BOOKS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PathAlternative {
    pub source_amount: Amount,
    #[serde(default)]
    pub paths_computed: PathSet,
    #[serde(default)]
    pub paths_canonical: PathSet,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RipplePathFindResult {
    #[serde(default)]
    pub alternatives: Vec<PathAlternative>,
    pub destination_account: Account,
    #[serde(default)]
    pub destination_currencies: Vec<Currency>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AccountInfoResult {
    /// Set when the open ledger was queried
    #[serde(default)]
    pub ledger_current_index: Option<u32>,
    /// Set when a closed or validated ledger was queried
    #[serde(default)]
    pub ledger_index: Option<u32>,
    pub account_data: AccountRoot,
    #[serde(default)]
    pub validated: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AccountLinesResult {
    #[serde(default)]
    pub ledger_current_index: Option<u32>,
    #[serde(default)]
    pub ledger_index: Option<u32>,
    pub account: Account,
    #[serde(default)]
    pub marker: Option<Marker>,
    #[serde(default)]
    pub lines: Vec<AccountLine>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AccountOffersResult {
    #[serde(default)]
    pub ledger_current_index: Option<u32>,
    #[serde(default)]
    pub ledger_index: Option<u32>,
    pub account: Account,
    #[serde(default)]
    pub marker: Option<Marker>,
    #[serde(default)]
    pub offers: Vec<AccountOffer>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BookOffersResult {
    #[serde(default)]
    pub ledger_current_index: Option<u32>,
    #[serde(default)]
    pub ledger_index: Option<u32>,
    #[serde(default)]
    pub offers: Vec<OrderBookOffer>,
}

// =============================================================================
// SERVER
// =============================================================================

/// Fee levels in drops. The node renders every number here as text.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct FeeDrops {
    pub base_fee: Option<Value>,
    pub median_fee: Option<Value>,
    pub minimum_fee: Option<Value>,
    pub open_ledger_fee: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct FeeLevels {
    pub median_level: Option<Value>,
    pub minimum_level: Option<Value>,
    pub open_ledger_level: Option<Value>,
    pub reference_level: Option<Value>,
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct FeeResult {
    #[serde_as(as = "Option<PickFirst<(DisplayFromStr, _)>>")]
    pub current_ledger_size: Option<u32>,
    #[serde_as(as = "Option<PickFirst<(DisplayFromStr, _)>>")]
    pub current_queue_size: Option<u32>,
    pub drops: FeeDrops,
    #[serde_as(as = "Option<PickFirst<(DisplayFromStr, _)>>")]
    pub expected_ledger_size: Option<u32>,
    pub ledger_current_index: Option<u32>,
    pub levels: FeeLevels,
    #[serde_as(as = "Option<PickFirst<(DisplayFromStr, _)>>")]
    pub max_queue_size: Option<u32>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct LastClose {
    pub converge_time: u64,
    pub proposers: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct ServerPort {
    pub port: String,
    pub protocol: Vec<String>,
}

/// Time spent in one server state. Older nodes send these as numbers.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct StateAccounting {
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub duration_us: u64,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub transitions: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ValidatedLedgerInfo {
    #[serde(default)]
    pub base_fee: u64,
    #[serde(default)]
    pub close_time: u32,
    pub hash: Hash256,
    #[serde(default)]
    pub reserve_base: u64,
    #[serde(default)]
    pub reserve_inc: u64,
    pub seq: u32,
}

/// Server status as reported by `server_state`.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct ServerState {
    pub build_version: String,
    pub complete_ledgers: String,
    pub initial_sync_duration_us: String,
    pub io_latency_ms: u64,
    pub jq_trans_overflow: String,
    pub last_close: LastClose,
    pub load_base: u64,
    pub load_factor: u64,
    pub load_factor_fee_escalation: Option<u64>,
    pub load_factor_fee_queue: Option<u64>,
    pub load_factor_fee_reference: Option<u64>,
    pub load_factor_server: Option<u64>,
    pub network_id: Option<u32>,
    pub peer_disconnects: String,
    pub peer_disconnects_resources: String,
    pub peers: u32,
    pub ports: Vec<ServerPort>,
    pub pubkey_node: String,
    pub server_state: String,
    pub server_state_duration_us: String,
    pub state_accounting: BTreeMap<String, StateAccounting>,
    pub time: String,
    pub uptime: u64,
    pub validated_ledger: Option<ValidatedLedgerInfo>,
    pub validation_quorum: u32,
}

impl ServerState {
    /// The server is tracking the network and serving validated data.
    pub fn is_synced(&self) -> bool {
        matches!(self.server_state.as_str(), "full" | "validating" | "proposing")
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ServerStateResult {
    pub state: ServerState,
}
