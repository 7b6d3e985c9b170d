//! Result decoding: a total mapping from command kind to decoder.

use crate::commands::results::*;
use crate::commands::CommandKind;
use crate::domain::error::CallError;
use ledger_types::TransactionWithMetaData;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

/// Decodes the raw `result` text of a successful response for `kind`.
///
/// A failure here is a local defect (version skew, corrupt payload) and is
/// reported as [`CallError::Decode`], never as a zero-valued result.
pub fn decode_result(kind: CommandKind, body: &str) -> Result<CommandResult, CallError> {
    let result = match kind {
        CommandKind::AccountTx => CommandResult::AccountTx(decode(kind, body)?),
        CommandKind::Tx => CommandResult::Tx(decode_tx(body)?),
        CommandKind::Submit => CommandResult::Submit(decode(kind, body)?),
        CommandKind::Ledger => CommandResult::Ledger(decode(kind, body)?),
        CommandKind::LedgerHeader => CommandResult::LedgerHeader(decode(kind, body)?),
        CommandKind::LedgerData => CommandResult::LedgerData(decode(kind, body)?),
        CommandKind::BinaryLedgerData => CommandResult::BinaryLedgerData(decode(kind, body)?),
        CommandKind::RipplePathFind => CommandResult::RipplePathFind(decode(kind, body)?),
        CommandKind::AccountInfo => CommandResult::AccountInfo(decode(kind, body)?),
        CommandKind::AccountLines => CommandResult::AccountLines(decode(kind, body)?),
        CommandKind::AccountOffers => CommandResult::AccountOffers(decode(kind, body)?),
        CommandKind::BookOffers => CommandResult::BookOffers(decode(kind, body)?),
        CommandKind::Fee => CommandResult::Fee(decode(kind, body)?),
        CommandKind::ServerState => CommandResult::ServerState(decode(kind, body)?),
    };
    Ok(result)
}

fn decode<T: DeserializeOwned>(kind: CommandKind, body: &str) -> Result<T, CallError> {
    serde_json::from_str(body).map_err(|e| CallError::decode(kind.wire_name(), e))
}

/// First pass over a `tx` body: only the validation flag.
#[derive(Deserialize)]
struct ValidationFlag {
    #[serde(default)]
    validated: Option<bool>,
}

/// Two passes over the same body. The first reads `validated` (absent means
/// provisional), the second hands the whole body to the kind-dispatching
/// transaction decoder.
pub fn decode_tx(body: &str) -> Result<TxResult, CallError> {
    let command = CommandKind::Tx.wire_name();
    let body: Value = serde_json::from_str(body).map_err(|e| CallError::decode(command, e))?;
    let flag = ValidationFlag::deserialize(&body).map_err(|e| CallError::decode(command, e))?;
    let transaction =
        TransactionWithMetaData::from_value(body).map_err(|e| CallError::decode(command, e))?;
    Ok(TxResult {
        validated: flag.validated.unwrap_or(false),
        transaction,
    })
}
