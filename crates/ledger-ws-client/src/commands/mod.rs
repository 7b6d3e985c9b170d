//! The command catalogue.
//!
//! Each command kind has a request type (its parameters), a result type and
//! an entry in the total decode mapping of [`decode::decode_result`]. The
//! [`Command`] trait ties a request type to its kind and its typed output.

pub mod decode;
pub mod pagination;
pub mod requests;
pub mod results;

pub use decode::decode_result;
pub use pagination::{next_request, Marker, Paginated};
pub use requests::*;
pub use results::*;

use crate::domain::call_id::CallId;
use serde::Serialize;
use std::fmt;

/// Every command kind the client can issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    AccountTx,
    Tx,
    Submit,
    Ledger,
    LedgerHeader,
    LedgerData,
    BinaryLedgerData,
    RipplePathFind,
    AccountInfo,
    AccountLines,
    AccountOffers,
    BookOffers,
    Fee,
    ServerState,
}

impl CommandKind {
    pub const ALL: [CommandKind; 14] = [
        Self::AccountTx,
        Self::Tx,
        Self::Submit,
        Self::Ledger,
        Self::LedgerHeader,
        Self::LedgerData,
        Self::BinaryLedgerData,
        Self::RipplePathFind,
        Self::AccountInfo,
        Self::AccountLines,
        Self::AccountOffers,
        Self::BookOffers,
        Self::Fee,
        Self::ServerState,
    ];

    /// Name sent in the `command` field. Text and binary `ledger_data` share
    /// one name; the kind, not the name, selects the decoder.
    pub const fn wire_name(self) -> &'static str {
        match self {
            Self::AccountTx => "account_tx",
            Self::Tx => "tx",
            Self::Submit => "submit",
            Self::Ledger => "ledger",
            Self::LedgerHeader => "ledger_header",
            Self::LedgerData | Self::BinaryLedgerData => "ledger_data",
            Self::RipplePathFind => "ripple_path_find",
            Self::AccountInfo => "account_info",
            Self::AccountLines => "account_lines",
            Self::AccountOffers => "account_offers",
            Self::BookOffers => "book_offers",
            Self::Fee => "fee",
            Self::ServerState => "server_state",
        }
    }

    /// Whether responses of this kind carry a continuation marker.
    pub const fn is_paginated(self) -> bool {
        matches!(
            self,
            Self::AccountTx
                | Self::LedgerData
                | Self::BinaryLedgerData
                | Self::AccountLines
                | Self::AccountOffers
        )
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// A request type of one command kind.
pub trait Command: Serialize + Send + Sync + 'static {
    const KIND: CommandKind;

    /// Typed result handed to the caller.
    type Output: Send + 'static;

    /// Picks this command's result out of a decoded result, or `None` when
    /// the variant belongs to another kind.
    fn from_result(result: CommandResult) -> Option<Self::Output>;
}

macro_rules! impl_command {
    ($($request:ty => $kind:ident($output:ty)),* $(,)?) => {
        $(
            impl Command for $request {
                const KIND: CommandKind = CommandKind::$kind;
                type Output = $output;

                fn from_result(result: CommandResult) -> Option<Self::Output> {
                    match result {
                        CommandResult::$kind(output) => Some(output),
                        _ => None,
                    }
                }
            }
        )*
    };
}

impl_command! {
    AccountTxRequest => AccountTx(AccountTxResult),
    TxRequest => Tx(TxResult),
    SubmitRequest => Submit(SubmitResult),
    LedgerRequest => Ledger(LedgerResult),
    LedgerHeaderRequest => LedgerHeader(LedgerHeaderResult),
    LedgerDataRequest => LedgerData(LedgerDataResult),
    BinaryLedgerDataRequest => BinaryLedgerData(BinaryLedgerDataResult),
    RipplePathFindRequest => RipplePathFind(RipplePathFindResult),
    AccountInfoRequest => AccountInfo(AccountInfoResult),
    AccountLinesRequest => AccountLines(AccountLinesResult),
    AccountOffersRequest => AccountOffers(AccountOffersResult),
    BookOffersRequest => BookOffers(BookOffersResult),
    FeeRequest => Fee(FeeResult),
    ServerStateRequest => ServerState(ServerStateResult),
}

/// Outbound unit: identifier, command name and the kind's parameters.
#[derive(Serialize)]
struct CommandEnvelope<'a, C> {
    id: CallId,
    command: &'static str,
    #[serde(flatten)]
    params: &'a C,
}

/// Serialises `command` under `id` into the text sent on the wire.
pub fn encode_envelope<C: Command>(id: CallId, command: &C) -> Result<String, serde_json::Error> {
    serde_json::to_string(&CommandEnvelope {
        id,
        command: C::KIND.wire_name(),
        params: command,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn test_wire_names_unique_except_ledger_data() {
        let mut names: Vec<_> = CommandKind::ALL.iter().map(|k| k.wire_name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), CommandKind::ALL.len() - 1);
    }

    #[test]
    fn test_paginated_kinds() {
        let paginated: Vec<_> = CommandKind::ALL
            .iter()
            .filter(|k| k.is_paginated())
            .collect();
        assert_eq!(paginated.len(), 5);
        assert!(!CommandKind::Tx.is_paginated());
    }

    #[test]
    fn test_envelope_carries_id_and_name() {
        let request = TxRequest {
            transaction: "2D0CE11154B655A2BFE7F3F857AAC344622EC7DAB11B1EBD920DCDB00E8646FF"
                .parse()
                .unwrap(),
        };
        let text = encode_envelope(CallId::new(1), &request).unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(
            value,
            json!({
                "id": 1,
                "command": "tx",
                "transaction": "2D0CE11154B655A2BFE7F3F857AAC344622EC7DAB11B1EBD920DCDB00E8646FF"
            })
        );
    }

    #[test]
    fn test_envelope_without_params() {
        let text = encode_envelope(CallId::new(9), &FeeRequest::default()).unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value, json!({ "id": 9, "command": "fee" }));
    }

    #[test]
    fn test_from_result_rejects_other_kind() {
        let result = CommandResult::Fee(serde_json::from_value(json!({ "drops": {} })).unwrap());
        assert!(TxRequest::from_result(result).is_none());
    }
}
