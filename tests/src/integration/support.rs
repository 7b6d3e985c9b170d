//! Scripted node and client fixtures.

use ledger_ws_client::channel::{connection, PeerEnd};
use ledger_ws_client::{CallIdAllocator, ClientConfig, LedgerClient};
use serde_json::{json, Value};
use std::sync::Arc;

pub const ACCOUNT: &str = "rwpxNWdpKu2QVgrh5LQXEygYLshhgnRL1Y";
pub const TX_HASH: &str = "2D0CE11154B655A2BFE7F3F857AAC344622EC7DAB11B1EBD920DCDB00E8646FF";

/// The node side of an in-memory connection, answering by hand.
pub struct ScriptedNode {
    peer: PeerEnd,
}

impl ScriptedNode {
    /// Next envelope sent by the client, parsed. `None` once the client is gone.
    pub async fn next_request(&mut self) -> Option<Value> {
        let frame = self.next_frame().await?;
        serde_json::from_str(&frame).ok()
    }

    /// Next envelope sent by the client, as sent.
    pub async fn next_frame(&mut self) -> Option<String> {
        self.peer.requests.recv().await
    }

    /// Deliver a raw frame to the client.
    pub async fn push(&self, frame: impl Into<String>) {
        // the client may already have shut down
        let _ = self.peer.responses.send(frame.into()).await;
    }

    pub async fn succeed(&self, id: &Value, result: Value) {
        self.push(
            json!({ "id": id, "type": "response", "status": "success", "result": result })
                .to_string(),
        )
        .await;
    }

    pub async fn fail(&self, id: &Value, code: i64, message: &str) {
        self.push(
            json!({
                "id": id,
                "type": "response",
                "status": "error",
                "error": "invalidParams",
                "error_code": code,
                "error_message": message,
            })
            .to_string(),
        )
        .await;
    }

    /// Drop the node's end, closing the connection.
    pub fn hang_up(self) {
        drop(self.peer);
    }
}

/// A client whose first call is numbered `first_id`, with `config`.
pub fn client_with(config: ClientConfig, first_id: u64) -> (LedgerClient, ScriptedNode) {
    let (sender, receiver, peer) = connection(32);
    let allocator = Arc::new(CallIdAllocator::starting_after(first_id.saturating_sub(1)));
    let client =
        LedgerClient::connect_with_allocator(config, allocator, Arc::new(sender), Arc::new(receiver))
            .expect("client must start inside a runtime");
    (client, ScriptedNode { peer })
}

pub fn client_starting_at(first_id: u64) -> (LedgerClient, ScriptedNode) {
    client_with(ClientConfig::default(), first_id)
}

/// A validated OfferCreate as the node reports it from `tx`.
pub fn offer_create_result() -> Value {
    json!({
        "validated": true,
        "TransactionType": "OfferCreate",
        "Account": ACCOUNT,
        "Fee": "12",
        "Flags": 0,
        "Sequence": 1681497,
        "TakerGets": "1000000",
        "TakerPays": {
            "currency": "USD",
            "issuer": "rvYAfWj5gh67oV6fW32ZzP3Aw4Eubs59B",
            "value": "1.5"
        },
        "hash": TX_HASH,
        "ledger_index": 6917763,
        "meta": {
            "TransactionIndex": 3,
            "TransactionResult": "tesSUCCESS",
            "AffectedNodes": []
        }
    })
}
