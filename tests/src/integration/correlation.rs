//! # Correlation Scenarios
//!
//! Each response reaches the call that asked for it, whatever order the node
//! answers in, and frames for nobody are dropped without side effects.

#[cfg(test)]
mod tests {
    use crate::integration::support::*;
    use futures::future::join;
    use ledger_types::{Amount, Transaction, TransactionKind};
    use ledger_ws_client::commands::{FeeRequest, TxRequest};
    use ledger_ws_client::{CallError, CallId};
    use serde_json::json;

    fn tx_request() -> TxRequest {
        TxRequest {
            transaction: TX_HASH.parse().unwrap(),
        }
    }

    // =============================================================================
    // SINGLE CALLS
    // =============================================================================

    #[tokio::test]
    async fn test_validated_offer_create_decodes() {
        let (client, mut node) = client_starting_at(1);

        let call = client.issue(&tx_request()).await.unwrap();
        let request = node.next_request().await.unwrap();
        assert_eq!(request["id"], 1);
        assert_eq!(request["command"], "tx");
        assert_eq!(request["transaction"], TX_HASH);

        node.succeed(&request["id"], offer_create_result()).await;
        let result = call.wait().await.unwrap();

        assert!(result.validated);
        assert_eq!(result.transaction.kind(), TransactionKind::OfferCreate);
        let Transaction::OfferCreate(offer) = &result.transaction.transaction else {
            panic!("expected OfferCreate, got {}", result.transaction.kind());
        };
        assert_eq!(offer.common.sequence, 1681497);
        assert_eq!(offer.common.account.as_str(), ACCOUNT);
        assert!(matches!(offer.taker_gets, Amount::Native(_)));
        assert!(matches!(offer.taker_pays, Amount::Issued { .. }));
        assert!(result
            .transaction
            .meta
            .as_ref()
            .unwrap()
            .transaction_result
            .is_success());
    }

    #[tokio::test]
    async fn test_provisional_result_is_not_validated() {
        let (client, mut node) = client_starting_at(1);
        let mut body = offer_create_result();
        body["validated"] = json!(false);

        let call = client.issue(&tx_request()).await.unwrap();
        let request = node.next_request().await.unwrap();
        node.succeed(&request["id"], body).await;

        let result = call.wait().await.unwrap();
        assert!(!result.validated);
        assert_eq!(result.transaction.kind(), TransactionKind::OfferCreate);
    }

    #[tokio::test]
    async fn test_remote_error_reaches_its_caller() {
        let (client, mut node) = client_starting_at(3);

        let call = client.issue(&FeeRequest::default()).await.unwrap();
        let request = node.next_request().await.unwrap();
        assert_eq!(request["id"], 3);
        node.fail(&request["id"], -1, "bad request").await;

        let err = call.wait().await.unwrap_err();
        assert!(err.is_remote());
        let remote = err.command_error().unwrap();
        assert_eq!(remote.code, -1);
        assert_eq!(remote.message, "bad request");
        assert_eq!(client.stats().remote_errors, 1);
    }

    // =============================================================================
    // CONCURRENT CALLS
    // =============================================================================

    #[tokio::test]
    async fn test_reversed_responses_reach_their_callers() {
        let (client, mut node) = client_starting_at(5);

        let first = client.issue(&FeeRequest::default()).await.unwrap();
        let second = client.issue(&tx_request()).await.unwrap();
        assert_eq!(first.id(), CallId::new(5));
        assert_eq!(second.id(), CallId::new(6));

        let fee_request = node.next_request().await.unwrap();
        let tx_envelope = node.next_request().await.unwrap();

        node.succeed(&tx_envelope["id"], offer_create_result()).await;
        node.succeed(
            &fee_request["id"],
            json!({ "current_queue_size": "4", "drops": { "base_fee": "10" } }),
        )
        .await;

        let (fee, tx) = join(first.wait(), second.wait()).await;
        assert_eq!(fee.unwrap().current_queue_size, Some(4));
        assert_eq!(tx.unwrap().transaction.kind(), TransactionKind::OfferCreate);
        assert_eq!(client.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_many_concurrent_requests() {
        let (client, mut node) = client_starting_at(1);

        let responder = tokio::spawn(async move {
            let mut ids = Vec::new();
            for _ in 0..20 {
                ids.push(node.next_request().await.unwrap()["id"].clone());
            }
            for id in ids.iter().rev() {
                let queue = id.as_u64().unwrap().to_string();
                node.succeed(id, json!({ "current_queue_size": queue })).await;
            }
            node
        });

        let calls = (0..20).map(|_| client.fee());
        let results = futures::future::join_all(calls).await;
        let _node = responder.await.unwrap();

        let mut queues: Vec<u32> = results
            .into_iter()
            .map(|r| r.unwrap().current_queue_size.unwrap())
            .collect();
        queues.sort_unstable();
        assert_eq!(queues, (1..=20).collect::<Vec<u32>>());
    }

    // =============================================================================
    // STRAY FRAMES
    // =============================================================================

    #[tokio::test]
    async fn test_orphan_frame_has_no_effect() {
        let (client, mut node) = client_starting_at(1);

        let call = client.issue(&FeeRequest::default()).await.unwrap();
        let request = node.next_request().await.unwrap();

        node.succeed(&json!(42), json!({})).await;
        node.succeed(&request["id"], json!({ "current_queue_size": "0" }))
            .await;

        assert_eq!(call.wait().await.unwrap().current_queue_size, Some(0));
        let stats = client.stats();
        assert_eq!(stats.orphan_frames, 1);
        assert_eq!(stats.completed, 1);
    }

    #[tokio::test]
    async fn test_unsolicited_frame_is_forwarded() {
        let (client, node) = client_starting_at(1);
        let mut events = client.subscribe_unsolicited();

        node.push(json!({ "type": "ledgerClosed", "ledger_index": 6917763 }).to_string())
            .await;

        let event = events.recv().await.unwrap();
        assert_eq!(event["type"], "ledgerClosed");
        assert_eq!(client.stats().unsolicited_frames, 1);
    }

    #[tokio::test]
    async fn test_malformed_frame_produces_diagnostic() {
        let (client, node) = client_starting_at(1);
        let mut diagnostics = client.subscribe_diagnostics();

        node.push("{ not json").await;

        let diagnostic = diagnostics.recv().await.unwrap();
        assert_eq!(diagnostic.frame_len, "{ not json".len());
        assert!(!client.is_closed());
        assert_eq!(client.stats().malformed_frames, 1);
    }

    #[tokio::test]
    async fn test_undecodable_result_fails_only_that_call() {
        let (client, mut node) = client_starting_at(1);

        let broken = client.issue(&tx_request()).await.unwrap();
        let healthy = client.issue(&FeeRequest::default()).await.unwrap();
        let broken_id = node.next_request().await.unwrap()["id"].clone();
        let healthy_id = node.next_request().await.unwrap()["id"].clone();

        node.succeed(&broken_id, json!({ "validated": true })).await;
        node.succeed(&healthy_id, json!({})).await;

        assert!(matches!(
            broken.wait().await.unwrap_err(),
            CallError::Decode { command: "tx", .. }
        ));
        assert!(healthy.wait().await.is_ok());
    }
}
