//! # Pagination Scenarios
//!
//! Markers travel from one page into the next request untouched, and a page
//! without one ends the listing.

#[cfg(test)]
mod tests {
    use crate::integration::support::*;
    use futures::StreamExt;
    use ledger_ws_client::commands::{AccountLinesRequest, AccountTxRequest};
    use serde_json::{json, Value};

    fn account_tx_page(marker: Option<Value>) -> Value {
        let mut page = json!({
            "account": ACCOUNT,
            "transactions": [{
                "tx": offer_create_result(),
                "meta": { "TransactionResult": "tesSUCCESS" },
                "validated": true
            }]
        });
        if let Some(marker) = marker {
            page["marker"] = marker;
        }
        page
    }

    #[tokio::test]
    async fn test_account_tx_finishes_after_two_round_trips() {
        let (client, mut node) = client_starting_at(1);

        let responder = tokio::spawn(async move {
            let first = node.next_request().await.unwrap();
            assert_eq!(first["command"], "account_tx");
            assert!(first.get("marker").is_none());
            node.succeed(&first["id"], account_tx_page(Some(json!({ "x": 1 }))))
                .await;

            let second = node.next_request().await.unwrap();
            assert_eq!(second["command"], "account_tx");
            assert_eq!(second["marker"], json!({ "x": 1 }));
            assert_eq!(second["account"], first["account"]);
            node.succeed(&second["id"], account_tx_page(None)).await;

            node
        });

        let request = AccountTxRequest::new(ACCOUNT.parse().unwrap(), 10);
        let pages = client.collect_pages(request).await.unwrap();
        let _node = responder.await.unwrap();

        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].marker.as_ref().unwrap().to_value().unwrap(), json!({ "x": 1 }));
        assert!(pages[1].marker.is_none());
        assert_eq!(pages[0].transactions.len(), 1);
        assert_eq!(client.stats().issued, 2);
    }

    #[tokio::test]
    async fn test_marker_is_echoed_verbatim() {
        let (client, mut node) = client_starting_at(1);
        let marker = json!({ "ledger": 6917763, "seq": [1, 2, { "deep": "AB" }] });
        let echoed = marker.clone();

        let responder = tokio::spawn(async move {
            let first = node.next_request().await.unwrap();
            node.succeed(
                &first["id"],
                json!({ "account": ACCOUNT, "lines": [], "marker": marker }),
            )
            .await;

            let second = node.next_request().await.unwrap();
            node.succeed(&second["id"], json!({ "account": ACCOUNT, "lines": [] }))
                .await;
            (node, second)
        });

        let request = AccountLinesRequest {
            account: ACCOUNT.parse().unwrap(),
            limit: 200,
            ledger_index: None,
            marker: None,
        };
        let pages = client.collect_pages(request).await.unwrap();
        let (_node, second) = responder.await.unwrap();

        assert_eq!(pages.len(), 2);
        assert_eq!(second["marker"], echoed);
    }

    #[tokio::test]
    async fn test_marker_keeps_exact_text() {
        let (client, mut node) = client_starting_at(1);
        let marker = r#"{"z":1,"a":18446744073709551616123,"f":1.10}"#;

        let responder = tokio::spawn(async move {
            let first = node.next_request().await.unwrap();
            node.push(format!(
                r#"{{"id":{},"type":"response","status":"success","result":{{"account":"{ACCOUNT}","lines":[],"marker":{marker}}}}}"#,
                first["id"]
            ))
            .await;

            let second = node.next_frame().await.unwrap();
            let id: Value = serde_json::from_str::<Value>(&second).unwrap()["id"].clone();
            node.succeed(&id, json!({ "account": ACCOUNT, "lines": [] }))
                .await;
            (node, second)
        });

        let request = AccountLinesRequest {
            account: ACCOUNT.parse().unwrap(),
            limit: 200,
            ledger_index: None,
            marker: None,
        };
        let pages = client.collect_pages(request).await.unwrap();
        let (_node, second) = responder.await.unwrap();

        assert_eq!(pages[0].marker.as_ref().unwrap().as_json(), marker);
        assert!(second.contains(&format!(r#""marker":{marker}"#)));
    }

    #[tokio::test]
    async fn test_pages_stop_after_error() {
        let (client, mut node) = client_starting_at(1);

        let responder = tokio::spawn(async move {
            let first = node.next_request().await.unwrap();
            node.succeed(&first["id"], account_tx_page(Some(json!("opaque"))))
                .await;
            let second = node.next_request().await.unwrap();
            node.fail(&second["id"], 31, "lgrIdxsInvalid").await;
            node
        });

        let request = AccountTxRequest::new(ACCOUNT.parse().unwrap(), 1);
        let results: Vec<_> = client.pages(request).collect().await;
        let _node = responder.await.unwrap();

        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        let err = results[1].as_ref().unwrap_err();
        assert_eq!(err.command_error().unwrap().code, 31);
    }
}
