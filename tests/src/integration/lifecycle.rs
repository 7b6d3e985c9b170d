//! # Lifecycle Scenarios
//!
//! Calls that never get an answer still end: by deadline, by the caller
//! giving up, by the connection going away or by shutdown.

#[cfg(test)]
mod tests {
    use crate::integration::support::*;
    use ledger_ws_client::commands::FeeRequest;
    use ledger_ws_client::domain::messages;
    use ledger_ws_client::{CallError, ClientConfig};
    use serde_json::json;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_unanswered_call_times_out() {
        let config = ClientConfig {
            default_timeout: Duration::from_secs(3),
            ..ClientConfig::default()
        };
        let (client, _node) = client_with(config, 1);

        let err = client.fee().await.unwrap_err();
        assert!(err.is_timeout());
        assert_eq!(err, CallError::local(messages::TIMED_OUT));

        assert_eq!(client.stats().timeouts, 1);
        assert_eq!(client.pending_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reaper_expires_issued_calls() {
        let config = ClientConfig {
            default_timeout: Duration::from_secs(2),
            reaper_interval: Duration::from_secs(1),
            ..ClientConfig::default()
        };
        let (client, _node) = client_with(config, 1);

        let call = client.issue(&FeeRequest::default()).await.unwrap();
        assert_eq!(client.pending_count(), 1);

        tokio::time::sleep(Duration::from_secs(4)).await;
        assert_eq!(client.pending_count(), 0);
        assert!(call.wait().await.unwrap_err().is_timeout());
    }

    #[tokio::test]
    async fn test_dropped_handle_cancels_call() {
        let (client, mut node) = client_starting_at(1);

        let call = client.issue(&FeeRequest::default()).await.unwrap();
        let request = node.next_request().await.unwrap();
        drop(call);

        assert_eq!(client.pending_count(), 0);
        assert_eq!(client.stats().cancelled, 1);

        // the late answer is dropped; the next call still completes
        node.succeed(&request["id"], json!({})).await;
        let next = client.issue(&FeeRequest::default()).await.unwrap();
        let next_request = node.next_request().await.unwrap();
        node.succeed(&next_request["id"], json!({})).await;
        assert!(next.wait().await.is_ok());
        assert_eq!(client.stats().orphan_frames, 1);
    }

    #[tokio::test]
    async fn test_transport_close_fails_every_pending_call() {
        let (client, mut node) = client_starting_at(1);

        let first = client.issue(&FeeRequest::default()).await.unwrap();
        let second = client.issue(&FeeRequest::default()).await.unwrap();
        node.next_request().await.unwrap();
        node.next_request().await.unwrap();

        node.hang_up();

        let closed = CallError::local(messages::CONNECTION_CLOSED);
        assert_eq!(first.wait().await.unwrap_err(), closed);
        assert_eq!(second.wait().await.unwrap_err(), closed);
        assert!(client.is_closed());
        assert_eq!(client.fee().await.unwrap_err(), closed);
    }

    #[tokio::test]
    async fn test_shutdown_fails_pending_calls() {
        let (client, _node) = client_starting_at(1);
        let call = client.issue(&FeeRequest::default()).await.unwrap();

        client.shutdown();

        assert_eq!(
            call.wait().await.unwrap_err(),
            CallError::local(messages::SHUTDOWN)
        );
        assert_eq!(client.pending_count(), 0);
    }
}
