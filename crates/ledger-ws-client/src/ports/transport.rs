//! Transport ports: where outbound envelopes go and inbound frames come from.
//!
//! Connecting, framing and reconnecting are the transport's business. The
//! client only needs to hand over text and to receive text in arrival order.

use async_trait::async_trait;

/// Sends serialised envelopes to the node.
#[async_trait]
pub trait FrameSender: Send + Sync {
    async fn send(&self, frame: String) -> Result<(), TransportError>;
}

/// Delivers raw inbound frames in receipt order.
#[async_trait]
pub trait FrameReceiver: Send + Sync {
    /// Receive next frame (waits until available)
    async fn receive(&self) -> Result<String, TransportError>;
}

/// Transport error types
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The connection is gone for good.
    #[error("channel closed")]
    ChannelClosed,
    #[error("send failed: {0}")]
    SendFailed(String),
    /// A single frame could not be read; the connection stays usable.
    #[error("receive failed: {0}")]
    ReceiveFailed(String),
}

/// In-memory transport over tokio channels.
///
/// The client holds a [`ChannelSender`] and a [`ChannelReceiver`]; the other
/// side (a fake node in tests, or a bridge to a real socket) holds the
/// matching [`PeerEnd`].
pub mod channel {
    use super::*;
    use tokio::sync::{mpsc, Mutex};

    pub struct ChannelSender(pub mpsc::Sender<String>);
    pub struct ChannelReceiver(pub Mutex<mpsc::Receiver<String>>);

    #[async_trait]
    impl FrameSender for ChannelSender {
        async fn send(&self, frame: String) -> Result<(), TransportError> {
            self.0.send(frame).await.map_err(|_| TransportError::ChannelClosed)
        }
    }

    #[async_trait]
    impl FrameReceiver for ChannelReceiver {
        async fn receive(&self) -> Result<String, TransportError> {
            let mut guard = self.0.lock().await;
            guard.recv().await.ok_or(TransportError::ChannelClosed)
        }
    }

    /// The node's side of an in-memory connection.
    pub struct PeerEnd {
        /// Envelopes sent by the client
        pub requests: mpsc::Receiver<String>,
        /// Frames to deliver to the client
        pub responses: mpsc::Sender<String>,
    }

    /// Create an in-memory connection
    pub fn connection(buffer: usize) -> (ChannelSender, ChannelReceiver, PeerEnd) {
        let (req_tx, req_rx) = mpsc::channel(buffer);
        let (resp_tx, resp_rx) = mpsc::channel(buffer);
        (
            ChannelSender(req_tx),
            ChannelReceiver(Mutex::new(resp_rx)),
            PeerEnd {
                requests: req_rx,
                responses: resp_tx,
            },
        )
    }
}
