//! The single reader of inbound frames.

use crate::dispatcher::Dispatcher;
use crate::domain::error::messages;
use crate::ports::{FrameReceiver, TransportError};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, warn};

/// Consecutive receive failures after which the connection is treated as
/// closed.
pub const MAX_RECEIVE_FAILURES: u32 = 10;

/// Base delay after a failed receive (exponential backoff).
const RECEIVE_RETRY_BASE_DELAY_MS: u64 = 10;

/// Maximum delay between receive attempts.
const MAX_RECEIVE_RETRY_DELAY_MS: u64 = 1_000;

/// Reads frames from the transport and routes each through the dispatcher.
pub struct FrameListener {
    dispatcher: Arc<Dispatcher>,
    receiver: Arc<dyn FrameReceiver>,
}

impl FrameListener {
    pub fn new(dispatcher: Arc<Dispatcher>, receiver: Arc<dyn FrameReceiver>) -> Self {
        Self {
            dispatcher,
            receiver,
        }
    }

    /// Run the listener loop until the transport closes. On close, every
    /// pending call fails with a local `"connection closed"` error.
    ///
    /// A failed receive is retried after a growing delay. After
    /// [`MAX_RECEIVE_FAILURES`] failures in a row the transport counts as
    /// closed.
    pub async fn run(self) {
        let mut failures = 0u32;

        loop {
            match self.receiver.receive().await {
                Ok(frame) => {
                    failures = 0;
                    self.dispatcher.on_inbound_frame(&frame);
                }
                Err(TransportError::ChannelClosed) => {
                    let failed = self.dispatcher.close(messages::CONNECTION_CLOSED);
                    warn!(failed_calls = failed, "Transport closed, stopping listener");
                    break;
                }
                Err(e) => {
                    failures += 1;
                    error!(error = %e, failures = failures, "Error receiving frame");

                    if failures >= MAX_RECEIVE_FAILURES {
                        let failed = self.dispatcher.close(messages::CONNECTION_CLOSED);
                        warn!(
                            failed_calls = failed,
                            failures = failures,
                            "Transport keeps failing, stopping listener"
                        );
                        break;
                    }
                    tokio::time::sleep(retry_delay(failures)).await;
                }
            }
        }
    }
}

fn retry_delay(failures: u32) -> Duration {
    Duration::from_millis(std::cmp::min(
        RECEIVE_RETRY_BASE_DELAY_MS.saturating_mul(1 << failures.min(10)),
        MAX_RECEIVE_RETRY_DELAY_MS,
    ))
}
