//! The dispatcher: issues calls and routes inbound frames to them.
//!
//! Frame routing:
//! - `type` other than `"response"` goes to the unsolicited broadcast.
//! - A response whose `id` has no pending call is an orphan: the caller gave
//!   up or never existed. It is dropped with a debug log and a counter.
//! - Anything that cannot be parsed far enough to trust its `id` is
//!   malformed: error log, counter and a diagnostic event, never a caller.

use crate::commands::{decode_result, encode_envelope, Command};
use crate::domain::call_id::CallId;
use crate::domain::config::ClientConfig;
use crate::domain::error::{CallError, CommandError};
use crate::domain::handle::CallHandle;
use crate::domain::pending::{CallStats, PendingCallStore};
use crate::ports::FrameSender;
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use serde_json::Value;
use std::sync::{Arc, OnceLock};
use tokio::sync::broadcast;
use tokio::time::Instant;
use tracing::{debug, error};

/// Diagnostic published for a frame that could not be routed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameDiagnostic {
    pub reason: String,
    pub frame_len: usize,
}

/// What happened to one inbound frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameDisposition {
    /// Delivered to the pending call with this id
    Resolved(CallId),
    /// No pending call with this id
    Orphan(CallId),
    /// Forwarded to the unsolicited broadcast
    Unsolicited,
    /// Dropped and reported as a diagnostic
    Malformed,
}

/// Routing fields of an inbound frame. The result stays raw text so that
/// decoding sees exactly what the node sent.
#[derive(Deserialize)]
struct InboundEnvelope<'a> {
    #[serde(rename = "type", default)]
    frame_type: Option<Value>,
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    status: Option<Value>,
    #[serde(borrow, default)]
    result: Option<&'a RawValue>,
}

pub struct Dispatcher {
    store: Arc<PendingCallStore>,
    sender: Arc<dyn FrameSender>,
    unsolicited: broadcast::Sender<Value>,
    diagnostics: broadcast::Sender<FrameDiagnostic>,
    max_frame_size: usize,
    closed: OnceLock<&'static str>,
}

impl Dispatcher {
    pub fn new(
        config: &ClientConfig,
        store: Arc<PendingCallStore>,
        sender: Arc<dyn FrameSender>,
    ) -> Self {
        let (unsolicited, _) = broadcast::channel(config.unsolicited_buffer);
        let (diagnostics, _) = broadcast::channel(config.diagnostics_buffer);
        Self {
            store,
            sender,
            unsolicited,
            diagnostics,
            max_frame_size: config.max_frame_size,
            closed: OnceLock::new(),
        }
    }

    /// Registers `command` under a fresh identifier and sends it.
    ///
    /// `deadline` is enforced by the reaper; a handle can also impose its own
    /// through [`CallHandle::wait_until`].
    pub async fn issue<C: Command>(
        &self,
        command: &C,
        deadline: Option<Instant>,
    ) -> Result<CallHandle<C>, CallError> {
        if let Some(reason) = self.closed.get() {
            return Err(CallError::local(*reason));
        }

        let id = self.store.next_id();
        let payload = encode_envelope(id, command)
            .map_err(|e| CallError::local(format!("cannot encode {} request: {e}", C::KIND)))?;
        let receiver = self.store.register(id, C::KIND, deadline);
        // From here on, dropping the handle unregisters the call.
        let handle = CallHandle::new(id, payload.clone(), receiver, Arc::downgrade(&self.store));

        // close() may have run its fan-out between the check above and
        // register(); it must not leave this call behind.
        if let Some(reason) = self.closed.get() {
            return Err(CallError::local(*reason));
        }

        if let Err(e) = self.sender.send(payload).await {
            return Err(CallError::local(format!("send failed: {e}")));
        }

        debug!(call_id = %id, command = C::KIND.wire_name(), "Issued call");

        Ok(handle)
    }

    /// Routes one raw inbound frame.
    pub fn on_inbound_frame(&self, frame: &str) -> FrameDisposition {
        if frame.len() > self.max_frame_size {
            return self.malformed(
                format!("frame of {} bytes exceeds limit of {}", frame.len(), self.max_frame_size),
                frame.len(),
            );
        }

        let envelope: InboundEnvelope<'_> = match serde_json::from_str(frame) {
            Ok(envelope) => envelope,
            Err(e) => return self.malformed(format!("unparsable frame: {e}"), frame.len()),
        };

        match envelope.frame_type.as_ref().and_then(Value::as_str) {
            Some("response") => {}
            Some(kind) => return self.unsolicited(kind, frame),
            None => return self.malformed("missing type tag".to_string(), frame.len()),
        }

        let Some(id) = envelope.id.as_ref().and_then(Value::as_u64).map(CallId::new) else {
            return self.malformed("response without a numeric id".to_string(), frame.len());
        };

        let Some(call) = self.store.take(id) else {
            debug!(call_id = %id, "Dropping response for unknown or abandoned call");
            CallStats::bump(&self.store.stats().orphan_frames);
            return FrameDisposition::Orphan(id);
        };

        let command = call.kind().wire_name();
        match envelope.status.as_ref().and_then(Value::as_str) {
            Some("success") => match envelope.result {
                Some(body) => match decode_result(call.kind(), body.get()) {
                    Ok(result) => call.complete(result),
                    Err(e) => {
                        error!(call_id = %id, command = command, error = %e, "Cannot decode result");
                        call.resolve(Err(e))
                    }
                },
                None => call.resolve(Err(CallError::decode(command, "success without result"))),
            },
            Some("error") => match serde_json::from_str::<CommandError>(frame) {
                Ok(remote) => call.reject(remote),
                Err(e) => call.resolve(Err(CallError::decode(command, e))),
            },
            other => call.resolve(Err(CallError::decode(
                command,
                format!("unexpected status {other:?}"),
            ))),
        };

        FrameDisposition::Resolved(id)
    }

    fn unsolicited(&self, kind: &str, frame: &str) -> FrameDisposition {
        let value: Value = match serde_json::from_str(frame) {
            Ok(value) => value,
            Err(e) => return self.malformed(format!("unparsable frame: {e}"), frame.len()),
        };
        debug!(frame_type = kind, "Forwarding unsolicited frame");
        CallStats::bump(&self.store.stats().unsolicited_frames);
        // no subscribers is fine
        let _ = self.unsolicited.send(value);
        FrameDisposition::Unsolicited
    }

    fn malformed(&self, reason: String, frame_len: usize) -> FrameDisposition {
        error!(reason = %reason, frame_len = frame_len, "Malformed inbound frame");
        CallStats::bump(&self.store.stats().malformed_frames);
        let _ = self.diagnostics.send(FrameDiagnostic { reason, frame_len });
        FrameDisposition::Malformed
    }

    /// Marks the dispatcher closed and fails every pending call with
    /// `reason`. Later issues fail immediately with the first reason given.
    pub fn close(&self, reason: &'static str) -> usize {
        let _ = self.closed.set(reason);
        self.store.fail_all(self.closed.get().copied().unwrap_or(reason))
    }

    pub fn is_closed(&self) -> bool {
        self.closed.get().is_some()
    }

    pub fn subscribe_unsolicited(&self) -> broadcast::Receiver<Value> {
        self.unsolicited.subscribe()
    }

    pub fn subscribe_diagnostics(&self) -> broadcast::Receiver<FrameDiagnostic> {
        self.diagnostics.subscribe()
    }

    pub fn store(&self) -> &Arc<PendingCallStore> {
        &self.store
    }
}
