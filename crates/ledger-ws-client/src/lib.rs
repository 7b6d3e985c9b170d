//! Ledger WS Client - command/response correlation for a duplex JSON
//! connection to a ledger node.
//!
//! Callers issue typed commands; the node answers out of band and in any
//! order. This crate matches each response to the call that asked for it,
//! decodes the command-specific result and hands it to the waiting caller
//! exactly once.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │                           LedgerClient                                │
//! │   request / issue / pages ──┐                                        │
//! │                             ▼                                        │
//! │  ┌────────────────────────────────────────┐    ┌──────────────────┐  │
//! │  │              Dispatcher                │───▶│   FrameSender    │──┼──▶ node
//! │  │  encode envelope, register, route      │    └──────────────────┘  │
//! │  └───────┬──────────────────────▲─────────┘                          │
//! │          │ register             │ on_inbound_frame                   │
//! │  ┌───────▼──────────────┐  ┌────┴─────────────┐  ┌──────────────────┐│
//! │  │  PendingCallStore    │  │  FrameListener   │◀─│  FrameReceiver   │◀──── node
//! │  │  CallId → oneshot    │  │  (single reader) │  └──────────────────┘│
//! │  └───────┬──────────────┘  └──────────────────┘                      │
//! │          │ resolve (exactly once)                                    │
//! │  ┌───────▼──────────────┐   unsolicited ──▶ broadcast<Value>         │
//! │  │     CallHandle<C>    │   malformed   ──▶ broadcast<FrameDiagnostic>│
//! │  └──────────────────────┘                                            │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use ledger_ws_client::{ClientConfig, LedgerClient};
//!
//! let client = LedgerClient::connect(ClientConfig::from_env(), sender, receiver)?;
//! let tx = client.tx(hash).await?;
//! if tx.validated {
//!     println!("{}", tx.transaction.kind());
//! }
//! ```
//!
//! # Failure model
//!
//! - Node-reported errors, local failures (timeout, cancellation, transport
//!   loss) and decode failures all arrive through the call's own outcome.
//! - Responses for calls nobody waits for are dropped and counted.
//! - Unparsable frames are logged, counted and published as diagnostics.

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod client;
pub mod commands;
pub mod dispatcher;
pub mod domain;
pub mod listener;
pub mod ports;
pub mod telemetry;

pub use client::LedgerClient;
pub use commands::{Command, CommandKind, CommandResult, LedgerSelector, Marker, Paginated};
pub use dispatcher::{Dispatcher, FrameDiagnostic, FrameDisposition};
pub use domain::{
    CallError, CallHandle, CallId, CallIdAllocator, CallResult, ClientConfig, ClientError,
    CommandError, StatsSnapshot,
};
pub use ports::transport::channel;
pub use ports::{FrameReceiver, FrameSender, TransportError};
pub use telemetry::{init_tracing, TelemetryConfig, TelemetryError};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
