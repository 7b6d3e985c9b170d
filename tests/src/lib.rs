//! # Ledger WS Client Test Suite
//!
//! End-to-end scenarios that drive a [`ledger_ws_client::LedgerClient`] over
//! an in-memory connection against a scripted node.
//!
//! ## Structure
//!
//! ```text
//! tests/
//! └── src/
//!     └── integration/
//!         ├── support.rs       # Scripted node and client fixtures
//!         ├── correlation.rs   # Out-of-order responses, errors, orphans
//!         ├── pagination.rs    # Marker threading across pages
//!         └── lifecycle.rs     # Timeouts, cancellation, transport loss
//! ```
//!
//! ## Running
//!
//! ```bash
//! cargo test -p ledger-tests
//! ```

#![allow(dead_code)]

pub mod integration;
