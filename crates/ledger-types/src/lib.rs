//! # Ledger Types Crate
//!
//! The ledger model consumed by the client core: value types, transactions,
//! ledger headers and state entries as the node renders them in JSON.
//!
//! ## Design Principles
//!
//! - **Text is the contract**: every value type parses from its wire text and
//!   renders back through `Display`.
//! - **Open polymorphism**: transactions and state entries are selected by a
//!   discriminator field; unknown kinds decode into an `Other` variant that
//!   keeps every field instead of failing.

pub mod errors;
pub mod ledger;
pub mod paths;
pub mod primitives;
mod tagged;
pub mod transactions;

pub use errors::ModelError;
pub use ledger::*;
pub use paths::{Path, PathElem, PathSet};
pub use primitives::*;
pub use transactions::*;
