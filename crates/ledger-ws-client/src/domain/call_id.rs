//! Call identifiers and their allocator.
//!
//! Identifiers are plain integers on the wire. The allocator is an explicit
//! service handed to the dispatcher; [`global`] gives the process-wide
//! instance for callers that do not need their own numbering.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

/// Identifier correlating one outbound command with its inbound response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallId(u64);

impl CallId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for CallId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// Issues strictly increasing call identifiers, starting at 1.
///
/// Safe to share between tasks and threads: concurrent callers never receive
/// the same value.
#[derive(Debug, Default)]
pub struct CallIdAllocator {
    last: AtomicU64,
}

impl CallIdAllocator {
    pub const fn new() -> Self {
        Self::starting_after(0)
    }

    /// Allocator whose first identifier is `last + 1`.
    pub const fn starting_after(last: u64) -> Self {
        Self {
            last: AtomicU64::new(last),
        }
    }

    pub fn next(&self) -> CallId {
        CallId(self.last.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Most recently issued value, or the starting point if none was issued.
    pub fn last_issued(&self) -> u64 {
        self.last.load(Ordering::SeqCst)
    }
}

static GLOBAL: OnceLock<Arc<CallIdAllocator>> = OnceLock::new();

/// The process-wide allocator, created on first use and never reset.
pub fn global() -> Arc<CallIdAllocator> {
    GLOBAL
        .get_or_init(|| Arc::new(CallIdAllocator::new()))
        .clone()
}
