//! Pending call store: the registry from call identifier to waiting caller.
//!
//! Flow:
//! 1. The dispatcher takes a fresh [`CallId`] from the store's allocator
//! 2. It calls `register()` to get a oneshot receiver for the outcome
//! 3. It sends the request envelope
//! 4. The frame listener calls `take()` for the matching response and
//!    resolves the returned [`PendingCall`]
//! 5. The caller awaits the receiver through its `CallHandle`
//!
//! A [`PendingCall`] is resolved by value, so each call's outcome is sent at
//! most once. Removal from the map and resolution are separate steps: whoever
//! removes the entry owns the only right to resolve it.

use crate::commands::{CommandKind, CommandResult};
use crate::domain::call_id::{CallId, CallIdAllocator};
use crate::domain::error::{messages, CallError, CommandError};
use dashmap::DashMap;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Outcome delivered to a caller.
pub type CallOutcome = Result<CommandResult, CallError>;

/// Counters for the call lifecycle.
#[derive(Debug, Default)]
pub struct CallStats {
    /// Calls registered
    pub issued: AtomicU64,
    /// Calls resolved with a decoded result
    pub completed: AtomicU64,
    /// Calls resolved with a node-reported error
    pub remote_errors: AtomicU64,
    /// Calls resolved with a locally synthesised error
    pub local_failures: AtomicU64,
    /// Calls whose result body could not be decoded
    pub decode_failures: AtomicU64,
    /// Calls failed for passing their deadline
    pub timeouts: AtomicU64,
    /// Calls abandoned by their caller
    pub cancelled: AtomicU64,
    /// Responses for no pending call
    pub orphan_frames: AtomicU64,
    /// Frames that could not be parsed far enough to route
    pub malformed_frames: AtomicU64,
    /// Frames with a type other than `response`
    pub unsolicited_frames: AtomicU64,
}

/// Point-in-time copy of [`CallStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct StatsSnapshot {
    pub issued: u64,
    pub completed: u64,
    pub remote_errors: u64,
    pub local_failures: u64,
    pub decode_failures: u64,
    pub timeouts: u64,
    pub cancelled: u64,
    pub orphan_frames: u64,
    pub malformed_frames: u64,
    pub unsolicited_frames: u64,
}

impl CallStats {
    pub fn snapshot(&self) -> StatsSnapshot {
        let load = |c: &AtomicU64| c.load(Ordering::Relaxed);
        StatsSnapshot {
            issued: load(&self.issued),
            completed: load(&self.completed),
            remote_errors: load(&self.remote_errors),
            local_failures: load(&self.local_failures),
            decode_failures: load(&self.decode_failures),
            timeouts: load(&self.timeouts),
            cancelled: load(&self.cancelled),
            orphan_frames: load(&self.orphan_frames),
            malformed_frames: load(&self.malformed_frames),
            unsolicited_frames: load(&self.unsolicited_frames),
        }
    }

    pub(crate) fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn counter_for(&self, outcome: &CallOutcome) -> &AtomicU64 {
        match outcome {
            Ok(_) => &self.completed,
            Err(CallError::Remote(_)) => &self.remote_errors,
            Err(CallError::Local(_)) => &self.local_failures,
            Err(CallError::Decode { .. }) => &self.decode_failures,
        }
    }
}

/// One registered call, owned by whoever removed it from the store.
#[derive(Debug)]
pub struct PendingCall {
    id: CallId,
    kind: CommandKind,
    sender: oneshot::Sender<CallOutcome>,
    created_at: Instant,
    deadline: Option<Instant>,
    stats: Arc<CallStats>,
}

impl PendingCall {
    pub fn id(&self) -> CallId {
        self.id
    }

    pub fn kind(&self) -> CommandKind {
        self.kind
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    fn is_expired(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|deadline| deadline <= now)
    }

    /// Resolves with a decoded result.
    pub fn complete(self, result: CommandResult) -> bool {
        self.resolve(Ok(result))
    }

    /// Resolves with a local error carrying `message`.
    pub fn fail(self, message: impl Into<String>) -> bool {
        self.resolve(Err(CallError::local(message)))
    }

    /// Resolves with a node-reported error.
    pub fn reject(self, error: CommandError) -> bool {
        self.resolve(Err(CallError::Remote(error)))
    }

    /// Delivers `outcome` to the caller.
    ///
    /// Returns false if the caller has already gone away.
    pub fn resolve(self, outcome: CallOutcome) -> bool {
        let response_time = self.created_at.elapsed();
        let counter = self.stats.counter_for(&outcome);
        let succeeded = outcome.is_ok();

        match self.sender.send(outcome) {
            Ok(()) => {
                CallStats::bump(counter);
                debug!(
                    call_id = %self.id,
                    command = self.kind.wire_name(),
                    success = succeeded,
                    response_time_ms = response_time.as_millis() as u64,
                    "Resolved pending call"
                );
                true
            }
            Err(_) => {
                CallStats::bump(&self.stats.cancelled);
                debug!(
                    call_id = %self.id,
                    command = self.kind.wire_name(),
                    "Pending call receiver dropped"
                );
                false
            }
        }
    }
}

/// Registry of calls awaiting a response.
#[derive(Debug)]
pub struct PendingCallStore {
    calls: DashMap<CallId, PendingCall>,
    allocator: Arc<CallIdAllocator>,
    stats: Arc<CallStats>,
}

impl PendingCallStore {
    pub fn new(allocator: Arc<CallIdAllocator>) -> Self {
        Self {
            calls: DashMap::new(),
            allocator,
            stats: Arc::new(CallStats::default()),
        }
    }

    pub fn next_id(&self) -> CallId {
        self.allocator.next()
    }

    /// Registers a call and returns the receiver for its outcome.
    pub fn register(
        &self,
        id: CallId,
        kind: CommandKind,
        deadline: Option<Instant>,
    ) -> oneshot::Receiver<CallOutcome> {
        let (sender, receiver) = oneshot::channel();
        let call = PendingCall {
            id,
            kind,
            sender,
            created_at: Instant::now(),
            deadline,
            stats: Arc::clone(&self.stats),
        };

        self.calls.insert(id, call);
        CallStats::bump(&self.stats.issued);

        debug!(call_id = %id, command = kind.wire_name(), "Registered pending call");

        receiver
    }

    /// Removes a call, handing the caller the sole right to resolve it.
    pub fn take(&self, id: CallId) -> Option<PendingCall> {
        self.calls.remove(&id).map(|(_, call)| call)
    }

    /// Removes a call without resolving it.
    pub fn cancel(&self, id: CallId) -> bool {
        if self.calls.remove(&id).is_some() {
            CallStats::bump(&self.stats.cancelled);
            debug!(call_id = %id, "Cancelled pending call");
            true
        } else {
            false
        }
    }

    /// Fails a call with a timeout error if it is still pending.
    pub fn expire(&self, id: CallId) -> bool {
        match self.take(id) {
            Some(call) => {
                warn!(
                    call_id = %id,
                    command = call.kind.wire_name(),
                    elapsed_ms = call.created_at.elapsed().as_millis() as u64,
                    "Pending call timed out"
                );
                CallStats::bump(&self.stats.timeouts);
                call.fail(messages::TIMED_OUT);
                true
            }
            None => false,
        }
    }

    /// Fails every call whose deadline has passed.
    ///
    /// Returns the number of calls failed.
    pub fn remove_expired(&self) -> usize {
        let now = Instant::now();
        let expired: Vec<CallId> = self
            .calls
            .iter()
            .filter(|entry| entry.value().is_expired(now))
            .map(|entry| *entry.key())
            .collect();

        expired.into_iter().filter(|id| self.expire(*id)).count()
    }

    /// Fails every pending call with a local error carrying `message`.
    ///
    /// Returns the number of calls failed.
    pub fn fail_all(&self, message: &str) -> usize {
        let ids: Vec<CallId> = self.calls.iter().map(|entry| *entry.key()).collect();
        let mut failed = 0;
        for id in ids {
            if let Some(call) = self.take(id) {
                call.fail(message);
                failed += 1;
            }
        }
        if failed > 0 {
            warn!(failed = failed, reason = message, "Failed all pending calls");
        }
        failed
    }

    /// Get number of currently pending calls
    pub fn pending_count(&self) -> usize {
        self.calls.len()
    }

    pub fn is_pending(&self, id: CallId) -> bool {
        self.calls.contains_key(&id)
    }

    pub fn stats(&self) -> &Arc<CallStats> {
        &self.stats
    }
}

/// Background task failing calls that outlived their deadline.
pub async fn reaper_task(store: Arc<PendingCallStore>, interval: Duration) {
    let mut sweep = tokio::time::interval(interval);
    sweep.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        sweep.tick().await;
        let reaped = store.remove_expired();
        if reaped > 0 {
            debug!(reaped = reaped, "Reaped expired pending calls");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::FeeResult;

    fn store() -> PendingCallStore {
        PendingCallStore::new(Arc::new(CallIdAllocator::new()))
    }

    fn fee_result() -> CommandResult {
        CommandResult::Fee(FeeResult::default())
    }

    #[tokio::test]
    async fn test_register_and_complete() {
        let store = store();
        let id = store.next_id();
        let rx = store.register(id, CommandKind::Fee, None);
        assert!(store.is_pending(id));
        assert_eq!(store.pending_count(), 1);

        let call = store.take(id).unwrap();
        assert!(call.complete(fee_result()));

        assert_eq!(rx.await.unwrap().unwrap(), fee_result());
        assert_eq!(store.pending_count(), 0);
        assert_eq!(store.stats().snapshot().completed, 1);
    }

    #[tokio::test]
    async fn test_take_is_exactly_once() {
        let store = store();
        let id = store.next_id();
        let _rx = store.register(id, CommandKind::Fee, None);
        assert!(store.take(id).is_some());
        assert!(store.take(id).is_none());
    }

    #[tokio::test]
    async fn test_reject_carries_remote_error() {
        let store = store();
        let id = store.next_id();
        let rx = store.register(id, CommandKind::Tx, None);
        let error = CommandError {
            name: "txnNotFound".into(),
            code: 29,
            message: "Transaction not found.".into(),
            exception: String::new(),
        };
        store.take(id).unwrap().reject(error.clone());

        assert_eq!(rx.await.unwrap(), Err(CallError::Remote(error)));
        assert_eq!(store.stats().snapshot().remote_errors, 1);
    }

    #[tokio::test]
    async fn test_resolve_after_receiver_dropped() {
        let store = store();
        let id = store.next_id();
        drop(store.register(id, CommandKind::Fee, None));
        assert!(!store.take(id).unwrap().complete(fee_result()));
        assert_eq!(store.stats().snapshot().cancelled, 1);
        assert_eq!(store.stats().snapshot().completed, 0);
    }

    #[tokio::test]
    async fn test_cancel() {
        let store = store();
        let id = store.next_id();
        let _rx = store.register(id, CommandKind::Fee, None);

        assert!(store.cancel(id));
        assert!(!store.is_pending(id));
        assert!(!store.cancel(id));
    }

    #[tokio::test(start_paused = true)]
    async fn test_remove_expired() {
        let store = store();
        let short = store.next_id();
        let long = store.next_id();
        let none = store.next_id();
        let now = Instant::now();
        let short_rx = store.register(short, CommandKind::Fee, Some(now + Duration::from_millis(10)));
        let _long_rx = store.register(long, CommandKind::Fee, Some(now + Duration::from_secs(60)));
        let _none_rx = store.register(none, CommandKind::Fee, None);

        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(store.remove_expired(), 1);
        assert!(!store.is_pending(short));
        assert!(store.is_pending(long));
        assert!(store.is_pending(none));

        let outcome = short_rx.await.unwrap();
        assert!(outcome.unwrap_err().is_timeout());
        assert_eq!(store.stats().snapshot().timeouts, 1);
    }

    #[tokio::test]
    async fn test_fail_all() {
        let store = store();
        let receivers: Vec<_> = (0..3)
            .map(|_| store.register(store.next_id(), CommandKind::AccountTx, None))
            .collect();

        assert_eq!(store.fail_all(messages::CONNECTION_CLOSED), 3);
        assert_eq!(store.pending_count(), 0);
        for rx in receivers {
            let err = rx.await.unwrap().unwrap_err();
            assert_eq!(err, CallError::local(messages::CONNECTION_CLOSED));
        }
        assert_eq!(store.stats().snapshot().local_failures, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reaper_task() {
        let store = Arc::new(store());
        let id = store.next_id();
        let rx = store.register(id, CommandKind::Fee, Some(Instant::now() + Duration::from_secs(1)));

        let reaper = tokio::spawn(reaper_task(Arc::clone(&store), Duration::from_millis(100)));
        let outcome = rx.await.unwrap();
        assert!(outcome.unwrap_err().is_timeout());
        reaper.abort();
    }
}
