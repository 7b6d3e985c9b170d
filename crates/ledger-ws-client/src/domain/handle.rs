//! Caller side of one in-flight call.

use crate::commands::Command;
use crate::domain::call_id::CallId;
use crate::domain::error::{messages, CallError, CallResult};
use crate::domain::pending::{CallOutcome, PendingCallStore};
use std::marker::PhantomData;
use std::sync::Weak;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::Instant;

/// Handle to one issued call. Awaiting it yields the call's typed outcome.
///
/// Dropping a handle before its outcome has been read removes the call from
/// the registry, so a response arriving later is treated as an orphan.
#[must_use = "dropping a CallHandle cancels the call"]
pub struct CallHandle<C: Command> {
    id: CallId,
    payload: String,
    receiver: oneshot::Receiver<CallOutcome>,
    store: Weak<PendingCallStore>,
    settled: bool,
    _command: PhantomData<fn() -> C>,
}

impl<C: Command> CallHandle<C> {
    pub(crate) fn new(
        id: CallId,
        payload: String,
        receiver: oneshot::Receiver<CallOutcome>,
        store: Weak<PendingCallStore>,
    ) -> Self {
        Self {
            id,
            payload,
            receiver,
            store,
            settled: false,
            _command: PhantomData,
        }
    }

    pub fn id(&self) -> CallId {
        self.id
    }

    /// The envelope text that was sent.
    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// Waits for the outcome with no deadline beyond the one the call was
    /// registered with.
    pub async fn wait(mut self) -> CallResult<C::Output> {
        let received = (&mut self.receiver).await;
        self.settled = true;
        Self::unpack(received)
    }

    /// Waits at most `timeout`. A timeout too large to express as an
    /// instant waits without a deadline.
    pub async fn wait_timeout(self, timeout: Duration) -> CallResult<C::Output> {
        match deadline_after(timeout) {
            Some(deadline) => self.wait_until(deadline).await,
            None => self.wait().await,
        }
    }

    /// Waits until `deadline`, then fails the call with a local timeout
    /// error and removes it from the registry.
    ///
    /// If the response was already taken off the registry when the deadline
    /// passed, that response is returned instead of a timeout.
    pub async fn wait_until(mut self, deadline: Instant) -> CallResult<C::Output> {
        let received = match tokio::time::timeout_at(deadline, &mut self.receiver).await {
            Ok(received) => received,
            Err(_) => match self.store.upgrade() {
                // Whoever removed the entry resolves it through this channel:
                // expire() just did, or the listener is about to.
                Some(store) => {
                    store.expire(self.id);
                    (&mut self.receiver).await
                }
                None => Ok(Err(CallError::local(messages::TIMED_OUT))),
            },
        };
        self.settled = true;
        Self::unpack(received)
    }

    fn unpack(received: Result<CallOutcome, oneshot::error::RecvError>) -> CallResult<C::Output> {
        let result = received.map_err(|_| CallError::local(messages::CANCELLED))??;
        C::from_result(result).ok_or_else(|| {
            CallError::decode(C::KIND.wire_name(), "result belongs to another command kind")
        })
    }
}

/// `now + timeout`, or `None` when that overflows the clock.
pub(crate) fn deadline_after(timeout: Duration) -> Option<Instant> {
    Instant::now().checked_add(timeout)
}

impl<C: Command> Drop for CallHandle<C> {
    fn drop(&mut self) {
        if !self.settled {
            if let Some(store) = self.store.upgrade() {
                store.cancel(self.id);
            }
        }
    }
}

impl<C: Command> std::fmt::Debug for CallHandle<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallHandle")
            .field("id", &self.id)
            .field("command", &C::KIND)
            .field("settled", &self.settled)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{CommandResult, FeeRequest, FeeResult, TxRequest};
    use crate::domain::call_id::CallIdAllocator;
    use std::sync::Arc;

    fn setup() -> Arc<PendingCallStore> {
        Arc::new(PendingCallStore::new(Arc::new(CallIdAllocator::new())))
    }

    fn issue<C: Command>(store: &Arc<PendingCallStore>) -> CallHandle<C> {
        let id = store.next_id();
        let receiver = store.register(id, C::KIND, None);
        CallHandle::new(id, String::new(), receiver, Arc::downgrade(store))
    }

    #[tokio::test]
    async fn test_wait_returns_typed_output() {
        let store = setup();
        let handle = issue::<FeeRequest>(&store);
        store
            .take(handle.id())
            .unwrap()
            .complete(CommandResult::Fee(FeeResult::default()));
        assert_eq!(handle.wait().await.unwrap(), FeeResult::default());
    }

    #[tokio::test]
    async fn test_mismatched_result_is_decode_error() {
        let store = setup();
        let handle = issue::<TxRequest>(&store);
        store
            .take(handle.id())
            .unwrap()
            .complete(CommandResult::Fee(FeeResult::default()));
        let err = handle.wait().await.unwrap_err();
        assert!(matches!(err, CallError::Decode { command: "tx", .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_timeout_removes_call() {
        let store = setup();
        let handle = issue::<FeeRequest>(&store);
        let id = handle.id();

        let err = handle.wait_timeout(Duration::from_millis(20)).await.unwrap_err();
        assert!(err.is_timeout());
        assert!(!store.is_pending(id));
        assert_eq!(store.stats().snapshot().timeouts, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_response_before_deadline_wins() {
        let store = setup();
        let handle = issue::<FeeRequest>(&store);
        let call = store.take(handle.id()).unwrap();
        call.complete(CommandResult::Fee(FeeResult::default()));
        assert!(handle.wait_timeout(Duration::from_secs(1)).await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_response_taken_before_deadline_is_not_a_timeout() {
        let store = setup();
        let handle = issue::<FeeRequest>(&store);
        let call = store.take(handle.id()).unwrap();

        let waiter = tokio::spawn(handle.wait_timeout(Duration::from_millis(20)));
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!waiter.is_finished());

        call.complete(CommandResult::Fee(FeeResult::default()));
        assert_eq!(waiter.await.unwrap().unwrap(), FeeResult::default());
        let stats = store.stats().snapshot();
        assert_eq!(stats.timeouts, 0);
        assert_eq!(stats.completed, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unbounded_wait_timeout() {
        let store = setup();
        let handle = issue::<FeeRequest>(&store);
        let call = store.take(handle.id()).unwrap();

        let waiter = tokio::spawn(handle.wait_timeout(Duration::MAX));
        tokio::time::sleep(Duration::from_secs(86_400)).await;
        call.complete(CommandResult::Fee(FeeResult::default()));
        assert!(waiter.await.unwrap().is_ok());
    }

    #[test]
    fn test_wait_is_pending_until_resolved() {
        let store = setup();
        let handle = issue::<FeeRequest>(&store);
        let id = handle.id();

        let mut waiter = tokio_test::task::spawn(handle.wait());
        tokio_test::assert_pending!(waiter.poll());

        store
            .take(id)
            .unwrap()
            .complete(CommandResult::Fee(FeeResult::default()));
        assert!(waiter.is_woken());
        let outcome = tokio_test::assert_ready!(waiter.poll());
        assert_eq!(outcome.unwrap(), FeeResult::default());
    }

    #[tokio::test]
    async fn test_drop_cancels_call() {
        let store = setup();
        let handle = issue::<FeeRequest>(&store);
        let id = handle.id();
        assert!(store.is_pending(id));

        drop(handle);
        assert!(!store.is_pending(id));
        assert_eq!(store.stats().snapshot().cancelled, 1);
    }

    #[tokio::test]
    async fn test_aborted_wait_cancels_call() {
        let store = setup();
        let handle = issue::<FeeRequest>(&store);
        let id = handle.id();

        let waiter = tokio::spawn(handle.wait());
        tokio::task::yield_now().await;
        waiter.abort();
        let _ = waiter.await;

        assert!(!store.is_pending(id));
    }

    #[tokio::test]
    async fn test_settled_handle_does_not_cancel() {
        let store = setup();
        let handle = issue::<FeeRequest>(&store);
        store.fail_all("gone");
        assert!(handle.wait().await.is_err());
        assert_eq!(store.stats().snapshot().cancelled, 0);
    }
}
