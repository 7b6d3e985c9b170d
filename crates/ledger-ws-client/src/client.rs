//! Client façade: owns the dispatcher and its background tasks.

use crate::commands::*;
use crate::dispatcher::{Dispatcher, FrameDiagnostic};
use crate::domain::call_id::{self, CallIdAllocator};
use crate::domain::config::ClientConfig;
use crate::domain::error::{messages, CallResult, ClientError};
use crate::domain::handle::{deadline_after, CallHandle};
use crate::domain::pending::{reaper_task, PendingCallStore, StatsSnapshot};
use crate::listener::FrameListener;
use crate::ports::{FrameReceiver, FrameSender};
use futures::stream::{self, Stream, TryStreamExt};
use ledger_types::{Account, Amount, Asset, Hash256};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::info;

/// A client bound to one duplex connection.
///
/// Creating one spawns the frame listener and the deadline reaper on the
/// current tokio runtime; dropping it stops both.
pub struct LedgerClient {
    config: ClientConfig,
    dispatcher: Arc<Dispatcher>,
    listener: JoinHandle<()>,
    reaper: JoinHandle<()>,
}

impl LedgerClient {
    /// Create a client numbering its calls from the process-wide allocator
    pub fn connect(
        config: ClientConfig,
        sender: Arc<dyn FrameSender>,
        receiver: Arc<dyn FrameReceiver>,
    ) -> Result<Self, ClientError> {
        Self::connect_with_allocator(config, call_id::global(), sender, receiver)
    }

    /// Create a client numbering its calls from `allocator`
    pub fn connect_with_allocator(
        config: ClientConfig,
        allocator: Arc<CallIdAllocator>,
        sender: Arc<dyn FrameSender>,
        receiver: Arc<dyn FrameReceiver>,
    ) -> Result<Self, ClientError> {
        config.validate()?;
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| ClientError::NoRuntime)?;

        let store = Arc::new(PendingCallStore::new(allocator));
        let dispatcher = Arc::new(Dispatcher::new(&config, Arc::clone(&store), sender));

        let listener = runtime.spawn(FrameListener::new(Arc::clone(&dispatcher), receiver).run());
        let reaper = runtime.spawn(reaper_task(store, config.reaper_interval));

        info!(
            default_timeout_ms = config.default_timeout.as_millis() as u64,
            max_frame_size = config.max_frame_size,
            "Ledger client started"
        );

        Ok(Self {
            config,
            dispatcher,
            listener,
            reaper,
        })
    }

    // =========================================================================
    // GENERIC CALLS
    // =========================================================================

    /// Issue `command` and wait for its outcome under the default timeout.
    pub async fn request<C: Command>(&self, command: &C) -> CallResult<C::Output> {
        self.request_with_timeout(command, self.config.default_timeout)
            .await
    }

    pub async fn request_with_timeout<C: Command>(
        &self,
        command: &C,
        timeout: Duration,
    ) -> CallResult<C::Output> {
        match deadline_after(timeout) {
            Some(deadline) => {
                let handle = self.dispatcher.issue(command, Some(deadline)).await?;
                handle.wait_until(deadline).await
            }
            None => self.dispatcher.issue(command, None).await?.wait().await,
        }
    }

    /// Issue `command` and return its handle without waiting. The default
    /// timeout still applies through the reaper.
    pub async fn issue<C: Command>(&self, command: &C) -> CallResult<CallHandle<C>> {
        let deadline = deadline_after(self.config.default_timeout);
        self.dispatcher.issue(command, deadline).await
    }

    /// Pages of a listing, starting from `first` and following markers
    /// until a page carries none. The stream ends after the first error.
    pub fn pages<C: Paginated>(&self, first: C) -> impl Stream<Item = CallResult<C::Output>> + '_ {
        stream::unfold(Some(first), move |state| async move {
            let request = state?;
            match self.request(&request).await {
                Ok(page) => {
                    let next = next_request(&request, &page);
                    Some((Ok(page), next))
                }
                Err(e) => Some((Err(e), None)),
            }
        })
    }

    pub async fn collect_pages<C: Paginated>(&self, first: C) -> CallResult<Vec<C::Output>> {
        self.pages(first).try_collect().await
    }

    // =========================================================================
    // COMMANDS
    // =========================================================================

    pub async fn account_tx(
        &self,
        account: Account,
        page_size: u32,
        marker: Option<Marker>,
    ) -> CallResult<AccountTxResult> {
        let mut request = AccountTxRequest::new(account, page_size);
        request.marker = marker;
        self.request(&request).await
    }

    pub async fn tx(&self, hash: Hash256) -> CallResult<TxResult> {
        self.request(&TxRequest { transaction: hash }).await
    }

    pub async fn submit(&self, tx_blob: impl Into<String>) -> CallResult<SubmitResult> {
        self.request(&SubmitRequest {
            tx_blob: tx_blob.into(),
        })
        .await
    }

    /// A ledger with its transactions, expanded when `expand` is set.
    pub async fn ledger(&self, ledger: LedgerSelector, expand: bool) -> CallResult<LedgerResult> {
        self.request(&LedgerRequest {
            ledger_index: ledger,
            accounts: false,
            transactions: true,
            expand,
        })
        .await
    }

    pub async fn ledger_header(&self, ledger: LedgerSelector) -> CallResult<LedgerHeaderResult> {
        self.request(&LedgerHeaderRequest { ledger }).await
    }

    pub async fn ledger_data(
        &self,
        ledger: LedgerSelector,
        marker: Option<Marker>,
    ) -> CallResult<LedgerDataResult> {
        self.request(&LedgerDataRequest {
            ledger,
            limit: None,
            marker,
        })
        .await
    }

    pub async fn binary_ledger_data(
        &self,
        ledger: LedgerSelector,
        marker: Option<Marker>,
    ) -> CallResult<BinaryLedgerDataResult> {
        self.request(&BinaryLedgerDataRequest {
            ledger,
            limit: None,
            marker,
        })
        .await
    }

    pub async fn ripple_path_find(
        &self,
        source_account: Account,
        destination_account: Account,
        destination_amount: Amount,
        source_currencies: Option<Vec<Asset>>,
    ) -> CallResult<RipplePathFindResult> {
        self.request(&RipplePathFindRequest {
            source_account,
            source_currencies,
            destination_account,
            destination_amount,
        })
        .await
    }

    pub async fn account_info(
        &self,
        account: Account,
        ledger: Option<LedgerSelector>,
    ) -> CallResult<AccountInfoResult> {
        self.request(&AccountInfoRequest {
            account,
            ledger_index: ledger,
        })
        .await
    }

    pub async fn account_lines(
        &self,
        account: Account,
        limit: u32,
        marker: Option<Marker>,
    ) -> CallResult<AccountLinesResult> {
        self.request(&AccountLinesRequest {
            account,
            limit,
            ledger_index: None,
            marker,
        })
        .await
    }

    pub async fn account_offers(
        &self,
        account: Account,
        limit: u32,
        marker: Option<Marker>,
    ) -> CallResult<AccountOffersResult> {
        self.request(&AccountOffersRequest {
            account,
            limit,
            ledger_index: None,
            marker,
        })
        .await
    }

    pub async fn book_offers(
        &self,
        taker_pays: Asset,
        taker_gets: Asset,
        limit: u32,
    ) -> CallResult<BookOffersResult> {
        self.request(&BookOffersRequest {
            ledger_index: None,
            taker: None,
            taker_pays,
            taker_gets,
            limit,
        })
        .await
    }

    pub async fn fee(&self) -> CallResult<FeeResult> {
        self.request(&FeeRequest::default()).await
    }

    pub async fn server_state(&self) -> CallResult<ServerStateResult> {
        self.request(&ServerStateRequest::default()).await
    }

    // =========================================================================
    // STATE
    // =========================================================================

    /// Frames whose `type` is not `"response"`.
    pub fn subscribe_unsolicited(&self) -> broadcast::Receiver<Value> {
        self.dispatcher.subscribe_unsolicited()
    }

    /// Frames that could not be routed to any call.
    pub fn subscribe_diagnostics(&self) -> broadcast::Receiver<FrameDiagnostic> {
        self.dispatcher.subscribe_diagnostics()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.dispatcher.store().stats().snapshot()
    }

    pub fn pending_count(&self) -> usize {
        self.dispatcher.store().pending_count()
    }

    pub fn is_closed(&self) -> bool {
        self.dispatcher.is_closed()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Fails every pending call with a local error and stops the background
    /// tasks. Later calls fail immediately.
    pub fn shutdown(&self) {
        let failed = self.dispatcher.close(messages::SHUTDOWN);
        self.listener.abort();
        self.reaper.abort();
        info!(failed_calls = failed, "Ledger client shut down");
    }
}

impl Drop for LedgerClient {
    fn drop(&mut self) {
        self.listener.abort();
        self.reaper.abort();
    }
}
