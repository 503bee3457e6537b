//! Reactive, retryable remote data sources.
//!
//! A [`Query`] wraps a producer (a function issuing one remote call) and
//! mirrors its latest outcome into an [`Observable`] of [`QueryState`].
//!
//! ```text
//! activate ──→ Loading ──→ Ok(value)
//!                 │  ↑
//!                 ↓  │ timed retry (Network only, bounded)
//!               Error(kind) ──refetch──→ Loading
//! ```
//!
//! # Invariants
//!
//! 1. Every invocation gets the next sequence number; only the result of
//!    the most recently issued invocation is committed.
//! 2. After `deactivate` (or once every handle is dropped) no result,
//!    retry, or refetch touches the state.
//! 3. `Network` failures are retried on a fixed interval at most
//!    `max_retry_attempts` times per manual fetch; other kinds never are.
//! 4. Every committed `Unauthorized` outcome clears the session; clearing
//!    an absent session is a silent no-op.
//!
//! Must be driven from inside a Tokio runtime.

mod options;
mod state;

use std::future::Future;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio::task::JoinHandle;

use crate::client::FaultReporter;
use crate::reactive::{Observable, Subscription};
use crate::session::SessionStore;
use crate::transport::{CallFuture, ErrorKind, RemoteCallResult, TransportFault};

pub use options::{QueryOptions, DEFAULT_MAX_RETRY_ATTEMPTS, DEFAULT_RETRY_INTERVAL};
pub use state::QueryState;

/// Function issuing one invocation of a query's remote call.
pub type Producer<T> = Arc<dyn Fn() -> CallFuture<T> + Send + Sync>;

/// Box an async closure into a [`Producer`].
pub fn producer<T, F, Fut>(f: F) -> Producer<T>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<RemoteCallResult<T>, TransportFault>> + Send + 'static,
{
    Arc::new(move || -> CallFuture<T> { Box::pin(f()) })
}

#[derive(Default)]
struct Control {
    active: bool,
    /// Sequence number of the latest invocation.
    issued: u64,
    /// Sequence number of the latest committed result.
    committed: u64,
    /// Automatic retries since the last manual fetch.
    attempts: u32,
    retry: Option<JoinHandle<()>>,
}

impl Control {
    fn cancel_retry(&mut self) {
        if let Some(handle) = self.retry.take() {
            handle.abort();
        }
    }
}

struct QueryInner<T> {
    state: Observable<QueryState<T>>,
    producer: Producer<T>,
    options: QueryOptions,
    session: SessionStore,
    faults: FaultReporter,
    control: Mutex<Control>,
}

/// Handle to a query. Clones share the same state and lifecycle.
pub struct Query<T> {
    inner: Arc<QueryInner<T>>,
}

impl<T> Clone for Query<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> Query<T> {
    /// Create an inactive query. Nothing is fetched until [`activate`](Self::activate).
    pub fn new(
        producer: Producer<T>,
        options: QueryOptions,
        session: SessionStore,
        faults: FaultReporter,
    ) -> Self {
        Self {
            inner: Arc::new(QueryInner {
                state: Observable::new(QueryState::Loading),
                producer,
                options,
                session,
                faults,
                control: Mutex::new(Control::default()),
            }),
        }
    }

    /// Mount the query and issue the first invocation. No-op if already active.
    pub fn activate(&self) -> &Self {
        {
            let mut control = self.inner.control.lock();
            if control.active {
                return self;
            }
            control.active = true;
            control.attempts = 0;
        }
        QueryInner::invoke(&self.inner);
        self
    }

    /// Cancel any pending retry and invoke the producer again.
    ///
    /// Results of invocations still in flight are discarded when they land.
    pub fn refetch(&self) {
        {
            let mut control = self.inner.control.lock();
            if !control.active {
                tracing::debug!("Ignoring refetch of an inactive query");
                return;
            }
            control.cancel_retry();
            control.attempts = 0;
        }
        QueryInner::invoke(&self.inner);
    }

    /// Unmount the query: cancel timers and ignore late results.
    pub fn deactivate(&self) {
        let mut control = self.inner.control.lock();
        control.active = false;
        control.cancel_retry();
    }

    pub fn is_active(&self) -> bool {
        self.inner.control.lock().active
    }

    /// Automatic retries performed since the last manual fetch.
    pub fn attempts(&self) -> u32 {
        self.inner.control.lock().attempts
    }

    pub fn options(&self) -> &QueryOptions {
        &self.inner.options
    }

    /// The observable state. Mutations edit the `Ok` payload through it.
    pub fn state(&self) -> &Observable<QueryState<T>> {
        &self.inner.state
    }

    /// Snapshot of the current state.
    pub fn get(&self) -> QueryState<T> {
        self.inner.state.get()
    }

    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe(
        &self,
        callback: impl Fn(&QueryState<T>) + Send + Sync + 'static,
    ) -> Subscription {
        self.inner.state.subscribe(callback)
    }

    /// Sequence number of the latest committed result.
    pub(crate) fn committed_seq(&self) -> u64 {
        self.inner.control.lock().committed
    }

    pub(crate) fn session(&self) -> &SessionStore {
        &self.inner.session
    }
}

impl<T: Clone + Send + Sync + 'static> QueryInner<T> {
    fn invoke(this: &Arc<Self>) {
        let seq = {
            let mut control = this.control.lock();
            if !control.active {
                return;
            }
            control.issued += 1;
            control.issued
        };

        if this.options.clear_while_fetching && !this.state.with(QueryState::is_loading) {
            this.state.set(QueryState::Loading);
        }

        let call = (this.producer)();
        let weak = Arc::downgrade(this);
        tokio::spawn(async move {
            let outcome = call.await;
            match weak.upgrade() {
                Some(inner) => inner.commit(seq, outcome),
                None => tracing::trace!(seq, "Query dropped before its call resolved"),
            }
        });
    }

    fn commit(self: &Arc<Self>, seq: u64, outcome: Result<RemoteCallResult<T>, TransportFault>) {
        let mut control = self.control.lock();
        if !control.active {
            tracing::trace!(seq, "Dropping result for inactive query");
            return;
        }
        if seq != control.issued {
            tracing::trace!(seq, latest = control.issued, "Discarding superseded query result");
            return;
        }

        let result = match outcome {
            Ok(result) => result,
            Err(fault) => {
                drop(control);
                tracing::error!(
                    method = fault.method(),
                    fault_type = fault.fault_type(),
                    "Query producer failed: {}",
                    fault
                );
                (self.faults)(&fault);
                return;
            }
        };

        control.committed = seq;
        let clear_session = matches!(result, Err(ErrorKind::Unauthorized));
        if matches!(result, Err(ErrorKind::Network)) {
            self.schedule_retry(&mut control);
        }
        drop(control);

        self.state.set(QueryState::from(result));
        if clear_session {
            self.session.invalidate();
        }
    }

    fn schedule_retry(self: &Arc<Self>, control: &mut Control) {
        if control.attempts >= self.options.max_retry_attempts {
            tracing::debug!(
                attempts = control.attempts,
                "Retry attempts exhausted, leaving query in error"
            );
            return;
        }
        control.attempts += 1;
        tracing::debug!(
            attempt = control.attempts,
            interval_ms = self.options.retry_interval.as_millis() as u64,
            "Scheduling query retry"
        );

        let weak: Weak<Self> = Arc::downgrade(self);
        let interval = self.options.retry_interval;
        control.cancel_retry();
        control.retry = Some(tokio::spawn(async move {
            tokio::time::sleep(interval).await;
            if let Some(inner) = weak.upgrade() {
                inner.control.lock().retry = None;
                QueryInner::invoke(&inner);
            }
        }));
    }
}

impl<T> Drop for QueryInner<T> {
    fn drop(&mut self) {
        self.control.get_mut().cancel_retry();
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Query<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let control = self.inner.control.lock();
        f.debug_struct("Query")
            .field("state", &self.inner.state)
            .field("active", &control.active)
            .field("issued", &control.issued)
            .field("attempts", &control.attempts)
            .finish()
    }
}
