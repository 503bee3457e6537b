//! Root context wiring transport, session and fault handling together.

use std::future::Future;
use std::sync::Arc;

use thiserror::Error;

use crate::api::Api;
use crate::config::{ConfigError, ConfigStore};
use crate::mutation::{Mutation, MutationOptions, RemoteCall};
use crate::query::{producer, Query, QueryOptions};
use crate::session::SessionStore;
use crate::transport::{RemoteCallResult, Transport, TransportFault};

/// Error boundary receiving every fault raised by a query producer.
pub type FaultReporter = Arc<dyn Fn(&TransportFault) + Send + Sync>;

/// Reporter that logs faults and otherwise ignores them.
pub fn log_faults() -> FaultReporter {
    Arc::new(|fault: &TransportFault| {
        tracing::error!(
            method = fault.method(),
            fault_type = fault.fault_type(),
            error = %fault,
            "Remote call fault"
        );
    })
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

/// Entry point: one per application.
///
/// Queries and mutations created through the client share its transport,
/// its session store and its fault reporter.
#[derive(Clone)]
pub struct SyncClient {
    config: ConfigStore,
    api: Api,
    session: SessionStore,
    faults: FaultReporter,
}

impl SyncClient {
    pub fn new(config: ConfigStore) -> Result<Self, ClientError> {
        let transport = Transport::new(&config.backend())?;
        tracing::debug!(host = transport.host(), "Client created");
        Ok(Self {
            config,
            api: Api::new(transport),
            session: SessionStore::new(),
            faults: log_faults(),
        })
    }

    /// Replace the default logging reporter.
    pub fn with_fault_reporter(
        mut self,
        reporter: impl Fn(&TransportFault) + Send + Sync + 'static,
    ) -> Self {
        self.faults = Arc::new(reporter);
        self
    }

    pub fn api(&self) -> &Api {
        &self.api
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn config(&self) -> &ConfigStore {
        &self.config
    }

    /// Build and activate a query with the configured defaults.
    pub fn use_query<T, F, Fut>(&self, fetch: F) -> Query<T>
    where
        T: Clone + Send + Sync + 'static,
        F: Fn(Api) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<RemoteCallResult<T>, TransportFault>> + Send + 'static,
    {
        self.use_query_with(fetch, self.config.query_options())
    }

    /// Build and activate a query with explicit options.
    pub fn use_query_with<T, F, Fut>(&self, fetch: F, options: QueryOptions) -> Query<T>
    where
        T: Clone + Send + Sync + 'static,
        F: Fn(Api) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<RemoteCallResult<T>, TransportFault>> + Send + 'static,
    {
        let api = self.api.clone();
        let query = Query::new(
            producer(move || fetch(api.clone())),
            options,
            self.session.clone(),
            Arc::clone(&self.faults),
        );
        query.activate();
        query
    }

    /// Bind `remote` to the value cached by `query`.
    pub fn use_mutation<T, A, R>(
        &self,
        query: &Query<T>,
        remote: RemoteCall<A, R>,
        options: MutationOptions<T, A>,
    ) -> Mutation<T, A, R>
    where
        T: Clone + Send + Sync + 'static,
        A: Send + 'static,
        R: Send + 'static,
    {
        Mutation::new(query, remote, options)
    }
}

impl std::fmt::Debug for SyncClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncClient")
            .field("api", &self.api)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}
