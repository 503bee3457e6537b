//! Client-side data synchronization over a JSON-over-HTTP RPC backend.
//!
//! ```text
//! SyncClient ─┬─ Transport ── POST {host}/{method}
//!             ├─ SessionStore (Observable<Option<Session>>)
//!             ├─ Query<T> ──── Observable<QueryState<T>>
//!             └─ Mutation<T, A, R> ── optimistic edit / rollback of a Query
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod mutation;
pub mod query;
pub mod reactive;
pub mod session;
pub mod transport;

use tracing_subscriber::EnvFilter;

pub use client::{ClientError, FaultReporter, SyncClient};
pub use mutation::{Mutation, MutationFault, MutationOptions, UpdateError};
pub use query::{Query, QueryOptions, QueryState};
pub use reactive::{Observable, Subscription};
pub use session::SessionStore;
pub use transport::{ErrorKind, RemoteCallResult, TransportFault};

/// Install the global `fmt` subscriber. `RUST_LOG` overrides the `info` default.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();
}
