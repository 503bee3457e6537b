//! Optimistic writes against a query's cached value.
//!
//! `Mutation::invoke` runs, in order:
//!
//! 1. precondition: the query is `Ok`, otherwise [`MutationFault::NotReady`];
//! 2. snapshot: a full clone of the `Ok` payload;
//! 3. optimistic update, published as one notification;
//! 4. the remote call;
//! 5. on success, nothing more (or a refetch when no update was given);
//! 6. on failure, restore the snapshot in one notification and clear the
//!    session on `Unauthorized`.
//!
//! An update that fails leaves the payload untouched, publishes nothing
//! and sends nothing.

mod error;

use std::future::Future;
use std::sync::Arc;

use crate::query::{Query, QueryState};
use crate::transport::{CallFuture, ErrorKind, RemoteCallResult, TransportFault};

pub use error::{MutationFault, UpdateError};

/// Optimistic edit of a query payload given the mutation arguments.
pub type UpdateFn<T, A> = Arc<dyn Fn(&mut T, &A) -> Result<(), UpdateError> + Send + Sync>;

/// A remote method taking `A` and returning `R`.
pub type RemoteCall<A, R> = Arc<dyn Fn(A) -> CallFuture<R> + Send + Sync>;

/// Box an async closure into a [`RemoteCall`].
pub fn remote_call<A, R, F, Fut>(f: F) -> RemoteCall<A, R>
where
    F: Fn(A) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<RemoteCallResult<R>, TransportFault>> + Send + 'static,
{
    Arc::new(move |args: A| -> CallFuture<R> { Box::pin(f(args)) })
}

pub struct MutationOptions<T, A> {
    update: Option<UpdateFn<T, A>>,
}

impl<T, A> MutationOptions<T, A> {
    pub fn new() -> Self {
        Self { update: None }
    }

    /// Apply `update` to the cached value before the remote call resolves.
    pub fn update(
        mut self,
        update: impl Fn(&mut T, &A) -> Result<(), UpdateError> + Send + Sync + 'static,
    ) -> Self {
        self.update = Some(Arc::new(update));
        self
    }
}

impl<T, A> Default for MutationOptions<T, A> {
    fn default() -> Self {
        Self::new()
    }
}

struct Snapshot<T> {
    value: T,
    /// Query result the snapshot was taken from.
    committed: u64,
}

/// A remote write bound to the query whose value it edits.
pub struct Mutation<T, A, R> {
    query: Query<T>,
    remote: RemoteCall<A, R>,
    update: Option<UpdateFn<T, A>>,
}

impl<T, A, R> Clone for Mutation<T, A, R> {
    fn clone(&self) -> Self {
        Self {
            query: self.query.clone(),
            remote: Arc::clone(&self.remote),
            update: self.update.clone(),
        }
    }
}

impl<T, A, R> Mutation<T, A, R>
where
    T: Clone + Send + Sync + 'static,
    A: Send + 'static,
    R: Send + 'static,
{
    pub fn new(query: &Query<T>, remote: RemoteCall<A, R>, options: MutationOptions<T, A>) -> Self {
        Self {
            query: query.clone(),
            remote,
            update: options.update,
        }
    }

    pub fn query(&self) -> &Query<T> {
        &self.query
    }

    /// Run the mutation with `args`.
    ///
    /// Typed failures come back as `Ok(Err(kind))` after the optimistic
    /// update has been undone. Faults abort the call.
    pub async fn invoke(&self, args: A) -> Result<RemoteCallResult<R>, MutationFault> {
        let snapshot = match &self.update {
            Some(update) => Some(self.apply(update, &args)?),
            None => {
                if !self.query.state().with(QueryState::is_ok) {
                    return Err(MutationFault::NotReady);
                }
                None
            }
        };

        let outcome = (self.remote)(args).await;

        match outcome {
            Ok(Ok(value)) => {
                if snapshot.is_none() {
                    self.query.refetch();
                }
                Ok(Ok(value))
            }
            Ok(Err(kind)) => {
                if let Some(snapshot) = snapshot {
                    self.rollback(snapshot);
                }
                if kind == ErrorKind::Unauthorized {
                    self.query.session().invalidate();
                }
                Ok(Err(kind))
            }
            Err(fault) => {
                if let Some(snapshot) = snapshot {
                    self.rollback(snapshot);
                }
                Err(MutationFault::Transport(fault))
            }
        }
    }

    fn apply(&self, update: &UpdateFn<T, A>, args: &A) -> Result<Snapshot<T>, MutationFault> {
        let committed = self.query.committed_seq();
        self.query.state().try_update(|state| {
            let QueryState::Ok(value) = state else {
                return Err(MutationFault::NotReady);
            };
            let snapshot = value.clone();
            if let Err(err) = update(value, args) {
                *value = snapshot;
                return Err(MutationFault::Update(err));
            }
            Ok(Snapshot {
                value: snapshot,
                committed,
            })
        })
    }

    fn rollback(&self, snapshot: Snapshot<T>) {
        if self.query.committed_seq() != snapshot.committed {
            tracing::debug!("Query refreshed during mutation, dropping snapshot");
            return;
        }
        let restored = self.query.state().try_update(|state| match state {
            QueryState::Ok(value) => {
                *value = snapshot.value;
                Ok(())
            }
            _ => Err(()),
        });
        match restored {
            Ok(()) => tracing::debug!("Rolled back optimistic update"),
            Err(()) => tracing::debug!("Query left Ok during mutation, dropping snapshot"),
        }
    }
}
