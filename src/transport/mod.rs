//! Remote call transport and outcome classification.

mod client;
mod error;

use std::future::Future;
use std::pin::Pin;

pub use client::{FilePart, Transport};
pub use error::{ErrorKind, RemoteCallResult, TransportFault};

/// Boxed future produced by a remote call.
pub type CallFuture<T> =
    Pin<Box<dyn Future<Output = Result<RemoteCallResult<T>, TransportFault>> + Send + 'static>>;
