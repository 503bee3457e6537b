use thiserror::Error;

use crate::transport::TransportFault;

/// Raised by an optimistic update whose preconditions do not hold.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpdateError {
    /// The entity to edit is absent from the cached value.
    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    #[error("{0}")]
    Invalid(String),
}

/// Faults that abort a mutation call. None of them is a typed remote failure.
#[derive(Debug, Error)]
pub enum MutationFault {
    /// The query has no `Ok` value to edit. Nothing was sent.
    #[error("Mutation requires a loaded query")]
    NotReady,

    /// The optimistic update rejected the arguments. Nothing was sent.
    #[error("Optimistic update failed: {0}")]
    Update(#[from] UpdateError),

    /// The remote call broke the transport contract.
    #[error(transparent)]
    Transport(#[from] TransportFault),
}

impl MutationFault {
    /// Whether the fault was raised before any network traffic.
    pub fn is_local(&self) -> bool {
        matches!(self, MutationFault::NotReady | MutationFault::Update(_))
    }
}
