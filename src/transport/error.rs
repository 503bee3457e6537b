//! Outcome classification for remote calls.
//!
//! Every remote call lands in exactly one of two layers:
//!
//! - [`RemoteCallResult`]: the expected outcomes, either a decoded value or
//!   an [`ErrorKind`] the caller is meant to handle as state.
//! - [`TransportFault`]: contract violations (unknown status, undecodable
//!   body, broken request). These are never retried and never folded into
//!   an `ErrorKind`; they propagate to the application's error boundary.

use reqwest::StatusCode;
use thiserror::Error;

/// Classification of an expected remote call failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The server rejected the call because the session is missing or invalid.
    Unauthorized,
    /// The server rejected the request shape (HTTP 400).
    Protocol,
    /// No response reached the client, or the failure is transient.
    Network,
}

impl ErrorKind {
    /// Whether a failure of this kind is worth retrying automatically.
    pub fn is_transient(self) -> bool {
        matches!(self, ErrorKind::Network)
    }

    /// Short identifier for logs and CLI output.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::Protocol => "protocol",
            ErrorKind::Network => "network",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a remote call that reached classification.
pub type RemoteCallResult<T> = Result<T, ErrorKind>;

/// Unrecoverable remote call failures.
#[derive(Debug, Error)]
pub enum TransportFault {
    /// The server answered with a status outside the contract.
    #[error("Service responded with {status} when calling {method}: {context}")]
    UnexpectedStatus {
        method: String,
        status: StatusCode,
        context: String,
    },

    /// A success response carried a body that does not match the expected type.
    #[error("Failed to decode response of {method}: {source}")]
    Decode {
        method: String,
        #[source]
        source: serde_json::Error,
    },

    /// Arguments could not be encoded as JSON.
    #[error("Failed to encode arguments of {method}: {source}")]
    Encode {
        method: String,
        #[source]
        source: serde_json::Error,
    },

    /// The request failed for a reason other than connectivity.
    #[error("Request to {method} failed: {source}")]
    Request {
        method: String,
        #[source]
        source: reqwest::Error,
    },
}

impl TransportFault {
    /// Name of the remote method the fault was raised for.
    pub fn method(&self) -> &str {
        match self {
            TransportFault::UnexpectedStatus { method, .. }
            | TransportFault::Decode { method, .. }
            | TransportFault::Encode { method, .. }
            | TransportFault::Request { method, .. } => method,
        }
    }

    /// Get fault type string for structured logs.
    pub fn fault_type(&self) -> &'static str {
        match self {
            TransportFault::UnexpectedStatus { .. } => "unexpected_status",
            TransportFault::Decode { .. } => "decode_error",
            TransportFault::Encode { .. } => "encode_error",
            TransportFault::Request { .. } => "request_error",
        }
    }
}

/// Where an HTTP status falls in the call contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StatusClass {
    Success,
    Failure(ErrorKind),
    Unexpected,
}

pub(crate) fn classify_status(status: StatusCode) -> StatusClass {
    if status.is_success() {
        return StatusClass::Success;
    }
    match status {
        StatusCode::BAD_REQUEST => StatusClass::Failure(ErrorKind::Protocol),
        StatusCode::UNAUTHORIZED => StatusClass::Failure(ErrorKind::Unauthorized),
        _ => StatusClass::Unexpected,
    }
}

/// Whether a reqwest error means no usable response reached the client
/// (DNS, refused or reset connection, timeout, aborted body).
pub(crate) fn is_connectivity_error(err: &reqwest::Error) -> bool {
    err.is_connect() || err.is_timeout() || err.is_request() || err.is_body()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_statuses() {
        assert_eq!(classify_status(StatusCode::OK), StatusClass::Success);
        assert_eq!(classify_status(StatusCode::NO_CONTENT), StatusClass::Success);
    }

    #[test]
    fn test_rejection_statuses() {
        assert_eq!(
            classify_status(StatusCode::BAD_REQUEST),
            StatusClass::Failure(ErrorKind::Protocol)
        );
        assert_eq!(
            classify_status(StatusCode::UNAUTHORIZED),
            StatusClass::Failure(ErrorKind::Unauthorized)
        );
    }

    #[test]
    fn test_contract_violations() {
        for status in [
            StatusCode::FORBIDDEN,
            StatusCode::NOT_FOUND,
            StatusCode::INTERNAL_SERVER_ERROR,
            StatusCode::BAD_GATEWAY,
        ] {
            assert_eq!(classify_status(status), StatusClass::Unexpected);
        }
    }

    #[test]
    fn test_only_network_is_transient() {
        assert!(ErrorKind::Network.is_transient());
        assert!(!ErrorKind::Protocol.is_transient());
        assert!(!ErrorKind::Unauthorized.is_transient());
    }

    #[test]
    fn test_fault_type_and_method() {
        let source = serde_json::from_str::<u32>("nope").unwrap_err();
        let fault = TransportFault::Decode {
            method: "get_user".to_string(),
            source,
        };
        assert_eq!(fault.fault_type(), "decode_error");
        assert_eq!(fault.method(), "get_user");
        assert!(fault.to_string().contains("get_user"));
    }
}
