//! Error types for the MockServer client.
//!
//! # Design
//! Protocol errors are derived from the status code and the operation that
//! produced it: the same 406 means `InvalidExpectation` on create and
//! `RequestHasNotBeenReceived` on verify. Everything that happens before a
//! status code is available (serialization, cancellation, connection
//! failures, reading the body) is a transport-family error that carries the
//! failing `Operation` and its source, and is never classified further.

use std::fmt;
use std::io;

use thiserror::Error;

/// Client operation an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    CreateExpectation,
    VerifyRequest,
    Clear,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::CreateExpectation => "expectation",
            Operation::VerifyRequest => "verify",
            Operation::Clear => "clear",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors returned by `MockServerClient` operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned 400.
    #[error("incorrect request format")]
    IncorrectRequestFormat,

    /// The server returned 406 to a create expectation request.
    #[error("invalid expectation")]
    InvalidExpectation,

    /// The server returned 406 to a verify request: the expectation was not
    /// matched the expected number of times.
    #[error("request has not been received")]
    RequestHasNotBeenReceived,

    /// Any status outside the documented set for the endpoint.
    #[error("unexpected status code {status_code} from endpoint {endpoint}")]
    UnexpectedStatusCode {
        endpoint: &'static str,
        status_code: u16,
    },

    /// The request body could not be marshalled. No request was sent.
    #[error("failed marshalling {operation} request body: {source}")]
    Serialization {
        operation: Operation,
        #[source]
        source: serde_json::Error,
    },

    /// The exchange could not be completed.
    #[error("{operation} request failed: {source}")]
    Transport {
        operation: Operation,
        #[source]
        source: TransportError,
    },

    /// The response arrived but its body could not be read to the end.
    #[error("failed reading {operation} request response body: {source}")]
    ReadBody {
        operation: Operation,
        #[source]
        source: io::Error,
    },
}

impl ApiError {
    /// True for errors derived from a status code the server returned.
    pub fn is_protocol(&self) -> bool {
        matches!(
            self,
            ApiError::IncorrectRequestFormat
                | ApiError::InvalidExpectation
                | ApiError::RequestHasNotBeenReceived
                | ApiError::UnexpectedStatusCode { .. }
        )
    }

    /// True for failures that happened before a status code was classified.
    pub fn is_transport(&self) -> bool {
        !self.is_protocol()
    }

    /// Status code behind a protocol error, if the error carries one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ApiError::IncorrectRequestFormat => Some(400),
            ApiError::InvalidExpectation | ApiError::RequestHasNotBeenReceived => Some(406),
            ApiError::UnexpectedStatusCode { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }
}

/// Failures of the injected transport.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("context cancelled")]
    Cancelled,

    #[error("context deadline exceeded")]
    DeadlineExceeded,

    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl TransportError {
    pub fn other(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        TransportError::Other(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn protocol_and_transport_are_disjoint() {
        let protocol = [
            ApiError::IncorrectRequestFormat,
            ApiError::InvalidExpectation,
            ApiError::RequestHasNotBeenReceived,
            ApiError::UnexpectedStatusCode {
                endpoint: "/mockserver/clear",
                status_code: 500,
            },
        ];
        for err in &protocol {
            assert!(err.is_protocol(), "{err}");
            assert!(!err.is_transport(), "{err}");
        }

        let transport = ApiError::Transport {
            operation: Operation::Clear,
            source: TransportError::Cancelled,
        };
        assert!(transport.is_transport());
        assert!(transport.status_code().is_none());
    }

    #[test]
    fn transport_error_names_the_step() {
        let err = ApiError::Transport {
            operation: Operation::CreateExpectation,
            source: TransportError::Io(io::Error::from(io::ErrorKind::ConnectionRefused)),
        };
        assert!(err.to_string().starts_with("expectation request failed: "));
        assert!(err.source().is_some());

        let err = ApiError::ReadBody {
            operation: Operation::VerifyRequest,
            source: io::Error::from(io::ErrorKind::UnexpectedEof),
        };
        assert!(err
            .to_string()
            .starts_with("failed reading verify request response body: "));
    }

    #[test]
    fn unexpected_status_display() {
        let err = ApiError::UnexpectedStatusCode {
            endpoint: "/mockserver/expectation",
            status_code: 500,
        };
        assert_eq!(
            err.to_string(),
            "unexpected status code 500 from endpoint /mockserver/expectation"
        );
        assert_eq!(err.status_code(), Some(500));
    }
}
