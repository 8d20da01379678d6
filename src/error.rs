//! Error types for the client library.
//!
//! [`ClientError`] is the error surface of the public API. Transport-level
//! failures are wrapped in [`TransportError`](crate::transport::TransportError)
//! and carried as sources so callers can distinguish an unreachable server
//! from a mid-session failure.

use thiserror::Error;

use crate::transport::TransportError;

/// Convenience type alias for Results using [`ClientError`].
pub type Result<T, E = ClientError> = std::result::Result<T, E>;

/// Errors reported by the client API.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClientError {
    /// Opening the transport failed; the session never started.
    #[error("connection failed: {0}")]
    ConnectFailed(#[source] TransportError),

    /// An operation was invoked while no session is active.
    #[error("not connected")]
    NotConnected,

    /// `connect` was called on a client that already has an active session.
    #[error("already connected")]
    AlreadyConnected,

    /// An aggregated query for the same key is already in flight.
    #[error("query already in flight: {0}")]
    QueryInFlight(String),

    /// An aggregated query did not complete within its deadline.
    #[error("query timed out")]
    QueryTimeout,

    /// The session ended while the operation was still pending.
    #[error("disconnected")]
    Disconnected,

    /// The server answered a query with an error numeric.
    #[error("server error {code}: {message}")]
    ErrorReply {
        /// The three-digit numeric code.
        code: u16,
        /// The human-readable text from the reply.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ClientError::ErrorReply {
            code: 401,
            message: "No such nick".to_string(),
        };
        assert_eq!(format!("{}", err), "server error 401: No such nick");

        assert_eq!(format!("{}", ClientError::NotConnected), "not connected");
    }

    #[test]
    fn test_connect_failed_source() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = ClientError::ConnectFailed(TransportError::Io(io));
        assert!(std::error::Error::source(&err).is_some());
    }
}
