//! Transport abstraction: CRLF-framed lines over a byte stream.
//!
//! The engine drives a session through the narrow [`Transport`] contract —
//! read one logical line, write one line, close. [`TcpTransport`] is the
//! production implementation (plain TCP or TLS); [`MockTransport`] is an
//! in-memory implementation for driving a session in tests.

mod line;
mod mock;
mod tcp;

use async_trait::async_trait;
use thiserror::Error;

pub use self::line::LineCodec;
pub use self::mock::MockTransport;
pub use self::tcp::TcpTransport;

/// Maximum accepted line length in bytes (tags included).
pub const MAX_LINE_LEN: usize = 64 * 1024;

/// Errors raised by a transport.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TransportError {
    /// I/O error from the underlying stream.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// An incoming line exceeded [`MAX_LINE_LEN`].
    #[error("line too long: {0} bytes")]
    LineTooLong(usize),

    /// An incoming line was not valid UTF-8.
    #[error("invalid utf-8 in line")]
    InvalidUtf8,

    /// TLS setup or handshake failure.
    #[error("tls error: {0}")]
    Tls(String),

    /// The transport is closed.
    #[error("transport closed")]
    Closed,
}

/// An async, line-oriented connection to an IRC server.
///
/// Lines cross this boundary without their CR/LF terminator: `read_line`
/// strips it, `write_line` appends it. Implementations must deliver each
/// written line atomically and in order.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Read the next logical line, or `None` at end of stream.
    ///
    /// The returned string never contains CR or LF. Empty lines on the
    /// wire are skipped.
    async fn read_line(&self) -> Result<Option<String>, TransportError>;

    /// Write one line, appending CRLF if absent.
    async fn write_line(&self, line: &str) -> Result<(), TransportError>;

    /// Close the connection. Safe to call more than once.
    async fn close(&self) -> Result<(), TransportError>;
}
