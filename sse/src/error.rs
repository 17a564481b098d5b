//! Error types for the `sse` layer.
use crate::connection::ConnectionId;
use std::error::Error as StdError;
use std::fmt;

pub type Result<T> = core::result::Result<T, Error>;

/// Errors surfaced by the connection lifecycle and delivery paths.
///
/// All variants are local and recoverable at the granularity of a single
/// connection; none of them is fatal to the process. The `web` layer
/// translates these into HTTP status codes and client-visible error bodies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The connection could not be switched into streaming mode. The connect
    /// attempt is abandoned and no registry entry is left behind.
    ConnectionSetup,
    /// The unicast target is not registered. A client error, not a server
    /// fault: the caller asked for a connection that does not exist.
    ConnectionNotFound { connection_id: ConnectionId },
    /// A write to the connection's handle failed. The connection has been
    /// (or is being) torn down; the enclosing request is not failed as a
    /// whole beyond this one connection.
    WriteFailed { connection_id: ConnectionId },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::ConnectionSetup => write!(f, "failed to establish SSE connection"),
            Error::ConnectionNotFound { connection_id } => {
                write!(f, "connection {connection_id} not found")
            }
            Error::WriteFailed { connection_id } => {
                write!(f, "write to connection {connection_id} failed")
            }
        }
    }
}

impl StdError for Error {}
