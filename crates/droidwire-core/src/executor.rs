//! The command execution seam between the typed API and the transport.
//!
//! [`CommandExecutor`] is the single primitive every typed operation goes
//! through: one [`CommandRequest`] in, one [`CommandResponse`] out. The
//! production implementation is
//! [`HttpCommandExecutor`](crate::http_client::HttpCommandExecutor); tests
//! substitute recording executors to observe exactly what the facade sends.
//!
//! A non-success [`ResponseStatus`](crate::protocol::ResponseStatus) is *not*
//! an executor error. Executors only fail when no well-formed response could
//! be obtained; interpreting the status is left to the caller.

use async_trait::async_trait;
use thiserror::Error;

use crate::command::CommandRequest;
use crate::protocol::{CommandResponse, ProtocolError};

/// Errors raised when a command could not be carried to the server and back.
#[derive(Error, Debug)]
pub enum TransportError {
    /// The server could not be reached.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The request exceeded the configured command timeout.
    #[error("request timed out")]
    Timeout,

    /// An HTTP-level failure other than connect or timeout.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The configured server URL is unusable.
    #[error("invalid server URL `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// A path template placeholder had no matching parameter.
    #[error("command `{command}` is missing path parameter `{name}`")]
    MissingPathParameter { command: &'static str, name: String },

    /// The response body could not be decoded.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

/// Executes one remote command and returns the decoded response.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    async fn execute(&self, request: CommandRequest) -> Result<CommandResponse, TransportError>;
}
