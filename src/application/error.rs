//! Application-specific error types

use thiserror::Error;

/// Errors raised while configuring, starting or stopping an application
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// No server is bound under the requested name
    #[error("Server not found: {name}")]
    ServerNotFound {
        /// Name the server was looked up by
        name: String,
    },

    /// A second server was bound on a single-server application
    #[error(
        "RestApplication does not support multiple servers! To create your own server bindings, please extend the Application class."
    )]
    MultipleServerBinding,

    /// A server failed to start
    #[error("Server '{name}' failed to start: {message}")]
    StartFailed {
        /// Name of the server
        name: String,
        /// Error message
        message: String,
    },

    /// A server failed to stop
    #[error("Server '{name}' failed to stop: {message}")]
    StopFailed {
        /// Name of the server
        name: String,
        /// Error message
        message: String,
    },
}

impl ApplicationError {
    /// Create a start failure error
    pub fn start_failed(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::StartFailed {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create a stop failure error
    pub fn stop_failed(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::StopFailed {
            name: name.into(),
            message: message.into(),
        }
    }
}
