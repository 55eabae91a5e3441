//! Error types for host calls.

use thiserror::Error;

/// Errors surfaced by a [`RenderHost`](super::RenderHost) implementation.
#[derive(Error, Debug)]
pub enum HostError {
    /// The renderer reported a failure while processing a call.
    #[error("renderer error: {0}")]
    Render(String),

    /// A named object could not be found in the host document.
    #[error("no {what} named '{name}'")]
    NotFound { what: String, name: String },

    /// A host call failed for a reason other than the renderer itself.
    #[error("host call '{call}' failed: {message}")]
    Call { call: String, message: String },

    /// I/O error while the host touched the filesystem.
    #[error("i/o error during {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },
}

impl HostError {
    pub fn render(message: impl Into<String>) -> Self {
        Self::Render(message.into())
    }

    pub fn not_found(what: impl Into<String>, name: impl Into<String>) -> Self {
        Self::NotFound {
            what: what.into(),
            name: name.into(),
        }
    }

    pub fn call(call: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Call {
            call: call.into(),
            message: message.into(),
        }
    }

    pub fn io(operation: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            source,
        }
    }
}

/// Result type for host calls.
pub type HostResult<T> = Result<T, HostError>;
