//! Error types for per-entry render processing.
//!
//! Every variant here is entry-fatal: the entry is logged and skipped,
//! the rest of the queue keeps going. Nothing in this module can abort
//! the queue on its own.

use std::path::PathBuf;

use thiserror::Error;

use crate::host::HostError;

/// Failure that ends one entry's processing.
#[derive(Error, Debug)]
pub enum EntryError {
    /// The entry's stable camera identity no longer resolves to a camera.
    #[error("can't find camera \"{name}\" in the scene")]
    CameraNotFound { name: String },

    /// The output target's containing directory does not exist.
    #[error("output directory doesn't exist: {}", path.display())]
    MissingOutputDir { path: PathBuf },

    /// The resolved render name is empty, hidden, or contains reserved characters.
    #[error("image name invalid: \"{name}\"")]
    InvalidName { name: String },

    /// The user declined to continue after blank template values were found.
    #[error("canceled because of blank replacement values in \"{original}\"")]
    BlankNameDeclined { original: String },

    /// A scene state or state set name did not match anything in the scene.
    #[error("scene state or state set '{name}' does not exist")]
    SceneConfigNotFound { name: String },

    /// A literal field value could not be parsed.
    #[error("failed to parse {what}: {message}")]
    Parse { what: String, message: String },

    /// A host call the entry depends on failed.
    #[error("{operation} failed: {source}")]
    Host {
        operation: String,
        #[source]
        source: HostError,
    },
}

impl EntryError {
    /// Create a camera not found error.
    pub fn camera_not_found(name: impl Into<String>) -> Self {
        Self::CameraNotFound { name: name.into() }
    }

    /// Create a missing output directory error.
    pub fn missing_output_dir(path: impl Into<PathBuf>) -> Self {
        Self::MissingOutputDir { path: path.into() }
    }

    /// Create an invalid name error.
    pub fn invalid_name(name: impl Into<String>) -> Self {
        Self::InvalidName { name: name.into() }
    }

    /// Create a blank-name declined error.
    pub fn blank_name_declined(original: impl Into<String>) -> Self {
        Self::BlankNameDeclined {
            original: original.into(),
        }
    }

    /// Create a scene configuration not found error.
    pub fn scene_config_not_found(name: impl Into<String>) -> Self {
        Self::SceneConfigNotFound { name: name.into() }
    }

    /// Create a parse error.
    pub fn parse(what: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            what: what.into(),
            message: message.into(),
        }
    }

    /// Create a host call error.
    pub fn host(operation: impl Into<String>, source: HostError) -> Self {
        Self::Host {
            operation: operation.into(),
            source,
        }
    }

    /// Whether this error came from the user backing out rather than a
    /// broken entry. Such entries report as canceled, not failed.
    pub fn is_user_cancel(&self) -> bool {
        matches!(self, Self::BlankNameDeclined { .. })
    }
}

/// Result type for per-entry operations.
pub type EntryResult<T> = Result<T, EntryError>;
