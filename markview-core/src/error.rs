//! Error types for rendering and classification

use thiserror::Error;

/// Errors that can occur while producing an output format
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormatError {
    /// Format not found in registry
    #[error("Format '{0}' not found")]
    FormatNotFound(String),
    /// Error during serialization
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Errors raised when the classifier cannot schedule probes.
///
/// A failed probe is never an error here: it ends in [`crate::classify::UrlState::Errored`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassifyError {
    /// `classify` was called outside of a tokio runtime
    #[error("no tokio runtime available to drive image probes")]
    NoRuntime,
}

/// Outcome of a single failed image probe
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    #[error("unexpected status {0}")]
    Status(u16),
    #[error("content type '{0}' is not an image")]
    NotAnImage(String),
    #[error("transport error: {0}")]
    Transport(String),
}
