//! Error types for the api-tester crate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while turning an operation into a request descriptor.
#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum SynthesisError {
    /// Only raised in strict mode; the default policy substitutes `""`.
    #[error("missing value for required path parameter: {name}")]
    MissingRequiredParameter { name: String },
}

/// Errors raised by a [`Session`](crate::session::Session).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no operation selected")]
    NoOperationSelected,

    #[error(transparent)]
    Synthesis(#[from] SynthesisError),
}

/// Errors raised while loading an API description from disk.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DescriptionError {
    #[error("failed to read API description: {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in API description: {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
