//! Error types for the dispatch pipeline.
//!
//! Collaborators report failures as [`BoxError`]; the dispatcher wraps each one
//! into the [`DispatchError`] variant of the step that failed, so the log line and
//! the invocation error name the step.

use thiserror::Error;

/// Boxed error returned by collaborator implementations.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("object key {key:?} is not valid UTF-8 after decoding")]
    InvalidKey { key: String },

    #[error("failed to fetch secret {name}: {source}")]
    Secret {
        name: String,
        #[source]
        source: BoxError,
    },

    #[error("malformed credential: {0}")]
    Credential(String),

    #[error("failed to sign read URL for {bucket}/{key}: {source}")]
    Signing {
        bucket: String,
        key: String,
        #[source]
        source: BoxError,
    },

    #[error("conversion to {target} failed: {source}")]
    Conversion {
        target: String,
        #[source]
        source: BoxError,
    },

    #[error("conversion to {target} returned no output files")]
    MissingOutput { target: String },

    #[error("failed to download converted file {file_name}: {source}")]
    Download {
        file_name: String,
        #[source]
        source: BoxError,
    },

    #[error("failed to upload {bucket}/{key}: {source}")]
    Upload {
        bucket: String,
        key: String,
        #[source]
        source: BoxError,
    },

    #[error("{} of {total} records failed", .failures.len())]
    Batch {
        total: usize,
        failures: Vec<RecordFailure>,
    },
}

/// One failed record of a notification batch.
#[derive(Debug)]
pub struct RecordFailure {
    /// Object key as delivered in the notification (still encoded).
    pub object_key: String,
    pub error: DispatchError,
}
