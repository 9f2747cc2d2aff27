//! # contract: interfaces to the three external collaborators
//!
//! The dispatcher never talks to a cloud SDK or HTTP client directly. It goes through
//! the traits below, which the binary crate implements for S3, Secrets Manager and
//! ConvertAPI.
//!
//! ## Mocking & Testing
//! - Every trait is annotated for `mockall`; with the `test-export-mocks` feature the
//!   generated `Mock*` types are exported for integration tests.
//!
//! ## Errors
//! - All methods return [`BoxError`]; the dispatcher decides which
//!   [`DispatchError`](crate::error::DispatchError) variant a failure maps to.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

use mockall::automock;

use crate::credential::Credential;
pub use crate::error::BoxError;

/// Streamed object body, passed from the conversion service download to the object store.
pub type ObjectBody = BoxStream<'static, Result<Bytes, BoxError>>;

/// Raw secret as stored in the Secret Store.
#[derive(Clone, PartialEq, Eq)]
pub enum SecretValue {
    Text(String),
    Binary(Vec<u8>),
}

impl fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecretValue::Text(_) => f.write_str("SecretValue::Text(<redacted>)"),
            SecretValue::Binary(bytes) => write!(f, "SecretValue::Binary(<{} bytes>)", bytes.len()),
        }
    }
}

/// Target format or operation requested from the conversion service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConversionTarget {
    Pdf,
    Jpg,
    Compress,
}

impl ConversionTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConversionTarget::Pdf => "pdf",
            ConversionTarget::Jpg => "jpg",
            ConversionTarget::Compress => "compress",
        }
    }
}

impl fmt::Display for ConversionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A file produced by the conversion service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvertedFile {
    pub url: String,
    pub file_name: String,
}

/// All files produced by one conversion call. Only the first is ever used.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionResponse {
    pub files: Vec<ConvertedFile>,
}

impl ConversionResponse {
    pub fn first(&self) -> Option<&ConvertedFile> {
        self.files.first()
    }
}

/// Object storage: read handles for the conversion service and uploads of its output.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Create a URL granting read access to `bucket/key` for `expires_in`.
    async fn signed_read_url(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> Result<String, BoxError>;

    /// Store `body` at `bucket/key`, resolving once the upload has completed.
    async fn upload(&self, bucket: &str, key: &str, body: ObjectBody) -> Result<(), BoxError>;
}

/// Named secret lookup.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait SecretStore: Send + Sync {
    async fn get_secret(&self, name: &str) -> Result<SecretValue, BoxError>;
}

/// Remote document/image conversion.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait ConversionService: Send + Sync {
    /// Convert the file at `source_url` to `target`.
    async fn convert(
        &self,
        credential: &Credential,
        target: ConversionTarget,
        source_url: &str,
    ) -> Result<ConversionResponse, BoxError>;

    /// Fetch a produced file as a byte stream.
    async fn download(&self, url: &str) -> Result<ObjectBody, BoxError>;
}
