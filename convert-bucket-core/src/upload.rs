//! Part-wise upload of a streamed [`ObjectBody`].
//!
//! A body that ends within the first part is written with one whole-object put. Longer
//! bodies go through a multipart upload of [`PART_SIZE`] parts; if any part fails the
//! multipart upload is aborted before the error is returned.
//!
//! The store-specific calls sit behind [`PartSink`], so the splitting and the abort path
//! run without a real store.

use async_trait::async_trait;
use futures::StreamExt;
use tracing::{error, info, warn};

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

use crate::contract::{BoxError, ObjectBody};

/// Part size for multipart uploads. S3 requires at least 5 MiB for all but the last part.
pub const PART_SIZE: usize = 8 * 1024 * 1024;

/// A part accepted by the store, as needed to complete the upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedPart {
    pub part_number: i32,
    pub e_tag: String,
}

/// Low-level object writes of a store that supports multipart uploads.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait PartSink: Send + Sync {
    async fn put_whole(&self, bucket: &str, key: &str, data: Vec<u8>) -> Result<(), BoxError>;

    /// Returns the upload id.
    async fn start_multipart(&self, bucket: &str, key: &str) -> Result<String, BoxError>;

    /// Returns the part's entity tag.
    async fn put_part(
        &self,
        bucket: &str,
        key: &str,
        upload_id: &str,
        part_number: i32,
        data: Vec<u8>,
    ) -> Result<String, BoxError>;

    async fn complete_multipart(
        &self,
        bucket: &str,
        key: &str,
        upload_id: &str,
        parts: Vec<UploadedPart>,
    ) -> Result<(), BoxError>;

    async fn abort_multipart(&self, bucket: &str, key: &str, upload_id: &str)
        -> Result<(), BoxError>;
}

/// Cuts a body into parts of at least `part_size` bytes. Only the last part may be shorter;
/// a part can be longer when a chunk crosses the boundary.
pub struct PartReader {
    body: ObjectBody,
    part_size: usize,
    finished: bool,
}

impl PartReader {
    pub fn new(body: ObjectBody) -> Self {
        Self::with_part_size(body, PART_SIZE)
    }

    pub fn with_part_size(body: ObjectBody, part_size: usize) -> Self {
        Self {
            body,
            part_size,
            finished: false,
        }
    }

    /// True once the body stream has ended.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// The next part, or `None` when the body is drained. A stream error is returned as-is.
    pub async fn next_part(&mut self) -> Result<Option<Vec<u8>>, BoxError> {
        let mut buffer = Vec::new();
        while !self.finished && buffer.len() < self.part_size {
            match self.body.next().await {
                Some(chunk) => buffer.extend_from_slice(&chunk?),
                None => self.finished = true,
            }
        }
        if buffer.is_empty() {
            Ok(None)
        } else {
            Ok(Some(buffer))
        }
    }
}

/// Writes `body` to `bucket/key` through `sink`.
pub async fn upload_body<S>(
    sink: &S,
    bucket: &str,
    key: &str,
    mut reader: PartReader,
) -> Result<(), BoxError>
where
    S: PartSink + ?Sized,
{
    let first = reader.next_part().await?.unwrap_or_default();
    if reader.is_finished() {
        let size = first.len();
        sink.put_whole(bucket, key, first).await?;
        info!(bucket, key, size, "Uploaded object");
        return Ok(());
    }

    let upload_id = sink.start_multipart(bucket, key).await?;
    match upload_parts(sink, bucket, key, &upload_id, first, &mut reader).await {
        Ok(parts) => {
            let count = parts.len();
            sink.complete_multipart(bucket, key, &upload_id, parts).await?;
            info!(bucket, key, parts = count, "Completed multipart upload");
            Ok(())
        }
        Err(e) => {
            error!(bucket, key, error = %e, "Multipart upload failed, aborting");
            if let Err(abort_err) = sink.abort_multipart(bucket, key, &upload_id).await {
                warn!(bucket, key, error = %abort_err, "Failed to abort multipart upload");
            }
            Err(e)
        }
    }
}

async fn upload_parts<S>(
    sink: &S,
    bucket: &str,
    key: &str,
    upload_id: &str,
    first: Vec<u8>,
    reader: &mut PartReader,
) -> Result<Vec<UploadedPart>, BoxError>
where
    S: PartSink + ?Sized,
{
    let mut parts = Vec::new();
    let mut next = Some(first);
    let mut part_number = 1;

    while let Some(data) = next {
        let e_tag = sink
            .put_part(bucket, key, upload_id, part_number, data)
            .await?;
        parts.push(UploadedPart { part_number, e_tag });
        part_number += 1;
        next = reader.next_part().await?;
    }

    Ok(parts)
}
