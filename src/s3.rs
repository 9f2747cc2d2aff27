//! S3 implementation of the [`ObjectStore`] contract.
//!
//! Uploads stream the converted file through [`upload_body`]: bodies up to one part are
//! sent with a single `PutObject`, larger ones as a multipart upload so the whole file is
//! never buffered.

use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{CompletedMultipartUpload, CompletedPart};
use aws_sdk_s3::Client;

use convert_bucket_core::contract::{BoxError, ObjectBody, ObjectStore};
use convert_bucket_core::upload::{upload_body, PartReader, PartSink, UploadedPart};

#[derive(Clone)]
pub struct S3ObjectStore {
    client: Client,
}

impl S3ObjectStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PartSink for S3ObjectStore {
    async fn put_whole(&self, bucket: &str, key: &str, data: Vec<u8>) -> Result<(), BoxError> {
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(data))
            .send()
            .await?;
        Ok(())
    }

    async fn start_multipart(&self, bucket: &str, key: &str) -> Result<String, BoxError> {
        let created = self
            .client
            .create_multipart_upload()
            .bucket(bucket)
            .key(key)
            .send()
            .await?;
        let upload_id = created
            .upload_id()
            .ok_or("S3 returned no multipart upload id")?;
        Ok(upload_id.to_string())
    }

    async fn put_part(
        &self,
        bucket: &str,
        key: &str,
        upload_id: &str,
        part_number: i32,
        data: Vec<u8>,
    ) -> Result<String, BoxError> {
        let uploaded = self
            .client
            .upload_part()
            .bucket(bucket)
            .key(key)
            .upload_id(upload_id)
            .part_number(part_number)
            .body(ByteStream::from(data))
            .send()
            .await?;
        tracing::debug!(bucket, key, part_number, "Uploaded part");
        Ok(uploaded.e_tag().unwrap_or_default().to_string())
    }

    async fn complete_multipart(
        &self,
        bucket: &str,
        key: &str,
        upload_id: &str,
        parts: Vec<UploadedPart>,
    ) -> Result<(), BoxError> {
        let completed = parts
            .into_iter()
            .map(|part| {
                CompletedPart::builder()
                    .e_tag(part.e_tag)
                    .part_number(part.part_number)
                    .build()
            })
            .collect();
        self.client
            .complete_multipart_upload()
            .bucket(bucket)
            .key(key)
            .upload_id(upload_id)
            .multipart_upload(
                CompletedMultipartUpload::builder()
                    .set_parts(Some(completed))
                    .build(),
            )
            .send()
            .await?;
        Ok(())
    }

    async fn abort_multipart(
        &self,
        bucket: &str,
        key: &str,
        upload_id: &str,
    ) -> Result<(), BoxError> {
        self.client
            .abort_multipart_upload()
            .bucket(bucket)
            .key(key)
            .upload_id(upload_id)
            .send()
            .await?;
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn signed_read_url(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> Result<String, BoxError> {
        let presigning = PresigningConfig::expires_in(expires_in)?;
        let request = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .presigned(presigning)
            .await?;
        tracing::debug!(bucket, key, expires_in_secs = expires_in.as_secs(), "Signed read URL");
        Ok(request.uri().to_string())
    }

    async fn upload(&self, bucket: &str, key: &str, body: ObjectBody) -> Result<(), BoxError> {
        upload_body(self, bucket, key, PartReader::new(body)).await
    }
}
