//! Conversion dispatch: one upload notification in, converted files out.
//!
//! For each record of a notification the [`Dispatcher`]:
//!   - decodes the object key and skips objects outside the source folder
//!   - fetches the conversion credential from the [`SecretStore`]
//!   - signs a read URL for the object through the [`ObjectStore`]
//!   - classifies the file and asks the [`ConversionService`] for a PDF (documents) or a
//!     compressed JPEG (images, converted to JPEG first unless they already are)
//!   - streams the produced file into the destination bucket under the mirrored path
//!
//! # Error Handling
//! Every step is awaited in order and a failure stops the record immediately. Nothing is
//! retried or rolled back; the error names the failing step and is returned to the caller.
//! Records of one notification are independent: all of them are attempted and the
//! failures are reported together.
//!
//! # Navigation
//! - Entrypoints: [`Dispatcher::handle`] (whole notification), [`Dispatcher::dispatch`] (one record)
//! - Supporting types: [`Outcome`], [`DispatchReport`]

use serde::Serialize;
use tracing::{error, info, info_span, Instrument};

use crate::classify::{destination_key, is_jpeg, parent_dir, should_process, Category, ClassifiedFile};
use crate::config::DispatchConfig;
use crate::contract::{
    ConversionService, ConversionTarget, ConvertedFile, ObjectStore, SecretStore,
};
use crate::credential::Credential;
use crate::error::{DispatchError, RecordFailure};
use crate::event::{S3Notification, UploadEvent};

/// What happened to a single record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// The object is not inside the source folder.
    SkippedFolder,
    /// The extension is neither a document nor an image.
    Unrecognized,
    /// Converted output was written to `bucket/key`.
    Stored { bucket: String, key: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct RecordReport {
    pub object_key: String,
    pub outcome: Outcome,
}

/// Per-notification summary, returned to the runtime on success.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DispatchReport {
    pub records: Vec<RecordReport>,
}

/// Routes upload events to conversions. Built once per process and shared by all invocations.
pub struct Dispatcher<O, S, C> {
    config: DispatchConfig,
    object_store: O,
    secrets: S,
    converter: C,
}

impl<O, S, C> Dispatcher<O, S, C>
where
    O: ObjectStore,
    S: SecretStore,
    C: ConversionService,
{
    pub fn new(config: DispatchConfig, object_store: O, secrets: S, converter: C) -> Self {
        Self {
            config,
            object_store,
            secrets,
            converter,
        }
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// True iff the decoded key lies inside the configured source folder.
    pub fn should_process(&self, object_key: &str) -> bool {
        should_process(object_key, &self.config.source_folder)
    }

    /// Dispatch every record of a notification.
    ///
    /// A single-record notification returns that record's error unchanged; otherwise
    /// failures are collected into [`DispatchError::Batch`] after all records ran.
    pub async fn handle(
        &self,
        notification: &S3Notification,
    ) -> Result<DispatchReport, DispatchError> {
        let total = notification.records.len();
        info!(records = total, "[DISPATCH] Handling upload notification");

        let mut report = DispatchReport::default();
        let mut failures = Vec::new();

        for record in &notification.records {
            let event = UploadEvent::from(record);
            let span = info_span!(
                "record",
                bucket = %event.bucket_name,
                key = %event.object_key
            );
            match self.dispatch(&event).instrument(span).await {
                Ok(outcome) => report.records.push(RecordReport {
                    object_key: event.object_key,
                    outcome,
                }),
                Err(error) => {
                    error!(key = %event.object_key, error = %error, "[DISPATCH][ERROR] Record failed");
                    failures.push(RecordFailure {
                        object_key: event.object_key,
                        error,
                    });
                }
            }
        }

        if failures.is_empty() {
            return Ok(report);
        }
        if total == 1 {
            if let Some(failure) = failures.pop() {
                return Err(failure.error);
            }
        }
        Err(DispatchError::Batch { total, failures })
    }

    /// Run at most one conversion-and-store cycle for `event`.
    pub async fn dispatch(&self, event: &UploadEvent) -> Result<Outcome, DispatchError> {
        let key = event.decoded_key()?;

        if !self.should_process(&key) {
            info!(
                key = %key,
                folder = parent_dir(&key),
                "[DISPATCH] Files in this folder will not be processed"
            );
            return Ok(Outcome::SkippedFolder);
        }

        let credential = self.fetch_credential().await?;

        let signed_url = self
            .object_store
            .signed_read_url(&event.bucket_name, &key, self.config.signed_url_expiration)
            .await
            .map_err(|source| DispatchError::Signing {
                bucket: event.bucket_name.clone(),
                key: key.clone(),
                source,
            })?;

        let file = ClassifiedFile::new(key);
        info!(key = %file.path, category = ?file.category, "[DISPATCH] Classified object");

        let stored_key = match file.category {
            Category::Document => {
                self.process_file(&file.path, &signed_url, &credential, ConversionTarget::Pdf)
                    .await?
            }
            Category::Image => {
                self.process_image(&file.path, &signed_url, &credential)
                    .await?
            }
            Category::Unrecognized => {
                info!(key = %file.path, "[DISPATCH] Unrecognized file type, nothing to convert");
                return Ok(Outcome::Unrecognized);
            }
        };

        Ok(Outcome::Stored {
            bucket: self.config.destination_bucket.clone(),
            key: stored_key,
        })
    }

    async fn fetch_credential(&self) -> Result<Credential, DispatchError> {
        let secret = self
            .secrets
            .get_secret(&self.config.secret_name)
            .await
            .map_err(|source| DispatchError::Secret {
                name: self.config.secret_name.clone(),
                source,
            })?;
        Credential::from_secret(&secret)
    }

    /// Compress an image. Non-JPEG sources go through a JPEG conversion first.
    async fn process_image(
        &self,
        key: &str,
        signed_url: &str,
        credential: &Credential,
    ) -> Result<String, DispatchError> {
        if is_jpeg(key) {
            return self
                .process_file(key, signed_url, credential, ConversionTarget::Compress)
                .await;
        }

        let jpeg = self
            .convert(credential, ConversionTarget::Jpg, signed_url)
            .await?;
        info!(key = %key, file_name = %jpeg.file_name, "[DISPATCH] Converted image to jpeg");
        self.process_file(key, &jpeg.url, credential, ConversionTarget::Compress)
            .await
    }

    /// Convert, download the produced file and upload it under the mirrored destination key.
    async fn process_file(
        &self,
        key: &str,
        source_url: &str,
        credential: &Credential,
        target: ConversionTarget,
    ) -> Result<String, DispatchError> {
        let converted = self.convert(credential, target, source_url).await?;

        let destination = destination_key(
            key,
            &self.config.source_folder,
            &self.config.destination_folder,
            &converted.file_name,
        );

        let body = self
            .converter
            .download(&converted.url)
            .await
            .map_err(|source| DispatchError::Download {
                file_name: converted.file_name.clone(),
                source,
            })?;

        self.object_store
            .upload(&self.config.destination_bucket, &destination, body)
            .await
            .map_err(|source| DispatchError::Upload {
                bucket: self.config.destination_bucket.clone(),
                key: destination.clone(),
                source,
            })?;

        info!(
            source_key = %key,
            bucket = %self.config.destination_bucket,
            destination_key = %destination,
            %target,
            "[DISPATCH] Stored converted file"
        );
        Ok(destination)
    }

    async fn convert(
        &self,
        credential: &Credential,
        target: ConversionTarget,
        source_url: &str,
    ) -> Result<ConvertedFile, DispatchError> {
        let response = self
            .converter
            .convert(credential, target, source_url)
            .await
            .map_err(|source| DispatchError::Conversion {
                target: target.to_string(),
                source,
            })?;

        response
            .files
            .into_iter()
            .next()
            .ok_or_else(|| DispatchError::MissingOutput {
                target: target.to_string(),
            })
    }
}
