#![doc = "ConvertAPI client: implements the core `ConversionService` contract over HTTP."]
//
//! # ConvertAPI integration
//!
//! Bridges the [`ConversionService`] trait from `convert-bucket-core` to the ConvertAPI REST
//! endpoint. A conversion is a single `POST {base}/convert/{from}/to/{to}` carrying the source
//! file as a URL; the service stores the result and answers with a download URL per file.
//!
//! - `from` is derived from the source URL's file extension (see [`source_format`]).
//! - The credential is sent as a bearer token and never logged.
//! - Produced files are fetched with a plain `GET` and handed back as a byte stream.

use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use serde::Deserialize;
use serde_json::json;

use convert_bucket_core::contract::{
    BoxError, ConversionResponse, ConversionService, ConversionTarget, ConvertedFile, ObjectBody,
};
use convert_bucket_core::credential::Credential;

/// Source format used when the URL carries no usable extension.
pub const ANY_FORMAT: &str = "any";

pub struct ConvertApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ConvertApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("convert-bucket/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn conversion_url(&self, from: &str, target: ConversionTarget) -> String {
        format!("{}/convert/{}/to/{}", self.base_url, from, target.as_str())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ConvertApiResponse {
    #[serde(default)]
    conversion_cost: Option<u64>,
    #[serde(default)]
    files: Vec<ConvertApiFile>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ConvertApiFile {
    file_name: String,
    url: String,
    #[serde(default)]
    file_size: Option<u64>,
}

impl From<ConvertApiResponse> for ConversionResponse {
    fn from(response: ConvertApiResponse) -> Self {
        ConversionResponse {
            files: response
                .files
                .into_iter()
                .map(|file| ConvertedFile {
                    url: file.url,
                    file_name: file.file_name,
                })
                .collect(),
        }
    }
}

/// Lower-cased extension of the last path segment of `url`, ignoring query and fragment.
///
/// Returns [`ANY_FORMAT`] when the URL has no path or the last segment has no extension.
pub fn source_format(url: &str) -> String {
    let without_query = url.split(['?', '#']).next().unwrap_or(url);
    let path = match without_query.split_once("://") {
        Some((_, rest)) => match rest.find('/') {
            Some(idx) => &rest[idx..],
            None => return ANY_FORMAT.to_string(),
        },
        None => without_query,
    };
    let segment = path.rsplit('/').next().unwrap_or(path);
    match segment.rfind('.') {
        Some(idx) if idx > 0 => {
            let ext = &segment[idx + 1..];
            if !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()) {
                ext.to_ascii_lowercase()
            } else {
                ANY_FORMAT.to_string()
            }
        }
        _ => ANY_FORMAT.to_string(),
    }
}

#[async_trait]
impl ConversionService for ConvertApiClient {
    async fn convert(
        &self,
        credential: &Credential,
        target: ConversionTarget,
        source_url: &str,
    ) -> Result<ConversionResponse, BoxError> {
        let from = source_format(source_url);
        let url = self.conversion_url(&from, target);
        tracing::info!(from = %from, to = %target, "Requesting conversion");

        let body = json!({
            "Parameters": [
                { "Name": "File", "FileValue": { "Url": source_url } },
                { "Name": "StoreFile", "Value": true },
            ]
        });

        let response = self
            .http
            .post(&url)
            .bearer_auth(credential.expose())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = ?e, url = %url, "Conversion request failed");
                e
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("<Failed to decode response body>"));
            tracing::error!(status = %status, url = %url, "ConvertAPI returned error. Response body: {text}");
            return Err(format!("ConvertAPI returned {status}: {text}").into());
        }

        let parsed: ConvertApiResponse = response.json().await?;
        for file in &parsed.files {
            tracing::info!(
                file_name = %file.file_name,
                file_size = ?file.file_size,
                cost = ?parsed.conversion_cost,
                "Conversion produced file"
            );
        }
        Ok(parsed.into())
    }

    async fn download(&self, url: &str) -> Result<ObjectBody, BoxError> {
        let response = self.http.get(url).send().await?.error_for_status()?;
        tracing::debug!(content_length = ?response.content_length(), "Downloading converted file");
        Ok(response
            .bytes_stream()
            .map_err(|e| Box::new(e) as BoxError)
            .boxed())
    }
}
