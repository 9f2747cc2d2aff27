/// `load_config` module: reads the function's environment into an [`AppConfig`].
///
/// This is the only place environment variables are read. Everything downstream receives
/// typed values, so handlers and adapters can be built in tests without touching the
/// process environment.
///
/// # Recognised variables
/// - `STORAGE_BUCKET` (required): bucket receiving processed output
/// - `AWS_REGION` (optional): region for the Secrets Manager client
/// - `CONVERTAPI_BASE_URL` (optional): conversion API base URL
///
/// # Errors
/// Failures use `anyhow::Error` and abort cold start; a misconfigured function never
/// reaches the handler.
use anyhow::Result;
use convert_bucket_core::config::DispatchConfig;
use std::env;
use tracing::{debug, error, info};

pub const STORAGE_BUCKET_VAR: &str = "STORAGE_BUCKET";
pub const REGION_VAR: &str = "AWS_REGION";
pub const CONVERTAPI_BASE_URL_VAR: &str = "CONVERTAPI_BASE_URL";

pub const DEFAULT_CONVERTAPI_BASE_URL: &str = "https://v2.convertapi.com";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub storage_bucket: String,
    pub region: Option<String>,
    pub convertapi_base_url: String,
}

impl AppConfig {
    pub fn dispatch_config(&self) -> DispatchConfig {
        DispatchConfig::new(self.storage_bucket.clone())
    }

    pub fn trace_loaded(&self) {
        info!(
            storage_bucket = %self.storage_bucket,
            region = self.region.as_deref().unwrap_or("<sdk default>"),
            convertapi_base_url = %self.convertapi_base_url,
            "Loaded AppConfig"
        );
        debug!(?self, "AppConfig loaded (full debug)");
    }
}

/// Loads the configuration from the process environment, honouring a `.env` file if present.
pub fn load_config() -> Result<AppConfig> {
    dotenvy::dotenv().ok();

    let storage_bucket = match non_empty_var(STORAGE_BUCKET_VAR) {
        Some(bucket) => bucket,
        None => {
            error!(var = STORAGE_BUCKET_VAR, "Destination bucket environment variable not set");
            return Err(anyhow::anyhow!(
                "{STORAGE_BUCKET_VAR} environment variable must be set to the destination bucket"
            ));
        }
    };

    let region = non_empty_var(REGION_VAR);

    let convertapi_base_url = non_empty_var(CONVERTAPI_BASE_URL_VAR)
        .map(|url| url.trim_end_matches('/').to_string())
        .unwrap_or_else(|| DEFAULT_CONVERTAPI_BASE_URL.to_string());

    if !convertapi_base_url.starts_with("http://") && !convertapi_base_url.starts_with("https://")
    {
        error!(url = %convertapi_base_url, "Conversion API base URL is not an HTTP(S) URL");
        anyhow::bail!("{CONVERTAPI_BASE_URL_VAR} must be an http(s) URL, got {convertapi_base_url}");
    }

    Ok(AppConfig {
        storage_bucket,
        region,
        convertapi_base_url,
    })
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
