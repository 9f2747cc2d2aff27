use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Folder segment that marks an object as eligible for conversion.
pub const SOURCE_FOLDER: &str = "original";
/// Folder segment that replaces [`SOURCE_FOLDER`] in the output key.
pub const DESTINATION_FOLDER: &str = "processed";
/// Secret Store entry holding the conversion service credential.
pub const SECRET_NAME: &str = "ConvertapiSecret";
/// Lifetime of the signed read URL handed to the conversion service.
pub const SIGNED_URL_EXPIRATION_SECS: u64 = 1800;

/// Settings the dispatcher needs for every record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Bucket that receives processed output.
    pub destination_bucket: String,
    pub source_folder: String,
    pub destination_folder: String,
    pub secret_name: String,
    pub signed_url_expiration: Duration,
}

impl DispatchConfig {
    /// Builds the config with the fixed folder, secret and expiration conventions.
    pub fn new(destination_bucket: impl Into<String>) -> Self {
        Self {
            destination_bucket: destination_bucket.into(),
            source_folder: SOURCE_FOLDER.to_string(),
            destination_folder: DESTINATION_FOLDER.to_string(),
            secret_name: SECRET_NAME.to_string(),
            signed_url_expiration: Duration::from_secs(SIGNED_URL_EXPIRATION_SECS),
        }
    }

    pub fn trace_loaded(&self) {
        info!(
            destination_bucket = %self.destination_bucket,
            source_folder = %self.source_folder,
            destination_folder = %self.destination_folder,
            "Loaded DispatchConfig"
        );
        debug!(?self, "DispatchConfig loaded (full debug)");
    }
}
