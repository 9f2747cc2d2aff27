pub mod convertapi;
pub mod handler;
pub mod load_config;
pub mod s3;
pub mod secrets;

use tracing_subscriber::EnvFilter;

/// JSON logs for CloudWatch, filtered by `RUST_LOG` (default `info`).
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();
}
