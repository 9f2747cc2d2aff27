//! Lambda entrypoint glue: wires the AWS and ConvertAPI clients into a
//! [`Dispatcher`] and adapts the runtime's event type to it.

use anyhow::{Context, Result};
use aws_config::BehaviorVersion;
use lambda_runtime::{Error, LambdaEvent};

use convert_bucket_core::contract::{ConversionService, ObjectStore, SecretStore};
use convert_bucket_core::dispatch::{DispatchReport, Dispatcher};
use convert_bucket_core::event::S3Notification;

use crate::convertapi::ConvertApiClient;
use crate::load_config::AppConfig;
use crate::s3::S3ObjectStore;
use crate::secrets::SecretsManagerStore;

/// The dispatcher as deployed.
pub type AppDispatcher = Dispatcher<S3ObjectStore, SecretsManagerStore, ConvertApiClient>;

/// Builds all collaborator clients once per process.
pub async fn build_dispatcher(config: &AppConfig) -> Result<AppDispatcher> {
    let shared = aws_config::load_defaults(BehaviorVersion::latest()).await;

    let s3 = aws_sdk_s3::Client::new(&shared);

    let mut secrets_conf = aws_sdk_secretsmanager::config::Builder::from(&shared);
    if let Some(region) = &config.region {
        secrets_conf =
            secrets_conf.region(aws_sdk_secretsmanager::config::Region::new(region.clone()));
    }
    let secrets = aws_sdk_secretsmanager::Client::from_conf(secrets_conf.build());

    let converter = ConvertApiClient::new(config.convertapi_base_url.clone())
        .context("Failed to create HTTP client for ConvertAPI")?;

    tracing::info!(
        region = ?shared.region(),
        "Initialised S3, Secrets Manager and ConvertAPI clients"
    );

    Ok(Dispatcher::new(
        config.dispatch_config(),
        S3ObjectStore::new(s3),
        SecretsManagerStore::new(secrets),
        converter,
    ))
}

/// Handles one invocation. A failed record fails the invocation so the platform can retry it.
pub async fn function_handler<O, S, C>(
    event: LambdaEvent<S3Notification>,
    dispatcher: &Dispatcher<O, S, C>,
) -> Result<DispatchReport, Error>
where
    O: ObjectStore,
    S: SecretStore,
    C: ConversionService,
{
    let (notification, context) = event.into_parts();
    tracing::info!(
        request_id = %context.request_id,
        records = notification.records.len(),
        "Invocation received"
    );

    match dispatcher.handle(&notification).await {
        Ok(report) => {
            tracing::info!(request_id = %context.request_id, ?report, "Invocation complete");
            Ok(report)
        }
        Err(e) => {
            tracing::error!(request_id = %context.request_id, error = %e, "Invocation failed");
            Err(e.into())
        }
    }
}
