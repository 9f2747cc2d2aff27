use async_trait::async_trait;
use aws_sdk_secretsmanager::Client;

use convert_bucket_core::contract::{BoxError, SecretStore, SecretValue};

/// AWS Secrets Manager implementation of [`SecretStore`].
#[derive(Clone)]
pub struct SecretsManagerStore {
    client: Client,
}

impl SecretsManagerStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SecretStore for SecretsManagerStore {
    async fn get_secret(&self, name: &str) -> Result<SecretValue, BoxError> {
        let output = self
            .client
            .get_secret_value()
            .secret_id(name)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(secret = name, error = %e, "GetSecretValue failed");
                e
            })?;

        if let Some(text) = output.secret_string() {
            tracing::debug!(secret = name, "Fetched string secret");
            return Ok(SecretValue::Text(text.to_string()));
        }
        if let Some(blob) = output.secret_binary() {
            tracing::debug!(secret = name, "Fetched binary secret");
            return Ok(SecretValue::Binary(blob.as_ref().to_vec()));
        }
        Err(format!("secret {name} has neither a string nor a binary value").into())
    }
}
