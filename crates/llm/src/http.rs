use std::time::Duration;

use pipeline::ConfigurationError;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

use crate::ProviderError;

pub(crate) fn build_client(timeout: Duration) -> Result<Client, ConfigurationError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ConfigurationError::new(format!("failed to build HTTP client: {e}")))
}

/// Sends `request` and decodes a successful JSON response.
pub(crate) async fn send_json<T: DeserializeOwned>(
    request: RequestBuilder,
) -> Result<T, ProviderError> {
    let response = request.send().await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ProviderError::Api {
            status: status.as_u16(),
            body,
        });
    }

    response.json::<T>().await.map_err(ProviderError::Decode)
}
