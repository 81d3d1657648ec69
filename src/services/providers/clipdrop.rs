use async_trait::async_trait;
use axum::body::Bytes;
use reqwest::{multipart::Form, Client};

use super::{ImageGenerator, ProviderError, ProviderResult};

const PROVIDER: &str = "clipdrop";

pub struct ClipdropClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl ClipdropClient {
    pub fn new(client: Client, base_url: &str, api_key: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }
}

#[async_trait]
impl ImageGenerator for ClipdropClient {
    async fn text_to_image(&self, prompt: &str) -> ProviderResult<Bytes> {
        let url = format!("{}/text-to-image/v1", self.base_url);
        let form = Form::new().text("prompt", prompt.to_string());

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "text-to-image request failed");
                ProviderError::from_transport(PROVIDER, e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, "text-to-image API error");
            return Err(ProviderError::from_status(PROVIDER, status, body));
        }

        let image = response
            .bytes()
            .await
            .map_err(|e| ProviderError::from_transport(PROVIDER, e))?;

        if image.is_empty() {
            return Err(ProviderError::unavailable(PROVIDER, "empty image returned"));
        }

        tracing::debug!(bytes = image.len(), "generated image");
        Ok(image)
    }
}
