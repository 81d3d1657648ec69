use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use chrono::Utc;
use reqwest::{
    multipart::{Form, Part},
    Client,
};
use serde::Deserialize;
use sha2::{Digest, Sha256};

use super::{AssetStore, AssetUpload, ImageEdit, ProviderError, ProviderResult};

const PROVIDER: &str = "cloudinary";

/// Signed uploads to the Cloudinary image upload API. The account must be
/// configured for SHA-256 request signatures.
pub struct CloudinaryClient {
    client: Client,
    base_url: String,
    cloud_name: String,
    api_key: String,
    api_secret: String,
}

#[derive(Deserialize)]
struct UploadResponse {
    secure_url: String,
}

impl CloudinaryClient {
    pub fn new(
        client: Client,
        base_url: &str,
        cloud_name: &str,
        api_key: &str,
        api_secret: &str,
    ) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            cloud_name: cloud_name.to_string(),
            api_key: api_key.to_string(),
            api_secret: api_secret.to_string(),
        }
    }

    /// Signs `params` as `k1=v1&k2=v2...` (sorted by key) followed by the
    /// API secret.
    pub fn sign(&self, params: &[(&str, String)]) -> String {
        let mut sorted: Vec<&(&str, String)> = params.iter().collect();
        sorted.sort_by(|a, b| a.0.cmp(b.0));

        let payload = sorted
            .iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect::<Vec<_>>()
            .join("&");

        let mut hasher = Sha256::new();
        hasher.update(payload.as_bytes());
        hasher.update(self.api_secret.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    fn file_part(asset: AssetUpload) -> ProviderResult<Part> {
        match asset {
            AssetUpload::Png(data) => {
                let data_uri = format!(
                    "data:image/png;base64,{}",
                    general_purpose::STANDARD.encode(&data)
                );
                Ok(Part::text(data_uri))
            }
            AssetUpload::File {
                data,
                file_name,
                content_type,
            } => Part::bytes(data.to_vec())
                .file_name(file_name)
                .mime_str(&content_type)
                .map_err(|e| ProviderError::invalid_input(PROVIDER, e.to_string())),
        }
    }
}

#[async_trait]
impl AssetStore for CloudinaryClient {
    async fn upload(&self, asset: AssetUpload, edit: Option<ImageEdit>) -> ProviderResult<String> {
        let url = format!("{}/{}/image/upload", self.base_url, self.cloud_name);

        let mut params = vec![("timestamp", Utc::now().timestamp().to_string())];
        if let Some(edit) = &edit {
            params.push(("transformation", edit.transformation()));
        }
        let signature = self.sign(&params);

        let mut form = Form::new()
            .part("file", Self::file_part(asset)?)
            .text("api_key", self.api_key.clone())
            .text("signature", signature)
            .text("signature_algorithm", "sha256");
        for (key, value) in params {
            form = form.text(key, value);
        }

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "asset upload failed");
                ProviderError::from_transport(PROVIDER, e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, "asset store API error");
            return Err(ProviderError::from_status(PROVIDER, status, body));
        }

        let uploaded: UploadResponse = response.json().await.map_err(|e| {
            ProviderError::unavailable(PROVIDER, format!("malformed response: {}", e))
        })?;

        tracing::debug!(url = %uploaded.secure_url, edited = edit.is_some(), "asset uploaded");
        Ok(uploaded.secure_url)
    }
}
