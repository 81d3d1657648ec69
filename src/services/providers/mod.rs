use async_trait::async_trait;
use axum::body::Bytes;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::config::Config;

pub mod clipdrop;
pub mod cloudinary;
pub mod completion;
pub mod pdf;

pub use clipdrop::ClipdropClient;
pub use cloudinary::CloudinaryClient;
pub use completion::ChatCompletionClient;
pub use pdf::PdfTextExtractor;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("{provider} unavailable: {message}")]
    Unavailable {
        provider: &'static str,
        message: String,
    },

    #[error("{provider} rejected the input: {message}")]
    InvalidInput {
        provider: &'static str,
        message: String,
    },

    #[error("provider request timed out")]
    Timeout,
}

impl ProviderError {
    pub fn unavailable(provider: &'static str, message: impl Into<String>) -> Self {
        ProviderError::Unavailable {
            provider,
            message: message.into(),
        }
    }

    pub fn invalid_input(provider: &'static str, message: impl Into<String>) -> Self {
        ProviderError::InvalidInput {
            provider,
            message: message.into(),
        }
    }

    /// Maps a transport failure from reqwest.
    pub fn from_transport(provider: &'static str, error: reqwest::Error) -> Self {
        if error.is_timeout() {
            ProviderError::Timeout
        } else {
            ProviderError::unavailable(provider, error.to_string())
        }
    }

    /// Maps an upstream non-success status. 4xx input complaints become
    /// `InvalidInput`, everything else `Unavailable`.
    pub fn from_status(provider: &'static str, status: reqwest::StatusCode, body: String) -> Self {
        match status.as_u16() {
            400 | 413 | 415 | 422 => ProviderError::invalid_input(provider, body),
            408 | 504 => ProviderError::Timeout,
            _ => ProviderError::unavailable(provider, format!("status {}: {}", status, body)),
        }
    }
}

pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

/// Reply used when the model returns no text.
pub const NO_CONTENT_REPLY: &str = "No content returned";

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Returned in place of an empty or missing completion.
    pub empty_reply: &'static str,
}

/// Incoming transformation the asset store applies while ingesting an image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageEdit {
    BackgroundRemoval,
    ObjectRemoval { object: String },
}

impl ImageEdit {
    pub fn transformation(&self) -> String {
        match self {
            ImageEdit::BackgroundRemoval => "e_background_removal".to_string(),
            ImageEdit::ObjectRemoval { object } => format!("e_gen_remove:prompt_{}", object),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AssetUpload {
    /// Raw PNG bytes, sent as a base64 data URI.
    Png(Bytes),
    /// An uploaded file, sent as a multipart file part.
    File {
        data: Bytes,
        file_name: String,
        content_type: String,
    },
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> ProviderResult<String>;
}

#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Returns the generated image as PNG bytes.
    async fn text_to_image(&self, prompt: &str) -> ProviderResult<Bytes>;
}

#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Uploads the asset, applying `edit` on the way in, and returns its
    /// public URL.
    async fn upload(&self, asset: AssetUpload, edit: Option<ImageEdit>) -> ProviderResult<String>;
}

#[async_trait]
pub trait DocumentTextExtractor: Send + Sync {
    async fn extract_text(&self, document: Bytes) -> ProviderResult<String>;
}

#[derive(Clone)]
pub struct Providers {
    pub text: Arc<dyn TextGenerator>,
    pub images: Arc<dyn ImageGenerator>,
    pub assets: Arc<dyn AssetStore>,
    pub documents: Arc<dyn DocumentTextExtractor>,
}

impl Providers {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.provider_timeout_secs))
            .build()?;

        Ok(Self {
            text: Arc::new(ChatCompletionClient::new(
                client.clone(),
                &config.completion_api_url,
                &config.completion_api_key,
            )),
            images: Arc::new(ClipdropClient::new(
                client.clone(),
                &config.clipdrop_api_url,
                &config.clipdrop_api_key,
            )),
            assets: Arc::new(CloudinaryClient::new(
                client,
                &config.cloudinary_api_url,
                &config.cloudinary_cloud_name,
                &config.cloudinary_api_key,
                &config.cloudinary_api_secret,
            )),
            documents: Arc::new(PdfTextExtractor),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transformations() {
        assert_eq!(
            ImageEdit::BackgroundRemoval.transformation(),
            "e_background_removal"
        );
        assert_eq!(
            ImageEdit::ObjectRemoval {
                object: "watch".to_string()
            }
            .transformation(),
            "e_gen_remove:prompt_watch"
        );
    }

    #[test]
    fn test_status_mapping() {
        let error = ProviderError::from_status("test", reqwest::StatusCode::BAD_REQUEST, "bad".into());
        assert!(matches!(error, ProviderError::InvalidInput { .. }));

        let error = ProviderError::from_status("test", reqwest::StatusCode::GATEWAY_TIMEOUT, String::new());
        assert!(matches!(error, ProviderError::Timeout));

        let error = ProviderError::from_status("test", reqwest::StatusCode::SERVICE_UNAVAILABLE, String::new());
        assert!(matches!(error, ProviderError::Unavailable { .. }));
    }
}
