use async_trait::async_trait;
use axum::body::Bytes;

use super::{DocumentTextExtractor, ProviderError, ProviderResult};

const PROVIDER: &str = "pdf";

/// Extracts text from PDF documents on a blocking worker thread.
pub struct PdfTextExtractor;

#[async_trait]
impl DocumentTextExtractor for PdfTextExtractor {
    async fn extract_text(&self, document: Bytes) -> ProviderResult<String> {
        let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&document))
            .await
            .map_err(|e| ProviderError::unavailable(PROVIDER, e.to_string()))?
            .map_err(|e| {
                tracing::warn!(error = %e, "PDF parsing failed");
                ProviderError::invalid_input(PROVIDER, e.to_string())
            })?;

        Ok(text.trim().to_string())
    }
}
