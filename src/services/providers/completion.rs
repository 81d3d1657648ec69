use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{CompletionRequest, ProviderError, ProviderResult, TextGenerator};

const PROVIDER: &str = "completion";

/// Client for an OpenAI-compatible `/chat/completions` endpoint.
pub struct ChatCompletionClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl ChatCompletionClient {
    pub fn new(client: Client, base_url: &str, api_key: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: Option<ChatChoiceMessage>,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[async_trait]
impl TextGenerator for ChatCompletionClient {
    async fn complete(&self, request: CompletionRequest) -> ProviderResult<String> {
        let url = format!("{}/chat/completions", self.base_url);

        let wire_request = ChatRequest {
            model: &request.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &request.prompt,
            }],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        tracing::debug!(model = %request.model, max_tokens = request.max_tokens, "sending completion request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&wire_request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "completion request failed");
                ProviderError::from_transport(PROVIDER, e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::error!(status = %status, "completion API error");
            return Err(ProviderError::from_status(PROVIDER, status, body));
        }

        let wire_response: ChatResponse = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "failed to parse completion response");
            ProviderError::unavailable(PROVIDER, format!("malformed response: {}", e))
        })?;

        let content = wire_response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .unwrap_or_else(|| request.empty_reply.to_string());

        Ok(content)
    }
}
