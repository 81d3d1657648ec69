use ai_studio_server::services::providers::{
    AssetStore, AssetUpload, ChatCompletionClient, ClipdropClient, CloudinaryClient,
    CompletionRequest, ImageEdit, ImageGenerator, ProviderError, TextGenerator, NO_CONTENT_REPLY,
};
use axum::body::Bytes;
use serde_json::json;
use wiremock::{
    matchers::{body_partial_json, body_string_contains, header, method, path},
    Mock, MockServer, ResponseTemplate,
};

fn completion_request(prompt: &str) -> CompletionRequest {
    CompletionRequest {
        model: "gemini-2.0-flash".to_string(),
        prompt: prompt.to_string(),
        max_tokens: 100,
        temperature: 0.7,
        empty_reply: NO_CONTENT_REPLY,
    }
}

#[tokio::test]
async fn test_completion_sends_typed_payload_and_trims_reply() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer gemini-key"))
        .and(body_partial_json(json!({
            "model": "gemini-2.0-flash",
            "max_tokens": 100,
            "messages": [{"role": "user", "content": "titles about rust"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "  1. Fearless Rust\n"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = ChatCompletionClient::new(reqwest::Client::new(), &server.uri(), "gemini-key");
    let content = client
        .complete(completion_request("titles about rust"))
        .await
        .unwrap();

    assert_eq!(content, "1. Fearless Rust");
}

#[tokio::test]
async fn test_completion_without_choices_falls_back() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&server)
        .await;

    let client = ChatCompletionClient::new(reqwest::Client::new(), &server.uri(), "key");
    let content = client.complete(completion_request("anything")).await.unwrap();

    assert_eq!(content, "No content returned");
}

#[tokio::test]
async fn test_completion_fallback_is_chosen_per_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": null}}]
        })))
        .mount(&server)
        .await;

    let client = ChatCompletionClient::new(reqwest::Client::new(), &server.uri(), "key");
    let request = CompletionRequest {
        empty_reply: "No analysis returned.",
        ..completion_request("review this resume")
    };
    let content = client.complete(request).await.unwrap();

    assert_eq!(content, "No analysis returned.");
}

#[tokio::test]
async fn test_completion_server_error_is_unavailable() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let client = ChatCompletionClient::new(reqwest::Client::new(), &server.uri(), "key");
    let error = client
        .complete(completion_request("anything"))
        .await
        .unwrap_err();

    assert!(matches!(error, ProviderError::Unavailable { .. }));
}

#[tokio::test]
async fn test_completion_rejected_input_is_invalid_input() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(400).set_body_string("max_tokens too large"))
        .mount(&server)
        .await;

    let client = ChatCompletionClient::new(reqwest::Client::new(), &server.uri(), "key");
    let error = client
        .complete(completion_request("anything"))
        .await
        .unwrap_err();

    assert!(matches!(error, ProviderError::InvalidInput { .. }));
}

#[tokio::test]
async fn test_clipdrop_returns_image_bytes() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/text-to-image/v1"))
        .and(header("x-api-key", "clip-key"))
        .and(body_string_contains("a red fox"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"\x89PNG\r\n\x1a\nfox".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let client = ClipdropClient::new(reqwest::Client::new(), &server.uri(), "clip-key");
    let image = client.text_to_image("a red fox").await.unwrap();

    assert!(image.starts_with(b"\x89PNG"));
}

#[tokio::test]
async fn test_clipdrop_empty_body_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/text-to-image/v1"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let client = ClipdropClient::new(reqwest::Client::new(), &server.uri(), "clip-key");
    assert!(client.text_to_image("nothing").await.is_err());
}

#[tokio::test]
async fn test_cloudinary_upload_signs_and_returns_secure_url() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/demo/image/upload"))
        .and(body_string_contains("data:image/png;base64,"))
        .and(body_string_contains("signature_algorithm"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "secure_url": "https://res.cloudinary.com/demo/image/upload/v1/abc.png"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = CloudinaryClient::new(reqwest::Client::new(), &server.uri(), "demo", "key", "secret");
    let url = client
        .upload(AssetUpload::Png(Bytes::from_static(b"\x89PNG\r\n\x1a\n")), None)
        .await
        .unwrap();

    assert_eq!(url, "https://res.cloudinary.com/demo/image/upload/v1/abc.png");
}

#[tokio::test]
async fn test_cloudinary_edit_sends_transformation() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/demo/image/upload"))
        .and(body_string_contains("e_gen_remove:prompt_chair"))
        .and(body_string_contains("filename=\"room.png\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "secure_url": "https://res.cloudinary.com/demo/image/upload/e_gen_remove:prompt_chair/room.png"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = CloudinaryClient::new(reqwest::Client::new(), &server.uri(), "demo", "key", "secret");
    let upload = AssetUpload::File {
        data: Bytes::from_static(b"room-image-bytes"),
        file_name: "room.png".to_string(),
        content_type: "image/png".to_string(),
    };
    let url = client
        .upload(
            upload,
            Some(ImageEdit::ObjectRemoval {
                object: "chair".to_string(),
            }),
        )
        .await
        .unwrap();

    assert!(url.contains("e_gen_remove"));
}
