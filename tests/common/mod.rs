#![allow(dead_code)]

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

use ai_studio_server::{
    auth::JwtService,
    config::Config,
    create_app,
    errors::{AppError, Result},
    handlers::AppState,
    models::{Creation, NewCreation, Plan},
    services::{
        providers::{
            AssetStore, AssetUpload, CompletionRequest, DocumentTextExtractor, ImageEdit,
            ImageGenerator, ProviderError, ProviderResult, Providers, TextGenerator,
        },
        CreationStore, MemoryCreationStore, MemoryIdentityStore,
    },
};
use async_trait::async_trait;
use axum::{
    body::{Body, Bytes},
    http::{header, Request, Response},
    Router,
};
use uuid::Uuid;

pub const JWT_SECRET: &str = "test-secret";
pub const BOUNDARY: &str = "X-AI-STUDIO-BOUNDARY";

#[derive(Default)]
pub struct FakeText {
    pub calls: AtomicUsize,
    pub fail: bool,
    pub last_request: Mutex<Option<CompletionRequest>>,
}

#[async_trait]
impl TextGenerator for FakeText {
    async fn complete(&self, request: CompletionRequest) -> ProviderResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_request.lock() {
            *last = Some(request.clone());
        }
        if self.fail {
            return Err(ProviderError::unavailable("completion", "upstream is down"));
        }
        Ok(format!("generated: {}", request.prompt))
    }
}

#[derive(Default)]
pub struct FakeImages {
    pub calls: AtomicUsize,
}

#[async_trait]
impl ImageGenerator for FakeImages {
    async fn text_to_image(&self, _prompt: &str) -> ProviderResult<Bytes> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Bytes::from_static(b"\x89PNG\r\n\x1a\nfake"))
    }
}

#[derive(Default)]
pub struct FakeAssets {
    pub calls: AtomicUsize,
    pub last_edit: Mutex<Option<ImageEdit>>,
}

#[async_trait]
impl AssetStore for FakeAssets {
    async fn upload(&self, _asset: AssetUpload, edit: Option<ImageEdit>) -> ProviderResult<String> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_edit.lock() {
            *last = edit;
        }
        Ok(format!("https://assets.example/{}.png", n))
    }
}

pub struct FakeDocuments {
    pub text: String,
    pub fail: bool,
}

#[async_trait]
impl DocumentTextExtractor for FakeDocuments {
    async fn extract_text(&self, _document: Bytes) -> ProviderResult<String> {
        if self.fail {
            return Err(ProviderError::invalid_input("pdf", "invalid cross-reference table"));
        }
        Ok(self.text.clone())
    }
}

/// Creation store whose writes always fail; reads return nothing.
pub struct FailingCreationStore;

#[async_trait]
impl CreationStore for FailingCreationStore {
    async fn insert(&self, _creation: NewCreation) -> Result<Creation> {
        Err(AppError::Internal(anyhow::anyhow!("database unavailable")))
    }

    async fn list_by_user(&self, _user_id: &str) -> Result<Vec<Creation>> {
        Ok(Vec::new())
    }

    async fn list_published(&self) -> Result<Vec<Creation>> {
        Ok(Vec::new())
    }

    async fn toggle_like(&self, _id: Uuid, _user_id: &str) -> Result<Option<Creation>> {
        Ok(None)
    }

    async fn toggle_publish(&self, _id: Uuid, _user_id: &str) -> Result<Option<Creation>> {
        Ok(None)
    }

    async fn health_check(&self) -> Result<()> {
        Err(AppError::Internal(anyhow::anyhow!("database unavailable")))
    }
}

pub struct TestApp {
    pub router: Router,
    pub identity: Arc<MemoryIdentityStore>,
    pub creations: Arc<MemoryCreationStore>,
    pub text: Arc<FakeText>,
    pub images: Arc<FakeImages>,
    pub assets: Arc<FakeAssets>,
}

pub struct TestAppBuilder {
    failing_text: bool,
    failing_store: bool,
    failing_documents: bool,
    document_text: String,
    documents: Option<Arc<dyn DocumentTextExtractor>>,
}

impl Default for TestAppBuilder {
    fn default() -> Self {
        Self {
            failing_text: false,
            failing_store: false,
            failing_documents: false,
            document_text: "Jane Doe. Rust engineer. Built a quota service.".to_string(),
            documents: None,
        }
    }
}

impl TestAppBuilder {
    pub fn failing_text(mut self) -> Self {
        self.failing_text = true;
        self
    }

    pub fn failing_store(mut self) -> Self {
        self.failing_store = true;
        self
    }

    pub fn failing_documents(mut self) -> Self {
        self.failing_documents = true;
        self
    }

    /// Replaces the fake extractor, e.g. with the real PDF parser.
    pub fn documents(mut self, documents: Arc<dyn DocumentTextExtractor>) -> Self {
        self.documents = Some(documents);
        self
    }

    pub fn document_text(mut self, text: &str) -> Self {
        self.document_text = text.to_string();
        self
    }

    pub fn build(self) -> TestApp {
        let identity = Arc::new(MemoryIdentityStore::new());
        let creations = Arc::new(MemoryCreationStore::new());
        let text = Arc::new(FakeText {
            fail: self.failing_text,
            ..FakeText::default()
        });
        let images = Arc::new(FakeImages::default());
        let assets = Arc::new(FakeAssets::default());

        let providers = Providers {
            text: text.clone(),
            images: images.clone(),
            assets: assets.clone(),
            documents: self.documents.unwrap_or_else(|| {
                Arc::new(FakeDocuments {
                    text: self.document_text,
                    fail: self.failing_documents,
                })
            }),
        };

        let store: Arc<dyn CreationStore> = if self.failing_store {
            Arc::new(FailingCreationStore)
        } else {
            creations.clone()
        };

        let state = AppState::new(
            Config::default(),
            JwtService::new(JWT_SECRET),
            identity.clone(),
            store,
            providers,
        );

        TestApp {
            router: create_app(state, None),
            identity,
            creations,
            text,
            images,
            assets,
        }
    }
}

pub fn test_app() -> TestApp {
    TestAppBuilder::default().build()
}

impl TestApp {
    pub fn with_user(self, user_id: &str, plan: Plan, free_usage: u32) -> Self {
        self.identity.insert(user_id, plan, free_usage);
        self
    }
}

pub fn token_for(user_id: &str) -> String {
    JwtService::new(JWT_SECRET)
        .generate_token(user_id, chrono::Duration::hours(1))
        .expect("failed to sign test token")
}

pub fn json_request(uri: &str, user_id: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token_for(user_id)))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get_request(uri: &str, user_id: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token_for(user_id)))
        .body(Body::empty())
        .unwrap()
}

pub enum Part<'a> {
    Text(&'a str, &'a str),
    File {
        name: &'a str,
        file_name: &'a str,
        content_type: &'a str,
        data: &'a [u8],
    },
}

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File {
                name,
                file_name,
                content_type,
                data,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                        name, file_name, content_type
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(data);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn multipart_request(uri: &str, user_id: &str, parts: &[Part<'_>]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token_for(user_id)))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR";
pub const PDF_BYTES: &[u8] = b"%PDF-1.4\n%fake resume\n";
