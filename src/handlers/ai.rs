use axum::{
    extract::{rejection::JsonRejection, multipart::MultipartRejection, Multipart, State},
    response::Json,
};

use crate::{
    errors::{AppError, Result},
    handlers::AppState,
    middleware::auth::AuthenticatedUser,
    models::{
        AnalysisResponse, ContentResponse, GenerateArticleRequest, GenerateBlogTitleRequest,
        GenerateImageRequest, ImageUpload, ObjectRemovalUpload, ResumeUpload,
    },
    services::{
        providers::{AssetUpload, CompletionRequest, ImageEdit, NO_CONTENT_REPLY},
        CreationDraft, Feature,
    },
    utils::file::{self, MultipartForm},
};

const TEMPERATURE: f32 = 0.7;
const BLOG_TITLE_MAX_TOKENS: u32 = 100;
const RESUME_REVIEW_MAX_TOKENS: u32 = 1000;
const MAX_ARTICLE_LENGTH: u32 = 8192;
const NO_ANALYSIS_REPLY: &str = "No analysis returned.";

fn required_prompt(prompt: &str) -> Result<String> {
    let prompt = prompt.trim();
    if prompt.is_empty() {
        return Err(AppError::Validation("Prompt is required".to_string()));
    }
    Ok(prompt.to_string())
}

/// Object names end up inside an asset-store transformation string, where
/// `,` and `/` are separators. Only word characters and spaces pass.
fn removable_object(object: &str) -> Result<String> {
    let valid = object
        .chars()
        .all(|c| c.is_alphanumeric() || c == '_' || c == ' ');
    if !valid {
        return Err(AppError::Validation(
            "Object name may only contain letters, digits and spaces".to_string(),
        ));
    }
    Ok(object.to_string())
}

fn resume_review_prompt(text: &str) -> String {
    format!(
        "Review the following resume and provide constructive feedback (strengths, weaknesses, areas for improvement):\n\n{}",
        text
    )
}

fn content(content: String) -> Json<ContentResponse> {
    Json(ContentResponse {
        success: true,
        content,
    })
}

#[utoipa::path(
    post,
    path = "/api/ai/generate-article",
    request_body = GenerateArticleRequest,
    responses(
        (status = 200, description = "Generated article", body = ContentResponse),
        (status = 403, description = "Free usage limit reached")
    ),
    security(("bearer" = [])),
    tag = "ai"
)]
pub async fn generate_article(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    payload: std::result::Result<Json<GenerateArticleRequest>, JsonRejection>,
) -> Result<Json<ContentResponse>> {
    let grant = state.generation.authorize(&user.account, Feature::Article)?;

    let Json(request) = payload?;
    let prompt = required_prompt(&request.prompt)?;
    if request.length == 0 || request.length > MAX_ARTICLE_LENGTH {
        return Err(AppError::Validation(format!(
            "Length must be between 1 and {}",
            MAX_ARTICLE_LENGTH
        )));
    }

    let completion = CompletionRequest {
        model: state.config.article_model.clone(),
        prompt: prompt.clone(),
        max_tokens: request.length,
        temperature: TEMPERATURE,
        empty_reply: NO_CONTENT_REPLY,
    };

    let text = state.providers.text.clone();
    let article = state
        .generation
        .execute(grant, CreationDraft::new(prompt), || async move {
            text.complete(completion).await
        })
        .await?;

    Ok(content(article))
}

#[utoipa::path(
    post,
    path = "/api/ai/generate-blog-title",
    request_body = GenerateBlogTitleRequest,
    responses(
        (status = 200, description = "Generated blog titles", body = ContentResponse),
        (status = 403, description = "Free usage limit reached")
    ),
    security(("bearer" = [])),
    tag = "ai"
)]
pub async fn generate_blog_title(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    payload: std::result::Result<Json<GenerateBlogTitleRequest>, JsonRejection>,
) -> Result<Json<ContentResponse>> {
    let grant = state.generation.authorize(&user.account, Feature::BlogTitle)?;

    let Json(request) = payload?;
    let prompt = required_prompt(&request.prompt)?;

    let completion = CompletionRequest {
        model: state.config.completion_model.clone(),
        prompt: prompt.clone(),
        max_tokens: BLOG_TITLE_MAX_TOKENS,
        temperature: TEMPERATURE,
        empty_reply: NO_CONTENT_REPLY,
    };

    let text = state.providers.text.clone();
    let titles = state
        .generation
        .execute(grant, CreationDraft::new(prompt), || async move {
            text.complete(completion).await
        })
        .await?;

    Ok(content(titles))
}

#[utoipa::path(
    post,
    path = "/api/ai/generate-image",
    request_body = GenerateImageRequest,
    responses(
        (status = 200, description = "URL of the generated image", body = ContentResponse),
        (status = 403, description = "Premium plan required")
    ),
    security(("bearer" = [])),
    tag = "ai"
)]
pub async fn generate_image(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    payload: std::result::Result<Json<GenerateImageRequest>, JsonRejection>,
) -> Result<Json<ContentResponse>> {
    let grant = state
        .generation
        .authorize(&user.account, Feature::ImageGeneration)?;

    let Json(request) = payload?;
    let prompt = required_prompt(&request.prompt)?;

    let images = state.providers.images.clone();
    let assets = state.providers.assets.clone();
    let provider_prompt = prompt.clone();
    let url = state
        .generation
        .execute(
            grant,
            CreationDraft::new(prompt).published(request.publish),
            || async move {
                let png = images.text_to_image(&provider_prompt).await?;
                assets.upload(AssetUpload::Png(png), None).await
            },
        )
        .await?;

    Ok(content(url))
}

#[utoipa::path(
    post,
    path = "/api/ai/remove-image-background",
    request_body(content = ImageUpload, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "URL of the edited image", body = ContentResponse),
        (status = 403, description = "Premium plan required")
    ),
    security(("bearer" = [])),
    tag = "ai"
)]
pub async fn remove_image_background(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<ContentResponse>> {
    let grant = state
        .generation
        .authorize(&user.account, Feature::BackgroundRemoval)?;

    let mut form = MultipartForm::read(multipart?).await?;
    let image = form
        .take_file("image")
        .ok_or_else(|| AppError::Validation("No image uploaded".to_string()))?;
    let content_type = file::validate_image(&image)?;

    let assets = state.providers.assets.clone();
    let upload = AssetUpload::File {
        data: image.data,
        file_name: image.file_name,
        content_type,
    };
    let url = state
        .generation
        .execute(
            grant,
            CreationDraft::new("Remove background from image"),
            || async move { assets.upload(upload, Some(ImageEdit::BackgroundRemoval)).await },
        )
        .await?;

    Ok(content(url))
}

#[utoipa::path(
    post,
    path = "/api/ai/remove-image-object",
    request_body(content = ObjectRemovalUpload, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "URL of the edited image", body = ContentResponse),
        (status = 403, description = "Premium plan required")
    ),
    security(("bearer" = [])),
    tag = "ai"
)]
pub async fn remove_image_object(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<ContentResponse>> {
    let grant = state
        .generation
        .authorize(&user.account, Feature::ObjectRemoval)?;

    let mut form = MultipartForm::read(multipart?).await?;
    let object = form
        .text("object")
        .ok_or_else(|| AppError::Validation("Object to remove is required".to_string()))
        .and_then(removable_object)?;
    let image = form
        .take_file("image")
        .ok_or_else(|| AppError::Validation("No image uploaded".to_string()))?;
    let content_type = file::validate_image(&image)?;

    let assets = state.providers.assets.clone();
    let upload = AssetUpload::File {
        data: image.data,
        file_name: image.file_name,
        content_type,
    };
    let edit = ImageEdit::ObjectRemoval {
        object: object.clone(),
    };
    let url = state
        .generation
        .execute(
            grant,
            CreationDraft::new(format!("Removed {} from image", object)),
            || async move { assets.upload(upload, Some(edit)).await },
        )
        .await?;

    Ok(content(url))
}

#[utoipa::path(
    post,
    path = "/api/ai/resume-review",
    request_body(content = ResumeUpload, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Resume feedback", body = AnalysisResponse),
        (status = 400, description = "Not a PDF or no extractable text"),
        (status = 403, description = "Free usage limit reached"),
        (status = 500, description = "PDF could not be parsed or the provider failed")
    ),
    security(("bearer" = [])),
    tag = "ai"
)]
pub async fn resume_review(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<AnalysisResponse>> {
    let grant = state
        .generation
        .authorize(&user.account, Feature::ResumeReview)?;

    let mut form = MultipartForm::read(multipart?).await?;
    let resume = form
        .take_file("resume")
        .ok_or_else(|| AppError::Validation("No resume uploaded.".to_string()))?;
    file::validate_pdf(&resume)?;

    let text = state
        .providers
        .documents
        .extract_text(resume.data)
        .await
        .map_err(|e| {
            tracing::warn!(user_id = %user.user_id, error = %e, "resume text extraction failed");
            AppError::Extraction(e)
        })?;
    if text.is_empty() {
        return Err(AppError::Validation(
            "PDF contains no extractable text.".to_string(),
        ));
    }

    let completion = CompletionRequest {
        model: state.config.completion_model.clone(),
        prompt: resume_review_prompt(&text),
        max_tokens: RESUME_REVIEW_MAX_TOKENS,
        temperature: TEMPERATURE,
        empty_reply: NO_ANALYSIS_REPLY,
    };

    let generator = state.providers.text.clone();
    let analysis = state
        .generation
        .execute(
            grant,
            CreationDraft::new("Review the uploaded resume"),
            || async move { generator.complete(completion).await },
        )
        .await?;

    Ok(Json(AnalysisResponse {
        success: true,
        analysis,
    }))
}
