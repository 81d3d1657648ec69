use axum::Router;
use utoipa::{
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::liveness,
        crate::handlers::health::readiness,
        crate::handlers::ai::generate_article,
        crate::handlers::ai::generate_blog_title,
        crate::handlers::ai::generate_image,
        crate::handlers::ai::remove_image_background,
        crate::handlers::ai::remove_image_object,
        crate::handlers::ai::resume_review,
        crate::handlers::user::get_user_creations,
        crate::handlers::user::get_published_creations,
        crate::handlers::user::toggle_like_creation,
        crate::handlers::user::toggle_publish_creation,
    ),
    components(
        schemas(
            crate::models::CreationType,
            crate::models::CreationResponse,
            crate::models::CreationListResponse,
            crate::models::CreationIdRequest,
            crate::models::ToggleLikeResponse,
            crate::models::TogglePublishResponse,
            crate::models::GenerateArticleRequest,
            crate::models::GenerateBlogTitleRequest,
            crate::models::GenerateImageRequest,
            crate::models::ContentResponse,
            crate::models::AnalysisResponse,
            crate::models::ImageUpload,
            crate::models::ObjectRemovalUpload,
            crate::models::ResumeUpload,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "ai", description = "Content generation endpoints"),
        (name = "user", description = "Creation listing and community endpoints"),
        (name = "health", description = "Health check endpoints")
    ),
    info(
        title = "AI Studio API",
        version = "0.1.0",
        description = "Quota-gated text and image generation backed by external AI providers"
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}

pub fn create_docs_router() -> Router<AppState> {
    Router::new()
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/ai/generate-article",
            "/api/ai/resume-review",
            "/api/user/toggle-like-creation",
            "/health/ready",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
    }

    #[test]
    fn test_upload_forms_are_multipart() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/ai/remove-image-background",
            "/api/ai/remove-image-object",
            "/api/ai/resume-review",
        ] {
            let operation = doc.paths.paths[path]
                .operations
                .values()
                .next()
                .expect("operation");
            let body = operation.request_body.as_ref().expect("request body");
            assert!(
                body.content.contains_key("multipart/form-data"),
                "{} is not multipart",
                path
            );
        }

        let schemas = &doc.components.as_ref().expect("components").schemas;
        assert!(schemas.contains_key("ResumeUpload"));
    }
}
