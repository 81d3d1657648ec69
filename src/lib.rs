use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

pub mod auth;
pub mod config;
pub mod database;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

use crate::handlers::{ai, docs, health, metrics::metrics_handler, user, AppState};

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

/// Builds the full router. `/metrics` is only mounted when a Prometheus
/// recorder has been installed by the caller.
pub fn create_app(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let ai_routes = Router::new()
        .route("/generate-article", post(ai::generate_article))
        .route("/generate-blog-title", post(ai::generate_blog_title))
        .route("/generate-image", post(ai::generate_image))
        .route("/remove-image-background", post(ai::remove_image_background))
        .route("/remove-image-object", post(ai::remove_image_object))
        .route("/resume-review", post(ai::resume_review));

    let user_routes = Router::new()
        .route("/get-user-creations", get(user::get_user_creations))
        .route("/get-published-creations", get(user::get_published_creations))
        .route("/toggle-like-creation", post(user::toggle_like_creation))
        .route("/toggle-publish-creation", post(user::toggle_publish_creation));

    let mut app = Router::new()
        .route("/health", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .nest("/api/ai", ai_routes)
        .nest("/api/user", user_routes)
        .merge(docs::create_docs_router());

    if let Some(handle) = metrics_handle {
        app = app.route("/metrics", get(move || metrics_handler(handle.clone())));
    }

    app.layer(from_fn_with_state(
        state.clone(),
        crate::middleware::metrics_middleware,
    ))
    .layer(DefaultBodyLimit::max(state.config.max_file_size))
    .layer(cors_layer(&state.config.cors_origins))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}
