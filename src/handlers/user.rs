use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
};

use crate::{
    errors::{AppError, Result},
    handlers::AppState,
    middleware::auth::AuthenticatedUser,
    models::{
        CreationIdRequest, CreationListResponse, CreationResponse, ToggleLikeResponse,
        TogglePublishResponse,
    },
};

#[utoipa::path(
    get,
    path = "/api/user/get-user-creations",
    responses((status = 200, description = "The caller's creations, newest first", body = CreationListResponse)),
    security(("bearer" = [])),
    tag = "user"
)]
pub async fn get_user_creations(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<CreationListResponse>> {
    let creations = state.creations.list_by_user(&user.user_id).await?;

    Ok(Json(CreationListResponse {
        success: true,
        creations: creations.into_iter().map(CreationResponse::from).collect(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/user/get-published-creations",
    responses((status = 200, description = "Published creations, newest first", body = CreationListResponse)),
    security(("bearer" = [])),
    tag = "user"
)]
pub async fn get_published_creations(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
) -> Result<Json<CreationListResponse>> {
    let creations = state.creations.list_published().await?;

    Ok(Json(CreationListResponse {
        success: true,
        creations: creations.into_iter().map(CreationResponse::from).collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/user/toggle-like-creation",
    request_body = CreationIdRequest,
    responses(
        (status = 200, description = "Like toggled", body = ToggleLikeResponse),
        (status = 404, description = "Creation not found")
    ),
    security(("bearer" = [])),
    tag = "user"
)]
pub async fn toggle_like_creation(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    payload: std::result::Result<Json<CreationIdRequest>, JsonRejection>,
) -> Result<Json<ToggleLikeResponse>> {
    let Json(request) = payload?;

    let creation = state
        .creations
        .toggle_like(request.id, &user.user_id)
        .await?
        .ok_or(AppError::NotFound)?;

    let liked = creation.is_liked_by(&user.user_id);
    tracing::debug!(user_id = %user.user_id, creation_id = %creation.id, liked, "like toggled");

    Ok(Json(ToggleLikeResponse {
        success: true,
        message: if liked { "Creation Liked" } else { "Creation Unliked" }.to_string(),
        liked,
        likes_count: creation.likes.len(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/user/toggle-publish-creation",
    request_body = CreationIdRequest,
    responses(
        (status = 200, description = "Publish flag toggled", body = TogglePublishResponse),
        (status = 404, description = "Creation not found")
    ),
    security(("bearer" = [])),
    tag = "user"
)]
pub async fn toggle_publish_creation(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    payload: std::result::Result<Json<CreationIdRequest>, JsonRejection>,
) -> Result<Json<TogglePublishResponse>> {
    let Json(request) = payload?;

    let creation = state
        .creations
        .toggle_publish(request.id, &user.user_id)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(TogglePublishResponse {
        success: true,
        message: if creation.publish {
            "Creation Published"
        } else {
            "Creation Unpublished"
        }
        .to_string(),
        publish: creation.publish,
    }))
}
