use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{postgres::PgRow, FromRow, Row};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum CreationType {
    #[serde(rename = "article")]
    Article,
    #[serde(rename = "blog-title")]
    BlogTitle,
    #[serde(rename = "image")]
    Image,
    #[serde(rename = "resume-review")]
    ResumeReview,
}

impl CreationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CreationType::Article => "article",
            CreationType::BlogTitle => "blog-title",
            CreationType::Image => "image",
            CreationType::ResumeReview => "resume-review",
        }
    }
}

impl std::str::FromStr for CreationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "article" => Ok(CreationType::Article),
            "blog-title" => Ok(CreationType::BlogTitle),
            "image" => Ok(CreationType::Image),
            "resume-review" => Ok(CreationType::ResumeReview),
            other => Err(format!("unknown creation type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Creation {
    pub id: Uuid,
    pub user_id: String,
    pub prompt: String,
    pub content: String,
    #[serde(rename = "type")]
    pub creation_type: CreationType,
    pub publish: bool,
    pub likes: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Creation {
    pub fn is_liked_by(&self, user_id: &str) -> bool {
        self.likes.iter().any(|id| id == user_id)
    }

    pub fn is_visible_to(&self, user_id: &str) -> bool {
        self.publish || self.user_id == user_id
    }
}

impl<'r> FromRow<'r, PgRow> for Creation {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let creation_type: String = row.try_get("type")?;
        let creation_type = creation_type
            .parse()
            .map_err(|e: String| sqlx::Error::ColumnDecode {
                index: "type".to_string(),
                source: e.into(),
            })?;

        Ok(Creation {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            prompt: row.try_get("prompt")?,
            content: row.try_get("content")?,
            creation_type,
            publish: row.try_get("publish")?,
            likes: row.try_get("likes")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// A generation result that has not been written yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCreation {
    pub user_id: String,
    pub prompt: String,
    pub content: String,
    pub creation_type: CreationType,
    pub publish: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreationResponse {
    pub id: Uuid,
    pub user_id: String,
    pub prompt: String,
    pub content: String,
    #[serde(rename = "type")]
    pub creation_type: CreationType,
    pub publish: bool,
    pub likes: Vec<String>,
    pub likes_count: usize,
    pub created_at: DateTime<Utc>,
}

impl From<Creation> for CreationResponse {
    fn from(creation: Creation) -> Self {
        Self {
            likes_count: creation.likes.len(),
            id: creation.id,
            user_id: creation.user_id,
            prompt: creation.prompt,
            content: creation.content,
            creation_type: creation.creation_type,
            publish: creation.publish,
            likes: creation.likes,
            created_at: creation.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreationListResponse {
    pub success: bool,
    pub creations: Vec<CreationResponse>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreationIdRequest {
    pub id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ToggleLikeResponse {
    pub success: bool,
    pub message: String,
    pub liked: bool,
    pub likes_count: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TogglePublishResponse {
    pub success: bool,
    pub message: String,
    pub publish: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct GenerateArticleRequest {
    pub prompt: String,
    pub length: u32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct GenerateBlogTitleRequest {
    pub prompt: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct GenerateImageRequest {
    pub prompt: String,
    #[serde(default)]
    pub publish: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ContentResponse {
    pub success: bool,
    pub content: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AnalysisResponse {
    pub success: bool,
    pub analysis: String,
}

/// Multipart form for background removal.
#[derive(Debug, ToSchema)]
pub struct ImageUpload {
    #[schema(format = Binary)]
    pub image: String,
}

/// Multipart form for object removal.
#[derive(Debug, ToSchema)]
pub struct ObjectRemovalUpload {
    #[schema(format = Binary)]
    pub image: String,
    /// Letters, digits, `_` and spaces only.
    #[schema(example = "coffee cup")]
    pub object: String,
}

/// Multipart form for resume review.
#[derive(Debug, ToSchema)]
pub struct ResumeUpload {
    #[schema(format = Binary)]
    pub resume: String,
}
