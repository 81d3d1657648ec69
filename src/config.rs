use anyhow::Result;
use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub max_file_size: usize,
    pub free_usage_limit: u32,
    pub cors_origins: Vec<String>,
    pub jwt_secret: Option<String>,
    pub jwt_public_key: Option<String>,
    pub jwt_issuer: Option<String>,
    pub provider_timeout_secs: u64,
    pub completion_api_url: String,
    pub completion_api_key: String,
    pub completion_model: String,
    pub article_model: String,
    pub clipdrop_api_url: String,
    pub clipdrop_api_key: String,
    pub cloudinary_api_url: String,
    pub cloudinary_cloud_name: String,
    pub cloudinary_api_key: String,
    pub cloudinary_api_secret: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database_url: "postgresql://localhost/ai_studio".to_string(),
            port: 3000,
            max_file_size: 10 * 1024 * 1024,
            free_usage_limit: 10,
            cors_origins: vec!["http://localhost:5173".to_string()],
            jwt_secret: None,
            jwt_public_key: None,
            jwt_issuer: None,
            provider_timeout_secs: 60,
            completion_api_url: "https://generativelanguage.googleapis.com/v1beta/openai".to_string(),
            completion_api_key: String::new(),
            completion_model: "gemini-2.0-flash".to_string(),
            article_model: "gemini-2.5-flash".to_string(),
            clipdrop_api_url: "https://clipdrop-api.co".to_string(),
            clipdrop_api_key: String::new(),
            cloudinary_api_url: "https://api.cloudinary.com/v1_1".to_string(),
            cloudinary_cloud_name: String::new(),
            cloudinary_api_key: String::new(),
            cloudinary_api_secret: String::new(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = Config::default();

        Ok(Config {
            database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            port: env::var("PORT")
                .unwrap_or_else(|_| defaults.port.to_string())
                .parse()?,
            max_file_size: env::var("MAX_FILE_SIZE")
                .unwrap_or_else(|_| defaults.max_file_size.to_string()) // 10MB
                .parse()?,
            free_usage_limit: env::var("FREE_USAGE_LIMIT")
                .unwrap_or_else(|_| defaults.free_usage_limit.to_string())
                .parse()?,
            cors_origins: env::var("CORS_ORIGINS")
                .map(|origins| {
                    origins
                        .split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or(defaults.cors_origins),
            jwt_secret: env::var("JWT_SECRET").ok(),
            jwt_public_key: env::var("JWT_PUBLIC_KEY").ok(),
            jwt_issuer: env::var("JWT_ISSUER").ok(),
            provider_timeout_secs: env::var("PROVIDER_TIMEOUT_SECS")
                .unwrap_or_else(|_| defaults.provider_timeout_secs.to_string())
                .parse()?,
            completion_api_url: env::var("COMPLETION_API_URL")
                .unwrap_or(defaults.completion_api_url),
            completion_api_key: env::var("GEMINI_API_KEY").unwrap_or_default(),
            completion_model: env::var("COMPLETION_MODEL").unwrap_or(defaults.completion_model),
            article_model: env::var("ARTICLE_MODEL").unwrap_or(defaults.article_model),
            clipdrop_api_url: env::var("CLIPDROP_API_URL").unwrap_or(defaults.clipdrop_api_url),
            clipdrop_api_key: env::var("CLIPDROP_API_KEY").unwrap_or_default(),
            cloudinary_api_url: env::var("CLOUDINARY_API_URL")
                .unwrap_or(defaults.cloudinary_api_url),
            cloudinary_cloud_name: env::var("CLOUDINARY_CLOUD_NAME").unwrap_or_default(),
            cloudinary_api_key: env::var("CLOUDINARY_API_KEY").unwrap_or_default(),
            cloudinary_api_secret: env::var("CLOUDINARY_API_SECRET").unwrap_or_default(),
        })
    }
}
