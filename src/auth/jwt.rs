use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::errors::{AppError, Result};

/// Session claims issued by the identity provider. `sub` is the user id.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
    #[serde(default)]
    pub iat: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

pub struct JwtService {
    encoding_key: Option<EncodingKey>,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtService {
    /// Shared-secret (HS256) verifier. Can also issue tokens.
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: Some(EncodingKey::from_secret(secret.as_ref())),
            decoding_key: DecodingKey::from_secret(secret.as_ref()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// RS256 verifier for the provider's PEM public key.
    pub fn from_rsa_pem(public_key_pem: &str) -> Result<Self> {
        let decoding_key = DecodingKey::from_rsa_pem(public_key_pem.as_bytes())
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Invalid JWT public key: {}", e)))?;

        Ok(Self {
            encoding_key: None,
            decoding_key,
            validation: Validation::new(Algorithm::RS256),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let service = match (&config.jwt_public_key, &config.jwt_secret) {
            (Some(pem), _) => Self::from_rsa_pem(pem)?,
            (None, Some(secret)) => Self::new(secret),
            (None, None) => {
                return Err(AppError::Internal(anyhow::anyhow!(
                    "Either JWT_PUBLIC_KEY or JWT_SECRET must be set"
                )))
            }
        };

        Ok(match &config.jwt_issuer {
            Some(issuer) => service.with_issuer(issuer),
            None => service,
        })
    }

    pub fn with_issuer(mut self, issuer: &str) -> Self {
        self.validation.set_issuer(&[issuer]);
        self
    }

    pub fn generate_token(&self, user_id: &str, ttl: Duration) -> Result<String> {
        let encoding_key = self
            .encoding_key
            .as_ref()
            .ok_or_else(|| AppError::Auth("Token issuing is not configured".to_string()))?;

        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
            iss: self
                .validation
                .iss
                .as_ref()
                .and_then(|issuers| issuers.iter().next().cloned()),
        };

        encode(&Header::new(Algorithm::HS256), &claims, encoding_key)
            .map_err(|e| AppError::Auth(format!("Failed to generate token: {}", e)))
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| AppError::Auth(format!("Invalid token: {}", e)))?;

        if token_data.claims.sub.is_empty() {
            return Err(AppError::Auth("Token has no subject".to_string()));
        }

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jwt_generation_and_verification() {
        let jwt_service = JwtService::new("test-secret");

        let token = jwt_service
            .generate_token("user_2abc", Duration::hours(1))
            .unwrap();
        let claims = jwt_service.verify_token(&token).unwrap();

        assert_eq!(claims.sub, "user_2abc");
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let jwt_service = JwtService::new("test-secret");
        let token = jwt_service
            .generate_token("user_2abc", Duration::hours(-2))
            .unwrap();

        assert!(matches!(
            jwt_service.verify_token(&token),
            Err(AppError::Auth(_))
        ));
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let issuer = JwtService::new("secret-a");
        let verifier = JwtService::new("secret-b");
        let token = issuer.generate_token("user_2abc", Duration::hours(1)).unwrap();

        assert!(verifier.verify_token(&token).is_err());
    }

    #[test]
    fn test_issuer_is_checked() {
        let issuer = JwtService::new("secret").with_issuer("https://clerk.example");
        let token = issuer.generate_token("user_2abc", Duration::hours(1)).unwrap();
        assert!(issuer.verify_token(&token).is_ok());

        let other = JwtService::new("secret").with_issuer("https://other.example");
        assert!(other.verify_token(&token).is_err());
    }

    #[test]
    fn test_config_requires_a_key() {
        let config = Config::default();
        assert!(JwtService::from_config(&config).is_err());

        let config = Config {
            jwt_secret: Some("secret".to_string()),
            ..Config::default()
        };
        assert!(JwtService::from_config(&config).is_ok());
    }
}
