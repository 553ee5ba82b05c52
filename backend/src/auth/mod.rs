use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::axum_http::error_responses::AppError;
use crate::config::config_loader;

/// Supabase role carried by internal/admin tokens.
pub const SERVICE_ROLE: &str = "service_role";

#[derive(Debug, Serialize, Deserialize)]
pub struct SupabaseClaims {
    pub sub: String,
    pub aud: String,
    pub role: String,
    pub email: Option<String>,
    pub exp: usize,
}

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: Option<String>,
    pub role: String,
}

impl AuthUser {
    /// Admin and internal storage routes are service-role only.
    pub fn require_service_role(&self) -> Result<(), AppError> {
        if self.role == SERVICE_ROLE {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }
}

pub fn validate_supabase_jwt(token: &str, secret: &str) -> anyhow::Result<SupabaseClaims> {
    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&["authenticated", SERVICE_ROLE]);

    let token_data = decode::<SupabaseClaims>(token, &decoding_key, &validation)
        .map_err(|err| anyhow::anyhow!("JWT validation failed: {}", err))?;

    Ok(token_data.claims)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, String);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or((
                StatusCode::UNAUTHORIZED,
                "Missing Authorization header".to_string(),
            ))?;

        let token = header.strip_prefix("Bearer ").ok_or((
            StatusCode::UNAUTHORIZED,
            "Invalid Authorization header format".to_string(),
        ))?;

        let config = config_loader::load().map_err(|err| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to load config: {}", err),
            )
        })?;

        let claims = validate_supabase_jwt(token, &config.supabase.jwt_secret)
            .map_err(|err| (StatusCode::UNAUTHORIZED, err.to_string()))?;

        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| {
            (
                StatusCode::UNAUTHORIZED,
                "Invalid user ID in token".to_string(),
            )
        })?;

        Ok(AuthUser {
            user_id,
            email: claims.email,
            role: claims.role,
        })
    }
}

#[cfg(test)]
mod tests;
