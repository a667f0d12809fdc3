//! Bearer-token identification of the acting user.
//!
//! Tokens are HS256 JWTs signed with the configured secret. Routes never
//! require one; a valid token only supplies the actor stamped into audit
//! fields.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::{Authorization, HeaderMapExt};
use coursedesk_core::document::model::Actor;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;

/// JWT claims carried by admin tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub user_id: String,
    pub email: String,
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
}

impl Claims {
    pub fn new(user_id: &str, email: &str, role: &str, ttl: chrono::Duration) -> Self {
        Self {
            user_id: user_id.to_string(),
            email: email.to_string(),
            role: role.to_string(),
            name: None,
            exp: (chrono::Utc::now() + ttl).timestamp(),
        }
    }

    pub fn actor(&self) -> Actor {
        Actor {
            user_id: Some(self.user_id.clone()),
            name: self.name.clone(),
            email: Some(self.email.clone()),
        }
    }
}

pub fn issue_token(claims: &Claims, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Check signature and expiry, returning the embedded claims.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}

/// The acting user, when the request carries a bearer token.
///
/// A missing `Authorization` header yields `MaybeActor(None)`; a header that
/// is present but malformed, badly signed or expired is rejected with 401.
#[derive(Debug, Clone, Default)]
pub struct MaybeActor(pub Option<Actor>);

impl MaybeActor {
    pub fn actor(&self) -> Option<&Actor> {
        self.0.as_ref()
    }
}

impl FromRequestParts<AppState> for MaybeActor {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if !parts.headers.contains_key(AUTHORIZATION) {
            return Ok(MaybeActor(None));
        }
        let bearer = parts
            .headers
            .typed_get::<Authorization<Bearer>>()
            .ok_or_else(|| {
                ApiError::Unauthorized("Invalid Authorization format. Expected: Bearer <token>".into())
            })?;
        let claims = verify_token(bearer.token(), &state.config().jwt_secret)
            .map_err(|_| ApiError::Unauthorized("Invalid or expired token".into()))?;
        tracing::debug!(user_id = %claims.user_id, role = %claims.role, "authenticated request");
        Ok(MaybeActor(Some(claims.actor())))
    }
}
