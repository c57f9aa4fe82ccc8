use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, StatusCode, header, request::Parts};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use tasker_types::models::UserRole;

use crate::state::AppState;

/// Bearer-token claims issued at login and at confirmation-token
/// redemption. Carrying the role avoids a user lookup on every request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub role: UserRole,
    pub exp: usize,
}

#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
    pub username: String,
    pub role: UserRole,
}

/// The requester, as every access-control call site sees it. Anonymous is a
/// first-class variant, not a user object with a flag, so each call site
/// matches exhaustively.
#[derive(Debug, Clone)]
pub enum Identity {
    Anonymous,
    Authenticated(CurrentUser),
}

impl Identity {
    pub fn user(&self) -> Option<&CurrentUser> {
        match self {
            Identity::Anonymous => None,
            Identity::Authenticated(user) => Some(user),
        }
    }

    pub fn from_headers(headers: &HeaderMap, secret: &str) -> Self {
        let token = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "));
        let Some(token) = token else {
            return Identity::Anonymous;
        };

        match decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        ) {
            Ok(data) => Identity::Authenticated(CurrentUser {
                id: data.claims.sub,
                username: data.claims.username,
                role: data.claims.role,
            }),
            Err(_) => Identity::Anonymous,
        }
    }
}

/// Identity-optional extraction: a missing or invalid bearer token is an
/// anonymous requester, never a rejection. Routes that allow anonymous
/// viewing take `Identity`; the access predicates decide from there.
impl FromRequestParts<AppState> for Identity {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Identity::from_headers(&parts.headers, &state.auth_secret))
    }
}

/// Strict extraction for authenticated-only routes: 401 without a valid
/// bearer token.
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = StatusCode;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match Identity::from_headers(&parts.headers, &state.auth_secret) {
            Identity::Authenticated(user) => Ok(user),
            Identity::Anonymous => Err(StatusCode::UNAUTHORIZED),
        }
    }
}

pub fn create_auth_token(
    secret: &str,
    user_id: Uuid,
    username: &str,
    role: UserRole,
) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user_id,
        username: username.to_string(),
        role,
        exp: (chrono::Utc::now() + chrono::Duration::days(30)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}
