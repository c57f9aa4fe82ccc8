//! Invitation and confirmation tokens: compact signed payloads (HS256,
//! base64url header/payload/signature) that need no server-side storage.
//! Verification is all-or-nothing — a bad signature, expired timestamp, or
//! malformed token all collapse into the same Invalid* error.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use tasker_types::api::RegistrationRequest;
use tasker_types::models::UserRole;

use crate::error::ApiError;

pub struct TokenConfig {
    pub secret: String,
    pub invite_ttl: Duration,
    pub confirm_ttl: Duration,
}

/// The pending-registration record that travels inside a confirmation
/// token; there is no server-side pending-user table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingRegistration {
    pub email: String,
    pub username: String,
    pub password: String,
    pub role: UserRole,
}

impl From<RegistrationRequest> for PendingRegistration {
    fn from(req: RegistrationRequest) -> Self {
        Self {
            email: req.email,
            username: req.username,
            password: req.password,
            role: req.role,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct InviteClaims {
    iat: i64,
    exp: i64,
    course_id: Uuid,
}

#[derive(Serialize, Deserialize)]
struct ConfirmClaims {
    iat: i64,
    exp: i64,
    #[serde(flatten)]
    registration: PendingRegistration,
}

pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    invite_ttl: Duration,
    confirm_ttl: Duration,
}

impl TokenService {
    pub fn new(config: &TokenConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Strict expiry: now > exp invalidates, no grace window.
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            invite_ttl: config.invite_ttl,
            confirm_ttl: config.confirm_ttl,
        }
    }

    pub fn create_course_invite(&self, course_id: Uuid) -> Result<String, ApiError> {
        let now = Utc::now();
        let claims = InviteClaims {
            iat: now.timestamp(),
            exp: (now + self.invite_ttl).timestamp(),
            course_id,
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| ApiError::Internal(e.into()))
    }

    pub fn resolve_course_invite(&self, token: &str) -> Result<Uuid, ApiError> {
        decode::<InviteClaims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims.course_id)
            .map_err(|_| ApiError::InvalidCourseInvite)
    }

    pub fn create_confirmation_token(
        &self,
        registration: PendingRegistration,
    ) -> Result<String, ApiError> {
        let now = Utc::now();
        let claims = ConfirmClaims {
            iat: now.timestamp(),
            exp: (now + self.confirm_ttl).timestamp(),
            registration,
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| ApiError::Internal(e.into()))
    }

    /// Timing fields are dropped here; the caller gets the registration
    /// record exactly as it was issued.
    pub fn resolve_confirmation_token(&self, token: &str) -> Result<PendingRegistration, ApiError> {
        decode::<ConfirmClaims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims.registration)
            .map_err(|_| ApiError::InvalidRegisterToken)
    }
}
