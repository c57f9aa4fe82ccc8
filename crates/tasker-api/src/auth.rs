use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{Json, extract::State};

use tasker_types::api::{AuthResponse, LoginRequest, ProfileResponse};
use tasker_types::models::UserRole;

use crate::error::{ApiError, parse_db_id};
use crate::identity::{CurrentUser, create_auth_token};
use crate::state::{AppState, blocking};

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let st = state.clone();
    let user = blocking(move || {
        let user = st
            .db
            .get_user_by_email(&req.email)?
            .ok_or(ApiError::UserDoesNotExist)?;
        verify_password(&req.password, &user.password)?;
        Ok(user)
    })
    .await?;

    let user_id = parse_db_id(&user.id)?;
    let role = UserRole::from_code(user.role)
        .ok_or_else(|| anyhow::anyhow!("invalid user.role {} from database", user.role))?;
    let token = create_auth_token(&state.auth_secret, user_id, &user.username, role)?;

    Ok(Json(AuthResponse {
        user_id,
        username: user.username,
        role,
        token,
    }))
}

pub async fn profile(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<ProfileResponse>, ApiError> {
    let st = state.clone();
    let user = blocking(move || {
        st.db
            .get_user_by_id(&current.id.to_string())?
            .ok_or(ApiError::UserDoesNotExist)
    })
    .await?;

    Ok(Json(ProfileResponse {
        user_id: parse_db_id(&user.id)?,
        email: user.email,
        username: user.username,
        role: UserRole::from_code(user.role)
            .ok_or_else(|| anyhow::anyhow!("invalid user.role {} from database", user.role))?,
    }))
}

pub(crate) fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("password hashing failed: {e}"))?;
    Ok(hash.to_string())
}

pub(crate) fn verify_password(password: &str, stored_hash: &str) -> Result<(), ApiError> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| anyhow::anyhow!("corrupt password hash in database: {e}"))?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| ApiError::IncorrectPassword)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_verifies_against_its_own_hash_only() {
        let hash = hash_password("12345678").unwrap();
        assert!(verify_password("12345678", &hash).is_ok());
        assert!(matches!(
            verify_password("87654321", &hash),
            Err(ApiError::IncorrectPassword)
        ));
    }
}
