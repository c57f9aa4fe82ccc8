use axum::Json;
use axum::extract::{Path, State};
use uuid::Uuid;

use tasker_types::api::{
    AuthResponse, ConfirmInviteRequest, ConfirmInviteResponse, RegistrationRequest,
    RegistrationStartedResponse,
};
use tasker_types::models::UserRole;

use crate::access::require_acting_student;
use crate::auth::hash_password;
use crate::courses::get_course;
use crate::error::ApiError;
use crate::identity::{Identity, create_auth_token};
use crate::state::{AppState, AppStateInner, blocking};
use crate::tokens::PendingRegistration;

// -- Handlers --

/// Start of the registration flow: no user row is written yet. The whole
/// pending registration travels inside the confirmation token mailed to the
/// address.
pub async fn create_token_confirmation(
    State(state): State<AppState>,
    Json(req): Json<RegistrationRequest>,
) -> Result<Json<RegistrationStartedResponse>, ApiError> {
    let email = req.email.clone();
    let token = state
        .tokens
        .create_confirmation_token(PendingRegistration::from(req))?;

    let confirm_url = format!(
        "{}/register/{}",
        state.public_base_url.trim_end_matches('/'),
        token
    );

    let mailer = state
        .mailer
        .as_ref()
        .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("SMTP transport is not configured")))?;
    mailer.send_confirmation_email(&email, &confirm_url).await?;

    Ok(Json(RegistrationStartedResponse { email }))
}

/// End of the registration flow: the mailed token comes back, the user row
/// is created, and the new account is logged in. The email may have been
/// taken since the token was issued; that window surfaces as NotUniqueEmail
/// here.
pub async fn redeem_register_token(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<AuthResponse>, ApiError> {
    let pending = state.tokens.resolve_confirmation_token(&token)?;

    let st = state.clone();
    let (user_id, username, role) = blocking(move || register_user(&st, pending)).await?;

    let token = create_auth_token(&state.auth_secret, user_id, &username, role)?;
    Ok(Json(AuthResponse {
        user_id,
        username,
        role,
        token,
    }))
}

pub async fn confirm_course_invite(
    State(state): State<AppState>,
    identity: Identity,
    Json(req): Json<ConfirmInviteRequest>,
) -> Result<Json<ConfirmInviteResponse>, ApiError> {
    let course_id = state.tokens.resolve_course_invite(&req.invite)?;

    let st = state.clone();
    blocking(move || activate_course_invite(&st, course_id, &identity)).await?;

    Ok(Json(ConfirmInviteResponse { course_id }))
}

// -- Domain flows --

pub fn register_user(
    state: &AppStateInner,
    pending: PendingRegistration,
) -> Result<(Uuid, String, UserRole), ApiError> {
    let user_id = Uuid::new_v4();
    let password_hash = hash_password(&pending.password)?;

    let created = state.db.create_user(
        &user_id.to_string(),
        &pending.email,
        &pending.username,
        &password_hash,
        pending.role.code(),
    )?;
    if !created {
        return Err(ApiError::NotUniqueEmail);
    }

    Ok((user_id, pending.username, pending.role))
}

/// A valid invite subscribes the student to the course; redeeming it twice
/// is a no-op.
pub fn activate_course_invite(
    state: &AppStateInner,
    course_id: Uuid,
    identity: &Identity,
) -> Result<(), ApiError> {
    let student = require_acting_student(identity)?;
    let course = get_course(&state.db, course_id)?;

    state
        .db
        .subscribe_if_missing(&course.id, &student.id.to_string())?;

    Ok(())
}
