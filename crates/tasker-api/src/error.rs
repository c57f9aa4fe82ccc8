use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;
use uuid::Uuid;

/// The service-level error taxonomy. Every handler returns
/// `Result<_, ApiError>`; the conversion to an HTTP status and a JSON
/// `{"error": "..."}` body happens here, at the outermost boundary only.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("email is already registered")]
    NotUniqueEmail,
    #[error("user does not exist")]
    UserDoesNotExist,
    #[error("incorrect password")]
    IncorrectPassword,
    #[error("course does not exist")]
    CourseDoesNotExist,
    #[error("lesson does not exist")]
    LessonDoesNotExist,
    #[error("task does not exist")]
    TaskDoesNotExist,
    #[error("solution does not exist")]
    SolutionDoesNotExist,
    #[error("not enough access rights")]
    NotEnoughAccessRights,
    #[error("invalid course invite")]
    InvalidCourseInvite,
    #[error("invalid register token")]
    InvalidRegisterToken,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::NotUniqueEmail => StatusCode::CONFLICT,
            ApiError::UserDoesNotExist
            | ApiError::CourseDoesNotExist
            | ApiError::LessonDoesNotExist
            | ApiError::TaskDoesNotExist
            | ApiError::SolutionDoesNotExist => StatusCode::NOT_FOUND,
            ApiError::IncorrectPassword => StatusCode::UNAUTHORIZED,
            ApiError::NotEnoughAccessRights => StatusCode::FORBIDDEN,
            ApiError::InvalidCourseInvite | ApiError::InvalidRegisterToken => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Internal details are logged, never sent to the client.
        if let ApiError::Internal(err) = &self {
            error!("unhandled internal error: {:#}", err);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "internal server error" })),
            )
                .into_response();
        }

        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Stored ids are uuids written by us; failure to parse one back means a
/// corrupt row, not a client error.
pub(crate) fn parse_db_id(raw: &str) -> Result<Uuid, ApiError> {
    raw.parse()
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("invalid id '{raw}' from database: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_map_to_expected_statuses() {
        assert_eq!(ApiError::NotUniqueEmail.status(), StatusCode::CONFLICT);
        assert_eq!(ApiError::TaskDoesNotExist.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::NotEnoughAccessRights.status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::InvalidCourseInvite.status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn parse_db_id_rejects_corrupt_rows() {
        assert!(parse_db_id("not-a-uuid").is_err());
        let id = Uuid::new_v4();
        assert_eq!(parse_db_id(&id.to_string()).unwrap(), id);
    }
}
