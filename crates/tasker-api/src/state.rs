use std::sync::Arc;

use tracing::error;

use tasker_db::Database;

use crate::email::Mailer;
use crate::error::ApiError;
use crate::tokens::TokenService;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub tokens: TokenService,
    /// Absent when SMTP is not configured; registration-confirmation mail
    /// then fails with an internal error instead of silently dropping.
    pub mailer: Option<Mailer>,
    /// Secret for the bearer tokens issued at login; invite/confirmation
    /// tokens live in `TokenService` with their own TTLs.
    pub auth_secret: String,
    /// Base URL used to build the confirmation link sent by email.
    pub public_base_url: String,
    /// Whether a resubmission returns a graded solution to waiting.
    pub reset_status_on_resubmit: bool,
}

/// Run a synchronous database flow off the async runtime.
pub(crate) async fn blocking<F, T>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        ApiError::Internal(anyhow::anyhow!(e))
    })?
}
