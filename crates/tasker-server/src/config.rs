use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Duration;

use tasker_api::email::SmtpConfig;

/// All runtime configuration, read from the environment once at startup.
/// Components receive their slice of this through constructors; nothing
/// else reads environment variables.
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    /// Signs bearer, invite, and confirmation tokens.
    pub secret_key: String,
    pub invite_ttl: Duration,
    pub confirm_ttl: Duration,
    /// Base for the confirmation links sent by email.
    pub public_base_url: String,
    /// Whether a resubmission returns a graded solution to waiting.
    pub reset_status_on_resubmit: bool,
    /// Absent unless all SMTP variables are set.
    pub smtp: Option<SmtpConfig>,
}

const DEFAULT_INVITE_TTL_SECS: i64 = 60 * 60 * 24 * 7;
const DEFAULT_CONFIRM_TTL_SECS: i64 = 60 * 60;

impl Config {
    pub fn from_env() -> Result<Self> {
        let host = env::var("TASKER_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port: u16 = env::var("TASKER_PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .context("invalid TASKER_PORT")?;
        let db_path =
            PathBuf::from(env::var("TASKER_DB_PATH").unwrap_or_else(|_| "tasker.db".into()));

        let secret_key =
            env::var("TASKER_SECRET_KEY").unwrap_or_else(|_| "dev-secret-change-me".into());

        let invite_ttl_secs: i64 = env::var("TASKER_INVITE_TTL_SECS")
            .unwrap_or_else(|_| DEFAULT_INVITE_TTL_SECS.to_string())
            .parse()
            .context("invalid TASKER_INVITE_TTL_SECS")?;
        let confirm_ttl_secs: i64 = env::var("TASKER_CONFIRM_TTL_SECS")
            .unwrap_or_else(|_| DEFAULT_CONFIRM_TTL_SECS.to_string())
            .parse()
            .context("invalid TASKER_CONFIRM_TTL_SECS")?;

        let public_base_url = env::var("TASKER_PUBLIC_BASE_URL")
            .unwrap_or_else(|_| format!("http://localhost:{port}"));

        let reset_status_on_resubmit: bool = env::var("TASKER_RESET_STATUS_ON_RESUBMIT")
            .unwrap_or_else(|_| "true".into())
            .parse()
            .context("invalid TASKER_RESET_STATUS_ON_RESUBMIT")?;

        let smtp = Self::smtp_from_env()?;

        Ok(Self {
            host,
            port,
            db_path,
            secret_key,
            invite_ttl: Duration::seconds(invite_ttl_secs),
            confirm_ttl: Duration::seconds(confirm_ttl_secs),
            public_base_url,
            reset_status_on_resubmit,
            smtp,
        })
    }

    fn smtp_from_env() -> Result<Option<SmtpConfig>> {
        let (host, username, password, from) = match (
            env::var("TASKER_SMTP_HOST"),
            env::var("TASKER_SMTP_USERNAME"),
            env::var("TASKER_SMTP_PASSWORD"),
            env::var("TASKER_SMTP_FROM"),
        ) {
            (Ok(host), Ok(username), Ok(password), Ok(from)) => (host, username, password, from),
            _ => return Ok(None),
        };

        let port: u16 = env::var("TASKER_SMTP_PORT")
            .unwrap_or_else(|_| "465".into())
            .parse()
            .context("invalid TASKER_SMTP_PORT")?;

        Ok(Some(SmtpConfig {
            host,
            port,
            username,
            password,
            from,
        }))
    }
}
