mod config;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use tasker_api::email::Mailer;
use tasker_api::state::{AppState, AppStateInner};
use tasker_api::tokens::{TokenConfig, TokenService};
use tasker_api::{auth, courses, lessons, registration, solutions, tasks};

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tasker=debug,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env()?;

    // Init database
    let db = tasker_db::Database::open(&config.db_path)?;

    let tokens = TokenService::new(&TokenConfig {
        secret: config.secret_key.clone(),
        invite_ttl: config.invite_ttl,
        confirm_ttl: config.confirm_ttl,
    });

    let mailer = match &config.smtp {
        Some(smtp) => Some(Mailer::new(smtp)?),
        None => {
            warn!("SMTP is not configured; registration confirmation emails are disabled");
            None
        }
    };

    // Shared state
    let app_state: AppState = Arc::new(AppStateInner {
        db,
        tokens,
        mailer,
        auth_secret: config.secret_key.clone(),
        public_base_url: config.public_base_url.clone(),
        reset_status_on_resubmit: config.reset_status_on_resubmit,
    });

    // Page contexts (GET)
    let page_routes = Router::new()
        .route("/", get(courses::dashboard))
        .route("/profile", get(auth::profile))
        .route("/course/{course_id}", get(courses::course_page))
        .route(
            "/course/{course_id}/lesson/{lesson_id}",
            get(lessons::lesson_page),
        )
        .route(
            "/course/{course_id}/lesson/{lesson_id}/task/{task_id}",
            get(tasks::task_page),
        )
        .route(
            "/course/{course_id}/lesson/{lesson_id}/task/{task_id}/solution/{solution_id}",
            get(solutions::solution_page),
        )
        .route(
            "/course/{course_id}/waiting_solutions",
            get(solutions::waiting_solutions),
        )
        .route("/register/{token}", get(registration::redeem_register_token));

    // Actions (POST)
    let action_routes = Router::new()
        .route("/auth/login", post(auth::login))
        .route("/create_course", post(courses::create_course))
        .route(
            "/course/{course_id}/create_lesson",
            post(lessons::create_lesson),
        )
        .route(
            "/course/{course_id}/lesson/{lesson_id}/create_task",
            post(tasks::create_task),
        )
        .route("/delete_course/{course_id}", post(courses::delete_course))
        .route("/subscribe/{course_id}", post(courses::subscribe))
        .route("/search_courses", post(courses::search_courses))
        .route("/submit_solution/{task_id}", post(solutions::submit_solution))
        .route("/mark_solution", post(solutions::mark_solution))
        .route(
            "/create_token_confirmation",
            post(registration::create_token_confirmation),
        )
        .route(
            "/confirm_course_invite",
            post(registration::confirm_course_invite),
        );

    let app = Router::new()
        .merge(page_routes)
        .merge(action_routes)
        .with_state(app_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Tasker server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
