use axum::Json;
use axum::extract::{Path, State};
use serde_json::{Value, json};
use tracing::warn;
use uuid::Uuid;

use tasker_types::api::{
    MarkSolutionRequest, SolutionPageResponse, SubmitSolutionRequest, WaitingSolution,
    WaitingSolutionsResponse,
};
use tasker_types::models::SolutionStatus;

use crate::access::{ensure_course_teacher, require_acting_student};
use crate::courses::get_course;
use crate::error::{ApiError, parse_db_id};
use crate::identity::Identity;
use crate::state::{AppState, AppStateInner, blocking};
use crate::tasks::get_task;

// -- Handlers --

pub async fn submit_solution(
    State(state): State<AppState>,
    Path(task_id): Path<Uuid>,
    identity: Identity,
    Json(req): Json<SubmitSolutionRequest>,
) -> Result<Json<Value>, ApiError> {
    let st = state.clone();
    blocking(move || create_or_update_solution(&st, task_id, req, &identity)).await?;
    Ok(Json(json!({})))
}

pub async fn mark_solution(
    State(state): State<AppState>,
    identity: Identity,
    Json(req): Json<MarkSolutionRequest>,
) -> Result<Json<Value>, ApiError> {
    let st = state.clone();
    blocking(move || mark_solution_record(&st, req, &identity)).await?;
    Ok(Json(json!({})))
}

pub async fn solution_page(
    State(state): State<AppState>,
    Path((course_id, lesson_id, task_id, solution_id)): Path<(Uuid, Uuid, Uuid, Uuid)>,
    identity: Identity,
) -> Result<Json<SolutionPageResponse>, ApiError> {
    let _ = (course_id, lesson_id, task_id); // the solution's own course drives the access check
    let st = state.clone();
    Ok(Json(
        blocking(move || solution_page_data(&st, solution_id, &identity)).await?,
    ))
}

pub async fn waiting_solutions(
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
    identity: Identity,
) -> Result<Json<WaitingSolutionsResponse>, ApiError> {
    let st = state.clone();
    Ok(Json(
        blocking(move || waiting_solutions_data(&st, course_id, &identity)).await?,
    ))
}

// -- Domain flows --

/// Create-or-replace submission. The first submission creates the row in
/// waiting; a resubmission lands on the same row, replacing content,
/// extension, and timestamp. Whether it also resets the status is the
/// configured resubmission policy.
pub fn create_or_update_solution(
    state: &AppStateInner,
    task_id: Uuid,
    req: SubmitSolutionRequest,
    identity: &Identity,
) -> Result<(), ApiError> {
    let student = require_acting_student(identity)?;
    let task = get_task(&state.db, task_id)?;

    let content = req.content.trim();
    state.db.upsert_solution(
        &Uuid::new_v4().to_string(),
        &task.id,
        &student.id.to_string(),
        content,
        &req.extension,
        state.reset_status_on_resubmit,
    )?;

    Ok(())
}

/// Grading: only the teacher of the course that transitively owns the
/// solution's task may mark it, and marking never locks — a solution can be
/// re-marked.
pub fn mark_solution_record(
    state: &AppStateInner,
    req: MarkSolutionRequest,
    identity: &Identity,
) -> Result<(), ApiError> {
    let solution = state
        .db
        .get_solution(&req.solution_id.to_string())?
        .ok_or(ApiError::SolutionDoesNotExist)?;
    let course = state
        .db
        .solution_course(&solution.id)?
        .ok_or(ApiError::SolutionDoesNotExist)?;
    ensure_course_teacher(&course, identity)?;

    let status = SolutionStatus::from_is_correct(req.is_correct);
    state.db.set_solution_status(&solution.id, status.code())?;

    Ok(())
}

pub fn solution_page_data(
    state: &AppStateInner,
    solution_id: Uuid,
    identity: &Identity,
) -> Result<SolutionPageResponse, ApiError> {
    let course = state
        .db
        .solution_course(&solution_id.to_string())?
        .ok_or(ApiError::SolutionDoesNotExist)?;
    ensure_course_teacher(&course, identity)?;

    let row = state
        .db
        .solution_page(&solution_id.to_string())?
        .ok_or(ApiError::SolutionDoesNotExist)?;

    let status = SolutionStatus::from_code(row.status).ok_or_else(|| {
        ApiError::Internal(anyhow::anyhow!(
            "invalid solution.status {} from database",
            row.status
        ))
    })?;

    Ok(SolutionPageResponse {
        solution_id: parse_db_id(&row.solution_id)?,
        task_title: row.task_title,
        task_condition: row.task_condition,
        student_username: row.student_username,
        content: row.content,
        extension: row.extension,
        status,
    })
}

/// The teacher's review queue, oldest submission first.
pub fn waiting_solutions_data(
    state: &AppStateInner,
    course_id: Uuid,
    identity: &Identity,
) -> Result<WaitingSolutionsResponse, ApiError> {
    let course = get_course(&state.db, course_id)?;
    ensure_course_teacher(&course, identity)?;

    let solutions = state
        .db
        .waiting_solutions_for_course(&course.id)?
        .into_iter()
        .map(|row| {
            Ok(WaitingSolution {
                solution_id: parse_db_id(&row.solution_id)?,
                course_id: parse_db_id(&row.course_id)?,
                lesson_id: parse_db_id(&row.lesson_id)?,
                task_id: parse_db_id(&row.task_id)?,
                task_title: row.task_title,
                student_username: row.student_username,
                timestamp: parse_db_timestamp(&row.submitted_at, &row.solution_id),
                content: row.content,
            })
        })
        .collect::<Result<Vec<_>, ApiError>>()?;

    Ok(WaitingSolutionsResponse { solutions })
}

fn parse_db_timestamp(raw: &str, solution_id: &str) -> chrono::DateTime<chrono::Utc> {
    raw.parse::<chrono::DateTime<chrono::Utc>>()
        .or_else(|_| {
            // SQLite stores timestamps as "YYYY-MM-DD HH:MM:SS" without
            // timezone. Parse as naive UTC and convert.
            chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            warn!("Corrupt submitted_at '{}' on solution '{}': {}", raw, solution_id, e);
            chrono::DateTime::default()
        })
}
