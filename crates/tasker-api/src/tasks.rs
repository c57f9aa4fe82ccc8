use axum::Json;
use axum::extract::{Path, State};
use uuid::Uuid;

use tasker_db::Database;
use tasker_db::models::TaskRow;
use tasker_types::api::{CreateTaskRequest, SolutionView, TaskDetail, TaskPageResponse};
use tasker_types::models::SolutionStatus;

use crate::access::{ensure_course_access, ensure_course_teacher};
use crate::error::{ApiError, parse_db_id};
use crate::identity::Identity;
use crate::lessons::get_lesson;
use crate::state::{AppState, AppStateInner, blocking};

// -- Handlers --

pub async fn task_page(
    State(state): State<AppState>,
    Path((course_id, lesson_id, task_id)): Path<(Uuid, Uuid, Uuid)>,
    identity: Identity,
) -> Result<Json<TaskPageResponse>, ApiError> {
    let _ = (course_id, lesson_id); // the task's own course drives the access check
    let st = state.clone();
    Ok(Json(
        blocking(move || task_page_data(&st, task_id, &identity)).await?,
    ))
}

pub async fn create_task(
    State(state): State<AppState>,
    Path((course_id, lesson_id)): Path<(Uuid, Uuid)>,
    identity: Identity,
    Json(req): Json<CreateTaskRequest>,
) -> Result<Json<TaskDetail>, ApiError> {
    let _ = course_id;
    let st = state.clone();
    Ok(Json(
        blocking(move || create_task_record(&st, lesson_id, req, &identity)).await?,
    ))
}

// -- Domain flows --

pub fn task_page_data(
    state: &AppStateInner,
    task_id: Uuid,
    identity: &Identity,
) -> Result<TaskPageResponse, ApiError> {
    let task = get_task(&state.db, task_id)?;
    let course = state
        .db
        .task_course(&task.id)?
        .ok_or(ApiError::TaskDoesNotExist)?;
    ensure_course_access(&state.db, &course, identity)?;

    let solution = match identity.user() {
        Some(user) => state
            .db
            .get_solution_for(&task.id, &user.id.to_string())?
            .map(|row| {
                let status = SolutionStatus::from_code(row.status).ok_or_else(|| {
                    ApiError::Internal(anyhow::anyhow!(
                        "invalid solution.status {} from database",
                        row.status
                    ))
                })?;
                Ok::<_, ApiError>(SolutionView {
                    content: row.content,
                    extension: row.extension,
                    status,
                })
            })
            .transpose()?,
        None => None,
    };

    Ok(TaskPageResponse {
        task: to_detail(task)?,
        solution,
    })
}

/// The lesson's own course gates creation, so a mismatched course id in the
/// URL cannot widen access.
pub fn create_task_record(
    state: &AppStateInner,
    lesson_id: Uuid,
    req: CreateTaskRequest,
    identity: &Identity,
) -> Result<TaskDetail, ApiError> {
    let lesson = get_lesson(&state.db, lesson_id)?;
    let course = state
        .db
        .lesson_course(&lesson.id)?
        .ok_or(ApiError::LessonDoesNotExist)?;
    ensure_course_teacher(&course, identity)?;

    let id = Uuid::new_v4();
    let order_index = state.db.create_task(
        &id.to_string(),
        &lesson.id,
        &req.title,
        &req.condition,
        &req.example,
    )?;

    Ok(TaskDetail {
        id,
        lesson_id,
        title: req.title,
        condition: req.condition,
        example: req.example,
        order_index,
    })
}

pub(crate) fn get_task(db: &Database, id: Uuid) -> Result<TaskRow, ApiError> {
    db.get_task(&id.to_string())?.ok_or(ApiError::TaskDoesNotExist)
}

fn to_detail(row: TaskRow) -> Result<TaskDetail, ApiError> {
    Ok(TaskDetail {
        id: parse_db_id(&row.id)?,
        lesson_id: parse_db_id(&row.lesson_id)?,
        title: row.title,
        condition: row.condition,
        example: row.example,
        order_index: row.order_index,
    })
}
