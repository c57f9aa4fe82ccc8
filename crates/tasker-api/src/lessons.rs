use axum::Json;
use axum::extract::{Path, State};
use uuid::Uuid;

use tasker_db::Database;
use tasker_db::models::LessonRow;
use tasker_types::api::{CreateLessonRequest, LessonDetail, LessonPageResponse, TaskOverview};
use tasker_types::models::SolutionStatus;

use crate::access::{ensure_course_access, ensure_course_teacher};
use crate::courses::get_course;
use crate::error::{ApiError, parse_db_id};
use crate::identity::Identity;
use crate::state::{AppState, AppStateInner, blocking};

// -- Handlers --

pub async fn lesson_page(
    State(state): State<AppState>,
    Path((course_id, lesson_id)): Path<(Uuid, Uuid)>,
    identity: Identity,
) -> Result<Json<LessonPageResponse>, ApiError> {
    let _ = course_id; // the lesson's own course drives the access check
    let st = state.clone();
    Ok(Json(
        blocking(move || lesson_page_data(&st, lesson_id, &identity)).await?,
    ))
}

pub async fn create_lesson(
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
    identity: Identity,
    Json(req): Json<CreateLessonRequest>,
) -> Result<Json<LessonDetail>, ApiError> {
    let st = state.clone();
    Ok(Json(
        blocking(move || create_lesson_record(&st, course_id, req, &identity)).await?,
    ))
}

// -- Domain flows --

pub fn lesson_page_data(
    state: &AppStateInner,
    lesson_id: Uuid,
    identity: &Identity,
) -> Result<LessonPageResponse, ApiError> {
    let lesson = get_lesson(&state.db, lesson_id)?;
    let course = state
        .db
        .lesson_course(&lesson.id)?
        .ok_or(ApiError::LessonDoesNotExist)?;
    ensure_course_access(&state.db, &course, identity)?;

    let viewer_id = identity.user().map(|u| u.id.to_string());
    let tasks = state
        .db
        .tasks_with_solution_status(&lesson.id, viewer_id.as_deref())?;

    let tasks = tasks
        .into_iter()
        .map(|row| {
            let solution_status = row
                .solution_status
                .map(|code| {
                    SolutionStatus::from_code(code).ok_or_else(|| {
                        ApiError::Internal(anyhow::anyhow!(
                            "invalid solution.status {code} from database"
                        ))
                    })
                })
                .transpose()?;
            Ok(TaskOverview {
                task_id: parse_db_id(&row.id)?,
                title: row.title,
                solution_status,
            })
        })
        .collect::<Result<Vec<_>, ApiError>>()?;

    Ok(LessonPageResponse {
        lesson_id,
        lesson_title: lesson.title,
        tasks,
    })
}

pub fn create_lesson_record(
    state: &AppStateInner,
    course_id: Uuid,
    req: CreateLessonRequest,
    identity: &Identity,
) -> Result<LessonDetail, ApiError> {
    let course = get_course(&state.db, course_id)?;
    ensure_course_teacher(&course, identity)?;

    let id = Uuid::new_v4();
    let order_index = state
        .db
        .create_lesson(&id.to_string(), &course.id, &req.title)?;

    Ok(LessonDetail {
        id,
        course_id,
        title: req.title,
        order_index,
    })
}

pub(crate) fn get_lesson(db: &Database, id: Uuid) -> Result<LessonRow, ApiError> {
    db.get_lesson(&id.to_string())?
        .ok_or(ApiError::LessonDoesNotExist)
}
