use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Json, response::IntoResponse};
use serde::Deserialize;
use uuid::Uuid;

use tasker_db::Database;
use tasker_db::models::{CourseRow, CourseSummaryRow, LessonOverviewRow};
use tasker_types::api::{
    CourseDetail, CoursePageResponse, CourseSummary, CreateCourseRequest, DashboardResponse,
    LessonOverview, SearchCoursesResponse, SubscribeResponse,
};

use crate::access::{
    ensure_course_access, ensure_course_teacher, require_acting_student, require_acting_teacher,
};
use crate::error::{ApiError, parse_db_id};
use crate::identity::Identity;
use crate::state::{AppState, AppStateInner, blocking};

// -- Handlers --

pub async fn dashboard(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<Json<DashboardResponse>, ApiError> {
    let st = state.clone();
    Ok(Json(blocking(move || dashboard_data(&st, &identity)).await?))
}

pub async fn course_page(
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
    identity: Identity,
) -> Result<Json<CoursePageResponse>, ApiError> {
    let st = state.clone();
    Ok(Json(
        blocking(move || course_page_data(&st, course_id, &identity)).await?,
    ))
}

pub async fn create_course(
    State(state): State<AppState>,
    identity: Identity,
    Json(req): Json<CreateCourseRequest>,
) -> Result<Json<CourseDetail>, ApiError> {
    let st = state.clone();
    Ok(Json(
        blocking(move || create_course_record(&st, req, &identity)).await?,
    ))
}

pub async fn delete_course(
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
    identity: Identity,
) -> Result<impl IntoResponse, ApiError> {
    let st = state.clone();
    blocking(move || delete_course_record(&st, course_id, &identity)).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn subscribe(
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
    identity: Identity,
) -> Result<Json<SubscribeResponse>, ApiError> {
    let st = state.clone();
    Ok(Json(
        blocking(move || toggle_subscription(&st, course_id, &identity)).await?,
    ))
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: String,
}

pub async fn search_courses(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchCoursesResponse>, ApiError> {
    let st = state.clone();
    let courses = blocking(move || {
        let rows = st.db.search_public_courses(&params.q)?;
        rows.into_iter().map(to_summary).collect::<Result<Vec<_>, _>>()
    })
    .await?;
    Ok(Json(SearchCoursesResponse { courses }))
}

// -- Domain flows (synchronous, run via `blocking`) --

/// Students see the courses they study, teachers the courses they teach,
/// anonymous requesters an empty list.
pub fn dashboard_data(
    state: &AppStateInner,
    identity: &Identity,
) -> Result<DashboardResponse, ApiError> {
    let rows = match identity {
        Identity::Anonymous => Vec::new(),
        Identity::Authenticated(user) => {
            let id = user.id.to_string();
            if user.role.is_teacher() {
                state.db.courses_taught_by(&id)?
            } else {
                state.db.courses_studied_by(&id)?
            }
        }
    };

    Ok(DashboardResponse {
        courses: rows.into_iter().map(to_summary).collect::<Result<_, _>>()?,
    })
}

pub fn course_page_data(
    state: &AppStateInner,
    course_id: Uuid,
    identity: &Identity,
) -> Result<CoursePageResponse, ApiError> {
    let course = get_course(&state.db, course_id)?;
    ensure_course_access(&state.db, &course, identity)?;

    let invite_token = state.tokens.create_course_invite(course_id)?;
    let viewer_id = identity.user().map(|u| u.id.to_string());
    let lessons = state
        .db
        .lessons_with_progress(&course.id, viewer_id.as_deref())?;
    let is_subscribed = match &viewer_id {
        Some(id) => state.db.is_subscribed(&course.id, id)?,
        None => false,
    };

    Ok(CoursePageResponse {
        course: to_detail(&course)?,
        lessons: lessons
            .into_iter()
            .map(to_lesson_overview)
            .collect::<Result<_, _>>()?,
        invite_token,
        is_subscribed,
    })
}

pub fn create_course_record(
    state: &AppStateInner,
    req: CreateCourseRequest,
    identity: &Identity,
) -> Result<CourseDetail, ApiError> {
    let teacher = require_acting_teacher(identity)?;

    let id = Uuid::new_v4();
    state.db.create_course(
        &id.to_string(),
        &req.title,
        &req.description,
        req.is_private,
        &teacher.id.to_string(),
    )?;

    Ok(CourseDetail {
        id,
        title: req.title,
        description: req.description,
        is_private: req.is_private,
        teacher_id: teacher.id,
    })
}

pub fn delete_course_record(
    state: &AppStateInner,
    course_id: Uuid,
    identity: &Identity,
) -> Result<(), ApiError> {
    let course = get_course(&state.db, course_id)?;
    ensure_course_teacher(&course, identity)?;
    state.db.delete_course(&course.id)?;
    Ok(())
}

/// Subscribe-button semantics: flips membership and reports the state after
/// the flip.
pub fn toggle_subscription(
    state: &AppStateInner,
    course_id: Uuid,
    identity: &Identity,
) -> Result<SubscribeResponse, ApiError> {
    let student = require_acting_student(identity)?;
    let course = get_course(&state.db, course_id)?;

    let is_subscribed = state
        .db
        .toggle_subscription(&course.id, &student.id.to_string())?;

    Ok(SubscribeResponse { is_subscribed })
}

pub(crate) fn get_course(db: &Database, id: Uuid) -> Result<CourseRow, ApiError> {
    db.get_course(&id.to_string())?
        .ok_or(ApiError::CourseDoesNotExist)
}

pub(crate) fn to_detail(row: &CourseRow) -> Result<CourseDetail, ApiError> {
    Ok(CourseDetail {
        id: parse_db_id(&row.id)?,
        title: row.title.clone(),
        description: row.description.clone(),
        is_private: row.is_private,
        teacher_id: parse_db_id(&row.teacher_id)?,
    })
}

fn to_summary(row: CourseSummaryRow) -> Result<CourseSummary, ApiError> {
    Ok(CourseSummary {
        id: parse_db_id(&row.id)?,
        title: row.title,
        description: row.description,
    })
}

fn to_lesson_overview(row: LessonOverviewRow) -> Result<LessonOverview, ApiError> {
    Ok(LessonOverview {
        id: parse_db_id(&row.id)?,
        title: row.title,
        order_index: row.order_index,
        tasks_count: row.tasks_count,
        correct_solutions_count: row.correct_solutions_count,
        waiting_solutions_count: row.waiting_solutions_count,
    })
}
