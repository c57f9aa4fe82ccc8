#![allow(dead_code)]

use std::sync::Arc;

use chrono::Duration;
use uuid::Uuid;

use tasker_api::courses::create_course_record;
use tasker_api::identity::{CurrentUser, Identity};
use tasker_api::lessons::create_lesson_record;
use tasker_api::registration::register_user;
use tasker_api::state::{AppState, AppStateInner};
use tasker_api::tasks::create_task_record;
use tasker_api::tokens::{PendingRegistration, TokenConfig, TokenService};
use tasker_db::Database;
use tasker_types::api::{CreateCourseRequest, CreateLessonRequest, CreateTaskRequest};
use tasker_types::models::UserRole;

pub fn test_state() -> AppState {
    test_state_with(true)
}

pub fn test_state_with(reset_status_on_resubmit: bool) -> AppState {
    Arc::new(AppStateInner {
        db: Database::open_in_memory().expect("in-memory database"),
        tokens: TokenService::new(&TokenConfig {
            secret: "test-secret".into(),
            invite_ttl: Duration::days(7),
            confirm_ttl: Duration::hours(1),
        }),
        mailer: None,
        auth_secret: "test-secret".into(),
        public_base_url: "http://localhost:3000".into(),
        reset_status_on_resubmit,
    })
}

/// Registers an account through the real registration flow and returns its
/// identity.
pub fn register(state: &AppStateInner, email: &str, role: UserRole) -> Identity {
    let (id, username, role) = register_user(
        state,
        PendingRegistration {
            email: email.into(),
            username: email.split('@').next().unwrap_or("user").into(),
            password: "12345678".into(),
            role,
        },
    )
    .expect("registration");

    Identity::Authenticated(CurrentUser { id, username, role })
}

pub fn create_course(
    state: &AppStateInner,
    teacher: &Identity,
    title: &str,
    is_private: bool,
) -> Uuid {
    create_course_record(
        state,
        CreateCourseRequest {
            title: title.into(),
            description: "description".into(),
            is_private,
        },
        teacher,
    )
    .expect("course creation")
    .id
}

pub fn create_lesson(state: &AppStateInner, teacher: &Identity, course_id: Uuid) -> Uuid {
    create_lesson_record(
        state,
        course_id,
        CreateLessonRequest {
            title: "lesson".into(),
        },
        teacher,
    )
    .expect("lesson creation")
    .id
}

pub fn create_task(state: &AppStateInner, teacher: &Identity, lesson_id: Uuid) -> Uuid {
    create_task_record(
        state,
        lesson_id,
        CreateTaskRequest {
            title: "task".into(),
            condition: "condition".into(),
            example: "example".into(),
        },
        teacher,
    )
    .expect("task creation")
    .id
}

/// A full teacher/course/lesson/task setup used by the lifecycle tests.
pub struct Classroom {
    pub state: AppState,
    pub teacher: Identity,
    pub student: Identity,
    pub course_id: Uuid,
    pub lesson_id: Uuid,
    pub task_id: Uuid,
}

pub fn classroom(is_private: bool) -> Classroom {
    let state = test_state();
    let teacher = register(&state, "teacher@mail.com", UserRole::Teacher);
    let student = register(&state, "student@mail.com", UserRole::Student);
    let course_id = create_course(&state, &teacher, "Rust 101", is_private);
    let lesson_id = create_lesson(&state, &teacher, course_id);
    let task_id = create_task(&state, &teacher, lesson_id);

    Classroom {
        state,
        teacher,
        student,
        course_id,
        lesson_id,
        task_id,
    }
}

pub fn user_id(identity: &Identity) -> Uuid {
    identity.user().expect("authenticated identity").id
}
