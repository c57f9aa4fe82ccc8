mod common;

use common::{classroom, register, test_state, test_state_with, user_id};

use tasker_api::courses::{course_page_data, delete_course_record};
use tasker_api::error::ApiError;
use tasker_api::identity::Identity;
use tasker_api::registration::{activate_course_invite, register_user};
use tasker_api::solutions::create_or_update_solution;
use tasker_api::tokens::PendingRegistration;
use tasker_types::models::{SolutionStatus, UserRole};

#[test]
fn invite_token_from_the_course_page_subscribes_a_student() {
    let c = classroom(true);

    // The teacher reads the invite token off their course page.
    let page = course_page_data(&c.state, c.course_id, &c.teacher).unwrap();
    let course_id = c.state.tokens.resolve_course_invite(&page.invite_token).unwrap();
    assert_eq!(course_id, c.course_id);

    activate_course_invite(&c.state, course_id, &c.student).unwrap();
    assert!(
        c.state
            .db
            .is_subscribed(&c.course_id.to_string(), &user_id(&c.student).to_string())
            .unwrap()
    );

    // Redeeming the same invite again is a no-op.
    activate_course_invite(&c.state, course_id, &c.student).unwrap();
    assert!(
        c.state
            .db
            .is_subscribed(&c.course_id.to_string(), &user_id(&c.student).to_string())
            .unwrap()
    );

    // And the private course is now visible.
    course_page_data(&c.state, c.course_id, &c.student).unwrap();
}

#[test]
fn tampered_invites_never_resolve() {
    let c = classroom(true);
    let page = course_page_data(&c.state, c.course_id, &c.teacher).unwrap();
    let tampered = format!("{}x", page.invite_token);

    assert!(matches!(
        c.state.tokens.resolve_course_invite(&tampered),
        Err(ApiError::InvalidCourseInvite)
    ));
}

#[test]
fn invites_to_a_deleted_course_fail_cleanly() {
    let c = classroom(true);
    let page = course_page_data(&c.state, c.course_id, &c.teacher).unwrap();
    let course_id = c.state.tokens.resolve_course_invite(&page.invite_token).unwrap();

    delete_course_record(&c.state, c.course_id, &c.teacher).unwrap();

    assert!(matches!(
        activate_course_invite(&c.state, course_id, &c.student),
        Err(ApiError::CourseDoesNotExist)
    ));
}

#[test]
fn teachers_and_anonymous_cannot_activate_invites() {
    let c = classroom(true);

    assert!(matches!(
        activate_course_invite(&c.state, c.course_id, &c.teacher),
        Err(ApiError::NotEnoughAccessRights)
    ));
    assert!(matches!(
        activate_course_invite(&c.state, c.course_id, &Identity::Anonymous),
        Err(ApiError::NotEnoughAccessRights)
    ));
}

#[test]
fn confirmation_token_roundtrip_registers_once() {
    let state = test_state();

    let pending = PendingRegistration {
        email: "new@mail.com".into(),
        username: "newcomer".into(),
        password: "12345678".into(),
        role: UserRole::Student,
    };

    let token = state.tokens.create_confirmation_token(pending.clone()).unwrap();
    let resolved = state.tokens.resolve_confirmation_token(&token).unwrap();
    assert_eq!(resolved, pending);

    let (_, username, role) = register_user(&state, resolved).unwrap();
    assert_eq!(username, "newcomer");
    assert_eq!(role, UserRole::Student);

    // The email was taken between issue and redemption: second redemption
    // of an equivalent token must fail.
    let resolved = state.tokens.resolve_confirmation_token(&token).unwrap();
    assert!(matches!(
        register_user(&state, resolved),
        Err(ApiError::NotUniqueEmail)
    ));
}

#[test]
fn registered_credentials_allow_password_verification() {
    let state = test_state();
    register(&state, "login@mail.com", UserRole::Student);

    let user = state.db.get_user_by_email("login@mail.com").unwrap().unwrap();
    assert_ne!(user.password, "12345678", "passwords are stored hashed");
}

#[test]
fn preserve_grade_policy_survives_resubmission() {
    let state = test_state_with(false);
    let teacher = register(&state, "teacher@mail.com", UserRole::Teacher);
    let student = register(&state, "student@mail.com", UserRole::Student);
    let course_id = common::create_course(&state, &teacher, "Rust 101", false);
    let lesson_id = common::create_lesson(&state, &teacher, course_id);
    let task_id = common::create_task(&state, &teacher, lesson_id);

    create_or_update_solution(
        &state,
        task_id,
        tasker_types::api::SubmitSolutionRequest {
            content: "v1".into(),
            extension: "rs".into(),
        },
        &student,
    )
    .unwrap();

    let row = state
        .db
        .get_solution_for(&task_id.to_string(), &user_id(&student).to_string())
        .unwrap()
        .unwrap();
    state
        .db
        .set_solution_status(&row.id, SolutionStatus::Correct.code())
        .unwrap();

    create_or_update_solution(
        &state,
        task_id,
        tasker_types::api::SubmitSolutionRequest {
            content: "v2".into(),
            extension: "rs".into(),
        },
        &student,
    )
    .unwrap();

    let row = state
        .db
        .get_solution_for(&task_id.to_string(), &user_id(&student).to_string())
        .unwrap()
        .unwrap();
    assert_eq!(row.content, "v2");
    assert_eq!(row.status, SolutionStatus::Correct.code());
}
