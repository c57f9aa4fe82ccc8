mod common;

use common::{classroom, register, user_id};

use tasker_api::error::ApiError;
use tasker_api::identity::Identity;
use tasker_api::solutions::{
    create_or_update_solution, mark_solution_record, solution_page_data, waiting_solutions_data,
};
use tasker_types::api::{MarkSolutionRequest, SubmitSolutionRequest};
use tasker_types::models::{SolutionStatus, UserRole};
use uuid::Uuid;

fn submission(content: &str) -> SubmitSolutionRequest {
    SubmitSolutionRequest {
        content: content.into(),
        extension: "rs".into(),
    }
}

#[test]
fn student_submission_lands_in_waiting() {
    let c = classroom(false);

    create_or_update_solution(&c.state, c.task_id, submission("  fn main() {}  "), &c.student)
        .unwrap();

    let row = c
        .state
        .db
        .get_solution_for(&c.task_id.to_string(), &user_id(&c.student).to_string())
        .unwrap()
        .expect("stored solution");
    assert_eq!(row.status, SolutionStatus::Waiting.code());
    // Submitted content is trimmed.
    assert_eq!(row.content, "fn main() {}");
}

#[test]
fn teachers_and_anonymous_cannot_submit() {
    let c = classroom(false);

    let err =
        create_or_update_solution(&c.state, c.task_id, submission("x"), &c.teacher).unwrap_err();
    assert!(matches!(err, ApiError::NotEnoughAccessRights));

    let err = create_or_update_solution(&c.state, c.task_id, submission("x"), &Identity::Anonymous)
        .unwrap_err();
    assert!(matches!(err, ApiError::NotEnoughAccessRights));
}

#[test]
fn submitting_to_a_missing_task_fails() {
    let c = classroom(false);
    let err = create_or_update_solution(&c.state, Uuid::new_v4(), submission("x"), &c.student)
        .unwrap_err();
    assert!(matches!(err, ApiError::TaskDoesNotExist));
}

#[test]
fn resubmission_keeps_one_row_and_resets_grading() {
    let c = classroom(false);
    let student_id = user_id(&c.student).to_string();

    create_or_update_solution(&c.state, c.task_id, submission("v1"), &c.student).unwrap();
    let first = c
        .state
        .db
        .get_solution_for(&c.task_id.to_string(), &student_id)
        .unwrap()
        .unwrap();

    mark_solution_record(
        &c.state,
        MarkSolutionRequest {
            solution_id: first.id.parse().unwrap(),
            is_correct: true,
        },
        &c.teacher,
    )
    .unwrap();

    create_or_update_solution(&c.state, c.task_id, submission("v2"), &c.student).unwrap();

    let row = c
        .state
        .db
        .get_solution_for(&c.task_id.to_string(), &student_id)
        .unwrap()
        .unwrap();
    assert_eq!(row.id, first.id, "resubmission replaces, never duplicates");
    assert_eq!(row.content, "v2");
    assert_eq!(row.status, SolutionStatus::Waiting.code());
}

#[test]
fn grading_sets_status_and_can_be_repeated() {
    let c = classroom(false);
    create_or_update_solution(&c.state, c.task_id, submission("v1"), &c.student).unwrap();
    let solution_id: Uuid = c
        .state
        .db
        .get_solution_for(&c.task_id.to_string(), &user_id(&c.student).to_string())
        .unwrap()
        .unwrap()
        .id
        .parse()
        .unwrap();

    mark_solution_record(
        &c.state,
        MarkSolutionRequest {
            solution_id,
            is_correct: false,
        },
        &c.teacher,
    )
    .unwrap();
    let page = solution_page_data(&c.state, solution_id, &c.teacher).unwrap();
    assert_eq!(page.status, SolutionStatus::Incorrect);

    // No lock after grading: marking again overwrites.
    mark_solution_record(
        &c.state,
        MarkSolutionRequest {
            solution_id,
            is_correct: true,
        },
        &c.teacher,
    )
    .unwrap();
    let page = solution_page_data(&c.state, solution_id, &c.teacher).unwrap();
    assert_eq!(page.status, SolutionStatus::Correct);
}

#[test]
fn non_owning_teacher_cannot_grade_and_status_is_unchanged() {
    let c = classroom(false);
    create_or_update_solution(&c.state, c.task_id, submission("v1"), &c.student).unwrap();
    let solution_id: Uuid = c
        .state
        .db
        .get_solution_for(&c.task_id.to_string(), &user_id(&c.student).to_string())
        .unwrap()
        .unwrap()
        .id
        .parse()
        .unwrap();

    let other_teacher = register(&c.state, "other@mail.com", UserRole::Teacher);
    let err = mark_solution_record(
        &c.state,
        MarkSolutionRequest {
            solution_id,
            is_correct: true,
        },
        &other_teacher,
    )
    .unwrap_err();
    assert!(matches!(err, ApiError::NotEnoughAccessRights));

    let row = c.state.db.get_solution(&solution_id.to_string()).unwrap().unwrap();
    assert_eq!(row.status, SolutionStatus::Waiting.code());
}

#[test]
fn marking_a_missing_solution_fails() {
    let c = classroom(false);
    let err = mark_solution_record(
        &c.state,
        MarkSolutionRequest {
            solution_id: Uuid::new_v4(),
            is_correct: true,
        },
        &c.teacher,
    )
    .unwrap_err();
    assert!(matches!(err, ApiError::SolutionDoesNotExist));
}

#[test]
fn waiting_queue_is_teacher_only_and_tracks_grading() {
    let c = classroom(false);
    create_or_update_solution(&c.state, c.task_id, submission("v1"), &c.student).unwrap();

    let err = waiting_solutions_data(&c.state, c.course_id, &c.student).unwrap_err();
    assert!(matches!(err, ApiError::NotEnoughAccessRights));

    let queue = waiting_solutions_data(&c.state, c.course_id, &c.teacher).unwrap();
    assert_eq!(queue.solutions.len(), 1);
    let entry = &queue.solutions[0];
    assert_eq!(entry.course_id, c.course_id);
    assert_eq!(entry.lesson_id, c.lesson_id);
    assert_eq!(entry.task_id, c.task_id);
    assert_eq!(entry.student_username, "student");

    mark_solution_record(
        &c.state,
        MarkSolutionRequest {
            solution_id: entry.solution_id,
            is_correct: true,
        },
        &c.teacher,
    )
    .unwrap();
    let queue = waiting_solutions_data(&c.state, c.course_id, &c.teacher).unwrap();
    assert!(queue.solutions.is_empty());
}

#[test]
fn solution_page_is_owning_teacher_only() {
    let c = classroom(false);
    create_or_update_solution(&c.state, c.task_id, submission("v1"), &c.student).unwrap();
    let solution_id: Uuid = c
        .state
        .db
        .get_solution_for(&c.task_id.to_string(), &user_id(&c.student).to_string())
        .unwrap()
        .unwrap()
        .id
        .parse()
        .unwrap();

    let page = solution_page_data(&c.state, solution_id, &c.teacher).unwrap();
    assert_eq!(page.task_title, "task");
    assert_eq!(page.student_username, "student");
    assert_eq!(page.content, "v1");

    // The author cannot open the grading view, nor can another teacher.
    assert!(matches!(
        solution_page_data(&c.state, solution_id, &c.student),
        Err(ApiError::NotEnoughAccessRights)
    ));
    let other_teacher = register(&c.state, "other@mail.com", UserRole::Teacher);
    assert!(matches!(
        solution_page_data(&c.state, solution_id, &other_teacher),
        Err(ApiError::NotEnoughAccessRights)
    ));
}
