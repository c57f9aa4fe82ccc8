use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{SolutionStatus, UserRole};

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Returned by login and by confirmation-token redemption.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user_id: Uuid,
    pub username: String,
    pub role: UserRole,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user_id: Uuid,
    pub email: String,
    pub username: String,
    pub role: UserRole,
}

// -- Registration --

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegistrationRequest {
    pub email: String,
    pub username: String,
    pub password: String,
    pub role: UserRole,
}

/// Acknowledges that a confirmation email is on its way.
#[derive(Debug, Serialize, Deserialize)]
pub struct RegistrationStartedResponse {
    pub email: String,
}

// -- Courses --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateCourseRequest {
    pub title: String,
    pub description: String,
    #[serde(default, rename = "isPrivate")]
    pub is_private: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseSummary {
    pub id: Uuid,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseDetail {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub is_private: bool,
    pub teacher_id: Uuid,
}

/// One lesson line on the course page, annotated with the viewer's progress.
#[derive(Debug, Serialize, Deserialize)]
pub struct LessonOverview {
    pub id: Uuid,
    pub title: String,
    pub order_index: i64,
    pub tasks_count: i64,
    pub correct_solutions_count: i64,
    pub waiting_solutions_count: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CoursePageResponse {
    pub course: CourseDetail,
    pub lessons: Vec<LessonOverview>,
    pub invite_token: String,
    #[serde(rename = "isSubscribed")]
    pub is_subscribed: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DashboardResponse {
    pub courses: Vec<CourseSummary>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchCoursesResponse {
    pub courses: Vec<CourseSummary>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubscribeResponse {
    #[serde(rename = "isSubscribed")]
    pub is_subscribed: bool,
}

// -- Lessons --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateLessonRequest {
    pub title: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LessonDetail {
    pub id: Uuid,
    pub course_id: Uuid,
    pub title: String,
    pub order_index: i64,
}

/// One task line on the lesson page; `solution_status` is present when the
/// viewer has submitted a solution for the task.
#[derive(Debug, Serialize, Deserialize)]
pub struct TaskOverview {
    pub task_id: Uuid,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solution_status: Option<SolutionStatus>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LessonPageResponse {
    pub lesson_id: Uuid,
    pub lesson_title: String,
    pub tasks: Vec<TaskOverview>,
}

// -- Tasks --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateTaskRequest {
    pub title: String,
    pub condition: String,
    pub example: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TaskDetail {
    pub id: Uuid,
    pub lesson_id: Uuid,
    pub title: String,
    pub condition: String,
    pub example: String,
    pub order_index: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SolutionView {
    pub content: String,
    pub extension: String,
    pub status: SolutionStatus,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TaskPageResponse {
    pub task: TaskDetail,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solution: Option<SolutionView>,
}

// -- Solutions --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SubmitSolutionRequest {
    pub content: String,
    pub extension: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MarkSolutionRequest {
    #[serde(rename = "solutionId")]
    pub solution_id: Uuid,
    #[serde(rename = "isCorrect")]
    pub is_correct: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SolutionPageResponse {
    pub solution_id: Uuid,
    pub task_title: String,
    pub task_condition: String,
    pub student_username: String,
    pub content: String,
    pub extension: String,
    pub status: SolutionStatus,
}

/// One row in the teacher's review queue.
#[derive(Debug, Serialize, Deserialize)]
pub struct WaitingSolution {
    pub solution_id: Uuid,
    pub course_id: Uuid,
    pub lesson_id: Uuid,
    pub task_id: Uuid,
    pub task_title: String,
    pub student_username: String,
    pub timestamp: DateTime<Utc>,
    pub content: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WaitingSolutionsResponse {
    pub solutions: Vec<WaitingSolution>,
}

// -- Invites --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfirmInviteRequest {
    pub invite: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConfirmInviteResponse {
    #[serde(rename = "courseId")]
    pub course_id: Uuid,
}
