/// Database row types — these map directly to SQLite rows.
/// Distinct from tasker-types API models to keep the DB layer independent.

pub struct UserRow {
    pub id: String,
    pub email: String,
    pub username: String,
    pub password: String,
    pub role: i64,
    pub created_at: String,
}

pub struct CourseRow {
    pub id: String,
    pub title: String,
    pub description: String,
    pub is_private: bool,
    pub teacher_id: String,
    pub created_at: String,
}

pub struct CourseSummaryRow {
    pub id: String,
    pub title: String,
    pub description: String,
}

pub struct LessonRow {
    pub id: String,
    pub course_id: String,
    pub title: String,
    pub order_index: i64,
}

/// Course-page listing row: a lesson plus task count and the viewer's
/// graded/waiting solution counts.
pub struct LessonOverviewRow {
    pub id: String,
    pub title: String,
    pub order_index: i64,
    pub tasks_count: i64,
    pub correct_solutions_count: i64,
    pub waiting_solutions_count: i64,
}

pub struct TaskRow {
    pub id: String,
    pub lesson_id: String,
    pub title: String,
    pub condition: String,
    pub example: String,
    pub order_index: i64,
}

/// Lesson-page listing row; `solution_status` is the viewer's, if any.
pub struct TaskOverviewRow {
    pub id: String,
    pub title: String,
    pub solution_status: Option<i64>,
}

pub struct SolutionRow {
    pub id: String,
    pub task_id: String,
    pub student_id: String,
    pub content: String,
    pub extension: String,
    pub status: i64,
    pub submitted_at: String,
}

/// Solution page context: the row joined with its task and author.
pub struct SolutionPageRow {
    pub solution_id: String,
    pub task_title: String,
    pub task_condition: String,
    pub student_username: String,
    pub content: String,
    pub extension: String,
    pub status: i64,
}

/// Review-queue row: a waiting solution located within its course.
pub struct WaitingSolutionRow {
    pub solution_id: String,
    pub course_id: String,
    pub lesson_id: String,
    pub task_id: String,
    pub task_title: String,
    pub student_username: String,
    pub submitted_at: String,
    pub content: String,
}
