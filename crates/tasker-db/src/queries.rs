use crate::Database;
use crate::models::{
    CourseRow, CourseSummaryRow, LessonOverviewRow, LessonRow, SolutionPageRow, SolutionRow,
    TaskOverviewRow, TaskRow, UserRow, WaitingSolutionRow,
};
use anyhow::Result;
use rusqlite::{Connection, OptionalExtension};
use tasker_types::models::SolutionStatus;

impl Database {
    // -- Users --

    /// Returns false when the email is already registered (the UNIQUE
    /// constraint fired), so the caller can report it without a separate
    /// existence check.
    pub fn create_user(
        &self,
        id: &str,
        email: &str,
        username: &str,
        password_hash: &str,
        role: i64,
    ) -> Result<bool> {
        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT INTO users (id, email, username, password, role) VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![id, email, username, password_hash, role],
            );
            match inserted {
                Ok(_) => Ok(true),
                Err(rusqlite::Error::SqliteFailure(e, _))
                    if e.code == rusqlite::ErrorCode::ConstraintViolation =>
                {
                    Ok(false)
                }
                Err(e) => Err(e.into()),
            }
        })
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "email", email))
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id", id))
    }

    // -- Courses --

    pub fn create_course(
        &self,
        id: &str,
        title: &str,
        description: &str,
        is_private: bool,
        teacher_id: &str,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO courses (id, title, description, is_private, teacher_id)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![id, title, description, is_private, teacher_id],
            )?;
            Ok(())
        })
    }

    pub fn get_course(&self, id: &str) -> Result<Option<CourseRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT id, title, description, is_private, teacher_id, created_at
                     FROM courses WHERE id = ?1",
                    [id],
                    map_course_row,
                )
                .optional()?;
            Ok(row)
        })
    }

    /// Lessons, tasks, solutions, and subscriptions go with the course via
    /// the schema's cascading foreign keys.
    pub fn delete_course(&self, id: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM courses WHERE id = ?1", [id])?;
            Ok(())
        })
    }

    pub fn courses_taught_by(&self, teacher_id: &str) -> Result<Vec<CourseSummaryRow>> {
        self.with_conn(|conn| {
            query_course_summaries(
                conn,
                "SELECT id, title, description FROM courses WHERE teacher_id = ?1
                 ORDER BY created_at",
                [teacher_id],
            )
        })
    }

    pub fn courses_studied_by(&self, student_id: &str) -> Result<Vec<CourseSummaryRow>> {
        self.with_conn(|conn| {
            query_course_summaries(
                conn,
                "SELECT c.id, c.title, c.description
                 FROM courses c
                 JOIN course_students cs ON cs.course_id = c.id
                 WHERE cs.user_id = ?1
                 ORDER BY c.created_at",
                [student_id],
            )
        })
    }

    /// Case-insensitive substring search over public course titles.
    pub fn search_public_courses(&self, title_query: &str) -> Result<Vec<CourseSummaryRow>> {
        self.with_conn(|conn| {
            query_course_summaries(
                conn,
                "SELECT id, title, description FROM courses
                 WHERE is_private = 0 AND title LIKE '%' || ?1 || '%'
                 ORDER BY title",
                [title_query],
            )
        })
    }

    pub fn is_subscribed(&self, course_id: &str, user_id: &str) -> Result<bool> {
        self.with_conn(|conn| query_is_subscribed(conn, course_id, user_id))
    }

    /// Toggle course membership: unsubscribes if subscribed, subscribes if
    /// not. Returns the membership state after the toggle. Check and write
    /// run under the one connection lock, so concurrent toggles serialize.
    pub fn toggle_subscription(&self, course_id: &str, user_id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            if query_is_subscribed(conn, course_id, user_id)? {
                conn.execute(
                    "DELETE FROM course_students WHERE course_id = ?1 AND user_id = ?2",
                    [course_id, user_id],
                )?;
                Ok(false)
            } else {
                conn.execute(
                    "INSERT INTO course_students (course_id, user_id) VALUES (?1, ?2)",
                    [course_id, user_id],
                )?;
                Ok(true)
            }
        })
    }

    /// Idempotent subscribe, used by invite redemption.
    pub fn subscribe_if_missing(&self, course_id: &str, user_id: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT OR IGNORE INTO course_students (course_id, user_id) VALUES (?1, ?2)",
                [course_id, user_id],
            )?;
            Ok(())
        })
    }

    // -- Lessons --

    /// Inserts the lesson with order_index = current lesson count of the
    /// course. Indexes are not reused after deletions. Returns the assigned
    /// index.
    pub fn create_lesson(&self, id: &str, course_id: &str, title: &str) -> Result<i64> {
        self.with_conn(|conn| {
            let order_index: i64 = conn.query_row(
                "SELECT COUNT(*) FROM lessons WHERE course_id = ?1",
                [course_id],
                |row| row.get(0),
            )?;
            conn.execute(
                "INSERT INTO lessons (id, course_id, title, order_index) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![id, course_id, title, order_index],
            )?;
            Ok(order_index)
        })
    }

    pub fn get_lesson(&self, id: &str) -> Result<Option<LessonRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT id, course_id, title, order_index FROM lessons WHERE id = ?1",
                    [id],
                    |row| {
                        Ok(LessonRow {
                            id: row.get(0)?,
                            course_id: row.get(1)?,
                            title: row.get(2)?,
                            order_index: row.get(3)?,
                        })
                    },
                )
                .optional()?;
            Ok(row)
        })
    }

    /// Course-page listing: newest lessons first, each annotated with its
    /// task count and the viewer's correct/waiting solution counts. An
    /// anonymous viewer gets zero counts.
    pub fn lessons_with_progress(
        &self,
        course_id: &str,
        viewer_id: Option<&str>,
    ) -> Result<Vec<LessonOverviewRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT l.id, l.title, l.order_index,
                        (SELECT COUNT(*) FROM tasks t WHERE t.lesson_id = l.id),
                        (SELECT COUNT(*) FROM solutions s
                          JOIN tasks t ON s.task_id = t.id
                          WHERE t.lesson_id = l.id AND s.student_id = ?2 AND s.status = ?3),
                        (SELECT COUNT(*) FROM solutions s
                          JOIN tasks t ON s.task_id = t.id
                          WHERE t.lesson_id = l.id AND s.student_id = ?2 AND s.status = ?4)
                 FROM lessons l
                 WHERE l.course_id = ?1
                 ORDER BY l.order_index DESC",
            )?;

            let rows = stmt
                .query_map(
                    rusqlite::params![
                        course_id,
                        viewer_id,
                        SolutionStatus::Correct.code(),
                        SolutionStatus::Waiting.code()
                    ],
                    |row| {
                        Ok(LessonOverviewRow {
                            id: row.get(0)?,
                            title: row.get(1)?,
                            order_index: row.get(2)?,
                            tasks_count: row.get(3)?,
                            correct_solutions_count: row.get(4)?,
                            waiting_solutions_count: row.get(5)?,
                        })
                    },
                )?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    /// The course a lesson belongs to.
    pub fn lesson_course(&self, lesson_id: &str) -> Result<Option<CourseRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT c.id, c.title, c.description, c.is_private, c.teacher_id, c.created_at
                     FROM lessons l JOIN courses c ON l.course_id = c.id
                     WHERE l.id = ?1",
                    [lesson_id],
                    map_course_row,
                )
                .optional()?;
            Ok(row)
        })
    }

    // -- Tasks --

    /// Same order_index assignment rule as lessons, scoped to the lesson.
    pub fn create_task(
        &self,
        id: &str,
        lesson_id: &str,
        title: &str,
        condition: &str,
        example: &str,
    ) -> Result<i64> {
        self.with_conn(|conn| {
            let order_index: i64 = conn.query_row(
                "SELECT COUNT(*) FROM tasks WHERE lesson_id = ?1",
                [lesson_id],
                |row| row.get(0),
            )?;
            conn.execute(
                "INSERT INTO tasks (id, lesson_id, title, condition, example, order_index)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![id, lesson_id, title, condition, example, order_index],
            )?;
            Ok(order_index)
        })
    }

    pub fn get_task(&self, id: &str) -> Result<Option<TaskRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT id, lesson_id, title, condition, example, order_index
                     FROM tasks WHERE id = ?1",
                    [id],
                    map_task_row,
                )
                .optional()?;
            Ok(row)
        })
    }

    /// Lesson-page listing: tasks in order, LEFT JOINed with the viewer's
    /// solution so each row carries the viewer's status, if any.
    pub fn tasks_with_solution_status(
        &self,
        lesson_id: &str,
        viewer_id: Option<&str>,
    ) -> Result<Vec<TaskOverviewRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT t.id, t.title, s.status
                 FROM tasks t
                 LEFT JOIN solutions s ON s.task_id = t.id AND s.student_id = ?2
                 WHERE t.lesson_id = ?1
                 ORDER BY t.order_index",
            )?;

            let rows = stmt
                .query_map(rusqlite::params![lesson_id, viewer_id], |row| {
                    Ok(TaskOverviewRow {
                        id: row.get(0)?,
                        title: row.get(1)?,
                        solution_status: row.get(2)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    /// The course that transitively owns a task (task -> lesson -> course).
    pub fn task_course(&self, task_id: &str) -> Result<Option<CourseRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT c.id, c.title, c.description, c.is_private, c.teacher_id, c.created_at
                     FROM tasks t
                     JOIN lessons l ON t.lesson_id = l.id
                     JOIN courses c ON l.course_id = c.id
                     WHERE t.id = ?1",
                    [task_id],
                    map_course_row,
                )
                .optional()?;
            Ok(row)
        })
    }

    // -- Solutions --

    /// Create-or-replace submission. The UNIQUE(task_id, student_id)
    /// constraint makes this race-free: two concurrent submissions land on
    /// the same row instead of creating duplicates. `reset_status` selects
    /// whether a resubmission returns the solution to waiting or keeps the
    /// existing grade.
    pub fn upsert_solution(
        &self,
        id: &str,
        task_id: &str,
        student_id: &str,
        content: &str,
        extension: &str,
        reset_status: bool,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO solutions (id, task_id, student_id, content, extension, status, submitted_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, datetime('now'))
                 ON CONFLICT(task_id, student_id) DO UPDATE SET
                     content = excluded.content,
                     extension = excluded.extension,
                     submitted_at = excluded.submitted_at,
                     status = CASE WHEN ?7 THEN excluded.status ELSE status END",
                rusqlite::params![
                    id,
                    task_id,
                    student_id,
                    content,
                    extension,
                    SolutionStatus::Waiting.code(),
                    reset_status
                ],
            )?;
            Ok(())
        })
    }

    pub fn get_solution(&self, id: &str) -> Result<Option<SolutionRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT id, task_id, student_id, content, extension, status, submitted_at
                     FROM solutions WHERE id = ?1",
                    [id],
                    map_solution_row,
                )
                .optional()?;
            Ok(row)
        })
    }

    pub fn get_solution_for(&self, task_id: &str, student_id: &str) -> Result<Option<SolutionRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT id, task_id, student_id, content, extension, status, submitted_at
                     FROM solutions WHERE task_id = ?1 AND student_id = ?2",
                    [task_id, student_id],
                    map_solution_row,
                )
                .optional()?;
            Ok(row)
        })
    }

    /// Grading overwrite. Also refreshes submitted_at, mirroring the
    /// stamp-on-every-save rule.
    pub fn set_solution_status(&self, id: &str, status: i64) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE solutions SET status = ?2, submitted_at = datetime('now') WHERE id = ?1",
                rusqlite::params![id, status],
            )?;
            Ok(())
        })
    }

    /// Solution page context in a single JOIN.
    pub fn solution_page(&self, solution_id: &str) -> Result<Option<SolutionPageRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT s.id, t.title, t.condition, u.username, s.content, s.extension, s.status
                     FROM solutions s
                     JOIN tasks t ON s.task_id = t.id
                     JOIN users u ON s.student_id = u.id
                     WHERE s.id = ?1",
                    [solution_id],
                    |row| {
                        Ok(SolutionPageRow {
                            solution_id: row.get(0)?,
                            task_title: row.get(1)?,
                            task_condition: row.get(2)?,
                            student_username: row.get(3)?,
                            content: row.get(4)?,
                            extension: row.get(5)?,
                            status: row.get(6)?,
                        })
                    },
                )
                .optional()?;
            Ok(row)
        })
    }

    /// The course that transitively owns a solution's task.
    pub fn solution_course(&self, solution_id: &str) -> Result<Option<CourseRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT c.id, c.title, c.description, c.is_private, c.teacher_id, c.created_at
                     FROM solutions s
                     JOIN tasks t ON s.task_id = t.id
                     JOIN lessons l ON t.lesson_id = l.id
                     JOIN courses c ON l.course_id = c.id
                     WHERE s.id = ?1",
                    [solution_id],
                    map_course_row,
                )
                .optional()?;
            Ok(row)
        })
    }

    /// The teacher's review queue: all waiting solutions of a course,
    /// oldest submission first.
    pub fn waiting_solutions_for_course(&self, course_id: &str) -> Result<Vec<WaitingSolutionRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT s.id, c.id, l.id, t.id, t.title, u.username, s.submitted_at, s.content
                 FROM solutions s
                 JOIN tasks t ON s.task_id = t.id
                 JOIN lessons l ON t.lesson_id = l.id
                 JOIN courses c ON l.course_id = c.id
                 JOIN users u ON s.student_id = u.id
                 WHERE c.id = ?1 AND s.status = ?2
                 ORDER BY s.submitted_at",
            )?;

            let rows = stmt
                .query_map(
                    rusqlite::params![course_id, SolutionStatus::Waiting.code()],
                    |row| {
                        Ok(WaitingSolutionRow {
                            solution_id: row.get(0)?,
                            course_id: row.get(1)?,
                            lesson_id: row.get(2)?,
                            task_id: row.get(3)?,
                            task_title: row.get(4)?,
                            student_username: row.get(5)?,
                            submitted_at: row.get(6)?,
                            content: row.get(7)?,
                        })
                    },
                )?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }
}

fn query_user(conn: &Connection, column: &str, value: &str) -> Result<Option<UserRow>> {
    // `column` is a compile-time constant ("email" or "id"), never user input.
    let sql = format!(
        "SELECT id, email, username, password, role, created_at FROM users WHERE {column} = ?1"
    );
    let row = conn
        .query_row(&sql, [value], |row| {
            Ok(UserRow {
                id: row.get(0)?,
                email: row.get(1)?,
                username: row.get(2)?,
                password: row.get(3)?,
                role: row.get(4)?,
                created_at: row.get(5)?,
            })
        })
        .optional()?;
    Ok(row)
}

fn query_is_subscribed(conn: &Connection, course_id: &str, user_id: &str) -> Result<bool> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM course_students WHERE course_id = ?1 AND user_id = ?2",
            [course_id, user_id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

fn query_course_summaries<P: rusqlite::Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> Result<Vec<CourseSummaryRow>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, |row| {
            Ok(CourseSummaryRow {
                id: row.get(0)?,
                title: row.get(1)?,
                description: row.get(2)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn map_course_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<CourseRow> {
    Ok(CourseRow {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        is_private: row.get(3)?,
        teacher_id: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn map_task_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<TaskRow> {
    Ok(TaskRow {
        id: row.get(0)?,
        lesson_id: row.get(1)?,
        title: row.get(2)?,
        condition: row.get(3)?,
        example: row.get(4)?,
        order_index: row.get(5)?,
    })
}

fn map_solution_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<SolutionRow> {
    Ok(SolutionRow {
        id: row.get(0)?,
        task_id: row.get(1)?,
        student_id: row.get(2)?,
        content: row.get(3)?,
        extension: row.get(4)?,
        status: row.get(5)?,
        submitted_at: row.get(6)?,
    })
}
