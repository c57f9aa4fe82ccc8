use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id          TEXT PRIMARY KEY,
            email       TEXT NOT NULL UNIQUE,
            username    TEXT NOT NULL,
            password    TEXT NOT NULL,
            role        INTEGER NOT NULL DEFAULT 0,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS courses (
            id          TEXT PRIMARY KEY,
            title       TEXT NOT NULL,
            description TEXT NOT NULL,
            is_private  INTEGER NOT NULL DEFAULT 0,
            teacher_id  TEXT NOT NULL REFERENCES users(id),
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS course_students (
            course_id   TEXT NOT NULL REFERENCES courses(id) ON DELETE CASCADE,
            user_id     TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            PRIMARY KEY (course_id, user_id)
        );

        CREATE TABLE IF NOT EXISTS lessons (
            id          TEXT PRIMARY KEY,
            course_id   TEXT NOT NULL REFERENCES courses(id) ON DELETE CASCADE,
            title       TEXT NOT NULL,
            order_index INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_lessons_course
            ON lessons(course_id, order_index);

        CREATE TABLE IF NOT EXISTS tasks (
            id          TEXT PRIMARY KEY,
            lesson_id   TEXT NOT NULL REFERENCES lessons(id) ON DELETE CASCADE,
            title       TEXT NOT NULL,
            condition   TEXT NOT NULL,
            example     TEXT NOT NULL,
            order_index INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_tasks_lesson
            ON tasks(lesson_id, order_index);

        -- status: 1 waiting, 2 incorrect, 3 correct.
        -- UNIQUE(task_id, student_id): at most one solution per student and
        -- task; resubmission upserts into the same row.
        CREATE TABLE IF NOT EXISTS solutions (
            id           TEXT PRIMARY KEY,
            task_id      TEXT NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
            student_id   TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            content      TEXT NOT NULL,
            extension    TEXT NOT NULL,
            status       INTEGER NOT NULL DEFAULT 1,
            submitted_at TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(task_id, student_id)
        );

        CREATE INDEX IF NOT EXISTS idx_solutions_student
            ON solutions(student_id);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
