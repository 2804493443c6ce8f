use rusqlite::Connection;

use crate::DbError;

pub fn run(conn: &Connection) -> Result<(), DbError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS tasks (
            id          TEXT PRIMARY KEY,
            title       TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            status      TEXT NOT NULL
                            CHECK(status IN (
                                'pending', 'todo', 'in-progress',
                                'done', 'completed'
                            )),
            category    TEXT NOT NULL
                            CHECK(category IN ('high', 'medium', 'low')),
            color       TEXT NOT NULL
                            CHECK(color IN ('red', 'green', 'yellow')),
            file        TEXT,
            due_date    TEXT,
            comments    TEXT NOT NULL DEFAULT '[]',
            expire_at   TEXT NOT NULL,
            created_at  TEXT NOT NULL,
            updated_at  TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_tasks_due_date ON tasks(due_date);
        CREATE INDEX IF NOT EXISTS idx_tasks_created  ON tasks(created_at);
        CREATE INDEX IF NOT EXISTS idx_tasks_expire   ON tasks(expire_at);

        CREATE TABLE IF NOT EXISTS api_keys (
            id           TEXT PRIMARY KEY,
            name         TEXT NOT NULL DEFAULT '',
            key_hash     TEXT NOT NULL UNIQUE,
            created_at   TEXT NOT NULL,
            last_used_at TEXT
        );
        ",
    )
    .map_err(|e| DbError::Internal(e.to_string()))?;
    Ok(())
}
