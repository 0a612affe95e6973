#![allow(dead_code)]

use std::collections::HashMap;
use std::{fs, path::Path};

use anyhow::{Context, Result, anyhow, bail};
use chrono::Utc;
use rusqlite::{Connection, params, types::Type};
use uuid::Uuid;

use crate::types::{
    ChatMessage, Column, CommandFrequency, Priority, Role, Status, Task, TaskKind, User, UserStatus,
};

pub struct Database {
    conn: Connection,
}

/// Field set accepted by task create/update. `column_id` takes precedence
/// over `status` when both are present; the store derives the stored status
/// from the chosen column so the pair never drifts.
#[derive(Debug, Clone, Default)]
pub struct TaskDraft {
    pub title: String,
    pub description: Option<String>,
    pub status: Status,
    pub priority: Priority,
    pub kind: TaskKind,
    pub assignee_id: Option<Uuid>,
    pub client: Option<String>,
    pub request_date: Option<String>,
    pub due_date: Option<String>,
    pub observation: Option<String>,
    pub external_ref: Option<String>,
    pub column_id: Option<Uuid>,
}

impl Database {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path_ref = path.as_ref();

        if path_ref != Path::new(":memory:")
            && let Some(parent) = path_ref.parent()
        {
            fs::create_dir_all(parent).with_context(|| {
                format!(
                    "failed to create parent directories for {}",
                    path_ref.display()
                )
            })?;
        }

        let conn = Connection::open(path_ref)
            .with_context(|| format!("failed to open sqlite db at {}", path_ref.display()))?;

        conn.execute("PRAGMA foreign_keys = ON", params![])
            .context("failed to enable foreign keys")?;

        let db = Self { conn };
        db.run_migrations()?;
        db.seed_default_columns()?;
        Ok(db)
    }

    pub fn create_user(
        &self,
        email: impl AsRef<str>,
        display_name: Option<String>,
        password_hash: impl AsRef<str>,
        role: Role,
        status: UserStatus,
    ) -> Result<User> {
        let email = email.as_ref().trim().to_ascii_lowercase();
        if email.is_empty() {
            bail!("email cannot be empty");
        }

        let now = now_iso();
        let id = Uuid::new_v4();
        self.conn
            .execute(
                "INSERT INTO users (id, email, display_name, password_hash, role, status, created_at, updated_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    id.to_string(),
                    email,
                    display_name,
                    password_hash.as_ref(),
                    role.as_str(),
                    status.as_str(),
                    now,
                    now
                ],
            )
            .context("failed to insert user")?;

        self.get_user(id)
    }

    pub fn get_user(&self, id: Uuid) -> Result<User> {
        self.conn
            .query_row(
                "SELECT id, email, display_name, role, status, created_at, updated_at
                 FROM users WHERE id = ?1",
                params![id.to_string()],
                map_user_row,
            )
            .with_context(|| format!("user {id} not found"))
    }

    pub fn find_user_by_email(&self, email: impl AsRef<str>) -> Result<Option<User>> {
        let email = email.as_ref().trim().to_ascii_lowercase();
        let user = self
            .conn
            .query_row(
                "SELECT id, email, display_name, role, status, created_at, updated_at
                 FROM users WHERE email = ?1",
                params![email],
                map_user_row,
            )
            .map(Some)
            .or_else(|err| {
                if matches!(err, rusqlite::Error::QueryReturnedNoRows) {
                    Ok(None)
                } else {
                    Err(err)
                }
            })
            .context("failed to look up user by email")?;
        Ok(user)
    }

    /// Login lookup: profile plus stored password hash.
    pub fn user_credentials(&self, email: impl AsRef<str>) -> Result<Option<(User, String)>> {
        let email = email.as_ref().trim().to_ascii_lowercase();
        let row = self
            .conn
            .query_row(
                "SELECT id, email, display_name, role, status, created_at, updated_at, password_hash
                 FROM users WHERE email = ?1",
                params![email],
                |row| {
                    let user = map_user_row(row)?;
                    let hash: String = row.get(7)?;
                    Ok((user, hash))
                },
            )
            .map(Some)
            .or_else(|err| {
                if matches!(err, rusqlite::Error::QueryReturnedNoRows) {
                    Ok(None)
                } else {
                    Err(err)
                }
            })
            .context("failed to load user credentials")?;
        Ok(row)
    }

    pub fn list_users(&self) -> Result<Vec<User>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, email, display_name, role, status, created_at, updated_at
             FROM users ORDER BY created_at ASC",
        )?;

        let users = stmt
            .query_map(params![], map_user_row)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("failed to load users")?;
        Ok(users)
    }

    pub fn update_user_profile(&self, id: Uuid, display_name: Option<String>) -> Result<()> {
        self.conn
            .execute(
                "UPDATE users SET display_name = ?1, updated_at = ?2 WHERE id = ?3",
                params![display_name, now_iso(), id.to_string()],
            )
            .context("failed to update user profile")?;
        Ok(())
    }

    pub fn update_user_role(&self, id: Uuid, role: Role) -> Result<()> {
        self.conn
            .execute(
                "UPDATE users SET role = ?1, updated_at = ?2 WHERE id = ?3",
                params![role.as_str(), now_iso(), id.to_string()],
            )
            .context("failed to update user role")?;
        Ok(())
    }

    /// Status flip is the only user removal path; inactive is the soft delete.
    pub fn update_user_status(&self, id: Uuid, status: UserStatus) -> Result<()> {
        self.conn
            .execute(
                "UPDATE users SET status = ?1, updated_at = ?2 WHERE id = ?3",
                params![status.as_str(), now_iso(), id.to_string()],
            )
            .context("failed to update user status")?;
        Ok(())
    }

    pub fn add_column(
        &self,
        title: impl AsRef<str>,
        column_type: Option<Status>,
        position: i64,
    ) -> Result<Column> {
        let now = now_iso();
        let id = Uuid::new_v4();
        self.conn
            .execute(
                "INSERT INTO columns (id, title, column_type, position, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    id.to_string(),
                    title.as_ref(),
                    column_type.map(Status::as_str),
                    position,
                    now
                ],
            )
            .context("failed to insert column")?;

        self.get_column(id)
    }

    pub fn get_column(&self, id: Uuid) -> Result<Column> {
        self.conn
            .query_row(
                "SELECT id, title, column_type, position, created_at FROM columns WHERE id = ?1",
                params![id.to_string()],
                map_column_row,
            )
            .with_context(|| format!("column {id} not found"))
    }

    pub fn list_columns(&self) -> Result<Vec<Column>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, column_type, position, created_at FROM columns ORDER BY position ASC",
        )?;

        let columns = stmt
            .query_map(params![], map_column_row)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("failed to load columns")?;
        Ok(columns)
    }

    pub fn create_task(&self, draft: &TaskDraft) -> Result<Task> {
        if draft.title.trim().is_empty() {
            bail!("title cannot be empty");
        }

        let (column_id, status) = self.resolve_task_placement(draft.column_id, draft.status)?;
        let now = now_iso();
        let id = Uuid::new_v4();
        self.conn
            .execute(
                "INSERT INTO tasks (
                    id, title, description, status, priority, kind, assignee_id, client,
                    request_date, due_date, observation, external_ref, column_id, completed,
                    created_at, updated_at
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
                params![
                    id.to_string(),
                    draft.title.trim(),
                    none_if_blank(draft.description.as_deref()),
                    status.as_str(),
                    draft.priority.as_str(),
                    draft.kind.as_str(),
                    draft.assignee_id.map(|id| id.to_string()),
                    none_if_blank(draft.client.as_deref()),
                    none_if_blank(draft.request_date.as_deref()),
                    none_if_blank(draft.due_date.as_deref()),
                    none_if_blank(draft.observation.as_deref()),
                    none_if_blank(draft.external_ref.as_deref()),
                    column_id.to_string(),
                    false,
                    now,
                    now
                ],
            )
            .context("failed to insert task")?;

        self.get_task(id)
    }

    pub fn get_task(&self, id: Uuid) -> Result<Task> {
        self.conn
            .query_row(
                &format!("{TASK_SELECT} WHERE id = ?1"),
                params![id.to_string()],
                map_task_row,
            )
            .with_context(|| format!("task {id} not found"))
    }

    pub fn list_tasks(&self) -> Result<Vec<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TASK_SELECT} ORDER BY created_at ASC"))?;

        let tasks = stmt
            .query_map(params![], map_task_row)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("failed to load tasks")?;
        Ok(tasks)
    }

    pub fn update_task(&self, id: Uuid, draft: &TaskDraft) -> Result<Task> {
        if draft.title.trim().is_empty() {
            bail!("title cannot be empty");
        }

        let (column_id, status) = self.resolve_task_placement(draft.column_id, draft.status)?;
        let affected = self
            .conn
            .execute(
                "UPDATE tasks SET
                    title = ?1, description = ?2, status = ?3, priority = ?4, kind = ?5,
                    assignee_id = ?6, client = ?7, request_date = ?8, due_date = ?9,
                    observation = ?10, external_ref = ?11, column_id = ?12, updated_at = ?13
                 WHERE id = ?14",
                params![
                    draft.title.trim(),
                    none_if_blank(draft.description.as_deref()),
                    status.as_str(),
                    draft.priority.as_str(),
                    draft.kind.as_str(),
                    draft.assignee_id.map(|id| id.to_string()),
                    none_if_blank(draft.client.as_deref()),
                    none_if_blank(draft.request_date.as_deref()),
                    none_if_blank(draft.due_date.as_deref()),
                    none_if_blank(draft.observation.as_deref()),
                    none_if_blank(draft.external_ref.as_deref()),
                    column_id.to_string(),
                    now_iso(),
                    id.to_string()
                ],
            )
            .context("failed to update task")?;
        if affected == 0 {
            bail!("task {id} not found");
        }

        self.get_task(id)
    }

    /// Move a task into a column. Status is derived from the destination so
    /// `column_id` and `status` are always written together.
    pub fn move_task(&self, id: Uuid, column_id: Uuid) -> Result<Task> {
        let column = self.get_column(column_id)?;
        let status = column.derived_status();

        let affected = self
            .conn
            .execute(
                "UPDATE tasks SET column_id = ?1, status = ?2, updated_at = ?3 WHERE id = ?4",
                params![
                    column.id.to_string(),
                    status.as_str(),
                    now_iso(),
                    id.to_string()
                ],
            )
            .context("failed to move task")?;
        if affected == 0 {
            bail!("task {id} not found");
        }

        self.get_task(id)
    }

    pub fn complete_task(&self, id: Uuid) -> Result<Task> {
        let columns = self.list_columns()?;
        let done = columns
            .iter()
            .find(|column| column.derived_status() == Status::Completed);

        let affected = match done {
            Some(column) => self
                .conn
                .execute(
                    "UPDATE tasks SET completed = 1, column_id = ?1, status = ?2, updated_at = ?3
                     WHERE id = ?4",
                    params![
                        column.id.to_string(),
                        Status::Completed.as_str(),
                        now_iso(),
                        id.to_string()
                    ],
                )
                .context("failed to complete task")?,
            None => self
                .conn
                .execute(
                    "UPDATE tasks SET completed = 1, updated_at = ?1 WHERE id = ?2",
                    params![now_iso(), id.to_string()],
                )
                .context("failed to complete task")?,
        };
        if affected == 0 {
            bail!("task {id} not found");
        }

        self.get_task(id)
    }

    pub fn delete_task(&self, id: Uuid) -> Result<()> {
        self.conn
            .execute("DELETE FROM tasks WHERE id = ?1", params![id.to_string()])
            .context("failed to delete task")?;
        Ok(())
    }

    pub fn send_message(
        &self,
        sender_id: Uuid,
        receiver_id: Uuid,
        body: impl AsRef<str>,
    ) -> Result<ChatMessage> {
        let body = body.as_ref().trim().to_string();
        if body.is_empty() {
            bail!("message body cannot be empty");
        }

        let now = now_iso();
        let id = Uuid::new_v4();
        self.conn
            .execute(
                "INSERT INTO messages (id, sender_id, receiver_id, body, read, created_at) \
                 VALUES (?1, ?2, ?3, ?4, 0, ?5)",
                params![
                    id.to_string(),
                    sender_id.to_string(),
                    receiver_id.to_string(),
                    body,
                    now
                ],
            )
            .context("failed to insert message")?;

        self.get_message(id)
    }

    pub fn get_message(&self, id: Uuid) -> Result<ChatMessage> {
        self.conn
            .query_row(
                "SELECT id, sender_id, receiver_id, body, read, created_at
                 FROM messages WHERE id = ?1",
                params![id.to_string()],
                map_message_row,
            )
            .with_context(|| format!("message {id} not found"))
    }

    /// Full bidirectional history between two users, oldest first.
    pub fn conversation(&self, a: Uuid, b: Uuid) -> Result<Vec<ChatMessage>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, sender_id, receiver_id, body, read, created_at
             FROM messages
             WHERE (sender_id = ?1 AND receiver_id = ?2) OR (sender_id = ?2 AND receiver_id = ?1)
             ORDER BY created_at ASC, id ASC",
        )?;

        let messages = stmt
            .query_map(params![a.to_string(), b.to_string()], map_message_row)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("failed to load conversation")?;
        Ok(messages)
    }

    /// Batch read-flag transition for one direction of a conversation.
    /// Returns how many rows flipped.
    pub fn mark_conversation_read(&self, sender_id: Uuid, receiver_id: Uuid) -> Result<usize> {
        let affected = self
            .conn
            .execute(
                "UPDATE messages SET read = 1
                 WHERE sender_id = ?1 AND receiver_id = ?2 AND read = 0",
                params![sender_id.to_string(), receiver_id.to_string()],
            )
            .context("failed to mark conversation read")?;
        Ok(affected)
    }

    /// Pending (unread) message counts for a receiver, grouped by sender.
    pub fn unread_counts(&self, receiver_id: Uuid) -> Result<Vec<(Uuid, i64)>> {
        let mut stmt = self.conn.prepare(
            "SELECT sender_id, COUNT(*) FROM messages
             WHERE receiver_id = ?1 AND read = 0
             GROUP BY sender_id",
        )?;

        let counts = stmt
            .query_map(params![receiver_id.to_string()], |row| {
                let sender = parse_uuid_column(row.get::<_, String>(0)?, 0)?;
                let count: i64 = row.get(1)?;
                Ok((sender, count))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("failed to load unread counts")?;
        Ok(counts)
    }

    pub fn record_command_use(&self, command_id: &str) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO command_frequencies (command_id, use_count, last_used)
                 VALUES (?1, 1, ?2)
                 ON CONFLICT(command_id) DO UPDATE SET
                     use_count = use_count + 1,
                     last_used = excluded.last_used",
                params![command_id, now_iso()],
            )
            .context("failed to record command use")?;
        Ok(())
    }

    pub fn command_frequencies(&self) -> Result<HashMap<String, CommandFrequency>> {
        let mut stmt = self
            .conn
            .prepare("SELECT command_id, use_count, last_used FROM command_frequencies")?;

        let frequencies = stmt
            .query_map(params![], |row| {
                Ok(CommandFrequency {
                    command_id: row.get(0)?,
                    use_count: row.get(1)?,
                    last_used: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("failed to load command frequencies")?;

        Ok(frequencies
            .into_iter()
            .map(|freq| (freq.command_id.clone(), freq))
            .collect())
    }

    #[cfg(test)]
    pub(crate) fn execute_raw(&self, sql: &str) -> Result<()> {
        self.conn
            .execute_batch(sql)
            .context("failed to execute raw sql")?;
        Ok(())
    }

    fn run_migrations(&self) -> Result<()> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS users (
                    id TEXT PRIMARY KEY,
                    email TEXT NOT NULL UNIQUE,
                    display_name TEXT,
                    password_hash TEXT NOT NULL,
                    role TEXT NOT NULL DEFAULT 'user',
                    status TEXT NOT NULL DEFAULT 'pending',
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS columns (
                    id TEXT PRIMARY KEY,
                    title TEXT NOT NULL UNIQUE,
                    column_type TEXT,
                    position INTEGER NOT NULL,
                    created_at TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS tasks (
                    id TEXT PRIMARY KEY,
                    title TEXT NOT NULL,
                    description TEXT,
                    status TEXT NOT NULL DEFAULT 'pending',
                    priority TEXT NOT NULL DEFAULT 'medium',
                    kind TEXT NOT NULL DEFAULT 'task',
                    assignee_id TEXT REFERENCES users(id),
                    client TEXT,
                    request_date TEXT,
                    due_date TEXT,
                    observation TEXT,
                    external_ref TEXT,
                    column_id TEXT NOT NULL REFERENCES columns(id),
                    completed INTEGER NOT NULL DEFAULT 0,
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS messages (
                    id TEXT PRIMARY KEY,
                    sender_id TEXT NOT NULL REFERENCES users(id),
                    receiver_id TEXT NOT NULL REFERENCES users(id),
                    body TEXT NOT NULL,
                    read INTEGER NOT NULL DEFAULT 0,
                    created_at TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS command_frequencies (
                    command_id TEXT PRIMARY KEY,
                    use_count INTEGER NOT NULL DEFAULT 0,
                    last_used TEXT NOT NULL
                );",
            )
            .context("failed to run sqlite migrations")?;

        self.conn
            .execute("ALTER TABLE tasks ADD COLUMN observation TEXT", params![])
            .or_else(|err| {
                if is_duplicate_column_err(&err) {
                    Ok(0)
                } else {
                    Err(err)
                }
            })
            .context("failed to migrate tasks.observation")?;

        self.conn
            .execute("ALTER TABLE tasks ADD COLUMN external_ref TEXT", params![])
            .or_else(|err| {
                if is_duplicate_column_err(&err) {
                    Ok(0)
                } else {
                    Err(err)
                }
            })
            .context("failed to migrate tasks.external_ref")?;

        self.conn
            .execute(
                "UPDATE tasks SET status = 'pending' WHERE status IS NULL OR status = ''",
                params![],
            )
            .context("failed to backfill tasks.status")?;

        Ok(())
    }

    fn seed_default_columns(&self) -> Result<()> {
        let mut stmt = self
            .conn
            .prepare("SELECT COUNT(*) FROM columns")
            .context("failed to prepare column count query")?;
        let column_count: i64 = stmt.query_row(params![], |row| row.get(0))?;

        if column_count == 0 {
            self.add_column("Pending", Some(Status::Pending), 1)?;
            self.add_column("In Progress", Some(Status::InProgress), 2)?;
            self.add_column("In Review", Some(Status::Review), 3)?;
            self.add_column("Completed", Some(Status::Completed), 4)?;
        }

        Ok(())
    }

    fn resolve_task_placement(
        &self,
        column_id: Option<Uuid>,
        status: Status,
    ) -> Result<(Uuid, Status)> {
        if let Some(id) = column_id {
            let column = self.get_column(id)?;
            return Ok((column.id, column.derived_status()));
        }

        let columns = self.list_columns()?;
        if let Some(column) = columns
            .iter()
            .find(|column| column.derived_status() == status)
        {
            return Ok((column.id, status));
        }

        let first = columns
            .first()
            .ok_or_else(|| anyhow!("no columns configured"))?;
        Ok((first.id, first.derived_status()))
    }
}

const TASK_SELECT: &str = "SELECT id, title, description, status, priority, kind, assignee_id, \
     client, request_date, due_date, observation, external_ref, column_id, completed, \
     created_at, updated_at FROM tasks";

fn map_user_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: parse_uuid_column(row.get::<_, String>(0)?, 0)?,
        email: row.get(1)?,
        display_name: row.get(2)?,
        role: parse_enum_column(row.get::<_, String>(3)?, 3, "role")?,
        status: parse_enum_column(row.get::<_, String>(4)?, 4, "user status")?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

fn map_column_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Column> {
    // A missing or unrecognized type falls back to the positional mapping.
    let column_type = row
        .get::<_, Option<String>>(2)?
        .and_then(|raw| raw.parse::<Status>().ok());
    Ok(Column {
        id: parse_uuid_column(row.get::<_, String>(0)?, 0)?,
        title: row.get(1)?,
        column_type,
        position: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn map_task_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Task> {
    let assignee_id = row
        .get::<_, Option<String>>(6)?
        .map(|raw| parse_uuid_column(raw, 6))
        .transpose()?;
    Ok(Task {
        id: parse_uuid_column(row.get::<_, String>(0)?, 0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        status: parse_enum_column(row.get::<_, String>(3)?, 3, "status")?,
        priority: parse_enum_column(row.get::<_, String>(4)?, 4, "priority")?,
        kind: parse_enum_column(row.get::<_, String>(5)?, 5, "kind")?,
        assignee_id,
        client: row.get(7)?,
        request_date: row.get(8)?,
        due_date: row.get(9)?,
        observation: row.get(10)?,
        external_ref: row.get(11)?,
        column_id: parse_uuid_column(row.get::<_, String>(12)?, 12)?,
        completed: row.get(13)?,
        created_at: row.get(14)?,
        updated_at: row.get(15)?,
    })
}

fn map_message_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ChatMessage> {
    Ok(ChatMessage {
        id: parse_uuid_column(row.get::<_, String>(0)?, 0)?,
        sender_id: parse_uuid_column(row.get::<_, String>(1)?, 1)?,
        receiver_id: parse_uuid_column(row.get::<_, String>(2)?, 2)?,
        body: row.get(3)?,
        read: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn is_duplicate_column_err(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(_, Some(msg)) if msg.contains("duplicate column name")
    )
}

fn parse_uuid_column(value: String, idx: usize) -> rusqlite::Result<Uuid> {
    Uuid::parse_str(&value)
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err)))
}

fn parse_enum_column<T: std::str::FromStr>(
    value: String,
    idx: usize,
    what: &str,
) -> rusqlite::Result<T> {
    value.parse::<T>().map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            format!("invalid {what} value '{value}'").into(),
        )
    })
}

fn none_if_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn now_iso() -> String {
    Utc::now().to_rfc3339()
}
