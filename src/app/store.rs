//! Board snapshot store.
//!
//! Holds the in-memory read replica of columns, tasks, and users. The
//! snapshot is only ever replaced wholesale through [`BoardStore::reload`];
//! nothing patches it incrementally.

use std::collections::HashMap;

use anyhow::Result;
use tracing::debug;
use uuid::Uuid;

use crate::db::Database;
use crate::types::{Column, Task, User};

#[derive(Debug, Default)]
pub struct BoardStore {
    columns: Vec<Column>,
    tasks: Vec<Task>,
    users: Vec<User>,
    user_names: HashMap<Uuid, String>,
}

impl BoardStore {
    /// Single mutation entry point. Fetches all three lists and replaces the
    /// snapshot. On failure the snapshot is cleared so the caller renders an
    /// empty board next to its one error notification.
    pub fn reload(&mut self, db: &Database) -> Result<()> {
        match fetch_snapshot(db) {
            Ok((columns, tasks, users)) => {
                debug!(
                    columns = columns.len(),
                    tasks = tasks.len(),
                    users = users.len(),
                    "board snapshot reloaded"
                );
                self.user_names = users
                    .iter()
                    .map(|user| (user.id, user.name().to_string()))
                    .collect();
                self.columns = columns;
                self.tasks = tasks;
                self.users = users;
                Ok(())
            }
            Err(err) => {
                self.columns.clear();
                self.tasks.clear();
                self.users.clear();
                self.user_names.clear();
                Err(err)
            }
        }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn task(&self, id: Uuid) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn column(&self, id: Uuid) -> Option<&Column> {
        self.columns.iter().find(|column| column.id == id)
    }

    pub fn user(&self, id: Uuid) -> Option<&User> {
        self.users.iter().find(|user| user.id == id)
    }

    pub fn assignee_name(&self, assignee_id: Option<Uuid>) -> Option<&str> {
        assignee_id
            .and_then(|id| self.user_names.get(&id))
            .map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() && self.tasks.is_empty() && self.users.is_empty()
    }
}

fn fetch_snapshot(db: &Database) -> Result<(Vec<Column>, Vec<Task>, Vec<User>)> {
    let columns = db.list_columns()?;
    let tasks = db.list_tasks()?;
    let users = db.list_users()?;
    Ok((columns, tasks, users))
}
