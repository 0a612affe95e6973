//! Task editor dialog: one state machine for both creating and editing.
//!
//! The form never writes through to the store while open; a save builds a
//! draft, persists it in one call, and publishes the change so the board
//! reconciles. Validation errors stay inside the dialog.

use anyhow::Result;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::db::{Database, TaskDraft};
use crate::events::{ChangeBus, TaskOperation};
use crate::types::{Priority, Status, Task, TaskKind, User};

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum EditorMode {
    Create,
    Edit { task_id: Uuid },
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum TaskEditorField {
    Title,
    Description,
    Status,
    Priority,
    Kind,
    Assignee,
    Client,
    RequestDate,
    DueDate,
    Observation,
    ExternalRef,
    Save,
    Cancel,
}

impl TaskEditorField {
    pub const ALL: [TaskEditorField; 13] = [
        TaskEditorField::Title,
        TaskEditorField::Description,
        TaskEditorField::Status,
        TaskEditorField::Priority,
        TaskEditorField::Kind,
        TaskEditorField::Assignee,
        TaskEditorField::Client,
        TaskEditorField::RequestDate,
        TaskEditorField::DueDate,
        TaskEditorField::Observation,
        TaskEditorField::ExternalRef,
        TaskEditorField::Save,
        TaskEditorField::Cancel,
    ];
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct TaskEditorState {
    pub mode: EditorMode,
    pub title_input: String,
    pub description_input: String,
    pub status: Status,
    pub priority: Priority,
    pub kind: TaskKind,
    pub assignee_id: Option<Uuid>,
    pub client_input: String,
    pub request_date_input: String,
    pub due_date_input: String,
    pub observation_input: String,
    pub external_ref_input: String,
    pub focused_field: TaskEditorField,
    pub error_message: Option<String>,
}

impl TaskEditorState {
    /// Blank form for a new task. The request date is pre-filled with today
    /// so the common case needs no typing.
    pub fn for_create(today: NaiveDate) -> Self {
        Self {
            mode: EditorMode::Create,
            title_input: String::new(),
            description_input: String::new(),
            status: Status::default(),
            priority: Priority::default(),
            kind: TaskKind::default(),
            assignee_id: None,
            client_input: String::new(),
            request_date_input: today.format(DATE_FORMAT).to_string(),
            due_date_input: String::new(),
            observation_input: String::new(),
            external_ref_input: String::new(),
            focused_field: TaskEditorField::Title,
            error_message: None,
        }
    }

    /// Form populated from an existing task, keyed by its id for the save.
    pub fn for_edit(task: &Task) -> Self {
        Self {
            mode: EditorMode::Edit { task_id: task.id },
            title_input: task.title.clone(),
            description_input: task.description.clone().unwrap_or_default(),
            status: task.status,
            priority: task.priority,
            kind: task.kind,
            assignee_id: task.assignee_id,
            client_input: task.client.clone().unwrap_or_default(),
            request_date_input: task.request_date.clone().unwrap_or_default(),
            due_date_input: task.due_date.clone().unwrap_or_default(),
            observation_input: task.observation.clone().unwrap_or_default(),
            external_ref_input: task.external_ref.clone().unwrap_or_default(),
            focused_field: TaskEditorField::Title,
            error_message: None,
        }
    }

    pub fn focus_next(&mut self) {
        let index = field_index(self.focused_field);
        self.focused_field = TaskEditorField::ALL[(index + 1) % TaskEditorField::ALL.len()];
    }

    pub fn focus_prev(&mut self) {
        let index = field_index(self.focused_field);
        let len = TaskEditorField::ALL.len();
        self.focused_field = TaskEditorField::ALL[(index + len - 1) % len];
    }

    pub fn cycle_status(&mut self) {
        self.status = cycle(&Status::ALL, self.status);
    }

    pub fn cycle_priority(&mut self) {
        self.priority = cycle(&Priority::ALL, self.priority);
    }

    pub fn cycle_kind(&mut self) {
        self.kind = cycle(&TaskKind::ALL, self.kind);
    }

    /// Unassigned, then each user in list order, then back to unassigned.
    pub fn cycle_assignee(&mut self, users: &[User]) {
        self.assignee_id = match self.assignee_id {
            None => users.first().map(|u| u.id),
            Some(current) => users
                .iter()
                .position(|u| u.id == current)
                .and_then(|i| users.get(i + 1))
                .map(|u| u.id),
        };
    }

    /// Build the persistence draft, or report what blocks the save. The
    /// status carries the placement; the store resolves the column from it.
    pub fn to_draft(&self) -> Result<TaskDraft, String> {
        if self.title_input.trim().is_empty() {
            return Err("Title is required".to_string());
        }
        for (label, raw) in [
            ("Request date", self.request_date_input.as_str()),
            ("Due date", self.due_date_input.as_str()),
        ] {
            let raw = raw.trim();
            if !raw.is_empty() && NaiveDate::parse_from_str(raw, DATE_FORMAT).is_err() {
                return Err(format!("{label} must use YYYY-MM-DD"));
            }
        }

        Ok(TaskDraft {
            title: self.title_input.trim().to_string(),
            description: blank_to_none(&self.description_input),
            status: self.status,
            priority: self.priority,
            kind: self.kind,
            assignee_id: self.assignee_id,
            client: blank_to_none(&self.client_input),
            request_date: blank_to_none(&self.request_date_input),
            due_date: blank_to_none(&self.due_date_input),
            observation: blank_to_none(&self.observation_input),
            external_ref: blank_to_none(&self.external_ref_input),
            column_id: None,
        })
    }

    /// Persist the form. Validation failures stay in the dialog and return
    /// None; store failures propagate. Publishes Created or Updated on
    /// success.
    pub fn save(&mut self, db: &Database, bus: &ChangeBus) -> Result<Option<Task>> {
        let draft = match self.to_draft() {
            Ok(draft) => draft,
            Err(message) => {
                self.error_message = Some(message);
                return Ok(None);
            }
        };
        self.error_message = None;

        let (task, operation) = match self.mode {
            EditorMode::Create => (db.create_task(&draft)?, TaskOperation::Created),
            EditorMode::Edit { task_id } => {
                (db.update_task(task_id, &draft)?, TaskOperation::Updated)
            }
        };
        bus.publish_task_change(task.id, operation);
        Ok(Some(task))
    }
}

fn field_index(field: TaskEditorField) -> usize {
    TaskEditorField::ALL
        .iter()
        .position(|f| *f == field)
        .unwrap_or(0)
}

fn cycle<T: Copy + PartialEq>(all: &[T], current: T) -> T {
    let index = all.iter().position(|v| *v == current).unwrap_or(0);
    all[(index + 1) % all.len()]
}

fn blank_to_none(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ConfirmCancelField {
    Confirm,
    Cancel,
}

/// Confirmation dialog shown before a task is deleted.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct DeleteTaskDialogState {
    pub task_id: Uuid,
    pub task_title: String,
    pub focused_field: ConfirmCancelField,
}

impl DeleteTaskDialogState {
    pub fn new(task: &Task) -> Self {
        Self {
            task_id: task.id,
            task_title: task.title.clone(),
            focused_field: ConfirmCancelField::Cancel,
        }
    }

    pub fn toggle_focus(&mut self) {
        self.focused_field = match self.focused_field {
            ConfirmCancelField::Confirm => ConfirmCancelField::Cancel,
            ConfirmCancelField::Cancel => ConfirmCancelField::Confirm,
        };
    }
}

/// Delete the task and publish the change.
pub fn delete_task(db: &Database, bus: &ChangeBus, task_id: Uuid) -> Result<()> {
    db.delete_task(task_id)?;
    bus.publish_task_change(task_id, TaskOperation::Deleted);
    Ok(())
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use chrono::NaiveDate;

    use super::*;
    use crate::events::ChangeEvent;
    use crate::types::Role;
    use crate::types::UserStatus;

    fn setup() -> Result<(Database, ChangeBus)> {
        Ok((Database::open(":memory:")?, ChangeBus::default()))
    }

    fn today() -> NaiveDate {
        NaiveDate::parse_from_str("2024-06-15", "%Y-%m-%d").expect("valid test date")
    }

    #[test]
    fn test_create_form_defaults() {
        let editor = TaskEditorState::for_create(today());
        assert_eq!(editor.mode, EditorMode::Create);
        assert_eq!(editor.status, Status::Pending);
        assert_eq!(editor.priority, Priority::Medium);
        assert_eq!(editor.request_date_input, "2024-06-15");
        assert_eq!(editor.focused_field, TaskEditorField::Title);
        assert!(editor.title_input.is_empty());
        assert!(editor.error_message.is_none());
    }

    #[test]
    fn test_edit_form_populates_from_task() -> Result<()> {
        let (db, _) = setup()?;
        let task = db.create_task(&TaskDraft {
            title: "Edit me".to_string(),
            description: Some("details".to_string()),
            status: Status::InProgress,
            priority: Priority::High,
            client: Some("Acme".to_string()),
            due_date: Some("2024-07-01".to_string()),
            ..TaskDraft::default()
        })?;

        let editor = TaskEditorState::for_edit(&task);
        assert_eq!(editor.mode, EditorMode::Edit { task_id: task.id });
        assert_eq!(editor.title_input, "Edit me");
        assert_eq!(editor.description_input, "details");
        assert_eq!(editor.status, Status::InProgress);
        assert_eq!(editor.priority, Priority::High);
        assert_eq!(editor.client_input, "Acme");
        assert_eq!(editor.due_date_input, "2024-07-01");

        Ok(())
    }

    #[test]
    fn test_blank_title_blocks_save_without_event() -> Result<()> {
        let (db, bus) = setup()?;
        let mut receiver = bus.subscribe();

        let mut editor = TaskEditorState::for_create(today());
        editor.title_input = "   ".to_string();

        let saved = editor.save(&db, &bus)?;
        assert!(saved.is_none());
        assert_eq!(editor.error_message.as_deref(), Some("Title is required"));
        assert!(receiver.try_recv().is_err());
        assert!(db.list_tasks()?.is_empty());

        Ok(())
    }

    #[test]
    fn test_malformed_date_blocks_save() -> Result<()> {
        let (db, bus) = setup()?;

        let mut editor = TaskEditorState::for_create(today());
        editor.title_input = "Dated".to_string();
        editor.due_date_input = "07/01/2024".to_string();

        let saved = editor.save(&db, &bus)?;
        assert!(saved.is_none());
        assert_eq!(
            editor.error_message.as_deref(),
            Some("Due date must use YYYY-MM-DD")
        );

        Ok(())
    }

    #[test]
    fn test_save_create_publishes_created() -> Result<()> {
        let (db, bus) = setup()?;
        let mut receiver = bus.subscribe();

        let mut editor = TaskEditorState::for_create(today());
        editor.title_input = "  New task  ".to_string();
        editor.cycle_priority();

        let task = editor.save(&db, &bus)?.expect("valid form should save");
        assert_eq!(task.title, "New task");
        assert_eq!(task.priority, Priority::High);
        assert_eq!(task.status, Status::Pending);
        assert_eq!(task.request_date.as_deref(), Some("2024-06-15"));

        assert_eq!(
            receiver.try_recv(),
            Ok(ChangeEvent::TaskChanged {
                task_id: task.id,
                operation: TaskOperation::Created,
            })
        );

        Ok(())
    }

    #[test]
    fn test_title_only_edit_keeps_other_fields() -> Result<()> {
        let (db, bus) = setup()?;
        let original = db.create_task(&TaskDraft {
            title: "Before".to_string(),
            description: Some("unchanged".to_string()),
            status: Status::Review,
            priority: Priority::Low,
            client: Some("Acme".to_string()),
            due_date: Some("2024-08-01".to_string()),
            ..TaskDraft::default()
        })?;

        let mut receiver = bus.subscribe();
        let mut editor = TaskEditorState::for_edit(&original);
        editor.title_input = "After".to_string();

        let updated = editor.save(&db, &bus)?.expect("edit should save");
        assert_eq!(updated.title, "After");
        assert_eq!(updated.description, original.description);
        assert_eq!(updated.status, original.status);
        assert_eq!(updated.priority, original.priority);
        assert_eq!(updated.client, original.client);
        assert_eq!(updated.due_date, original.due_date);
        assert_eq!(updated.column_id, original.column_id);

        assert_eq!(
            receiver.try_recv(),
            Ok(ChangeEvent::TaskChanged {
                task_id: original.id,
                operation: TaskOperation::Updated,
            })
        );

        Ok(())
    }

    #[test]
    fn test_status_edit_moves_task_between_columns() -> Result<()> {
        let (db, bus) = setup()?;
        let columns = db.list_columns()?;
        let task = db.create_task(&TaskDraft {
            title: "Mover".to_string(),
            ..TaskDraft::default()
        })?;
        assert_eq!(task.column_id, columns[0].id);

        let mut editor = TaskEditorState::for_edit(&task);
        editor.cycle_status();
        assert_eq!(editor.status, Status::InProgress);

        let updated = editor.save(&db, &bus)?.expect("edit should save");
        assert_eq!(updated.status, Status::InProgress);
        assert_eq!(updated.column_id, columns[1].id);

        Ok(())
    }

    #[test]
    fn test_delete_publishes_deleted() -> Result<()> {
        let (db, bus) = setup()?;
        let mut receiver = bus.subscribe();
        let task = db.create_task(&TaskDraft {
            title: "Doomed".to_string(),
            ..TaskDraft::default()
        })?;

        delete_task(&db, &bus, task.id)?;
        assert!(db.get_task(task.id).is_err());
        assert_eq!(
            receiver.try_recv(),
            Ok(ChangeEvent::TaskChanged {
                task_id: task.id,
                operation: TaskOperation::Deleted,
            })
        );

        Ok(())
    }

    #[test]
    fn test_focus_cycles_through_all_fields_and_wraps() {
        let mut editor = TaskEditorState::for_create(today());
        for expected in TaskEditorField::ALL.iter().skip(1) {
            editor.focus_next();
            assert_eq!(editor.focused_field, *expected);
        }
        editor.focus_next();
        assert_eq!(editor.focused_field, TaskEditorField::Title);

        editor.focus_prev();
        assert_eq!(editor.focused_field, TaskEditorField::Cancel);
    }

    #[test]
    fn test_cycle_assignee_walks_users_then_clears() -> Result<()> {
        let (db, _) = setup()?;
        let ana = db.create_user(
            "ana@example.com",
            Some("Ana".to_string()),
            "hash",
            Role::User,
            UserStatus::Active,
        )?;
        let bruno = db.create_user(
            "bruno@example.com",
            None,
            "hash",
            Role::User,
            UserStatus::Active,
        )?;
        let users = vec![ana.clone(), bruno.clone()];

        let mut editor = TaskEditorState::for_create(today());
        editor.cycle_assignee(&users);
        assert_eq!(editor.assignee_id, Some(ana.id));
        editor.cycle_assignee(&users);
        assert_eq!(editor.assignee_id, Some(bruno.id));
        editor.cycle_assignee(&users);
        assert_eq!(editor.assignee_id, None);

        Ok(())
    }

    #[test]
    fn test_delete_dialog_defaults_to_cancel() -> Result<()> {
        let (db, _) = setup()?;
        let task = db.create_task(&TaskDraft {
            title: "Careful".to_string(),
            ..TaskDraft::default()
        })?;

        let mut dialog = DeleteTaskDialogState::new(&task);
        assert_eq!(dialog.task_title, "Careful");
        assert_eq!(dialog.focused_field, ConfirmCancelField::Cancel);

        dialog.toggle_focus();
        assert_eq!(dialog.focused_field, ConfirmCancelField::Confirm);

        Ok(())
    }
}
