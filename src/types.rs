#![allow(dead_code)]

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub display_name: Option<String>,
    pub role: Role,
    pub status: UserStatus,
    pub created_at: String,
    pub updated_at: String,
}

impl User {
    /// Display name, falling back to the local part of the email address.
    pub fn name(&self) -> &str {
        match self.display_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => self.email.split('@').next().unwrap_or(&self.email),
        }
    }

    pub fn is_online(&self) -> bool {
        self.status == UserStatus::Active
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct Column {
    pub id: Uuid,
    pub title: String,
    pub column_type: Option<Status>,
    pub position: i64,
    pub created_at: String,
}

impl Column {
    /// Status a task acquires when it lands in this column. Columns missing
    /// an explicit type fall back to a fixed positional mapping.
    pub fn derived_status(&self) -> Status {
        self.column_type
            .unwrap_or_else(|| Status::from_position(self.position))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct Task {
    pub id: Uuid,
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
    pub column_id: Uuid,
    pub completed: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct ChatMessage {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub body: String,
    pub read: bool,
    pub created_at: String,
}

/// Per-command usage stats backing the command palette ranking.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct CommandFrequency {
    pub command_id: String,
    pub use_count: i64,
    pub last_used: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    Pending,
    InProgress,
    Review,
    Completed,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::InProgress => "in_progress",
            Status::Review => "review",
            Status::Completed => "completed",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Status::Pending => "Pending",
            Status::InProgress => "In Progress",
            Status::Review => "In Review",
            Status::Completed => "Completed",
        }
    }

    /// Positional fallback for columns that carry no explicit type.
    pub fn from_position(position: i64) -> Self {
        match position {
            1 => Status::Pending,
            2 => Status::InProgress,
            3 => Status::Review,
            4 => Status::Completed,
            _ => Status::Pending,
        }
    }

    pub const ALL: [Status; 4] = [
        Status::Pending,
        Status::InProgress,
        Status::Review,
        Status::Completed,
    ];
}

impl FromStr for Status {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Status::Pending),
            "in_progress" => Ok(Status::InProgress),
            "review" => Ok(Status::Review),
            "completed" => Ok(Status::Completed),
            _ => Err(()),
        }
    }
}

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq, Ord, PartialOrd, Hash, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }

    /// Rank used for table sorting, ascending from least urgent.
    pub fn rank(self) -> u8 {
        match self {
            Priority::Low => 0,
            Priority::Medium => 1,
            Priority::High => 2,
        }
    }

    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];
}

impl FromStr for Priority {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    #[default]
    Task,
    Bug,
    Feature,
    Improvement,
}

impl TaskKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskKind::Task => "task",
            TaskKind::Bug => "bug",
            TaskKind::Feature => "feature",
            TaskKind::Improvement => "improvement",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TaskKind::Task => "Task",
            TaskKind::Bug => "Bug",
            TaskKind::Feature => "Feature",
            TaskKind::Improvement => "Improvement",
        }
    }

    pub const ALL: [TaskKind; 4] = [
        TaskKind::Task,
        TaskKind::Bug,
        TaskKind::Feature,
        TaskKind::Improvement,
    ];
}

impl FromStr for TaskKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "task" => Ok(TaskKind::Task),
            "bug" => Ok(TaskKind::Bug),
            "feature" => Ok(TaskKind::Feature),
            "improvement" => Ok(TaskKind::Improvement),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    User,
    Manager,
    Admin,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::User, Role::Manager, Role::Admin];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Manager => "manager",
            Role::Admin => "admin",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Manager => "Manager",
            Role::Admin => "Admin",
        }
    }
}

impl FromStr for Role {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" => Ok(Role::User),
            "manager" => Ok(Role::Manager),
            "admin" => Ok(Role::Admin),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    Active,
    Inactive,
    #[default]
    Pending,
}

impl UserStatus {
    pub const ALL: [UserStatus; 3] = [
        UserStatus::Active,
        UserStatus::Inactive,
        UserStatus::Pending,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            UserStatus::Active => "active",
            UserStatus::Inactive => "inactive",
            UserStatus::Pending => "pending",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            UserStatus::Active => "Active",
            UserStatus::Inactive => "Inactive",
            UserStatus::Pending => "Pending",
        }
    }
}

impl FromStr for UserStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(UserStatus::Active),
            "inactive" => Ok(UserStatus::Inactive),
            "pending" => Ok(UserStatus::Pending),
            _ => Err(()),
        }
    }
}

/// Due-date classification relative to the current date, date-only.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq)]
pub enum Urgency {
    Overdue,
    DueToday,
    Upcoming,
    None,
}

impl Urgency {
    pub fn as_str(self) -> &'static str {
        match self {
            Urgency::Overdue => "overdue",
            Urgency::DueToday => "due-today",
            Urgency::Upcoming => "upcoming",
            Urgency::None => "none",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_roundtrip() {
        for status in Status::ALL {
            assert_eq!(Status::from_str(status.as_str()), Ok(status));
        }
        assert_eq!(Status::from_str("  In_Progress  "), Ok(Status::InProgress));
        assert_eq!(Status::from_str("unknown"), Err(()));
        assert_eq!(Status::from_str(""), Err(()));
    }

    #[test]
    fn test_status_from_position() {
        assert_eq!(Status::from_position(1), Status::Pending);
        assert_eq!(Status::from_position(2), Status::InProgress);
        assert_eq!(Status::from_position(3), Status::Review);
        assert_eq!(Status::from_position(4), Status::Completed);
        assert_eq!(Status::from_position(0), Status::Pending);
        assert_eq!(Status::from_position(99), Status::Pending);
    }

    #[test]
    fn test_priority_rank_order() {
        assert!(Priority::Low.rank() < Priority::Medium.rank());
        assert!(Priority::Medium.rank() < Priority::High.rank());
    }

    #[test]
    fn test_priority_roundtrip() {
        for priority in Priority::ALL {
            assert_eq!(Priority::from_str(priority.as_str()), Ok(priority));
        }
        assert_eq!(Priority::from_str("HIGH"), Ok(Priority::High));
        assert_eq!(Priority::from_str("urgent"), Err(()));
    }

    #[test]
    fn test_task_kind_roundtrip() {
        for kind in TaskKind::ALL {
            assert_eq!(TaskKind::from_str(kind.as_str()), Ok(kind));
        }
        assert_eq!(TaskKind::from_str("chore"), Err(()));
    }

    #[test]
    fn test_role_and_user_status_parse() {
        assert_eq!(Role::from_str("admin"), Ok(Role::Admin));
        assert_eq!(Role::from_str("Manager"), Ok(Role::Manager));
        assert_eq!(Role::from_str("root"), Err(()));
        assert_eq!(UserStatus::from_str("active"), Ok(UserStatus::Active));
        assert_eq!(UserStatus::from_str("Inactive"), Ok(UserStatus::Inactive));
        assert_eq!(UserStatus::from_str("banned"), Err(()));
    }

    #[test]
    fn test_user_name_fallback() {
        let mut user = User {
            id: Uuid::new_v4(),
            email: "ana.souza@example.com".to_string(),
            display_name: None,
            role: Role::User,
            status: UserStatus::Active,
            created_at: "2024-01-01".to_string(),
            updated_at: "2024-01-01".to_string(),
        };
        assert_eq!(user.name(), "ana.souza");

        user.display_name = Some("Ana Souza".to_string());
        assert_eq!(user.name(), "Ana Souza");

        user.display_name = Some("   ".to_string());
        assert_eq!(user.name(), "ana.souza");
    }

    #[test]
    fn test_user_is_online() {
        let mut user = User {
            id: Uuid::new_v4(),
            email: "x@example.com".to_string(),
            display_name: None,
            role: Role::User,
            status: UserStatus::Active,
            created_at: "2024-01-01".to_string(),
            updated_at: "2024-01-01".to_string(),
        };
        assert!(user.is_online());
        user.status = UserStatus::Inactive;
        assert!(!user.is_online());
        user.status = UserStatus::Pending;
        assert!(!user.is_online());
    }

    #[test]
    fn test_column_derived_status_explicit_and_fallback() {
        let mut column = Column {
            id: Uuid::new_v4(),
            title: "In Review".to_string(),
            column_type: Some(Status::Review),
            position: 1,
            created_at: "2024-01-01".to_string(),
        };
        assert_eq!(column.derived_status(), Status::Review);

        column.column_type = None;
        assert_eq!(column.derived_status(), Status::Pending);
        column.position = 3;
        assert_eq!(column.derived_status(), Status::Review);
    }

    #[test]
    fn test_task_struct_creation() {
        let task = Task {
            id: Uuid::new_v4(),
            title: "Fix invoice export".to_string(),
            description: None,
            status: Status::Pending,
            priority: Priority::Medium,
            kind: TaskKind::Bug,
            assignee_id: None,
            client: Some("Acme".to_string()),
            request_date: Some("2024-01-01".to_string()),
            due_date: None,
            observation: None,
            external_ref: None,
            column_id: Uuid::new_v4(),
            completed: false,
            created_at: "2024-01-01".to_string(),
            updated_at: "2024-01-02".to_string(),
        };
        assert_eq!(task.title, "Fix invoice export");
        assert!(!task.completed);
    }

    #[test]
    fn test_chat_message_struct_creation() {
        let message = ChatMessage {
            id: Uuid::new_v4(),
            sender_id: Uuid::new_v4(),
            receiver_id: Uuid::new_v4(),
            body: "ping".to_string(),
            read: false,
            created_at: "2024-01-01T00:00:00Z".to_string(),
        };
        assert_eq!(message.body, "ping");
        assert!(!message.read);
    }
}
