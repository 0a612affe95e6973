use std::{
    collections::{HashMap, HashSet},
    path::Path,
    str::FromStr,
};

use chrono::NaiveDate;
use clap::{Args, Subcommand};
use serde_json::{Value, json};
use tracing::error;
use uuid::Uuid;

use crate::{
    auth,
    db::{Database, TaskDraft},
    types::{ChatMessage, Column, Priority, Role, Status, Task, TaskKind, User, UserStatus},
};

const SCHEMA_VERSION: &str = "cli.v1";

#[derive(Debug, Clone, Subcommand)]
pub enum RootCommand {
    Task {
        #[command(subcommand)]
        command: TaskCommand,
    },
    Column {
        #[command(subcommand)]
        command: ColumnCommand,
    },
    User {
        #[command(subcommand)]
        command: UserCommand,
    },
    Message {
        #[command(subcommand)]
        command: MessageCommand,
    },
    Auth {
        #[command(subcommand)]
        command: AuthCommand,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum TaskCommand {
    List(TaskListArgs),
    Create(TaskCreateArgs),
    Update(TaskUpdateArgs),
    Move(TaskMoveArgs),
    Complete(TaskCompleteArgs),
    Delete(TaskDeleteArgs),
    Show(TaskShowArgs),
}

#[derive(Debug, Clone, Subcommand)]
pub enum ColumnCommand {
    List,
    Create(ColumnCreateArgs),
}

#[derive(Debug, Clone, Subcommand)]
pub enum UserCommand {
    List,
    Create(UserCreateArgs),
    SetRole(UserSetRoleArgs),
    SetStatus(UserSetStatusArgs),
}

#[derive(Debug, Clone, Subcommand)]
pub enum MessageCommand {
    Send(MessageSendArgs),
    Conversation(MessageConversationArgs),
    Unread(MessageUnreadArgs),
}

#[derive(Debug, Clone, Args)]
#[group(id = "column_selector", multiple = false)]
pub struct OptionalColumnSelectorArgs {
    #[arg(long, value_name = "UUID", group = "column_selector")]
    pub column_id: Option<Uuid>,

    #[arg(long, value_name = "TITLE", group = "column_selector")]
    pub column_title: Option<String>,
}

#[derive(Debug, Clone, Args)]
#[group(id = "column_selector", required = true, multiple = false)]
pub struct RequiredColumnSelectorArgs {
    #[arg(long, value_name = "UUID", group = "column_selector")]
    pub column_id: Option<Uuid>,

    #[arg(long, value_name = "TITLE", group = "column_selector")]
    pub column_title: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct TaskListArgs {
    #[command(flatten)]
    pub selector: OptionalColumnSelectorArgs,

    #[arg(long, value_name = "STATUS")]
    pub status: Option<String>,

    #[arg(long, value_name = "EMAIL")]
    pub assignee: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct TaskCreateArgs {
    #[arg(long, value_name = "TEXT")]
    pub title: String,

    #[arg(long, value_name = "TEXT")]
    pub description: Option<String>,

    #[arg(long, value_name = "STATUS")]
    pub status: Option<String>,

    #[arg(long, value_name = "PRIORITY")]
    pub priority: Option<String>,

    #[arg(long, value_name = "KIND")]
    pub kind: Option<String>,

    #[arg(long, value_name = "EMAIL")]
    pub assignee: Option<String>,

    #[arg(long, value_name = "TEXT")]
    pub client: Option<String>,

    #[arg(long, value_name = "YYYY-MM-DD")]
    pub request_date: Option<String>,

    #[arg(long, value_name = "YYYY-MM-DD")]
    pub due_date: Option<String>,

    #[arg(long, value_name = "TEXT")]
    pub observation: Option<String>,

    #[arg(long, value_name = "REF")]
    pub external_ref: Option<String>,

    #[command(flatten)]
    pub selector: OptionalColumnSelectorArgs,
}

/// Partial update: omitted flags keep the stored value, blank values
/// clear nullable fields.
#[derive(Debug, Clone, Args)]
pub struct TaskUpdateArgs {
    #[arg(long, value_name = "TASK_ID")]
    pub id: String,

    #[arg(long, value_name = "TEXT")]
    pub title: Option<String>,

    #[arg(long, value_name = "TEXT")]
    pub description: Option<String>,

    #[arg(long, value_name = "STATUS")]
    pub status: Option<String>,

    #[arg(long, value_name = "PRIORITY")]
    pub priority: Option<String>,

    #[arg(long, value_name = "KIND")]
    pub kind: Option<String>,

    #[arg(long, value_name = "EMAIL")]
    pub assignee: Option<String>,

    #[arg(long, value_name = "TEXT")]
    pub client: Option<String>,

    #[arg(long, value_name = "YYYY-MM-DD")]
    pub request_date: Option<String>,

    #[arg(long, value_name = "YYYY-MM-DD")]
    pub due_date: Option<String>,

    #[arg(long, value_name = "TEXT")]
    pub observation: Option<String>,

    #[arg(long, value_name = "REF")]
    pub external_ref: Option<String>,

    #[command(flatten)]
    pub selector: OptionalColumnSelectorArgs,
}

#[derive(Debug, Clone, Args)]
pub struct TaskMoveArgs {
    #[arg(long, value_name = "TASK_ID")]
    pub id: String,

    #[command(flatten)]
    pub selector: RequiredColumnSelectorArgs,
}

#[derive(Debug, Clone, Args)]
pub struct TaskCompleteArgs {
    #[arg(long, value_name = "TASK_ID")]
    pub id: String,
}

#[derive(Debug, Clone, Args)]
pub struct TaskDeleteArgs {
    #[arg(long, value_name = "TASK_ID")]
    pub id: String,
}

#[derive(Debug, Clone, Args)]
pub struct TaskShowArgs {
    #[arg(long, value_name = "TASK_ID")]
    pub id: String,
}

#[derive(Debug, Clone, Args)]
pub struct ColumnCreateArgs {
    #[arg(long, value_name = "TEXT")]
    pub title: String,

    #[arg(long, value_name = "STATUS")]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct UserCreateArgs {
    #[arg(long, value_name = "EMAIL")]
    pub email: String,

    #[arg(long, value_name = "PASSWORD")]
    pub password: String,

    #[arg(long, value_name = "TEXT")]
    pub name: Option<String>,

    #[arg(long, value_name = "ROLE")]
    pub role: Option<String>,

    #[arg(long, value_name = "STATUS")]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct UserSetRoleArgs {
    #[arg(long, value_name = "USER")]
    pub user: String,

    #[arg(long, value_name = "ROLE")]
    pub role: String,
}

#[derive(Debug, Clone, Args)]
pub struct UserSetStatusArgs {
    #[arg(long, value_name = "USER")]
    pub user: String,

    #[arg(long, value_name = "STATUS")]
    pub status: String,
}

#[derive(Debug, Clone, Args)]
pub struct MessageSendArgs {
    #[arg(long, value_name = "USER")]
    pub from: String,

    #[arg(long, value_name = "USER")]
    pub to: String,

    #[arg(long, value_name = "TEXT")]
    pub body: String,
}

#[derive(Debug, Clone, Args)]
pub struct MessageConversationArgs {
    #[arg(long, value_name = "USER")]
    pub between: String,

    #[arg(long, value_name = "USER")]
    pub and: String,
}

#[derive(Debug, Clone, Args)]
pub struct MessageUnreadArgs {
    #[arg(long, value_name = "USER")]
    pub user: String,
}

#[derive(Debug, Clone, Subcommand)]
pub enum AuthCommand {
    Register(AuthRegisterArgs),
    Login(AuthLoginArgs),
    Logout,
    Whoami,
}

#[derive(Debug, Clone, Args)]
pub struct AuthRegisterArgs {
    #[arg(long, value_name = "EMAIL")]
    pub email: String,

    #[arg(long, value_name = "TEXT")]
    pub name: Option<String>,

    #[arg(long, value_name = "TEXT")]
    pub password: String,

    /// Defaults to the password when omitted.
    #[arg(long, value_name = "TEXT")]
    pub confirm: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct AuthLoginArgs {
    #[arg(long, value_name = "EMAIL")]
    pub email: String,

    #[arg(long, value_name = "TEXT")]
    pub password: String,
}

pub fn run(db_path: &Path, command: RootCommand, json_output: bool, quiet: bool) -> i32 {
    match execute(db_path, command) {
        Ok(output) => {
            print_success(output, json_output, quiet);
            0
        }
        Err(err) => {
            print_error(&err, json_output);
            err.exit_code
        }
    }
}

#[derive(Debug)]
struct CommandOutput {
    command: &'static str,
    data: Value,
    text: String,
}

#[derive(Debug)]
struct CliError {
    exit_code: i32,
    code: &'static str,
    message: String,
    details: Option<Value>,
}

type CliResult<T> = Result<T, CliError>;

fn execute(db_path: &Path, command: RootCommand) -> CliResult<CommandOutput> {
    let db = Database::open(db_path).map_err(runtime_error)?;

    match command {
        RootCommand::Task { command } => execute_task_command(&db, command),
        RootCommand::Column { command } => execute_column_command(&db, command),
        RootCommand::User { command } => execute_user_command(&db, command),
        RootCommand::Message { command } => execute_message_command(&db, command),
        RootCommand::Auth { command } => execute_auth_command(&db, command),
    }
}

fn execute_task_command(db: &Database, command: TaskCommand) -> CliResult<CommandOutput> {
    match command {
        TaskCommand::List(args) => task_list(db, args),
        TaskCommand::Create(args) => task_create(db, args),
        TaskCommand::Update(args) => task_update(db, args),
        TaskCommand::Move(args) => task_move(db, args),
        TaskCommand::Complete(args) => task_complete(db, args),
        TaskCommand::Delete(args) => task_delete(db, args),
        TaskCommand::Show(args) => task_show(db, args),
    }
}

fn execute_column_command(db: &Database, command: ColumnCommand) -> CliResult<CommandOutput> {
    match command {
        ColumnCommand::List => column_list(db),
        ColumnCommand::Create(args) => column_create(db, args),
    }
}

fn execute_user_command(db: &Database, command: UserCommand) -> CliResult<CommandOutput> {
    match command {
        UserCommand::List => user_list(db),
        UserCommand::Create(args) => user_create(db, args),
        UserCommand::SetRole(args) => user_set_role(db, args),
        UserCommand::SetStatus(args) => user_set_status(db, args),
    }
}

fn execute_message_command(db: &Database, command: MessageCommand) -> CliResult<CommandOutput> {
    match command {
        MessageCommand::Send(args) => message_send(db, args),
        MessageCommand::Conversation(args) => message_conversation(db, args),
        MessageCommand::Unread(args) => message_unread(db, args),
    }
}

fn execute_auth_command(db: &Database, command: AuthCommand) -> CliResult<CommandOutput> {
    match command {
        AuthCommand::Register(args) => auth_register(db, args),
        AuthCommand::Login(args) => auth_login(db, args),
        AuthCommand::Logout => auth_logout(),
        AuthCommand::Whoami => auth_whoami(db),
    }
}

fn auth_register(db: &Database, args: AuthRegisterArgs) -> CliResult<CommandOutput> {
    let confirmation = args.confirm.as_deref().unwrap_or(&args.password);
    auth::validate_registration(&args.email, &args.password, confirmation)
        .map_err(|message| usage_error("INVALID_REGISTRATION", message))?;

    let hash = auth::hash_password(&args.password).map_err(runtime_error)?;
    let created = db
        .create_user(
            &args.email,
            blank_to_none(args.name),
            hash,
            Role::User,
            UserStatus::Pending,
        )
        .map_err(classify_db_error)?;

    let data = json!({ "user": user_json(&created) });
    Ok(CommandOutput {
        command: "auth register",
        data,
        text: format!("registered {} (pending approval)", created.email),
    })
}

fn auth_login(db: &Database, args: AuthLoginArgs) -> CliResult<CommandOutput> {
    let user = auth::login(db, &args.email, &args.password)
        .map_err(|err| usage_error("INVALID_CREDENTIALS", err.to_string()))?;

    let session = auth::Session::for_user(&user);
    session.save().map_err(runtime_error)?;

    let data = json!({
        "user": user_json(&user),
        "logged_in_at": session.logged_in_at
    });
    Ok(CommandOutput {
        command: "auth login",
        data,
        text: format!("logged in as {}", user.email),
    })
}

fn auth_logout() -> CliResult<CommandOutput> {
    auth::Session::clear().map_err(runtime_error)?;
    Ok(CommandOutput {
        command: "auth logout",
        data: json!({ "cleared": true }),
        text: "logged out".to_string(),
    })
}

fn auth_whoami(db: &Database) -> CliResult<CommandOutput> {
    let Some(session) = auth::Session::load() else {
        return Err(not_found_error(
            "NOT_LOGGED_IN",
            "no active session; run 'teamboard auth login'",
        ));
    };

    let Some(user) = session.validate(db).map_err(runtime_error)? else {
        return Err(not_found_error(
            "SESSION_INVALID",
            "session no longer matches an active user; run 'teamboard auth login'",
        ));
    };

    let data = json!({
        "user": user_json(&user),
        "logged_in_at": session.logged_in_at
    });
    Ok(CommandOutput {
        command: "auth whoami",
        data,
        text: format!("{} ({})", user.email, user.role.as_str()),
    })
}

fn column_list(db: &Database) -> CliResult<CommandOutput> {
    let columns = db.list_columns().map_err(runtime_error)?;
    let data = json!({
        "columns": columns.iter().map(column_json).collect::<Vec<_>>()
    });
    let text = render_column_list_text(&columns);

    Ok(CommandOutput {
        command: "column list",
        data,
        text,
    })
}

fn render_column_list_text(columns: &[Column]) -> String {
    if columns.is_empty() {
        return "No columns found.".to_string();
    }

    let headers = ["ID", "Title", "Status", "Pos"];
    let rows = columns
        .iter()
        .map(|column| {
            let id = column.id.to_string();
            let short_id = id.chars().take(8).collect::<String>();
            let status = column
                .column_type
                .map(|status| status.as_str().to_string())
                .unwrap_or_else(|| "-".to_string());

            vec![
                short_id,
                column.title.replace('\n', " "),
                status,
                column.position.to_string(),
            ]
        })
        .collect::<Vec<_>>();

    render_text_table(&headers, &rows)
}

fn column_create(db: &Database, args: ColumnCreateArgs) -> CliResult<CommandOutput> {
    let column_type = args
        .status
        .as_deref()
        .map(parse_status)
        .transpose()?;

    let position = db
        .list_columns()
        .map_err(runtime_error)?
        .into_iter()
        .map(|column| column.position)
        .max()
        .unwrap_or(0)
        + 1;

    let created = db
        .add_column(&args.title, column_type, position)
        .map_err(classify_db_error)?;
    let data = json!({ "column": column_json(&created) });

    Ok(CommandOutput {
        command: "column create",
        data,
        text: format!("created column {} ({})", created.title, created.id),
    })
}

fn task_list(db: &Database, args: TaskListArgs) -> CliResult<CommandOutput> {
    let columns = db.list_columns().map_err(runtime_error)?;
    let column_by_id: HashMap<Uuid, Column> = columns
        .into_iter()
        .map(|column| (column.id, column))
        .collect();

    let users = db.list_users().map_err(runtime_error)?;
    let user_by_id: HashMap<Uuid, User> = users.into_iter().map(|user| (user.id, user)).collect();

    let column_filter_id = resolve_optional_column_selector(
        db,
        args.selector.column_id,
        args.selector.column_title.as_deref(),
    )?;
    let status_filter = args.status.as_deref().map(parse_status).transpose()?;
    let assignee_filter_id = match args.assignee.as_deref() {
        Some(selector) => Some(resolve_user_selector(db, selector)?.id),
        None => None,
    };

    let tasks = db.list_tasks().map_err(runtime_error)?;
    let filtered: Vec<Task> = tasks
        .into_iter()
        .filter(|task| {
            column_filter_id.is_none_or(|column_id| task.column_id == column_id)
                && status_filter.is_none_or(|status| task.status == status)
                && assignee_filter_id.is_none_or(|user_id| task.assignee_id == Some(user_id))
        })
        .collect();

    let data = json!({
        "tasks": filtered
            .iter()
            .map(|task| task_json(task, &column_by_id, &user_by_id))
            .collect::<Vec<_>>()
    });

    let text = render_task_list_text(&filtered, &column_by_id, &user_by_id);

    Ok(CommandOutput {
        command: "task list",
        data,
        text,
    })
}

fn render_task_list_text(
    tasks: &[Task],
    column_by_id: &HashMap<Uuid, Column>,
    user_by_id: &HashMap<Uuid, User>,
) -> String {
    if tasks.is_empty() {
        return "No tasks found.".to_string();
    }

    let headers = ["ID", "Column", "Priority", "Due", "Assignee", "Title"];
    let rows = tasks
        .iter()
        .map(|task| {
            let column_label = column_by_id
                .get(&task.column_id)
                .map(|column| column.title.clone())
                .unwrap_or_else(|| "unknown".to_string());
            let assignee = task
                .assignee_id
                .and_then(|id| user_by_id.get(&id))
                .map(|user| user.name().to_string())
                .unwrap_or_else(|| "-".to_string());
            let id = task.id.to_string();
            let short_id = id.chars().take(8).collect::<String>();
            let due = task.due_date.clone().unwrap_or_else(|| "-".to_string());
            let title = task.title.replace('\n', " ");

            vec![
                short_id,
                column_label,
                task.priority.as_str().to_string(),
                due,
                assignee,
                title,
            ]
        })
        .collect::<Vec<_>>();

    render_text_table(&headers, &rows)
}

fn render_text_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths = headers
        .iter()
        .map(|header| header.chars().count())
        .collect::<Vec<_>>();

    for row in rows {
        for (index, cell) in row.iter().enumerate() {
            let width = cell.chars().count();
            if width > widths[index] {
                widths[index] = width;
            }
        }
    }

    let border = format!(
        "+{}+",
        widths
            .iter()
            .map(|width| "-".repeat(*width + 2))
            .collect::<Vec<_>>()
            .join("+")
    );

    let mut lines = Vec::new();
    lines.push(border.clone());
    lines.push(format!(
        "| {} |",
        headers
            .iter()
            .enumerate()
            .map(|(index, header)| format!("{header:<width$}", width = widths[index]))
            .collect::<Vec<_>>()
            .join(" | ")
    ));
    lines.push(border.clone());

    for row in rows {
        lines.push(format!(
            "| {} |",
            row.iter()
                .enumerate()
                .map(|(index, cell)| format!("{cell:<width$}", width = widths[index]))
                .collect::<Vec<_>>()
                .join(" | ")
        ));
    }

    lines.push(border);
    lines.join("\n")
}

fn task_create(db: &Database, args: TaskCreateArgs) -> CliResult<CommandOutput> {
    if args.title.trim().is_empty() {
        return Err(usage_error("TITLE_REQUIRED", "title cannot be empty"));
    }

    let status = args
        .status
        .as_deref()
        .map(parse_status)
        .transpose()?
        .unwrap_or_default();
    let priority = args
        .priority
        .as_deref()
        .map(parse_priority)
        .transpose()?
        .unwrap_or_default();
    let kind = args
        .kind
        .as_deref()
        .map(parse_kind)
        .transpose()?
        .unwrap_or_default();

    let assignee_id = match args.assignee.as_deref() {
        Some(selector) => Some(resolve_user_selector(db, selector)?.id),
        None => None,
    };

    let column_id = resolve_optional_column_selector(
        db,
        args.selector.column_id,
        args.selector.column_title.as_deref(),
    )?;

    let request_date = validate_date_arg("request-date", args.request_date)?;
    let due_date = validate_date_arg("due-date", args.due_date)?;

    let draft = TaskDraft {
        title: args.title.trim().to_string(),
        description: blank_to_none(args.description),
        status,
        priority,
        kind,
        assignee_id,
        client: blank_to_none(args.client),
        request_date,
        due_date,
        observation: blank_to_none(args.observation),
        external_ref: blank_to_none(args.external_ref),
        column_id,
    };

    let created = db.create_task(&draft).map_err(classify_db_error)?;
    let (column_by_id, user_by_id) = task_lookup_maps(db)?;

    let data = json!({ "task": task_json(&created, &column_by_id, &user_by_id) });
    Ok(CommandOutput {
        command: "task create",
        data,
        text: format!("created task {} ({})", created.title, created.id),
    })
}

fn task_update(db: &Database, args: TaskUpdateArgs) -> CliResult<CommandOutput> {
    let task_id = resolve_task_id_selector(db, &args.id)?;
    let current = db
        .get_task(task_id)
        .map_err(|err| task_lookup_error(task_id, err.to_string()))?;

    let title = match args.title {
        Some(title) if title.trim().is_empty() => {
            return Err(usage_error("TITLE_REQUIRED", "title cannot be empty"));
        }
        Some(title) => title.trim().to_string(),
        None => current.title.clone(),
    };

    let status = args.status.as_deref().map(parse_status).transpose()?;
    let priority = args
        .priority
        .as_deref()
        .map(parse_priority)
        .transpose()?
        .unwrap_or(current.priority);
    let kind = args
        .kind
        .as_deref()
        .map(parse_kind)
        .transpose()?
        .unwrap_or(current.kind);

    let assignee_id = match args.assignee.as_deref() {
        Some(selector) if selector.trim().is_empty() => None,
        Some(selector) => Some(resolve_user_selector(db, selector)?.id),
        None => current.assignee_id,
    };

    let explicit_column = resolve_optional_column_selector(
        db,
        args.selector.column_id,
        args.selector.column_title.as_deref(),
    )?;
    // A status change without an explicit column leaves column_id unset so
    // the store re-resolves it and the pair stays consistent.
    let column_id = match (explicit_column, status) {
        (Some(column), _) => Some(column),
        (None, Some(_)) => None,
        (None, None) => Some(current.column_id),
    };

    let request_date = match args.request_date {
        Some(value) => validate_date_arg("request-date", Some(value))?,
        None => current.request_date.clone(),
    };
    let due_date = match args.due_date {
        Some(value) => validate_date_arg("due-date", Some(value))?,
        None => current.due_date.clone(),
    };

    let draft = TaskDraft {
        title,
        description: args.description.map_or(current.description.clone(), |v| {
            blank_to_none(Some(v))
        }),
        status: status.unwrap_or(current.status),
        priority,
        kind,
        assignee_id,
        client: args.client.map_or(current.client.clone(), |v| {
            blank_to_none(Some(v))
        }),
        request_date,
        due_date,
        observation: args.observation.map_or(current.observation.clone(), |v| {
            blank_to_none(Some(v))
        }),
        external_ref: args.external_ref.map_or(current.external_ref.clone(), |v| {
            blank_to_none(Some(v))
        }),
        column_id,
    };

    let updated = db.update_task(task_id, &draft).map_err(classify_db_error)?;
    let (column_by_id, user_by_id) = task_lookup_maps(db)?;

    let data = json!({ "task": task_json(&updated, &column_by_id, &user_by_id) });
    Ok(CommandOutput {
        command: "task update",
        data,
        text: format!("updated task {} ({})", updated.title, updated.id),
    })
}

fn task_move(db: &Database, args: TaskMoveArgs) -> CliResult<CommandOutput> {
    let task_id = resolve_task_id_selector(db, &args.id)?;
    let target_column_id = resolve_required_column_selector(
        db,
        args.selector.column_id,
        args.selector.column_title.as_deref(),
    )?;

    db.get_task(task_id)
        .map_err(|err| task_lookup_error(task_id, err.to_string()))?;
    let moved = db
        .move_task(task_id, target_column_id)
        .map_err(classify_db_error)?;

    let (column_by_id, user_by_id) = task_lookup_maps(db)?;
    let column_title = column_by_id
        .get(&moved.column_id)
        .map(|column| column.title.clone())
        .unwrap_or_else(|| moved.column_id.to_string());

    let data = json!({ "task": task_json(&moved, &column_by_id, &user_by_id) });
    Ok(CommandOutput {
        command: "task move",
        data,
        text: format!("moved task {} to {}", moved.id, column_title),
    })
}

fn task_complete(db: &Database, args: TaskCompleteArgs) -> CliResult<CommandOutput> {
    let task_id = resolve_task_id_selector(db, &args.id)?;
    db.get_task(task_id)
        .map_err(|err| task_lookup_error(task_id, err.to_string()))?;

    let completed = db.complete_task(task_id).map_err(classify_db_error)?;
    let (column_by_id, user_by_id) = task_lookup_maps(db)?;

    let data = json!({ "task": task_json(&completed, &column_by_id, &user_by_id) });
    Ok(CommandOutput {
        command: "task complete",
        data,
        text: format!("completed task {}", completed.id),
    })
}

fn task_delete(db: &Database, args: TaskDeleteArgs) -> CliResult<CommandOutput> {
    let task_id = resolve_task_id_selector(db, &args.id)?;
    db.get_task(task_id)
        .map_err(|err| task_lookup_error(task_id, err.to_string()))?;
    db.delete_task(task_id).map_err(classify_db_error)?;

    let data = json!({ "deleted": true, "task_id": task_id });
    Ok(CommandOutput {
        command: "task delete",
        data,
        text: format!("deleted task {}", task_id),
    })
}

fn task_show(db: &Database, args: TaskShowArgs) -> CliResult<CommandOutput> {
    let task_id = resolve_task_id_selector(db, &args.id)?;
    let task = db
        .get_task(task_id)
        .map_err(|err| task_lookup_error(task_id, err.to_string()))?;
    let (column_by_id, user_by_id) = task_lookup_maps(db)?;

    let data = json!({ "task": task_json(&task, &column_by_id, &user_by_id) });
    Ok(CommandOutput {
        command: "task show",
        data,
        text: format!("{} {}", task.id, task.title),
    })
}

fn user_list(db: &Database) -> CliResult<CommandOutput> {
    let users = db.list_users().map_err(runtime_error)?;
    let data = json!({
        "users": users.iter().map(user_json).collect::<Vec<_>>()
    });
    let text = render_user_list_text(&users);

    Ok(CommandOutput {
        command: "user list",
        data,
        text,
    })
}

fn render_user_list_text(users: &[User]) -> String {
    if users.is_empty() {
        return "No users found.".to_string();
    }

    let headers = ["ID", "Email", "Name", "Role", "Status"];
    let rows = users
        .iter()
        .map(|user| {
            let id = user.id.to_string();
            let short_id = id.chars().take(8).collect::<String>();

            vec![
                short_id,
                user.email.clone(),
                user.name().to_string(),
                user.role.as_str().to_string(),
                user.status.as_str().to_string(),
            ]
        })
        .collect::<Vec<_>>();

    render_text_table(&headers, &rows)
}

fn user_create(db: &Database, args: UserCreateArgs) -> CliResult<CommandOutput> {
    auth::validate_registration(&args.email, &args.password, &args.password)
        .map_err(|message| usage_error("INVALID_REGISTRATION", message))?;

    let role = args
        .role
        .as_deref()
        .map(parse_role)
        .transpose()?
        .unwrap_or(Role::User);
    let status = args
        .status
        .as_deref()
        .map(parse_user_status)
        .transpose()?
        .unwrap_or(UserStatus::Active);

    let hash = auth::hash_password(&args.password).map_err(runtime_error)?;
    let created = db
        .create_user(&args.email, blank_to_none(args.name), hash, role, status)
        .map_err(classify_db_error)?;

    let data = json!({ "user": user_json(&created) });
    Ok(CommandOutput {
        command: "user create",
        data,
        text: format!("created user {} ({})", created.email, created.id),
    })
}

fn user_set_role(db: &Database, args: UserSetRoleArgs) -> CliResult<CommandOutput> {
    let user = resolve_user_selector(db, &args.user)?;
    let role = parse_role(&args.role)?;

    db.update_user_role(user.id, role)
        .map_err(classify_db_error)?;
    let updated = db.get_user(user.id).map_err(runtime_error)?;

    let data = json!({ "user": user_json(&updated) });
    Ok(CommandOutput {
        command: "user set-role",
        data,
        text: format!("set role of {} to {}", updated.email, updated.role.as_str()),
    })
}

fn user_set_status(db: &Database, args: UserSetStatusArgs) -> CliResult<CommandOutput> {
    let user = resolve_user_selector(db, &args.user)?;
    let status = parse_user_status(&args.status)?;

    db.update_user_status(user.id, status)
        .map_err(classify_db_error)?;
    let updated = db.get_user(user.id).map_err(runtime_error)?;

    let data = json!({ "user": user_json(&updated) });
    Ok(CommandOutput {
        command: "user set-status",
        data,
        text: format!(
            "set status of {} to {}",
            updated.email,
            updated.status.as_str()
        ),
    })
}

fn message_send(db: &Database, args: MessageSendArgs) -> CliResult<CommandOutput> {
    let body = args.body.trim();
    if body.is_empty() {
        return Err(usage_error("BODY_REQUIRED", "message body cannot be empty"));
    }

    let sender = resolve_user_selector(db, &args.from)?;
    let receiver = resolve_user_selector(db, &args.to)?;
    if sender.id == receiver.id {
        return Err(usage_error(
            "SELF_MESSAGE",
            "sender and receiver must be different users",
        ));
    }

    let message = db
        .send_message(sender.id, receiver.id, body)
        .map_err(classify_db_error)?;

    let data = json!({ "message": message_json(&message) });
    Ok(CommandOutput {
        command: "message send",
        data,
        text: format!(
            "sent message {} from {} to {}",
            message.id, sender.email, receiver.email
        ),
    })
}

fn message_conversation(db: &Database, args: MessageConversationArgs) -> CliResult<CommandOutput> {
    let a = resolve_user_selector(db, &args.between)?;
    let b = resolve_user_selector(db, &args.and)?;

    let messages = db.conversation(a.id, b.id).map_err(runtime_error)?;
    let data = json!({
        "messages": messages.iter().map(message_json).collect::<Vec<_>>()
    });
    let text = render_conversation_text(&messages, &a, &b);

    Ok(CommandOutput {
        command: "message conversation",
        data,
        text,
    })
}

fn render_conversation_text(messages: &[ChatMessage], a: &User, b: &User) -> String {
    if messages.is_empty() {
        return "No messages found.".to_string();
    }

    let headers = ["Time", "From", "Read", "Body"];
    let rows = messages
        .iter()
        .map(|message| {
            let from = if message.sender_id == a.id {
                a.name().to_string()
            } else {
                b.name().to_string()
            };
            let read = if message.read { "yes" } else { "no" };

            vec![
                message.created_at.clone(),
                from,
                read.to_string(),
                message.body.replace('\n', " "),
            ]
        })
        .collect::<Vec<_>>();

    render_text_table(&headers, &rows)
}

fn message_unread(db: &Database, args: MessageUnreadArgs) -> CliResult<CommandOutput> {
    let user = resolve_user_selector(db, &args.user)?;
    let counts = db.unread_counts(user.id).map_err(runtime_error)?;

    let users = db.list_users().map_err(runtime_error)?;
    let user_by_id: HashMap<Uuid, User> = users.into_iter().map(|user| (user.id, user)).collect();

    let data = json!({
        "unread": counts
            .iter()
            .map(|(sender_id, count)| {
                json!({
                    "sender_id": sender_id,
                    "sender_email": user_by_id.get(sender_id).map(|sender| sender.email.clone()),
                    "count": count
                })
            })
            .collect::<Vec<_>>()
    });

    let text = if counts.is_empty() {
        "No unread messages.".to_string()
    } else {
        let headers = ["From", "Unread"];
        let rows = counts
            .iter()
            .map(|(sender_id, count)| {
                let sender = user_by_id
                    .get(sender_id)
                    .map(|sender| sender.email.clone())
                    .unwrap_or_else(|| sender_id.to_string());
                vec![sender, count.to_string()]
            })
            .collect::<Vec<_>>();
        render_text_table(&headers, &rows)
    };

    Ok(CommandOutput {
        command: "message unread",
        data,
        text,
    })
}

fn task_lookup_maps(db: &Database) -> CliResult<(HashMap<Uuid, Column>, HashMap<Uuid, User>)> {
    let columns = db.list_columns().map_err(runtime_error)?;
    let column_by_id = columns
        .into_iter()
        .map(|column| (column.id, column))
        .collect();

    let users = db.list_users().map_err(runtime_error)?;
    let user_by_id = users.into_iter().map(|user| (user.id, user)).collect();

    Ok((column_by_id, user_by_id))
}

fn resolve_optional_column_selector(
    db: &Database,
    column_id: Option<Uuid>,
    column_title: Option<&str>,
) -> CliResult<Option<Uuid>> {
    match (column_id, column_title) {
        (Some(id), None) => {
            let columns = db.list_columns().map_err(runtime_error)?;
            if columns.iter().any(|column| column.id == id) {
                Ok(Some(id))
            } else {
                Err(not_found_error(
                    "COLUMN_NOT_FOUND",
                    format!("column {} not found", id),
                ))
            }
        }
        (None, Some(title)) => {
            let columns = db.list_columns().map_err(runtime_error)?;
            let column = columns
                .iter()
                .find(|column| column.title.eq_ignore_ascii_case(title.trim()))
                .ok_or_else(|| {
                    not_found_error(
                        "COLUMN_NOT_FOUND",
                        format!("column '{}' not found", title),
                    )
                })?;
            Ok(Some(column.id))
        }
        (None, None) => Ok(None),
        (Some(_), Some(_)) => Err(conflict_error(
            "COLUMN_SELECTOR_CONFLICT",
            "provide exactly one of column_id or column_title".to_string(),
            None,
        )),
    }
}

fn resolve_required_column_selector(
    db: &Database,
    column_id: Option<Uuid>,
    column_title: Option<&str>,
) -> CliResult<Uuid> {
    resolve_optional_column_selector(db, column_id, column_title)?.ok_or_else(|| {
        usage_error(
            "COLUMN_SELECTOR_REQUIRED",
            "provide one of --column-id or --column-title",
        )
    })
}

fn resolve_task_id_selector(db: &Database, selector: &str) -> CliResult<Uuid> {
    let trimmed = selector.trim();
    if trimmed.is_empty() {
        return Err(usage_error("TASK_ID_REQUIRED", "task id cannot be empty"));
    }

    if let Ok(parsed) = Uuid::parse_str(trimmed) {
        return Ok(parsed);
    }

    let needle = trimmed.to_ascii_lowercase();
    let tasks = db.list_tasks().map_err(runtime_error)?;

    let mut unique_matches = Vec::new();
    let mut seen = HashSet::new();
    for task in tasks {
        let full = task.id.to_string().to_ascii_lowercase();
        let simple = task.id.as_simple().to_string();
        if (full.starts_with(&needle) || simple.starts_with(&needle)) && seen.insert(task.id) {
            unique_matches.push(task.id);
        }
    }

    match unique_matches.as_slice() {
        [single] => Ok(*single),
        [] => Err(not_found_error(
            "TASK_NOT_FOUND",
            format!("task '{}' not found", selector),
        )),
        many => Err(conflict_error(
            "TASK_ID_AMBIGUOUS",
            format!(
                "task id prefix '{}' matches {} tasks; use a longer id",
                selector,
                many.len()
            ),
            Some(json!({
                "matches": many.iter().map(|id| id.to_string()).collect::<Vec<_>>()
            })),
        )),
    }
}

fn resolve_user_selector(db: &Database, selector: &str) -> CliResult<User> {
    let trimmed = selector.trim();
    if trimmed.is_empty() {
        return Err(usage_error("USER_REQUIRED", "user selector cannot be empty"));
    }

    if let Ok(parsed) = Uuid::parse_str(trimmed) {
        return db
            .get_user(parsed)
            .map_err(|_| not_found_error("USER_NOT_FOUND", format!("user {} not found", parsed)));
    }

    db.find_user_by_email(trimmed)
        .map_err(runtime_error)?
        .ok_or_else(|| {
            not_found_error("USER_NOT_FOUND", format!("user '{}' not found", selector))
        })
}

fn parse_status(value: &str) -> CliResult<Status> {
    Status::from_str(value).map_err(|()| {
        usage_error(
            "INVALID_STATUS",
            format!(
                "invalid status '{}'; expected one of pending, in_progress, review, completed",
                value
            ),
        )
    })
}

fn parse_priority(value: &str) -> CliResult<Priority> {
    Priority::from_str(value).map_err(|()| {
        usage_error(
            "INVALID_PRIORITY",
            format!(
                "invalid priority '{}'; expected one of low, medium, high",
                value
            ),
        )
    })
}

fn parse_kind(value: &str) -> CliResult<TaskKind> {
    TaskKind::from_str(value).map_err(|()| {
        usage_error(
            "INVALID_KIND",
            format!("invalid kind '{}'; expected one of task, bug, feature", value),
        )
    })
}

fn parse_role(value: &str) -> CliResult<Role> {
    Role::from_str(value).map_err(|()| {
        usage_error(
            "INVALID_ROLE",
            format!("invalid role '{}'; expected one of user, admin, owner", value),
        )
    })
}

fn parse_user_status(value: &str) -> CliResult<UserStatus> {
    UserStatus::from_str(value).map_err(|()| {
        usage_error(
            "INVALID_USER_STATUS",
            format!(
                "invalid user status '{}'; expected one of pending, active, inactive",
                value
            ),
        )
    })
}

fn validate_date_arg(flag: &str, value: Option<String>) -> CliResult<Option<String>> {
    let Some(raw) = value else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").map_err(|_| {
        usage_error(
            "INVALID_DATE",
            format!("invalid --{} '{}'; expected YYYY-MM-DD", flag, trimmed),
        )
    })?;
    Ok(Some(trimmed.to_string()))
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value.and_then(|raw| {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

fn task_json(task: &Task, columns: &HashMap<Uuid, Column>, users: &HashMap<Uuid, User>) -> Value {
    let column = columns.get(&task.column_id);
    let assignee = task.assignee_id.and_then(|id| users.get(&id));

    json!({
        "id": task.id,
        "title": task.title,
        "description": task.description,
        "status": task.status.as_str(),
        "priority": task.priority.as_str(),
        "kind": task.kind.as_str(),
        "assignee_id": task.assignee_id,
        "assignee_email": assignee.map(|user| user.email.clone()),
        "client": task.client,
        "request_date": task.request_date,
        "due_date": task.due_date,
        "observation": task.observation,
        "external_ref": task.external_ref,
        "column_id": task.column_id,
        "column": column.map(column_json),
        "completed": task.completed,
        "created_at": task.created_at,
        "updated_at": task.updated_at
    })
}

fn column_json(column: &Column) -> Value {
    json!({
        "id": column.id,
        "title": column.title,
        "column_type": column.column_type.map(|status| status.as_str()),
        "position": column.position,
        "created_at": column.created_at
    })
}

fn user_json(user: &User) -> Value {
    json!({
        "id": user.id,
        "email": user.email,
        "display_name": user.display_name,
        "role": user.role.as_str(),
        "status": user.status.as_str(),
        "created_at": user.created_at,
        "updated_at": user.updated_at
    })
}

fn message_json(message: &ChatMessage) -> Value {
    json!({
        "id": message.id,
        "sender_id": message.sender_id,
        "receiver_id": message.receiver_id,
        "body": message.body,
        "read": message.read,
        "created_at": message.created_at
    })
}

fn usage_error(code: &'static str, message: impl Into<String>) -> CliError {
    CliError {
        exit_code: 2,
        code,
        message: message.into(),
        details: None,
    }
}

fn not_found_error(code: &'static str, message: impl Into<String>) -> CliError {
    CliError {
        exit_code: 3,
        code,
        message: message.into(),
        details: None,
    }
}

fn conflict_error(
    code: &'static str,
    message: impl Into<String>,
    details: Option<Value>,
) -> CliError {
    CliError {
        exit_code: 4,
        code,
        message: message.into(),
        details,
    }
}

fn runtime_error(err: impl std::fmt::Display) -> CliError {
    CliError {
        exit_code: 5,
        code: "RUNTIME_ERROR",
        message: err.to_string(),
        details: None,
    }
}

fn task_lookup_error(task_id: Uuid, message: String) -> CliError {
    if message.contains("not found") {
        return not_found_error("TASK_NOT_FOUND", format!("task {} not found", task_id));
    }
    runtime_error(message)
}

fn classify_db_error(err: anyhow::Error) -> CliError {
    let top_message = err.to_string();

    if let Some(detail) = find_constraint_detail(&err, "UNIQUE constraint failed") {
        let message = if top_message.contains(&detail) {
            top_message
        } else {
            format!("{top_message}: {detail}")
        };
        return conflict_error("UNIQUE_CONSTRAINT", message, None);
    }

    if let Some(detail) = find_constraint_detail(&err, "FOREIGN KEY constraint failed") {
        let message = if top_message.contains(&detail) {
            top_message
        } else {
            format!("{top_message}: {detail}")
        };
        return conflict_error("FOREIGN_KEY_CONSTRAINT", message, None);
    }

    let message = format_anyhow_error_chain(&err);
    runtime_error(message)
}

fn print_success(output: CommandOutput, json_output: bool, quiet: bool) {
    if json_output {
        let payload = json!({
            "schema_version": SCHEMA_VERSION,
            "command": output.command,
            "data": output.data
        });
        match serde_json::to_string_pretty(&payload) {
            Ok(value) => println!("{value}"),
            Err(_) => println!("{}", payload),
        }
        return;
    }

    if quiet {
        return;
    }

    if output.text.is_empty() {
        println!("ok");
    } else {
        println!("{}", output.text);
    }
}

fn print_error(err: &CliError, json_output: bool) {
    error!(
        code = err.code,
        message = %err.message,
        details = ?err.details,
        "cli command failed"
    );

    if json_output {
        let payload = json!({
            "schema_version": SCHEMA_VERSION,
            "error": {
                "code": err.code,
                "message": err.message,
                "details": err.details
            }
        });
        match serde_json::to_string_pretty(&payload) {
            Ok(value) => eprintln!("{value}"),
            Err(_) => eprintln!("{}", payload),
        }
        return;
    }

    eprintln!("error[{}]: {}", err.code, err.message);
}

fn format_anyhow_error_chain(err: &anyhow::Error) -> String {
    let mut seen = HashSet::new();
    let mut parts = Vec::new();
    for cause in err.chain() {
        let text = cause.to_string();
        if seen.contains(&text) {
            continue;
        }
        seen.insert(text.clone());
        parts.push(text);
    }

    parts.join(": ")
}

fn find_constraint_detail(err: &anyhow::Error, needle: &str) -> Option<String> {
    let mut best: Option<String> = None;
    for cause in err.chain() {
        let message = cause.to_string();
        if !message.contains(needle) {
            continue;
        }

        best = match best {
            Some(existing) if existing.len() <= message.len() => Some(existing),
            _ => Some(message),
        };
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    fn open_db() -> Database {
        Database::open(":memory:").expect("db should open")
    }

    fn sample_user(db: &Database, email: &str) -> User {
        db.create_user(email, None, "hash", Role::User, UserStatus::Active)
            .expect("user should save")
    }

    #[test]
    fn resolve_selector_by_title_returns_column_id() {
        let db = open_db();
        let columns = db.list_columns().expect("columns should load");
        let pending = &columns[0];

        let resolved = resolve_optional_column_selector(&db, None, Some("pending"))
            .expect("selector should resolve")
            .expect("selector should return column id");

        assert_eq!(resolved, pending.id);
    }

    #[test]
    fn resolve_selector_with_conflicting_inputs_returns_conflict() {
        let db = open_db();
        let columns = db.list_columns().expect("columns should load");

        let err = resolve_optional_column_selector(&db, Some(columns[0].id), Some("Pending"))
            .expect_err("conflicting selector should fail");

        assert_eq!(err.exit_code, 4);
        assert_eq!(err.code, "COLUMN_SELECTOR_CONFLICT");
    }

    #[test]
    fn resolve_user_selector_accepts_email() {
        let db = open_db();
        let ana = sample_user(&db, "ana@example.com");

        let resolved =
            resolve_user_selector(&db, "ana@example.com").expect("email should resolve");
        assert_eq!(resolved.id, ana.id);

        let err = resolve_user_selector(&db, "missing@example.com")
            .expect_err("unknown email should fail");
        assert_eq!(err.exit_code, 3);
        assert_eq!(err.code, "USER_NOT_FOUND");
    }

    #[test]
    fn resolve_task_id_selector_accepts_short_prefix() {
        let db = open_db();
        let task = db
            .create_task(&TaskDraft {
                title: "short id task".to_string(),
                ..TaskDraft::default()
            })
            .expect("task should save");
        let short = task.id.to_string().chars().take(8).collect::<String>();

        let resolved = resolve_task_id_selector(&db, &short).expect("short id should resolve");
        assert_eq!(resolved, task.id);
    }

    #[test]
    fn parse_status_rejects_unknown_value() {
        let err = parse_status("archived").expect_err("unknown status should fail");
        assert_eq!(err.exit_code, 2);
        assert_eq!(err.code, "INVALID_STATUS");
    }

    #[test]
    fn validate_date_arg_rejects_malformed_date() {
        let err = validate_date_arg("due-date", Some("06/08/2026".to_string()))
            .expect_err("slash date should fail");
        assert_eq!(err.exit_code, 2);
        assert_eq!(err.code, "INVALID_DATE");

        let parsed = validate_date_arg("due-date", Some("2026-08-06".to_string()))
            .expect("iso date should parse");
        assert_eq!(parsed.as_deref(), Some("2026-08-06"));
    }

    #[test]
    fn format_anyhow_error_chain_includes_context_and_root_cause() {
        let err = anyhow::anyhow!("UNIQUE constraint failed: users.email")
            .context("failed to insert user");
        let message = format_anyhow_error_chain(&err);

        assert!(message.contains("failed to insert user"));
        assert!(message.contains("UNIQUE constraint failed: users.email"));
    }

    #[test]
    fn classify_db_error_uses_compact_unique_constraint_message() {
        let err = anyhow::anyhow!(
            "error returned from database: (code: 2067) UNIQUE constraint failed: users.email"
        )
        .context("failed to insert user");

        let classified = classify_db_error(err);
        assert_eq!(classified.code, "UNIQUE_CONSTRAINT");
        assert_eq!(classified.exit_code, 4);
        assert_eq!(
            classified.message,
            "failed to insert user: error returned from database: (code: 2067) UNIQUE constraint failed: users.email"
        );
    }

    #[test]
    fn task_list_text_renders_table_with_column_and_assignee() {
        let db = open_db();
        let ana = sample_user(&db, "ana@example.com");
        db.create_task(&TaskDraft {
            title: "Ship table output".to_string(),
            assignee_id: Some(ana.id),
            due_date: Some("2026-08-20".to_string()),
            ..TaskDraft::default()
        })
        .expect("task should save");

        let (column_by_id, user_by_id) = task_lookup_maps(&db).expect("lookup maps should load");
        let tasks = db.list_tasks().expect("tasks should load");
        let output = render_task_list_text(&tasks, &column_by_id, &user_by_id);

        assert!(output.contains("Column"));
        assert!(output.contains("Pending"));
        assert!(output.contains("2026-08-20"));
        assert!(output.contains("ana@example.com"));
        assert!(output.contains("Ship table output"));
        assert!(output.contains("|"));
    }

    #[test]
    fn column_list_text_renders_table() {
        let db = open_db();
        let columns = db.list_columns().expect("columns should load");

        let output = render_column_list_text(&columns);
        assert!(output.contains("| ID"));
        assert!(output.contains("Title"));
        assert!(output.contains("In Progress"));
        assert!(output.contains("completed"));
    }

    #[test]
    fn message_send_rejects_self_message() {
        let db = open_db();
        let ana = sample_user(&db, "ana@example.com");

        let err = message_send(
            &db,
            MessageSendArgs {
                from: ana.email.clone(),
                to: ana.email.clone(),
                body: "hello".to_string(),
            },
        )
        .expect_err("self message should fail");

        assert_eq!(err.exit_code, 2);
        assert_eq!(err.code, "SELF_MESSAGE");
    }

    #[test]
    fn user_create_rejects_short_password() {
        let db = open_db();
        let err = user_create(
            &db,
            UserCreateArgs {
                email: "ana@example.com".to_string(),
                password: "short".to_string(),
                name: None,
                role: None,
                status: None,
            },
        )
        .expect_err("short password should fail");

        assert_eq!(err.exit_code, 2);
        assert_eq!(err.code, "INVALID_REGISTRATION");
    }

    #[test]
    fn auth_register_creates_pending_user() {
        let db = open_db();
        let output = auth_register(
            &db,
            AuthRegisterArgs {
                email: "ana@example.com".to_string(),
                name: Some("Ana".to_string()),
                password: "secret1".to_string(),
                confirm: None,
            },
        )
        .expect("register should succeed");

        assert_eq!(output.command, "auth register");
        let user = db
            .find_user_by_email("ana@example.com")
            .expect("lookup should succeed")
            .expect("user should exist");
        assert_eq!(user.status, UserStatus::Pending);
        assert_eq!(user.role, Role::User);
    }

    #[test]
    fn auth_register_rejects_mismatched_confirmation() {
        let db = open_db();
        let err = auth_register(
            &db,
            AuthRegisterArgs {
                email: "ana@example.com".to_string(),
                name: None,
                password: "secret1".to_string(),
                confirm: Some("secret2".to_string()),
            },
        )
        .expect_err("mismatched confirmation should fail");

        assert_eq!(err.exit_code, 2);
        assert_eq!(err.code, "INVALID_REGISTRATION");
        assert!(db.list_users().expect("users should load").is_empty());
    }

    #[test]
    fn auth_login_rejects_wrong_password() {
        let db = open_db();
        auth_register(
            &db,
            AuthRegisterArgs {
                email: "ana@example.com".to_string(),
                name: None,
                password: "secret1".to_string(),
                confirm: None,
            },
        )
        .expect("register should succeed");

        let err = auth_login(
            &db,
            AuthLoginArgs {
                email: "ana@example.com".to_string(),
                password: "wrong".to_string(),
            },
        )
        .expect_err("wrong password should fail");

        assert_eq!(err.exit_code, 2);
        assert_eq!(err.code, "INVALID_CREDENTIALS");
    }

    #[test]
    fn task_complete_marks_task_completed() {
        let db = open_db();
        let task = db
            .create_task(&TaskDraft {
                title: "finish cli".to_string(),
                ..TaskDraft::default()
            })
            .expect("task should save");

        let output = task_complete(
            &db,
            TaskCompleteArgs {
                id: task.id.to_string(),
            },
        )
        .expect("complete should succeed");

        assert_eq!(output.command, "task complete");
        let reloaded = db.get_task(task.id).expect("task should reload");
        assert!(reloaded.completed);
        assert_eq!(reloaded.status, Status::Completed);
    }

    #[test]
    fn task_update_overlays_only_provided_fields() {
        let db = open_db();
        let task = db
            .create_task(&TaskDraft {
                title: "draft title".to_string(),
                client: Some("Acme".to_string()),
                ..TaskDraft::default()
            })
            .expect("task should save");

        let output = task_update(
            &db,
            TaskUpdateArgs {
                id: task.id.to_string(),
                title: Some("final title".to_string()),
                description: None,
                status: None,
                priority: Some("high".to_string()),
                kind: None,
                assignee: None,
                client: None,
                request_date: None,
                due_date: None,
                observation: None,
                external_ref: None,
                selector: OptionalColumnSelectorArgs {
                    column_id: None,
                    column_title: None,
                },
            },
        )
        .expect("update should succeed");

        assert_eq!(output.command, "task update");
        let reloaded = db.get_task(task.id).expect("task should reload");
        assert_eq!(reloaded.title, "final title");
        assert_eq!(reloaded.priority, Priority::High);
        assert_eq!(reloaded.client.as_deref(), Some("Acme"));
        assert_eq!(reloaded.column_id, task.column_id);
    }

    #[test]
    fn task_update_status_reresolves_column() {
        let db = open_db();
        let task = db
            .create_task(&TaskDraft {
                title: "needs review".to_string(),
                ..TaskDraft::default()
            })
            .expect("task should save");

        task_update(
            &db,
            TaskUpdateArgs {
                id: task.id.to_string(),
                title: None,
                description: None,
                status: Some("review".to_string()),
                priority: None,
                kind: None,
                assignee: None,
                client: None,
                request_date: None,
                due_date: None,
                observation: None,
                external_ref: None,
                selector: OptionalColumnSelectorArgs {
                    column_id: None,
                    column_title: None,
                },
            },
        )
        .expect("update should succeed");

        let reloaded = db.get_task(task.id).expect("task should reload");
        assert_eq!(reloaded.status, Status::Review);
        let column = db.get_column(reloaded.column_id).expect("column should load");
        assert_eq!(column.derived_status(), Status::Review);
    }

    #[test]
    fn task_update_rejects_blank_title() {
        let db = open_db();
        let task = db
            .create_task(&TaskDraft {
                title: "keep me".to_string(),
                ..TaskDraft::default()
            })
            .expect("task should save");

        let err = task_update(
            &db,
            TaskUpdateArgs {
                id: task.id.to_string(),
                title: Some("   ".to_string()),
                description: None,
                status: None,
                priority: None,
                kind: None,
                assignee: None,
                client: None,
                request_date: None,
                due_date: None,
                observation: None,
                external_ref: None,
                selector: OptionalColumnSelectorArgs {
                    column_id: None,
                    column_title: None,
                },
            },
        )
        .expect_err("blank title should be rejected");

        assert_eq!(err.exit_code, 2);
        assert_eq!(err.code, "TITLE_REQUIRED");
        let reloaded = db.get_task(task.id).expect("task should reload");
        assert_eq!(reloaded.title, "keep me");
    }
}
