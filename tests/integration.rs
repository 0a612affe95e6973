use std::path::PathBuf;

use anyhow::Result;
use tempfile::TempDir;
use uuid::Uuid;

use teamboard::app::reconcile::Reconciler;
use teamboard::app::store::BoardStore;
use teamboard::auth;
use teamboard::cli::{
    self, MessageCommand, MessageSendArgs, MessageUnreadArgs, OptionalColumnSelectorArgs,
    RequiredColumnSelectorArgs, RootCommand, TaskCommand, TaskCompleteArgs, TaskCreateArgs,
    TaskMoveArgs, TaskShowArgs, UserCommand, UserCreateArgs,
};
use teamboard::db::{Database, TaskDraft};
use teamboard::events::{ChangeBus, ChangeEvent, TaskOperation};
use teamboard::types::{Priority, Role, Status, UserStatus};

struct BoardFixture {
    // Held so the backing directory outlives the test body.
    _temp: TempDir,
    db_path: PathBuf,
}

impl BoardFixture {
    fn new() -> Result<Self> {
        let temp = TempDir::new()?;
        let db_path = temp.path().join("teamboard.sqlite");
        Ok(Self {
            _temp: temp,
            db_path,
        })
    }

    fn open(&self) -> Result<Database> {
        Database::open(&self.db_path)
    }
}

fn seed_member(db: &Database, email: &str, name: &str) -> Result<teamboard::types::User> {
    let hash = auth::hash_password("sw0rdfish!")?;
    db.create_user(
        email,
        Some(name.to_string()),
        hash,
        Role::User,
        UserStatus::Active,
    )
}

#[test]
fn integration_test_task_lifecycle_across_columns() -> Result<()> {
    let fixture = BoardFixture::new()?;
    let db = fixture.open()?;

    let columns = db.list_columns()?;
    assert_eq!(columns.len(), 4, "a fresh board seeds the default columns");
    let pending = &columns[0];
    let in_progress = &columns[1];
    assert_eq!(in_progress.title, "In Progress");

    let assignee = seed_member(&db, "ana@example.com", "Ana")?;

    let task = db.create_task(&TaskDraft {
        title: "Quarterly report".to_string(),
        description: Some("Collect figures from finance".to_string()),
        priority: Priority::High,
        assignee_id: Some(assignee.id),
        column_id: Some(pending.id),
        ..TaskDraft::default()
    })?;
    assert_eq!(task.status, Status::Pending);
    assert_eq!(task.column_id, pending.id);
    assert!(!task.completed);

    let moved = db.move_task(task.id, in_progress.id)?;
    assert_eq!(moved.column_id, in_progress.id);
    assert_eq!(
        moved.status,
        Status::InProgress,
        "status follows the destination column"
    );

    let done = db.complete_task(task.id)?;
    assert!(done.completed);
    assert_eq!(done.status, Status::Completed);
    let done_column = db.get_column(done.column_id)?;
    assert_eq!(done_column.derived_status(), Status::Completed);

    db.delete_task(task.id)?;
    assert!(db.get_task(task.id).is_err());

    Ok(())
}

#[test]
fn integration_test_task_survives_reopen() -> Result<()> {
    let fixture = BoardFixture::new()?;
    let task_id = {
        let db = fixture.open()?;
        let task = db.create_task(&TaskDraft {
            title: "Persists across connections".to_string(),
            ..TaskDraft::default()
        })?;
        task.id
    };

    let db = fixture.open()?;
    let reopened = db.get_task(task_id)?;
    assert_eq!(reopened.title, "Persists across connections");
    assert_eq!(
        db.list_columns()?.len(),
        4,
        "reopening must not reseed columns"
    );

    Ok(())
}

#[test]
fn integration_test_messaging_unread_lifecycle() -> Result<()> {
    let fixture = BoardFixture::new()?;
    let db = fixture.open()?;

    let ana = seed_member(&db, "ana@example.com", "Ana")?;
    let bruno = seed_member(&db, "bruno@example.com", "Bruno")?;

    db.send_message(ana.id, bruno.id, "standup in 5")?;
    db.send_message(ana.id, bruno.id, "bring the roadmap doc")?;
    db.send_message(bruno.id, ana.id, "on my way")?;

    let unread = db.unread_counts(bruno.id)?;
    assert_eq!(unread, vec![(ana.id, 2)]);

    let thread = db.conversation(ana.id, bruno.id)?;
    assert_eq!(thread.len(), 3);
    assert_eq!(thread[0].body, "standup in 5");
    assert_eq!(thread[2].sender_id, bruno.id);

    let cleared = db.mark_conversation_read(ana.id, bruno.id)?;
    assert_eq!(cleared, 2);
    assert!(db.unread_counts(bruno.id)?.is_empty());

    let unread_for_ana = db.unread_counts(ana.id)?;
    assert_eq!(
        unread_for_ana,
        vec![(bruno.id, 1)],
        "marking one direction read leaves the other untouched"
    );

    Ok(())
}

#[test]
fn integration_test_registration_approval_and_login() -> Result<()> {
    let fixture = BoardFixture::new()?;
    let db = fixture.open()?;

    let user = auth::register(
        &db,
        "carla@example.com",
        Some("Carla".to_string()),
        "hunter2hunter2",
        "hunter2hunter2",
    )?;
    assert_eq!(user.status, UserStatus::Pending);
    assert_eq!(user.role, Role::User);

    assert!(auth::login(&db, "carla@example.com", "wrong-password").is_err());

    let logged_in = auth::login(&db, "carla@example.com", "hunter2hunter2")?;
    assert_eq!(logged_in.id, user.id);

    db.update_user_status(user.id, UserStatus::Inactive)?;
    assert!(
        auth::login(&db, "carla@example.com", "hunter2hunter2").is_err(),
        "deactivated accounts must not log in"
    );

    Ok(())
}

#[test]
fn integration_test_cli_task_round_trip() -> Result<()> {
    let fixture = BoardFixture::new()?;

    let create = RootCommand::Task {
        command: TaskCommand::Create(TaskCreateArgs {
            title: "Ship release notes".to_string(),
            description: None,
            status: None,
            priority: Some("high".to_string()),
            kind: None,
            assignee: None,
            client: Some("Acme".to_string()),
            request_date: None,
            due_date: None,
            observation: None,
            external_ref: None,
            selector: OptionalColumnSelectorArgs {
                column_id: None,
                column_title: Some("Pending".to_string()),
            },
        }),
    };
    assert_eq!(cli::run(&fixture.db_path, create, true, true), 0);

    let db = fixture.open()?;
    let tasks = db.list_tasks()?;
    assert_eq!(tasks.len(), 1);
    let task = &tasks[0];
    assert_eq!(task.priority, Priority::High);
    drop(db);

    let move_cmd = RootCommand::Task {
        command: TaskCommand::Move(TaskMoveArgs {
            id: task.id.to_string(),
            selector: RequiredColumnSelectorArgs {
                column_id: None,
                column_title: Some("In Progress".to_string()),
            },
        }),
    };
    assert_eq!(cli::run(&fixture.db_path, move_cmd, true, true), 0);

    let complete = RootCommand::Task {
        command: TaskCommand::Complete(TaskCompleteArgs {
            id: task.id.to_string(),
        }),
    };
    assert_eq!(cli::run(&fixture.db_path, complete, true, true), 0);

    let db = fixture.open()?;
    let finished = db.get_task(task.id)?;
    assert!(finished.completed);
    assert_eq!(finished.status, Status::Completed);
    drop(db);

    let missing = RootCommand::Task {
        command: TaskCommand::Show(TaskShowArgs {
            id: Uuid::new_v4().to_string(),
        }),
    };
    assert_eq!(
        cli::run(&fixture.db_path, missing, true, true),
        3,
        "unknown task ids map to the not-found exit code"
    );

    Ok(())
}

#[test]
fn integration_test_cli_user_conflicts_and_messages() -> Result<()> {
    let fixture = BoardFixture::new()?;

    let create_user = |email: &str| RootCommand::User {
        command: UserCommand::Create(UserCreateArgs {
            email: email.to_string(),
            password: "sw0rdfish!".to_string(),
            name: None,
            role: None,
            status: Some("active".to_string()),
        }),
    };

    assert_eq!(cli::run(&fixture.db_path, create_user("dora@example.com"), true, true), 0);
    assert_eq!(cli::run(&fixture.db_path, create_user("eli@example.com"), true, true), 0);
    assert_eq!(
        cli::run(&fixture.db_path, create_user("dora@example.com"), true, true),
        4,
        "duplicate emails map to the conflict exit code"
    );

    let send = RootCommand::Message {
        command: MessageCommand::Send(MessageSendArgs {
            from: "dora@example.com".to_string(),
            to: "eli@example.com".to_string(),
            body: "review queue is empty".to_string(),
        }),
    };
    assert_eq!(cli::run(&fixture.db_path, send, true, true), 0);

    let unread = RootCommand::Message {
        command: MessageCommand::Unread(MessageUnreadArgs {
            user: "eli@example.com".to_string(),
        }),
    };
    assert_eq!(cli::run(&fixture.db_path, unread, true, true), 0);

    let db = fixture.open()?;
    let dora = db
        .find_user_by_email("dora@example.com")?
        .ok_or_else(|| anyhow::anyhow!("dora should exist"))?;
    let eli = db
        .find_user_by_email("eli@example.com")?
        .ok_or_else(|| anyhow::anyhow!("eli should exist"))?;
    assert_eq!(db.unread_counts(eli.id)?, vec![(dora.id, 1)]);

    Ok(())
}

#[test]
fn integration_test_store_reload_tracks_db() -> Result<()> {
    let fixture = BoardFixture::new()?;
    let db = fixture.open()?;
    let mut store = BoardStore::default();

    store.reload(&db)?;
    assert_eq!(store.columns().len(), 4);
    assert!(store.tasks().is_empty());

    let ana = seed_member(&db, "ana@example.com", "Ana")?;
    let task = db.create_task(&TaskDraft {
        title: "Snapshot me".to_string(),
        assignee_id: Some(ana.id),
        ..TaskDraft::default()
    })?;

    assert!(
        store.task(task.id).is_none(),
        "snapshots only change on reload"
    );

    store.reload(&db)?;
    assert_eq!(store.tasks().len(), 1);
    assert_eq!(store.assignee_name(Some(ana.id)), Some("Ana"));

    db.delete_task(task.id)?;
    store.reload(&db)?;
    assert!(store.task(task.id).is_none());

    Ok(())
}

#[test]
fn integration_test_change_bus_feeds_reconciler() -> Result<()> {
    let bus = ChangeBus::default();
    let mut receiver = bus.subscribe();
    let mut reconciler = Reconciler::default();

    let task_id = Uuid::new_v4();
    bus.publish_task_change(task_id, TaskOperation::Created);
    bus.publish_task_change(task_id, TaskOperation::Moved);

    let mut seen = 0;
    while let Ok(event) = receiver.try_recv() {
        match event {
            ChangeEvent::TaskChanged { task_id: id, .. } => {
                assert_eq!(id, task_id);
                seen += 1;
            }
            _ => {}
        }
        reconciler.request();
    }
    assert_eq!(seen, 2);

    assert!(reconciler.begin(), "queued requests claim one reload");
    reconciler.request();
    assert!(
        !reconciler.begin(),
        "requests arriving mid-reload wait for the current one"
    );
    reconciler.finish();
    assert!(reconciler.begin(), "the coalesced follow-up runs after");
    reconciler.finish();
    assert!(!reconciler.begin());

    Ok(())
}
