use std::collections::HashMap;

use anyhow::Result;
use chrono::{Local, NaiveDate};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::TryRecvError;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::warn;
use tuirealm::Update;
use uuid::Uuid;

use crate::app::board::{SortColumn, TableRow, TableSort, sort_table_rows, table_rows};
use crate::app::chat::{ChatPanel, contacts};
use crate::app::editor::{
    ConfirmCancelField, DeleteTaskDialogState, TaskEditorField, TaskEditorState, delete_task,
};
use crate::app::move_task::{MoveController, shift_task};
use crate::app::reconcile::Reconciler;
use crate::app::store::BoardStore;
use crate::app::users::{ProfileEditorField, ProfileEditorState};
use crate::db::Database;
use crate::events::{ChangeBus, ChangeEvent};
use crate::notification::notify_incoming_message;
use crate::settings::Settings;
use crate::theme::{Theme, ThemePreset};
use crate::types::{Task, User};

use super::ComponentId;
use super::messages::Msg;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ViewMode {
    Board,
    Table,
    Users,
}

/// Application state behind the tui-realm view. Mutations go through the
/// store and the change bus; the snapshot catches up on the next
/// reconciliation rather than being patched in place.
pub struct Model {
    pub db: Database,
    pub bus: ChangeBus,
    bus_events: broadcast::Receiver<ChangeEvent>,
    poll_ticks: Option<UnboundedReceiver<()>>,
    pub store: BoardStore,
    reconciler: Reconciler,
    pub chat: ChatPanel,
    pub mover: MoveController,
    pub view: ViewMode,
    pub chat_visible: bool,
    pub focused_column: usize,
    pub selected_task_per_column: HashMap<usize, usize>,
    pub table_selected: usize,
    pub table_sort: TableSort,
    pub users_selected: usize,
    pub selected_contact: usize,
    pub task_editor: Option<TaskEditorState>,
    pub delete_dialog: Option<DeleteTaskDialogState>,
    pub profile_editor: Option<ProfileEditorState>,
    pub help_visible: bool,
    pub palette_visible: bool,
    pub last_error: Option<String>,
    pub notice: Option<String>,
    pub current_user: User,
    pub settings: Settings,
    pub theme: Theme,
    quit: bool,
    dirty: bool,
}

impl Model {
    pub fn new(db: Database, bus: ChangeBus, current_user: User, settings: Settings) -> Result<Self> {
        let theme = settings
            .theme
            .parse::<ThemePreset>()
            .map(Theme::from_preset)
            .unwrap_or_default();
        let view = if settings.default_view == "table" {
            ViewMode::Table
        } else {
            ViewMode::Board
        };

        let bus_events = bus.subscribe();
        let chat = ChatPanel::new(current_user.id);
        let mut model = Self {
            db,
            bus,
            bus_events,
            poll_ticks: None,
            store: BoardStore::default(),
            reconciler: Reconciler::default(),
            chat,
            mover: MoveController::default(),
            view,
            chat_visible: false,
            focused_column: 0,
            selected_task_per_column: HashMap::new(),
            table_selected: 0,
            table_sort: TableSort::default(),
            users_selected: 0,
            selected_contact: 0,
            task_editor: None,
            delete_dialog: None,
            profile_editor: None,
            help_visible: false,
            palette_visible: false,
            last_error: None,
            notice: None,
            current_user,
            settings,
            theme,
            quit: false,
            dirty: true,
        };
        model.store.reload(&model.db)?;
        model.chat.reconcile(&model.db)?;
        Ok(model)
    }

    /// Hand over the poll timer's tick channel. Ticks are drained on each
    /// `Msg::Tick` and funneled through the reconciliation gate.
    pub fn attach_poller(&mut self, ticks: UnboundedReceiver<()>) {
        self.poll_ticks = Some(ticks);
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// True once since the last call when the view needs a redraw.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// The modal that should be mounted on top of the current view, if any.
    /// The error dialog outranks everything else.
    pub fn active_modal(&self) -> Option<ComponentId> {
        if self.last_error.is_some() {
            return Some(ComponentId::Error);
        }
        if self.palette_visible {
            return Some(ComponentId::CommandPalette);
        }
        if self.task_editor.is_some() {
            return Some(ComponentId::TaskEditor);
        }
        if self.delete_dialog.is_some() {
            return Some(ComponentId::DeleteTask);
        }
        if self.profile_editor.is_some() {
            return Some(ComponentId::ProfileEditor);
        }
        if self.help_visible {
            return Some(ComponentId::Help);
        }
        None
    }

    /// Which component should hold keyboard focus for the current state.
    pub fn focus_target(&self) -> ComponentId {
        if let Some(modal) = self.active_modal() {
            return modal;
        }
        if self.chat_visible {
            return ComponentId::ChatSidebar;
        }
        match self.view {
            ViewMode::Board => ComponentId::BoardColumn(self.focused_column),
            ViewMode::Table => ComponentId::TaskTable,
            ViewMode::Users => ComponentId::UsersTable,
        }
    }

    pub fn tasks_in_column(&self, column_index: usize) -> Vec<&Task> {
        let Some(column) = self.store.columns().get(column_index) else {
            return Vec::new();
        };
        self.store
            .tasks()
            .iter()
            .filter(|task| task.column_id == column.id)
            .collect()
    }

    /// Table projection with the active sort applied.
    pub fn sorted_table_rows(&self) -> Vec<TableRow> {
        let mut rows = table_rows(
            self.store.tasks(),
            |id| self.store.assignee_name(id).map(str::to_string),
            today(),
        );
        sort_table_rows(&mut rows, self.table_sort);
        rows
    }

    fn selected_task_id(&self) -> Option<Uuid> {
        match self.view {
            ViewMode::Board => {
                let tasks = self.tasks_in_column(self.focused_column);
                if tasks.is_empty() {
                    return None;
                }
                let selected = self
                    .selected_task_per_column
                    .get(&self.focused_column)
                    .copied()
                    .unwrap_or(0)
                    .min(tasks.len() - 1);
                Some(tasks[selected].id)
            }
            ViewMode::Table => {
                let rows = self.sorted_table_rows();
                rows.get(self.table_selected.min(rows.len().saturating_sub(1)))
                    .map(|row| row.task_id)
            }
            ViewMode::Users => None,
        }
    }

    fn selected_task(&self) -> Option<Task> {
        self.selected_task_id()
            .and_then(|id| self.store.task(id))
            .cloned()
    }

    fn contact_count(&self) -> usize {
        contacts(self.store.users(), self.current_user.id).len()
    }

    fn selected_contact_id(&self) -> Option<Uuid> {
        contacts(self.store.users(), self.current_user.id)
            .get(self.selected_contact)
            .map(|contact| contact.user.id)
    }

    fn show_error(&mut self, error: anyhow::Error) -> Option<Msg> {
        let detail = error.to_string();
        self.last_error = Some(detail.clone());
        Some(Msg::ShowError(detail))
    }

    fn reconcile_now(&mut self) -> Option<Msg> {
        self.reconciler.request();
        self.maybe_reconcile()
    }

    fn maybe_reconcile(&mut self) -> Option<Msg> {
        if !self.reconciler.begin() {
            return None;
        }
        let result = self
            .store
            .reload(&self.db)
            .and_then(|()| self.chat.reconcile(&self.db));
        self.reconciler.finish();
        self.dirty = true;
        match result {
            Ok(()) => {
                self.clamp_selections();
                None
            }
            Err(error) => self.show_error(error),
        }
    }

    /// Keep every cursor inside the freshly reloaded snapshot.
    fn clamp_selections(&mut self) {
        let column_count = self.store.columns().len();
        if column_count == 0 {
            self.focused_column = 0;
            self.selected_task_per_column.clear();
        } else {
            self.focused_column = self.focused_column.min(column_count - 1);
            self.selected_task_per_column
                .retain(|column, _| *column < column_count);
        }
        for column in 0..column_count {
            let task_count = self.tasks_in_column(column).len();
            if let Some(selected) = self.selected_task_per_column.get(&column).copied() {
                self.selected_task_per_column
                    .insert(column, selected.min(task_count.saturating_sub(1)));
            }
        }
        self.table_selected = self
            .table_selected
            .min(self.store.tasks().len().saturating_sub(1));
        self.users_selected = self
            .users_selected
            .min(self.store.users().len().saturating_sub(1));
        self.selected_contact = self
            .selected_contact
            .min(self.contact_count().saturating_sub(1));
    }

    /// Keep the cursor on a task after it changed columns.
    fn follow_task(&mut self, task_id: Uuid) {
        let Some(task) = self.store.task(task_id) else {
            return;
        };
        let column_id = task.column_id;
        let Some(column_index) = self
            .store
            .columns()
            .iter()
            .position(|column| column.id == column_id)
        else {
            return;
        };
        let position = self
            .store
            .tasks()
            .iter()
            .filter(|candidate| candidate.column_id == column_id)
            .position(|candidate| candidate.id == task_id)
            .unwrap_or(0);
        self.focused_column = column_index;
        self.selected_task_per_column.insert(column_index, position);
    }

    fn select_vertical(&mut self, delta: isize) {
        match self.view {
            ViewMode::Board => {
                let task_count = self.tasks_in_column(self.focused_column).len();
                let selected = self
                    .selected_task_per_column
                    .entry(self.focused_column)
                    .or_insert(0);
                *selected = step(*selected, delta, task_count);
            }
            ViewMode::Table => {
                self.table_selected = step(self.table_selected, delta, self.store.tasks().len());
            }
            ViewMode::Users => {
                self.users_selected = step(self.users_selected, delta, self.store.users().len());
            }
        }
    }

    fn navigate_column(&mut self, delta: isize) {
        if self.view != ViewMode::Board {
            return;
        }
        let column_count = self.store.columns().len();
        self.focused_column = step(self.focused_column, delta, column_count);
        self.selected_task_per_column
            .entry(self.focused_column)
            .or_insert(0);
    }

    fn move_selected_task(&mut self, delta: i64) -> Option<Msg> {
        let Some(task) = self.selected_task() else {
            return None;
        };
        let moved = {
            let columns = self.store.columns().to_vec();
            shift_task(&self.db, &self.bus, &columns, &task, delta)
        };
        match moved {
            Ok(Some(moved)) => {
                let column_title = self
                    .store
                    .column(moved.column_id)
                    .map(|column| column.title.clone());
                let result = self.reconcile_now();
                if self.view == ViewMode::Board {
                    self.follow_task(moved.id);
                }
                if let Some(title) = column_title {
                    self.notice = Some(format!("Task moved to {title}"));
                }
                result
            }
            Ok(None) => None,
            Err(error) => self.show_error(error),
        }
    }

    fn hover_shift(&mut self, delta: isize) {
        if self.mover.dragging().is_none() {
            return;
        }
        let current = self.mover.hovered_column().or_else(|| {
            self.mover
                .dragging()
                .and_then(|id| self.store.task(id))
                .map(|task| task.column_id)
        });
        let Some(current) = current else {
            return;
        };
        let columns = self.store.columns();
        let Some(index) = columns.iter().position(|column| column.id == current) else {
            return;
        };
        let target = index as isize + delta;
        if target < 0 || target >= columns.len() as isize {
            return;
        }
        let target_id = columns[target as usize].id;
        self.mover.hover(Some(target_id));
    }

    fn drop_grabbed_task(&mut self) -> Option<Msg> {
        let Some(column_id) = self.mover.hovered_column() else {
            self.mover.cancel();
            return None;
        };
        match self.mover.drop_on(&self.db, &self.bus, column_id) {
            Ok(Some(task)) => {
                let column_title = self
                    .store
                    .column(column_id)
                    .map(|column| column.title.clone());
                let result = self.reconcile_now();
                self.follow_task(task.id);
                if let Some(title) = column_title {
                    self.notice = Some(format!("Task moved to {title}"));
                }
                result
            }
            Ok(None) => None,
            Err(error) => self.show_error(error),
        }
    }

    fn complete_selected_task(&mut self) -> Option<Msg> {
        let Some(task_id) = self.selected_task_id() else {
            return None;
        };
        match self.db.complete_task(task_id) {
            Ok(task) => {
                self.bus
                    .publish_task_change(task.id, crate::events::TaskOperation::Completed);
                self.notice = Some(format!("Completed '{}'", task.title));
                self.reconcile_now()
            }
            Err(error) => self.show_error(error),
        }
    }

    fn submit_task_editor(&mut self) -> Option<Msg> {
        let Some(editor) = self.task_editor.as_mut() else {
            return None;
        };
        match editor.save(&self.db, &self.bus) {
            Ok(Some(task)) => {
                self.task_editor = None;
                self.notice = Some(format!("Saved '{}'", task.title));
                self.reconcile_now()
            }
            // Validation failed; the dialog keeps its error message.
            Ok(None) => None,
            Err(error) => self.show_error(error),
        }
    }

    fn submit_delete_dialog(&mut self) -> Option<Msg> {
        let Some(dialog) = self.delete_dialog.take() else {
            return None;
        };
        if dialog.focused_field != ConfirmCancelField::Confirm {
            return None;
        }
        match delete_task(&self.db, &self.bus, dialog.task_id) {
            Ok(()) => {
                self.notice = Some(format!("Deleted '{}'", dialog.task_title));
                self.reconcile_now()
            }
            Err(error) => self.show_error(error),
        }
    }

    fn submit_profile_editor(&mut self) -> Option<Msg> {
        let Some(editor) = self.profile_editor.as_ref() else {
            return None;
        };
        match editor.save(&self.db) {
            Ok(user) => {
                self.profile_editor = None;
                if user.id == self.current_user.id {
                    self.current_user = user.clone();
                }
                self.notice = Some(format!("Updated profile for {}", user.name()));
                self.reconcile_now()
            }
            Err(error) => self.show_error(error),
        }
    }

    fn dismiss_active(&mut self) {
        if self.last_error.take().is_some() {
            return;
        }
        if self.palette_visible {
            self.palette_visible = false;
            return;
        }
        if self.task_editor.take().is_some() {
            return;
        }
        if self.delete_dialog.take().is_some() {
            return;
        }
        if self.profile_editor.take().is_some() {
            return;
        }
        self.help_visible = false;
    }

    fn dialog_input(&mut self, ch: char) {
        if let Some(editor) = self.task_editor.as_mut() {
            if let Some(input) = editor_text_input(editor) {
                input.push(ch);
            }
        } else if let Some(editor) = self.profile_editor.as_mut()
            && editor.focused_field == ProfileEditorField::DisplayName
        {
            editor.display_name_input.push(ch);
        }
    }

    fn dialog_backspace(&mut self) {
        if let Some(editor) = self.task_editor.as_mut() {
            if let Some(input) = editor_text_input(editor) {
                input.pop();
            }
        } else if let Some(editor) = self.profile_editor.as_mut()
            && editor.focused_field == ProfileEditorField::DisplayName
        {
            editor.display_name_input.pop();
        }
    }

    fn cycle_dialog_field(&mut self) {
        if let Some(editor) = self.task_editor.as_mut() {
            match editor.focused_field {
                TaskEditorField::Status => editor.cycle_status(),
                TaskEditorField::Priority => editor.cycle_priority(),
                TaskEditorField::Kind => editor.cycle_kind(),
                TaskEditorField::Assignee => editor.cycle_assignee(self.store.users()),
                _ => {}
            }
        } else if let Some(editor) = self.profile_editor.as_mut() {
            match editor.focused_field {
                ProfileEditorField::Role => editor.cycle_role(),
                ProfileEditorField::Status => editor.cycle_status(),
                _ => {}
            }
        }
    }

    fn focus_dialog_field(&mut self, forward: bool) {
        if let Some(editor) = self.task_editor.as_mut() {
            if forward {
                editor.focus_next();
            } else {
                editor.focus_prev();
            }
        } else if let Some(editor) = self.profile_editor.as_mut() {
            if forward {
                editor.focus_next();
            } else {
                let fields = ProfileEditorField::ALL;
                let index = fields
                    .iter()
                    .position(|field| *field == editor.focused_field)
                    .unwrap_or(0);
                editor.focused_field = fields[(index + fields.len() - 1) % fields.len()];
            }
        } else if let Some(dialog) = self.delete_dialog.as_mut() {
            dialog.toggle_focus();
        }
    }

    fn submit_dialog(&mut self) -> Option<Msg> {
        if self.last_error.is_some() {
            self.last_error = None;
            return None;
        }
        if self.task_editor.is_some() {
            return self.submit_task_editor();
        }
        if self.delete_dialog.is_some() {
            return self.submit_delete_dialog();
        }
        if self.profile_editor.is_some() {
            return self.submit_profile_editor();
        }
        None
    }

    fn open_conversation(&mut self) -> Option<Msg> {
        let Some(contact) = self.selected_contact_id() else {
            return None;
        };
        match self.chat.open_conversation(&self.db, contact) {
            Ok(()) => None,
            Err(error) => self.show_error(error),
        }
    }

    fn execute_command(&mut self, command_id: &str) -> Option<Msg> {
        self.palette_visible = false;
        if let Err(error) = self.db.record_command_use(command_id) {
            warn!(command_id, %error, "failed to record command use");
        }
        let msg = match command_id {
            "new_task" => Msg::OpenNewTaskDialog,
            "edit_task" => Msg::OpenEditTaskDialog,
            "complete_task" => Msg::CompleteTask,
            "delete_task" => Msg::OpenDeleteTaskDialog,
            "move_task_left" => Msg::MoveTaskLeft,
            "move_task_right" => Msg::MoveTaskRight,
            "toggle_view" => Msg::ToggleViewMode,
            "toggle_chat" => Msg::ToggleChatPanel,
            "next_contact" => Msg::NextContact,
            "prev_contact" => Msg::PrevContact,
            "users_view" => Msg::OpenUsersView,
            "refresh" => Msg::Refresh,
            "navigate_left" => Msg::NavigateLeft,
            "navigate_right" => Msg::NavigateRight,
            "select_up" => Msg::SelectUp,
            "select_down" => Msg::SelectDown,
            "help" => Msg::ToggleHelp,
            "quit" => Msg::Quit,
            _ => return None,
        };
        self.update(Some(msg))
    }

    fn handle_tick(&mut self) -> Option<Msg> {
        if let Some(ticks) = self.poll_ticks.as_mut() {
            let mut ticked = false;
            while ticks.try_recv().is_ok() {
                ticked = true;
            }
            if ticked {
                self.reconciler.request();
            }
        }

        loop {
            match self.bus_events.try_recv() {
                Ok(ChangeEvent::TaskChanged { .. }) => {
                    self.reconciler.request();
                }
                Ok(event @ ChangeEvent::MessageInserted { .. }) => {
                    match self.chat.handle_event(&self.db, &event) {
                        Ok(Some(message)) => {
                            let sender = self
                                .store
                                .user(message.sender_id)
                                .map(|user| user.name().to_string())
                                .unwrap_or_else(|| "Someone".to_string());
                            notify_incoming_message(
                                &sender,
                                &message.body,
                                self.settings.notification_backend(),
                            );
                            self.dirty = true;
                        }
                        Ok(None) => {
                            self.dirty = true;
                        }
                        Err(error) => return self.show_error(error),
                    }
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "change bus lagged; forcing full reconciliation");
                    self.reconciler.request();
                }
            }
        }

        self.maybe_reconcile()
    }
}

impl Update<Msg> for Model {
    fn update(&mut self, msg: Option<Msg>) -> Option<Msg> {
        let msg = msg?;
        if msg != Msg::Tick {
            self.dirty = true;
        }
        match msg {
            Msg::NavigateLeft => {
                self.navigate_column(-1);
                None
            }
            Msg::NavigateRight => {
                self.navigate_column(1);
                None
            }
            Msg::SelectUp => {
                self.select_vertical(-1);
                None
            }
            Msg::SelectDown => {
                self.select_vertical(1);
                None
            }
            Msg::FocusColumn(index) => {
                if index < self.store.columns().len() {
                    self.focused_column = index;
                    self.selected_task_per_column.entry(index).or_insert(0);
                }
                None
            }
            Msg::SelectTask { column, task } => {
                if column < self.store.columns().len() {
                    let max_index = self.tasks_in_column(column).len().saturating_sub(1);
                    self.focused_column = column;
                    self.selected_task_per_column
                        .insert(column, task.min(max_index));
                }
                None
            }
            Msg::SelectTableRow(index) => {
                self.table_selected = index.min(self.store.tasks().len().saturating_sub(1));
                None
            }
            Msg::SelectUserRow(index) => {
                self.users_selected = index.min(self.store.users().len().saturating_sub(1));
                None
            }
            Msg::SortByColumn(index) => {
                if let Some(column) = SortColumn::ALL.get(index) {
                    self.table_sort.toggle(*column);
                    self.table_selected = 0;
                }
                None
            }
            Msg::OpenNewTaskDialog => {
                self.task_editor = Some(TaskEditorState::for_create(today()));
                None
            }
            Msg::OpenEditTaskDialog => {
                if let Some(task) = self.selected_task() {
                    self.task_editor = Some(TaskEditorState::for_edit(&task));
                }
                None
            }
            Msg::CompleteTask => self.complete_selected_task(),
            Msg::OpenDeleteTaskDialog => {
                if let Some(task) = self.selected_task() {
                    self.delete_dialog = Some(DeleteTaskDialogState::new(&task));
                }
                None
            }
            Msg::MoveTaskLeft => self.move_selected_task(-1),
            Msg::MoveTaskRight => self.move_selected_task(1),
            Msg::GrabTask => {
                if let Some(task) = self.selected_task() {
                    self.mover.begin_drag(task.id);
                    self.mover.hover(Some(task.column_id));
                }
                None
            }
            Msg::HoverGrabLeft => {
                self.hover_shift(-1);
                None
            }
            Msg::HoverGrabRight => {
                self.hover_shift(1);
                None
            }
            Msg::DropTask => self.drop_grabbed_task(),
            Msg::CancelGrab => {
                self.mover.cancel();
                None
            }
            Msg::DialogInput(ch) => {
                self.dialog_input(ch);
                None
            }
            Msg::DialogBackspace => {
                self.dialog_backspace();
                None
            }
            Msg::FocusNextField => {
                self.focus_dialog_field(true);
                None
            }
            Msg::FocusPrevField => {
                self.focus_dialog_field(false);
                None
            }
            Msg::CycleFieldValue => {
                self.cycle_dialog_field();
                None
            }
            Msg::SubmitDialog | Msg::ConfirmAction => self.submit_dialog(),
            Msg::DismissDialog | Msg::CancelAction => {
                self.dismiss_active();
                None
            }
            Msg::FocusButton(label) => {
                if let Some(dialog) = self.delete_dialog.as_mut() {
                    dialog.focused_field = if label == "Delete" {
                        ConfirmCancelField::Confirm
                    } else {
                        ConfirmCancelField::Cancel
                    };
                }
                None
            }
            Msg::ToggleChatPanel => {
                self.chat_visible = !self.chat_visible;
                if !self.chat_visible {
                    self.chat.close_conversation();
                }
                None
            }
            Msg::NextContact => {
                self.selected_contact = step(self.selected_contact, 1, self.contact_count());
                None
            }
            Msg::PrevContact => {
                self.selected_contact = step(self.selected_contact, -1, self.contact_count());
                None
            }
            Msg::SelectContact(index) => {
                self.selected_contact = index.min(self.contact_count().saturating_sub(1));
                None
            }
            Msg::OpenConversation => self.open_conversation(),
            Msg::CloseConversation => {
                self.chat.close_conversation();
                None
            }
            Msg::ChatInput(ch) => {
                self.chat.draft_input.push(ch);
                None
            }
            Msg::ChatBackspace => {
                self.chat.draft_input.pop();
                None
            }
            Msg::SendChatMessage => match self.chat.send(&self.db, &self.bus) {
                Ok(_) => None,
                Err(error) => self.show_error(error),
            },
            Msg::ToggleViewMode => {
                self.view = match self.view {
                    ViewMode::Board => ViewMode::Table,
                    ViewMode::Table | ViewMode::Users => ViewMode::Board,
                };
                None
            }
            Msg::OpenUsersView => {
                self.view = ViewMode::Users;
                None
            }
            Msg::OpenProfileEditor => {
                if let Some(user) = self.store.users().get(self.users_selected) {
                    self.profile_editor = Some(ProfileEditorState::for_user(user));
                }
                None
            }
            Msg::OpenCommandPalette => {
                self.palette_visible = true;
                None
            }
            Msg::ExecuteCommand(command_id) => self.execute_command(&command_id),
            Msg::Tick => self.handle_tick(),
            Msg::Resize { .. } => None,
            Msg::Refresh => self.reconcile_now(),
            Msg::ToggleHelp => {
                self.help_visible = !self.help_visible;
                None
            }
            Msg::Quit => {
                self.quit = true;
                None
            }
            Msg::ShowError(detail) => {
                self.last_error = Some(detail);
                None
            }
        }
    }
}

fn editor_text_input(editor: &mut TaskEditorState) -> Option<&mut String> {
    match editor.focused_field {
        TaskEditorField::Title => Some(&mut editor.title_input),
        TaskEditorField::Description => Some(&mut editor.description_input),
        TaskEditorField::Client => Some(&mut editor.client_input),
        TaskEditorField::RequestDate => Some(&mut editor.request_date_input),
        TaskEditorField::DueDate => Some(&mut editor.due_date_input),
        TaskEditorField::Observation => Some(&mut editor.observation_input),
        TaskEditorField::ExternalRef => Some(&mut editor.external_ref_input),
        _ => None,
    }
}

fn step(current: usize, delta: isize, count: usize) -> usize {
    if count == 0 {
        return 0;
    }
    let next = current as isize + delta;
    next.clamp(0, count as isize - 1) as usize
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
