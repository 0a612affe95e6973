use std::collections::HashMap;

use chrono::Local;
use tuirealm::application::ApplicationResult;
use tuirealm::listener::EventListenerCfg;
use tuirealm::ratatui::layout::{Constraint, Direction, Layout, Rect};
use tuirealm::{
    Application, Frame, NoUserEvent, PollStrategy, Sub, SubClause, SubEventClause,
};
use uuid::Uuid;

use super::ComponentId;
use super::components::chat_sidebar::ContactEntry;
use super::components::{
    BoardColumn, ChatSidebar, CommandPalette, DeleteTaskDialog, ErrorDialog, Footer, HelpDialog,
    ProfileEditorDialog, TaskEditorDialog, TaskTable, UsersTable,
};
use super::messages::Msg;
use super::model::{Model, ViewMode};
use crate::app::chat::contacts;
use crate::app::users::user_rows;
use crate::keybindings::KeybindingDispatcher;
use crate::types::Task;

/// Wrapper around the tui-realm `Application` that owns the component
/// tree. Components are remounted from model snapshots whenever the
/// model reports itself dirty; they never hold authoritative state.
pub struct TuiApplication {
    app: Application<ComponentId, Msg, NoUserEvent>,
    keybindings: KeybindingDispatcher,
    last_viewport: Option<(u16, u16)>,
    mounted_columns: usize,
}

impl TuiApplication {
    pub fn new(keybindings: KeybindingDispatcher) -> Self {
        Self::with_listener(EventListenerCfg::default(), keybindings)
    }

    pub fn with_listener(
        listener_cfg: EventListenerCfg<NoUserEvent>,
        keybindings: KeybindingDispatcher,
    ) -> Self {
        Self {
            app: Application::init(listener_cfg),
            keybindings,
            last_viewport: None,
            mounted_columns: 0,
        }
    }

    pub fn tick(&mut self, strategy: PollStrategy) -> ApplicationResult<Vec<Msg>> {
        self.app.tick(strategy)
    }

    pub fn app(&self) -> &Application<ComponentId, Msg, NoUserEvent> {
        &self.app
    }

    pub fn app_mut(&mut self) -> &mut Application<ComponentId, Msg, NoUserEvent> {
        &mut self.app
    }

    pub fn view(&mut self, id: &ComponentId, frame: &mut Frame<'_>, area: Rect) {
        self.app.view(id, frame, area);
    }

    /// Remount the whole component tree from the current model snapshot.
    /// Dialogs are mounted only while their backing state exists.
    pub fn wire_components(&mut self, model: &Model) -> ApplicationResult<()> {
        let theme = model.theme.clone();
        let today = Local::now().date_naive();
        let assignee_names: HashMap<Uuid, String> = model
            .store
            .users()
            .iter()
            .map(|user| (user.id, user.name().to_string()))
            .collect();

        let columns = model.store.columns().to_vec();
        let column_count = columns.len();
        for (index, column) in columns.into_iter().enumerate() {
            let tasks: Vec<Task> = model.tasks_in_column(index).into_iter().cloned().collect();
            let selected = model
                .selected_task_per_column
                .get(&index)
                .copied()
                .unwrap_or(0);
            let drop_target = model.mover.hovered_column() == Some(column.id);
            let board_column = BoardColumn::new(
                index,
                column,
                tasks,
                assignee_names.clone(),
                theme.clone(),
                self.keybindings.clone(),
                today,
            )
            .with_selected(selected)
            .with_grab(model.mover.dragging().is_some(), drop_target);
            self.app.remount(
                ComponentId::BoardColumn(index),
                Box::new(board_column),
                vec![],
            )?;
        }
        for stale in column_count..self.mounted_columns {
            self.umount_if_mounted(ComponentId::BoardColumn(stale))?;
        }
        self.mounted_columns = column_count;

        self.app.remount(
            ComponentId::TaskTable,
            Box::new(
                TaskTable::new(
                    model.sorted_table_rows(),
                    model.table_sort,
                    theme.clone(),
                    self.keybindings.clone(),
                )
                .with_selected(model.table_selected),
            ),
            vec![],
        )?;

        self.app.remount(
            ComponentId::UsersTable,
            Box::new(
                UsersTable::new(
                    user_rows(model.store.users()),
                    theme.clone(),
                    self.keybindings.clone(),
                )
                .with_selected(model.users_selected),
            ),
            vec![],
        )?;

        let contact_entries: Vec<ContactEntry> =
            contacts(model.store.users(), model.current_user.id)
                .iter()
                .map(|contact| ContactEntry {
                    user_id: contact.user.id,
                    name: contact.user.name().to_string(),
                    online: contact.online,
                    unread: model.chat.unread_count(contact.user.id),
                })
                .collect();
        let mut sidebar = ChatSidebar::new(
            contact_entries,
            model.current_user.id,
            theme.clone(),
            self.keybindings.clone(),
        )
        .with_selected(model.selected_contact);
        if let Some(contact_id) = model.chat.open_contact() {
            let contact_name = model
                .store
                .user(contact_id)
                .map(|user| user.name().to_string())
                .unwrap_or_else(|| "Unknown".to_string());
            sidebar = sidebar.with_conversation(
                contact_name,
                model.chat.messages().to_vec(),
                model.chat.draft_input.clone(),
            );
        }
        self.app
            .remount(ComponentId::ChatSidebar, Box::new(sidebar), vec![])?;

        let mut footer = Footer::new(theme.clone());
        footer.set_notice(model.notice.clone());
        self.app.remount(
            ComponentId::Footer,
            Box::new(footer),
            vec![
                Sub::new(SubEventClause::Tick, SubClause::Always),
                Sub::new(SubEventClause::WindowResize, SubClause::Always),
            ],
        )?;

        if model.palette_visible {
            let frequencies = model.db.command_frequencies().unwrap_or_default();
            self.app.remount(
                ComponentId::CommandPalette,
                Box::new(CommandPalette::new(frequencies, theme.clone())),
                vec![],
            )?;
        } else {
            self.umount_if_mounted(ComponentId::CommandPalette)?;
        }

        if let Some(state) = &model.task_editor {
            let assignee_label = state
                .assignee_id
                .and_then(|id| model.store.assignee_name(Some(id)))
                .unwrap_or("Unassigned")
                .to_string();
            self.app.remount(
                ComponentId::TaskEditor,
                Box::new(TaskEditorDialog::new(
                    state.clone(),
                    assignee_label,
                    theme.clone(),
                )),
                vec![],
            )?;
        } else {
            self.umount_if_mounted(ComponentId::TaskEditor)?;
        }

        if let Some(state) = &model.delete_dialog {
            self.app.remount(
                ComponentId::DeleteTask,
                Box::new(DeleteTaskDialog::new(state, theme.clone())),
                vec![],
            )?;
        } else {
            self.umount_if_mounted(ComponentId::DeleteTask)?;
        }

        if let Some(state) = &model.profile_editor {
            self.app.remount(
                ComponentId::ProfileEditor,
                Box::new(ProfileEditorDialog::new(state.clone(), theme.clone())),
                vec![],
            )?;
        } else {
            self.umount_if_mounted(ComponentId::ProfileEditor)?;
        }

        if model.help_visible {
            self.app.remount(
                ComponentId::Help,
                Box::new(HelpDialog::new(theme.clone())),
                vec![],
            )?;
        } else {
            self.umount_if_mounted(ComponentId::Help)?;
        }

        if let Some(detail) = &model.last_error {
            self.app.remount(
                ComponentId::Error,
                Box::new(ErrorDialog::new(detail.clone(), theme)),
                vec![],
            )?;
        } else {
            self.umount_if_mounted(ComponentId::Error)?;
        }

        Ok(())
    }

    /// Give keyboard focus to whichever component the model says should
    /// hold it. Modals always win over the background view.
    pub fn sync_focus(&mut self, model: &Model) -> ApplicationResult<()> {
        let target = model.focus_target();
        if self.app.mounted(&target) && self.app.focus() != Some(&target) {
            self.app.active(&target)?;
        }
        Ok(())
    }

    /// Rewire on a genuine viewport change. Returns whether a redraw is
    /// needed; repeated resize events for the same size are dropped.
    pub fn handle_resize(&mut self, model: &Model, msg: &Msg) -> ApplicationResult<bool> {
        let (width, height) = match *msg {
            Msg::Resize { width, height } => (width, height),
            _ => return Ok(false),
        };

        let next_viewport = (width, height);
        if self.last_viewport == Some(next_viewport) {
            return Ok(false);
        }

        self.wire_components(model)?;
        self.sync_focus(model)?;
        self.last_viewport = Some(next_viewport);
        Ok(true)
    }

    /// Draw the full screen for the current model state.
    pub fn render(&mut self, model: &Model, frame: &mut Frame<'_>) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(2)])
            .split(frame.area());
        let (main_area, footer_area) = (rows[0], rows[1]);

        let content_area = if model.chat_visible {
            let split = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([
                    Constraint::Min(20),
                    Constraint::Percentage(model.settings.chat_panel_width),
                ])
                .split(main_area);
            self.app.view(&ComponentId::ChatSidebar, frame, split[1]);
            split[0]
        } else {
            main_area
        };

        match model.view {
            ViewMode::Board => {
                let count = model.store.columns().len().max(1);
                let constraints: Vec<Constraint> = (0..count)
                    .map(|_| Constraint::Ratio(1, count as u32))
                    .collect();
                let column_areas = Layout::default()
                    .direction(Direction::Horizontal)
                    .constraints(constraints)
                    .split(content_area);
                for index in 0..count {
                    let id = ComponentId::BoardColumn(index);
                    if self.app.mounted(&id) {
                        self.app.view(&id, frame, column_areas[index]);
                    }
                }
            }
            ViewMode::Table => self.app.view(&ComponentId::TaskTable, frame, content_area),
            ViewMode::Users => self.app.view(&ComponentId::UsersTable, frame, content_area),
        }

        self.app.view(&ComponentId::Footer, frame, footer_area);

        if let Some(modal) = model.active_modal()
            && self.app.mounted(&modal)
        {
            let area = centered_rect(frame.area(), 62, 68);
            self.app.view(&modal, frame, area);
        }
    }

    fn umount_if_mounted(&mut self, id: ComponentId) -> ApplicationResult<()> {
        if self.app.mounted(&id) {
            self.app.umount(&id)?;
        }
        Ok(())
    }
}

fn centered_rect(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);
    horizontal[1]
}
