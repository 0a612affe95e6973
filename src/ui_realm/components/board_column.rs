use std::collections::HashMap;

use chrono::NaiveDate;
use tuirealm::command::{Cmd, CmdResult};
use tuirealm::event::{Key, KeyEvent};
use tuirealm::props::{AttrValue, Attribute, Props};
use tuirealm::ratatui::layout::{Alignment, Rect};
use tuirealm::ratatui::style::{Modifier, Style};
use tuirealm::ratatui::text::{Line, Span};
use tuirealm::ratatui::widgets::{Block, BorderType, Borders, Paragraph};
use tuirealm::{Component, Event, Frame, MockComponent, NoUserEvent, State, StateValue};
use uuid::Uuid;

use crate::app::board::due_date_urgency;
use crate::keybindings::dispatcher::{Action, KeybindingDispatcher};
use crate::theme::Theme;
use crate::types::{Column, Priority, Task};
use crate::ui_realm::components::{global_action_msg, to_crossterm_key};
use crate::ui_realm::messages::Msg;

/// Lines each task occupies in the column body: title, detail, separator.
const LINES_PER_TASK: usize = 3;

pub struct BoardColumn {
    props: Props,
    column_index: usize,
    column: Column,
    tasks: Vec<Task>,
    assignee_names: HashMap<Uuid, String>,
    theme: Theme,
    keybindings: KeybindingDispatcher,
    today: NaiveDate,
    grab_active: bool,
    drop_target: bool,
    selected_index: usize,
    scroll_offset: usize,
    viewport_tasks: usize,
}

impl BoardColumn {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        column_index: usize,
        column: Column,
        tasks: Vec<Task>,
        assignee_names: HashMap<Uuid, String>,
        theme: Theme,
        keybindings: KeybindingDispatcher,
        today: NaiveDate,
    ) -> Self {
        Self {
            props: Props::default(),
            column_index,
            column,
            tasks,
            assignee_names,
            theme,
            keybindings,
            today,
            grab_active: false,
            drop_target: false,
            selected_index: 0,
            scroll_offset: 0,
            viewport_tasks: 0,
        }
    }

    pub fn with_selected(mut self, selected_index: usize) -> Self {
        self.selected_index = selected_index;
        self.clamp_selection();
        self
    }

    pub fn with_grab(mut self, grab_active: bool, drop_target: bool) -> Self {
        self.grab_active = grab_active;
        self.drop_target = drop_target;
        self
    }

    fn is_focused(&self) -> bool {
        self.props.get(Attribute::Focus) == Some(AttrValue::Flag(true))
    }

    fn clamp_selection(&mut self) {
        if self.tasks.is_empty() {
            self.selected_index = 0;
        } else {
            self.selected_index = self.selected_index.min(self.tasks.len() - 1);
        }
    }

    fn clamp_scroll_offset(&mut self) {
        if self.tasks.is_empty() || self.viewport_tasks == 0 {
            self.scroll_offset = 0;
            return;
        }
        let max_offset = self.tasks.len().saturating_sub(self.viewport_tasks);
        self.scroll_offset = self.scroll_offset.min(max_offset);
    }

    fn ensure_selected_visible(&mut self) {
        if self.viewport_tasks == 0 {
            return;
        }
        if self.selected_index < self.scroll_offset {
            self.scroll_offset = self.selected_index;
        } else if self.selected_index >= self.scroll_offset + self.viewport_tasks {
            self.scroll_offset = self.selected_index + 1 - self.viewport_tasks;
        }
    }

    fn move_selection_by(&mut self, delta: isize) -> bool {
        if self.tasks.is_empty() {
            self.selected_index = 0;
            return false;
        }

        let current = self.selected_index as isize;
        let max_index = (self.tasks.len() - 1) as isize;
        let next = (current + delta).clamp(0, max_index) as usize;
        if next == self.selected_index {
            return false;
        }

        self.selected_index = next;
        self.ensure_selected_visible();
        true
    }

    fn page_delta(&self) -> isize {
        self.viewport_tasks.max(1) as isize
    }

    fn select_msg(&self) -> Msg {
        Msg::SelectTask {
            column: self.column_index,
            task: self.selected_index,
        }
    }

    fn assignee_name(&self, task: &Task) -> Option<&str> {
        task.assignee_id
            .and_then(|id| self.assignee_names.get(&id))
            .map(String::as_str)
    }

    fn priority_icon(priority: Priority) -> &'static str {
        match priority {
            Priority::High => "▲",
            Priority::Medium => "●",
            Priority::Low => "▼",
        }
    }

    fn task_lines(&self, index: usize, task: &Task, width: usize) -> Vec<Line<'static>> {
        let is_selected = index == self.selected_index && self.is_focused();
        let carried = is_selected && self.grab_active && !self.drop_target;
        let colors = self.theme.card_colors(is_selected, false);
        let row_style = Style::default().bg(colors.background);

        let marker = if is_selected { "▸ " } else { "  " };
        let icon = Self::priority_icon(task.priority);
        let title_style = if task.completed {
            Style::default()
                .fg(self.theme.base.text_muted)
                .add_modifier(Modifier::CROSSED_OUT)
        } else if is_selected {
            Style::default()
                .fg(self.theme.interactive.focus)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(self.theme.base.text)
        };

        let mut title_spans = vec![
            Span::styled(
                marker.to_string(),
                Style::default().fg(self.theme.interactive.focus),
            ),
            Span::styled(
                format!("{icon} "),
                Style::default().fg(self.theme.priority_color(task.priority)),
            ),
            Span::styled(truncate(&task.title, width.saturating_sub(6)), title_style),
        ];
        if carried {
            title_spans.push(Span::styled(
                " [grabbed]".to_string(),
                Style::default().fg(self.theme.interactive.drop_target),
            ));
        }

        let mut detail_spans = vec![Span::raw("    ".to_string())];
        match self.assignee_name(task) {
            Some(name) => detail_spans.push(Span::styled(
                truncate(name, 16),
                Style::default().fg(self.theme.card.assignee),
            )),
            None => detail_spans.push(Span::styled(
                "unassigned".to_string(),
                Style::default().fg(self.theme.base.text_muted),
            )),
        }
        if let Some(client) = task.client.as_deref().filter(|c| !c.is_empty()) {
            detail_spans.push(Span::raw("  "));
            detail_spans.push(Span::styled(
                truncate(client, 14),
                Style::default().fg(self.theme.card.client),
            ));
        }
        if let Some(due) = task.due_date.as_deref() {
            let urgency = due_date_urgency(Some(due), self.today);
            detail_spans.push(Span::raw("  "));
            detail_spans.push(Span::styled(
                due.to_string(),
                Style::default().fg(self.theme.urgency_color(urgency)),
            ));
        }

        vec![
            Line::from(title_spans).style(row_style),
            Line::from(detail_spans).style(row_style),
            Line::from(""),
        ]
    }
}

impl MockComponent for BoardColumn {
    fn view(&mut self, frame: &mut Frame, area: Rect) {
        let focused = self.is_focused();
        let border_color = if self.drop_target {
            self.theme.interactive.drop_target
        } else if focused {
            self.theme.interactive.focus
        } else {
            self.theme.interactive.border
        };
        let border_type = if focused || self.drop_target {
            BorderType::Double
        } else {
            BorderType::Plain
        };

        let title = if self.drop_target {
            format!(" {} ({}) ▼ drop here ", self.column.title, self.tasks.len())
        } else {
            format!(" {} ({}) ", self.column.title, self.tasks.len())
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(border_type)
            .border_style(Style::default().fg(border_color))
            .title(Span::styled(title, Style::default().fg(border_color)))
            .title_alignment(Alignment::Center);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if inner.height == 0 || inner.width == 0 {
            return;
        }

        self.viewport_tasks = (inner.height as usize / LINES_PER_TASK).max(1);
        self.clamp_selection();
        self.clamp_scroll_offset();
        self.ensure_selected_visible();

        if self.tasks.is_empty() {
            frame.render_widget(
                Paragraph::new("No tasks")
                    .alignment(Alignment::Center)
                    .style(Style::default().fg(self.theme.base.text_muted)),
                inner,
            );
            return;
        }

        let width = inner.width as usize;
        let lines = self
            .tasks
            .iter()
            .enumerate()
            .skip(self.scroll_offset)
            .take(self.viewport_tasks)
            .flat_map(|(index, task)| self.task_lines(index, task, width))
            .collect::<Vec<_>>();

        frame.render_widget(Paragraph::new(lines), inner);
    }

    fn query(&self, attr: Attribute) -> Option<AttrValue> {
        self.props.get(attr)
    }

    fn attr(&mut self, attr: Attribute, value: AttrValue) {
        self.props.set(attr, value);
    }

    fn state(&self) -> State {
        State::One(StateValue::U16(self.selected_index as u16))
    }

    fn perform(&mut self, _cmd: Cmd) -> CmdResult {
        CmdResult::None
    }
}

impl Component<Msg, NoUserEvent> for BoardColumn {
    fn on(&mut self, ev: Event<NoUserEvent>) -> Option<Msg> {
        let Event::Keyboard(key) = ev else {
            return None;
        };

        if self.grab_active {
            return match key {
                KeyEvent {
                    code: Key::Left | Key::Char('h'),
                    ..
                } => Some(Msg::HoverGrabLeft),
                KeyEvent {
                    code: Key::Right | Key::Char('l'),
                    ..
                } => Some(Msg::HoverGrabRight),
                KeyEvent {
                    code: Key::Enter | Key::Char(' '),
                    ..
                } => Some(Msg::DropTask),
                KeyEvent { code: Key::Esc, .. } => Some(Msg::CancelGrab),
                _ => None,
            };
        }

        match key {
            KeyEvent {
                code: Key::Char(' '),
                ..
            } => {
                if self.tasks.is_empty() {
                    return None;
                }
                return Some(Msg::GrabTask);
            }
            KeyEvent {
                code: Key::PageUp, ..
            } => {
                let delta = -self.page_delta();
                return self.move_selection_by(delta).then(|| self.select_msg());
            }
            KeyEvent {
                code: Key::PageDown,
                ..
            } => {
                let delta = self.page_delta();
                return self.move_selection_by(delta).then(|| self.select_msg());
            }
            KeyEvent {
                code: Key::Home, ..
            } => {
                let delta = -(self.tasks.len() as isize);
                return self.move_selection_by(delta).then(|| self.select_msg());
            }
            KeyEvent { code: Key::End, .. } => {
                let delta = self.tasks.len() as isize;
                return self.move_selection_by(delta).then(|| self.select_msg());
            }
            _ => {}
        }

        let action = self.keybindings.map_key(to_crossterm_key(key))?;
        match action {
            Action::NavigateLeft => {
                if self.column_index == 0 {
                    None
                } else {
                    Some(Msg::FocusColumn(self.column_index - 1))
                }
            }
            Action::NavigateRight => Some(Msg::FocusColumn(self.column_index + 1)),
            Action::SelectUp => self.move_selection_by(-1).then(|| self.select_msg()),
            Action::SelectDown => self.move_selection_by(1).then(|| self.select_msg()),
            Action::MoveTaskLeft => (!self.tasks.is_empty()).then_some(Msg::MoveTaskLeft),
            Action::MoveTaskRight => (!self.tasks.is_empty()).then_some(Msg::MoveTaskRight),
            Action::OpenNewTaskDialog => Some(Msg::OpenNewTaskDialog),
            Action::OpenEditTaskDialog | Action::Submit => {
                (!self.tasks.is_empty()).then_some(Msg::OpenEditTaskDialog)
            }
            Action::CompleteTask => (!self.tasks.is_empty()).then_some(Msg::CompleteTask),
            Action::OpenDeleteTaskDialog => {
                (!self.tasks.is_empty()).then_some(Msg::OpenDeleteTaskDialog)
            }
            Action::NextContact => Some(Msg::NextContact),
            Action::PrevContact => Some(Msg::PrevContact),
            other => global_action_msg(other),
        }
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let truncated = text
        .chars()
        .take(max_chars.saturating_sub(1))
        .collect::<String>();
    format!("{truncated}…")
}

#[cfg(test)]
use crate::keybindings::loader::default_config;
#[cfg(test)]
use crate::types::{Status, TaskKind};
#[cfg(test)]
use crate::ui_realm::ComponentId;
#[cfg(test)]
use crate::ui_realm::tests::harness::{EventDriver, MockTerminal};
#[cfg(test)]
use crate::ui_realm::tests::helpers::{
    mount_component_for_test, render_component, send_key_to_component,
};
#[cfg(test)]
use crossterm::event::KeyCode;

#[cfg(test)]
fn sample_column(title: &str, position: i64) -> Column {
    Column {
        id: Uuid::new_v4(),
        title: title.to_string(),
        column_type: None,
        position,
        created_at: "2026-01-01T00:00:00Z".to_string(),
    }
}

#[cfg(test)]
fn sample_task(title: &str, column_id: Uuid) -> Task {
    Task {
        id: Uuid::new_v4(),
        title: title.to_string(),
        description: None,
        status: Status::Pending,
        priority: Priority::Medium,
        kind: TaskKind::Task,
        assignee_id: None,
        client: Some("Acme".to_string()),
        request_date: None,
        due_date: None,
        observation: None,
        external_ref: None,
        column_id,
        completed: false,
        created_at: "2026-01-01T00:00:00Z".to_string(),
        updated_at: "2026-01-01T00:00:00Z".to_string(),
    }
}

#[cfg(test)]
fn test_column_component(tasks: Vec<Task>) -> BoardColumn {
    let column = sample_column("To Do", 0);
    BoardColumn::new(
        0,
        column,
        tasks,
        HashMap::new(),
        Theme::default(),
        KeybindingDispatcher::from_config(default_config()),
        NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
    )
}

#[cfg(test)]
#[test]
fn renders_header_with_count() {
    let driver = EventDriver::default();
    let column = sample_column("In Progress", 1);
    let tasks = vec![
        sample_task("First", column.id),
        sample_task("Second", column.id),
    ];
    let component = BoardColumn::new(
        1,
        column,
        tasks,
        HashMap::new(),
        Theme::default(),
        KeybindingDispatcher::from_config(default_config()),
        NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
    );

    let mut app =
        mount_component_for_test(&driver, ComponentId::BoardColumn(1), Box::new(component));
    let mut terminal = MockTerminal::new(40, 16);
    let rendered = render_component(&mut app, ComponentId::BoardColumn(1), &mut terminal);

    assert!(
        rendered.contains("In Progress (2)"),
        "column header should include title and task count"
    );
    assert!(rendered.contains("First"), "task titles should render");
    assert!(rendered.contains("Second"), "task titles should render");
}

#[cfg(test)]
#[test]
fn renders_empty_state() {
    let driver = EventDriver::default();
    let component = test_column_component(vec![]);

    let mut app =
        mount_component_for_test(&driver, ComponentId::BoardColumn(0), Box::new(component));
    let mut terminal = MockTerminal::new(30, 12);
    let rendered = render_component(&mut app, ComponentId::BoardColumn(0), &mut terminal);

    assert!(
        rendered.contains("No tasks"),
        "empty column should render placeholder"
    );
}

#[cfg(test)]
#[test]
fn selection_emits_msg() {
    let driver = EventDriver::default();
    let column = sample_column("To Do", 0);
    let tasks = vec![
        sample_task("First", column.id),
        sample_task("Second", column.id),
    ];
    let component = BoardColumn::new(
        0,
        column,
        tasks,
        HashMap::new(),
        Theme::default(),
        KeybindingDispatcher::from_config(default_config()),
        NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
    );

    let mut app =
        mount_component_for_test(&driver, ComponentId::BoardColumn(0), Box::new(component));
    let messages = send_key_to_component(&driver, &mut app, &[KeyCode::Down], 1);
    assert_eq!(messages, vec![Msg::SelectTask { column: 0, task: 1 }]);

    // Already at the bottom, further movement emits nothing.
    let messages = send_key_to_component(&driver, &mut app, &[KeyCode::Down], 1);
    assert!(messages.is_empty());
}

#[cfg(test)]
#[test]
fn navigation_keys_emit_focus_msgs() {
    let driver = EventDriver::default();
    let component = test_column_component(vec![]);
    let mut app =
        mount_component_for_test(&driver, ComponentId::BoardColumn(0), Box::new(component));

    let messages = send_key_to_component(&driver, &mut app, &[KeyCode::Right], 1);
    assert_eq!(messages, vec![Msg::FocusColumn(1)]);

    // Leftmost column swallows further left navigation.
    let messages = send_key_to_component(&driver, &mut app, &[KeyCode::Left], 1);
    assert!(messages.is_empty());
}

#[cfg(test)]
#[test]
fn grab_mode_keys() {
    let driver = EventDriver::default();
    let column = sample_column("To Do", 0);
    let tasks = vec![sample_task("Carry me", column.id)];
    let component = BoardColumn::new(
        0,
        column,
        tasks,
        HashMap::new(),
        Theme::default(),
        KeybindingDispatcher::from_config(default_config()),
        NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
    )
    .with_grab(true, false);

    let mut app =
        mount_component_for_test(&driver, ComponentId::BoardColumn(0), Box::new(component));

    let messages = send_key_to_component(&driver, &mut app, &[KeyCode::Right], 1);
    assert_eq!(messages, vec![Msg::HoverGrabRight]);

    let messages = send_key_to_component(&driver, &mut app, &[KeyCode::Enter], 1);
    assert_eq!(messages, vec![Msg::DropTask]);

    let messages = send_key_to_component(&driver, &mut app, &[KeyCode::Esc], 1);
    assert_eq!(messages, vec![Msg::CancelGrab]);
}

#[cfg(test)]
#[test]
fn space_grabs_selected_task() {
    let driver = EventDriver::default();
    let column = sample_column("To Do", 0);
    let tasks = vec![sample_task("Carry me", column.id)];
    let component = BoardColumn::new(
        0,
        column,
        tasks,
        HashMap::new(),
        Theme::default(),
        KeybindingDispatcher::from_config(default_config()),
        NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
    );

    let mut app =
        mount_component_for_test(&driver, ComponentId::BoardColumn(0), Box::new(component));
    let messages = send_key_to_component(&driver, &mut app, &[KeyCode::Char(' ')], 1);
    assert_eq!(messages, vec![Msg::GrabTask]);
}

#[cfg(test)]
#[test]
fn task_action_keys_emit_msgs() {
    let driver = EventDriver::default();
    let column = sample_column("To Do", 0);
    let tasks = vec![sample_task("Target", column.id)];
    let component = BoardColumn::new(
        0,
        column,
        tasks,
        HashMap::new(),
        Theme::default(),
        KeybindingDispatcher::from_config(default_config()),
        NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
    );

    let mut app =
        mount_component_for_test(&driver, ComponentId::BoardColumn(0), Box::new(component));

    let messages = send_key_to_component(&driver, &mut app, &[KeyCode::Char('n')], 1);
    assert_eq!(messages, vec![Msg::OpenNewTaskDialog]);

    let messages = send_key_to_component(&driver, &mut app, &[KeyCode::Char('e')], 1);
    assert_eq!(messages, vec![Msg::OpenEditTaskDialog]);

    let messages = send_key_to_component(&driver, &mut app, &[KeyCode::Char('q')], 1);
    assert_eq!(messages, vec![Msg::Quit]);
}
