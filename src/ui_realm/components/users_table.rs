use tuirealm::command::{Cmd, CmdResult};
use tuirealm::event::{Key, KeyEvent};
use tuirealm::props::{AttrValue, Attribute, Props};
use tuirealm::ratatui::layout::{Alignment, Rect};
use tuirealm::ratatui::style::{Modifier, Style};
use tuirealm::ratatui::text::{Line, Span};
use tuirealm::ratatui::widgets::{Block, BorderType, Borders, Paragraph};
use tuirealm::{Component, Event, Frame, MockComponent, NoUserEvent, State, StateValue};

use crate::app::users::UserRow;
use crate::keybindings::dispatcher::{Action, KeybindingDispatcher};
use crate::theme::Theme;
use crate::types::UserStatus;
use crate::ui_realm::components::{global_action_msg, to_crossterm_key};
use crate::ui_realm::messages::Msg;

pub struct UsersTable {
    props: Props,
    rows: Vec<UserRow>,
    theme: Theme,
    keybindings: KeybindingDispatcher,
    selected_index: usize,
    scroll_offset: usize,
    viewport_rows: usize,
}

impl UsersTable {
    pub fn new(rows: Vec<UserRow>, theme: Theme, keybindings: KeybindingDispatcher) -> Self {
        Self {
            props: Props::default(),
            rows,
            theme,
            keybindings,
            selected_index: 0,
            scroll_offset: 0,
            viewport_rows: 0,
        }
    }

    pub fn with_selected(mut self, selected_index: usize) -> Self {
        self.selected_index = selected_index;
        self.clamp_selection();
        self
    }

    fn is_focused(&self) -> bool {
        self.props.get(Attribute::Focus) == Some(AttrValue::Flag(true))
    }

    fn clamp_selection(&mut self) {
        if self.rows.is_empty() {
            self.selected_index = 0;
        } else {
            self.selected_index = self.selected_index.min(self.rows.len() - 1);
        }
    }

    fn ensure_selected_visible(&mut self) {
        if self.viewport_rows == 0 {
            return;
        }
        if self.selected_index < self.scroll_offset {
            self.scroll_offset = self.selected_index;
        } else if self.selected_index >= self.scroll_offset + self.viewport_rows {
            self.scroll_offset = self.selected_index + 1 - self.viewport_rows;
        }
    }

    fn move_selection_by(&mut self, delta: isize) -> bool {
        if self.rows.is_empty() {
            self.selected_index = 0;
            return false;
        }

        let current = self.selected_index as isize;
        let max_index = (self.rows.len() - 1) as isize;
        let next = (current + delta).clamp(0, max_index) as usize;
        if next == self.selected_index {
            return false;
        }

        self.selected_index = next;
        self.ensure_selected_visible();
        true
    }

    fn status_color(&self, status: UserStatus) -> tuirealm::ratatui::style::Color {
        match status {
            UserStatus::Active => self.theme.card.online,
            UserStatus::Inactive => self.theme.card.offline,
            UserStatus::Pending => self.theme.base.text_muted,
        }
    }

    fn row_line(&self, index: usize, row: &UserRow) -> Line<'static> {
        let is_selected = index == self.selected_index && self.is_focused();
        let row_style = if is_selected {
            Style::default().bg(self.theme.interactive.selected_bg)
        } else {
            Style::default()
        };
        let marker = if is_selected { "▸ " } else { "  " };
        let presence = if row.status == UserStatus::Active {
            "●"
        } else {
            "○"
        };

        Line::from(vec![
            Span::styled(
                marker.to_string(),
                Style::default().fg(self.theme.interactive.focus),
            ),
            Span::styled(
                format!("{presence} "),
                Style::default().fg(self.status_color(row.status)),
            ),
            Span::styled(
                pad(&row.name, 20),
                Style::default().fg(self.theme.base.text),
            ),
            Span::styled(
                pad(&row.email, 28),
                Style::default().fg(self.theme.base.text_muted),
            ),
            Span::styled(
                pad(row.role.label(), 10),
                Style::default().fg(self.theme.base.accent),
            ),
            Span::styled(
                pad(row.status.label(), 10),
                Style::default().fg(self.status_color(row.status)),
            ),
            Span::styled(
                row.created_at.clone(),
                Style::default().fg(self.theme.base.text_muted),
            ),
        ])
        .style(row_style)
    }
}

impl MockComponent for UsersTable {
    fn view(&mut self, frame: &mut Frame, area: Rect) {
        let focused = self.is_focused();
        let border_color = if focused {
            self.theme.interactive.focus
        } else {
            self.theme.interactive.border
        };
        let border_type = if focused {
            BorderType::Double
        } else {
            BorderType::Plain
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(border_type)
            .border_style(Style::default().fg(border_color))
            .title(Span::styled(
                format!(" Users ({}) ", self.rows.len()),
                Style::default().fg(border_color),
            ))
            .title_alignment(Alignment::Center);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if inner.height == 0 || inner.width == 0 {
            return;
        }

        self.viewport_rows = (inner.height as usize).saturating_sub(1).max(1);
        self.clamp_selection();
        self.ensure_selected_visible();

        if self.rows.is_empty() {
            frame.render_widget(
                Paragraph::new("No users")
                    .alignment(Alignment::Center)
                    .style(Style::default().fg(self.theme.base.text_muted)),
                inner,
            );
            return;
        }

        let header = Line::from(vec![
            Span::raw("    ".to_string()),
            Span::styled(
                format!(
                    "{}{}{}{}{}",
                    pad("Name", 20),
                    pad("Email", 28),
                    pad("Role", 10),
                    pad("Status", 10),
                    "Joined"
                ),
                Style::default()
                    .fg(self.theme.base.header)
                    .add_modifier(Modifier::BOLD),
            ),
        ]);

        let mut lines = vec![header];
        lines.extend(
            self.rows
                .iter()
                .enumerate()
                .skip(self.scroll_offset)
                .take(self.viewport_rows)
                .map(|(index, row)| self.row_line(index, row)),
        );

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

impl Component<Msg, NoUserEvent> for UsersTable {
    fn on(&mut self, ev: Event<NoUserEvent>) -> Option<Msg> {
        let Event::Keyboard(key) = ev else {
            return None;
        };

        if let KeyEvent { code: Key::Esc, .. } = key {
            return Some(Msg::DismissDialog);
        }

        let action = self.keybindings.map_key(to_crossterm_key(key))?;
        match action {
            Action::SelectUp => self
                .move_selection_by(-1)
                .then(|| Msg::SelectUserRow(self.selected_index)),
            Action::SelectDown => self
                .move_selection_by(1)
                .then(|| Msg::SelectUserRow(self.selected_index)),
            Action::OpenEditTaskDialog | Action::Submit => {
                (!self.rows.is_empty()).then_some(Msg::OpenProfileEditor)
            }
            other => global_action_msg(other),
        }
    }
}

fn pad(text: &str, width: usize) -> String {
    let mut cell = String::with_capacity(width + 1);
    let mut count = 0;
    for ch in text.chars() {
        if count + 1 >= width {
            cell.push('…');
            count += 1;
            break;
        }
        cell.push(ch);
        count += 1;
    }
    while count < width {
        cell.push(' ');
        count += 1;
    }
    cell
}

#[cfg(test)]
mod users_table {
    use crossterm::event::KeyCode;
    use uuid::Uuid;

    use super::UsersTable;
    use crate::app::users::UserRow;
    use crate::keybindings::dispatcher::KeybindingDispatcher;
    use crate::keybindings::loader::default_config;
    use crate::theme::Theme;
    use crate::types::{Role, UserStatus};
    use crate::ui_realm::ComponentId;
    use crate::ui_realm::messages::Msg;
    use crate::ui_realm::tests::harness::{EventDriver, MockTerminal};
    use crate::ui_realm::tests::helpers::{
        mount_component_for_test, render_component, send_key_to_component,
    };

    fn sample_row(name: &str, email: &str, role: Role, status: UserStatus) -> UserRow {
        UserRow {
            user_id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            role,
            status,
            created_at: "2026-01-15".to_string(),
        }
    }

    fn test_table(rows: Vec<UserRow>) -> UsersTable {
        UsersTable::new(
            rows,
            Theme::default(),
            KeybindingDispatcher::from_config(default_config()),
        )
    }

    #[test]
    fn renders_rows() {
        let driver = EventDriver::default();
        let rows = vec![
            sample_row("Ana Souza", "ana@example.com", Role::Admin, UserStatus::Active),
            sample_row("Bruno Lima", "bruno@example.com", Role::User, UserStatus::Pending),
        ];
        let mut app =
            mount_component_for_test(&driver, ComponentId::UsersTable, Box::new(test_table(rows)));

        let mut terminal = MockTerminal::new(100, 14);
        let rendered = render_component(&mut app, ComponentId::UsersTable, &mut terminal);

        assert!(rendered.contains("Users (2)"), "title should show count");
        assert!(rendered.contains("Ana Souza"));
        assert!(rendered.contains("bruno@example.com"));
        assert!(rendered.contains("Admin"), "role labels should render");
    }

    #[test]
    fn renders_empty_state() {
        let driver = EventDriver::default();
        let mut app = mount_component_for_test(
            &driver,
            ComponentId::UsersTable,
            Box::new(test_table(vec![])),
        );

        let mut terminal = MockTerminal::new(80, 10);
        let rendered = render_component(&mut app, ComponentId::UsersTable, &mut terminal);

        assert!(rendered.contains("No users"));
    }

    #[test]
    fn selection_and_open_profile() {
        let driver = EventDriver::default();
        let rows = vec![
            sample_row("Ana", "ana@example.com", Role::User, UserStatus::Active),
            sample_row("Bruno", "bruno@example.com", Role::User, UserStatus::Active),
        ];
        let mut app =
            mount_component_for_test(&driver, ComponentId::UsersTable, Box::new(test_table(rows)));

        let messages = send_key_to_component(&driver, &mut app, &[KeyCode::Down], 1);
        assert_eq!(messages, vec![Msg::SelectUserRow(1)]);

        let messages = send_key_to_component(&driver, &mut app, &[KeyCode::Enter], 1);
        assert_eq!(messages, vec![Msg::OpenProfileEditor]);
    }

    #[test]
    fn esc_leaves_users_view() {
        let driver = EventDriver::default();
        let mut app = mount_component_for_test(
            &driver,
            ComponentId::UsersTable,
            Box::new(test_table(vec![])),
        );

        let messages = send_key_to_component(&driver, &mut app, &[KeyCode::Esc], 1);
        assert_eq!(messages, vec![Msg::DismissDialog]);
    }
}
