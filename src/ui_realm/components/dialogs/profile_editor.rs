use tuirealm::command::{Cmd, CmdResult};
use tuirealm::event::{Key, KeyEvent, KeyModifiers};
use tuirealm::props::{AttrValue, Attribute, Props};
use tuirealm::ratatui::layout::Rect;
use tuirealm::ratatui::style::Style;
use tuirealm::ratatui::text::{Line, Span};
use tuirealm::ratatui::widgets::{Block, Borders, Clear, Paragraph};
use tuirealm::{Component, Event, Frame, MockComponent, NoUserEvent, State, StateValue};

use crate::app::users::{ProfileEditorField, ProfileEditorState};
use crate::theme::Theme;
use crate::ui_realm::messages::Msg;

/// Profile edit form for the users view. The email is shown but never
/// editable; role and status cycle through their enumerations.
pub struct ProfileEditorDialog {
    props: Props,
    state: ProfileEditorState,
    theme: Theme,
}

impl ProfileEditorDialog {
    pub fn new(state: ProfileEditorState, theme: Theme) -> Self {
        Self {
            props: Props::default(),
            state,
            theme,
        }
    }

    fn is_cycle_field(field: ProfileEditorField) -> bool {
        matches!(field, ProfileEditorField::Role | ProfileEditorField::Status)
    }

    fn focused_index(&self) -> usize {
        ProfileEditorField::ALL
            .iter()
            .position(|field| *field == self.state.focused_field)
            .unwrap_or(0)
    }

    fn field_line(&self, label: &str, value: &str, field: ProfileEditorField) -> Line<'static> {
        let focused = self.state.focused_field == field;
        let marker = if focused { ">" } else { " " };
        let style = if focused {
            Style::default().fg(self.theme.interactive.focus)
        } else {
            Style::default().fg(self.theme.base.text)
        };
        Line::from(vec![
            Span::styled(format!("{marker} {label}: "), style),
            Span::styled(value.to_string(), style),
        ])
    }

    fn actions_line(&self) -> Line<'static> {
        let focused_style = Style::default()
            .bg(self.theme.dialog.button_bg)
            .fg(self.theme.dialog.button_fg);
        let save_style = if self.state.focused_field == ProfileEditorField::Save {
            focused_style
        } else {
            Style::default().fg(self.theme.base.text)
        };
        let cancel_style = if self.state.focused_field == ProfileEditorField::Cancel {
            focused_style
        } else {
            Style::default().fg(self.theme.base.text)
        };
        Line::from(vec![
            Span::raw("  "),
            Span::styled("[ Save ]", save_style),
            Span::raw("  "),
            Span::styled("[ Cancel ]", cancel_style),
        ])
    }
}

impl MockComponent for ProfileEditorDialog {
    fn view(&mut self, frame: &mut Frame, area: Rect) {
        frame.render_widget(Clear, area);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.interactive.focus))
            .style(Style::default().bg(self.theme.dialog.surface))
            .title(" Edit Profile ");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if inner.height == 0 || inner.width == 0 {
            return;
        }

        let lines = vec![
            Line::from(Span::styled(
                format!("  Email: {}", self.state.email),
                Style::default().fg(self.theme.base.text_muted),
            )),
            self.field_line(
                "Name",
                &self.state.display_name_input,
                ProfileEditorField::DisplayName,
            ),
            self.field_line("Role", self.state.role.label(), ProfileEditorField::Role),
            self.field_line(
                "Status",
                self.state.status.label(),
                ProfileEditorField::Status,
            ),
            Line::default(),
            self.actions_line(),
        ];

        frame.render_widget(Paragraph::new(lines), inner);
    }

    fn query(&self, attr: Attribute) -> Option<AttrValue> {
        self.props.get(attr)
    }

    fn attr(&mut self, attr: Attribute, value: AttrValue) {
        self.props.set(attr, value);
    }

    fn state(&self) -> State {
        State::One(StateValue::U16(self.focused_index() as u16))
    }

    fn perform(&mut self, _cmd: Cmd) -> CmdResult {
        CmdResult::None
    }
}

impl Component<Msg, NoUserEvent> for ProfileEditorDialog {
    fn on(&mut self, ev: Event<NoUserEvent>) -> Option<Msg> {
        let focused = self.state.focused_field;
        match ev {
            Event::Keyboard(KeyEvent { code: Key::Tab, .. })
            | Event::Keyboard(KeyEvent {
                code: Key::Down, ..
            }) => Some(Msg::FocusNextField),
            Event::Keyboard(KeyEvent {
                code: Key::BackTab, ..
            })
            | Event::Keyboard(KeyEvent { code: Key::Up, .. }) => Some(Msg::FocusPrevField),
            Event::Keyboard(KeyEvent {
                code: Key::Left, ..
            }) => match focused {
                ProfileEditorField::Cancel => Some(Msg::FocusPrevField),
                field if Self::is_cycle_field(field) => Some(Msg::CycleFieldValue),
                _ => None,
            },
            Event::Keyboard(KeyEvent {
                code: Key::Right, ..
            }) => match focused {
                ProfileEditorField::Save => Some(Msg::FocusNextField),
                field if Self::is_cycle_field(field) => Some(Msg::CycleFieldValue),
                _ => None,
            },
            Event::Keyboard(KeyEvent {
                code: Key::Enter, ..
            }) => match focused {
                ProfileEditorField::Save => Some(Msg::SubmitDialog),
                ProfileEditorField::Cancel => Some(Msg::CancelAction),
                field if Self::is_cycle_field(field) => Some(Msg::CycleFieldValue),
                _ => Some(Msg::FocusNextField),
            },
            Event::Keyboard(KeyEvent { code: Key::Esc, .. }) => Some(Msg::DismissDialog),
            Event::Keyboard(KeyEvent {
                code: Key::Backspace,
                ..
            }) => Some(Msg::DialogBackspace),
            Event::Keyboard(KeyEvent {
                code: Key::Char(' '),
                ..
            }) if Self::is_cycle_field(focused) => Some(Msg::CycleFieldValue),
            Event::Keyboard(KeyEvent {
                code: Key::Char(ch),
                modifiers,
            }) if !modifiers.contains(KeyModifiers::CONTROL)
                && !modifiers.contains(KeyModifiers::ALT) =>
            {
                Some(Msg::DialogInput(ch))
            }
            _ => None,
        }
    }
}
