use tuirealm::command::{Cmd, CmdResult};
use tuirealm::event::{Key, KeyEvent, KeyModifiers};
use tuirealm::props::{AttrValue, Attribute, Props};
use tuirealm::ratatui::layout::Rect;
use tuirealm::ratatui::style::Style;
use tuirealm::ratatui::text::{Line, Span};
use tuirealm::ratatui::widgets::{Block, Borders, Clear, Paragraph};
use tuirealm::{Component, Event, Frame, MockComponent, NoUserEvent, State, StateValue};

use crate::app::editor::{EditorMode, TaskEditorField, TaskEditorState};
use crate::theme::Theme;
use crate::ui_realm::messages::Msg;

/// Task create/edit form. The form state lives in the model; this
/// component renders a snapshot of it and translates keys into the
/// generic dialog messages.
pub struct TaskEditorDialog {
    props: Props,
    state: TaskEditorState,
    assignee_label: String,
    theme: Theme,
}

impl TaskEditorDialog {
    pub fn new(state: TaskEditorState, assignee_label: String, theme: Theme) -> Self {
        Self {
            props: Props::default(),
            state,
            assignee_label,
            theme,
        }
    }

    fn title(&self) -> &'static str {
        match self.state.mode {
            EditorMode::Create => " New Task ",
            EditorMode::Edit { .. } => " Edit Task ",
        }
    }

    fn is_cycle_field(field: TaskEditorField) -> bool {
        matches!(
            field,
            TaskEditorField::Status
                | TaskEditorField::Priority
                | TaskEditorField::Kind
                | TaskEditorField::Assignee
        )
    }

    fn focused_index(&self) -> usize {
        TaskEditorField::ALL
            .iter()
            .position(|field| *field == self.state.focused_field)
            .unwrap_or(0)
    }

    fn field_line(&self, label: &str, value: &str, field: TaskEditorField) -> Line<'static> {
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
        let save_style = if self.state.focused_field == TaskEditorField::Save {
            focused_style
        } else {
            Style::default().fg(self.theme.base.text)
        };
        let cancel_style = if self.state.focused_field == TaskEditorField::Cancel {
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

impl MockComponent for TaskEditorDialog {
    fn view(&mut self, frame: &mut Frame, area: Rect) {
        frame.render_widget(Clear, area);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.interactive.focus))
            .style(Style::default().bg(self.theme.dialog.surface))
            .title(self.title());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if inner.height == 0 || inner.width == 0 {
            return;
        }

        let mut lines = vec![
            self.field_line("Title", &self.state.title_input, TaskEditorField::Title),
            self.field_line(
                "Description",
                &self.state.description_input,
                TaskEditorField::Description,
            ),
            self.field_line(
                "Status",
                self.state.status.label(),
                TaskEditorField::Status,
            ),
            self.field_line(
                "Priority",
                self.state.priority.label(),
                TaskEditorField::Priority,
            ),
            self.field_line("Type", self.state.kind.label(), TaskEditorField::Kind),
            self.field_line("Assignee", &self.assignee_label, TaskEditorField::Assignee),
            self.field_line("Client", &self.state.client_input, TaskEditorField::Client),
            self.field_line(
                "Requested",
                &self.state.request_date_input,
                TaskEditorField::RequestDate,
            ),
            self.field_line(
                "Due",
                &self.state.due_date_input,
                TaskEditorField::DueDate,
            ),
            self.field_line(
                "Observation",
                &self.state.observation_input,
                TaskEditorField::Observation,
            ),
            self.field_line(
                "Reference",
                &self.state.external_ref_input,
                TaskEditorField::ExternalRef,
            ),
        ];

        if let Some(error) = &self.state.error_message {
            lines.push(Line::default());
            lines.push(Line::from(Span::styled(
                format!("  {error}"),
                Style::default().fg(self.theme.base.danger),
            )));
        }
        lines.push(Line::default());
        lines.push(self.actions_line());

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

impl Component<Msg, NoUserEvent> for TaskEditorDialog {
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
                TaskEditorField::Cancel => Some(Msg::FocusPrevField),
                field if Self::is_cycle_field(field) => Some(Msg::CycleFieldValue),
                _ => None,
            },
            Event::Keyboard(KeyEvent {
                code: Key::Right, ..
            }) => match focused {
                TaskEditorField::Save => Some(Msg::FocusNextField),
                field if Self::is_cycle_field(field) => Some(Msg::CycleFieldValue),
                _ => None,
            },
            Event::Keyboard(KeyEvent {
                code: Key::Enter, ..
            }) => match focused {
                TaskEditorField::Save => Some(Msg::SubmitDialog),
                TaskEditorField::Cancel => Some(Msg::CancelAction),
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
