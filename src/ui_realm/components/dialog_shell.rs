use tuirealm::command::{Cmd, CmdResult};
use tuirealm::event::{Key, KeyEvent, KeyModifiers};
use tuirealm::props::{AttrValue, Attribute, Props};
use tuirealm::ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use tuirealm::ratatui::style::Style;
use tuirealm::ratatui::text::Line;
use tuirealm::ratatui::widgets::{Block, Borders, Clear, Paragraph};
use tuirealm::{Component, Event, Frame, MockComponent, NoUserEvent, State, StateValue};

use crate::theme::Theme;
use crate::ui_realm::messages::Msg;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogButton {
    pub id: String,
    pub label: String,
}

impl DialogButton {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// Plain modal frame: a cleared area, centered body text and a row of
/// buttons. Confirmation dialogs compose this instead of repeating the
/// button focus plumbing.
pub struct DialogShell {
    props: Props,
    title: String,
    content_lines: Vec<String>,
    buttons: Vec<DialogButton>,
    theme: Theme,
    focused_button: usize,
}

impl DialogShell {
    pub fn new(
        title: impl Into<String>,
        content_lines: Vec<String>,
        buttons: Vec<DialogButton>,
        theme: Theme,
    ) -> Self {
        Self {
            props: Props::default(),
            title: title.into(),
            content_lines,
            buttons,
            theme,
            focused_button: 0,
        }
    }

    pub fn with_focused_button(mut self, index: usize) -> Self {
        if !self.buttons.is_empty() {
            self.focused_button = index.min(self.buttons.len() - 1);
        }
        self
    }

    pub fn focused_button_label(&self) -> Option<&str> {
        self.buttons
            .get(self.focused_button)
            .map(|button| button.label.as_str())
    }

    fn focus_next_button(&mut self) -> Option<String> {
        if self.buttons.is_empty() {
            return None;
        }
        self.focused_button = (self.focused_button + 1) % self.buttons.len();
        self.buttons
            .get(self.focused_button)
            .map(|button| button.label.clone())
    }

    fn focus_previous_button(&mut self) -> Option<String> {
        if self.buttons.is_empty() {
            return None;
        }
        self.focused_button = if self.focused_button == 0 {
            self.buttons.len() - 1
        } else {
            self.focused_button - 1
        };
        self.buttons
            .get(self.focused_button)
            .map(|button| button.label.clone())
    }
}

impl MockComponent for DialogShell {
    fn view(&mut self, frame: &mut Frame, area: Rect) {
        frame.render_widget(Clear, area);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.interactive.focus))
            .style(Style::default().bg(self.theme.dialog.surface))
            .title(format!(" {} ", self.title));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if inner.height == 0 {
            return;
        }

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(3)])
            .split(inner);

        let content = self
            .content_lines
            .iter()
            .map(|line| Line::from(line.as_str()))
            .collect::<Vec<_>>();
        frame.render_widget(
            Paragraph::new(content)
                .alignment(Alignment::Center)
                .style(Style::default().fg(self.theme.base.text)),
            rows[0],
        );

        if self.buttons.is_empty() || rows[1].width == 0 {
            return;
        }

        let constraints = vec![Constraint::Ratio(1, self.buttons.len() as u32); self.buttons.len()];
        let button_areas = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(constraints)
            .split(rows[1]);

        for (index, button) in self.buttons.iter().enumerate() {
            let is_focused = index == self.focused_button;
            let border = if is_focused {
                self.theme.interactive.focus
            } else {
                self.theme.interactive.border
            };
            let style = if is_focused {
                Style::default()
                    .bg(self.theme.dialog.button_bg)
                    .fg(self.theme.dialog.button_fg)
            } else {
                Style::default().fg(self.theme.base.text)
            };

            frame.render_widget(
                Paragraph::new(format!("[ {} ]", button.label))
                    .alignment(Alignment::Center)
                    .style(style)
                    .block(
                        Block::default()
                            .borders(Borders::ALL)
                            .border_style(Style::default().fg(border)),
                    ),
                button_areas[index],
            );
        }
    }

    fn query(&self, attr: Attribute) -> Option<AttrValue> {
        self.props.get(attr)
    }

    fn attr(&mut self, attr: Attribute, value: AttrValue) {
        self.props.set(attr, value);
    }

    fn state(&self) -> State {
        State::One(StateValue::U16(self.focused_button as u16))
    }

    fn perform(&mut self, _cmd: Cmd) -> CmdResult {
        CmdResult::None
    }
}

impl Component<Msg, NoUserEvent> for DialogShell {
    fn on(&mut self, ev: Event<NoUserEvent>) -> Option<Msg> {
        match ev {
            Event::Keyboard(KeyEvent {
                code: Key::Tab,
                modifiers: KeyModifiers::NONE,
            })
            | Event::Keyboard(KeyEvent {
                code: Key::Right,
                modifiers: KeyModifiers::NONE,
            }) => self.focus_next_button().map(Msg::FocusButton),
            Event::Keyboard(KeyEvent {
                code: Key::BackTab,
                modifiers: KeyModifiers::SHIFT,
            })
            | Event::Keyboard(KeyEvent {
                code: Key::Left,
                modifiers: KeyModifiers::NONE,
            }) => self.focus_previous_button().map(Msg::FocusButton),
            Event::Keyboard(KeyEvent {
                code: Key::Enter, ..
            }) => Some(Msg::SubmitDialog),
            Event::Keyboard(KeyEvent { code: Key::Esc, .. }) => Some(Msg::CancelAction),
            _ => None,
        }
    }
}
