use std::collections::HashMap;

use tuirealm::command::{Cmd, CmdResult};
use tuirealm::event::{Key, KeyEvent, KeyModifiers};
use tuirealm::props::{AttrValue, Attribute, Props};
use tuirealm::ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use tuirealm::ratatui::style::{Modifier, Style};
use tuirealm::ratatui::text::{Line, Span};
use tuirealm::ratatui::widgets::{Block, Borders, Clear, Paragraph};
use tuirealm::{Component, Event, Frame, MockComponent, NoUserEvent, State, StateValue};

use crate::command_palette::{CommandPaletteState, all_commands};
use crate::theme::Theme;
use crate::types::CommandFrequency;
use crate::ui_realm::messages::Msg;

/// Fuzzy command launcher. Query editing and selection movement stay
/// inside the component; only execution and dismissal reach the model.
pub struct CommandPalette {
    props: Props,
    state: CommandPaletteState,
    theme: Theme,
}

impl CommandPalette {
    pub fn new(frequencies: HashMap<String, CommandFrequency>, theme: Theme) -> Self {
        Self {
            props: Props::default(),
            state: CommandPaletteState::new(frequencies),
            theme,
        }
    }

    fn select_relative(&mut self, delta: isize) {
        if self.state.filtered.is_empty() {
            return;
        }
        self.state.move_selection(delta);
    }

    fn apply_query_char(&mut self, ch: char) {
        self.state.query.push(ch);
        self.state.update_query();
    }

    fn apply_backspace(&mut self) {
        self.state.query.pop();
        self.state.update_query();
    }

    fn render_command_name(&self, name: &str, matched_indices: &[usize]) -> Vec<Span<'static>> {
        let mut spans = Vec::new();
        for (index, ch) in name.chars().enumerate() {
            let style = if matched_indices.contains(&index) {
                Style::default()
                    .fg(self.theme.base.accent)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(self.theme.base.text)
            };
            spans.push(Span::styled(ch.to_string(), style));
        }
        spans
    }
}

impl MockComponent for CommandPalette {
    fn view(&mut self, frame: &mut Frame, area: Rect) {
        frame.render_widget(Clear, area);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(area);

        let search = Paragraph::new(self.state.query.as_str()).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Search ")
                .border_style(Style::default().fg(self.theme.interactive.focus)),
        );
        frame.render_widget(search, layout[0]);

        if layout[1].height == 0 {
            return;
        }

        if self.state.filtered.is_empty() {
            frame.render_widget(
                Paragraph::new("No matching commands")
                    .alignment(Alignment::Center)
                    .style(Style::default().fg(self.theme.base.text_muted)),
                layout[1],
            );
            return;
        }

        let all_cmds = all_commands();
        let list_height = layout[1].height as usize;
        let total_items = self.state.filtered.len();
        let scroll_offset = if total_items <= list_height {
            0
        } else {
            let half_height = list_height / 2;
            if self.state.selected_index > half_height {
                (self.state.selected_index - half_height).min(total_items - list_height)
            } else {
                0
            }
        };

        for (row_index, ranked) in self
            .state
            .filtered
            .iter()
            .skip(scroll_offset)
            .take(list_height)
            .enumerate()
        {
            let command = &all_cmds[ranked.command_idx];
            let absolute_index = scroll_offset + row_index;
            let is_selected = absolute_index == self.state.selected_index;

            let mut row_spans = Vec::new();
            row_spans.push(Span::styled(
                if is_selected { "▸ " } else { "  " },
                Style::default().fg(self.theme.interactive.focus),
            ));
            row_spans
                .extend(self.render_command_name(command.display_name, &ranked.matched_indices));

            let row_area = Rect {
                x: layout[1].x,
                y: layout[1].y + row_index as u16,
                width: layout[1].width,
                height: 1,
            };

            frame.render_widget(
                Paragraph::new(Line::from(row_spans)).style(if is_selected {
                    Style::default().bg(self.theme.interactive.selected_bg)
                } else {
                    Style::default()
                }),
                row_area,
            );

            if !command.keybinding.is_empty() {
                frame.render_widget(
                    Paragraph::new(command.keybinding)
                        .alignment(Alignment::Right)
                        .style(Style::default().fg(self.theme.base.text_muted)),
                    row_area,
                );
            }
        }
    }

    fn query(&self, attr: Attribute) -> Option<AttrValue> {
        self.props.get(attr)
    }

    fn attr(&mut self, attr: Attribute, value: AttrValue) {
        self.props.set(attr, value);
    }

    fn state(&self) -> State {
        State::One(StateValue::U16(self.state.selected_index as u16))
    }

    fn perform(&mut self, _cmd: Cmd) -> CmdResult {
        CmdResult::None
    }
}

impl Component<Msg, NoUserEvent> for CommandPalette {
    fn on(&mut self, ev: Event<NoUserEvent>) -> Option<Msg> {
        match ev {
            Event::Keyboard(KeyEvent { code: Key::Esc, .. }) => Some(Msg::DismissDialog),
            Event::Keyboard(KeyEvent {
                code: Key::Enter, ..
            }) => self.state.selected_command_id().map(Msg::ExecuteCommand),
            Event::Keyboard(KeyEvent { code: Key::Up, .. }) => {
                self.select_relative(-1);
                None
            }
            Event::Keyboard(KeyEvent {
                code: Key::Down, ..
            }) => {
                self.select_relative(1);
                None
            }
            Event::Keyboard(KeyEvent {
                code: Key::Char('k'),
                modifiers,
            }) if modifiers.contains(KeyModifiers::CONTROL) => {
                self.select_relative(-1);
                None
            }
            Event::Keyboard(KeyEvent {
                code: Key::Char('j'),
                modifiers,
            }) if modifiers.contains(KeyModifiers::CONTROL) => {
                self.select_relative(1);
                None
            }
            Event::Keyboard(KeyEvent {
                code: Key::Backspace,
                ..
            }) => {
                if self.state.query.is_empty() {
                    Some(Msg::DismissDialog)
                } else {
                    self.apply_backspace();
                    None
                }
            }
            Event::Keyboard(KeyEvent {
                code: Key::Char(ch),
                modifiers,
            }) if !modifiers.contains(KeyModifiers::CONTROL)
                && !modifiers.contains(KeyModifiers::ALT) =>
            {
                self.apply_query_char(ch);
                None
            }
            _ => None,
        }
    }
}
