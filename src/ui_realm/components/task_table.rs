use tuirealm::command::{Cmd, CmdResult};
use tuirealm::event::{Key, KeyEvent};
use tuirealm::props::{AttrValue, Attribute, Props};
use tuirealm::ratatui::layout::{Alignment, Rect};
use tuirealm::ratatui::style::{Modifier, Style};
use tuirealm::ratatui::text::{Line, Span};
use tuirealm::ratatui::widgets::{Block, BorderType, Borders, Paragraph};
use tuirealm::{Component, Event, Frame, MockComponent, NoUserEvent, State, StateValue};

use crate::app::board::{SortColumn, SortDirection, TableRow, TableSort};
use crate::keybindings::dispatcher::{Action, KeybindingDispatcher};
use crate::theme::Theme;
use crate::ui_realm::components::{global_action_msg, to_crossterm_key};
use crate::ui_realm::messages::Msg;

const COLUMN_WIDTHS: [usize; 8] = [26, 14, 11, 12, 9, 12, 9, 11];

pub struct TaskTable {
    props: Props,
    rows: Vec<TableRow>,
    sort: TableSort,
    theme: Theme,
    keybindings: KeybindingDispatcher,
    selected_index: usize,
    scroll_offset: usize,
    viewport_rows: usize,
}

impl TaskTable {
    pub fn new(
        rows: Vec<TableRow>,
        sort: TableSort,
        theme: Theme,
        keybindings: KeybindingDispatcher,
    ) -> Self {
        Self {
            props: Props::default(),
            rows,
            sort,
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

    fn header_line(&self) -> Line<'static> {
        let mut spans = vec![Span::raw("  ".to_string())];
        for (index, column) in SortColumn::ALL.iter().enumerate() {
            let mut header = format!("{} {}", index + 1, column.header());
            if self.sort.column == Some(*column) {
                header.push(match self.sort.direction {
                    SortDirection::Ascending => '▲',
                    SortDirection::Descending => '▼',
                });
            }
            spans.push(Span::styled(
                pad(&header, COLUMN_WIDTHS[index]),
                Style::default()
                    .fg(self.theme.base.header)
                    .add_modifier(Modifier::BOLD),
            ));
        }
        Line::from(spans)
    }

    fn row_line(&self, index: usize, row: &TableRow) -> Line<'static> {
        let is_selected = index == self.selected_index && self.is_focused();
        let row_style = if is_selected {
            Style::default().bg(self.theme.interactive.selected_bg)
        } else {
            Style::default()
        };
        let marker = if is_selected { "▸ " } else { "  " };

        let cells = vec![
            Span::styled(marker.to_string(), Style::default().fg(self.theme.interactive.focus)),
            Span::styled(
                pad(&row.title, COLUMN_WIDTHS[0]),
                Style::default().fg(self.theme.base.text),
            ),
            Span::styled(
                pad(&row.assignee, COLUMN_WIDTHS[1]),
                Style::default().fg(self.theme.card.assignee),
            ),
            Span::styled(
                pad(&row.request_date, COLUMN_WIDTHS[2]),
                Style::default().fg(self.theme.base.text_muted),
            ),
            Span::styled(
                pad(row.status.label(), COLUMN_WIDTHS[3]),
                Style::default().fg(self.theme.status_color(row.status)),
            ),
            Span::styled(
                pad(row.priority.label(), COLUMN_WIDTHS[4]),
                Style::default().fg(self.theme.priority_color(row.priority)),
            ),
            Span::styled(
                pad(&row.client, COLUMN_WIDTHS[5]),
                Style::default().fg(self.theme.card.client),
            ),
            Span::styled(
                pad(row.kind.label(), COLUMN_WIDTHS[6]),
                Style::default().fg(self.theme.base.text),
            ),
            Span::styled(
                pad(&row.due_date, COLUMN_WIDTHS[7]),
                Style::default().fg(self.theme.urgency_color(row.urgency)),
            ),
        ];

        Line::from(cells).style(row_style)
    }
}

impl MockComponent for TaskTable {
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
                format!(" Tasks ({}) ", self.rows.len()),
                Style::default().fg(border_color),
            ))
            .title_alignment(Alignment::Center);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if inner.height == 0 || inner.width == 0 {
            return;
        }

        // First row is the header, the rest scroll.
        self.viewport_rows = (inner.height as usize).saturating_sub(1).max(1);
        self.clamp_selection();
        self.ensure_selected_visible();

        let mut lines = vec![self.header_line()];
        if self.rows.is_empty() {
            frame.render_widget(Paragraph::new(lines), inner);
            let empty_area = Rect {
                x: inner.x,
                y: inner.y + 1,
                width: inner.width,
                height: inner.height - 1,
            };
            frame.render_widget(
                Paragraph::new("No tasks")
                    .alignment(Alignment::Center)
                    .style(Style::default().fg(self.theme.base.text_muted)),
                empty_area,
            );
            return;
        }

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

impl Component<Msg, NoUserEvent> for TaskTable {
    fn on(&mut self, ev: Event<NoUserEvent>) -> Option<Msg> {
        let Event::Keyboard(key) = ev else {
            return None;
        };

        if let KeyEvent {
            code: Key::Char(ch @ '1'..='8'),
            ..
        } = key
        {
            let index = ch as usize - '1' as usize;
            return Some(Msg::SortByColumn(index));
        }

        match key {
            KeyEvent {
                code: Key::PageUp, ..
            } => {
                let delta = -(self.viewport_rows.max(1) as isize);
                return self
                    .move_selection_by(delta)
                    .then(|| Msg::SelectTableRow(self.selected_index));
            }
            KeyEvent {
                code: Key::PageDown,
                ..
            } => {
                let delta = self.viewport_rows.max(1) as isize;
                return self
                    .move_selection_by(delta)
                    .then(|| Msg::SelectTableRow(self.selected_index));
            }
            KeyEvent {
                code: Key::Home, ..
            } => {
                let delta = -(self.rows.len() as isize);
                return self
                    .move_selection_by(delta)
                    .then(|| Msg::SelectTableRow(self.selected_index));
            }
            KeyEvent { code: Key::End, .. } => {
                let delta = self.rows.len() as isize;
                return self
                    .move_selection_by(delta)
                    .then(|| Msg::SelectTableRow(self.selected_index));
            }
            _ => {}
        }

        let action = self.keybindings.map_key(to_crossterm_key(key))?;
        match action {
            Action::SelectUp => self
                .move_selection_by(-1)
                .then(|| Msg::SelectTableRow(self.selected_index)),
            Action::SelectDown => self
                .move_selection_by(1)
                .then(|| Msg::SelectTableRow(self.selected_index)),
            Action::OpenNewTaskDialog => Some(Msg::OpenNewTaskDialog),
            Action::OpenEditTaskDialog | Action::Submit => {
                (!self.rows.is_empty()).then_some(Msg::OpenEditTaskDialog)
            }
            Action::CompleteTask => (!self.rows.is_empty()).then_some(Msg::CompleteTask),
            Action::OpenDeleteTaskDialog => {
                (!self.rows.is_empty()).then_some(Msg::OpenDeleteTaskDialog)
            }
            Action::NextContact => Some(Msg::NextContact),
            Action::PrevContact => Some(Msg::PrevContact),
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
