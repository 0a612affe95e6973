use tuirealm::command::{Cmd, CmdResult};
use tuirealm::event::{Key, KeyEvent, KeyModifiers};
use tuirealm::props::{AttrValue, Attribute, Props};
use tuirealm::ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use tuirealm::ratatui::style::{Modifier, Style};
use tuirealm::ratatui::text::{Line, Span};
use tuirealm::ratatui::widgets::{Block, BorderType, Borders, Paragraph};
use tuirealm::{Component, Event, Frame, MockComponent, NoUserEvent, State, StateValue};
use uuid::Uuid;

use crate::theme::Theme;
use crate::types::ChatMessage;
use crate::ui_realm::components::{global_action_msg, to_crossterm_key};
use crate::keybindings::dispatcher::{Action, KeybindingDispatcher};
use crate::ui_realm::messages::Msg;

/// Owned snapshot of a contact row, built from the chat panel state at
/// mount time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactEntry {
    pub user_id: Uuid,
    pub name: String,
    pub online: bool,
    pub unread: i64,
}

pub struct ChatSidebar {
    props: Props,
    contacts: Vec<ContactEntry>,
    conversation: Option<Conversation>,
    current_user: Uuid,
    theme: Theme,
    keybindings: KeybindingDispatcher,
    selected_contact: usize,
}

struct Conversation {
    contact_name: String,
    messages: Vec<ChatMessage>,
    draft: String,
}

impl ChatSidebar {
    pub fn new(
        contacts: Vec<ContactEntry>,
        current_user: Uuid,
        theme: Theme,
        keybindings: KeybindingDispatcher,
    ) -> Self {
        Self {
            props: Props::default(),
            contacts,
            conversation: None,
            current_user,
            theme,
            keybindings,
            selected_contact: 0,
        }
    }

    pub fn with_selected(mut self, selected_contact: usize) -> Self {
        self.selected_contact = selected_contact;
        self.clamp_selection();
        self
    }

    pub fn with_conversation(
        mut self,
        contact_name: String,
        messages: Vec<ChatMessage>,
        draft: String,
    ) -> Self {
        self.conversation = Some(Conversation {
            contact_name,
            messages,
            draft,
        });
        self
    }

    fn is_focused(&self) -> bool {
        self.props.get(Attribute::Focus) == Some(AttrValue::Flag(true))
    }

    fn clamp_selection(&mut self) {
        if self.contacts.is_empty() {
            self.selected_contact = 0;
        } else {
            self.selected_contact = self.selected_contact.min(self.contacts.len() - 1);
        }
    }

    fn move_selection_by(&mut self, delta: isize) -> bool {
        if self.contacts.is_empty() {
            self.selected_contact = 0;
            return false;
        }

        let current = self.selected_contact as isize;
        let max_index = (self.contacts.len() - 1) as isize;
        let next = (current + delta).clamp(0, max_index) as usize;
        if next == self.selected_contact {
            return false;
        }

        self.selected_contact = next;
        true
    }

    fn total_unread(&self) -> i64 {
        self.contacts.iter().map(|contact| contact.unread).sum()
    }

    fn contact_line(&self, index: usize, contact: &ContactEntry) -> Line<'static> {
        let is_selected = index == self.selected_contact && self.is_focused();
        let row_style = if is_selected {
            Style::default().bg(self.theme.interactive.selected_bg)
        } else {
            Style::default()
        };
        let marker = if is_selected { "▸ " } else { "  " };
        let presence = if contact.online { "●" } else { "○" };

        let mut spans = vec![
            Span::styled(
                marker.to_string(),
                Style::default().fg(self.theme.interactive.focus),
            ),
            Span::styled(
                format!("{presence} "),
                Style::default().fg(self.theme.presence_color(contact.online)),
            ),
            Span::styled(
                contact.name.clone(),
                Style::default().fg(self.theme.base.text),
            ),
        ];
        if contact.unread > 0 {
            spans.push(Span::styled(
                format!(" ({})", contact.unread),
                Style::default()
                    .fg(self.theme.base.accent)
                    .add_modifier(Modifier::BOLD),
            ));
        }

        Line::from(spans).style(row_style)
    }

    fn render_contact_list(&mut self, frame: &mut Frame, inner: Rect) {
        if self.contacts.is_empty() {
            frame.render_widget(
                Paragraph::new("No other users")
                    .alignment(Alignment::Center)
                    .style(Style::default().fg(self.theme.base.text_muted)),
                inner,
            );
            return;
        }

        let lines = self
            .contacts
            .iter()
            .enumerate()
            .take(inner.height as usize)
            .map(|(index, contact)| self.contact_line(index, contact))
            .collect::<Vec<_>>();
        frame.render_widget(Paragraph::new(lines), inner);
    }

    fn render_conversation(&self, frame: &mut Frame, inner: Rect, conversation: &Conversation) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(3)])
            .split(inner);

        let history_height = rows[0].height as usize;
        let visible = conversation
            .messages
            .iter()
            .rev()
            .take(history_height)
            .rev()
            .map(|message| {
                let mine = message.sender_id == self.current_user;
                let (prefix, color) = if mine {
                    ("me".to_string(), self.theme.base.accent)
                } else {
                    (conversation.contact_name.clone(), self.theme.card.assignee)
                };
                Line::from(vec![
                    Span::styled(format!("{prefix}: "), Style::default().fg(color)),
                    Span::styled(
                        message.body.clone(),
                        Style::default().fg(self.theme.base.text),
                    ),
                ])
            })
            .collect::<Vec<_>>();

        if visible.is_empty() {
            frame.render_widget(
                Paragraph::new("No messages yet. Say hi!")
                    .alignment(Alignment::Center)
                    .style(Style::default().fg(self.theme.base.text_muted)),
                rows[0],
            );
        } else {
            frame.render_widget(Paragraph::new(visible), rows[0]);
        }

        let input = Paragraph::new(format!("{}▏", conversation.draft)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(self.theme.interactive.focus))
                .title(" Message "),
        );
        frame.render_widget(input, rows[1]);
    }

    fn on_conversation_key(&mut self, key: KeyEvent) -> Option<Msg> {
        match key {
            KeyEvent { code: Key::Esc, .. } => Some(Msg::CloseConversation),
            KeyEvent {
                code: Key::Enter, ..
            } => Some(Msg::SendChatMessage),
            KeyEvent {
                code: Key::Backspace,
                ..
            } => Some(Msg::ChatBackspace),
            KeyEvent {
                code: Key::Char(ch),
                modifiers,
            } if !modifiers.contains(KeyModifiers::CONTROL)
                && !modifiers.contains(KeyModifiers::ALT) =>
            {
                Some(Msg::ChatInput(ch))
            }
            _ => None,
        }
    }

    fn on_list_key(&mut self, key: KeyEvent) -> Option<Msg> {
        if let KeyEvent { code: Key::Esc, .. } = key {
            return Some(Msg::ToggleChatPanel);
        }

        let action = self.keybindings.map_key(to_crossterm_key(key))?;
        match action {
            Action::SelectUp => self
                .move_selection_by(-1)
                .then(|| Msg::SelectContact(self.selected_contact)),
            Action::SelectDown => self
                .move_selection_by(1)
                .then(|| Msg::SelectContact(self.selected_contact)),
            Action::NextContact => self
                .move_selection_by(1)
                .then(|| Msg::SelectContact(self.selected_contact)),
            Action::PrevContact => self
                .move_selection_by(-1)
                .then(|| Msg::SelectContact(self.selected_contact)),
            Action::Submit | Action::OpenEditTaskDialog => {
                (!self.contacts.is_empty()).then_some(Msg::OpenConversation)
            }
            other => global_action_msg(other),
        }
    }
}

impl MockComponent for ChatSidebar {
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

        let title = match (&self.conversation, self.total_unread()) {
            (Some(conversation), _) => format!(" Chat: {} ", conversation.contact_name),
            (None, 0) => " Chat ".to_string(),
            (None, unread) => format!(" Chat ({unread} unread) "),
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

        self.clamp_selection();
        match self.conversation.take() {
            Some(conversation) => {
                self.render_conversation(frame, inner, &conversation);
                self.conversation = Some(conversation);
            }
            None => self.render_contact_list(frame, inner),
        }
    }

    fn query(&self, attr: Attribute) -> Option<AttrValue> {
        self.props.get(attr)
    }

    fn attr(&mut self, attr: Attribute, value: AttrValue) {
        self.props.set(attr, value);
    }

    fn state(&self) -> State {
        State::One(StateValue::U16(self.selected_contact as u16))
    }

    fn perform(&mut self, _cmd: Cmd) -> CmdResult {
        CmdResult::None
    }
}

impl Component<Msg, NoUserEvent> for ChatSidebar {
    fn on(&mut self, ev: Event<NoUserEvent>) -> Option<Msg> {
        let Event::Keyboard(key) = ev else {
            return None;
        };

        if self.conversation.is_some() {
            self.on_conversation_key(key)
        } else {
            self.on_list_key(key)
        }
    }
}
