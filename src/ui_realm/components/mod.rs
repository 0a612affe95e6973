pub mod board_column;
pub mod chat_sidebar;
pub mod command_palette;
pub mod dialog_shell;
pub mod dialogs;
pub mod footer;
pub mod task_table;
pub mod users_table;

pub use board_column::BoardColumn;
pub use chat_sidebar::ChatSidebar;
pub use command_palette::CommandPalette;
pub use dialog_shell::{DialogButton, DialogShell};
pub use dialogs::{DeleteTaskDialog, ErrorDialog, HelpDialog, ProfileEditorDialog, TaskEditorDialog};
pub use footer::Footer;
pub use task_table::TaskTable;
pub use users_table::UsersTable;

use crossterm::event as ct;
use tuirealm::event::{Key, KeyEvent, KeyModifiers};

use crate::keybindings::dispatcher::Action;
use crate::ui_realm::messages::Msg;

/// Bridge a tui-realm key event back to the crossterm representation the
/// keybinding dispatcher was built against.
pub fn to_crossterm_key(event: KeyEvent) -> ct::KeyEvent {
    let code = match event.code {
        Key::Backspace => ct::KeyCode::Backspace,
        Key::Enter => ct::KeyCode::Enter,
        Key::Left => ct::KeyCode::Left,
        Key::Right => ct::KeyCode::Right,
        Key::Up => ct::KeyCode::Up,
        Key::Down => ct::KeyCode::Down,
        Key::Home => ct::KeyCode::Home,
        Key::End => ct::KeyCode::End,
        Key::PageUp => ct::KeyCode::PageUp,
        Key::PageDown => ct::KeyCode::PageDown,
        Key::Tab => ct::KeyCode::Tab,
        Key::BackTab => ct::KeyCode::BackTab,
        Key::Delete => ct::KeyCode::Delete,
        Key::Insert => ct::KeyCode::Insert,
        Key::Function(n) => ct::KeyCode::F(n),
        Key::Char(ch) => ct::KeyCode::Char(ch),
        Key::Esc => ct::KeyCode::Esc,
        _ => ct::KeyCode::Null,
    };

    let mut modifiers = ct::KeyModifiers::NONE;
    if event.modifiers.contains(KeyModifiers::CONTROL) {
        modifiers.insert(ct::KeyModifiers::CONTROL);
    }
    if event.modifiers.contains(KeyModifiers::SHIFT) {
        modifiers.insert(ct::KeyModifiers::SHIFT);
    }
    if event.modifiers.contains(KeyModifiers::ALT) {
        modifiers.insert(ct::KeyModifiers::ALT);
    }

    ct::KeyEvent::new(code, modifiers)
}

/// Actions that mean the same thing regardless of which component has
/// focus. Component-local actions (selection, task movement) are mapped
/// by the components themselves.
pub fn global_action_msg(action: Action) -> Option<Msg> {
    match action {
        Action::Quit => Some(Msg::Quit),
        Action::ToggleViewMode => Some(Msg::ToggleViewMode),
        Action::OpenUsersView => Some(Msg::OpenUsersView),
        Action::Refresh => Some(Msg::Refresh),
        Action::OpenCommandPalette => Some(Msg::OpenCommandPalette),
        Action::ToggleHelp => Some(Msg::ToggleHelp),
        Action::ToggleChatPanel => Some(Msg::ToggleChatPanel),
        _ => None,
    }
}
