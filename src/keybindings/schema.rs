//! Keybinding configuration schema
//!
//! Defines serde-serializable structs for parsing keybinding TOML config.

use serde::{Deserialize, Serialize};

/// Root keybinding configuration containing all action sections
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct KeybindingConfig {
    pub navigation: NavigationBindings,
    pub tasks: TaskBindings,
    pub chat: ChatBindings,
    pub dialogs: DialogBindings,
    pub global: GlobalBindings,
}

/// Navigation keybindings for column and card selection
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct NavigationBindings {
    pub move_left: String,
    #[serde(default)]
    pub move_left_alt: Option<String>,
    pub move_right: String,
    #[serde(default)]
    pub move_right_alt: Option<String>,
    pub select_up: String,
    #[serde(default)]
    pub select_up_alt: Option<String>,
    pub select_down: String,
    #[serde(default)]
    pub select_down_alt: Option<String>,
    pub task_move_left: String,
    pub task_move_right: String,
}

/// Task action keybindings
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct TaskBindings {
    pub new_task: String,
    pub edit_task: String,
    #[serde(default)]
    pub edit_task_alt: Option<String>,
    pub complete_task: String,
    pub delete_task: String,
}

/// Chat side panel keybindings
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct ChatBindings {
    pub toggle_panel: String,
    pub next_contact: String,
    pub prev_contact: String,
}

/// Dialog interaction keybindings
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct DialogBindings {
    pub command_palette: String,
    pub help: String,
    pub dismiss: String,
    #[serde(default)]
    pub dismiss_alt: Option<String>,
    pub confirm: String,
    pub cancel: String,
}

/// Global application keybindings
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct GlobalBindings {
    pub quit: String,
    pub toggle_view: String,
    pub users_view: String,
    pub refresh: String,
    pub submit: String,
}

#[cfg(test)]
use std::path::PathBuf;

#[cfg(test)]
#[test]
fn parse_default() {
    let config_path = PathBuf::from("config/keybindings.toml");

    let config_content = std::fs::read_to_string(&config_path)
        .unwrap_or_else(|e| panic!("Failed to read config/keybindings.toml: {}", e));

    let config: KeybindingConfig = toml::from_str(&config_content)
        .unwrap_or_else(|e| panic!("Failed to parse config/keybindings.toml: {}", e));

    assert_eq!(
        config.navigation.move_left, "h",
        "Navigation move_left should be 'h'"
    );
    assert_eq!(
        config.navigation.move_right, "l",
        "Navigation move_right should be 'l'"
    );
    assert_eq!(
        config.navigation.select_up, "k",
        "Navigation select_up should be 'k'"
    );
    assert_eq!(
        config.navigation.select_down, "j",
        "Navigation select_down should be 'j'"
    );
    assert_eq!(
        config.navigation.task_move_left, "H",
        "Task move left should be 'H'"
    );
    assert_eq!(
        config.navigation.task_move_right, "L",
        "Task move right should be 'L'"
    );
    assert_eq!(config.tasks.new_task, "n", "Task new_task should be 'n'");
    assert_eq!(config.tasks.edit_task, "e", "Task edit_task should be 'e'");
    assert_eq!(config.chat.toggle_panel, "m", "Chat toggle should be 'm'");
    assert_eq!(
        config.dialogs.command_palette, "ctrl-p",
        "Command palette should be 'ctrl-p'"
    );
    assert_eq!(config.dialogs.help, "?", "Help should be '?'");
    assert_eq!(config.dialogs.dismiss, "esc", "Dismiss should be 'esc'");
    assert_eq!(config.global.quit, "q", "Global quit should be 'q'");
    assert!(
        !config.navigation.move_left.is_empty(),
        "navigation.move_left must not be empty"
    );
    assert!(
        !config.tasks.new_task.is_empty(),
        "tasks.new_task must not be empty"
    );
    assert!(
        !config.global.quit.is_empty(),
        "global.quit must not be empty"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_config_toml() -> &'static str {
        r#"
[navigation]
move_left = "h"
move_left_alt = "left"
move_right = "l"
move_right_alt = "right"
select_up = "k"
select_up_alt = "up"
select_down = "j"
select_down_alt = "down"
task_move_left = "H"
task_move_right = "L"

[tasks]
new_task = "n"
edit_task = "e"
edit_task_alt = "enter"
complete_task = "c"
delete_task = "d"

[chat]
toggle_panel = "m"
next_contact = "]"
prev_contact = "["

[dialogs]
command_palette = "ctrl-p"
help = "?"
dismiss = "esc"
dismiss_alt = "ctrl-c"
confirm = "enter"
cancel = "esc"

[global]
quit = "q"
toggle_view = "\\"
users_view = "u"
refresh = "r"
submit = "enter"
"#
    }

    #[test]
    fn test_keybinding_config_deserialize() {
        let config: KeybindingConfig =
            toml::from_str(full_config_toml()).expect("Failed to parse TOML");
        assert_eq!(config.navigation.move_left, "h");
        assert_eq!(config.navigation.move_right, "l");
        assert_eq!(config.tasks.new_task, "n");
        assert_eq!(config.chat.toggle_panel, "m");
        assert_eq!(config.dialogs.command_palette, "ctrl-p");
        assert_eq!(config.global.quit, "q");
    }

    #[test]
    fn test_keybinding_config_roundtrip() {
        let config: KeybindingConfig =
            toml::from_str(full_config_toml()).expect("Failed to parse TOML");
        let serialized = toml::to_string(&config).expect("Failed to serialize");
        let deserialized: KeybindingConfig =
            toml::from_str(&serialized).expect("Failed to deserialize");
        assert_eq!(config, deserialized);
    }
}
