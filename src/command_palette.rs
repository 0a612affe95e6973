use crate::keybindings::Action;
use crate::matching::{
    ascii_case_insensitive_subsequence, normalize_fuzzy_needle, recency_frequency_bonus,
    safe_fuzzy_indices,
};
use crate::types::CommandFrequency;
use chrono::Utc;
use nucleo::{Config, Matcher, Utf32Str};
use std::collections::HashMap;

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct CommandDef {
    pub id: &'static str,
    pub display_name: &'static str,
    pub keybinding: &'static str,
    pub action: Action,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankedCommand {
    pub command_idx: usize,
    pub score: f64,
    pub matched_indices: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommandPaletteState {
    pub query: String,
    pub selected_index: usize,
    pub filtered: Vec<RankedCommand>,
    pub frequencies: HashMap<String, CommandFrequency>,
}

impl CommandPaletteState {
    pub fn new(frequencies: HashMap<String, CommandFrequency>) -> Self {
        let mut state = Self {
            query: String::new(),
            selected_index: 0,
            filtered: Vec::new(),
            frequencies,
        };
        state.update_query();
        state
    }

    pub fn update_query(&mut self) {
        let commands = all_commands();
        let previous_len = self.filtered.len();
        self.filtered = rank_commands(&self.query, &commands, &self.frequencies);
        if self.filtered.is_empty() || self.filtered.len() < previous_len {
            self.selected_index = 0;
        } else {
            self.selected_index = self.selected_index.min(self.filtered.len() - 1);
        }
    }

    pub fn move_selection(&mut self, delta: isize) {
        if self.filtered.is_empty() {
            self.selected_index = 0;
            return;
        }

        let len = self.filtered.len() as isize;
        let next = (self.selected_index as isize + delta).rem_euclid(len);
        self.selected_index = next as usize;
    }

    pub fn selected_command(&self) -> Option<CommandDef> {
        let selected = self.filtered.get(self.selected_index)?;
        all_commands().get(selected.command_idx).cloned()
    }

    pub fn selected_command_id(&self) -> Option<String> {
        self.selected_command().map(|command| command.id.to_string())
    }
}

pub fn rank_commands(
    query: &str,
    commands: &[CommandDef],
    frequencies: &HashMap<String, CommandFrequency>,
) -> Vec<RankedCommand> {
    let now = Utc::now();
    let mut ranked = Vec::with_capacity(commands.len());
    let normalized_query = normalize_fuzzy_needle(query);

    if normalized_query.is_empty() {
        for (idx, command) in commands.iter().enumerate() {
            ranked.push(RankedCommand {
                command_idx: idx,
                score: frequency_bonus(command.id, frequencies, now),
                matched_indices: Vec::new(),
            });
        }

        ranked.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.command_idx.cmp(&b.command_idx))
        });
        return ranked;
    }

    let mut matcher = Matcher::new(Config::DEFAULT);
    let mut query_buf = Vec::new();
    let query_utf32 = Utf32Str::new(normalized_query.as_str(), &mut query_buf);
    let mut display_name_buf = Vec::new();
    let mut matched_indices = Vec::new();

    for (idx, command) in commands.iter().enumerate() {
        matched_indices.clear();
        if !ascii_case_insensitive_subsequence(command.display_name, normalized_query.as_str()) {
            continue;
        }
        let display_name_utf32 = Utf32Str::new(command.display_name, &mut display_name_buf);
        if let Some(fuzzy_score) = safe_fuzzy_indices(
            &mut matcher,
            display_name_utf32,
            query_utf32,
            &mut matched_indices,
        ) {
            ranked.push(RankedCommand {
                command_idx: idx,
                score: f64::from(fuzzy_score) + frequency_bonus(command.id, frequencies, now),
                matched_indices: matched_indices
                    .iter()
                    .map(|index| *index as usize)
                    .collect(),
            });
        }
    }

    ranked.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.command_idx.cmp(&b.command_idx))
    });
    ranked
}

fn frequency_bonus(
    command_id: &str,
    frequencies: &HashMap<String, CommandFrequency>,
    now: chrono::DateTime<Utc>,
) -> f64 {
    let Some(freq) = frequencies.get(command_id) else {
        return 0.0;
    };

    recency_frequency_bonus(freq.use_count, &freq.last_used, now, 0.3, 0.7, 24.0, 100.0)
}

pub fn all_commands() -> Vec<CommandDef> {
    vec![
        CommandDef {
            id: "new_task",
            display_name: "New Task",
            keybinding: "n",
            action: Action::OpenNewTaskDialog,
        },
        CommandDef {
            id: "edit_task",
            display_name: "Edit Selected Task",
            keybinding: "e",
            action: Action::OpenEditTaskDialog,
        },
        CommandDef {
            id: "complete_task",
            display_name: "Complete Selected Task",
            keybinding: "c",
            action: Action::CompleteTask,
        },
        CommandDef {
            id: "delete_task",
            display_name: "Delete Selected Task",
            keybinding: "d",
            action: Action::OpenDeleteTaskDialog,
        },
        CommandDef {
            id: "move_task_left",
            display_name: "Move Task Left",
            keybinding: "H",
            action: Action::MoveTaskLeft,
        },
        CommandDef {
            id: "move_task_right",
            display_name: "Move Task Right",
            keybinding: "L",
            action: Action::MoveTaskRight,
        },
        CommandDef {
            id: "toggle_view",
            display_name: "Toggle Kanban/Table View",
            keybinding: "\\",
            action: Action::ToggleViewMode,
        },
        CommandDef {
            id: "toggle_chat",
            display_name: "Toggle Chat Panel",
            keybinding: "m",
            action: Action::ToggleChatPanel,
        },
        CommandDef {
            id: "next_contact",
            display_name: "Next Contact",
            keybinding: "]",
            action: Action::NextContact,
        },
        CommandDef {
            id: "prev_contact",
            display_name: "Previous Contact",
            keybinding: "[",
            action: Action::PrevContact,
        },
        CommandDef {
            id: "users_view",
            display_name: "Open Users View",
            keybinding: "u",
            action: Action::OpenUsersView,
        },
        CommandDef {
            id: "refresh",
            display_name: "Refresh Board",
            keybinding: "r",
            action: Action::Refresh,
        },
        CommandDef {
            id: "navigate_left",
            display_name: "Navigate Left",
            keybinding: "h / ←",
            action: Action::NavigateLeft,
        },
        CommandDef {
            id: "navigate_right",
            display_name: "Navigate Right",
            keybinding: "l / →",
            action: Action::NavigateRight,
        },
        CommandDef {
            id: "select_up",
            display_name: "Select Up",
            keybinding: "k / ↑",
            action: Action::SelectUp,
        },
        CommandDef {
            id: "select_down",
            display_name: "Select Down",
            keybinding: "j / ↓",
            action: Action::SelectDown,
        },
        CommandDef {
            id: "help",
            display_name: "Help",
            keybinding: "?",
            action: Action::ToggleHelp,
        },
        CommandDef {
            id: "quit",
            display_name: "Quit",
            keybinding: "q",
            action: Action::Quit,
        },
    ]
}
