use std::str::FromStr;

use tuirealm::ratatui::style::Color;

use crate::types::{Priority, Status, Urgency};

#[derive(Debug, Clone, Copy, Eq, PartialEq, Default)]
pub enum ThemePreset {
    #[default]
    Default,
    Light,
    HighContrast,
    Mono,
}

impl ThemePreset {
    pub const ALL: [Self; 4] = [Self::Default, Self::Light, Self::HighContrast, Self::Mono];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Light => "light",
            Self::HighContrast => "high-contrast",
            Self::Mono => "mono",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::Default => "Balanced colors for everyday use",
            Self::Light => "Bright background with dark text",
            Self::HighContrast => "Enhanced visibility, bright on dark",
            Self::Mono => "Minimal monochrome aesthetic",
        }
    }

    pub const fn next(self) -> Self {
        match self {
            Self::Default => Self::Light,
            Self::Light => Self::HighContrast,
            Self::HighContrast => Self::Mono,
            Self::Mono => Self::Default,
        }
    }

    pub const fn previous(self) -> Self {
        match self {
            Self::Default => Self::Mono,
            Self::Light => Self::Default,
            Self::HighContrast => Self::Light,
            Self::Mono => Self::HighContrast,
        }
    }
}

impl FromStr for ThemePreset {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "default" => Ok(Self::Default),
            "light" | "day" => Ok(Self::Light),
            "high-contrast" | "high_contrast" | "contrast" => Ok(Self::HighContrast),
            "mono" | "monochrome" => Ok(Self::Mono),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub base: BasePalette,
    pub interactive: InteractivePalette,
    pub status: StatusPalette,
    pub priority: PriorityPalette,
    pub urgency: UrgencyPalette,
    pub card: CardPalette,
    pub dialog: DialogPalette,
}

#[derive(Debug, Clone, Copy)]
pub struct BasePalette {
    pub canvas: Color,
    pub surface: Color,
    pub text: Color,
    pub text_muted: Color,
    pub header: Color,
    pub accent: Color,
    pub danger: Color,
}

#[derive(Debug, Clone, Copy)]
pub struct InteractivePalette {
    pub focus: Color,
    pub selected_bg: Color,
    pub selected_border: Color,
    pub border: Color,
    pub drop_target: Color,
}

#[derive(Debug, Clone, Copy)]
pub struct StatusPalette {
    pub pending: Color,
    pub in_progress: Color,
    pub review: Color,
    pub completed: Color,
}

#[derive(Debug, Clone, Copy)]
pub struct PriorityPalette {
    pub low: Color,
    pub medium: Color,
    pub high: Color,
}

#[derive(Debug, Clone, Copy)]
pub struct UrgencyPalette {
    pub overdue: Color,
    pub due_today: Color,
    pub upcoming: Color,
}

#[derive(Debug, Clone, Copy)]
pub struct CardPalette {
    pub assignee: Color,
    pub client: Color,
    pub online: Color,
    pub offline: Color,
}

#[derive(Debug, Clone, Copy)]
pub struct DialogPalette {
    pub surface: Color,
    pub input_bg: Color,
    pub button_bg: Color,
    pub button_fg: Color,
}

#[derive(Debug, Clone, Copy)]
pub struct CardStateColors {
    pub background: Color,
    pub border: Color,
}

impl Theme {
    pub fn from_preset(preset: ThemePreset) -> Self {
        match preset {
            ThemePreset::Default => Self {
                base: BasePalette {
                    canvas: Color::Rgb(36, 40, 56),
                    surface: Color::Rgb(36, 40, 56),
                    text: Color::White,
                    text_muted: Color::DarkGray,
                    header: Color::Cyan,
                    accent: Color::Magenta,
                    danger: Color::Red,
                },
                interactive: InteractivePalette {
                    focus: Color::Cyan,
                    selected_bg: Color::Rgb(54, 48, 72),
                    selected_border: Color::Rgb(255, 187, 120),
                    border: Color::DarkGray,
                    drop_target: Color::LightGreen,
                },
                status: StatusPalette {
                    pending: Color::Gray,
                    in_progress: Color::Yellow,
                    review: Color::LightBlue,
                    completed: Color::LightGreen,
                },
                priority: PriorityPalette {
                    low: Color::Gray,
                    medium: Color::Yellow,
                    high: Color::Red,
                },
                urgency: UrgencyPalette {
                    overdue: Color::Red,
                    due_today: Color::Yellow,
                    upcoming: Color::LightGreen,
                },
                card: CardPalette {
                    assignee: Color::LightCyan,
                    client: Color::LightYellow,
                    online: Color::LightGreen,
                    offline: Color::DarkGray,
                },
                dialog: DialogPalette {
                    surface: Color::Rgb(36, 40, 56),
                    input_bg: Color::Rgb(36, 40, 56),
                    button_bg: Color::Black,
                    button_fg: Color::Black,
                },
            },
            ThemePreset::Light => Self {
                base: BasePalette {
                    canvas: Color::Rgb(246, 248, 252),
                    surface: Color::Rgb(255, 255, 255),
                    text: Color::Rgb(32, 38, 51),
                    text_muted: Color::Rgb(95, 105, 122),
                    header: Color::Rgb(37, 99, 235),
                    accent: Color::Rgb(2, 132, 199),
                    danger: Color::Rgb(185, 28, 28),
                },
                interactive: InteractivePalette {
                    focus: Color::Rgb(37, 99, 235),
                    selected_bg: Color::Rgb(227, 237, 255),
                    selected_border: Color::Rgb(59, 130, 246),
                    border: Color::Rgb(196, 208, 224),
                    drop_target: Color::Rgb(22, 163, 74),
                },
                status: StatusPalette {
                    pending: Color::Rgb(71, 85, 105),
                    in_progress: Color::Rgb(202, 138, 4),
                    review: Color::Rgb(37, 99, 235),
                    completed: Color::Rgb(22, 163, 74),
                },
                priority: PriorityPalette {
                    low: Color::Rgb(71, 85, 105),
                    medium: Color::Rgb(202, 138, 4),
                    high: Color::Rgb(185, 28, 28),
                },
                urgency: UrgencyPalette {
                    overdue: Color::Rgb(185, 28, 28),
                    due_today: Color::Rgb(202, 138, 4),
                    upcoming: Color::Rgb(22, 163, 74),
                },
                card: CardPalette {
                    assignee: Color::Rgb(14, 116, 144),
                    client: Color::Rgb(161, 98, 7),
                    online: Color::Rgb(22, 163, 74),
                    offline: Color::Rgb(95, 105, 122),
                },
                dialog: DialogPalette {
                    surface: Color::Rgb(255, 255, 255),
                    input_bg: Color::Rgb(241, 245, 249),
                    button_bg: Color::Rgb(226, 232, 240),
                    button_fg: Color::White,
                },
            },
            ThemePreset::HighContrast => Self {
                base: BasePalette {
                    canvas: Color::Rgb(20, 20, 20),
                    surface: Color::Rgb(20, 20, 20),
                    text: Color::White,
                    text_muted: Color::Gray,
                    header: Color::LightCyan,
                    accent: Color::LightBlue,
                    danger: Color::LightRed,
                },
                interactive: InteractivePalette {
                    focus: Color::LightCyan,
                    selected_bg: Color::Rgb(36, 36, 36),
                    selected_border: Color::LightYellow,
                    border: Color::Gray,
                    drop_target: Color::LightGreen,
                },
                status: StatusPalette {
                    pending: Color::White,
                    in_progress: Color::LightYellow,
                    review: Color::LightCyan,
                    completed: Color::LightGreen,
                },
                priority: PriorityPalette {
                    low: Color::White,
                    medium: Color::LightYellow,
                    high: Color::LightRed,
                },
                urgency: UrgencyPalette {
                    overdue: Color::LightRed,
                    due_today: Color::LightYellow,
                    upcoming: Color::LightGreen,
                },
                card: CardPalette {
                    assignee: Color::LightCyan,
                    client: Color::LightYellow,
                    online: Color::LightGreen,
                    offline: Color::Gray,
                },
                dialog: DialogPalette {
                    surface: Color::Rgb(20, 20, 20),
                    input_bg: Color::Rgb(20, 20, 20),
                    button_bg: Color::Black,
                    button_fg: Color::Black,
                },
            },
            ThemePreset::Mono => Self {
                base: BasePalette {
                    canvas: Color::Rgb(26, 26, 26),
                    surface: Color::Rgb(26, 26, 26),
                    text: Color::White,
                    text_muted: Color::Gray,
                    header: Color::White,
                    accent: Color::Gray,
                    danger: Color::White,
                },
                interactive: InteractivePalette {
                    focus: Color::White,
                    selected_bg: Color::Rgb(35, 35, 35),
                    selected_border: Color::White,
                    border: Color::Gray,
                    drop_target: Color::White,
                },
                status: StatusPalette {
                    pending: Color::Gray,
                    in_progress: Color::White,
                    review: Color::Gray,
                    completed: Color::White,
                },
                priority: PriorityPalette {
                    low: Color::Gray,
                    medium: Color::Gray,
                    high: Color::White,
                },
                urgency: UrgencyPalette {
                    overdue: Color::White,
                    due_today: Color::Gray,
                    upcoming: Color::Gray,
                },
                card: CardPalette {
                    assignee: Color::White,
                    client: Color::Gray,
                    online: Color::White,
                    offline: Color::Gray,
                },
                dialog: DialogPalette {
                    surface: Color::Rgb(26, 26, 26),
                    input_bg: Color::Rgb(26, 26, 26),
                    button_bg: Color::Black,
                    button_fg: Color::Black,
                },
            },
        }
    }

    pub fn status_color(&self, status: Status) -> Color {
        match status {
            Status::Pending => self.status.pending,
            Status::InProgress => self.status.in_progress,
            Status::Review => self.status.review,
            Status::Completed => self.status.completed,
        }
    }

    pub fn priority_color(&self, priority: Priority) -> Color {
        match priority {
            Priority::Low => self.priority.low,
            Priority::Medium => self.priority.medium,
            Priority::High => self.priority.high,
        }
    }

    pub fn urgency_color(&self, urgency: Urgency) -> Color {
        match urgency {
            Urgency::Overdue => self.urgency.overdue,
            Urgency::DueToday => self.urgency.due_today,
            Urgency::Upcoming => self.urgency.upcoming,
            Urgency::None => self.base.text_muted,
        }
    }

    pub fn presence_color(&self, online: bool) -> Color {
        if online {
            self.card.online
        } else {
            self.card.offline
        }
    }

    /// Card colors for the board view. A hovered drop target outranks
    /// selection.
    pub fn card_colors(&self, selected: bool, drop_target: bool) -> CardStateColors {
        if drop_target {
            CardStateColors {
                background: self.interactive.selected_bg,
                border: self.interactive.drop_target,
            }
        } else if selected {
            CardStateColors {
                background: self.interactive.selected_bg,
                border: self.interactive.selected_border,
            }
        } else {
            CardStateColors {
                background: Color::Reset,
                border: self.interactive.border,
            }
        }
    }

    pub fn dialog_surface(&self) -> Color {
        self.dialog.surface
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::from_preset(ThemePreset::Default)
    }
}
