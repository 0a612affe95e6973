//! tui-realm UI components and types.
//!
//! This module provides the ComponentId enum for all UI components, the
//! semantic message enum driving the update cycle, the board model, and
//! the application wrapper that mounts and wires the component tree.

#[cfg(test)]
pub mod tests;

pub mod application;
pub mod components;
pub mod messages;
pub mod model;

pub use application::TuiApplication;
pub use model::Model;

/// Component identifier enum for the tui-realm Application.
///
/// Each variant represents a unique component in the UI hierarchy.
/// Tuple variants (e.g., BoardColumn(usize)) are used for components
/// that have multiple instances.
///
/// # Variants
///
/// ## Core Components
/// - `BoardColumn(usize)`: Kanban board column (indexed)
/// - `TaskTable`: Sortable flat task table
/// - `UsersTable`: User administration table
/// - `ChatSidebar`: Direct message side panel
/// - `Footer`: Status bar / keyboard hints
/// - `CommandPalette`: Fuzzy command search overlay
///
/// ## Dialog Components
/// - `TaskEditor`: Create/edit task form
/// - `DeleteTask`: Delete task confirmation dialog
/// - `ProfileEditor`: User profile edit form
/// - `Help`: Keyboard shortcuts overlay
/// - `Error`: Generic error display dialog
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum ComponentId {
    // Core components
    BoardColumn(usize),
    TaskTable,
    UsersTable,
    ChatSidebar,
    Footer,
    CommandPalette,

    // Dialog components
    TaskEditor,
    DeleteTask,
    ProfileEditor,
    Help,
    Error,
}

impl ComponentId {
    /// Dialog components steal focus from the board while mounted.
    pub fn is_modal(&self) -> bool {
        matches!(
            self,
            ComponentId::CommandPalette
                | ComponentId::TaskEditor
                | ComponentId::DeleteTask
                | ComponentId::ProfileEditor
                | ComponentId::Help
                | ComponentId::Error
        )
    }
}
