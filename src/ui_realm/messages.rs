//! Semantic user action messages for tui-realm UI components.
//!
//! This module defines the `Msg` enum representing user intentions rather than
//! raw hardware events. Raw input (KeyEvent, MouseEvent) is translated by the
//! components and the keybinding dispatcher into the semantic messages here.
//!
//! # Design Principles
//!
//! 1. **Semantic over syntactic**: Messages represent user intent, not key presses
//! 2. **No raw events**: KeyEvent/MouseEvent never cross into the model
//! 3. **Coarse over fine**: Consolidate similar actions rather than 1:1 mapping
//! 4. **Component-agnostic**: Messages are UI-layer, not tied to specific components

/// Semantic user action messages.
///
/// Each variant represents a user intention or system event at a semantic
/// level. These messages drive the tui-realm Model<Msg> update cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    // =========================================================================
    // Navigation - moving focus and selection between UI regions
    // =========================================================================
    /// Move focus left (previous column)
    NavigateLeft,

    /// Move focus right (next column)
    NavigateRight,

    /// Move selection up (previous item in list/column)
    SelectUp,

    /// Move selection down (next item in list/column)
    SelectDown,

    /// Focus a specific board column by index
    FocusColumn(usize),

    /// Select a specific task within a column
    SelectTask { column: usize, task: usize },

    /// Select a row in the flat task table
    SelectTableRow(usize),

    /// Select a row in the users table
    SelectUserRow(usize),

    /// Toggle sort on a table column by its index
    SortByColumn(usize),

    // =========================================================================
    // Task Actions - task CRUD and movement
    // =========================================================================
    /// Open dialog to create a new task
    OpenNewTaskDialog,

    /// Open the editor for the selected task
    OpenEditTaskDialog,

    /// Mark the selected task as done
    CompleteTask,

    /// Open delete confirmation for the selected task
    OpenDeleteTaskDialog,

    /// Move the selected task one column left
    MoveTaskLeft,

    /// Move the selected task one column right
    MoveTaskRight,

    // =========================================================================
    // Grab Mode - pick up a task and carry it across columns
    // =========================================================================
    /// Pick up the selected task
    GrabTask,

    /// Shift the drop target one column left
    HoverGrabLeft,

    /// Shift the drop target one column right
    HoverGrabRight,

    /// Drop the grabbed task on the hovered column
    DropTask,

    /// Put the grabbed task back without moving it
    CancelGrab,

    // =========================================================================
    // Dialog Actions - generic form and dialog handling
    // =========================================================================
    /// Printable character typed into the focused dialog field
    DialogInput(char),

    /// Backspace in the focused dialog field
    DialogBackspace,

    /// Advance focus to the next dialog field
    FocusNextField,

    /// Move focus to the previous dialog field
    FocusPrevField,

    /// Cycle the enumerated value of the focused field
    CycleFieldValue,

    /// Submit current dialog with current values
    SubmitDialog,

    /// Dismiss current dialog without action
    DismissDialog,

    /// Confirm dialog action
    ConfirmAction,

    /// Cancel dialog action
    CancelAction,

    /// Focus a specific dialog button by label
    FocusButton(String),

    // =========================================================================
    // Chat - direct message side panel
    // =========================================================================
    /// Show or hide the chat sidebar
    ToggleChatPanel,

    /// Select the next contact in the sidebar
    NextContact,

    /// Select the previous contact in the sidebar
    PrevContact,

    /// Select a contact by index
    SelectContact(usize),

    /// Open the conversation with the selected contact
    OpenConversation,

    /// Close the open conversation, back to the contact list
    CloseConversation,

    /// Printable character typed into the message draft
    ChatInput(char),

    /// Backspace in the message draft
    ChatBackspace,

    /// Send the current message draft
    SendChatMessage,

    // =========================================================================
    // Views - top-level display state
    // =========================================================================
    /// Toggle between kanban board and table view
    ToggleViewMode,

    /// Switch to the users administration view
    OpenUsersView,

    /// Open the profile editor for the selected user
    OpenProfileEditor,

    // =========================================================================
    // Command Palette
    // =========================================================================
    /// Open the command palette overlay
    OpenCommandPalette,

    /// Execute a command from the palette by id
    ExecuteCommand(String),

    // =========================================================================
    // System Events - application lifecycle
    // =========================================================================
    /// Tick event for periodic reconciliation
    Tick,

    /// Terminal resize event
    Resize { width: u16, height: u16 },

    /// Force an immediate reload from the database
    Refresh,

    /// Toggle the keyboard shortcuts overlay
    ToggleHelp,

    /// Quit the application
    Quit,

    // =========================================================================
    // Error Handling - error display and dismissal
    // =========================================================================
    /// Show the error dialog with a message
    ShowError(String),
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod msg {
    use super::*;

    /// Test that all Msg variants are constructible.
    #[test]
    fn constructible() {
        // Navigation
        let _ = Msg::NavigateLeft;
        let _ = Msg::NavigateRight;
        let _ = Msg::SelectUp;
        let _ = Msg::SelectDown;
        let _ = Msg::FocusColumn(0);
        let _ = Msg::SelectTask { column: 0, task: 0 };
        let _ = Msg::SelectTableRow(0);
        let _ = Msg::SelectUserRow(0);
        let _ = Msg::SortByColumn(3);

        // Task actions
        let _ = Msg::OpenNewTaskDialog;
        let _ = Msg::OpenEditTaskDialog;
        let _ = Msg::CompleteTask;
        let _ = Msg::OpenDeleteTaskDialog;
        let _ = Msg::MoveTaskLeft;
        let _ = Msg::MoveTaskRight;

        // Grab mode
        let _ = Msg::GrabTask;
        let _ = Msg::HoverGrabLeft;
        let _ = Msg::HoverGrabRight;
        let _ = Msg::DropTask;
        let _ = Msg::CancelGrab;

        // Dialog actions
        let _ = Msg::DialogInput('a');
        let _ = Msg::DialogBackspace;
        let _ = Msg::FocusNextField;
        let _ = Msg::FocusPrevField;
        let _ = Msg::CycleFieldValue;
        let _ = Msg::SubmitDialog;
        let _ = Msg::DismissDialog;
        let _ = Msg::ConfirmAction;
        let _ = Msg::CancelAction;
        let _ = Msg::FocusButton("confirm".to_string());

        // Chat
        let _ = Msg::ToggleChatPanel;
        let _ = Msg::NextContact;
        let _ = Msg::PrevContact;
        let _ = Msg::SelectContact(0);
        let _ = Msg::OpenConversation;
        let _ = Msg::CloseConversation;
        let _ = Msg::ChatInput('x');
        let _ = Msg::ChatBackspace;
        let _ = Msg::SendChatMessage;

        // Views
        let _ = Msg::ToggleViewMode;
        let _ = Msg::OpenUsersView;
        let _ = Msg::OpenProfileEditor;

        // Command palette
        let _ = Msg::OpenCommandPalette;
        let _ = Msg::ExecuteCommand("task.new".to_string());

        // System events
        let _ = Msg::Tick;
        let _ = Msg::Resize {
            width: 80,
            height: 24,
        };
        let _ = Msg::Refresh;
        let _ = Msg::ToggleHelp;
        let _ = Msg::Quit;

        // Error handling
        let _ = Msg::ShowError("test error".to_string());
    }

    /// Test Msg derives Clone correctly.
    #[test]
    fn clone_behavior() {
        let original = Msg::SelectTask { column: 1, task: 2 };
        let cloned = original.clone();
        assert_eq!(original, cloned);
    }

    #[test]
    fn text_variants_carry_payload() {
        match Msg::ExecuteCommand("chat.toggle".to_string()) {
            Msg::ExecuteCommand(id) => assert_eq!(id, "chat.toggle"),
            _ => unreachable!(),
        }
        match Msg::ShowError("boom".to_string()) {
            Msg::ShowError(text) => assert_eq!(text, "boom"),
            _ => unreachable!(),
        }
    }
}
