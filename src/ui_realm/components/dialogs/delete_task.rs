use tuirealm::command::{Cmd, CmdResult};
use tuirealm::event::{Key, KeyEvent};
use tuirealm::props::{AttrValue, Attribute, Props};
use tuirealm::ratatui::layout::Rect;
use tuirealm::{Component, Event, Frame, MockComponent, NoUserEvent, State};

use crate::app::editor::{ConfirmCancelField, DeleteTaskDialogState};
use crate::theme::Theme;
use crate::ui_realm::components::dialog_shell::{DialogButton, DialogShell};
use crate::ui_realm::messages::Msg;

/// Confirmation dialog for task deletion. Button focus lives in the
/// model; the component is remounted with the current state whenever
/// focus changes, so the shell only renders the snapshot it was given.
pub struct DeleteTaskDialog {
    props: Props,
    shell: DialogShell,
}

impl DeleteTaskDialog {
    pub fn new(state: &DeleteTaskDialogState, theme: Theme) -> Self {
        let focused = match state.focused_field {
            ConfirmCancelField::Confirm => 0,
            ConfirmCancelField::Cancel => 1,
        };
        let shell = DialogShell::new(
            "Delete Task",
            vec![
                format!("Delete \"{}\"?", state.task_title),
                "This cannot be undone.".to_string(),
            ],
            vec![
                DialogButton::new("delete", "Delete"),
                DialogButton::new("cancel", "Cancel"),
            ],
            theme,
        )
        .with_focused_button(focused);

        Self {
            props: Props::default(),
            shell,
        }
    }
}

impl MockComponent for DeleteTaskDialog {
    fn view(&mut self, frame: &mut Frame, area: Rect) {
        self.shell.view(frame, area);
    }

    fn query(&self, attr: Attribute) -> Option<AttrValue> {
        self.props.get(attr)
    }

    fn attr(&mut self, attr: Attribute, value: AttrValue) {
        self.props.set(attr, value);
    }

    fn state(&self) -> State {
        self.shell.state()
    }

    fn perform(&mut self, cmd: Cmd) -> CmdResult {
        self.shell.perform(cmd)
    }
}

impl Component<Msg, NoUserEvent> for DeleteTaskDialog {
    fn on(&mut self, ev: Event<NoUserEvent>) -> Option<Msg> {
        match ev {
            Event::Keyboard(KeyEvent {
                code: Key::Char('y') | Key::Char('Y'),
                ..
            }) => Some(Msg::FocusButton("Delete".to_string())),
            Event::Keyboard(KeyEvent {
                code: Key::Char('n') | Key::Char('N'),
                ..
            }) => Some(Msg::FocusButton("Cancel".to_string())),
            ev => self.shell.on(ev),
        }
    }
}

#[cfg(test)]
use crate::ui_realm::ComponentId;
#[cfg(test)]
use crate::ui_realm::tests::harness::EventDriver;
#[cfg(test)]
use crate::ui_realm::tests::helpers::{
    mount_component_for_test, render_simple_component, send_key_to_component,
};
#[cfg(test)]
use crossterm::event::KeyCode;

#[cfg(test)]
fn test_state() -> DeleteTaskDialogState {
    use uuid::Uuid;

    DeleteTaskDialogState {
        task_id: Uuid::new_v4(),
        task_title: "Fix flaky test".to_string(),
        focused_field: ConfirmCancelField::Cancel,
    }
}

#[cfg(test)]
#[test]
fn renders() {
    let driver = EventDriver::default();
    let mut app = mount_component_for_test(
        &driver,
        ComponentId::DeleteTask,
        Box::new(DeleteTaskDialog::new(&test_state(), Theme::default())),
    );

    let output = render_simple_component(&mut app, ComponentId::DeleteTask);
    assert!(output.contains("Delete Task"), "dialog title should render");
    assert!(
        output.contains("Delete \"Fix flaky test\"?"),
        "task title should render in confirmation text"
    );
    assert!(
        output.contains("This cannot be undone."),
        "warning line should render"
    );
    assert!(output.contains("Delete"), "delete button should render");
    assert!(output.contains("Cancel"), "cancel button should render");
}

#[cfg(test)]
#[test]
fn focus_navigation() {
    let driver = EventDriver::default();
    let mut app = mount_component_for_test(
        &driver,
        ComponentId::DeleteTask,
        Box::new(DeleteTaskDialog::new(&test_state(), Theme::default())),
    );

    // Default focus sits on Cancel, so the first Tab lands on Delete.
    let messages = send_key_to_component(&driver, &mut app, &[KeyCode::Tab, KeyCode::Tab], 1);
    assert_eq!(
        messages,
        vec![
            Msg::FocusButton("Delete".to_string()),
            Msg::FocusButton("Cancel".to_string()),
        ]
    );
}

#[cfg(test)]
#[test]
fn shortcut_keys_target_buttons() {
    let driver = EventDriver::default();
    let mut app = mount_component_for_test(
        &driver,
        ComponentId::DeleteTask,
        Box::new(DeleteTaskDialog::new(&test_state(), Theme::default())),
    );

    let messages = send_key_to_component(
        &driver,
        &mut app,
        &[KeyCode::Char('y'), KeyCode::Char('n')],
        1,
    );
    assert_eq!(
        messages,
        vec![
            Msg::FocusButton("Delete".to_string()),
            Msg::FocusButton("Cancel".to_string()),
        ]
    );
}

#[cfg(test)]
#[test]
fn enter_submits_and_esc_cancels() {
    let driver = EventDriver::default();
    let mut app = mount_component_for_test(
        &driver,
        ComponentId::DeleteTask,
        Box::new(DeleteTaskDialog::new(&test_state(), Theme::default())),
    );

    let messages = send_key_to_component(&driver, &mut app, &[KeyCode::Enter, KeyCode::Esc], 1);
    assert_eq!(messages, vec![Msg::SubmitDialog, Msg::CancelAction]);
}
