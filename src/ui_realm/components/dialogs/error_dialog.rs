use tuirealm::command::{Cmd, CmdResult};
use tuirealm::props::{AttrValue, Attribute, Props};
use tuirealm::ratatui::layout::Rect;
use tuirealm::{Component, Event, Frame, MockComponent, NoUserEvent, State};

use crate::theme::Theme;
use crate::ui_realm::components::dialog_shell::{DialogButton, DialogShell};
use crate::ui_realm::messages::Msg;

/// Modal error report. Shown above every other dialog until dismissed.
pub struct ErrorDialog {
    props: Props,
    shell: DialogShell,
}

impl ErrorDialog {
    pub fn new(detail: impl Into<String>, theme: Theme) -> Self {
        let detail = detail.into();
        let detail = if detail.is_empty() {
            "An unexpected error occurred.".to_string()
        } else {
            detail
        };
        Self {
            props: Props::default(),
            shell: DialogShell::new(
                "Error",
                vec![detail],
                vec![DialogButton::new("dismiss", "Dismiss")],
                theme,
            ),
        }
    }
}

impl MockComponent for ErrorDialog {
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

impl Component<Msg, NoUserEvent> for ErrorDialog {
    fn on(&mut self, ev: Event<NoUserEvent>) -> Option<Msg> {
        match self.shell.on(ev) {
            Some(Msg::SubmitDialog) | Some(Msg::CancelAction) => Some(Msg::DismissDialog),
            msg => msg,
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
#[test]
fn renders_detail() {
    let driver = EventDriver::default();
    let mut app = mount_component_for_test(
        &driver,
        ComponentId::Error,
        Box::new(ErrorDialog::new(
            "database is locked".to_string(),
            Theme::default(),
        )),
    );

    let output = render_simple_component(&mut app, ComponentId::Error);
    assert!(output.contains("Error"), "dialog title should render");
    assert!(
        output.contains("database is locked"),
        "error detail should render"
    );
    assert!(
        output.contains("[ Dismiss ]"),
        "dismiss button should render"
    );
}

#[cfg(test)]
#[test]
fn empty_detail_gets_placeholder() {
    let driver = EventDriver::default();
    let mut app = mount_component_for_test(
        &driver,
        ComponentId::Error,
        Box::new(ErrorDialog::new(String::new(), Theme::default())),
    );

    let output = render_simple_component(&mut app, ComponentId::Error);
    assert!(
        output.contains("An unexpected error occurred."),
        "empty detail should fall back to a generic message"
    );
}

#[cfg(test)]
#[test]
fn dismiss_emits_msg() {
    let driver = EventDriver::default();
    let mut app = mount_component_for_test(
        &driver,
        ComponentId::Error,
        Box::new(ErrorDialog::new("boom".to_string(), Theme::default())),
    );

    let enter_messages = send_key_to_component(&driver, &mut app, &[KeyCode::Enter], 1);
    assert_eq!(enter_messages, vec![Msg::DismissDialog]);

    let esc_messages = send_key_to_component(&driver, &mut app, &[KeyCode::Esc], 1);
    assert_eq!(esc_messages, vec![Msg::DismissDialog]);
}
