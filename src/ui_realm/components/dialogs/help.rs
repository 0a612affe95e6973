use tuirealm::command::{Cmd, CmdResult};
use tuirealm::props::{AttrValue, Attribute, Props};
use tuirealm::ratatui::layout::Rect;
use tuirealm::{Component, Event, Frame, MockComponent, NoUserEvent, State};

use crate::theme::Theme;
use crate::ui_realm::components::dialog_shell::{DialogButton, DialogShell};
use crate::ui_realm::messages::Msg;

pub struct HelpDialog {
    props: Props,
    shell: DialogShell,
}

impl HelpDialog {
    pub fn new(theme: Theme) -> Self {
        Self {
            props: Props::default(),
            shell: DialogShell::new(
                "Help",
                Self::content_lines(),
                vec![DialogButton::new("close", "Close")],
                theme,
            ),
        }
    }

    fn content_lines() -> Vec<String> {
        vec![
            "Navigation".to_string(),
            "  h/l or arrows: switch columns".to_string(),
            "  j/k or arrows: select task".to_string(),
            "Task Actions".to_string(),
            "  n: new task".to_string(),
            "  e or Enter: edit selected task".to_string(),
            "  Space: grab task / drop it on the hovered column".to_string(),
            "  H/L: move selected task across columns".to_string(),
            "  c: complete task".to_string(),
            "  d: delete task".to_string(),
            "Chat".to_string(),
            "  m: toggle chat panel".to_string(),
            "  ]/[: next / previous contact".to_string(),
            "  Enter: open conversation, Esc: back to contacts".to_string(),
            "Views".to_string(),
            "  \\: switch between board and table".to_string(),
            "  u: users view".to_string(),
            "General".to_string(),
            "  Ctrl+P: open command palette".to_string(),
            "  r: refresh from the database".to_string(),
            "  ?: toggle help".to_string(),
            "  q: quit".to_string(),
        ]
    }
}

impl MockComponent for HelpDialog {
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

impl Component<Msg, NoUserEvent> for HelpDialog {
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
use crate::ui_realm::tests::harness::{EventDriver, MockTerminal};
#[cfg(test)]
use crate::ui_realm::tests::helpers::{
    mount_component_for_test, render_component, render_simple_component, send_key_to_component,
};
#[cfg(test)]
use crossterm::event::KeyCode;

#[cfg(test)]
#[test]
fn renders() {
    let driver = EventDriver::default();
    let mut app = mount_component_for_test(
        &driver,
        ComponentId::Help,
        Box::new(HelpDialog::new(Theme::default())),
    );

    let output = render_simple_component(&mut app, ComponentId::Help);
    assert!(output.contains("Help"), "dialog title should render");
    assert!(output.contains("Navigation"), "help content should render");
    assert!(output.contains("[ Close ]"), "close button should render");
}

#[cfg(test)]
#[test]
fn close_emits_msg() {
    let driver = EventDriver::default();
    let mut app = mount_component_for_test(
        &driver,
        ComponentId::Help,
        Box::new(HelpDialog::new(Theme::default())),
    );

    let enter_messages = send_key_to_component(&driver, &mut app, &[KeyCode::Enter], 1);
    assert_eq!(enter_messages, vec![Msg::DismissDialog]);

    let esc_messages = send_key_to_component(&driver, &mut app, &[KeyCode::Esc], 1);
    assert_eq!(esc_messages, vec![Msg::DismissDialog]);
}

#[cfg(test)]
#[test]
fn content_contains_key_hints() {
    let driver = EventDriver::default();
    let mut app = mount_component_for_test(
        &driver,
        ComponentId::Help,
        Box::new(HelpDialog::new(Theme::default())),
    );

    let mut terminal = MockTerminal::new(120, 36);
    let output = render_component(&mut app, ComponentId::Help, &mut terminal);
    assert!(output.contains("n: new task"), "new task hint should render");
    assert!(
        output.contains("m: toggle chat panel"),
        "chat hint should render"
    );
    assert!(
        output.contains("Ctrl+P: open command palette"),
        "command palette hint should render"
    );
    assert!(
        output.contains("u: users view"),
        "users view hint should render"
    );
    assert!(output.contains("q: quit"), "quit hint should render");
}
