use super::*;
use crate::engine::testing::{Scripted, ScriptedRunner};
use crate::engine::MemoryBufferStore;
use crate::remote::{ListItem, RemoteError};

struct StubListService {
    reachable: bool,
    items: Vec<ListItem>,
}

impl ListService for StubListService {
    fn handshake(&mut self) -> Result<(), RemoteError> {
        if self.reachable {
            Ok(())
        } else {
            Err(RemoteError::Status(503))
        }
    }

    fn fetch_items(&mut self) -> Result<Vec<ListItem>, RemoteError> {
        Ok(self.items.clone())
    }
}

fn item(title: &str) -> ListItem {
    ListItem {
        title: title.to_string(),
        author: "kit".to_string(),
    }
}

fn app_with(
    reachable: bool,
    policy: ConnectPolicy,
    replies: Vec<Scripted>,
) -> (App, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("leds.json"), "{}").expect("write config");
    let config = Config {
        connect_policy: policy,
        config_dir: dir.path().to_path_buf(),
        ..Config::default()
    };
    let session = Session::new(
        Box::new(MemoryBufferStore::new()),
        Box::new(ScriptedRunner::new(replies)),
    );
    let service = StubListService {
        reachable,
        items: vec![item("Pulse"), item("Drift")],
    };
    (App::new(session, Box::new(service), &config), dir)
}

fn app() -> (App, tempfile::TempDir) {
    app_with(true, ConnectPolicy::Always, vec![])
}

fn press(app: &mut App, code: KeyCode) {
    app.handle_event(&Event::Key(KeyEvent::new(code, KeyModifiers::NONE)));
}

fn ctrl(app: &mut App, c: char) {
    app.handle_event(&Event::Key(KeyEvent::new(
        KeyCode::Char(c),
        KeyModifiers::CONTROL,
    )));
}

/// Answers the popup with `y` and picks the only configuration file.
fn into_interacting(app: &mut App) {
    press(app, KeyCode::Char('y'));
    press(app, KeyCode::Enter);
    assert_eq!(app.mode, Mode::Interacting);
}

#[test]
fn starts_awaiting_connection_choice_with_yes_highlighted() {
    let (app, _dir) = app();
    assert_eq!(app.mode, Mode::AwaitingConnectionChoice);
    assert!(app.popup_choice);
    assert!(app.popup.highlighted);
    assert!(!app.connected);
    assert_eq!(app.connect_attempts, 0);
}

#[test]
fn h_then_enter_flips_once_and_connects_once() {
    let (mut app, _dir) = app();

    press(&mut app, KeyCode::Char('h'));
    assert!(!app.popup_choice);
    assert_eq!(app.mode, Mode::AwaitingConnectionChoice);
    assert_eq!(app.connect_attempts, 0);

    press(&mut app, KeyCode::Enter);
    assert!(!app.popup_choice);
    assert_eq!(app.mode, Mode::PickingConfig);
    assert_eq!(app.connect_attempts, 1);
    assert!(app.connected);
    assert_eq!(app.list.items.len(), 2);
}

#[test]
fn on_yes_policy_skips_connection_after_no() {
    let (mut app, _dir) = app_with(true, ConnectPolicy::OnYes, vec![]);

    press(&mut app, KeyCode::Char('n'));

    assert_eq!(app.mode, Mode::PickingConfig);
    assert_eq!(app.connect_attempts, 0);
    assert!(!app.connected);
    assert_eq!(app.list.error.as_deref(), Some(CONNECT_SKIPPED));
}

#[test]
fn on_yes_policy_connects_after_yes() {
    let (mut app, _dir) = app_with(true, ConnectPolicy::OnYes, vec![]);
    press(&mut app, KeyCode::Char('y'));
    assert_eq!(app.connect_attempts, 1);
    assert!(app.connected);
}

#[test]
fn unreachable_server_is_not_fatal() {
    let (mut app, _dir) = app_with(false, ConnectPolicy::Always, vec![]);

    press(&mut app, KeyCode::Char('y'));

    assert_eq!(app.mode, Mode::PickingConfig);
    assert!(!app.connected);
    assert!(!app.should_quit);
    let shown = app.list.error.clone().unwrap_or_default();
    assert!(shown.starts_with(CONNECT_FAILED));
    assert!(shown.contains("503"));
}

#[test]
fn picking_a_file_configures_session_and_starts_interacting() {
    let (mut app, dir) = app();
    press(&mut app, KeyCode::Char('y'));
    let enter = Event::Key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));
    assert_eq!(app.routes(&enter), vec![Route::Picker]);

    press(&mut app, KeyCode::Enter);

    let expected = std::path::absolute(dir.path().join("leds.json")).expect("absolute");
    assert_eq!(app.mode, Mode::Interacting);
    assert_eq!(app.repl.session().config_path(), Some(expected.as_path()));
}

#[test]
fn resize_reaches_every_sub_model_while_list_focused() {
    let (mut app, _dir) = app();
    into_interacting(&mut app);
    ctrl(&mut app, 'n');
    assert_eq!(app.focus, Focus::List);

    app.handle_event(&Event::Resize(100, 40));
    assert_eq!(app.repl.size, (100, 40));

    app.handle_event(&Event::Resize(60, 20));
    assert_eq!(app.repl.size, (60, 20));
    assert_eq!(app.list.size, (60, 20));
    assert_eq!(app.picker.size, (60, 20));
    assert_eq!(app.popup.size, (60, 20));
}

#[test]
fn resize_is_broadcast_in_every_mode() {
    let (mut app, _dir) = app();
    assert_eq!(app.routes(&Event::Resize(1, 1)), Route::all().to_vec());
    press(&mut app, KeyCode::Char('y'));
    assert_eq!(app.routes(&Event::Resize(1, 1)), Route::all().to_vec());
    press(&mut app, KeyCode::Enter);
    assert_eq!(app.routes(&Event::Resize(1, 1)), Route::all().to_vec());
}

#[test]
fn focus_toggle_is_involutive() {
    let (mut app, _dir) = app();
    into_interacting(&mut app);
    let start = app.focus;

    ctrl(&mut app, 'n');
    assert_ne!(app.focus, start);
    ctrl(&mut app, 'n');
    assert_eq!(app.focus, start);
}

#[test]
fn focus_toggle_is_ignored_before_interacting() {
    let (mut app, _dir) = app();
    ctrl(&mut app, 'n');
    assert_eq!(app.focus, Focus::Repl);
    assert_eq!(app.mode, Mode::AwaitingConnectionChoice);
}

#[test]
fn keys_go_only_to_focused_pane() {
    let (mut app, _dir) = app_with(true, ConnectPolicy::Always, vec![Scripted::Output("ok")]);
    into_interacting(&mut app);

    press(&mut app, KeyCode::Char('j'));
    assert_eq!(app.repl.input, "j");
    assert_eq!(app.list.selected, 0);

    ctrl(&mut app, 'n');
    press(&mut app, KeyCode::Char('j'));
    assert_eq!(app.list.selected, 1);
    assert_eq!(app.repl.input, "j");
}

#[test]
fn list_focus_without_connection_routes_nowhere() {
    let (mut app, _dir) = app_with(false, ConnectPolicy::Always, vec![]);
    into_interacting(&mut app);
    ctrl(&mut app, 'n');

    let key = Event::Key(KeyEvent::new(KeyCode::Char('j'), KeyModifiers::NONE));
    assert!(app.routes(&key).is_empty());
}

#[test]
fn repl_submit_goes_through_session() {
    let (mut app, _dir) = app_with(
        true,
        ConnectPolicy::Always,
        vec![Scripted::Output("ok"), Scripted::Output("|bad")],
    );
    into_interacting(&mut app);

    for c in "x = 1".chars() {
        press(&mut app, KeyCode::Char(c));
    }
    press(&mut app, KeyCode::Enter);
    for c in "oops".chars() {
        press(&mut app, KeyCode::Char(c));
    }
    press(&mut app, KeyCode::Enter);

    let records = app.repl.records();
    assert_eq!(records.len(), 2);
    assert!(records[0].success);
    assert!(!records[1].success);
    assert_eq!(app.repl.session().working_text().expect("working"), "x = 1\n");
}

#[test]
fn paste_reaches_repl_only_when_focused() {
    let (mut app, _dir) = app();
    into_interacting(&mut app);

    app.handle_event(&Event::Paste("a\nb".to_string()));
    assert_eq!(app.repl.input, "a b");

    ctrl(&mut app, 'n');
    app.handle_event(&Event::Paste("zzz".to_string()));
    assert_eq!(app.repl.input, "a b");
}

#[test]
fn mode_never_moves_backwards() {
    let (mut app, _dir) = app();
    let mut seen = vec![app.mode];
    let script = [
        KeyCode::Char('l'),
        KeyCode::Enter,
        KeyCode::Char('y'),
        KeyCode::Char('n'),
        KeyCode::Enter,
        KeyCode::Backspace,
        KeyCode::Enter,
        KeyCode::Char('n'),
    ];
    for code in script {
        press(&mut app, code);
        seen.push(app.mode);
    }
    assert!(seen.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(app.mode, Mode::Interacting);

    app.advance(Mode::PickingConfig);
    assert_eq!(app.mode, Mode::Interacting);
}

#[test]
fn quit_is_checked_before_mode_dispatch() {
    for steps in 0..3 {
        let (mut app, _dir) = app();
        if steps >= 1 {
            press(&mut app, KeyCode::Char('y'));
        }
        if steps >= 2 {
            press(&mut app, KeyCode::Enter);
        }
        let mode = app.mode;
        let quit = Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.routes(&quit).is_empty());

        app.handle_event(&quit);

        assert!(app.should_quit());
        assert_eq!(app.mode, mode);
    }
}
