//! The control thread: applies commands to the store and drives the player.

use std::io::Write;
use std::path::Path;

use crossbeam_channel::{select, Receiver};
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::console::{self, Command};
use crate::errors::{CommandError, Result};
use crate::mode::Mode;
use crate::persist;
use crate::playback::{KeyboardFactory, Outcome, Player, SessionReport, Transition};
use crate::store::Store;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Command(Command),
    /// A console line that did not parse.
    Rejected(CommandError),
    /// Hotkey press.
    Toggle,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

pub struct App<W: Write> {
    store: Store,
    player: Player,
    config: AppConfig,
    out: W,
}

impl<W: Write> App<W> {
    pub fn new(config: AppConfig, keyboard_factory: KeyboardFactory, out: W) -> Self {
        Self {
            store: Store::new(),
            player: Player::new(keyboard_factory),
            config,
            out,
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    /// Runs until a quit message arrives or every sender is gone.
    pub fn run(&mut self, receiver: &Receiver<Message>) -> Result<()> {
        loop {
            let done = self.player.completion();
            select! {
                recv(receiver) -> message => {
                    let Ok(message) = message else { break };
                    if self.handle(message) == Control::Quit {
                        break;
                    }
                }
                recv(done) -> report => {
                    self.on_finished(report.ok());
                }
            }
        }
        self.shutdown();
        Ok(())
    }

    /// Applies one message. Recoverable errors are logged and shown, never returned.
    pub fn handle(&mut self, message: Message) -> Control {
        let result = match message {
            Message::Command(command) => self.dispatch(command),
            Message::Rejected(e) => Err(e.into()),
            Message::Toggle => self.toggle().map(|_| Control::Continue),
            Message::Quit => Ok(Control::Quit),
        };
        match result {
            Ok(control) => control,
            Err(e) => {
                warn!("{}", e);
                self.say(&format!("⚠ {}", e));
                Control::Continue
            }
        }
    }

    /// Loads a playlist file into the store, replacing its contents.
    pub fn load(&mut self, path: &Path) -> Result<()> {
        let record = persist::load(path)?;
        self.store.apply(record);
        self.say(&format!("Loaded {} messages from {}", self.store.len(), path.display()));
        Ok(())
    }

    fn dispatch(&mut self, command: Command) -> Result<Control> {
        match command {
            Command::Add(text) => {
                if self.store.add(&text) {
                    self.say(&format!("Added #{}", self.store.len()));
                }
            }
            Command::Edit { selection, text } => {
                let previous = self.store.edit(selection, &text)?;
                self.say(&format!("Edited \"{}\" → \"{}\"", previous, text));
            }
            Command::Delete(selection) => {
                let removed = self.store.delete(selection)?;
                self.say(&format!("Deleted \"{}\"", removed));
            }
            Command::Move { from, to } => {
                self.store.move_message(from, to)?;
                let listing = console::render_list(&self.store);
                self.say(&listing);
            }
            Command::List => {
                let listing = console::render_list(&self.store);
                self.say(&listing);
            }
            Command::Delay(input) => {
                let delay = self.store.set_delay(&input)?;
                self.say(&format!("Message rate set to {} seconds", delay));
            }
            Command::Repeat(input) => {
                let count = self.store.set_repeat_count(&input)?;
                self.say(&format!("Repeat count set to {}", count));
            }
            Command::Mode(input) => {
                let mode: Mode = input.parse()?;
                self.store.set_mode(mode);
                self.say(&format!("Mode set to {}", mode));
            }
            Command::Save(path) => {
                persist::save(&path, &self.store.to_persistable())?;
                self.say(&format!("Saved to {}", path.display()));
            }
            Command::Load(path) => self.load(&path)?,
            // Start while typing stops; the user starts again explicitly.
            Command::Start | Command::Toggle => self.toggle()?,
            Command::Stop => match self.player.stop() {
                Some(report) => self.report(&report),
                None => self.say("Not typing."),
            },
            Command::Status => {
                let mut status = console::render_status(
                    &self.store,
                    self.player.button_label(),
                    self.config.hotkey,
                );
                if let Some(started) = self.player.started_at() {
                    status.push_str(&format!("\n│ typing since {}", started.format("%H:%M:%S")));
                }
                self.say(&status);
            }
            Command::Help => {
                let help = console::render_help(self.config.hotkey);
                self.say(&help);
            }
            Command::About => {
                let about = console::render_about(self.config.hotkey);
                self.say(&about);
            }
            Command::Quit => return Ok(Control::Quit),
            Command::Empty => {}
        }
        Ok(Control::Continue)
    }

    fn toggle(&mut self) -> Result<()> {
        match self.player.toggle(&self.store)? {
            Transition::Started => {
                let delay = self.store.settings().delay;
                self.say(&format!(
                    "Typing starts in {}s. Focus the game window. [{}]",
                    delay,
                    self.player.button_label()
                ));
            }
            Transition::Stopped(report) => self.report(&report),
        }
        Ok(())
    }

    fn on_finished(&mut self, received: Option<SessionReport>) {
        if let Some(report) = self.player.reap(received) {
            self.report(&report);
        }
    }

    fn report(&mut self, report: &SessionReport) {
        if let Outcome::Failed(reason) = &report.outcome {
            warn!("Typing session failed: {}", reason);
        }
        let line = format!("{} [{}]", report, self.player.button_label());
        self.say(&line);
    }

    fn shutdown(&mut self) {
        if let Some(report) = self.player.stop() {
            self.report(&report);
        }
        info!("Shutting down");
    }

    fn say(&mut self, text: &str) {
        if let Err(e) = writeln!(self.out, "{}", text).and_then(|_| self.out.flush()) {
            warn!("Failed to write to console: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyboard_api::mock::MockKeyboard;
    use crate::keyboard_api::KeyboardInput;
    use crossbeam_channel::unbounded;
    use std::fs;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;
    use tempfile::tempdir;

    fn app_with(keyboard: &MockKeyboard) -> App<Vec<u8>> {
        let keyboard = keyboard.clone();
        App::new(
            AppConfig::default(),
            Arc::new(move || Box::new(keyboard.clone()) as Box<dyn KeyboardInput>),
            Vec::new(),
        )
    }

    fn command(line: &str) -> Message {
        Message::Command(console::parse_command(line).unwrap())
    }

    fn output(app: &App<Vec<u8>>) -> String {
        String::from_utf8_lossy(app.output()).into_owned()
    }

    #[test]
    fn test_editing_through_commands() {
        let mut app = app_with(&MockKeyboard::new());
        app.handle(command("add first"));
        app.handle(command("add second"));
        app.handle(command("edit 1 FIRST"));
        app.handle(command("move 2 1"));
        assert_eq!(app.store().messages(), ["second", "FIRST"]);

        app.handle(command("delete 1"));
        assert_eq!(app.store().messages(), ["FIRST"]);
    }

    #[test]
    fn test_warnings_leave_state_untouched() {
        let mut app = app_with(&MockKeyboard::new());
        app.handle(command("add only"));
        app.handle(command("delay 3"));
        let before = app.store().clone();

        assert_eq!(app.handle(command("delete 4")), Control::Continue);
        assert_eq!(app.handle(command("edit 0 x")), Control::Continue);
        assert_eq!(app.handle(command("delay soon")), Control::Continue);
        assert_eq!(app.handle(command("mode whisper")), Control::Continue);
        app.handle(Message::Rejected(CommandError::Unknown("jump".into())));

        assert_eq!(app.store(), &before);
        assert_eq!(output(&app).matches('⚠').count(), 5);
    }

    #[test]
    fn test_start_with_empty_list_warns() {
        let keyboard = MockKeyboard::new();
        let mut app = app_with(&keyboard);
        app.handle(command("start"));
        assert!(!app.player().is_running());
        assert!(output(&app).contains("No messages to type"));
    }

    #[test]
    fn test_failed_load_keeps_current_list() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "[1, 2").unwrap();

        let mut app = app_with(&MockKeyboard::new());
        app.handle(command("add keep me"));
        app.handle(Message::Command(Command::Load(path)));
        assert_eq!(app.store().messages(), ["keep me"]);
        assert!(output(&app).contains("Malformed playlist file"));
    }

    #[test]
    fn test_save_and_load_commands() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("list.json");

        let mut app = app_with(&MockKeyboard::new());
        app.handle(command("add hello"));
        app.handle(command("mode yell"));
        app.handle(command("repeat 2"));
        app.handle(Message::Command(Command::Save(path.clone())));

        let mut other = app_with(&MockKeyboard::new());
        other.handle(Message::Command(Command::Load(path)));
        assert_eq!(other.store(), app.store());
    }

    #[test]
    fn test_hotkey_toggle_starts_and_stops() {
        let keyboard = MockKeyboard::new();
        let mut app = app_with(&keyboard);
        app.handle(command("add gg"));
        app.handle(command("delay 60"));

        app.handle(Message::Toggle);
        assert!(app.player().is_running());
        assert!(output(&app).contains("[Stop]"));

        app.handle(Message::Toggle);
        assert!(!app.player().is_running());
        assert!(output(&app).contains("stopped"));
        assert!(output(&app).trim_end().ends_with("[Start]"));
        assert!(keyboard.get_actions().is_empty());
    }

    #[test]
    fn test_second_start_stops_without_restarting() {
        let keyboard = MockKeyboard::new();
        let mut app = app_with(&keyboard);
        app.handle(command("add hi"));
        app.handle(command("delay 60"));

        app.handle(command("start"));
        app.handle(command("start"));
        assert!(!app.player().is_running());
        assert_eq!(output(&app).matches("Typing stopped").count(), 1);
        assert!(keyboard.get_actions().is_empty());
    }

    #[test]
    fn test_run_reports_natural_completion() {
        let keyboard = MockKeyboard::new();
        let mut app = app_with(&keyboard);
        app.handle(command("add a"));
        app.handle(command("add b"));
        app.handle(command("delay 0"));
        app.handle(command("repeat 2"));

        let (tx, rx) = unbounded();
        tx.send(command("start")).unwrap();
        let sender = thread::spawn(move || {
            thread::sleep(Duration::from_millis(300));
            let _ = tx.send(Message::Quit);
        });
        app.run(&rx).unwrap();
        sender.join().unwrap();

        assert_eq!(keyboard.typed(), vec!["a", "b", "a", "b"]);
        assert!(output(&app).contains("Typing finished after 4 messages"));
        assert!(!app.player().is_running());
    }

    #[test]
    fn test_quit_stops_running_session() {
        let keyboard = MockKeyboard::new();
        let mut app = app_with(&keyboard);
        app.handle(command("add forever"));
        app.handle(command("delay 60"));

        let (tx, rx) = unbounded();
        tx.send(command("start")).unwrap();
        tx.send(Message::Quit).unwrap();
        app.run(&rx).unwrap();

        assert!(!app.player().is_running());
        assert!(keyboard.get_actions().is_empty());
        assert!(output(&app).contains("stopped"));
    }
}
