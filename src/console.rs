//! Line-based console: command parsing and the text shown to the user.

use std::io::{self, BufRead};
use std::path::PathBuf;
use std::thread::{self, JoinHandle};

use crossbeam_channel::Sender;
use rdev::Key;
use tracing::{debug, warn};

use crate::app::Message;
use crate::errors::CommandError;
use crate::playback::ButtonState;
use crate::store::Store;

pub const BANNER: &str = r#"
   __ _ _  _| |_ ___ | |_ _  _ _ __  ___ _ _
  / _` | || |  _/ _ \|  _| || | '_ \/ -_) '_|
  \__,_|\_,_|\__\___/ \__|\_, | .__/\___|_|
                          |__/|_|
"#;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add(String),
    /// `selection` is `None` when the user picked entry 0.
    Edit { selection: Option<usize>, text: String },
    Delete(Option<usize>),
    Move { from: Option<usize>, to: Option<usize> },
    List,
    Delay(String),
    Repeat(String),
    Mode(String),
    Save(PathBuf),
    Load(PathBuf),
    Start,
    Stop,
    Toggle,
    Status,
    Help,
    About,
    Quit,
    Empty,
}

/// Parses one console line. Message numbers are 1-based as shown by `list`.
pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(Command::Empty);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim_start()),
        None => (line, ""),
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "add" | "a" => Command::Add(required(rest, "add", "a message")?.to_string()),
        "edit" | "e" => {
            let (index, text) = match rest.split_once(char::is_whitespace) {
                Some((index, text)) => (index, text.trim_start()),
                None => (rest, ""),
            };
            Command::Edit {
                selection: parse_selection(required(index, "edit", "a message number")?)?,
                text: required(text, "edit", "the new message text")?.to_string(),
            }
        }
        "delete" | "del" | "rm" => {
            Command::Delete(parse_selection(required(rest, "delete", "a message number")?)?)
        }
        "move" | "mv" => {
            let mut parts = rest.split_whitespace();
            let from = parts.next().ok_or(CommandError::MissingArgument {
                command: "move",
                argument: "a message number to move",
            })?;
            let to = parts.next().ok_or(CommandError::MissingArgument {
                command: "move",
                argument: "a target position",
            })?;
            Command::Move {
                from: parse_selection(from)?,
                to: parse_selection(to)?,
            }
        }
        "list" | "ls" => Command::List,
        "delay" | "rate" => Command::Delay(required(rest, "delay", "a number of seconds")?.to_string()),
        "repeat" => Command::Repeat(required(rest, "repeat", "a repeat count")?.to_string()),
        "mode" => Command::Mode(required(rest, "mode", "default, yell or team_chat")?.to_string()),
        "save" => Command::Save(PathBuf::from(required(rest, "save", "a file path")?)),
        "load" | "open" => Command::Load(PathBuf::from(required(rest, "load", "a file path")?)),
        "start" => Command::Start,
        "stop" => Command::Stop,
        "toggle" => Command::Toggle,
        "status" => Command::Status,
        "help" | "?" => Command::Help,
        "about" => Command::About,
        "quit" | "exit" | "q" => Command::Quit,
        _ => return Err(CommandError::Unknown(word.to_string())),
    };
    Ok(command)
}

fn required<'a>(
    value: &'a str,
    command: &'static str,
    argument: &'static str,
) -> Result<&'a str, CommandError> {
    if value.is_empty() {
        Err(CommandError::MissingArgument { command, argument })
    } else {
        Ok(value)
    }
}

fn parse_selection(raw: &str) -> Result<Option<usize>, CommandError> {
    raw.parse::<usize>()
        .map(|n| n.checked_sub(1))
        .map_err(|_| CommandError::InvalidIndex(raw.to_string()))
}

/// Reads stdin on a background thread. End of input counts as quit.
pub fn spawn_reader(sender: Sender<Message>) -> JoinHandle<()> {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    warn!("Failed to read from stdin: {}", e);
                    break;
                }
            };
            debug!("console input: {}", line);
            let message = match parse_command(&line) {
                Ok(command) => Message::Command(command),
                Err(e) => Message::Rejected(e),
            };
            if sender.send(message).is_err() {
                return;
            }
        }
        let _ = sender.send(Message::Quit);
    })
}

pub fn render_list(store: &Store) -> String {
    if store.is_empty() {
        return "│ (no messages, use 'add <text>')".to_string();
    }
    store
        .messages()
        .iter()
        .enumerate()
        .map(|(i, message)| format!("│ {:>3}. {}", i + 1, message))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_status(store: &Store, button: ButtonState, hotkey: Key) -> String {
    let settings = store.settings();
    let repeat = if settings.repeat_count == 0 {
        "0 (until stopped)".to_string()
    } else {
        settings.repeat_count.to_string()
    };
    format!(
        "│ messages: {}\n│ message rate (seconds): {}\n│ repeat count: {}\n│ mode: {}\n│ hotkey: {:?}\n│ [{}]",
        store.len(),
        settings.delay,
        repeat,
        settings.mode,
        hotkey,
        button
    )
}

pub fn render_help(hotkey: Key) -> String {
    format!(
        "\x1b[33;1m┌─\x1b[47m HOW TO USE \x1b[0m
\x1b[33;1m│\x1b[36;1m add <text> \x1b[90m- Append a message\x1b[0m
\x1b[33;1m│\x1b[36;1m edit <n> <text> \x1b[90m- Replace message n\x1b[0m
\x1b[33;1m│\x1b[36;1m delete <n> \x1b[90m- Remove message n\x1b[0m
\x1b[33;1m│\x1b[36;1m move <n> <m> \x1b[90m- Move message n to position m\x1b[0m
\x1b[33;1m│\x1b[36;1m list \x1b[90m- Show the messages\x1b[0m
\x1b[33;1m│\x1b[36;1m delay <seconds> \x1b[90m- Wait before each message\x1b[0m
\x1b[33;1m│\x1b[36;1m repeat <count> \x1b[90m- Passes over the list, 0 repeats forever\x1b[0m
\x1b[33;1m│\x1b[36;1m mode <default|yell|team_chat> \x1b[90m- Prefix for every message\x1b[0m
\x1b[33;1m│\x1b[36;1m save <file> / load <file> \x1b[90m- Store or restore the list and settings\x1b[0m
\x1b[33;1m│\x1b[36;1m start / stop / toggle \x1b[90m- Control typing ({:?} toggles from any window)\x1b[0m
\x1b[33;1m│\x1b[36;1m status / about / quit\x1b[0m
\x1b[33;1m└─\x1b[0m",
        hotkey
    )
}

pub fn render_about(hotkey: Key) -> String {
    format!(
        "│ Types your messages into the focused window, one after another.
│ Features:
│  - Add, edit, delete and reorder messages
│  - Set the delay between messages
│  - Modes: default, yell (::yell prefix), team chat (/ prefix)
│  - Save and load message lists
│  - Repeat count 0 loops until stopped
│ Hotkey: {:?} starts and stops typing",
        hotkey
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_add_keeps_inner_spacing() {
        assert_eq!(
            parse_command("add  buying  gf 10m").unwrap(),
            Command::Add("buying  gf 10m".to_string())
        );
        assert!(matches!(
            parse_command("add"),
            Err(CommandError::MissingArgument { command: "add", .. })
        ));
    }

    #[test]
    fn test_parse_indices_are_one_based() {
        assert_eq!(
            parse_command("edit 2 new text").unwrap(),
            Command::Edit {
                selection: Some(1),
                text: "new text".to_string()
            }
        );
        assert_eq!(parse_command("delete 1").unwrap(), Command::Delete(Some(0)));
        assert_eq!(parse_command("delete 0").unwrap(), Command::Delete(None));
        assert_eq!(
            parse_command("move 3 1").unwrap(),
            Command::Move {
                from: Some(2),
                to: Some(0)
            }
        );
        assert_eq!(
            parse_command("delete two"),
            Err(CommandError::InvalidIndex("two".to_string()))
        );
        assert!(parse_command("edit 2").is_err());
        assert!(parse_command("move 2").is_err());
    }

    #[test]
    fn test_numeric_settings_stay_raw() {
        assert_eq!(
            parse_command("delay abc").unwrap(),
            Command::Delay("abc".to_string())
        );
        assert_eq!(
            parse_command("repeat 0").unwrap(),
            Command::Repeat("0".to_string())
        );
    }

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(parse_command("  ").unwrap(), Command::Empty);
        assert_eq!(parse_command("START").unwrap(), Command::Start);
        assert_eq!(parse_command("toggle").unwrap(), Command::Toggle);
        assert_eq!(
            parse_command("save my list.json").unwrap(),
            Command::Save(PathBuf::from("my list.json"))
        );
        assert_eq!(
            parse_command("dance"),
            Err(CommandError::Unknown("dance".to_string()))
        );
    }

    #[test]
    fn test_render_list_is_numbered() {
        let mut store = Store::new();
        store.add("one");
        store.add("two");
        let listing = render_list(&store);
        assert!(listing.contains("1. one"));
        assert!(listing.contains("2. two"));
    }

    #[test]
    fn test_render_status_shows_button() {
        let store = Store::new();
        let status = render_status(&store, ButtonState::Start, Key::F12);
        assert!(status.contains("[Start]"));
        assert!(status.contains("until stopped"));
        assert!(status.contains("F12"));
    }
}
