//! Autotyper - repeating chat message typer
//!
//! Keeps an ordered list of chat lines and types them into the focused
//! window on a timer, with an optional mode prefix, until the requested
//! number of passes is done or the user presses the hotkey again.

pub mod app;
pub mod config;
pub mod console;
pub mod errors;
pub mod hotkey;
pub mod keyboard_api;
pub mod mode;
pub mod persist;
pub mod playback;
pub mod store;

pub use app::{App, Control, Message};
pub use config::AppConfig;
pub use errors::{
    AutoTyperError, CommandError, ConfigError, KeyboardError, PersistError, Result, StoreWarning,
};
pub use keyboard_api::{KeyboardInput, RdevKeyboard};
pub use mode::Mode;
pub use persist::PersistedSnapshot;
pub use playback::{
    ButtonState, CancelToken, KeyboardFactory, Outcome, PlaybackSnapshot, Player, SessionReport,
    Transition,
};
pub use store::{Settings, Store};

// Constants
pub const APP_NAME: &str = "autotyper";
pub const CONFIG_FILE_NAME: &str = "config.json";
pub const DEFAULT_DELAY_SECS: u64 = 5;
/// Repeat count of a fresh session: loop until stopped.
pub const FRESH_REPEAT_COUNT: u64 = 0;
/// Repeat count used when a loaded playlist file does not say.
pub const LOADED_REPEAT_COUNT: u64 = 1;
pub const DEFAULT_KEY_DELAY_MS: u64 = 10;
