// src/errors.rs
use std::path::PathBuf;
use thiserror::Error;

/// Problems with user input. These never abort anything; the previous
/// valid state is kept and the warning is shown to the user.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreWarning {
    #[error("No message selected. Please select a message first.")]
    NoSelection,

    #[error("Message text is empty")]
    EmptyMessage,

    #[error("Invalid input for {field}: '{input}'. Please enter a whole number of zero or more.")]
    InvalidNumber { field: &'static str, input: String },

    #[error("Unknown mode '{0}'. Expected one of: default, yell, team_chat")]
    UnknownMode(String),

    #[error("New order does not contain exactly the current messages")]
    NotAPermutation,

    #[error("No messages to type. Please add messages to the list.")]
    EmptyPlaylist,
}

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("Failed to read playlist file at {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },

    #[error("Failed to write playlist file at {path}: {source}")]
    Write { path: PathBuf, source: std::io::Error },

    #[error("Malformed playlist file at {path}: {source}")]
    Decode { path: PathBuf, source: serde_json::Error },

    #[error("Failed to encode playlist: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyboardError {
    #[error("Failed to simulate key {key}: {reason}")]
    Simulate { key: String, reason: String },

    #[error("Failed to listen for the hotkey: {0}")]
    Listen(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not find a configuration directory for this platform")]
    ConfigDirNotFound,
    #[error("Failed to create configuration directory: {source}")]
    CreateConfigDir { source: std::io::Error },
    #[error("Failed to write default configuration: {source}")]
    WriteDefaultConfig { source: std::io::Error },
    #[error("Failed to read config file at {path}: {source}")]
    ReadConfig { path: PathBuf, source: std::io::Error },
    #[error("Failed to parse config file at {path}: {source}")]
    Parse { path: PathBuf, source: serde_json::Error },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command '{0}'. Type 'help' for the list of commands.")]
    Unknown(String),
    #[error("'{command}' needs {argument}")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },
    #[error("'{0}' is not a valid message number")]
    InvalidIndex(String),
}

#[derive(Debug, Error)]
pub enum AutoTyperError {
    #[error(transparent)]
    Store(#[from] StoreWarning),
    #[error(transparent)]
    Persist(#[from] PersistError),
    #[error(transparent)]
    Keyboard(#[from] KeyboardError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Command(#[from] CommandError),
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

// Global Result type alias
pub type Result<T> = std::result::Result<T, AutoTyperError>;
