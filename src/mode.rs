use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::StoreWarning;

/// Prefix transform applied to every outgoing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Mode {
    #[default]
    #[serde(rename = "default")]
    Plain,
    #[serde(rename = "yell")]
    Yell,
    #[serde(rename = "team_chat")]
    TeamChat,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Plain, Mode::Yell, Mode::TeamChat];

    pub fn prefix(self) -> &'static str {
        match self {
            Mode::Plain => "",
            Mode::Yell => "::yell ",
            Mode::TeamChat => "/",
        }
    }

    /// Formats `message` for typing. The stored text is never changed.
    pub fn apply(self, message: &str) -> String {
        let prefix = self.prefix();
        let mut out = String::with_capacity(prefix.len() + message.len());
        out.push_str(prefix);
        out.push_str(message);
        out
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Plain => "default",
            Mode::Yell => "yell",
            Mode::TeamChat => "team_chat",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = StoreWarning;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "default" | "plain" => Ok(Mode::Plain),
            "yell" => Ok(Mode::Yell),
            "team_chat" | "team-chat" | "teamchat" => Ok(Mode::TeamChat),
            _ => Err(StoreWarning::UnknownMode(s.trim().to_string())),
        }
    }
}
