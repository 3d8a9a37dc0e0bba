//! Keyboard input abstraction and the `rdev`-backed implementation.
//! Playback only talks to [`KeyboardInput`], so tests can swap in a recorder.

use std::thread;
use std::time::Duration;

use rdev::{simulate, EventType, Key};
use tracing::warn;

use crate::errors::KeyboardError;
use crate::DEFAULT_KEY_DELAY_MS;

/// Trait for keyboard input operations
pub trait KeyboardInput: Send {
    /// Type `text` as if the user entered it.
    fn type_text(&mut self, text: &str) -> Result<(), KeyboardError>;

    /// Press and release Enter.
    fn press_enter(&mut self) -> Result<(), KeyboardError>;
}

/// Shifted symbol and the key it lives on (US layout).
const SYMBOL_PAIRS: [(char, char); 21] = [
    (':', ';'),
    ('<', ','),
    ('>', '.'),
    ('?', '/'),
    ('"', '\''),
    ('{', '['),
    ('}', ']'),
    ('|', '\\'),
    ('~', '`'),
    ('!', '1'),
    ('@', '2'),
    ('#', '3'),
    ('$', '4'),
    ('%', '5'),
    ('^', '6'),
    ('&', '7'),
    ('*', '8'),
    ('(', '9'),
    (')', '0'),
    ('_', '-'),
    ('+', '='),
];

/// Synthesizes key events through the OS with `rdev::simulate`.
pub struct RdevKeyboard {
    key_delay: Duration,
}

impl RdevKeyboard {
    pub fn new(key_delay_ms: u64) -> Self {
        Self {
            key_delay: Duration::from_millis(key_delay_ms),
        }
    }

    fn send(&self, event: EventType) -> Result<(), KeyboardError> {
        simulate(&event).map_err(|e| KeyboardError::Simulate {
            key: format!("{:?}", event),
            reason: format!("{:?}", e),
        })?;
        // Some platforms drop events that arrive back to back.
        thread::sleep(self.key_delay);
        Ok(())
    }

    fn tap(&self, key: Key, shift: bool) -> Result<(), KeyboardError> {
        if shift {
            self.send(EventType::KeyPress(Key::ShiftLeft))?;
        }
        let tapped = self
            .send(EventType::KeyPress(key))
            .and_then(|_| self.send(EventType::KeyRelease(key)));
        if shift {
            self.send(EventType::KeyRelease(Key::ShiftLeft))?;
        }
        tapped
    }
}

impl Default for RdevKeyboard {
    fn default() -> Self {
        Self::new(DEFAULT_KEY_DELAY_MS)
    }
}

impl KeyboardInput for RdevKeyboard {
    fn type_text(&mut self, text: &str) -> Result<(), KeyboardError> {
        for c in text.chars() {
            match key_for_char(c) {
                Some((key, shift)) => self.tap(key, shift)?,
                None => warn!("No key found for character: '{}'. Skipping.", c),
            }
        }
        Ok(())
    }

    fn press_enter(&mut self) -> Result<(), KeyboardError> {
        self.tap(Key::Return, false)
    }
}

/// Maps a character to its key on a US layout and whether Shift is needed.
pub fn key_for_char(c: char) -> Option<(Key, bool)> {
    if c.is_ascii_uppercase() {
        return letter_key(c.to_ascii_lowercase()).map(|key| (key, true));
    }
    if let Some(key) = letter_key(c) {
        return Some((key, false));
    }
    if let Some(&(_, base)) = SYMBOL_PAIRS.iter().find(|(shifted, _)| *shifted == c) {
        return unshifted_key(base).map(|key| (key, true));
    }
    unshifted_key(c).map(|key| (key, false))
}

fn letter_key(c: char) -> Option<Key> {
    let key = match c {
        'a' => Key::KeyA,
        'b' => Key::KeyB,
        'c' => Key::KeyC,
        'd' => Key::KeyD,
        'e' => Key::KeyE,
        'f' => Key::KeyF,
        'g' => Key::KeyG,
        'h' => Key::KeyH,
        'i' => Key::KeyI,
        'j' => Key::KeyJ,
        'k' => Key::KeyK,
        'l' => Key::KeyL,
        'm' => Key::KeyM,
        'n' => Key::KeyN,
        'o' => Key::KeyO,
        'p' => Key::KeyP,
        'q' => Key::KeyQ,
        'r' => Key::KeyR,
        's' => Key::KeyS,
        't' => Key::KeyT,
        'u' => Key::KeyU,
        'v' => Key::KeyV,
        'w' => Key::KeyW,
        'x' => Key::KeyX,
        'y' => Key::KeyY,
        'z' => Key::KeyZ,
        _ => return None,
    };
    Some(key)
}

fn unshifted_key(c: char) -> Option<Key> {
    let key = match c {
        '0' => Key::Num0,
        '1' => Key::Num1,
        '2' => Key::Num2,
        '3' => Key::Num3,
        '4' => Key::Num4,
        '5' => Key::Num5,
        '6' => Key::Num6,
        '7' => Key::Num7,
        '8' => Key::Num8,
        '9' => Key::Num9,
        ' ' => Key::Space,
        '\t' => Key::Tab,
        '-' => Key::Minus,
        '=' => Key::Equal,
        '[' => Key::LeftBracket,
        ']' => Key::RightBracket,
        ';' => Key::SemiColon,
        '\'' => Key::Quote,
        '\\' => Key::BackSlash,
        ',' => Key::Comma,
        '.' => Key::Dot,
        '/' => Key::Slash,
        '`' => Key::BackQuote,
        _ => return None,
    };
    Some(key)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letters_and_case() {
        assert_eq!(key_for_char('a'), Some((Key::KeyA, false)));
        assert_eq!(key_for_char('Z'), Some((Key::KeyZ, true)));
    }

    #[test]
    fn test_digits_and_symbols() {
        assert_eq!(key_for_char('7'), Some((Key::Num7, false)));
        assert_eq!(key_for_char('&'), Some((Key::Num7, true)));
        assert_eq!(key_for_char('/'), Some((Key::Slash, false)));
        assert_eq!(key_for_char(':'), Some((Key::SemiColon, true)));
        assert_eq!(key_for_char(' '), Some((Key::Space, false)));
    }

    #[test]
    fn test_every_chat_prefix_is_typeable() {
        for c in "::yell /".chars() {
            assert!(key_for_char(c).is_some(), "no key for {:?}", c);
        }
    }

    #[test]
    fn test_unmapped_characters() {
        assert_eq!(key_for_char('é'), None);
        assert_eq!(key_for_char('\n'), None);
    }
}
