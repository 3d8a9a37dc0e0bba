//! System-wide start/stop key.

use std::thread::{self, JoinHandle};

use crossbeam_channel::Sender;
use rdev::{listen, Event, EventType, Key};
use tracing::{debug, error, info};

use crate::app::Message;
use crate::errors::KeyboardError;

pub fn is_trigger(event_type: &EventType, hotkey: Key) -> bool {
    matches!(event_type, EventType::KeyPress(key) if *key == hotkey)
}

/// Listens for `hotkey` on a background thread and sends a toggle for each press.
pub fn spawn_listener(hotkey: Key, sender: Sender<Message>) -> JoinHandle<()> {
    thread::spawn(move || {
        info!("{:?} hotkey registered", hotkey);
        let callback = move |event: Event| {
            if is_trigger(&event.event_type, hotkey) {
                debug!("Hotkey {:?} pressed", hotkey);
                let _ = sender.send(Message::Toggle);
            }
        };
        if let Err(e) = listen(callback) {
            let error = KeyboardError::Listen(format!("{:?}", e));
            error!("{}. Use the 'toggle' command instead.", error);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_presses_of_the_hotkey_trigger() {
        assert!(is_trigger(&EventType::KeyPress(Key::F12), Key::F12));
        assert!(!is_trigger(&EventType::KeyRelease(Key::F12), Key::F12));
        assert!(!is_trigger(&EventType::KeyPress(Key::F11), Key::F12));
        assert!(!is_trigger(&EventType::KeyPress(Key::Return), Key::F12));
    }
}
