//! The editable message list and its settings.

use std::collections::HashMap;
use std::time::Duration;

use tracing::{info, warn};

use crate::errors::StoreWarning;
use crate::mode::Mode;
use crate::persist::PersistedSnapshot;
use crate::playback::PlaybackSnapshot;
use crate::{DEFAULT_DELAY_SECS, FRESH_REPEAT_COUNT};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    /// Seconds to wait before each message.
    pub delay: u64,
    pub mode: Mode,
    /// Number of passes over the list; `0` repeats until stopped.
    pub repeat_count: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            delay: DEFAULT_DELAY_SECS,
            mode: Mode::Plain,
            repeat_count: FRESH_REPEAT_COUNT,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Store {
    messages: Vec<String>,
    settings: Settings,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn settings(&self) -> Settings {
        self.settings
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Appends `message`. Empty input is ignored and returns `false`.
    pub fn add(&mut self, message: &str) -> bool {
        if message.is_empty() {
            return false;
        }
        self.messages.push(message.to_string());
        info!("Message added: {}", message);
        true
    }

    /// Replaces the message at `selection`, returning the old text.
    pub fn edit(
        &mut self,
        selection: Option<usize>,
        new_message: &str,
    ) -> Result<String, StoreWarning> {
        let slot = selection
            .and_then(|index| self.messages.get_mut(index))
            .ok_or(StoreWarning::NoSelection)?;
        if new_message.is_empty() {
            return Err(StoreWarning::EmptyMessage);
        }
        let previous = std::mem::replace(slot, new_message.to_string());
        info!("Message edited from \"{}\" to \"{}\"", previous, new_message);
        Ok(previous)
    }

    /// Removes the message at `selection`, returning it.
    pub fn delete(&mut self, selection: Option<usize>) -> Result<String, StoreWarning> {
        match selection {
            Some(index) if index < self.messages.len() => {
                let removed = self.messages.remove(index);
                info!("Message deleted: {}", removed);
                Ok(removed)
            }
            _ => Err(StoreWarning::NoSelection),
        }
    }

    /// Replaces the list with `new_order`, which must hold exactly the
    /// current messages (duplicates included) in any order.
    pub fn reorder(&mut self, new_order: Vec<String>) -> Result<(), StoreWarning> {
        if !is_permutation(&self.messages, &new_order) {
            return Err(StoreWarning::NotAPermutation);
        }
        self.messages = new_order;
        info!("Message order updated.");
        Ok(())
    }

    /// Drag-and-drop equivalent: moves the message at `from` so it ends up at `to`.
    pub fn move_message(&mut self, from: Option<usize>, to: Option<usize>) -> Result<(), StoreWarning> {
        let len = self.messages.len();
        let (from, to) = match (from, to) {
            (Some(from), Some(to)) if from < len && to < len => (from, to),
            _ => return Err(StoreWarning::NoSelection),
        };
        let mut order = self.messages.clone();
        let moved = order.remove(from);
        order.insert(to, moved);
        self.reorder(order)
    }

    pub fn set_delay(&mut self, input: &str) -> Result<u64, StoreWarning> {
        let delay = parse_count("delay", input)?;
        self.settings.delay = delay;
        info!("Delay updated to: {}", delay);
        Ok(delay)
    }

    pub fn set_repeat_count(&mut self, input: &str) -> Result<u64, StoreWarning> {
        let repeat_count = parse_count("repeat count", input)?;
        self.settings.repeat_count = repeat_count;
        info!("Repeat Count updated to: {}", repeat_count);
        Ok(repeat_count)
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.settings.mode = mode;
        info!("Mode updated to: {}", mode);
    }

    pub fn to_persistable(&self) -> PersistedSnapshot {
        PersistedSnapshot {
            messages: self.messages.clone(),
            delay: self.settings.delay,
            mode: self.settings.mode,
            repeat_count: self.settings.repeat_count,
        }
    }

    pub fn from_persistable(record: PersistedSnapshot) -> Self {
        Self {
            messages: record.messages,
            settings: Settings {
                delay: record.delay,
                mode: record.mode,
                repeat_count: record.repeat_count,
            },
        }
    }

    /// Replaces the whole store with a loaded record.
    pub fn apply(&mut self, record: PersistedSnapshot) {
        *self = Self::from_persistable(record);
    }

    /// Copies the list and settings for a playback session.
    pub fn snapshot(&self) -> Result<PlaybackSnapshot, StoreWarning> {
        if self.messages.is_empty() {
            return Err(StoreWarning::EmptyPlaylist);
        }
        Ok(PlaybackSnapshot {
            messages: self.messages.clone(),
            delay: Duration::from_secs(self.settings.delay),
            mode: self.settings.mode,
            repeat_count: self.settings.repeat_count,
        })
    }
}

fn parse_count(field: &'static str, input: &str) -> Result<u64, StoreWarning> {
    input.trim().parse::<u64>().map_err(|_| {
        warn!("Invalid input for {}: '{}'. Please enter a number.", field, input);
        StoreWarning::InvalidNumber {
            field,
            input: input.to_string(),
        }
    })
}

fn is_permutation(current: &[String], candidate: &[String]) -> bool {
    if current.len() != candidate.len() {
        return false;
    }
    let mut counts: HashMap<&str, isize> = HashMap::new();
    for message in current {
        *counts.entry(message.as_str()).or_default() += 1;
    }
    for message in candidate {
        *counts.entry(message.as_str()).or_default() -= 1;
    }
    counts.values().all(|&count| count == 0)
}
