//! The typing loop and the player that owns at most one running session.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use chrono::{DateTime, Local};
use crossbeam_channel::{bounded, never, Receiver, RecvTimeoutError, Sender};
use tracing::{debug, error, info, warn};

use crate::errors::{KeyboardError, StoreWarning};
use crate::keyboard_api::KeyboardInput;
use crate::mode::Mode;
use crate::store::Store;

/// Immutable copy of the list and settings a session plays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackSnapshot {
    pub messages: Vec<String>,
    pub delay: Duration,
    pub mode: Mode,
    /// `0` repeats until cancelled.
    pub repeat_count: u64,
}

/// Cooperative cancellation shared between the player and its session.
#[derive(Clone)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
    wake_tx: Sender<()>,
    wake_rx: Receiver<()>,
}

impl CancelToken {
    pub fn new() -> Self {
        let (wake_tx, wake_rx) = bounded(1);
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            wake_tx,
            wake_rx,
        }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        // Full means a wake-up is already pending.
        let _ = self.wake_tx.try_send(());
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Blocks for `timeout` or until cancelled. Returns `true` if cancelled.
    pub fn wait(&self, timeout: Duration) -> bool {
        if self.is_cancelled() {
            return true;
        }
        match self.wake_rx.recv_timeout(timeout) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => true,
            Err(RecvTimeoutError::Timeout) => self.is_cancelled(),
        }
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Every requested pass was typed.
    Completed,
    Cancelled,
    /// Keystroke injection failed; the session ended there.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReport {
    pub outcome: Outcome,
    pub messages_typed: u64,
    /// Full passes over the list.
    pub passes: u64,
}

impl fmt::Display for SessionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let what = match &self.outcome {
            Outcome::Completed => "finished".to_string(),
            Outcome::Cancelled => "stopped".to_string(),
            Outcome::Failed(reason) => format!("failed ({})", reason),
        };
        write!(
            f,
            "Typing {} after {} messages ({} full passes)",
            what, self.messages_typed, self.passes
        )
    }
}

/// Plays `snapshot` until every pass is typed or `token` is cancelled.
///
/// The wait before each message comes first, so the user has `delay`
/// seconds to focus the game window before the first line goes out.
/// Cancellation is checked before the wait, during it, and right before
/// the keystrokes; an injection already in progress is never interrupted.
pub fn run_session<K>(snapshot: &PlaybackSnapshot, token: &CancelToken, keyboard: &mut K) -> SessionReport
where
    K: KeyboardInput + ?Sized,
{
    let mut report = SessionReport {
        outcome: Outcome::Completed,
        messages_typed: 0,
        passes: 0,
    };

    while snapshot.repeat_count == 0 || report.passes < snapshot.repeat_count {
        for message in &snapshot.messages {
            if token.is_cancelled() {
                report.outcome = Outcome::Cancelled;
                return report;
            }
            let formatted = snapshot.mode.apply(message);
            if token.wait(snapshot.delay) {
                report.outcome = Outcome::Cancelled;
                return report;
            }
            if let Err(e) = type_line(keyboard, &formatted) {
                error!("Failed to type message '{}': {}", formatted, e);
                report.outcome = Outcome::Failed(e.to_string());
                return report;
            }
            report.messages_typed += 1;
            debug!("Typed message: {}", formatted);
        }
        report.passes += 1;
    }

    report
}

fn type_line<K>(keyboard: &mut K, line: &str) -> Result<(), KeyboardError>
where
    K: KeyboardInput + ?Sized,
{
    keyboard.type_text(line)?;
    keyboard.press_enter()
}

/// Builds the keyboard each new session types with.
pub type KeyboardFactory = Arc<dyn Fn() -> Box<dyn KeyboardInput> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonState {
    Start,
    Stop,
}

impl fmt::Display for ButtonState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ButtonState::Start => f.write_str("Start"),
            ButtonState::Stop => f.write_str("Stop"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Started,
    /// A running session was stopped instead; nothing new was started.
    Stopped(SessionReport),
}

struct ActiveSession {
    token: CancelToken,
    handle: JoinHandle<()>,
    done_rx: Receiver<SessionReport>,
    started_at: DateTime<Local>,
}

pub struct Player {
    keyboard_factory: KeyboardFactory,
    session: Option<ActiveSession>,
}

impl Player {
    pub fn new(keyboard_factory: KeyboardFactory) -> Self {
        Self {
            keyboard_factory,
            session: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.session.is_some()
    }

    pub fn button_label(&self) -> ButtonState {
        if self.is_running() {
            ButtonState::Stop
        } else {
            ButtonState::Start
        }
    }

    pub fn started_at(&self) -> Option<DateTime<Local>> {
        self.session.as_ref().map(|session| session.started_at)
    }

    /// Starts `snapshot` when idle. When a session is already running it
    /// is stopped instead and the caller has to start again.
    pub fn start(&mut self, snapshot: PlaybackSnapshot) -> Transition {
        if let Some(report) = self.stop() {
            return Transition::Stopped(report);
        }

        info!(
            "Starting typing process: {} messages, {}s delay, mode {}, repeat {}",
            snapshot.messages.len(),
            snapshot.delay.as_secs(),
            snapshot.mode,
            snapshot.repeat_count
        );

        let token = CancelToken::new();
        let (done_tx, done_rx) = bounded(1);
        let factory = Arc::clone(&self.keyboard_factory);
        let session_token = token.clone();
        let handle = thread::spawn(move || {
            let mut keyboard = factory();
            let report = run_session(&snapshot, &session_token, keyboard.as_mut());
            info!("{}", report);
            let _ = done_tx.send(report);
        });

        self.session = Some(ActiveSession {
            token,
            handle,
            done_rx,
            started_at: Local::now(),
        });
        Transition::Started
    }

    /// Cancels the running session and waits for its thread to exit.
    pub fn stop(&mut self) -> Option<SessionReport> {
        let session = self.session.take()?;
        info!("Stopping typing process");
        session.token.cancel();
        Some(Self::join(session, None))
    }

    /// Stops when running, otherwise starts a session from `store`.
    pub fn toggle(&mut self, store: &Store) -> Result<Transition, StoreWarning> {
        if let Some(report) = self.stop() {
            return Ok(Transition::Stopped(report));
        }
        let snapshot = store.snapshot()?;
        Ok(self.start(snapshot))
    }

    /// Fires once when the running session ends on its own. Never fires when idle.
    pub fn completion(&self) -> Receiver<SessionReport> {
        match &self.session {
            Some(session) => session.done_rx.clone(),
            None => never(),
        }
    }

    /// Joins a session whose report came through [`Player::completion`].
    pub fn reap(&mut self, report: Option<SessionReport>) -> Option<SessionReport> {
        let session = self.session.take()?;
        Some(Self::join(session, report))
    }

    fn join(session: ActiveSession, received: Option<SessionReport>) -> SessionReport {
        if session.handle.join().is_err() {
            error!("Typing thread panicked");
        }
        received
            .or_else(|| session.done_rx.try_recv().ok())
            .unwrap_or_else(|| {
                warn!("Typing thread ended without a report");
                SessionReport {
                    outcome: Outcome::Failed("typing thread panicked".into()),
                    messages_typed: 0,
                    passes: 0,
                }
            })
    }
}

impl Drop for Player {
    fn drop(&mut self) {
        self.stop();
    }
}
