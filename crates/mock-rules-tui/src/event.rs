//! Terminal input and the refresh tick merged into one stream

use crossterm::event::{self, Event as TermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::thread;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{interval, Interval, MissedTickBehavior};
use tracing::debug;

const INPUT_POLL: Duration = Duration::from_millis(50);

/// Events delivered to the main loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Key(KeyEvent),
    /// Text delivered through bracketed paste
    Paste(String),
    /// Periodic tick; drives deferred focus and status expiry
    Tick,
    Resize(u16, u16),
}

/// Reads the terminal on a dedicated thread and interleaves its events with
/// a fixed-rate tick
pub struct EventHandler {
    input: mpsc::UnboundedReceiver<Event>,
    tick: Interval,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, input) = mpsc::unbounded_channel();
        thread::spawn(move || read_terminal(tx));

        let mut tick = interval(tick_rate);
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Self { input, tick }
    }

    /// Wait for the next input event or tick, whichever comes first.
    ///
    /// Returns `None` once the input thread has stopped.
    pub async fn next(&mut self) -> Option<Event> {
        tokio::select! {
            event = self.input.recv() => event,
            _ = self.tick.tick() => Some(Event::Tick),
        }
    }
}

fn read_terminal(tx: mpsc::UnboundedSender<Event>) {
    while !tx.is_closed() {
        match event::poll(INPUT_POLL) {
            Ok(false) => continue,
            Ok(true) => {}
            Err(e) => {
                debug!(error = %e, "terminal poll failed");
                break;
            }
        }
        let event = match event::read() {
            // Release and repeat events arrive on some platforms
            Ok(TermEvent::Key(key)) if key.kind == KeyEventKind::Press => Event::Key(key),
            Ok(TermEvent::Paste(text)) => Event::Paste(text),
            Ok(TermEvent::Resize(w, h)) => Event::Resize(w, h),
            Ok(_) => continue,
            Err(e) => {
                debug!(error = %e, "terminal read failed");
                break;
            }
        };
        if tx.send(event).is_err() {
            break;
        }
    }
}

/// True when `key` is Ctrl plus `c`, ignoring case
pub fn ctrl_key(key: &KeyEvent, c: char) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char(ch) if ch.eq_ignore_ascii_case(&c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ctrl_key_ignores_case() {
        let upper = KeyEvent::new(KeyCode::Char('C'), KeyModifiers::CONTROL);
        let lower = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        let plain = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE);

        assert!(ctrl_key(&upper, 'c'));
        assert!(ctrl_key(&lower, 'c'));
        assert!(!ctrl_key(&plain, 'c'));
        assert!(!ctrl_key(&lower, 'v'));
    }
}
