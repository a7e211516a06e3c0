use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{debug, warn};

use crate::engine::Engine;
use crate::session::{Phase, MAX_LEVEL, MIN_LEVEL};

/// What the event loop should do after handling an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

/// Owns the engine. Every mutation of session state goes through here, one
/// event at a time.
#[derive(Debug)]
pub struct App {
    pub engine: Engine,
    /// Last rejected action, shown under the score
    pub status: Option<String>,
}

impl App {
    pub fn new(engine: Engine) -> Self {
        Self {
            engine,
            status: None,
        }
    }

    /// Start when idle, guess otherwise
    pub fn activate(&mut self, now: Instant) {
        if self.engine.phase() == Phase::Idle {
            self.engine.start_at(now);
            return;
        }
        match self.engine.submit_guess() {
            Ok(feedback) => debug!(%feedback, "guess submitted"),
            Err(err) => {
                warn!(%err, "guess rejected");
                self.status = Some(err.to_string());
            }
        }
    }

    pub fn set_level(&mut self, level: usize) {
        if let Err(err) = self.engine.set_level(level) {
            warn!(%err, "level change rejected");
            self.status = Some(err.to_string());
        }
    }

    pub fn step_level(&mut self, up: bool) {
        let level = self.engine.level();
        let next = if up {
            (level + 1).min(MAX_LEVEL)
        } else {
            level.saturating_sub(1).max(MIN_LEVEL)
        };
        self.set_level(next);
    }

    pub fn on_key(&mut self, key: KeyEvent, now: Instant) -> Control {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Control::Quit;
        }

        self.status = None;
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => return Control::Quit,
            KeyCode::Char(' ') | KeyCode::Enter => self.activate(now),
            KeyCode::Char(c @ '1'..='9') => {
                if let Some(d) = c.to_digit(10) {
                    self.set_level(d as usize);
                }
            }
            KeyCode::Up | KeyCode::Right | KeyCode::Char('+') => self.step_level(true),
            KeyCode::Down | KeyCode::Left | KeyCode::Char('-') => self.step_level(false),
            KeyCode::Char('r') => self.engine.restart(),
            _ => {}
        }
        Control::Continue
    }

    /// Drive the stimulus timer. Returns whether anything visible changed.
    pub fn on_tick(&mut self, now: Instant) -> bool {
        self.engine.advance(now)
    }
}
