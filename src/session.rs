use std::collections::VecDeque;
use std::time::Duration;

use crate::error::EngineError;
use crate::stimulus::Stimulus;

pub const MIN_LEVEL: usize = 1;
pub const MAX_LEVEL: usize = 9;
/// Stimuli retained in the history, newest first
pub const HISTORY_WINDOW: usize = 10;

pub const DEFAULT_LEVEL: usize = 1;
pub const DEFAULT_MAX_TICKS: u32 = 30;
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub level: usize,
    pub max_ticks: u32,
    pub tick_interval: Duration,
}

impl SessionConfig {
    pub fn new(level: usize, max_ticks: u32, tick_interval: Duration) -> Result<Self, EngineError> {
        let cfg = Self {
            level,
            max_ticks,
            tick_interval,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        check_level(self.level)?;
        if self.max_ticks == 0 {
            return Err(EngineError::InvalidConfig(
                "max_ticks must be greater than zero".to_string(),
            ));
        }
        if self.tick_interval.is_zero() {
            return Err(EngineError::InvalidConfig(
                "tick interval must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LEVEL,
            max_ticks: DEFAULT_MAX_TICKS,
            tick_interval: Duration::from_millis(DEFAULT_TICK_INTERVAL_MS),
        }
    }
}

pub fn check_level(level: usize) -> Result<usize, EngineError> {
    if (MIN_LEVEL..=MAX_LEVEL).contains(&level) {
        Ok(level)
    } else {
        Err(EngineError::InvalidLevel(level))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Phase {
    Idle,
    Running,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum_macros::Display)]
pub enum Feedback {
    #[default]
    None,
    Correct,
    Wrong,
}

/// Mutable state of one run
#[derive(Debug, Clone)]
pub struct SessionState {
    pub phase: Phase,
    history: VecDeque<Stimulus>,
    pub tick: u32,
    pub score: i32,
    pub feedback: Feedback,
}

impl SessionState {
    /// Idle state holding a single placeholder stimulus
    pub fn seeded(seed: Stimulus) -> Self {
        Self {
            phase: Phase::Idle,
            history: VecDeque::from([seed]),
            tick: 0,
            score: 0,
            feedback: Feedback::None,
        }
    }

    pub fn history(&self) -> &VecDeque<Stimulus> {
        &self.history
    }

    pub fn push(&mut self, s: Stimulus) {
        self.history.push_front(s);
        self.history.truncate(HISTORY_WINDOW);
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// The n-back match: newest stimulus equals the one `level` positions back.
    /// A history too short to reach back that far never matches.
    pub fn matches_back(&self, level: usize) -> bool {
        match (self.history.front(), self.history.get(level)) {
            (Some(newest), Some(back)) => newest == back,
            _ => false,
        }
    }
}
