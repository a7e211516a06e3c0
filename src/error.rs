use crate::session::{Phase, MAX_LEVEL, MIN_LEVEL};

/// Errors surfaced synchronously by the session engine.
///
/// A failed operation never leaves the session partially updated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("level {0} is out of range ({min}..={max})", min = MIN_LEVEL, max = MAX_LEVEL)]
    InvalidLevel(usize),
    #[error("guesses are only accepted while running (session is {0})")]
    NotRunning(Phase),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
