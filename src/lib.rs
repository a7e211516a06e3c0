// Library surface for the binary, headless integration tests and reuse.
pub mod app;
pub mod app_dirs;
pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod runtime;
pub mod session;
pub mod stimulus;
pub mod ui;

pub use app::{App, Control};
pub use engine::Engine;
pub use error::EngineError;
