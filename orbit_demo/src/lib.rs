//! Shared pieces of the headless demo drivers

pub mod belt;
pub mod observer;

use origin_engine::prelude::{ConfigError, EngineError};
use thiserror::Error;

pub use observer::ReportingObserver;

/// Demo driver errors
#[derive(Error, Debug)]
pub enum DemoError {
    /// Scene file could not be loaded
    #[error("Failed to load scene: {0}")]
    Config(#[from] ConfigError),

    /// Engine loop failed
    #[error("Engine failed: {0}")]
    Engine(#[from] EngineError),

    /// Bad command line
    #[error("Usage: {0}")]
    Usage(String),
}
