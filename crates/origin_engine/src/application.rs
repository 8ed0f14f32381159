//! Application trait and lifecycle management

use crate::engine::{Engine, EngineError};
use crate::scene::{ProxyBackend, ProxyRegistry, SceneError, SceneTick};
use thiserror::Error;

/// Application lifecycle trait
///
/// Implement this trait to drive a simulation with the engine.
pub trait Application<B: ProxyBackend = ProxyRegistry> {
    /// Initialize the application
    ///
    /// Called once after the scene is built. Use this to look up bodies,
    /// pick the tracked body and adjust the time scale.
    fn initialize(&mut self, engine: &mut Engine<B>) -> Result<(), AppError>;

    /// Update the application
    ///
    /// Called before every tick.
    ///
    /// # Arguments
    /// * `engine` - Mutable reference to the engine
    /// * `delta_time` - Real seconds the coming tick covers
    fn update(&mut self, engine: &mut Engine<B>, delta_time: f64) -> Result<(), AppError>;

    /// Observe the outcome of a tick
    fn on_tick(&mut self, engine: &mut Engine<B>, tick: &SceneTick) -> Result<(), AppError> {
        let _ = (engine, tick);
        Ok(())
    }

    /// Handle an event queued with [`Engine::post_event`]
    fn handle_event(&mut self, engine: &mut Engine<B>, event: AppEvent) -> Result<(), AppError> {
        // Default implementation forwards to engine
        engine.handle_event(event)
    }

    /// Cleanup the application
    ///
    /// Called once when the loop ends.
    fn cleanup(&mut self, engine: &mut Engine<B>);
}

/// Application-level errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Engine error propagated to application level
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// Scene error propagated to application level
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    /// Custom application error
    #[error("Application error: {0}")]
    Custom(String),
}

/// Application events
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// Speed simulated time up by one step
    IncreaseTimeScale,

    /// Slow simulated time down by one step
    DecreaseTimeScale,

    /// Follow the named body with the origin, or stop following
    TrackBody(Option<String>),

    /// Stop the main loop
    QuitRequested,
}
