//! Core engine implementation

use crate::{
    application::{AppError, AppEvent, Application},
    core::config::{ConfigError, EngineConfig, SimulationConfig},
    foundation::time::Timer,
    scene::{ProxyBackend, ProxyRegistry, SceneError, SceneTick, SpaceScene},
};
use std::collections::VecDeque;
use thiserror::Error;

/// Main engine struct
///
/// The engine owns the scene and drives its tick loop from real or fixed
/// time steps.
pub struct Engine<B: ProxyBackend = ProxyRegistry> {
    /// Scene with world, origin, integrator and proxy backend
    pub scene: SpaceScene<B>,

    /// Frame timing
    timer: Timer,

    /// Engine configuration
    config: EngineConfig,

    /// Outcome of the most recent tick
    last_tick: SceneTick,

    /// Events waiting for the application
    events: VecDeque<AppEvent>,

    /// Whether the engine should continue running
    running: bool,
}

impl<B: ProxyBackend> Engine<B> {
    /// Create a new engine instance
    pub fn new(config: &SimulationConfig, backend: B) -> Result<Self, EngineError> {
        log::info!("Initializing engine...");

        let scene = SpaceScene::from_config(config, backend)?;

        Ok(Self {
            scene,
            timer: Timer::new(),
            config: config.engine.clone(),
            last_tick: SceneTick::default(),
            events: VecDeque::new(),
            running: true,
        })
    }

    /// Run the engine main loop with the given application
    pub fn run<T: Application<B>>(config: &SimulationConfig, backend: B, app: &mut T) -> Result<(), EngineError> {
        let mut engine = Self::new(config, backend)?;

        // Initialize application
        app.initialize(&mut engine)
            .map_err(|e| EngineError::ApplicationError(format!("App initialization: {e}")))?;

        log::info!("Starting main loop...");

        while engine.running {
            if engine.config.max_ticks.is_some_and(|max| engine.scene.tick_count() >= max) {
                log::info!("Tick limit reached");
                break;
            }

            let delta_time = engine.next_delta();

            // Update application
            app.update(&mut engine, delta_time)
                .map_err(|e| EngineError::ApplicationError(format!("App update: {e}")))?;

            // Dispatch queued events
            while let Some(event) = engine.events.pop_front() {
                app.handle_event(&mut engine, event)
                    .map_err(|e| EngineError::ApplicationError(format!("App event: {e}")))?;
            }
            if !engine.running {
                break;
            }

            // Advance the simulation
            let tick = engine.update(delta_time)?;

            app.on_tick(&mut engine, &tick)
                .map_err(|e| EngineError::ApplicationError(format!("App tick: {e}")))?;
        }

        // Cleanup
        app.cleanup(&mut engine);

        log::info!(
            "Engine shutdown complete after {} ticks ({:.1} simulated seconds)",
            engine.scene.tick_count(),
            engine.scene.sim_time()
        );
        Ok(())
    }

    /// Real seconds for the next tick
    fn next_delta(&mut self) -> f64 {
        self.timer.update();
        self.config.fixed_timestep.unwrap_or_else(|| self.timer.delta_time())
    }

    /// Advance the scene by `delta_time` real seconds
    pub fn update(&mut self, delta_time: f64) -> Result<SceneTick, EngineError> {
        let tick = self.scene.tick(delta_time)?;
        log::trace!(
            "Tick {}: {} bodies, KE {:e}, {} proxies placed",
            self.scene.tick_count(),
            tick.physics.bodies,
            tick.physics.kinetic_energy,
            tick.proxies.placed
        );
        self.last_tick = tick;
        Ok(tick)
    }

    /// Queue an event for the application.
    ///
    /// Queued events are handed to [`Application::handle_event`] after the
    /// application's update and before the tick.
    pub fn post_event(&mut self, event: AppEvent) {
        self.events.push_back(event);
    }

    /// Handle an application event
    pub fn handle_event(&mut self, event: AppEvent) -> Result<(), AppError> {
        match event {
            AppEvent::IncreaseTimeScale => {
                self.scene.origin_mut().increase_time_scale();
            }
            AppEvent::DecreaseTimeScale => {
                self.scene.origin_mut().decrease_time_scale();
            }
            AppEvent::TrackBody(name) => {
                let entity = match name {
                    Some(name) => Some(
                        self.scene
                            .find(&name)
                            .ok_or_else(|| AppError::Custom(format!("No body named '{name}'")))?,
                    ),
                    None => None,
                };
                self.scene.origin_mut().track(entity);
            }
            AppEvent::QuitRequested => {
                self.quit();
            }
        }

        Ok(())
    }

    /// Request engine shutdown
    pub fn quit(&mut self) {
        log::info!("Engine shutdown requested");
        self.running = false;
    }

    /// Whether the main loop is still running
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Get the scene
    pub fn scene(&self) -> &SpaceScene<B> {
        &self.scene
    }

    /// Get mutable access to the scene
    pub fn scene_mut(&mut self) -> &mut SpaceScene<B> {
        &mut self.scene
    }

    /// Outcome of the most recent tick
    pub fn last_tick(&self) -> &SceneTick {
        &self.last_tick
    }

    /// Get the engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Get the timer
    pub fn timer(&self) -> &Timer {
        &self.timer
    }
}

/// Engine errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// Scene error
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Application error
    #[error("Application error: {0}")]
    ApplicationError(String),
}
