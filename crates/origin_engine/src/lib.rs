//! # Origin Engine
//!
//! Double-precision spatial core for space scenes: parent-relative
//! transforms, a floating origin with a logarithmic scale ladder that
//! decides which visual proxies exist at which scale, and a brute-force
//! N-body gravity integrator.
//!
//! ## Features
//!
//! - **Double-Precision Math**: `DVec3` / `DQuat` with nalgebra interop
//! - **Hierarchical Transforms**: world pose composed on demand
//! - **Scale Ladder**: per-level clip bands and proxy placement
//! - **N-Body Gravity**: semi-implicit Euler over all active bodies
//! - **Configurable**: TOML / RON scene and engine configuration
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use origin_engine::prelude::*;
//!
//! struct Observer;
//!
//! impl Application for Observer {
//!     fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError> {
//!         engine.handle_event(AppEvent::TrackBody(Some("earth".into())))
//!     }
//!
//!     fn update(&mut self, _engine: &mut Engine, _delta_time: f64) -> Result<(), AppError> {
//!         Ok(())
//!     }
//!
//!     fn cleanup(&mut self, engine: &mut Engine) {
//!         if let Some(earth) = engine.scene().find("earth") {
//!             if let Ok(report) = engine.scene().body_report(earth, None) {
//!                 log::info!("{report}");
//!             }
//!         }
//!     }
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut config = SimulationConfig::solar_system();
//!     config.engine = EngineConfig::new().with_max_ticks(1000).with_fixed_timestep(1.0 / 60.0);
//!     Engine::run(&config, ProxyRegistry::new(), &mut Observer)?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

// Core engine modules
pub mod config;
pub mod core;

pub mod ecs;
pub mod foundation;
pub mod physics;
pub mod scene;

mod application;
mod engine;

pub use application::{AppError, AppEvent, Application};
pub use engine::{Engine, EngineError};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        core::config::{
            BodyDescription, Config, ConfigError, EngineConfig, OriginConfig, PhysicsConfig, SceneDescription,
            SimulationConfig,
        },
        ecs::{
            components::{DoubleTransform, SpatialObject},
            Entity, World, WorldError,
        },
        foundation::{
            math::{DPose, DQuat, DVec3},
            time::{Stopwatch, TimeScale, Timer},
        },
        physics::{BodyReport, GravityFlags, NBodyIntegrator, PhysicsBody, TickReport},
        scene::{
            OriginManager, ProxyBackend, ProxyRegistry, ProxySelector, ScaleLadder, SceneError, SceneTick, SpaceScene,
        },
        AppError, AppEvent, Application, Engine, EngineError,
    };
}
