//! # Core Engine Module
//!
//! Shared configuration types used by the scene, the engine loop and
//! driver applications.

pub mod config;

pub use config::{
    BodyDescription, Config, ConfigError, EngineConfig, OriginConfig, PhysicsConfig, PhysicsDescription,
    RenderDescription, SceneDescription, SimulationConfig,
};
