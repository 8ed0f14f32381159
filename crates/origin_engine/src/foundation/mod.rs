//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the engine:
//! - Double-precision math types and operations
//! - Generational handles
//! - Time management and the simulation time scale
//! - Logging utilities

pub mod math;
pub mod collections;
pub mod time;
pub mod logging;
