//! Scene management
//!
//! Ties the entity world to the floating origin, the gravity integrator and
//! the proxy backend.
//!
//! ## Architecture
//!
//! ```text
//! OriginManager (origin + scale ladder + time scale)
//!      ↓
//! NBodyIntegrator (moves bodies)
//!      ↓
//! ProxySelector (one proxy per visible level)
//!      ↓
//! ProxyBackend (renderer or in-memory registry)
//! ```

pub mod instance;
pub mod origin;
pub mod proxy;
pub mod proxy_lod;
mod scene_manager;

pub use instance::ProxyInstance;
pub use origin::{LadderError, OriginManager, ScaleLadder};
pub use proxy::{ProxyBackend, ProxyError, ProxyPlacement, ProxyRegistry, ProxyResult, ProxySet};
pub use proxy_lod::{ProxySelector, ProxyUpdate};
pub use scene_manager::{SceneError, SceneTick, SpaceScene};
