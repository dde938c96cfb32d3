//! Simulation module
//!
//! All gameplay logic lives here. This module stays free of rendering and
//! platform code:
//! - Time only enters through `tick`/`update` arguments
//! - Seeded RNG only
//! - Stable iteration order (buildings and slots by id)

pub mod ads;
pub mod camera;
pub mod layout;
pub mod session;
pub mod state;

pub use ads::{ActiveAdAssignment, AdRotationScheduler};
pub use camera::Camera;
pub use layout::{AdSlot, Building, BuildingSize, Layout, generate, generate_for, slot_facing};
pub use session::Session;
pub use state::{Entity, EntityId, GameEvent, RngState, SessionPhase};
