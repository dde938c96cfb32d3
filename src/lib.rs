//! Rooftop Chase - an arcade chase-and-brawl through a procedural city
//!
//! Core modules:
//! - `sim`: Simulation (layout generation, session state machine, ad scheduling)
//! - `game`: Context object driving the simulation from the frame clock
//! - `platform`: Results delivered by external collaborators (ad network)
//! - `tuning`: Data-driven game balance
//! - `error`: Configuration errors

pub mod error;
pub mod game;
pub mod platform;
pub mod sim;
pub mod tuning;

pub use error::ConfigError;
pub use game::Game;
pub use tuning::{SceneArchetype, Tuning, Vehicle};

use glam::Vec3;

/// Game configuration constants
pub mod consts {
    /// Nominal frame step (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Dash energy bar capacity
    pub const MAX_DASH_ENERGY: f32 = 100.0;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    if !angle.is_finite() {
        return angle;
    }
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Offset of length `r` at angle `theta` on the ground (XZ) plane
#[inline]
pub fn polar_to_planar(r: f32, theta: f32) -> Vec3 {
    Vec3::new(r * theta.cos(), 0.0, r * theta.sin())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_normalize_angle() {
        assert!((normalize_angle(3.0 * PI) - -PI).abs() < 1e-5);
        assert!((normalize_angle(-1.5 * PI) - 0.5 * PI).abs() < 1e-5);
        assert_eq!(normalize_angle(0.25), 0.25);
        assert!(normalize_angle(f32::INFINITY).is_infinite());
        assert!(normalize_angle(f32::NAN).is_nan());
    }

    #[test]
    fn test_polar_to_planar() {
        let v = polar_to_planar(2.0, PI / 2.0);
        assert!((v - Vec3::new(0.0, 0.0, 2.0)).length() < 1e-5);
    }
}
