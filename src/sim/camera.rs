//! Chase camera
//!
//! Sits a fixed distance behind the player on the line through the opponent,
//! at a fixed height, looking at the player. No smoothing: the camera is a
//! pure function of the two positions.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::normalize_angle;
use crate::tuning::CameraTuning;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Camera {
    pub position: Vec3,
    /// Yaw (radians, atan2 of the horizontal view direction)
    pub yaw: f32,
    pub distance: f32,
    pub height: f32,
    pub fov_degrees: f32,
    pub far: f32,
}

impl Camera {
    pub fn new(tuning: &CameraTuning) -> Self {
        Self {
            position: Vec3::new(0.0, tuning.height, -tuning.distance),
            yaw: 0.0,
            distance: tuning.distance,
            height: tuning.height,
            fov_degrees: tuning.fov_degrees,
            far: tuning.far,
        }
    }

    /// Recompute from player and opponent positions
    pub fn follow(&mut self, player: Vec3, opponent: Vec3) {
        let away = Vec2::new(player.x - opponent.x, player.z - opponent.z);
        let dir = away.normalize_or_zero();

        self.position = Vec3::new(
            player.x - dir.x * self.distance,
            self.height,
            player.z - dir.y * self.distance,
        );
        self.yaw = away.y.atan2(away.x);
    }

    /// Whether a world point is inside the far plane and horizontal FOV
    pub fn can_see(&self, point: Vec3) -> bool {
        let delta = point - self.position;
        if delta.length() > self.far {
            return false;
        }

        let bearing = normalize_angle(delta.z.atan2(delta.x) - self.yaw);
        bearing.abs() <= self.fov_degrees.to_radians() / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn camera() -> Camera {
        Camera::new(&CameraTuning::default())
    }

    #[test]
    fn test_follow_behind_player() {
        let mut cam = camera();
        cam.follow(Vec3::ZERO, Vec3::new(0.0, 0.0, -50.0));

        // Opponent at -Z, so "away" is +Z; camera sits 15 units toward -Z
        assert!((cam.position - Vec3::new(0.0, 10.0, -15.0)).length() < 1e-4);
        assert!((cam.yaw - FRAC_PI_2).abs() < 1e-5);
    }

    #[test]
    fn test_follow_ignores_height_difference() {
        let mut cam = camera();
        cam.follow(Vec3::new(10.0, 5.0, 0.0), Vec3::new(0.0, -20.0, 0.0));
        assert!((cam.position - Vec3::new(-5.0, 10.0, 0.0)).length() < 1e-4);
        assert!(cam.yaw.abs() < 1e-6);
    }

    #[test]
    fn test_follow_coincident_positions() {
        let mut cam = camera();
        cam.follow(Vec3::new(3.0, 0.0, 4.0), Vec3::new(3.0, 0.0, 4.0));
        assert!(cam.position.is_finite());
        assert_eq!(cam.position, Vec3::new(3.0, 10.0, 4.0));
    }

    #[test]
    fn test_can_see() {
        let mut cam = camera();
        cam.follow(Vec3::ZERO, Vec3::new(-100.0, 0.0, 0.0));
        // Looking along +X from (-15, 10, 0)
        assert!(cam.can_see(Vec3::new(50.0, 10.0, 0.0)));
        assert!(cam.can_see(Vec3::new(50.0, 10.0, 20.0)));
        assert!(!cam.can_see(Vec3::new(-50.0, 10.0, 0.0)));
        assert!(!cam.can_see(Vec3::new(0.0, 10.0, 200.0)));
        assert!(!cam.can_see(Vec3::new(5000.0, 10.0, 0.0)));
    }

    #[test]
    fn test_cannot_see_non_finite_points() {
        let mut cam = camera();
        cam.follow(Vec3::ZERO, Vec3::new(-100.0, 0.0, 0.0));
        assert!(!cam.can_see(Vec3::new(f32::INFINITY, 10.0, 0.0)));
        assert!(!cam.can_see(Vec3::new(f32::NAN, 10.0, 0.0)));
    }
}
