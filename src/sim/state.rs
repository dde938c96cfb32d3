//! Session state and core simulation types
//!
//! Entities, phases and the outbound event stream shared by the session and
//! the ad scheduler.

use glam::{Vec2, Vec3};
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::MAX_DASH_ENERGY;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SessionPhase {
    /// Created, no layout yet
    #[default]
    Init,
    /// Player pursues the opponent
    Chase,
    /// Combo fight after contact
    Fight,
    /// Frozen; remembers the phase to return to
    Paused,
    /// Terminal
    Over,
}

impl SessionPhase {
    /// Phases in which ticks advance the simulation
    pub fn is_running(self) -> bool {
        matches!(self, SessionPhase::Chase | SessionPhase::Fight)
    }
}

/// Which of the two actors an entity is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityId {
    Player,
    Opponent,
}

/// A character in the world
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub position: Vec3,
    /// Yaw around +Y (radians)
    pub rotation: f32,
    /// Walking speed (world units/s)
    pub speed: f32,
    /// Always within [0, MAX_DASH_ENERGY]
    dash_energy: f32,
    pub attack_count: u32,
    pub is_attacking: bool,
    /// Desired planar movement direction (normalized, or zero to stand)
    pub heading: Vec2,
    /// Seconds of dash burst left
    pub dash_remaining: f32,
    /// Equipped vehicle id
    pub vehicle: Option<String>,
    /// Speed multiplier from the equipped vehicle (1 when on foot)
    speed_bonus: f32,
}

impl Entity {
    pub fn new(id: EntityId, speed: f32) -> Self {
        Self {
            id,
            position: Vec3::ZERO,
            rotation: 0.0,
            speed,
            dash_energy: 0.0,
            attack_count: 0,
            is_attacking: false,
            heading: Vec2::ZERO,
            dash_remaining: 0.0,
            vehicle: None,
            speed_bonus: 1.0,
        }
    }

    /// Ride a vehicle; replaces any vehicle already equipped
    pub fn equip_vehicle(&mut self, id: &str, speed_bonus: f32) {
        self.vehicle = Some(id.to_string());
        self.speed_bonus = speed_bonus;
    }

    pub fn unequip_vehicle(&mut self) {
        self.vehicle = None;
        self.speed_bonus = 1.0;
    }

    pub fn speed_bonus(&self) -> f32 {
        self.speed_bonus
    }

    /// Walking speed with the vehicle bonus applied
    pub fn actual_speed(&self) -> f32 {
        self.speed * self.speed_bonus
    }

    pub fn dash_energy(&self) -> f32 {
        self.dash_energy
    }

    /// Add (or with a negative amount, remove) dash energy, clamped
    pub fn add_dash_energy(&mut self, amount: f32) {
        if !amount.is_finite() {
            return;
        }
        self.dash_energy = (self.dash_energy + amount).clamp(0.0, MAX_DASH_ENERGY);
    }

    /// Spend a full bar to start a burst. Returns false if the bar isn't full.
    pub fn try_dash(&mut self, duration: f32) -> bool {
        if self.dash_energy < MAX_DASH_ENERGY {
            return false;
        }
        self.dash_energy = 0.0;
        self.dash_remaining = duration.max(0.0);
        true
    }

    pub fn is_dashing(&self) -> bool {
        self.dash_remaining > 0.0
    }

    pub fn start_attack(&mut self) {
        self.is_attacking = true;
        self.attack_count = 0;
    }

    pub fn stop_attack(&mut self) {
        self.is_attacking = false;
        self.attack_count = 0;
    }

    /// Planar (XZ) position
    #[inline]
    pub fn planar(&self) -> Vec2 {
        Vec2::new(self.position.x, self.position.z)
    }
}

/// Events for the rendering and UI collaborators, in emission order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    PhaseChanged(SessionPhase),
    ScoreChanged(u64),
    EntityTransformChanged {
        entity: EntityId,
        position: Vec3,
        rotation: f32,
    },
    AdAssigned {
        slot: u32,
        content: String,
    },
    AdEvicted {
        slot: u32,
        content: String,
    },
    AdContentChanged {
        slot: u32,
        content: String,
    },
}

/// RNG seed wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn to_rng(&self) -> Pcg32 {
        Pcg32::seed_from_u64(self.seed)
    }
}
