//! Data-driven game balance
//!
//! Every rule constant and the scene archetype catalog live here so a build
//! can be rebalanced from a JSON document instead of a recompile. `Default`
//! reproduces the shipped values.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Billboard dimensions for every slot in a scene
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlotSize {
    pub width: f32,
    pub height: f32,
}

/// Immutable description of a scene the layout generator can build
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneArchetype {
    pub id: String,
    pub building_count: u32,
    pub building_spacing: f32,
    pub min_building_height: f32,
    pub max_building_height: f32,
    pub ad_slot_count: u32,
    pub ad_slot_size: SlotSize,
}

impl SceneArchetype {
    /// Check the schema constraints (positive counts and sizes, ordered heights)
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidArchetype {
            id: self.id.clone(),
            reason: reason.to_string(),
        };

        if self.id.is_empty() {
            return Err(invalid("id must not be empty"));
        }
        if self.building_count == 0 {
            return Err(invalid("building_count must be > 0"));
        }
        if !(self.building_spacing.is_finite() && self.building_spacing > 0.0) {
            return Err(invalid("building_spacing must be > 0"));
        }
        if !(self.min_building_height.is_finite() && self.max_building_height.is_finite()) {
            return Err(invalid("building heights must be finite"));
        }
        if self.min_building_height > self.max_building_height {
            return Err(invalid("min_building_height must be <= max_building_height"));
        }
        // The height range is sampled as `max - min`, which can overflow
        if !(self.max_building_height - self.min_building_height).is_finite() {
            return Err(invalid("building height range is too wide"));
        }
        if !(self.ad_slot_size.width > 0.0 && self.ad_slot_size.height > 0.0) {
            return Err(invalid("ad_slot_size must be positive"));
        }
        Ok(())
    }
}

/// Chase/fight rules
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleTuning {
    /// Planar distance at which the chase turns into a fight (inclusive)
    pub catch_distance: f32,
    /// Landed hits needed to win a fight
    pub attack_threshold: u32,
    /// Points for a won fight
    pub score_per_round: u64,
    /// Dash energy regained per second while chasing
    pub dash_regen_rate: f32,
    /// Walking speed (world units/s)
    pub move_speed: f32,
    /// Speed during a dash burst
    pub dash_speed: f32,
    /// Dash burst length (seconds)
    pub dash_duration: f32,
    /// Opponent respawn ring around a building
    pub respawn_min_distance: f32,
    pub respawn_max_distance: f32,
}

impl Default for RuleTuning {
    fn default() -> Self {
        Self {
            catch_distance: 100.0,
            attack_threshold: 15,
            score_per_round: 10,
            dash_regen_rate: 10.0,
            move_speed: 5.0,
            dash_speed: 10.0,
            dash_duration: 0.5,
            respawn_min_distance: 30.0,
            respawn_max_distance: 80.0,
        }
    }
}

/// Equipment that scales the player's movement speed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: String,
    /// Multiplier on walking and dash speed
    pub speed_bonus: f32,
}

/// Follow camera
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraTuning {
    /// Distance kept behind the player
    pub distance: f32,
    /// Fixed height above ground
    pub height: f32,
    /// Horizontal field of view (degrees)
    pub fov_degrees: f32,
    /// Far clip distance
    pub far: f32,
}

impl Default for CameraTuning {
    fn default() -> Self {
        Self {
            distance: 15.0,
            height: 10.0,
            fov_degrees: 60.0,
            far: 1000.0,
        }
    }
}

/// Billboard scheduling
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdTuning {
    /// Maximum simultaneously live assignments
    pub max_ads: usize,
    /// Assignment lifetime before eviction (ms)
    pub min_display_ms: u64,
    /// Creative rotation period per slot (ms)
    pub rotation_interval_ms: u64,
    /// Cyclic creative list every assigned slot rotates through
    pub rotation_content: Vec<String>,
    /// Points granted by a completed rewarded video
    pub reward_points: u64,
}

impl Default for AdTuning {
    fn default() -> Self {
        Self {
            max_ads: 8,
            min_display_ms: 10_000,
            rotation_interval_ms: 30_000,
            rotation_content: vec!["ad1".into(), "ad2".into(), "ad3".into()],
            reward_points: 100,
        }
    }
}

/// Complete tuning document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub rules: RuleTuning,
    pub camera: CameraTuning,
    pub ads: AdTuning,
    pub archetypes: Vec<SceneArchetype>,
    pub vehicles: Vec<Vehicle>,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            rules: RuleTuning::default(),
            camera: CameraTuning::default(),
            ads: AdTuning::default(),
            archetypes: builtin_archetypes(),
            vehicles: builtin_vehicles(),
        }
    }
}

impl Tuning {
    /// Parse and validate a JSON tuning document
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load from a JSON file on disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let tuning = Self::from_json(&json)?;
        log::info!(
            "Loaded tuning from {} ({} archetypes)",
            path.as_ref().display(),
            tuning.archetypes.len()
        );
        Ok(tuning)
    }

    /// Look up an archetype by id
    pub fn archetype(&self, id: &str) -> Result<&SceneArchetype, ConfigError> {
        self.archetypes
            .iter()
            .find(|a| a.id == id)
            .ok_or_else(|| ConfigError::UnknownArchetype(id.to_string()))
    }

    pub fn vehicle(&self, id: &str) -> Result<&Vehicle, ConfigError> {
        self.vehicles
            .iter()
            .find(|v| v.id == id)
            .ok_or_else(|| ConfigError::UnknownVehicle(id.to_string()))
    }

    /// Check every constraint the simulation relies on. Sessions validate
    /// their tuning on start, so a bad document never reaches the RNG.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let rules = &self.rules;
        if !(rules.catch_distance.is_finite() && rules.catch_distance >= 0.0) {
            return Err(ConfigError::InvalidTuning("catch_distance must be >= 0".into()));
        }
        if !(rules.dash_regen_rate.is_finite() && rules.dash_regen_rate >= 0.0) {
            return Err(ConfigError::InvalidTuning("dash_regen_rate must be >= 0".into()));
        }
        for (name, value) in [
            ("move_speed", rules.move_speed),
            ("dash_speed", rules.dash_speed),
            ("dash_duration", rules.dash_duration),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::InvalidTuning(format!("{} must be >= 0", name)));
            }
        }
        if !(rules.respawn_min_distance.is_finite()
            && rules.respawn_max_distance.is_finite()
            && rules.respawn_min_distance >= 0.0
            && rules.respawn_min_distance <= rules.respawn_max_distance)
        {
            return Err(ConfigError::InvalidTuning(
                "respawn distances must be finite and satisfy 0 <= min <= max".into(),
            ));
        }
        if self.ads.rotation_interval_ms == 0 {
            return Err(ConfigError::InvalidTuning("rotation_interval_ms must be > 0".into()));
        }

        for (i, archetype) in self.archetypes.iter().enumerate() {
            archetype.validate()?;
            if self.archetypes[..i].iter().any(|a| a.id == archetype.id) {
                return Err(ConfigError::InvalidTuning(format!(
                    "duplicate archetype id '{}'",
                    archetype.id
                )));
            }
        }

        for (i, vehicle) in self.vehicles.iter().enumerate() {
            if vehicle.id.is_empty() {
                return Err(ConfigError::InvalidTuning("vehicle id must not be empty".into()));
            }
            if !(vehicle.speed_bonus.is_finite() && vehicle.speed_bonus > 0.0) {
                return Err(ConfigError::InvalidTuning(format!(
                    "vehicle '{}' speed_bonus must be > 0",
                    vehicle.id
                )));
            }
            if self.vehicles[..i].iter().any(|v| v.id == vehicle.id) {
                return Err(ConfigError::InvalidTuning(format!(
                    "duplicate vehicle id '{}'",
                    vehicle.id
                )));
            }
        }
        Ok(())
    }
}

/// The three scenes the game ships with
pub fn builtin_archetypes() -> Vec<SceneArchetype> {
    vec![
        SceneArchetype {
            id: "city".into(),
            building_count: 20,
            building_spacing: 30.0,
            min_building_height: 30.0,
            max_building_height: 100.0,
            ad_slot_count: 8,
            ad_slot_size: SlotSize { width: 10.0, height: 15.0 },
        },
        SceneArchetype {
            id: "suburb".into(),
            building_count: 15,
            building_spacing: 40.0,
            min_building_height: 15.0,
            max_building_height: 40.0,
            ad_slot_count: 5,
            ad_slot_size: SlotSize { width: 8.0, height: 12.0 },
        },
        SceneArchetype {
            id: "park".into(),
            building_count: 10,
            building_spacing: 50.0,
            min_building_height: 10.0,
            max_building_height: 25.0,
            ad_slot_count: 3,
            ad_slot_size: SlotSize { width: 6.0, height: 10.0 },
        },
    ]
}

/// Rideable equipment
pub fn builtin_vehicles() -> Vec<Vehicle> {
    [("skates", 1.2), ("horse", 1.5), ("motorcycle", 1.8), ("car", 2.0)]
        .into_iter()
        .map(|(id, speed_bonus)| Vehicle {
            id: id.into(),
            speed_bonus,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tuning_is_valid() {
        let tuning = Tuning::default();
        assert!(tuning.validate().is_ok());
        assert_eq!(tuning.archetype("city").unwrap().building_count, 20);
    }

    #[test]
    fn test_unknown_archetype() {
        let tuning = Tuning::default();
        let err = tuning.archetype("moon").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownArchetype(ref id) if id == "moon"));
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let tuning = Tuning::from_json(r#"{ "rules": { "catch_distance": 42.0 } }"#).unwrap();
        assert_eq!(tuning.rules.catch_distance, 42.0);
        assert_eq!(tuning.rules.attack_threshold, 15);
        assert_eq!(tuning.ads.max_ads, 8);
        assert_eq!(tuning.archetypes.len(), 3);
    }

    #[test]
    fn test_rejects_inverted_heights() {
        let json = r#"{ "archetypes": [ {
            "id": "bad", "building_count": 4, "building_spacing": 10.0,
            "min_building_height": 50.0, "max_building_height": 20.0,
            "ad_slot_count": 1, "ad_slot_size": { "width": 1.0, "height": 1.0 }
        } ] }"#;
        let err = Tuning::from_json(json).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidArchetype { .. }));
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let mut tuning = Tuning::default();
        tuning.archetypes.push(tuning.archetypes[0].clone());
        assert!(matches!(tuning.validate(), Err(ConfigError::InvalidTuning(_))));
    }

    #[test]
    fn test_rejects_overflowing_height_range() {
        let json = r#"{ "archetypes": [ {
            "id": "wide", "building_count": 4, "building_spacing": 10.0,
            "min_building_height": -3.0e38, "max_building_height": 3.0e38,
            "ad_slot_count": 1, "ad_slot_size": { "width": 1.0, "height": 1.0 }
        } ] }"#;
        let err = Tuning::from_json(json).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidArchetype { ref id, .. } if id == "wide"));
    }

    #[test]
    fn test_rejects_bad_rule_values() {
        let mut tuning = Tuning::default();
        tuning.rules.respawn_max_distance = f32::INFINITY;
        assert!(matches!(tuning.validate(), Err(ConfigError::InvalidTuning(_))));

        let mut tuning = Tuning::default();
        tuning.rules.move_speed = -1.0;
        assert!(matches!(tuning.validate(), Err(ConfigError::InvalidTuning(_))));

        let mut tuning = Tuning::default();
        tuning.rules.dash_duration = f32::NAN;
        assert!(matches!(tuning.validate(), Err(ConfigError::InvalidTuning(_))));
    }

    #[test]
    fn test_vehicles() {
        let tuning = Tuning::default();
        assert_eq!(tuning.vehicle("car").unwrap().speed_bonus, 2.0);
        assert!(matches!(
            tuning.vehicle("rocket"),
            Err(ConfigError::UnknownVehicle(ref id)) if id == "rocket"
        ));

        let mut tuning = Tuning::default();
        tuning.vehicles.push(Vehicle {
            id: "anchor".into(),
            speed_bonus: 0.0,
        });
        assert!(matches!(tuning.validate(), Err(ConfigError::InvalidTuning(_))));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(Tuning::from_json("{ nope"), Err(ConfigError::Parse(_))));
    }
}
