//! Chase/fight session state machine
//!
//! `Init -> Chase <-> Fight`, `Chase/Fight <-> Paused`, anything `-> Over`.
//! Invalid transitions (fighting while already fighting, resuming when not
//! paused, ...) are ignored; stray or duplicated input is normal in an arcade
//! game and must never take the session down.

use std::f32::consts::TAU;

use glam::{Vec2, Vec3};
use rand::Rng;
use rand_pcg::Pcg32;

use super::camera::Camera;
use super::layout::{self, Layout};
use super::state::{Entity, EntityId, GameEvent, RngState, SessionPhase};
use crate::error::ConfigError;
use crate::platform::{Reward, RewardResult};
use crate::polar_to_planar;
use crate::tuning::Tuning;

/// One play session: two entities, a layout, score and phase
#[derive(Debug, Clone)]
pub struct Session {
    tuning: Tuning,
    rng_state: RngState,
    rng: Pcg32,
    phase: SessionPhase,
    /// Phase to return to on resume
    resume_phase: SessionPhase,
    paused_at_ms: Option<u64>,
    last_tick_ms: u64,
    score: u64,
    fights_won: u32,
    layout: Layout,
    pub player: Entity,
    pub opponent: Entity,
    pub camera: Camera,
    events: Vec<GameEvent>,
}

impl Session {
    /// Create an idle session with a seeded RNG
    pub fn new(tuning: Tuning, seed: u64) -> Self {
        let rng_state = RngState::new(seed);
        let rng = rng_state.to_rng();
        let speed = tuning.rules.move_speed;
        let camera = Camera::new(&tuning.camera);

        Self {
            tuning,
            rng_state,
            rng,
            phase: SessionPhase::Init,
            resume_phase: SessionPhase::Chase,
            paused_at_ms: None,
            last_tick_ms: 0,
            score: 0,
            fights_won: 0,
            layout: Layout::default(),
            player: Entity::new(EntityId::Player, speed),
            opponent: Entity::new(EntityId::Opponent, speed),
            camera,
            events: Vec::new(),
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn fights_won(&self) -> u32 {
        self.fights_won
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn seed(&self) -> u64 {
        self.rng_state.seed
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn last_tick_ms(&self) -> u64 {
        self.last_tick_ms
    }

    /// Take all events emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Generate the scene and begin the chase.
    ///
    /// An unknown archetype fails before anything is touched, so the previous
    /// session (if any) keeps running.
    pub fn start_session(&mut self, archetype_id: &str, now: u64) -> Result<(), ConfigError> {
        if self.phase == SessionPhase::Over {
            log::debug!("start_session ignored: session is over");
            return Ok(());
        }
        self.tuning.validate()?;
        let layout = layout::generate_for(&self.tuning, archetype_id, &mut self.rng)?;
        self.start_with_layout(layout, now);
        Ok(())
    }

    /// Begin the chase on an already generated layout
    pub fn start_with_layout(&mut self, layout: Layout, now: u64) {
        if self.phase == SessionPhase::Over {
            return;
        }
        log::info!(
            "Session starting in '{}' (seed {})",
            layout.archetype_id,
            self.rng_state.seed
        );

        self.layout = layout;
        self.score = 0;
        self.fights_won = 0;
        self.events.push(GameEvent::ScoreChanged(0));

        let speed = self.tuning.rules.move_speed;
        let mut player = Entity::new(EntityId::Player, speed);
        // Equipment carries over into the new run
        if let Some(vehicle) = self.player.vehicle.take() {
            player.equip_vehicle(&vehicle, self.player.speed_bonus());
        }
        self.player = player;
        self.opponent = Entity::new(EntityId::Opponent, speed);
        self.emit_transform(EntityId::Player);
        self.reposition_opponent();

        self.paused_at_ms = None;
        self.last_tick_ms = now;
        self.set_phase(SessionPhase::Chase);
        self.camera.follow(self.player.position, self.opponent.position);
    }

    /// Drop the opponent at a random spot on a ring around a random building
    pub fn reposition_opponent(&mut self) {
        if self.layout.is_empty() {
            return;
        }
        let rules = &self.tuning.rules;
        let idx = self.rng.random_range(0..self.layout.buildings.len());
        let anchor = self.layout.buildings[idx].position;
        let angle = self.rng.random_range(0.0..TAU);
        let (min, max) = (rules.respawn_min_distance, rules.respawn_max_distance);
        let distance = if max > min && (max - min).is_finite() {
            self.rng.random_range(min..=max)
        } else {
            min
        };

        self.opponent.position = anchor + polar_to_planar(distance, angle);
        log::debug!(
            "Opponent repositioned near building {} at {:?}",
            idx,
            self.opponent.position
        );
        self.emit_transform(EntityId::Opponent);
    }

    /// Advance one frame using the time since the previous tick
    pub fn advance(&mut self, now: u64) {
        let dt = now.saturating_sub(self.last_tick_ms) as f32 / 1000.0;
        self.tick(dt, now);
    }

    /// Advance the simulation by `dt` seconds
    pub fn tick(&mut self, dt: f32, now: u64) {
        // Don't tick unless a chase or fight is in progress
        if !self.phase.is_running() {
            return;
        }
        self.last_tick_ms = now;
        let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };

        match self.phase {
            SessionPhase::Chase => {
                let regen = self.tuning.rules.dash_regen_rate * dt;
                self.player.add_dash_energy(regen);
                self.move_player(dt);

                if self.planar_distance() <= self.tuning.rules.catch_distance {
                    self.start_fighting();
                }
            }
            SessionPhase::Fight => {
                if self.player.is_attacking
                    && self.player.attack_count >= self.tuning.rules.attack_threshold
                {
                    self.complete_fight();
                }
            }
            _ => {}
        }

        self.update_camera();
    }

    /// Planar (XZ) distance between player and opponent
    pub fn planar_distance(&self) -> f32 {
        self.player.planar().distance(self.opponent.planar())
    }

    fn move_player(&mut self, dt: f32) {
        let player = &mut self.player;
        let dashing = player.is_dashing();
        if dashing {
            player.dash_remaining = (player.dash_remaining - dt).max(0.0);
        }
        if player.heading == Vec2::ZERO || dt == 0.0 {
            return;
        }

        let speed = if dashing {
            self.tuning.rules.dash_speed * player.speed_bonus()
        } else {
            player.actual_speed()
        };
        let step = player.heading * speed * dt;
        player.position += Vec3::new(step.x, 0.0, step.y);
        player.rotation = player.heading.y.atan2(player.heading.x);
        self.emit_transform(EntityId::Player);
    }

    fn start_fighting(&mut self) {
        if self.phase != SessionPhase::Chase {
            log::debug!("start_fighting ignored in {:?}", self.phase);
            return;
        }
        log::debug!("Caught opponent at distance {:.1}", self.planar_distance());
        self.player.start_attack();
        self.set_phase(SessionPhase::Fight);
    }

    fn complete_fight(&mut self) {
        if self.phase != SessionPhase::Fight {
            return;
        }
        self.fights_won += 1;
        self.add_score(self.tuning.rules.score_per_round);
        self.player.stop_attack();
        self.reposition_opponent();
        self.set_phase(SessionPhase::Chase);
        log::info!("Fight {} won, score {}", self.fights_won, self.score);
    }

    /// A landed hit from the combat input collaborator. Returns true once the
    /// combo threshold is reached; completion itself happens on the next tick.
    pub fn add_attack_count(&mut self) -> bool {
        if self.phase != SessionPhase::Fight || !self.player.is_attacking {
            log::debug!("Hit ignored in {:?}", self.phase);
            return false;
        }
        self.player.attack_count = self.player.attack_count.saturating_add(1);
        self.player.attack_count >= self.tuning.rules.attack_threshold
    }

    /// Direct follow; skipped while paused or over
    pub fn update_camera(&mut self) {
        if matches!(self.phase, SessionPhase::Paused | SessionPhase::Over) {
            return;
        }
        self.camera.follow(self.player.position, self.opponent.position);
    }

    /// Set the player's planar heading; zero stops
    pub fn steer(&mut self, direction: Vec2) {
        if self.phase == SessionPhase::Over {
            return;
        }
        self.player.heading = direction.normalize_or_zero();
    }

    /// Spend a full dash bar for a speed burst (chase only)
    pub fn dash(&mut self) -> bool {
        if self.phase != SessionPhase::Chase {
            return false;
        }
        let started = self.player.try_dash(self.tuning.rules.dash_duration);
        if started {
            log::debug!("Dash started");
        }
        started
    }

    /// Equip a vehicle from the tuning catalog, or go back on foot with
    /// `None`. An unknown id fails and leaves the current equipment alone.
    pub fn equip_vehicle(&mut self, vehicle_id: Option<&str>) -> Result<(), ConfigError> {
        match vehicle_id {
            Some(id) => {
                let bonus = self.tuning.vehicle(id)?.speed_bonus;
                self.player.equip_vehicle(id, bonus);
                log::debug!("Equipped '{}' (x{:.1} speed)", id, bonus);
            }
            None => self.player.unequip_vehicle(),
        }
        Ok(())
    }

    pub fn pause(&mut self, now: u64) {
        if !self.phase.is_running() {
            log::debug!("pause ignored in {:?}", self.phase);
            return;
        }
        self.resume_phase = self.phase;
        self.paused_at_ms = Some(now);
        self.set_phase(SessionPhase::Paused);
    }

    /// Return to the phase active before `pause`. The last-tick time is
    /// re-baselined to `now` so the next `advance` doesn't see the pause as
    /// elapsed time. Returns the paused span in ms, or None if not paused.
    pub fn resume(&mut self, now: u64) -> Option<u64> {
        if self.phase != SessionPhase::Paused {
            log::debug!("resume ignored in {:?}", self.phase);
            return None;
        }
        let paused_at = self.paused_at_ms.take().unwrap_or(now);
        self.last_tick_ms = now;
        self.set_phase(self.resume_phase);
        Some(now.saturating_sub(paused_at))
    }

    /// Force the terminal phase
    pub fn end(&mut self) {
        if self.phase != SessionPhase::Over {
            log::info!(
                "Session over: score {}, {} fights won",
                self.score,
                self.fights_won
            );
        }
        self.paused_at_ms = None;
        self.set_phase(SessionPhase::Over);
    }

    /// Apply the outcome of a rewarded ad. A failure changes nothing.
    pub fn apply_reward(&mut self, result: RewardResult) -> bool {
        match result {
            Ok(Reward::Points(points)) => {
                self.add_score(points);
                true
            }
            Ok(Reward::DashEnergy(energy)) => {
                self.player.add_dash_energy(energy.max(0.0));
                true
            }
            Err(e) => {
                log::warn!("No reward: {}", e);
                false
            }
        }
    }

    fn add_score(&mut self, points: u64) {
        if points == 0 {
            return;
        }
        self.score = self.score.saturating_add(points);
        self.events.push(GameEvent::ScoreChanged(self.score));
    }

    fn set_phase(&mut self, phase: SessionPhase) {
        if self.phase == phase {
            return;
        }
        log::debug!("Phase {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
        self.events.push(GameEvent::PhaseChanged(phase));
    }

    fn emit_transform(&mut self, id: EntityId) {
        let entity = match id {
            EntityId::Player => &self.player,
            EntityId::Opponent => &self.opponent,
        };
        self.events.push(GameEvent::EntityTransformChanged {
            entity: id,
            position: entity.position,
            rotation: entity.rotation,
        });
    }
}
