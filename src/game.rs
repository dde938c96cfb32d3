//! Game context
//!
//! Owns the session, the billboard scheduler and the incoming campaign queue,
//! and is the single place that drives them from the frame clock. The
//! scheduler only advances while the session is in a chase or a fight, so a
//! paused screen never rotates ads behind the player's back.

use std::collections::VecDeque;

use glam::Vec2;

use crate::error::ConfigError;
use crate::platform::{AdError, Reward, RewardResult};
use crate::sim::{AdRotationScheduler, GameEvent, Session, SessionPhase};
use crate::tuning::Tuning;

pub struct Game {
    session: Session,
    scheduler: AdRotationScheduler,
    incoming: VecDeque<String>,
}

impl Game {
    pub fn new(tuning: Tuning, seed: u64) -> Self {
        let scheduler = AdRotationScheduler::new(&tuning.ads, &[]);
        Self {
            session: Session::new(tuning, seed),
            scheduler,
            incoming: VecDeque::new(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn scheduler(&self) -> &AdRotationScheduler {
        &self.scheduler
    }

    pub fn phase(&self) -> SessionPhase {
        self.session.phase()
    }

    /// Start (or restart) a session and rebuild the slot table for its layout.
    ///
    /// Campaigns still live on the old layout are evicted and go back to the
    /// front of the queue in slot order, ahead of anything queued later.
    pub fn start(&mut self, archetype_id: &str, now: u64) -> Result<(), ConfigError> {
        if self.session.phase() == SessionPhase::Over {
            log::debug!("start ignored: game is over");
            return Ok(());
        }
        self.session.start_session(archetype_id, now)?;
        let evicted = self.scheduler.reset_slots(&self.session.layout().slots);
        for content_id in evicted.into_iter().rev() {
            self.incoming.push_front(content_id);
        }
        Ok(())
    }

    /// One frame from the monotonic clock
    pub fn frame(&mut self, now: u64) {
        self.session.advance(now);
        self.update_ads(now);
    }

    /// One frame with an explicit step
    pub fn tick(&mut self, dt: f32, now: u64) {
        self.session.tick(dt, now);
        self.update_ads(now);
    }

    fn update_ads(&mut self, now: u64) {
        if self.session.phase().is_running() {
            self.scheduler.update(now, &mut self.incoming);
        }
    }

    /// Queue a campaign for the next free slot
    pub fn enqueue_ad(&mut self, content_id: impl Into<String>) {
        self.incoming.push_back(content_id.into());
    }

    pub fn pending_ads(&self) -> usize {
        self.incoming.len()
    }

    pub fn pause(&mut self, now: u64) {
        self.session.pause(now);
    }

    pub fn resume(&mut self, now: u64) {
        if let Some(paused_ms) = self.session.resume(now) {
            self.scheduler.shift_clock(paused_ms);
            log::debug!("Resumed after {} ms", paused_ms);
        }
    }

    pub fn end(&mut self) {
        self.session.end();
        self.scheduler.halt();
    }

    pub fn add_attack_count(&mut self) -> bool {
        self.session.add_attack_count()
    }

    pub fn steer(&mut self, direction: Vec2) {
        self.session.steer(direction);
    }

    pub fn dash(&mut self) -> bool {
        self.session.dash()
    }

    pub fn equip_vehicle(&mut self, vehicle_id: Option<&str>) -> Result<(), ConfigError> {
        self.session.equip_vehicle(vehicle_id)
    }

    pub fn apply_reward(&mut self, result: RewardResult) -> bool {
        self.session.apply_reward(result)
    }

    /// A rewarded video closed; `Ok` means it was watched to the end
    pub fn finish_rewarded_video(&mut self, outcome: Result<(), AdError>) -> bool {
        let points = self.session.tuning().ads.reward_points;
        self.apply_reward(outcome.map(|()| Reward::Points(points)))
    }

    /// Session events first, then scheduler events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        let mut events = self.session.drain_events();
        events.extend(self.scheduler.drain_events());
        events
    }

    /// Slots the camera can currently see
    pub fn visible_slots(&self) -> Vec<u32> {
        let camera = &self.session.camera;
        self.session
            .layout()
            .slots
            .iter()
            .filter(|s| camera.can_see(s.position))
            .map(|s| s.id)
            .collect()
    }
}
