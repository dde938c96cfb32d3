//! Billboard ad scheduling
//!
//! Two timing policies share one slot table:
//! - Assignment: up to `max_ads` slots hold a campaign pulled FIFO from the
//!   incoming queue; a campaign is evicted once it has been up for
//!   `min_display_ms`.
//! - Rotation: every assigned slot steps through the cyclic creative list once
//!   per `rotation_interval_ms`.
//!
//! The scheduler only moves identifiers around. Fetching and drawing the
//! creatives belongs to the renderer.

use std::collections::{HashMap, VecDeque};

use serde::{Deserialize, Serialize};

use super::layout::AdSlot;
use super::state::GameEvent;
use crate::tuning::AdTuning;

/// A campaign currently occupying a slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveAdAssignment {
    pub slot_id: u32,
    pub content_id: String,
    pub assigned_at_ms: u64,
    /// Index into the creative list currently shown
    pub rotation_index: usize,
}

#[derive(Debug, Clone)]
struct SlotEntry {
    slot_id: u32,
    assignment: Option<ActiveAdAssignment>,
    rotation_index: usize,
    /// None until the slot is first assigned
    last_rotation_ms: Option<u64>,
}

/// Slot table in layout order with an id -> index map
#[derive(Debug, Clone)]
pub struct AdRotationScheduler {
    max_ads: usize,
    min_display_ms: u64,
    rotation_interval_ms: u64,
    rotation_content: Vec<String>,
    slots: Vec<SlotEntry>,
    index: HashMap<u32, usize>,
    live: usize,
    halted: bool,
    events: Vec<GameEvent>,
}

impl AdRotationScheduler {
    pub fn new(tuning: &AdTuning, slots: &[AdSlot]) -> Self {
        let entries: Vec<SlotEntry> = slots
            .iter()
            .map(|s| SlotEntry {
                slot_id: s.id,
                assignment: None,
                rotation_index: 0,
                last_rotation_ms: None,
            })
            .collect();
        let index = entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.slot_id, i))
            .collect();

        Self {
            max_ads: tuning.max_ads,
            min_display_ms: tuning.min_display_ms,
            rotation_interval_ms: tuning.rotation_interval_ms,
            rotation_content: tuning.rotation_content.clone(),
            slots: entries,
            index,
            live: 0,
            halted: false,
            events: Vec::new(),
        }
    }

    /// Evict expired campaigns, refill from `queue`, then rotate creatives
    pub fn update(&mut self, now: u64, queue: &mut VecDeque<String>) {
        if self.halted {
            return;
        }
        self.evict_expired(now);
        self.fill(now, queue);
        self.rotate(now);
    }

    fn evict_expired(&mut self, now: u64) {
        for entry in &mut self.slots {
            let expired = entry
                .assignment
                .as_ref()
                .is_some_and(|a| now.saturating_sub(a.assigned_at_ms) >= self.min_display_ms);
            if !expired {
                continue;
            }
            if let Some(old) = entry.assignment.take() {
                self.live -= 1;
                log::debug!("Slot {} evicted '{}'", entry.slot_id, old.content_id);
                self.events.push(GameEvent::AdEvicted {
                    slot: entry.slot_id,
                    content: old.content_id,
                });
            }
        }
    }

    fn fill(&mut self, now: u64, queue: &mut VecDeque<String>) {
        for entry in &mut self.slots {
            if self.live >= self.max_ads {
                break;
            }
            if entry.assignment.is_some() {
                continue;
            }
            let Some(content_id) = queue.pop_front() else {
                break;
            };

            entry.last_rotation_ms.get_or_insert(now);
            self.events.push(GameEvent::AdAssigned {
                slot: entry.slot_id,
                content: content_id.clone(),
            });
            entry.assignment = Some(ActiveAdAssignment {
                slot_id: entry.slot_id,
                content_id,
                assigned_at_ms: now,
                rotation_index: entry.rotation_index,
            });
            self.live += 1;
        }
    }

    /// Rotation rebases to `now`, so a slot completes a full cycle in
    /// exactly `len * rotation_interval_ms` only when updates land on
    /// interval boundaries; otherwise each step slips by the frame overshoot.
    fn rotate(&mut self, now: u64) {
        let len = self.rotation_content.len();
        if len == 0 {
            return;
        }
        for entry in &mut self.slots {
            let Some(assignment) = entry.assignment.as_mut() else {
                continue;
            };
            let last = entry.last_rotation_ms.unwrap_or(now);
            if now.saturating_sub(last) < self.rotation_interval_ms {
                continue;
            }

            entry.rotation_index = (entry.rotation_index + 1) % len;
            entry.last_rotation_ms = Some(now);
            assignment.rotation_index = entry.rotation_index;
            self.events.push(GameEvent::AdContentChanged {
                slot: entry.slot_id,
                content: self.rotation_content[entry.rotation_index].clone(),
            });
        }
    }

    /// Evict every live assignment and rebuild the table for a new slot
    /// list. Returns the evicted campaign ids in slot order.
    pub fn reset_slots(&mut self, slots: &[AdSlot]) -> Vec<String> {
        let mut evicted = Vec::with_capacity(self.live);
        for entry in &mut self.slots {
            if let Some(old) = entry.assignment.take() {
                self.events.push(GameEvent::AdEvicted {
                    slot: entry.slot_id,
                    content: old.content_id.clone(),
                });
                evicted.push(old.content_id);
            }
        }
        log::debug!("Slot table reset, {} campaigns evicted", evicted.len());

        self.slots = slots
            .iter()
            .map(|s| SlotEntry {
                slot_id: s.id,
                assignment: None,
                rotation_index: 0,
                last_rotation_ms: None,
            })
            .collect();
        self.index = self
            .slots
            .iter()
            .enumerate()
            .map(|(i, e)| (e.slot_id, i))
            .collect();
        self.live = 0;
        evicted
    }

    /// Stop for good; later updates are no-ops
    pub fn halt(&mut self) {
        self.halted = true;
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Move every timestamp forward by `ms` so an interval spent paused
    /// counts toward neither display time nor rotation.
    pub fn shift_clock(&mut self, ms: u64) {
        for entry in &mut self.slots {
            if let Some(a) = entry.assignment.as_mut() {
                a.assigned_at_ms = a.assigned_at_ms.saturating_add(ms);
            }
            if let Some(last) = entry.last_rotation_ms.as_mut() {
                *last = last.saturating_add(ms);
            }
        }
    }

    pub fn live_count(&self) -> usize {
        self.live
    }

    /// Live assignments in slot order
    pub fn assignments(&self) -> impl Iterator<Item = &ActiveAdAssignment> {
        self.slots.iter().filter_map(|e| e.assignment.as_ref())
    }

    pub fn assignment(&self, slot_id: u32) -> Option<&ActiveAdAssignment> {
        self.entry(slot_id).and_then(|e| e.assignment.as_ref())
    }

    pub fn rotation_index(&self, slot_id: u32) -> Option<usize> {
        self.entry(slot_id).map(|e| e.rotation_index)
    }

    /// Creative currently shown on a slot, if it holds a campaign
    pub fn current_content(&self, slot_id: u32) -> Option<&str> {
        let entry = self.entry(slot_id)?;
        if entry.assignment.is_none() {
            return None;
        }
        self.rotation_content
            .get(entry.rotation_index)
            .map(String::as_str)
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    fn entry(&self, slot_id: u32) -> Option<&SlotEntry> {
        self.index.get(&slot_id).map(|&i| &self.slots[i])
    }
}
