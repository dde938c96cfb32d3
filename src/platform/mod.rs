//! Platform collaborator boundary
//!
//! The ad network runs outside the simulation. Whatever callback or future it
//! uses internally, its outcome reaches the core as a plain `RewardResult`
//! applied between ticks; the core never waits on it.

use thiserror::Error;

/// What a completed rewarded ad grants
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reward {
    /// Bonus score
    Points(u64),
    /// Dash energy top-up (clamped on apply)
    DashEnergy(f32),
}

/// Why a rewarded ad produced nothing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdError {
    #[error("ad failed to load: {0}")]
    LoadFailed(String),
    #[error("ad closed before completion")]
    Aborted,
}

pub type RewardResult = Result<Reward, AdError>;
