//! Per-match mutable state, grouped so the processor can reset it in one
//! place between matches. Pure storage; all transition logic lives in the
//! processor and the correlation engine.

use crate::correlation::CorrelationEngine;
use crate::tracking::{DisappearanceDetector, KillFeedWatcher, MinimapTracker};

/// The local player's scoreboard as of the last tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerScore {
    pub kills: u32,
    pub deaths: u32,
    pub assists: u32,
}

#[derive(Debug)]
pub struct MatchCache {
    pub match_id: Option<String>,
    pub game_time: Option<f64>,
    pub minimap: MinimapTracker,
    pub kill_feed: KillFeedWatcher,
    pub absences: DisappearanceDetector,
    pub engine: CorrelationEngine,
    pub player: PlayerScore,
    seed: Option<u64>,
}

impl MatchCache {
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            match_id: None,
            game_time: None,
            minimap: MinimapTracker::new(),
            kill_feed: KillFeedWatcher::new(),
            absences: DisappearanceDetector::new(),
            engine: CorrelationEngine::new(seed),
            player: PlayerScore::default(),
            seed,
        }
    }

    /// Drop all per-match state. The RNG seed survives so a replay of the
    /// same dump reproduces the same attributions after a reset.
    pub fn reset(&mut self) {
        *self = Self::new(self.seed);
    }
}
