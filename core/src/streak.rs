//! Kill-streak announcements for the local player.
//!
//! Two independent counters: the multikill chain (kills in quick
//! succession) and the killing spree (kills since the player last died).
//! Multikills also request a highlight capture.

use tracing::info;

use crate::events::{GameSignal, SignalHandler};
use crate::highlight::{HighlightSink, ReplayRequest};
use crate::state::MatchCache;

/// Seconds between kills before a multikill chain breaks.
const CHAIN_TIMEOUT_SECS: f64 = 18.0;

/// First blood only counts this early into the match.
const FIRST_BLOOD_WINDOW_SECS: f64 = 300.0;

const MULTIKILL_PHRASES: [&str; 4] = ["DOUBLE KILL", "TRIPLE KILL", "ULTRA KILL", "RAMPAGE"];

const SPREE_PHRASES: [&str; 8] = [
    "KILLING SPREE",
    "DOMINATING",
    "MEGA KILL",
    "UNSTOPPABLE",
    "WICKED SICK",
    "MONSTER KILL",
    "GODLIKE",
    "BEYOND GODLIKE",
];

/// Announcement for a chain of `count` rapid kills. Chains past five stay
/// at the top phrase.
pub fn multikill_phrase(count: u32) -> Option<&'static str> {
    match count {
        0 | 1 => None,
        n => Some(MULTIKILL_PHRASES[(n as usize - 2).min(MULTIKILL_PHRASES.len() - 1)]),
    }
}

/// Announcement for `count` kills without dying, starting at three.
pub fn spree_phrase(count: u32) -> Option<&'static str> {
    match count {
        0..=2 => None,
        n => Some(SPREE_PHRASES[(n as usize - 3).min(SPREE_PHRASES.len() - 1)]),
    }
}

pub struct StreakTracker {
    chain_count: u32,
    chain_last_kill_at: Option<f64>,
    spree_count: u32,
    first_blood_called: bool,
    sink: Box<dyn HighlightSink>,
}

impl StreakTracker {
    pub fn new(sink: Box<dyn HighlightSink>) -> Self {
        Self {
            chain_count: 0,
            chain_last_kill_at: None,
            spree_count: 0,
            first_blood_called: false,
            sink,
        }
    }

    pub fn chain_count(&self) -> u32 {
        self.chain_count
    }

    pub fn spree_count(&self) -> u32 {
        self.spree_count
    }

    fn reset(&mut self) {
        self.chain_count = 0;
        self.chain_last_kill_at = None;
        self.spree_count = 0;
        self.first_blood_called = false;
    }

    fn on_player_kills(&mut self, delta: u32, total: u32, timestamp: f64, cache: &MatchCache) {
        if !self.first_blood_called && total == delta && timestamp <= FIRST_BLOOD_WINDOW_SECS {
            self.first_blood_called = true;
            info!(game_time = timestamp, "FIRST BLOOD");
        }

        let chain_alive = self
            .chain_last_kill_at
            .is_some_and(|last| timestamp - last <= CHAIN_TIMEOUT_SECS);
        self.chain_count = if chain_alive {
            self.chain_count + delta
        } else {
            delta
        };
        self.chain_last_kill_at = Some(timestamp);
        self.spree_count += delta;

        if let Some(phrase) = multikill_phrase(self.chain_count) {
            info!(chain = self.chain_count, game_time = timestamp, "{phrase}");
            self.sink.capture(ReplayRequest {
                match_id: cache.match_id.clone(),
                event_type: phrase.to_lowercase().replace(' ', "_"),
                enemy_name: None,
            });
        }
        if let Some(phrase) = spree_phrase(self.spree_count) {
            info!(spree = self.spree_count, game_time = timestamp, "{phrase}");
        }
    }
}

impl SignalHandler for StreakTracker {
    fn handle_signal(&mut self, signal: &GameSignal, cache: &MatchCache) {
        match signal {
            GameSignal::PlayerScoredKills {
                delta,
                total,
                timestamp,
            } => self.on_player_kills(*delta, *total, *timestamp, cache),
            GameSignal::PlayerDied { .. } => {
                self.chain_count = 0;
                self.chain_last_kill_at = None;
                self.spree_count = 0;
            }
            GameSignal::TrackingReset | GameSignal::MatchStarted { .. } => self.reset(),
            _ => {}
        }
    }
}
