//! Visibility-transition detection and the longer-lived pending-absence
//! table used for delayed death confirmation.

use std::collections::{BTreeMap, BTreeSet};

use wardscry_types::Position;

use super::minimap::MinimapTracker;

/// A hero left the minimap between two consecutive ticks. One-tick lifetime.
#[derive(Debug, Clone, PartialEq)]
pub struct DisappearanceEvent {
    pub hero_name: String,
    pub timestamp: f64,
    pub last_position: Option<Position>,
}

/// A hero missing across many ticks. `since` is the first-missing time and
/// is never refreshed while the hero stays absent.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingAbsence {
    pub hero_name: String,
    pub since: f64,
}

#[derive(Debug, Clone, Default)]
pub struct DisappearanceDetector {
    previous_visible: BTreeSet<String>,
    pending: BTreeMap<String, f64>,
}

impl DisappearanceDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Diff the visible set against the previous tick. Heroes that left the
    /// map produce an event and a pending-absence entry; heroes that came
    /// back have their entry deleted immediately, however old it was.
    pub fn diff(
        &mut self,
        current_visible: &BTreeSet<String>,
        timestamp: f64,
        tracker: &MinimapTracker,
    ) -> Vec<DisappearanceEvent> {
        let mut events = Vec::new();

        for name in &self.previous_visible {
            if !current_visible.contains(name) {
                self.pending.entry(name.clone()).or_insert(timestamp);
                events.push(DisappearanceEvent {
                    hero_name: name.clone(),
                    timestamp,
                    last_position: tracker.get(name).map(|h| h.last_position),
                });
            }
        }

        for name in current_visible {
            self.pending.remove(name);
        }

        self.previous_visible = current_visible.clone();

        // Deterministic candidate order for the correlation engine
        events.sort_by(|a, b| {
            let seen = |e: &DisappearanceEvent| {
                tracker.get(&e.hero_name).map(|h| h.first_seen_at)
            };
            seen(a)
                .unwrap_or(f64::MAX)
                .total_cmp(&seen(b).unwrap_or(f64::MAX))
                .then_with(|| a.hero_name.cmp(&b.hero_name))
        });
        events
    }

    /// Remove and return absences that have lasted longer than `min_age`
    /// seconds. Each entry is evaluated exactly once.
    pub fn take_expired(&mut self, now: f64, min_age: f64) -> Vec<PendingAbsence> {
        let expired: Vec<String> = self
            .pending
            .iter()
            .filter(|(_, since)| now - **since > min_age)
            .map(|(name, _)| name.clone())
            .collect();

        expired
            .into_iter()
            .map(|name| {
                let since = self.pending.remove(&name).unwrap_or_default();
                PendingAbsence {
                    hero_name: name,
                    since,
                }
            })
            .collect()
    }

    /// The visible set as of the last processed tick.
    pub fn visible(&self) -> &BTreeSet<String> {
        &self.previous_visible
    }

    pub fn pending_since(&self, hero_name: &str) -> Option<f64> {
        self.pending.get(hero_name).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::VisibleEnemy;

    fn tracker_with(names: &[&str]) -> MinimapTracker {
        let mut tracker = MinimapTracker::new();
        let enemies: Vec<VisibleEnemy> = names
            .iter()
            .map(|n| VisibleEnemy {
                name: n.to_string(),
                position: Position::new(0.0, 0.0),
            })
            .collect();
        tracker.update(&enemies, 1.0);
        tracker
    }

    fn set(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_disappearance_detected() {
        let tracker = tracker_with(&["npc_dota_hero_axe", "npc_dota_hero_lina"]);
        let mut detector = DisappearanceDetector::new();
        detector.diff(&set(&["npc_dota_hero_axe", "npc_dota_hero_lina"]), 5.0, &tracker);
        let events = detector.diff(&set(&["npc_dota_hero_lina"]), 6.0, &tracker);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].hero_name, "npc_dota_hero_axe");
        assert_eq!(events[0].timestamp, 6.0);
        assert_eq!(detector.pending_since("npc_dota_hero_axe"), Some(6.0));
    }

    #[test]
    fn test_absence_start_not_refreshed() {
        let tracker = tracker_with(&["npc_dota_hero_axe"]);
        let mut detector = DisappearanceDetector::new();
        detector.diff(&set(&["npc_dota_hero_axe"]), 5.0, &tracker);
        detector.diff(&set(&[]), 6.0, &tracker);
        detector.diff(&set(&[]), 9.0, &tracker);
        assert_eq!(detector.pending_since("npc_dota_hero_axe"), Some(6.0));
    }

    #[test]
    fn test_reappearance_clears_pending() {
        let tracker = tracker_with(&["npc_dota_hero_axe"]);
        let mut detector = DisappearanceDetector::new();
        detector.diff(&set(&["npc_dota_hero_axe"]), 5.0, &tracker);
        detector.diff(&set(&[]), 6.0, &tracker);
        detector.diff(&set(&["npc_dota_hero_axe"]), 30.0, &tracker);
        assert_eq!(detector.pending_since("npc_dota_hero_axe"), None);
    }

    #[test]
    fn test_take_expired_removes_entries() {
        let tracker = tracker_with(&["npc_dota_hero_axe", "npc_dota_hero_lina"]);
        let mut detector = DisappearanceDetector::new();
        detector.diff(&set(&["npc_dota_hero_axe", "npc_dota_hero_lina"]), 5.0, &tracker);
        detector.diff(&set(&["npc_dota_hero_lina"]), 6.0, &tracker);

        assert!(detector.take_expired(10.0, 5.0).is_empty());
        let expired = detector.take_expired(11.5, 5.0);
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].hero_name, "npc_dota_hero_axe");
        assert_eq!(expired[0].since, 6.0);
        // Evaluated once; the entry is gone
        assert!(detector.take_expired(20.0, 5.0).is_empty());
    }
}
