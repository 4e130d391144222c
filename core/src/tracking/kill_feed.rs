//! Kill feed diffing over the five anonymized victim-slot counters.

use wardscry_types::VictimId;

/// A batch of kills on one victim slot, surfaced by diffing cumulative
/// counters between ticks. Ephemeral; consumed within the tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KillEvent {
    pub victim_id: VictimId,
    pub count_delta: u32,
    pub timestamp: f64,
}

#[derive(Debug, Clone, Default)]
pub struct KillFeedWatcher {
    previous: [u32; VictimId::COUNT as usize],
    last_kill_at: [Option<f64>; VictimId::COUNT as usize],
}

impl KillFeedWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Diff cumulative counters against the previous tick. Counters must
    /// not decrease; a decrease reads as a zero delta, not an error.
    pub fn diff(
        &mut self,
        current: [u32; VictimId::COUNT as usize],
        timestamp: f64,
    ) -> Vec<KillEvent> {
        let mut events = Vec::new();
        for slot in VictimId::ALL {
            let prev = self.previous[slot.index()];
            let cur = current[slot.index()];
            if cur > prev {
                self.last_kill_at[slot.index()] = Some(timestamp);
                events.push(KillEvent {
                    victim_id: slot,
                    count_delta: cur - prev,
                    timestamp,
                });
            }
        }
        self.previous = current;
        events
    }

    /// Game-clock timestamp of the most recent kill on a slot.
    pub fn last_kill_at(&self, victim_id: VictimId) -> Option<f64> {
        self.last_kill_at[victim_id.index()]
    }

    /// Running cumulative total for a slot.
    pub fn total(&self, victim_id: VictimId) -> u32 {
        self.previous[victim_id.index()]
    }

    /// Sum of all slot counters.
    pub fn total_kills(&self) -> u32 {
        self.previous.iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_deltas_only() {
        let mut watcher = KillFeedWatcher::new();
        let events = watcher.diff([1, 0, 2, 0, 0], 30.0);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].victim_id, VictimId::new(0).unwrap());
        assert_eq!(events[0].count_delta, 1);
        assert_eq!(events[1].victim_id, VictimId::new(2).unwrap());
        assert_eq!(events[1].count_delta, 2);
    }

    #[test]
    fn test_no_change_no_events() {
        let mut watcher = KillFeedWatcher::new();
        watcher.diff([1, 1, 1, 1, 1], 30.0);
        assert!(watcher.diff([1, 1, 1, 1, 1], 31.0).is_empty());
    }

    #[test]
    fn test_decrease_is_zero_delta() {
        let mut watcher = KillFeedWatcher::new();
        watcher.diff([3, 0, 0, 0, 0], 30.0);
        assert!(watcher.diff([1, 0, 0, 0, 0], 31.0).is_empty());
        // The lowered value becomes the new baseline
        let events = watcher.diff([2, 0, 0, 0, 0], 32.0);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].count_delta, 1);
    }

    #[test]
    fn test_last_kill_timestamp_tracks_latest() {
        let mut watcher = KillFeedWatcher::new();
        let slot = VictimId::new(4).unwrap();
        assert_eq!(watcher.last_kill_at(slot), None);
        watcher.diff([0, 0, 0, 0, 1], 30.0);
        watcher.diff([0, 0, 0, 0, 2], 55.5);
        assert_eq!(watcher.last_kill_at(slot), Some(55.5));
        assert_eq!(watcher.total(slot), 2);
        assert_eq!(watcher.total_kills(), 2);
    }
}
