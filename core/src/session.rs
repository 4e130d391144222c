//! Wires the pipeline together: one session owns the processor, the
//! per-match cache, the signal handlers, and the optional snapshot dump.

use tracing::error;

use crate::events::{EventProcessor, GameSignal, SignalHandler};
use crate::snapshot::Snapshot;
use crate::snapshot_log::SnapshotLogger;
use crate::state::MatchCache;

pub struct MatchSession {
    processor: EventProcessor,
    cache: MatchCache,
    handlers: Vec<Box<dyn SignalHandler>>,
    snapshot_log: Option<SnapshotLogger>,
}

impl MatchSession {
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            processor: EventProcessor::new(),
            cache: MatchCache::new(seed),
            handlers: Vec::new(),
            snapshot_log: None,
        }
    }

    pub fn add_handler(&mut self, handler: Box<dyn SignalHandler>) {
        self.handlers.push(handler);
    }

    pub fn set_snapshot_log(&mut self, logger: SnapshotLogger) {
        self.snapshot_log = Some(logger);
    }

    pub fn cache(&self) -> &MatchCache {
        &self.cache
    }

    /// Run one snapshot through the pipeline and fan the resulting signals
    /// out to every handler. Dump failures are logged and do not stop
    /// processing.
    pub fn ingest(&mut self, snapshot: &Snapshot) -> Vec<GameSignal> {
        if let Some(log) = &mut self.snapshot_log {
            if let Err(err) = log.record(snapshot.match_id(), snapshot) {
                error!(%err, "failed to persist snapshot");
            }
        }

        let signals = self.processor.process_snapshot(snapshot, &mut self.cache);
        for signal in &signals {
            for handler in &mut self.handlers {
                handler.handle_signal(signal, &self.cache);
            }
        }
        for handler in &mut self.handlers {
            handler.on_tick(&self.cache);
        }
        signals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    struct Recorder(Arc<Mutex<Vec<String>>>);

    impl SignalHandler for Recorder {
        fn handle_signal(&mut self, signal: &GameSignal, _cache: &MatchCache) {
            let tag = match signal {
                GameSignal::MatchStarted { .. } => "start",
                GameSignal::KillRecorded { .. } => "kill",
                _ => "other",
            };
            self.0.lock().unwrap().push(tag.to_string());
        }
    }

    #[test]
    fn test_signals_fan_out_to_handlers() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut session = MatchSession::new(Some(1));
        session.add_handler(Box::new(Recorder(seen.clone())));

        let snapshot: Snapshot = serde_json::from_str(
            r#"{
                "map": {
                    "game_time": 30.0,
                    "game_state": "DOTA_GAMERULES_STATE_GAME_IN_PROGRESS",
                    "matchid": "100"
                },
                "player": { "kill_list": { "victimid_0": 1 } }
            }"#,
        )
        .unwrap();
        let signals = session.ingest(&snapshot);

        assert!(!signals.is_empty());
        let seen = seen.lock().unwrap();
        assert!(seen.contains(&"start".to_string()));
        assert!(seen.contains(&"kill".to_string()));
    }
}
