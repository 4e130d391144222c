//! Outbound hook for moments worth clipping.
//!
//! The tracker itself never talks to a recorder; it hands a small request
//! to whatever sink is plugged in. The channel sink feeds an external
//! consumer without ever blocking the tick loop.

use tokio::sync::mpsc;
use tracing::{info, warn};

/// A request to capture the last few seconds of gameplay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayRequest {
    pub match_id: Option<String>,
    pub event_type: String,
    pub enemy_name: Option<String>,
}

pub trait HighlightSink: Send {
    fn capture(&mut self, request: ReplayRequest);
}

/// Sink that only logs. The default when no recorder integration is wired.
#[derive(Debug, Default)]
pub struct LoggingSink;

impl HighlightSink for LoggingSink {
    fn capture(&mut self, request: ReplayRequest) {
        info!(
            event_type = %request.event_type,
            enemy = request.enemy_name.as_deref().unwrap_or("unknown"),
            "highlight moment"
        );
    }
}

/// Sink that forwards requests over a bounded channel. A full or closed
/// channel drops the request with a warning; capture is best-effort.
#[derive(Debug)]
pub struct ChannelSink {
    tx: mpsc::Sender<ReplayRequest>,
}

impl ChannelSink {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<ReplayRequest>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }
}

impl HighlightSink for ChannelSink {
    fn capture(&mut self, request: ReplayRequest) {
        if let Err(err) = self.tx.try_send(request) {
            warn!(%err, "dropping highlight request");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_sink_delivers() {
        let (mut sink, mut rx) = ChannelSink::new(4);
        sink.capture(ReplayRequest {
            match_id: Some("100".into()),
            event_type: "multikill".into(),
            enemy_name: Some("Axe".into()),
        });
        let got = rx.try_recv().unwrap();
        assert_eq!(got.event_type, "multikill");
    }

    #[test]
    fn test_channel_sink_drops_when_full() {
        let (mut sink, mut rx) = ChannelSink::new(1);
        let request = ReplayRequest {
            match_id: None,
            event_type: "multikill".into(),
            enemy_name: None,
        };
        sink.capture(request.clone());
        sink.capture(request.clone());
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());
    }
}
