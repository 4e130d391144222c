//! WARDSCRY core: enemy identity inference from anonymized game-state
//! snapshots.
//!
//! The pipeline is snapshot-in, signals-out. [`session::MatchSession`]
//! owns one end-to-end instance: the [`events::EventProcessor`] diffs each
//! snapshot against the [`state::MatchCache`], the
//! [`correlation::CorrelationEngine`] maintains the victim-slot to hero
//! mapping table, and [`events::SignalHandler`]s consume the resulting
//! [`events::GameSignal`]s for reporting, streak announcements, and
//! highlight capture.

pub mod config;
pub mod correlation;
pub mod error;
pub mod events;
pub mod highlight;
pub mod reader;
pub mod report;
pub mod session;
pub mod snapshot;
pub mod snapshot_log;
pub mod state;
pub mod streak;
pub mod tracking;


pub use config::Settings;
pub use error::CoreError;
pub use session::MatchSession;
pub use snapshot::Snapshot;
