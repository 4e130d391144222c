pub mod absence;
pub mod kill_feed;
pub mod minimap;

pub use absence::{DisappearanceDetector, DisappearanceEvent, PendingAbsence};
pub use kill_feed::{KillEvent, KillFeedWatcher};
pub use minimap::{HeroIdentity, MinimapTracker};
