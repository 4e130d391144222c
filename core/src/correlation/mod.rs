pub mod engine;
pub mod mapping;

pub use engine::{CorrelationEngine, EXTENDED_ABSENCE_SECS, LOCK_THRESHOLD, TickContext};
pub use mapping::{Mapping, MappingTable};
