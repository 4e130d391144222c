pub mod cache;

pub use cache::{MatchCache, PlayerScore};
