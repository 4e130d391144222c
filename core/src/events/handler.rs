use crate::events::GameSignal;
use crate::state::MatchCache;

/// Downstream observers of the tick pipeline (reporter, streak tracker,
/// highlight dispatch). Handlers read engine state but never mutate it;
/// the cache reference is shared for exactly that reason.
pub trait SignalHandler: Send {
    fn handle_signal(&mut self, signal: &GameSignal, cache: &MatchCache);

    /// Called once per processed in-progress tick, after all signals.
    fn on_tick(&mut self, _cache: &MatchCache) {}
}
