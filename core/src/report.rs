//! Human-readable output for everything the pipeline infers.
//!
//! Message construction is kept in free functions so it can be tested
//! without capturing log output; the handler only decides when to emit.

use tracing::{debug, info};
use wardscry_types::VictimId;
use wardscry_types::formatting::{confidence_qualifier, display_hero_name, format_confidence};

use crate::correlation::Mapping;
use crate::events::{GameSignal, SignalHandler};
use crate::state::MatchCache;

/// Game-clock seconds between mapping-table summaries.
const SUMMARY_INTERVAL_SECS: f64 = 60.0;

/// One line for a kill on a victim slot, hedged by mapping confidence and
/// carrying the slot's running total.
pub fn kill_message(
    victim_id: VictimId,
    delta: u32,
    total: u32,
    mapping: Option<&Mapping>,
) -> String {
    let times = if delta > 1 {
        format!(" x{delta}")
    } else {
        String::new()
    };
    match mapping {
        Some(m) => {
            let name = display_hero_name(&m.hero_name);
            match confidence_qualifier(m.confidence) {
                Some(qualifier) => format!(
                    "Killed {name}{times} ({qualifier}, {}), {total} total",
                    format_confidence(m.confidence)
                ),
                None => format!(
                    "Killed {name}{times} ({}), {total} total",
                    format_confidence(m.confidence)
                ),
            }
        }
        None => format!("Killed Unknown ({victim_id}){times}, {total} total"),
    }
}

/// Overall kill total, then one line per known hero with its attributed
/// kill count and confidence.
pub fn summary_lines(cache: &MatchCache) -> Vec<String> {
    let mut lines = vec![format!("total kills: {}", cache.kill_feed.total_kills())];
    for hero in cache.minimap.ordered() {
        lines.push(match cache.engine.victim_for(&hero.name) {
            Some(victim) => {
                let mapping = cache.engine.mapping_for(victim).expect("claim indexed");
                let lock = if mapping.locked { " [locked]" } else { "" };
                format!(
                    "{}: {} kills, {}{lock}",
                    hero.display_name,
                    cache.kill_feed.total(victim),
                    format_confidence(mapping.confidence),
                )
            }
            None => format!("{}: (unmapped)", hero.display_name),
        });
    }
    lines
}

#[derive(Debug, Default)]
pub struct Reporter {
    last_summary_at: Option<f64>,
}

impl Reporter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SignalHandler for Reporter {
    fn handle_signal(&mut self, signal: &GameSignal, cache: &MatchCache) {
        match signal {
            GameSignal::MatchStarted {
                match_id,
                timestamp,
            } => {
                info!(
                    match_id = match_id.as_deref().unwrap_or("unknown"),
                    game_time = timestamp,
                    "match started"
                );
            }
            GameSignal::TrackingReset => {
                info!("tracking reset");
                self.last_summary_at = None;
            }
            GameSignal::HeroDiscovered {
                display_name,
                timestamp,
                ..
            } => {
                info!(game_time = timestamp, "enemy spotted: {display_name}");
            }
            GameSignal::RosterComplete { heroes } => {
                let names: Vec<String> =
                    heroes.iter().map(|h| display_hero_name(h)).collect();
                info!("enemy roster complete: {}", names.join(", "));
            }
            GameSignal::HeroVanished { hero, timestamp } => {
                debug!(game_time = timestamp, "lost sight of {}", display_hero_name(hero));
            }
            GameSignal::KillRecorded {
                victim_id,
                delta,
                total,
                ..
            } => {
                info!(
                    "{}",
                    kill_message(*victim_id, *delta, *total, cache.engine.mapping_for(*victim_id))
                );
            }
            GameSignal::MappingEstablished {
                victim_id,
                hero,
                confidence,
            } => {
                debug!(
                    %victim_id,
                    confidence = format_confidence(*confidence),
                    "tentatively {}",
                    display_hero_name(hero)
                );
            }
            GameSignal::MappingConfirmed {
                victim_id,
                hero,
                confidence,
                locked,
            } => {
                info!(
                    %victim_id,
                    confidence = format_confidence(*confidence),
                    locked,
                    "confirmed as {}",
                    display_hero_name(hero)
                );
            }
            GameSignal::MappingReassigned {
                victim_id,
                hero,
                confidence,
                stolen_from,
                ..
            } => {
                info!(
                    %victim_id,
                    confidence = format_confidence(*confidence),
                    stolen_from = ?stolen_from,
                    "reassigned to {}",
                    display_hero_name(hero)
                );
            }
            GameSignal::MappingCorrected {
                victim_id,
                contradicted,
                replacement,
                ..
            } => match replacement {
                Some(hero) => info!(
                    %victim_id,
                    "{} seen alive, now guessing {}",
                    display_hero_name(contradicted),
                    display_hero_name(hero)
                ),
                None => info!(
                    %victim_id,
                    "{} seen alive, mapping dropped",
                    display_hero_name(contradicted)
                ),
            },
            GameSignal::AbsenceConfirmed {
                victim_id,
                hero,
                confidence,
                locked,
                ..
            } => {
                info!(
                    %victim_id,
                    confidence = format_confidence(*confidence),
                    locked,
                    "extended absence supports {}",
                    display_hero_name(hero)
                );
            }
            GameSignal::PlayerScoredKills { total, .. } => {
                debug!(total, "player kill");
            }
            GameSignal::PlayerDied { total_deaths, .. } => {
                debug!(total_deaths, "player died");
            }
            GameSignal::PlayerAssisted { total, .. } => {
                debug!(total, "player assist");
            }
        }
    }

    fn on_tick(&mut self, cache: &MatchCache) {
        let Some(now) = cache.game_time else {
            return;
        };
        let due = self
            .last_summary_at
            .is_none_or(|last| now - last >= SUMMARY_INTERVAL_SECS);
        if !due {
            return;
        }
        self.last_summary_at = Some(now);
        for line in summary_lines(cache) {
            info!("{line}");
        }
    }
}
