//! The correlation state machine.
//!
//! Kills arrive against anonymous victim slots; hero identities arrive on
//! the minimap. Nothing in the feed ever links the two, so the engine
//! maintains a best-effort bijection between slots and heroes, scored by
//! how well kill times line up with visibility transitions and how close
//! the action was to the observer.
//!
//! Evidence is retained for a short horizon so a kill can match a
//! disappearance seen a tick earlier (and vice versa: kills are observed
//! slightly after the actual death, so a disappearance may also trail the
//! kill notification). Every retained kill is re-scored each tick, but a
//! (kill, disappearance) pair acts on the table at most once; identical
//! consecutive snapshots therefore change nothing.
//!
//! Tick order is fixed: initial attribution, kill/disappearance
//! correlation, alive-contradiction correction, extended-absence
//! confirmation.

use std::collections::{BTreeMap, BTreeSet};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use wardscry_types::{Position, VictimId};

use crate::events::GameSignal;
use crate::tracking::minimap::MinimapTracker;
use crate::tracking::{DisappearanceEvent, KillEvent, KillFeedWatcher, PendingAbsence};

use super::mapping::{Mapping, MappingTable};

/// Confidence at which a mapping locks and resists ordinary reassignment.
pub const LOCK_THRESHOLD: f64 = 0.85;

/// Confidence assigned to a brand-new attribution.
const INITIAL_CONFIDENCE: f64 = 0.1;

/// Fraction of the match score added on a confirming disappearance.
const CONFIRM_GAIN: f64 = 0.2;

/// Floor of the acceptance threshold for correlation candidates.
const BASE_ACCEPT_THRESHOLD: f64 = 0.2;

/// How much weaker than the current confidence contrary evidence may be.
const CONTRARY_SLACK: f64 = 0.1;

/// Margin a candidate must clear over another slot's claim to steal its hero.
const STEAL_MARGIN: f64 = 0.2;

/// Ceiling for the confidence a bumped-out hero keeps after a steal.
const BUMPED_CONFIDENCE_CAP: f64 = 0.5;

/// Match window when the disappearance preceded the kill notification.
const PRE_KILL_WINDOW_SECS: f64 = 1.5;

/// Match window when the disappearance followed the kill notification.
const POST_KILL_WINDOW_SECS: f64 = 0.5;

/// Distance at which the proximity score reaches zero.
const PROXIMITY_RANGE: f64 = 1500.0;

/// A mapped hero seen alive within this long after the attributed kill
/// proves the mapping wrong.
const ALIVE_CONTRADICTION_WINDOW_SECS: f64 = 10.0;

/// Confidence drop applied when a contradicted slot is reassigned.
const CORRECTION_CONFIDENCE_DROP: f64 = 0.1;

/// Continuous absence longer than this triggers delayed confirmation.
pub const EXTENDED_ABSENCE_SECS: f64 = 5.0;

/// A kill within this distance of the absence start supports it.
const ABSENCE_KILL_WINDOW_SECS: f64 = 3.0;

const ABSENCE_BOOST: f64 = 0.35;
const ABSENCE_CONFIDENCE_CAP: f64 = 0.95;

/// How long kills and disappearances stay correlatable.
const EVIDENCE_RETENTION_SECS: f64 = 10.0;

#[derive(Debug, Clone, Copy)]
struct KillRecord {
    timestamp: f64,
    seq: u64,
}

#[derive(Debug, Clone)]
struct VanishRecord {
    hero_name: String,
    timestamp: f64,
    position: Option<Position>,
    seq: u64,
}

/// Per-tick inputs, borrowed from the match cache.
pub struct TickContext<'a> {
    pub kills: &'a [KillEvent],
    pub disappearances: &'a [DisappearanceEvent],
    pub expired_absences: &'a [PendingAbsence],
    pub minimap: &'a MinimapTracker,
    pub kill_feed: &'a KillFeedWatcher,
    pub visible: &'a BTreeSet<String>,
    pub observer: Option<Position>,
    pub game_time: f64,
}

#[derive(Debug)]
pub struct CorrelationEngine {
    mappings: MappingTable,
    recent_kills: BTreeMap<VictimId, KillRecord>,
    recent_vanishes: Vec<VanishRecord>,
    tick_seq: u64,
    rng: StdRng,
}

impl CorrelationEngine {
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            mappings: MappingTable::new(),
            recent_kills: BTreeMap::new(),
            recent_vanishes: Vec::new(),
            tick_seq: 0,
            rng: match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            },
        }
    }

    pub fn mapping_for(&self, victim_id: VictimId) -> Option<&Mapping> {
        self.mappings.get(victim_id)
    }

    pub fn victim_for(&self, hero_name: &str) -> Option<VictimId> {
        self.mappings.victim_for(hero_name)
    }

    pub fn table(&self) -> &MappingTable {
        &self.mappings
    }

    #[cfg(test)]
    pub(crate) fn table_mut(&mut self) -> &mut MappingTable {
        &mut self.mappings
    }

    /// Advance the state machine by one tick.
    pub fn tick(&mut self, ctx: &TickContext) -> Vec<GameSignal> {
        self.tick_seq += 1;
        self.ingest_evidence(ctx);

        let mut signals = Vec::new();
        self.assign_initial_mappings(ctx, &mut signals);
        self.correlate_kills(ctx, &mut signals);
        self.correct_alive_contradictions(ctx, &mut signals);
        self.confirm_extended_absences(ctx, &mut signals);
        signals
    }

    fn ingest_evidence(&mut self, ctx: &TickContext) {
        let seq = self.tick_seq;
        for kill in ctx.kills {
            self.recent_kills.insert(
                kill.victim_id,
                KillRecord {
                    timestamp: kill.timestamp,
                    seq,
                },
            );
        }
        for vanish in ctx.disappearances {
            self.recent_vanishes.push(VanishRecord {
                hero_name: vanish.hero_name.clone(),
                timestamp: vanish.timestamp,
                position: vanish.last_position,
                seq,
            });
        }

        let horizon = ctx.game_time - EVIDENCE_RETENTION_SECS;
        self.recent_kills.retain(|_, k| k.timestamp >= horizon);
        self.recent_vanishes.retain(|v| v.timestamp >= horizon);
    }

    /// Step 1: every just-recorded kill gets *some* attribution, however
    /// weak, so reporting never has to wait on evidence.
    fn assign_initial_mappings(&mut self, ctx: &TickContext, signals: &mut Vec<GameSignal>) {
        for kill in ctx.kills {
            if self.mappings.get(kill.victim_id).is_some() {
                continue;
            }

            let unmapped: Vec<&str> = ctx
                .minimap
                .ordered()
                .filter(|h| self.mappings.victim_for(&h.name).is_none())
                .map(|h| h.name.as_str())
                .collect();

            let hero = if unmapped.is_empty() {
                let Some(victim) = self.eviction_candidate(ctx) else {
                    continue; // no heroes known yet; the kill stays unattributed
                };
                let evicted = self.mappings.remove(victim).expect("candidate exists");
                evicted.hero_name
            } else {
                unmapped[self.rng.gen_range(0..unmapped.len())].to_string()
            };

            self.mappings.insert(Mapping::new(
                kill.victim_id,
                hero.clone(),
                INITIAL_CONFIDENCE,
                ctx.game_time,
            ));
            signals.push(GameSignal::MappingEstablished {
                victim_id: kill.victim_id,
                hero,
                confidence: INITIAL_CONFIDENCE,
            });
        }
    }

    /// Lowest-confidence unlocked mapping, ties broken by the mapping whose
    /// hero registered first. Locked pairings are never evicted; only the
    /// correction path may break a lock.
    fn eviction_candidate(&self, ctx: &TickContext) -> Option<VictimId> {
        let first_seen = |hero: &str| {
            ctx.minimap
                .get(hero)
                .map(|h| h.first_seen_at)
                .unwrap_or(f64::MAX)
        };
        self.mappings
            .iter()
            .filter(|m| !m.locked)
            .min_by(|a, b| {
                a.confidence
                    .total_cmp(&b.confidence)
                    .then_with(|| first_seen(&a.hero_name).total_cmp(&first_seen(&b.hero_name)))
            })
            .map(|m| m.victim_id)
    }

    /// Step 2: re-score every retained kill against every retained
    /// disappearance. Only pairs where one side is new this tick may act.
    fn correlate_kills(&mut self, ctx: &TickContext, signals: &mut Vec<GameSignal>) {
        let kills: Vec<(VictimId, KillRecord)> =
            self.recent_kills.iter().map(|(v, k)| (*v, *k)).collect();

        for (victim_id, kill) in kills {
            let Some((best_score, best_hero, best_seq)) = self.best_candidate(ctx, kill.timestamp)
            else {
                continue;
            };

            // A pair acts at most once; both sides persisting across ticks
            // must not compound the same evidence.
            if kill.seq != self.tick_seq && best_seq != self.tick_seq {
                continue;
            }

            let current = self.mappings.get(victim_id);
            let threshold = match current {
                Some(m) => BASE_ACCEPT_THRESHOLD.max(m.confidence - CONTRARY_SLACK),
                None => BASE_ACCEPT_THRESHOLD,
            };
            if best_score <= threshold {
                continue;
            }

            match current {
                Some(m) if m.hero_name == best_hero => {
                    let locked_before = m.locked;
                    let confidence = self
                        .mappings
                        .bump_confidence(victim_id, best_score * CONFIRM_GAIN, 1.0, ctx.game_time)
                        .expect("mapping exists");
                    if !locked_before && confidence >= LOCK_THRESHOLD {
                        self.mappings.lock(victim_id);
                    }
                    let locked = self.mappings.get(victim_id).map(|m| m.locked).unwrap_or(false);
                    signals.push(GameSignal::MappingConfirmed {
                        victim_id,
                        hero: best_hero,
                        confidence,
                        locked,
                    });
                }
                Some(m) if m.locked => {
                    // Locked slots take no reassignment, only the
                    // confirmation above.
                }
                _ => {
                    self.resolve_reassignment(victim_id, best_hero, best_score, ctx, signals);
                }
            }
        }
    }

    /// Best-scoring disappearance for a kill time. Strict comparison keeps
    /// the first candidate encountered on ties.
    fn best_candidate(&self, ctx: &TickContext, kill_ts: f64) -> Option<(f64, String, u64)> {
        let mut best: Option<(f64, &VanishRecord)> = None;
        for vanish in &self.recent_vanishes {
            let score = correlation_score(kill_ts, vanish, ctx.observer);
            if best.is_none_or(|(b, _)| score > b) {
                best = Some((score, vanish));
            }
        }
        best.map(|(score, v)| (score, v.hero_name.clone(), v.seq))
    }

    fn resolve_reassignment(
        &mut self,
        victim_id: VictimId,
        hero: String,
        score: f64,
        ctx: &TickContext,
        signals: &mut Vec<GameSignal>,
    ) {
        match self.mappings.victim_for(&hero) {
            None => {
                // Unclaimed hero: replace the attribution outright.
                let previous = self.mappings.remove(victim_id).map(|m| m.hero_name);
                self.install(victim_id, hero.clone(), score, ctx.game_time);
                let locked = score >= LOCK_THRESHOLD;
                signals.push(GameSignal::MappingReassigned {
                    victim_id,
                    previous,
                    hero,
                    confidence: score.clamp(0.0, 1.0),
                    locked,
                    stolen_from: None,
                });
            }
            Some(other_victim) if other_victim != victim_id => {
                let other = self.mappings.get(other_victim).expect("claim indexed");
                if other.locked || score <= other.confidence + STEAL_MARGIN {
                    return;
                }

                self.mappings.remove(other_victim);
                let bumped = self.mappings.remove(victim_id);
                self.install(victim_id, hero.clone(), score, ctx.game_time);
                signals.push(GameSignal::MappingReassigned {
                    victim_id,
                    previous: bumped.as_ref().map(|m| m.hero_name.clone()),
                    hero: hero.clone(),
                    confidence: score.clamp(0.0, 1.0),
                    locked: score >= LOCK_THRESHOLD,
                    stolen_from: Some(other_victim),
                });

                // The bumped-out hero takes over the vacated slot, demoted.
                if let Some(bumped) = bumped {
                    let confidence = bumped.confidence.min(BUMPED_CONFIDENCE_CAP);
                    self.mappings.insert(Mapping::new(
                        other_victim,
                        bumped.hero_name.clone(),
                        confidence,
                        ctx.game_time,
                    ));
                    signals.push(GameSignal::MappingReassigned {
                        victim_id: other_victim,
                        previous: Some(hero),
                        hero: bumped.hero_name,
                        confidence,
                        locked: false,
                        stolen_from: None,
                    });
                }
            }
            Some(_) => {}
        }
    }

    fn install(&mut self, victim_id: VictimId, hero: String, confidence: f64, now: f64) {
        self.mappings
            .insert(Mapping::new(victim_id, hero, confidence, now));
        if confidence >= LOCK_THRESHOLD {
            self.mappings.lock(victim_id);
        }
    }

    /// Step 3: a mapped hero visible on the minimap shortly after its
    /// attributed kill is provably alive; the mapping is wrong no matter
    /// how confident or locked it was.
    fn correct_alive_contradictions(&mut self, ctx: &TickContext, signals: &mut Vec<GameSignal>) {
        let victims: Vec<VictimId> = self.mappings.iter().map(|m| m.victim_id).collect();

        for victim_id in victims {
            let Some(kill_ts) = ctx.kill_feed.last_kill_at(victim_id) else {
                continue;
            };
            if ctx.game_time - kill_ts > ALIVE_CONTRADICTION_WINDOW_SECS {
                continue;
            }
            let hero_visible = self
                .mappings
                .get(victim_id)
                .is_some_and(|m| ctx.visible.contains(&m.hero_name));
            if !hero_visible {
                continue;
            }

            let old = self.mappings.remove(victim_id).expect("checked above");
            let replacement = self.nearest_invisible_hero(ctx);

            match replacement {
                Some(hero) => {
                    let confidence =
                        (old.confidence - CORRECTION_CONFIDENCE_DROP).clamp(0.0, 1.0);
                    self.mappings.insert(Mapping::new(
                        victim_id,
                        hero.clone(),
                        confidence,
                        ctx.game_time,
                    ));
                    signals.push(GameSignal::MappingCorrected {
                        victim_id,
                        contradicted: old.hero_name,
                        replacement: Some(hero),
                        confidence: Some(confidence),
                    });
                }
                None => {
                    signals.push(GameSignal::MappingCorrected {
                        victim_id,
                        contradicted: old.hero_name,
                        replacement: None,
                        confidence: None,
                    });
                }
            }
        }
    }

    /// Nearest currently-invisible unclaimed hero by distance from the
    /// observer; without an observer position, the first such hero in
    /// registration order.
    fn nearest_invisible_hero(&self, ctx: &TickContext) -> Option<String> {
        let mut candidates = ctx
            .minimap
            .ordered()
            .filter(|h| !ctx.visible.contains(&h.name))
            .filter(|h| self.mappings.victim_for(&h.name).is_none());

        match ctx.observer {
            Some(observer) => candidates
                .min_by(|a, b| {
                    observer
                        .distance_to(&a.last_position)
                        .total_cmp(&observer.distance_to(&b.last_position))
                })
                .map(|h| h.name.clone()),
            None => candidates.next().map(|h| h.name.clone()),
        }
    }

    /// Step 4: a hero missing for a long stretch corroborates the mapping
    /// whose kill lines up with the start of the absence.
    fn confirm_extended_absences(&mut self, ctx: &TickContext, signals: &mut Vec<GameSignal>) {
        for absence in ctx.expired_absences {
            let mut best: Option<(VictimId, f64)> = None;
            for (victim_id, kill) in &self.recent_kills {
                let Some(mapping) = self.mappings.get(*victim_id) else {
                    continue;
                };
                if mapping.locked {
                    continue;
                }
                let gap = (kill.timestamp - absence.since).abs();
                if gap <= ABSENCE_KILL_WINDOW_SECS
                    && best.is_none_or(|(_, b)| gap < b)
                {
                    best = Some((*victim_id, gap));
                }
            }

            let Some((victim_id, _)) = best else {
                continue;
            };
            let mapping = self.mappings.get(victim_id).expect("selected above");
            let old_confidence = mapping.confidence;
            let new_confidence = (old_confidence + ABSENCE_BOOST)
                .min(ABSENCE_CONFIDENCE_CAP)
                .clamp(0.0, 1.0);

            let mut hero = mapping.hero_name.clone();
            let mut reassigned = false;
            if new_confidence > old_confidence && hero != absence.hero_name {
                // Take the absent hero over, unless another slot holds a
                // locked claim on it.
                match self.mappings.victim_for(&absence.hero_name) {
                    Some(w) if self.mappings.get(w).is_some_and(|m| m.locked) => {}
                    other => {
                        if let Some(w) = other {
                            self.mappings.remove(w);
                        }
                        hero = absence.hero_name.clone();
                        reassigned = true;
                    }
                }
            }

            self.mappings.remove(victim_id);
            let locked = new_confidence >= LOCK_THRESHOLD;
            self.install(victim_id, hero.clone(), new_confidence, ctx.game_time);
            signals.push(GameSignal::AbsenceConfirmed {
                victim_id,
                hero,
                confidence: new_confidence,
                locked,
                reassigned,
            });
        }
    }
}

/// Combined time/proximity score in [0, 1] for one (kill, disappearance)
/// pair. Kills are observed slightly after the actual death, so the match
/// window is wider for disappearances that preceded the kill.
fn correlation_score(kill_ts: f64, vanish: &VanishRecord, observer: Option<Position>) -> f64 {
    let (dt, window) = if vanish.timestamp <= kill_ts {
        (kill_ts - vanish.timestamp, PRE_KILL_WINDOW_SECS)
    } else {
        (vanish.timestamp - kill_ts, POST_KILL_WINDOW_SECS)
    };
    let time_score = (1.0 - dt / window).max(0.0);

    match (observer, vanish.position) {
        (Some(observer), Some(position)) => {
            let proximity = (1.0 - observer.distance_to(&position) / PROXIMITY_RANGE).max(0.0);
            0.5 * time_score + 0.5 * proximity
        }
        _ => time_score,
    }
}
