//! Turns raw snapshots into game signals.
//!
//! One snapshot is one tick. The processor owns the fixed tick order:
//! lifecycle checks, minimap registry, visibility diff, kill-feed diff,
//! player scoreboard diff, then the correlation engine. Missing snapshot
//! blocks skip their sub-step; they never fail the tick.

use crate::correlation::{EXTENDED_ABSENCE_SECS, TickContext};
use crate::snapshot::Snapshot;
use crate::state::MatchCache;

use super::GameSignal;

#[derive(Debug, Default)]
pub struct EventProcessor {
    reset_announced: bool,
}

impl EventProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn process_snapshot(
        &mut self,
        snapshot: &Snapshot,
        cache: &mut MatchCache,
    ) -> Vec<GameSignal> {
        let mut signals = Vec::new();

        // Lifecycle first: draft and loading screens clear everything from
        // the previous match, exactly once per transition.
        if let Some(state) = snapshot.game_state() {
            if state.is_pre_game() {
                if !self.reset_announced {
                    self.reset_announced = true;
                    cache.reset();
                    signals.push(GameSignal::TrackingReset);
                }
                return signals;
            }
            if !state.is_in_progress() {
                return signals;
            }
        } else {
            return signals;
        }
        self.reset_announced = false;

        let Some(game_time) = snapshot.game_time() else {
            return signals;
        };

        // A new match id mid-stream means the reset states were never seen
        // (client restarted into a running game, say).
        let match_id = snapshot.match_id().map(str::to_owned);
        if match_id != cache.match_id {
            if cache.match_id.is_some() {
                cache.reset();
            }
            cache.match_id = match_id.clone();
            signals.push(GameSignal::MatchStarted {
                match_id,
                timestamp: game_time,
            });
        }
        cache.game_time = Some(game_time);

        // Minimap registry and visibility transitions. Without a minimap
        // block the previous visible set carries over unchanged.
        let mut disappearances = Vec::new();
        if let Some(enemies) = snapshot.visible_enemies() {
            signals.extend(cache.minimap.update(&enemies, game_time));
            let visible = enemies.iter().map(|e| e.name.clone()).collect();
            disappearances = cache.absences.diff(&visible, game_time, &cache.minimap);
            for event in &disappearances {
                signals.push(GameSignal::HeroVanished {
                    hero: event.hero_name.clone(),
                    timestamp: event.timestamp,
                });
            }
        }

        let mut kills = Vec::new();
        if let Some(counters) = snapshot.kill_counters() {
            kills = cache.kill_feed.diff(counters, game_time);
            for kill in &kills {
                signals.push(GameSignal::KillRecorded {
                    victim_id: kill.victim_id,
                    delta: kill.count_delta,
                    total: cache.kill_feed.total(kill.victim_id),
                    timestamp: kill.timestamp,
                });
            }
        }

        if let Some(player) = &snapshot.player {
            signals.extend(diff_scoreboard(player, cache, game_time));
        }

        let expired = cache
            .absences
            .take_expired(game_time, EXTENDED_ABSENCE_SECS);

        let engine_signals = cache.engine.tick(&TickContext {
            kills: &kills,
            disappearances: &disappearances,
            expired_absences: &expired,
            minimap: &cache.minimap,
            kill_feed: &cache.kill_feed,
            visible: cache.absences.visible(),
            observer: snapshot.observer_position(),
            game_time,
        });
        signals.extend(engine_signals);

        signals
    }
}

/// Diff the local player's cumulative scoreboard counters. Decreases are
/// swallowed the same way the kill feed swallows them.
fn diff_scoreboard(
    player: &crate::snapshot::PlayerBlock,
    cache: &mut MatchCache,
    game_time: f64,
) -> Vec<GameSignal> {
    let mut signals = Vec::new();

    if let Some(kills) = player.kills {
        if kills > cache.player.kills {
            signals.push(GameSignal::PlayerScoredKills {
                delta: kills - cache.player.kills,
                total: kills,
                timestamp: game_time,
            });
        }
        cache.player.kills = kills;
    }
    if let Some(deaths) = player.deaths {
        if deaths > cache.player.deaths {
            signals.push(GameSignal::PlayerDied {
                total_deaths: deaths,
                timestamp: game_time,
            });
        }
        cache.player.deaths = deaths;
    }
    if let Some(assists) = player.assists {
        if assists > cache.player.assists {
            signals.push(GameSignal::PlayerAssisted {
                delta: assists - cache.player.assists,
                total: assists,
                timestamp: game_time,
            });
        }
        cache.player.assists = assists;
    }

    signals
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wardscry_types::VictimId;

    fn snapshot(value: serde_json::Value) -> Snapshot {
        serde_json::from_value(value).unwrap()
    }

    fn in_progress_map(game_time: f64) -> serde_json::Value {
        json!({
            "game_time": game_time,
            "game_state": "DOTA_GAMERULES_STATE_GAME_IN_PROGRESS",
            "matchid": "100"
        })
    }

    fn minimap_with(heroes: &[(&str, f64, f64)]) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        for (i, (name, x, y)) in heroes.iter().enumerate() {
            map.insert(
                format!("o{i}"),
                json!({
                    "image": "minimap_enemyicon",
                    "name": name,
                    "xpos": x,
                    "ypos": y
                }),
            );
        }
        serde_json::Value::Object(map)
    }

    #[test]
    fn test_pre_game_resets_once() {
        let mut processor = EventProcessor::new();
        let mut cache = MatchCache::new(Some(1));
        cache.match_id = Some("99".into());

        let draft = snapshot(json!({
            "map": { "game_state": "DOTA_GAMERULES_STATE_HERO_SELECTION" }
        }));
        let signals = processor.process_snapshot(&draft, &mut cache);
        assert!(matches!(signals[..], [GameSignal::TrackingReset]));
        assert_eq!(cache.match_id, None);

        // Staying in the draft does not re-announce
        assert!(processor.process_snapshot(&draft, &mut cache).is_empty());
    }

    #[test]
    fn test_match_id_change_resets_mid_stream() {
        let mut processor = EventProcessor::new();
        let mut cache = MatchCache::new(Some(1));

        let first = snapshot(json!({ "map": in_progress_map(10.0) }));
        let signals = processor.process_snapshot(&first, &mut cache);
        assert!(matches!(
            signals[..],
            [GameSignal::MatchStarted { .. }]
        ));
        assert_eq!(cache.match_id.as_deref(), Some("100"));

        let second = snapshot(json!({
            "map": {
                "game_time": 5.0,
                "game_state": "DOTA_GAMERULES_STATE_GAME_IN_PROGRESS",
                "matchid": "200"
            }
        }));
        let signals = processor.process_snapshot(&second, &mut cache);
        assert!(matches!(
            signals[..],
            [GameSignal::MatchStarted { .. }]
        ));
        assert_eq!(cache.match_id.as_deref(), Some("200"));
        assert!(cache.minimap.is_empty());
    }

    #[test]
    fn test_kill_and_vanish_flow_through_to_mapping() {
        let mut processor = EventProcessor::new();
        let mut cache = MatchCache::new(Some(1));

        // Tick 1: Axe visible
        let tick1 = snapshot(json!({
            "map": in_progress_map(10.0),
            "minimap": minimap_with(&[("npc_dota_hero_axe", 100.0, 200.0)])
        }));
        let signals = processor.process_snapshot(&tick1, &mut cache);
        assert!(signals.iter().any(|s| matches!(
            s,
            GameSignal::HeroDiscovered { display_name, .. } if display_name == "Axe"
        )));

        // Tick 2: Axe gone, kill on slot 0 in the same snapshot
        let tick2 = snapshot(json!({
            "map": in_progress_map(10.5),
            "minimap": {},
            "player": { "kill_list": { "victimid_0": 1 } }
        }));
        let signals = processor.process_snapshot(&tick2, &mut cache);
        assert!(signals.iter().any(|s| matches!(
            s,
            GameSignal::HeroVanished { hero, .. } if hero == "npc_dota_hero_axe"
        )));
        assert!(signals.iter().any(|s| matches!(
            s,
            GameSignal::KillRecorded { delta: 1, total: 1, .. }
        )));

        let mapping = cache.engine.mapping_for(VictimId::new(0).unwrap()).unwrap();
        assert_eq!(mapping.hero_name, "npc_dota_hero_axe");
        assert!(mapping.confidence > 0.1);
    }

    #[test]
    fn test_duplicate_snapshot_is_inert() {
        let mut processor = EventProcessor::new();
        let mut cache = MatchCache::new(Some(1));

        let tick = snapshot(json!({
            "map": in_progress_map(30.0),
            "minimap": minimap_with(&[("npc_dota_hero_axe", 0.0, 0.0)]),
            "player": {
                "kills": 2,
                "kill_list": { "victimid_1": 1 }
            }
        }));
        processor.process_snapshot(&tick, &mut cache);

        let mapping = cache.engine.mapping_for(VictimId::new(1).unwrap()).cloned();
        let signals = processor.process_snapshot(&tick, &mut cache);
        assert!(signals.is_empty());
        assert_eq!(
            cache.engine.mapping_for(VictimId::new(1).unwrap()).cloned(),
            mapping
        );
    }

    #[test]
    fn test_missing_game_time_skips_tick() {
        let mut processor = EventProcessor::new();
        let mut cache = MatchCache::new(Some(1));

        let tick = snapshot(json!({
            "map": { "game_state": "DOTA_GAMERULES_STATE_GAME_IN_PROGRESS" },
            "player": { "kill_list": { "victimid_0": 1 } }
        }));
        assert!(processor.process_snapshot(&tick, &mut cache).is_empty());
        assert_eq!(cache.kill_feed.total_kills(), 0);
    }

    #[test]
    fn test_scoreboard_diffs() {
        let mut processor = EventProcessor::new();
        let mut cache = MatchCache::new(Some(1));

        let tick = snapshot(json!({
            "map": in_progress_map(60.0),
            "player": { "kills": 1, "deaths": 0, "assists": 2 }
        }));
        let signals = processor.process_snapshot(&tick, &mut cache);
        assert!(signals.iter().any(|s| matches!(
            s,
            GameSignal::PlayerScoredKills { delta: 1, total: 1, .. }
        )));
        assert!(signals.iter().any(|s| matches!(
            s,
            GameSignal::PlayerAssisted { delta: 2, total: 2, .. }
        )));
        assert!(
            !signals
                .iter()
                .any(|s| matches!(s, GameSignal::PlayerDied { .. }))
        );
        assert_eq!(cache.player.kills, 1);
        assert_eq!(cache.player.assists, 2);
    }
}
