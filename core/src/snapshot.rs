//! Serde model of the inbound GSI snapshot.
//!
//! Every top-level block is optional: the game omits blocks freely (no hero
//! before spawn, no kill list while spectating, etc.) and a missing block
//! must skip the corresponding tick sub-step rather than fail the tick.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use wardscry_types::{Position, VictimId, formatting::HERO_NAME_PREFIX};

/// Minimap icon value the game uses for hostile heroes.
pub const ENEMY_ICON: &str = "minimap_enemyicon";

/// One inbound game-state snapshot (one tick).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map: Option<MapBlock>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hero: Option<HeroBlock>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player: Option<PlayerBlock>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimap: Option<HashMap<String, MinimapEntity>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MapBlock {
    #[serde(default)]
    pub game_time: Option<f64>,
    #[serde(default)]
    pub game_state: Option<GameState>,
    #[serde(default, deserialize_with = "de_opt_string_or_number")]
    pub matchid: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HeroBlock {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub xpos: Option<f64>,
    #[serde(default)]
    pub ypos: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerBlock {
    #[serde(default)]
    pub kills: Option<u32>,
    #[serde(default)]
    pub deaths: Option<u32>,
    #[serde(default)]
    pub assists: Option<u32>,
    #[serde(default)]
    pub kill_list: Option<HashMap<String, u32>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MinimapEntity {
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub xpos: Option<f64>,
    #[serde(default)]
    pub ypos: Option<f64>,
}

/// The game rules state machine, as reported in `map.game_state`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    #[serde(rename = "DOTA_GAMERULES_STATE_INIT")]
    Init,
    #[serde(rename = "DOTA_GAMERULES_STATE_WAIT_FOR_PLAYERS_TO_LOAD")]
    WaitForPlayers,
    #[serde(rename = "DOTA_GAMERULES_STATE_HERO_SELECTION")]
    HeroSelection,
    #[serde(rename = "DOTA_GAMERULES_STATE_STRATEGY_TIME")]
    StrategyTime,
    #[serde(rename = "DOTA_GAMERULES_STATE_TEAM_SHOWCASE")]
    TeamShowcase,
    #[serde(rename = "DOTA_GAMERULES_STATE_PRE_GAME")]
    PreGame,
    #[serde(rename = "DOTA_GAMERULES_STATE_GAME_IN_PROGRESS")]
    InProgress,
    #[serde(rename = "DOTA_GAMERULES_STATE_POST_GAME")]
    PostGame,
    #[serde(other)]
    Unknown,
}

impl GameState {
    /// States before the match proper, where all tracking is reset.
    pub fn is_pre_game(self) -> bool {
        matches!(
            self,
            GameState::Init | GameState::WaitForPlayers | GameState::HeroSelection
        )
    }

    pub fn is_in_progress(self) -> bool {
        self == GameState::InProgress
    }
}

/// A hostile hero currently visible on the minimap.
#[derive(Debug, Clone, PartialEq)]
pub struct VisibleEnemy {
    pub name: String,
    pub position: Position,
}

impl MinimapEntity {
    /// An entity is a tracked hostile hero iff it carries the enemy icon and
    /// a hero-prefixed name.
    pub fn is_enemy_hero(&self) -> bool {
        self.image.as_deref() == Some(ENEMY_ICON)
            && self
                .name
                .as_deref()
                .is_some_and(|n| n.starts_with(HERO_NAME_PREFIX))
    }
}

impl Snapshot {
    pub fn game_state(&self) -> Option<GameState> {
        self.map.as_ref().and_then(|m| m.game_state)
    }

    pub fn game_time(&self) -> Option<f64> {
        self.map.as_ref().and_then(|m| m.game_time)
    }

    pub fn match_id(&self) -> Option<&str> {
        self.map.as_ref().and_then(|m| m.matchid.as_deref())
    }

    /// Observer (local hero) position, if the hero block carries one.
    pub fn observer_position(&self) -> Option<Position> {
        let hero = self.hero.as_ref()?;
        Some(Position::new(hero.xpos?, hero.ypos?))
    }

    /// Hostile heroes visible on the minimap this tick, sorted by name so
    /// downstream iteration never depends on map order.
    pub fn visible_enemies(&self) -> Option<Vec<VisibleEnemy>> {
        let minimap = self.minimap.as_ref()?;
        let mut enemies: Vec<VisibleEnemy> = minimap
            .values()
            .filter(|e| e.is_enemy_hero())
            .filter_map(|e| {
                Some(VisibleEnemy {
                    name: e.name.clone()?,
                    position: Position::new(e.xpos?, e.ypos?),
                })
            })
            .collect();
        enemies.sort_by(|a, b| a.name.cmp(&b.name));
        enemies.dedup_by(|a, b| a.name == b.name);
        Some(enemies)
    }

    /// Cumulative per-slot kill counters, if the kill list is present.
    /// Slots missing from the payload read as zero.
    pub fn kill_counters(&self) -> Option<[u32; VictimId::COUNT as usize]> {
        let list = self.player.as_ref()?.kill_list.as_ref()?;
        let mut counters = [0u32; VictimId::COUNT as usize];
        for (key, count) in list {
            if let Some(slot) = VictimId::from_key(key) {
                counters[slot.index()] = *count;
            }
        }
        Some(counters)
    }
}

/// GSI reports `matchid` as a string, but older dumps carry it as a number.
fn de_opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        S(String),
        N(u64),
    }

    let value = Option::<StringOrNumber>::deserialize(deserializer)?;
    Ok(value.map(|v| match v {
        StringOrNumber::S(s) => s,
        StringOrNumber::N(n) => n.to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "map": {
            "game_time": 612.4,
            "game_state": "DOTA_GAMERULES_STATE_GAME_IN_PROGRESS",
            "matchid": "7654321"
        },
        "hero": { "name": "npc_dota_hero_mirana", "xpos": -1200, "ypos": 300 },
        "player": {
            "kills": 3,
            "deaths": 1,
            "assists": 2,
            "kill_list": { "victimid_0": 1, "victimid_3": 2 }
        },
        "minimap": {
            "o52": { "image": "minimap_enemyicon", "name": "npc_dota_hero_axe", "xpos": 100, "ypos": 200 },
            "o53": { "image": "minimap_creepicon", "name": "npc_dota_creep", "xpos": 0, "ypos": 0 },
            "o54": { "image": "minimap_enemyicon", "name": "npc_dota_hero_lina", "xpos": -50, "ypos": 75 }
        }
    }"#;

    #[test]
    fn test_parse_full_snapshot() {
        let snap: Snapshot = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(snap.game_time(), Some(612.4));
        assert!(snap.game_state().unwrap().is_in_progress());
        assert_eq!(snap.match_id(), Some("7654321"));
        assert_eq!(
            snap.observer_position(),
            Some(Position::new(-1200.0, 300.0))
        );
    }

    #[test]
    fn test_visible_enemies_filters_and_sorts() {
        let snap: Snapshot = serde_json::from_str(SAMPLE).unwrap();
        let enemies = snap.visible_enemies().unwrap();
        let names: Vec<&str> = enemies.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["npc_dota_hero_axe", "npc_dota_hero_lina"]);
    }

    #[test]
    fn test_kill_counters_partial_list() {
        let snap: Snapshot = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(snap.kill_counters(), Some([1, 0, 0, 2, 0]));
    }

    #[test]
    fn test_empty_snapshot_is_fine() {
        let snap: Snapshot = serde_json::from_str("{}").unwrap();
        assert!(snap.game_state().is_none());
        assert!(snap.visible_enemies().is_none());
        assert!(snap.kill_counters().is_none());
    }

    #[test]
    fn test_unknown_game_state() {
        let snap: Snapshot =
            serde_json::from_str(r#"{"map": {"game_state": "DOTA_GAMERULES_STATE_CUSTOM"}}"#)
                .unwrap();
        assert_eq!(snap.game_state(), Some(GameState::Unknown));
    }

    #[test]
    fn test_numeric_matchid() {
        let snap: Snapshot = serde_json::from_str(r#"{"map": {"matchid": 42}}"#).unwrap();
        assert_eq!(snap.match_id(), Some("42"));
    }
}
