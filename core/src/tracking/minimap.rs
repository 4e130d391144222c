//! Registry of known enemy hero identities and their last observed positions.

use std::collections::BTreeMap;

use wardscry_types::{Position, formatting::display_hero_name};

use crate::events::GameSignal;
use crate::snapshot::VisibleEnemy;

/// Number of heroes on the enemy team.
const ENEMY_TEAM_SIZE: usize = 5;

/// An enemy hero seen at least once on the minimap. Never deleted during
/// a match; `last_position` is refreshed on every visible tick.
#[derive(Debug, Clone, PartialEq)]
pub struct HeroIdentity {
    pub name: String,
    pub display_name: String,
    pub last_position: Position,
    pub first_seen_at: f64,
}

#[derive(Debug, Clone, Default)]
pub struct MinimapTracker {
    heroes: BTreeMap<String, HeroIdentity>,
    roster_announced: bool,
}

impl MinimapTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register discoveries and refresh positions for every visible hero.
    /// A tick with no enemies is a no-op.
    pub fn update(&mut self, visible: &[VisibleEnemy], game_time: f64) -> Vec<GameSignal> {
        let mut signals = Vec::new();

        for enemy in visible {
            match self.heroes.get_mut(&enemy.name) {
                Some(hero) => hero.last_position = enemy.position,
                None => {
                    let display_name = display_hero_name(&enemy.name);
                    self.heroes.insert(
                        enemy.name.clone(),
                        HeroIdentity {
                            name: enemy.name.clone(),
                            display_name: display_name.clone(),
                            last_position: enemy.position,
                            first_seen_at: game_time,
                        },
                    );
                    signals.push(GameSignal::HeroDiscovered {
                        hero: enemy.name.clone(),
                        display_name,
                        timestamp: game_time,
                    });
                }
            }
        }

        if !self.roster_announced && self.heroes.len() >= ENEMY_TEAM_SIZE {
            self.roster_announced = true;
            signals.push(GameSignal::RosterComplete {
                heroes: self.ordered().map(|h| h.name.clone()).collect(),
            });
        }

        signals
    }

    pub fn get(&self, name: &str) -> Option<&HeroIdentity> {
        self.heroes.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.heroes.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.heroes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heroes.is_empty()
    }

    /// Heroes in registration order (first-seen time, then name). All
    /// fallback selection in the correlation engine iterates this way so
    /// outcomes never depend on incidental container order.
    pub fn ordered(&self) -> impl Iterator<Item = &HeroIdentity> {
        let mut heroes: Vec<&HeroIdentity> = self.heroes.values().collect();
        heroes.sort_by(|a, b| {
            a.first_seen_at
                .total_cmp(&b.first_seen_at)
                .then_with(|| a.name.cmp(&b.name))
        });
        heroes.into_iter()
    }
}
