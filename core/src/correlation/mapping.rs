//! Bidirectional victim-slot to hero mapping storage.
//!
//! Both lookup directions live in one table so they can never disagree:
//! every mutation goes through methods that maintain the bijection, and
//! confidence is clamped to [0, 1] before storage.

use std::collections::BTreeMap;

use wardscry_types::VictimId;

/// The engine's belief that a victim slot corresponds to a hero.
#[derive(Debug, Clone, PartialEq)]
pub struct Mapping {
    pub victim_id: VictimId,
    pub hero_name: String,
    pub confidence: f64,
    pub locked: bool,
    pub last_updated_at: f64,
}

impl Mapping {
    pub fn new(victim_id: VictimId, hero_name: String, confidence: f64, now: f64) -> Self {
        Self {
            victim_id,
            hero_name,
            confidence: confidence.clamp(0.0, 1.0),
            locked: false,
            last_updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MappingTable {
    by_victim: BTreeMap<VictimId, Mapping>,
    by_hero: BTreeMap<String, VictimId>,
}

impl MappingTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, victim_id: VictimId) -> Option<&Mapping> {
        self.by_victim.get(&victim_id)
    }

    /// The slot a hero is currently claimed by, if any.
    pub fn victim_for(&self, hero_name: &str) -> Option<VictimId> {
        self.by_hero.get(hero_name).copied()
    }

    /// Mappings in ascending victim-slot order.
    pub fn iter(&self) -> impl Iterator<Item = &Mapping> {
        self.by_victim.values()
    }

    pub fn len(&self) -> usize {
        self.by_victim.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_victim.is_empty()
    }

    /// Insert a mapping. The slot must be vacant and the hero unclaimed;
    /// callers clear conflicts first so displacement stays an explicit step.
    pub fn insert(&mut self, mapping: Mapping) {
        debug_assert!(!self.by_victim.contains_key(&mapping.victim_id));
        debug_assert!(!self.by_hero.contains_key(&mapping.hero_name));
        self.by_hero
            .insert(mapping.hero_name.clone(), mapping.victim_id);
        self.by_victim.insert(mapping.victim_id, mapping);
    }

    pub fn remove(&mut self, victim_id: VictimId) -> Option<Mapping> {
        let mapping = self.by_victim.remove(&victim_id)?;
        self.by_hero.remove(&mapping.hero_name);
        Some(mapping)
    }

    /// Raise a mapping's confidence by `amount`, clamped to `[0, cap]`.
    /// Returns the new confidence.
    pub fn bump_confidence(
        &mut self,
        victim_id: VictimId,
        amount: f64,
        cap: f64,
        now: f64,
    ) -> Option<f64> {
        let mapping = self.by_victim.get_mut(&victim_id)?;
        mapping.confidence = (mapping.confidence + amount).clamp(0.0, cap.min(1.0));
        mapping.last_updated_at = now;
        Some(mapping.confidence)
    }

    pub fn lock(&mut self, victim_id: VictimId) {
        if let Some(mapping) = self.by_victim.get_mut(&victim_id) {
            mapping.locked = true;
        }
    }

    /// Both directions agree and all confidences are in range. Cheap enough
    /// to assert after every tick in tests.
    pub fn is_consistent(&self) -> bool {
        self.by_victim.len() == self.by_hero.len()
            && self.by_victim.values().all(|m| {
                (0.0..=1.0).contains(&m.confidence)
                    && self.by_hero.get(&m.hero_name) == Some(&m.victim_id)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(id: u8) -> VictimId {
        VictimId::new(id).unwrap()
    }

    #[test]
    fn test_insert_remove_roundtrip() {
        let mut table = MappingTable::new();
        table.insert(Mapping::new(slot(2), "npc_dota_hero_axe".into(), 0.4, 10.0));
        assert_eq!(table.victim_for("npc_dota_hero_axe"), Some(slot(2)));
        assert!(table.is_consistent());

        let removed = table.remove(slot(2)).unwrap();
        assert_eq!(removed.hero_name, "npc_dota_hero_axe");
        assert_eq!(table.victim_for("npc_dota_hero_axe"), None);
        assert!(table.is_consistent());
    }

    #[test]
    fn test_confidence_clamped_on_construction() {
        let m = Mapping::new(slot(0), "h".into(), 1.7, 0.0);
        assert_eq!(m.confidence, 1.0);
        let m = Mapping::new(slot(0), "h".into(), -0.3, 0.0);
        assert_eq!(m.confidence, 0.0);
    }

    #[test]
    fn test_bump_respects_cap() {
        let mut table = MappingTable::new();
        table.insert(Mapping::new(slot(1), "h".into(), 0.9, 0.0));
        let conf = table.bump_confidence(slot(1), 0.3, 0.95, 1.0).unwrap();
        assert_eq!(conf, 0.95);
        let conf = table.bump_confidence(slot(1), 0.3, 2.0, 2.0).unwrap();
        assert_eq!(conf, 1.0);
    }
}
