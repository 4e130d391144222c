//! Shared plain types for WARDSCRY.
//!
//! Everything here is serde-friendly and free of engine logic so it can be
//! used by the core, the CLI, and any future frontends without pulling in
//! the correlation machinery.

pub mod formatting;

use serde::{Deserialize, Serialize};

/// One of the five anonymized kill-feed counters (IDs 0-4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VictimId(u8);

impl VictimId {
    /// Number of victim slots in the kill feed.
    pub const COUNT: u8 = 5;

    /// All five slots in ascending order.
    pub const ALL: [VictimId; 5] = [
        VictimId(0),
        VictimId(1),
        VictimId(2),
        VictimId(3),
        VictimId(4),
    ];

    /// Construct a slot ID, returning `None` outside the fixed 0-4 range.
    pub fn new(id: u8) -> Option<Self> {
        (id < Self::COUNT).then_some(Self(id))
    }

    /// Parse a GSI kill-list key of the form `victimid_3`.
    ///
    /// # Examples
    /// ```
    /// use wardscry_types::VictimId;
    /// assert_eq!(VictimId::from_key("victimid_2"), VictimId::new(2));
    /// assert_eq!(VictimId::from_key("victimid_9"), None);
    /// assert_eq!(VictimId::from_key("courier_0"), None);
    /// ```
    pub fn from_key(key: &str) -> Option<Self> {
        let suffix = key.strip_prefix("victimid_")?;
        suffix.parse::<u8>().ok().and_then(Self::new)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for VictimId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "slot {}", self.0)
    }
}

/// A 2D map position in world units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another position.
    ///
    /// # Examples
    /// ```
    /// use wardscry_types::Position;
    /// let a = Position::new(0.0, 0.0);
    /// let b = Position::new(3.0, 4.0);
    /// assert_eq!(a.distance_to(&b), 5.0);
    /// ```
    pub fn distance_to(&self, other: &Position) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_victim_id_range() {
        assert!(VictimId::new(0).is_some());
        assert!(VictimId::new(4).is_some());
        assert!(VictimId::new(5).is_none());
    }

    #[test]
    fn test_victim_id_key_roundtrip() {
        for slot in VictimId::ALL {
            let key = format!("victimid_{}", slot.index());
            assert_eq!(VictimId::from_key(&key), Some(slot));
        }
    }

    #[test]
    fn test_victim_id_serde_transparent() {
        let json = serde_json::to_string(&VictimId::new(3).unwrap()).unwrap();
        assert_eq!(json, "3");
    }

    #[test]
    fn test_distance_zero() {
        let p = Position::new(1200.0, -340.0);
        assert_eq!(p.distance_to(&p), 0.0);
    }
}
