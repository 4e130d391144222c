use wardscry_types::VictimId;

/// Signals emitted by the per-tick pipeline for cross-cutting concerns.
/// These represent "interesting things that happened" at a higher level
/// than raw snapshot fields. All timestamps are the in-match game clock.
#[derive(Debug, Clone)]
pub enum GameSignal {
    // Match lifecycle
    MatchStarted {
        match_id: Option<String>,
        timestamp: f64,
    },
    TrackingReset,

    // Minimap registry
    HeroDiscovered {
        hero: String,
        display_name: String,
        timestamp: f64,
    },
    RosterComplete {
        heroes: Vec<String>,
    },
    HeroVanished {
        hero: String,
        timestamp: f64,
    },

    // Kill feed
    KillRecorded {
        victim_id: VictimId,
        delta: u32,
        total: u32,
        timestamp: f64,
    },

    // Correlation state changes
    MappingEstablished {
        victim_id: VictimId,
        hero: String,
        confidence: f64,
    },
    MappingConfirmed {
        victim_id: VictimId,
        hero: String,
        confidence: f64,
        locked: bool,
    },
    MappingReassigned {
        victim_id: VictimId,
        previous: Option<String>,
        hero: String,
        confidence: f64,
        locked: bool,
        stolen_from: Option<VictimId>,
    },
    MappingCorrected {
        victim_id: VictimId,
        contradicted: String,
        replacement: Option<String>,
        confidence: Option<f64>,
    },
    AbsenceConfirmed {
        victim_id: VictimId,
        hero: String,
        confidence: f64,
        locked: bool,
        reassigned: bool,
    },

    // Local player scoreboard
    PlayerScoredKills {
        delta: u32,
        total: u32,
        timestamp: f64,
    },
    PlayerDied {
        total_deaths: u32,
        timestamp: f64,
    },
    PlayerAssisted {
        delta: u32,
        total: u32,
        timestamp: f64,
    },
}
