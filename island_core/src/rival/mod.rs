//! Rival courtship progression.
//!
//! Each romanceable character may be paired with a rival who courts them on a
//! fixed timetable. A pair climbs five stages (three hearts, confession,
//! marriage) as day-indexed [`RivalStageEvent`]s come due:
//!
//! ```text
//! 0 ──▶ 1 ──▶ 2 ──▶ 3 ──▶ 4 ──▶ 5 (married)
//! ```
//!
//! Stages only move forward and stage 5 is terminal.

mod tracker;

pub use tracker::*;

use island_rules::{CharacterId, EventId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The terminal stage. Reaching it marries the pair.
pub const FINAL_STAGE: u8 = 5;

/// Declares that `rival` courts `main`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RivalPairDef {
    pub main: CharacterId,
    pub rival: CharacterId,
}

impl RivalPairDef {
    /// Declare that `rival` courts `main`.
    pub fn new(main: impl Into<CharacterId>, rival: impl Into<CharacterId>) -> Self {
        Self {
            main: main.into(),
            rival: rival.into(),
        }
    }
}

/// Progress of one rival pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RivalPair {
    pub main: CharacterId,
    pub rival: CharacterId,
    stage: u8,
    married: bool,
}

impl RivalPair {
    /// A pair that has not started courting.
    pub fn new(main: impl Into<CharacterId>, rival: impl Into<CharacterId>) -> Self {
        Self {
            main: main.into(),
            rival: rival.into(),
            stage: 0,
            married: false,
        }
    }

    pub fn stage(&self) -> u8 {
        self.stage
    }

    pub fn is_married(&self) -> bool {
        self.married
    }

    /// Whether the pair may still move forward, ignoring the player.
    pub fn is_open(&self) -> bool {
        !self.married && self.stage < FINAL_STAGE
    }

    /// Description of the current stage.
    pub fn stage_description(&self) -> &'static str {
        match self.stage {
            0 => "Not started",
            1 => "Heart 1",
            2 => "Heart 2",
            3 => "Heart 3",
            4 => "Confession",
            _ if self.married => "Married",
            _ => "About to marry",
        }
    }

    /// Move to `stage`. Reaching the final stage marries the pair.
    pub(crate) fn set_stage(&mut self, stage: u8) {
        self.stage = stage.min(FINAL_STAGE);
        if self.stage == FINAL_STAGE {
            self.married = true;
        }
    }

    /// Overwrite progress from a saved record, keeping the stage in range
    /// and pinning married pairs to the final stage.
    pub(crate) fn restore(&mut self, stage: i64, married: bool) {
        self.stage = stage.clamp(0, FINAL_STAGE as i64) as u8;
        self.married = married;
        if married {
            self.stage = FINAL_STAGE;
        }
    }
}

/// A day-indexed rival event that moves a pair to `stage`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RivalStageEvent {
    pub id: EventId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Dialogue scenario played when the stage is reached.
    pub scenario: String,
    pub main: CharacterId,
    pub rival: CharacterId,
    /// Target stage, 1 through 5.
    pub stage: u8,
    /// Earliest day (inclusive) on which the event can fire.
    pub trigger_day: u32,
}

impl RivalStageEvent {
    /// A stage event with no scenario, named after its id.
    pub fn new(
        id: impl Into<EventId>,
        main: impl Into<CharacterId>,
        rival: impl Into<CharacterId>,
        stage: u8,
        trigger_day: u32,
    ) -> Self {
        let id = id.into();
        Self {
            name: id.to_string(),
            description: String::new(),
            scenario: String::new(),
            id,
            main: main.into(),
            rival: rival.into(),
            stage,
            trigger_day,
        }
    }

    /// Set the display name. Defaults to the id.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the scenario played when the stage is reached.
    pub fn with_scenario(mut self, scenario: impl Into<String>) -> Self {
        self.scenario = scenario.into();
        self
    }
}

/// A rejected stage change.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RivalError {
    #[error("no rival pair for main character {0}")]
    UnknownPair(CharacterId),

    #[error("rival pair for {0} is already married")]
    AlreadyMarried(CharacterId),

    #[error("stage {0} is outside 1..=5")]
    StageOutOfRange(u8),

    #[error("stage {requested} does not advance past current stage {current}")]
    NotForward { current: u8, requested: u8 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_pair_starts_at_zero() {
        let pair = RivalPair::new("char_01", "rival_01");
        assert_eq!(pair.stage(), 0);
        assert!(!pair.is_married());
        assert!(pair.is_open());
        assert_eq!(pair.stage_description(), "Not started");
    }

    #[test]
    fn test_final_stage_marries() {
        let mut pair = RivalPair::new("char_01", "rival_01");
        pair.set_stage(4);
        assert_eq!(pair.stage_description(), "Confession");
        pair.set_stage(FINAL_STAGE);
        assert!(pair.is_married());
        assert!(!pair.is_open());
        assert_eq!(pair.stage_description(), "Married");
    }

    #[test]
    fn test_restore_normalizes() {
        let mut pair = RivalPair::new("char_02", "rival_02");
        pair.restore(-3, false);
        assert_eq!(pair.stage(), 0);

        pair.restore(42, false);
        assert_eq!(pair.stage(), FINAL_STAGE);
        assert!(!pair.is_married());
        assert_eq!(pair.stage_description(), "About to marry");

        pair.restore(2, true);
        assert_eq!(pair.stage(), FINAL_STAGE);
        assert!(pair.is_married());
    }

    #[test]
    fn test_error_messages() {
        let err = RivalError::NotForward {
            current: 3,
            requested: 2,
        };
        assert_eq!(
            err.to_string(),
            "stage 2 does not advance past current stage 3"
        );
    }
}
