//! Day-driven advancement of every rival pair.

use std::collections::BTreeMap;

use island_rules::{CharacterId, EventId, WorldView};

use super::{RivalError, RivalPair, RivalPairDef, RivalStageEvent, FINAL_STAGE};

/// A stage change that has come due and is waiting to be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RivalTransition {
    pub event: EventId,
    pub main: CharacterId,
    pub rival: CharacterId,
    pub from: u8,
    pub to: u8,
    pub scenario: String,
}

/// A persisted snapshot of one pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RivalPairState {
    pub main: CharacterId,
    pub rival: CharacterId,
    pub stage: i64,
    pub married: bool,
}

/// Owns every rival pair of a session and the timetable that moves them.
#[derive(Debug, Clone, Default)]
pub struct RivalTracker {
    /// Keyed by main character.
    pairs: BTreeMap<CharacterId, RivalPair>,
    /// Sorted by trigger day, then stage.
    events: Vec<RivalStageEvent>,
}

impl RivalTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tracker with every pair at stage 0.
    pub fn from_definitions<'a>(
        pairs: impl IntoIterator<Item = &'a RivalPairDef>,
        events: impl IntoIterator<Item = &'a RivalStageEvent>,
    ) -> Self {
        let mut tracker = Self::new();
        for def in pairs {
            tracker.add_pair(def.main.clone(), def.rival.clone());
        }
        for event in events {
            tracker.add_event(event.clone());
        }
        tracker
    }

    /// Register a pair. A second pair for the same main character is dropped.
    pub fn add_pair(&mut self, main: CharacterId, rival: CharacterId) -> bool {
        if self.pairs.contains_key(&main) {
            tracing::warn!(main = %main, rival = %rival, "duplicate rival pair; keeping the first");
            return false;
        }
        self.pairs.insert(main.clone(), RivalPair::new(main, rival));
        true
    }

    /// Register a stage event. Events with an out-of-range stage are dropped.
    pub fn add_event(&mut self, event: RivalStageEvent) -> bool {
        if !(1..=FINAL_STAGE).contains(&event.stage) {
            tracing::warn!(event = %event.id, stage = event.stage, "rival event stage out of range");
            return false;
        }
        if self.events.iter().any(|e| e.id == event.id) {
            tracing::warn!(event = %event.id, "duplicate rival event id; keeping the first");
            return false;
        }
        let key = (event.trigger_day, event.stage);
        let index = self
            .events
            .partition_point(|e| (e.trigger_day, e.stage) <= key);
        self.events.insert(index, event);
        true
    }

    pub fn pair(&self, main: &CharacterId) -> Option<&RivalPair> {
        self.pairs.get(main)
    }

    /// Pairs in main-character order.
    pub fn pairs(&self) -> impl Iterator<Item = &RivalPair> {
        self.pairs.values()
    }

    /// Stage events in timetable order.
    pub fn events(&self) -> &[RivalStageEvent] {
        &self.events
    }

    /// Stage events for one main character.
    pub fn events_for(&self, main: &CharacterId) -> impl Iterator<Item = &RivalStageEvent> + '_ {
        let main = main.clone();
        self.events.iter().filter(move |e| e.main == main)
    }

    pub fn is_married(&self, main: &CharacterId) -> bool {
        self.pairs.get(main).is_some_and(RivalPair::is_married)
    }

    /// Whether the pair could move forward in this world.
    pub fn can_advance<W: WorldView + ?Sized>(&self, pair: &RivalPair, world: &W) -> bool {
        pair.is_open() && world.player_spouse() != Some(&pair.main)
    }

    /// Transitions that have come due, at most one per pair.
    ///
    /// A stage event is due once its day has arrived and the pair sits
    /// exactly one stage below it. Pairs whose main character is married
    /// (to the rival or to the player) never move.
    pub fn eligible_transitions<W: WorldView + ?Sized>(&self, world: &W) -> Vec<RivalTransition> {
        let day = world.day();
        let mut due: Vec<RivalTransition> = Vec::new();

        for event in &self.events {
            if event.trigger_day > day {
                break;
            }
            let Some(pair) = self.pairs.get(&event.main) else {
                continue;
            };
            if event.rival != pair.rival {
                tracing::warn!(
                    event = %event.id,
                    rival = %event.rival,
                    expected = %pair.rival,
                    "rival event names a different rival than its pair; skipping"
                );
                continue;
            }
            if !self.can_advance(pair, world) || pair.stage() + 1 != event.stage {
                continue;
            }
            if due.iter().any(|t| t.main == pair.main) {
                continue;
            }
            due.push(RivalTransition {
                event: event.id.clone(),
                main: pair.main.clone(),
                rival: pair.rival.clone(),
                from: pair.stage(),
                to: event.stage,
                scenario: event.scenario.clone(),
            });
        }

        if !due.is_empty() {
            tracing::debug!(day, count = due.len(), "rival transitions due");
        }
        due
    }

    /// Move a pair forward to `stage`.
    pub fn advance(&mut self, main: &CharacterId, stage: u8) -> Result<&RivalPair, RivalError> {
        if !(1..=FINAL_STAGE).contains(&stage) {
            return Err(RivalError::StageOutOfRange(stage));
        }
        let pair = self
            .pairs
            .get_mut(main)
            .ok_or_else(|| RivalError::UnknownPair(main.clone()))?;
        if pair.is_married() {
            return Err(RivalError::AlreadyMarried(main.clone()));
        }
        if stage <= pair.stage() {
            return Err(RivalError::NotForward {
                current: pair.stage(),
                requested: stage,
            });
        }

        pair.set_stage(stage);
        if pair.is_married() {
            tracing::info!(main = %pair.main, rival = %pair.rival, "rival pair married");
        } else {
            tracing::info!(main = %pair.main, stage, "rival stage advanced");
        }
        Ok(pair)
    }

    /// Apply transitions returned by [`eligible_transitions`](Self::eligible_transitions).
    /// Transitions that no longer apply are logged and skipped.
    pub fn apply(&mut self, transitions: &[RivalTransition]) -> usize {
        let mut applied = 0;
        for transition in transitions {
            match self.advance(&transition.main, transition.to) {
                Ok(_) => applied += 1,
                Err(err) => {
                    tracing::warn!(event = %transition.event, %err, "rival transition skipped");
                }
            }
        }
        applied
    }

    /// Day-tick entry point: find due transitions and apply them.
    pub fn on_day_advanced<W: WorldView + ?Sized>(&mut self, world: &W) -> Vec<RivalTransition> {
        let due = self.eligible_transitions(world);
        self.apply(&due);
        due
    }

    /// Snapshot every pair for saving.
    pub fn records(&self) -> Vec<RivalPairState> {
        self.pairs
            .values()
            .map(|pair| RivalPairState {
                main: pair.main.clone(),
                rival: pair.rival.clone(),
                stage: pair.stage() as i64,
                married: pair.is_married(),
            })
            .collect()
    }

    /// Replace all pair progress with saved records. Pairs without a record
    /// start over at stage 0; records for pairs that are not defined are
    /// skipped. Returns the number restored.
    pub fn restore<'a>(&mut self, records: impl IntoIterator<Item = &'a RivalPairState>) -> usize {
        self.reset();
        let mut restored = 0;
        for record in records {
            match self.pairs.get_mut(&record.main) {
                Some(pair) => {
                    if pair.rival != record.rival {
                        tracing::warn!(
                            main = %record.main,
                            saved = %record.rival,
                            current = %pair.rival,
                            "saved rival differs from content; keeping content rival"
                        );
                    }
                    pair.restore(record.stage, record.married);
                    restored += 1;
                }
                None => {
                    tracing::warn!(main = %record.main, "saved rival pair is no longer defined; skipping");
                }
            }
        }
        restored
    }

    /// Put every pair back at stage 0.
    pub fn reset(&mut self) {
        for pair in self.pairs.values_mut() {
            pair.restore(0, false);
        }
    }

    /// Multi-line status for debug output.
    pub fn summary(&self) -> String {
        self.pairs
            .values()
            .map(|pair| {
                let mut line = format!("{}: {}", pair.main, pair.stage_description());
                if pair.is_married() {
                    line.push_str(&format!(" [married to {}]", pair.rival));
                }
                line
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
