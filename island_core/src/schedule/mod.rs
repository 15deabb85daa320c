//! Character schedules - one behavior per time-of-day band.
//!
//! A [`Schedule`] is content data. Once loaded it is never edited; folding a
//! conditional schedule into a base one always yields a new instance through
//! [`Schedule::merge_with`].

mod resolver;
mod rules;

pub use resolver::*;
pub use rules::*;

use island_rules::{CharacterId, EventId, MapLocation, TimeOfDay};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Namespace for schedule identities.
const SCHEDULE_NAMESPACE: Uuid = Uuid::from_u128(0x6f1c_2a4e_93b7_4d0e_8a55_0c3e_b1f4_7d21);

/// Stable identity of a schedule.
///
/// Derived from content rather than drawn at random so that resolving the same
/// inputs twice produces identical schedules, ids included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ScheduleId(pub Uuid);

impl ScheduleId {
    /// Identity of a named schedule owned by a character.
    pub fn for_schedule(character: &CharacterId, name: &str) -> Self {
        let key = format!("{}/{}", character, name);
        Self(Uuid::new_v5(&SCHEDULE_NAMESPACE, key.as_bytes()))
    }

    /// Identity of the schedule produced by folding `overlay` into `base`.
    pub fn merged(base: ScheduleId, overlay: ScheduleId) -> Self {
        Self(Uuid::new_v5(&base.0, overlay.0.as_bytes()))
    }
}

impl std::fmt::Display for ScheduleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a character stands on screen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Position {
    Preset(PositionPreset),
    /// Normalized screen coordinates.
    Custom { x: f32, y: f32 },
}

impl Default for Position {
    fn default() -> Self {
        Position::Preset(PositionPreset::CenterNear)
    }
}

/// Named screen slots, by column and depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PositionPreset {
    LeftNear,
    #[default]
    CenterNear,
    RightNear,
    LeftMiddle,
    CenterMiddle,
    RightMiddle,
    LeftFar,
    CenterFar,
    RightFar,
}

/// What a character is doing during one time-of-day band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehaviorEntry {
    pub time_of_day: TimeOfDay,
    /// Whether the character is on the map at all.
    #[serde(default = "default_true")]
    pub present: bool,
    #[serde(default)]
    pub location: MapLocation,
    #[serde(default)]
    pub position: Position,
    /// Sprite variant, e.g. `"normal"` or `"sleep"`.
    #[serde(default = "default_appearance")]
    pub appearance: String,
    #[serde(default = "default_true")]
    pub interactable: bool,
    /// Dialogue scenario played when the character is tapped.
    #[serde(default)]
    pub scenario: Option<String>,
    #[serde(default)]
    pub status: String,
}

fn default_true() -> bool {
    true
}

fn default_appearance() -> String {
    "normal".to_string()
}

impl BehaviorEntry {
    /// A present, interactable entry with neutral appearance.
    pub fn new(time_of_day: TimeOfDay, location: MapLocation) -> Self {
        Self {
            time_of_day,
            present: true,
            location,
            position: Position::default(),
            appearance: default_appearance(),
            interactable: true,
            scenario: None,
            status: String::new(),
        }
    }

    /// An entry for a character who is off the map.
    pub fn absent(time_of_day: TimeOfDay) -> Self {
        Self {
            present: false,
            interactable: false,
            ..Self::new(time_of_day, MapLocation::default())
        }
    }

    /// Set the on-screen position.
    pub fn with_position(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    /// Place at a preset position.
    pub fn at(self, preset: PositionPreset) -> Self {
        self.with_position(Position::Preset(preset))
    }

    /// Set the sprite variant.
    pub fn with_appearance(mut self, appearance: impl Into<String>) -> Self {
        self.appearance = appearance.into();
        self
    }

    /// Set the scenario played when tapped.
    pub fn with_scenario(mut self, scenario: impl Into<String>) -> Self {
        self.scenario = Some(scenario.into());
        self
    }

    /// Set the status line.
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    /// Set whether the player can tap the character.
    pub fn interactable(mut self, interactable: bool) -> Self {
        self.interactable = interactable;
        self
    }
}

/// Behavior that replaces the time-of-day lookup while an event is active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecialEntry {
    pub event: EventId,
    pub behavior: BehaviorEntry,
}

/// An identified, named set of behavior entries for one character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub id: ScheduleId,
    pub character: CharacterId,
    pub name: String,
    entries: Vec<BehaviorEntry>,
    special: Vec<SpecialEntry>,
}

impl Schedule {
    /// Create an empty schedule.
    pub fn new(character: impl Into<CharacterId>, name: impl Into<String>) -> Self {
        let character = character.into();
        let name = name.into();
        Self {
            id: ScheduleId::for_schedule(&character, &name),
            character,
            name,
            entries: Vec::new(),
            special: Vec::new(),
        }
    }

    /// Add an entry, replacing any entry for the same time of day.
    pub fn with_entry(mut self, entry: BehaviorEntry) -> Self {
        self.set_entry(entry);
        self
    }

    /// Add a special-case entry, replacing any entry for the same event.
    pub fn with_special(mut self, event: impl Into<EventId>, behavior: BehaviorEntry) -> Self {
        self.set_special(event.into(), behavior);
        self
    }

    /// Build a schedule from loose entries. Later duplicates win.
    pub fn from_parts(
        character: impl Into<CharacterId>,
        name: impl Into<String>,
        entries: impl IntoIterator<Item = BehaviorEntry>,
        special: impl IntoIterator<Item = SpecialEntry>,
    ) -> Self {
        let mut schedule = Self::new(character, name);
        for entry in entries {
            schedule.set_entry(entry);
        }
        for SpecialEntry { event, behavior } in special {
            schedule.set_special(event, behavior);
        }
        schedule
    }

    /// The stock day: asleep at early morning and midnight, out at `home`
    /// for the rest of the day.
    pub fn default_day(character: impl Into<CharacterId>, home: MapLocation) -> Self {
        Self::new(character, "default")
            .with_entry(BehaviorEntry::absent(TimeOfDay::EarlyMorning).with_appearance("sleep"))
            .with_entry(
                BehaviorEntry::new(TimeOfDay::Morning, home)
                    .at(PositionPreset::LeftNear)
                    .with_status("Good morning!"),
            )
            .with_entry(
                BehaviorEntry::new(TimeOfDay::Noon, home)
                    .at(PositionPreset::CenterMiddle)
                    .with_status("Lunch time!"),
            )
            .with_entry(
                BehaviorEntry::new(TimeOfDay::Evening, home)
                    .at(PositionPreset::RightNear)
                    .with_status("Evening already."),
            )
            .with_entry(BehaviorEntry::absent(TimeOfDay::Midnight).with_appearance("sleep"))
    }

    fn set_entry(&mut self, entry: BehaviorEntry) {
        match self
            .entries
            .iter_mut()
            .find(|existing| existing.time_of_day == entry.time_of_day)
        {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    fn set_special(&mut self, event: EventId, behavior: BehaviorEntry) {
        match self.special.iter_mut().find(|existing| existing.event == event) {
            Some(existing) => existing.behavior = behavior,
            None => self.special.push(SpecialEntry { event, behavior }),
        }
    }

    /// Entries in authoring order.
    pub fn entries(&self) -> &[BehaviorEntry] {
        &self.entries
    }

    pub fn special_entries(&self) -> &[SpecialEntry] {
        &self.special
    }

    /// Entry for a time of day, if authored.
    pub fn entry(&self, time_of_day: TimeOfDay) -> Option<&BehaviorEntry> {
        self.entries.iter().find(|e| e.time_of_day == time_of_day)
    }

    /// Special-case entry for an event, if authored.
    pub fn special(&self, event: &EventId) -> Option<&BehaviorEntry> {
        self.special
            .iter()
            .find(|s| &s.event == event)
            .map(|s| &s.behavior)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Time-of-day bands with no entry. Empty for a complete schedule.
    pub fn validate(&self) -> Vec<TimeOfDay> {
        TimeOfDay::ALL
            .into_iter()
            .filter(|time| self.entry(*time).is_none())
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.validate().is_empty()
    }

    /// Fold `overlay` into this schedule.
    ///
    /// - `Replace`: the result is `overlay` itself
    /// - `Override`: every overlay entry replaces the base entry for the same
    ///   time of day (or event), or is appended when the base has none
    pub fn merge_with(&self, overlay: &Schedule, mode: MergeMode) -> Schedule {
        match mode {
            MergeMode::Replace => overlay.clone(),
            MergeMode::Override => {
                let mut merged = self.clone();
                merged.id = ScheduleId::merged(self.id, overlay.id);
                merged.name = format!("{}+{}", self.name, overlay.name);
                for entry in &overlay.entries {
                    merged.set_entry(entry.clone());
                }
                for special in &overlay.special {
                    merged.set_special(special.event.clone(), special.behavior.clone());
                }
                merged
            }
        }
    }
}
