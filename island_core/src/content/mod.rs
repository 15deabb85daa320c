//! Content packs - characters, schedules, rules and events authored as TOML.
//!
//! Loading content is kept apart from the decision logic: a [`ContentPack`]
//! only parses and hands definitions to the registry, resolver and tracker.
//! Every table is optional, so packs can be split by concern and combined
//! with [`ContentPack::extend`].

use std::path::{Path, PathBuf};

use island_rules::{CharacterId, CharacterRecord, MapLocation, WorldState};
use serde::Deserialize;
use thiserror::Error;

use crate::condition::ScheduleCondition;
use crate::events::{EventDefinition, EventRegistry, EventSource};
use crate::rival::{RivalPairDef, RivalStageEvent, RivalTracker, FINAL_STAGE};
use crate::schedule::{
    BehaviorEntry, MergeMode, OverrideRule, ResolverConfig, Schedule, ScheduleResolver,
    SpecialEntry,
};

/// The pack shipped with the crate: the island's cast and event catalogue.
const BUILTIN: &str = include_str!("builtin.toml");

/// Errors raised while loading content.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("failed to parse content: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("rival event {event} targets stage {stage}, expected 1..=5")]
    InvalidRivalStage { event: String, stage: u8 },
}

/// A base schedule as authored.
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleDef {
    pub character: CharacterId,
    #[serde(default = "default_schedule_name")]
    pub name: String,
    /// Start from the stock day at this location; `entries` then override it.
    #[serde(default)]
    pub home: Option<MapLocation>,
    #[serde(default)]
    pub entries: Vec<BehaviorEntry>,
    #[serde(default)]
    pub special: Vec<SpecialEntry>,
}

fn default_schedule_name() -> String {
    "base".to_string()
}

impl ScheduleDef {
    pub fn to_schedule(&self) -> Schedule {
        let authored = Schedule::from_parts(
            self.character.clone(),
            self.name.clone(),
            self.entries.iter().cloned(),
            self.special.iter().cloned(),
        );
        match self.home {
            Some(home) => {
                let mut schedule = Schedule::default_day(self.character.clone(), home)
                    .merge_with(&authored, MergeMode::Override);
                schedule.id = authored.id;
                schedule.name = authored.name;
                schedule
            }
            None => authored,
        }
    }
}

/// A conditional override rule as authored.
#[derive(Debug, Clone, Deserialize)]
pub struct RuleDef {
    pub character: CharacterId,
    pub name: String,
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub mode: MergeMode,
    pub condition: ScheduleCondition,
    #[serde(default)]
    pub entries: Vec<BehaviorEntry>,
    #[serde(default)]
    pub special: Vec<SpecialEntry>,
}

impl RuleDef {
    pub fn to_rule(&self) -> OverrideRule {
        let schedule = Schedule::from_parts(
            self.character.clone(),
            self.name.clone(),
            self.entries.iter().cloned(),
            self.special.iter().cloned(),
        );
        OverrideRule::new(self.condition.clone(), schedule)
            .with_mode(self.mode)
            .with_priority(self.priority)
    }
}

/// A parsed content pack.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ContentPack {
    pub resolver: ResolverConfig,
    pub characters: Vec<CharacterRecord>,
    pub schedules: Vec<ScheduleDef>,
    pub rules: Vec<RuleDef>,
    pub events: Vec<EventDefinition>,
    pub rival_pairs: Vec<RivalPairDef>,
    pub rival_events: Vec<RivalStageEvent>,
}

impl ContentPack {
    /// Parse a pack from TOML text.
    pub fn from_toml_str(input: &str) -> Result<Self, ContentError> {
        let pack: Self = toml::from_str(input)?;
        pack.validate()?;
        Ok(pack)
    }

    /// Read and parse a pack from a file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ContentError> {
        let path = path.as_ref();
        let input = std::fs::read_to_string(path).map_err(|source| ContentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&input)
    }

    /// The pack shipped with the crate.
    pub fn builtin() -> Result<Self, ContentError> {
        Self::from_toml_str(BUILTIN)
    }

    /// Append another pack's definitions. The resolver configuration of
    /// `self` is kept.
    pub fn extend(&mut self, other: ContentPack) {
        self.characters.extend(other.characters);
        self.schedules.extend(other.schedules);
        self.rules.extend(other.rules);
        self.events.extend(other.events);
        self.rival_pairs.extend(other.rival_pairs);
        self.rival_events.extend(other.rival_events);
    }

    fn validate(&self) -> Result<(), ContentError> {
        if let Some(event) = self
            .rival_events
            .iter()
            .find(|e| !(1..=FINAL_STAGE).contains(&e.stage))
        {
            return Err(ContentError::InvalidRivalStage {
                event: event.id.to_string(),
                stage: event.stage,
            });
        }
        Ok(())
    }

    /// Character records, ready to be added to a world.
    pub fn populate(&self, world: &mut WorldState) {
        for character in &self.characters {
            world.add_character(character.clone());
        }
    }

    pub fn build_registry(&self) -> EventRegistry {
        EventRegistry::from_source(self)
    }

    pub fn build_tracker(&self) -> RivalTracker {
        RivalTracker::from_definitions(&self.rival_pairs, &self.rival_events)
    }

    /// A resolver with every schedule bound and every rule attached.
    pub fn build_resolver(&self) -> ScheduleResolver {
        let mut resolver = ScheduleResolver::with_config(self.resolver.clone());
        for def in &self.schedules {
            resolver.bind(def.to_schedule());
        }
        for def in &self.rules {
            resolver.add_rule(&def.character, def.to_rule());
        }
        resolver
    }
}

impl EventSource for ContentPack {
    fn events(&self) -> &[EventDefinition] {
        &self.events
    }

    fn rival_pairs(&self) -> &[RivalPairDef] {
        &self.rival_pairs
    }

    fn rival_events(&self) -> &[RivalStageEvent] {
        &self.rival_events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use island_rules::{EventId, TimeOfDay, WorldView};

    const PACK: &str = r#"
        [resolver]
        default_appearance = "idle"

        [[characters]]
        id = "char_02"
        name = "Cook"
        favorite_items = ["fish"]
        [characters.capabilities]
        has_romance = true
        shop = "Cook"

        [[schedules]]
        character = "char_02"
        home = "Beach"

        [[schedules.entries]]
        time_of_day = "Noon"
        location = "River"
        status = "Fishing."

        [[rules]]
        character = "char_02"
        name = "festival"
        priority = 10
        mode = "Replace"
        condition = { flag = "festival" }

        [[rules.entries]]
        time_of_day = "Evening"
        location = "Mountain"

        [[events]]
        id = "cook_heart1"
        name = "Cook heart 1"
        scenario = "Cook_Heart1"
        priority = 100
        condition = { character = "char_02", min_romance = 20 }

        [[rival_pairs]]
        main = "char_02"
        rival = "rival_02"

        [[rival_events]]
        id = "rival_cook_heart1"
        name = "Rival cook heart 1"
        scenario = "Rival_Cook_Heart1"
        main = "char_02"
        rival = "rival_02"
        stage = 1
        trigger_day = 30
    "#;

    #[test]
    fn test_parse_pack() {
        let pack = ContentPack::from_toml_str(PACK).unwrap();
        assert_eq!(pack.resolver.default_appearance, "idle");
        assert!(pack.resolver.validate_on_bind);
        assert_eq!(pack.characters.len(), 1);
        assert_eq!(pack.events.len(), 1);
        assert!(pack.events[0].one_shot);
        assert_eq!(pack.events[0].condition.min_romance, Some(20));
    }

    #[test]
    fn test_empty_pack() {
        let pack = ContentPack::from_toml_str("").unwrap();
        assert!(pack.events.is_empty());
        assert!(pack.build_registry().is_empty());
    }

    #[test]
    fn test_home_fills_stock_day() {
        let pack = ContentPack::from_toml_str(PACK).unwrap();
        let schedule = pack.schedules[0].to_schedule();

        assert!(schedule.is_complete());
        assert_eq!(schedule.name, "base");
        assert_eq!(schedule.entry(TimeOfDay::Noon).unwrap().location, MapLocation::River);
        assert_eq!(schedule.entry(TimeOfDay::Morning).unwrap().location, MapLocation::Beach);
    }

    #[test]
    fn test_build_components() {
        let pack = ContentPack::from_toml_str(PACK).unwrap();
        let mut world = WorldState::new();
        pack.populate(&mut world);
        let cook = CharacterId::new("char_02");
        assert!(world.relationship(&cook).is_some());

        let registry = pack.build_registry();
        assert!(registry.contains(&EventId::new("cook_heart1")));

        let tracker = pack.build_tracker();
        assert_eq!(tracker.pair(&cook).unwrap().stage(), 0);
        assert_eq!(tracker.events().len(), 1);

        let resolver = pack.build_resolver();
        world.flags.set("festival", true);
        let effective = resolver.resolve(&cook, &world).unwrap();
        assert_eq!(effective.len(), 1);
        assert_eq!(effective.name, "festival");
    }

    #[test]
    fn test_invalid_rival_stage_is_rejected() {
        let input = r#"
            [[rival_events]]
            id = "bad"
            name = "Bad"
            scenario = "Bad"
            main = "char_01"
            rival = "rival_01"
            stage = 6
            trigger_day = 10
        "#;
        assert!(matches!(
            ContentPack::from_toml_str(input),
            Err(ContentError::InvalidRivalStage { stage: 6, .. })
        ));
    }

    #[test]
    fn test_syntax_error() {
        assert!(matches!(
            ContentPack::from_toml_str("[[events]\nid ="),
            Err(ContentError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            ContentPack::from_path("/nonexistent/pack.toml"),
            Err(ContentError::Io { .. })
        ));
    }

    #[test]
    fn test_extend() {
        let mut pack = ContentPack::from_toml_str(PACK).unwrap();
        let extra = ContentPack::from_toml_str(
            r#"
            [[events]]
            id = "beach"
            name = "Beach"
            scenario = "Beach"
            condition = { location = "Beach", min_day = 1 }
            "#,
        )
        .unwrap();
        pack.extend(extra);
        assert_eq!(pack.build_registry().len(), 2);
    }
}
