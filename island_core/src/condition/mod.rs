//! Condition evaluation - pure predicates over a world snapshot.
//!
//! Two predicate families live here:
//! - [`EventCondition`]: the eligibility test attached to every event definition
//! - [`ScheduleCondition`]: the test guarding a conditional schedule override
//!
//! Both follow the same rules:
//! 1. Every configured sub-check must hold (AND)
//! 2. A condition with no sub-checks configured never holds
//! 3. Evaluation reads the world and nothing else

mod rule;

pub use rule::*;

use island_rules::{
    CharacterId, ConstructionId, EventId, ItemId, MapLocation, TimeOfDay, Weather, WorldView,
};
use serde::{Deserialize, Serialize};

/// Who and where a query is made for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryContext {
    /// The character being talked to, if any.
    pub character: Option<CharacterId>,
    /// The location being entered, if any.
    pub location: Option<MapLocation>,
}

impl QueryContext {
    /// Context for an unfiltered query.
    pub fn any() -> Self {
        Self::default()
    }

    /// Context for talking to a character.
    pub fn character(id: impl Into<CharacterId>) -> Self {
        Self {
            character: Some(id.into()),
            location: None,
        }
    }

    /// Context for entering a location.
    pub fn location(location: MapLocation) -> Self {
        Self {
            character: None,
            location: Some(location),
        }
    }

    /// Add a location to the context.
    pub fn at(mut self, location: MapLocation) -> Self {
        self.location = Some(location);
        self
    }
}

/// A quantity of an item the player must hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRequirement {
    pub item: ItemId,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

impl ItemRequirement {
    pub fn new(item: impl Into<ItemId>, quantity: u32) -> Self {
        Self {
            item: item.into(),
            quantity,
        }
    }
}

/// The first sub-check that failed during evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConditionMiss {
    /// No sub-check is configured.
    Unconfigured,
    /// The condition is bound to a different character.
    Character,
    /// The queried character does not exist in the world.
    UnknownCharacter(CharacterId),
    Friendship { required: u8, actual: u8 },
    Romance { required: u8, actual: u8 },
    Weather,
    TimeOfDay,
    Day { required: u32, actual: u32 },
    Item(ItemId),
    Construction(ConstructionId),
    Location,
}

/// Conditions an event needs to be eligible.
///
/// Every field is an opt-in check; `None` or an empty list leaves it off.
/// Prerequisites are declared here but enforced by the trigger service, which
/// owns the triggered-event set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventCondition {
    /// Only fires when talking to this character.
    pub character: Option<CharacterId>,
    pub min_friendship: Option<u8>,
    pub min_romance: Option<u8>,
    pub weather: Option<Weather>,
    pub time_of_day: Option<TimeOfDay>,
    /// Earliest day (inclusive).
    pub min_day: Option<u32>,
    /// Only fires at this location.
    pub location: Option<MapLocation>,
    pub required_items: Vec<ItemRequirement>,
    pub required_constructions: Vec<ConstructionId>,
    /// Events that must already have triggered.
    pub prerequisites: Vec<EventId>,
}

impl EventCondition {
    /// Create an empty condition. It will not pass until a check is added.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind to a character.
    pub fn for_character(mut self, id: impl Into<CharacterId>) -> Self {
        self.character = Some(id.into());
        self
    }

    /// Require friendship with the queried character of at least `value`.
    pub fn with_min_friendship(mut self, value: u8) -> Self {
        self.min_friendship = Some(value);
        self
    }

    /// Require romance with the queried character of at least `value`.
    pub fn with_min_romance(mut self, value: u8) -> Self {
        self.min_romance = Some(value);
        self
    }

    /// Only fire in this weather.
    pub fn with_weather(mut self, weather: Weather) -> Self {
        self.weather = Some(weather);
        self
    }

    /// Only fire during this time-of-day band.
    pub fn with_time_of_day(mut self, time_of_day: TimeOfDay) -> Self {
        self.time_of_day = Some(time_of_day);
        self
    }

    /// Earliest day (inclusive) the event can fire.
    pub fn with_min_day(mut self, day: u32) -> Self {
        self.min_day = Some(day);
        self
    }

    /// Bind to a location.
    pub fn at_location(mut self, location: MapLocation) -> Self {
        self.location = Some(location);
        self
    }

    /// Require `quantity` of an item in the inventory.
    pub fn with_item(mut self, item: impl Into<ItemId>, quantity: u32) -> Self {
        self.required_items.push(ItemRequirement::new(item, quantity));
        self
    }

    /// Require a built structure.
    pub fn with_construction(mut self, construction: impl Into<ConstructionId>) -> Self {
        self.required_constructions.push(construction.into());
        self
    }

    /// Require another event to have triggered first.
    pub fn with_prerequisite(mut self, event: impl Into<EventId>) -> Self {
        self.prerequisites.push(event.into());
        self
    }

    /// Whether at least one check is configured.
    pub fn is_configured(&self) -> bool {
        self.character.is_some()
            || self.min_friendship.is_some()
            || self.min_romance.is_some()
            || self.weather.is_some()
            || self.time_of_day.is_some()
            || self.min_day.is_some()
            || self.location.is_some()
            || !self.required_items.is_empty()
            || !self.required_constructions.is_empty()
            || !self.prerequisites.is_empty()
    }

    /// Evaluate against the world, returning the first failing check.
    ///
    /// Relationship thresholds apply to the queried character and are skipped
    /// when the query names none. A required location only rejects a query
    /// that carries a different location.
    pub fn check<W: WorldView + ?Sized>(
        &self,
        world: &W,
        context: &QueryContext,
    ) -> Result<(), ConditionMiss> {
        if !self.is_configured() {
            return Err(ConditionMiss::Unconfigured);
        }

        if let Some(required) = &self.character {
            if context.character.as_ref() != Some(required) {
                return Err(ConditionMiss::Character);
            }
        }

        if let Some(target) = &context.character {
            if self.min_friendship.is_some() || self.min_romance.is_some() {
                let relationship = world
                    .relationship(target)
                    .ok_or_else(|| ConditionMiss::UnknownCharacter(target.clone()))?;

                if let Some(required) = self.min_friendship {
                    if relationship.friendship < required {
                        return Err(ConditionMiss::Friendship {
                            required,
                            actual: relationship.friendship,
                        });
                    }
                }

                if let Some(required) = self.min_romance {
                    if relationship.romance < required {
                        return Err(ConditionMiss::Romance {
                            required,
                            actual: relationship.romance,
                        });
                    }
                }
            }
        }

        if let Some(weather) = self.weather {
            if world.weather() != weather {
                return Err(ConditionMiss::Weather);
            }
        }

        if let Some(time_of_day) = self.time_of_day {
            if world.time_of_day() != time_of_day {
                return Err(ConditionMiss::TimeOfDay);
            }
        }

        if let Some(required) = self.min_day {
            let actual = world.day();
            if actual < required {
                return Err(ConditionMiss::Day { required, actual });
            }
        }

        if let Some(missing) = self
            .required_items
            .iter()
            .find(|req| !world.has_item(&req.item, req.quantity))
        {
            return Err(ConditionMiss::Item(missing.item.clone()));
        }

        if let Some(missing) = self
            .required_constructions
            .iter()
            .find(|id| !world.has_construction(id))
        {
            return Err(ConditionMiss::Construction(missing.clone()));
        }

        if let (Some(required), Some(current)) = (self.location, context.location) {
            if required != current {
                return Err(ConditionMiss::Location);
            }
        }

        Ok(())
    }

    /// Evaluate against the world. Unconfigured conditions are logged and fail.
    pub fn evaluate<W: WorldView + ?Sized>(&self, world: &W, context: &QueryContext) -> bool {
        match self.check(world, context) {
            Ok(()) => true,
            Err(ConditionMiss::Unconfigured) => {
                tracing::warn!("event condition has no checks configured; treating as unmet");
                false
            }
            Err(_) => false,
        }
    }

    /// Human-readable summary of the configured checks.
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();

        if let Some(character) = &self.character {
            parts.push(format!("character: {}", character));
        }
        if let Some(value) = self.min_friendship {
            parts.push(format!("friendship >= {}", value));
        }
        if let Some(value) = self.min_romance {
            parts.push(format!("romance >= {}", value));
        }
        if let Some(weather) = self.weather {
            parts.push(format!("weather: {}", weather.label()));
        }
        if let Some(time_of_day) = self.time_of_day {
            parts.push(format!("time: {}", time_of_day.label()));
        }
        if let Some(day) = self.min_day {
            parts.push(format!("day {} or later", day));
        }
        for req in &self.required_items {
            parts.push(format!("item: {} x{}", req.item, req.quantity));
        }
        for construction in &self.required_constructions {
            parts.push(format!("construction: {}", construction));
        }
        if let Some(location) = self.location {
            parts.push(format!("location: {}", location.label()));
        }
        if !self.prerequisites.is_empty() {
            parts.push(format!("prerequisites: {}", self.prerequisites.len()));
        }

        if parts.is_empty() {
            "(no checks)".to_string()
        } else {
            parts.join(", ")
        }
    }
}
