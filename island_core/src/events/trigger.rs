//! Event selection.
//!
//! The trigger service answers "which event fires now?" for one query context.
//! It walks the registry's priority order and returns the first event that
//! survives every check. It never mutates anything: marking the selected event
//! as triggered is a separate call the consumer makes once it has used the
//! selection.

use island_rules::{CharacterId, EventId, MapLocation, WorldView, MAX_AFFINITY};

use super::{EventDefinition, EventRegistry, TriggeredEvents};
use crate::condition::{ConditionMiss, QueryContext};
use crate::rival::RivalTracker;

/// Why a candidate event was passed over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// The event is bound to another character or location.
    Irrelevant,
    /// One-shot event that already fired.
    AlreadyTriggered,
    MissingPrerequisite(EventId),
    /// The main character's rival pair has married.
    CourtshipClosed,
    Condition(ConditionMiss),
}

/// Whether an event belongs to a query context.
///
/// A character filter requires the query to name that character and a
/// location filter requires the query to carry that location. Events with
/// neither filter belong to every query.
pub fn is_relevant(event: &EventDefinition, context: &QueryContext) -> bool {
    let condition = &event.condition;
    let character_ok = condition
        .character
        .as_ref()
        .map_or(true, |c| context.character.as_ref() == Some(c));
    let location_ok = condition
        .location
        .map_or(true, |l| context.location == Some(l));
    character_ok && location_ok
}

/// Selects at most one event per query.
#[derive(Debug, Clone, Copy)]
pub struct EventTrigger<'a> {
    registry: &'a EventRegistry,
    triggered: &'a TriggeredEvents,
    rivals: Option<&'a RivalTracker>,
}

impl<'a> EventTrigger<'a> {
    pub fn new(registry: &'a EventRegistry, triggered: &'a TriggeredEvents) -> Self {
        Self {
            registry,
            triggered,
            rivals: None,
        }
    }

    /// Close courtship events for main characters whose rival pair married.
    pub fn with_rivals(mut self, rivals: &'a RivalTracker) -> Self {
        self.rivals = Some(rivals);
        self
    }

    /// Run every check for one event, in selection order.
    pub fn check<W: WorldView + ?Sized>(
        &self,
        event: &EventDefinition,
        world: &W,
        context: &QueryContext,
    ) -> Result<(), Rejection> {
        if !is_relevant(event, context) {
            return Err(Rejection::Irrelevant);
        }
        if event.one_shot && self.triggered.contains(&event.id) {
            return Err(Rejection::AlreadyTriggered);
        }
        if let Some(missing) = event
            .condition
            .prerequisites
            .iter()
            .find(|id| !self.triggered.contains(id))
        {
            return Err(Rejection::MissingPrerequisite(missing.clone()));
        }
        if self.courtship_closed(event) {
            return Err(Rejection::CourtshipClosed);
        }
        event
            .condition
            .check(world, context)
            .map_err(Rejection::Condition)
    }

    pub fn is_eligible<W: WorldView + ?Sized>(
        &self,
        event: &EventDefinition,
        world: &W,
        context: &QueryContext,
    ) -> bool {
        self.check(event, world, context).is_ok()
    }

    /// The highest-priority eligible event for the context, if any.
    pub fn select<W: WorldView + ?Sized>(
        &self,
        world: &W,
        context: &QueryContext,
    ) -> Option<&'a EventDefinition> {
        for event in self.registry.by_priority() {
            match self.check(event, world, context) {
                Ok(()) => {
                    tracing::debug!(
                        event = %event.id,
                        priority = event.priority,
                        scenario = %event.scenario,
                        "event selected"
                    );
                    return Some(event);
                }
                Err(Rejection::Irrelevant) => {}
                Err(Rejection::Condition(ConditionMiss::Unconfigured)) => {
                    tracing::warn!(event = %event.id, "event condition has no checks; skipping");
                }
                Err(reason) => {
                    tracing::trace!(event = %event.id, ?reason, "event rejected");
                }
            }
        }
        None
    }

    /// Event to play when the player talks to a character.
    pub fn select_for_character<W: WorldView + ?Sized>(
        &self,
        character: &CharacterId,
        world: &W,
    ) -> Option<&'a EventDefinition> {
        self.select(world, &QueryContext::character(character.clone()))
    }

    /// Event to play when the player enters a location.
    pub fn select_for_location<W: WorldView + ?Sized>(
        &self,
        location: MapLocation,
        world: &W,
    ) -> Option<&'a EventDefinition> {
        self.select(world, &QueryContext::location(location))
    }

    /// Event with no character or location binding, e.g. on a time tick.
    pub fn select_any<W: WorldView + ?Sized>(&self, world: &W) -> Option<&'a EventDefinition> {
        self.select(world, &QueryContext::any())
    }

    /// Every eligible event for the context, by descending priority.
    pub fn eligible<W: WorldView + ?Sized>(
        &self,
        world: &W,
        context: &QueryContext,
    ) -> Vec<&'a EventDefinition> {
        self.registry
            .by_priority()
            .filter(|event| self.is_eligible(event, world, context))
            .collect()
    }

    fn courtship_closed(&self, event: &EventDefinition) -> bool {
        let (Some(rivals), Some(character)) = (self.rivals, &event.condition.character) else {
            return false;
        };
        event.condition.min_romance.is_some() && rivals.is_married(character)
    }
}

/// Whether the player can propose to a character right now.
///
/// Requires maxed romance, neither side already married and, when the
/// character has a rival, that the rival pair has not married.
pub fn available_for_marriage<W: WorldView + ?Sized>(
    character: &CharacterId,
    world: &W,
    rivals: Option<&RivalTracker>,
) -> bool {
    let Some(relationship) = world.relationship(character) else {
        return false;
    };
    relationship.romance >= MAX_AFFINITY
        && !relationship.married
        && world.player_spouse().is_none()
        && !rivals.is_some_and(|tracker| tracker.is_married(character))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::EventCondition;
    use crate::rival::{RivalPairDef, RivalStageEvent};
    use island_rules::{Capabilities, CharacterRecord, WorldState};

    fn cook_world(romance: u8) -> WorldState {
        let mut world = WorldState::new();
        world.clock.day = 20;
        let mut cook = CharacterRecord::new("char_02", "Cook")
            .with_capabilities(Capabilities::romanceable(None));
        cook.set_romance(romance);
        world.add_character(cook);
        world
    }

    fn heart(id: &str, priority: i32, romance: u8, prereq: Option<&str>) -> EventDefinition {
        let mut condition = EventCondition::new()
            .for_character("char_02")
            .with_min_romance(romance);
        if let Some(prereq) = prereq {
            condition = condition.with_prerequisite(prereq);
        }
        EventDefinition::new(id, id, id)
            .with_priority(priority)
            .with_condition(condition)
    }

    fn registry(events: Vec<EventDefinition>) -> EventRegistry {
        EventRegistry::from_source(&events)
    }

    #[test]
    fn test_higher_priority_wins() {
        let registry = registry(vec![
            heart("e1", 100, 10, None),
            heart("e2", 150, 10, None),
        ]);
        let triggered = TriggeredEvents::new();
        let world = cook_world(50);

        let selected = EventTrigger::new(&registry, &triggered)
            .select_for_character(&CharacterId::new("char_02"), &world)
            .unwrap();
        assert_eq!(selected.id.as_str(), "e2");
    }

    #[test]
    fn test_ties_resolved_by_registration_order() {
        let registry = registry(vec![
            heart("first", 100, 10, None),
            heart("second", 100, 10, None),
        ]);
        let triggered = TriggeredEvents::new();
        let world = cook_world(50);
        let trigger = EventTrigger::new(&registry, &triggered);

        let context = QueryContext::character("char_02");
        assert_eq!(trigger.select(&world, &context).unwrap().id.as_str(), "first");
        assert_eq!(trigger.eligible(&world, &context).len(), 2);
    }

    #[test]
    fn test_one_shot_enforced() {
        let registry = registry(vec![heart("e1", 100, 10, None)]);
        let mut triggered = TriggeredEvents::new();
        let world = cook_world(50);
        let cook = CharacterId::new("char_02");

        let selected = EventTrigger::new(&registry, &triggered)
            .select_for_character(&cook, &world)
            .map(|e| e.id.clone())
            .unwrap();
        triggered.mark(selected);

        assert!(EventTrigger::new(&registry, &triggered)
            .select_for_character(&cook, &world)
            .is_none());
    }

    #[test]
    fn test_repeatable_event_fires_again() {
        let registry = registry(vec![heart("chat", 10, 0, None).repeatable()]);
        let triggered: TriggeredEvents = [EventId::new("chat")].into_iter().collect();
        let world = cook_world(0);

        assert!(EventTrigger::new(&registry, &triggered)
            .select_for_character(&CharacterId::new("char_02"), &world)
            .is_some());
    }

    #[test]
    fn test_prerequisite_gating() {
        let registry = registry(vec![heart("e2", 100, 10, Some("e1"))]);
        let world = cook_world(90);
        let context = QueryContext::character("char_02");

        let empty = TriggeredEvents::new();
        let trigger = EventTrigger::new(&registry, &empty);
        let event = registry.get(&EventId::new("e2")).unwrap();
        assert_eq!(
            trigger.check(event, &world, &context),
            Err(Rejection::MissingPrerequisite(EventId::new("e1")))
        );
        assert!(trigger.select(&world, &context).is_none());

        let done: TriggeredEvents = [EventId::new("e1")].into_iter().collect();
        assert!(EventTrigger::new(&registry, &done)
            .select(&world, &context)
            .is_some());
    }

    #[test]
    fn test_relevance_filters() {
        let beach = EventDefinition::new("beach", "Beach", "Beach")
            .with_condition(EventCondition::new().with_min_day(1).at_location(MapLocation::Beach));
        let anywhere = EventDefinition::new("hut", "Hut", "Hut")
            .with_condition(EventCondition::new().with_min_day(1));

        assert!(is_relevant(&beach, &QueryContext::location(MapLocation::Beach)));
        assert!(!is_relevant(&beach, &QueryContext::location(MapLocation::River)));
        assert!(!is_relevant(&beach, &QueryContext::character("char_02")));
        assert!(!is_relevant(&beach, &QueryContext::any()));
        assert!(is_relevant(&anywhere, &QueryContext::any()));
        assert!(is_relevant(&anywhere, &QueryContext::character("char_02")));

        let cook = heart("cook", 1, 0, None);
        assert!(!is_relevant(&cook, &QueryContext::any()));
        assert!(!is_relevant(&cook, &QueryContext::character("char_01")));
    }

    #[test]
    fn test_select_is_pure() {
        let registry = registry(vec![heart("e1", 100, 10, None)]);
        let triggered = TriggeredEvents::new();
        let world = cook_world(50);
        let trigger = EventTrigger::new(&registry, &triggered);
        let context = QueryContext::character("char_02");

        let first = trigger.select(&world, &context).map(|e| e.id.clone());
        let second = trigger.select(&world, &context).map(|e| e.id.clone());
        assert_eq!(first, second);
        assert!(triggered.is_empty());
    }

    #[test]
    fn test_rival_marriage_closes_courtship() {
        let registry = registry(vec![
            heart("cook_heart1", 100, 20, None),
            EventDefinition::new("cook_shop", "Shop", "Cook_Shop")
                .with_priority(80)
                .with_condition(EventCondition::new().for_character("char_02").with_min_friendship(0)),
        ]);
        let triggered = TriggeredEvents::new();
        let world = cook_world(50);
        let cook = CharacterId::new("char_02");

        let mut rivals = RivalTracker::from_definitions(
            &[RivalPairDef::new("char_02", "rival_02")],
            &[RivalStageEvent::new("rival_cook_marriage", "char_02", "rival_02", 5, 150)],
        );
        let open = EventTrigger::new(&registry, &triggered).with_rivals(&rivals);
        assert_eq!(
            open.select_for_character(&cook, &world).unwrap().id.as_str(),
            "cook_heart1"
        );

        rivals.advance(&cook, 5).unwrap();
        let closed = EventTrigger::new(&registry, &triggered).with_rivals(&rivals);
        assert_eq!(
            closed.select_for_character(&cook, &world).unwrap().id.as_str(),
            "cook_shop"
        );
    }

    #[test]
    fn test_available_for_marriage() {
        let cook = CharacterId::new("char_02");
        let mut rivals = RivalTracker::from_definitions(
            &[RivalPairDef::new("char_02", "rival_02")],
            std::iter::empty(),
        );

        assert!(!available_for_marriage(&cook, &cook_world(99), Some(&rivals)));

        let world = cook_world(100);
        assert!(available_for_marriage(&cook, &world, Some(&rivals)));
        assert!(available_for_marriage(&cook, &world, None));
        assert!(!available_for_marriage(&CharacterId::new("nobody"), &world, None));

        rivals.advance(&cook, 5).unwrap();
        assert!(!available_for_marriage(&cook, &world, Some(&rivals)));
    }
}
