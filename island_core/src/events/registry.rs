//! Event registry with a stable priority index.

use std::collections::HashMap;

use island_rules::{CharacterId, EventId, MapLocation};

use super::{EventDefinition, EventSource};

/// Every registered event, indexed for lookup and ordered for selection.
///
/// Definitions are stored once in registration order. Side indexes hold
/// positions into that list:
/// - `by_priority`: descending priority, ties in registration order
/// - `by_id`, `by_character`, `by_location`: filters
#[derive(Debug, Clone, Default)]
pub struct EventRegistry {
    events: Vec<EventDefinition>,
    by_id: HashMap<EventId, usize>,
    by_priority: Vec<usize>,
    by_character: HashMap<CharacterId, Vec<usize>>,
    by_location: HashMap<MapLocation, Vec<usize>>,
}

impl EventRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a content source.
    pub fn from_source<S: EventSource + ?Sized>(source: &S) -> Self {
        let mut registry = Self::new();
        for event in source.events() {
            registry.register(event.clone());
        }
        registry
    }

    /// Register an event. A duplicate or blank id is dropped with a warning
    /// and the first definition is kept.
    pub fn register(&mut self, event: EventDefinition) -> bool {
        if event.id.is_empty() {
            tracing::warn!(name = %event.name, "event with blank id; dropping");
            return false;
        }
        if self.by_id.contains_key(&event.id) {
            tracing::warn!(event = %event.id, "duplicate event id; keeping the first definition");
            return false;
        }
        if !event.condition.is_configured() {
            tracing::warn!(event = %event.id, "event condition has no checks; it will never fire");
        }

        let index = self.events.len();
        let position = self
            .by_priority
            .partition_point(|&i| self.events[i].priority >= event.priority);
        self.by_priority.insert(position, index);

        self.by_id.insert(event.id.clone(), index);
        if let Some(character) = &event.condition.character {
            self.by_character.entry(character.clone()).or_default().push(index);
        }
        if let Some(location) = event.condition.location {
            self.by_location.entry(location).or_default().push(index);
        }
        self.events.push(event);
        true
    }

    pub fn get(&self, id: &EventId) -> Option<&EventDefinition> {
        self.by_id.get(id).map(|&i| &self.events[i])
    }

    pub fn contains(&self, id: &EventId) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &EventDefinition> {
        self.events.iter()
    }

    /// Events by descending priority, ties in registration order.
    pub fn by_priority(&self) -> impl Iterator<Item = &EventDefinition> {
        self.by_priority.iter().map(|&i| &self.events[i])
    }

    /// Events bound to a character, in registration order.
    pub fn for_character(&self, character: &CharacterId) -> Vec<&EventDefinition> {
        self.collect(self.by_character.get(character))
    }

    /// Events bound to a location, in registration order.
    pub fn for_location(&self, location: MapLocation) -> Vec<&EventDefinition> {
        self.collect(self.by_location.get(&location))
    }

    fn collect(&self, indexes: Option<&Vec<usize>>) -> Vec<&EventDefinition> {
        indexes
            .map(|indexes| indexes.iter().map(|&i| &self.events[i]).collect())
            .unwrap_or_default()
    }
}
