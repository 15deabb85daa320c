//! Narrative events: definitions, the registry that orders them, and the
//! trigger service that picks at most one per query.

mod registry;
mod trigger;

pub use registry::*;
pub use trigger::*;

use std::collections::BTreeSet;

use island_rules::EventId;
use serde::{Deserialize, Serialize};

use crate::condition::EventCondition;
use crate::rival::{RivalPairDef, RivalStageEvent};

/// A narrative event that can fire when its condition holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDefinition {
    pub id: EventId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Higher wins.
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub condition: EventCondition,
    /// Dialogue scenario handed to the script engine.
    pub scenario: String,
    /// Whether the event can fire only once.
    #[serde(default = "default_one_shot")]
    pub one_shot: bool,
}

fn default_one_shot() -> bool {
    true
}

impl EventDefinition {
    /// Create a one-shot event with priority 0 and an empty condition.
    pub fn new(id: impl Into<EventId>, name: impl Into<String>, scenario: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            priority: 0,
            condition: EventCondition::default(),
            scenario: scenario.into(),
            one_shot: true,
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the priority. Higher wins.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Set the eligibility condition.
    pub fn with_condition(mut self, condition: EventCondition) -> Self {
        self.condition = condition;
        self
    }

    /// Allow the event to fire again after it has been marked.
    pub fn repeatable(mut self) -> Self {
        self.one_shot = false;
        self
    }
}

/// Abstract supplier of event content.
///
/// The registry and the rival tracker are built from a source; where the
/// definitions come from (TOML, code, a test fixture) is the source's concern.
pub trait EventSource {
    /// Regular event definitions, in registration order.
    fn events(&self) -> &[EventDefinition];

    /// Rival pairs to track.
    fn rival_pairs(&self) -> &[RivalPairDef] {
        &[]
    }

    /// Day-indexed rival stage events.
    fn rival_events(&self) -> &[RivalStageEvent] {
        &[]
    }
}

impl EventSource for [EventDefinition] {
    fn events(&self) -> &[EventDefinition] {
        self
    }
}

impl EventSource for Vec<EventDefinition> {
    fn events(&self) -> &[EventDefinition] {
        self
    }
}

/// Ids of events that have fired at least once.
///
/// Grows as events are marked; only [`clear`](Self::clear) shrinks it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TriggeredEvents {
    ids: BTreeSet<EventId>,
}

impl TriggeredEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an event as triggered. Returns false if it already was.
    pub fn mark(&mut self, id: EventId) -> bool {
        let added = self.ids.insert(id.clone());
        if added {
            tracing::info!(event = %id, "event marked triggered");
        }
        added
    }

    pub fn contains(&self, id: &EventId) -> bool {
        self.ids.contains(id)
    }

    /// Whether every id in `ids` has triggered.
    pub fn contains_all<'a>(&self, ids: impl IntoIterator<Item = &'a EventId>) -> bool {
        ids.into_iter().all(|id| self.ids.contains(id))
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Ids in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &EventId> {
        self.ids.iter()
    }

    /// Forget every triggered event. Debug/reset only.
    pub fn clear(&mut self) {
        tracing::info!(count = self.ids.len(), "triggered events cleared");
        self.ids.clear();
    }

    pub fn summary(&self) -> String {
        if self.ids.is_empty() {
            return "triggered events: none".to_string();
        }
        let ids: Vec<&str> = self.ids.iter().map(EventId::as_str).collect();
        format!("triggered events ({}): {}", ids.len(), ids.join(", "))
    }
}

impl FromIterator<EventId> for TriggeredEvents {
    fn from_iter<I: IntoIterator<Item = EventId>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triggered_set_grows() {
        let mut triggered = TriggeredEvents::new();
        assert!(triggered.mark(EventId::new("cook_heart1")));
        assert!(!triggered.mark(EventId::new("cook_heart1")));
        assert_eq!(triggered.len(), 1);
        assert!(triggered.contains(&EventId::new("cook_heart1")));
    }

    #[test]
    fn test_contains_all() {
        let triggered: TriggeredEvents = ["a", "b"].into_iter().map(EventId::new).collect();
        let wanted = [EventId::new("a"), EventId::new("b")];
        assert!(triggered.contains_all(&wanted));
        assert!(!triggered.contains_all(&[EventId::new("c")]));
        assert!(triggered.contains_all(std::iter::empty()));
    }

    #[test]
    fn test_summary_and_clear() {
        let mut triggered: TriggeredEvents = ["b", "a"].into_iter().map(EventId::new).collect();
        assert_eq!(triggered.summary(), "triggered events (2): a, b");
        triggered.clear();
        assert!(triggered.is_empty());
        assert_eq!(triggered.summary(), "triggered events: none");
    }

    #[test]
    fn test_definition_defaults() {
        let event = EventDefinition::new("cook_heart1", "Cook heart 1", "Cook_Heart1");
        assert!(event.one_shot);
        assert_eq!(event.priority, 0);
        assert!(!event.condition.is_configured());
        assert!(!event.repeatable().one_shot);
    }

    #[test]
    fn test_triggered_serializes_as_list() {
        let triggered: TriggeredEvents = ["b", "a"].into_iter().map(EventId::new).collect();
        assert_eq!(serde_json::to_string(&triggered).unwrap(), r#"["a","b"]"#);
    }
}
