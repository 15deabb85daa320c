//! One play session: the query/commit surface consumed by the game loop.
//!
//! The session owns the mutable state of the core (triggered events and
//! rival progress) next to the content it was built from. The world snapshot
//! is never stored; every call takes it explicitly.

use island_rules::{CharacterId, EventId, FlagStore, MapLocation, WorldView};

use crate::content::{ContentError, ContentPack};
use crate::events::{
    available_for_marriage, EventDefinition, EventRegistry, EventTrigger, TriggeredEvents,
};
use crate::persistence::{PersistenceError, SaveState};
use crate::rival::{RivalTracker, RivalTransition};
use crate::schedule::{BehaviorEntry, ScheduleResolver};

/// Decision state for one play session.
#[derive(Debug, Clone, Default)]
pub struct StorySession {
    registry: EventRegistry,
    triggered: TriggeredEvents,
    rivals: RivalTracker,
    resolver: ScheduleResolver,
}

impl StorySession {
    /// Create a session with nothing triggered.
    pub fn new(registry: EventRegistry, rivals: RivalTracker, resolver: ScheduleResolver) -> Self {
        Self {
            registry,
            triggered: TriggeredEvents::new(),
            rivals,
            resolver,
        }
    }

    pub fn from_pack(pack: &ContentPack) -> Self {
        Self::new(
            pack.build_registry(),
            pack.build_tracker(),
            pack.build_resolver(),
        )
    }

    /// A session over the built-in content.
    pub fn builtin() -> Result<Self, ContentError> {
        Ok(Self::from_pack(&ContentPack::builtin()?))
    }

    pub fn registry(&self) -> &EventRegistry {
        &self.registry
    }

    pub fn triggered(&self) -> &TriggeredEvents {
        &self.triggered
    }

    pub fn rivals(&self) -> &RivalTracker {
        &self.rivals
    }

    pub fn resolver(&self) -> &ScheduleResolver {
        &self.resolver
    }

    /// Trigger service over the current session state.
    pub fn trigger(&self) -> EventTrigger<'_> {
        EventTrigger::new(&self.registry, &self.triggered).with_rivals(&self.rivals)
    }

    /// Event to play when the player talks to a character.
    pub fn character_event<W: WorldView + ?Sized>(
        &self,
        character: &CharacterId,
        world: &W,
    ) -> Option<&EventDefinition> {
        self.trigger().select_for_character(character, world)
    }

    /// Event to play when the player enters a location.
    pub fn location_event<W: WorldView + ?Sized>(
        &self,
        location: MapLocation,
        world: &W,
    ) -> Option<&EventDefinition> {
        self.trigger().select_for_location(location, world)
    }

    /// Event to play on a time tick, bound to no character or location.
    pub fn any_event<W: WorldView + ?Sized>(&self, world: &W) -> Option<&EventDefinition> {
        self.trigger().select_any(world)
    }

    /// Commit an event after its scenario has been played. Unknown ids are
    /// refused; returns false when nothing changed.
    pub fn mark_triggered(&mut self, id: &EventId) -> bool {
        if !self.registry.contains(id) {
            tracing::warn!(event = %id, "cannot mark unknown event as triggered");
            return false;
        }
        self.triggered.mark(id.clone())
    }

    /// Day-tick: advance every rival pair that has come due.
    pub fn advance_day<W: WorldView + ?Sized>(&mut self, world: &W) -> Vec<RivalTransition> {
        self.rivals.on_day_advanced(world)
    }

    /// What a character is doing at the world's current time of day.
    pub fn behavior<W: WorldView + ?Sized>(
        &self,
        character: &CharacterId,
        active_event: Option<&EventId>,
        world: &W,
    ) -> Option<BehaviorEntry> {
        self.resolver
            .behavior_now(character, world.time_of_day(), active_event, world)
    }

    /// Whether the player can propose to a character right now.
    pub fn can_marry<W: WorldView + ?Sized>(&self, character: &CharacterId, world: &W) -> bool {
        available_for_marriage(character, world, Some(&self.rivals))
    }

    /// Encode the session together with the world's flags.
    pub fn save(&self, flags: &FlagStore) -> Result<String, PersistenceError> {
        SaveState::capture(&self.triggered, &self.rivals, flags).encode()
    }

    /// Resume from a payload and return the saved flags.
    ///
    /// Loading never fails: unreadable payloads start a fresh session and
    /// ids no longer in the content are dropped.
    pub fn load(&mut self, payload: &str) -> FlagStore {
        let state = SaveState::decode_or_default(payload);
        self.triggered = state.restore_triggered(Some(&self.registry));
        state.restore_rivals(&mut self.rivals);
        state.flags
    }

    /// Forget every triggered event. Debug only.
    pub fn reset_triggered(&mut self) {
        self.triggered.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use island_rules::{TimeOfDay, WorldState};

    fn setup() -> (StorySession, WorldState) {
        let pack = ContentPack::builtin().unwrap();
        let mut world = WorldState::new();
        pack.populate(&mut world);
        (StorySession::from_pack(&pack), world)
    }

    #[test]
    fn test_builtin_session() {
        let session = StorySession::builtin().unwrap();
        assert_eq!(session.registry().len(), 48);
        assert_eq!(session.rivals().pairs().count(), 3);
        assert!(session.triggered().is_empty());
    }

    #[test]
    fn test_location_event_then_mark() {
        let (mut session, world) = setup();

        let event = session
            .location_event(MapLocation::Beach, &world)
            .map(|e| e.id.clone())
            .unwrap();
        assert_eq!(event.as_str(), "location_beach_discover");

        assert!(session.mark_triggered(&event));
        assert!(!session.mark_triggered(&event));
        assert!(session.location_event(MapLocation::Beach, &world).is_none());
    }

    #[test]
    fn test_mark_unknown_event() {
        let (mut session, _) = setup();
        assert!(!session.mark_triggered(&EventId::new("not_an_event")));
        assert!(session.triggered().is_empty());
    }

    #[test]
    fn test_save_and_load() {
        let (mut session, mut world) = setup();
        session.mark_triggered(&EventId::new("location_beach_discover"));
        world.clock.day = 60;
        session.advance_day(&world);
        session.advance_day(&world);
        world.flags.set("harvest_festival", true);

        let payload = session.save(&world.flags).unwrap();

        let (mut restored, _) = setup();
        let flags = restored.load(&payload);
        assert!(flags.is_enabled(&"harvest_festival".into()));
        assert_eq!(restored.triggered(), session.triggered());
        let craftsman = CharacterId::new("char_01");
        assert_eq!(restored.rivals().pair(&craftsman).unwrap().stage(), 2);

        restored.reset_triggered();
        assert!(restored.triggered().is_empty());
    }

    #[test]
    fn test_load_garbage_starts_fresh() {
        let (mut session, world) = setup();
        session.mark_triggered(&EventId::new("location_beach_discover"));
        session.advance_day(&WorldState {
            clock: island_rules::WorldClock {
                day: 30,
                ..world.clock
            },
            ..world.clone()
        });

        let flags = session.load("not json at all");
        assert!(flags.is_empty());
        assert!(session.triggered().is_empty());
        assert!(session.rivals().pairs().all(|p| p.stage() == 0));
    }

    #[test]
    fn test_behavior_follows_clock() {
        let (session, mut world) = setup();
        let cook = CharacterId::new("char_02");

        world.clock.time_of_day = TimeOfDay::EarlyMorning;
        let asleep = session.behavior(&cook, None, &world).unwrap();
        assert!(!asleep.present);

        world.clock.time_of_day = TimeOfDay::Noon;
        let lunch = session.behavior(&cook, None, &world).unwrap();
        assert!(lunch.present);
        assert_eq!(lunch.location, MapLocation::Beach);
    }
}
