//! Effective-schedule resolution per character.

use std::borrow::Cow;
use std::collections::BTreeMap;

use island_rules::{CharacterId, EventId, MapLocation, TimeOfDay, WorldView};
use serde::{Deserialize, Serialize};

use super::{BehaviorEntry, OverrideRule, Position, PositionPreset, Schedule, ScheduleRules};

/// Configuration for the schedule resolver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Appearance used when a schedule has no entry for the queried time.
    pub default_appearance: String,
    /// Position used when a schedule has no entry for the queried time.
    pub default_position: Position,
    /// Warn about missing time-of-day entries when a base schedule is bound.
    pub validate_on_bind: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            default_appearance: "normal".to_string(),
            default_position: Position::Preset(PositionPreset::CenterNear),
            validate_on_bind: true,
        }
    }
}

#[derive(Debug, Clone)]
struct Binding {
    base: Schedule,
    rules: ScheduleRules,
}

/// A character found at a location by [`ScheduleResolver::characters_at`].
#[derive(Debug, Clone, PartialEq)]
pub struct PresentCharacter {
    pub character: CharacterId,
    pub behavior: BehaviorEntry,
    /// Whether at least one override rule shaped this behavior.
    pub conditional: bool,
}

/// Resolves the effective schedule of each bound character on demand.
///
/// Nothing is cached: relationship levels, flags and equipment can change
/// between queries, so every call re-applies the rules to the base schedule.
#[derive(Debug, Clone, Default)]
pub struct ScheduleResolver {
    bindings: BTreeMap<CharacterId, Binding>,
    config: ResolverConfig,
}

impl ScheduleResolver {
    /// Create a resolver with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a resolver with custom configuration.
    pub fn with_config(config: ResolverConfig) -> Self {
        Self {
            bindings: BTreeMap::new(),
            config,
        }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Bind a base schedule to its character, replacing any earlier base.
    /// Rules already bound to the character are kept.
    pub fn bind(&mut self, base: Schedule) {
        if self.config.validate_on_bind {
            let missing = base.validate();
            if !missing.is_empty() {
                tracing::warn!(
                    character = %base.character,
                    schedule = %base.name,
                    ?missing,
                    "base schedule is missing time-of-day entries"
                );
            }
        }

        let character = base.character.clone();
        match self.bindings.get_mut(&character) {
            Some(binding) => binding.base = base,
            None => {
                self.bindings.insert(
                    character,
                    Binding {
                        base,
                        rules: ScheduleRules::new(),
                    },
                );
            }
        }
    }

    /// Attach an override rule to a bound character. Returns false when the
    /// character has no base schedule.
    pub fn add_rule(&mut self, character: &CharacterId, rule: OverrideRule) -> bool {
        match self.bindings.get_mut(character) {
            Some(binding) => {
                binding.rules.add(rule);
                true
            }
            None => {
                tracing::warn!(
                    character = %character,
                    schedule = %rule.schedule.name,
                    "override rule for a character without a base schedule; ignoring"
                );
                false
            }
        }
    }

    /// Characters with a base schedule, in id order.
    pub fn characters(&self) -> impl Iterator<Item = &CharacterId> {
        self.bindings.keys()
    }

    pub fn base(&self, character: &CharacterId) -> Option<&Schedule> {
        self.bindings.get(character).map(|b| &b.base)
    }

    pub fn rules(&self, character: &CharacterId) -> Option<&ScheduleRules> {
        self.bindings.get(character).map(|b| &b.rules)
    }

    /// The effective schedule for a character, or `None` when the character
    /// has no schedule and should be skipped.
    pub fn resolve<W: WorldView + ?Sized>(
        &self,
        character: &CharacterId,
        world: &W,
    ) -> Option<Cow<'_, Schedule>> {
        let Some(binding) = self.bindings.get(character) else {
            tracing::debug!(character = %character, "no schedule bound; skipping");
            return None;
        };
        Some(binding.rules.apply(&binding.base, world))
    }

    /// Rules that currently apply to a character, in evaluation order.
    pub fn matched_rules<'a, W: WorldView + ?Sized>(
        &'a self,
        character: &CharacterId,
        world: &'a W,
    ) -> Vec<&'a OverrideRule> {
        self.bindings
            .get(character)
            .map(|binding| binding.rules.matching(world).collect())
            .unwrap_or_default()
    }

    /// Whether any override rule currently applies to a character.
    pub fn is_using_conditional<W: WorldView + ?Sized>(
        &self,
        character: &CharacterId,
        world: &W,
    ) -> bool {
        self.bindings
            .get(character)
            .is_some_and(|binding| binding.rules.iter().any(|rule| rule.condition.evaluate(world)))
    }

    /// Entry for a time of day, or a synthesized default when the schedule
    /// has a gap.
    pub fn behavior_for<'a>(
        &self,
        schedule: &'a Schedule,
        time_of_day: TimeOfDay,
    ) -> Cow<'a, BehaviorEntry> {
        match schedule.entry(time_of_day) {
            Some(entry) => Cow::Borrowed(entry),
            None => {
                tracing::warn!(
                    character = %schedule.character,
                    schedule = %schedule.name,
                    time = ?time_of_day,
                    "no entry for time of day; using default behavior"
                );
                Cow::Owned(self.default_behavior(time_of_day))
            }
        }
    }

    /// Special-case entry for an active event. Callers check this before
    /// falling back to [`behavior_for`](Self::behavior_for).
    pub fn behavior_for_event<'a>(
        &self,
        schedule: &'a Schedule,
        event: &EventId,
    ) -> Option<&'a BehaviorEntry> {
        schedule.special(event)
    }

    /// The behavior a character shows right now: the special-case entry for
    /// `active_event` when there is one, otherwise the time-of-day entry.
    pub fn behavior_now<W: WorldView + ?Sized>(
        &self,
        character: &CharacterId,
        time_of_day: TimeOfDay,
        active_event: Option<&EventId>,
        world: &W,
    ) -> Option<BehaviorEntry> {
        let schedule = self.resolve(character, world)?;
        if let Some(special) = active_event.and_then(|event| self.behavior_for_event(&schedule, event))
        {
            return Some(special.clone());
        }
        Some(self.behavior_for(&schedule, time_of_day).into_owned())
    }

    /// Characters present at a location during a time of day, in id order.
    pub fn characters_at<W: WorldView + ?Sized>(
        &self,
        location: MapLocation,
        time_of_day: TimeOfDay,
        world: &W,
    ) -> Vec<PresentCharacter> {
        self.bindings
            .iter()
            .filter_map(|(character, binding)| {
                let schedule = binding.rules.apply(&binding.base, world);
                let conditional = !std::ptr::eq(schedule.as_ref(), &binding.base);
                let behavior = self.behavior_for(&schedule, time_of_day);
                (behavior.present && behavior.location == location).then(|| PresentCharacter {
                    character: character.clone(),
                    behavior: behavior.into_owned(),
                    conditional,
                })
            })
            .collect()
    }

    fn default_behavior(&self, time_of_day: TimeOfDay) -> BehaviorEntry {
        BehaviorEntry::new(time_of_day, MapLocation::default())
            .with_position(self.config.default_position)
            .with_appearance(self.config.default_appearance.clone())
    }
}
