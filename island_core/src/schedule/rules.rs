//! Conditional override rules bound to one character.

use std::borrow::Cow;

use island_rules::WorldView;
use serde::{Deserialize, Serialize};

use super::Schedule;
use crate::condition::ScheduleCondition;

/// How an override schedule folds into the running result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum MergeMode {
    /// The override becomes the whole effective schedule.
    Replace,
    /// Only the override's time-of-day entries replace the base's.
    #[default]
    Override,
}

/// A predicate, a schedule to apply when it holds, and how to apply it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverrideRule {
    pub condition: ScheduleCondition,
    pub schedule: Schedule,
    #[serde(default)]
    pub mode: MergeMode,
    /// Higher runs first.
    #[serde(default)]
    pub priority: i32,
}

impl OverrideRule {
    pub fn new(condition: ScheduleCondition, schedule: Schedule) -> Self {
        Self {
            condition,
            schedule,
            mode: MergeMode::default(),
            priority: 0,
        }
    }

    /// Set how the schedule folds in.
    pub fn with_mode(mut self, mode: MergeMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the priority. Higher runs first.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

/// Ordered override rules. Ties keep insertion order.
#[derive(Debug, Clone, Default)]
pub struct ScheduleRules {
    rules: Vec<OverrideRule>,
}

impl ScheduleRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a rule after every rule of equal or higher priority.
    pub fn add(&mut self, rule: OverrideRule) {
        let index = self
            .rules
            .partition_point(|existing| existing.priority >= rule.priority);
        self.rules.insert(index, rule);
    }

    pub fn with_rule(mut self, rule: OverrideRule) -> Self {
        self.add(rule);
        self
    }

    /// Rules in evaluation order.
    pub fn iter(&self) -> impl Iterator<Item = &OverrideRule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules whose condition holds, in evaluation order, stopping after the
    /// first matching `Replace` rule.
    pub fn matching<'a, W: WorldView + ?Sized>(
        &'a self,
        world: &'a W,
    ) -> impl Iterator<Item = &'a OverrideRule> + 'a {
        let mut replaced = false;
        self.rules.iter().filter(move |rule| {
            if replaced || !rule.condition.evaluate(world) {
                return false;
            }
            replaced = rule.mode == MergeMode::Replace;
            true
        })
    }

    /// Fold every matching rule into `base`, highest priority first.
    ///
    /// Returns `base` borrowed when no rule matches and the replacing
    /// schedule borrowed when the first match is a `Replace` rule.
    pub fn apply<'a, W: WorldView + ?Sized>(
        &'a self,
        base: &'a Schedule,
        world: &W,
    ) -> Cow<'a, Schedule> {
        let mut effective = Cow::Borrowed(base);
        for rule in &self.rules {
            if !rule.condition.evaluate(world) {
                continue;
            }
            tracing::debug!(
                character = %base.character,
                schedule = %rule.schedule.name,
                priority = rule.priority,
                mode = ?rule.mode,
                "override rule matched"
            );
            match rule.mode {
                MergeMode::Replace => return Cow::Borrowed(&rule.schedule),
                MergeMode::Override => {
                    effective = Cow::Owned(effective.merge_with(&rule.schedule, MergeMode::Override));
                }
            }
        }
        effective
    }
}
