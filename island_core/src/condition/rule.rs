//! Predicates guarding conditional schedule overrides.

use island_rules::{CharacterId, FlagId, ItemId, WorldView};
use serde::{Deserialize, Serialize};

/// Romance threshold against a named character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AffectionCheck {
    pub character: CharacterId,
    pub min_romance: u8,
}

/// Inclusive day window. Either bound may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DayRange {
    pub min: Option<u32>,
    pub max: Option<u32>,
}

impl DayRange {
    pub fn contains(&self, day: u32) -> bool {
        self.min.map_or(true, |min| day >= min) && self.max.map_or(true, |max| day <= max)
    }
}

/// The predicate of a conditional schedule rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleCondition {
    /// Package name of a companion app that must be installed.
    pub app_installed: Option<String>,
    /// Flag that must be enabled.
    pub flag: Option<FlagId>,
    pub affection: Option<AffectionCheck>,
    pub day_range: Option<DayRange>,
    /// Item the player must have equipped.
    pub equipped: Option<ItemId>,
}

impl ScheduleCondition {
    /// Create a condition with no checks. It never holds until one is enabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Require a companion app to be installed.
    pub fn with_app(mut self, package: impl Into<String>) -> Self {
        self.app_installed = Some(package.into());
        self
    }

    /// Require a flag to be enabled.
    pub fn with_flag(mut self, flag: impl Into<FlagId>) -> Self {
        self.flag = Some(flag.into());
        self
    }

    /// Require romance with `character` of at least `min_romance`.
    pub fn with_affection(mut self, character: impl Into<CharacterId>, min_romance: u8) -> Self {
        self.affection = Some(AffectionCheck {
            character: character.into(),
            min_romance,
        });
        self
    }

    /// Restrict to an inclusive day window. `None` leaves a bound open.
    pub fn with_days(mut self, min: Option<u32>, max: Option<u32>) -> Self {
        self.day_range = Some(DayRange { min, max });
        self
    }

    /// Require an item to be equipped.
    pub fn with_equipped(mut self, item: impl Into<ItemId>) -> Self {
        self.equipped = Some(item.into());
        self
    }

    /// Whether at least one check is enabled.
    pub fn is_configured(&self) -> bool {
        self.app_installed.is_some()
            || self.flag.is_some()
            || self.affection.is_some()
            || self.day_range.is_some()
            || self.equipped.is_some()
    }

    /// Evaluate all enabled checks. Fails closed when none is enabled or when
    /// an enabled check names an empty id.
    pub fn evaluate<W: WorldView + ?Sized>(&self, world: &W) -> bool {
        if !self.is_configured() {
            tracing::warn!("schedule condition has no checks enabled; treating as unmet");
            return false;
        }

        if let Some(package) = &self.app_installed {
            if package.trim().is_empty() {
                tracing::warn!("schedule condition checks an app but names no package");
                return false;
            }
            if !world.is_app_installed(package) {
                return false;
            }
        }

        if let Some(flag) = &self.flag {
            if flag.is_empty() {
                tracing::warn!("schedule condition checks a flag but names no flag id");
                return false;
            }
            if !world.is_flag_enabled(flag) {
                return false;
            }
        }

        if let Some(check) = &self.affection {
            if check.character.is_empty() {
                tracing::warn!("schedule condition checks affection but names no character");
                return false;
            }
            match world.relationship(&check.character) {
                Some(relationship) if relationship.romance >= check.min_romance => {}
                _ => return false,
            }
        }

        if let Some(range) = &self.day_range {
            if !range.contains(world.day()) {
                return false;
            }
        }

        if let Some(item) = &self.equipped {
            if item.is_empty() {
                tracing::warn!("schedule condition checks equipment but names no item");
                return false;
            }
            if !world.is_equipped(item) {
                return false;
            }
        }

        true
    }
}
