//! World state management - the snapshot every decision is evaluated against.

mod flags;

pub use flags::*;

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::entities::{
    can_marry, CharacterId, CharacterRecord, ConstructionId, Equipment, FlagId, Inventory, ItemId,
    Relationship,
};
use crate::mechanics::{TimeOfDay, Weather};

/// The read-only query surface the decision core evaluates conditions against.
///
/// Implementations must be pure reads; the core calls these repeatedly and
/// relies on identical answers for an unchanged world.
pub trait WorldView {
    /// Days elapsed since the game started (day 1 is the first day).
    fn day(&self) -> u32;

    fn time_of_day(&self) -> TimeOfDay;

    fn weather(&self) -> Weather;

    /// Relationship metrics for a character, if the character exists.
    fn relationship(&self, character: &CharacterId) -> Option<Relationship>;

    /// Whether the player holds at least `quantity` of an item.
    fn has_item(&self, item: &ItemId, quantity: u32) -> bool;

    /// Whether a structure has been built anywhere on the map.
    fn has_construction(&self, construction: &ConstructionId) -> bool;

    fn is_flag_enabled(&self, flag: &FlagId) -> bool;

    /// Whether the player has the item in an equipment slot.
    fn is_equipped(&self, item: &ItemId) -> bool;

    /// Whether a companion app is installed on the device.
    fn is_app_installed(&self, package: &str) -> bool;

    /// The character the player is married to, if any.
    fn player_spouse(&self) -> Option<&CharacterId>;
}

/// World clock readings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldClock {
    pub day: u32,
    pub time_of_day: TimeOfDay,
    pub weather: Weather,
}

impl Default for WorldClock {
    fn default() -> Self {
        Self {
            day: 1,
            time_of_day: TimeOfDay::Morning,
            weather: Weather::Sunny,
        }
    }
}

/// The complete state of the island at one moment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorldState {
    pub clock: WorldClock,

    /// All characters, keyed by id.
    pub characters: HashMap<CharacterId, CharacterRecord>,

    pub inventory: Inventory,

    pub equipment: Equipment,

    /// Structures standing on the map.
    pub constructions: HashSet<ConstructionId>,

    pub flags: FlagStore,

    /// Package names of companion apps detected on the device.
    pub installed_apps: HashSet<String>,

    pub player_spouse: Option<CharacterId>,
}

impl WorldState {
    /// Create a world on day 1, sunny morning, with nothing in it.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a character, replacing any record with the same id.
    pub fn add_character(&mut self, character: CharacterRecord) -> CharacterId {
        let id = character.id.clone();
        self.characters.insert(id.clone(), character);
        id
    }

    /// Get character by ID.
    pub fn character(&self, id: &CharacterId) -> Option<&CharacterRecord> {
        self.characters.get(id)
    }

    /// Get mutable character by ID.
    pub fn character_mut(&mut self, id: &CharacterId) -> Option<&mut CharacterRecord> {
        self.characters.get_mut(id)
    }

    /// Move to the next day with the given weather, starting at early morning.
    pub fn advance_day(&mut self, weather: Weather) {
        self.clock.day += 1;
        self.clock.weather = weather;
        self.clock.time_of_day = TimeOfDay::EarlyMorning;
    }

    /// Set the clock from a wall-clock hour.
    pub fn set_hour(&mut self, hour: u8) {
        self.clock.time_of_day = TimeOfDay::from_hour(hour);
    }

    /// Record a structure as built.
    pub fn build(&mut self, construction: impl Into<ConstructionId>) {
        self.constructions.insert(construction.into());
    }

    /// Marry the player to a character. Fails if the player is already
    /// married, the character is unknown, or romance is not maxed.
    pub fn marry_player(&mut self, id: &CharacterId) -> bool {
        if self.player_spouse.is_some() {
            return false;
        }
        let Some(character) = self.characters.get_mut(id) else {
            return false;
        };
        if !can_marry(character) {
            return false;
        }
        character.marry();
        self.player_spouse = Some(id.clone());
        true
    }
}

impl WorldView for WorldState {
    fn day(&self) -> u32 {
        self.clock.day
    }

    fn time_of_day(&self) -> TimeOfDay {
        self.clock.time_of_day
    }

    fn weather(&self) -> Weather {
        self.clock.weather
    }

    fn relationship(&self, character: &CharacterId) -> Option<Relationship> {
        self.characters.get(character).map(|c| c.relationship)
    }

    fn has_item(&self, item: &ItemId, quantity: u32) -> bool {
        self.inventory.has_item(item, quantity)
    }

    fn has_construction(&self, construction: &ConstructionId) -> bool {
        self.constructions.contains(construction)
    }

    fn is_flag_enabled(&self, flag: &FlagId) -> bool {
        self.flags.is_enabled(flag)
    }

    fn is_equipped(&self, item: &ItemId) -> bool {
        self.equipment.is_equipped(item)
    }

    fn is_app_installed(&self, package: &str) -> bool {
        self.installed_apps.contains(package)
    }

    fn player_spouse(&self) -> Option<&CharacterId> {
        self.player_spouse.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Capabilities;
    use crate::mechanics::{EquipmentSlot, ShopType};

    fn cook() -> CharacterRecord {
        CharacterRecord::new("char_02", "Cook")
            .with_capabilities(Capabilities::romanceable(Some(ShopType::Cook)))
    }

    #[test]
    fn test_default_clock() {
        let state = WorldState::new();
        assert_eq!(state.day(), 1);
        assert_eq!(state.time_of_day(), TimeOfDay::Morning);
        assert_eq!(state.weather(), Weather::Sunny);
    }

    #[test]
    fn test_advance_day() {
        let mut state = WorldState::new();
        state.set_hour(20);
        assert_eq!(state.time_of_day(), TimeOfDay::Evening);

        state.advance_day(Weather::Rainy);
        assert_eq!(state.day(), 2);
        assert_eq!(state.weather(), Weather::Rainy);
        assert_eq!(state.time_of_day(), TimeOfDay::EarlyMorning);
    }

    #[test]
    fn test_relationship_lookup() {
        let mut state = WorldState::new();
        let id = state.add_character(cook());
        state.character_mut(&id).unwrap().set_romance(45);

        assert_eq!(state.relationship(&id).unwrap().romance, 45);
        assert!(state.relationship(&CharacterId::new("nobody")).is_none());
    }

    #[test]
    fn test_view_queries() {
        let mut state = WorldState::new();
        state.inventory.add("fish", 2);
        state.build("workbench");
        state.flags.set("festival", true);
        state.equipment.equip(EquipmentSlot::Accessory2, "straw_hat");
        state.installed_apps.insert("com.example.patch".to_string());

        assert!(state.has_item(&ItemId::new("fish"), 2));
        assert!(state.has_construction(&ConstructionId::new("workbench")));
        assert!(state.is_flag_enabled(&FlagId::new("festival")));
        assert!(state.is_equipped(&ItemId::new("straw_hat")));
        assert!(state.is_app_installed("com.example.patch"));
        assert!(!state.is_app_installed("com.example.other"));
    }

    #[test]
    fn test_marry_player() {
        let mut state = WorldState::new();
        let id = state.add_character(cook());

        assert!(!state.marry_player(&id));
        state.character_mut(&id).unwrap().set_romance(100);
        assert!(state.marry_player(&id));
        assert_eq!(state.player_spouse(), Some(&id));
        assert!(state.character(&id).unwrap().relationship.married);
        assert!(!state.marry_player(&id));
    }
}
