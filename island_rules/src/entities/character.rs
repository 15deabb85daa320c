//! Character definitions.
//!
//! Romanceable, rival and general characters share one record type; what a
//! character can do is carried by its [`Capabilities`] and read by the free
//! functions below.

use serde::{Deserialize, Serialize};

use super::{CharacterId, ItemId};
use crate::mechanics::ShopType;

/// Upper bound of friendship and romance.
pub const MAX_AFFINITY: u8 = 100;

/// What a character supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Capabilities {
    /// Romance meter and marriage are available.
    #[serde(default)]
    pub has_romance: bool,
    /// The character is a rival paired with a romanceable character.
    #[serde(default)]
    pub is_rival: bool,
    #[serde(default)]
    pub shop: Option<ShopType>,
}

impl Capabilities {
    /// A character the player can court and marry.
    pub fn romanceable(shop: Option<ShopType>) -> Self {
        Self {
            has_romance: true,
            is_rival: false,
            shop,
        }
    }

    /// A rival who courts a romanceable character on their own timetable.
    pub fn rival() -> Self {
        Self {
            has_romance: false,
            is_rival: true,
            shop: None,
        }
    }

    /// A friendship-only character, optionally running a shop.
    pub fn general(shop: Option<ShopType>) -> Self {
        Self {
            has_romance: false,
            is_rival: false,
            shop,
        }
    }
}

/// Relationship metrics between the player and one character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Relationship {
    /// 0-100.
    #[serde(default)]
    pub friendship: u8,
    /// 0-100. Stays at 0 for characters without romance.
    #[serde(default)]
    pub romance: u8,
    #[serde(default)]
    pub married: bool,
}

/// A character in the world with its relationship state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterRecord {
    pub id: CharacterId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub capabilities: Capabilities,
    #[serde(default)]
    pub relationship: Relationship,
    /// Gifts worth +10 friendship.
    #[serde(default)]
    pub favorite_items: Vec<ItemId>,
    /// Gifts worth -5 friendship.
    #[serde(default)]
    pub disliked_items: Vec<ItemId>,
}

impl CharacterRecord {
    /// Create a general character with no shop and zeroed metrics.
    pub fn new(id: impl Into<CharacterId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            capabilities: Capabilities::default(),
            relationship: Relationship::default(),
            favorite_items: Vec::new(),
            disliked_items: Vec::new(),
        }
    }

    /// Set the capability set.
    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Add favourite gift items.
    pub fn with_favorites<I, T>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<ItemId>,
    {
        self.favorite_items.extend(items.into_iter().map(Into::into));
        self
    }

    /// Add disliked gift items.
    pub fn with_dislikes<I, T>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<ItemId>,
    {
        self.disliked_items.extend(items.into_iter().map(Into::into));
        self
    }

    /// Friendship, 0-100.
    pub fn friendship(&self) -> u8 {
        self.relationship.friendship
    }

    /// Romance, if this character supports it.
    pub fn romance(&self) -> Option<u8> {
        self.capabilities
            .has_romance
            .then_some(self.relationship.romance)
    }

    /// Set friendship directly, clamped to 0-100. Used when loading.
    pub fn set_friendship(&mut self, value: u8) {
        self.relationship.friendship = value.min(MAX_AFFINITY);
    }

    /// Set romance directly, clamped to 0-100. Ignored without romance.
    pub fn set_romance(&mut self, value: u8) {
        if self.capabilities.has_romance {
            self.relationship.romance = value.min(MAX_AFFINITY);
        }
    }

    /// Shift friendship by `delta`, clamped. Returns the applied change.
    pub fn adjust_friendship(&mut self, delta: i32) -> i32 {
        let before = self.relationship.friendship;
        self.relationship.friendship = clamp_affinity(before as i32 + delta);
        self.relationship.friendship as i32 - before as i32
    }

    /// Shift romance by `delta`, clamped. Returns the applied change.
    pub fn adjust_romance(&mut self, delta: i32) -> i32 {
        if !self.capabilities.has_romance {
            return 0;
        }
        let before = self.relationship.romance;
        self.relationship.romance = clamp_affinity(before as i32 + delta);
        self.relationship.romance as i32 - before as i32
    }

    /// Mark the character as married to the player.
    pub fn marry(&mut self) {
        self.relationship.married = true;
    }
}

fn clamp_affinity(value: i32) -> u8 {
    value.clamp(0, MAX_AFFINITY as i32) as u8
}

/// Tiered description of friendship. Rivals use their own ladder.
pub fn friendship_level(character: &CharacterRecord) -> &'static str {
    let friendship = character.relationship.friendship;
    if character.capabilities.is_rival {
        return match friendship {
            80.. => "Best friend",
            60..=79 => "Friend",
            40..=59 => "Acquaintance",
            20..=39 => "Familiar face",
            _ => "Stranger",
        };
    }
    match friendship {
        80.. => "Best friend",
        60..=79 => "Close friend",
        40..=59 => "Friend",
        20..=39 => "Acquaintance",
        _ => "Stranger",
    }
}

/// Tiered description of romance, for characters that have it.
pub fn romance_level(character: &CharacterRecord) -> Option<&'static str> {
    let romance = character.romance()?;
    Some(match romance {
        80.. => "Lover",
        60..=79 => "Fond",
        40..=59 => "Interested",
        20..=39 => "Smitten",
        _ => "None",
    })
}

/// Whether the player may marry this character right now.
pub fn can_marry(character: &CharacterRecord) -> bool {
    character.capabilities.has_romance
        && !character.relationship.married
        && character.relationship.romance >= MAX_AFFINITY
}

/// Friendship delta for gifting `item`.
pub fn item_reaction(character: &CharacterRecord, item: &ItemId) -> i32 {
    if character.favorite_items.contains(item) {
        10
    } else if character.disliked_items.contains(item) {
        -5
    } else {
        2
    }
}

/// One-line summary for debug output.
pub fn summary(character: &CharacterRecord) -> String {
    let mut line = character.name.clone();
    if let Some(shop) = character.capabilities.shop {
        line.push_str(&format!(" [{}]", shop.label()));
    }
    if character.relationship.married {
        line.push_str(" [married]");
    }
    line.push_str(&format!(
        " - friendship {} ({})",
        character.relationship.friendship,
        friendship_level(character)
    ));
    if let (Some(romance), Some(level)) = (character.romance(), romance_level(character)) {
        line.push_str(&format!(", romance {} ({})", romance, level));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cook() -> CharacterRecord {
        CharacterRecord::new("char_02", "Cook")
            .with_capabilities(Capabilities::romanceable(Some(ShopType::Cook)))
            .with_favorites(["fish", "coconut"])
            .with_dislikes(["stone"])
    }

    #[test]
    fn test_new_character() {
        let character = CharacterRecord::new("char_04", "Scientist");
        assert_eq!(character.friendship(), 0);
        assert!(character.romance().is_none());
        assert!(!character.relationship.married);
    }

    #[test]
    fn test_adjust_clamps() {
        let mut character = cook();
        assert_eq!(character.adjust_friendship(120), 100);
        assert_eq!(character.friendship(), 100);
        assert_eq!(character.adjust_friendship(-130), -100);
        assert_eq!(character.friendship(), 0);
    }

    #[test]
    fn test_romance_requires_capability() {
        let mut scientist = CharacterRecord::new("char_04", "Scientist");
        assert_eq!(scientist.adjust_romance(30), 0);
        assert!(scientist.romance().is_none());

        let mut character = cook();
        assert_eq!(character.adjust_romance(45), 45);
        assert_eq!(character.romance(), Some(45));
    }

    #[test]
    fn test_levels() {
        let mut character = cook();
        character.set_friendship(65);
        character.set_romance(45);
        assert_eq!(friendship_level(&character), "Close friend");
        assert_eq!(romance_level(&character), Some("Interested"));

        let mut rival = CharacterRecord::new("rival_02", "Rival cook")
            .with_capabilities(Capabilities::rival());
        rival.set_friendship(65);
        assert_eq!(friendship_level(&rival), "Friend");
        assert_eq!(romance_level(&rival), None);
    }

    #[test]
    fn test_can_marry() {
        let mut character = cook();
        character.set_romance(99);
        assert!(!can_marry(&character));
        character.set_romance(100);
        assert!(can_marry(&character));
        character.marry();
        assert!(!can_marry(&character));
    }

    #[test]
    fn test_item_reaction() {
        let character = cook();
        assert_eq!(item_reaction(&character, &ItemId::new("fish")), 10);
        assert_eq!(item_reaction(&character, &ItemId::new("stone")), -5);
        assert_eq!(item_reaction(&character, &ItemId::new("berry")), 2);
    }

    #[test]
    fn test_summary_mentions_shop_and_romance() {
        let mut character = cook();
        character.set_romance(85);
        let line = summary(&character);
        assert!(line.contains("[Cook]"));
        assert!(line.contains("romance 85 (Lover)"));
    }
}
