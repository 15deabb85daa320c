//! Entity definitions for the island.

mod character;
mod components;

pub use character::*;
pub use components::*;

use serde::{Deserialize, Serialize};

/// Declares a string-backed content identifier.
///
/// Content ids (`"char_02"`, `"cook_heart1"`, `"workbench"`) are authored by
/// hand, so they stay plain strings rather than generated UUIDs.
macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Create an id from anything string-like.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the raw id.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// An empty id is how content leaves a target unset.
            pub fn is_empty(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id! {
    /// Identifier of a character (romanceable, rival or general).
    CharacterId
}

string_id! {
    /// Identifier of an item definition.
    ItemId
}

string_id! {
    /// Identifier of a buildable structure.
    ConstructionId
}

string_id! {
    /// Identifier of a named boolean flag.
    FlagId
}

string_id! {
    /// Identifier of a narrative event. Unique within a registry.
    EventId
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_id_display_and_borrow() {
        let id = CharacterId::new("char_02");
        assert_eq!(id.to_string(), "char_02");

        let mut map = HashMap::new();
        map.insert(id.clone(), 45);
        assert_eq!(map.get("char_02"), Some(&45));
    }

    #[test]
    fn test_blank_id_is_empty() {
        assert!(FlagId::new("").is_empty());
        assert!(FlagId::new("   ").is_empty());
        assert!(!FlagId::new("beach_party").is_empty());
    }

    #[test]
    fn test_id_serializes_as_plain_string() {
        let id = EventId::from("cook_heart1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"cook_heart1\"");
    }
}
