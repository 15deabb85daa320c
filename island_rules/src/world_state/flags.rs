//! Named boolean flags set by scenarios and read by schedule rules.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::entities::FlagId;

/// Flag store. Absent flags read as disabled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlagStore {
    flags: BTreeMap<FlagId, bool>,
}

impl FlagStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a flag, returning its previous value.
    pub fn set(&mut self, flag: impl Into<FlagId>, value: bool) -> Option<bool> {
        self.flags.insert(flag.into(), value)
    }

    /// Whether a flag is present and true.
    pub fn is_enabled(&self, flag: &FlagId) -> bool {
        self.flags.get(flag).copied().unwrap_or(false)
    }

    /// Remove a flag entirely.
    pub fn remove(&mut self, flag: &FlagId) -> Option<bool> {
        self.flags.remove(flag)
    }

    /// Flip a flag. An absent flag becomes true.
    pub fn toggle(&mut self, flag: impl Into<FlagId>) -> bool {
        let flag = flag.into();
        let value = !self.is_enabled(&flag);
        self.flags.insert(flag, value);
        value
    }

    pub fn clear(&mut self) {
        self.flags.clear();
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// Iterate in flag id order.
    pub fn iter(&self) -> impl Iterator<Item = (&FlagId, bool)> {
        self.flags.iter().map(|(id, value)| (id, *value))
    }
}

impl FromIterator<(FlagId, bool)> for FlagStore {
    fn from_iter<T: IntoIterator<Item = (FlagId, bool)>>(iter: T) -> Self {
        Self {
            flags: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_flag_is_disabled() {
        let flags = FlagStore::new();
        assert!(!flags.is_enabled(&FlagId::new("met_scientist")));
    }

    #[test]
    fn test_set_toggle_remove() {
        let mut flags = FlagStore::new();
        assert_eq!(flags.set("met_scientist", true), None);
        assert!(flags.is_enabled(&FlagId::new("met_scientist")));

        assert!(!flags.toggle("met_scientist"));
        assert!(flags.toggle("festival_started"));
        assert_eq!(flags.len(), 2);

        flags.remove(&FlagId::new("festival_started"));
        assert!(!flags.is_enabled(&FlagId::new("festival_started")));
        assert_eq!(flags.len(), 1);
    }

    #[test]
    fn test_iteration_is_ordered() {
        let flags: FlagStore = [
            (FlagId::new("b"), true),
            (FlagId::new("a"), false),
        ]
        .into_iter()
        .collect();
        let ids: Vec<_> = flags.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }
}
