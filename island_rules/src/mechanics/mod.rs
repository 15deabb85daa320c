//! Game mechanics: time-of-day bands, weather, map locations, shops, equipment slots.

use serde::{Deserialize, Serialize};

/// The five bands of the in-game day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum TimeOfDay {
    /// 5:00 - 7:59.
    EarlyMorning,
    /// 8:00 - 10:59.
    #[default]
    Morning,
    /// 11:00 - 16:59.
    Noon,
    /// 17:00 - 23:59.
    Evening,
    /// 0:00 - 4:59.
    Midnight,
}

impl TimeOfDay {
    /// Every band, in the order a day passes through them.
    pub const ALL: [TimeOfDay; 5] = [
        TimeOfDay::EarlyMorning,
        TimeOfDay::Morning,
        TimeOfDay::Noon,
        TimeOfDay::Evening,
        TimeOfDay::Midnight,
    ];

    /// Map a wall-clock hour (0-23) to its band. Hours past 23 wrap.
    pub fn from_hour(hour: u8) -> Self {
        match hour % 24 {
            0..=4 => TimeOfDay::Midnight,
            5..=7 => TimeOfDay::EarlyMorning,
            8..=10 => TimeOfDay::Morning,
            11..=16 => TimeOfDay::Noon,
            _ => TimeOfDay::Evening,
        }
    }

    /// The hour at which this band starts.
    pub fn start_hour(&self) -> u8 {
        match self {
            TimeOfDay::Midnight => 0,
            TimeOfDay::EarlyMorning => 5,
            TimeOfDay::Morning => 8,
            TimeOfDay::Noon => 11,
            TimeOfDay::Evening => 17,
        }
    }

    /// The band that follows this one.
    pub fn next(&self) -> Self {
        match self {
            TimeOfDay::Midnight => TimeOfDay::EarlyMorning,
            TimeOfDay::EarlyMorning => TimeOfDay::Morning,
            TimeOfDay::Morning => TimeOfDay::Noon,
            TimeOfDay::Noon => TimeOfDay::Evening,
            TimeOfDay::Evening => TimeOfDay::Midnight,
        }
    }

    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            TimeOfDay::EarlyMorning => "Early morning",
            TimeOfDay::Morning => "Morning",
            TimeOfDay::Noon => "Noon",
            TimeOfDay::Evening => "Evening",
            TimeOfDay::Midnight => "Midnight",
        }
    }
}

/// Weather for the current day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Weather {
    #[default]
    Sunny,
    Cloudy,
    Rainy,
    Stormy,
}

impl Weather {
    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            Weather::Sunny => "Sunny",
            Weather::Cloudy => "Cloudy",
            Weather::Rainy => "Rainy",
            Weather::Stormy => "Stormy",
        }
    }
}

/// Locations on the island map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum MapLocation {
    #[default]
    Beach,
    Forest,
    Mountain,
    River,
}

impl MapLocation {
    pub const ALL: [MapLocation; 4] = [
        MapLocation::Beach,
        MapLocation::Forest,
        MapLocation::Mountain,
        MapLocation::River,
    ];

    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            MapLocation::Beach => "Beach",
            MapLocation::Forest => "Forest",
            MapLocation::Mountain => "Mountain",
            MapLocation::River => "River",
        }
    }
}

/// The kind of shop a character runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShopType {
    /// Builds houses and tools.
    Craftsman,
    /// Restores health and stamina.
    Doctor,
    /// Sells crafting materials.
    Scientist,
    /// Sells recipes.
    Cook,
    /// Reserved for a character whose trade is not decided yet.
    Undefined,
}

impl ShopType {
    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            ShopType::Craftsman => "Craftsman",
            ShopType::Doctor => "Doctor",
            ShopType::Scientist => "Scientist",
            ShopType::Cook => "Cook",
            ShopType::Undefined => "Undecided",
        }
    }
}

/// Accessory slots the player can equip items into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EquipmentSlot {
    Accessory1,
    Accessory2,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_of_day_boundaries() {
        assert_eq!(TimeOfDay::from_hour(0), TimeOfDay::Midnight);
        assert_eq!(TimeOfDay::from_hour(4), TimeOfDay::Midnight);
        assert_eq!(TimeOfDay::from_hour(5), TimeOfDay::EarlyMorning);
        assert_eq!(TimeOfDay::from_hour(7), TimeOfDay::EarlyMorning);
        assert_eq!(TimeOfDay::from_hour(8), TimeOfDay::Morning);
        assert_eq!(TimeOfDay::from_hour(10), TimeOfDay::Morning);
        assert_eq!(TimeOfDay::from_hour(11), TimeOfDay::Noon);
        assert_eq!(TimeOfDay::from_hour(16), TimeOfDay::Noon);
        assert_eq!(TimeOfDay::from_hour(17), TimeOfDay::Evening);
        assert_eq!(TimeOfDay::from_hour(23), TimeOfDay::Evening);
    }

    #[test]
    fn test_start_hour_round_trips() {
        for band in TimeOfDay::ALL {
            assert_eq!(TimeOfDay::from_hour(band.start_hour()), band);
        }
    }

    #[test]
    fn test_next_cycles_through_day() {
        let mut band = TimeOfDay::Midnight;
        for _ in 0..5 {
            band = band.next();
        }
        assert_eq!(band, TimeOfDay::Midnight);
    }
}
