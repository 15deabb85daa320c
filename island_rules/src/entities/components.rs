//! Player-owned components: inventory and equipment.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::ItemId;
use crate::mechanics::EquipmentSlot;

/// Item counts held by the player.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    items: BTreeMap<ItemId, u32>,
}

impl Inventory {
    /// Create an empty inventory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `quantity` of an item. Stacks stop at `u32::MAX`.
    pub fn add(&mut self, item: impl Into<ItemId>, quantity: u32) {
        if quantity == 0 {
            return;
        }
        let held = self.items.entry(item.into()).or_default();
        *held = held.saturating_add(quantity);
    }

    /// Remove `quantity` of an item. Returns false, leaving the stack
    /// untouched, if not enough is held.
    pub fn remove(&mut self, item: &ItemId, quantity: u32) -> bool {
        let Some(held) = self.items.get_mut(item) else {
            return false;
        };
        if *held < quantity {
            return false;
        }
        *held -= quantity;
        if *held == 0 {
            self.items.remove(item);
        }
        true
    }

    /// How many of an item are held.
    pub fn count(&self, item: &ItemId) -> u32 {
        self.items.get(item).copied().unwrap_or(0)
    }

    /// Whether at least `quantity` of an item is held.
    pub fn has_item(&self, item: &ItemId, quantity: u32) -> bool {
        self.count(item) >= quantity
    }

    /// Iterate over held stacks in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&ItemId, u32)> {
        self.items.iter().map(|(id, qty)| (id, *qty))
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Items equipped in accessory slots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equipment {
    #[serde(default)]
    pub accessory1: Option<ItemId>,
    #[serde(default)]
    pub accessory2: Option<ItemId>,
}

impl Equipment {
    /// Equip an item, returning whatever occupied the slot.
    pub fn equip(&mut self, slot: EquipmentSlot, item: impl Into<ItemId>) -> Option<ItemId> {
        self.slot_mut(slot).replace(item.into())
    }

    /// Empty a slot, returning its item.
    pub fn unequip(&mut self, slot: EquipmentSlot) -> Option<ItemId> {
        self.slot_mut(slot).take()
    }

    /// Item in a slot.
    pub fn get(&self, slot: EquipmentSlot) -> Option<&ItemId> {
        match slot {
            EquipmentSlot::Accessory1 => self.accessory1.as_ref(),
            EquipmentSlot::Accessory2 => self.accessory2.as_ref(),
        }
    }

    /// Whether the item sits in any slot.
    pub fn is_equipped(&self, item: &ItemId) -> bool {
        self.accessory1.as_ref() == Some(item) || self.accessory2.as_ref() == Some(item)
    }

    fn slot_mut(&mut self, slot: EquipmentSlot) -> &mut Option<ItemId> {
        match slot {
            EquipmentSlot::Accessory1 => &mut self.accessory1,
            EquipmentSlot::Accessory2 => &mut self.accessory2,
        }
    }
}
