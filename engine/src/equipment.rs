//! Item bindings of a single unit.
//!
//! Equipped items live in a map keyed by slot, so two items can never share
//! a slot; everything else is carried in an unordered list.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::RuleError;
use crate::items::{ArmorType, Capability, ItemId};
use crate::rules::SlotPolicy;
use crate::unit::UnitId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    #[default]
    None,
    Weapon,
    Head,
    Chest,
    Legs,
    Feet,
}

impl Slot {
    /// Every slot except `None`, in display order.
    pub const WORN: [Slot; 5] = [Slot::Weapon, Slot::Head, Slot::Chest, Slot::Legs, Slot::Feet];

    pub fn for_armor(armor: ArmorType) -> Slot {
        match armor {
            ArmorType::Head => Slot::Head,
            ArmorType::Chest => Slot::Chest,
            ArmorType::Legs => Slot::Legs,
            ArmorType::Feet => Slot::Feet,
        }
    }

    /// Anything may be carried; worn slots only take the matching capability.
    pub fn accepts(self, capability: Capability) -> bool {
        match (self, capability) {
            (Slot::None, _) => true,
            (Slot::Weapon, Capability::Weapon) => true,
            (slot, Capability::Armor(armor)) => slot == Slot::for_armor(armor),
            _ => false,
        }
    }

    /// The worn slot an item naturally goes to, if any.
    pub fn natural(capability: Capability) -> Slot {
        match capability {
            Capability::Weapon => Slot::Weapon,
            Capability::Armor(armor) => Slot::for_armor(armor),
            Capability::Carried => Slot::None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    pub item: ItemId,
    pub quantity: u32,
}

impl Binding {
    pub fn single(item: ItemId) -> Self {
        Self { item, quantity: 1 }
    }
}

/// Flat read-only view of one binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BindingView {
    pub item: ItemId,
    pub slot: Slot,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Inventory {
    owner: UnitId,
    equipped: IndexMap<Slot, Binding>,
    carried: Vec<Binding>,
}

impl Inventory {
    pub fn new(owner: UnitId) -> Self {
        Self { owner, equipped: IndexMap::new(), carried: Vec::new() }
    }

    pub fn owner(&self) -> UnitId {
        self.owner
    }

    pub fn slot_of(&self, item: ItemId) -> Option<Slot> {
        if let Some((slot, _)) = self.equipped.iter().find(|(_, b)| b.item == item) {
            return Some(*slot);
        }
        self.carried.iter().any(|b| b.item == item).then_some(Slot::None)
    }

    pub fn holds(&self, item: ItemId) -> bool {
        self.slot_of(item).is_some()
    }

    pub fn is_equipped(&self, item: ItemId) -> bool {
        matches!(self.slot_of(item), Some(slot) if slot != Slot::None)
    }

    pub fn in_slot(&self, slot: Slot) -> Option<&Binding> {
        self.equipped.get(&slot)
    }

    pub fn weapon(&self) -> Option<ItemId> {
        self.in_slot(Slot::Weapon).map(|b| b.item)
    }

    pub fn armor(&self, armor: ArmorType) -> Option<ItemId> {
        self.in_slot(Slot::for_armor(armor)).map(|b| b.item)
    }

    /// Equipped bindings in slot order.
    pub fn equipped(&self) -> impl Iterator<Item = (Slot, &Binding)> + '_ {
        Slot::WORN
            .into_iter()
            .filter_map(|slot| self.equipped.get(&slot).map(|b| (slot, b)))
    }

    pub fn carried(&self) -> &[Binding] {
        &self.carried
    }

    pub fn bindings(&self) -> Vec<BindingView> {
        self.equipped()
            .map(|(slot, b)| BindingView { item: b.item, slot, quantity: b.quantity })
            .chain(self.carried.iter().map(|b| BindingView {
                item: b.item,
                slot: Slot::None,
                quantity: b.quantity,
            }))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.equipped.len() + self.carried.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn total_quantity(&self) -> u32 {
        self.equipped.values().chain(self.carried.iter()).fold(0u32, |total, b| total.saturating_add(b.quantity))
    }

    fn detach(&mut self, item: ItemId, from: Slot) -> Option<Binding> {
        if from == Slot::None {
            let idx = self.carried.iter().position(|b| b.item == item)?;
            Some(self.carried.remove(idx))
        } else {
            self.equipped.shift_remove(&from)
        }
    }

    /// Put `item` into `slot`, moving whatever held that slot back to the carried list.
    ///
    /// Equipping to [`Slot::None`] unequips. Returns the displaced item, if any.
    pub fn equip(
        &mut self,
        item: ItemId,
        capability: Capability,
        slot: Slot,
    ) -> Result<Option<ItemId>, RuleError> {
        if !slot.accepts(capability) {
            return Err(RuleError::InvalidSlot { item, slot });
        }
        let current = self
            .slot_of(item)
            .ok_or(RuleError::ItemNotOwned { unit: self.owner, item })?;
        if current == slot {
            return Ok(None);
        }
        let Some(binding) = self.detach(item, current) else {
            return Err(RuleError::ItemNotOwned { unit: self.owner, item });
        };
        if slot == Slot::None {
            self.carried.push(binding);
            debug!(unit = ?self.owner, ?item, "unequipped");
            return Ok(None);
        }
        let displaced = self.equipped.insert(slot, binding).map(|prev| {
            self.carried.push(prev);
            prev.item
        });
        debug!(unit = ?self.owner, ?item, ?slot, ?displaced, "equipped");
        Ok(displaced)
    }

    pub fn unequip(&mut self, item: ItemId, capability: Capability) -> Result<(), RuleError> {
        self.equip(item, capability, Slot::None).map(|_| ())
    }

    /// Initial placement of a binding while a world is being built.
    ///
    /// An item already held only grows in quantity. A worn slot that does not
    /// accept the item is refused or demoted to carried depending on `policy`.
    pub fn stow(
        &mut self,
        binding: Binding,
        capability: Capability,
        slot: Slot,
        policy: SlotPolicy,
    ) -> Result<Option<ItemId>, RuleError> {
        if let Some(existing) = self.binding_mut(binding.item) {
            existing.quantity = existing.quantity.saturating_add(binding.quantity);
            return Ok(None);
        }
        let slot = if slot.accepts(capability) {
            slot
        } else {
            match policy {
                SlotPolicy::Strict => {
                    return Err(RuleError::InvalidSlot { item: binding.item, slot });
                }
                SlotPolicy::Demote => {
                    warn!(unit = ?self.owner, item = ?binding.item, ?slot, "item cannot be worn there; carrying it instead");
                    Slot::None
                }
            }
        };
        self.carried.push(binding);
        self.equip(binding.item, capability, slot)
    }

    fn binding_mut(&mut self, item: ItemId) -> Option<&mut Binding> {
        self.equipped
            .values_mut()
            .chain(self.carried.iter_mut())
            .find(|b| b.item == item)
    }

    pub fn carried_binding_mut(&mut self, item: ItemId) -> Option<&mut Binding> {
        self.carried.iter_mut().find(|b| b.item == item)
    }

    /// Remove and return the carried binding at `index`.
    pub fn take_carried(&mut self, index: usize) -> Option<Binding> {
        (index < self.carried.len()).then(|| self.carried.remove(index))
    }

    pub fn remove_carried(&mut self, item: ItemId) -> Option<Binding> {
        let idx = self.carried.iter().position(|b| b.item == item)?;
        Some(self.carried.remove(idx))
    }

    pub fn put_carried(&mut self, binding: Binding) {
        self.carried.push(binding);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SWORD: ItemId = ItemId(1);
    const AXE: ItemId = ItemId(2);
    const HOOD: ItemId = ItemId(3);

    fn inventory() -> Inventory {
        let mut inv = Inventory::new(UnitId(0));
        inv.put_carried(Binding::single(SWORD));
        inv.put_carried(Binding::single(AXE));
        inv.put_carried(Binding::single(HOOD));
        inv
    }

    #[test]
    fn equipping_displaces_previous_occupant() {
        let mut inv = inventory();
        assert_eq!(inv.equip(SWORD, Capability::Weapon, Slot::Weapon), Ok(None));
        assert_eq!(inv.equip(AXE, Capability::Weapon, Slot::Weapon), Ok(Some(SWORD)));
        assert_eq!(inv.weapon(), Some(AXE));
        assert_eq!(inv.slot_of(SWORD), Some(Slot::None));
        assert_eq!(inv.len(), 3);
    }

    #[test]
    fn armor_only_fits_its_own_slot() {
        let mut inv = inventory();
        let head = Capability::Armor(ArmorType::Head);
        assert_eq!(
            inv.equip(HOOD, head, Slot::Chest),
            Err(RuleError::InvalidSlot { item: HOOD, slot: Slot::Chest })
        );
        assert_eq!(inv.equip(HOOD, head, Slot::Head), Ok(None));
        assert_eq!(inv.armor(ArmorType::Head), Some(HOOD));
    }

    #[test]
    fn unequip_returns_item_to_carried() {
        let mut inv = inventory();
        inv.equip(SWORD, Capability::Weapon, Slot::Weapon).unwrap();
        inv.unequip(SWORD, Capability::Weapon).unwrap();
        assert_eq!(inv.weapon(), None);
        assert_eq!(inv.carried().len(), 3);
    }

    #[test]
    fn stow_merges_quantity_of_known_item() {
        let mut inv = inventory();
        inv.stow(Binding { item: SWORD, quantity: 2 }, Capability::Weapon, Slot::None, SlotPolicy::Strict)
            .unwrap();
        assert_eq!(inv.total_quantity(), 5);
    }
}
