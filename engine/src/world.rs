use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use crate::Dice;
use crate::abilities::Ability;
use crate::dungeon::{Direction, Dungeon, DungeonGraph, RoomId};
use crate::equipment::{Binding, BindingView, Slot};
use crate::error::{BuildError, RuleError};
use crate::items::{Armor, ArmorType, Item, ItemId, Weapon};
use crate::rules::SlotPolicy;
use crate::stats::Stats;
use crate::unit::{AbilityLine, Faction, ItemLine, Unit, UnitId, UnitSheet};

/// Everything the engine plays on: units, item instances and the room graph.
///
/// Built once through [`WorldBuilder`]; afterwards the room graph is fixed and
/// only units, their bindings and item durability change.
#[derive(Debug, Clone, Serialize)]
pub struct World {
    items: Vec<Item>,
    units: Vec<Unit>,
    graph: DungeonGraph,
    dungeons: Vec<Dungeon>,
}

impl World {
    pub fn builder() -> WorldBuilder {
        WorldBuilder::default()
    }

    pub fn unit(&self, id: UnitId) -> Result<&Unit, RuleError> {
        self.units.get(id.0).ok_or(RuleError::UnknownUnit(id))
    }

    pub fn unit_mut(&mut self, id: UnitId) -> Result<&mut Unit, RuleError> {
        self.units.get_mut(id.0).ok_or(RuleError::UnknownUnit(id))
    }

    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    pub fn find_unit(&self, name: &str) -> Option<UnitId> {
        self.units
            .iter()
            .find(|u| u.name.eq_ignore_ascii_case(name))
            .map(|u| u.id)
    }

    pub fn faction(&self, faction: Faction) -> Vec<UnitId> {
        self.units
            .iter()
            .filter(|u| u.faction == faction)
            .map(|u| u.id)
            .collect()
    }

    pub fn item(&self, id: ItemId) -> Result<&Item, RuleError> {
        self.items.get(id.0 as usize).ok_or(RuleError::UnknownItem(id))
    }

    pub fn item_mut(&mut self, id: ItemId) -> Result<&mut Item, RuleError> {
        self.items.get_mut(id.0 as usize).ok_or(RuleError::UnknownItem(id))
    }

    pub fn graph(&self) -> &DungeonGraph {
        &self.graph
    }

    pub fn dungeons(&self) -> &[Dungeon] {
        &self.dungeons
    }

    pub fn dungeon(&self, name: &str) -> Option<&Dungeon> {
        self.dungeons.iter().find(|d| d.name.eq_ignore_ascii_case(name))
    }

    /* ---------------- equipment ---------------- */

    pub fn equip(&mut self, unit: UnitId, item: ItemId, slot: Slot) -> Result<Option<ItemId>, RuleError> {
        let capability = self.item(item)?.capability();
        self.unit_mut(unit)?.inventory.equip(item, capability, slot)
    }

    /// Equip `item` into the slot its family belongs to.
    pub fn equip_natural(&mut self, unit: UnitId, item: ItemId) -> Result<Option<ItemId>, RuleError> {
        let slot = Slot::natural(self.item(item)?.capability());
        self.equip(unit, item, slot)
    }

    pub fn unequip(&mut self, unit: UnitId, item: ItemId) -> Result<(), RuleError> {
        let capability = self.item(item)?.capability();
        self.unit_mut(unit)?.inventory.unequip(item, capability)
    }

    pub fn equipped_weapon(&self, unit: UnitId) -> Result<Option<(ItemId, &Weapon)>, RuleError> {
        let Some(id) = self.unit(unit)?.inventory.weapon() else {
            return Ok(None);
        };
        Ok(self.item(id)?.weapon().map(|w| (id, w)))
    }

    pub fn equipped_armor(
        &self,
        unit: UnitId,
        armor: ArmorType,
    ) -> Result<Option<(ItemId, &Armor)>, RuleError> {
        let Some(id) = self.unit(unit)?.inventory.armor(armor) else {
            return Ok(None);
        };
        Ok(self.item(id)?.armor().map(|a| (id, a)))
    }

    /// Equipped items in slot order.
    pub fn equipped(&self, unit: UnitId) -> Result<Vec<(Slot, ItemId)>, RuleError> {
        Ok(self.unit(unit)?.inventory.equipped().map(|(s, b)| (s, b.item)).collect())
    }

    pub fn is_equipped(&self, unit: UnitId, item: ItemId) -> Result<bool, RuleError> {
        Ok(self.unit(unit)?.inventory.is_equipped(item))
    }

    pub fn unequipped(&self, unit: UnitId) -> Result<Vec<ItemId>, RuleError> {
        Ok(self.unit(unit)?.inventory.carried().iter().map(|b| b.item).collect())
    }

    pub fn bindings(&self, unit: UnitId) -> Result<Vec<BindingView>, RuleError> {
        Ok(self.unit(unit)?.inventory.bindings())
    }

    /* ---------------- navigation ---------------- */

    /// Step `unit` through the exit in `direction` of its current room.
    pub fn move_unit(&mut self, unit: UnitId, direction: Direction) -> Result<RoomId, RuleError> {
        let room = self.unit(unit)?.room.ok_or(RuleError::NotInRoom(unit))?;
        let next = self.graph.move_from(room, direction)?;
        self.unit_mut(unit)?.room = Some(next);
        debug!(?unit, from = ?room, to = ?next, "moved");
        Ok(next)
    }

    pub fn units_in(&self, room: RoomId) -> Vec<UnitId> {
        self.units
            .iter()
            .filter(|u| u.room == Some(room))
            .map(|u| u.id)
            .collect()
    }

    /* ---------------- projections ---------------- */

    fn item_line(&self, view: BindingView) -> Result<ItemLine, RuleError> {
        let item = self.item(view.item)?;
        Ok(ItemLine {
            item: view.item,
            name: item.name().to_string(),
            slot: view.slot,
            quantity: view.quantity,
            durability: item.durability().map(|d| (d.current(), d.max())),
        })
    }

    pub fn sheet(&self, id: UnitId) -> Result<UnitSheet, RuleError> {
        let unit = self.unit(id)?;
        let mut equipped = Vec::new();
        let mut carried = Vec::new();
        for view in unit.inventory.bindings() {
            let line = self.item_line(view)?;
            if view.slot == Slot::None {
                carried.push(line);
            } else {
                equipped.push(line);
            }
        }
        let room = match unit.room {
            Some(room) => Some(self.graph.room(room)?.name.clone()),
            None => None,
        };
        Ok(UnitSheet {
            id,
            name: unit.name.clone(),
            class: unit.class.clone(),
            level: unit.level,
            faction: unit.faction,
            hit_points: unit.stats.hit_points(),
            max_hit_points: unit.stats.max_hit_points(),
            health_ratio: unit.stats.health_ratio(),
            stats: unit.stats.block(),
            equipped,
            carried,
            abilities: unit
                .abilities()
                .map(|a| AbilityLine {
                    ability: a,
                    name: a.name().to_string(),
                    description: a.description().to_string(),
                })
                .collect(),
            room,
        })
    }
}

/// Collects rooms, items and units, then hands out one [`World`].
#[derive(Debug, Default)]
pub struct WorldBuilder {
    items: Vec<Item>,
    units: Vec<Unit>,
    graph: DungeonGraph,
    dungeons: Vec<Dungeon>,
    owners: HashMap<ItemId, UnitId>,
    policy: SlotPolicy,
}

impl WorldBuilder {
    pub fn slot_policy(mut self, policy: SlotPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn add_item(&mut self, item: Item) -> ItemId {
        let id = ItemId(self.items.len() as u32);
        self.items.push(item);
        id
    }

    pub fn add_room(&mut self, name: impl Into<String>, description: impl Into<String>) -> RoomId {
        self.graph.add_room(name, description)
    }

    pub fn add_adjacent_room(
        &mut self,
        from: RoomId,
        to: RoomId,
        direction: Direction,
    ) -> Result<&mut Self, BuildError> {
        self.graph.add_adjacent_room(from, to, direction)?;
        Ok(self)
    }

    pub fn link(&mut self, a: RoomId, b: RoomId, direction: Direction) -> Result<&mut Self, BuildError> {
        self.graph.link(a, b, direction)?;
        Ok(self)
    }

    pub fn add_dungeon(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        starting_room: RoomId,
        mut rooms: Vec<RoomId>,
    ) -> Result<&mut Self, BuildError> {
        let name = name.into();
        if rooms.is_empty() {
            return Err(BuildError::EmptyDungeon(name));
        }
        for room in rooms.iter().chain([&starting_room]) {
            self.graph.room(*room)?;
        }
        if !rooms.contains(&starting_room) {
            rooms.insert(0, starting_room);
        }
        self.dungeons.push(Dungeon { name, description: description.into(), starting_room, rooms });
        Ok(self)
    }

    pub fn add_unit(
        &mut self,
        name: impl Into<String>,
        class: impl Into<String>,
        level: u32,
        faction: Faction,
        stats: impl Into<Stats>,
    ) -> UnitId {
        let id = UnitId(self.units.len());
        self.units.push(Unit::new(id, name, class, level, faction, stats.into()));
        id
    }

    fn unit_mut(&mut self, id: UnitId) -> Result<&mut Unit, BuildError> {
        self.units.get_mut(id.0).ok_or(BuildError::Invalid(RuleError::UnknownUnit(id)))
    }

    pub fn grant_item(&mut self, unit: UnitId, item: ItemId, slot: Slot) -> Result<&mut Self, BuildError> {
        self.grant_items(unit, item, slot, 1)
    }

    /// Bind `quantity` of `item` to `unit` in `slot`, displacing any earlier occupant of that slot.
    pub fn grant_items(
        &mut self,
        unit: UnitId,
        item: ItemId,
        slot: Slot,
        quantity: u32,
    ) -> Result<&mut Self, BuildError> {
        let capability = self
            .items
            .get(item.0 as usize)
            .ok_or(RuleError::UnknownItem(item))?
            .capability();
        if let Some(&owner) = self.owners.get(&item) {
            if owner != unit {
                return Err(BuildError::SharedItem { item, owner });
            }
        }
        let policy = self.policy;
        let target = self.unit_mut(unit)?;
        target
            .inventory
            .stow(Binding { item, quantity }, capability, slot, policy)
            .map_err(|source| BuildError::Rule { unit: target.name.clone(), source })?;
        self.owners.insert(item, unit);
        Ok(self)
    }

    pub fn grant_ability(&mut self, unit: UnitId, ability: Ability) -> Result<&mut Self, BuildError> {
        self.unit_mut(unit)?.grant(ability);
        Ok(self)
    }

    pub fn place(&mut self, unit: UnitId, room: RoomId) -> Result<&mut Self, BuildError> {
        self.graph.room(room)?;
        self.unit_mut(unit)?.room = Some(room);
        Ok(self)
    }

    /// Place every unit without a room into a uniformly random one.
    pub fn scatter(&mut self, dice: &mut Dice) -> Result<&mut Self, BuildError> {
        for unit in self.units.iter_mut().filter(|u| u.room.is_none()) {
            unit.room = Some(self.graph.random_room(dice).ok_or(BuildError::NoRooms)?);
        }
        Ok(self)
    }

    pub fn graph(&self) -> &DungeonGraph {
        &self.graph
    }

    pub fn build(self) -> World {
        World {
            items: self.items,
            units: self.units,
            graph: self.graph,
            dungeons: self.dungeons,
        }
    }
}
