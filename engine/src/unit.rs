use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::abilities::Ability;
use crate::dungeon::RoomId;
use crate::equipment::{Inventory, Slot};
use crate::items::ItemId;
use crate::stats::{StatBlock, Stats};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Faction {
    Character,
    Monster,
}

impl Faction {
    pub fn opponent(self) -> Faction {
        match self {
            Faction::Character => Faction::Monster,
            Faction::Monster => Faction::Character,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Unit {
    pub id: UnitId,
    pub name: String,
    pub class: String,
    pub level: u32,
    pub faction: Faction,
    pub stats: Stats,
    pub inventory: Inventory,
    abilities: IndexSet<Ability>,
    /// Where the unit stands. Navigational only.
    pub room: Option<RoomId>,
    /// Turns left during which enemies must target this unit.
    pub taunt_turns: u8,
}

impl Unit {
    pub fn new(
        id: UnitId,
        name: impl Into<String>,
        class: impl Into<String>,
        level: u32,
        faction: Faction,
        stats: Stats,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            class: class.into(),
            level,
            faction,
            stats,
            inventory: Inventory::new(id),
            abilities: IndexSet::new(),
            room: None,
            taunt_turns: 0,
        }
    }

    pub fn is_alive(&self) -> bool {
        !self.stats.is_defeated()
    }

    /// Returns false when the ability was already granted.
    pub fn grant(&mut self, ability: Ability) -> bool {
        self.abilities.insert(ability)
    }

    pub fn has(&self, ability: Ability) -> bool {
        self.abilities.contains(&ability)
    }

    pub fn abilities(&self) -> impl Iterator<Item = Ability> + '_ {
        self.abilities.iter().copied()
    }

    pub fn is_taunting(&self) -> bool {
        self.taunt_turns > 0 && self.is_alive()
    }

    /// Fly is passive: it lifts the holder for as long as the holder stands.
    pub fn is_flying(&self) -> bool {
        self.has(Ability::Fly) && self.is_alive()
    }
}

/// One line of an item listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemLine {
    pub item: ItemId,
    pub name: String,
    pub slot: Slot,
    pub quantity: u32,
    pub durability: Option<(u32, u32)>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AbilityLine {
    pub ability: Ability,
    pub name: String,
    pub description: String,
}

/// Read-only projection of a unit for presentation layers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitSheet {
    pub id: UnitId,
    pub name: String,
    pub class: String,
    pub level: u32,
    pub faction: Faction,
    pub hit_points: u32,
    pub max_hit_points: u32,
    pub health_ratio: f32,
    pub stats: StatBlock,
    pub equipped: Vec<ItemLine>,
    pub carried: Vec<ItemLine>,
    pub abilities: Vec<AbilityLine>,
    pub room: Option<String>,
}
