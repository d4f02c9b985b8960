//! World files and the worlds shipped with the engine.
//!
//! A world file names everything by string key. Item entries are templates:
//! each inventory line that mentions one gets its own fresh instance, so no
//! two units ever wear down the same durability counter.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::Dice;
use crate::abilities::Ability;
use crate::dungeon::{Direction, RoomId};
use crate::equipment::Slot;
use crate::error::BuildError;
use crate::items::Item;
use crate::rules::SlotPolicy;
use crate::stats::StatBlock;
use crate::unit::Faction;
use crate::world::World;

pub fn builtin_worlds() -> HashMap<&'static str, &'static str> {
    HashMap::from([("intro", include_str!("../content/worlds/intro.yaml"))])
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct WorldFile {
    #[serde(default)]
    pub slot_policy: SlotPolicy,
    /// Seeds the placement of units that do not name a room.
    #[serde(default)]
    pub placement_seed: u64,
    #[serde(default)]
    pub items: IndexMap<String, Item>,
    #[serde(default)]
    pub rooms: IndexMap<String, RoomSpec>,
    #[serde(default)]
    pub edges: Vec<EdgeSpec>,
    #[serde(default)]
    pub dungeons: Vec<DungeonSpec>,
    #[serde(default)]
    pub units: Vec<UnitSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomSpec {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeSpec {
    pub from: String,
    pub to: String,
    pub direction: Direction,
    /// Also add the reverse edge.
    #[serde(default)]
    pub both: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DungeonSpec {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub start: String,
    pub rooms: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrantSpec {
    pub item: String,
    #[serde(default)]
    pub slot: Slot,
    #[serde(default = "one")]
    pub quantity: u32,
}

fn one() -> u32 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitSpec {
    pub name: String,
    pub class: String,
    #[serde(default = "one")]
    pub level: u32,
    pub faction: Faction,
    pub stats: StatBlock,
    #[serde(default)]
    pub inventory: Vec<GrantSpec>,
    #[serde(default)]
    pub abilities: Vec<Ability>,
    #[serde(default)]
    pub room: Option<String>,
}

impl WorldFile {
    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Resolve every key and build the world.
    pub fn to_world(&self) -> Result<World, BuildError> {
        let mut builder = World::builder().slot_policy(self.slot_policy);

        let mut rooms: HashMap<&str, RoomId> = HashMap::new();
        for (key, spec) in &self.rooms {
            rooms.insert(key.as_str(), builder.add_room(&spec.name, &spec.description));
        }
        let room = |key: &str| {
            rooms
                .get(key)
                .copied()
                .ok_or_else(|| BuildError::UnknownRoomKey(key.to_string()))
        };

        for edge in &self.edges {
            let (from, to) = (room(&edge.from)?, room(&edge.to)?);
            if edge.both {
                builder.link(from, to, edge.direction)?;
            } else {
                builder.add_adjacent_room(from, to, edge.direction)?;
            }
        }

        for dungeon in &self.dungeons {
            let owned = dungeon
                .rooms
                .iter()
                .map(|key| room(key))
                .collect::<Result<Vec<_>, _>>()?;
            builder.add_dungeon(&dungeon.name, &dungeon.description, room(&dungeon.start)?, owned)?;
        }

        let mut names = HashSet::new();
        for spec in &self.units {
            if !names.insert(spec.name.as_str()) {
                return Err(BuildError::DuplicateKey(spec.name.clone()));
            }
            let unit = builder.add_unit(&spec.name, &spec.class, spec.level, spec.faction, spec.stats);
            for grant in &spec.inventory {
                let template = self
                    .items
                    .get(&grant.item)
                    .ok_or_else(|| BuildError::UnknownItemKey(grant.item.clone()))?;
                let item = builder.add_item(template.clone());
                builder.grant_items(unit, item, grant.slot, grant.quantity)?;
            }
            for &ability in &spec.abilities {
                builder.grant_ability(unit, ability)?;
            }
            if let Some(key) = &spec.room {
                builder.place(unit, room(key)?)?;
            }
        }

        // a world without rooms is combat only; its units stay unplaced
        if !builder.graph().is_empty() {
            builder.scatter(&mut Dice::from_seed(self.placement_seed))?;
        }
        let world = builder.build();
        debug!(
            units = world.units().len(),
            rooms = world.graph().len(),
            "world built"
        );
        Ok(world)
    }
}
