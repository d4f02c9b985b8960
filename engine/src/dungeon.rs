//! Rooms and the directed edges between them.
//!
//! Rooms live in one arena and refer to each other by [`RoomId`]. Adding an
//! edge never adds its reverse; callers that want a two-way passage use
//! [`DungeonGraph::link`].

use std::collections::{HashSet, VecDeque};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::Dice;
use crate::error::RuleError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoomId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::North, Direction::South, Direction::East, Direction::West];

    pub fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Room {
    pub id: RoomId,
    pub name: String,
    pub description: String,
    exits: IndexMap<Direction, RoomId>,
}

impl Room {
    pub fn exit(&self, direction: Direction) -> Option<RoomId> {
        self.exits.get(&direction).copied()
    }

    pub fn exits(&self) -> impl Iterator<Item = (Direction, RoomId)> + '_ {
        self.exits.iter().map(|(d, r)| (*d, *r))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DungeonGraph {
    rooms: Vec<Room>,
}

impl DungeonGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_room(&mut self, name: impl Into<String>, description: impl Into<String>) -> RoomId {
        let id = RoomId(self.rooms.len());
        self.rooms.push(Room {
            id,
            name: name.into(),
            description: description.into(),
            exits: IndexMap::new(),
        });
        id
    }

    pub fn room(&self, id: RoomId) -> Result<&Room, RuleError> {
        self.rooms.get(id.0).ok_or(RuleError::UnknownRoom(id))
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    pub fn find(&self, name: &str) -> Option<RoomId> {
        self.rooms
            .iter()
            .find(|r| r.name.eq_ignore_ascii_case(name))
            .map(|r| r.id)
    }

    /// One-way edge `from -> to`. Replaces any earlier edge leaving `from` in that direction.
    pub fn add_adjacent_room(
        &mut self,
        from: RoomId,
        to: RoomId,
        direction: Direction,
    ) -> Result<Option<RoomId>, RuleError> {
        self.room(to)?;
        let room = self.rooms.get_mut(from.0).ok_or(RuleError::UnknownRoom(from))?;
        Ok(room.exits.insert(direction, to))
    }

    /// Edge `a -> b` in `direction` plus the reverse edge `b -> a`.
    pub fn link(&mut self, a: RoomId, b: RoomId, direction: Direction) -> Result<(), RuleError> {
        self.add_adjacent_room(a, b, direction)?;
        self.add_adjacent_room(b, a, direction.opposite())?;
        Ok(())
    }

    pub fn move_from(&self, room: RoomId, direction: Direction) -> Result<RoomId, RuleError> {
        self.room(room)?
            .exit(direction)
            .ok_or(RuleError::NoExit { room, direction })
    }

    pub fn exits(&self, room: RoomId) -> Result<Vec<(Direction, RoomId)>, RuleError> {
        Ok(self.room(room)?.exits().collect())
    }

    /// Uniform over every room in the graph, reachable or not.
    pub fn random_room(&self, dice: &mut Dice) -> Option<RoomId> {
        dice.pick(self.rooms.len()).map(RoomId)
    }

    /// Rooms reachable from `from` by following edges, `from` included, in breadth-first order.
    pub fn reachable(&self, from: RoomId) -> Result<Vec<RoomId>, RuleError> {
        self.room(from)?;
        let mut seen = HashSet::from([from]);
        let mut order = vec![from];
        let mut queue = VecDeque::from([from]);
        while let Some(current) = queue.pop_front() {
            for (_, next) in self.rooms[current.0].exits() {
                if seen.insert(next) {
                    order.push(next);
                    queue.push_back(next);
                }
            }
        }
        Ok(order)
    }

    /// Shortest list of moves leading from `from` to `to`, if one exists.
    pub fn route(&self, from: RoomId, to: RoomId) -> Result<Option<Vec<Direction>>, RuleError> {
        self.room(from)?;
        self.room(to)?;
        let mut came_from: IndexMap<RoomId, (RoomId, Direction)> = IndexMap::new();
        let mut queue = VecDeque::from([from]);
        let mut seen = HashSet::from([from]);
        while let Some(current) = queue.pop_front() {
            if current == to {
                let mut path = Vec::new();
                let mut at = to;
                while let Some(&(prev, dir)) = came_from.get(&at) {
                    path.push(dir);
                    at = prev;
                }
                path.reverse();
                return Ok(Some(path));
            }
            for (dir, next) in self.rooms[current.0].exits() {
                if seen.insert(next) {
                    came_from.insert(next, (current, dir));
                    queue.push_back(next);
                }
            }
        }
        Ok(None)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dungeon {
    pub name: String,
    pub description: String,
    pub starting_room: RoomId,
    pub rooms: Vec<RoomId>,
}

impl Dungeon {
    pub fn contains(&self, room: RoomId) -> bool {
        self.rooms.contains(&room)
    }

    /// Uniform over this dungeon's rooms.
    pub fn random_room(&self, dice: &mut Dice) -> Option<RoomId> {
        dice.pick(self.rooms.len()).map(|i| self.rooms[i])
    }
}

/// Read-only projection of a room for presentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomView {
    pub name: String,
    pub description: String,
    pub exits: Vec<(Direction, String)>,
}

impl DungeonGraph {
    pub fn view(&self, id: RoomId) -> Result<RoomView, RuleError> {
        let room = self.room(id)?;
        Ok(RoomView {
            name: room.name.clone(),
            description: room.description.clone(),
            exits: room
                .exits()
                .map(|(d, to)| (d, self.rooms[to.0].name.clone()))
                .collect(),
        })
    }
}
