use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

pub mod abilities;
pub mod api;
pub mod combat;
pub mod content;
pub mod dungeon;
pub mod equipment;
pub mod error;
pub mod items;
pub mod rules;
pub mod select;
pub mod stats;
pub mod unit;
pub mod world;

pub use abilities::{Ability, Targeting};
pub use combat::{Action, AutoTactician, Battle, BattleResult, Tactician};
pub use content::WorldFile;
pub use dungeon::{Direction, Dungeon, DungeonGraph, Room, RoomId, RoomView};
pub use equipment::{Binding, Inventory, Slot};
pub use error::{BuildError, RuleError};
pub use items::{ArmorType, Capability, Item, ItemId};
pub use rules::{CombatRules, DurabilityPolicy, SlotPolicy};
pub use select::{Choice, MenuTactician, ScriptedSelector, Selection, Selector};
pub use stats::{StatBlock, Stats};
pub use unit::{Faction, Unit, UnitId, UnitSheet};
pub use world::{World, WorldBuilder};

enum Source {
    Seeded(ChaCha8Rng),
    Scripted { rolls: Vec<u32>, next: usize },
}

/// The only source of randomness the engine draws from.
pub struct Dice {
    source: Source,
}

impl Dice {
    pub fn from_seed(seed: u64) -> Self {
        Self { source: Source::Seeded(ChaCha8Rng::seed_from_u64(seed)) }
    }

    /// Replays `rolls` in order and starts over once they run out.
    pub fn from_scripted(rolls: Vec<u32>) -> Self {
        let rolls = if rolls.is_empty() { vec![1] } else { rolls };
        Self { source: Source::Scripted { rolls, next: 0 } }
    }

    fn scripted(rolls: &[u32], next: &mut usize) -> u32 {
        let value = rolls[*next % rolls.len()];
        *next += 1;
        value
    }

    /// Percentile roll in `1..=100`.
    pub fn d100(&mut self) -> u32 {
        match &mut self.source {
            Source::Seeded(rng) => rng.gen_range(1..=100),
            Source::Scripted { rolls, next } => Self::scripted(rolls, next).clamp(1, 100),
        }
    }

    /// Uniform index into a collection of `len` elements.
    pub fn pick(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        let idx = match &mut self.source {
            Source::Seeded(rng) => rng.gen_range(0..len),
            Source::Scripted { rolls, next } => Self::scripted(rolls, next) as usize % len,
        };
        Some(idx)
    }
}

/* ---------------- percentile checks ---------------- */

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PercentRoll {
    pub chance: u32,
    pub roll: u32,
    pub success: bool,
}

/// Roll a d100 and succeed when the roll does not exceed `chance`.
pub fn percent_check(dice: &mut Dice, chance: u32) -> PercentRoll {
    let chance = chance.min(100);
    let roll = dice.d100();
    PercentRoll { chance, roll, success: roll <= chance }
}
