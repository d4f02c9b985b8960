use serde::{Deserialize, Serialize};

use crate::stats::Stats;

/// Who an ability may be aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Targeting {
    /// The caster only.
    Caster,
    /// Any unit of the caster's faction, the caster included.
    Ally,
    /// Any unit of the opposing faction.
    Enemy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ability {
    Heal,
    Steal,
    Taunt,
    Fly,
}

pub const HEAL_BASE: u32 = 5;
pub const STEAL_BASE_CHANCE: i64 = 50;
pub const STEAL_CHANCE_PER_POINT: i64 = 5;
pub const STEAL_MIN_CHANCE: i64 = 5;
pub const STEAL_MAX_CHANCE: i64 = 95;

impl Ability {
    pub const ALL: [Ability; 4] = [Ability::Heal, Ability::Steal, Ability::Taunt, Ability::Fly];

    pub fn name(self) -> &'static str {
        match self {
            Ability::Heal => "Heal",
            Ability::Steal => "Steal",
            Ability::Taunt => "Taunt",
            Ability::Fly => "Fly",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Ability::Heal => "Restore an ally's hit points; stronger with Magic.",
            Ability::Steal => "Try to lift an unequipped item from an enemy.",
            Ability::Taunt => "Draw every enemy attack for a few turns.",
            Ability::Fly => "Hover out of reach, making attacks harder to land.",
        }
    }

    pub fn targeting(self) -> Targeting {
        match self {
            Ability::Heal => Targeting::Ally,
            Ability::Steal => Targeting::Enemy,
            Ability::Taunt | Ability::Fly => Targeting::Caster,
        }
    }

    /// Passive abilities act on their own; using them does nothing.
    pub fn is_passive(self) -> bool {
        matches!(self, Ability::Fly)
    }
}

/// Hit points restored by a Heal cast by `caster`.
pub fn heal_amount(caster: &Stats) -> u32 {
    HEAL_BASE + caster.magic / 2
}

/// Percent chance that `thief` lifts an item from `mark`.
pub fn steal_chance(thief: &Stats, mark: &Stats) -> u32 {
    let edge = (thief.dexterity as i64 + thief.luck as i64) - (mark.dexterity as i64 + mark.luck as i64);
    (STEAL_BASE_CHANCE + STEAL_CHANCE_PER_POINT * edge).clamp(STEAL_MIN_CHANCE, STEAL_MAX_CHANCE) as u32
}
