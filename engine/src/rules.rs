use serde::{Deserialize, Serialize};

/// When a weapon loses durability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurabilityPolicy {
    /// Only a swing that connects wears the weapon.
    #[default]
    OnHit,
    /// Every resolved swing wears the weapon, hit or miss.
    EveryAttempt,
}

/// What world construction does with an item authored into a slot it cannot occupy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotPolicy {
    #[default]
    Strict,
    /// Carry the item instead and log a warning.
    Demote,
}

/// Tunable combat constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct CombatRules {
    pub crit_multiplier: u32,
    pub durability: DurabilityPolicy,
    /// Evasion added while a unit holding Fly is alive.
    pub fly_evasion: u32,
    /// Turns a Taunt keeps its caster as the forced target.
    pub taunt_turns: u8,
    /// Safety cap; a battle still running after this many rounds is a draw.
    pub max_rounds: u32,
}

impl Default for CombatRules {
    fn default() -> Self {
        Self {
            crit_multiplier: 2,
            durability: DurabilityPolicy::OnHit,
            fly_evasion: 20,
            taunt_turns: 3,
            max_rounds: 30,
        }
    }
}
