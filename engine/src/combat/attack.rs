use serde::Serialize;
use tracing::debug;

use crate::abilities::Targeting;
use crate::error::RuleError;
use crate::items::{Item, ItemId, Weapon};
use crate::rules::{CombatRules, DurabilityPolicy};
use crate::stats::Stats;
use crate::unit::{Unit, UnitId};
use crate::world::World;
use crate::{percent_check, Dice, PercentRoll};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AttackReport {
    pub actor: UnitId,
    pub target: UnitId,
    pub weapon: ItemId,
    pub hit: PercentRoll,
    /// Only rolled when the swing connects.
    pub crit: Option<PercentRoll>,
    pub damage: u32,
    pub hp_before: u32,
    pub hp_after: u32,
    pub defeated: bool,
    pub durability_left: u32,
}

impl AttackReport {
    pub fn is_crit(&self) -> bool {
        self.crit.is_some_and(|c| c.success)
    }
}

/// How hard `target` is to hit.
pub fn evasion(target: &Unit, rules: &CombatRules) -> u32 {
    let fly = if target.is_flying() { rules.fly_evasion } else { 0 };
    target.stats.speed.saturating_add(target.stats.luck / 2).saturating_add(fly)
}

pub fn hit_chance(weapon: &Weapon, attacker: &Stats, evasion: u32) -> u32 {
    (weapon.hit as i64 + attacker.dexterity as i64 - evasion as i64).clamp(0, 100) as u32
}

pub fn crit_chance(weapon: &Weapon, attacker: &Stats) -> u32 {
    weapon.crit.saturating_add(attacker.luck / 2).min(100)
}

/// Damage before any critical multiplier: physical weapons push Strength
/// against Defense, magic weapons push Magic against Resistance.
pub fn base_damage(item: &Item, attacker: &Stats, defender: &Stats) -> u32 {
    let Some(weapon) = item.weapon() else {
        return 0;
    };
    if item.is_magic() {
        weapon.might.saturating_add(attacker.magic).saturating_sub(defender.resistance)
    } else {
        weapon.might.saturating_add(attacker.strength).saturating_sub(defender.defense)
    }
}

/// Resolve one swing of `actor`'s equipped weapon at `target`.
///
/// Every precondition is checked before any dice is rolled, so an `Err`
/// leaves the world exactly as it was.
pub fn attack(
    world: &mut World,
    dice: &mut Dice,
    rules: &CombatRules,
    actor: UnitId,
    target: UnitId,
) -> Result<AttackReport, RuleError> {
    let attacker = world.unit(actor)?;
    let defender = world.unit(target)?;
    if !attacker.is_alive() {
        return Err(RuleError::UnitDefeated(actor));
    }
    if !defender.is_alive() {
        return Err(RuleError::UnitDefeated(target));
    }
    if attacker.faction == defender.faction {
        return Err(RuleError::TargetingRuleViolation { actor, target, rule: Targeting::Enemy });
    }
    let weapon_id = attacker.inventory.weapon().ok_or(RuleError::NoWeaponEquipped(actor))?;
    let item = world.item(weapon_id)?;
    let weapon = item.weapon().ok_or(RuleError::NoWeaponEquipped(actor))?;
    if weapon.durability.is_exhausted() {
        return Err(RuleError::DurabilityExhausted(weapon_id));
    }

    let chance = hit_chance(weapon, &attacker.stats, evasion(defender, rules));
    let crit_odds = crit_chance(weapon, &attacker.stats);
    let raw = base_damage(item, &attacker.stats, &defender.stats);

    let hit = percent_check(dice, chance);
    let crit = hit.success.then(|| percent_check(dice, crit_odds));
    let damage = match crit {
        Some(c) if c.success => raw.saturating_mul(rules.crit_multiplier),
        Some(_) => raw,
        None => 0,
    };
    debug!(?actor, ?target, roll = hit.roll, chance = hit.chance, ?crit, damage, "attack resolved");

    let stats = &mut world.unit_mut(target)?.stats;
    let hp_before = stats.hit_points();
    let defeated = hit.success && stats.apply_damage(damage);
    let hp_after = stats.hit_points();

    let wears = hit.success || rules.durability == DurabilityPolicy::EveryAttempt;
    let weapon = world
        .item_mut(weapon_id)?
        .weapon_mut()
        .ok_or(RuleError::NoWeaponEquipped(actor))?;
    let durability_left = if wears { weapon.durability.wear() } else { weapon.durability.current() };

    Ok(AttackReport {
        actor,
        target,
        weapon: weapon_id,
        hit,
        crit,
        damage,
        hp_before,
        hp_after,
        defeated,
        durability_left,
    })
}
