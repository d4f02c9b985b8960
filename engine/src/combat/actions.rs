use serde::Serialize;
use tracing::debug;

use crate::abilities::{heal_amount, steal_chance, Ability, Targeting};
use crate::equipment::Binding;
use crate::error::RuleError;
use crate::items::{ConsumableKind, Item, ItemId};
use crate::rules::CombatRules;
use crate::unit::UnitId;
use crate::world::World;
use crate::{percent_check, Dice, PercentRoll};

pub const POTION_HEAL: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum AbilityOutcome {
    Healed { target: UnitId, amount: u32, hp_after: u32 },
    Stole { roll: PercentRoll, binding: Binding },
    StealFailed { roll: PercentRoll },
    Taunting { turns: u8 },
    /// The ability works on its own and using it changes nothing.
    Passive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ItemOutcome {
    pub item: ItemId,
    pub healed: u32,
    pub hp_after: u32,
    /// One whole unit of the binding was used up.
    pub consumed: bool,
    /// Quantity left in the binding afterwards.
    pub remaining: u32,
}

/// Check that `target` satisfies `rule` relative to `actor`.
pub fn check_target(world: &World, actor: UnitId, target: UnitId, rule: Targeting) -> Result<(), RuleError> {
    let caster = world.unit(actor)?;
    let aimed = world.unit(target)?;
    let ok = match rule {
        Targeting::Caster => actor == target,
        Targeting::Ally => caster.faction == aimed.faction,
        Targeting::Enemy => caster.faction != aimed.faction,
    };
    if ok {
        Ok(())
    } else {
        Err(RuleError::TargetingRuleViolation { actor, target, rule })
    }
}

/// Use one of `actor`'s abilities on `target`.
///
/// Ownership, targeting and the per-ability preconditions are all checked
/// before any roll, so a refused use leaves the world untouched.
pub fn use_ability(
    world: &mut World,
    dice: &mut Dice,
    rules: &CombatRules,
    actor: UnitId,
    ability: Ability,
    target: UnitId,
) -> Result<AbilityOutcome, RuleError> {
    let caster = world.unit(actor)?;
    if !caster.is_alive() {
        return Err(RuleError::UnitDefeated(actor));
    }
    if !caster.has(ability) {
        return Err(RuleError::AbilityNotOwned { unit: actor, ability });
    }
    check_target(world, actor, target, ability.targeting())?;

    let outcome = match ability {
        Ability::Heal => {
            if !world.unit(target)?.is_alive() {
                return Err(RuleError::UnitDefeated(target));
            }
            let amount = heal_amount(&world.unit(actor)?.stats);
            let stats = &mut world.unit_mut(target)?.stats;
            let amount = stats.heal(amount);
            AbilityOutcome::Healed { target, amount, hp_after: stats.hit_points() }
        }
        Ability::Steal => steal(world, dice, actor, target)?,
        Ability::Taunt => {
            let unit = world.unit_mut(actor)?;
            unit.taunt_turns = rules.taunt_turns;
            AbilityOutcome::Taunting { turns: rules.taunt_turns }
        }
        Ability::Fly => AbilityOutcome::Passive,
    };
    debug!(?actor, ?ability, ?target, ?outcome, "ability used");
    Ok(outcome)
}

fn steal(world: &mut World, dice: &mut Dice, thief: UnitId, mark: UnitId) -> Result<AbilityOutcome, RuleError> {
    let victim = world.unit(mark)?;
    if !victim.is_alive() {
        return Err(RuleError::UnitDefeated(mark));
    }
    let pool = victim.inventory.carried().len();
    if pool == 0 {
        return Err(RuleError::NoStealableItem(mark));
    }
    let chance = steal_chance(&world.unit(thief)?.stats, &victim.stats);

    let roll = percent_check(dice, chance);
    if !roll.success {
        return Ok(AbilityOutcome::StealFailed { roll });
    }
    let index = dice.pick(pool).ok_or(RuleError::NoStealableItem(mark))?;
    let binding = world
        .unit_mut(mark)?
        .inventory
        .take_carried(index)
        .ok_or(RuleError::NoStealableItem(mark))?;
    world.unit_mut(thief)?.inventory.put_carried(binding);
    Ok(AbilityOutcome::Stole { roll, binding })
}

/// Drink, read or otherwise spend a carried consumable. Only potions do anything in combat.
pub fn use_item(world: &mut World, unit: UnitId, item: ItemId) -> Result<ItemOutcome, RuleError> {
    let user = world.unit(unit)?;
    if !user.is_alive() {
        return Err(RuleError::UnitDefeated(unit));
    }
    if !user.inventory.carried().iter().any(|b| b.item == item) {
        return Err(RuleError::ItemNotOwned { unit, item });
    }
    match world.item(item)? {
        Item::Consumable(c) if c.kind == ConsumableKind::Potion && c.uses_left > 0 => {}
        _ => return Err(RuleError::NotUsable(item)),
    }

    let consumable = world
        .item_mut(item)?
        .consumable_mut()
        .ok_or(RuleError::NotUsable(item))?;
    consumable.uses_left -= 1;
    let consumed = consumable.uses_left == 0;
    if consumed {
        consumable.uses_left = consumable.max_uses;
    }

    let user = world.unit_mut(unit)?;
    let healed = user.stats.heal(POTION_HEAL);
    let mut remaining = 1;
    if consumed {
        let binding = user
            .inventory
            .carried_binding_mut(item)
            .ok_or(RuleError::ItemNotOwned { unit, item })?;
        binding.quantity = binding.quantity.saturating_sub(1);
        remaining = binding.quantity;
        if remaining == 0 {
            user.inventory.remove_carried(item);
        }
    } else if let Some(binding) = user.inventory.carried_binding_mut(item) {
        remaining = binding.quantity;
    }
    debug!(?unit, ?item, healed, consumed, remaining, "item used");
    Ok(ItemOutcome { item, healed, hp_after: user.stats.hit_points(), consumed, remaining })
}
