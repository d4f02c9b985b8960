//! Turn-based battles between the two factions.
//!
//! A [`Battle`] only tracks whose turn it is and what happened; every rule
//! lives in [`attack`] and [`actions`]. Decisions come from a [`Tactician`],
//! so the same loop drives scripted tests, the menu-driven CLI and the
//! automatic opponent.

pub mod actions;
pub mod attack;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::abilities::{Ability, Targeting};
use crate::error::RuleError;
use crate::items::{ConsumableKind, Item, ItemId};
use crate::rules::CombatRules;
use crate::unit::{Faction, UnitId};
use crate::world::World;
use crate::Dice;

pub use actions::{use_ability, use_item, AbilityOutcome, ItemOutcome};
pub use attack::{attack, AttackReport};

/// How many refused actions a unit gets before it forfeits the turn.
pub const MAX_ATTEMPTS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "action")]
pub enum Action {
    Attack { target: UnitId },
    UseAbility { ability: Ability, target: UnitId },
    UseItem { item: ItemId },
    Wait,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ActionReport {
    Attack(AttackReport),
    Ability(AbilityOutcome),
    Item(ItemOutcome),
    Waited,
}

/// Picks actions for units during a battle.
pub trait Tactician {
    fn choose(&mut self, world: &World, battle: &Battle, actor: UnitId) -> Action;

    /// Called when the battle refuses the last chosen action.
    fn rejected(&mut self, _actor: UnitId, _action: Action, _error: &RuleError) {}
}

#[derive(Debug, Clone, Serialize)]
pub struct BattleResult {
    /// `None` when the round cap was reached first.
    pub winner: Option<Faction>,
    pub rounds: u32,
    pub survivors: Vec<UnitId>,
    pub log: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Battle {
    participants: Vec<UnitId>,
    rules: CombatRules,
    round: u32,
    log: Vec<String>,
}

impl Battle {
    /// Duplicate ids are dropped; unknown ids are refused.
    pub fn new(world: &World, participants: Vec<UnitId>, rules: CombatRules) -> Result<Self, RuleError> {
        let mut unique = Vec::with_capacity(participants.len());
        for id in participants {
            world.unit(id)?;
            if !unique.contains(&id) {
                unique.push(id);
            }
        }
        Ok(Self { participants: unique, rules, round: 0, log: Vec::new() })
    }

    pub fn participants(&self) -> &[UnitId] {
        &self.participants
    }

    pub fn rules(&self) -> &CombatRules {
        &self.rules
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn log(&self) -> &[String] {
        &self.log
    }

    pub fn is_participant(&self, id: UnitId) -> bool {
        self.participants.contains(&id)
    }

    fn alive(world: &World, id: UnitId) -> bool {
        world.unit(id).map(|u| u.is_alive()).unwrap_or(false)
    }

    fn faction_of(world: &World, id: UnitId) -> Option<Faction> {
        world.unit(id).ok().map(|u| u.faction)
    }

    /// Living participants of `faction`, in id order of entry.
    pub fn living(&self, world: &World, faction: Faction) -> Vec<UnitId> {
        self.participants
            .iter()
            .copied()
            .filter(|&id| Self::alive(world, id) && Self::faction_of(world, id) == Some(faction))
            .collect()
    }

    pub fn allies_of(&self, world: &World, actor: UnitId) -> Vec<UnitId> {
        Self::faction_of(world, actor)
            .map(|f| self.living(world, f))
            .unwrap_or_default()
    }

    pub fn enemies_of(&self, world: &World, actor: UnitId) -> Vec<UnitId> {
        Self::faction_of(world, actor)
            .map(|f| self.living(world, f.opponent()))
            .unwrap_or_default()
    }

    /// Living participants sorted by Speed, fastest first; ties go to the lower id.
    pub fn turn_order(&self, world: &World) -> Vec<UnitId> {
        let mut order: Vec<_> = self
            .participants
            .iter()
            .filter_map(|&id| world.unit(id).ok())
            .filter(|u| u.is_alive())
            .map(|u| (u.stats.speed, u.id))
            .collect();
        order.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
        order.into_iter().map(|(_, id)| id).collect()
    }

    /// The enemy that `actor` is obliged to attack, if any of them is taunting.
    ///
    /// With several taunters the one with the most turns left wins, then the lower id.
    pub fn forced_target(&self, world: &World, actor: UnitId) -> Option<UnitId> {
        self.enemies_of(world, actor)
            .into_iter()
            .filter_map(|id| world.unit(id).ok())
            .filter(|u| u.is_taunting())
            .max_by(|a, b| a.taunt_turns.cmp(&b.taunt_turns).then(b.id.cmp(&a.id)))
            .map(|u| u.id)
    }

    pub fn winner(&self, world: &World) -> Option<Faction> {
        let characters = self.living(world, Faction::Character);
        let monsters = self.living(world, Faction::Monster);
        match (characters.is_empty(), monsters.is_empty()) {
            (false, true) => Some(Faction::Character),
            (true, false) => Some(Faction::Monster),
            _ => None,
        }
    }

    pub fn is_over(&self, world: &World) -> bool {
        self.living(world, Faction::Character).is_empty() || self.living(world, Faction::Monster).is_empty()
    }

    fn name(world: &World, id: UnitId) -> String {
        world
            .unit(id)
            .map(|u| u.name.clone())
            .unwrap_or_else(|_| format!("{:?}", id))
    }

    fn item_name(world: &World, id: ItemId) -> String {
        world
            .item(id)
            .map(|i| i.name().to_string())
            .unwrap_or_else(|_| format!("{:?}", id))
    }

    fn check_participant(&self, id: UnitId) -> Result<(), RuleError> {
        if self.is_participant(id) {
            Ok(())
        } else {
            Err(RuleError::UnknownUnit(id))
        }
    }

    fn check_forced(&self, world: &World, actor: UnitId, target: UnitId) -> Result<(), RuleError> {
        match self.forced_target(world, actor) {
            Some(forced) if forced != target => {
                Err(RuleError::TargetingRuleViolation { actor, target, rule: Targeting::Enemy })
            }
            _ => Ok(()),
        }
    }

    /// Resolve one action for `actor` and append it to the log.
    pub fn act(
        &mut self,
        world: &mut World,
        dice: &mut Dice,
        actor: UnitId,
        action: Action,
    ) -> Result<ActionReport, RuleError> {
        self.check_participant(actor)?;
        let report = match action {
            Action::Attack { target } => {
                self.check_participant(target)?;
                self.check_forced(world, actor, target)?;
                ActionReport::Attack(attack(world, dice, &self.rules, actor, target)?)
            }
            Action::UseAbility { ability, target } => {
                self.check_participant(target)?;
                if ability.targeting() == Targeting::Enemy {
                    self.check_forced(world, actor, target)?;
                }
                ActionReport::Ability(use_ability(world, dice, &self.rules, actor, ability, target)?)
            }
            Action::UseItem { item } => ActionReport::Item(use_item(world, actor, item)?),
            Action::Wait => {
                if !Self::alive(world, actor) {
                    return Err(RuleError::UnitDefeated(actor));
                }
                ActionReport::Waited
            }
        };
        self.record(world, actor, action, &report);
        Ok(report)
    }

    fn record(&mut self, world: &World, actor: UnitId, action: Action, report: &ActionReport) {
        let who = Self::name(world, actor);
        match (action, report) {
            (_, ActionReport::Attack(r)) => {
                let outcome = if r.is_crit() {
                    "CRIT!"
                } else if r.hit.success {
                    "HIT"
                } else {
                    "MISS"
                };
                self.log.push(format!(
                    "[ATTACK][{}] {} → {} d100={} vs {}% → {}",
                    who,
                    Self::item_name(world, r.weapon),
                    Self::name(world, r.target),
                    r.hit.roll,
                    r.hit.chance,
                    outcome
                ));
                if r.hit.success {
                    self.log.push(format!(
                        "[DMG][{}] {} → {} (-{})",
                        Self::name(world, r.target),
                        r.hp_before,
                        r.hp_after,
                        r.damage
                    ));
                }
                if r.defeated {
                    self.log.push(format!("[DOWN][{}] is defeated", Self::name(world, r.target)));
                }
            }
            (_, ActionReport::Ability(AbilityOutcome::Healed { target, amount, hp_after })) => {
                self.log.push(format!(
                    "[HEAL][{}] → {} +{} HP (now {})",
                    who,
                    Self::name(world, *target),
                    amount,
                    hp_after
                ));
            }
            (Action::UseAbility { target, .. }, ActionReport::Ability(AbilityOutcome::Stole { roll, binding })) => {
                self.log.push(format!(
                    "[STEAL][{}] d100={} vs {}% → takes {} from {}",
                    who,
                    roll.roll,
                    roll.chance,
                    Self::item_name(world, binding.item),
                    Self::name(world, target)
                ));
            }
            (_, ActionReport::Ability(AbilityOutcome::Stole { roll, binding })) => {
                self.log.push(format!(
                    "[STEAL][{}] d100={} vs {}% → takes {}",
                    who,
                    roll.roll,
                    roll.chance,
                    Self::item_name(world, binding.item)
                ));
            }
            (_, ActionReport::Ability(AbilityOutcome::StealFailed { roll })) => {
                self.log.push(format!("[STEAL][{}] d100={} vs {}% → fails", who, roll.roll, roll.chance));
            }
            (_, ActionReport::Ability(AbilityOutcome::Taunting { turns })) => {
                self.log.push(format!("[TAUNT][{}] draws every attack for {} turns", who, turns));
            }
            (Action::UseAbility { ability, .. }, ActionReport::Ability(AbilityOutcome::Passive)) => {
                self.log.push(format!("[ABILITY][{}] {} is passive; nothing happens", who, ability.name()));
            }
            (_, ActionReport::Ability(AbilityOutcome::Passive)) => {}
            (_, ActionReport::Item(r)) => {
                self.log.push(format!(
                    "[ITEM][{}] uses {} +{} HP (now {})",
                    who,
                    Self::item_name(world, r.item),
                    r.healed,
                    r.hp_after
                ));
            }
            (_, ActionReport::Waited) => self.log.push(format!("[WAIT][{}] waits", who)),
        }
    }

    fn start_turn(&mut self, world: &mut World, actor: UnitId) {
        let Ok(unit) = world.unit_mut(actor) else {
            return;
        };
        if unit.taunt_turns > 0 {
            unit.taunt_turns -= 1;
            if unit.taunt_turns == 0 {
                let who = unit.name.clone();
                self.log.push(format!("[TAUNT][{}] taunt wears off", who));
            }
        }
    }

    fn take_turn(&mut self, world: &mut World, dice: &mut Dice, tactician: &mut dyn Tactician, actor: UnitId) {
        for _ in 0..MAX_ATTEMPTS {
            let action = tactician.choose(world, self, actor);
            match self.act(world, dice, actor, action) {
                Ok(_) => return,
                Err(err) => {
                    debug!(?actor, ?action, %err, "action refused");
                    self.log.push(format!("[REFUSED][{}] {}", Self::name(world, actor), err));
                    tactician.rejected(actor, action, &err);
                }
            }
        }
        self.log.push(format!("[WAIT][{}] loses the turn", Self::name(world, actor)));
    }

    /// Play one full round. Returns the winner once one side is wiped out.
    pub fn run_round(
        &mut self,
        world: &mut World,
        dice: &mut Dice,
        tactician: &mut dyn Tactician,
    ) -> Option<Faction> {
        self.round += 1;
        self.log.push(format!("[ROUND] {}", self.round));
        for actor in self.turn_order(world) {
            if self.is_over(world) {
                break;
            }
            if !Self::alive(world, actor) {
                continue;
            }
            self.start_turn(world, actor);
            self.take_turn(world, dice, tactician, actor);
        }
        self.winner(world)
    }

    /// Play rounds until one faction is wiped out or the round cap is hit.
    ///
    /// Taunts end with the battle: every participant's counter is cleared
    /// before returning.
    pub fn run(mut self, world: &mut World, dice: &mut Dice, tactician: &mut dyn Tactician) -> BattleResult {
        while self.round < self.rules.max_rounds && !self.is_over(world) {
            self.run_round(world, dice, tactician);
        }
        for &id in &self.participants {
            if let Ok(unit) = world.unit_mut(id) {
                unit.taunt_turns = 0;
            }
        }
        let winner = self.winner(world);
        let survivors: Vec<UnitId> = self
            .participants
            .iter()
            .copied()
            .filter(|&id| Self::alive(world, id))
            .collect();
        let label = match winner {
            Some(Faction::Character) => "characters",
            Some(Faction::Monster) => "monsters",
            None => "draw",
        };
        self.log.push(format!(
            "[END] winner={} rounds={} survivors={}",
            label,
            self.round,
            survivors.len()
        ));
        info!(winner = label, rounds = self.round, survivors = survivors.len(), "battle finished");
        BattleResult { winner, rounds: self.round, survivors, log: self.log }
    }
}

/// Plays a unit without asking anybody.
///
/// Heals a badly hurt ally, steals when it has nothing to swing, keeps a
/// taunt up, then attacks the forced target or the weakest enemy. A wounded
/// unit with no other option drinks a potion before waiting.
#[derive(Debug, Default, Clone, Copy)]
pub struct AutoTactician;

impl AutoTactician {
    fn can_attack(world: &World, actor: UnitId) -> bool {
        matches!(world.equipped_weapon(actor), Ok(Some((_, w))) if !w.durability.is_exhausted())
    }

    fn potion(world: &World, actor: UnitId) -> Option<ItemId> {
        let unit = world.unit(actor).ok()?;
        unit.inventory.carried().iter().map(|b| b.item).find(|&id| {
            matches!(world.item(id), Ok(Item::Consumable(c)) if c.kind == ConsumableKind::Potion && c.uses_left > 0)
        })
    }
}

impl Tactician for AutoTactician {
    fn choose(&mut self, world: &World, battle: &Battle, actor: UnitId) -> Action {
        let Ok(unit) = world.unit(actor) else {
            return Action::Wait;
        };

        if unit.has(Ability::Heal) {
            let wounded = battle
                .allies_of(world, actor)
                .into_iter()
                .filter_map(|id| world.unit(id).ok())
                .filter(|u| (u.stats.hit_points() as u64) * 2 < u.stats.max_hit_points() as u64)
                .min_by_key(|u| (u.stats.hit_points() as u64 * 100 / u.stats.max_hit_points().max(1) as u64, u.id));
            if let Some(ally) = wounded {
                return Action::UseAbility { ability: Ability::Heal, target: ally.id };
            }
        }

        let enemies = battle.enemies_of(world, actor);
        let target = battle.forced_target(world, actor).or_else(|| {
            enemies
                .iter()
                .filter_map(|&id| world.unit(id).ok())
                .min_by_key(|u| (u.stats.hit_points(), u.id))
                .map(|u| u.id)
        });
        let Some(target) = target else {
            return Action::Wait;
        };

        let armed = Self::can_attack(world, actor);
        let has_loot = world
            .unit(target)
            .map(|u| !u.inventory.carried().is_empty())
            .unwrap_or(false);
        if !armed && unit.has(Ability::Steal) && has_loot {
            return Action::UseAbility { ability: Ability::Steal, target };
        }
        if unit.has(Ability::Taunt) && unit.taunt_turns == 0 {
            return Action::UseAbility { ability: Ability::Taunt, target: actor };
        }
        if armed {
            return Action::Attack { target };
        }
        if unit.stats.hit_points() < unit.stats.max_hit_points() {
            if let Some(item) = Self::potion(world, actor) {
                return Action::UseItem { item };
            }
        }
        Action::Wait
    }
}
