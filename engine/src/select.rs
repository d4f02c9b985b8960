//! Menus as data.
//!
//! Every decision a player makes is a pick from a list of [`Choice`]s. The
//! engine builds the lists; a [`Selector`] (a terminal prompt, a test script)
//! picks from them.

use std::collections::VecDeque;

use serde::Serialize;

use crate::abilities::{Ability, Targeting};
use crate::combat::{Action, Battle, Tactician};
use crate::dungeon::{Direction, RoomId};
use crate::error::RuleError;
use crate::items::{Item, ItemId};
use crate::stats::Stats;
use crate::unit::{Faction, UnitId};
use crate::world::World;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Choice<T> {
    pub label: String,
    pub detail: String,
    pub payload: T,
}

impl<T> Choice<T> {
    pub fn new(label: impl Into<String>, detail: impl Into<String>, payload: T) -> Self {
        Self { label: label.into(), detail: detail.into(), payload }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection<T> {
    Picked(T),
    Exit,
}

pub trait Selector {
    /// Present `choices` under `prompt` and return the payload of the one picked.
    fn select<T: Clone>(&mut self, prompt: &str, choices: &[Choice<T>]) -> Selection<T>;
}

/// Replays a fixed list of picks by index; `None` or running out means Exit.
#[derive(Debug, Default, Clone)]
pub struct ScriptedSelector {
    picks: VecDeque<Option<usize>>,
    prompts: Vec<String>,
}

impl ScriptedSelector {
    pub fn new(picks: impl IntoIterator<Item = Option<usize>>) -> Self {
        Self { picks: picks.into_iter().collect(), prompts: Vec::new() }
    }

    /// Every prompt seen so far, in order.
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    pub fn remaining(&self) -> usize {
        self.picks.len()
    }
}

impl Selector for ScriptedSelector {
    fn select<T: Clone>(&mut self, prompt: &str, choices: &[Choice<T>]) -> Selection<T> {
        self.prompts.push(prompt.to_string());
        match self.picks.pop_front().flatten().and_then(|i| choices.get(i)) {
            Some(choice) => Selection::Picked(choice.payload.clone()),
            None => Selection::Exit,
        }
    }
}

/// Ten-cell bar followed by the raw numbers, e.g. `[#######---] 19/27`.
pub fn health_bar(stats: &Stats) -> String {
    let filled = (stats.health_ratio() * 10.0).round().clamp(0.0, 10.0) as usize;
    format!(
        "[{}{}] {}/{}",
        "#".repeat(filled),
        "-".repeat(10 - filled),
        stats.hit_points(),
        stats.max_hit_points()
    )
}

fn unit_choice(world: &World, id: UnitId) -> Option<Choice<UnitId>> {
    let unit = world.unit(id).ok()?;
    let mut label = format!("{} Level {} {}", unit.name, unit.level, unit.class);
    if !unit.is_alive() {
        label.push_str(" (defeated)");
    }
    Some(Choice::new(label, health_bar(&unit.stats), id))
}

/// Characters first, then monsters; defeated units stay listed.
pub fn unit_choices(world: &World) -> Vec<Choice<UnitId>> {
    [Faction::Character, Faction::Monster]
        .into_iter()
        .flat_map(|f| world.faction(f))
        .filter_map(|id| unit_choice(world, id))
        .collect()
}

pub fn target_choices(world: &World, candidates: &[UnitId]) -> Vec<Choice<UnitId>> {
    candidates.iter().filter_map(|&id| unit_choice(world, id)).collect()
}

pub fn exit_choices(world: &World, room: RoomId) -> Result<Vec<Choice<Direction>>, RuleError> {
    let graph = world.graph();
    graph
        .exits(room)?
        .into_iter()
        .map(|(dir, to)| Ok(Choice::new(format!("{:?}", dir), graph.room(to)?.name.clone(), dir)))
        .collect()
}

pub fn item_choices(world: &World, unit: UnitId) -> Result<Vec<Choice<ItemId>>, RuleError> {
    world
        .bindings(unit)?
        .into_iter()
        .map(|view| {
            let item = world.item(view.item)?;
            let label = if view.quantity > 1 {
                format!("{} x{}", item.name(), view.quantity)
            } else {
                item.name().to_string()
            };
            Ok(Choice::new(label, item.description(), view.item))
        })
        .collect()
}

/// Top-level battle commands; targets are asked for afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Command {
    Attack,
    Ability(Ability),
    Item(ItemId),
    Wait,
}

pub fn command_choices(world: &World, actor: UnitId) -> Vec<Choice<Command>> {
    let Ok(unit) = world.unit(actor) else {
        return Vec::new();
    };
    let mut choices = Vec::new();
    if let Ok(Some((id, weapon))) = world.equipped_weapon(actor) {
        let name = world.item(id).map(Item::name).unwrap_or("weapon");
        choices.push(Choice::new(
            "Attack",
            format!("{} ({}/{})", name, weapon.durability.current(), weapon.durability.max()),
            Command::Attack,
        ));
    }
    for ability in unit.abilities().filter(|a| !a.is_passive()) {
        choices.push(Choice::new(ability.name(), ability.description(), Command::Ability(ability)));
    }
    for binding in unit.inventory.carried() {
        if let Ok(Item::Consumable(c)) = world.item(binding.item) {
            choices.push(Choice::new(
                format!("Use {}", c.name),
                format!("{} left", binding.quantity),
                Command::Item(binding.item),
            ));
        }
    }
    choices.push(Choice::new("Wait", "End the turn", Command::Wait));
    choices
}

/// Drives a battle turn through a [`Selector`]. Backing out of any menu waits.
#[derive(Debug)]
pub struct MenuTactician<S> {
    selector: S,
    last_rejection: Option<RuleError>,
}

impl<S: Selector> MenuTactician<S> {
    pub fn new(selector: S) -> Self {
        Self { selector, last_rejection: None }
    }

    pub fn selector(&self) -> &S {
        &self.selector
    }

    pub fn into_selector(self) -> S {
        self.selector
    }

    pub fn last_rejection(&self) -> Option<&RuleError> {
        self.last_rejection.as_ref()
    }

    fn pick_target(&mut self, world: &World, candidates: &[UnitId]) -> Option<UnitId> {
        match self.selector.select("Choose a target", &target_choices(world, candidates)) {
            Selection::Picked(id) => Some(id),
            Selection::Exit => None,
        }
    }
}

impl<S: Selector> Tactician for MenuTactician<S> {
    fn choose(&mut self, world: &World, battle: &Battle, actor: UnitId) -> Action {
        let name = world.unit(actor).map(|u| u.name.clone()).unwrap_or_default();
        let prompt = match &self.last_rejection {
            Some(err) => format!("{name}: {err}. Choose again"),
            None => format!("{name}'s turn"),
        };
        let command = match self.selector.select(&prompt, &command_choices(world, actor)) {
            Selection::Picked(command) => command,
            Selection::Exit => return Action::Wait,
        };
        let enemies = match battle.forced_target(world, actor) {
            Some(forced) => vec![forced],
            None => battle.enemies_of(world, actor),
        };
        let action = match command {
            Command::Attack => self.pick_target(world, &enemies).map(|target| Action::Attack { target }),
            Command::Ability(ability) => match ability.targeting() {
                Targeting::Caster => Some(actor),
                Targeting::Ally => self.pick_target(world, &battle.allies_of(world, actor)),
                Targeting::Enemy => self.pick_target(world, &enemies),
            }
            .map(|target| Action::UseAbility { ability, target }),
            Command::Item(item) => Some(Action::UseItem { item }),
            Command::Wait => Some(Action::Wait),
        };
        self.last_rejection = None;
        action.unwrap_or(Action::Wait)
    }

    fn rejected(&mut self, _actor: UnitId, _action: Action, error: &RuleError) {
        self.last_rejection = Some(error.clone());
    }
}
