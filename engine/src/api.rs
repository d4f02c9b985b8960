use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use serde::{Deserialize, Serialize};

use crate::combat::{AutoTactician, Battle};
use crate::content::{WorldFile, builtin_worlds};
use crate::rules::CombatRules;
use crate::unit::{Faction, UnitId};
use crate::world::World;
use crate::Dice;

const DEFAULT_WORLD: &str = "intro";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct SkirmishConfig {
    /// Built-in world id; ignored when `world_path` is set.
    #[serde(default)]
    pub world: Option<String>,
    #[serde(default)]
    pub world_path: Option<String>,
    #[serde(default)]
    pub seed: u64,
    /// Character names to field. Empty means every character.
    #[serde(default)]
    pub characters: Vec<String>,
    /// Monster names to field. Empty means every monster.
    #[serde(default)]
    pub monsters: Vec<String>,
    #[serde(default)]
    pub rules: CombatRules,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct SkirmishResult {
    pub winner: String,
    pub rounds: u32,
    pub survivors: Vec<String>,
    pub log: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct SkirmishStats {
    pub samples: u32,
    pub character_wins: u32,
    pub monster_wins: u32,
    pub draws: u32,
    pub avg_rounds: f64,
}

impl SkirmishStats {
    pub fn character_win_rate(&self) -> f64 {
        if self.samples == 0 {
            return 0.0;
        }
        self.character_wins as f64 / self.samples as f64
    }
}

pub fn winner_label(winner: Option<Faction>) -> &'static str {
    match winner {
        Some(Faction::Character) => "characters",
        Some(Faction::Monster) => "monsters",
        None => "draw",
    }
}

/// Parse a world file, picking JSON or YAML from the extension.
pub fn parse_world(text: &str, path: &Path) -> Result<WorldFile> {
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let file = if is_json {
        WorldFile::from_json(text)
            .with_context(|| format!("failed to parse world JSON: {}", path.display()))?
    } else {
        WorldFile::from_yaml(text)
            .with_context(|| format!("failed to parse world YAML: {}", path.display()))?
    };
    Ok(file)
}

pub fn load_world_file(path: &str) -> Result<WorldFile> {
    let text = fs::read_to_string(path).with_context(|| format!("failed to read world file: {}", path))?;
    parse_world(&text, Path::new(path))
}

pub fn builtin_world(id: &str) -> Result<WorldFile> {
    let worlds = builtin_worlds();
    let Some(text) = worlds.get(id) else {
        let mut known: Vec<_> = worlds.keys().copied().collect();
        known.sort_unstable();
        bail!("unknown built-in world '{}' (known: {})", id, known.join(", "));
    };
    WorldFile::from_yaml(text).with_context(|| format!("built-in world '{}' is malformed", id))
}

fn resolve_world(cfg: &SkirmishConfig) -> Result<WorldFile> {
    match (&cfg.world_path, &cfg.world) {
        (Some(path), _) => load_world_file(path),
        (None, Some(id)) => builtin_world(id),
        (None, None) => builtin_world(DEFAULT_WORLD),
    }
}

fn pick_side(world: &World, faction: Faction, names: &[String]) -> Result<Vec<UnitId>> {
    if names.is_empty() {
        return Ok(world.faction(faction));
    }
    names
        .iter()
        .map(|name| {
            let id = world
                .find_unit(name)
                .ok_or_else(|| anyhow!("unit '{}' not found", name))?;
            if world.unit(id)?.faction != faction {
                bail!("unit '{}' is not a {:?}", name, faction);
            }
            Ok(id)
        })
        .collect()
}

fn run_once(file: &WorldFile, cfg: &SkirmishConfig, seed: u64) -> Result<(World, crate::BattleResult)> {
    let mut world = file.to_world().context("failed to build world")?;
    let mut side = pick_side(&world, Faction::Character, &cfg.characters)?;
    side.extend(pick_side(&world, Faction::Monster, &cfg.monsters)?);
    if side.is_empty() {
        bail!("no units to fight");
    }
    let battle = Battle::new(&world, side, cfg.rules)?;
    let mut dice = Dice::from_seed(seed);
    let result = battle.run(&mut world, &mut dice, &mut AutoTactician);
    Ok((world, result))
}

/// Fight one skirmish between the chosen sides, every unit driven by [`AutoTactician`].
pub fn simulate_skirmish(cfg: SkirmishConfig) -> Result<SkirmishResult> {
    let file = resolve_world(&cfg)?;
    let (world, result) = run_once(&file, &cfg, cfg.seed)?;
    let survivors = result
        .survivors
        .iter()
        .map(|&id| world.unit(id).map(|u| u.name.clone()))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(SkirmishResult {
        winner: winner_label(result.winner).to_string(),
        rounds: result.rounds,
        survivors,
        log: result.log,
    })
}

/// Run `samples` skirmishes; sample `i` uses seed `cfg.seed + i`.
pub fn simulate_skirmish_many(cfg: SkirmishConfig, samples: u32) -> Result<SkirmishStats> {
    let file = resolve_world(&cfg)?;
    let mut stats = SkirmishStats { samples, ..Default::default() };
    let mut total_rounds = 0u64;
    for i in 0..samples {
        let (_, result) = run_once(&file, &cfg, cfg.seed.wrapping_add(i as u64))?;
        match result.winner {
            Some(Faction::Character) => stats.character_wins += 1,
            Some(Faction::Monster) => stats.monster_wins += 1,
            None => stats.draws += 1,
        }
        total_rounds += result.rounds as u64;
    }
    if samples > 0 {
        stats.avg_rounds = total_rounds as f64 / samples as f64;
    }
    Ok(stats)
}
