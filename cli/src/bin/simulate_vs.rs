use anyhow::{anyhow, bail};
use clap::Parser;
use rpg_cli::load_world_file;
use rpg_engine::combat::attack::{attack, crit_chance, evasion, hit_chance, AttackReport};
use rpg_engine::{CombatRules, Dice, DurabilityPolicy, RuleError};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "simulate-vs")]
#[command(about = "Monte Carlo sim: one unit swinging at another, many times")]
struct Args {
    /// Attacking unit name
    #[arg(long)]
    attacker: String,

    /// Defending unit name
    #[arg(long)]
    defender: String,

    /// Number of trials
    #[arg(long, default_value_t = 1000)]
    trials: u32,

    /// Safety cap on swings per trial
    #[arg(long, default_value_t = 20)]
    max_rounds: u32,

    /// Every swing wears the weapon, not just hits
    #[arg(long, default_value_t = false)]
    wear_on_miss: bool,

    /// RNG base seed (trial i uses seed+i)
    #[arg(long, default_value_t = 12345)]
    seed: u64,

    /// Built-in world id
    #[arg(long, default_value = "intro")]
    world: String,

    /// Optional world file (YAML or JSON); overrides --world
    #[arg(long)]
    world_file: Option<PathBuf>,
}

/// Running totals over every trial.
#[derive(Default)]
struct Tally {
    wins: u32,
    broken: u32,
    hits: u32,
    crits: u32,
    misses: u32,
    damage_on_hits: u64,
    /// Swings needed, one entry per won trial.
    win_rounds: Vec<u32>,
}

impl Tally {
    fn record(&mut self, report: &AttackReport) {
        if report.hit.success {
            self.hits += 1;
            self.damage_on_hits += u64::from(report.damage);
            self.crits += u32::from(report.is_crit());
        } else {
            self.misses += 1;
        }
    }

    fn ratio(num: u64, den: u64) -> f64 {
        if den == 0 { 0.0 } else { num as f64 / den as f64 }
    }

    fn hit_rate(&self) -> f64 {
        Self::ratio(self.hits.into(), u64::from(self.hits) + u64::from(self.misses))
    }

    fn crit_rate(&self) -> f64 {
        Self::ratio(self.crits.into(), self.hits.into())
    }

    fn avg_damage_per_hit(&self) -> f64 {
        Self::ratio(self.damage_on_hits, self.hits.into())
    }

    fn avg_rounds(&self) -> f64 {
        Self::ratio(self.win_rounds.iter().map(|&r| u64::from(r)).sum(), self.win_rounds.len() as u64)
    }

    fn median_rounds(&self) -> u32 {
        let mut sorted = self.win_rounds.clone();
        sorted.sort_unstable();
        match sorted.len() {
            0 => 0,
            n if n % 2 == 1 => sorted[n / 2],
            n => (sorted[n / 2 - 1] + sorted[n / 2]) / 2,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let file = load_world_file(&args.world, args.world_file.as_deref())?;
    let rules = CombatRules {
        durability: if args.wear_on_miss { DurabilityPolicy::EveryAttempt } else { DurabilityPolicy::OnHit },
        ..CombatRules::default()
    };

    // names are checked once, before any trial
    let roster = file.to_world()?;
    let find = |name: &str| roster.find_unit(name).ok_or_else(|| anyhow!("unit '{}' not found", name));
    let atk_id = find(&args.attacker)?;
    let def_id = find(&args.defender)?;
    let atk = roster.unit(atk_id)?;
    let def = roster.unit(def_id)?;
    if atk.faction == def.faction {
        bail!("'{}' and '{}' are on the same side", atk.name, def.name);
    }
    let Some((_, weapon)) = roster.equipped_weapon(atk_id)? else {
        bail!("'{}' has no weapon equipped", atk.name);
    };
    let shown_hit = hit_chance(weapon, &atk.stats, evasion(def, &rules));
    let shown_crit = crit_chance(weapon, &atk.stats);

    let mut tally = Tally::default();
    for i in 0..args.trials {
        let mut world = file.to_world()?;
        let mut rng = Dice::from_seed(args.seed.wrapping_add(i as u64));
        let mut rounds = 0u32;

        while rounds < args.max_rounds && world.unit(def_id)?.is_alive() {
            rounds += 1;
            match attack(&mut world, &mut rng, &rules, atk_id, def_id) {
                Ok(report) => tally.record(&report),
                Err(RuleError::DurabilityExhausted(_)) => {
                    tally.broken += 1;
                    break;
                }
                Err(err) => return Err(err.into()),
            }
        }

        if !world.unit(def_id)?.is_alive() {
            tally.wins += 1;
            tally.win_rounds.push(rounds);
        }
    }

    println!("simulate-vs results");
    println!("-------------------");
    println!("trials:             {}", args.trials);
    println!("attacker:           {} ({})", atk.name, weapon.name);
    println!(
        "defender:           {} (HP {}, DEF {}, RES {})",
        def.name,
        def.stats.max_hit_points(),
        def.stats.defense,
        def.stats.resistance
    );
    println!("hit chance:         {}%", shown_hit);
    println!("crit chance:        {}%", shown_crit);
    println!();
    println!("win rate:           {:.1}%", Tally::ratio(tally.wins.into(), args.trials.into()) * 100.0);
    println!("hit rate:           {:.1}%", tally.hit_rate() * 100.0);
    println!("crit rate:          {:.1}%", tally.crit_rate() * 100.0);
    println!("avg dmg per hit:    {:.2}", tally.avg_damage_per_hit());
    println!("avg rounds (wins):  {:.2}", tally.avg_rounds());
    println!("median rounds:      {}", tally.median_rounds());
    println!("weapon broke:       {}", tally.broken);

    Ok(())
}
