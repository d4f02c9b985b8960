use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{anyhow, Context};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use rpg_cli::load_world_file;
use rpg_engine::api::{self, SkirmishConfig};
use rpg_engine::{
    percent_check, Action, AutoTactician, Battle, Choice, CombatRules, Dice, Direction, DurabilityPolicy, Faction,
    MenuTactician, RuleError, Selection, Selector, Tactician, UnitId, World,
};

#[derive(Copy, Clone, ValueEnum)]
enum Dir {
    North,
    South,
    East,
    West,
}

impl From<Dir> for Direction {
    fn from(d: Dir) -> Self {
        match d {
            Dir::North => Direction::North,
            Dir::South => Direction::South,
            Dir::East => Direction::East,
            Dir::West => Direction::West,
        }
    }
}

#[derive(Copy, Clone, ValueEnum)]
enum Wear {
    OnHit,
    EveryAttempt,
}

impl From<Wear> for DurabilityPolicy {
    fn from(w: Wear) -> Self {
        match w {
            Wear::OnHit => DurabilityPolicy::OnHit,
            Wear::EveryAttempt => DurabilityPolicy::EveryAttempt,
        }
    }
}

#[derive(Args, Clone)]
struct WorldArgs {
    /// Built-in world id
    #[arg(long, global = true, default_value = "intro")]
    world: String,
    /// Load a YAML or JSON world file instead of a built-in one
    #[arg(long, global = true)]
    world_file: Option<PathBuf>,
}

#[derive(Args, Clone)]
struct BattleArgs {
    /// RNG seed for determinism
    #[arg(long, default_value_t = 42)]
    seed: u64,
    /// Character to field (repeatable; default: all)
    #[arg(long = "character")]
    characters: Vec<String>,
    /// Monster to field (repeatable; default: all)
    #[arg(long = "monster")]
    monsters: Vec<String>,
    /// When weapons lose durability
    #[arg(long, value_enum, default_value_t = Wear::OnHit)]
    wear: Wear,
    /// Safety cap on rounds
    #[arg(long, default_value_t = 30)]
    max_rounds: u32,
}

impl BattleArgs {
    fn rules(&self) -> CombatRules {
        CombatRules { durability: self.wear.into(), max_rounds: self.max_rounds, ..CombatRules::default() }
    }
}

#[derive(Subcommand)]
enum Cmd {
    /// List every room with its exits and occupants
    Rooms,
    /// Walk a unit through a sequence of exits
    Walk {
        /// Unit name (case-insensitive)
        #[arg(long)]
        unit: String,
        /// Direction to take (repeatable, in order)
        #[arg(long = "go", value_enum)]
        steps: Vec<Dir>,
    },
    /// Print unit sheets
    Sheet {
        /// Only this unit (default: everyone)
        #[arg(long)]
        unit: Option<String>,
        /// Emit JSON instead of text
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Auto-battle characters against monsters
    Skirmish {
        #[command(flatten)]
        battle: BattleArgs,
        /// Run this many battles (seed, seed+1, ...) and print a summary
        #[arg(long, default_value_t = 1)]
        samples: u32,
        /// Emit JSON instead of text
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Fight a battle, choosing character actions from stdin
    Play {
        #[command(flatten)]
        battle: BattleArgs,
    },
    /// Roll percentile dice
    Roll {
        /// RNG seed for determinism
        #[arg(long, default_value_t = 42)]
        seed: u64,
        /// Number of rolls
        #[arg(long, default_value_t = 5)]
        rolls: u32,
        /// Also report success against this chance
        #[arg(long)]
        chance: Option<u32>,
    },
}

#[derive(Parser)]
#[command(name = "rpg-cli")]
#[command(about = "Dungeon skirmish CLI harness")]
struct Cli {
    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(flatten)]
    world: WorldArgs,
    #[command(subcommand)]
    cmd: Cmd,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn load_world(args: &WorldArgs) -> anyhow::Result<World> {
    Ok(load_world_file(&args.world, args.world_file.as_deref())?.to_world()?)
}

fn unit_named(world: &World, name: &str) -> anyhow::Result<UnitId> {
    world.find_unit(name).ok_or_else(|| anyhow!("unit '{}' not found", name))
}

fn side(world: &World, faction: Faction, names: &[String]) -> anyhow::Result<Vec<UnitId>> {
    if names.is_empty() {
        return Ok(world.faction(faction));
    }
    names.iter().map(|n| unit_named(world, n)).collect()
}

fn print_rooms(world: &World) -> anyhow::Result<()> {
    let graph = world.graph();
    for room in graph.rooms() {
        let view = graph.view(room.id)?;
        println!("{}: {}", view.name, view.description);
        for (dir, to) in &view.exits {
            println!("  {:<6} -> {}", format!("{:?}", dir).to_lowercase(), to);
        }
        let here: Vec<_> = world
            .units_in(room.id)
            .into_iter()
            .filter_map(|id| world.unit(id).ok().map(|u| u.name.clone()))
            .collect();
        if !here.is_empty() {
            println!("  units: {}", here.join("; "));
        }
    }
    Ok(())
}

fn walk(world: &mut World, unit: &str, steps: &[Dir]) -> anyhow::Result<()> {
    let id = unit_named(world, unit)?;
    let start = world.unit(id)?.room.ok_or(RuleError::NotInRoom(id))?;
    println!("{} starts in {}", world.unit(id)?.name, world.graph().room(start)?.name);
    for &step in steps {
        let dir = Direction::from(step);
        let room = world
            .move_unit(id, dir)
            .with_context(|| format!("cannot go {:?}", dir))?;
        println!("{:?} -> {}", dir, world.graph().room(room)?.name);
    }
    Ok(())
}

fn print_sheet(world: &World, id: UnitId) -> anyhow::Result<()> {
    let sheet = world.sheet(id)?;
    println!(
        "{} | Level {} {} | {:?} | HP {}/{}",
        sheet.name, sheet.level, sheet.class, sheet.faction, sheet.hit_points, sheet.max_hit_points
    );
    let s = sheet.stats;
    println!(
        "  STR {} MAG {} DEX {} SPD {} LCK {} DEF {} RES {} MOV {} CON {}",
        s.strength, s.magic, s.dexterity, s.speed, s.luck, s.defense, s.resistance, s.movement, s.constitution
    );
    for line in sheet.equipped.iter().chain(sheet.carried.iter()) {
        let wear = line
            .durability
            .map(|(cur, max)| format!(" ({}/{})", cur, max))
            .unwrap_or_default();
        let qty = if line.quantity > 1 { format!(" x{}", line.quantity) } else { String::new() };
        println!("  [{:?}] {}{}{}", line.slot, line.name, qty, wear);
    }
    for ability in &sheet.abilities {
        println!("  * {}: {}", ability.name, ability.description);
    }
    if let Some(room) = &sheet.room {
        println!("  in {}", room);
    }
    Ok(())
}

fn skirmish(world: &WorldArgs, battle: BattleArgs, samples: u32, json: bool) -> anyhow::Result<()> {
    let rules = battle.rules();
    let cfg = SkirmishConfig {
        world: Some(world.world.clone()),
        world_path: world.world_file.as_ref().map(|p| p.display().to_string()),
        seed: battle.seed,
        characters: battle.characters,
        monsters: battle.monsters,
        rules,
    };
    if samples > 1 {
        let stats = api::simulate_skirmish_many(cfg, samples)?;
        if json {
            println!("{}", serde_json::to_string_pretty(&stats)?);
            return Ok(());
        }
        println!("skirmish results");
        println!("----------------");
        println!("samples:            {}", stats.samples);
        println!("character wins:     {}", stats.character_wins);
        println!("monster wins:       {}", stats.monster_wins);
        println!("draws:              {}", stats.draws);
        println!("character win rate: {:.1}%", stats.character_win_rate() * 100.0);
        println!("avg rounds:         {:.2}", stats.avg_rounds);
        return Ok(());
    }
    let result = api::simulate_skirmish(cfg)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        for line in &result.log {
            println!("{}", line);
        }
        println!("winner: {}", result.winner);
        if !result.survivors.is_empty() {
            println!("survivors: {}", result.survivors.join("; "));
        }
    }
    Ok(())
}

/// Numbered menu on stdout, answers from any line reader. `q` or end of input backs out.
struct LineSelector<R> {
    input: R,
}

impl<R: BufRead> Selector for LineSelector<R> {
    fn select<T: Clone>(&mut self, prompt: &str, choices: &[Choice<T>]) -> Selection<T> {
        let mut out = io::stdout().lock();
        loop {
            let _ = writeln!(out, "{}", prompt);
            for (i, choice) in choices.iter().enumerate() {
                let _ = writeln!(out, "  {}) {}  {}", i + 1, choice.label, choice.detail);
            }
            let _ = write!(out, "> ");
            let _ = out.flush();

            let mut line = String::new();
            match self.input.read_line(&mut line) {
                Ok(0) | Err(_) => return Selection::Exit,
                Ok(_) => {}
            }
            let answer = line.trim();
            if answer.eq_ignore_ascii_case("q") {
                return Selection::Exit;
            }
            match answer.parse::<usize>() {
                Ok(n) if (1..=choices.len()).contains(&n) => {
                    return Selection::Picked(choices[n - 1].payload.clone());
                }
                _ => {
                    let _ = writeln!(out, "pick a number between 1 and {}", choices.len());
                }
            }
        }
    }
}

/// Characters answer to the menu; monsters play themselves.
struct Sides<S> {
    menu: MenuTactician<S>,
    auto: AutoTactician,
    shown: usize,
}

impl<S> Sides<S> {
    fn flush_log(&mut self, log: &[String]) {
        for line in log.iter().skip(self.shown) {
            println!("{}", line);
        }
        self.shown = log.len();
    }
}

impl<S: Selector> Tactician for Sides<S> {
    fn choose(&mut self, world: &World, battle: &Battle, actor: UnitId) -> Action {
        self.flush_log(battle.log());
        match world.unit(actor).map(|u| u.faction) {
            Ok(Faction::Character) => self.menu.choose(world, battle, actor),
            _ => self.auto.choose(world, battle, actor),
        }
    }

    fn rejected(&mut self, actor: UnitId, action: Action, error: &RuleError) {
        self.menu.rejected(actor, action, error);
    }
}

fn play(world: &mut World, args: BattleArgs) -> anyhow::Result<()> {
    let mut fighters = side(world, Faction::Character, &args.characters)?;
    fighters.extend(side(world, Faction::Monster, &args.monsters)?);
    let battle = Battle::new(world, fighters, args.rules())?;
    let mut dice = Dice::from_seed(args.seed);
    let stdin = io::stdin();
    let mut sides = Sides {
        menu: MenuTactician::new(LineSelector { input: stdin.lock() }),
        auto: AutoTactician,
        shown: 0,
    };
    let result = battle.run(world, &mut dice, &mut sides);
    sides.flush_log(&result.log);
    println!("winner: {}", api::winner_label(result.winner));
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.cmd {
        Cmd::Rooms => {
            let world = load_world(&cli.world)?;
            print_rooms(&world)?;
        }
        Cmd::Walk { unit, steps } => {
            let mut world = load_world(&cli.world)?;
            walk(&mut world, &unit, &steps)?;
        }
        Cmd::Sheet { unit, json } => {
            let world = load_world(&cli.world)?;
            let ids = match unit {
                Some(name) => vec![unit_named(&world, &name)?],
                None => world.units().iter().map(|u| u.id).collect(),
            };
            if json {
                let sheets = ids.iter().map(|&id| world.sheet(id)).collect::<Result<Vec<_>, _>>()?;
                println!("{}", serde_json::to_string_pretty(&sheets)?);
            } else {
                for id in ids {
                    print_sheet(&world, id)?;
                }
            }
        }
        Cmd::Skirmish { battle, samples, json } => skirmish(&cli.world, battle, samples, json)?,
        Cmd::Play { battle } => {
            let mut world = load_world(&cli.world)?;
            play(&mut world, battle)?;
        }
        Cmd::Roll { seed, rolls, chance } => {
            let mut dice = Dice::from_seed(seed);
            for _ in 0..rolls {
                match chance {
                    Some(chance) => {
                        let r = percent_check(&mut dice, chance);
                        println!(
                            "d100={} vs {}% => {}",
                            r.roll,
                            r.chance,
                            if r.success { "SUCCESS" } else { "FAIL" }
                        );
                    }
                    None => println!("{}", dice.d100()),
                }
            }
        }
    }
    Ok(())
}
