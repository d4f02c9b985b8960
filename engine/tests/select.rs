use rpg_engine::api::builtin_world;
use rpg_engine::items::{Durability, Rank, Weapon, WeaponType};
use rpg_engine::select::{command_choices, exit_choices, health_bar, item_choices, unit_choices, Command};
use rpg_engine::{
    Ability, Action, Battle, Choice, CombatRules, Dice, Direction, Faction, Item, MenuTactician, ScriptedSelector,
    Selection, Selector, Slot, StatBlock, Stats, Tactician, UnitId, World,
};

/// Always takes the first option and remembers what it was shown.
#[derive(Default)]
struct FirstPick {
    shown: Vec<Vec<String>>,
}

impl Selector for FirstPick {
    fn select<T: Clone>(&mut self, _prompt: &str, choices: &[Choice<T>]) -> Selection<T> {
        self.shown.push(choices.iter().map(|c| c.label.clone()).collect());
        match choices.first() {
            Some(choice) => Selection::Picked(choice.payload.clone()),
            None => Selection::Exit,
        }
    }
}

fn labels<T>(choices: &[Choice<T>]) -> Vec<&str> {
    choices.iter().map(|c| c.label.as_str()).collect()
}

fn sword(durability: u32) -> Item {
    Item::PhysicalWeapon(Weapon {
        name: "Sword".into(),
        description: String::new(),
        weapon_type: WeaponType::Sword,
        required_rank: Rank::E,
        might: 5,
        hit: 80,
        crit: 0,
        range: 1,
        weight: 4,
        durability: Durability::new(durability),
    })
}

fn skirmish(durability: u32) -> (World, UnitId, UnitId, UnitId) {
    let mut b = World::builder();
    let john = b.add_unit(
        "John",
        "Fighter",
        1,
        Faction::Character,
        StatBlock { max_hit_points: 28, strength: 10, dexterity: 7, speed: 7, luck: 8, ..Default::default() },
    );
    let knight = b.add_unit(
        "Reginald",
        "Knight",
        5,
        Faction::Character,
        StatBlock { max_hit_points: 30, speed: 5, defense: 13, ..Default::default() },
    );
    let guard = b.add_unit(
        "Guard",
        "Goblin",
        2,
        Faction::Monster,
        StatBlock { max_hit_points: 30, dexterity: 7, speed: 5, luck: 10, defense: 13, ..Default::default() },
    );
    let blade = b.add_item(sword(durability));
    b.grant_item(john, blade, Slot::Weapon).unwrap();
    let club = b.add_item(sword(45));
    b.grant_item(guard, club, Slot::Weapon).unwrap();
    b.grant_ability(knight, Ability::Taunt).unwrap();
    (b.build(), john, knight, guard)
}

#[test]
fn scripted_selector_replays_picks() {
    let choices = vec![Choice::new("a", "", 'a'), Choice::new("b", "", 'b'), Choice::new("c", "", 'c')];
    let mut selector = ScriptedSelector::new([Some(1), None, Some(7)]);

    assert_eq!(selector.select("first", &choices), Selection::Picked('b'));
    assert_eq!(selector.select("second", &choices), Selection::Exit);
    assert_eq!(selector.select("third", &choices), Selection::Exit);
    assert_eq!(selector.remaining(), 0);
    assert_eq!(selector.select("fourth", &choices), Selection::Exit);
    assert_eq!(selector.prompts(), ["first", "second", "third", "fourth"]);
}

#[test]
fn health_bar_rounds_to_ten_cells() {
    let wounded: Stats = StatBlock { hit_points: Some(19), max_hit_points: 27, ..Default::default() }.into();
    assert_eq!(health_bar(&wounded), "[#######---] 19/27");
    assert_eq!(health_bar(&Stats::new(10)), "[##########] 10/10");
    let mut down = Stats::new(10);
    down.apply_damage(10);
    assert_eq!(health_bar(&down), "[----------] 0/10");
}

#[test]
fn intro_menus() {
    let world = builtin_world("intro").unwrap().to_world().unwrap();

    let units = unit_choices(&world);
    assert_eq!(units.len(), 10);
    assert_eq!(units[0].label, "John, Brave Level 1 Fighter");
    assert_eq!(units[0].detail, "[##########] 28/28");
    assert_eq!(units[5].label, "Poltergeist Level 1 Ghost");

    let jane = world.find_unit("Jane").unwrap();
    let commands = command_choices(&world, jane);
    assert_eq!(labels(&commands), ["Attack", "Use Potion", "Use Book", "Wait"]);
    assert_eq!(commands[0].detail, "Decay (45/45)");

    let alice = world.find_unit("Alice").unwrap();
    assert_eq!(labels(&command_choices(&world, alice)), ["Attack", "Heal", "Use Potion", "Wait"]);

    let ghost = world.find_unit("Poltergeist").unwrap();
    assert_eq!(labels(&command_choices(&world, ghost)), ["Attack", "Wait"]);

    let bag = item_choices(&world, jane).unwrap();
    assert_eq!(labels(&bag), ["Decay", "Hood", "Staff", "Potion", "Book"]);

    let entrance = world.graph().find("Entrance").unwrap();
    let exits = exit_choices(&world, entrance).unwrap();
    assert_eq!(labels(&exits), ["West", "East", "North"]);
    assert_eq!(exits.iter().map(|c| c.detail.as_str()).collect::<Vec<_>>(), ["Jail", "Kitchen", "Hallway"]);
    assert_eq!(exits[2].payload, Direction::North);
}

#[test]
fn defeated_units_are_marked() {
    let (mut world, john, ..) = skirmish(45);
    world.unit_mut(john).unwrap().stats.apply_damage(99);
    assert_eq!(unit_choices(&world)[0].label, "John Level 1 Fighter (defeated)");
}

#[test]
fn menu_tactician_drives_a_round() {
    let (mut world, john, _, guard) = skirmish(45);
    let mut battle = Battle::new(&world, vec![john, guard], CombatRules::default()).unwrap();
    let mut dice = Dice::from_scripted(vec![1, 100]);
    let mut menu = MenuTactician::new(ScriptedSelector::new([Some(0), Some(0)]));

    battle.run_round(&mut world, &mut dice, &mut menu);

    assert_eq!(menu.selector().prompts(), ["John's turn", "Choose a target", "Guard's turn"]);
    assert!(battle.log().iter().any(|l| l == "[ATTACK][John] Sword → Guard d100=1 vs 77% → HIT"));
    assert!(battle.log().iter().any(|l| l == "[WAIT][Guard] waits"));
    assert_eq!(world.unit(guard).unwrap().stats.hit_points(), 28);
}

#[test]
fn menu_tactician_asks_again_after_a_refusal() {
    let (mut world, john, _, guard) = skirmish(0);
    let mut battle = Battle::new(&world, vec![john, guard], CombatRules::default()).unwrap();
    let mut dice = Dice::from_seed(1);
    let mut menu = MenuTactician::new(ScriptedSelector::new([Some(0), Some(0), Some(1)]));

    battle.run_round(&mut world, &mut dice, &mut menu);

    let prompts = menu.into_selector().prompts().to_vec();
    assert_eq!(prompts.len(), 4);
    assert_eq!(prompts[2], "John: weapon ItemId(0) is broken. Choose again");
    assert!(battle.log().iter().any(|l| l == "[WAIT][John] waits"));
}

#[test]
fn menu_targets_respect_taunt() {
    let (mut world, _, knight, guard) = skirmish(45);
    world.unit_mut(knight).unwrap().taunt_turns = 2;
    let battle = Battle::new(&world, battle_ids(&world), CombatRules::default()).unwrap();
    let mut menu = MenuTactician::new(FirstPick::default());

    let action = menu.choose(&world, &battle, guard);

    assert_eq!(action, Action::Attack { target: knight });
    let shown = &menu.selector().shown;
    assert_eq!(shown[0], ["Attack", "Wait"]);
    assert_eq!(shown[1], ["Reginald Level 5 Knight"]);
}

#[test]
fn backing_out_waits() {
    let (world, john, _, guard) = skirmish(45);
    let battle = Battle::new(&world, vec![john, guard], CombatRules::default()).unwrap();
    let mut menu = MenuTactician::new(ScriptedSelector::new([Some(0), None]));
    assert_eq!(menu.choose(&world, &battle, john), Action::Wait);
    assert!(menu.last_rejection().is_none());
    assert_eq!(
        command_choices(&world, john).iter().map(|c| c.payload).collect::<Vec<_>>(),
        [Command::Attack, Command::Wait]
    );
}

fn battle_ids(world: &World) -> Vec<UnitId> {
    world.units().iter().map(|u| u.id).collect()
}
