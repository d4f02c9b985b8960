use rpg_engine::api::{builtin_world, parse_world};
use rpg_engine::{Ability, BuildError, Faction, Item, Slot, SlotPolicy, WorldFile};
use std::path::Path;

#[test]
fn intro_world_builds() {
    let file = builtin_world("intro").unwrap();
    assert_eq!(file.slot_policy, SlotPolicy::Strict);
    let world = file.to_world().unwrap();

    assert_eq!(world.units().len(), 10);
    assert_eq!(world.faction(Faction::Character).len(), 5);
    assert_eq!(world.faction(Faction::Monster).len(), 5);
    assert_eq!(world.graph().len(), 7);
    assert_eq!(world.dungeons().len(), 1);
    assert!(world.units().iter().all(|u| u.room.is_some()));
}

#[test]
fn intro_world_placement_is_stable() {
    let a = builtin_world("intro").unwrap().to_world().unwrap();
    let b = builtin_world("intro").unwrap().to_world().unwrap();
    let rooms = |w: &rpg_engine::World| w.units().iter().map(|u| u.room).collect::<Vec<_>>();
    assert_eq!(rooms(&a), rooms(&b));
}

#[test]
fn jane_casts_decay() {
    let world = builtin_world("intro").unwrap().to_world().unwrap();
    let jane = world.find_unit("Jane").unwrap();
    let (weapon, _) = world.equipped_weapon(jane).unwrap().unwrap();
    let decay = world.item(weapon).unwrap();
    assert_eq!(decay.name(), "Decay");
    assert!(decay.is_magic());

    let carried: Vec<_> = world
        .unequipped(jane)
        .unwrap()
        .into_iter()
        .map(|id| world.item(id).unwrap().name().to_string())
        .collect();
    assert_eq!(carried, ["Staff", "Potion", "Book"]);
}

#[test]
fn every_grant_is_its_own_instance() {
    let world = builtin_world("intro").unwrap().to_world().unwrap();
    let john = world.find_unit("John, Brave").unwrap();
    let reginald = world.find_unit("Reginald III, Sir").unwrap();
    let (johns, _) = world.equipped_weapon(john).unwrap().unwrap();
    let (reginalds, _) = world.equipped_weapon(reginald).unwrap().unwrap();

    assert_ne!(johns, reginalds);
    assert_eq!(world.item(johns).unwrap().name(), "Sword");
    assert_eq!(world.item(reginalds).unwrap().name(), "Sword");
}

#[test]
fn abilities_come_from_the_file() {
    let world = builtin_world("intro").unwrap().to_world().unwrap();
    let has = |name: &str, ability| world.unit(world.find_unit(name).unwrap()).unwrap().has(ability);
    assert!(has("Bob, Sneaky", Ability::Steal));
    assert!(has("Alice", Ability::Heal));
    assert!(has("Reginald III, Sir", Ability::Taunt));
    assert!(has("Poltergeist", Ability::Fly));
    assert!(!has("Jane", Ability::Heal));
}

#[test]
fn sheet_lists_equipment_and_abilities() {
    let world = builtin_world("intro").unwrap().to_world().unwrap();
    let bob = world.find_unit("bob, sneaky").unwrap();
    let sheet = world.sheet(bob).unwrap();

    assert_eq!(sheet.name, "Bob, Sneaky");
    assert_eq!(sheet.level, 3);
    assert_eq!(sheet.hit_points, 26);
    let equipped: Vec<_> = sheet.equipped.iter().map(|l| (l.slot, l.name.as_str())).collect();
    assert_eq!(
        equipped,
        [(Slot::Weapon, "Dagger"), (Slot::Legs, "Pants"), (Slot::Feet, "Shoes")]
    );
    let dagger = &sheet.equipped[0];
    assert_eq!(dagger.durability, Some((45, 45)));
    assert_eq!(sheet.carried.len(), 2);
    assert_eq!(sheet.abilities.len(), 1);
    assert_eq!(sheet.abilities[0].ability, Ability::Steal);
    assert!(sheet.room.is_some());
}

const SMALL_JSON: &str = r#"{
  "items": {
    "elixir": { "family": "consumable", "name": "Elixir", "kind": "potion", "max_uses": 2, "uses_left": 2 },
    "club": { "family": "physical_weapon", "name": "Club", "weapon_type": "axe", "might": 3, "hit": 90, "durability": { "current": 3, "max": 20 } }
  },
  "rooms": {
    "cave": { "name": "Cave" },
    "pool": { "name": "Pool" }
  },
  "edges": [ { "from": "cave", "to": "pool", "direction": "south", "both": true } ],
  "units": [
    { "name": "Ogre", "class": "Brute", "faction": "monster",
      "stats": { "max_hit_points": 40, "strength": 12 },
      "inventory": [ { "item": "club", "slot": "weapon" }, { "item": "elixir", "quantity": 2 } ],
      "room": "pool" }
  ]
}"#;

#[test]
fn json_worlds_parse_by_extension() {
    let file = parse_world(SMALL_JSON, Path::new("cave.JSON")).unwrap();
    let world = file.to_world().unwrap();
    let ogre = world.find_unit("Ogre").unwrap();
    let unit = world.unit(ogre).unwrap();

    assert_eq!(unit.level, 1);
    assert_eq!(unit.stats.hit_points(), 40);
    assert_eq!(world.graph().room(unit.room.unwrap()).unwrap().name, "Pool");
    assert_eq!(world.unit(ogre).unwrap().inventory.total_quantity(), 3);

    let (club, _) = world.equipped_weapon(ogre).unwrap().unwrap();
    let durability = world.item(club).unwrap().durability().unwrap();
    assert_eq!((durability.current(), durability.max()), (3, 20));

    let cave = world.graph().find("cave").unwrap();
    let pool = world.graph().find("pool").unwrap();
    assert_eq!(world.graph().move_from(pool, rpg_engine::Direction::North), Ok(cave));
}

#[test]
fn yaml_is_the_default_format() {
    assert!(parse_world(SMALL_JSON, Path::new("cave.yaml")).is_ok());
    assert!(parse_world("units: [", Path::new("broken.yaml")).is_err());
}

fn file_with_unit(unit: &str) -> WorldFile {
    let text = format!(
        r#"
items:
  potion: {{ family: consumable, name: Potion, kind: potion }}
rooms:
  cave: {{ name: Cave }}
units:
{unit}
"#
    );
    WorldFile::from_yaml(&text).unwrap()
}

#[test]
fn unknown_keys_are_reported() {
    let bad_item = file_with_unit(
        "  - { name: Ogre, class: Brute, faction: monster, stats: { max_hit_points: 9 }, inventory: [ { item: club } ] }",
    );
    assert!(matches!(bad_item.to_world(), Err(BuildError::UnknownItemKey(k)) if k == "club"));

    let bad_room = file_with_unit(
        "  - { name: Ogre, class: Brute, faction: monster, stats: { max_hit_points: 9 }, room: lake }",
    );
    assert!(matches!(bad_room.to_world(), Err(BuildError::UnknownRoomKey(k)) if k == "lake"));
}

#[test]
fn worlds_without_rooms_leave_units_unplaced() {
    let arena = WorldFile::from_yaml(
        r#"
units:
  - { name: Ogre, class: Brute, faction: monster, stats: { max_hit_points: 9 } }
  - { name: John, class: Fighter, faction: character, stats: { max_hit_points: 28 } }
"#,
    )
    .unwrap();
    let world = arena.to_world().unwrap();
    assert_eq!(world.units().len(), 2);
    assert!(world.graph().is_empty());
    assert!(world.units().iter().all(|u| u.room.is_none()));
}

#[test]
fn duplicate_unit_names_are_refused() {
    let twins = file_with_unit(
        "  - { name: Ogre, class: Brute, faction: monster, stats: { max_hit_points: 9 } }\n  - { name: Ogre, class: Brute, faction: monster, stats: { max_hit_points: 9 } }",
    );
    assert!(matches!(twins.to_world(), Err(BuildError::DuplicateKey(k)) if k == "Ogre"));
}

#[test]
fn strict_files_reject_misfiled_items() {
    let misfiled = file_with_unit(
        "  - { name: Jane, class: Wizard, faction: character, stats: { max_hit_points: 25 }, inventory: [ { item: potion, slot: weapon } ] }",
    );
    assert!(matches!(misfiled.to_world(), Err(BuildError::Rule { unit, .. }) if unit == "Jane"));

    let mut lenient = misfiled.clone();
    lenient.slot_policy = SlotPolicy::Demote;
    let world = lenient.to_world().unwrap();
    let jane = world.find_unit("Jane").unwrap();
    assert_eq!(world.equipped_weapon(jane).unwrap(), None);
    assert!(matches!(world.item(world.unequipped(jane).unwrap()[0]), Ok(Item::Consumable(_))));
}

#[test]
fn unknown_builtin_world_lists_the_known_ones() {
    let err = builtin_world("nowhere").unwrap_err().to_string();
    assert!(err.contains("nowhere"));
    assert!(err.contains("intro"));
}
