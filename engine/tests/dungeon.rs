use rpg_engine::api::builtin_world;
use rpg_engine::{Dice, Direction, DungeonGraph, Faction, RoomId, RuleError, StatBlock, World};

fn intro() -> World {
    builtin_world("intro").unwrap().to_world().unwrap()
}

fn room(world: &World, name: &str) -> RoomId {
    world.graph().find(name).unwrap_or_else(|| panic!("no room named {name}"))
}

#[test]
fn edges_are_one_way() {
    let mut graph = DungeonGraph::new();
    let entrance = graph.add_room("Entrance", "");
    let kitchen = graph.add_room("Kitchen", "");
    graph.add_adjacent_room(entrance, kitchen, Direction::East).unwrap();

    assert_eq!(graph.move_from(entrance, Direction::East), Ok(kitchen));
    assert_eq!(
        graph.move_from(kitchen, Direction::West),
        Err(RuleError::NoExit { room: kitchen, direction: Direction::West })
    );
}

#[test]
fn link_adds_the_reverse_edge() {
    let mut graph = DungeonGraph::new();
    let hall = graph.add_room("Hallway", "");
    let library = graph.add_room("Library", "");
    graph.link(hall, library, Direction::East).unwrap();

    assert_eq!(graph.move_from(hall, Direction::East), Ok(library));
    assert_eq!(graph.move_from(library, Direction::West), Ok(hall));
}

#[test]
fn edges_to_unknown_rooms_are_refused() {
    let mut graph = DungeonGraph::new();
    let hall = graph.add_room("Hallway", "");
    assert_eq!(
        graph.add_adjacent_room(hall, RoomId(9), Direction::North),
        Err(RuleError::UnknownRoom(RoomId(9)))
    );
    assert!(graph.exits(hall).unwrap().is_empty());
}

#[test]
fn a_later_edge_replaces_the_earlier_one() {
    let mut graph = DungeonGraph::new();
    let a = graph.add_room("A", "");
    let b = graph.add_room("B", "");
    let c = graph.add_room("C", "");
    graph.add_adjacent_room(a, b, Direction::North).unwrap();
    assert_eq!(graph.add_adjacent_room(a, c, Direction::North), Ok(Some(b)));
    assert_eq!(graph.move_from(a, Direction::North), Ok(c));
}

#[test]
fn intro_dungeon_layout() {
    let world = intro();
    let graph = world.graph();
    let entrance = room(&world, "Entrance");
    let kitchen = room(&world, "Kitchen");

    assert_eq!(graph.len(), 7);
    assert_eq!(graph.move_from(entrance, Direction::East), Ok(kitchen));
    assert!(graph.move_from(kitchen, Direction::West).is_err());

    let names: Vec<_> = graph
        .reachable(entrance)
        .unwrap()
        .into_iter()
        .map(|id| graph.room(id).unwrap().name.clone())
        .collect();
    assert_eq!(
        names,
        ["Entrance", "Jail", "Kitchen", "Hallway", "Back Dwelling", "Library", "Dwelling"]
    );
    assert_eq!(graph.reachable(kitchen).unwrap(), vec![kitchen]);

    let dungeon = world.dungeon("intro dungeon").unwrap();
    assert_eq!(dungeon.starting_room, entrance);
    assert_eq!(dungeon.rooms.len(), 7);
}

#[test]
fn routes_follow_edge_direction() {
    let world = intro();
    let graph = world.graph();
    let entrance = room(&world, "Entrance");
    let library = room(&world, "Library");

    assert_eq!(graph.route(entrance, library), Ok(Some(vec![Direction::North, Direction::East])));
    assert_eq!(graph.route(library, entrance), Ok(None));
    assert_eq!(graph.route(entrance, entrance), Ok(Some(Vec::new())));
}

#[test]
fn random_rooms_come_from_the_dice() {
    let world = intro();
    let graph = world.graph();
    assert_eq!(graph.random_room(&mut Dice::from_scripted(vec![3])), Some(RoomId(3)));
    assert_eq!(DungeonGraph::new().random_room(&mut Dice::from_seed(1)), None);

    let dungeon = world.dungeon("Intro Dungeon").unwrap();
    let mut dice = Dice::from_seed(42);
    for _ in 0..50 {
        let pick = dungeon.random_room(&mut dice).unwrap();
        assert!(dungeon.contains(pick));
    }
}

#[test]
fn room_view_names_its_exits() {
    let world = intro();
    let view = world.graph().view(room(&world, "Hallway")).unwrap();
    assert_eq!(view.name, "Hallway");
    assert_eq!(
        view.exits,
        vec![
            (Direction::West, "Back Dwelling".to_string()),
            (Direction::East, "Library".to_string()),
            (Direction::North, "Dwelling".to_string()),
        ]
    );
}

#[test]
fn units_walk_along_exits() {
    let mut b = World::builder();
    let entrance = b.add_room("Entrance", "");
    let hallway = b.add_room("Hallway", "");
    b.add_adjacent_room(entrance, hallway, Direction::North).unwrap();
    let walker = b.add_unit("Bob", "Rogue", 3, Faction::Character, StatBlock { max_hit_points: 26, ..Default::default() });
    let lost = b.add_unit("Ghost", "Ghost", 1, Faction::Monster, StatBlock { max_hit_points: 5, ..Default::default() });
    b.place(walker, entrance).unwrap();
    let mut world = b.build();

    assert_eq!(world.move_unit(walker, Direction::North), Ok(hallway));
    assert_eq!(world.unit(walker).unwrap().room, Some(hallway));
    assert_eq!(world.units_in(hallway), vec![walker]);
    assert_eq!(
        world.move_unit(walker, Direction::South),
        Err(RuleError::NoExit { room: hallway, direction: Direction::South })
    );
    assert_eq!(world.unit(walker).unwrap().room, Some(hallway));
    assert_eq!(world.move_unit(lost, Direction::North), Err(RuleError::NotInRoom(lost)));
}
