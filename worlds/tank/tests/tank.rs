use arcade_core::{
    tank::{
        ActorBehavior, ActorId, Command, Event, LevelLayout, ProjectileFate, ProjectileId,
        Terrain,
    },
    CellCoord, Direction,
};
use arcade_tank_world::{
    self as world, query, World, FIRE_COOLDOWN_TICKS, PELLET_SCORE, PURSUER_SCORE,
};

const CORRIDOR: [&str; 5] = [
    "WWWWWWW",
    "WP...EW",
    "W.WWW.W",
    "W.....W",
    "WWWWWWW",
];

fn configured(rows: &[&str]) -> World {
    let layout = LevelLayout::parse(rows).expect("valid layout");
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(&mut world, Command::ConfigureLevel { layout }, &mut events);
    world
}

fn spawn(world: &mut World, behavior: ActorBehavior, column: u32, row: u32) -> ActorId {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::SpawnActor {
            behavior,
            cell: CellCoord::new(column, row),
        },
        &mut events,
    );
    match events.as_slice() {
        [Event::ActorSpawned { actor, .. }] => *actor,
        other => panic!("expected spawn, got {other:?}"),
    }
}

fn steer(world: &mut World, actor: ActorId, heading: Option<Direction>) {
    let mut events = Vec::new();
    world::apply(world, Command::SetHeading { actor, heading }, &mut events);
    assert!(events.is_empty());
}

fn fire(world: &mut World, actor: ActorId) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, Command::Fire { actor }, &mut events);
    events
}

fn tick(world: &mut World) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, Command::Tick, &mut events);
    events
}

fn cell_of(world: &World, actor: ActorId) -> Option<CellCoord> {
    query::actor_view(world)
        .iter()
        .find(|snapshot| snapshot.id == actor)
        .map(|snapshot| snapshot.cell)
}

#[test]
fn spawning_onto_a_wall_is_rejected() {
    let mut world = configured(&CORRIDOR);
    let mut events = Vec::new();

    world::apply(
        &mut world,
        Command::SpawnActor {
            behavior: ActorBehavior::Pursuer,
            cell: CellCoord::new(0, 0),
        },
        &mut events,
    );

    assert_eq!(
        events,
        vec![Event::SpawnRejected {
            cell: CellCoord::new(0, 0)
        }]
    );
    assert!(query::actor_view(&world).iter().next().is_none());
}

#[test]
fn player_collects_pellets_and_stops_at_walls() {
    let mut world = configured(&CORRIDOR);
    let player = spawn(&mut world, ActorBehavior::Player, 1, 1);
    steer(&mut world, player, Some(Direction::East));

    let events = tick(&mut world);
    assert_eq!(
        events,
        vec![
            Event::TimeAdvanced { tick: 1 },
            Event::ActorMoved {
                actor: player,
                from: CellCoord::new(1, 1),
                to: CellCoord::new(2, 1),
            },
            Event::PelletCollected {
                cell: CellCoord::new(2, 1)
            },
            Event::ScoreChanged { score: 10 },
        ]
    );
    assert_eq!(
        query::terrain_view(&world).terrain(CellCoord::new(2, 1)),
        Some(Terrain::Empty)
    );

    for _ in 0..3 {
        let _ = tick(&mut world);
    }
    assert_eq!(cell_of(&world, player), Some(CellCoord::new(5, 1)));
    assert_eq!(query::score(&world), 30);

    let events = tick(&mut world);
    assert!(events.contains(&Event::ActorBlocked { actor: player }));
    assert_eq!(cell_of(&world, player), Some(CellCoord::new(5, 1)));
}

#[test]
fn pursuers_do_not_collect_pellets() {
    let mut world = configured(&CORRIDOR);
    let pursuer = spawn(&mut world, ActorBehavior::Pursuer, 5, 1);
    steer(&mut world, pursuer, Some(Direction::West));

    let events = tick(&mut world);

    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::PelletCollected { .. })));
    assert_eq!(
        query::terrain_view(&world).terrain(CellCoord::new(4, 1)),
        Some(Terrain::Pellet)
    );
    assert_eq!(query::score(&world), 0);
}

#[test]
fn firing_is_rate_limited_by_cooldown() {
    let mut world = configured(&CORRIDOR);
    let player = spawn(&mut world, ActorBehavior::Player, 1, 3);

    assert!(matches!(
        fire(&mut world, player).as_slice(),
        [Event::ProjectileFired { .. }]
    ));
    assert_eq!(
        fire(&mut world, player),
        vec![Event::FireRejected { actor: player }]
    );

    for _ in 0..FIRE_COOLDOWN_TICKS {
        let _ = tick(&mut world);
    }

    assert!(matches!(
        fire(&mut world, player).as_slice(),
        [Event::ProjectileFired { .. }]
    ));
}

#[test]
fn projectile_touching_a_wall_expires() {
    let mut world = configured(&CORRIDOR);
    let player = spawn(&mut world, ActorBehavior::Player, 1, 1);
    let _ = fire(&mut world, player);

    let events = tick(&mut world);

    assert!(events.contains(&Event::ProjectileExpired {
        projectile: ProjectileId::new(0),
        fate: ProjectileFate::HitWall,
    }));
    assert!(query::projectiles(&world).is_empty());
}

#[test]
fn projectile_leaving_the_playfield_expires() {
    let mut world = configured(&["P  E"]);
    let player = spawn(&mut world, ActorBehavior::Player, 0, 0);
    steer(&mut world, player, Some(Direction::West));
    let _ = fire(&mut world, player);

    let events = tick(&mut world);

    assert!(events.contains(&Event::ActorBlocked { actor: player }));
    assert!(events.contains(&Event::ProjectileExpired {
        projectile: ProjectileId::new(0),
        fate: ProjectileFate::LeftPlayfield,
    }));
}

#[test]
fn player_projectile_destroys_pursuer_and_scores() {
    let mut world = configured(&CORRIDOR);
    let player = spawn(&mut world, ActorBehavior::Player, 1, 1);
    let pursuer = spawn(&mut world, ActorBehavior::Pursuer, 4, 1);
    steer(&mut world, player, Some(Direction::East));
    let _ = fire(&mut world, player);
    steer(&mut world, player, None);

    let mut events = Vec::new();
    for _ in 0..6 {
        events.extend(tick(&mut world));
    }

    assert!(events.contains(&Event::ActorDestroyed {
        actor: pursuer,
        behavior: ActorBehavior::Pursuer,
        by: player,
    }));
    assert!(events.contains(&Event::ProjectileExpired {
        projectile: ProjectileId::new(0),
        fate: ProjectileFate::HitActor,
    }));
    assert_eq!(query::score(&world), 50);
    assert_eq!(cell_of(&world, pursuer), None);
    assert!(query::projectiles(&world).is_empty());
}

#[test]
fn crossfire_on_one_pursuer_spends_a_single_projectile() {
    let mut world = configured(&["WWWWWWW", "WP   EW", "WWWWWWW"]);
    let left = spawn(&mut world, ActorBehavior::Player, 3, 1);
    let right = spawn(&mut world, ActorBehavior::Player, 5, 1);
    let pursuer = spawn(&mut world, ActorBehavior::Pursuer, 4, 1);
    steer(&mut world, left, Some(Direction::East));
    steer(&mut world, right, Some(Direction::West));
    let _ = fire(&mut world, left);
    let _ = fire(&mut world, right);
    steer(&mut world, left, None);
    steer(&mut world, right, None);

    let mut events = tick(&mut world);
    events.extend(tick(&mut world));

    let destroyed: Vec<_> = events
        .iter()
        .filter(|event| matches!(event, Event::ActorDestroyed { .. }))
        .collect();
    assert_eq!(
        destroyed,
        vec![&Event::ActorDestroyed {
            actor: pursuer,
            behavior: ActorBehavior::Pursuer,
            by: left,
        }]
    );
    assert_eq!(query::score(&world), PURSUER_SCORE);
    assert_eq!(cell_of(&world, pursuer), None);

    let in_flight = query::projectiles(&world);
    assert_eq!(in_flight.len(), 1);
    assert_eq!(in_flight[0].id, ProjectileId::new(1));
    assert_eq!(in_flight[0].owner, right);
}

#[test]
fn pursuer_projectiles_pass_through_other_pursuers() {
    let mut world = configured(&CORRIDOR);
    let shooter = spawn(&mut world, ActorBehavior::Pursuer, 2, 3);
    let bystander = spawn(&mut world, ActorBehavior::Pursuer, 4, 3);
    steer(&mut world, shooter, Some(Direction::East));
    let _ = fire(&mut world, shooter);

    let mut events = Vec::new();
    for _ in 0..7 {
        events.extend(tick(&mut world));
    }

    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::ActorDestroyed { .. })));
    assert!(events.contains(&Event::ProjectileExpired {
        projectile: ProjectileId::new(0),
        fate: ProjectileFate::HitWall,
    }));
    assert_eq!(cell_of(&world, bystander), Some(CellCoord::new(4, 3)));
}

#[test]
fn pursuer_projectile_destroys_player_without_scoring() {
    let mut world = configured(&CORRIDOR);
    let player = spawn(&mut world, ActorBehavior::Player, 1, 3);
    let pursuer = spawn(&mut world, ActorBehavior::Pursuer, 3, 3);
    steer(&mut world, pursuer, Some(Direction::West));
    let _ = fire(&mut world, pursuer);
    steer(&mut world, pursuer, None);

    let mut events = Vec::new();
    for _ in 0..4 {
        events.extend(tick(&mut world));
    }

    assert!(events.contains(&Event::ActorDestroyed {
        actor: player,
        behavior: ActorBehavior::Player,
        by: pursuer,
    }));
    assert!(query::actor_view(&world).player().is_none());
    assert_eq!(query::score(&world), PELLET_SCORE);
}

#[test]
fn steering_an_unknown_actor_is_ignored() {
    let mut world = configured(&CORRIDOR);

    steer(&mut world, ActorId::new(42), Some(Direction::South));
    let events = tick(&mut world);

    assert_eq!(events, vec![Event::TimeAdvanced { tick: 1 }]);
}
