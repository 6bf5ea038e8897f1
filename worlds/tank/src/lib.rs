#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state for the tank chase game.

use arcade_core::{
    tank::{
        ActorBehavior, ActorId, Command, Event, LevelLayout, ProjectileFate, ProjectileId,
        SubCellPoint, Terrain, TerrainView,
    },
    CellCoord, Direction,
};
use tracing::debug;

/// Ticks an actor must wait between shots.
pub const FIRE_COOLDOWN_TICKS: u32 = 5;
/// Score awarded when the player collects a pellet.
pub const PELLET_SCORE: u32 = 10;
/// Score awarded when a player projectile destroys a pursuer.
pub const PURSUER_SCORE: u32 = 50;

/// Represents the authoritative tank world state.
#[derive(Debug, Default)]
pub struct World {
    columns: u32,
    rows: u32,
    terrain: Vec<Terrain>,
    actors: Vec<Actor>,
    projectiles: Vec<Projectile>,
    next_actor_id: u32,
    next_projectile_id: u32,
    score: u32,
    tick_index: u64,
}

impl World {
    /// Creates an empty world; submit [`Command::ConfigureLevel`] to load terrain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn terrain_view(&self) -> TerrainView<'_> {
        TerrainView::new(&self.terrain, self.columns, self.rows)
    }

    fn actor_mut(&mut self, actor: ActorId) -> Option<&mut Actor> {
        self.actors.iter_mut().find(|candidate| candidate.id == actor)
    }

    fn award(&mut self, points: u32, out_events: &mut Vec<Event>) {
        self.score = self.score.saturating_add(points);
        out_events.push(Event::ScoreChanged { score: self.score });
    }

    fn spawn_actor(
        &mut self,
        behavior: ActorBehavior,
        cell: CellCoord,
        out_events: &mut Vec<Event>,
    ) {
        if !self.terrain_view().is_traversable(cell) {
            out_events.push(Event::SpawnRejected { cell });
            return;
        }

        let id = ActorId::new(self.next_actor_id);
        self.next_actor_id = self.next_actor_id.saturating_add(1);
        self.actors.push(Actor {
            id,
            behavior,
            cell,
            heading: None,
            cooldown: 0,
        });
        out_events.push(Event::ActorSpawned {
            actor: id,
            behavior,
            cell,
        });
    }

    fn fire(&mut self, actor: ActorId, out_events: &mut Vec<Event>) {
        let projectile_id = ProjectileId::new(self.next_projectile_id);
        let Some(shooter) = self.actor_mut(actor) else {
            return;
        };

        if shooter.cooldown > 0 {
            out_events.push(Event::FireRejected { actor });
            return;
        }

        shooter.cooldown = FIRE_COOLDOWN_TICKS;
        let direction = shooter.heading.unwrap_or(Direction::North);
        let projectile = Projectile {
            id: projectile_id,
            owner: shooter.id,
            owner_behavior: shooter.behavior,
            position: SubCellPoint::center_of(shooter.cell),
            direction,
        };
        self.next_projectile_id = self.next_projectile_id.saturating_add(1);
        self.projectiles.push(projectile);
        out_events.push(Event::ProjectileFired {
            projectile: projectile_id,
            owner: actor,
            direction,
        });
    }

    fn step(&mut self, out_events: &mut Vec<Event>) {
        self.tick_index = self.tick_index.saturating_add(1);
        out_events.push(Event::TimeAdvanced {
            tick: self.tick_index,
        });

        for actor in &mut self.actors {
            actor.cooldown = actor.cooldown.saturating_sub(1);
        }

        self.move_actors(out_events);
        self.advance_projectiles(out_events);
        self.resolve_projectile_hits(out_events);
        self.collect_pellets(out_events);
    }

    fn move_actors(&mut self, out_events: &mut Vec<Event>) {
        let terrain = TerrainView::new(&self.terrain, self.columns, self.rows);
        for actor in &mut self.actors {
            let Some(heading) = actor.heading else {
                continue;
            };

            let destination = actor
                .cell
                .step(heading, self.columns, self.rows)
                .filter(|cell| terrain.is_traversable(*cell));
            match destination {
                Some(to) => {
                    let from = actor.cell;
                    actor.cell = to;
                    out_events.push(Event::ActorMoved {
                        actor: actor.id,
                        from,
                        to,
                    });
                }
                None => out_events.push(Event::ActorBlocked { actor: actor.id }),
            }
        }
    }

    fn advance_projectiles(&mut self, out_events: &mut Vec<Event>) {
        let terrain = TerrainView::new(&self.terrain, self.columns, self.rows);
        let width = i64::from(self.columns) * 2;
        let height = i64::from(self.rows) * 2;

        self.projectiles.retain_mut(|projectile| {
            projectile.position = projectile.position.advanced(projectile.direction);
            let position = projectile.position;

            let touches_wall = position.touched_cells().any(|(column, row)| {
                let (Ok(column), Ok(row)) = (u32::try_from(column), u32::try_from(row)) else {
                    return false;
                };
                terrain.terrain(CellCoord::new(column, row)) == Some(Terrain::Wall)
            });
            let fate = if touches_wall {
                Some(ProjectileFate::HitWall)
            } else if i64::from(position.x()) <= 0
                || i64::from(position.y()) <= 0
                || i64::from(position.x()) >= width
                || i64::from(position.y()) >= height
            {
                Some(ProjectileFate::LeftPlayfield)
            } else {
                None
            };

            match fate {
                Some(fate) => {
                    out_events.push(Event::ProjectileExpired {
                        projectile: projectile.id,
                        fate,
                    });
                    false
                }
                None => true,
            }
        });
    }

    fn resolve_projectile_hits(&mut self, out_events: &mut Vec<Event>) {
        let mut destroyed: Vec<ActorId> = Vec::new();
        let mut spent: Vec<ProjectileId> = Vec::new();
        let mut points = 0;

        for projectile in &self.projectiles {
            let Some(cell) = projectile.position.centered_cell() else {
                continue;
            };

            let Some(target) = self.actors.iter().find(|actor| {
                actor.cell == cell
                    && actor.behavior != projectile.owner_behavior
                    && !destroyed.contains(&actor.id)
            }) else {
                continue;
            };

            destroyed.push(target.id);
            spent.push(projectile.id);
            debug!(actor = target.id.get(), by = projectile.owner.get(), "actor destroyed");
            out_events.push(Event::ProjectileExpired {
                projectile: projectile.id,
                fate: ProjectileFate::HitActor,
            });
            out_events.push(Event::ActorDestroyed {
                actor: target.id,
                behavior: target.behavior,
                by: projectile.owner,
            });

            if projectile.owner_behavior == ActorBehavior::Player
                && target.behavior == ActorBehavior::Pursuer
            {
                points += PURSUER_SCORE;
            }
        }

        if destroyed.is_empty() {
            return;
        }

        self.projectiles
            .retain(|projectile| !spent.contains(&projectile.id));
        self.actors.retain(|actor| !destroyed.contains(&actor.id));
        if points > 0 {
            self.award(points, out_events);
        }
    }

    fn collect_pellets(&mut self, out_events: &mut Vec<Event>) {
        let width = self.columns as usize;
        let mut collected = Vec::new();

        for actor in &self.actors {
            if actor.behavior != ActorBehavior::Player {
                continue;
            }
            let index = actor.cell.row() as usize * width + actor.cell.column() as usize;
            if let Some(terrain) = self.terrain.get_mut(index) {
                if *terrain == Terrain::Pellet {
                    *terrain = Terrain::Empty;
                    collected.push(actor.cell);
                }
            }
        }

        for cell in collected {
            out_events.push(Event::PelletCollected { cell });
            self.award(PELLET_SCORE, out_events);
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Actor {
    id: ActorId,
    behavior: ActorBehavior,
    cell: CellCoord,
    heading: Option<Direction>,
    cooldown: u32,
}

#[derive(Clone, Copy, Debug)]
struct Projectile {
    id: ProjectileId,
    owner: ActorId,
    owner_behavior: ActorBehavior,
    position: SubCellPoint,
    direction: Direction,
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureLevel { layout } => {
            load_level(world, &layout);
        }
        Command::SpawnActor { behavior, cell } => {
            world.spawn_actor(behavior, cell, out_events);
        }
        Command::SetHeading { actor, heading } => {
            if let Some(actor) = world.actor_mut(actor) {
                actor.heading = heading;
            }
        }
        Command::Fire { actor } => {
            world.fire(actor, out_events);
        }
        Command::Tick => {
            world.step(out_events);
        }
    }
}

fn load_level(world: &mut World, layout: &LevelLayout) {
    *world = World {
        columns: layout.columns(),
        rows: layout.rows(),
        terrain: layout.terrain().to_vec(),
        ..World::default()
    };
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use arcade_core::tank::{ActorSnapshot, ActorView, ProjectileSnapshot, Terrain, TerrainView};

    use super::World;

    /// Exposes a read-only view of the terrain grid.
    #[must_use]
    pub fn terrain_view(world: &World) -> TerrainView<'_> {
        world.terrain_view()
    }

    /// Captures a read-only view of the actors inhabiting the level.
    #[must_use]
    pub fn actor_view(world: &World) -> ActorView {
        ActorView::from_snapshots(
            world
                .actors
                .iter()
                .map(|actor| ActorSnapshot {
                    id: actor.id,
                    behavior: actor.behavior,
                    cell: actor.cell,
                    heading: actor.heading,
                    cooldown: actor.cooldown,
                })
                .collect(),
        )
    }

    /// Captures the projectiles currently in flight, ordered by identifier.
    #[must_use]
    pub fn projectiles(world: &World) -> Vec<ProjectileSnapshot> {
        let mut snapshots: Vec<ProjectileSnapshot> = world
            .projectiles
            .iter()
            .map(|projectile| ProjectileSnapshot {
                id: projectile.id,
                owner: projectile.owner,
                owner_behavior: projectile.owner_behavior,
                position: projectile.position,
                direction: projectile.direction,
            })
            .collect();
        snapshots.sort_by_key(|snapshot| snapshot.id);
        snapshots
    }

    /// Score accumulated since the level was configured.
    #[must_use]
    pub fn score(world: &World) -> u32 {
        world.score
    }

    /// Number of pellets still waiting to be collected.
    #[must_use]
    pub fn pellets_remaining(world: &World) -> usize {
        world
            .terrain
            .iter()
            .filter(|terrain| **terrain == Terrain::Pellet)
            .count()
    }

    /// Number of ticks processed since the level was configured.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }
}
