//! Fixed-tick session for the tank chase.

use std::time::Duration;

use anyhow::{Context, Result};
use arcade_core::{
    tank::{ActorBehavior, ActorId, Command, Event, LevelLayout, Terrain},
    Direction,
};
use arcade_rendering::{
    CellSprite, Color, FrameDirective, FrameInput, GridPresentation, HudPlacement, KeyPress,
    Presentation, RectSprite, RenderingBackend, Scene,
};
use arcade_system_pathfinding::Pursuit;
use arcade_system_spawning::PursuerSpawner;
use arcade_tank_world::{self as world, query, World};
use glam::Vec2;
use tracing::{debug, info};

use crate::{clock::FixedStep, config::TankConfig};

const WALL_COLOR: Color = Color::from_rgb_u8(50, 50, 200);
const PELLET_COLOR: Color = Color::from_rgb_u8(255, 255, 0);
const PROJECTILE_COLOR: Color = Color::from_rgb_u8(255, 0, 0);
const PLAYER_COLOR: Color = Color::from_rgb_u8(50, 200, 50);
const PURSUER_COLOR: Color = Color::from_rgb_u8(200, 50, 50);

/// Sprite extents as fractions of a cell.
const PELLET_SIZE: f32 = 8.0 / 32.0;
const PROJECTILE_SIZE: f32 = 4.0 / 32.0;
const TANK_SIZE: f32 = 28.0 / 32.0;

/// Owns the tank world, its steering system and the tick clock.
#[derive(Debug)]
pub(crate) struct TankSession {
    world: World,
    pursuit: Pursuit,
    clock: FixedStep,
    player: Option<ActorId>,
    pending_heading: Option<Direction>,
    fire_requested: bool,
    unplanned: Vec<Event>,
}

impl TankSession {
    pub(crate) fn new(config: &TankConfig, layout: LevelLayout, seed: u64) -> Self {
        let player_start = layout.player_start();
        let spawn_points = layout.spawn_points().to_vec();

        let mut session = Self {
            world: World::new(),
            pursuit: Pursuit::new(seed),
            clock: FixedStep::new(config.tick()),
            player: None,
            pending_heading: None,
            fire_requested: false,
            unplanned: Vec::new(),
        };

        let mut commands = vec![
            Command::ConfigureLevel { layout },
            Command::SpawnActor {
                behavior: ActorBehavior::Player,
                cell: player_start,
            },
        ];
        PursuerSpawner::new(seed).populate(&spawn_points, config.pursuers, &mut commands);
        session.unplanned = session.apply_all(commands);
        session
    }

    /// Records input and runs every tick that fell due during `dt`.
    pub(crate) fn advance(&mut self, dt: Duration, input: &FrameInput) -> FrameDirective {
        for key in &input.presses {
            let heading = match key {
                KeyPress::Up => Direction::North,
                KeyPress::Down => Direction::South,
                KeyPress::Left => Direction::West,
                KeyPress::Right => Direction::East,
                KeyPress::Fire => continue,
            };
            self.pending_heading = Some(heading);
        }
        self.fire_requested |= input.pressed(KeyPress::Fire);

        let due = self.clock.advance(dt);
        for _ in 0..due {
            self.step();
        }
        FrameDirective::Continue
    }

    /// Runs one full update: player intents, pursuer steering, world tick.
    fn step(&mut self) {
        let mut commands = Vec::new();
        if let Some(actor) = self.player {
            if let Some(heading) = self.pending_heading.take() {
                commands.push(Command::SetHeading {
                    actor,
                    heading: Some(heading),
                });
            }
            if std::mem::take(&mut self.fire_requested) {
                commands.push(Command::Fire { actor });
            }
        }
        let events = self.apply_all(commands);
        self.unplanned.extend(events);

        self.steer();
        self.unplanned = self.apply_all(vec![Command::Tick]);
    }

    /// Plans pursuer headings from the events gathered since the last plan.
    fn steer(&mut self) {
        let mut commands = Vec::new();
        let events = std::mem::take(&mut self.unplanned);
        self.pursuit.handle(
            &events,
            &query::actor_view(&self.world),
            query::terrain_view(&self.world),
            &mut commands,
        );
        let _ = self.apply_all(commands);
    }

    fn apply_all(&mut self, commands: Vec<Command>) -> Vec<Event> {
        let mut events = Vec::new();
        for command in commands {
            world::apply(&mut self.world, command, &mut events);
        }

        for event in &events {
            match event {
                Event::ActorSpawned {
                    actor,
                    behavior: ActorBehavior::Player,
                    ..
                } => self.player = Some(*actor),
                Event::ActorDestroyed {
                    actor,
                    behavior: ActorBehavior::Player,
                    ..
                } => {
                    info!(score = query::score(&self.world), "player destroyed");
                    self.player = None;
                }
                Event::SpawnRejected { cell } => debug!(?cell, "spawn rejected"),
                _ => {}
            }
        }
        events
    }

    /// Rewrites `scene` from the current world state.
    pub(crate) fn populate_scene(&self, scene: &mut Scene) {
        scene.clear();

        for (cell, terrain) in query::terrain_view(&self.world).iter() {
            match terrain {
                Terrain::Wall => scene
                    .cells
                    .push(CellSprite::new(cell.column(), cell.row(), WALL_COLOR)),
                Terrain::Pellet => scene.rects.push(RectSprite::new(
                    cell_center(cell.column(), cell.row()),
                    Vec2::splat(PELLET_SIZE),
                    PELLET_COLOR,
                )),
                Terrain::Empty => {}
            }
        }

        for projectile in query::projectiles(&self.world) {
            let center = Vec2::new(
                projectile.position.x() as f32 * 0.5,
                projectile.position.y() as f32 * 0.5,
            );
            scene.rects.push(RectSprite::new(
                center,
                Vec2::splat(PROJECTILE_SIZE),
                PROJECTILE_COLOR,
            ));
        }

        for actor in query::actor_view(&self.world).iter() {
            let color = match actor.behavior {
                ActorBehavior::Player => PLAYER_COLOR,
                ActorBehavior::Pursuer => PURSUER_COLOR,
            };
            scene.rects.push(RectSprite::new(
                cell_center(actor.cell.column(), actor.cell.row()),
                Vec2::splat(TANK_SIZE),
                color,
            ));
        }

        scene.hud.push(format!("Score: {}", query::score(&self.world)));
        scene.hud.push(format!(
            "Pellets: {}",
            query::pellets_remaining(&self.world)
        ));
    }
}

fn cell_center(column: u32, row: u32) -> Vec2 {
    Vec2::new(column as f32 + 0.5, row as f32 + 0.5)
}

/// Opens the tank window and runs until quit.
pub(crate) fn run<B>(config: &TankConfig, layout: LevelLayout, seed: u64, backend: B) -> Result<()>
where
    B: RenderingBackend,
{
    let grid = GridPresentation::new(layout.columns(), layout.rows(), config.cell_length, None)
        .context("invalid tank grid")?;
    let mut session = TankSession::new(config, layout, seed);
    let mut scene = Scene::new(grid);
    session.populate_scene(&mut scene);
    let presentation = Presentation::new(
        "Tank Chase",
        Color::from_rgb_u8(0, 0, 0),
        HudPlacement::Overlay,
        scene,
    );

    info!(seed, pursuers = config.pursuers, "starting tank chase");
    backend.run(presentation, move |dt, input, scene| {
        let directive = session.advance(dt, &input);
        session.populate_scene(scene);
        directive
    })
}
