//! Frame-driven session for the falling-block puzzle.

use std::time::Duration;

use anyhow::{Context, Result};
use arcade_core::{
    puzzle::{BoardCell, Command, Event},
    Direction,
};
use arcade_puzzle_world::{self as world, query, World};
use arcade_rendering::{
    Banner, CellSprite, Color, FrameDirective, FrameInput, GridPresentation, HudPlacement,
    KeyPress, PiecePreview, Presentation, RenderingBackend, Scene,
};
use arcade_system_gravity::Gravity;
use arcade_system_spawning::PieceFeed;
use tracing::info;

use crate::config::PuzzleConfig;

const SIDEBAR_WIDTH: f32 = 200.0;
const GRID_LINE_COLOR: Color = Color::from_rgb_u8(128, 128, 128);
const BANNER_COLOR: Color = Color::from_rgb_u8(255, 255, 255);

/// Owns the puzzle world together with the systems that drive it.
#[derive(Debug)]
pub(crate) struct PuzzleSession {
    world: World,
    gravity: Gravity,
    feed: PieceFeed,
    game_over_delay: Duration,
    since_game_over: Option<Duration>,
}

impl PuzzleSession {
    pub(crate) fn new(config: &PuzzleConfig, seed: u64) -> Self {
        let mut session = Self {
            world: World::new(),
            gravity: Gravity::new(config.fall_interval()),
            feed: PieceFeed::new(seed),
            game_over_delay: config.game_over_delay(),
            since_game_over: None,
        };
        session.dispatch(vec![Command::ConfigureBoard {
            columns: config.columns,
            rows: config.rows,
        }]);
        session
    }

    /// Applies player input, advances the clock and reports whether to exit.
    pub(crate) fn advance(&mut self, dt: Duration, input: &FrameInput) -> FrameDirective {
        if let Some(elapsed) = self.since_game_over.as_mut() {
            *elapsed = elapsed.saturating_add(dt);
            if *elapsed >= self.game_over_delay {
                return FrameDirective::Exit;
            }
            return FrameDirective::Continue;
        }

        let mut commands = Vec::new();
        for key in &input.presses {
            match key {
                KeyPress::Left => commands.push(Command::Shift {
                    direction: Direction::West,
                }),
                KeyPress::Right => commands.push(Command::Shift {
                    direction: Direction::East,
                }),
                KeyPress::Down => commands.push(Command::Shift {
                    direction: Direction::South,
                }),
                KeyPress::Up => commands.push(Command::Rotate),
                KeyPress::Fire => {}
            }
        }
        commands.push(Command::Tick { dt });
        self.dispatch(commands);
        FrameDirective::Continue
    }

    /// Runs commands through the world and feeds resulting events to the
    /// systems until nothing more is produced.
    fn dispatch(&mut self, mut commands: Vec<Command>) {
        let mut events = Vec::new();
        while !commands.is_empty() {
            events.clear();
            for command in commands.drain(..) {
                world::apply(&mut self.world, command, &mut events);
            }

            for event in &events {
                if let Event::GameOver { score, lines } = event {
                    info!(score, lines, "puzzle finished");
                    if self.since_game_over.is_none() {
                        self.since_game_over = Some(Duration::ZERO);
                    }
                }
            }

            self.gravity.handle(&events, &mut commands);
            self.feed.handle(&events, &mut commands);
        }
    }

    /// Rewrites `scene` from the current world state.
    pub(crate) fn populate_scene(&self, scene: &mut Scene) {
        scene.clear();
        scene.grid.line_color = Some(GRID_LINE_COLOR);

        for (column, row, cell) in query::board_view(&self.world).iter() {
            if let BoardCell::Filled(color) = cell {
                scene.cells.push(CellSprite::new(column, row, color.into()));
            }
        }

        if let Some(piece) = query::active_piece(&self.world) {
            let color = Color::from(piece.shape.color());
            for point in piece.cells() {
                let (Ok(column), Ok(row)) = (u32::try_from(point.column()), u32::try_from(point.row()))
                else {
                    continue;
                };
                scene.cells.push(CellSprite::new(column, row, color));
            }
        }

        scene.hud.push(format!("Score: {}", query::score(&self.world)));
        scene
            .hud
            .push(format!("Lines: {}", query::lines_cleared(&self.world)));

        scene.preview = query::next_shape(&self.world).map(|shape| PiecePreview {
            label: "Next:".to_owned(),
            cells: shape.offsets(0).to_vec(),
            color: shape.color().into(),
        });

        if query::is_game_over(&self.world) {
            scene.banner = Some(Banner {
                text: "GAME OVER".to_owned(),
                color: BANNER_COLOR,
            });
        }
    }
}

/// Opens the puzzle window and runs until game over or quit.
pub(crate) fn run<B>(config: &PuzzleConfig, seed: u64, backend: B) -> Result<()>
where
    B: RenderingBackend,
{
    let grid = GridPresentation::new(config.columns, config.rows, config.cell_length, None)
        .context("invalid puzzle grid")?;
    let mut session = PuzzleSession::new(config, seed);
    let mut scene = Scene::new(grid);
    session.populate_scene(&mut scene);
    let presentation = Presentation::new(
        "Falling Blocks",
        Color::from_rgb_u8(0, 0, 0),
        HudPlacement::Sidebar {
            width: SIDEBAR_WIDTH,
        },
        scene,
    );

    info!(seed, "starting puzzle");
    backend.run(presentation, move |dt, input, scene| {
        let directive = session.advance(dt, &input);
        session.populate_scene(scene);
        directive
    })
}
