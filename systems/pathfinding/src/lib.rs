#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Breadth-first pathfinding and the pursuit system that steers pursuers
//! toward the player.

use std::collections::VecDeque;

use arcade_core::{
    tank::{ActorBehavior, ActorSnapshot, ActorView, Command, Event, TerrainView},
    CellCoord, Direction,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::trace;

/// Chooses the first step of a shortest path from `start` to `target`.
///
/// Walls and cells outside the grid are impassable; every other cell costs
/// one step. Neighbors are expanded North, South, East, West, which fixes how
/// ties between equally short paths are broken. When no path exists a
/// uniformly random cardinal direction is drawn from `rng`. Returns `None`
/// when `start` already equals `target`.
pub fn next_direction<R>(
    start: CellCoord,
    target: CellCoord,
    terrain: &TerrainView<'_>,
    rng: &mut R,
) -> Option<Direction>
where
    R: Rng + ?Sized,
{
    if start == target {
        return None;
    }

    match first_step(start, target, terrain) {
        Some(direction) => Some(direction),
        None => {
            let index = rng.gen_range(0..Direction::CARDINALS.len());
            let direction = Direction::CARDINALS[index];
            trace!(?start, ?target, ?direction, "no path, wandering");
            Some(direction)
        }
    }
}

fn first_step(start: CellCoord, target: CellCoord, terrain: &TerrainView<'_>) -> Option<Direction> {
    let (columns, rows) = terrain.dimensions();
    let width = usize::try_from(columns).ok()?;
    let cell_count = width.checked_mul(usize::try_from(rows).ok()?)?;
    let start_index = index(width, columns, rows, start)?;

    let mut parents: Vec<Option<usize>> = vec![None; cell_count];
    let mut visited = vec![false; cell_count];
    visited[start_index] = true;

    let mut queue = VecDeque::new();
    queue.push_back(start);

    while let Some(cell) = queue.pop_front() {
        if cell == target {
            return backtrack(start, target, width, columns, rows, &parents);
        }

        let Some(current) = index(width, columns, rows, cell) else {
            continue;
        };

        for direction in Direction::CARDINALS {
            let Some(neighbor) = cell.step(direction, columns, rows) else {
                continue;
            };
            if !terrain.is_traversable(neighbor) {
                continue;
            }
            let Some(neighbor_index) = index(width, columns, rows, neighbor) else {
                continue;
            };
            if visited[neighbor_index] {
                continue;
            }

            visited[neighbor_index] = true;
            parents[neighbor_index] = Some(current);
            queue.push_back(neighbor);
        }
    }

    None
}

fn backtrack(
    start: CellCoord,
    target: CellCoord,
    width: usize,
    columns: u32,
    rows: u32,
    parents: &[Option<usize>],
) -> Option<Direction> {
    let start_index = index(width, columns, rows, start)?;
    let mut step = index(width, columns, rows, target)?;

    while let Some(parent) = parents[step] {
        if parent == start_index {
            break;
        }
        step = parent;
    }

    start.direction_to(coord(width, step))
}

fn index(width: usize, columns: u32, rows: u32, cell: CellCoord) -> Option<usize> {
    if cell.column() >= columns || cell.row() >= rows {
        return None;
    }
    let column = usize::try_from(cell.column()).ok()?;
    let row = usize::try_from(cell.row()).ok()?;
    row.checked_mul(width)?.checked_add(column)
}

/// Cell the player reaches on the next tick, or its current cell when idle
/// or blocked.
fn anticipated_cell(player: &ActorSnapshot, terrain: &TerrainView<'_>) -> CellCoord {
    let (columns, rows) = terrain.dimensions();
    player
        .heading
        .and_then(|heading| player.cell.step(heading, columns, rows))
        .filter(|cell| terrain.is_traversable(*cell))
        .unwrap_or(player.cell)
}

fn coord(width: usize, index: usize) -> CellCoord {
    CellCoord::new((index % width) as u32, (index / width) as u32)
}

/// Pure system that steers every pursuer toward the player.
#[derive(Debug)]
pub struct Pursuit {
    rng: ChaCha8Rng,
}

impl Pursuit {
    /// Creates a pursuit system whose random fallback is seeded for replay.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Recomputes pursuer headings after the world advanced or gained actors.
    ///
    /// Run it after the player's heading for the coming tick is set: pursuers
    /// aim at the cell the player will occupy once that tick moves it. Emits
    /// one [`Command::SetHeading`] per pursuer. Nothing is emitted when the
    /// player is absent.
    pub fn handle(
        &mut self,
        events: &[Event],
        actor_view: &ActorView,
        terrain_view: TerrainView<'_>,
        out: &mut Vec<Command>,
    ) {
        let relevant = events.iter().any(|event| {
            matches!(
                event,
                Event::TimeAdvanced { .. } | Event::ActorSpawned { .. }
            )
        });
        if !relevant {
            return;
        }

        let Some(player) = actor_view.player() else {
            return;
        };
        let target = anticipated_cell(player, &terrain_view);

        for pursuer in actor_view
            .iter()
            .filter(|actor| actor.behavior == ActorBehavior::Pursuer)
        {
            let heading = next_direction(pursuer.cell, target, &terrain_view, &mut self.rng);
            out.push(Command::SetHeading {
                actor: pursuer.id,
                heading,
            });
        }
    }
}
