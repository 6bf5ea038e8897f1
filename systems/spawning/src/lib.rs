#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Seeded spawning systems: the puzzle piece feed and pursuer placement.

use arcade_core::{
    puzzle::{self, ShapeKind},
    tank::{self, ActorBehavior},
    CellCoord,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Pure system that answers piece requests with uniformly random shapes.
#[derive(Debug)]
pub struct PieceFeed {
    rng: ChaCha8Rng,
}

impl PieceFeed {
    /// Creates a piece feed whose sequence is fully determined by `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Emits one [`puzzle::Command::QueuePiece`] per [`puzzle::Event::PieceRequested`].
    pub fn handle(&mut self, events: &[puzzle::Event], out: &mut Vec<puzzle::Command>) {
        for event in events {
            if matches!(event, puzzle::Event::PieceRequested) {
                let shape = self.next_shape();
                out.push(puzzle::Command::QueuePiece { shape });
            }
        }
    }

    fn next_shape(&mut self) -> ShapeKind {
        let index = self.rng.gen_range(0..ShapeKind::ALL.len());
        ShapeKind::ALL[index]
    }
}

/// Pure system that places pursuers on the level's spawn points.
#[derive(Debug)]
pub struct PursuerSpawner {
    rng: ChaCha8Rng,
}

impl PursuerSpawner {
    /// Creates a spawner whose placements are fully determined by `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Emits `count` spawn commands, each on a spawn point drawn uniformly
    /// with replacement.
    pub fn populate(
        &mut self,
        spawn_points: &[CellCoord],
        count: usize,
        out: &mut Vec<tank::Command>,
    ) {
        if spawn_points.is_empty() {
            return;
        }

        for _ in 0..count {
            let cell = self.select_spawner(spawn_points);
            out.push(tank::Command::SpawnActor {
                behavior: ActorBehavior::Pursuer,
                cell,
            });
        }
    }

    fn select_spawner(&mut self, spawn_points: &[CellCoord]) -> CellCoord {
        let index = self.rng.gen_range(0..spawn_points.len());
        spawn_points[index]
    }
}
