#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state for the falling-block puzzle game.

mod board;

pub use board::{Board, Piece};

use arcade_core::{
    puzzle::{line_clear_score, Command, Event, ShapeKind},
    Direction,
};
use tracing::{debug, info, warn};

/// Represents the authoritative puzzle world state.
#[derive(Debug)]
pub struct World {
    board: Board,
    active: Option<Piece>,
    next: Option<ShapeKind>,
    score: u32,
    lines: u32,
    game_over: bool,
}

impl World {
    /// Creates a new world with an empty default-sized board.
    #[must_use]
    pub fn new() -> Self {
        Self::with_board(Board::default())
    }

    fn with_board(board: Board) -> Self {
        Self {
            board,
            active: None,
            next: None,
            score: 0,
            lines: 0,
            game_over: false,
        }
    }

    fn try_move<F>(&mut self, transform: F, out_events: &mut Vec<Event>)
    where
        F: FnOnce(&Piece) -> Piece,
    {
        let Some(active) = self.active else {
            return;
        };

        let candidate = transform(&active);
        if self.board.is_valid(&candidate) {
            self.active = Some(candidate);
            out_events.push(Event::PieceMoved {
                piece: candidate.snapshot(),
            });
        } else {
            out_events.push(Event::MoveRejected);
        }
    }

    fn descend(&mut self, out_events: &mut Vec<Event>) {
        let Some(active) = self.active else {
            return;
        };

        let candidate = active.translated(0, 1);
        if self.board.is_valid(&candidate) {
            self.active = Some(candidate);
            out_events.push(Event::PieceMoved {
                piece: candidate.snapshot(),
            });
            return;
        }

        self.active = None;
        self.board.lock(&active);
        debug!(shape = ?active.shape(), anchor = ?active.anchor(), "piece locked");
        out_events.push(Event::PieceLocked {
            piece: active.snapshot(),
        });

        let full_rows = self.board.full_rows();
        let cleared = self.board.clear_rows();
        if cleared > 0 {
            self.lines = self.lines.saturating_add(cleared);
            self.score = self.score.saturating_add(line_clear_score(cleared));
            debug!(cleared, score = self.score, "rows cleared");
            out_events.push(Event::RowsCleared { rows: full_rows });
            out_events.push(Event::ScoreChanged {
                score: self.score,
                lines: self.lines,
            });
        }

        if self.board.has_overflowed() {
            self.finish(out_events);
            return;
        }

        self.promote(out_events);
    }

    fn promote(&mut self, out_events: &mut Vec<Event>) {
        if self.active.is_none() {
            if let Some(shape) = self.next.take() {
                let piece = Piece::spawn(shape, self.board.columns());
                if !self.board.is_valid(&piece) {
                    self.finish(out_events);
                    return;
                }
                self.active = Some(piece);
                out_events.push(Event::PieceSpawned {
                    piece: piece.snapshot(),
                });
            }
        }

        if self.next.is_none() {
            out_events.push(Event::PieceRequested);
        }
    }

    fn finish(&mut self, out_events: &mut Vec<Event>) {
        self.game_over = true;
        self.active = None;
        info!(score = self.score, lines = self.lines, "game over");
        out_events.push(Event::GameOver {
            score: self.score,
            lines: self.lines,
        });
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Once the game is over every command except [`Command::ConfigureBoard`] is
/// ignored.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    if world.game_over && !matches!(command, Command::ConfigureBoard { .. }) {
        return;
    }

    match command {
        Command::ConfigureBoard { columns, rows } => {
            let Some(board) = Board::new(columns, rows) else {
                warn!(columns, rows, "board dimensions rejected");
                out_events.push(Event::BoardRejected { columns, rows });
                return;
            };
            *world = World::with_board(board);
            out_events.push(Event::PieceRequested);
        }
        Command::Tick { dt } => {
            out_events.push(Event::TimeAdvanced { dt });
        }
        Command::QueuePiece { shape } => {
            world.next = Some(shape);
            world.promote(out_events);
        }
        Command::Shift { direction } => {
            let (columns, rows) = match direction {
                Direction::West | Direction::East | Direction::South => direction.delta(),
                Direction::North => {
                    out_events.push(Event::MoveRejected);
                    return;
                }
            };
            world.try_move(|piece| piece.translated(columns, rows), out_events);
        }
        Command::Rotate => {
            world.try_move(Piece::rotated, out_events);
        }
        Command::Descend => {
            world.descend(out_events);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use arcade_core::puzzle::{BoardView, PieceSnapshot, ShapeKind};

    use super::World;

    /// Exposes a read-only view of the locked cells.
    #[must_use]
    pub fn board_view(world: &World) -> BoardView<'_> {
        world.board.view()
    }

    /// Snapshot of the falling piece, if one is active.
    #[must_use]
    pub fn active_piece(world: &World) -> Option<PieceSnapshot> {
        world.active.map(|piece| piece.snapshot())
    }

    /// Shape waiting in the next-piece slot, if any.
    #[must_use]
    pub fn next_shape(world: &World) -> Option<ShapeKind> {
        world.next
    }

    /// Score accumulated during the session.
    #[must_use]
    pub fn score(world: &World) -> u32 {
        world.score
    }

    /// Total number of rows cleared during the session.
    #[must_use]
    pub fn lines_cleared(world: &World) -> u32 {
        world.lines
    }

    /// Reports whether the stack reached the top of the board.
    #[must_use]
    pub fn is_game_over(world: &World) -> bool {
        world.game_over
    }
}
