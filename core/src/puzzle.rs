//! Message surface and value types for the falling-block puzzle game.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{CellColor, Direction};

/// Largest column or row count a puzzle board accepts.
pub const MAX_BOARD_DIMENSION: u32 = 64;

/// Commands that express all permissible puzzle world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Resets the world to an empty board using the provided dimensions.
    ///
    /// Dimensions outside `1..=MAX_BOARD_DIMENSION` leave the world untouched
    /// and produce [`Event::BoardRejected`].
    ConfigureBoard {
        /// Number of columns laid out on the board.
        columns: u32,
        /// Number of visible rows laid out on the board.
        rows: u32,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Supplies the shape that fills the next-piece slot.
    QueuePiece {
        /// Shape placed into the next-piece slot.
        shape: ShapeKind,
    },
    /// Requests that the active piece move one cell without locking.
    ///
    /// `North` is never honored; pieces only travel sideways or down.
    Shift {
        /// Direction of travel for the attempted move.
        direction: Direction,
    },
    /// Requests that the active piece advance to its next rotation state.
    Rotate,
    /// Gravity step: moves the active piece down or locks it in place.
    Descend,
}

/// Events broadcast by the puzzle world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// The next-piece slot is empty and awaits a [`Command::QueuePiece`].
    PieceRequested,
    /// A piece entered the board as the active piece.
    PieceSpawned {
        /// Snapshot of the piece in its spawn position.
        piece: PieceSnapshot,
    },
    /// The active piece moved or rotated to a valid position.
    PieceMoved {
        /// Snapshot of the piece after the move.
        piece: PieceSnapshot,
    },
    /// A tentative move was reverted because the result was invalid.
    MoveRejected,
    /// The active piece settled into the board.
    PieceLocked {
        /// Snapshot of the piece at the moment it locked.
        piece: PieceSnapshot,
    },
    /// Full rows were removed from the board.
    RowsCleared {
        /// Indices of the cleared rows, measured before the clear, bottom first.
        rows: Vec<u32>,
    },
    /// The score changed after clearing rows.
    ScoreChanged {
        /// Score after the change.
        score: u32,
        /// Total number of rows cleared during the session.
        lines: u32,
    },
    /// The stack reached the top of the board and the session ended.
    GameOver {
        /// Final score.
        score: u32,
        /// Total number of rows cleared during the session.
        lines: u32,
    },
    /// A board configuration was refused because of its dimensions.
    BoardRejected {
        /// Requested number of columns.
        columns: u32,
        /// Requested number of rows.
        rows: u32,
    },
}

/// Identifies one of the seven tetromino shapes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeKind {
    /// S tetromino.
    S,
    /// Z tetromino.
    Z,
    /// Straight tetromino.
    I,
    /// Square tetromino.
    O,
    /// J tetromino.
    J,
    /// L tetromino.
    L,
    /// T tetromino.
    T,
}

type Offsets = [(i32, i32); 4];

const S_STATES: [Offsets; 2] = [
    [(0, 0), (1, 0), (-1, 1), (0, 1)],
    [(0, -1), (0, 0), (1, 0), (1, 1)],
];
const Z_STATES: [Offsets; 2] = [
    [(-1, 0), (0, 0), (0, 1), (1, 1)],
    [(0, -1), (-1, 0), (0, 0), (-1, 1)],
];
const I_STATES: [Offsets; 2] = [
    [(0, -2), (0, -1), (0, 0), (0, 1)],
    [(-2, -1), (-1, -1), (0, -1), (1, -1)],
];
const O_STATES: [Offsets; 1] = [[(-1, 0), (0, 0), (-1, 1), (0, 1)]];
const J_STATES: [Offsets; 4] = [
    [(-1, -1), (-1, 0), (0, 0), (1, 0)],
    [(0, -1), (1, -1), (0, 0), (0, 1)],
    [(-1, 0), (0, 0), (1, 0), (1, 1)],
    [(0, -1), (0, 0), (-1, 1), (0, 1)],
];
const L_STATES: [Offsets; 4] = [
    [(1, -1), (-1, 0), (0, 0), (1, 0)],
    [(0, -1), (0, 0), (0, 1), (1, 1)],
    [(-1, 0), (0, 0), (1, 0), (-1, 1)],
    [(-1, -1), (0, -1), (0, 0), (0, 1)],
];
const T_STATES: [Offsets; 4] = [
    [(0, -1), (-1, 0), (0, 0), (1, 0)],
    [(0, -1), (0, 0), (1, 0), (0, 1)],
    [(-1, 0), (0, 0), (1, 0), (0, 1)],
    [(0, -1), (-1, 0), (0, 0), (0, 1)],
];

impl ShapeKind {
    /// Every shape in a fixed order.
    pub const ALL: [ShapeKind; 7] = [
        ShapeKind::S,
        ShapeKind::Z,
        ShapeKind::I,
        ShapeKind::O,
        ShapeKind::J,
        ShapeKind::L,
        ShapeKind::T,
    ];

    /// Color used for cells filled by this shape.
    #[must_use]
    pub const fn color(self) -> CellColor {
        match self {
            Self::S => CellColor::from_rgb(0, 255, 0),
            Self::Z => CellColor::from_rgb(255, 0, 0),
            Self::I => CellColor::from_rgb(0, 255, 255),
            Self::O => CellColor::from_rgb(255, 255, 0),
            Self::J => CellColor::from_rgb(0, 0, 255),
            Self::L => CellColor::from_rgb(255, 165, 0),
            Self::T => CellColor::from_rgb(128, 0, 128),
        }
    }

    /// Number of distinct rotation states the shape cycles through.
    #[must_use]
    pub const fn rotation_count(self) -> u8 {
        self.states().len() as u8
    }

    /// Offsets of the four occupied cells relative to the anchor.
    ///
    /// The rotation index wraps, so any value is accepted.
    #[must_use]
    pub fn offsets(self, rotation: u8) -> [(i32, i32); 4] {
        let states = self.states();
        states[rotation as usize % states.len()]
    }

    const fn states(self) -> &'static [Offsets] {
        match self {
            Self::S => &S_STATES,
            Self::Z => &Z_STATES,
            Self::I => &I_STATES,
            Self::O => &O_STATES,
            Self::J => &J_STATES,
            Self::L => &L_STATES,
            Self::T => &T_STATES,
        }
    }
}

/// Signed board position; rows above the visible board are negative.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BoardPoint {
    column: i32,
    row: i32,
}

impl BoardPoint {
    /// Creates a new board position.
    #[must_use]
    pub const fn new(column: i32, row: i32) -> Self {
        Self { column, row }
    }

    /// Column index, possibly outside the board.
    #[must_use]
    pub const fn column(&self) -> i32 {
        self.column
    }

    /// Row index, negative above the visible board.
    #[must_use]
    pub const fn row(&self) -> i32 {
        self.row
    }

    /// Position translated by the provided offsets.
    #[must_use]
    pub const fn offset(self, columns: i32, rows: i32) -> Self {
        Self::new(self.column + columns, self.row + rows)
    }
}

/// Immutable description of a piece used for queries and events.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PieceSnapshot {
    /// Shape of the piece.
    pub shape: ShapeKind,
    /// Rotation index, always below the shape's rotation count.
    pub rotation: u8,
    /// Board position the shape offsets are measured from.
    pub anchor: BoardPoint,
}

impl PieceSnapshot {
    /// Board positions occupied by the piece.
    #[must_use]
    pub fn cells(&self) -> [BoardPoint; 4] {
        self.shape
            .offsets(self.rotation)
            .map(|(column, row)| self.anchor.offset(column, row))
    }
}

/// State of a single visible board cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BoardCell {
    /// Nothing has settled in the cell.
    #[default]
    Empty,
    /// A locked piece filled the cell with the provided color.
    Filled(CellColor),
}

impl BoardCell {
    /// Reports whether the cell holds a locked block.
    #[must_use]
    pub const fn is_filled(&self) -> bool {
        matches!(self, Self::Filled(_))
    }
}

/// Read-only view into the dense board grid.
#[derive(Clone, Copy, Debug)]
pub struct BoardView<'a> {
    cells: &'a [BoardCell],
    columns: u32,
    rows: u32,
}

impl<'a> BoardView<'a> {
    /// Captures a new board view backed by the provided row-major cell slice.
    #[must_use]
    pub fn new(cells: &'a [BoardCell], columns: u32, rows: u32) -> Self {
        Self {
            cells,
            columns,
            rows,
        }
    }

    /// Returns the cell at the provided position, if it lies on the board.
    #[must_use]
    pub fn cell(&self, column: u32, row: u32) -> Option<BoardCell> {
        if column >= self.columns || row >= self.rows {
            return None;
        }
        let index = usize::try_from(u64::from(row) * u64::from(self.columns) + u64::from(column))
            .ok()?;
        self.cells.get(index).copied()
    }

    /// Iterator over every cell paired with its column and row.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32, BoardCell)> + 'a {
        let columns = self.columns.max(1);
        self.cells.iter().enumerate().map(move |(index, cell)| {
            let index = index as u32;
            (index % columns, index / columns, *cell)
        })
    }

    /// Provides the dimensions of the underlying board as `(columns, rows)`.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }
}

/// Score awarded for clearing `rows` rows with a single lock.
///
/// The award grows quadratically so larger clears are strictly more valuable
/// per row.
#[must_use]
pub const fn line_clear_score(rows: u32) -> u32 {
    rows.saturating_mul(rows).saturating_mul(100)
}
