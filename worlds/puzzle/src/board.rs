//! Dense board grid, piece geometry, validation and row clearing.

use arcade_core::puzzle::{
    BoardCell, BoardPoint, BoardView, PieceSnapshot, ShapeKind, MAX_BOARD_DIMENSION,
};

const DEFAULT_COLUMNS: u32 = 10;
const DEFAULT_ROWS: u32 = 20;

/// Falling piece positioned on the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Piece {
    shape: ShapeKind,
    rotation: u8,
    anchor: BoardPoint,
}

impl Piece {
    /// Creates a piece with an explicit rotation and anchor.
    ///
    /// The rotation wraps modulo the shape's rotation count.
    #[must_use]
    pub fn new(shape: ShapeKind, rotation: u8, anchor: BoardPoint) -> Self {
        Self {
            shape,
            rotation: rotation % shape.rotation_count(),
            anchor,
        }
    }

    /// Piece in its spawn position: top row, horizontally centered.
    #[must_use]
    pub fn spawn(shape: ShapeKind, columns: u32) -> Self {
        Self::new(shape, 0, BoardPoint::new((columns / 2) as i32, 0))
    }

    /// Shape of the piece.
    #[must_use]
    pub const fn shape(&self) -> ShapeKind {
        self.shape
    }

    /// Current rotation index.
    #[must_use]
    pub const fn rotation(&self) -> u8 {
        self.rotation
    }

    /// Board position the shape offsets are measured from.
    #[must_use]
    pub const fn anchor(&self) -> BoardPoint {
        self.anchor
    }

    /// Board positions occupied by the piece.
    #[must_use]
    pub fn cells(&self) -> [BoardPoint; 4] {
        self.snapshot().cells()
    }

    /// Copy of the piece moved by the provided offsets.
    #[must_use]
    pub fn translated(&self, columns: i32, rows: i32) -> Self {
        Self {
            anchor: self.anchor.offset(columns, rows),
            ..*self
        }
    }

    /// Copy of the piece advanced to its next rotation state.
    #[must_use]
    pub fn rotated(&self) -> Self {
        Self {
            rotation: (self.rotation + 1) % self.shape.rotation_count(),
            ..*self
        }
    }

    /// Immutable snapshot used by queries and events.
    #[must_use]
    pub const fn snapshot(&self) -> PieceSnapshot {
        PieceSnapshot {
            shape: self.shape,
            rotation: self.rotation,
            anchor: self.anchor,
        }
    }
}

/// Dense row-major grid of locked cells.
#[derive(Clone, Debug)]
pub struct Board {
    columns: u32,
    rows: u32,
    cells: Vec<BoardCell>,
}

impl Board {
    /// Creates an empty board.
    ///
    /// Returns `None` when either dimension is zero or exceeds
    /// [`MAX_BOARD_DIMENSION`].
    #[must_use]
    pub fn new(columns: u32, rows: u32) -> Option<Self> {
        let accepted = |length: u32| (1..=MAX_BOARD_DIMENSION).contains(&length);
        if !accepted(columns) || !accepted(rows) {
            return None;
        }

        let capacity = usize::try_from(columns)
            .ok()?
            .checked_mul(usize::try_from(rows).ok()?)?;
        Some(Self {
            columns,
            rows,
            cells: vec![BoardCell::Empty; capacity],
        })
    }

    /// Number of columns on the board.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of visible rows on the board.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Read-only view over the board cells.
    #[must_use]
    pub fn view(&self) -> BoardView<'_> {
        BoardView::new(&self.cells, self.columns, self.rows)
    }

    /// Reports whether the piece may occupy its current position.
    ///
    /// Cells above the visible board are always permitted. Every other cell
    /// must lie on the board and must not already be filled.
    #[must_use]
    pub fn is_valid(&self, piece: &Piece) -> bool {
        piece.cells().iter().all(|point| {
            if point.row() < 0 {
                return true;
            }
            self.index(*point)
                .is_some_and(|index| !self.cells[index].is_filled())
        })
    }

    /// Writes the piece's visible cells into the board using its shape color.
    ///
    /// Cells above the visible board are discarded.
    pub fn lock(&mut self, piece: &Piece) {
        let color = piece.shape().color();
        for point in piece.cells() {
            if let Some(index) = self.index(point) {
                self.cells[index] = BoardCell::Filled(color);
            }
        }
    }

    /// Indices of rows with no empty cell, bottom row first.
    #[must_use]
    pub fn full_rows(&self) -> Vec<u32> {
        (0..self.rows)
            .rev()
            .filter(|row| self.row_is_full(*row))
            .collect()
    }

    /// Removes every full row and drops the rows above them.
    ///
    /// Each surviving row moves down by the number of cleared rows below it,
    /// keeping its columns and colors. Returns the number of cleared rows.
    pub fn clear_rows(&mut self) -> u32 {
        let width = self.columns as usize;
        if width == 0 {
            return 0;
        }

        let mut cleared = 0;
        let mut write = self.rows as usize;
        for read in (0..self.rows as usize).rev() {
            if self.row_is_full(read as u32) {
                cleared += 1;
                continue;
            }

            write -= 1;
            if write != read {
                self.cells
                    .copy_within(read * width..(read + 1) * width, write * width);
            }
        }

        self.cells[..write * width].fill(BoardCell::Empty);
        cleared
    }

    /// Reports whether a locked cell reached the top row.
    #[must_use]
    pub fn has_overflowed(&self) -> bool {
        let width = self.columns as usize;
        self.cells
            .iter()
            .take(width)
            .any(BoardCell::is_filled)
    }

    fn row_is_full(&self, row: u32) -> bool {
        let width = self.columns as usize;
        let start = row as usize * width;
        width > 0
            && self.cells[start..start + width]
                .iter()
                .all(BoardCell::is_filled)
    }

    fn index(&self, point: BoardPoint) -> Option<usize> {
        let column = u32::try_from(point.column()).ok()?;
        let row = u32::try_from(point.row()).ok()?;
        if column >= self.columns || row >= self.rows {
            return None;
        }
        let width = usize::try_from(self.columns).ok()?;
        Some(row as usize * width + column as usize)
    }
}

impl Default for Board {
    fn default() -> Self {
        Self {
            columns: DEFAULT_COLUMNS,
            rows: DEFAULT_ROWS,
            cells: vec![BoardCell::Empty; (DEFAULT_COLUMNS * DEFAULT_ROWS) as usize],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arcade_core::CellColor;
    use std::collections::BTreeSet;

    const RED: CellColor = CellColor::from_rgb(255, 0, 0);
    const BLUE: CellColor = CellColor::from_rgb(0, 0, 255);

    #[test]
    fn board_rejects_empty_and_oversized_dimensions() {
        assert!(Board::new(0, 20).is_none());
        assert!(Board::new(10, 0).is_none());
        assert!(Board::new(MAX_BOARD_DIMENSION + 1, 20).is_none());
        assert!(Board::new(10, u32::MAX).is_none());

        let largest = Board::new(MAX_BOARD_DIMENSION, MAX_BOARD_DIMENSION).expect("valid size");
        assert_eq!(
            largest.view().dimensions(),
            (MAX_BOARD_DIMENSION, MAX_BOARD_DIMENSION)
        );
    }

    #[test]
    fn default_board_is_ten_by_twenty() {
        let board = Board::default();
        assert_eq!(board.view().dimensions(), (10, 20));
        assert!(board.view().iter().all(|(_, _, cell)| !cell.is_filled()));
    }

    fn fill(board: &mut Board, column: u32, row: u32, color: CellColor) {
        let index = (row * board.columns + column) as usize;
        board.cells[index] = BoardCell::Filled(color);
    }

    fn fill_row(board: &mut Board, row: u32, color: CellColor) {
        for column in 0..board.columns() {
            fill(board, column, row, color);
        }
    }

    fn cell(board: &Board, column: u32, row: u32) -> BoardCell {
        board.view().cell(column, row).expect("cell inside board")
    }

    #[test]
    fn valid_rejects_cells_outside_board_below_top() {
        let board = Board::new(10, 20).expect("valid size");
        for shape in ShapeKind::ALL {
            for rotation in 0..shape.rotation_count() {
                let piece = Piece::new(shape, rotation, BoardPoint::new(5, 5));
                assert!(board.is_valid(&piece));

                for (columns, rows) in [(-6, 0), (5, 0), (0, 17)] {
                    let moved = piece.translated(columns, rows);
                    assert!(
                        !board.is_valid(&moved),
                        "{shape:?} rotation {rotation} escaped the board"
                    );
                }
            }
        }
    }

    #[test]
    fn valid_permits_cells_above_top_even_outside_columns() {
        let board = Board::new(10, 20).expect("valid size");
        let horizontal = Piece::new(ShapeKind::I, 1, BoardPoint::new(-4, 0));
        assert!(horizontal.cells().iter().all(|point| point.row() < 0));
        assert!(board.is_valid(&horizontal));
    }

    #[test]
    fn valid_rejects_overlap_with_filled_cells() {
        let mut board = Board::new(10, 20).expect("valid size");
        let piece = Piece::new(ShapeKind::O, 0, BoardPoint::new(5, 18));
        assert!(board.is_valid(&piece));

        fill(&mut board, 4, 19, RED);
        assert!(!board.is_valid(&piece));
    }

    #[test]
    fn rotating_full_cycle_restores_occupancy() {
        for shape in ShapeKind::ALL {
            let original = Piece::new(shape, 0, BoardPoint::new(4, 4));
            let mut rotated = original;
            for _ in 0..shape.rotation_count() {
                rotated = rotated.rotated();
            }
            let before: BTreeSet<_> = original.cells().into_iter().collect();
            let after: BTreeSet<_> = rotated.cells().into_iter().collect();
            assert_eq!(before, after, "{shape:?} did not return to its start");
            assert_eq!(rotated.rotation(), 0);
        }
    }

    #[test]
    fn spawn_centers_piece_on_top_row() {
        let piece = Piece::spawn(ShapeKind::T, 10);
        assert_eq!(piece.anchor(), BoardPoint::new(5, 0));
        assert_eq!(piece.rotation(), 0);
    }

    #[test]
    fn lock_discards_cells_above_top() {
        let mut board = Board::new(10, 20).expect("valid size");
        let piece = Piece::new(ShapeKind::I, 0, BoardPoint::new(3, 0));
        board.lock(&piece);

        let filled: Vec<_> = board
            .view()
            .iter()
            .filter(|(_, _, cell)| cell.is_filled())
            .map(|(column, row, _)| (column, row))
            .collect();
        assert_eq!(filled, vec![(3, 0), (3, 1)]);
        assert!(board.has_overflowed());
    }

    #[test]
    fn clearing_bottom_row_shifts_rows_above_by_one() {
        let mut board = Board::new(4, 20).expect("valid size");
        fill_row(&mut board, 19, RED);
        fill(&mut board, 0, 18, BLUE);
        fill(&mut board, 2, 18, RED);
        fill(&mut board, 3, 17, BLUE);

        assert_eq!(board.full_rows(), vec![19]);
        assert_eq!(board.clear_rows(), 1);

        assert_eq!(cell(&board, 0, 19), BoardCell::Filled(BLUE));
        assert_eq!(cell(&board, 1, 19), BoardCell::Empty);
        assert_eq!(cell(&board, 2, 19), BoardCell::Filled(RED));
        assert_eq!(cell(&board, 3, 18), BoardCell::Filled(BLUE));
        assert_eq!(cell(&board, 3, 17), BoardCell::Empty);
    }

    #[test]
    fn clearing_two_bottom_rows_shifts_rows_above_by_two() {
        let mut board = Board::new(10, 20).expect("valid size");
        fill_row(&mut board, 18, RED);
        fill_row(&mut board, 19, BLUE);
        fill(&mut board, 1, 17, BLUE);
        fill(&mut board, 7, 5, RED);

        assert_eq!(board.full_rows(), vec![19, 18]);
        assert_eq!(board.clear_rows(), 2);

        assert_eq!(cell(&board, 1, 19), BoardCell::Filled(BLUE));
        assert_eq!(cell(&board, 7, 7), BoardCell::Filled(RED));
        let filled = board.view().iter().filter(|(_, _, cell)| cell.is_filled()).count();
        assert_eq!(filled, 2);
    }

    #[test]
    fn clearing_non_adjacent_rows_shifts_each_row_by_rows_cleared_below() {
        let mut board = Board::new(4, 20).expect("valid size");
        fill_row(&mut board, 19, RED);
        fill(&mut board, 0, 18, BLUE);
        fill_row(&mut board, 17, RED);
        fill(&mut board, 2, 16, BLUE);

        assert_eq!(board.full_rows(), vec![19, 17]);
        assert_eq!(board.clear_rows(), 2);

        assert_eq!(cell(&board, 0, 19), BoardCell::Filled(BLUE));
        assert_eq!(cell(&board, 2, 18), BoardCell::Filled(BLUE));
        let filled = board.view().iter().filter(|(_, _, cell)| cell.is_filled()).count();
        assert_eq!(filled, 2);
    }

    #[test]
    fn clear_rows_without_full_rows_is_a_no_op() {
        let mut board = Board::new(4, 4).expect("valid size");
        fill(&mut board, 1, 3, RED);
        assert_eq!(board.clear_rows(), 0);
        assert_eq!(cell(&board, 1, 3), BoardCell::Filled(RED));
    }
}
