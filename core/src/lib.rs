#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the arcade games.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative worlds, and pure systems. Adapters submit command values
//! describing desired mutations, each world executes those commands via its
//! `apply` entry point, and then broadcasts event values for systems to react
//! to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.
//!
//! The [`puzzle`] module carries the falling-block game's surface and the
//! [`tank`] module carries the tank chase game's surface. Value types used by
//! both live at the crate root.

use serde::{Deserialize, Serialize};

pub mod puzzle;
pub mod tank;

/// Cardinal movement directions available to pieces and actors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

impl Direction {
    /// Every direction in neighbor expansion order.
    ///
    /// Breadth-first searches expand neighbors in this order, which fixes how
    /// ties between equally short paths are broken.
    pub const CARDINALS: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    /// Unit column and row offsets produced by a single step.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::East => (1, 0),
            Self::South => (0, 1),
            Self::West => (-1, 0),
        }
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Returns the neighboring cell in `direction`, if it lies inside a grid
    /// of `columns` by `rows` cells.
    #[must_use]
    pub fn step(self, direction: Direction, columns: u32, rows: u32) -> Option<CellCoord> {
        let (column, row) = match direction {
            Direction::North => (self.column, self.row.checked_sub(1)?),
            Direction::South => (self.column, self.row.checked_add(1)?),
            Direction::East => (self.column.checked_add(1)?, self.row),
            Direction::West => (self.column.checked_sub(1)?, self.row),
        };

        if column < columns && row < rows {
            Some(CellCoord::new(column, row))
        } else {
            None
        }
    }

    /// Direction of travel between two orthogonally adjacent cells.
    ///
    /// Returns `None` when the cells are identical or not adjacent.
    #[must_use]
    pub fn direction_to(self, to: CellCoord) -> Option<Direction> {
        let column_diff = self.column().abs_diff(to.column());
        let row_diff = self.row().abs_diff(to.row());

        if column_diff + row_diff != 1 {
            return None;
        }

        if column_diff == 1 {
            if to.column() > self.column() {
                Some(Direction::East)
            } else {
                Some(Direction::West)
            }
        } else if to.row() > self.row() {
            Some(Direction::South)
        } else {
            Some(Direction::North)
        }
    }
}

/// Opaque RGB color attached to cells and entities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellColor {
    red: u8,
    green: u8,
    blue: u8,
}

impl CellColor {
    /// Creates a new color from byte RGB components.
    #[must_use]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Red component of the color.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Green component of the color.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Blue component of the color.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }
}

#[cfg(test)]
mod tests {
    use super::{CellColor, CellCoord, Direction};
    use serde::{de::DeserializeOwned, Serialize};

    #[test]
    fn step_stays_inside_grid() {
        let corner = CellCoord::new(0, 0);
        assert_eq!(corner.step(Direction::North, 3, 3), None);
        assert_eq!(corner.step(Direction::West, 3, 3), None);
        assert_eq!(
            corner.step(Direction::East, 3, 3),
            Some(CellCoord::new(1, 0))
        );

        let far = CellCoord::new(2, 2);
        assert_eq!(far.step(Direction::East, 3, 3), None);
        assert_eq!(far.step(Direction::South, 3, 3), None);
    }

    #[test]
    fn direction_to_matches_step() {
        let origin = CellCoord::new(4, 4);
        for direction in Direction::CARDINALS {
            let neighbor = origin.step(direction, 9, 9).expect("neighbor inside grid");
            assert_eq!(origin.direction_to(neighbor), Some(direction));
            let back = neighbor.direction_to(origin).expect("cells are adjacent");
            assert_eq!(neighbor.step(back, 9, 9), Some(origin));
        }
        assert_eq!(origin.direction_to(origin), None);
        assert_eq!(origin.direction_to(CellCoord::new(5, 5)), None);
    }

    #[test]
    fn cardinal_order_is_north_south_east_west() {
        assert_eq!(
            Direction::CARDINALS,
            [
                Direction::North,
                Direction::South,
                Direction::East,
                Direction::West
            ]
        );
    }

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn value_types_round_trip_through_bincode() {
        assert_round_trip(&Direction::West);
        assert_round_trip(&CellCoord::new(7, 19));
        assert_round_trip(&CellColor::from_rgb(255, 165, 0));
    }
}
