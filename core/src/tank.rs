//! Message surface and value types for the tank chase game.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{CellCoord, Direction};

/// Default maze: `W` wall, `.` pellet, space empty, `P` player start, `E`
/// pursuer spawn point.
pub const DEFAULT_LEVEL: [&str; 20] = [
    "WWWWWWWWWWWWWWWWWWWW",
    "WP.......WW.......EW",
    "W.WWWW.W.WW.WWWW.W.W",
    "W.WWWW.W....WWWW.W.W",
    "W..................W",
    "W.WWWW.WWW.WW.WWWW.W",
    "W......W....W......W",
    "WWWWWW.W WW W.WWWWWW",
    "     W.W WW W.W     ",
    "WWWWWW.WWWWWW.WWWWWW",
    "W..................W",
    "W.WWWW.W.WW.WWWW.W.W",
    "W....W....W.....W..W",
    "WWWW.W.WW.WW.WW.W.WW",
    "W........W.........W",
    "W.WWWWWW.W.WWWWWWW.W",
    "W..................W",
    "W.WWW.WWWWWWWW.WWW.W",
    "WE................EW",
    "WWWWWWWWWWWWWWWWWWWW",
];

/// Commands that express all permissible tank world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Replaces the terrain with the provided layout and removes every entity.
    ConfigureLevel {
        /// Parsed level description.
        layout: LevelLayout,
    },
    /// Requests that a new actor enter the level.
    SpawnActor {
        /// Behavior assigned to the actor.
        behavior: ActorBehavior,
        /// Cell the actor should occupy.
        cell: CellCoord,
    },
    /// Replaces the heading an actor follows on subsequent ticks.
    SetHeading {
        /// Identifier of the actor being steered.
        actor: ActorId,
        /// New heading, or `None` to stand still.
        heading: Option<Direction>,
    },
    /// Requests that an actor fire a projectile along its heading.
    Fire {
        /// Identifier of the firing actor.
        actor: ActorId,
    },
    /// Advances the simulation by one fixed tick.
    Tick,
}

/// Events broadcast by the tank world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Indicates that the simulation advanced by one tick.
    TimeAdvanced {
        /// Number of ticks processed since the level was configured.
        tick: u64,
    },
    /// Confirms that an actor entered the level.
    ActorSpawned {
        /// Identifier assigned to the actor.
        actor: ActorId,
        /// Behavior assigned to the actor.
        behavior: ActorBehavior,
        /// Cell the actor occupies.
        cell: CellCoord,
    },
    /// Reports that a spawn request targeted a cell actors cannot occupy.
    SpawnRejected {
        /// Requested spawn cell.
        cell: CellCoord,
    },
    /// Confirms that an actor moved between two cells.
    ActorMoved {
        /// Identifier of the actor that moved.
        actor: ActorId,
        /// Cell occupied before the move.
        from: CellCoord,
        /// Cell occupied after the move.
        to: CellCoord,
    },
    /// Reports that an actor's tentative move was reverted.
    ActorBlocked {
        /// Identifier of the blocked actor.
        actor: ActorId,
    },
    /// Confirms that an actor fired a projectile.
    ProjectileFired {
        /// Identifier assigned to the projectile.
        projectile: ProjectileId,
        /// Actor that fired the projectile.
        owner: ActorId,
        /// Direction of travel.
        direction: Direction,
    },
    /// Reports that a fire request was ignored because the actor is cooling down.
    FireRejected {
        /// Actor whose request was ignored.
        actor: ActorId,
    },
    /// Confirms that a projectile left play.
    ProjectileExpired {
        /// Identifier of the projectile.
        projectile: ProjectileId,
        /// Reason the projectile was removed.
        fate: ProjectileFate,
    },
    /// Confirms that an actor was destroyed by a projectile.
    ActorDestroyed {
        /// Identifier of the destroyed actor.
        actor: ActorId,
        /// Behavior of the destroyed actor.
        behavior: ActorBehavior,
        /// Actor that fired the fatal projectile.
        by: ActorId,
    },
    /// Confirms that the player collected a pellet.
    PelletCollected {
        /// Cell the pellet occupied.
        cell: CellCoord,
    },
    /// The score changed.
    ScoreChanged {
        /// Score after the change.
        score: u32,
    },
}

/// Reasons a projectile leaves play.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProjectileFate {
    /// The projectile touched a wall cell.
    HitWall,
    /// The projectile travelled beyond the playfield bounds.
    LeftPlayfield,
    /// The projectile struck an opposing actor.
    HitActor,
}

/// Static contents of a terrain cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Terrain {
    /// Open floor.
    #[default]
    Empty,
    /// Impassable wall.
    Wall,
    /// Open floor holding a collectible pellet.
    Pellet,
}

/// Behavior tag that selects how an actor is steered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActorBehavior {
    /// Steered by keyboard input.
    Player,
    /// Steered toward the player by pathfinding.
    Pursuer,
}

/// Unique identifier assigned to an actor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActorId(u32);

impl ActorId {
    /// Creates a new actor identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectileId(u32);

impl ProjectileId {
    /// Creates a new projectile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Position measured in half cells.
///
/// The center of cell `(c, r)` lies at `(2c + 1, 2r + 1)`; even coordinates
/// sit on the boundary between two cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubCellPoint {
    x: i32,
    y: i32,
}

impl SubCellPoint {
    /// Creates a position from raw half-cell coordinates.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Position of the center of the provided cell.
    #[must_use]
    pub const fn center_of(cell: CellCoord) -> Self {
        Self::new(cell.column() as i32 * 2 + 1, cell.row() as i32 * 2 + 1)
    }

    /// Horizontal coordinate in half cells.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Vertical coordinate in half cells.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Position after travelling one half cell in `direction`.
    #[must_use]
    pub const fn advanced(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        Self::new(self.x + dx, self.y + dy)
    }

    /// Cell whose center coincides with this position, if any.
    #[must_use]
    pub fn centered_cell(&self) -> Option<CellCoord> {
        if self.x < 0 || self.y < 0 || self.x % 2 == 0 || self.y % 2 == 0 {
            return None;
        }
        Some(CellCoord::new((self.x / 2) as u32, (self.y / 2) as u32))
    }

    /// Signed cell indices touched by a point this small.
    ///
    /// A coordinate on a cell boundary touches the cells on both sides of it.
    pub fn touched_cells(&self) -> impl Iterator<Item = (i32, i32)> {
        let columns = axis_span(self.x);
        let rows = axis_span(self.y);
        columns
            .into_iter()
            .flatten()
            .flat_map(move |column| rows.into_iter().flatten().map(move |row| (column, row)))
    }
}

fn axis_span(value: i32) -> [Option<i32>; 2] {
    if value.rem_euclid(2) == 1 {
        [Some(value.div_euclid(2)), None]
    } else {
        let half = value.div_euclid(2);
        [Some(half - 1), Some(half)]
    }
}

/// Immutable representation of a single actor's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActorSnapshot {
    /// Unique identifier assigned to the actor.
    pub id: ActorId,
    /// Behavior tag selecting how the actor is steered.
    pub behavior: ActorBehavior,
    /// Grid cell currently occupied by the actor.
    pub cell: CellCoord,
    /// Heading followed on the next tick, `None` when idle.
    pub heading: Option<Direction>,
    /// Ticks remaining before the actor may fire again.
    pub cooldown: u32,
}

/// Read-only snapshot describing all actors within the level.
#[derive(Clone, Debug, Default)]
pub struct ActorView {
    snapshots: Vec<ActorSnapshot>,
}

impl ActorView {
    /// Creates a new actor view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<ActorSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured actor snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &ActorSnapshot> {
        self.snapshots.iter()
    }

    /// First actor tagged as the player, if one is alive.
    #[must_use]
    pub fn player(&self) -> Option<&ActorSnapshot> {
        self.snapshots
            .iter()
            .find(|snapshot| snapshot.behavior == ActorBehavior::Player)
    }
}

/// Immutable representation of a projectile in flight.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProjectileSnapshot {
    /// Identifier assigned to the projectile.
    pub id: ProjectileId,
    /// Actor that fired the projectile.
    pub owner: ActorId,
    /// Behavior of the actor that fired the projectile.
    pub owner_behavior: ActorBehavior,
    /// Current position in half cells.
    pub position: SubCellPoint,
    /// Direction of travel.
    pub direction: Direction,
}

/// Read-only view into the dense terrain grid.
#[derive(Clone, Copy, Debug)]
pub struct TerrainView<'a> {
    cells: &'a [Terrain],
    columns: u32,
    rows: u32,
}

impl<'a> TerrainView<'a> {
    /// Captures a new terrain view backed by the provided row-major slice.
    #[must_use]
    pub fn new(cells: &'a [Terrain], columns: u32, rows: u32) -> Self {
        Self {
            cells,
            columns,
            rows,
        }
    }

    /// Returns the terrain of the provided cell, if it lies inside the grid.
    #[must_use]
    pub fn terrain(&self, cell: CellCoord) -> Option<Terrain> {
        self.index(cell)
            .and_then(|index| self.cells.get(index).copied())
    }

    /// Reports whether actors may enter the cell.
    ///
    /// Cells outside the grid are never traversable.
    #[must_use]
    pub fn is_traversable(&self, cell: CellCoord) -> bool {
        matches!(
            self.terrain(cell),
            Some(Terrain::Empty) | Some(Terrain::Pellet)
        )
    }

    /// Iterator over every cell paired with its coordinate.
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, Terrain)> + 'a {
        let columns = self.columns.max(1);
        self.cells.iter().enumerate().map(move |(index, terrain)| {
            let index = index as u32;
            (CellCoord::new(index % columns, index / columns), *terrain)
        })
    }

    /// Provides the dimensions of the underlying grid as `(columns, rows)`.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() < self.columns && cell.row() < self.rows {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

/// Reasons a level layout fails to parse.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// The layout contained no rows or only empty rows.
    #[error("level layout is empty")]
    Empty,
    /// A row's width differs from the first row.
    #[error("row {row} is {found} cells wide, expected {expected}")]
    RaggedRow {
        /// Zero-based index of the offending row.
        row: usize,
        /// Width of the first row.
        expected: usize,
        /// Width of the offending row.
        found: usize,
    },
    /// The layout contained a character with no terrain meaning.
    #[error("unknown glyph {glyph:?} at column {column}, row {row}")]
    UnknownGlyph {
        /// Offending character.
        glyph: char,
        /// Zero-based column of the character.
        column: usize,
        /// Zero-based row of the character.
        row: usize,
    },
    /// No `P` marker was present.
    #[error("level layout has no player start")]
    MissingPlayerStart,
    /// More than one `P` marker was present.
    #[error("level layout has more than one player start")]
    DuplicatePlayerStart,
    /// No `E` marker was present.
    #[error("level layout has no pursuer spawn points")]
    MissingSpawnPoints,
}

/// Terrain grid plus actor placement markers parsed from text rows.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelLayout {
    columns: u32,
    rows: u32,
    terrain: Vec<Terrain>,
    player_start: CellCoord,
    spawn_points: Vec<CellCoord>,
}

impl LevelLayout {
    /// Parses a layout from text rows.
    ///
    /// `W` marks a wall, `.` a pellet, a space open floor, `P` the player
    /// start and `E` a pursuer spawn point. Marker cells are open floor.
    pub fn parse<S>(lines: &[S]) -> Result<Self, LayoutError>
    where
        S: AsRef<str>,
    {
        let rows: Vec<Vec<char>> = lines
            .iter()
            .map(|line| line.as_ref().chars().collect())
            .collect();
        let Some(expected) = rows.first().map(Vec::len) else {
            return Err(LayoutError::Empty);
        };
        if expected == 0 {
            return Err(LayoutError::Empty);
        }

        let mut terrain = Vec::with_capacity(expected * rows.len());
        let mut player_start = None;
        let mut spawn_points = Vec::new();

        for (row_index, row) in rows.iter().enumerate() {
            if row.len() != expected {
                return Err(LayoutError::RaggedRow {
                    row: row_index,
                    expected,
                    found: row.len(),
                });
            }

            for (column_index, glyph) in row.iter().copied().enumerate() {
                let cell = CellCoord::new(column_index as u32, row_index as u32);
                let cell_terrain = match glyph {
                    'W' => Terrain::Wall,
                    '.' => Terrain::Pellet,
                    ' ' => Terrain::Empty,
                    'P' => {
                        if player_start.replace(cell).is_some() {
                            return Err(LayoutError::DuplicatePlayerStart);
                        }
                        Terrain::Empty
                    }
                    'E' => {
                        spawn_points.push(cell);
                        Terrain::Empty
                    }
                    _ => {
                        return Err(LayoutError::UnknownGlyph {
                            glyph,
                            column: column_index,
                            row: row_index,
                        })
                    }
                };
                terrain.push(cell_terrain);
            }
        }

        let player_start = player_start.ok_or(LayoutError::MissingPlayerStart)?;
        if spawn_points.is_empty() {
            return Err(LayoutError::MissingSpawnPoints);
        }

        Ok(Self {
            columns: expected as u32,
            rows: rows.len() as u32,
            terrain,
            player_start,
            spawn_points,
        })
    }

    /// Number of columns in the level.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows in the level.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Dense row-major terrain cells.
    #[must_use]
    pub fn terrain(&self) -> &[Terrain] {
        &self.terrain
    }

    /// Cell the player starts in.
    #[must_use]
    pub const fn player_start(&self) -> CellCoord {
        self.player_start
    }

    /// Cells pursuers may spawn in.
    #[must_use]
    pub fn spawn_points(&self) -> &[CellCoord] {
        &self.spawn_points
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_level_parses() {
        let layout = LevelLayout::parse(&DEFAULT_LEVEL).expect("default level is valid");

        assert_eq!(layout.columns(), 20);
        assert_eq!(layout.rows(), 20);
        assert_eq!(layout.player_start(), CellCoord::new(1, 1));
        assert_eq!(layout.spawn_points().len(), 3);
        let view = TerrainView::new(layout.terrain(), layout.columns(), layout.rows());
        assert_eq!(view.terrain(CellCoord::new(0, 0)), Some(Terrain::Wall));
        assert_eq!(view.terrain(CellCoord::new(2, 1)), Some(Terrain::Pellet));
        assert_eq!(view.terrain(CellCoord::new(1, 1)), Some(Terrain::Empty));
    }

    #[test]
    fn parse_rejects_ragged_rows() {
        let error = LevelLayout::parse(&["WPW", "WE"]).expect_err("ragged layout");
        assert_eq!(
            error,
            LayoutError::RaggedRow {
                row: 1,
                expected: 3,
                found: 2
            }
        );
    }

    #[test]
    fn parse_rejects_unknown_glyphs() {
        let error = LevelLayout::parse(&["WPEx"]).expect_err("unknown glyph");
        assert!(matches!(
            error,
            LayoutError::UnknownGlyph { glyph: 'x', column: 3, row: 0 }
        ));
    }

    #[test]
    fn parse_requires_exactly_one_player_start() {
        assert_eq!(
            LevelLayout::parse(&["W.E"]),
            Err(LayoutError::MissingPlayerStart)
        );
        assert_eq!(
            LevelLayout::parse(&["PPE"]),
            Err(LayoutError::DuplicatePlayerStart)
        );
        assert_eq!(
            LevelLayout::parse(&["WP."]),
            Err(LayoutError::MissingSpawnPoints)
        );
        let empty: [&str; 0] = [];
        assert_eq!(LevelLayout::parse(&empty), Err(LayoutError::Empty));
    }

    #[test]
    fn traversable_excludes_walls_and_outside() {
        let layout = LevelLayout::parse(&["WP.", "E W"]).expect("valid layout");
        let view = TerrainView::new(layout.terrain(), layout.columns(), layout.rows());

        assert!(!view.is_traversable(CellCoord::new(0, 0)));
        assert!(view.is_traversable(CellCoord::new(1, 0)));
        assert!(view.is_traversable(CellCoord::new(2, 0)));
        assert!(view.is_traversable(CellCoord::new(1, 1)));
        assert!(!view.is_traversable(CellCoord::new(3, 0)));
        assert!(!view.is_traversable(CellCoord::new(0, 2)));
    }

    #[test]
    fn sub_cell_points_track_centers_and_boundaries() {
        let center = SubCellPoint::center_of(CellCoord::new(2, 3));
        assert_eq!((center.x(), center.y()), (5, 7));
        assert_eq!(center.centered_cell(), Some(CellCoord::new(2, 3)));
        assert_eq!(center.touched_cells().collect::<Vec<_>>(), vec![(2, 3)]);

        let boundary = center.advanced(Direction::East);
        assert_eq!(boundary.centered_cell(), None);
        assert_eq!(
            boundary.touched_cells().collect::<Vec<_>>(),
            vec![(2, 3), (3, 3)]
        );

        let outside = SubCellPoint::new(0, 1);
        assert_eq!(
            outside.touched_cells().collect::<Vec<_>>(),
            vec![(-1, 0), (0, 0)]
        );
    }
}
