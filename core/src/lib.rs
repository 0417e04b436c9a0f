#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core vocabulary shared across the Blastfield agent.
//!
//! This crate defines the grid geometry, the action vocabulary and the game
//! constants that the board simulation and every search system agree on. It
//! holds no mutable state: the [`Grid`] is an immutable configuration value
//! that is passed explicitly to whichever component needs coordinates.

use serde::{Deserialize, Serialize};

/// Number of turns between placing a bomb and its explosion.
pub const BOMB_TIMEOUT: usize = 8;

/// Maximum number of players that can take part in a match.
pub const MAX_PLAYERS: usize = 4;

/// Blast range a freshly spawned player starts with, excluding the bomb tile.
pub const DEFAULT_BLAST_RANGE: u32 = 2;

/// Bomb capacity a freshly spawned player starts with.
pub const DEFAULT_BOMB_CAPACITY: u32 = 1;

/// Upper bound on simultaneously live bombs across all players.
#[must_use]
pub const fn max_bomb_count(player_count: usize) -> usize {
    player_count * (BOMB_TIMEOUT - 1)
}

/// Location of a single grid tile expressed as column and row coordinates.
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

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }
}

/// Movement choices available to a player each turn.
///
/// The declaration order is significant: it is the order in which blast rays
/// are propagated and in which the lookahead evaluator enumerates moves.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward increasing column indices.
    Right,
    /// Movement toward increasing row indices.
    Down,
    /// Movement toward decreasing column indices.
    Left,
    /// Movement toward decreasing row indices.
    Up,
    /// Remain on the current tile.
    #[default]
    Stay,
}

impl Direction {
    /// Every direction in declaration order.
    pub const ALL: [Direction; 5] = [
        Direction::Right,
        Direction::Down,
        Direction::Left,
        Direction::Up,
        Direction::Stay,
    ];

    /// The four orthogonal directions a blast travels along.
    pub const CARDINAL: [Direction; 4] = [
        Direction::Right,
        Direction::Down,
        Direction::Left,
        Direction::Up,
    ];

    /// Exploration order for survival queries: staying put comes first.
    pub const STAY_FIRST: [Direction; 5] = [
        Direction::Stay,
        Direction::Up,
        Direction::Left,
        Direction::Down,
        Direction::Right,
    ];

    /// Column and row delta applied by a single step in this direction.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Direction::Right => (1, 0),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Up => (0, -1),
            Direction::Stay => (0, 0),
        }
    }
}

/// Unique identifier assigned to a player, doubling as its roster index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(u8);

impl PlayerId {
    /// Creates a new player identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }

    /// Roster index addressed by the identifier.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }
}

/// A single turn decision: where to step and whether to drop a bomb first.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Action {
    /// Direction of the step taken after the optional bomb placement.
    pub direction: Direction,
    /// Whether a bomb is placed on the current tile before moving.
    pub bomb: bool,
}

impl Action {
    /// Creates an action from its parts.
    #[must_use]
    pub const fn new(direction: Direction, bomb: bool) -> Self {
        Self { direction, bomb }
    }

    /// Action that keeps the player in place without placing a bomb.
    #[must_use]
    pub const fn stay() -> Self {
        Self::new(Direction::Stay, false)
    }
}

/// Fixed-horizon sequence of actions, one per future turn.
pub type Solution = Vec<Action>;

/// Dimensions of the rectangular play field.
///
/// Tiles are addressed in row-major order, so the dense index of a cell is
/// `row * columns + column`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Grid {
    columns: u32,
    rows: u32,
}

impl Grid {
    /// Arena size used by the reference game.
    pub const STANDARD: Grid = Grid::new(13, 11);

    /// Creates a grid with the provided dimensions.
    #[must_use]
    pub const fn new(columns: u32, rows: u32) -> Self {
        Self { columns, rows }
    }

    /// Number of tile columns.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of tile rows.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Total number of tiles on the grid.
    #[must_use]
    pub const fn tile_count(&self) -> usize {
        self.columns as usize * self.rows as usize
    }

    /// Reports whether the cell lies on the grid.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column < self.columns && cell.row < self.rows
    }

    /// Dense index of the cell, if it lies on the grid.
    #[must_use]
    pub fn index(&self, cell: CellCoord) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }

        let column = usize::try_from(cell.column()).ok()?;
        let row = usize::try_from(cell.row()).ok()?;
        let columns = usize::try_from(self.columns).ok()?;
        row.checked_mul(columns)?.checked_add(column)
    }

    /// Cell addressed by a dense index previously produced by [`Grid::index`].
    #[must_use]
    pub fn cell(&self, index: usize) -> CellCoord {
        let columns = self.columns.max(1) as usize;
        let column = u32::try_from(index % columns).unwrap_or(u32::MAX);
        let row = u32::try_from(index / columns).unwrap_or(u32::MAX);
        CellCoord::new(column, row)
    }

    /// Cell reached by moving `steps` tiles from `cell` in `direction`.
    #[must_use]
    pub fn offset(&self, cell: CellCoord, direction: Direction, steps: u32) -> Option<CellCoord> {
        let (dx, dy) = direction.delta();
        let steps = i64::from(steps);
        let column = i64::from(cell.column()) + i64::from(dx) * steps;
        let row = i64::from(cell.row()) + i64::from(dy) * steps;
        let column = u32::try_from(column).ok()?;
        let row = u32::try_from(row).ok()?;
        let target = CellCoord::new(column, row);
        self.contains(target).then_some(target)
    }

    /// Adjacent cell in `direction`; staying returns the cell itself.
    #[must_use]
    pub fn neighbor(&self, cell: CellCoord, direction: Direction) -> Option<CellCoord> {
        self.offset(cell, direction, 1)
    }

    /// Dense index reached by moving `steps` tiles from `index` in `direction`.
    #[must_use]
    pub fn offset_index(&self, index: usize, direction: Direction, steps: u32) -> Option<usize> {
        self.offset(self.cell(index), direction, steps)
            .and_then(|cell| self.index(cell))
    }

    /// Orthogonal on-grid neighbours of `cell`.
    pub fn neighbors(&self, cell: CellCoord) -> impl Iterator<Item = CellCoord> + '_ {
        Direction::CARDINAL
            .into_iter()
            .filter_map(move |direction| self.neighbor(cell, direction))
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::STANDARD
    }
}
