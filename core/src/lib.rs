#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the cave audit engine.
//!
//! This crate defines the value types that connect the level-source adapter,
//! the analysis systems, and the command-line surface. Adapters parse level
//! definitions into [`LevelRecord`] values, systems inspect the contained
//! [`Grid`] through read-only queries, and the redistribution system produces
//! replacement grids that adapters persist.

mod grid;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use grid::{split_pattern_boundary, Grid};

/// Offsets of the four orthogonal neighbours, ordered north, east, south, west.
pub const ORTHOGONAL_OFFSETS: [(i64, i64); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];

/// Offsets of the eight cells surrounding a centre cell, in row-major order.
pub const SURROUNDING_OFFSETS: [(i64, i64); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

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

    /// Returns the coordinate displaced by the provided offset, if it stays non-negative.
    #[must_use]
    pub fn offset(self, dx: i64, dy: i64) -> Option<Self> {
        let column = u32::try_from(i64::from(self.column).checked_add(dx)?).ok()?;
        let row = u32::try_from(i64::from(self.row).checked_add(dy)?).ok()?;
        Some(Self::new(column, row))
    }
}

impl std::fmt::Display for CellCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.column, self.row)
    }
}

/// Enemy variants that patrol a cave.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EnemyKind {
    /// Firefly, encoded as `F`.
    Firefly,
    /// Butterfly, encoded as `B`.
    Butterfly,
}

/// Special blocking markers that are neither plain walls nor walkable terrain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpecialKind {
    /// Magic wall, encoded as `M`.
    MagicWall,
    /// Growing amoeba, encoded as `A`.
    Amoeba,
    /// Falling boulder, encoded as `O`.
    Boulder,
    /// Destructible brick wall, encoded as `#`.
    Brick,
}

/// Kind of content occupying a single cave cell.
///
/// Exactly one symbol encodes one kind. Symbols outside the known table are
/// kept as [`CellKind::Unknown`] so that rewritten grids round-trip, while
/// traversal and wall-density checks treat them as walls.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CellKind {
    /// Indestructible wall (`W`). Also returned for out-of-range lookups.
    Wall,
    /// Diggable dirt (`.`).
    Dirt,
    /// Open space (` `).
    Empty,
    /// Collectible diamond (`*`).
    Diamond,
    /// Player spawn (`P`).
    Player,
    /// Level exit (`E`).
    Exit,
    /// Patrolling enemy.
    Enemy(EnemyKind),
    /// Blocking special marker.
    Special(SpecialKind),
    /// Unrecognised symbol, preserved verbatim.
    Unknown(char),
}

impl CellKind {
    /// Decodes a pattern symbol into its cell kind.
    #[must_use]
    pub const fn from_symbol(symbol: char) -> Self {
        match symbol {
            'W' => Self::Wall,
            '.' => Self::Dirt,
            ' ' => Self::Empty,
            '*' => Self::Diamond,
            'P' => Self::Player,
            'E' => Self::Exit,
            'F' => Self::Enemy(EnemyKind::Firefly),
            'B' => Self::Enemy(EnemyKind::Butterfly),
            'M' => Self::Special(SpecialKind::MagicWall),
            'A' => Self::Special(SpecialKind::Amoeba),
            'O' => Self::Special(SpecialKind::Boulder),
            '#' => Self::Special(SpecialKind::Brick),
            other => Self::Unknown(other),
        }
    }

    /// Encodes the cell kind back into its pattern symbol.
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::Wall => 'W',
            Self::Dirt => '.',
            Self::Empty => ' ',
            Self::Diamond => '*',
            Self::Player => 'P',
            Self::Exit => 'E',
            Self::Enemy(EnemyKind::Firefly) => 'F',
            Self::Enemy(EnemyKind::Butterfly) => 'B',
            Self::Special(SpecialKind::MagicWall) => 'M',
            Self::Special(SpecialKind::Amoeba) => 'A',
            Self::Special(SpecialKind::Boulder) => 'O',
            Self::Special(SpecialKind::Brick) => '#',
            Self::Unknown(symbol) => symbol,
        }
    }

    /// Reports whether the player can occupy or pass through the cell.
    #[must_use]
    pub const fn is_walkable(self) -> bool {
        matches!(
            self,
            Self::Empty | Self::Dirt | Self::Diamond | Self::Exit | Self::Enemy(_) | Self::Player
        )
    }

    /// Reports whether wall-density checks should count the cell as a wall.
    #[must_use]
    pub const fn is_wall_like(self) -> bool {
        matches!(self, Self::Wall | Self::Unknown(_))
    }

    /// Reports whether the cell may receive a redistributed diamond.
    #[must_use]
    pub const fn is_open_ground(self) -> bool {
        matches!(self, Self::Empty | Self::Dirt)
    }
}

/// Integrity failures that make a level impossible to analyse.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LevelError {
    /// The grid does not contain a player spawn cell.
    #[error("level has no player spawn")]
    MissingSpawn,
    /// The grid contains more than one player spawn cell.
    #[error("level has more than one player spawn: {first} and {second}")]
    DuplicateSpawn {
        /// First spawn encountered in row-major order.
        first: CellCoord,
        /// Second spawn encountered in row-major order.
        second: CellCoord,
    },
}

/// One playable cave together with its metadata.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LevelRecord {
    name: String,
    time_limit: u32,
    diamonds_required: u32,
    enemies: u32,
    grid: Grid,
}

impl LevelRecord {
    /// Creates a level record from parsed metadata and grid.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        time_limit: u32,
        diamonds_required: u32,
        enemies: u32,
        grid: Grid,
    ) -> Self {
        Self {
            name: name.into(),
            time_limit,
            diamonds_required,
            enemies,
            grid,
        }
    }

    /// Identifier of the level, unique within a level set.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Time limit granted to the player, in seconds.
    #[must_use]
    pub const fn time_limit(&self) -> u32 {
        self.time_limit
    }

    /// Number of diamonds the player must collect to open the exit.
    #[must_use]
    pub const fn diamonds_required(&self) -> u32 {
        self.diamonds_required
    }

    /// Number of enemies declared by the level definition.
    #[must_use]
    pub const fn enemies(&self) -> u32 {
        self.enemies
    }

    /// Cave layout of the level.
    #[must_use]
    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Returns a copy of the record carrying the provided grid instead.
    #[must_use]
    pub fn with_grid(&self, grid: Grid) -> Self {
        Self {
            grid,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbols_round_trip_through_cell_kinds() {
        for symbol in "W. *PEFBMAO#?x".chars() {
            assert_eq!(CellKind::from_symbol(symbol).symbol(), symbol);
        }
    }

    #[test]
    fn unknown_symbols_block_like_walls() {
        let unknown = CellKind::from_symbol('?');
        assert_eq!(unknown, CellKind::Unknown('?'));
        assert!(!unknown.is_walkable());
        assert!(unknown.is_wall_like());
        assert!(!unknown.is_open_ground());
    }

    #[test]
    fn enemies_are_walkable_but_specials_are_not() {
        assert!(CellKind::from_symbol('F').is_walkable());
        assert!(CellKind::from_symbol('B').is_walkable());
        assert!(!CellKind::from_symbol('M').is_walkable());
        assert!(!CellKind::from_symbol('#').is_walkable());
        assert!(!CellKind::from_symbol('M').is_wall_like());
    }

    #[test]
    fn offset_rejects_negative_coordinates() {
        let origin = CellCoord::new(0, 3);
        assert_eq!(origin.offset(-1, 0), None);
        assert_eq!(origin.offset(1, -1), Some(CellCoord::new(1, 2)));
    }

    #[test]
    fn level_errors_serialize_with_kind_tag() {
        let json = serde_json::to_string(&LevelError::MissingSpawn).expect("serializes");
        assert_eq!(json, r#"{"kind":"missing_spawn"}"#);
    }

    #[test]
    fn with_grid_preserves_metadata() {
        let record = LevelRecord::new("INTRO", 150, 12, 0, Grid::parse("WPW"));
        let updated = record.with_grid(Grid::parse("W*P"));
        assert_eq!(updated.name(), "INTRO");
        assert_eq!(updated.time_limit(), 150);
        assert_eq!(updated.diamonds_required(), 12);
        assert_eq!(updated.grid().render(), "W*P");
    }
}
