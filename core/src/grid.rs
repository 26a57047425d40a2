//! Character grid model parsed from a level's textual pattern.

use std::collections::BTreeSet;

use crate::{CellCoord, CellKind, LevelError};

/// Ordered rows of cell kinds describing a cave layout.
///
/// Rows may have unequal lengths. Every lookup outside a row's extent, or
/// outside the row count, yields [`CellKind::Wall`] so neighbour checks never
/// need to special-case the grid edge.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Grid {
    rows: Vec<Vec<CellKind>>,
}

impl Grid {
    /// Parses a pattern block into a grid.
    ///
    /// At most one leading line break and one trailing boundary line are
    /// stripped (see [`split_pattern_boundary`]); every other line, including
    /// blank ones and leading or trailing spaces, becomes a row of cells.
    #[must_use]
    pub fn parse(pattern: &str) -> Self {
        let (_, body, _) = split_pattern_boundary(pattern);
        if body.is_empty() {
            return Self::default();
        }

        let rows = body
            .split('\n')
            .map(|line| {
                line.strip_suffix('\r')
                    .unwrap_or(line)
                    .chars()
                    .map(CellKind::from_symbol)
                    .collect()
            })
            .collect();

        Self { rows }
    }

    /// Builds a grid from pre-decoded rows.
    #[must_use]
    pub fn from_rows(rows: Vec<Vec<CellKind>>) -> Self {
        Self { rows }
    }

    /// Renders the grid back into pattern text, rows separated by `\n`.
    #[must_use]
    pub fn render(&self) -> String {
        self.render_with("\n")
    }

    /// Renders the grid with rows separated by `line_break`.
    #[must_use]
    pub fn render_with(&self, line_break: &str) -> String {
        self.rows
            .iter()
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join(line_break)
    }

    /// Number of rows contained in the grid.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Reports whether the grid has no rows at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cells of the requested row, if it exists.
    #[must_use]
    pub fn row(&self, row: usize) -> Option<&[CellKind]> {
        self.rows.get(row).map(Vec::as_slice)
    }

    /// Length of every row, in order. Two grids share a shape when these match.
    #[must_use]
    pub fn shape(&self) -> Vec<usize> {
        self.rows.iter().map(Vec::len).collect()
    }

    /// Boundary-safe lookup that treats anything out of range as a wall.
    #[must_use]
    pub fn cell_at(&self, column: i64, row: i64) -> CellKind {
        let (Ok(column), Ok(row)) = (usize::try_from(column), usize::try_from(row)) else {
            return CellKind::Wall;
        };

        self.rows
            .get(row)
            .and_then(|cells| cells.get(column))
            .copied()
            .unwrap_or(CellKind::Wall)
    }

    /// Cell stored at the coordinate, or `None` when it lies outside the grid.
    #[must_use]
    pub fn get(&self, coord: CellCoord) -> Option<CellKind> {
        let row = usize::try_from(coord.row()).ok()?;
        let column = usize::try_from(coord.column()).ok()?;
        self.rows.get(row)?.get(column).copied()
    }

    /// Overwrites the cell at the coordinate, returning the previous kind.
    ///
    /// Coordinates outside the grid leave it untouched and return `None`.
    pub fn set(&mut self, coord: CellCoord, kind: CellKind) -> Option<CellKind> {
        let row = usize::try_from(coord.row()).ok()?;
        let column = usize::try_from(coord.column()).ok()?;
        let cell = self.rows.get_mut(row)?.get_mut(column)?;
        Some(std::mem::replace(cell, kind))
    }

    /// Iterates every cell in row-major order, left to right, top to bottom.
    pub fn cells(&self) -> impl Iterator<Item = (CellCoord, CellKind)> + '_ {
        self.rows.iter().enumerate().flat_map(|(row, cells)| {
            cells.iter().enumerate().filter_map(move |(column, &kind)| {
                let coord = CellCoord::new(u32::try_from(column).ok()?, u32::try_from(row).ok()?);
                Some((coord, kind))
            })
        })
    }

    /// Number of cells of the requested kind.
    #[must_use]
    pub fn count_of(&self, kind: CellKind) -> usize {
        self.cells().filter(|&(_, cell)| cell == kind).count()
    }

    /// Number of diamond cells in the grid.
    #[must_use]
    pub fn diamond_count(&self) -> usize {
        self.count_of(CellKind::Diamond)
    }

    /// Locates the unique player spawn.
    pub fn spawn(&self) -> Result<CellCoord, LevelError> {
        let mut spawns = self
            .cells()
            .filter(|&(_, cell)| cell == CellKind::Player)
            .map(|(coord, _)| coord);

        let first = spawns.next().ok_or(LevelError::MissingSpawn)?;
        match spawns.next() {
            Some(second) => Err(LevelError::DuplicateSpawn { first, second }),
            None => Ok(first),
        }
    }

    /// Distinct symbols that do not map to a known cell kind.
    #[must_use]
    pub fn unknown_symbols(&self) -> BTreeSet<char> {
        self.cells()
            .filter_map(|(_, cell)| match cell {
                CellKind::Unknown(symbol) => Some(symbol),
                _ => None,
            })
            .collect()
    }
}

/// Splits a raw pattern block into `(leading, body, trailing)` slices.
///
/// `leading` is a single line break directly after the opening delimiter, if
/// present. `trailing` is the final line break together with the closing
/// line's indentation, if that last line holds only spaces or tabs. The three
/// slices concatenate back into the input.
#[must_use]
pub fn split_pattern_boundary(pattern: &str) -> (&str, &str, &str) {
    let start = if pattern.starts_with("\r\n") {
        2
    } else if pattern.starts_with('\n') {
        1
    } else {
        0
    };

    let rest = &pattern[start..];
    let mut end = rest.len();
    if let Some(newline) = rest.rfind('\n') {
        let tail = &rest[newline + 1..];
        if tail.chars().all(|symbol| symbol == ' ' || symbol == '\t') {
            end = if rest[..newline].ends_with('\r') {
                newline - 1
            } else {
                newline
            };
        }
    }

    (&pattern[..start], &rest[..end], &rest[end..])
}
