//! Conversion between boards and their row-per-line symbol layout.

use std::fmt;

use blastfield_core::{CellCoord, Grid};
use thiserror::Error;

use crate::{Board, Tile};

/// Errors raised while reading a board from tile symbols.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BoardError {
    /// No rows, or rows without tiles, were supplied.
    #[error("board layout is empty")]
    Empty,
    /// A row does not match the width of the first row.
    #[error("row {row} holds {found} tiles but {expected} were expected")]
    RaggedRow {
        /// Zero-based index of the offending row.
        row: usize,
        /// Width established by the first row.
        expected: usize,
        /// Width of the offending row.
        found: usize,
    },
    /// A symbol does not name any tile.
    #[error("unknown tile symbol {symbol:?} at column {column}, row {row}")]
    UnknownSymbol {
        /// Offending character.
        symbol: char,
        /// Zero-based column of the symbol.
        column: usize,
        /// Zero-based row of the symbol.
        row: usize,
    },
    /// The layout exceeds the addressable grid size.
    #[error("board layout of {columns}x{rows} tiles is too large")]
    TooLarge {
        /// Number of columns in the layout.
        columns: usize,
        /// Number of rows in the layout.
        rows: usize,
    },
}

impl Board {
    /// Builds a board from one string of tile symbols per row.
    ///
    /// Players start out dead; spawn them with [`Board::set_player`].
    pub fn from_rows<S: AsRef<str>>(rows: &[S], player_count: usize) -> Result<Self, BoardError> {
        let expected = rows
            .first()
            .map(|row| row.as_ref().trim_end().chars().count())
            .ok_or(BoardError::Empty)?;
        if expected == 0 {
            return Err(BoardError::Empty);
        }

        let too_large = || BoardError::TooLarge {
            columns: expected,
            rows: rows.len(),
        };
        let columns = u32::try_from(expected).map_err(|_| too_large())?;
        let height = u32::try_from(rows.len()).map_err(|_| too_large())?;
        let mut board = Board::new(Grid::new(columns, height), player_count);

        for (row_index, row) in rows.iter().enumerate() {
            let row = row.as_ref().trim_end();
            let found = row.chars().count();
            if found != expected {
                return Err(BoardError::RaggedRow {
                    row: row_index,
                    expected,
                    found,
                });
            }

            for (column_index, symbol) in row.chars().enumerate() {
                let tile = Tile::from_symbol(symbol).ok_or(BoardError::UnknownSymbol {
                    symbol,
                    column: column_index,
                    row: row_index,
                })?;
                let cell = CellCoord::new(
                    u32::try_from(column_index).map_err(|_| too_large())?,
                    u32::try_from(row_index).map_err(|_| too_large())?,
                );
                board.set_tile(cell, tile);
            }
        }

        Ok(board)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let columns = self.grid().columns().max(1) as usize;
        for row in self.tiles().chunks(columns) {
            for tile in row {
                write!(f, "{}", tile.symbol())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
