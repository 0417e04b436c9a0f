//! Rendering of decisions as referee commands.

use std::fmt;

use blastfield_board::Board;
use blastfield_core::{Action, CellCoord, PlayerId};

/// One line of output: an optional bomb drop plus the tile to head for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Command {
    bomb: bool,
    target: CellCoord,
}

impl Command {
    /// Translates `action` for `player` into the tile it leads to.
    ///
    /// A step that would leave the grid targets the player's own tile, and a
    /// dead player targets the origin.
    #[must_use]
    pub fn for_action(board: &Board, player: PlayerId, action: Action) -> Self {
        let position = board.player(player).position().unwrap_or(CellCoord::new(0, 0));
        let target = board
            .grid()
            .neighbor(position, action.direction)
            .unwrap_or(position);

        Self {
            bomb: action.bomb,
            target,
        }
    }

    /// Tile the player heads for.
    #[must_use]
    pub const fn target(&self) -> CellCoord {
        self.target
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = if self.bomb { "BOMB" } else { "MOVE" };
        write!(f, "{verb} {} {}", self.target.column(), self.target.row())
    }
}
