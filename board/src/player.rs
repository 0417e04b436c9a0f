//! Player roster entries and the live bomb registry entries.

use blastfield_core::{CellCoord, PlayerId, DEFAULT_BLAST_RANGE, DEFAULT_BOMB_CAPACITY};

use crate::PowerUp;

/// State tracked for a single player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Player {
    position: Option<CellCoord>,
    blast_range: u32,
    total_bombs: u32,
    bombs_available: u32,
    boxes_destroyed: u32,
}

impl Player {
    /// Creates a living player with the default loadout.
    #[must_use]
    pub const fn spawn(position: CellCoord) -> Self {
        Self {
            position: Some(position),
            blast_range: DEFAULT_BLAST_RANGE,
            total_bombs: DEFAULT_BOMB_CAPACITY,
            bombs_available: DEFAULT_BOMB_CAPACITY,
            boxes_destroyed: 0,
        }
    }

    /// Creates a player that is no longer on the board.
    #[must_use]
    pub const fn dead() -> Self {
        Self {
            position: None,
            blast_range: DEFAULT_BLAST_RANGE,
            total_bombs: DEFAULT_BOMB_CAPACITY,
            bombs_available: DEFAULT_BOMB_CAPACITY,
            boxes_destroyed: 0,
        }
    }

    /// Overrides the number of tiles the player's blasts reach beyond the bomb.
    #[must_use]
    pub const fn with_blast_range(mut self, blast_range: u32) -> Self {
        self.blast_range = blast_range;
        self
    }

    /// Overrides the player's bomb capacity.
    #[must_use]
    pub const fn with_bombs(mut self, available: u32, total: u32) -> Self {
        self.bombs_available = available;
        self.total_bombs = total;
        self
    }

    /// Overrides the cumulative number of boxes the player destroyed.
    #[must_use]
    pub const fn with_boxes_destroyed(mut self, boxes: u32) -> Self {
        self.boxes_destroyed = boxes;
        self
    }

    /// Tile the player occupies, or `None` once dead.
    #[must_use]
    pub const fn position(&self) -> Option<CellCoord> {
        self.position
    }

    /// Reports whether the player is still alive.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.position.is_some()
    }

    /// Number of tiles the player's blasts reach in each direction.
    #[must_use]
    pub const fn blast_range(&self) -> u32 {
        self.blast_range
    }

    /// Number of bombs the player owns, placed or not.
    #[must_use]
    pub const fn total_bombs(&self) -> u32 {
        self.total_bombs
    }

    /// Number of bombs the player can place right now.
    #[must_use]
    pub const fn bombs_available(&self) -> u32 {
        self.bombs_available
    }

    /// Boxes destroyed by the player's resolved explosions.
    #[must_use]
    pub const fn boxes_destroyed(&self) -> u32 {
        self.boxes_destroyed
    }

    pub(crate) fn relocate(&mut self, position: CellCoord) {
        self.position = Some(position);
    }

    pub(crate) fn kill(&mut self) {
        self.position = None;
    }

    pub(crate) fn spend_bomb(&mut self) {
        self.bombs_available = self.bombs_available.saturating_sub(1);
    }

    pub(crate) fn restore_bomb(&mut self) {
        self.bombs_available += 1;
    }

    pub(crate) fn credit_boxes(&mut self, boxes: u32) {
        self.boxes_destroyed += boxes;
    }

    pub(crate) fn collect(&mut self, item: PowerUp) {
        match item {
            PowerUp::Range => self.blast_range += 1,
            PowerUp::Count => {
                self.bombs_available += 1;
                self.total_bombs += 1;
            }
        }
    }
}

/// Live bomb awaiting its explosion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Bomb {
    owner: PlayerId,
    cell: CellCoord,
    blast_range: u32,
    fuse_turn: u32,
    explode_turn: u32,
}

impl Bomb {
    pub(crate) const fn new(
        owner: PlayerId,
        cell: CellCoord,
        blast_range: u32,
        fuse_turn: u32,
        explode_turn: u32,
    ) -> Self {
        Self {
            owner,
            cell,
            blast_range,
            fuse_turn,
            explode_turn,
        }
    }

    /// Player credited with the bomb's destruction.
    #[must_use]
    pub const fn owner(&self) -> PlayerId {
        self.owner
    }

    /// Tile the bomb sits on.
    #[must_use]
    pub const fn cell(&self) -> CellCoord {
        self.cell
    }

    /// Number of tiles the blast reaches in each direction.
    #[must_use]
    pub const fn blast_range(&self) -> u32 {
        self.blast_range
    }

    /// Absolute turn on which the bomb's own timer runs out.
    #[must_use]
    pub const fn fuse_turn(&self) -> u32 {
        self.fuse_turn
    }

    /// Absolute turn on which the bomb explodes, chain reactions included.
    #[must_use]
    pub const fn explode_turn(&self) -> u32 {
        self.explode_turn
    }
}
