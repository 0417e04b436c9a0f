//! Tile contents and their textual symbols.

/// Item carried by a box or lying on the floor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PowerUp {
    /// Extends the blast range of the collecting player by one tile.
    Range,
    /// Grants the collecting player one additional bomb.
    Count,
}

/// Contents of a destructible box.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BoxKind {
    /// Box that leaves an empty floor once destroyed.
    Plain,
    /// Box that reveals a power-up once destroyed.
    Item(PowerUp),
}

/// Contents of a single grid tile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Tile {
    /// Walkable floor.
    #[default]
    Empty,
    /// Indestructible obstacle that stops blasts.
    Wall,
    /// Destructible box.
    Box(BoxKind),
    /// Box destroyed during the current turn.
    ///
    /// The placeholder keeps the tile impassable for one turn and resolves
    /// into floor or a power-up at the start of the next turn advance.
    DestroyedBox(BoxKind),
    /// Tile holding a live bomb.
    Bomb,
    /// Collectible item.
    PowerUp(PowerUp),
}

impl Tile {
    /// Parses the single-character symbol used by the game feed.
    #[must_use]
    pub const fn from_symbol(symbol: char) -> Option<Self> {
        let tile = match symbol {
            '.' => Tile::Empty,
            'X' => Tile::Wall,
            '0' => Tile::Box(BoxKind::Plain),
            '1' => Tile::Box(BoxKind::Item(PowerUp::Range)),
            '2' => Tile::Box(BoxKind::Item(PowerUp::Count)),
            '3' => Tile::DestroyedBox(BoxKind::Plain),
            '4' => Tile::DestroyedBox(BoxKind::Item(PowerUp::Range)),
            '5' => Tile::DestroyedBox(BoxKind::Item(PowerUp::Count)),
            'B' => Tile::Bomb,
            'r' => Tile::PowerUp(PowerUp::Range),
            'c' => Tile::PowerUp(PowerUp::Count),
            _ => return None,
        };
        Some(tile)
    }

    /// Symbol rendered for the tile.
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Tile::Empty => '.',
            Tile::Wall => 'X',
            Tile::Box(BoxKind::Plain) => '0',
            Tile::Box(BoxKind::Item(PowerUp::Range)) => '1',
            Tile::Box(BoxKind::Item(PowerUp::Count)) => '2',
            Tile::DestroyedBox(BoxKind::Plain) => '3',
            Tile::DestroyedBox(BoxKind::Item(PowerUp::Range)) => '4',
            Tile::DestroyedBox(BoxKind::Item(PowerUp::Count)) => '5',
            Tile::Bomb => 'B',
            Tile::PowerUp(PowerUp::Range) => 'r',
            Tile::PowerUp(PowerUp::Count) => 'c',
        }
    }

    /// Reports whether a player may step onto the tile.
    #[must_use]
    pub const fn is_free(self) -> bool {
        matches!(self, Tile::Empty | Tile::PowerUp(_))
    }

    /// Reports whether the tile holds an intact box.
    #[must_use]
    pub const fn is_box(self) -> bool {
        matches!(self, Tile::Box(_))
    }

    /// Reports whether the tile holds a box without an item.
    #[must_use]
    pub const fn is_plain_box(self) -> bool {
        matches!(self, Tile::Box(BoxKind::Plain))
    }

    /// Reports whether the tile holds a destroyed-box placeholder.
    #[must_use]
    pub const fn is_destroyed_box(self) -> bool {
        matches!(self, Tile::DestroyedBox(_))
    }

    /// Reports whether the tile holds a collectible power-up.
    #[must_use]
    pub const fn is_power_up(self) -> bool {
        matches!(self, Tile::PowerUp(_))
    }

    /// Terminal state a destroyed-box placeholder resolves into.
    #[must_use]
    pub(crate) const fn settled(self) -> Self {
        match self {
            Tile::DestroyedBox(BoxKind::Plain) => Tile::Empty,
            Tile::DestroyedBox(BoxKind::Item(item)) => Tile::PowerUp(item),
            other => other,
        }
    }
}
