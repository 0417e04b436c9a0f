//! Reader for the line-based turn feed sent by the game referee.
//!
//! The feed opens with a `width height player` header. Every turn then lists
//! the grid rows, an entity count and one `type owner x y param1 param2` line
//! per entity, ordered by entity type: players, then bombs, then items.

use std::io::{self, BufRead};

use blastfield_board::{Board, BoardError, Player, PowerUp, Tile};
use blastfield_core::{CellCoord, Grid, PlayerId, MAX_PLAYERS};
use thiserror::Error;

const PLAYER_ENTITY: u32 = 0;
const BOMB_ENTITY: u32 = 1;
const ITEM_ENTITY: u32 = 2;

/// Errors raised while decoding the turn feed.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The underlying stream failed.
    #[error("failed to read the turn feed")]
    Io(#[from] io::Error),
    /// The feed stopped part-way through the header or a turn.
    #[error("turn feed ended in the middle of a turn")]
    UnexpectedEnd,
    /// A line did not hold the expected number of unsigned integers.
    #[error("expected {expected} numbers but found {line:?}")]
    Malformed {
        /// Offending line.
        line: String,
        /// Number of fields the line should carry.
        expected: usize,
    },
    /// The grid rows do not match the dimensions announced in the header.
    #[error("board does not match the {columns}x{rows} header")]
    Dimensions {
        /// Columns announced in the header.
        columns: u32,
        /// Rows announced in the header.
        rows: u32,
    },
    /// The grid rows could not be read as tiles.
    #[error(transparent)]
    Board(#[from] BoardError),
    /// An entity line carried an unknown type.
    #[error("unknown entity type {0}")]
    UnknownEntity(u32),
    /// An item entity carried an unknown kind.
    #[error("unknown item kind {0}")]
    UnknownItem(u32),
    /// Entities arrived out of type order.
    #[error("entity type {found} arrived after type {previous}")]
    OutOfOrder {
        /// Type of the preceding entity.
        previous: u32,
        /// Type of the offending entity.
        found: u32,
    },
    /// A player identifier lies outside the supported roster.
    #[error("player {0} is outside the supported roster")]
    UnknownPlayer(u32),
    /// An entity lies outside the grid.
    #[error("entity at ({x}, {y}) lies outside the board")]
    OffBoard {
        /// Column of the entity.
        x: u32,
        /// Row of the entity.
        y: u32,
    },
}

/// Match parameters announced once at the start of the feed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Header {
    grid: Grid,
    player: PlayerId,
}

impl Header {
    /// Dimensions of the arena.
    #[must_use]
    pub const fn grid(&self) -> Grid {
        self.grid
    }

    /// Player controlled by this agent.
    #[must_use]
    pub const fn player(&self) -> PlayerId {
        self.player
    }
}

/// Turns a line stream into one [`Board`] per turn.
///
/// The referee never reports destroyed-box totals, so the reader keeps its
/// own ledger: boxes scheduled to go on the coming turn are credited to their
/// owners when the next turn arrives.
#[derive(Debug)]
pub struct TurnReader<R> {
    lines: io::Lines<R>,
    header: Header,
    turn: u32,
    destroyed: [u32; MAX_PLAYERS],
    incoming: [u32; MAX_PLAYERS],
}

impl<R: BufRead> TurnReader<R> {
    /// Reads the header from `reader`.
    pub fn new(reader: R) -> Result<Self, ProtocolError> {
        let mut lines = reader.lines();
        let line = lines.next().ok_or(ProtocolError::UnexpectedEnd)??;
        let [columns, rows, player] = numbers::<3>(&line)?;

        Ok(Self {
            lines,
            header: Header {
                grid: Grid::new(columns, rows),
                player: player_id(player)?,
            },
            turn: 0,
            destroyed: [0; MAX_PLAYERS],
            incoming: [0; MAX_PLAYERS],
        })
    }

    /// Match parameters read from the header.
    #[must_use]
    pub const fn header(&self) -> Header {
        self.header
    }

    /// Reads the next turn, or `None` once the feed has ended cleanly.
    ///
    /// Players missing from the entity list are dead.
    pub fn next_turn(&mut self) -> Result<Option<Board>, ProtocolError> {
        let Some(first) = self.lines.next().transpose()? else {
            return Ok(None);
        };
        let grid = self.header.grid;
        let mut rows = vec![first];
        while rows.len() < grid.rows() as usize {
            rows.push(self.next_line()?);
        }

        let mut board = Board::from_rows(&rows, MAX_PLAYERS)?;
        if board.grid() != grid {
            return Err(ProtocolError::Dimensions {
                columns: grid.columns(),
                rows: grid.rows(),
            });
        }
        board.set_turn(self.turn);
        for (total, incoming) in self.destroyed.iter_mut().zip(self.incoming) {
            *total += incoming;
        }

        let [count] = numbers::<1>(&self.next_line()?)?;
        let mut previous = PLAYER_ENTITY;
        let mut players = Vec::new();
        let mut bombs = Vec::new();
        for _ in 0..count {
            let line = self.next_line()?;
            let [kind, owner, x, y, first, second] = numbers::<6>(&line)?;
            if kind < previous {
                return Err(ProtocolError::OutOfOrder {
                    previous,
                    found: kind,
                });
            }
            previous = kind;

            let cell = CellCoord::new(x, y);
            if !grid.contains(cell) {
                return Err(ProtocolError::OffBoard { x, y });
            }
            match kind {
                PLAYER_ENTITY => players.push((player_id(owner)?, cell, first, second)),
                BOMB_ENTITY => bombs.push((player_id(owner)?, cell, first, second)),
                ITEM_ENTITY => {
                    let item = match first {
                        1 => PowerUp::Range,
                        2 => PowerUp::Count,
                        other => return Err(ProtocolError::UnknownItem(other)),
                    };
                    board.set_tile(cell, Tile::PowerUp(item));
                }
                other => return Err(ProtocolError::UnknownEntity(other)),
            }
        }

        for &(id, cell, available, reach) in &players {
            let placed = bombs.iter().filter(|bomb| bomb.0 == id).count();
            let total = available.saturating_add(u32::try_from(placed).unwrap_or(u32::MAX));
            let player = Player::spawn(cell)
                .with_blast_range(reach.saturating_sub(1))
                .with_bombs(available, total)
                .with_boxes_destroyed(self.destroyed[id.index()]);
            board.set_player(id, player);
        }
        for &(owner, cell, timer, reach) in &bombs {
            board.schedule_bomb(owner, cell, timer as usize, reach.saturating_sub(1));
        }

        for id in board.player_ids() {
            self.incoming[id.index()] = board.pending_boxes(id, 0);
        }
        self.turn += 1;
        tracing::trace!(turn = board.turn(), entities = count, "turn read");

        Ok(Some(board))
    }

    fn next_line(&mut self) -> Result<String, ProtocolError> {
        Ok(self.lines.next().ok_or(ProtocolError::UnexpectedEnd)??)
    }
}

fn player_id(value: u32) -> Result<PlayerId, ProtocolError> {
    u8::try_from(value)
        .ok()
        .filter(|&id| usize::from(id) < MAX_PLAYERS)
        .map(PlayerId::new)
        .ok_or(ProtocolError::UnknownPlayer(value))
}

fn numbers<const N: usize>(line: &str) -> Result<[u32; N], ProtocolError> {
    let malformed = || ProtocolError::Malformed {
        line: line.to_owned(),
        expected: N,
    };
    let mut values = [0; N];
    let mut fields = line.split_whitespace();
    for value in &mut values {
        *value = fields
            .next()
            .and_then(|field| field.parse().ok())
            .ok_or_else(malformed)?;
    }
    if fields.next().is_some() {
        return Err(malformed());
    }
    Ok(values)
}
