#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative board simulation for the Blastfield agent.
//!
//! The [`Board`] owns the tile grid, the player roster, the live bomb
//! registry and the explosion timeline. Every mutation rule of the game lives
//! here: bomb placement with chain-reaction scheduling, movement and power-up
//! pickup, and the turn advance that resolves explosions. Boards are plain
//! values; search systems clone them freely to explore hypothetical futures.

mod player;
pub mod query;
mod reachability;
mod text;
mod tile;
mod timeline;

use blastfield_core::{
    max_bomb_count, Action, CellCoord, Direction, Grid, PlayerId, BOMB_TIMEOUT, MAX_PLAYERS,
};

pub use player::{Bomb, Player};
pub use text::BoardError;
pub use tile::{BoxKind, PowerUp, Tile};

use timeline::ExplosionTimeline;

/// Complete game state for one turn, including every scheduled explosion.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Board {
    grid: Grid,
    turn: u32,
    tiles: Vec<Tile>,
    unsafe_tiles: Vec<bool>,
    timeline: ExplosionTimeline,
    players: Vec<Player>,
    alive_count: usize,
    bombs: Vec<Bomb>,
}

impl Board {
    /// Creates an empty board whose players have not spawned yet.
    #[must_use]
    pub fn new(grid: Grid, player_count: usize) -> Self {
        let player_count = player_count.min(MAX_PLAYERS);
        let tile_count = grid.tile_count();

        Self {
            grid,
            turn: 0,
            tiles: vec![Tile::Empty; tile_count],
            unsafe_tiles: vec![false; tile_count],
            timeline: ExplosionTimeline::new(tile_count),
            players: vec![Player::dead(); player_count],
            alive_count: 0,
            bombs: Vec::with_capacity(max_bomb_count(player_count)),
        }
    }

    /// Grid dimensions the board was built with.
    #[must_use]
    pub const fn grid(&self) -> Grid {
        self.grid
    }

    /// Absolute turn the board currently represents.
    #[must_use]
    pub const fn turn(&self) -> u32 {
        self.turn
    }

    /// Sets the absolute turn counter.
    ///
    /// Bomb explosion turns are absolute, so the counter must be set before
    /// any bomb is scheduled.
    pub fn set_turn(&mut self, turn: u32) {
        self.turn = turn;
    }

    /// Contents of the tile at `cell`, or `None` when it lies off the grid.
    #[must_use]
    pub fn tile(&self, cell: CellCoord) -> Option<Tile> {
        self.grid.index(cell).map(|index| self.tiles[index])
    }

    /// Replaces the contents of the tile at `cell`.
    pub fn set_tile(&mut self, cell: CellCoord, tile: Tile) {
        if let Some(index) = self.grid.index(cell) {
            self.tiles[index] = tile;
        }
    }

    /// Every tile in row-major order.
    #[must_use]
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Number of players the match started with.
    #[must_use]
    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Number of players still alive.
    #[must_use]
    pub const fn alive_count(&self) -> usize {
        self.alive_count
    }

    /// State of the player identified by `id`.
    ///
    /// # Panics
    ///
    /// Panics when `id` does not address a player of this board.
    #[must_use]
    pub fn player(&self, id: PlayerId) -> &Player {
        &self.players[id.index()]
    }

    /// Every player in roster order.
    #[must_use]
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Identifiers of every player in roster order.
    pub fn player_ids(&self) -> impl Iterator<Item = PlayerId> {
        (0..self.players.len()).filter_map(|index| u8::try_from(index).ok().map(PlayerId::new))
    }

    /// Replaces the roster entry for `id`.
    pub fn set_player(&mut self, id: PlayerId, player: Player) {
        if let Some(slot) = self.players.get_mut(id.index()) {
            *slot = player;
            self.alive_count = self.players.iter().filter(|p| p.is_alive()).count();
        }
    }

    /// Moves a player to `cell` without applying any pickup rules.
    pub fn relocate_player(&mut self, id: PlayerId, cell: CellCoord) {
        if let Some(slot) = self.players.get_mut(id.index()) {
            slot.relocate(cell);
            self.alive_count = self.players.iter().filter(|p| p.is_alive()).count();
        }
    }

    /// Live bombs, ordered by ascending explosion turn after every turn advance.
    #[must_use]
    pub fn bombs(&self) -> &[Bomb] {
        &self.bombs
    }

    /// Reports whether the power-up at `cell` may vanish in a same-turn blast.
    #[must_use]
    pub fn is_unsafe(&self, cell: CellCoord) -> bool {
        self.grid
            .index(cell)
            .is_some_and(|index| self.unsafe_tiles[index])
    }

    /// Turns until `cell` next explodes, counting the coming turn as one.
    #[must_use]
    pub fn earliest_explosion(&self, cell: CellCoord) -> Option<u32> {
        let index = self.grid.index(cell)?;
        self.timeline
            .window(index)
            .earliest()
            .and_then(|offset| u32::try_from(offset + 1).ok())
    }

    /// Reports whether `cell` explodes `offset + 1` turns from now.
    #[must_use]
    pub fn is_scheduled(&self, cell: CellCoord, offset: usize) -> bool {
        self.grid
            .index(cell)
            .is_some_and(|index| self.timeline.window(index).contains(offset))
    }

    /// Boxes `player` is scheduled to destroy `offset + 1` turns from now.
    #[must_use]
    pub fn pending_boxes(&self, player: PlayerId, offset: usize) -> u32 {
        u32::from(self.timeline.tally(offset, player))
    }

    /// Boxes `player` is scheduled to destroy across the whole timeline.
    #[must_use]
    pub fn pending_box_total(&self, player: PlayerId) -> u32 {
        (0..BOMB_TIMEOUT)
            .map(|offset| self.pending_boxes(player, offset))
            .sum()
    }

    /// Reports whether `player` may take a step in `direction` this turn.
    ///
    /// The destination must be on the grid and free. Staying put is also
    /// allowed while standing on a bomb.
    #[must_use]
    pub fn can_move(&self, player: PlayerId, direction: Direction) -> bool {
        let Some(position) = self.players.get(player.index()).and_then(Player::position) else {
            return false;
        };
        let Some(target) = self.grid.neighbor(position, direction) else {
            return false;
        };
        let Some(tile) = self.tile(target) else {
            return false;
        };

        tile.is_free() || (tile == Tile::Bomb && direction == Direction::Stay)
    }

    /// Steps `player` in `direction`, collecting any power-up found there.
    ///
    /// Callers are expected to have checked [`Board::can_move`] first.
    pub fn move_player(&mut self, player: PlayerId, direction: Direction) {
        let Some(position) = self.players.get(player.index()).and_then(Player::position) else {
            return;
        };
        let Some(target) = self.grid.neighbor(position, direction) else {
            return;
        };
        let Some(index) = self.grid.index(target) else {
            return;
        };

        self.players[player.index()].relocate(target);

        let Tile::PowerUp(item) = self.tiles[index] else {
            return;
        };

        self.players[player.index()].collect(item);
        self.tiles[index] = Tile::Empty;
        self.unsafe_tiles[index] = false;

        if let Some(earliest) = self.timeline.window(index).earliest() {
            self.rebuild_from(earliest);
        }
    }

    /// Places a bomb under `player` if it has one available.
    pub fn place_bomb(&mut self, player: PlayerId) {
        let Some(&owner) = self.players.get(player.index()) else {
            return;
        };
        let Some(position) = owner.position() else {
            return;
        };
        if owner.bombs_available() == 0 {
            return;
        }

        self.players[player.index()].spend_bomb();
        self.schedule_bomb(player, position, BOMB_TIMEOUT, owner.blast_range());
    }

    /// Reports whether `player` can drop a bomb where it stands.
    #[must_use]
    pub fn can_place_bomb(&self, player: PlayerId) -> bool {
        let Some(state) = self.players.get(player.index()) else {
            return false;
        };
        state.bombs_available() > 0
            && state
                .position()
                .and_then(|cell| self.tile(cell))
                .is_some_and(|tile| tile != Tile::Bomb)
    }

    /// Plays a full turn decision for `player` when the step is legal.
    ///
    /// The bomb, if requested, is placed before stepping. Returns `false` and
    /// leaves the board untouched when the step is not allowed.
    pub fn apply_action(&mut self, player: PlayerId, action: Action) -> bool {
        if !self.can_move(player, action.direction) {
            return false;
        }
        if action.bomb {
            self.place_bomb(player);
        }
        self.move_player(player, action.direction);
        true
    }

    /// Schedules a bomb owned by `owner` without touching its capacity.
    ///
    /// `timeout` counts the turns until the explosion; the bomb goes off
    /// sooner when another blast already reaches `cell`.
    pub fn schedule_bomb(&mut self, owner: PlayerId, cell: CellCoord, timeout: usize, blast_range: u32) {
        if let Some(index) = self.grid.index(cell) {
            self.schedule_at(owner, index, timeout, blast_range);
        }
    }

    /// Advances the simulation by `turns` turns.
    ///
    /// # Panics
    ///
    /// Panics when a bomb is still registered after its explosion turn, which
    /// means the explosion schedule was corrupted.
    pub fn step_forward(&mut self, turns: u32) {
        self.bombs.sort_by_key(Bomb::explode_turn);

        for _ in 0..turns {
            for tile in &mut self.tiles {
                *tile = tile.settled();
            }

            self.turn += 1;

            let detonated = self
                .bombs
                .partition_point(|bomb| bomb.explode_turn() <= self.turn);
            for bomb in self.bombs.drain(..detonated) {
                assert!(
                    bomb.explode_turn() == self.turn,
                    "bomb at {:?} was due on turn {} but is still pending on turn {}",
                    bomb.cell(),
                    bomb.explode_turn(),
                    self.turn
                );
                if let Some(owner) = self.players.get_mut(bomb.owner().index()) {
                    owner.restore_bomb();
                }
            }

            for (index, player) in self.players.iter_mut().enumerate() {
                let Ok(id) = u8::try_from(index) else {
                    continue;
                };
                player.credit_boxes(u32::from(self.timeline.tally(0, PlayerId::new(id))));
            }

            for index in 0..self.tiles.len() {
                if self.timeline.window(index).contains(0) {
                    self.explode(index);
                }
            }

            self.timeline.advance();
        }
    }

    fn schedule_at(&mut self, owner: PlayerId, at: usize, timeout: usize, blast_range: u32) {
        let last = timeout.clamp(1, BOMB_TIMEOUT) - 1;
        let earliest = self.timeline.window(at).earliest();
        let offset = earliest.map_or(last, |earliest| earliest.min(last));
        let swept = self.tiles[at] != Tile::Bomb && earliest == Some(offset);
        let fuse_turn = self.turn + u32::try_from(last).unwrap_or(0) + 1;
        let explode_turn = self.turn + u32::try_from(offset).unwrap_or(0) + 1;

        self.bombs.push(Bomb::new(
            owner,
            self.grid.cell(at),
            blast_range,
            fuse_turn,
            explode_turn,
        ));
        self.timeline.schedule(offset, at);
        self.tiles[at] = Tile::Bomb;

        if swept {
            // Blasts that already crossed this tile at `offset` now stop on the bomb.
            self.rebuild_from(offset);
            return;
        }

        for direction in Direction::CARDINAL {
            for step in 1..=blast_range {
                let Some(target) = self.grid.offset_index(at, direction, step) else {
                    break;
                };
                let tile = self.tiles[target];
                if tile == Tile::Wall {
                    break;
                }

                let window = self.timeline.window(target);
                if window.latest().unwrap_or(0) <= offset {
                    self.timeline.schedule(offset, target);
                    if tile == Tile::Empty {
                        continue;
                    }

                    let earlier = window.count();
                    let cleared_before = match window.latest() {
                        Some(latest) if latest == offset => earlier - 1,
                        _ => earlier,
                    };
                    if tile.is_box() && earlier == 0 {
                        self.timeline.credit(offset, owner);
                    }
                    if tile.is_power_up() && cleared_before == 0 {
                        self.unsafe_tiles[target] = true;
                    }
                    if cleared_before == 0 {
                        break;
                    }
                } else {
                    let earliest = window.earliest().unwrap_or(0);
                    let gone_already = earliest != 0
                        && earliest < offset
                        && (tile.is_plain_box() || tile.is_power_up() || tile == Tile::Bomb);
                    if tile == Tile::Empty || gone_already {
                        self.timeline.schedule(offset, target);
                    } else {
                        // The later explosion assumed this obstruction survives until then.
                        self.rebuild_from(offset);
                        return;
                    }
                }
            }
        }
    }

    fn rebuild_from(&mut self, offset: usize) {
        self.timeline.clear_from(offset);
        self.bombs.sort_by_key(Bomb::explode_turn);

        let threshold = self.turn + u32::try_from(offset).unwrap_or(0) + 1;
        let keep = self
            .bombs
            .partition_point(|bomb| bomb.explode_turn() < threshold);
        let replay = self.bombs.split_off(keep);

        for bomb in replay {
            let Some(index) = self.grid.index(bomb.cell()) else {
                continue;
            };
            let timeout = bomb.fuse_turn().saturating_sub(self.turn) as usize;
            self.schedule_at(bomb.owner(), index, timeout, bomb.blast_range());
        }
    }

    fn explode(&mut self, index: usize) {
        match self.tiles[index] {
            Tile::Box(kind) => self.tiles[index] = Tile::DestroyedBox(kind),
            _ => {
                let cell = self.grid.cell(index);
                for player in &mut self.players {
                    if player.position() == Some(cell) {
                        player.kill();
                        self.alive_count = self.alive_count.saturating_sub(1);
                    }
                }
                self.tiles[index] = Tile::Empty;
            }
        }
        self.unsafe_tiles[index] = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const P0: PlayerId = PlayerId::new(0);
    const P1: PlayerId = PlayerId::new(1);

    fn board(rows: &[&str]) -> Board {
        let mut board = Board::from_rows(rows, 2).expect("valid board");
        board.set_player(P0, Player::spawn(CellCoord::new(0, 0)));
        board.set_player(P1, Player::spawn(CellCoord::new(12, 10)));
        board
    }

    fn open_board() -> Board {
        board(&["............."; 11])
    }

    fn scheduled_cells(board: &Board) -> Vec<CellCoord> {
        (0..board.grid().tile_count())
            .map(|index| board.grid().cell(index))
            .filter(|&cell| board.earliest_explosion(cell).is_some())
            .collect()
    }

    #[test]
    fn corner_bomb_reaches_along_both_open_axes() {
        let mut board = open_board();
        board.schedule_bomb(P0, CellCoord::new(12, 0), 1, 3);

        let mut expected = vec![
            CellCoord::new(12, 0),
            CellCoord::new(11, 0),
            CellCoord::new(10, 0),
            CellCoord::new(9, 0),
            CellCoord::new(12, 1),
            CellCoord::new(12, 2),
            CellCoord::new(12, 3),
        ];
        expected.sort_by_key(|cell| (cell.row(), cell.column()));

        assert_eq!(scheduled_cells(&board), expected);
        for cell in expected {
            assert_eq!(board.earliest_explosion(cell), Some(1));
        }
    }

    #[test]
    fn edge_bomb_covers_three_rays() {
        let mut board = open_board();
        board.schedule_bomb(P0, CellCoord::new(12, 5), 1, 3);

        assert_eq!(scheduled_cells(&board).len(), 10);
        assert_eq!(board.earliest_explosion(CellCoord::new(12, 2)), Some(1));
        assert_eq!(board.earliest_explosion(CellCoord::new(12, 8)), Some(1));
        assert_eq!(board.earliest_explosion(CellCoord::new(9, 5)), Some(1));
        assert_eq!(board.earliest_explosion(CellCoord::new(12, 1)), None);
        assert_eq!(board.earliest_explosion(CellCoord::new(8, 5)), None);
    }

    #[test]
    fn walls_stop_the_blast() {
        let mut rows = ["............."; 11];
        rows[0] = "..X..........";
        let mut board = board(&rows);
        board.schedule_bomb(P0, CellCoord::new(0, 0), 8, 4);

        assert_eq!(board.earliest_explosion(CellCoord::new(1, 0)), Some(8));
        assert_eq!(board.earliest_explosion(CellCoord::new(2, 0)), None);
        assert_eq!(board.earliest_explosion(CellCoord::new(3, 0)), None);
        assert_eq!(board.earliest_explosion(CellCoord::new(0, 4)), Some(8));
    }

    #[test]
    fn explosions_destroy_boxes_and_players_but_not_walls() {
        let mut board = board(&[
            "...000.......",
            "X0.01X.......",
            "0X0..........",
            ".............",
            ".............",
            ".............",
            ".............",
            ".............",
            ".............",
            ".............",
            ".............",
        ]);
        board.set_player(
            P0,
            Player::spawn(CellCoord::new(0, 0))
                .with_blast_range(3)
                .with_bombs(2, 2),
        );

        board.place_bomb(P0);
        board.relocate_player(P0, CellCoord::new(2, 0));
        board.place_bomb(P0);
        assert_eq!(board.player(P0).bombs_available(), 0);

        board.step_forward(BOMB_TIMEOUT as u32);

        assert_eq!(board.player(P0).boxes_destroyed(), 2);
        assert!(!board.player(P0).is_alive());
        assert_eq!(board.alive_count(), 1);
        assert_eq!(board.tile(CellCoord::new(0, 1)), Some(Tile::Wall));
        assert_eq!(board.tile(CellCoord::new(4, 0)), Some(Tile::Box(BoxKind::Plain)));
        assert_eq!(
            board.tile(CellCoord::new(3, 0)),
            Some(Tile::DestroyedBox(BoxKind::Plain))
        );
        assert!(board.bombs().is_empty());
    }

    #[test]
    fn power_up_in_blast_is_marked_unsafe_and_absorbs_it() {
        let mut board = board(&[
            "X.X..........",
            "X.X..........",
            "X.X..........",
            "X.X..........",
            ".............",
            ".............",
            ".............",
            ".............",
            ".............",
            ".............",
            ".............",
        ]);
        board.set_tile(CellCoord::new(1, 2), Tile::PowerUp(PowerUp::Count));
        board.schedule_bomb(P0, CellCoord::new(1, 0), 1, 3);
        board.relocate_player(P0, CellCoord::new(1, 3));

        assert!(board.is_unsafe(CellCoord::new(1, 2)));
        assert_eq!(board.earliest_explosion(CellCoord::new(1, 3)), None);

        board.step_forward(1);

        assert!(board.player(P0).is_alive());
        assert_eq!(board.tile(CellCoord::new(1, 2)), Some(Tile::Empty));
        assert!(!board.is_unsafe(CellCoord::new(1, 2)));
    }

    #[test]
    fn power_up_behind_a_box_is_shielded() {
        let mut rows = ["............."; 11];
        rows[0] = ".0c..........";
        let mut board = board(&rows);
        board.schedule_bomb(P1, CellCoord::new(0, 0), 8, 3);

        assert_eq!(board.earliest_explosion(CellCoord::new(1, 0)), Some(8));
        assert_eq!(board.earliest_explosion(CellCoord::new(2, 0)), None);
        assert_eq!(board.pending_boxes(P1, 7), 1);
    }

    #[test]
    fn later_blast_passes_a_box_already_destroyed_earlier() {
        let mut rows = ["............."; 11];
        rows[0] = ".0c..........";
        let mut board = board(&rows);
        board.schedule_bomb(P1, CellCoord::new(1, 2), 3, 2);
        board.schedule_bomb(P0, CellCoord::new(0, 0), 8, 3);

        assert_eq!(board.earliest_explosion(CellCoord::new(1, 0)), Some(3));
        assert!(board.is_scheduled(CellCoord::new(1, 0), 7));
        assert_eq!(board.earliest_explosion(CellCoord::new(2, 0)), Some(8));
        assert!(board.is_unsafe(CellCoord::new(2, 0)));
        assert_eq!(board.pending_boxes(P1, 2), 1);
        assert_eq!(board.pending_box_total(P0), 0);
    }

    #[test]
    fn earlier_bomb_pulls_a_later_one_forward() {
        let mut rows = ["............."; 11];
        rows[0] = "....0........";
        let mut rebuilt = board(&rows);
        rebuilt.schedule_bomb(P1, CellCoord::new(2, 0), 8, 2);
        assert_eq!(rebuilt.pending_boxes(P1, 7), 1);

        rebuilt.schedule_bomb(P0, CellCoord::new(2, 3), 3, 3);

        assert_eq!(rebuilt.earliest_explosion(CellCoord::new(4, 0)), Some(3));
        assert_eq!(rebuilt.pending_boxes(P1, 2), 1);
        assert_eq!(rebuilt.pending_boxes(P1, 7), 0);
        assert!(rebuilt.bombs().iter().all(|bomb| bomb.explode_turn() == 3));

        let mut scratch = board(&rows);
        scratch.schedule_bomb(P0, CellCoord::new(2, 3), 3, 3);
        scratch.schedule_bomb(P1, CellCoord::new(2, 0), 8, 2);

        assert_eq!(rebuilt, scratch);
    }

    #[test]
    fn bomb_dropped_in_a_blast_path_stops_that_blast() {
        let arena = Board::from_rows(&["....0"], 2).expect("valid board");
        let near = |board: &mut Board| board.schedule_bomb(P0, CellCoord::new(0, 0), 2, 4);
        let far = |board: &mut Board| board.schedule_bomb(P1, CellCoord::new(1, 0), 5, 1);

        let mut near_first = arena.clone();
        near(&mut near_first);
        assert_eq!(near_first.pending_boxes(P0, 1), 1);
        far(&mut near_first);

        let mut far_first = arena;
        far(&mut far_first);
        near(&mut far_first);

        assert_eq!(near_first, far_first);
        assert_eq!(near_first.earliest_explosion(CellCoord::new(4, 0)), None);
        assert_eq!(near_first.earliest_explosion(CellCoord::new(2, 0)), Some(2));
        assert_eq!(near_first.earliest_explosion(CellCoord::new(3, 0)), None);
        assert_eq!(near_first.pending_box_total(P0), 0);
        assert!(near_first.bombs().iter().all(|bomb| bomb.explode_turn() == 2));
        assert_eq!(near_first.bombs()[1].fuse_turn(), 5);
    }

    #[test]
    fn bomb_gone_before_a_crossing_blast_lets_it_through() {
        let mut board = Board::from_rows(&["....0"], 2).expect("valid board");
        board.schedule_bomb(P0, CellCoord::new(0, 0), 4, 4);
        board.schedule_bomb(P1, CellCoord::new(2, 0), 2, 1);

        assert_eq!(board.earliest_explosion(CellCoord::new(2, 0)), Some(2));
        assert!(board.is_scheduled(CellCoord::new(2, 0), 3));
        assert_eq!(board.earliest_explosion(CellCoord::new(0, 0)), Some(4));
        assert_eq!(board.pending_boxes(P0, 3), 1);
        assert!(board
            .bombs()
            .iter()
            .all(|bomb| bomb.fuse_turn() == bomb.explode_turn()));
    }

    #[test]
    fn capacity_and_credit_land_on_the_turn_of_the_explosion() {
        let mut rows = ["............."; 11];
        rows[0] = ".0...........";
        let mut board = board(&rows);
        board.place_bomb(P0);

        board.step_forward(BOMB_TIMEOUT as u32 - 1);
        assert_eq!(board.player(P0).bombs_available(), 0);
        assert_eq!(board.player(P0).boxes_destroyed(), 0);
        assert!(board.player(P0).is_alive());

        board.step_forward(1);
        assert_eq!(board.player(P0).bombs_available(), 1);
        assert_eq!(board.player(P0).boxes_destroyed(), 1);
        assert!(!board.player(P0).is_alive());
    }

    #[test]
    fn destroyed_box_reveals_its_item_one_turn_later() {
        let mut rows = ["............."; 11];
        rows[0] = "..1..........";
        let mut board = board(&rows);
        board.schedule_bomb(P1, CellCoord::new(4, 0), 1, 2);

        board.step_forward(1);
        assert_eq!(
            board.tile(CellCoord::new(2, 0)),
            Some(Tile::DestroyedBox(BoxKind::Item(PowerUp::Range)))
        );

        board.step_forward(1);
        assert_eq!(
            board.tile(CellCoord::new(2, 0)),
            Some(Tile::PowerUp(PowerUp::Range))
        );
    }

    #[test]
    fn picking_up_a_shielding_item_extends_the_blast() {
        let mut rows = ["............."; 11];
        rows[0] = ".c...........";
        let mut board = board(&rows);
        board.schedule_bomb(P1, CellCoord::new(3, 0), 8, 3);
        assert!(board.is_unsafe(CellCoord::new(1, 0)));
        assert_eq!(board.earliest_explosion(CellCoord::new(0, 0)), None);

        assert!(board.can_move(P0, Direction::Right));
        board.move_player(P0, Direction::Right);

        let player = board.player(P0);
        assert_eq!(player.position(), Some(CellCoord::new(1, 0)));
        assert_eq!(player.bombs_available(), 2);
        assert_eq!(player.total_bombs(), 2);
        assert_eq!(board.tile(CellCoord::new(1, 0)), Some(Tile::Empty));
        assert!(!board.is_unsafe(CellCoord::new(1, 0)));
        assert_eq!(board.earliest_explosion(CellCoord::new(0, 0)), Some(8));
        assert_eq!(board.bombs().len(), 1);
    }

    #[test]
    fn range_item_extends_blast_range() {
        let mut rows = ["............."; 11];
        rows[1] = "r............";
        let mut board = board(&rows);

        board.move_player(P0, Direction::Down);

        assert_eq!(board.player(P0).blast_range(), 3);
        assert_eq!(board.player(P0).bombs_available(), 1);
    }

    #[test]
    fn staying_on_a_bomb_is_the_only_way_onto_it() {
        let mut board = open_board();
        board.place_bomb(P0);

        assert!(board.can_move(P0, Direction::Stay));
        assert!(board.can_move(P0, Direction::Right));
        assert!(!board.can_move(P0, Direction::Left));
        assert!(!board.can_move(P0, Direction::Up));

        board.move_player(P0, Direction::Right);
        assert!(!board.can_move(P0, Direction::Left));
    }

    #[test]
    fn apply_action_bombs_before_stepping() {
        let mut board = open_board();

        assert!(board.apply_action(P0, Action::new(Direction::Down, true)));
        assert_eq!(board.tile(CellCoord::new(0, 0)), Some(Tile::Bomb));
        assert_eq!(board.player(P0).position(), Some(CellCoord::new(0, 1)));

        assert!(!board.can_place_bomb(P0));
        assert!(!board.apply_action(P0, Action::new(Direction::Up, true)));
        assert_eq!(board.player(P0).position(), Some(CellCoord::new(0, 1)));
        assert_eq!(board.bombs().len(), 1);
    }

    #[test]
    fn empty_handed_players_cannot_place_bombs() {
        let mut board = open_board();
        board.set_player(P0, Player::spawn(CellCoord::new(0, 0)).with_bombs(0, 1));

        board.place_bomb(P0);

        assert!(board.bombs().is_empty());
        assert_eq!(board.tile(CellCoord::new(0, 0)), Some(Tile::Empty));
    }

    #[test]
    #[should_panic(expected = "still pending")]
    fn stale_bombs_abort_the_turn_advance() {
        let mut board = open_board();
        board.place_bomb(P0);
        board.set_turn(20);

        board.step_forward(1);
    }
}
