//! Survival analysis over the scheduled explosions.

use blastfield_core::{CellCoord, Direction, PlayerId};

use crate::{Board, Player, Tile};

/// Visited flags for one survival query, one layer per search depth.
struct DepthArena {
    tile_count: usize,
    visited: Vec<bool>,
}

impl DepthArena {
    fn new(depths: usize, tile_count: usize) -> Self {
        Self {
            tile_count,
            visited: vec![false; depths * tile_count],
        }
    }

    fn slot(&self, depth: usize, tile: usize) -> usize {
        (depth - 1) * self.tile_count + tile
    }

    /// Marks `tile` as entered at `depth`, reporting whether it was new.
    fn enter(&mut self, depth: usize, tile: usize) -> bool {
        let slot = self.slot(depth, tile);
        match self.visited.get_mut(slot) {
            Some(seen) if !*seen => {
                *seen = true;
                true
            }
            _ => false,
        }
    }
}

impl Board {
    /// Deepest turn, capped at `horizon`, that `player` can provably live to.
    ///
    /// The search walks every sequence of moves while treating the current
    /// explosion schedule as fixed. Dead players survive zero turns.
    #[must_use]
    pub fn survival_turns(&self, player: PlayerId, horizon: usize) -> usize {
        if horizon == 0 {
            return 0;
        }
        let Some(position) = self.players.get(player.index()).and_then(Player::position) else {
            return 0;
        };
        let Some(start) = self.grid.index(position) else {
            return 0;
        };

        let mut arena = DepthArena::new(horizon, self.tiles.len());
        self.explore(start, horizon, 1, &mut arena)
    }

    /// Reports whether a player arriving on `cell` via `direction` is still
    /// standing `turns_in_future` turns from now.
    #[must_use]
    pub fn will_be_free(&self, cell: CellCoord, turns_in_future: usize, direction: Direction) -> bool {
        self.grid
            .index(cell)
            .is_some_and(|index| self.will_be_free_at(index, turns_in_future, direction))
    }

    fn explore(&self, tile: usize, horizon: usize, depth: usize, arena: &mut DepthArena) -> usize {
        if depth >= horizon {
            return depth;
        }

        let mut deepest = depth;
        for direction in Direction::STAY_FIRST {
            let Some(next) = self.grid.offset_index(tile, direction, 1) else {
                continue;
            };
            if self.tiles[next] == Tile::Wall {
                continue;
            }
            if !self.will_be_free_at(next, depth, direction) {
                continue;
            }
            if !arena.enter(depth, next) {
                continue;
            }

            deepest = deepest.max(self.explore(next, horizon, depth + 1, arena));
            if deepest == horizon {
                return horizon;
            }
        }
        deepest
    }

    fn will_be_free_at(&self, index: usize, turns_in_future: usize, direction: Direction) -> bool {
        let tile = self.tiles[index];
        let window = self.timeline.window(index);
        let exploding = turns_in_future
            .checked_sub(1)
            .is_some_and(|offset| window.contains(offset));
        let flagged = self.unsafe_tiles[index];

        if tile.is_free() && !exploding && !flagged {
            return true;
        }
        if tile == Tile::Bomb && direction == Direction::Stay && !exploding {
            return true;
        }

        // Boxes stay solid for an extra turn after the blast that destroys them.
        let until = if tile.is_box() {
            turns_in_future.saturating_sub(2)
        } else {
            turns_in_future.saturating_sub(1)
        };
        let cleared_before = window.count_before(until) > 0;

        (tile.is_destroyed_box() && !exploding)
            || (tile.is_box() && cleared_before && !exploding && !flagged)
    }
}

#[cfg(test)]
mod tests {
    use blastfield_core::BOMB_TIMEOUT;

    use super::*;
    use crate::BoxKind;

    const P0: PlayerId = PlayerId::new(0);
    const P1: PlayerId = PlayerId::new(1);

    fn corridor_board() -> Board {
        let mut board = Board::from_rows(
            &[
                "0............",
                ".X.X.........",
                "10.1.........",
                ".X.X.........",
                "0..1.........",
                ".X.X.........",
                "0..1.........",
                ".X.X.........",
                ".X.X.........",
                ".X.X.........",
                "..X..........",
            ],
            2,
        )
        .expect("valid board");
        board.set_player(P0, Player::spawn(CellCoord::new(2, 6)));
        board.set_player(P1, Player::spawn(CellCoord::new(12, 10)));
        board
    }

    #[test]
    fn open_corridor_survives_the_full_horizon() {
        let mut board = corridor_board();
        board.schedule_bomb(P0, CellCoord::new(1, 6), 3, 3);
        board.step_forward(1);

        assert_eq!(board.survival_turns(P0, BOMB_TIMEOUT), BOMB_TIMEOUT);
    }

    #[test]
    fn boxed_in_player_dies_with_the_blast() {
        let mut board = corridor_board();
        board.schedule_bomb(P0, CellCoord::new(1, 6), 3, 3);
        board.step_forward(1);
        board.set_tile(CellCoord::new(2, 5), Tile::Box(BoxKind::Plain));
        board.set_tile(CellCoord::new(2, 7), Tile::Box(BoxKind::Plain));

        assert_eq!(board.survival_turns(P0, BOMB_TIMEOUT), 2);
    }

    #[test]
    fn survival_never_exceeds_the_horizon_and_grows_with_it() {
        let mut board = corridor_board();
        board.schedule_bomb(P0, CellCoord::new(1, 6), 3, 3);
        board.step_forward(1);
        board.set_tile(CellCoord::new(2, 5), Tile::Box(BoxKind::Plain));
        board.set_tile(CellCoord::new(2, 7), Tile::Box(BoxKind::Plain));

        let mut previous = 0;
        for horizon in 0..=BOMB_TIMEOUT + 2 {
            let turns = board.survival_turns(P0, horizon);
            assert!(turns <= horizon);
            assert!(turns >= previous);
            previous = turns;
        }
    }

    #[test]
    fn dead_end_with_own_bomb_lasts_until_it_goes_off() {
        let mut board = Board::from_rows(&["X.X", "X.X", "XXX"], 1).expect("valid board");
        board.set_player(P0, Player::spawn(CellCoord::new(1, 1)));
        board.place_bomb(P0);

        assert!(board.can_move(P0, Direction::Stay));
        assert_eq!(board.survival_turns(P0, BOMB_TIMEOUT), BOMB_TIMEOUT);
        assert_eq!(board.survival_turns(P0, BOMB_TIMEOUT + 2), BOMB_TIMEOUT);
    }

    #[test]
    fn dead_players_do_not_survive() {
        let mut board = corridor_board();
        board.set_player(P0, Player::dead());

        assert_eq!(board.survival_turns(P0, BOMB_TIMEOUT), 0);
    }

    #[test]
    fn boxes_become_passable_a_turn_after_their_blast() {
        let mut board = Board::from_rows(&["..0..", "....."], 1).expect("valid board");
        board.schedule_bomb(P0, CellCoord::new(4, 0), 1, 2);
        let cell = CellCoord::new(2, 0);

        assert!(!board.will_be_free(cell, 1, Direction::Right));
        assert!(!board.will_be_free(cell, 2, Direction::Right));
        assert!(board.will_be_free(cell, 3, Direction::Right));
    }

    #[test]
    fn unsafe_items_are_avoided() {
        let mut board = Board::from_rows(&[".c...", "....."], 1).expect("valid board");
        board.schedule_bomb(P0, CellCoord::new(3, 0), 5, 2);
        let cell = CellCoord::new(1, 0);

        assert!(board.is_unsafe(cell));
        assert!(!board.will_be_free(cell, 1, Direction::Left));
    }
}
