//! Read-only statistics computed from a board snapshot.

use std::collections::VecDeque;

use blastfield_core::{CellCoord, PlayerId};

use crate::Board;

/// Closest living opponent of `from`, with the number of steps to reach it.
///
/// The search walks free tiles only, but an opponent standing on a bomb is
/// still found from an adjacent tile.
#[must_use]
pub fn closest_player(board: &Board, from: PlayerId) -> Option<(PlayerId, u32)> {
    let start = board.player(from).position()?;
    let grid = board.grid();
    let mut seen = vec![false; grid.tile_count()];
    let mut frontier = vec![start];
    let mut steps = 1;

    while !frontier.is_empty() {
        let mut next = Vec::new();
        for cell in frontier {
            for neighbor in grid.neighbors(cell) {
                let Some(index) = grid.index(neighbor) else {
                    continue;
                };
                if seen[index] {
                    continue;
                }
                seen[index] = true;

                let occupant = board
                    .player_ids()
                    .filter(|&id| id != from)
                    .find(|&id| board.player(id).position() == Some(neighbor));
                if let Some(id) = occupant {
                    return Some((id, steps));
                }
                if board.tiles()[index].is_free() {
                    next.push(neighbor);
                }
            }
        }
        frontier = next;
        steps += 1;
    }

    None
}

/// Steps from `player` to the nearest box that no scheduled blast will hit.
///
/// Zero means such a box is adjacent to the player.
#[must_use]
pub fn steps_to_closest_box(board: &Board, player: PlayerId) -> Option<u32> {
    let start = board.player(player).position()?;
    let grid = board.grid();
    let mut seen = vec![false; grid.tile_count()];
    let mut frontier = vec![start];
    let mut steps = 0;

    while !frontier.is_empty() {
        let mut next = Vec::new();
        for cell in frontier {
            for neighbor in grid.neighbors(cell) {
                let Some(index) = grid.index(neighbor) else {
                    continue;
                };
                if seen[index] {
                    continue;
                }
                seen[index] = true;

                let tile = board.tiles()[index];
                if tile.is_box() {
                    if board.earliest_explosion(neighbor).is_none() {
                        return Some(steps);
                    }
                } else if tile.is_free() {
                    next.push(neighbor);
                }
            }
        }
        frontier = next;
        steps += 1;
    }

    None
}

/// Length of the shortest walk over free tiles between two cells.
#[must_use]
pub fn path_distance(board: &Board, from: CellCoord, to: CellCoord) -> Option<u32> {
    let grid = board.grid();
    let start = grid.index(from)?;
    let _ = grid.index(to)?;
    let mut distances = vec![u32::MAX; grid.tile_count()];
    let mut queue = VecDeque::new();
    distances[start] = 0;
    queue.push_back(from);

    while let Some(cell) = queue.pop_front() {
        let Some(index) = grid.index(cell) else {
            continue;
        };
        let distance = distances[index];
        if cell == to {
            return Some(distance);
        }

        for neighbor in grid.neighbors(cell) {
            let Some(neighbor_index) = grid.index(neighbor) else {
                continue;
            };
            if distances[neighbor_index] != u32::MAX || !board.tiles()[neighbor_index].is_free() {
                continue;
            }
            distances[neighbor_index] = distance + 1;
            queue.push_back(neighbor);
        }
    }

    None
}

/// Cells reachable over free tiles from `from` within `steps` moves, the
/// starting cell included.
#[must_use]
pub fn reachable_within(board: &Board, from: CellCoord, steps: u32) -> Vec<CellCoord> {
    let grid = board.grid();
    let Some(start) = grid.index(from) else {
        return Vec::new();
    };
    let mut seen = vec![false; grid.tile_count()];
    seen[start] = true;
    let mut reached = vec![from];
    let mut frontier = vec![from];

    for _ in 0..steps {
        let mut next = Vec::new();
        for cell in frontier {
            for neighbor in grid.neighbors(cell) {
                let Some(index) = grid.index(neighbor) else {
                    continue;
                };
                if seen[index] || !board.tiles()[index].is_free() {
                    continue;
                }
                seen[index] = true;
                reached.push(neighbor);
                next.push(neighbor);
            }
        }
        frontier = next;
    }

    reached
}

/// Number of intact boxes left on the board.
#[must_use]
pub fn box_count(board: &Board) -> usize {
    board.tiles().iter().filter(|tile| tile.is_box()).count()
}

/// Boxes `player` destroyed so far plus those its live bombs will destroy.
#[must_use]
pub fn score(board: &Board, player: PlayerId) -> u32 {
    board.player(player).boxes_destroyed() + board.pending_box_total(player)
}

/// Number of living players with a strictly higher [`score`] than `player`.
#[must_use]
pub fn standing(board: &Board, player: PlayerId) -> usize {
    let own = score(board, player);
    board
        .player_ids()
        .filter(|&id| id != player && board.player(id).is_alive())
        .filter(|&id| score(board, id) > own)
        .count()
}

/// Soonest explosion among the live bombs, in turns from now.
#[must_use]
pub fn soonest_bomb(board: &Board) -> Option<u32> {
    board
        .bombs()
        .iter()
        .map(|bomb| bomb.explode_turn().saturating_sub(board.turn()))
        .min()
}

#[cfg(test)]
mod tests {
    use blastfield_core::Grid;

    use super::*;
    use crate::Player;

    const P0: PlayerId = PlayerId::new(0);
    const P1: PlayerId = PlayerId::new(1);

    fn board(rows: &[&str]) -> Board {
        let mut board = Board::from_rows(rows, 2).expect("valid board");
        board.set_player(P0, Player::spawn(CellCoord::new(0, 0)));
        board.set_player(P1, Player::spawn(CellCoord::new(4, 2)));
        board
    }

    #[test]
    fn closest_player_counts_steps_over_free_tiles() {
        let board = board(&[".....", ".XXX.", "....."]);

        assert_eq!(closest_player(&board, P0), Some((P1, 6)));
        assert_eq!(closest_player(&board, P1), Some((P0, 6)));
    }

    #[test]
    fn walled_off_players_are_unreachable() {
        let board = board(&[".X...", "XX...", "....."]);

        assert_eq!(closest_player(&board, P0), None);
        assert_eq!(path_distance(&board, CellCoord::new(0, 0), CellCoord::new(4, 2)), None);
    }

    #[test]
    fn closest_box_ignores_boxes_already_doomed() {
        let mut board = board(&[".0...", ".....", "...0."]);
        assert_eq!(steps_to_closest_box(&board, P0), Some(0));

        board.schedule_bomb(P1, CellCoord::new(2, 0), 8, 1);
        assert_eq!(steps_to_closest_box(&board, P0), Some(4));
    }

    #[test]
    fn path_distance_routes_around_walls() {
        let board = board(&["..X..", "..X..", "....."]);

        assert_eq!(path_distance(&board, CellCoord::new(0, 0), CellCoord::new(4, 0)), Some(8));
        assert_eq!(path_distance(&board, CellCoord::new(1, 1), CellCoord::new(1, 1)), Some(0));
    }

    #[test]
    fn reachable_within_includes_the_start() {
        let board = board(&[".0...", ".....", "....."]);
        let reached = reachable_within(&board, CellCoord::new(0, 0), 1);

        assert_eq!(reached, vec![CellCoord::new(0, 0), CellCoord::new(0, 1)]);
    }

    #[test]
    fn standing_counts_players_strictly_ahead() {
        let mut board = board(&[".0...", ".....", "....0"]);
        assert_eq!(standing(&board, P0), 0);

        board.set_player(P1, Player::spawn(CellCoord::new(4, 2)).with_boxes_destroyed(2));
        assert_eq!(standing(&board, P0), 1);
        assert_eq!(standing(&board, P1), 0);
        assert_eq!(box_count(&board), 2);
    }

    #[test]
    fn soonest_bomb_reads_relative_turns() {
        let mut board = Board::new(Grid::new(5, 5), 2);
        assert_eq!(soonest_bomb(&board), None);

        board.schedule_bomb(P0, CellCoord::new(0, 0), 5, 1);
        board.schedule_bomb(P1, CellCoord::new(4, 4), 3, 1);
        assert_eq!(soonest_bomb(&board), Some(3));
    }
}
