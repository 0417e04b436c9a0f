#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Depth-limited exhaustive search over the agent's own moves.
//!
//! Every ply clones the board, applies one of the agent's legal
//! direction and bomb combinations, lets the modelled opponents act and advances
//! one turn. Destroyed boxes are credited with a geometric decay per ply, and
//! the leaves are scored with survival, loadout and positional heuristics
//! selected by [`LookaheadMode`].

use blastfield_board::{query, Board};
use blastfield_core::{Action, CellCoord, Direction, PlayerId, BOMB_TIMEOUT};
use blastfield_system_opponents::ActionSource;
use serde::{Deserialize, Serialize};

/// Leaf heuristic used by the search.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LookaheadMode {
    /// Farm boxes and power-ups.
    Standard {
        /// Penalise the distance to the nearest box nobody has bombed yet.
        distance_penalty: bool,
    },
    /// Run away from a threat and never bomb on the first move.
    Flee {
        /// Tile to keep away from.
        from: CellCoord,
    },
    /// Close in on the nearest opponent and squeeze its escape routes.
    Fight,
}

impl Default for LookaheadMode {
    fn default() -> Self {
        Self::Standard {
            distance_penalty: true,
        }
    }
}

/// Weights applied to the terms of the lookahead score.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookaheadWeights {
    /// Value of one destroyed box before decay.
    pub box_destroyed: f64,
    /// Multiplier applied to box value for every ply it lies in the future.
    pub decay: f64,
    /// Value of each point of blast range and bomb capacity at the leaf.
    pub power_up: f64,
    /// Value of each bomb still in hand at the leaf.
    pub spare_bomb: f64,
    /// Cost per step to the nearest untouched box.
    pub box_distance: f64,
    /// Leaf score of any line in which the agent dies.
    pub death: f64,
    /// Score per turn the agent falls short of the survival horizon.
    pub shortfall: f64,
    /// Bonus per turn an opponent loses from its survival after a first-move bomb.
    pub trap_bonus: f64,
    /// Value of each tile between the agent and the threat when fleeing.
    pub flee_distance: f64,
    /// Value of each turn the nearest opponent loses from its survival when fighting.
    pub fight_survival: f64,
    /// Turns the agent must be able to survive at the leaf.
    pub survival_horizon: usize,
}

impl Default for LookaheadWeights {
    fn default() -> Self {
        Self {
            box_destroyed: 1.0,
            decay: 0.875,
            power_up: 0.1,
            spare_bomb: 0.125,
            box_distance: 0.005,
            death: -12_000.0,
            shortfall: -1_000.0,
            trap_bonus: 15.0,
            flee_distance: 10.0,
            fight_survival: 100.0,
            survival_horizon: BOMB_TIMEOUT,
        }
    }
}

/// Outcome of a lookahead search.
#[derive(Clone, Debug, PartialEq)]
pub struct Plan {
    action: Action,
    line: Vec<Action>,
    score: f64,
}

impl Plan {
    /// First action of the best line.
    #[must_use]
    pub const fn action(&self) -> Action {
        self.action
    }

    /// Best line found, one action per ply, possibly cut short by death.
    #[must_use]
    pub fn line(&self) -> &[Action] {
        &self.line
    }

    /// Score of the best line.
    #[must_use]
    pub const fn score(&self) -> f64 {
        self.score
    }
}

/// Exhaustive fixed-depth search for one player.
#[derive(Debug)]
pub struct Lookahead {
    player: PlayerId,
    depth: usize,
    mode: LookaheadMode,
    weights: LookaheadWeights,
    opponents: Vec<ActionSource>,
}

/// Scratch lines shared across the recursion.
struct Lines {
    current: Vec<Action>,
    best: Vec<Action>,
    best_score: f64,
}

impl Lines {
    fn offer(&mut self, plies: usize, score: f64) {
        if score > self.best_score {
            self.best.clear();
            self.best.extend_from_slice(&self.current[..plies]);
            self.best_score = score;
        }
    }
}

impl Lookahead {
    /// Creates a standard search for `player` that looks `depth` plies ahead.
    #[must_use]
    pub fn new(player: PlayerId, depth: usize) -> Self {
        Self {
            player,
            depth: depth.max(1),
            mode: LookaheadMode::default(),
            weights: LookaheadWeights::default(),
            opponents: Vec::new(),
        }
    }

    /// Replaces the leaf heuristic.
    #[must_use]
    pub fn with_mode(mut self, mode: LookaheadMode) -> Self {
        self.mode = mode;
        self
    }

    /// Replaces the score weights.
    #[must_use]
    pub fn with_weights(mut self, weights: LookaheadWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Adds an opponent model consulted on every ply.
    #[must_use]
    pub fn with_opponent(mut self, source: ActionSource) -> Self {
        self.opponents.push(source);
        self
    }

    /// Number of plies searched.
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    /// Searches every line from `board` and returns the best one found.
    ///
    /// The board is advanced one turn before the search starts. When the
    /// agent does not survive that turn the plan is to stay put.
    pub fn plan(&mut self, board: &Board) -> Plan {
        let mut root = board.clone();
        root.step_forward(1);
        if !root.player(self.player).is_alive() {
            return Plan {
                action: Action::stay(),
                line: Vec::new(),
                score: self.weights.death,
            };
        }

        let mut lines = Lines {
            current: vec![Action::stay(); self.depth],
            best: Vec::with_capacity(self.depth),
            best_score: f64::NEG_INFINITY,
        };
        let bombing_allowed = !matches!(self.mode, LookaheadMode::Flee { .. });

        for direction in Direction::ALL {
            if !root.can_move(self.player, direction) {
                continue;
            }
            lines.current[0] = Action::new(direction, false);
            self.search(&root, 1, 0.0, &mut lines);
            if bombing_allowed && root.can_place_bomb(self.player) {
                lines.current[0] = Action::new(direction, true);
                self.search(&root, 1, 0.0, &mut lines);
            }
        }

        let action = lines.best.first().copied().unwrap_or_else(Action::stay);
        tracing::debug!(
            player = self.player.get(),
            depth = self.depth,
            score = lines.best_score,
            ?action,
            "lookahead finished"
        );

        Plan {
            action,
            line: lines.best,
            score: lines.best_score,
        }
    }

    fn search(&mut self, board: &Board, depth: usize, mut score: f64, lines: &mut Lines) {
        let mut board = board.clone();
        let action = lines.current[depth - 1];

        if action.bomb {
            board.place_bomb(self.player);
            if depth == 1 && !matches!(self.mode, LookaheadMode::Flee { .. }) {
                score += self.trap_bonus(&board);
            }
        }
        board.move_player(self.player, action.direction);
        for source in &mut self.opponents {
            source.set_turn(depth - 1);
            source.advance(&mut board);
        }

        let before = board.player(self.player).boxes_destroyed();
        board.step_forward(1);
        if !board.player(self.player).is_alive() {
            lines.offer(depth, self.weights.death);
            return;
        }
        let destroyed = board.player(self.player).boxes_destroyed() - before;
        score += self.weights.box_destroyed * f64::from(destroyed) * self.decay(depth);

        if depth == self.depth {
            let leaf = self.leaf_score(&board, depth);
            lines.offer(depth, score + leaf);
            return;
        }

        for direction in Direction::ALL {
            if !board.can_move(self.player, direction) {
                continue;
            }
            if board.can_place_bomb(self.player) {
                lines.current[depth] = Action::new(direction, true);
                self.search(&board, depth + 1, score, lines);
            }
            lines.current[depth] = Action::new(direction, false);
            self.search(&board, depth + 1, score, lines);
        }
    }

    fn trap_bonus(&self, board: &Board) -> f64 {
        board
            .player_ids()
            .filter(|&id| id != self.player && board.player(id).is_alive())
            .map(|id| BOMB_TIMEOUT - board.survival_turns(id, BOMB_TIMEOUT))
            .map(|lost| self.weights.trap_bonus * lost as f64)
            .sum()
    }

    fn leaf_score(&self, board: &Board, depth: usize) -> f64 {
        let weights = &self.weights;
        let horizon = weights.survival_horizon;
        let me = board.player(self.player);
        let mut score =
            weights.shortfall * (horizon - board.survival_turns(self.player, horizon)) as f64;

        match self.mode {
            LookaheadMode::Flee { from } => {
                let distance = me
                    .position()
                    .map_or(0, |cell| cell.manhattan_distance(from));
                score += weights.flee_distance * f64::from(distance);
                score += f64::from(me.bombs_available());
            }
            LookaheadMode::Fight => {
                if let Some((opponent, steps)) = query::closest_player(board, self.player) {
                    let lost = horizon - board.survival_turns(opponent, horizon);
                    score -= f64::from(steps);
                    score -= weights.fight_survival * lost as f64;
                }
            }
            LookaheadMode::Standard { distance_penalty } => {
                let loadout = f64::from(me.total_bombs() + me.blast_range());
                score += weights.power_up * loadout * self.decay(depth);
                score += weights.spare_bomb * f64::from(me.bombs_available());
                for offset in 0..BOMB_TIMEOUT {
                    let pending = f64::from(board.pending_boxes(self.player, offset));
                    score += weights.box_destroyed * pending * self.decay(depth + offset + 1);
                }
                if distance_penalty {
                    if let Some(steps) = query::steps_to_closest_box(board, self.player) {
                        score -= weights.box_distance * f64::from(steps);
                    }
                }
            }
        }

        score
    }

    fn decay(&self, plies: usize) -> f64 {
        self.weights
            .decay
            .powi(i32::try_from(plies).unwrap_or(i32::MAX))
    }
}
