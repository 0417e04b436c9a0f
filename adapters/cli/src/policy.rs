//! Per-turn choice of planner and the agent that runs it.

use blastfield_board::{query, Board};
use blastfield_core::{Action, PlayerId};
use blastfield_system_annealing::Annealer;
use blastfield_system_lookahead::{Lookahead, LookaheadMode};
use blastfield_system_opponents::{ActionSource, ScriptedActions};

use crate::config::{AgentConfig, OpponentModel, Strategy};

const ENDGAME_DEPTH: usize = 3;
const OPPONENT_DEPTH: usize = 3;
const DUEL_DEPTH: usize = 4;
const HURRIED_DEPTH: usize = 4;
const DEFAULT_DEPTH: usize = 5;
const ISOLATED_DEPTH: usize = 6;
const ISOLATED_BOXES: usize = 25;
const SCARCE_BOXES: usize = 10;
const CROWDED_BOMBS: usize = 3;

/// Planner chosen for one turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Selection {
    /// Run the agent's lookahead alone.
    Lookahead {
        /// Plies to search.
        depth: usize,
        /// Leaf heuristic to apply.
        mode: LookaheadMode,
    },
    /// Predict `opponent` with its own lookahead, then plan against that line.
    Duel {
        /// Opponent whose moves are predicted.
        opponent: PlayerId,
    },
}

/// Copy of `board` in which every opponent able to bomb has just done so.
#[must_use]
pub fn pessimistic(board: &Board, player: PlayerId) -> Board {
    let mut modelled = board.clone();
    for id in board.player_ids().filter(|&id| id != player) {
        if modelled.can_place_bomb(id) {
            modelled.place_bomb(id);
        }
    }
    modelled
}

/// Picks the planner for `player` from the coarse state of the match.
///
/// `modelled` is the [`pessimistic`] view of `board`; reachability of the
/// opponents is judged on it.
#[must_use]
pub fn select(board: &Board, modelled: &Board, player: PlayerId, model_opponent: bool) -> Selection {
    let boxes = query::box_count(board);
    let imminent = query::soonest_bomb(board) == Some(1);
    let crowded = board.bombs().len() > CROWDED_BOMBS && imminent;
    let closest = query::closest_player(modelled, player).map(|(id, _)| id);

    let rivals: Vec<PlayerId> = board
        .player_ids()
        .filter(|&id| id != player && board.player(id).is_alive())
        .collect();
    // Confirmed tallies only; pending boxes are still on the board.
    let own = i64::from(board.player(player).boxes_destroyed());
    let remaining = i64::try_from(boxes).unwrap_or(i64::MAX);
    let contenders = rivals
        .iter()
        .filter(|&&id| own - i64::from(board.player(id).boxes_destroyed()) <= remaining)
        .count();

    if boxes == 0 || contenders == 0 {
        let threat = closest
            .or_else(|| nearest_rival(board, player, &rivals))
            .and_then(|id| board.player(id).position());
        let mode = match threat {
            Some(from) if contenders < rivals.len() => LookaheadMode::Flee { from },
            _ => LookaheadMode::Fight,
        };
        return Selection::Lookahead {
            depth: ENDGAME_DEPTH,
            mode,
        };
    }

    if closest.is_none() && boxes > ISOLATED_BOXES && !crowded {
        return Selection::Lookahead {
            depth: ISOLATED_DEPTH,
            mode: LookaheadMode::Standard {
                distance_penalty: false,
            },
        };
    }

    if let (true, Some(opponent)) = (model_opponent, closest) {
        return Selection::Duel { opponent };
    }

    let depth = if boxes < SCARCE_BOXES || crowded {
        HURRIED_DEPTH
    } else {
        DEFAULT_DEPTH
    };
    Selection::Lookahead {
        depth,
        mode: LookaheadMode::default(),
    }
}

fn nearest_rival(board: &Board, player: PlayerId, rivals: &[PlayerId]) -> Option<PlayerId> {
    let origin = board.player(player).position()?;
    rivals.iter().copied().min_by_key(|&id| {
        board
            .player(id)
            .position()
            .map_or(u32::MAX, |cell| cell.manhattan_distance(origin))
    })
}

/// Decides one action per turn for the controlled player.
#[derive(Debug)]
pub struct Agent {
    player: PlayerId,
    config: AgentConfig,
    annealer: Option<Annealer>,
}

impl Agent {
    /// Creates an agent controlling `player`.
    #[must_use]
    pub fn new(player: PlayerId, config: AgentConfig) -> Self {
        Self {
            player,
            config,
            annealer: None,
        }
    }

    /// Player the agent controls.
    #[must_use]
    pub const fn player(&self) -> PlayerId {
        self.player
    }

    /// Chooses the action to play on `board`.
    pub fn decide(&mut self, board: &Board) -> Action {
        match self.config.strategy {
            Strategy::Auto => self.decide_auto(board),
            Strategy::Lookahead => Lookahead::new(self.player, self.config.lookahead_depth)
                .with_weights(self.config.lookahead)
                .plan(board)
                .action(),
            Strategy::Annealing => self.decide_annealing(board),
        }
    }

    fn decide_auto(&self, board: &Board) -> Action {
        let modelled = pessimistic(board, self.player);
        let selection = select(board, &modelled, self.player, self.config.model_opponent);
        tracing::debug!(turn = board.turn(), ?selection, "planner selected");

        let weights = self.config.lookahead;
        match selection {
            Selection::Lookahead { depth, mode } => Lookahead::new(self.player, depth)
                .with_mode(mode)
                .with_weights(weights)
                .plan(&modelled)
                .action(),
            Selection::Duel { opponent } => {
                let predicted = Lookahead::new(opponent, OPPONENT_DEPTH)
                    .with_mode(LookaheadMode::Standard {
                        distance_penalty: false,
                    })
                    .with_weights(weights)
                    .plan(&modelled);
                let script = ScriptedActions::new(opponent, predicted.line().to_vec());
                Lookahead::new(self.player, DUEL_DEPTH)
                    .with_weights(weights)
                    .with_opponent(ActionSource::Scripted(script))
                    .plan(&modelled)
                    .action()
            }
        }
    }

    fn decide_annealing(&mut self, board: &Board) -> Action {
        let player = self.player;
        let config = &self.config;
        let annealer = self.annealer.get_or_insert_with(|| {
            board
                .player_ids()
                .filter(|&id| id != player && board.player(id).is_alive())
                .fold(
                    Annealer::new(player, config.annealing).with_factors(config.scoring),
                    |annealer, id| {
                        annealer.with_opponent(match config.opponents {
                            OpponentModel::Idle => ActionSource::Idle(id),
                            OpponentModel::Evasive => ActionSource::Evasive(id),
                        })
                    },
                )
        });

        let plan = annealer.plan(board);
        tracing::debug!(
            turn = board.turn(),
            cost = plan.cost(),
            simulations = plan.simulations(),
            "annealing finished"
        );
        plan.action()
    }
}
