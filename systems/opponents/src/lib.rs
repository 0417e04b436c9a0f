#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Opponent models consulted while a search simulates future turns.
//!
//! Searches only control one player. Every other living player is driven by
//! an [`ActionSource`], which decides that player's action for each simulated
//! turn from the board as it stands when the turn begins.

use blastfield_board::Board;
use blastfield_core::{Action, Direction, PlayerId, BOMB_TIMEOUT};

/// Fixed list of actions replayed one per simulated turn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScriptedActions {
    player: PlayerId,
    actions: Vec<Action>,
    cursor: usize,
}

impl ScriptedActions {
    /// Creates a script for `player` that starts at its first action.
    #[must_use]
    pub fn new(player: PlayerId, actions: Vec<Action>) -> Self {
        Self {
            player,
            actions,
            cursor: 0,
        }
    }

    /// Actions replayed by the script.
    #[must_use]
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }
}

/// Strategy that picks an opponent's action each simulated turn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActionSource {
    /// The player never moves and never bombs.
    Idle(PlayerId),
    /// The player follows a precomputed line, then stays put.
    Scripted(ScriptedActions),
    /// The player steps wherever it survives longest, without bombing.
    Evasive(PlayerId),
}

impl ActionSource {
    /// Player the source decides for.
    #[must_use]
    pub const fn player(&self) -> PlayerId {
        match self {
            Self::Idle(player) | Self::Evasive(player) => *player,
            Self::Scripted(script) => script.player,
        }
    }

    /// Rewinds a scripted source so the next action is the one for `turn`,
    /// counted from the start of the search.
    pub fn set_turn(&mut self, turn: usize) {
        if let Self::Scripted(script) = self {
            script.cursor = turn;
        }
    }

    /// Decides the player's action for the turn about to be simulated.
    pub fn next_action(&mut self, board: &Board) -> Action {
        match self {
            Self::Idle(_) => Action::stay(),
            Self::Scripted(script) => {
                let action = script.actions.get(script.cursor).copied();
                script.cursor += 1;
                action.unwrap_or_else(|| {
                    tracing::trace!(player = script.player.get(), "script exhausted, staying");
                    Action::stay()
                })
            }
            Self::Evasive(player) => evade(board, *player),
        }
    }

    /// Decides and plays the player's action on `board`.
    ///
    /// Dead players and illegal steps leave the board untouched.
    pub fn advance(&mut self, board: &mut Board) {
        let player = self.player();
        if !board.player(player).is_alive() {
            return;
        }
        let action = self.next_action(board);
        let _ = board.apply_action(player, action);
    }
}

fn evade(board: &Board, player: PlayerId) -> Action {
    let mut best = Action::stay();
    let mut best_turns = 0;

    for direction in Direction::STAY_FIRST {
        if !board.can_move(player, direction) {
            continue;
        }
        let mut probe = board.clone();
        probe.move_player(player, direction);
        probe.step_forward(1);

        let turns = probe.survival_turns(player, BOMB_TIMEOUT);
        if turns > best_turns {
            best = Action::new(direction, false);
            best_turns = turns;
        }
    }

    best
}
