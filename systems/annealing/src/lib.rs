#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Time-budgeted simulated annealing over fixed-length action sequences.
//!
//! The [`Annealer`] keeps one candidate [`Solution`] per turn of its horizon.
//! Each iteration edits one slot, re-simulates the trajectory from that slot
//! against the opponent models and scores the final board. Worsening edits are
//! kept with the Metropolis probability, and the cooling schedule is
//! recalibrated from the observed simulation rate whenever a wall-clock budget
//! is configured. The best solution ever seen is returned and kept to seed the
//! next call.

mod median;
mod schedule;

use std::time::Instant;

use blastfield_board::{Board, Tile};
use blastfield_core::{Action, Direction, PlayerId, Solution, BOMB_TIMEOUT};
use blastfield_system_opponents::ActionSource;
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use median::OnlineMedian;
use schedule::LoopControl;

/// Cost assigned to sequences containing an action that cannot be played.
pub const INVALID_COST: f64 = 10_000.0;

/// Tuning of the optimisation run.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnealingConfig {
    /// Number of future turns in a solution.
    pub horizon: usize,
    /// Wall-clock allowance per call; `None` runs the fixed initial schedule.
    pub budget_ms: Option<u64>,
    /// Interval between schedule recalibrations.
    pub reevaluation_period_ms: u64,
    /// Time kept in reserve before the budget runs out.
    pub safety_buffer_ms: u64,
    /// Temperature used until the first recalibration.
    pub initial_temperature: f64,
    /// Cooling multiplier used until the first recalibration.
    pub initial_cooling_fraction: f64,
    /// Target probability of accepting a median worsening move at the start.
    pub start_acceptance: f64,
    /// Target probability of accepting a median worsening move at the end.
    pub end_acceptance: f64,
    /// Ratio of simulations per temperature to cooling steps.
    pub steps_per_cooling_ratio: f64,
    /// Cooling steps of the fixed schedule.
    pub initial_cooling_steps: usize,
    /// Simulations per temperature of the fixed schedule.
    pub initial_steps_per_temperature: usize,
    /// Seed of the random number generator.
    pub seed: u64,
}

impl Default for AnnealingConfig {
    fn default() -> Self {
        Self {
            horizon: 6,
            budget_ms: None,
            reevaluation_period_ms: 4,
            safety_buffer_ms: 1,
            initial_temperature: 23_000.0,
            initial_cooling_fraction: 0.95,
            start_acceptance: 0.96,
            end_acceptance: 1e-11,
            steps_per_cooling_ratio: 1.3,
            initial_cooling_steps: 160,
            initial_steps_per_temperature: 140,
            seed: 0,
        }
    }
}

/// Weights of the terminal board evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreFactors {
    /// Value of one destroyed box.
    pub boxes_destroyed: f64,
    /// Decay applied per turn to boxes that are only scheduled to go.
    pub box_decay: f64,
    /// Value of each blast range power-up collected.
    pub range_power_up: f64,
    /// Value of each bomb capacity power-up collected.
    pub count_power_up: f64,
    /// Value of each opponent eliminated.
    pub enemy_death: f64,
    /// Score of outliving every opponent.
    pub victory: f64,
    /// Score of dying, scaled down for survival shortfalls.
    pub defeat: f64,
}

impl Default for ScoreFactors {
    fn default() -> Self {
        Self {
            boxes_destroyed: 1.0,
            box_decay: 0.875,
            range_power_up: 0.1,
            count_power_up: 0.1,
            enemy_death: 50.0,
            victory: 200.0,
            defeat: -200.0,
        }
    }
}

/// Result of one optimisation run.
#[derive(Clone, Debug, PartialEq)]
pub struct AnnealingPlan {
    solution: Solution,
    cost: f64,
    simulations: usize,
}

impl AnnealingPlan {
    /// Action to play this turn.
    #[must_use]
    pub fn action(&self) -> Action {
        self.solution.first().copied().unwrap_or_else(Action::stay)
    }

    /// Best sequence found, one action per turn of the horizon.
    #[must_use]
    pub fn solution(&self) -> &[Action] {
        &self.solution
    }

    /// Cost of the best sequence; lower is better.
    #[must_use]
    pub const fn cost(&self) -> f64 {
        self.cost
    }

    /// Number of candidate sequences simulated after the initial one.
    #[must_use]
    pub const fn simulations(&self) -> usize {
        self.simulations
    }
}

/// Boards visited by the current solution, one per slot boundary.
struct Trajectory {
    history: Vec<Board>,
    illegal: Vec<bool>,
}

#[derive(Default)]
struct DeltaStats {
    samples: usize,
    mean: f64,
    median: OnlineMedian,
}

impl DeltaStats {
    fn record(&mut self, delta: f64) {
        self.samples += 1;
        self.mean += (delta - self.mean) / self.samples as f64;
        self.median.push(delta);
    }
}

/// Simulated annealing planner for one player.
#[derive(Debug)]
pub struct Annealer {
    player: PlayerId,
    config: AnnealingConfig,
    factors: ScoreFactors,
    opponents: Vec<ActionSource>,
    rng: ChaCha8Rng,
    previous: Option<Solution>,
}

impl Annealer {
    /// Creates a planner for `player`.
    #[must_use]
    pub fn new(player: PlayerId, config: AnnealingConfig) -> Self {
        Self {
            player,
            config,
            factors: ScoreFactors::default(),
            opponents: Vec::new(),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            previous: None,
        }
    }

    /// Replaces the terminal evaluation weights.
    #[must_use]
    pub fn with_factors(mut self, factors: ScoreFactors) -> Self {
        self.factors = factors;
        self
    }

    /// Adds an opponent model consulted on every simulated turn.
    #[must_use]
    pub fn with_opponent(mut self, source: ActionSource) -> Self {
        self.opponents.push(source);
        self
    }

    /// Overrides the wall-clock allowance of later calls.
    pub fn set_budget_ms(&mut self, budget_ms: Option<u64>) {
        self.config.budget_ms = budget_ms;
    }

    /// Best solution of the previous call, used to seed the next one.
    #[must_use]
    pub fn previous(&self) -> Option<&[Action]> {
        self.previous.as_deref()
    }

    /// Optimises a solution starting from `board`.
    ///
    /// The board is advanced one turn before planning. The returned solution
    /// is never worse than the legal initial one, even when the budget is
    /// already spent on entry.
    pub fn plan(&mut self, board: &Board) -> AnnealingPlan {
        let started = Instant::now();
        let horizon = self.config.horizon.max(1);
        let mut root = board.clone();
        root.step_forward(1);

        let mut trajectory = Trajectory {
            history: vec![root; horizon + 1],
            illegal: vec![false; horizon],
        };
        let mut solution = self.initial_solution(&mut trajectory, horizon);
        let mut current = self.cost(&trajectory, horizon);
        let mut best = solution.clone();
        let mut best_cost = current;

        let mut control = LoopControl::new(&self.config, started);
        let mut stats = DeltaStats::default();
        let mut simulations = 0;
        let mut slot = 0;
        let mut stale_from = horizon;
        let mut cooling_index = 0;

        'cooling: while cooling_index <= control.cooling_steps() {
            control.update(Instant::now(), cooling_index, simulations, stats.median.median());

            let mut step = 0;
            while step < control.steps_per_temperature() {
                if control.out_of_time(Instant::now()) {
                    tracing::trace!(player = self.player.get(), cooling_index, step, "budget spent");
                    break 'cooling;
                }
                step += 1;
                let Some((edited, saved)) = self.mutate(
                    &mut solution,
                    &mut trajectory,
                    &mut slot,
                    &mut stale_from,
                    horizon,
                ) else {
                    tracing::trace!(player = self.player.get(), "no legal edit left");
                    break 'cooling;
                };

                self.simulate(&mut trajectory, &solution, edited, horizon);
                let cost = self.cost(&trajectory, horizon);
                simulations += 1;
                control.record_simulation();

                if cost < best_cost {
                    best_cost = cost;
                    best.clone_from(&solution);
                }

                let delta = cost - current;
                if delta > 0.0 {
                    stats.record(delta);
                }
                let accepted = delta <= 0.0
                    || (!control.is_final_step(cooling_index)
                        && self.rng.gen::<f64>() < (-delta / control.temperature()).exp());

                if accepted {
                    current = cost;
                    stale_from = horizon;
                } else {
                    solution[edited] = saved;
                    stale_from = edited;
                }
            }

            control.cool();
            cooling_index += 1;
        }

        tracing::debug!(
            player = self.player.get(),
            simulations,
            cost = best_cost,
            mean_delta = stats.mean,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "annealing finished"
        );

        self.previous = Some(best.clone());
        AnnealingPlan {
            solution: best,
            cost: best_cost,
            simulations,
        }
    }

    /// Builds the starting solution slot by slot, reusing the previous best
    /// shifted by one turn wherever its actions are still playable.
    fn initial_solution(&mut self, trajectory: &mut Trajectory, horizon: usize) -> Solution {
        let seed: Vec<Action> = self
            .previous
            .take()
            .map(|previous| previous.into_iter().skip(1).collect())
            .unwrap_or_default();

        let mut solution = Vec::with_capacity(horizon);
        for slot in 0..horizon {
            let board = &trajectory.history[slot];
            let action = match seed.get(slot) {
                Some(&action) if is_playable(board, self.player, action) => action,
                _ => self.random_action(board),
            };
            solution.push(action);
            self.simulate(trajectory, &solution, slot, slot + 1);
        }
        solution
    }

    /// Edits the next slot in round-robin order that admits an edit.
    ///
    /// Returns the edited slot and its previous action, or `None` once every
    /// slot has been tried without success.
    fn mutate(
        &mut self,
        solution: &mut Solution,
        trajectory: &mut Trajectory,
        slot: &mut usize,
        stale_from: &mut usize,
        horizon: usize,
    ) -> Option<(usize, Action)> {
        for _ in 0..horizon {
            *slot = (*slot + 1) % horizon;
            let edited = *slot;
            if *stale_from < edited {
                self.simulate(trajectory, solution, *stale_from, edited);
                *stale_from = edited;
            }

            let saved = solution[edited];
            if self.random_edit(&mut solution[edited], &trajectory.history[edited]) {
                return Some((edited, saved));
            }
        }
        None
    }

    /// Flips the bomb flag or picks another direction that will plausibly be
    /// walkable next turn, with equal odds.
    fn random_edit(&mut self, action: &mut Action, board: &Board) -> bool {
        let Some(position) = board.player(self.player).position() else {
            return false;
        };
        if self.rng.gen_bool(0.5) && (action.bomb || board.can_place_bomb(self.player)) {
            action.bomb = !action.bomb;
            return true;
        }

        let grid = board.grid();
        let candidates: Vec<Direction> = Direction::STAY_FIRST
            .into_iter()
            .filter(|&direction| direction != action.direction)
            .filter(|&direction| {
                grid.neighbor(position, direction).is_some_and(|cell| {
                    board.tile(cell) != Some(Tile::Wall) && board.will_be_free(cell, 1, direction)
                })
            })
            .collect();

        let Some(&direction) = candidates.choose(&mut self.rng) else {
            return false;
        };
        action.direction = direction;
        true
    }

    fn random_action(&mut self, board: &Board) -> Action {
        let legal: Vec<Direction> = Direction::ALL
            .into_iter()
            .filter(|&direction| board.can_move(self.player, direction))
            .collect();
        let Some(&direction) = legal.choose(&mut self.rng) else {
            return Action::stay();
        };
        let bomb = board.can_place_bomb(self.player) && self.rng.gen_bool(0.5);
        Action::new(direction, bomb)
    }

    /// Replays slots `from..until`, refreshing the boards that follow them.
    ///
    /// An unplayable action is recorded and replaced by staying put so the
    /// boards after it stay meaningful for later edits.
    fn simulate(&mut self, trajectory: &mut Trajectory, solution: &[Action], from: usize, until: usize) {
        for slot in from..until {
            let mut board = trajectory.history[slot].clone();
            let mut illegal = false;
            if board.player(self.player).is_alive() {
                let action = solution[slot];
                if is_playable(&board, self.player, action) {
                    let _ = board.apply_action(self.player, action);
                } else {
                    illegal = true;
                    let _ = board.apply_action(self.player, Action::stay());
                }
            }
            for source in &mut self.opponents {
                source.set_turn(slot);
                source.advance(&mut board);
            }
            board.step_forward(1);

            trajectory.history[slot + 1] = board;
            trajectory.illegal[slot] = illegal;
        }
    }

    fn cost(&self, trajectory: &Trajectory, horizon: usize) -> f64 {
        if trajectory.illegal.iter().any(|&illegal| illegal) {
            return INVALID_COST;
        }
        -outcome_score(
            &self.factors,
            self.player,
            &trajectory.history[0],
            &trajectory.history[horizon],
        )
    }
}

fn is_playable(board: &Board, player: PlayerId, action: Action) -> bool {
    board.can_move(player, action.direction) && (!action.bomb || board.can_place_bomb(player))
}

/// Scores the board reached at the end of a trajectory; higher is better.
fn outcome_score(factors: &ScoreFactors, player: PlayerId, start: &Board, end: &Board) -> f64 {
    let me = end.player(player);
    if !me.is_alive() {
        return factors.defeat;
    }
    if start.alive_count() > 1 && end.alive_count() == 1 {
        return factors.victory;
    }

    let eliminated = start.alive_count().saturating_sub(end.alive_count());
    let mut score = factors.enemy_death * eliminated as f64;

    let survival = end.survival_turns(player, BOMB_TIMEOUT);
    if survival < BOMB_TIMEOUT {
        let shortfall = (BOMB_TIMEOUT - survival) as f64;
        return factors.defeat * shortfall / BOMB_TIMEOUT as f64;
    }

    let before = start.player(player);
    let destroyed = me.boxes_destroyed().saturating_sub(before.boxes_destroyed());
    score += factors.boxes_destroyed * f64::from(destroyed);
    score += factors.range_power_up
        * f64::from(me.blast_range().saturating_sub(before.blast_range()));
    score += factors.count_power_up
        * f64::from(me.total_bombs().saturating_sub(before.total_bombs()));

    let mut decay = 1.0;
    for offset in 0..BOMB_TIMEOUT {
        decay *= factors.box_decay;
        score += factors.boxes_destroyed * f64::from(end.pending_boxes(player, offset)) * decay;
    }
    score
}

#[cfg(test)]
mod tests {
    use blastfield_board::Player;
    use blastfield_core::CellCoord;

    use super::*;

    const P0: PlayerId = PlayerId::new(0);
    const P1: PlayerId = PlayerId::new(1);

    fn duel(rows: &[&str]) -> Board {
        let mut board = Board::from_rows(rows, 2).expect("valid board");
        board.set_player(P0, Player::spawn(CellCoord::new(1, 1)));
        board.set_player(P1, Player::spawn(CellCoord::new(3, 3)));
        board
    }

    fn fixed_schedule(cooling_steps: usize, steps_per_temperature: usize) -> AnnealingConfig {
        AnnealingConfig {
            initial_cooling_steps: cooling_steps,
            initial_steps_per_temperature: steps_per_temperature,
            seed: 7,
            ..AnnealingConfig::default()
        }
    }

    #[test]
    fn losing_the_agent_is_a_defeat() {
        let start = duel(&[".....", ".....", ".....", ".....", "....."]);
        let mut end = start.clone();
        end.set_player(P0, Player::dead());

        assert_eq!(outcome_score(&ScoreFactors::default(), P0, &start, &end), -200.0);
    }

    #[test]
    fn outliving_everyone_is_a_victory() {
        let start = duel(&[".....", ".....", ".....", ".....", "....."]);
        let mut end = start.clone();
        end.set_player(P1, Player::dead());

        assert_eq!(outcome_score(&ScoreFactors::default(), P0, &start, &end), 200.0);
    }

    #[test]
    fn doomed_endings_scale_the_defeat_by_the_shortfall() {
        let start = duel(&["XXXXX", "X.XXX", "XXX.X", "XXX.X", "XXXXX"]);
        let mut end = start.clone();
        end.schedule_bomb(P1, CellCoord::new(1, 1), 4, 1);

        assert_eq!(end.survival_turns(P0, BOMB_TIMEOUT), 4);
        assert_eq!(outcome_score(&ScoreFactors::default(), P0, &start, &end), -100.0);
    }

    #[test]
    fn boxes_and_power_ups_add_up() {
        let start = duel(&[".....", ".....", ".....", ".....", "....."]);
        let mut end = start.clone();
        end.set_player(
            P0,
            Player::spawn(CellCoord::new(1, 1))
                .with_boxes_destroyed(3)
                .with_blast_range(3)
                .with_bombs(2, 2),
        );

        let score = outcome_score(&ScoreFactors::default(), P0, &start, &end);

        assert!((score - 3.2).abs() < 1e-9);
    }

    #[test]
    fn illegal_sequences_cost_the_most() {
        let board = duel(&[".....", ".....", ".....", ".....", "....."]);
        let mut annealer = Annealer::new(P0, fixed_schedule(0, 0));
        let mut trajectory = Trajectory {
            history: vec![board; 3],
            illegal: vec![false; 2],
        };
        let solution = vec![
            Action::new(Direction::Up, false),
            Action::new(Direction::Up, false),
        ];

        annealer.simulate(&mut trajectory, &solution, 0, 2);

        assert!(!trajectory.illegal[0]);
        assert!(trajectory.illegal[1]);
        assert_eq!(annealer.cost(&trajectory, 2), INVALID_COST);
        assert_eq!(
            trajectory.history[2].player(P0).position(),
            Some(CellCoord::new(1, 0))
        );
    }

    #[test]
    fn warm_start_reuses_the_shifted_solution() {
        let board = duel(&[".....", ".....", ".....", ".....", "....."]);
        let mut annealer = Annealer::new(P0, fixed_schedule(0, 0));
        annealer.previous = Some(vec![
            Action::stay(),
            Action::new(Direction::Right, false),
            Action::new(Direction::Down, false),
            Action::stay(),
            Action::stay(),
            Action::stay(),
        ]);

        let plan = annealer.plan(&board);

        assert_eq!(plan.simulations(), 0);
        assert_eq!(plan.solution()[..2], [
            Action::new(Direction::Right, false),
            Action::new(Direction::Down, false),
        ]);
        assert_eq!(annealer.previous(), Some(plan.solution()));
    }

    #[test]
    fn config_fills_missing_fields_with_defaults() {
        let config: AnnealingConfig =
            toml::from_str("horizon = 4\nbudget_ms = 80\nseed = 99\n").expect("valid config");

        assert_eq!(config.horizon, 4);
        assert_eq!(config.budget_ms, Some(80));
        assert_eq!(config.seed, 99);
        assert_eq!(config.initial_cooling_steps, 160);
        assert_eq!(config.end_acceptance, 1e-11);
    }
}
