//! Cooling schedule that recalibrates itself against the wall clock.

use std::time::{Duration, Instant};

use crate::AnnealingConfig;

/// Temperature and loop bounds for one optimisation run.
///
/// Without a time budget the schedule is fixed: the configured number of
/// cooling steps, each running the configured number of simulations, with
/// geometric cooling by the configured fraction. With a budget the bounds and
/// temperatures are re-derived periodically from the observed simulation rate
/// and the median worsening delta.
#[derive(Clone, Debug)]
pub(crate) struct LoopControl {
    budget: Option<Duration>,
    period: Duration,
    safety_buffer: Duration,
    started: Instant,
    last_update: Instant,
    start_acceptance: f64,
    end_acceptance: f64,
    steps_ratio: f64,
    cooling_steps: usize,
    steps_per_temperature: usize,
    temperature: f64,
    cooling_fraction: f64,
    simulations_since_update: usize,
}

impl LoopControl {
    pub(crate) fn new(config: &AnnealingConfig, started: Instant) -> Self {
        let budget = config.budget_ms.map(Duration::from_millis);
        let cooling_steps = match config.budget_ms {
            Some(ms) => (ms as f64 * 1.2) as usize,
            None => config.initial_cooling_steps,
        };

        Self {
            budget,
            period: Duration::from_millis(config.reevaluation_period_ms),
            safety_buffer: Duration::from_millis(config.safety_buffer_ms),
            started,
            last_update: started,
            start_acceptance: config.start_acceptance,
            end_acceptance: config.end_acceptance,
            steps_ratio: config.steps_per_cooling_ratio,
            cooling_steps,
            steps_per_temperature: config.initial_steps_per_temperature,
            temperature: config.initial_temperature,
            cooling_fraction: config.initial_cooling_fraction,
            simulations_since_update: 0,
        }
    }

    pub(crate) const fn cooling_steps(&self) -> usize {
        self.cooling_steps
    }

    pub(crate) const fn steps_per_temperature(&self) -> usize {
        self.steps_per_temperature
    }

    pub(crate) const fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Reports whether `cooling_index` is the hill-climbing close-out step.
    pub(crate) const fn is_final_step(&self, cooling_index: usize) -> bool {
        self.cooling_steps == 0 || cooling_index == self.cooling_steps
    }

    /// Reports whether the budget, less the safety buffer, is spent at `now`.
    pub(crate) fn out_of_time(&self, now: Instant) -> bool {
        self.budget.is_some_and(|budget| {
            now.saturating_duration_since(self.started) + self.safety_buffer >= budget
        })
    }

    pub(crate) fn record_simulation(&mut self) {
        self.simulations_since_update += 1;
    }

    pub(crate) fn cool(&mut self) {
        self.temperature *= self.cooling_fraction;
    }

    /// Re-derives the schedule at the start of cooling step `cooling_index`.
    ///
    /// Running out of budget zeroes both loop bounds so the run ends at once.
    pub(crate) fn update(
        &mut self,
        now: Instant,
        cooling_index: usize,
        simulations: usize,
        median_delta: Option<f64>,
    ) {
        let Some(budget) = self.budget else {
            return;
        };
        let elapsed = now.saturating_duration_since(self.last_update);
        let spent = now.saturating_duration_since(self.started) + self.safety_buffer;
        let Some(remaining) = budget.checked_sub(spent) else {
            self.cooling_steps = 0;
            self.steps_per_temperature = 0;
            return;
        };

        let due = elapsed > self.period;
        if due {
            self.last_update = now;
            let rate = self.simulations_since_update as f64 / elapsed.as_secs_f64();
            let affordable = rate * remaining.as_secs_f64();
            let total = simulations as f64 + affordable;
            // Never below the current step, or the close-out step is skipped.
            self.cooling_steps = ((total / self.steps_ratio).sqrt() as usize).max(cooling_index);
            self.steps_per_temperature = (self.cooling_steps as f64 * self.steps_ratio) as usize;
            self.simulations_since_update = 0;
        }

        if due || cooling_index == 1 {
            self.recalibrate(cooling_index, median_delta);
        }
    }

    fn recalibrate(&mut self, cooling_index: usize, median_delta: Option<f64>) {
        let Some(median) = median_delta.filter(|median| *median > 0.0) else {
            return;
        };
        if self.cooling_steps == 0 {
            return;
        }

        let start = -median / self.start_acceptance.ln();
        let end = -median / self.end_acceptance.ln();
        let progress = self.cooling_steps as f64 * 0.6;
        self.cooling_fraction = (end / start).powf(progress.recip());
        self.temperature = start * self.cooling_fraction.powi(cooling_index as i32);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn budgeted(ms: u64) -> AnnealingConfig {
        AnnealingConfig {
            budget_ms: Some(ms),
            ..AnnealingConfig::default()
        }
    }

    #[test]
    fn unbudgeted_schedule_is_fixed() {
        let config = AnnealingConfig::default();
        let started = Instant::now();
        let mut control = LoopControl::new(&config, started);

        control.update(started + Duration::from_secs(10), 1, 5_000, Some(3.0));

        assert_eq!(control.cooling_steps(), config.initial_cooling_steps);
        assert_eq!(control.steps_per_temperature(), config.initial_steps_per_temperature);
        assert_eq!(control.temperature(), config.initial_temperature);

        control.cool();
        assert!(
            (control.temperature() - config.initial_temperature * config.initial_cooling_fraction)
                .abs()
                < 1e-9
        );
    }

    #[test]
    fn exhausted_budget_stops_the_run() {
        let started = Instant::now();
        let mut control = LoopControl::new(&budgeted(0), started);

        control.update(started, 0, 0, None);

        assert_eq!(control.cooling_steps(), 0);
        assert_eq!(control.steps_per_temperature(), 0);
        assert!(control.is_final_step(0));
    }

    #[test]
    fn first_cooling_step_recalibrates_from_the_median() {
        let started = Instant::now();
        let config = budgeted(100);
        let mut control = LoopControl::new(&config, started);
        let median = 2.0;

        control.update(started, 1, 10, Some(median));

        let start = -median / config.start_acceptance.ln();
        let steps = control.cooling_steps() as f64;
        let end = -median / config.end_acceptance.ln();
        let fraction = (end / start).powf(1.0 / (steps * 0.6));
        assert!((control.temperature() - start * fraction).abs() < 1e-9);
    }

    #[test]
    fn missing_deltas_keep_the_initial_temperature() {
        let started = Instant::now();
        let config = budgeted(100);
        let mut control = LoopControl::new(&config, started);

        control.update(started, 1, 10, None);

        assert_eq!(control.temperature(), config.initial_temperature);
    }

    #[test]
    fn loop_bounds_follow_the_simulation_rate() {
        let started = Instant::now();
        let config = budgeted(1_000);
        let mut control = LoopControl::new(&config, started);
        for _ in 0..500 {
            control.record_simulation();
        }

        control.update(started + Duration::from_millis(10), 3, 500, Some(1.0));

        // 500 simulations in 10 ms leaves room for 49,450 more.
        let total = 500.0 + 50_000.0 * (1_000.0 - 10.0 - 1.0) / 1_000.0;
        let expected = (total / config.steps_per_cooling_ratio).sqrt() as usize;
        assert!(control.cooling_steps().abs_diff(expected) <= 1);
        assert_eq!(
            control.steps_per_temperature(),
            (control.cooling_steps() as f64 * config.steps_per_cooling_ratio) as usize
        );
    }

    #[test]
    fn slow_simulations_still_reach_the_close_out_step() {
        let started = Instant::now();
        let mut control = LoopControl::new(&budgeted(1_000), started);
        control.record_simulation();

        // One simulation in 10 ms affords fewer cooling steps than already ran.
        control.update(started + Duration::from_millis(10), 50, 1, Some(1.0));

        assert_eq!(control.cooling_steps(), 50);
        assert!(control.is_final_step(50));
    }

    #[test]
    fn budget_runs_out_at_the_safety_buffer() {
        let started = Instant::now();
        let control = LoopControl::new(&budgeted(20), started);

        assert!(!control.out_of_time(started));
        assert!(!control.out_of_time(started + Duration::from_millis(18)));
        assert!(control.out_of_time(started + Duration::from_millis(19)));

        let unbudgeted = LoopControl::new(&AnnealingConfig::default(), started);
        assert!(!unbudgeted.out_of_time(started + Duration::from_secs(60)));
    }
}
