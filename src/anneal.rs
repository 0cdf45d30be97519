//! Simulated-annealing midgame selector.
//!
//! The candidate set is the root legal-move list, fixed for the whole run.
//! Each iteration samples one candidate uniformly, plays it on a copy of the
//! current simulated board and accepts it when the energy rises, or with
//! probability `exp(delta / T)` otherwise. The temperature then cools
//! geometrically. The last accepted candidate is the answer.
//!
//! Because the simulated board advances while the candidate set does not,
//! a sampled move can stop being playable (its cell taken, nothing left to
//! flip). Such samples are counted as skipped and never accepted.
//!
//! With the default schedule (100 → 1 at 0.95) the loop runs exactly 90
//! iterations. An optional deadline cuts the run short and keeps the best
//! move found so far.

use std::fmt;
use std::time::Instant;

use log::{debug, trace};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::board::{Board, Color, Move};
use crate::evaluator::{EvalProfile, evaluate};
use crate::rules::Rules;

/// Starting temperature.
pub const DEFAULT_INITIAL_TEMPERATURE: f64 = 100.0;

/// Geometric cooling factor applied after every iteration.
pub const DEFAULT_COOLING_RATE: f64 = 0.95;

/// The loop runs while the temperature stays above this.
pub const DEFAULT_MIN_TEMPERATURE: f64 = 1.0;

/// Hard iteration cap for schedules that would otherwise never cool.
pub const MAX_ITERATIONS: u32 = 1_000_000;

/// Geometric cooling schedule.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnnealingSchedule {
    pub initial_temperature: f64,
    pub cooling_rate: f64,
    pub min_temperature: f64,
}

impl Default for AnnealingSchedule {
    fn default() -> Self {
        Self {
            initial_temperature: DEFAULT_INITIAL_TEMPERATURE,
            cooling_rate: DEFAULT_COOLING_RATE,
            min_temperature: DEFAULT_MIN_TEMPERATURE,
        }
    }
}

impl AnnealingSchedule {
    /// Number of iterations the loop runs when nothing cuts it short.
    ///
    /// # Examples
    ///
    /// ```
    /// use othello_agent::anneal::AnnealingSchedule;
    ///
    /// assert_eq!(AnnealingSchedule::default().iterations(), 90);
    /// ```
    pub fn iterations(&self) -> u32 {
        let mut temperature = self.initial_temperature;
        let mut iterations = 0;
        while temperature > self.min_temperature && iterations < MAX_ITERATIONS {
            iterations += 1;
            temperature *= self.cooling_rate;
        }
        iterations
    }
}

/// Outcome of one annealing run.
#[derive(Clone, Debug, PartialEq)]
pub struct AnnealReport {
    /// Last accepted candidate, `None` if nothing was ever accepted.
    pub best_move: Option<Move>,
    /// Loop iterations performed.
    pub iterations: u32,
    /// Accepted candidates.
    pub accepted: u32,
    /// Sampled candidates that could not be played on the simulated board.
    pub skipped: u32,
    /// Energy of the final simulated board.
    pub final_energy: f32,
    /// Temperature when the loop stopped.
    pub final_temperature: f64,
    /// True if the deadline ended the run.
    pub deadline_hit: bool,
}

impl fmt::Display for AnnealReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let best = match self.best_move {
            Some(mv) => mv.to_string(),
            None => "none".to_string(),
        };
        write!(
            f,
            "Move: {}, Iterations: {}, Accepted: {}, Skipped: {}, Energy: {:.1}, T: {:.3}{}",
            best,
            self.iterations,
            self.accepted,
            self.skipped,
            self.final_energy,
            self.final_temperature,
            if self.deadline_hit { " (deadline)" } else { "" }
        )
    }
}

/// Annealing search context.
pub struct Annealer<'a, R: ?Sized> {
    rules: &'a R,
    profile: EvalProfile,
    schedule: AnnealingSchedule,
    deadline: Option<Instant>,
}

impl<'a, R: Rules + ?Sized> Annealer<'a, R> {
    pub fn new(rules: &'a R, profile: EvalProfile, schedule: AnnealingSchedule) -> Self {
        Self {
            rules,
            profile,
            schedule,
            deadline: None,
        }
    }

    /// Stop at `deadline` and keep the best move so far.
    pub fn with_deadline(mut self, deadline: Option<Instant>) -> Self {
        self.deadline = deadline;
        self
    }

    /// Run the cooling loop over `legal_moves` for `color`.
    ///
    /// `board` is copied; the caller's value is never touched.
    pub fn run<G: Rng + ?Sized>(
        &self,
        board: &Board,
        color: Color,
        opponent: Color,
        legal_moves: &[Move],
        rng: &mut G,
    ) -> AnnealReport {
        let mut current = *board;
        let mut current_energy = evaluate(self.rules, &current, color, opponent, self.profile);
        let mut temperature = self.schedule.initial_temperature;
        let mut report = AnnealReport {
            best_move: None,
            iterations: 0,
            accepted: 0,
            skipped: 0,
            final_energy: current_energy,
            final_temperature: temperature,
            deadline_hit: false,
        };

        while temperature > self.schedule.min_temperature && report.iterations < MAX_ITERATIONS {
            if legal_moves.is_empty() {
                break;
            }
            if let Some(deadline) = self.deadline {
                if Instant::now() >= deadline {
                    report.deadline_hit = true;
                    break;
                }
            }

            let mv = legal_moves[rng.random_range(0..legal_moves.len())];
            report.iterations += 1;

            match self.rules.execute_move(&current, mv, color) {
                Ok(candidate) => {
                    let energy = evaluate(self.rules, &candidate, color, opponent, self.profile);
                    let delta = f64::from(energy - current_energy);
                    if delta > 0.0 || rng.random::<f64>() < (delta / temperature).exp() {
                        trace!("T={temperature:.3} accept {mv} (dE={delta:+.1})");
                        current = candidate;
                        current_energy = energy;
                        report.best_move = Some(mv);
                        report.accepted += 1;
                    } else {
                        trace!("T={temperature:.3} reject {mv} (dE={delta:+.1})");
                    }
                }
                Err(err) => {
                    trace!("T={temperature:.3} skip {mv}: {err}");
                    report.skipped += 1;
                }
            }

            temperature *= self.schedule.cooling_rate;
        }

        report.final_energy = current_energy;
        report.final_temperature = temperature;
        debug!("annealing for {color}: {report}");
        report
    }
}

/// Annealing with the default schedule, the disc-and-corner profile and no
/// deadline. `None` means no candidate was accepted.
pub fn select_midgame<R: Rules + ?Sized, G: Rng + ?Sized>(
    rules: &R,
    board: &Board,
    color: Color,
    opponent: Color,
    legal_moves: &[Move],
    rng: &mut G,
) -> Option<Move> {
    Annealer::new(rules, EvalProfile::DiscCorner, AnnealingSchedule::default())
        .run(board, color, opponent, legal_moves, rng)
        .best_move
}
