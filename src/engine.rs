//! Decision engine.
//!
//! `DecisionEngine::step` is the whole contract offered to a game runner:
//! given a board and the two colors it returns a legal move, or `None` to
//! pass. Passing happens only when the mover has no legal move.
//!
//! ```text
//! step
//!   |-- Rules::legal_moves        (empty -> pass)
//!   |-- phase::classify
//!   |-- Selector
//!   |     |-- Opening   -> selectors::select_opening
//!   |     |-- Annealing -> anneal::Annealer      (random fallback)
//!   |     |-- Greedy    -> selectors::select_greedy (random fallback)
//!   |     |-- Endgame   -> selectors::select_endgame
//!   |-- legality check on the result
//! ```
//!
//! The engine keeps no state between calls. Randomness comes from the
//! generator the caller passes in, so seeded runs are reproducible.

use std::fmt;
use std::time::{Duration, Instant};

use log::{debug, error, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::anneal::{AnnealReport, Annealer};
use crate::board::{Board, Color, Move};
use crate::config::EngineConfig;
use crate::phase::{Phase, classify};
use crate::rules::{Rules, StandardRules};
use crate::selectors::{select_endgame, select_greedy, select_opening};

/// How the midgame picks its move.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MidgameStrategy {
    /// Simulated annealing over the legal moves.
    #[default]
    Annealing,
    /// One-ply best evaluation.
    Greedy,
}

/// Move selection strategy for one decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Selector {
    Opening,
    Annealing,
    Greedy,
    Endgame,
}

impl Selector {
    /// Strategy used for `phase`.
    pub fn for_phase(phase: Phase, midgame: MidgameStrategy) -> Selector {
        match (phase, midgame) {
            (Phase::Opening, _) => Selector::Opening,
            (Phase::Midgame, MidgameStrategy::Annealing) => Selector::Annealing,
            (Phase::Midgame, MidgameStrategy::Greedy) => Selector::Greedy,
            (Phase::Endgame, _) => Selector::Endgame,
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Selector::Opening => "opening",
            Selector::Annealing => "annealing",
            Selector::Greedy => "greedy",
            Selector::Endgame => "endgame",
        };
        f.write_str(name)
    }
}

/// Result of one decision with the data behind it.
#[derive(Clone, Debug, PartialEq)]
pub struct Decision {
    /// Chosen move, `None` for a pass.
    pub mv: Option<Move>,
    /// Phase of the input board.
    pub phase: Phase,
    /// Strategy that ran, `None` for a pass.
    pub selector: Option<Selector>,
    /// Number of legal moves available.
    pub legal_count: usize,
    /// True if the move was drawn at random because the selector gave none.
    pub random_fallback: bool,
    /// Annealing statistics when the annealing selector ran.
    pub anneal: Option<AnnealReport>,
    /// Wall-clock time spent.
    pub elapsed: Duration,
}

/// Phase-aware move selector.
#[derive(Clone, Debug, Default)]
pub struct DecisionEngine<R = StandardRules> {
    rules: R,
    config: EngineConfig,
}

impl DecisionEngine<StandardRules> {
    /// Engine using the standard Othello rules.
    pub fn new(config: EngineConfig) -> Self {
        Self::with_rules(StandardRules, config)
    }
}

impl<R: Rules> DecisionEngine<R> {
    /// Engine backed by a custom rules implementation.
    pub fn with_rules(rules: R, config: EngineConfig) -> Self {
        Self { rules, config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn rules(&self) -> &R {
        &self.rules
    }

    /// Choose a move for `color`, or `None` to pass.
    ///
    /// # Examples
    ///
    /// ```
    /// use othello_agent::board::{Board, Color, Move};
    /// use othello_agent::config::EngineConfig;
    /// use othello_agent::engine::DecisionEngine;
    /// use rand::SeedableRng;
    /// use rand::rngs::StdRng;
    ///
    /// let engine = DecisionEngine::new(EngineConfig::default());
    /// let mut rng = StdRng::seed_from_u64(0);
    /// let mv = engine.step(&Board::standard(), Color::Black, Color::White, &mut rng);
    /// assert_eq!(mv, Some(Move::new(2, 3)));
    /// ```
    pub fn step<G: Rng + ?Sized>(
        &self,
        board: &Board,
        color: Color,
        opponent: Color,
        rng: &mut G,
    ) -> Option<Move> {
        self.decide(board, color, opponent, rng).mv
    }

    /// Same as [`step`](Self::step) but returns the full [`Decision`].
    pub fn decide<G: Rng + ?Sized>(
        &self,
        board: &Board,
        color: Color,
        opponent: Color,
        rng: &mut G,
    ) -> Decision {
        let start = Instant::now();
        let budget = self.config.move_time_ms.map(Duration::from_millis);
        let deadline = budget.map(|b| start + b);

        let legal = self.rules.legal_moves(board, color);
        let phase = classify(board);

        if legal.is_empty() {
            debug!("{color} has no legal move in the {phase}, passing");
            return Decision {
                mv: None,
                phase,
                selector: None,
                legal_count: 0,
                random_fallback: false,
                anneal: None,
                elapsed: start.elapsed(),
            };
        }

        let selector = Selector::for_phase(phase, self.config.midgame);
        let mut anneal = None;
        let chosen = match selector {
            Selector::Opening => select_opening(&self.rules, board, color, &legal),
            Selector::Endgame => select_endgame(&self.rules, board, color, &legal),
            Selector::Greedy => select_greedy(
                &self.rules,
                board,
                color,
                opponent,
                &legal,
                self.config.profile,
            ),
            Selector::Annealing => {
                let report = Annealer::new(&self.rules, self.config.profile, self.config.schedule)
                    .with_deadline(deadline)
                    .run(board, color, opponent, &legal, rng);
                let best = report.best_move;
                anneal = Some(report);
                best
            }
        };

        let mut random_fallback = false;
        let mv = match chosen {
            Some(mv) if legal.contains(&mv) => mv,
            Some(mv) => {
                error!("{selector} selector returned {mv}, which is not legal for {color}");
                random_fallback = true;
                random_move(&legal, rng)
            }
            None => {
                debug!("{selector} selector gave no move, drawing a random legal move");
                random_fallback = true;
                random_move(&legal, rng)
            }
        };

        let elapsed = start.elapsed();
        if let Some(budget) = budget {
            if elapsed > budget {
                warn!(
                    "decision for {color} took {:.1}ms, over the {}ms budget",
                    elapsed.as_secs_f64() * 1000.0,
                    budget.as_millis()
                );
            }
        }
        debug!(
            "{color}: {phase} ({} empty), {selector} picked {mv} of {} moves in {:.2}ms",
            board.empty_count(),
            legal.len(),
            elapsed.as_secs_f64() * 1000.0
        );

        Decision {
            mv: Some(mv),
            phase,
            selector: Some(selector),
            legal_count: legal.len(),
            random_fallback,
            anneal,
            elapsed,
        }
    }
}

/// Uniformly random element of a non-empty move list.
fn random_move<G: Rng + ?Sized>(legal: &[Move], rng: &mut G) -> Move {
    legal[rng.random_range(0..legal.len())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{BoardError, legal_moves};
    use crate::evaluator::EvalProfile;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn untimed(midgame: MidgameStrategy) -> EngineConfig {
        EngineConfig {
            midgame,
            move_time_ms: None,
            ..EngineConfig::default()
        }
    }

    fn midgame_board() -> Board {
        "
            . . . . . . . .
            . . W W W B . .
            . B B W B B W .
            . W B W W B W .
            . B W W B B B .
            . W B B W B . .
            . . B W W W . .
            . . . . . . . .
        "
        .parse()
        .unwrap()
    }

    #[test]
    fn test_selector_for_phase() {
        use MidgameStrategy::*;
        assert_eq!(Selector::for_phase(Phase::Opening, Greedy), Selector::Opening);
        assert_eq!(Selector::for_phase(Phase::Midgame, Annealing), Selector::Annealing);
        assert_eq!(Selector::for_phase(Phase::Midgame, Greedy), Selector::Greedy);
        assert_eq!(Selector::for_phase(Phase::Endgame, Annealing), Selector::Endgame);
    }

    #[test]
    fn test_pass_when_no_legal_move() {
        let board = Board::from_cells(&vec![vec![1u8; 8]; 8]).unwrap();
        let engine = DecisionEngine::new(untimed(MidgameStrategy::Annealing));
        let mut rng = StdRng::seed_from_u64(0);

        let decision = engine.decide(&board, Color::White, Color::Black, &mut rng);
        assert_eq!(decision.mv, None);
        assert_eq!(decision.selector, None);
        assert_eq!(decision.phase, Phase::Endgame);
    }

    #[test]
    fn test_opening_start_position() {
        let engine = DecisionEngine::new(untimed(MidgameStrategy::Annealing));
        let mut rng = StdRng::seed_from_u64(0);

        let decision = engine.decide(&Board::standard(), Color::Black, Color::White, &mut rng);
        assert_eq!(decision.phase, Phase::Opening);
        assert_eq!(decision.selector, Some(Selector::Opening));
        assert_eq!(decision.legal_count, 4);
        assert_eq!(decision.mv, Some(Move::new(2, 3)));
        assert!(!decision.random_fallback);
    }

    #[test]
    fn test_midgame_annealing_reports() {
        let board = midgame_board();
        assert_eq!(classify(&board), Phase::Midgame);
        let engine = DecisionEngine::new(untimed(MidgameStrategy::Annealing));
        let legal = legal_moves(&board, Color::Black);

        for seed in 0..10 {
            let mut rng = StdRng::seed_from_u64(seed);
            let decision = engine.decide(&board, Color::Black, Color::White, &mut rng);
            assert_eq!(decision.selector, Some(Selector::Annealing));
            let report = decision.anneal.expect("annealing report");
            assert_eq!(report.iterations, 90);
            assert!(legal.contains(&decision.mv.unwrap()));
        }
    }

    #[test]
    fn test_midgame_greedy() {
        let board = midgame_board();
        let config = EngineConfig {
            profile: EvalProfile::Positional,
            ..untimed(MidgameStrategy::Greedy)
        };
        let engine = DecisionEngine::new(config);
        let mut rng = StdRng::seed_from_u64(0);

        let decision = engine.decide(&board, Color::White, Color::Black, &mut rng);
        assert_eq!(decision.selector, Some(Selector::Greedy));
        assert!(decision.anneal.is_none());
        assert!(!decision.random_fallback);
        assert!(legal_moves(&board, Color::White).contains(&decision.mv.unwrap()));
    }

    #[test]
    fn test_step_does_not_mutate_board() {
        let board = midgame_board();
        let before = board;
        let engine = DecisionEngine::new(untimed(MidgameStrategy::Annealing));
        let mut rng = StdRng::seed_from_u64(9);

        let _ = engine.step(&board, Color::Black, Color::White, &mut rng);
        let _ = engine.step(&board, Color::White, Color::Black, &mut rng);
        assert_eq!(board, before);
    }

    /// Rules that list a move which then never executes.
    struct Unplayable;

    impl Rules for Unplayable {
        fn legal_moves(&self, _: &Board, _: Color) -> Vec<Move> {
            vec![Move::new(1, 1), Move::new(2, 2)]
        }
        fn execute_move(&self, _: &Board, mv: Move, _: Color) -> Result<Board, BoardError> {
            Err(BoardError::InvalidMove(mv))
        }
        fn capture_count(&self, _: &Board, _: Move, _: Color) -> u32 {
            0
        }
    }

    #[test]
    fn test_random_fallback_when_annealing_accepts_nothing() {
        let board = midgame_board();
        let engine = DecisionEngine::with_rules(Unplayable, untimed(MidgameStrategy::Annealing));
        let mut rng = StdRng::seed_from_u64(4);

        let decision = engine.decide(&board, Color::Black, Color::White, &mut rng);
        assert!(decision.random_fallback);
        assert_eq!(decision.anneal.map(|r| r.skipped), Some(90));
        assert!(matches!(decision.mv, Some(mv) if mv == Move::new(1, 1) || mv == Move::new(2, 2)));
    }

    /// Standard rules except that every move reports one capture.
    struct FlatCaptures;

    impl Rules for FlatCaptures {
        fn legal_moves(&self, board: &Board, color: Color) -> Vec<Move> {
            legal_moves(board, color)
        }
        fn execute_move(&self, board: &Board, mv: Move, color: Color) -> Result<Board, BoardError> {
            crate::board::execute_move(board, mv, color)
        }
        fn capture_count(&self, _: &Board, _: Move, _: Color) -> u32 {
            1
        }
    }

    #[test]
    fn test_engine_with_borrowed_rules() {
        let rules = StandardRules;
        let engine = DecisionEngine::with_rules(&rules, EngineConfig::default());
        let mut rng = StdRng::seed_from_u64(2);
        assert_eq!(
            engine.step(&Board::standard(), Color::White, Color::Black, &mut rng),
            Some(Move::new(2, 4))
        );
        assert_eq!(engine.rules(), &&StandardRules);
    }

    #[test]
    fn test_endgame_uses_capture_counts() {
        // Every move ties at one capture, so the first legal move wins.
        let rows = vec![
            vec![0u8, 2, 1, 1, 1, 1, 1, 1],
            vec![1; 8],
            vec![1; 8],
            vec![1; 8],
            vec![1; 8],
            vec![1; 8],
            vec![1, 1, 1, 1, 1, 1, 0, 0],
            vec![1, 1, 1, 1, 1, 1, 2, 0],
        ];
        let board = Board::from_cells(&rows).unwrap();
        assert_eq!(classify(&board), Phase::Endgame);

        let engine = DecisionEngine::with_rules(FlatCaptures, untimed(MidgameStrategy::Annealing));
        let mut rng = StdRng::seed_from_u64(0);
        let decision = engine.decide(&board, Color::Black, Color::White, &mut rng);

        assert_eq!(decision.selector, Some(Selector::Endgame));
        assert_eq!(decision.mv, legal_moves(&board, Color::Black).first().copied());
    }
}
