//! Self-play arena.
//!
//! Plays complete games between two contenders, either the decision engine
//! with some configuration or a uniformly random mover. Black moves first
//! from the standard four-disc start; a side with no legal move passes and
//! the game ends once neither side can move.
//!
//! `play_match` runs games in parallel on the rayon pool. Every game owns
//! its board and a `StdRng` seeded from the match seed plus the game index,
//! so a match is reproducible regardless of scheduling.

use std::fmt;

use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::board::{Board, BoardError, Color, Move};
use crate::config::EngineConfig;
use crate::engine::DecisionEngine;
use crate::rules::{Rules, StandardRules};

/// Arena errors.
#[derive(Error, Debug)]
pub enum ArenaError {
    #[error("Board error: {0}")]
    Board(#[from] BoardError),

    /// A contender produced a move the rules refused to execute.
    #[error("{color} played {mv}, which could not be executed")]
    IllegalMove {
        color: Color,
        mv: Move,
        #[source]
        source: BoardError,
    },

    /// A contender passed while holding a legal move.
    #[error("{0} passed with legal moves available")]
    UnforcedPass(Color),
}

/// One side of a game.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Contender {
    /// The decision engine.
    Engine(EngineConfig),
    /// Uniformly random legal moves.
    Random,
}

impl fmt::Display for Contender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Contender::Engine(config) => write!(f, "engine({:?})", config.midgame),
            Contender::Random => f.write_str("random"),
        }
    }
}

/// A contender bound to the rules of one game.
enum Player<'a, R: ?Sized> {
    Engine(DecisionEngine<&'a R>),
    Random,
}

impl<'a, R: Rules + ?Sized> Player<'a, R> {
    fn new(rules: &'a R, contender: &Contender) -> Self {
        match contender {
            Contender::Engine(config) => {
                Player::Engine(DecisionEngine::with_rules(rules, config.clone()))
            }
            Contender::Random => Player::Random,
        }
    }

    fn choose<G: Rng + ?Sized>(
        &self,
        rules: &R,
        board: &Board,
        color: Color,
        rng: &mut G,
    ) -> Option<Move> {
        match self {
            Player::Engine(engine) => engine.step(board, color, color.opposite(), rng),
            Player::Random => {
                let legal = rules.legal_moves(board, color);
                if legal.is_empty() {
                    None
                } else {
                    Some(legal[rng.random_range(0..legal.len())])
                }
            }
        }
    }
}

/// One ply: a move or a pass (`mv == None`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub color: Color,
    pub mv: Option<Move>,
}

/// A finished game.
#[derive(Clone, Debug, PartialEq)]
pub struct GameRecord {
    pub size: usize,
    pub turns: Vec<Turn>,
    pub final_board: Board,
    pub black_discs: usize,
    pub white_discs: usize,
}

impl GameRecord {
    /// Black discs minus White discs.
    pub fn disc_diff(&self) -> i32 {
        self.black_discs as i32 - self.white_discs as i32
    }

    /// `None` for a draw.
    pub fn winner(&self) -> Option<Color> {
        match self.black_discs.cmp(&self.white_discs) {
            std::cmp::Ordering::Greater => Some(Color::Black),
            std::cmp::Ordering::Less => Some(Color::White),
            std::cmp::Ordering::Equal => None,
        }
    }

    /// Number of passes by either side.
    pub fn passes(&self) -> usize {
        self.turns.iter().filter(|t| t.mv.is_none()).count()
    }
}

/// Play one game on a `size` board.
///
/// # Errors
///
/// `ArenaError::Board` for an invalid size, `IllegalMove` or `UnforcedPass`
/// if a contender breaks the rules.
pub fn play_game<R: Rules + ?Sized, G: Rng + ?Sized>(
    rules: &R,
    black: &Contender,
    white: &Contender,
    size: usize,
    rng: &mut G,
) -> Result<GameRecord, ArenaError> {
    let players = [Player::new(rules, black), Player::new(rules, white)];
    let mut board = Board::new(size)?;
    let mut turns = Vec::with_capacity(size * size);
    let mut color = Color::Black;

    while !rules.is_game_over(&board) {
        let player = match color {
            Color::Black => &players[0],
            Color::White => &players[1],
        };

        let mv = player.choose(rules, &board, color, rng);
        match mv {
            Some(mv) => {
                board = rules
                    .execute_move(&board, mv, color)
                    .map_err(|source| ArenaError::IllegalMove { color, mv, source })?;
            }
            None => {
                if !rules.legal_moves(&board, color).is_empty() {
                    return Err(ArenaError::UnforcedPass(color));
                }
                debug!("{color} passes");
            }
        }

        turns.push(Turn { color, mv });
        color = color.opposite();
    }

    Ok(GameRecord {
        size,
        turns,
        black_discs: board.count(Color::Black),
        white_discs: board.count(Color::White),
        final_board: board,
    })
}

/// Aggregate result of a match, from the first contender's point of view.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MatchSummary {
    pub games: usize,
    pub first_wins: usize,
    pub second_wins: usize,
    pub draws: usize,
    /// Mean of (first contender's discs - second contender's discs).
    pub avg_disc_diff: f64,
}

impl fmt::Display for MatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Games: {}, First wins: {}, Second wins: {}, Draws: {}, Avg disc diff: {:+.2}",
            self.games, self.first_wins, self.second_wins, self.draws, self.avg_disc_diff
        )
    }
}

/// Play `games` games between `first` and `second`, alternating colors.
///
/// `first` takes Black in even-numbered games and White in odd-numbered
/// ones. Game `i` uses `StdRng::seed_from_u64(seed + i)`.
pub fn play_match<R: Rules + Sync + ?Sized>(
    rules: &R,
    first: &Contender,
    second: &Contender,
    games: usize,
    size: usize,
    seed: u64,
) -> Result<MatchSummary, ArenaError> {
    info!("match: {first} vs {second}, {games} games on {size}x{size}, seed {seed}");

    let diffs: Vec<i32> = (0..games)
        .into_par_iter()
        .map(|i| -> Result<i32, ArenaError> {
            let mut rng = StdRng::seed_from_u64(seed.wrapping_add(i as u64));
            let first_is_black = i % 2 == 0;
            let record = if first_is_black {
                play_game(rules, first, second, size, &mut rng)?
            } else {
                play_game(rules, second, first, size, &mut rng)?
            };
            let diff = record.disc_diff();
            debug!("game {i}: {} turns, black - white = {diff:+}", record.turns.len());
            Ok(if first_is_black { diff } else { -diff })
        })
        .collect::<Result<_, _>>()?;

    let mut summary = MatchSummary {
        games,
        ..MatchSummary::default()
    };
    for &diff in &diffs {
        match diff.signum() {
            1 => summary.first_wins += 1,
            -1 => summary.second_wins += 1,
            _ => summary.draws += 1,
        }
    }
    if games > 0 {
        summary.avg_disc_diff = diffs.iter().map(|&d| f64::from(d)).sum::<f64>() / games as f64;
    }

    info!("match finished: {summary}");
    Ok(summary)
}

/// [`play_match`] under the standard rules.
pub fn play_standard_match(
    first: &Contender,
    second: &Contender,
    games: usize,
    size: usize,
    seed: u64,
) -> Result<MatchSummary, ArenaError> {
    play_match(&StandardRules, first, second, games, size, seed)
}
