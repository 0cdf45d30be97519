//! othello-agent - フェーズ別オセロ着手決定エンジン
//!
//! 空きマス数で序盤・中盤・終盤を判定し、フェーズごとの戦略で1手を選ぶ。
//!
//! - 序盤: 隅を優先、なければ自分の着手可能数を最大化
//! - 中盤: 焼きなまし法（または1手読みの貪欲法）
//! - 終盤: 返せる石の数を最大化
//!
//! 合法手がなければ`None`（パス）を返す。それ以外は必ず合法手を返す。
//!
//! # Examples
//!
//! ```
//! use othello_agent::{Board, Color, DecisionEngine, EngineConfig};
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//!
//! let engine = DecisionEngine::new(EngineConfig::default());
//! let board = Board::standard();
//! let mut rng = StdRng::seed_from_u64(1);
//!
//! let mv = engine.step(&board, Color::Black, Color::White, &mut rng).unwrap();
//! assert!(othello_agent::legal_moves(&board, Color::Black).contains(&mv));
//! ```

pub mod anneal;
pub mod arena;
pub mod board;
pub mod config;
pub mod engine;
pub mod evaluator;
pub mod phase;
pub mod rules;
pub mod selectors;

pub use board::{Board, BoardError, Cell, Color, Move, execute_move, legal_moves};
pub use config::{ConfigError, EngineConfig};
pub use engine::{Decision, DecisionEngine, MidgameStrategy, Selector};
pub use evaluator::EvalProfile;
pub use phase::{Phase, classify};
pub use rules::{Rules, StandardRules};
