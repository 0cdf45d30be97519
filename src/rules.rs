//! Board-rules seam consumed by the decision engine.
//!
//! The engine never enumerates moves or flips discs itself; it asks a
//! [`Rules`] implementation. [`StandardRules`] forwards to the functions in
//! [`crate::board`]. Tests substitute their own implementation to pin down
//! capture counts or to inject candidates that fail to execute.

use crate::board::{self, Board, BoardError, Color, Move};

/// Game-rule operations the selectors depend on.
pub trait Rules {
    /// All positions where `color` may legally place a disc, in row-major order.
    /// Empty means `color` must pass.
    fn legal_moves(&self, board: &Board, color: Color) -> Vec<Move>;

    /// The board after `color` plays `mv`. The input board is left untouched.
    fn execute_move(&self, board: &Board, mv: Move, color: Color) -> Result<Board, BoardError>;

    /// Number of opponent discs `mv` would flip for `color`.
    fn capture_count(&self, board: &Board, mv: Move, color: Color) -> u32;

    /// True when neither side has a legal move.
    fn is_game_over(&self, board: &Board) -> bool {
        self.legal_moves(board, Color::Black).is_empty()
            && self.legal_moves(board, Color::White).is_empty()
    }
}

/// Standard Othello capture rules.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StandardRules;

impl Rules for StandardRules {
    #[inline]
    fn legal_moves(&self, board: &Board, color: Color) -> Vec<Move> {
        board::legal_moves(board, color)
    }

    #[inline]
    fn execute_move(&self, board: &Board, mv: Move, color: Color) -> Result<Board, BoardError> {
        board::execute_move(board, mv, color)
    }

    #[inline]
    fn capture_count(&self, board: &Board, mv: Move, color: Color) -> u32 {
        board::capture_count(board, mv, color)
    }

    #[inline]
    fn is_game_over(&self, board: &Board) -> bool {
        board::is_game_over(board)
    }
}

impl<R: Rules + ?Sized> Rules for &R {
    fn legal_moves(&self, board: &Board, color: Color) -> Vec<Move> {
        (**self).legal_moves(board, color)
    }

    fn execute_move(&self, board: &Board, mv: Move, color: Color) -> Result<Board, BoardError> {
        (**self).execute_move(board, mv, color)
    }

    fn capture_count(&self, board: &Board, mv: Move, color: Color) -> u32 {
        (**self).capture_count(board, mv, color)
    }

    fn is_game_over(&self, board: &Board) -> bool {
        (**self).is_game_over(board)
    }
}
