//! ヒューリスティック評価関数
//!
//! 2つの評価プロファイルを持つ。
//!
//! - `DiscCorner`: 石差 + 隅1つにつき±5（焼きなまし探索のエネルギー関数）
//! - `Positional`: 隅1つにつき±25、相手の合法手1つにつき-2、安定石1つにつき+5
//!
//! いずれも盤面を変更しない純粋関数。値が大きいほど`color`側に有利。

use crate::board::{Board, Cell, Color, Move};
use crate::rules::Rules;
use serde::{Deserialize, Serialize};

/// `Positional`での隅の重み
pub const CORNER_WEIGHT: f32 = 25.0;

/// `DiscCorner`での隅の重み
pub const DISC_CORNER_WEIGHT: f32 = 5.0;

/// 相手の合法手1つあたりの重み
pub const MOBILITY_WEIGHT: f32 = -2.0;

/// 安定石1つあたりの重み
pub const STABILITY_WEIGHT: f32 = 5.0;

/// 評価プロファイル
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvalProfile {
    /// 石差 + 隅（±5）
    #[default]
    DiscCorner,
    /// 隅（±25） + 相手の着手可能数 + 安定石
    Positional,
}

/// 盤面を`color`視点で評価
///
/// `other`は相手の色。`Positional`のみ`rules`で相手の合法手数を数える。
///
/// # Examples
///
/// ```
/// use othello_agent::board::{Board, Color};
/// use othello_agent::evaluator::{EvalProfile, evaluate};
/// use othello_agent::rules::StandardRules;
///
/// let board = Board::standard();
/// let score = evaluate(&StandardRules, &board, Color::Black, Color::White, EvalProfile::DiscCorner);
/// assert_eq!(score, 0.0);
/// ```
pub fn evaluate<R: Rules + ?Sized>(
    rules: &R,
    board: &Board,
    color: Color,
    other: Color,
    profile: EvalProfile,
) -> f32 {
    match profile {
        EvalProfile::DiscCorner => disc_corner_score(board, color, other),
        EvalProfile::Positional => positional_score(rules, board, color, other),
    }
}

/// 石差 + 隅（±5）
pub fn disc_corner_score(board: &Board, color: Color, other: Color) -> f32 {
    let discs = board.count(color) as f32 - board.count(other) as f32;
    discs + corner_balance(board, color, other) as f32 * DISC_CORNER_WEIGHT
}

/// 隅（±25） + 相手の合法手（-2） + 安定石（+5）
pub fn positional_score<R: Rules + ?Sized>(
    rules: &R,
    board: &Board,
    color: Color,
    other: Color,
) -> f32 {
    let corners = corner_balance(board, color, other) as f32 * CORNER_WEIGHT;
    let mobility = rules.legal_moves(board, other).len() as f32 * MOBILITY_WEIGHT;
    let stability = count_stable_discs(board, color) as f32 * STABILITY_WEIGHT;
    corners + mobility + stability
}

/// 自分の隅の数 - 相手の隅の数
fn corner_balance(board: &Board, color: Color, other: Color) -> i32 {
    let own = Cell::from(color);
    let theirs = Cell::from(other);
    board
        .corners()
        .iter()
        .map(|c| match board.cell(c.row, c.col) {
            cell if cell == own => 1,
            cell if cell == theirs => -1,
            _ => 0,
        })
        .sum()
}

/// 安定石の判定
///
/// 外周（最上行、最下行、最左列、最右列）にある`color`の石を安定とみなし、
/// 内側の石は周囲に関係なく不安定とする。挟まれ方を見ない保守的な近似。
pub fn is_stable(board: &Board, position: Move, color: Color) -> bool {
    board.get(position.row, position.col) == Some(Cell::from(color))
        && board.is_border(position.row, position.col)
}

/// `color`の安定石の数
pub fn count_stable_discs(board: &Board, color: Color) -> usize {
    let n = board.size();
    (0..n)
        .flat_map(|row| (0..n).map(move |col| Move::new(row, col)))
        .filter(|&mv| is_stable(board, mv, color))
        .count()
}
