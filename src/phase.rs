//! ゲームフェーズ判定
//!
//! 空きマス数だけでOpening / Midgame / Endgameを決める。閾値は固定。

use crate::board::Board;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 空きマスがこれより多ければ序盤
pub const OPENING_EMPTY_THRESHOLD: usize = 40;

/// 空きマスがこれ以下なら終盤
pub const ENDGAME_EMPTY_THRESHOLD: usize = 10;

/// ゲームフェーズ
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// 空き > 40
    Opening,
    /// 10 < 空き ≤ 40
    Midgame,
    /// 空き ≤ 10
    Endgame,
}

impl Phase {
    /// 空きマス数からフェーズを計算
    ///
    /// # Examples
    ///
    /// ```
    /// use othello_agent::phase::Phase;
    ///
    /// assert_eq!(Phase::from_empty_count(41), Phase::Opening);
    /// assert_eq!(Phase::from_empty_count(40), Phase::Midgame);
    /// assert_eq!(Phase::from_empty_count(11), Phase::Midgame);
    /// assert_eq!(Phase::from_empty_count(10), Phase::Endgame);
    /// ```
    #[inline]
    pub fn from_empty_count(empty: usize) -> Phase {
        if empty > OPENING_EMPTY_THRESHOLD {
            Phase::Opening
        } else if empty > ENDGAME_EMPTY_THRESHOLD {
            Phase::Midgame
        } else {
            Phase::Endgame
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Opening => f.write_str("opening"),
            Phase::Midgame => f.write_str("midgame"),
            Phase::Endgame => f.write_str("endgame"),
        }
    }
}

/// 盤面のフェーズを判定
#[inline]
pub fn classify(board: &Board) -> Phase {
    Phase::from_empty_count(board.empty_count())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_start_is_opening() {
        assert_eq!(classify(&Board::standard()), Phase::Opening);
    }

    #[test]
    fn test_boundaries() {
        assert_eq!(Phase::from_empty_count(64), Phase::Opening);
        assert_eq!(Phase::from_empty_count(41), Phase::Opening);
        assert_eq!(Phase::from_empty_count(40), Phase::Midgame);
        assert_eq!(Phase::from_empty_count(11), Phase::Midgame);
        assert_eq!(Phase::from_empty_count(10), Phase::Endgame);
        assert_eq!(Phase::from_empty_count(0), Phase::Endgame);
    }

    #[test]
    fn test_small_board_starts_in_midgame() {
        // 6×6の初期盤面は空き32
        let board = Board::new(6).unwrap();
        assert_eq!(board.empty_count(), 32);
        assert_eq!(classify(&board), Phase::Midgame);
    }
}
