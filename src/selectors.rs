//! Deterministic one-ply move selectors.
//!
//! Every selector scans the candidate list in the order given and keeps the
//! first candidate with the strictly highest score, so ties always go to the
//! earliest move. Candidates that fail to execute score below every
//! executable one.

use log::warn;

use crate::board::{Board, Color, Move};
use crate::evaluator::{EvalProfile, evaluate};
use crate::rules::Rules;

/// First move in `moves` with the highest key.
fn first_max_by_key<K, F>(moves: &[Move], mut key: F) -> Option<Move>
where
    K: PartialOrd,
    F: FnMut(Move) -> K,
{
    let mut best: Option<(Move, K)> = None;
    for &mv in moves {
        let score = key(mv);
        if best.as_ref().is_none_or(|(_, best_score)| score > *best_score) {
            best = Some((mv, score));
        }
    }
    best.map(|(mv, _)| mv)
}

/// Opening selector: corner first, otherwise maximise own mobility.
///
/// Returns the first candidate that is a board corner. If none is, each
/// candidate is played on a copy of the board and the one leaving `color`
/// with the most legal moves wins. `None` only for an empty candidate list.
pub fn select_opening<R: Rules + ?Sized>(
    rules: &R,
    board: &Board,
    color: Color,
    legal_moves: &[Move],
) -> Option<Move> {
    if let Some(&corner) = legal_moves.iter().find(|&&mv| board.is_corner(mv)) {
        return Some(corner);
    }

    first_max_by_key(legal_moves, |mv| match rules.execute_move(board, mv, color) {
        Ok(next) => Some(rules.legal_moves(&next, color).len()),
        Err(err) => {
            warn!("opening candidate {mv} skipped: {err}");
            None
        }
    })
}

/// Endgame selector: the move flipping the most opponent discs.
pub fn select_endgame<R: Rules + ?Sized>(
    rules: &R,
    board: &Board,
    color: Color,
    legal_moves: &[Move],
) -> Option<Move> {
    first_max_by_key(legal_moves, |mv| rules.capture_count(board, mv, color))
}

/// Greedy midgame selector: the move whose resulting position scores best
/// under `profile`.
///
/// Returns `None` when no candidate could be executed; the caller then picks
/// a random legal move.
pub fn select_greedy<R: Rules + ?Sized>(
    rules: &R,
    board: &Board,
    color: Color,
    opponent: Color,
    legal_moves: &[Move],
    profile: EvalProfile,
) -> Option<Move> {
    let mut best: Option<(Move, f32)> = None;
    for &mv in legal_moves {
        let next = match rules.execute_move(board, mv, color) {
            Ok(next) => next,
            Err(err) => {
                warn!("greedy candidate {mv} skipped: {err}");
                continue;
            }
        };
        let score = evaluate(rules, &next, color, opponent, profile);
        if best.is_none_or(|(_, best_score)| score > best_score) {
            best = Some((mv, score));
        }
    }
    best.map(|(mv, _)| mv)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{BoardError, Cell};
    use crate::rules::StandardRules;

    /// Candidate with scripted outcomes.
    struct Scripted {
        mv: Move,
        mobility: usize,
        captures: u32,
        executable: bool,
    }

    /// Rules double: candidates are listed while none is placed; once one is
    /// on the board, `legal_moves` reports that candidate's mobility.
    struct ScriptedRules(Vec<Scripted>);

    impl ScriptedRules {
        fn moves(&self) -> Vec<Move> {
            self.0.iter().map(|s| s.mv).collect()
        }
    }

    impl Rules for ScriptedRules {
        fn legal_moves(&self, board: &Board, _: Color) -> Vec<Move> {
            match self
                .0
                .iter()
                .find(|s| board.get(s.mv.row, s.mv.col) != Some(Cell::Empty))
            {
                Some(placed) => vec![Move::new(0, 0); placed.mobility],
                None => self.moves(),
            }
        }

        fn execute_move(&self, board: &Board, mv: Move, color: Color) -> Result<Board, BoardError> {
            let scripted = self.0.iter().find(|s| s.mv == mv);
            match scripted {
                Some(s) if s.executable => {
                    let mut next = *board;
                    next.set(mv.row, mv.col, Cell::from(color))?;
                    Ok(next)
                }
                _ => Err(BoardError::InvalidMove(mv)),
            }
        }

        fn capture_count(&self, _: &Board, mv: Move, _: Color) -> u32 {
            self.0.iter().find(|s| s.mv == mv).map_or(0, |s| s.captures)
        }
    }

    fn scripted(row: usize, col: usize, mobility: usize, captures: u32) -> Scripted {
        Scripted {
            mv: Move::new(row, col),
            mobility,
            captures,
            executable: true,
        }
    }

    fn two_corner_board() -> Board {
        "
            . W B . . . . .
            . . . . . . . .
            . . . . . . . .
            . . . . . . . .
            . . . . . . . .
            . . . . . . . .
            . . . . . . . .
            . . . . . B W .
        "
        .parse()
        .unwrap()
    }

    #[test]
    fn test_opening_prefers_first_listed_corner() {
        let board = two_corner_board();
        let legal = StandardRules.legal_moves(&board, Color::Black);
        assert_eq!(legal, vec![Move::new(0, 0), Move::new(7, 7)]);

        assert_eq!(
            select_opening(&StandardRules, &board, Color::Black, &legal),
            Some(Move::new(0, 0))
        );

        let reversed: Vec<Move> = legal.iter().rev().copied().collect();
        assert_eq!(
            select_opening(&StandardRules, &board, Color::Black, &reversed),
            Some(Move::new(7, 7))
        );
    }

    #[test]
    fn test_opening_maximises_mobility() {
        let rules = ScriptedRules(vec![
            scripted(2, 2, 3, 0),
            scripted(2, 5, 6, 0),
            scripted(5, 2, 6, 0),
            scripted(5, 5, 1, 0),
        ]);
        let board = Board::empty(8).unwrap();

        let chosen = select_opening(&rules, &board, Color::Black, &rules.moves());
        assert_eq!(chosen, Some(Move::new(2, 5)));
    }

    #[test]
    fn test_opening_skips_unexecutable_candidate() {
        let mut broken = scripted(3, 3, 20, 0);
        broken.executable = false;
        let rules = ScriptedRules(vec![broken, scripted(4, 4, 2, 0)]);
        let board = Board::empty(8).unwrap();

        let chosen = select_opening(&rules, &board, Color::White, &rules.moves());
        assert_eq!(chosen, Some(Move::new(4, 4)));
    }

    #[test]
    fn test_opening_standard_start_ties_go_first() {
        // The four opening moves are symmetric, so their mobility ties.
        let board = Board::standard();
        let legal = StandardRules.legal_moves(&board, Color::Black);
        assert_eq!(
            select_opening(&StandardRules, &board, Color::Black, &legal),
            Some(Move::new(2, 3))
        );
    }

    #[test]
    fn test_endgame_picks_highest_capture() {
        let rules = ScriptedRules(vec![
            scripted(1, 1, 0, 3),
            scripted(1, 2, 0, 7),
            scripted(1, 3, 0, 5),
        ]);
        let board = Board::empty(8).unwrap();

        assert_eq!(
            select_endgame(&rules, &board, Color::Black, &rules.moves()),
            Some(Move::new(1, 2))
        );
    }

    #[test]
    fn test_endgame_ties_go_first() {
        let rules = ScriptedRules(vec![scripted(1, 1, 0, 4), scripted(2, 2, 0, 4)]);
        let board = Board::empty(8).unwrap();

        assert_eq!(
            select_endgame(&rules, &board, Color::Black, &rules.moves()),
            Some(Move::new(1, 1))
        );
    }

    #[test]
    fn test_empty_candidates() {
        let board = Board::standard();
        assert_eq!(select_opening(&StandardRules, &board, Color::Black, &[]), None);
        assert_eq!(select_endgame(&StandardRules, &board, Color::Black, &[]), None);
        assert_eq!(
            select_greedy(
                &StandardRules,
                &board,
                Color::Black,
                Color::White,
                &[],
                EvalProfile::Positional
            ),
            None
        );
    }

    #[test]
    fn test_greedy_takes_corner_under_positional_profile() {
        let board = two_corner_board();
        let legal = StandardRules.legal_moves(&board, Color::Black);
        let chosen = select_greedy(
            &StandardRules,
            &board,
            Color::Black,
            Color::White,
            &legal,
            EvalProfile::Positional,
        );
        assert!(chosen.is_some_and(|mv| board.is_corner(mv)));
    }

    #[test]
    fn test_greedy_none_when_nothing_executes() {
        let mut broken = scripted(3, 3, 0, 0);
        broken.executable = false;
        let rules = ScriptedRules(vec![broken]);
        let board = Board::empty(8).unwrap();

        assert_eq!(
            select_greedy(
                &rules,
                &board,
                Color::Black,
                Color::White,
                &rules.moves(),
                EvalProfile::DiscCorner
            ),
            None
        );
    }

    #[test]
    fn test_selectors_leave_board_untouched() {
        let board = two_corner_board();
        let before = board;
        let legal = StandardRules.legal_moves(&board, Color::Black);

        let _ = select_opening(&StandardRules, &board, Color::Black, &legal);
        let _ = select_endgame(&StandardRules, &board, Color::Black, &legal);
        let _ = select_greedy(
            &StandardRules,
            &board,
            Color::Black,
            Color::White,
            &legal,
            EvalProfile::Positional,
        );
        assert_eq!(board, before);
    }
}
