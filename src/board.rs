//! 盤面表現とオセロの基本ルール
//!
//! N×N盤面を色ごとの行ビットマスクで保持する。`Board`は`Copy`であり、
//! 着手のシミュレーションは常に呼び出し元とは独立したコピー上で行う。
//! 座標は(row, col)、row 0が上端、col 0が左端。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// 盤面の最小サイズ
pub const MIN_SIZE: usize = 4;

/// 盤面の最大サイズ（行マスクがu16のため）
pub const MAX_SIZE: usize = 16;

/// 標準盤面サイズ
pub const STANDARD_SIZE: usize = 8;

/// 8方向（行差分, 列差分）
const DIRECTIONS: [(i32, i32); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// 盤面操作のエラー型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    /// サイズが範囲外、または初期配置に必要な偶数でない
    #[error("Invalid board size: {0}")]
    InvalidSize(usize),

    /// 行の長さが盤面サイズと一致しない
    #[error("Board is not square: row {row} has {len} cells, expected {expected}")]
    NotSquare {
        row: usize,
        len: usize,
        expected: usize,
    },

    /// 0/1/2以外のセル値
    #[error("Invalid cell value {value} at ({row}, {col})")]
    InvalidCell { row: usize, col: usize, value: u8 },

    /// 盤外の座標
    #[error("Position out of bounds: {0}")]
    OutOfBounds(Move),

    /// 既に石が置かれている
    #[error("Cell already occupied: {0}")]
    Occupied(Move),

    /// 1枚も返せない着手
    #[error("Invalid move: {0}")]
    InvalidMove(Move),

    /// テキスト表現のパースエラー
    #[error("Board parse error: {0}")]
    Parse(String),
}

/// 石の色
///
/// 外部表現は0=空、1=黒、2=白。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Color {
    /// 黒石（先手）
    Black = 1,
    /// 白石
    White = 2,
}

impl Color {
    /// 反対の色を返す
    ///
    /// # Examples
    ///
    /// ```
    /// use othello_agent::board::Color;
    ///
    /// assert_eq!(Color::Black.opposite(), Color::White);
    /// assert_eq!(Color::White.opposite(), Color::Black);
    /// ```
    #[inline]
    pub fn opposite(self) -> Color {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }

    /// 外部表現のコード（1または2）
    #[inline]
    pub fn code(self) -> u8 {
        self as u8
    }

    /// コードから色を復元（1=黒、2=白、それ以外はNone）
    #[inline]
    pub fn from_code(code: u8) -> Option<Color> {
        match code {
            1 => Some(Color::Black),
            2 => Some(Color::White),
            _ => None,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Black => f.write_str("black"),
            Color::White => f.write_str("white"),
        }
    }
}

impl FromStr for Color {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "black" | "b" | "1" => Ok(Color::Black),
            "white" | "w" | "2" => Ok(Color::White),
            other => Err(BoardError::Parse(format!("unknown color '{other}'"))),
        }
    }
}

/// セルの状態
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Cell {
    Empty,
    Black,
    White,
}

impl Cell {
    /// セルを占める色（空ならNone）
    #[inline]
    pub fn color(self) -> Option<Color> {
        match self {
            Cell::Empty => None,
            Cell::Black => Some(Color::Black),
            Cell::White => Some(Color::White),
        }
    }

    /// 外部表現のコード（0/1/2）
    #[inline]
    pub fn code(self) -> u8 {
        match self {
            Cell::Empty => 0,
            Cell::Black => 1,
            Cell::White => 2,
        }
    }

    fn symbol(self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::Black => 'B',
            Cell::White => 'W',
        }
    }
}

impl From<Color> for Cell {
    #[inline]
    fn from(color: Color) -> Self {
        match color {
            Color::Black => Cell::Black,
            Color::White => Cell::White,
        }
    }
}

/// 着手位置 (row, col)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Move {
    pub row: usize,
    pub col: usize,
}

impl Move {
    #[inline]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

impl From<(usize, usize)> for Move {
    fn from((row, col): (usize, usize)) -> Self {
        Self::new(row, col)
    }
}

/// N×N盤面
///
/// 黒石と白石をそれぞれ行ごとのu16ビットマスクで表現する。
/// 行rの列cはビット`1 << c`。サイズ外の行・列は常に0。
/// 66バイトの値型なので、候補手ごとのコピーはヒープ確保を伴わない。
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Board {
    size: u8,
    black: [u16; MAX_SIZE],
    white: [u16; MAX_SIZE],
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Board")
            .field("size", &self.size)
            .field("black", &self.count(Color::Black))
            .field("white", &self.count(Color::White))
            .field("empty", &self.empty_count())
            .finish()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.size();
        for row in 0..n {
            for col in 0..n {
                if col > 0 {
                    f.write_str(" ")?;
                }
                write!(f, "{}", self.cell(row, col).symbol())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl Board {
    /// 初期盤面を生成
    ///
    /// 中央4マスに標準配置（左上と右下が白、右上と左下が黒）。
    ///
    /// # Errors
    ///
    /// サイズが`MIN_SIZE..=MAX_SIZE`外、または奇数の場合`BoardError::InvalidSize`。
    ///
    /// # Examples
    ///
    /// ```
    /// use othello_agent::board::{Board, Color};
    ///
    /// let board = Board::new(8).unwrap();
    /// assert_eq!(board.count(Color::Black), 2);
    /// assert_eq!(board.count(Color::White), 2);
    /// assert_eq!(board.empty_count(), 60);
    /// ```
    pub fn new(size: usize) -> Result<Self, BoardError> {
        if size % 2 != 0 {
            return Err(BoardError::InvalidSize(size));
        }
        let mut board = Self::empty(size)?;
        let mid = size / 2;
        board.put(mid - 1, mid - 1, Cell::White);
        board.put(mid, mid, Cell::White);
        board.put(mid - 1, mid, Cell::Black);
        board.put(mid, mid - 1, Cell::Black);
        Ok(board)
    }

    /// 空の盤面を生成
    pub fn empty(size: usize) -> Result<Self, BoardError> {
        if !(MIN_SIZE..=MAX_SIZE).contains(&size) {
            return Err(BoardError::InvalidSize(size));
        }
        Ok(Self {
            size: size as u8,
            black: [0; MAX_SIZE],
            white: [0; MAX_SIZE],
        })
    }

    /// 8×8の標準初期盤面
    pub fn standard() -> Self {
        let mid = STANDARD_SIZE / 2;
        let mut board = Self {
            size: STANDARD_SIZE as u8,
            black: [0; MAX_SIZE],
            white: [0; MAX_SIZE],
        };
        board.put(mid - 1, mid - 1, Cell::White);
        board.put(mid, mid, Cell::White);
        board.put(mid - 1, mid, Cell::Black);
        board.put(mid, mid - 1, Cell::Black);
        board
    }

    /// 0/1/2のグリッドから盤面を生成
    ///
    /// # Errors
    ///
    /// 正方形でない、サイズ範囲外、未知のセル値の場合にエラー。
    pub fn from_cells<R: AsRef<[u8]>>(rows: &[R]) -> Result<Self, BoardError> {
        let size = rows.len();
        let mut board = Self::empty(size)?;
        for (row, cells) in rows.iter().enumerate() {
            let cells = cells.as_ref();
            if cells.len() != size {
                return Err(BoardError::NotSquare {
                    row,
                    len: cells.len(),
                    expected: size,
                });
            }
            for (col, &value) in cells.iter().enumerate() {
                let cell = match value {
                    0 => Cell::Empty,
                    1 => Cell::Black,
                    2 => Cell::White,
                    _ => return Err(BoardError::InvalidCell { row, col, value }),
                };
                board.put(row, col, cell);
            }
        }
        Ok(board)
    }

    /// 0/1/2のグリッドに変換
    pub fn to_cells(&self) -> Vec<Vec<u8>> {
        let n = self.size();
        (0..n)
            .map(|row| (0..n).map(|col| self.cell(row, col).code()).collect())
            .collect()
    }

    /// 盤面の一辺の長さ
    #[inline]
    pub fn size(&self) -> usize {
        self.size as usize
    }

    /// 座標が盤内か
    #[inline]
    pub fn contains(&self, mv: Move) -> bool {
        mv.row < self.size() && mv.col < self.size()
    }

    /// セルの状態を取得（盤外はNone）
    pub fn get(&self, row: usize, col: usize) -> Option<Cell> {
        if row < self.size() && col < self.size() {
            Some(self.cell(row, col))
        } else {
            None
        }
    }

    /// セルの状態を設定
    ///
    /// # Errors
    ///
    /// 盤外の座標の場合`BoardError::OutOfBounds`。
    pub fn set(&mut self, row: usize, col: usize, cell: Cell) -> Result<(), BoardError> {
        let mv = Move::new(row, col);
        if !self.contains(mv) {
            return Err(BoardError::OutOfBounds(mv));
        }
        self.put(row, col, cell);
        Ok(())
    }

    /// 指定色の石数
    #[inline]
    pub fn count(&self, color: Color) -> usize {
        self.mask(color).iter().map(|r| r.count_ones() as usize).sum()
    }

    /// 空きマス数
    #[inline]
    pub fn empty_count(&self) -> usize {
        let n = self.size();
        n * n - self.count(Color::Black) - self.count(Color::White)
    }

    /// 四隅の座標（左上、右上、左下、右下）
    #[inline]
    pub fn corners(&self) -> [Move; 4] {
        let last = self.size() - 1;
        [
            Move::new(0, 0),
            Move::new(0, last),
            Move::new(last, 0),
            Move::new(last, last),
        ]
    }

    /// 四隅のいずれかか
    #[inline]
    pub fn is_corner(&self, mv: Move) -> bool {
        self.corners().contains(&mv)
    }

    /// 外周（最上行、最下行、最左列、最右列）上か
    #[inline]
    pub fn is_border(&self, row: usize, col: usize) -> bool {
        let last = self.size() - 1;
        row == 0 || row == last || col == 0 || col == last
    }

    /// 盤内であることが保証された座標のセル
    #[inline]
    pub(crate) fn cell(&self, row: usize, col: usize) -> Cell {
        let bit = 1u16 << col;
        if self.black[row] & bit != 0 {
            Cell::Black
        } else if self.white[row] & bit != 0 {
            Cell::White
        } else {
            Cell::Empty
        }
    }

    fn put(&mut self, row: usize, col: usize, cell: Cell) {
        let bit = 1u16 << col;
        self.black[row] &= !bit;
        self.white[row] &= !bit;
        match cell {
            Cell::Black => self.black[row] |= bit,
            Cell::White => self.white[row] |= bit,
            Cell::Empty => {}
        }
    }

    #[inline]
    fn mask(&self, color: Color) -> &[u16; MAX_SIZE] {
        match color {
            Color::Black => &self.black,
            Color::White => &self.white,
        }
    }

    /// (自分, 相手)の可変マスク
    #[inline]
    fn masks_mut(&mut self, color: Color) -> (&mut [u16; MAX_SIZE], &mut [u16; MAX_SIZE]) {
        match color {
            Color::Black => (&mut self.black, &mut self.white),
            Color::White => (&mut self.white, &mut self.black),
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::standard()
    }
}

impl FromStr for Board {
    type Err = BoardError;

    /// 行ごとのテキストから盤面を生成
    ///
    /// 各行は空白区切りのトークン、または区切りなしの文字列。
    /// `0`/`.`=空、`1`/`B`/`X`=黒、`2`/`W`/`O`=白。
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut rows = Vec::new();
        for (row, line) in s.lines().map(str::trim).filter(|l| !l.is_empty()).enumerate() {
            let tokens: Vec<String> = if line.contains(char::is_whitespace) {
                line.split_whitespace().map(str::to_owned).collect()
            } else {
                line.chars().map(String::from).collect()
            };
            let mut cells = Vec::with_capacity(tokens.len());
            for (col, token) in tokens.iter().enumerate() {
                let code = match token.as_str() {
                    "0" | "." => 0,
                    "1" | "B" | "b" | "X" | "x" => 1,
                    "2" | "W" | "w" | "O" | "o" => 2,
                    other => {
                        return Err(BoardError::Parse(format!(
                            "unknown cell '{other}' at ({row}, {col})"
                        )));
                    }
                };
                cells.push(code);
            }
            rows.push(cells);
        }
        Board::from_cells(&rows)
    }
}

/// 着手の取り消しに必要な情報
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UndoInfo {
    /// 着手位置
    pub mv: Move,
    /// 着手した色
    pub color: Color,
    /// 返した石の行マスク
    flipped: [u16; MAX_SIZE],
}

impl UndoInfo {
    /// 返した石の枚数
    pub fn flipped_count(&self) -> u32 {
        self.flipped.iter().map(|r| r.count_ones()).sum()
    }
}

/// ゲーム状態
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameState {
    /// 少なくとも一方に合法手がある
    Playing,
    /// 終局（勝者、引き分けはNone）
    GameOver(Option<Color>),
}

/// 着手で返る石の行マスクを計算
///
/// 盤外、既に石がある、1枚も返らない場合は全て0。
fn flip_masks(board: &Board, mv: Move, color: Color) -> [u16; MAX_SIZE] {
    let mut flipped = [0u16; MAX_SIZE];
    if !board.contains(mv) || board.cell(mv.row, mv.col) != Cell::Empty {
        return flipped;
    }

    let own = Cell::from(color);
    let opp = Cell::from(color.opposite());
    let n = board.size() as i32;
    let (row, col) = (mv.row as i32, mv.col as i32);

    for (dr, dc) in DIRECTIONS {
        let mut run = 0;
        let mut r = row + dr;
        let mut c = col + dc;
        let mut closed = false;
        while (0..n).contains(&r) && (0..n).contains(&c) {
            let cell = board.cell(r as usize, c as usize);
            if cell == opp {
                run += 1;
                r += dr;
                c += dc;
            } else {
                closed = cell == own && run > 0;
                break;
            }
        }
        if closed {
            for step in 1..=run {
                let fr = (row + dr * step) as usize;
                let fc = (col + dc * step) as usize;
                flipped[fr] |= 1 << fc;
            }
        }
    }

    flipped
}

/// 合法手か判定
#[inline]
pub fn is_legal(board: &Board, mv: Move, color: Color) -> bool {
    flip_masks(board, mv, color).iter().any(|&r| r != 0)
}

/// 合法手を行優先順で列挙
///
/// # Examples
///
/// ```
/// use othello_agent::board::{Board, Color, Move, legal_moves};
///
/// let moves = legal_moves(&Board::standard(), Color::Black);
/// assert_eq!(
///     moves,
///     vec![Move::new(2, 3), Move::new(3, 2), Move::new(4, 5), Move::new(5, 4)]
/// );
/// ```
pub fn legal_moves(board: &Board, color: Color) -> Vec<Move> {
    let n = board.size();
    let mut moves = Vec::new();
    for row in 0..n {
        for col in 0..n {
            let mv = Move::new(row, col);
            if is_legal(board, mv, color) {
                moves.push(mv);
            }
        }
    }
    moves
}

/// 合法手が1つでもあるか
pub fn has_legal_move(board: &Board, color: Color) -> bool {
    let n = board.size();
    (0..n).any(|row| (0..n).any(|col| is_legal(board, Move::new(row, col), color)))
}

/// 着手で返る相手の石の枚数（盤面は変更しない）
#[inline]
pub fn capture_count(board: &Board, mv: Move, color: Color) -> u32 {
    flip_masks(board, mv, color).iter().map(|r| r.count_ones()).sum()
}

/// 着手を実行して石を返す
///
/// # Errors
///
/// 盤外なら`OutOfBounds`、石があれば`Occupied`、1枚も返らなければ`InvalidMove`。
pub fn make_move(board: &mut Board, mv: Move, color: Color) -> Result<UndoInfo, BoardError> {
    if !board.contains(mv) {
        return Err(BoardError::OutOfBounds(mv));
    }
    if board.cell(mv.row, mv.col) != Cell::Empty {
        return Err(BoardError::Occupied(mv));
    }

    let flipped = flip_masks(board, mv, color);
    if flipped.iter().all(|&r| r == 0) {
        return Err(BoardError::InvalidMove(mv));
    }

    let (own, opp) = board.masks_mut(color);
    for row in 0..MAX_SIZE {
        own[row] |= flipped[row];
        opp[row] &= !flipped[row];
    }
    own[mv.row] |= 1 << mv.col;

    Ok(UndoInfo { mv, color, flipped })
}

/// `make_move`を取り消す
pub fn undo_move(board: &mut Board, undo: UndoInfo) {
    let (own, opp) = board.masks_mut(undo.color);
    own[undo.mv.row] &= !(1 << undo.mv.col);
    for row in 0..MAX_SIZE {
        own[row] &= !undo.flipped[row];
        opp[row] |= undo.flipped[row];
    }
}

/// 着手後の盤面を新しい値として返す（元の盤面は変更しない）
pub fn execute_move(board: &Board, mv: Move, color: Color) -> Result<Board, BoardError> {
    let mut next = *board;
    make_move(&mut next, mv, color)?;
    Ok(next)
}

/// 石差（黒 - 白）
#[inline]
pub fn final_score(board: &Board) -> i32 {
    board.count(Color::Black) as i32 - board.count(Color::White) as i32
}

/// 双方とも合法手がなければ終局
pub fn is_game_over(board: &Board) -> bool {
    !has_legal_move(board, Color::Black) && !has_legal_move(board, Color::White)
}

/// ゲーム状態を判定
pub fn check_game_state(board: &Board) -> GameState {
    if !is_game_over(board) {
        return GameState::Playing;
    }
    let winner = match final_score(board) {
        s if s > 0 => Some(Color::Black),
        s if s < 0 => Some(Color::White),
        _ => None,
    };
    GameState::GameOver(winner)
}
