//! # Infexion Game Implementation
//!
//! Two players, Red and Blue, compete for a 7x7 hexagonal board whose edges wrap
//! around in both axes (the board is a torus). Cells are either empty or owned by
//! one player with a power between 1 and 6.
//!
//! ## Rules
//! - **Spawn**: place a power-1 token on an empty cell. Only allowed while the total
//!   power on the board is below 49.
//! - **Spread**: pick up one of your own cells of power `k` and push one power into
//!   each of the next `k` cells along a direction, capturing them. A cell pushed
//!   past power 6 is emptied.
//! - Red moves first.
//! - Once both players have moved, the game ends as soon as a player has no power
//!   left on the board, or after 343 turns.
//! - The winner is the player with more total power, provided the lead is at least
//!   2; anything closer is a draw.
//!
//! ## Coordinate System
//! Cells are addressed as `(r, q)` with both coordinates in `0..7`. The six
//! directions are fixed offsets that wrap modulo 7:
//! - `DownRight (0, 1)`, `Down (-1, 1)`, `DownLeft (-1, 0)`
//! - `UpLeft (0, -1)`, `Up (1, -1)`, `UpRight (1, 0)`

use crate::GameState;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Side length of the board.
pub const BOARD_N: usize = 7;
/// Number of cells on the board.
pub const BOARD_CELLS: usize = BOARD_N * BOARD_N;
/// Turn limit; the game ends after this many moves.
pub const MAX_TURNS: u16 = 343;
/// Largest power a cell can hold.
pub const MAX_CELL_POWER: u8 = 6;
/// Spawning is allowed only while the board holds less power than this.
pub const MAX_TOTAL_POWER: u32 = 49;
/// Minimum power lead needed to win.
pub const WIN_POWER_DIFF: u32 = 2;

/// Red player id (moves first)
pub const RED: i32 = 1;
/// Blue player id
pub const BLUE: i32 = -1;

/// Human-readable colour of a player id.
pub fn player_name(player: i32) -> &'static str {
    if player == RED {
        "Red"
    } else {
        "Blue"
    }
}

/// A cell on the board.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct HexPos {
    pub r: u8,
    pub q: u8,
}

impl HexPos {
    /// Creates a position, or `None` if a coordinate is off the board.
    pub fn new(r: u8, q: u8) -> Option<Self> {
        if (r as usize) < BOARD_N && (q as usize) < BOARD_N {
            Some(Self { r, q })
        } else {
            None
        }
    }

    /// Row-major index into the board array.
    #[inline]
    pub fn index(self) -> usize {
        self.r as usize * BOARD_N + self.q as usize
    }

    #[inline]
    fn from_index(idx: usize) -> Self {
        Self {
            r: (idx / BOARD_N) as u8,
            q: (idx % BOARD_N) as u8,
        }
    }

    /// The cell `steps` cells away along `dir`, wrapping around the board edges.
    pub fn offset(self, dir: HexDir, steps: i32) -> Self {
        let (dr, dq) = dir.delta();
        let n = BOARD_N as i32;
        Self {
            r: (self.r as i32 + dr * steps).rem_euclid(n) as u8,
            q: (self.q as i32 + dq * steps).rem_euclid(n) as u8,
        }
    }

    /// All board cells in row-major order.
    pub fn all() -> impl Iterator<Item = HexPos> {
        (0..BOARD_CELLS).map(HexPos::from_index)
    }
}

impl fmt::Display for HexPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.r, self.q)
    }
}

/// One of the six hex directions.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum HexDir {
    DownRight,
    Down,
    DownLeft,
    UpLeft,
    Up,
    UpRight,
}

impl HexDir {
    /// Directions in the order spreads are generated.
    pub const ALL: [HexDir; 6] = [
        HexDir::Down,
        HexDir::DownLeft,
        HexDir::DownRight,
        HexDir::Up,
        HexDir::UpLeft,
        HexDir::UpRight,
    ];

    /// `(dr, dq)` offset of one step.
    pub fn delta(self) -> (i32, i32) {
        match self {
            HexDir::DownRight => (0, 1),
            HexDir::Down => (-1, 1),
            HexDir::DownLeft => (-1, 0),
            HexDir::UpLeft => (0, -1),
            HexDir::Up => (1, -1),
            HexDir::UpRight => (1, 0),
        }
    }

    /// Short name used in move notation.
    pub fn short_name(self) -> &'static str {
        match self {
            HexDir::DownRight => "DR",
            HexDir::Down => "D",
            HexDir::DownLeft => "DL",
            HexDir::UpLeft => "UL",
            HexDir::Up => "U",
            HexDir::UpRight => "UR",
        }
    }
}

impl FromStr for HexDir {
    type Err = MoveParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let dir = match s.to_ascii_uppercase().as_str() {
            "DR" | "DOWNRIGHT" => HexDir::DownRight,
            "D" | "DOWN" => HexDir::Down,
            "DL" | "DOWNLEFT" => HexDir::DownLeft,
            "UL" | "UPLEFT" => HexDir::UpLeft,
            "U" | "UP" => HexDir::Up,
            "UR" | "UPRIGHT" => HexDir::UpRight,
            _ => return Err(MoveParseError::Direction(s.to_string())),
        };
        Ok(dir)
    }
}

/// Represents a move in Infexion.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum InfexionMove {
    /// Place a power-1 token on an empty cell
    Spawn(HexPos),
    /// Spread an own cell along a direction
    Spread(HexPos, HexDir),
}

impl fmt::Display for InfexionMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InfexionMove::Spawn(pos) => write!(f, "SPAWN {}", pos),
            InfexionMove::Spread(pos, dir) => write!(f, "SPREAD {} {}", pos, dir.short_name()),
        }
    }
}

/// Errors from parsing move notation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveParseError {
    #[error("empty move")]
    Empty,
    #[error("unknown action '{0}' (expected SPAWN or SPREAD)")]
    Action(String),
    #[error("expected {expected} arguments, got {got}")]
    Arity { expected: usize, got: usize },
    #[error("bad coordinate '{0}'")]
    Coordinate(String),
    #[error("unknown direction '{0}'")]
    Direction(String),
}

impl FromStr for InfexionMove {
    type Err = MoveParseError;

    /// Parses `SPAWN r q` or `SPREAD r q DIR`.
    ///
    /// Commas and parentheses are treated as separators, so `SPAWN(3, 4)` works as
    /// well.
    ///
    /// # Examples
    /// ```
    /// use std::str::FromStr;
    /// use mcts::games::infexion::{HexDir, HexPos, InfexionMove};
    /// let mv = InfexionMove::from_str("spread 2 5 UR").unwrap();
    /// assert_eq!(mv, InfexionMove::Spread(HexPos::new(2, 5).unwrap(), HexDir::UpRight));
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s
            .split(|c: char| c.is_whitespace() || c == ',' || c == '(' || c == ')')
            .filter(|p| !p.is_empty())
            .collect();
        let (action, args) = parts.split_first().ok_or(MoveParseError::Empty)?;

        let parse_pos = |r: &str, q: &str| -> Result<HexPos, MoveParseError> {
            let coord = |c: &str| {
                c.parse::<u8>()
                    .map_err(|_| MoveParseError::Coordinate(c.to_string()))
            };
            HexPos::new(coord(r)?, coord(q)?)
                .ok_or_else(|| MoveParseError::Coordinate(format!("{} {}", r, q)))
        };

        match action.to_ascii_uppercase().as_str() {
            "SPAWN" => match args {
                [r, q] => Ok(InfexionMove::Spawn(parse_pos(r, q)?)),
                _ => Err(MoveParseError::Arity {
                    expected: 2,
                    got: args.len(),
                }),
            },
            "SPREAD" => match args {
                [r, q, dir] => Ok(InfexionMove::Spread(parse_pos(r, q)?, dir.parse()?)),
                _ => Err(MoveParseError::Arity {
                    expected: 3,
                    got: args.len(),
                }),
            },
            other => Err(MoveParseError::Action(other.to_string())),
        }
    }
}

/// Represents the complete state of an Infexion game.
///
/// Each board entry is the signed power of a cell: positive for Red, negative for
/// Blue, zero for empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InfexionState {
    board: [i8; BOARD_CELLS],
    /// Current player (1 for Red, -1 for Blue)
    current_player: i32,
    /// Moves played so far
    turn_count: u16,
}

impl Default for InfexionState {
    fn default() -> Self {
        Self::new()
    }
}

impl InfexionState {
    /// Creates an empty board with Red to move.
    pub fn new() -> Self {
        Self {
            board: [0; BOARD_CELLS],
            current_player: RED,
            turn_count: 0,
        }
    }

    /// Creates a position from raw signed cell powers.
    pub fn from_board(board: [i8; BOARD_CELLS], current_player: i32, turn_count: u16) -> Self {
        Self {
            board,
            current_player,
            turn_count,
        }
    }

    /// Owner and power of a cell, or `None` if it is empty.
    pub fn cell(&self, pos: HexPos) -> Option<(i32, u8)> {
        match self.board[pos.index()] {
            0 => None,
            p if p > 0 => Some((RED, p as u8)),
            p => Some((BLUE, p.unsigned_abs())),
        }
    }

    pub fn turn_count(&self) -> u16 {
        self.turn_count
    }

    /// Total power held by `player`.
    pub fn color_power(&self, player: i32) -> u32 {
        self.board
            .iter()
            .filter(|&&p| p != 0 && (p > 0) == (player == RED))
            .map(|p| p.unsigned_abs() as u32)
            .sum()
    }

    /// Total power on the board.
    pub fn total_power(&self) -> u32 {
        self.board.iter().map(|p| p.unsigned_abs() as u32).sum()
    }

    /// Checks if a move is legal in the current game state.
    pub fn is_legal(&self, mv: &InfexionMove) -> bool {
        if self.is_terminal() {
            return false;
        }
        match *mv {
            InfexionMove::Spawn(pos) => {
                self.board[pos.index()] == 0 && self.total_power() < MAX_TOTAL_POWER
            }
            InfexionMove::Spread(pos, _) => {
                matches!(self.cell(pos), Some((owner, _)) if owner == self.current_player)
            }
        }
    }

    #[inline]
    fn sign(player: i32) -> i8 {
        if player == RED {
            1
        } else {
            -1
        }
    }
}

impl GameState for InfexionState {
    type Move = InfexionMove;

    fn get_possible_moves(&self) -> Vec<Self::Move> {
        let mut moves = Vec::new();
        for pos in HexPos::all() {
            if matches!(self.cell(pos), Some((owner, _)) if owner == self.current_player) {
                moves.extend(HexDir::ALL.iter().map(|&dir| InfexionMove::Spread(pos, dir)));
            }
        }
        if self.total_power() < MAX_TOTAL_POWER {
            moves.extend(
                HexPos::all()
                    .filter(|pos| self.board[pos.index()] == 0)
                    .map(InfexionMove::Spawn),
            );
        }
        moves
    }

    fn make_move(&mut self, mv: &Self::Move) {
        let sign = Self::sign(self.current_player);
        match *mv {
            InfexionMove::Spawn(pos) => {
                self.board[pos.index()] = sign;
            }
            InfexionMove::Spread(pos, dir) => {
                let power = self.board[pos.index()].unsigned_abs();
                self.board[pos.index()] = 0;
                for step in 1..=power as i32 {
                    let target = pos.offset(dir, step).index();
                    let new_power = self.board[target].unsigned_abs() + 1;
                    self.board[target] = if new_power > MAX_CELL_POWER {
                        0
                    } else {
                        sign * new_power as i8
                    };
                }
            }
        }
        self.turn_count += 1;
        self.current_player = -self.current_player;
    }

    fn is_terminal(&self) -> bool {
        if self.turn_count < 2 {
            return false;
        }
        self.turn_count >= MAX_TURNS || self.color_power(RED) == 0 || self.color_power(BLUE) == 0
    }

    fn get_winner(&self) -> Option<i32> {
        if !self.is_terminal() {
            return None;
        }
        let red = self.color_power(RED);
        let blue = self.color_power(BLUE);
        if red.abs_diff(blue) < WIN_POWER_DIFF {
            None
        } else if red > blue {
            Some(RED)
        } else {
            Some(BLUE)
        }
    }

    fn get_current_player(&self) -> i32 {
        self.current_player
    }
}

impl fmt::Display for InfexionState {
    /// Renders the board with each row shifted to show the hex layout.
    /// `r3` is a Red cell of power 3, `b1` a Blue cell of power 1.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in (0..BOARD_N as u8).rev() {
            write!(f, "{:width$}", "", width = r as usize * 2)?;
            for q in 0..BOARD_N as u8 {
                let pos = HexPos { r, q };
                match self.cell(pos) {
                    Some((owner, power)) if owner == RED => write!(f, "r{} ", power)?,
                    Some((_, power)) => write!(f, "b{} ", power)?,
                    None => write!(f, " . ")?,
                }
                write!(f, " ")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(r: u8, q: u8) -> HexPos {
        HexPos::new(r, q).unwrap()
    }

    #[test]
    fn test_opening_moves_are_all_spawns() {
        let state = InfexionState::new();
        let moves = state.get_possible_moves();

        assert_eq!(moves.len(), BOARD_CELLS);
        assert!(moves.iter().all(|m| matches!(m, InfexionMove::Spawn(_))));
        assert_eq!(moves[0], InfexionMove::Spawn(pos(0, 0)));
    }

    #[test]
    fn test_spreads_listed_before_spawns() {
        let state = InfexionState::new().apply(&InfexionMove::Spawn(pos(3, 3)));
        let state = state.apply(&InfexionMove::Spawn(pos(1, 1)));
        let moves = state.get_possible_moves();

        // Red: six spreads from (3, 3), then 47 spawns.
        assert_eq!(moves.len(), 6 + 47);
        assert_eq!(moves[0], InfexionMove::Spread(pos(3, 3), HexDir::Down));
        assert!(matches!(moves[6], InfexionMove::Spawn(_)));
    }

    #[test]
    fn test_spread_wraps_and_captures() {
        let mut board = [0i8; BOARD_CELLS];
        board[pos(0, 5).index()] = 3;
        board[pos(0, 0).index()] = -2;
        let mut state = InfexionState::from_board(board, RED, 10);

        state.make_move(&InfexionMove::Spread(pos(0, 5), HexDir::DownRight));

        assert_eq!(state.cell(pos(0, 5)), None);
        assert_eq!(state.cell(pos(0, 6)), Some((RED, 1)));
        // Wrapped onto (0, 0) and captured Blue's two power.
        assert_eq!(state.cell(pos(0, 0)), Some((RED, 3)));
        assert_eq!(state.cell(pos(0, 1)), Some((RED, 1)));
        assert_eq!(state.get_current_player(), BLUE);
        assert_eq!(state.turn_count(), 11);
    }

    #[test]
    fn test_spread_past_max_power_empties_cell() {
        let mut board = [0i8; BOARD_CELLS];
        board[pos(3, 3).index()] = 1;
        board[pos(4, 3).index()] = -6;
        board[pos(6, 6).index()] = -1;
        let mut state = InfexionState::from_board(board, RED, 10);

        state.make_move(&InfexionMove::Spread(pos(3, 3), HexDir::UpRight));

        assert_eq!(state.cell(pos(4, 3)), None);
        assert_eq!(state.color_power(RED), 0);
    }

    #[test]
    fn test_no_game_over_before_second_turn() {
        let state = InfexionState::new().apply(&InfexionMove::Spawn(pos(0, 0)));
        assert!(!state.is_terminal());
        assert_eq!(state.get_winner(), None);
    }

    #[test]
    fn test_elimination_wins() {
        let mut board = [0i8; BOARD_CELLS];
        board[pos(2, 2).index()] = 2;
        board[pos(2, 3).index()] = -1;
        let mut state = InfexionState::from_board(board, RED, 4);

        state.make_move(&InfexionMove::Spread(pos(2, 2), HexDir::DownRight));

        assert!(state.is_terminal());
        assert_eq!(state.get_winner(), Some(RED));
    }

    #[test]
    fn test_turn_limit_and_power_difference() {
        let mut board = [0i8; BOARD_CELLS];
        board[pos(0, 0).index()] = 3;
        board[pos(5, 5).index()] = -2;
        let state = InfexionState::from_board(board, RED, MAX_TURNS);
        assert!(state.is_terminal());
        assert_eq!(state.get_winner(), None, "a lead of 1 is a draw");

        board[pos(5, 5).index()] = -1;
        let state = InfexionState::from_board(board, RED, MAX_TURNS);
        assert_eq!(state.get_winner(), Some(RED));
    }

    #[test]
    fn test_no_spawn_at_power_cap() {
        let mut board = [0i8; BOARD_CELLS];
        for (i, cell) in board.iter_mut().enumerate().take(10) {
            *cell = if i % 2 == 0 { 5 } else { -5 };
        }
        let state = InfexionState::from_board(board, RED, 20);
        assert_eq!(state.total_power(), 50);

        let moves = state.get_possible_moves();
        assert!(moves.iter().all(|m| matches!(m, InfexionMove::Spread(..))));
        assert_eq!(moves.len(), 5 * 6);
        assert!(!state.is_legal(&InfexionMove::Spawn(pos(6, 6))));
    }

    #[test]
    fn test_move_notation() {
        let spawn: InfexionMove = "SPAWN(3, 4)".parse().unwrap();
        assert_eq!(spawn, InfexionMove::Spawn(pos(3, 4)));
        assert_eq!(spawn.to_string(), "SPAWN 3 4");

        let spread: InfexionMove = "spread 0 6 dl".parse().unwrap();
        assert_eq!(spread, InfexionMove::Spread(pos(0, 6), HexDir::DownLeft));
        assert_eq!(spread.to_string().parse::<InfexionMove>().unwrap(), spread);

        assert_eq!("".parse::<InfexionMove>(), Err(MoveParseError::Empty));
        assert!(matches!("SPAWN 7 0".parse::<InfexionMove>(), Err(MoveParseError::Coordinate(_))));
        assert!(matches!("SPREAD 1 1 X".parse::<InfexionMove>(), Err(MoveParseError::Direction(_))));
        assert!(matches!("JUMP 1 1".parse::<InfexionMove>(), Err(MoveParseError::Action(_))));
        assert_eq!(
            "SPAWN 1".parse::<InfexionMove>(),
            Err(MoveParseError::Arity { expected: 2, got: 1 })
        );
    }
}
