//! # Nim (Subtraction Game)
//!
//! A single pile of stones; players alternately remove between 1 and `max_take`
//! stones. Whoever takes the last stone wins.
//!
//! The game is tiny and fully solved (a position is lost for the mover exactly when
//! `stones % (max_take + 1) == 0`), and different move orders constantly reach the
//! same pile size, which makes it a handy position for checking search behaviour.

use crate::GameState;
use std::fmt;
use std::str::FromStr;

/// Number of stones to remove.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct NimMove(pub u32);

/// Complete state of a Nim game.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NimState {
    stones: u32,
    max_take: u32,
    /// Current player (1 or -1)
    current_player: i32,
    /// Player who took the last stone
    winner: Option<i32>,
}

impl NimState {
    /// Creates a game with `stones` on the pile where each turn removes `1..=max_take`.
    pub fn new(stones: u32, max_take: u32) -> Self {
        Self {
            stones,
            max_take: max_take.max(1),
            current_player: 1,
            winner: None,
        }
    }

    pub fn stones(&self) -> u32 {
        self.stones
    }

    /// True if the player to move loses against perfect play.
    pub fn is_losing_for_mover(&self) -> bool {
        self.stones % (self.max_take + 1) == 0
    }
}

impl GameState for NimState {
    type Move = NimMove;

    fn get_possible_moves(&self) -> Vec<Self::Move> {
        (1..=self.max_take.min(self.stones)).map(NimMove).collect()
    }

    fn make_move(&mut self, mv: &Self::Move) {
        let take = mv.0.min(self.stones);
        self.stones -= take;
        if self.stones == 0 {
            self.winner = Some(self.current_player);
        }
        self.current_player = -self.current_player;
    }

    fn is_terminal(&self) -> bool {
        self.stones == 0
    }

    fn get_winner(&self) -> Option<i32> {
        self.winner
    }

    fn get_current_player(&self) -> i32 {
        self.current_player
    }
}

impl fmt::Display for NimMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "take {}", self.0)
    }
}

impl FromStr for NimMove {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u32>().map(NimMove)
    }
}
