//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use mcts::{GameState, MctsConfig};

/// Reproducible config with `iterations` per search.
pub fn seeded(seed: u64, iterations: u32) -> MctsConfig {
    MctsConfig::for_testing()
        .with_seed(seed)
        .with_iterations(iterations)
}

/// A broken game: the start position offers two moves, but both lead to
/// positions that are not over and yet have nothing to play.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeadEndGame {
    pub depth: u8,
    pub branch: u8,
    pub player: i32,
}

impl DeadEndGame {
    pub fn new() -> Self {
        Self {
            depth: 0,
            branch: 0,
            player: 1,
        }
    }
}

impl GameState for DeadEndGame {
    type Move = u8;

    fn get_possible_moves(&self) -> Vec<u8> {
        if self.depth == 0 {
            vec![0, 1]
        } else {
            Vec::new()
        }
    }

    fn make_move(&mut self, mv: &u8) {
        self.depth += 1;
        self.branch = *mv;
        self.player = -self.player;
    }

    fn is_terminal(&self) -> bool {
        false
    }

    fn get_winner(&self) -> Option<i32> {
        None
    }

    fn get_current_player(&self) -> i32 {
        self.player
    }
}

/// Two moves that always draw: `0` ends the game, `1` hands over one more turn
/// before it ends.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DrawGame {
    pub remaining: u8,
    pub player: i32,
}

impl DrawGame {
    pub fn new() -> Self {
        Self {
            remaining: 2,
            player: 1,
        }
    }
}

impl GameState for DrawGame {
    type Move = u8;

    fn get_possible_moves(&self) -> Vec<u8> {
        if self.remaining == 0 {
            Vec::new()
        } else {
            vec![0, 1]
        }
    }

    fn make_move(&mut self, mv: &u8) {
        self.remaining = if *mv == 0 { 0 } else { self.remaining - 1 };
        self.player = -self.player;
    }

    fn is_terminal(&self) -> bool {
        self.remaining == 0
    }

    fn get_winner(&self) -> Option<i32> {
        None
    }

    fn get_current_player(&self) -> i32 {
        self.player
    }
}
