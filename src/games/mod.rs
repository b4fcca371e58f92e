//! # Game Implementations Module
//!
//! Games that implement the `GameState` trait and can be searched by the engine.
//!
//! ## Supported Games
//! - **Infexion**: 7x7 wrap-around hex board where players spawn tokens and spread
//!   them to capture cells
//! - **Nim**: single-pile subtraction game, small enough to solve by hand
//!
//! ## Adding New Games
//! To add a new game, create a new module and implement:
//! 1. A move type, as a closed enum when the game has several kinds of move
//! 2. A game state type with the GameState trait (`Eq + Hash` must identify
//!    positions exactly)
//! 3. Display and parsing implementations for moves
//! 4. A terminal check that every line of play eventually reaches

pub mod infexion;
pub mod nim;
