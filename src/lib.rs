//! Blokus-Rust: bitboard Blokus Duo with exact game-tree search.
//!
//! This crate provides a bitboard move engine for the two-player Blokus Duo
//! variant (14x14 board, 21 polyominoes per player) and generic alpha-beta,
//! iterative-deepening and expectiminimax search over a small game-state
//! trait.
//!
//! ## Modules
//!
//! - [`constants`] - Board geometry, action space, search defaults
//! - [`bitboard`] - 256-cell bitboards and shifted piece masks
//! - [`polyomino`] - Piece kinds and their orientations
//! - [`catalog`] - Table of every placement (the action space)
//! - [`position`] - Placement rules, anchors, apply/undo
//! - [`state`] - Game-agnostic `Game`/`State` traits
//! - [`game`] - Blokus Duo turn order, scoring and observations
//! - [`minimax`] - Alpha-beta, iterative deepening, expectiminimax
//! - [`bot`] - Search and random agents
//! - [`playout`] - Random playouts and bot-vs-bot games
//! - [`protocol`] - Text command protocol
//!
//! ## Example
//!
//! ```
//! use blokus_rust::game::DuoGame;
//! use blokus_rust::minimax::{alpha_beta_search, Traversal};
//! use blokus_rust::state::{Game, State};
//!
//! let game = DuoGame::new();
//! let state = game.new_initial_state();
//! assert_eq!(state.legal_actions().len(), 414);
//!
//! // One ply, scoring leaves with the built-in heuristic
//! let value_fn = |s: &blokus_rust::game::DuoState| s.player_return(0);
//! let (value, action) =
//!     alpha_beta_search(&game, Some(&state), Some(&value_fn), 1, None, Traversal::Undo).unwrap();
//! println!("{} -> {value}", game.action_to_string(0, action.unwrap()));
//! ```

pub mod bitboard;
pub mod bot;
pub mod catalog;
pub mod constants;
pub mod game;
pub mod minimax;
pub mod playout;
pub mod polyomino;
pub mod position;
pub mod protocol;
pub mod state;
