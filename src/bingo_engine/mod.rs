//! Core bingo engine: board generation, line evaluation, scoring and the
//! session reducer.
//!
//! ## Module overview
//!
//! | Module      | Purpose |
//! |-------------|---------|
//! | `models`    | Shared types: tiles, board size, win condition, goal pool, session |
//! | `deck`      | Fisher-Yates shuffled goal deck with placeholder padding |
//! | `evaluator` | Completed-line detection, canonical line keys, win check |
//! | `helpers`   | Line bookkeeping and board normalisation shared by the rest |
//! | `generator` | Board generation, unmarked shuffle, replacement picks, RNG setup |
//! | `scoring`   | Point values and strike penalties |
//! | `timer`     | Pause-aware play clock |
//! | `reducer`   | `reduce()`, applies one intent to a session |

pub mod deck;
pub mod evaluator;
pub mod generator;
pub mod helpers;
pub mod models;
pub mod reducer;
pub mod scoring;
pub mod timer;

// Re-export the public API surface so callers can use
// `bingo_engine::reduce` without reaching into sub-modules.
pub use generator::{generate_board, make_rng};
pub use models::{
    Board, BoardSize, GameSession, GoalPool, Screen, SessionSetup, StrikeAction, Tile,
    WinCondition,
};
pub use reducer::{reduce, GameEvent, Intent, Notice, RejectReason, Transition};
