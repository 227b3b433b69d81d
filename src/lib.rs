//! # goal_bingo
//!
//! A game-state engine for goal bingo: an N×N card of personal goals that the
//! player marks off as they get done.
//!
//! ## How it works
//!
//! 1. Describe the card with a [`SessionSetup`]: size (3 to 5), optional free
//!    centre space, win condition and a goal pool.
//! 2. Send [`Intent`]s through [`reduce`] (pure) or a [`BingoController`]
//!    (which also persists, tracks the best score and forwards events).
//! 3. Each intent yields a [`Transition`]: the new session, the
//!    [`GameEvent`]s it produced and any player-facing [`Notice`]s.
//!
//! ## Rules in brief
//!
//! - Marking a tile scores +10, unmarking −8, each newly completed line +75.
//! - Three strikes per card buy an edit (−15), a skip (−10) or a replacement
//!   goal (−20).
//! - The clock excludes paused time; while paused no tile can change.
//! - Win on enough lines, or on a full blackout.
//!
//! ## Quick start
//!
//! ```rust
//! use goal_bingo::{make_rng, reduce, GameSession, GoalPool, Intent, SessionSetup};
//!
//! let mut rng = make_rng(Some(42));
//! let session = GameSession::new(SessionSetup {
//!     goals: GoalPool::sample(),
//!     ..SessionSetup::default()
//! });
//!
//! let started = reduce(&session, Intent::Start, 1_000, &mut rng).session;
//! assert_eq!(started.board.len(), 25);
//!
//! let marked = reduce(&started, Intent::Toggle { index: 0 }, 2_000, &mut rng);
//! assert_eq!(marked.score_delta(), 10);
//! ```
//!
//! Persistence goes through any [`KeyValueStore`]; [`MemoryStore`] and
//! [`FileStore`] are provided.

pub mod bingo_engine;
pub mod clock;
pub mod controller;
pub mod persistence;
pub mod view_adapter;

// Convenience re-exports so callers can use `goal_bingo::reduce` directly
// without reaching into `bingo_engine::`.
pub use bingo_engine::{
    generate_board, make_rng, reduce, Board, BoardSize, GameEvent, GameSession, GoalPool, Intent,
    Notice, RejectReason, Screen, SessionSetup, StrikeAction, Tile, Transition, WinCondition,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use controller::{BingoController, ControllerOptions, Feedback, SilentFeedback};
pub use persistence::{BingoStorage, FileStore, KeyValueStore, MemoryStore};
pub use view_adapter::to_view_state;

#[cfg(test)]
mod tests;
