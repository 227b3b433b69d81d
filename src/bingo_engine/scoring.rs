//! Scoring rules for marking tiles, completing lines, and spending strikes.
//!
//! - Marking a tile is worth [`MARK_POINTS`]; unmarking costs [`UNMARK_PENALTY`].
//! - Each newly completed line adds [`LINE_BONUS`].
//! - Strikes cost a fixed penalty per action, independent of any other delta.

use crate::bingo_engine::models::StrikeAction;

pub const MARK_POINTS: i64 = 10;
pub const UNMARK_PENALTY: i64 = 8;
pub const LINE_BONUS: i64 = 75;

pub const EDIT_PENALTY: i64 = 15;
pub const SKIP_PENALTY: i64 = 10;
pub const REPLACE_PENALTY: i64 = 20;

/// Breakdown of one score change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScoreChange {
    /// +10 / -8 from the checked transition, 0 when unchanged.
    pub mark: i64,
    /// `LINE_BONUS` per newly completed line.
    pub line_bonus: i64,
    /// Strike penalty, stored as a negative number.
    pub penalty: i64,
}

impl ScoreChange {
    pub fn total(&self) -> i64 {
        self.mark + self.line_bonus + self.penalty
    }
}

/// Points for a checked transition alone.
pub fn mark_delta(prev_checked: bool, next_checked: bool) -> i64 {
    match (prev_checked, next_checked) {
        (false, true) => MARK_POINTS,
        (true, false) => -UNMARK_PENALTY,
        _             => 0,
    }
}

pub fn line_bonus(newly_completed: usize) -> i64 {
    LINE_BONUS * newly_completed as i64
}

/// The score-delta law for a single tile mutation.
pub fn score_delta(prev_checked: bool, next_checked: bool, newly_completed: usize) -> i64 {
    mark_delta(prev_checked, next_checked) + line_bonus(newly_completed)
}

/// Points a strike action costs (positive).
pub fn strike_penalty(action: StrikeAction) -> i64 {
    match action {
        StrikeAction::Edit    => EDIT_PENALTY,
        StrikeAction::Skip    => SKIP_PENALTY,
        StrikeAction::Replace => REPLACE_PENALTY,
    }
}

impl ScoreChange {
    /// The change for spending one strike on `action`.
    pub fn strike(action: StrikeAction) -> Self {
        ScoreChange { penalty: -strike_penalty(action), ..ScoreChange::default() }
    }
}
