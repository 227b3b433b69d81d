//! Tile mutations, strikes and session lifecycle as a pure reducer.
//!
//! [`reduce`] never touches its input: it clones the session, applies one
//! [`Intent`], and returns the new session together with the events and
//! player-facing notices the intent produced. Persisting, playing sounds and
//! repainting are left to the caller.
//!
//! Rejected intents return an unchanged session, a [`GameEvent::Rejected`]
//! event and usually a [`Notice`]; nothing here ever fails.

use std::fmt;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::bingo_engine::{
    evaluator::is_win,
    generator::{pick_replacement, regenerate, shuffle_unmarked},
    helpers::{recompute_lines, refresh_lines},
    models::{GameSession, GoalPool, Screen, SessionSetup, StrikeAction, STRIKES_MAX},
    scoring::{line_bonus, mark_delta, strike_penalty, ScoreChange},
    timer,
};

// ---------------------------------------------------------------------------
// Inputs and outputs
// ---------------------------------------------------------------------------

/// A user intent forwarded by the renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Intent {
    /// Plain tap on a tile.
    Toggle { index: usize },
    /// Spend an edit strike and open the tile editor.
    BeginEdit { index: usize },
    /// Commit the open editor.
    SaveEdit { index: usize, text: String, checked: bool },
    /// Close the editor; the strike stays spent.
    CancelEdit,
    /// Spend a skip strike: mark the tile as done without doing it.
    Skip { index: usize },
    /// Spend a replace strike: swap in an unused goal from the pool.
    Replace { index: usize },
    Pause,
    Resume,
    TogglePause,
    /// Deal a new board from the pool.
    Generate,
    /// Shuffle the texts of unmarked tiles in place.
    ShuffleUnmarked,
    ApplySetup { setup: SessionSetup },
    Start,
    /// Show the game-over screen now.
    EndGame,
    /// Dismiss the game-over screen and keep marking.
    KeepPlaying,
    /// Clear marks and strikes on the same board.
    ResetMarks,
    /// New board, cleared marks, restarted clock.
    ReshuffleCard,
    /// Drop the run, keep the pool and setup.
    BackToSetup,
    /// Drop the run and the pool.
    NewRound,
}

/// Why an intent was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RejectReason {
    NoSuchTile,
    NoBoard,
    Paused,
    FreeTile,
    SkippedTile,
    NoStrikes,
    NoReplacement,
    EditNotOpen,
    NotWon,
}

/// Something that happened, for sound effects and renderers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum GameEvent {
    Marked { index: usize },
    Unmarked { index: usize },
    LinesCompleted { count: usize, bonus: i64 },
    ScoreChanged { delta: i64, score: i64 },
    StrikeSpent { action: StrikeAction, penalty: i64, strikes_left: u8 },
    EditOpened { index: usize },
    EditClosed { index: usize },
    TileEdited { index: usize },
    TileSkipped { index: usize },
    TileReplaced { index: usize, text: String },
    Won { elapsed_ms: i64 },
    Paused,
    Resumed,
    BoardGenerated,
    BoardShuffled,
    MarksReset,
    SetupApplied,
    GameStarted,
    KeepPlaying,
    ReturnedToSetup,
    Rejected { reason: RejectReason },
}

/// Short player-facing message, shown as a toast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Notice {
    ResumeToMove,
    FreeSpaceLocked,
    NoStrikesLeft,
    TileSkipped,
    NoReplacement,
    NoBoard,
    Bingo { points: i64 },
    StrikeSpent { penalty: i64, strikes_left: u8 },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::ResumeToMove    => write!(f, "Resume the game to make a move."),
            Notice::FreeSpaceLocked => write!(f, "Free space can't be changed."),
            Notice::NoStrikesLeft   => write!(f, "No strikes left."),
            Notice::TileSkipped     => write!(f, "This tile is skipped."),
            Notice::NoReplacement   => write!(f, "No unused goals available."),
            Notice::NoBoard         => write!(f, "Generate your card first."),
            Notice::Bingo { points } => write!(f, "Bingo! +{} points", points),
            Notice::StrikeSpent { penalty, strikes_left } =>
                write!(f, "-{} points · Strikes left: {}", penalty, strikes_left),
        }
    }
}

/// The outcome of one intent.
#[derive(Debug, Clone)]
pub struct Transition {
    pub session: GameSession,
    pub events: Vec<GameEvent>,
    pub notices: Vec<Notice>,
}

impl Transition {
    /// The refusal reason, if the intent was rejected.
    pub fn rejection(&self) -> Option<RejectReason> {
        self.events.iter().find_map(|e| match e {
            GameEvent::Rejected { reason } => Some(*reason),
            _                              => None,
        })
    }

    /// Net score change across all events.
    pub fn score_delta(&self) -> i64 {
        self.events
            .iter()
            .map(|e| match e {
                GameEvent::ScoreChanged { delta, .. } => *delta,
                _                                     => 0,
            })
            .sum()
    }

    pub fn just_won(&self) -> bool {
        self.events.iter().any(|e| matches!(e, GameEvent::Won { .. }))
    }
}

#[derive(Default)]
struct Effects {
    events: Vec<GameEvent>,
    notices: Vec<Notice>,
}

impl Effects {
    fn reject(&mut self, reason: RejectReason, notice: Option<Notice>) {
        self.events.push(GameEvent::Rejected { reason });
        self.notices.extend(notice);
    }

    fn reject_with(&mut self, rejection: Rejection) {
        self.reject(rejection.reason, rejection.notice);
    }
}

struct Rejection {
    reason: RejectReason,
    notice: Option<Notice>,
}

impl Rejection {
    fn new(reason: RejectReason, notice: Option<Notice>) -> Self {
        Rejection { reason, notice }
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Apply one intent to a copy of `session`.
pub fn reduce<R: Rng>(
    session: &GameSession,
    intent: Intent,
    now_ms: i64,
    rng: &mut R,
) -> Transition {
    let mut s = session.clone();
    let mut fx = Effects::default();

    match intent {
        Intent::Toggle { index }    => toggle(&mut s, &mut fx, index, now_ms),
        Intent::BeginEdit { index } => begin_edit(&mut s, &mut fx, index),
        Intent::SaveEdit { index, text, checked } =>
            save_edit(&mut s, &mut fx, index, &text, checked, now_ms),
        Intent::CancelEdit          => cancel_edit(&mut s, &mut fx),
        Intent::Skip { index }      => skip(&mut s, &mut fx, index, now_ms),
        Intent::Replace { index }   => replace(&mut s, &mut fx, index, rng),
        Intent::Pause               => pause(&mut s, &mut fx, now_ms),
        Intent::Resume              => resume(&mut s, &mut fx, now_ms),
        Intent::TogglePause if s.timer_paused => resume(&mut s, &mut fx, now_ms),
        Intent::TogglePause         => pause(&mut s, &mut fx, now_ms),
        Intent::Generate            => generate(&mut s, &mut fx, rng),
        Intent::ShuffleUnmarked     => shuffle(&mut s, &mut fx, rng),
        Intent::ApplySetup { setup } => apply_setup(&mut s, &mut fx, setup),
        Intent::Start               => start(&mut s, &mut fx, now_ms, rng),
        Intent::EndGame             => end_game(&mut s, &mut fx, now_ms),
        Intent::KeepPlaying         => keep_playing(&mut s, &mut fx),
        Intent::ResetMarks          => reset_marks(&mut s, &mut fx, now_ms),
        Intent::ReshuffleCard       => reshuffle_card(&mut s, &mut fx, now_ms, rng),
        Intent::BackToSetup         => back_to_setup(&mut s, &mut fx, false),
        Intent::NewRound            => back_to_setup(&mut s, &mut fx, true),
    }

    Transition { session: s, events: fx.events, notices: fx.notices }
}

// ---------------------------------------------------------------------------
// Shared steps
// ---------------------------------------------------------------------------

fn add_score(s: &mut GameSession, fx: &mut Effects, delta: i64) {
    if delta != 0 {
        s.score = s.score.saturating_add(delta);
        fx.events.push(GameEvent::ScoreChanged { delta, score: s.score });
    }
}

/// Set a tile's checked flag, re-evaluate lines and score the change.
fn set_checked(s: &mut GameSession, fx: &mut Effects, index: usize, next_checked: bool) -> ScoreChange {
    let prev_checked = s.board[index].checked;
    s.board[index].checked = next_checked;
    let newly = refresh_lines(s);

    let change = ScoreChange {
        mark: mark_delta(prev_checked, next_checked),
        line_bonus: line_bonus(newly),
        penalty: 0,
    };
    match (prev_checked, next_checked) {
        (false, true) => fx.events.push(GameEvent::Marked { index }),
        (true, false) => fx.events.push(GameEvent::Unmarked { index }),
        _             => {}
    }
    if newly > 0 {
        fx.events.push(GameEvent::LinesCompleted { count: newly, bonus: change.line_bonus });
    }
    add_score(s, fx, change.total());
    change
}

/// Fire the win once the condition holds, honouring the latch and a
/// dismissed game-over screen.
fn check_win(s: &mut GameSession, fx: &mut Effects, now_ms: i64) {
    if s.won {
        return;
    }
    let holds = is_win(&s.board, s.bingos, s.win_condition);
    if s.keep_playing_dismissed {
        if holds {
            return;
        }
        s.keep_playing_dismissed = false;
    }
    if holds {
        declare_won(s, fx, now_ms);
    }
}

fn declare_won(s: &mut GameSession, fx: &mut Effects, now_ms: i64) {
    s.won = true;
    s.keep_playing_dismissed = false;
    s.elapsed_ms_at_win = timer::elapsed_ms(s, now_ms);
    s.screen = Screen::Over;
    fx.events.push(GameEvent::Won { elapsed_ms: s.elapsed_ms_at_win });
}

fn strike_gate(s: &GameSession, index: usize) -> Result<(), Rejection> {
    let tile = s
        .board
        .get(index)
        .ok_or_else(|| Rejection::new(RejectReason::NoSuchTile, None))?;
    if s.timer_paused {
        return Err(Rejection::new(RejectReason::Paused, Some(Notice::ResumeToMove)));
    }
    if tile.free {
        return Err(Rejection::new(RejectReason::FreeTile, Some(Notice::FreeSpaceLocked)));
    }
    if s.strikes_left == 0 {
        return Err(Rejection::new(RejectReason::NoStrikes, Some(Notice::NoStrikesLeft)));
    }
    Ok(())
}

fn spend_strike(s: &mut GameSession, fx: &mut Effects, action: StrikeAction) {
    let penalty = strike_penalty(action);
    s.strikes_left = s.strikes_left.saturating_sub(1);
    fx.events.push(GameEvent::StrikeSpent { action, penalty, strikes_left: s.strikes_left });
    fx.notices.push(Notice::StrikeSpent { penalty, strikes_left: s.strikes_left });
    add_score(s, fx, ScoreChange::strike(action).total());
}

/// Clear the board and everything scored on it; setup and pool survive.
fn reset_run_progress(s: &mut GameSession) {
    s.board.clear();
    s.score = 0;
    s.bingos = 0;
    s.started_at = 0;
    s.won = false;
    s.keep_playing_dismissed = false;
    s.last_bingo_lines_key.clear();
    timer::clear_pause(s);
    s.elapsed_ms_at_win = 0;
    s.strikes_left = STRIKES_MAX;
    s.editing = None;
}

// ---------------------------------------------------------------------------
// Tile intents
// ---------------------------------------------------------------------------

fn toggle(s: &mut GameSession, fx: &mut Effects, index: usize, now_ms: i64) {
    let Some(tile) = s.board.get(index) else {
        return fx.reject(RejectReason::NoSuchTile, None);
    };
    if tile.free {
        return fx.reject(RejectReason::FreeTile, None);
    }
    if s.timer_paused {
        return fx.reject(RejectReason::Paused, Some(Notice::ResumeToMove));
    }
    if tile.skipped {
        return fx.reject(RejectReason::SkippedTile, Some(Notice::TileSkipped));
    }

    let next_checked = !tile.checked;
    let change = set_checked(s, fx, index, next_checked);
    if change.line_bonus > 0 {
        fx.notices.push(Notice::Bingo { points: change.line_bonus });
    }
    check_win(s, fx, now_ms);
}

fn begin_edit(s: &mut GameSession, fx: &mut Effects, index: usize) {
    if let Err(rejection) = strike_gate(s, index) {
        return fx.reject_with(rejection);
    }
    spend_strike(s, fx, StrikeAction::Edit);
    s.editing = Some(index);
    fx.events.push(GameEvent::EditOpened { index });
}

fn save_edit(
    s: &mut GameSession,
    fx: &mut Effects,
    index: usize,
    text: &str,
    checked: bool,
    now_ms: i64,
) {
    if s.editing != Some(index) || index >= s.board.len() {
        return fx.reject(RejectReason::EditNotOpen, None);
    }
    if s.timer_paused {
        return fx.reject(RejectReason::Paused, Some(Notice::ResumeToMove));
    }

    let tile = &mut s.board[index];
    let text = text.trim();
    tile.text = if text.is_empty() { "-".to_string() } else { text.to_string() };
    let next_checked = tile.free || checked;
    if !next_checked {
        tile.skipped = false;
    }
    s.editing = None;
    fx.events.push(GameEvent::TileEdited { index });

    set_checked(s, fx, index, next_checked);
    check_win(s, fx, now_ms);
}

fn cancel_edit(s: &mut GameSession, fx: &mut Effects) {
    if let Some(index) = s.editing.take() {
        fx.events.push(GameEvent::EditClosed { index });
    }
}

fn skip(s: &mut GameSession, fx: &mut Effects, index: usize, now_ms: i64) {
    if let Err(rejection) = strike_gate(s, index) {
        return fx.reject_with(rejection);
    }
    spend_strike(s, fx, StrikeAction::Skip);
    s.board[index].skipped = true;
    fx.events.push(GameEvent::TileSkipped { index });
    set_checked(s, fx, index, true);
    check_win(s, fx, now_ms);
}

fn replace<R: Rng>(s: &mut GameSession, fx: &mut Effects, index: usize, rng: &mut R) {
    if let Err(rejection) = strike_gate(s, index) {
        return fx.reject_with(rejection);
    }
    let current = s.board[index].text.clone();
    let Some(text) = pick_replacement(&s.board, &s.goal_pool, &current, rng) else {
        return fx.reject(RejectReason::NoReplacement, Some(Notice::NoReplacement));
    };

    spend_strike(s, fx, StrikeAction::Replace);
    let tile = &mut s.board[index];
    let prev_checked = tile.checked;
    tile.text = text.clone();
    tile.checked = false;
    tile.skipped = false;
    if prev_checked {
        fx.events.push(GameEvent::Unmarked { index });
    }
    fx.events.push(GameEvent::TileReplaced { index, text });
    add_score(s, fx, mark_delta(prev_checked, false));
    recompute_lines(s);
}

// ---------------------------------------------------------------------------
// Clock intents
// ---------------------------------------------------------------------------

fn pause(s: &mut GameSession, fx: &mut Effects, now_ms: i64) {
    if timer::pause(s, now_ms) {
        fx.events.push(GameEvent::Paused);
    }
}

fn resume(s: &mut GameSession, fx: &mut Effects, now_ms: i64) {
    if timer::resume(s, now_ms) {
        fx.events.push(GameEvent::Resumed);
    }
}

// ---------------------------------------------------------------------------
// Board and session lifecycle
// ---------------------------------------------------------------------------

fn generate<R: Rng>(s: &mut GameSession, fx: &mut Effects, rng: &mut R) {
    regenerate(s, rng);
    fx.events.push(GameEvent::BoardGenerated);
}

fn shuffle<R: Rng>(s: &mut GameSession, fx: &mut Effects, rng: &mut R) {
    if !s.has_board() {
        return fx.reject(RejectReason::NoBoard, Some(Notice::NoBoard));
    }
    if s.timer_paused {
        return fx.reject(RejectReason::Paused, Some(Notice::ResumeToMove));
    }
    shuffle_unmarked(&mut s.board, rng);
    fx.events.push(GameEvent::BoardShuffled);
}

/// Store the setup. A board whose tile count or free space no longer fits is
/// dropped.
fn apply_setup(s: &mut GameSession, fx: &mut Effects, setup: SessionSetup) {
    let prev_free = s.free_index();
    s.size = setup.size;
    s.free_enabled = setup.free;
    s.win_condition = setup.win;
    s.goal_pool = setup.goals;
    if s.board.len() != s.size.tile_count() || s.free_index() != prev_free {
        s.board.clear();
        s.editing = None;
        recompute_lines(s);
    }
    fx.events.push(GameEvent::SetupApplied);
}

fn start<R: Rng>(s: &mut GameSession, fx: &mut Effects, now_ms: i64, rng: &mut R) {
    if s.goal_pool.is_empty() {
        s.goal_pool = GoalPool::sample();
    }
    if !s.has_board() {
        regenerate(s, rng);
        fx.events.push(GameEvent::BoardGenerated);
    }
    timer::restart(s, now_ms);
    s.won = false;
    s.keep_playing_dismissed = false;
    s.screen = Screen::Play;
    fx.events.push(GameEvent::GameStarted);
}

fn end_game(s: &mut GameSession, fx: &mut Effects, now_ms: i64) {
    if !s.has_board() {
        return fx.reject(RejectReason::NoBoard, Some(Notice::NoBoard));
    }
    declare_won(s, fx, now_ms);
}

fn keep_playing(s: &mut GameSession, fx: &mut Effects) {
    if !s.won {
        return fx.reject(RejectReason::NotWon, None);
    }
    s.won = false;
    s.keep_playing_dismissed = true;
    s.elapsed_ms_at_win = 0;
    s.screen = Screen::Play;
    fx.events.push(GameEvent::KeepPlaying);
}

fn reset_marks(s: &mut GameSession, fx: &mut Effects, now_ms: i64) {
    for tile in s.board.iter_mut().filter(|t| !t.free) {
        tile.checked = false;
        tile.skipped = false;
    }
    if let Some(center) = s.free_index() {
        if let Some(tile) = s.board.get_mut(center) {
            tile.checked = true;
        }
    }
    s.strikes_left = STRIKES_MAX;
    s.score = 0;
    s.editing = None;
    recompute_lines(s);
    timer::restart(s, now_ms);
    s.won = false;
    s.keep_playing_dismissed = false;
    fx.events.push(GameEvent::MarksReset);
}

fn reshuffle_card<R: Rng>(s: &mut GameSession, fx: &mut Effects, now_ms: i64, rng: &mut R) {
    regenerate(s, rng);
    timer::restart(s, now_ms);
    s.won = false;
    s.keep_playing_dismissed = false;
    fx.events.push(GameEvent::BoardGenerated);
}

fn back_to_setup(s: &mut GameSession, fx: &mut Effects, clear_pool: bool) {
    if clear_pool {
        s.goal_pool = GoalPool::new();
    }
    reset_run_progress(s);
    s.screen = Screen::Start;
    fx.events.push(GameEvent::ReturnedToSetup);
}
