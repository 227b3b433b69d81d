//! The persisted session record and its migration from the legacy shape.
//!
//! ## Record layout
//!
//! ```text
//! { size, free, win, goalsPool, board, startedAt, score, bingos, won,
//!   lastBingoLinesKey, timerPaused, pausedAt, accumulatedPauseMs,
//!   strikesLeft, elapsedMsAtWin, keepPlayingDismissed }
//! ```
//!
//! The board is the one field that must be well formed: it has to be an array
//! of tiles, each with a string `text` and a boolean `checked`. Every other
//! field is read leniently and falls back to its default.
//!
//! Records without `strikesLeft` come from the older, simpler game (no
//! strikes, no pause, no skipped tiles) and go through [`migrate_legacy`].

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use tracing::warn;

use crate::bingo_engine::{
    helpers::{normalize_board, recompute_lines},
    models::{BoardSize, GameSession, GoalPool, Tile, WinCondition, STRIKES_MAX},
};
use crate::persistence::error::SchemaError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaVersion {
    /// No strikes, pause or skipped tiles.
    Legacy,
    Current,
}

/// Which schema revision wrote `record`.
pub fn detect_version(record: &Map<String, Value>) -> SchemaVersion {
    if record.contains_key("strikesLeft") {
        SchemaVersion::Current
    } else {
        SchemaVersion::Legacy
    }
}

// ---------------------------------------------------------------------------
// Lenient field readers
// ---------------------------------------------------------------------------

/// Field readers that accept what a hand-edited or older JSON file may hold.
pub mod fields {
    use serde_json::{Map, Value};
    use crate::bingo_engine::models::{GoalPool, WinCondition};

    /// Integer from a number or numeric string, truncated toward zero.
    pub fn int(obj: &Map<String, Value>, key: &str) -> Option<i64> {
        let n = match obj.get(key)? {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64))?,
            Value::String(s) => {
                let f: f64 = s.trim().parse().ok()?;
                if !f.is_finite() {
                    return None;
                }
                f.trunc() as i64
            }
            Value::Bool(b) => i64::from(*b),
            _ => return None,
        };
        Some(n)
    }

    /// Truthiness: `false`, `0`, `""`, `null` and absence are false.
    pub fn flag(obj: &Map<String, Value>, key: &str) -> bool {
        match obj.get(key) {
            None | Some(Value::Null) => false,
            Some(Value::Bool(b))     => *b,
            Some(Value::Number(n))   => n.as_f64().map_or(false, |f| f != 0.0),
            Some(Value::String(s))   => !s.is_empty(),
            Some(_)                  => true,
        }
    }

    /// String from a string or a scalar.
    pub fn text(obj: &Map<String, Value>, key: &str) -> Option<String> {
        scalar_text(obj.get(key)?)
    }

    pub fn scalar_text(value: &Value) -> Option<String> {
        match value {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b)   => Some(b.to_string()),
            _                => None,
        }
    }

    pub fn win(obj: &Map<String, Value>, key: &str) -> WinCondition {
        text(obj, key).map(|s| WinCondition::parse(&s)).unwrap_or_default()
    }

    /// Goal pool from an array, stringifying scalars and dropping the rest.
    pub fn goals(obj: &Map<String, Value>, key: &str) -> GoalPool {
        match obj.get(key) {
            Some(Value::Array(items)) => GoalPool::from_lines(items.iter().filter_map(scalar_text)),
            _                         => GoalPool::new(),
        }
    }
}

/// The board array, strictly validated tile by tile.
pub fn read_board(obj: &Map<String, Value>) -> Result<Vec<Tile>, SchemaError> {
    let tiles = obj
        .get("board")
        .and_then(Value::as_array)
        .ok_or(SchemaError::MissingBoard)?;
    tiles
        .iter()
        .enumerate()
        .map(|(index, raw)| {
            Tile::deserialize(raw).map_err(|source| SchemaError::MalformedTile { index, source })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Legacy shape
// ---------------------------------------------------------------------------

/// Fields the older game persisted; a subset of the current record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacySession {
    pub size: BoardSize,
    pub free: bool,
    pub win: WinCondition,
    pub goals_pool: GoalPool,
    pub board: Vec<Tile>,
    pub started_at: i64,
    pub score: i64,
    pub won: bool,
}

impl LegacySession {
    /// Read the shared fields; fails only on a missing or malformed board.
    pub fn read(obj: &Map<String, Value>) -> Result<Self, SchemaError> {
        let board = read_board(obj)?;
        Ok(LegacySession {
            size: BoardSize::clamped(fields::int(obj, "size").filter(|&n| n != 0).unwrap_or(5)),
            free: fields::flag(obj, "free"),
            win: fields::win(obj, "win"),
            goals_pool: fields::goals(obj, "goalsPool"),
            board,
            started_at: fields::int(obj, "startedAt").unwrap_or(0),
            score: fields::int(obj, "score").unwrap_or(0),
            won: fields::flag(obj, "won"),
        })
    }

    pub(crate) fn into_session(self) -> GameSession {
        GameSession {
            size: self.size,
            free_enabled: self.free,
            win_condition: self.win,
            goal_pool: self.goals_pool,
            board: self.board,
            started_at: self.started_at,
            score: self.score,
            won: self.won,
            ..GameSession::default()
        }
    }
}

/// Lift a legacy record into the current model: a full strike budget, a
/// running clock and no skipped tiles.
pub fn migrate_legacy(legacy: LegacySession) -> GameSession {
    let mut session = legacy.into_session();
    session.strikes_left = STRIKES_MAX;
    session.timer_paused = false;
    session.paused_at = 0;
    session.accumulated_pause_ms = 0;
    for tile in session.board.iter_mut() {
        tile.skipped = false;
    }
    finish(session)
}

// ---------------------------------------------------------------------------
// Current shape
// ---------------------------------------------------------------------------

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionRecord<'a> {
    size: BoardSize,
    free: bool,
    win: WinCondition,
    goals_pool: &'a GoalPool,
    board: &'a [Tile],
    started_at: i64,
    score: i64,
    bingos: usize,
    won: bool,
    last_bingo_lines_key: &'a str,
    timer_paused: bool,
    paused_at: i64,
    accumulated_pause_ms: i64,
    strikes_left: u8,
    elapsed_ms_at_win: i64,
    keep_playing_dismissed: bool,
}

fn record(s: &GameSession) -> SessionRecord<'_> {
    SessionRecord {
        size: s.size,
        free: s.free_enabled,
        win: s.win_condition,
        goals_pool: &s.goal_pool,
        board: &s.board,
        started_at: s.started_at,
        score: s.score,
        bingos: s.bingos,
        won: s.won,
        last_bingo_lines_key: &s.last_bingo_lines_key,
        timer_paused: s.timer_paused,
        paused_at: s.paused_at,
        accumulated_pause_ms: s.accumulated_pause_ms,
        strikes_left: s.strikes_left,
        elapsed_ms_at_win: s.elapsed_ms_at_win,
        keep_playing_dismissed: s.keep_playing_dismissed,
    }
}

pub fn session_to_value(session: &GameSession) -> Result<Value, serde_json::Error> {
    serde_json::to_value(record(session))
}

pub fn session_to_json(session: &GameSession) -> Result<String, serde_json::Error> {
    serde_json::to_string(&record(session))
}

/// Parse a stored record of either schema revision.
pub fn session_from_value(value: &Value) -> Result<GameSession, SchemaError> {
    let obj = value.as_object().ok_or(SchemaError::NotAnObject)?;
    let legacy = LegacySession::read(obj)?;

    if detect_version(obj) == SchemaVersion::Legacy {
        return Ok(migrate_legacy(legacy));
    }

    let mut session = legacy.into_session();
    session.strikes_left = fields::int(obj, "strikesLeft")
        .map_or(STRIKES_MAX, |n| n.clamp(0, STRIKES_MAX as i64) as u8);
    session.timer_paused = fields::flag(obj, "timerPaused");
    session.paused_at = fields::int(obj, "pausedAt").unwrap_or(0);
    session.accumulated_pause_ms = fields::int(obj, "accumulatedPauseMs").unwrap_or(0);
    session.elapsed_ms_at_win = fields::int(obj, "elapsedMsAtWin").unwrap_or(0);
    session.keep_playing_dismissed = fields::flag(obj, "keepPlayingDismissed");
    Ok(finish(session))
}

/// Enforce board invariants and re-derive line state from the tiles.
pub(crate) fn finish(mut session: GameSession) -> GameSession {
    if !session.board.is_empty() && !session.has_board() {
        warn!(
            tiles = session.board.len(),
            size = session.size.get(),
            "stored board does not match its size, discarding it"
        );
        session.board.clear();
    }
    normalize_board(&mut session);
    recompute_lines(&mut session);
    session
}

/// `#[serde(with = "serde_session")]` for fields holding a whole session.
pub mod serde_session {
    use super::*;

    pub fn serialize<S: Serializer>(session: &GameSession, serializer: S) -> Result<S::Ok, S::Error> {
        record(session).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<GameSession, D::Error> {
        let value = Value::deserialize(deserializer)?;
        session_from_value(&value).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn nine_tiles() -> Value {
        Value::Array(
            (0..9)
                .map(|i| json!({ "text": format!("g{i}"), "checked": i < 3, "free": false }))
                .collect(),
        )
    }

    #[test]
    fn current_record_round_trips() {
        let mut s = GameSession {
            size: BoardSize::clamped(3),
            free_enabled: false,
            goal_pool: GoalPool::from_lines(["a", "b"]),
            board: (0..9).map(|i| Tile::goal(format!("g{i}"))).collect(),
            started_at: 1_000,
            score: 42,
            strikes_left: 1,
            timer_paused: true,
            paused_at: 2_000,
            accumulated_pause_ms: 300,
            ..GameSession::default()
        };
        s.board[0].checked = true;
        s.board[0].skipped = true;
        let back = session_from_value(&session_to_value(&s).unwrap()).unwrap();
        assert_eq!(back, s);
    }

    #[test]
    fn legacy_record_is_migrated() {
        let raw = json!({
            "size": "3", "free": 0, "win": 2, "goalsPool": ["x", "y", 7],
            "board": nine_tiles(), "startedAt": 500, "score": 55, "bingos": 9, "won": false
        });
        let obj = raw.as_object().unwrap();
        assert_eq!(detect_version(obj), SchemaVersion::Legacy);

        let s = session_from_value(&raw).unwrap();
        assert_eq!(s.size.get(), 3);
        assert!(!s.free_enabled);
        assert_eq!(s.win_condition, WinCondition::Lines(2));
        assert_eq!(s.goal_pool.len(), 3);
        assert_eq!(s.strikes_left, STRIKES_MAX);
        assert_eq!(s.bingos, 1);
        assert_eq!(s.last_bingo_lines_key, "0,1,2");
        assert_eq!(s.score, 55);
    }

    #[test]
    fn missing_board_is_rejected() {
        let err = session_from_value(&json!({ "size": 5 })).unwrap_err();
        assert!(matches!(err, SchemaError::MissingBoard));
        let err = session_from_value(&json!({ "board": "nope" })).unwrap_err();
        assert!(matches!(err, SchemaError::MissingBoard));
    }

    #[test]
    fn partial_tile_is_rejected() {
        let err = session_from_value(&json!({ "board": [{ "checked": true }] })).unwrap_err();
        assert!(matches!(err, SchemaError::MalformedTile { index: 0, .. }));
    }

    #[test]
    fn garbage_fields_fall_back_to_defaults() {
        let raw = json!({
            "size": "huge", "win": null, "board": [], "score": "abc",
            "strikesLeft": 99, "pausedAt": {}
        });
        let s = session_from_value(&raw).unwrap();
        assert_eq!(s.size.get(), 5);
        assert_eq!(s.win_condition, WinCondition::Lines(1));
        assert_eq!(s.score, 0);
        assert_eq!(s.strikes_left, STRIKES_MAX);
        assert_eq!(s.paused_at, 0);
    }

    #[test]
    fn mismatched_board_is_discarded() {
        let raw = json!({ "size": 5, "board": nine_tiles(), "strikesLeft": 2 });
        let s = session_from_value(&raw).unwrap();
        assert!(s.board.is_empty());
        assert_eq!(s.strikes_left, 2);
    }
}
