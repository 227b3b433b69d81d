//! JSON export and import of a single card.
//!
//! The export envelope carries setup, board and score but not strikes or
//! pause state; an imported card always starts with a full strike budget and a
//! running clock.

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::bingo_engine::models::{BoardSize, GameSession, GoalPool, Tile, WinCondition, STRIKES_MAX};
use crate::persistence::{
    error::{ImportError, SchemaError},
    schema::{fields, finish, LegacySession},
};

pub const EXPORT_VERSION: i64 = 1;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportEnvelope<'a> {
    v: i64,
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
}

/// Pretty-printed export of the current card.
pub fn export_json(session: &GameSession) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&ExportEnvelope {
        v: EXPORT_VERSION,
        size: session.size,
        free: session.free_enabled,
        win: session.win_condition,
        goals_pool: &session.goal_pool,
        board: &session.board,
        started_at: session.started_at,
        score: session.score,
        bingos: session.bingos,
        won: session.won,
        last_bingo_lines_key: &session.last_bingo_lines_key,
    })
}

/// The card size a board of `tiles` tiles was dealt for, if any.
fn size_for_tiles(tiles: usize) -> Option<BoardSize> {
    (BoardSize::MIN..=BoardSize::MAX)
        .map(|n| BoardSize::clamped(n as i64))
        .find(|size| size.tile_count() == tiles)
}

/// Parse an export envelope into a fresh session.
///
/// Only `board` is required. When `size` is absent or disagrees with the
/// board, the size is taken from the tile count. A missing or zero
/// `startedAt` becomes `now_ms`; line state is re-derived from the tiles.
#[instrument(skip(text), fields(len = text.len()))]
pub fn import_json(text: &str, now_ms: i64) -> Result<GameSession, ImportError> {
    let value: Value = serde_json::from_str(text)?;
    let obj = value.as_object().ok_or(SchemaError::NotAnObject)?;

    if obj.contains_key("v") {
        match fields::int(obj, "v") {
            Some(EXPORT_VERSION) => {}
            other => return Err(ImportError::UnsupportedVersion(other.unwrap_or(-1))),
        }
    }

    let mut legacy = LegacySession::read(obj)?;
    let tiles = legacy.board.len();
    if tiles != 0 && tiles != legacy.size.tile_count() {
        let size = size_for_tiles(tiles).ok_or(SchemaError::BoardSizeMismatch { tiles })?;
        debug!(tiles, from = legacy.size.get(), to = size.get(), "size taken from board");
        legacy.size = size;
    }

    let mut session = legacy.into_session();
    if session.started_at == 0 {
        session.started_at = now_ms;
    }
    session.strikes_left = STRIKES_MAX;
    session.timer_paused = false;
    session.paused_at = 0;
    session.accumulated_pause_ms = 0;
    let session = finish(session);
    debug!(tiles = session.board.len(), bingos = session.bingos, "imported card");
    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bingo_engine::models::FREE_SPACE_TEXT;

    fn played_session() -> GameSession {
        let mut board: Vec<Tile> = (0..9).map(|i| Tile::goal(format!("g{i}"))).collect();
        board[4] = Tile::free_space();
        for i in [3, 5] {
            board[i].checked = true;
        }
        let mut s = GameSession {
            size: BoardSize::clamped(3),
            win_condition: WinCondition::Lines(2),
            goal_pool: GoalPool::from_lines(["g0", "g1"]),
            board,
            started_at: 7_000,
            score: 105,
            strikes_left: 1,
            timer_paused: true,
            paused_at: 8_000,
            ..GameSession::default()
        };
        crate::bingo_engine::helpers::recompute_lines(&mut s);
        s
    }

    #[test]
    fn export_then_import_restores_the_card() {
        let s = played_session();
        let text = export_json(&s).unwrap();
        assert!(text.contains("\"v\": 1"));

        let back = import_json(&text, 99_000).unwrap();
        assert_eq!(back.board, s.board);
        assert_eq!(back.score, 105);
        assert_eq!(back.bingos, 1);
        assert_eq!(back.last_bingo_lines_key, "3,4,5");
        assert_eq!(back.started_at, 7_000);
        assert_eq!(back.strikes_left, STRIKES_MAX);
        assert!(!back.timer_paused);
    }

    #[test]
    fn import_fills_defaults_and_forces_free_center() {
        let text = r#"{"size":3,"free":true,"board":[
            {"text":"a","checked":false},{"text":"b","checked":false},{"text":"c","checked":false},
            {"text":"d","checked":true},{"text":"","checked":false},{"text":"f","checked":true},
            {"text":"g","checked":false},{"text":"h","checked":false},{"text":"i","checked":false}
        ],"bingos":4,"lastBingoLinesKey":"nonsense"}"#;
        let s = import_json(text, 1_234).unwrap();
        assert_eq!(s.started_at, 1_234);
        assert!(s.board[4].free && s.board[4].checked);
        assert_eq!(s.board[4].text, FREE_SPACE_TEXT);
        assert_eq!(s.bingos, 1);
        assert_eq!(s.last_bingo_lines_key, "3,4,5");
    }

    #[test]
    fn import_takes_size_from_the_board() {
        let tiles: Vec<String> = (0..9)
            .map(|i| format!(r#"{{"text":"g{i}","checked":{}}}"#, i % 4 == 0))
            .collect();
        let board = tiles.join(",");

        let s = import_json(&format!(r#"{{"board":[{board}]}}"#), 500).unwrap();
        assert_eq!(s.size.get(), 3);
        assert_eq!(s.board.len(), 9);
        assert!(s.has_board());
        assert_eq!(s.bingos, 1);
        assert_eq!(s.last_bingo_lines_key, "0,4,8");

        let s = import_json(&format!(r#"{{"size":5,"board":[{board}]}}"#), 500).unwrap();
        assert_eq!(s.size.get(), 3);
        assert_eq!(s.board.len(), 9);

        let seven = tiles[..7].join(",");
        assert!(matches!(
            import_json(&format!(r#"{{"board":[{seven}]}}"#), 500),
            Err(ImportError::Schema(SchemaError::BoardSizeMismatch { tiles: 7 }))
        ));
    }

    #[test]
    fn import_rejects_bad_input() {
        assert!(matches!(import_json("{oops", 0), Err(ImportError::InvalidJson(_))));
        assert!(matches!(
            import_json(r#"{"size":3}"#, 0),
            Err(ImportError::Schema(SchemaError::MissingBoard))
        ));
        assert!(matches!(
            import_json(r#"{"board":[{"text":1,"checked":true}]}"#, 0),
            Err(ImportError::Schema(SchemaError::MalformedTile { index: 0, .. }))
        ));
        assert!(matches!(
            import_json(r#"{"v":2,"board":[]}"#, 0),
            Err(ImportError::UnsupportedVersion(2))
        ));
        assert!(matches!(
            import_json("[1,2]", 0),
            Err(ImportError::Schema(SchemaError::NotAnObject))
        ));
    }
}
