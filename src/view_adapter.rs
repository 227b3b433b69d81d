use serde_json::{json, Value};

use crate::bingo_engine::{
    models::{GameSession, Tile, WinCondition},
    timer::{elapsed_ms, format_time},
};

/// Text shown on a cell; blank goals render as a dash.
fn cell_text(tile: &Tile) -> &str {
    if tile.text.trim().is_empty() {
        "-"
    } else {
        &tile.text
    }
}

/// Build one cell entry.
fn cell(index: usize, tile: &Tile, editing: Option<usize>) -> Value {
    json!({
        "index":   index,
        "text":    cell_text(tile),
        "checked": tile.checked,
        "free":    tile.free,
        "skipped": tile.skipped,
        "locked":  tile.is_locked(),
        "editing": editing == Some(index)
    })
}

/// "Blackout", "1 Bingo", "3 Bingos".
fn win_label(win: WinCondition) -> String {
    if win.is_blackout() {
        return "Blackout".to_string();
    }
    match win.required_lines().unwrap_or(1) {
        1 => "1 Bingo".to_string(),
        n => format!("{n} Bingos"),
    }
}

fn plural(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}

/// Goal counter, start button state and hint for the setup screen.
fn setup_block(session: &GameSession) -> Value {
    let pool = session.goal_pool.len();
    let needs = session.goals_needed();
    let has_board = session.has_board();
    let remaining = needs.saturating_sub(pool);

    let hint = if remaining > 0 {
        format!(
            "Add {remaining} more goal{} to fill a {} board.",
            plural(remaining),
            session.size
        )
    } else if !has_board {
        "Click Generate to preview your board before starting.".to_string()
    } else {
        "Ready to start!".to_string()
    };

    json!({
        "size":         session.size.get(),
        "free":         session.free_enabled,
        "win":          session.win_condition,
        "goals":        session.goal_pool.to_text(),
        "goalsCounter": format!("Goals: {pool}/{needs}"),
        "startEnabled": pool >= needs && has_board,
        "hint":         hint,
        "hintHidden":   remaining == 0 && has_board
    })
}

fn stats_block(session: &GameSession, best: i64, now_ms: i64) -> Value {
    let elapsed = if session.won {
        session.elapsed_ms_at_win
    } else {
        elapsed_ms(session, now_ms)
    };
    json!({
        "score":       session.display_score(),
        "best":        best.max(0),
        "bingos":      session.bingos,
        "marked":      session.marked_count(),
        "total":       session.board.len(),
        "strikesLeft": session.strikes_left,
        "time":        format_time(elapsed),
        "elapsedMs":   elapsed,
        "paused":      session.timer_paused,
        "won":         session.won
    })
}

/// Convert a session into the JSON view model a renderer draws from.
pub fn to_view_state(session: &GameSession, best: i64, now_ms: i64) -> Value {
    let cells: Vec<Value> = session
        .board
        .iter()
        .enumerate()
        .map(|(i, t)| cell(i, t, session.editing))
        .collect();

    json!({
        "screen":   session.screen,
        "size":     session.size.get(),
        "winLabel": win_label(session.win_condition),
        "cells":    cells,
        "stats":    stats_block(session, best, now_ms),
        "setup":    setup_block(session)
    })
}
