//! Pause-aware play clock.
//!
//! Elapsed time is `now - started_at - accumulated_pause_ms`, less the pause
//! still in progress. All timestamps are Unix milliseconds.

use crate::bingo_engine::models::GameSession;

/// Play time in milliseconds; 0 before the clock starts, never negative.
pub fn elapsed_ms(session: &GameSession, now_ms: i64) -> i64 {
    if session.started_at == 0 {
        return 0;
    }
    let mut elapsed = now_ms
        .saturating_sub(session.started_at)
        .saturating_sub(session.accumulated_pause_ms);
    if session.timer_paused && session.paused_at != 0 {
        elapsed = elapsed.saturating_sub(now_ms.saturating_sub(session.paused_at));
    }
    elapsed.max(0)
}

/// Start a pause; returns `false` if already paused.
pub fn pause(session: &mut GameSession, now_ms: i64) -> bool {
    if session.timer_paused {
        return false;
    }
    session.timer_paused = true;
    session.paused_at = now_ms;
    true
}

/// End a pause, folding its length into the accumulator; returns `false` if
/// the clock was running.
pub fn resume(session: &mut GameSession, now_ms: i64) -> bool {
    if !session.timer_paused {
        return false;
    }
    if session.paused_at != 0 {
        let paused_for = now_ms.saturating_sub(session.paused_at).max(0);
        session.accumulated_pause_ms = session.accumulated_pause_ms.saturating_add(paused_for);
    }
    session.timer_paused = false;
    session.paused_at = 0;
    true
}

/// Drop any pause state without crediting it.
pub fn clear_pause(session: &mut GameSession) {
    session.timer_paused = false;
    session.paused_at = 0;
    session.accumulated_pause_ms = 0;
}

/// Start the clock over from `now_ms`.
pub fn restart(session: &mut GameSession, now_ms: i64) {
    session.started_at = now_ms;
    clear_pause(session);
}

/// `m:ss`, e.g. `3:07`.
pub fn format_time(ms: i64) -> String {
    let s = (ms / 1000).max(0);
    format!("{}:{:02}", s / 60, s % 60)
}
