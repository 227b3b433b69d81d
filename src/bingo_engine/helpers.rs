//! Shared functions used by the generator, the reducer and persistence.
//!
//! Every board mutation ends the same way: re-evaluate lines, diff the new
//! line key against the stored one, and keep `bingos` and
//! `last_bingo_lines_key` in step with the board. Those steps live here so the
//! reducer arms only describe what changes on the tile.

use crate::bingo_engine::{
    evaluator::{evaluate_lines, newly_completed},
    models::{GameSession, Tile},
};

/// Normalised comparison key for goal text.
pub fn text_key(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Re-derive `bingos` and the line key from the board, ignoring what was
/// stored before.
pub fn recompute_lines(session: &mut GameSession) {
    let eval = evaluate_lines(&session.board, session.size.get());
    session.bingos = eval.bingo_count;
    session.last_bingo_lines_key = eval.key();
}

/// Re-derive `bingos` and the line key, returning how many lines were not in
/// the previous key.
pub fn refresh_lines(session: &mut GameSession) -> usize {
    let eval = evaluate_lines(&session.board, session.size.get());
    let key = eval.key();
    let newly = newly_completed(&session.last_bingo_lines_key, &key);
    session.bingos = eval.bingo_count;
    session.last_bingo_lines_key = key;
    newly
}

/// Restore `free ⇒ checked` and `skipped ⇒ checked` on every tile, and make
/// the center tile the only free space, and only when the setup calls for one.
pub fn normalize_board(session: &mut GameSession) {
    let free_index = session.free_index();
    for (i, tile) in session.board.iter_mut().enumerate() {
        if tile.free && Some(i) != free_index {
            tile.free = false;
        }
        if tile.free || tile.skipped {
            tile.checked = true;
        }
    }
    if let Some(center) = free_index {
        if let Some(tile) = session.board.get_mut(center) {
            tile.free = true;
            tile.checked = true;
            tile.skipped = false;
            if tile.text.trim().is_empty() {
                *tile = Tile::free_space();
            }
        }
    }
}
