use std::collections::HashSet;
use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::debug;

use crate::bingo_engine::{
    deck::{fisher_yates, GoalDeck},
    helpers::{recompute_lines, text_key},
    models::{BoardSize, GameSession, GoalPool, Tile, STRIKES_MAX},
};

/// Entropy-seeded unless a seed is given; seeds exist for tests and replays.
pub fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None       => StdRng::from_entropy(),
    }
}

/// Build a fresh `size`×`size` board from a shuffled copy of `pool`.
///
/// A short pool is padded with the placeholder goal rather than rejected, so
/// the card may contain repeated placeholder tiles.
pub fn generate_board<R: Rng>(
    pool: &GoalPool,
    size: BoardSize,
    free_enabled: bool,
    rng: &mut R,
) -> Vec<Tile> {
    let total = size.tile_count();
    let free_index = (free_enabled && size.is_odd()).then(|| size.center());
    let needed = total - usize::from(free_index.is_some());

    let mut deck = GoalDeck::new_shuffled(pool, rng);
    let mut picked = deck.deal_n(needed).into_iter();

    (0..total)
        .map(|i| {
            if Some(i) == free_index {
                Tile::free_space()
            } else {
                Tile::goal(picked.next().unwrap_or_default())
            }
        })
        .collect()
}

/// Replace the session's board and reset the run's score, strikes and win.
///
/// The clock is cleared; starting play sets it again.
pub fn regenerate<R: Rng>(session: &mut GameSession, rng: &mut R) {
    session.board = generate_board(&session.goal_pool, session.size, session.free_enabled, rng);
    session.score = 0;
    session.strikes_left = STRIKES_MAX;
    session.won = false;
    session.started_at = 0;
    session.editing = None;
    recompute_lines(session);
    debug!(
        size = session.size.get(),
        pool = session.goal_pool.len(),
        "generated board"
    );
}

/// Shuffle the texts of unchecked, non-free tiles among their own positions.
pub fn shuffle_unmarked<R: Rng>(board: &mut [Tile], rng: &mut R) {
    let slots: Vec<usize> = (0..board.len())
        .filter(|&i| !board[i].free && !board[i].checked)
        .collect();
    let mut texts: Vec<String> = slots.iter().map(|&i| board[i].text.clone()).collect();
    fisher_yates(&mut texts, rng);
    for (i, text) in slots.into_iter().zip(texts) {
        board[i].text = text;
    }
}

/// Pick a random pool goal that is not on the board and differs from
/// `exclude`, comparing case-insensitively.
pub fn pick_replacement<R: Rng>(
    board: &[Tile],
    pool: &GoalPool,
    exclude: &str,
    rng: &mut R,
) -> Option<String> {
    let used: HashSet<String> = board.iter().map(|t| text_key(&t.text)).collect();
    let exclude = text_key(exclude);
    let candidates: Vec<&String> = pool
        .iter()
        .filter(|g| {
            let key = text_key(g);
            !key.is_empty() && key != exclude && !used.contains(&key)
        })
        .collect();
    if candidates.is_empty() {
        return None;
    }
    Some(candidates[rng.gen_range(0..candidates.len())].clone())
}
