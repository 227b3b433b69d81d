//! Crate-level tests for `goal_bingo`.
//!
//! Included from `lib.rs` under `#[cfg(test)]`.
//!
//! # Coverage
//!
//! | Group | What is tested |
//! |-------|----------------|
//! | Lines | `2*size+2` candidates for every size; completed count bounded; key idempotent |
//! | Score law | Every toggle's delta equals mark/unmark points plus 75 per new line |
//! | Strikes | Budget only falls by one per successful action, floors at 0, resets on regenerate/reset |
//! | Scenarios | Row bingo with free centre, exhausted replacement, skip on a checked tile, pause accounting |
//! | Round-trip | Export then import keeps the card and re-derives line state |
//! | End to end | Controller over a `FileStore` survives a restart |

use rand::{rngs::StdRng, Rng};

use crate::bingo_engine::{
    evaluator::{board_key, candidate_lines, evaluate_lines, newly_completed},
    generator::{generate_board, make_rng},
    models::{BoardSize, GameSession, GoalPool, SessionSetup, Tile, WinCondition, STRIKES_MAX},
    reducer::{reduce, GameEvent, Intent, RejectReason},
    timer::elapsed_ms,
};
use crate::clock::ManualClock;
use crate::controller::{BingoController, ControllerOptions, SilentFeedback};
use crate::persistence::{export_json, import_json, FileStore};

// ── helpers ──────────────────────────────────────────────────────────────────

/// A started session on a seeded RNG.
fn started(size: u8, free: bool, win: WinCondition, seed: u64) -> (GameSession, StdRng) {
    let mut rng = make_rng(Some(seed));
    let s = GameSession::new(SessionSetup {
        size: BoardSize::from(size),
        free,
        win,
        goals: GoalPool::sample(),
    });
    let s = reduce(&s, Intent::Start, 1_000, &mut rng).session;
    (s, rng)
}

/// Seeds that span different RNG states.
const SEEDS: [u64; 5] = [1, 42, 999, 0xDEAD_BEEF, 7];

// ── lines ────────────────────────────────────────────────────────────────────

#[test]
fn every_size_has_two_n_plus_two_lines() {
    for n in 3..=5 {
        let lines = candidate_lines(n);
        assert_eq!(lines.len(), 2 * n + 2, "line count for {n}×{n}");
        assert!(lines.iter().all(|l| l.len() == n));
    }
}

#[test]
fn completed_lines_never_exceed_candidates() {
    for seed in SEEDS {
        let mut rng = make_rng(Some(seed));
        for n in 3..=5u8 {
            let mut board = generate_board(&GoalPool::sample(), BoardSize::from(n), true, &mut rng);
            for tile in board.iter_mut() {
                tile.checked |= rng.gen_bool(0.7);
            }
            let eval = evaluate_lines(&board, n as usize);
            assert!(eval.bingo_count <= 2 * n as usize + 2);
            assert_eq!(eval.key(), evaluate_lines(&board, n as usize).key());
        }
    }
}

#[test]
fn full_board_completes_every_line() {
    let board: Vec<Tile> = (0..16)
        .map(|i| Tile { checked: true, ..Tile::goal(format!("g{i}")) })
        .collect();
    let eval = evaluate_lines(&board, 4);
    assert_eq!(eval.bingo_count, 10);
    assert_eq!(board_key(&eval.winning_lines).split('|').count(), 10);
}

// ── score law ────────────────────────────────────────────────────────────────

#[test]
fn toggle_delta_follows_the_score_law() {
    for seed in SEEDS {
        let (mut s, mut rng) = started(5, true, WinCondition::Blackout, seed);
        for _ in 0..120 {
            let index = rng.gen_range(0..25);
            let t = reduce(&s, Intent::Toggle { index }, 2_000, &mut rng);
            if t.rejection().is_some() {
                assert_eq!(t.session, s);
                continue;
            }
            let became_checked = !s.board[index].checked && t.session.board[index].checked;
            let newly = newly_completed(&s.last_bingo_lines_key, &t.session.last_bingo_lines_key);
            let expected = (if became_checked { 10 } else { -8 }) + 75 * newly as i64;
            assert_eq!(t.score_delta(), expected, "seed {seed} tile {index}");
            assert_eq!(t.session.score - s.score, expected);
            s = t.session;
        }
    }
}

// ── strikes ──────────────────────────────────────────────────────────────────

#[test]
fn strike_budget_only_falls_by_one() {
    for seed in SEEDS {
        let (mut s, mut rng) = started(4, false, WinCondition::Lines(5), seed);
        for step in 0..40 {
            let index = rng.gen_range(0..16);
            let intent = match step % 3 {
                0 => Intent::Skip { index },
                1 => Intent::Replace { index },
                _ => Intent::BeginEdit { index },
            };
            let before = s.strikes_left;
            let t = reduce(&s, intent, 3_000, &mut rng);
            let spent = t.events.iter().any(|e| matches!(e, GameEvent::StrikeSpent { .. }));
            if spent {
                assert_eq!(t.session.strikes_left, before - 1);
            } else {
                assert_eq!(t.session.strikes_left, before);
            }
            s = reduce(&t.session, Intent::CancelEdit, 3_000, &mut rng).session;
        }
        assert_eq!(s.strikes_left, 0);

        let reset = reduce(&s, Intent::ResetMarks, 4_000, &mut rng).session;
        assert_eq!(reset.strikes_left, STRIKES_MAX);
        let regenerated = reduce(&s, Intent::Generate, 4_000, &mut rng).session;
        assert_eq!(regenerated.strikes_left, STRIKES_MAX);
    }
}

// ── scenarios ────────────────────────────────────────────────────────────────

#[test]
fn row_bingo_with_free_centre_wins_once() {
    let (mut s, mut rng) = started(5, true, WinCondition::Lines(1), 42);
    assert!(s.board[12].free && s.board[12].checked);

    let mut marks = 0;
    let mut won = 0;
    for index in 0..5 {
        let t = reduce(&s, Intent::Toggle { index }, 5_000, &mut rng);
        marks += t.events.iter().filter(|e| matches!(e, GameEvent::Marked { .. })).count();
        won += usize::from(t.just_won());
        s = t.session;
    }
    assert_eq!(s.bingos, 1);
    assert_eq!(s.last_bingo_lines_key, "0,1,2,3,4");
    assert_eq!(marks, 5);
    assert_eq!(won, 1);
    assert!(s.won);
    assert_eq!(s.score, 5 * 10 + 75);
}

#[test]
fn replace_refused_when_pool_is_exhausted() {
    let mut rng = make_rng(Some(3));
    let goals = GoalPool::from_lines((1..=8).map(|i| format!("goal {i}")));
    let s = GameSession::new(SessionSetup {
        size: BoardSize::clamped(3),
        free: true,
        win: WinCondition::Lines(1),
        goals,
    });
    let s = reduce(&s, Intent::Start, 1_000, &mut rng).session;

    let t = reduce(&s, Intent::Replace { index: 0 }, 2_000, &mut rng);
    assert_eq!(t.rejection(), Some(RejectReason::NoReplacement));
    assert_eq!(t.session.strikes_left, STRIKES_MAX);
    assert_eq!(t.session.score, s.score);
    assert_eq!(t.session, s);
}

#[test]
fn skip_on_checked_tile_costs_only_the_penalty() {
    let (s, mut rng) = started(3, false, WinCondition::Lines(3), 9);
    let s = reduce(&s, Intent::Toggle { index: 4 }, 2_000, &mut rng).session;
    assert_eq!(s.score, 10);

    let t = reduce(&s, Intent::Skip { index: 4 }, 2_500, &mut rng);
    assert!(t.session.board[4].skipped && t.session.board[4].checked);
    assert_eq!(t.score_delta(), -10);
    assert_eq!(t.session.strikes_left, STRIKES_MAX - 1);
}

#[test]
fn paused_time_is_excluded_from_elapsed() {
    let (s, mut rng) = started(3, true, WinCondition::Lines(1), 1);
    let paused = reduce(&s, Intent::Pause, 11_000, &mut rng).session;
    assert_eq!(elapsed_ms(&paused, 25_000), 10_000);

    let resumed = reduce(&paused, Intent::Resume, 41_000, &mut rng).session;
    assert_eq!(resumed.accumulated_pause_ms, 30_000);
    assert_eq!(elapsed_ms(&resumed, 41_000), 10_000);
    assert_eq!(elapsed_ms(&resumed, 42_500), 11_500);
}

// ── round-trip ───────────────────────────────────────────────────────────────

#[test]
fn export_import_reproduces_the_card() {
    for seed in SEEDS {
        let (mut s, mut rng) = started(5, true, WinCondition::Lines(2), seed);
        for index in [0, 6, 18, 24, 3] {
            s = reduce(&s, Intent::Toggle { index }, 3_000, &mut rng).session;
        }
        let back = import_json(&export_json(&s).unwrap(), 50_000).unwrap();
        assert_eq!(back.setup(), s.setup());
        assert_eq!(back.board, s.board);
        assert_eq!(back.score, s.score);
        assert_eq!(back.won, s.won);
        assert_eq!(back.started_at, s.started_at);

        let eval = evaluate_lines(&back.board, 5);
        assert_eq!(back.bingos, eval.bingo_count);
        assert_eq!(back.last_bingo_lines_key, eval.key());
    }
}

// ── end to end ───────────────────────────────────────────────────────────────

#[test]
fn controller_over_file_store_survives_restart() {
    let dir = std::env::temp_dir().join(format!("goal_bingo_e2e_{}", std::process::id()));
    let clock = ManualClock::new(1_000);
    let options = ControllerOptions { rng_seed: Some(5) };

    let mut c = BingoController::new(FileStore::open(&dir).unwrap(), &clock, SilentFeedback, options.clone());
    c.dispatch(Intent::Start);
    clock.advance(4_000);
    c.dispatch(Intent::Toggle { index: 0 });
    c.dispatch(Intent::Skip { index: 1 });
    let board = c.session().board.clone();

    let again = BingoController::new(FileStore::open(&dir).unwrap(), &clock, SilentFeedback, options);
    assert_eq!(again.session().board, board);
    assert_eq!(again.session().strikes_left, STRIKES_MAX - 1);
    assert_eq!(again.elapsed_ms(), 4_000);
    assert_eq!(again.best_score(), 10);
    let _ = std::fs::remove_dir_all(&dir);
}
