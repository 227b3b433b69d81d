//! Plays one short game of goal bingo in the terminal.
//!
//! Run with: `cargo run --example demo`
//!
//! Set `RUST_LOG=goal_bingo=debug` to see the engine's tracing output.
//!
//! The demo walks through:
//!
//! 1. **Setup**: a 3×3 card with a free centre, won by two lines.
//! 2. **Play**: marks, a skip strike and a replace strike, with every event
//!    and toast printed as it happens.
//! 3. **Pause**: the clock stops while paused.
//! 4. **Sharing**: the export envelope and a share link for the same setup.
//!
//! Everything is stored in a temporary directory through `FileStore`, and the
//! RNG is seeded so the output is reproducible.

use goal_bingo::{
    persistence::FileStore, BingoController, ControllerOptions, GameEvent, GoalPool, Intent,
    ManualClock, SessionSetup, Tile, WinCondition, BoardSize,
};
use tracing_subscriber::EnvFilter;

/// Print the card as a grid.
fn print_board(board: &[Tile], size: usize) {
    for row in board.chunks(size) {
        let cells: Vec<String> = row.iter().map(|t| format!("{:<28}", t.to_string())).collect();
        println!("  {}", cells.join(""));
    }
}

fn print_event(event: &GameEvent) {
    println!("    event: {}", serde_json::to_string(event).unwrap_or_default());
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let dir = std::env::temp_dir().join("goal_bingo_demo");
    let store = match FileStore::open(&dir) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("cannot open {}: {e}", dir.display());
            return;
        }
    };
    let clock = ManualClock::new(1_700_000_000_000);
    let mut game = BingoController::new(
        store,
        &clock,
        print_event,
        ControllerOptions { rng_seed: Some(2024) },
    );

    // ── Setup ────────────────────────────────────────────────────────────────
    println!();
    println!("══ Setup ══");
    game.dispatch(Intent::NewRound);
    let setup = SessionSetup {
        size: BoardSize::clamped(3),
        free: true,
        win: WinCondition::Lines(2),
        goals: GoalPool::from_text(
            "Read 20 pages\nWalk 20 minutes\nDrink 2L of water\nStretch 10 minutes\n\
             Write 200 words\nCook a healthy meal\nClean your desk\nSend a kind message\n\
             Meditate 5 minutes\nDeclutter 5 items",
        ),
    };
    game.dispatch(Intent::ApplySetup { setup });
    game.dispatch(Intent::Generate);
    println!("  {}", game.view()["setup"]["goalsCounter"]);
    println!("  {}", game.view()["setup"]["hint"]);

    // ── Play ─────────────────────────────────────────────────────────────────
    println!();
    println!("══ Play ══");
    game.dispatch(Intent::Start);
    print_board(&game.session().board, 3);

    for intent in [
        Intent::Toggle { index: 0 },
        Intent::Toggle { index: 4 },
        Intent::Skip { index: 8 },
        Intent::Replace { index: 1 },
        Intent::Toggle { index: 3 },
        Intent::Toggle { index: 5 },
    ] {
        clock.advance(45_000);
        println!("  > {}", serde_json::to_string(&intent).unwrap_or_default());
        let t = game.dispatch(intent);
        for notice in &t.notices {
            println!("    toast: {notice}");
        }
    }

    // ── Pause ────────────────────────────────────────────────────────────────
    println!();
    println!("══ Pause ══");
    game.dispatch(Intent::Pause);
    clock.advance(600_000);
    let refused = game.dispatch(Intent::Toggle { index: 2 });
    println!("  while paused: {:?}", refused.rejection());
    game.dispatch(Intent::Resume);
    println!("  elapsed after a 10 minute pause: {}", game.view()["stats"]["time"]);

    // ── Result ───────────────────────────────────────────────────────────────
    println!();
    println!("══ Result ══");
    print_board(&game.session().board, 3);
    println!("  stats: {}", game.view()["stats"]);

    // ── Sharing ──────────────────────────────────────────────────────────────
    println!();
    println!("══ Sharing ══");
    match game.share_url("https://example.test/bingo") {
        Ok(url) => println!("  link: {url}"),
        Err(e) => println!("  link failed: {e}"),
    }
    match game.export_json() {
        Ok(json) => println!("{json}"),
        Err(e) => println!("  export failed: {e}"),
    }
    println!();
    println!("  saved under {}", dir.display());
}
