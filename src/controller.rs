//! The single owner of a live game.
//!
//! [`BingoController`] holds the session, runs each intent through the
//! reducer, then persists the result, tracks the best score and hands events
//! to a [`Feedback`] sink. Storage failures are logged and never interrupt
//! play.

use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::bingo_engine::{
    generator::make_rng,
    models::{GameSession, GoalPool, Screen},
    reducer::{reduce, GameEvent, Intent, Transition},
    timer::elapsed_ms,
};
use crate::clock::{Clock, SystemClock};
use crate::persistence::{
    apply_share, decode_share, export_json, import_json, share_url, BingoStorage, GoalPoolPreset,
    ImportError, KeyValueStore, SavedCard, SavedSlot, ShareError, StorageError,
};
use crate::view_adapter::to_view_state;

/// Receives game events for sound effects or animation.
pub trait Feedback {
    fn on_event(&mut self, event: &GameEvent);
}

/// Ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentFeedback;

impl Feedback for SilentFeedback {
    fn on_event(&mut self, _event: &GameEvent) {}
}

impl<F: FnMut(&GameEvent)> Feedback for F {
    fn on_event(&mut self, event: &GameEvent) {
        self(event)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControllerOptions {
    /// Fixed seed for board generation; entropy when `None`.
    #[serde(default)]
    pub rng_seed: Option<u64>,
}

pub struct BingoController<S, C = SystemClock, F = SilentFeedback> {
    storage: BingoStorage<S>,
    clock: C,
    feedback: F,
    rng: StdRng,
    session: GameSession,
    best: i64,
}

impl<S: KeyValueStore, C: Clock, F: Feedback> BingoController<S, C, F> {
    /// Restore the stored game, or start a fresh one.
    pub fn new(store: S, clock: C, feedback: F, options: ControllerOptions) -> Self {
        Self::boot(store, clock, feedback, options, None)
    }

    /// As [`BingoController::new`], but a valid share payload in `fragment`
    /// replaces whatever was stored.
    #[instrument(skip(store, clock, feedback), fields(shared = fragment.is_some()))]
    pub fn boot(
        store: S,
        clock: C,
        feedback: F,
        options: ControllerOptions,
        fragment: Option<&str>,
    ) -> Self {
        let storage = BingoStorage::new(store);
        let shared = fragment.and_then(|f| match decode_share(f) {
            Ok(setup) => Some(apply_share(setup)),
            Err(ShareError::Missing) => None,
            Err(e) => {
                warn!(error = %e, "ignoring unreadable share link");
                None
            }
        });
        let from_share = shared.is_some();

        let mut session = shared.or_else(|| storage.load()).unwrap_or_default();
        if session.goal_pool.is_empty() {
            session.goal_pool = GoalPool::sample();
        }
        session.screen = Screen::Start;
        session.editing = None;

        let best = storage.best_score();
        let mut controller = BingoController {
            storage,
            clock,
            feedback,
            rng: make_rng(options.rng_seed),
            session,
            best,
        };
        if from_share {
            controller.persist();
        }
        info!(
            has_board = controller.session.has_board(),
            from_share,
            "controller ready"
        );
        controller
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn storage(&self) -> &BingoStorage<S> {
        &self.storage
    }

    pub fn best_score(&self) -> i64 {
        self.best
    }

    pub fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }

    pub fn elapsed_ms(&self) -> i64 {
        elapsed_ms(&self.session, self.clock.now_ms())
    }

    /// The JSON view model for the current state.
    pub fn view(&self) -> Value {
        to_view_state(&self.session, self.best, self.clock.now_ms())
    }

    fn persist(&mut self) {
        if let Err(e) = self.storage.save(&self.session) {
            warn!(error = %e, "could not save game");
        }
    }

    fn track_best(&mut self) {
        if self.session.score <= self.best {
            return;
        }
        self.best = self.session.score;
        if let Err(e) = self.storage.record_score(self.best) {
            warn!(error = %e, "could not save best score");
        }
    }

    fn replace_session(&mut self, session: GameSession) {
        self.session = session;
        self.persist();
        self.track_best();
    }

    /// Apply one intent: reduce, persist if anything changed, update the best
    /// score, then notify feedback.
    #[instrument(skip(self))]
    pub fn dispatch(&mut self, intent: Intent) -> Transition {
        let now = self.clock.now_ms();
        let transition = reduce(&self.session, intent, now, &mut self.rng);

        if let Some(reason) = transition.rejection() {
            debug!(?reason, "intent rejected");
        }
        if transition.session != self.session {
            self.replace_session(transition.session.clone());
        }
        for event in &transition.events {
            self.feedback.on_event(event);
        }
        transition
    }

    // -- Export, import and share ------------------------------------------

    pub fn export_json(&self) -> Result<String, serde_json::Error> {
        export_json(&self.session)
    }

    /// Replace the game with an exported card and go to the play screen.
    pub fn import_json(&mut self, text: &str) -> Result<(), ImportError> {
        let mut session = import_json(text, self.clock.now_ms())?;
        session.screen = Screen::Play;
        info!(tiles = session.board.len(), "imported card");
        self.replace_session(session);
        Ok(())
    }

    pub fn share_url(&self, base: &str) -> Result<String, serde_json::Error> {
        share_url(base, &self.session.setup())
    }

    /// Replace setup from a share link, dropping the board and progress.
    pub fn apply_share(&mut self, fragment: &str) -> Result<(), ShareError> {
        let setup = decode_share(fragment)?;
        self.replace_session(apply_share(setup));
        Ok(())
    }

    // -- Goal pool presets --------------------------------------------------

    pub fn pools(&self) -> Vec<GoalPoolPreset> {
        self.storage.pools()
    }

    pub fn save_pool(&mut self, name: &str) -> Result<Option<GoalPoolPreset>, StorageError> {
        let now = self.clock.now_ms();
        self.storage.save_pool(name, &self.session.goal_pool, now)
    }

    /// Put a saved pool into the setup; returns `false` for an unknown id.
    pub fn load_pool(&mut self, id: &str) -> bool {
        let Some(goals) = self.storage.load_pool(id) else {
            return false;
        };
        let mut setup = self.session.setup();
        setup.goals = goals;
        self.dispatch(Intent::ApplySetup { setup });
        true
    }

    pub fn delete_pool(&mut self, id: &str) -> Result<bool, StorageError> {
        self.storage.delete_pool(id)
    }

    // -- Saved cards --------------------------------------------------------

    pub fn saved_cards(&self) -> Vec<SavedCard> {
        self.storage.saved_cards()
    }

    pub fn save_card(&mut self, name: &str) -> Result<SavedCard, StorageError> {
        let now = self.clock.now_ms();
        self.storage.save_card(name, &self.session, now)
    }

    pub fn delete_card(&mut self, id: &str) -> Result<bool, StorageError> {
        self.storage.delete_card(id)
    }

    // -- Saved slots --------------------------------------------------------

    pub fn saved_slots(&self) -> Vec<SavedSlot> {
        self.storage.saved_slots()
    }

    pub fn save_slot(&mut self, title: &str) -> Result<SavedSlot, StorageError> {
        let now = self.clock.now_ms();
        self.storage.save_slot(title, &self.session, now)
    }

    /// Resume a saved slot; returns `false` for an unknown id.
    pub fn load_slot(&mut self, id: &str) -> bool {
        let Some(mut session) = self.storage.load_slot(id) else {
            return false;
        };
        session.screen = if session.has_board() { Screen::Play } else { Screen::Start };
        self.replace_session(session);
        true
    }

    pub fn delete_slot(&mut self, id: &str) -> Result<bool, StorageError> {
        self.storage.delete_slot(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use crate::clock::ManualClock;
    use crate::persistence::{encode_share, MemoryStore};
    use crate::bingo_engine::models::{BoardSize, SessionSetup, WinCondition};

    fn seeded() -> ControllerOptions {
        ControllerOptions { rng_seed: Some(17) }
    }

    fn fresh(clock: &ManualClock) -> BingoController<MemoryStore, &ManualClock> {
        BingoController::new(MemoryStore::new(), clock, SilentFeedback, seeded())
    }

    #[test]
    fn boot_without_storage_uses_sample_goals() {
        let clock = ManualClock::new(1_000);
        let c = fresh(&clock);
        assert_eq!(c.session().goal_pool.len(), 25);
        assert_eq!(c.session().screen, Screen::Start);
        assert!(!c.session().has_board());
    }

    #[test]
    fn dispatch_persists_and_tracks_best() {
        let clock = ManualClock::new(1_000);
        let mut c = fresh(&clock);
        c.dispatch(Intent::Start);
        clock.advance(2_000);
        let t = c.dispatch(Intent::Toggle { index: 0 });
        assert_eq!(t.score_delta(), 10);
        assert_eq!(c.best_score(), 10);
        assert_eq!(c.elapsed_ms(), 2_000);

        let stored = c.storage().load().unwrap();
        assert!(stored.board[0].checked);
        assert_eq!(c.storage().best_score(), 10);
    }

    #[test]
    fn feedback_sees_every_event() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let clock = ManualClock::new(0);
        let mut c = BingoController::new(
            MemoryStore::new(),
            &clock,
            move |e: &GameEvent| sink.borrow_mut().push(e.clone()),
            seeded(),
        );
        c.dispatch(Intent::Start);
        c.dispatch(Intent::Pause);
        let events = seen.borrow();
        assert!(events.contains(&GameEvent::GameStarted));
        assert!(events.contains(&GameEvent::Paused));
    }

    #[test]
    fn restored_game_survives_a_restart() {
        let clock = ManualClock::new(500);
        let mut c = fresh(&clock);
        c.dispatch(Intent::Start);
        c.dispatch(Intent::Toggle { index: 3 });
        let store = c.storage;

        let again: BingoController<MemoryStore, &ManualClock> =
            BingoController::new(store.into_inner(), &clock, SilentFeedback, seeded());
        assert!(again.session().board[3].checked);
        assert_eq!(again.session().screen, Screen::Start);
        assert_eq!(again.best_score(), 10);
    }

    #[test]
    fn share_fragment_overrides_storage() {
        let clock = ManualClock::new(0);
        let setup = SessionSetup {
            size: BoardSize::clamped(3),
            free: true,
            win: WinCondition::Lines(2),
            goals: GoalPool::from_lines(["a", "b"]),
        };
        let fragment = format!("#{}", encode_share(&setup).unwrap());
        let c: BingoController<MemoryStore, &ManualClock> = BingoController::boot(
            MemoryStore::new(),
            &clock,
            SilentFeedback,
            seeded(),
            Some(&fragment),
        );
        assert_eq!(c.session().setup(), setup);
        assert_eq!(c.storage().load().unwrap().goal_pool.len(), 2);
    }

    #[test]
    fn import_replaces_the_game() {
        let clock = ManualClock::new(9_000);
        let mut c = fresh(&clock);
        c.dispatch(Intent::Start);
        c.dispatch(Intent::Toggle { index: 1 });
        let text = c.export_json().unwrap();
        c.dispatch(Intent::NewRound);

        c.import_json(&text).unwrap();
        assert!(c.session().board[1].checked);
        assert_eq!(c.session().screen, Screen::Play);
        assert!(c.import_json("{}").is_err());
    }

    #[test]
    fn pools_and_slots_round_trip_through_the_controller() {
        let clock = ManualClock::new(100);
        let mut c = fresh(&clock);
        let preset = c.save_pool("Sample").unwrap().unwrap();
        c.dispatch(Intent::NewRound);
        assert!(c.session().goal_pool.is_empty());
        assert!(c.load_pool(&preset.id));
        assert_eq!(c.session().goal_pool.len(), 25);
        assert!(!c.load_pool("p_missing"));

        c.dispatch(Intent::Start);
        let slot = c.save_slot("Morning").unwrap();
        c.dispatch(Intent::BackToSetup);
        assert!(c.load_slot(&slot.id));
        assert!(c.session().has_board());
        assert_eq!(c.session().screen, Screen::Play);
        assert_eq!(c.saved_slots().len(), 1);
    }
}
