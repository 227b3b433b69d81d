use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::bingo_engine::models::{GameSession, GoalPool};
use crate::persistence::{
    error::StorageError,
    saved::{
        next_id, parse_cards, parse_list, pool_name, push_front_capped, remove_by_id, slot_title,
        GoalPoolPreset, SavedCard, SavedSlot,
    },
    schema::{session_from_value, session_to_json},
    store::KeyValueStore,
};

pub const SESSION_KEY: &str = "goal_bingo_v1";
pub const BEST_SCORE_KEY: &str = "goal_bingo_best_v1";
pub const POOLS_KEY: &str = "goal_bingo_pools_v1";
pub const CARDS_KEY: &str = "goal_bingo_saved_card_v1";
pub const SLOTS_KEY: &str = "goal_bingo_slots_v1";

/// Typed access to everything the game keeps in a [`KeyValueStore`].
///
/// Reads never fail: a missing, unreadable or malformed value is logged and
/// treated as absent. Writes surface [`StorageError`].
#[derive(Debug)]
pub struct BingoStorage<S> {
    store: S,
}

impl<S: KeyValueStore> BingoStorage<S> {
    pub fn new(store: S) -> Self {
        BingoStorage { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.store.get(key) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(key, error = %e, "storage read failed");
                None
            }
        }
    }

    fn write_json<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<(), StorageError> {
        let raw = serde_json::to_string(value)
            .map_err(|source| StorageError::Encode { key: key.to_string(), source })?;
        self.store.set(key, &raw)
    }

    // -- Current game -------------------------------------------------------

    #[instrument(skip_all, fields(tiles = session.board.len(), score = session.score))]
    pub fn save(&mut self, session: &GameSession) -> Result<(), StorageError> {
        let raw = session_to_json(session)
            .map_err(|source| StorageError::Encode { key: SESSION_KEY.to_string(), source })?;
        self.store.set(SESSION_KEY, &raw)
    }

    /// The stored game, if there is a readable one.
    #[instrument(skip(self))]
    pub fn load(&self) -> Option<GameSession> {
        let raw = self.read(SESSION_KEY)?;
        let value: Value = match serde_json::from_str(&raw) {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "stored game is not valid JSON");
                return None;
            }
        };
        match session_from_value(&value) {
            Ok(session) => {
                debug!(tiles = session.board.len(), "loaded stored game");
                Some(session)
            }
            Err(e) => {
                warn!(error = %e, "stored game is malformed");
                None
            }
        }
    }

    /// True when a stored game with a full board exists.
    pub fn has_saved_game(&self) -> bool {
        self.load().map_or(false, |s| s.has_board())
    }

    pub fn clear_saved_game(&mut self) -> Result<(), StorageError> {
        self.store.remove(SESSION_KEY)
    }

    // -- Best score ---------------------------------------------------------

    pub fn best_score(&self) -> i64 {
        self.read(BEST_SCORE_KEY)
            .and_then(|raw| raw.trim().parse::<f64>().ok())
            .filter(|f| f.is_finite())
            .map_or(0, |f| f.trunc() as i64)
    }

    /// Store `score` if it beats the best; returns whether it did.
    pub fn record_score(&mut self, score: i64) -> Result<bool, StorageError> {
        if score <= self.best_score() {
            return Ok(false);
        }
        self.store.set(BEST_SCORE_KEY, &score.to_string())?;
        debug!(score, "new best score");
        Ok(true)
    }

    // -- Goal pool presets --------------------------------------------------

    pub fn pools(&self) -> Vec<GoalPoolPreset> {
        self.read(POOLS_KEY).map(|raw| parse_list(&raw)).unwrap_or_default()
    }

    /// Save `goals` under `name`; an empty pool is not saved.
    #[instrument(skip(self, goals), fields(goals = goals.len()))]
    pub fn save_pool(
        &mut self,
        name: &str,
        goals: &GoalPool,
        now_ms: i64,
    ) -> Result<Option<GoalPoolPreset>, StorageError> {
        if goals.is_empty() {
            return Ok(None);
        }
        let mut list = self.pools();
        let preset = GoalPoolPreset {
            id: next_id("p", now_ms, &list),
            name: pool_name(name),
            goals: goals.clone(),
            saved_at: now_ms,
        };
        push_front_capped(&mut list, preset.clone());
        self.write_json(POOLS_KEY, &list)?;
        Ok(Some(preset))
    }

    pub fn load_pool(&self, id: &str) -> Option<GoalPool> {
        self.pools().into_iter().find(|p| p.id == id).map(|p| p.goals)
    }

    pub fn delete_pool(&mut self, id: &str) -> Result<bool, StorageError> {
        let mut list = self.pools();
        if !remove_by_id(&mut list, id) {
            return Ok(false);
        }
        self.write_json(POOLS_KEY, &list)?;
        Ok(true)
    }

    // -- Saved cards --------------------------------------------------------

    pub fn saved_cards(&self) -> Vec<SavedCard> {
        self.read(CARDS_KEY).map(|raw| parse_cards(&raw)).unwrap_or_default()
    }

    #[instrument(skip(self, session))]
    pub fn save_card(
        &mut self,
        name: &str,
        session: &GameSession,
        now_ms: i64,
    ) -> Result<SavedCard, StorageError> {
        let mut list = self.saved_cards();
        let card = SavedCard::capture(next_id("c", now_ms, &list), name, session, now_ms);
        push_front_capped(&mut list, card.clone());
        self.write_json(CARDS_KEY, &list)?;
        Ok(card)
    }

    pub fn delete_card(&mut self, id: &str) -> Result<bool, StorageError> {
        let mut list = self.saved_cards();
        if !remove_by_id(&mut list, id) {
            return Ok(false);
        }
        self.write_json(CARDS_KEY, &list)?;
        Ok(true)
    }

    // -- Saved slots --------------------------------------------------------

    pub fn saved_slots(&self) -> Vec<SavedSlot> {
        self.read(SLOTS_KEY).map(|raw| parse_list(&raw)).unwrap_or_default()
    }

    #[instrument(skip(self, session))]
    pub fn save_slot(
        &mut self,
        title: &str,
        session: &GameSession,
        now_ms: i64,
    ) -> Result<SavedSlot, StorageError> {
        let mut list = self.saved_slots();
        let slot = SavedSlot {
            id: next_id("s", now_ms, &list),
            title: slot_title(title),
            saved_at: now_ms,
            session: session.clone(),
        };
        push_front_capped(&mut list, slot.clone());
        self.write_json(SLOTS_KEY, &list)?;
        Ok(slot)
    }

    pub fn load_slot(&self, id: &str) -> Option<GameSession> {
        self.saved_slots().into_iter().find(|s| s.id == id).map(|s| s.session)
    }

    pub fn delete_slot(&mut self, id: &str) -> Result<bool, StorageError> {
        let mut list = self.saved_slots();
        if !remove_by_id(&mut list, id) {
            return Ok(false);
        }
        self.write_json(SLOTS_KEY, &list)?;
        Ok(true)
    }
}
