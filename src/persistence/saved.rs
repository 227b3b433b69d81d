//! Named goal pools, saved card snapshots and saved game slots.
//!
//! All three lists are stored most-recent-first and capped at
//! [`SAVED_LIST_CAP`] entries. Reading is tolerant: entries that do not parse
//! are dropped, and a stored value that is not a list reads as empty.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::bingo_engine::{
    models::{BoardSize, GameSession, GoalPool, Tile, WinCondition},
    timer::elapsed_ms,
};
use crate::persistence::schema::serde_session;

pub const SAVED_LIST_CAP: usize = 20;

/// A named goal pool the player can reload on the setup screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalPoolPreset {
    pub id: String,
    #[serde(default = "default_pool_name")]
    pub name: String,
    #[serde(default)]
    pub goals: GoalPool,
    #[serde(default)]
    pub saved_at: i64,
}

/// A read-only snapshot of a card and its result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedCard {
    pub id: String,
    #[serde(default = "default_card_name")]
    pub name: String,
    #[serde(default)]
    pub saved_at: i64,
    #[serde(default)]
    pub size: BoardSize,
    #[serde(default)]
    pub free: bool,
    #[serde(default)]
    pub win: WinCondition,
    #[serde(default)]
    pub board: Vec<Tile>,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub bingos: usize,
    #[serde(default)]
    pub time_ms: i64,
    #[serde(default)]
    pub marked: usize,
    #[serde(default)]
    pub total: usize,
}

impl SavedCard {
    pub fn capture(id: String, name: &str, session: &GameSession, now_ms: i64) -> Self {
        SavedCard {
            id,
            name: non_blank(name, default_card_name),
            saved_at: now_ms,
            size: session.size,
            free: session.free_enabled,
            win: session.win_condition,
            board: session.board.clone(),
            score: session.score,
            bingos: session.bingos,
            time_ms: if session.won {
                session.elapsed_ms_at_win
            } else {
                elapsed_ms(session, now_ms)
            },
            marked: session.marked_count(),
            total: session.board.len(),
        }
    }
}

/// A full resumable game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedSlot {
    pub id: String,
    #[serde(default = "default_slot_title")]
    pub title: String,
    #[serde(default)]
    pub saved_at: i64,
    #[serde(with = "serde_session")]
    pub session: GameSession,
}

fn default_pool_name() -> String {
    "Pool".to_string()
}

fn default_card_name() -> String {
    "Bingo card".to_string()
}

fn default_slot_title() -> String {
    "Saved game".to_string()
}

/// `name` trimmed, or the default when blank.
pub fn non_blank(name: &str, default: fn() -> String) -> String {
    let name = name.trim();
    if name.is_empty() {
        default()
    } else {
        name.to_string()
    }
}

pub fn pool_name(name: &str) -> String {
    non_blank(name, default_pool_name)
}

pub fn slot_title(name: &str) -> String {
    non_blank(name, default_slot_title)
}

/// Anything kept in a saved list.
pub trait Saved {
    fn id(&self) -> &str;
}

impl Saved for GoalPoolPreset {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Saved for SavedCard {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Saved for SavedSlot {
    fn id(&self) -> &str {
        &self.id
    }
}

/// `<prefix>_<now>`, with a `-<n>` suffix if that id is already taken.
pub fn next_id<T: Saved>(prefix: &str, now_ms: i64, existing: &[T]) -> String {
    let base = format!("{prefix}_{now_ms}");
    let taken = |id: &str| existing.iter().any(|e| e.id() == id);
    if !taken(&base) {
        return base;
    }
    let mut n = 2;
    loop {
        let id = format!("{base}-{n}");
        if !taken(&id) {
            return id;
        }
        n += 1;
    }
}

/// Insert at the front, dropping the oldest entries past the cap.
pub fn push_front_capped<T>(list: &mut Vec<T>, item: T) {
    list.insert(0, item);
    list.truncate(SAVED_LIST_CAP);
}

/// Remove by id; returns whether anything was removed.
pub fn remove_by_id<T: Saved>(list: &mut Vec<T>, id: &str) -> bool {
    let before = list.len();
    list.retain(|e| e.id() != id);
    list.len() != before
}

/// Parse a stored list, skipping entries that do not fit `T`.
pub fn parse_list<T: DeserializeOwned>(raw: &str) -> Vec<T> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(items)) => entries_from(items),
        Ok(_) => Vec::new(),
        Err(e) => {
            warn!(error = %e, "saved list is not valid JSON");
            Vec::new()
        }
    }
}

/// Saved cards, accepting the older single-card object.
pub fn parse_cards(raw: &str) -> Vec<SavedCard> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(items)) => entries_from(items),
        Ok(Value::Object(mut legacy)) => {
            legacy.entry("id").or_insert_with(|| Value::from("c_old"));
            legacy.entry("name").or_insert_with(|| Value::from("Saved card"));
            entries_from(vec![Value::Object(legacy)])
        }
        Ok(_) => Vec::new(),
        Err(e) => {
            warn!(error = %e, "saved cards are not valid JSON");
            Vec::new()
        }
    }
}

fn entries_from<T: DeserializeOwned>(items: Vec<Value>) -> Vec<T> {
    items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value(item) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(index, error = %e, "dropping unreadable saved entry");
                None
            }
        })
        .collect()
}
