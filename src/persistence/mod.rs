//! Storage of games, best score, saved lists, export files and share links.
//!
//! | Module | Contents |
//! |---|---|
//! | `store` | [`KeyValueStore`] trait, [`MemoryStore`], [`FileStore`] |
//! | `schema` | Persisted session record, lenient field readers, legacy migration |
//! | `saved` | Goal pool presets, saved cards and saved slots |
//! | `storage` | [`BingoStorage`], typed access over a store |
//! | `transfer` | Export envelope and import |
//! | `share` | `#share=` link encoding |
//! | `error` | Error types |

pub mod error;
pub mod saved;
pub mod schema;
pub mod share;
pub mod storage;
pub mod store;
pub mod transfer;

pub use error::{ImportError, SchemaError, ShareError, StorageError};
pub use saved::{GoalPoolPreset, SavedCard, SavedSlot, SAVED_LIST_CAP};
pub use schema::{migrate_legacy, session_from_value, session_to_json, LegacySession};
pub use share::{apply_share, decode_share, encode_share, share_url};
pub use storage::BingoStorage;
pub use store::{FileStore, KeyValueStore, MemoryStore};
pub use transfer::{export_json, import_json};
