use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use farm_core::model::{
    FarmState, GameState, PassthroughEntry, Plot, RowEntry, WordEntry, WordId,
};

/// Record name for the serialized word database.
pub const RECORD_WORD_DB: &str = "word_db";

/// Record name for the serialized plot collection.
pub const RECORD_FARM_STATE: &str = "farm_state";

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

//
// ─── RECORDS ───────────────────────────────────────────────────────────────────
//

/// Persisted shape for one word, mirroring the domain `WordEntry` so the
/// repository can serialize without leaking storage concerns into the domain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordRecord {
    pub id: u32,
    pub word: String,
    pub meaning: String,
    pub learned: bool,
    pub correct_count: u32,
    pub total_attempts: u32,
    pub raw_row: Vec<String>,
}

/// Persisted shape for one database row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntryRecord {
    Word(WordRecord),
    Passthrough { raw: String },
}

impl EntryRecord {
    #[must_use]
    pub fn from_entry(entry: &RowEntry) -> Self {
        match entry {
            RowEntry::Word(word) => EntryRecord::Word(WordRecord {
                id: word.id().value(),
                word: word.word().to_string(),
                meaning: word.meaning().to_string(),
                learned: word.learned(),
                correct_count: word.correct_count(),
                total_attempts: word.total_attempts(),
                raw_row: word.raw_row().to_vec(),
            }),
            RowEntry::Passthrough(row) => EntryRecord::Passthrough {
                raw: row.raw().to_string(),
            },
        }
    }

    /// Convert the record back into a domain row.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` when the persisted fields fail
    /// domain validation (empty texts, inconsistent counters).
    pub fn into_entry(self) -> Result<RowEntry, StorageError> {
        match self {
            EntryRecord::Word(record) => WordEntry::from_persisted(
                WordId::new(record.id),
                record.word,
                record.meaning,
                record.learned,
                record.correct_count,
                record.total_attempts,
                record.raw_row,
            )
            .map(RowEntry::Word)
            .map_err(|e| StorageError::Serialization(e.to_string())),
            EntryRecord::Passthrough { raw } => {
                Ok(RowEntry::Passthrough(PassthroughEntry::new(raw)))
            }
        }
    }
}

/// Persisted shape for one plot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlotRecord {
    pub is_planted: bool,
    pub word_ids: Vec<u32>,
    pub plant_date: Option<DateTime<Utc>>,
}

impl PlotRecord {
    #[must_use]
    pub fn from_plot(plot: &Plot) -> Self {
        Self {
            is_planted: plot.is_planted(),
            word_ids: plot.word_ids().iter().map(WordId::value).collect(),
            plant_date: plot.plant_date(),
        }
    }

    #[must_use]
    pub fn into_plot(self) -> Plot {
        Plot::from_persisted(
            self.is_planted,
            self.word_ids.into_iter().map(WordId::new).collect(),
            self.plant_date,
        )
    }
}

//
// ─── SNAPSHOT ──────────────────────────────────────────────────────────────────
//

/// A whole-state snapshot: the word database and the plot collection,
/// written and read as a pair. Absence of either record means "no prior
/// progress".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub entries: Vec<EntryRecord>,
    pub plots: Vec<PlotRecord>,
}

impl Snapshot {
    #[must_use]
    pub fn capture(state: &GameState) -> Self {
        Self {
            entries: state.entries().iter().map(EntryRecord::from_entry).collect(),
            plots: state
                .farm()
                .plots()
                .iter()
                .map(PlotRecord::from_plot)
                .collect(),
        }
    }

    /// Rebuild the domain state from this snapshot.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` when any record fails domain
    /// validation; callers treat that as "no usable prior progress".
    pub fn restore(self) -> Result<GameState, StorageError> {
        let entries = self
            .entries
            .into_iter()
            .map(EntryRecord::into_entry)
            .collect::<Result<Vec<_>, _>>()?;
        let farm = FarmState::from_plots(
            self.plots.into_iter().map(PlotRecord::into_plot).collect(),
        );
        Ok(GameState::new(entries, farm))
    }
}

//
// ─── REPOSITORY CONTRACT ───────────────────────────────────────────────────────
//

/// Repository contract for learner progress snapshots.
///
/// Writes are whole-snapshot overwrites (last-writer-wins); a malformed
/// stored payload reads back as `None` so a corrupt store never fails the
/// load.
#[async_trait]
pub trait SnapshotRepository: Send + Sync {
    /// Load the stored snapshot pair, if both records exist and parse.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` only for adapter failures (I/O, connection);
    /// missing or unparseable records yield `Ok(None)`.
    async fn load_snapshot(&self) -> Result<Option<Snapshot>, StorageError>;

    /// Overwrite both records with the given snapshot, as a pair.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the snapshot cannot be stored.
    async fn save_snapshot(&self, snapshot: &Snapshot) -> Result<(), StorageError>;

    /// Delete both records ("reset progress").
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on adapter failures.
    async fn clear(&self) -> Result<(), StorageError>;
}

//
// ─── IN-MEMORY REPOSITORY ──────────────────────────────────────────────────────
//

/// Simple in-memory repository for testing and prototyping. Records are kept
/// as serialized JSON strings to exercise the same named-record model as the
/// SQLite adapter.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    records: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a raw record payload, bypassing serialization (test helper for
    /// corrupt-store scenarios).
    pub fn put_raw(&self, name: &str, payload: &str) -> Result<(), StorageError> {
        let mut guard = self
            .records
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(name.to_string(), payload.to_string());
        Ok(())
    }
}

#[async_trait]
impl SnapshotRepository for InMemoryRepository {
    async fn load_snapshot(&self) -> Result<Option<Snapshot>, StorageError> {
        let guard = self
            .records
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let (Some(db), Some(farm)) = (guard.get(RECORD_WORD_DB), guard.get(RECORD_FARM_STATE))
        else {
            return Ok(None);
        };

        let entries: Vec<EntryRecord> = match serde_json::from_str(db) {
            Ok(entries) => entries,
            Err(_) => return Ok(None),
        };
        let plots: Vec<PlotRecord> = match serde_json::from_str(farm) {
            Ok(plots) => plots,
            Err(_) => return Ok(None),
        };
        Ok(Some(Snapshot { entries, plots }))
    }

    async fn save_snapshot(&self, snapshot: &Snapshot) -> Result<(), StorageError> {
        let db = serde_json::to_string(&snapshot.entries)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        let farm = serde_json::to_string(&snapshot.plots)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        let mut guard = self
            .records
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(RECORD_WORD_DB.to_string(), db);
        guard.insert(RECORD_FARM_STATE.to_string(), farm);
        Ok(())
    }

    async fn clear(&self) -> Result<(), StorageError> {
        let mut guard = self
            .records
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.remove(RECORD_WORD_DB);
        guard.remove(RECORD_FARM_STATE);
        Ok(())
    }
}

//
// ─── STORAGE AGGREGATE ─────────────────────────────────────────────────────────
//

/// Aggregates the snapshot repository behind a trait object for easy backend
/// swapping.
#[derive(Clone)]
pub struct Storage {
    pub snapshots: Arc<dyn SnapshotRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            snapshots: Arc::new(InMemoryRepository::new()),
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
