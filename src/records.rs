//! Record book: best score and the leaderboard of finished runs
//!
//! Optionally persisted to a JSON file, keeps the top 10 records.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::record::{Record, RecordError};

/// Maximum number of records to keep
pub const MAX_RECORDS: usize = 10;

/// Persistence accessor handed to the runner.
///
/// The simulation never reaches for storage on its own; whoever owns the
/// game loop decides where best scores and records go.
pub trait RecordStore: Send {
    fn best_score(&self) -> u32;

    /// Remember a new best score
    fn submit_best_score(&mut self, score: u32);

    /// Store a finished record. Returns the rank it reached (1-indexed).
    fn insert(&mut self, record: Record) -> Option<usize>;
}

/// Leaderboard of records, sorted by score descending
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordBook {
    pub best_score: u32,
    pub entries: Vec<Record>,
    #[serde(skip)]
    path: Option<PathBuf>,
}

impl RecordBook {
    /// Create an empty in-memory book
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a book from `path`, remembering the path for later saves
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RecordError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let mut book: RecordBook = serde_json::from_str(&json)?;
        book.entries.sort_by(|a, b| b.score.cmp(&a.score));
        book.entries.truncate(MAX_RECORDS);
        book.path = Some(path.to_path_buf());
        log::info!("Loaded {} records from {}", book.entries.len(), path.display());
        Ok(book)
    }

    /// Load from `path`, starting fresh when the file is missing or unreadable
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(book) => book,
            Err(err) => {
                log::warn!("No usable records at {} ({}), starting fresh", path.display(), err);
                Self {
                    path: Some(path.to_path_buf()),
                    ..Self::default()
                }
            }
        }
    }

    /// Write the book back to the file it came from. In-memory books are a no-op.
    pub fn save(&self) -> Result<(), RecordError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        log::debug!("Records saved ({} entries)", self.entries.len());
        Ok(())
    }

    /// Insert a record behind every entry with an equal or higher score.
    ///
    /// Every finished run is kept until it falls off the bottom of the book.
    /// Returns the rank it landed at (1-indexed), or None when the book is
    /// full of better runs.
    pub fn add(&mut self, record: Record) -> Option<usize> {
        let index = self.entries.partition_point(|e| e.score >= record.score);
        if index >= MAX_RECORDS {
            return None;
        }
        self.entries.insert(index, record);
        self.entries.truncate(MAX_RECORDS);
        Some(index + 1)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn persist(&self) {
        if let Err(err) = self.save() {
            log::error!("Failed to save records: {}", err);
        }
    }
}

impl RecordStore for RecordBook {
    fn best_score(&self) -> u32 {
        self.best_score
    }

    fn submit_best_score(&mut self, score: u32) {
        if score > self.best_score {
            self.best_score = score;
            self.persist();
        }
    }

    fn insert(&mut self, record: Record) -> Option<usize> {
        let rank = self.add(record);
        if rank.is_some() {
            self.persist();
        }
        rank
    }
}

/// Current Unix time in milliseconds, used to stamp stored records
pub fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
