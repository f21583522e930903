//! Persistent transcript storage
//!
//! The transcript is a single JSON document `{ "messages": [...] }` on
//! disk, fronted by an in-memory cache. The store is only ever written
//! from the session controller, so a cache plus whole-file rewrite is
//! enough; the temp-file rename keeps previously durable turns intact if
//! a write is interrupted.

use super::types::Turn;
use crate::{ParloError, Result};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

pub const HISTORY_FILE_NAME: &str = "chat_history.json";

/// On-disk shape of the transcript
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct HistoryDocument {
    #[serde(default)]
    messages: Vec<Turn>,
}

#[derive(Debug, Clone)]
pub struct TranscriptStore {
    path: PathBuf,
    turns: Arc<RwLock<Vec<Turn>>>,
}

impl TranscriptStore {
    /// Open a store rooted at the given data directory, loading any
    /// existing transcript. A missing or corrupt file yields an empty
    /// transcript rather than an error.
    pub fn open(data_dir: impl AsRef<Path>) -> Result<Self> {
        let data_dir = data_dir.as_ref();
        fs::create_dir_all(data_dir)?;
        let path = data_dir.join(HISTORY_FILE_NAME);
        let turns = Self::load_from(&path);
        debug!(path = %path.display(), turns = turns.len(), "transcript store opened");

        Ok(Self {
            path,
            turns: Arc::new(RwLock::new(turns)),
        })
    }

    fn load_from(path: &Path) -> Vec<Turn> {
        match fs::read_to_string(path) {
            Ok(data) => match serde_json::from_str::<HistoryDocument>(&data) {
                Ok(doc) => doc.messages,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "corrupt history file, starting empty");
                    Vec::new()
                }
            },
            Err(_) => Vec::new(),
        }
    }

    /// Snapshot of the full transcript, oldest first
    pub fn turns(&self) -> Vec<Turn> {
        self.turns.read().clone()
    }

    pub fn len(&self) -> usize {
        self.turns.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.read().is_empty()
    }

    /// Append a turn and persist the whole transcript
    pub fn append_and_save(&self, turn: Turn) -> Result<()> {
        let mut turns = self.turns.write();
        turns.push(turn);
        self.persist(&turns)
    }

    /// Wholesale-clear the transcript, on disk and in memory
    pub fn clear(&self) -> Result<()> {
        let mut turns = self.turns.write();
        turns.clear();
        self.persist(&turns)
    }

    fn persist(&self, turns: &[Turn]) -> Result<()> {
        let doc = HistoryDocument {
            messages: turns.to_vec(),
        };
        let json = serde_json::to_string_pretty(&doc)
            .map_err(|e| ParloError::Storage(e.to_string()))?;

        // Write to a sibling temp file first so a crash mid-write cannot
        // corrupt the durable transcript.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
