//! Bounded, file-backed history of formatted playlists.
//!
//! Entries are kept newest first and keyed by playlist URL: formatting the same
//! playlist again replaces its entry in place instead of adding a duplicate.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::playlist::PlaylistAggregate;
use crate::reference::parse_reference;
use crate::stats::{MissingDetailsPolicy, PlaylistStats};
use crate::video::VideoRecord;

/// Default number of entries kept.
pub const DEFAULT_HISTORY_LIMIT: usize = 20;

/// One remembered run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// Normalized playlist URL; the dedup key.
    pub url: String,
    /// Playlist title.
    pub title: String,
    /// When the entry was recorded.
    pub date: DateTime<Utc>,
    /// The formatted text as printed.
    pub formatted_output: String,
    /// Base statistics at the time.
    pub stats: PlaylistStats,
    /// The videos.
    pub videos: Vec<VideoRecord>,
}

impl HistoryEntry {
    /// Snapshot an aggregate and its rendered text.
    #[must_use]
    pub fn from_aggregate(aggregate: &PlaylistAggregate, formatted_output: String) -> Self {
        Self {
            url: aggregate.reference.normalized_url(),
            title: aggregate.title.clone(),
            date: Utc::now(),
            formatted_output,
            stats: aggregate.stats,
            videos: aggregate.videos.clone(),
        }
    }

    /// Rebuild an aggregate from this entry.
    pub fn to_aggregate(&self, policy: MissingDetailsPolicy) -> Result<PlaylistAggregate> {
        let reference = parse_reference(&self.url)?;
        Ok(PlaylistAggregate::new(
            reference,
            self.title.clone(),
            self.videos.clone(),
            policy,
        ))
    }
}

/// History persisted as a JSON array.
#[derive(Debug)]
pub struct HistoryStore {
    path: PathBuf,
    limit: usize,
    entries: Vec<HistoryEntry>,
}

impl HistoryStore {
    /// Open the store at `path`; a missing file is an empty history.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn open(path: impl Into<PathBuf>, limit: usize) -> Result<Self> {
        let path = path.into();
        let limit = limit.max(1);

        let mut entries: Vec<HistoryEntry> = if path.exists() {
            let content = fs::read_to_string(&path).map_err(|e| Error::FileSystem {
                path: path.clone(),
                reason: format!("Failed to read history: {e}"),
            })?;
            serde_json::from_str(&content)?
        } else {
            debug!("History file {} not found, starting empty", path.display());
            Vec::new()
        };

        if entries.len() > limit {
            warn!(
                "History holds {} entries, truncating to {}",
                entries.len(),
                limit
            );
            entries.truncate(limit);
        }

        Ok(Self {
            path,
            limit,
            entries,
        })
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Entries, newest first.
    #[must_use]
    pub fn list(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Look up an entry by URL (any recognised playlist URL form).
    #[must_use]
    pub fn get(&self, url: &str) -> Option<&HistoryEntry> {
        let key = history_key(url);
        self.entries.iter().find(|e| e.url == key)
    }

    /// Record an entry and persist.
    ///
    /// An existing entry with the same URL is replaced where it stands;
    /// otherwise the entry goes first and the oldest beyond the limit is
    /// dropped.
    pub fn add(&mut self, entry: HistoryEntry) -> Result<()> {
        if let Some(existing) = self.entries.iter_mut().find(|e| e.url == entry.url) {
            debug!("Replacing history entry for {}", entry.url);
            *existing = entry;
        } else {
            debug!("Adding history entry for {}", entry.url);
            self.entries.insert(0, entry);
            self.entries.truncate(self.limit);
        }
        self.save()
    }

    /// Remove the entry for `url`, returning whether one existed.
    pub fn remove(&mut self, url: &str) -> Result<bool> {
        let key = history_key(url);
        let before = self.entries.len();
        self.entries.retain(|e| e.url != key);
        let removed = self.entries.len() != before;
        if removed {
            self.save()?;
        }
        Ok(removed)
    }

    /// Drop every entry.
    pub fn clear(&mut self) -> Result<()> {
        self.entries.clear();
        info!("History cleared");
        self.save()
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).map_err(|e| Error::FileSystem {
                path: parent.to_path_buf(),
                reason: format!("Failed to create history directory: {e}"),
            })?;
        }

        let content = serde_json::to_string_pretty(&self.entries)?;
        fs::write(&self.path, content).map_err(|e| Error::FileSystem {
            path: self.path.clone(),
            reason: format!("Failed to write history: {e}"),
        })
    }
}

fn history_key(url: &str) -> String {
    parse_reference(url).map_or_else(|_| url.trim().to_string(), |r| r.normalized_url())
}
