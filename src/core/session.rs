//! # Local Session Store
//!
//! Search history, bookmarks and named research sessions, persisted as JSON
//! under three keys of an injected [`KeyValueStore`]:
//!
//! ```text
//! searchHistory       ["most recent query", ...]          (max 10, no duplicates)
//! bookmarkedMessages  [0, 3, 7]                           (message ordinals)
//! sessions            [{name, messages, bookmarked, timestamp}, ...]  (max 20, newest first)
//! ```
//!
//! Reads never fail: a missing or malformed value is treated as empty.
//! Write failures are logged and otherwise ignored.

use std::collections::BTreeSet;

use chrono::{DateTime, Local, SecondsFormat, Utc};
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::core::conversation::{Conversation, Message};
use crate::core::storage::KeyValueStore;

pub const HISTORY_KEY: &str = "searchHistory";
pub const BOOKMARKS_KEY: &str = "bookmarkedMessages";
pub const SESSIONS_KEY: &str = "sessions";

pub const MAX_HISTORY: usize = 10;
pub const MAX_SESSIONS: usize = 20;

/// A saved snapshot of the conversation and its bookmarks. Immutable once saved.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SessionRecord {
    pub name: String,
    pub messages: Vec<Message>,
    #[serde(default)]
    pub bookmarked: Vec<usize>,
    /// RFC 3339 creation time.
    pub timestamp: String,
}

impl SessionRecord {
    pub fn snapshot(
        name: String,
        conversation: &Conversation,
        bookmarks: &BTreeSet<usize>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            name,
            messages: conversation.messages().to_vec(),
            bookmarked: bookmarks.iter().copied().collect(),
            timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    pub fn conversation(&self) -> Conversation {
        Conversation::from(self.messages.clone())
    }

    pub fn bookmarks(&self) -> BTreeSet<usize> {
        self.bookmarked.iter().copied().collect()
    }
}

/// Name used when a session is saved without one.
pub fn default_session_name(now: DateTime<Local>) -> String {
    format!("Session {}", now.format("%Y-%m-%d %H:%M:%S"))
}

pub struct SessionStore {
    backend: Box<dyn KeyValueStore>,
}

impl SessionStore {
    pub fn new(backend: Box<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    fn read_json<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        match self.backend.get(key) {
            Some(json) => serde_json::from_str(&json).unwrap_or_else(|e| {
                warn!("Failed to load {}: {}", key, e);
                T::default()
            }),
            None => T::default(),
        }
    }

    fn write_json<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) {
        let json = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(e) => {
                warn!("Failed to serialize {}: {}", key, e);
                return;
            }
        };
        if let Err(e) = self.backend.set(key, json) {
            warn!("Failed to persist {}: {}", key, e);
        } else {
            debug!("Persisted {}", key);
        }
    }

    // ── Search history ──────────────────────────────────────────────────────

    pub fn history(&self) -> Vec<String> {
        self.read_json(HISTORY_KEY)
    }

    /// Moves `query` to the front of the history, dropping any older copy and
    /// anything past [`MAX_HISTORY`]. Returns the new history.
    pub fn record_query(&mut self, query: &str) -> Vec<String> {
        let mut history = self.history();
        history.retain(|q| q != query);
        history.insert(0, query.to_string());
        history.truncate(MAX_HISTORY);
        self.write_json(HISTORY_KEY, &history);
        history
    }

    // ── Bookmarks ───────────────────────────────────────────────────────────

    pub fn bookmarks(&self) -> BTreeSet<usize> {
        self.read_json(BOOKMARKS_KEY)
    }

    pub fn save_bookmarks(&mut self, bookmarks: &BTreeSet<usize>) {
        self.write_json(BOOKMARKS_KEY, bookmarks);
    }

    // ── Sessions ────────────────────────────────────────────────────────────

    /// All saved sessions, most recent first.
    pub fn sessions(&self) -> Vec<SessionRecord> {
        self.read_json(SESSIONS_KEY)
    }

    pub fn session_names(&self) -> Vec<String> {
        self.sessions().into_iter().map(|s| s.name).collect()
    }

    /// Puts `record` at the front of the session list, evicting the oldest
    /// entries beyond [`MAX_SESSIONS`]. Returns the names of the kept sessions.
    pub fn save_session(&mut self, record: SessionRecord) -> Vec<String> {
        let mut sessions = self.sessions();
        sessions.insert(0, record);
        sessions.truncate(MAX_SESSIONS);
        self.write_json(SESSIONS_KEY, &sessions);
        sessions.into_iter().map(|s| s.name).collect()
    }

    /// Most recent session saved under `name`.
    pub fn find_session(&self, name: &str) -> Option<SessionRecord> {
        self.sessions().into_iter().find(|s| s.name == name)
    }
}
