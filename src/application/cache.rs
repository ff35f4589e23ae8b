//! Process-local caches. Nothing here survives a restart.
//!
//! `SearchCache` is cleared on every content write. A search that read the
//! store before a write must not repopulate the cache after it, so each
//! `invalidate` bumps a generation and `put_if_current` only stores results
//! read under the generation it was given.
//!
//! `SessionMemory` is write-through: callers append to the store and to the
//! cache together, so a cached history never lags behind writes made by this
//! process. Cached histories are trimmed to the same length a cold load reads.
//!
//! Both caches are bounded and evict their oldest entry first.

use std::collections::{HashMap, VecDeque};
use std::sync::RwLock;

use crate::domain::entities::{chat_message::ChatMessage, content::SearchHit};

pub const DEFAULT_MAX_QUERIES: usize = 256;
pub const DEFAULT_MAX_SESSIONS: usize = 1024;

/// Insertion-ordered map that drops its oldest key once `capacity` is exceeded.
struct BoundedMap<V> {
    values: HashMap<String, V>,
    order: VecDeque<String>,
    capacity: usize,
}

impl<V> BoundedMap<V> {
    fn new(capacity: usize) -> Self {
        Self {
            values: HashMap::new(),
            order: VecDeque::new(),
            capacity,
        }
    }

    fn get(&self, key: &str) -> Option<&V> {
        self.values.get(key)
    }

    fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        self.values.get_mut(key)
    }

    fn insert(&mut self, key: String, value: V) {
        if self.capacity == 0 {
            return;
        }
        if !self.values.contains_key(&key) {
            while self.order.len() >= self.capacity {
                match self.order.pop_front() {
                    Some(oldest) => {
                        self.values.remove(&oldest);
                    }
                    None => break,
                }
            }
            self.order.push_back(key.clone());
        }
        self.values.insert(key, value);
    }

    fn remove(&mut self, key: &str) {
        if self.values.remove(key).is_some() {
            self.order.retain(|k| k != key);
        }
    }

    fn clear(&mut self) {
        self.values.clear();
        self.order.clear();
    }

    fn len(&self) -> usize {
        self.values.len()
    }
}

struct SearchEntries {
    hits: BoundedMap<Vec<SearchHit>>,
    generation: u64,
}

pub struct SearchCache {
    entries: RwLock<SearchEntries>,
}

impl Default for SearchCache {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchCache {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_QUERIES)
    }

    pub fn with_capacity(max_queries: usize) -> Self {
        Self {
            entries: RwLock::new(SearchEntries {
                hits: BoundedMap::new(max_queries),
                generation: 0,
            }),
        }
    }

    pub fn get(&self, query: &str) -> Option<Vec<SearchHit>> {
        self.entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .hits
            .get(query)
            .cloned()
    }

    /// Read this before querying the store and pass it to `put_if_current`.
    pub fn generation(&self) -> u64 {
        self.entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .generation
    }

    /// Store `hits` unless the cache was invalidated since `generation` was read.
    pub fn put_if_current(&self, query: String, hits: Vec<SearchHit>, generation: u64) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        if entries.generation != generation {
            tracing::debug!(%query, "Dropping search results read before a write");
            return false;
        }
        entries.hits.insert(query, hits);
        true
    }

    pub fn invalidate(&self) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        if entries.hits.len() > 0 {
            tracing::debug!(entries = entries.hits.len(), "Invalidating search cache");
        }
        entries.hits.clear();
        entries.generation = entries.generation.wrapping_add(1);
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .hits
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub struct SessionMemory {
    sessions: RwLock<BoundedMap<Vec<ChatMessage>>>,
    history_limit: usize,
}

impl SessionMemory {
    /// `history_limit` should match the number of messages a cold load reads.
    pub fn new(history_limit: usize) -> Self {
        Self::with_capacity(DEFAULT_MAX_SESSIONS, history_limit)
    }

    pub fn with_capacity(max_sessions: usize, history_limit: usize) -> Self {
        Self {
            sessions: RwLock::new(BoundedMap::new(max_sessions)),
            history_limit,
        }
    }

    pub fn get(&self, session_id: &str) -> Option<Vec<ChatMessage>> {
        self.sessions
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(session_id)
            .cloned()
    }

    /// Seed a session with history loaded from the store. Keeps an existing entry.
    pub fn seed(&self, session_id: &str, mut history: Vec<ChatMessage>) {
        let mut sessions = self.sessions.write().unwrap_or_else(|e| e.into_inner());
        if sessions.get(session_id).is_none() {
            self.trim(&mut history);
            sessions.insert(session_id.to_string(), history);
        }
    }

    pub fn append(&self, session_id: &str, messages: &[ChatMessage]) {
        let mut sessions = self.sessions.write().unwrap_or_else(|e| e.into_inner());
        match sessions.get_mut(session_id) {
            Some(history) => {
                history.extend_from_slice(messages);
                self.trim(history);
            }
            None => {
                let mut history = messages.to_vec();
                self.trim(&mut history);
                sessions.insert(session_id.to_string(), history);
            }
        }
    }

    /// Drop a session so the next load goes back to the store.
    pub fn forget(&self, session_id: &str) {
        self.sessions
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(session_id);
    }

    pub fn len(&self) -> usize {
        self.sessions.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn trim(&self, history: &mut Vec<ChatMessage>) {
        let excess = history.len().saturating_sub(self.history_limit);
        history.drain(..excess);
    }
}
