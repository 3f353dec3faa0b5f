use dashmap::DashMap;
use std::path::PathBuf;
use tracing::trace;

/// Per-session store of the one pending file suggestion awaiting
/// confirmation.
///
/// Entries never expire: a suggestion lives until it is confirmed or
/// replaced by the next suggestion for the same session. Two concurrent
/// requests on the same session race and the last `put` wins.
pub trait SessionStore: Send + Sync {
    fn get(&self, session_id: &str) -> Option<PathBuf>;
    fn put(&self, session_id: &str, path: PathBuf);
    fn remove(&self, session_id: &str) -> Option<PathBuf>;
}

/// Process-local session store.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    suggestions: DashMap<String, PathBuf>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.suggestions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.suggestions.is_empty()
    }
}

impl SessionStore for InMemorySessionStore {
    fn get(&self, session_id: &str) -> Option<PathBuf> {
        self.suggestions.get(session_id).map(|e| e.value().clone())
    }

    fn put(&self, session_id: &str, path: PathBuf) {
        trace!("Caching suggestion {} for session '{}'", path.display(), session_id);
        self.suggestions.insert(session_id.to_string(), path);
    }

    fn remove(&self, session_id: &str) -> Option<PathBuf> {
        self.suggestions.remove(session_id).map(|(_, path)| path)
    }
}
