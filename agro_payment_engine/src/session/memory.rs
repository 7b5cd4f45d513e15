use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use dashmap::DashMap;
use log::trace;

use crate::{
    db_types::BuyerId,
    session::{BuyerSession, SessionStore, SessionStoreError},
};

struct SessionEntry {
    session: BuyerSession,
    expires_at: Option<Instant>,
}

impl SessionEntry {
    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|exp| Instant::now() > exp)
    }
}

/// Process-local sessions. Entries optionally expire `ttl` after they were last written; an expired entry reads as
/// absent and is evicted on that read.
#[derive(Clone, Default)]
pub struct MemorySessionStore {
    sessions: Arc<DashMap<BuyerId, SessionEntry>>,
    ttl: Option<Duration>,
}

impl MemorySessionStore {
    pub fn new(ttl: Option<Duration>) -> Self {
        Self { sessions: Arc::new(DashMap::new()), ttl }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl SessionStore for MemorySessionStore {
    async fn fetch_session(&self, buyer_id: BuyerId) -> Result<Option<BuyerSession>, SessionStoreError> {
        if let Some(entry) = self.sessions.get(&buyer_id) {
            if !entry.is_expired() {
                return Ok(Some(entry.session.clone()));
            }
        }
        if self.sessions.remove_if(&buyer_id, |_, entry| entry.is_expired()).is_some() {
            trace!("🧠️ Session for {buyer_id} expired and was evicted");
        }
        Ok(None)
    }

    async fn save_session(&self, buyer_id: BuyerId, session: &BuyerSession) -> Result<(), SessionStoreError> {
        let expires_at = self.ttl.map(|ttl| Instant::now() + ttl);
        self.sessions.insert(buyer_id, SessionEntry { session: session.clone(), expires_at });
        trace!("🧠️ Session for {buyer_id} saved ({:?})", session.state);
        Ok(())
    }
}
