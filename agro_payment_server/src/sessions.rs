//! Selects the buyer session backend at start-up.
use agro_payment_engine::{
    db_types::BuyerId,
    session::{BuyerSession, MemorySessionStore, SessionStore, SessionStoreError},
};
#[cfg(feature = "redis")]
use agro_payment_engine::session::RedisSessionStore;
use log::*;

use crate::config::SessionConfig;

#[derive(Clone)]
pub enum SessionBackend {
    Memory(MemorySessionStore),
    #[cfg(feature = "redis")]
    Redis(RedisSessionStore),
}

impl SessionBackend {
    /// Uses Redis when a url is configured and the `redis` feature is compiled in. Everything else gets in-memory
    /// sessions, which do not survive a restart.
    pub fn from_config(config: &SessionConfig) -> Result<Self, SessionStoreError> {
        match &config.redis_url {
            #[cfg(feature = "redis")]
            Some(url) => {
                let store = RedisSessionStore::new(url.reveal(), config.ttl)?;
                info!("🧠️ Buyer sessions are kept in Redis");
                Ok(Self::Redis(store))
            },
            #[cfg(not(feature = "redis"))]
            Some(_) => {
                warn!("🧠️ AGRO_REDIS_URL is set, but this build has no Redis support. Sessions are kept in memory.");
                Ok(Self::memory(config))
            },
            None => {
                info!("🧠️ Buyer sessions are kept in memory");
                Ok(Self::memory(config))
            },
        }
    }

    fn memory(config: &SessionConfig) -> Self {
        Self::Memory(MemorySessionStore::new(config.ttl))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Memory(_) => "memory",
            #[cfg(feature = "redis")]
            Self::Redis(_) => "redis",
        }
    }
}

impl Default for SessionBackend {
    fn default() -> Self {
        Self::Memory(MemorySessionStore::default())
    }
}

impl SessionStore for SessionBackend {
    async fn fetch_session(&self, buyer_id: BuyerId) -> Result<Option<BuyerSession>, SessionStoreError> {
        match self {
            Self::Memory(store) => store.fetch_session(buyer_id).await,
            #[cfg(feature = "redis")]
            Self::Redis(store) => store.fetch_session(buyer_id).await,
        }
    }

    async fn save_session(&self, buyer_id: BuyerId, session: &BuyerSession) -> Result<(), SessionStoreError> {
        match self {
            Self::Memory(store) => store.save_session(buyer_id, session).await,
            #[cfg(feature = "redis")]
            Self::Redis(store) => store.save_session(buyer_id, session).await,
        }
    }
}
