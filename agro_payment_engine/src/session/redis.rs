use std::time::Duration;

use deadpool_redis::{redis::AsyncCommands, Config as PoolConfig, Pool, Runtime};
use log::{debug, info};

use crate::{
    db_types::BuyerId,
    session::{decode_session, encode_session, session_key, BuyerSession, SessionStore, SessionStoreError},
};

/// Sessions kept in Redis as JSON under `agro:session:{buyer}`.
#[derive(Clone)]
pub struct RedisSessionStore {
    pool: Pool,
    ttl: Option<Duration>,
}

impl RedisSessionStore {
    pub fn new(url: &str, ttl: Option<Duration>) -> Result<Self, SessionStoreError> {
        let cfg = PoolConfig::from_url(url);
        let pool = cfg
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| SessionStoreError::Unavailable(format!("Failed to create Redis pool: {e}")))?;
        info!("🧠️ Redis session store initialised");
        Ok(Self { pool, ttl })
    }
}

impl SessionStore for RedisSessionStore {
    async fn fetch_session(&self, buyer_id: BuyerId) -> Result<Option<BuyerSession>, SessionStoreError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| SessionStoreError::Unavailable(format!("Failed to get Redis connection: {e}")))?;
        let key = session_key(buyer_id);
        let value: Option<String> =
            conn.get(&key).await.map_err(|e| SessionStoreError::Backend(format!("GET {key} failed: {e}")))?;
        Ok(value.and_then(|json| decode_session(buyer_id, &json)))
    }

    async fn save_session(&self, buyer_id: BuyerId, session: &BuyerSession) -> Result<(), SessionStoreError> {
        let json = encode_session(session)?;
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| SessionStoreError::Unavailable(format!("Failed to get Redis connection: {e}")))?;
        let key = session_key(buyer_id);
        match self.ttl {
            Some(ttl) => conn
                .set_ex::<_, _, ()>(&key, json, ttl.as_secs())
                .await
                .map_err(|e| SessionStoreError::Backend(format!("SETEX {key} failed: {e}")))?,
            None => conn
                .set::<_, _, ()>(&key, json)
                .await
                .map_err(|e| SessionStoreError::Backend(format!("SET {key} failed: {e}")))?,
        }
        debug!("🧠️ Session for {buyer_id} saved to Redis");
        Ok(())
    }
}
