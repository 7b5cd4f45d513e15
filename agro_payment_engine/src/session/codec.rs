//! How a [`BuyerSession`] is stored by backends that keep it as text.
use log::warn;

use crate::{
    db_types::BuyerId,
    session::{BuyerSession, SessionStoreError},
};

pub const SESSION_KEY_PREFIX: &str = "agro:session";

/// `agro:session:{buyer}`
pub fn session_key(buyer_id: BuyerId) -> String {
    format!("{SESSION_KEY_PREFIX}:{buyer_id}")
}

pub fn encode_session(session: &BuyerSession) -> Result<String, SessionStoreError> {
    serde_json::to_string(session).map_err(|e| SessionStoreError::Serialization(e.to_string()))
}

/// A stored record that cannot be decoded is logged and read as absent.
pub fn decode_session(buyer_id: BuyerId, json: &str) -> Option<BuyerSession> {
    match serde_json::from_str::<BuyerSession>(json) {
        Ok(session) => Some(session),
        Err(e) => {
            warn!("🧠️ Session for {buyer_id} could not be decoded and is ignored. {e}");
            None
        },
    }
}
