//! Per-buyer workflow state.
//!
//! A [`BuyerSession`] records what the buyer is currently expected to pay for. It is a disposable cache: losing it
//! means an uploaded receipt is no longer routed automatically, but the ledger is never affected. Every caller in the
//! workflow engine treats a session error as a logged warning.
mod codec;
mod memory;
#[cfg(feature = "redis")]
mod redis;

pub use codec::{decode_session, encode_session, session_key, SESSION_KEY_PREFIX};
pub use memory::MemorySessionStore;
#[cfg(feature = "redis")]
pub use redis::RedisSessionStore;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db_types::{BuyerId, OrderId, PaymentMethod, SubscriptionId};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    Start,
    AwaitingPayment,
}

/// The payment request a buyer's next receipt belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum PaymentRequest {
    Order(OrderId),
    Subscription(SubscriptionId),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuyerSession {
    #[serde(default)]
    pub state: SessionState,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub contact: String,
    #[serde(default)]
    pub is_paid: bool,
    #[serde(default)]
    pub active_request: Option<PaymentRequest>,
}

impl BuyerSession {
    /// A session waiting for proof of payment for `request`.
    pub fn awaiting_payment<S: Into<String>>(request: PaymentRequest, method: PaymentMethod, contact: S) -> Self {
        Self {
            state: SessionState::AwaitingPayment,
            payment_method: method,
            contact: contact.into(),
            is_paid: false,
            active_request: Some(request),
        }
    }

    pub fn is_awaiting_payment(&self) -> bool {
        self.state == SessionState::AwaitingPayment
    }

    /// Back to `Start` after an admin decision. The payment method and contact are kept.
    pub fn settle(&mut self, paid: bool) {
        self.state = SessionState::Start;
        self.active_request = None;
        if paid {
            self.is_paid = true;
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum SessionStoreError {
    #[error("Session backend is unavailable: {0}")]
    Unavailable(String),
    #[error("Session backend command failed: {0}")]
    Backend(String),
    #[error("Could not serialize the session: {0}")]
    Serialization(String),
}

/// Get/set access to buyer sessions. There is no transactional coupling with the ledger.
#[allow(async_fn_in_trait)]
pub trait SessionStore {
    async fn fetch_session(&self, buyer_id: BuyerId) -> Result<Option<BuyerSession>, SessionStoreError>;

    async fn save_session(&self, buyer_id: BuyerId, session: &BuyerSession) -> Result<(), SessionStoreError>;
}
