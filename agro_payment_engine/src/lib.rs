//! Agro Payment Engine
//!
//! The engine holds the order and subscription payment workflow of the Agro Club wholesale catalog. Buyers place
//! orders or request a subscription from the mini-app, pay manually, and send a receipt to the bot. The
//! administrator then approves or rejects each payment.
//!
//! The library is divided into these sections:
//! 1. Database management ([`mod@db`]). The ledger traits and the SQLite backend. The data types stored in the
//!    ledger live in [`db_types`] and are public.
//! 2. Buyer sessions ([`mod@session`]). The short-lived record of what a buyer is expected to pay for, kept in memory
//!    or in Redis.
//! 3. Notifications ([`mod@notify`]). The outbound channel to the buyer and the administrator. The transport is
//!    provided by the caller.
//! 4. The workflow itself ([`mod@flow_api`]). [`PaymentFlowApi`] ties the three together and is what a server
//!    exposes.
mod db;

pub mod db_types;
pub mod flow_api;
pub mod notify;
pub mod session;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

#[cfg(feature = "sqlite")]
pub use db::sqlite::{db_url, SqliteDatabase, SqliteDatabaseError};
pub use db::traits::{
    DecisionOutcome,
    LedgerStore,
    OrderManagement,
    OrderQueryFilter,
    StoreManagement,
    SubscriptionManagement,
};
pub use flow_api::{FlowConfig, FlowError, PaymentFlowApi};
