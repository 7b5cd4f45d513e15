//! # Ledger Store
//!
//! The durable record of orders, order items, subscriptions and the per-user subscription/store fields.
//! Everything that touches money or settlement status is read from and written to the ledger; it is the only
//! source of truth in the system.
//!
//! [`traits`] defines the behaviour a backend must expose to drive the payment workflow. [`sqlite`] is the one
//! backend shipped with the engine.
pub mod traits;

#[cfg(feature = "sqlite")]
pub mod sqlite;
