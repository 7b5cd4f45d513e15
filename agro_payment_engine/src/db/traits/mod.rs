//! Interface contracts for ledger backends.
//!
//! * [`OrderManagement`] writes orders atomically with their line items and applies the payment decision.
//! * [`SubscriptionManagement`] records subscription requests, applies the approve/reject decisions, keeps the
//!   denormalized user status in step with the subscriptions table, and expires stale subscriptions.
//! * [`StoreManagement`] resolves fulfillment locations and the buyer's selected store.
//! * [`LedgerStore`] is the union of the three and is what the workflow engine is generic over.
mod data_objects;
mod order_management;
mod store_management;
mod subscription_management;

pub use data_objects::{DecisionOutcome, OrderQueryFilter};
pub use order_management::OrderManagement;
pub use store_management::StoreManagement;
pub use subscription_management::SubscriptionManagement;

/// A backend that can serve every ledger operation the payment workflow needs.
pub trait LedgerStore: OrderManagement + SubscriptionManagement + StoreManagement {}

impl<T> LedgerStore for T where T: OrderManagement + SubscriptionManagement + StoreManagement {}
