//! The order and subscription payment workflow.
//!
//! [`PaymentFlowApi`] coordinates the ledger, the buyer sessions and the notifier. The ledger is always written first
//! and is authoritative; session writes and notifications that follow are best-effort and are logged when they fail.
mod decision_token;
mod errors;
mod flow_objects;
mod messages;
mod payment_flow_api;

pub use decision_token::{one_month_after, DecisionToken, DecisionVerb, MalformedToken};
pub use errors::FlowError;
pub use flow_objects::{
    FlowConfig,
    OrderCreated,
    ReceiptOutcome,
    SubscriptionInvoice,
    SubscriptionStatus,
    SweepResult,
    DEFAULT_DELIVERY_PRICE,
    DEFAULT_SUBSCRIPTION_FEE,
};
pub use payment_flow_api::PaymentFlowApi;
