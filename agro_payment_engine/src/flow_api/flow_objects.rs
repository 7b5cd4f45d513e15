use agro_common::Tenge;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::db_types::{OrderId, Store, SubscriptionId};

pub const DEFAULT_SUBSCRIPTION_FEE: i64 = 3000;
pub const DEFAULT_DELIVERY_PRICE: i64 = 1000;
pub const DEFAULT_KASPI_PAY_URL: &str = "https://pay.kaspi.kz/pay/e96vsxbs";
pub const DEFAULT_CARD_NUMBER: &str = "4400 4300 0000 1234";
pub const DEFAULT_CARD_HOLDER: &str = "AGRO CLUB";

/// Prices and payment instructions used by the workflow.
#[derive(Debug, Clone)]
pub struct FlowConfig {
    pub subscription_fee: Tenge,
    /// The flat rate of the synthetic delivery line.
    pub delivery_price: Tenge,
    pub kaspi_pay_url: String,
    pub card_number: String,
    pub card_holder: String,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            subscription_fee: Tenge::from(DEFAULT_SUBSCRIPTION_FEE),
            delivery_price: Tenge::from(DEFAULT_DELIVERY_PRICE),
            kaspi_pay_url: DEFAULT_KASPI_PAY_URL.to_string(),
            card_number: DEFAULT_CARD_NUMBER.to_string(),
            card_holder: DEFAULT_CARD_HOLDER.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCreated {
    pub order_id: OrderId,
    pub goods_total: Tenge,
    pub delivery_price: Tenge,
    pub total: Tenge,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionInvoice {
    pub status: String,
    pub subscription_id: SubscriptionId,
    pub amount: Tenge,
}

/// What a buyer's uploaded document was taken to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiptOutcome {
    Subscription(SubscriptionId),
    Order(OrderId),
    /// The buyer is not waiting on any payment, so the document is not a receipt.
    NotAwaitingPayment,
}

/// Row counts from one expiry sweep. `failed_steps` counts the bulk updates that returned an error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepResult {
    pub expired_subscriptions: u64,
    pub expired_users: u64,
    pub reconciled_users: u64,
    pub failed_steps: usize,
}

impl SweepResult {
    pub fn total_changes(&self) -> u64 {
        self.expired_subscriptions + self.expired_users + self.reconciled_users
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionStatus {
    pub active: bool,
    pub until: Option<NaiveDate>,
    /// The code saved on the user row, even if that store no longer exists.
    pub store_code: Option<String>,
    pub store: Option<Store>,
}

impl SubscriptionStatus {
    /// `YYYY-MM-DD`, or an empty string if there is no active subscription.
    pub fn until_text(&self) -> String {
        self.until.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default()
    }
}
