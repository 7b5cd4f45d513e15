use agro_common::Tenge;
use agro_payment_engine::{
    db_types::{
        BuyerId,
        NewOrderRecord,
        Order,
        OrderId,
        OrderItem,
        OrderStatusType,
        Store,
        Subscription,
        SubscriptionId,
        SubscriptionStatusType,
        UserProfile,
        UserSubscriptionStatus,
    },
    DecisionOutcome,
    OrderManagement,
    OrderQueryFilter,
    StoreManagement,
    SubscriptionManagement,
};
use chrono::{DateTime, Utc};
use mockall::mock;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("mock ledger failure: {0}")]
pub struct MockLedgerError(pub String);

mock! {
    pub Ledger {}
    impl OrderManagement for Ledger {
        type Error = MockLedgerError;
        async fn insert_order(&self, order: NewOrderRecord) -> Result<Order, MockLedgerError>;
        async fn fetch_order(&self, id: OrderId) -> Result<Option<Order>, MockLedgerError>;
        async fn fetch_order_items(&self, id: OrderId) -> Result<Vec<OrderItem>, MockLedgerError>;
        async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, MockLedgerError>;
        async fn mark_order_paid(&self, id: OrderId) -> Result<DecisionOutcome, MockLedgerError>;
    }
    impl SubscriptionManagement for Ledger {
        type Error = MockLedgerError;
        async fn insert_subscription_request(&self, buyer_id: BuyerId, phone: &str, amount: Tenge) -> Result<Subscription, MockLedgerError>;
        async fn fetch_subscription(&self, id: SubscriptionId) -> Result<Option<Subscription>, MockLedgerError>;
        async fn fetch_latest_pending_subscription(&self, buyer_id: BuyerId) -> Result<Option<Subscription>, MockLedgerError>;
        async fn fetch_active_subscription_until(&self, buyer_id: BuyerId, now: DateTime<Utc>) -> Result<Option<DateTime<Utc>>, MockLedgerError>;
        async fn fetch_user(&self, buyer_id: BuyerId) -> Result<Option<UserProfile>, MockLedgerError>;
        async fn activate_subscription(&self, id: SubscriptionId, valid_until: DateTime<Utc>, now: DateTime<Utc>) -> Result<DecisionOutcome, MockLedgerError>;
        async fn reject_subscription(&self, id: SubscriptionId) -> Result<DecisionOutcome, MockLedgerError>;
        async fn project_subscription_status(&self, buyer_id: BuyerId, now: DateTime<Utc>) -> Result<bool, MockLedgerError>;
        async fn expire_subscriptions(&self, now: DateTime<Utc>) -> Result<u64, MockLedgerError>;
        async fn expire_user_subscriptions(&self, now: DateTime<Utc>) -> Result<u64, MockLedgerError>;
        async fn reconcile_subscription_statuses(&self, now: DateTime<Utc>) -> Result<u64, MockLedgerError>;
    }
    impl StoreManagement for Ledger {
        type Error = MockLedgerError;
        async fn fetch_store(&self, code: &str) -> Result<Option<Store>, MockLedgerError>;
        async fn select_store(&self, buyer_id: BuyerId, store: &str) -> Result<Option<Store>, MockLedgerError>;
        async fn fetch_selected_store_code(&self, buyer_id: BuyerId) -> Result<Option<String>, MockLedgerError>;
    }
}

/// The row the ledger would have written for `record`.
pub fn saved_order(id: i64, record: &NewOrderRecord) -> Order {
    let now = Utc::now();
    Order {
        id: OrderId(id),
        user_id: record.buyer_id,
        store_code: record.store_code.clone(),
        total_amount: record.total_amount,
        status: OrderStatusType::New,
        created_at: now,
        updated_at: now,
    }
}

pub fn pending_subscription(id: i64, buyer_id: BuyerId, phone: &str, amount: Tenge) -> Subscription {
    Subscription {
        id: SubscriptionId(id),
        user_id: buyer_id,
        phone: phone.to_string(),
        status: SubscriptionStatusType::Pending,
        amount,
        valid_until: None,
        created_at: Utc::now(),
    }
}

pub fn user_profile(buyer_id: BuyerId, status: UserSubscriptionStatus, until: Option<DateTime<Utc>>) -> UserProfile {
    let now = Utc::now();
    UserProfile {
        id: 1,
        user_id: buyer_id,
        nickname: String::new(),
        phone: None,
        sub_status: status,
        sub_until: until,
        selected_store: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn store(code: &str, name: &str, address: &str) -> Store {
    Store { code: code.to_string(), name: name.to_string(), address: Some(address.to_string()) }
}
