use agro_payment_engine::{
    db_types::{BuyerId, OrderId, SubscriptionId},
    flow_api::{OrderCreated, ReceiptOutcome, SubscriptionInvoice, SweepResult},
    session::MemorySessionStore,
    test_utils::{
        prepare_env::{prepare_test_env, random_db_path},
        RecordingNotifier,
    },
    DecisionOutcome,
    FlowConfig,
    PaymentFlowApi,
    SqliteDatabase,
};
use cucumber::World;
use log::*;

pub type TestFlowApi = PaymentFlowApi<SqliteDatabase, MemorySessionStore, RecordingNotifier>;

#[derive(Default, Debug, World)]
pub struct PaymentWorld {
    pub system: Option<PaymentSystem>,
    pub last_order: Option<OrderCreated>,
    pub last_subscription: Option<SubscriptionInvoice>,
    pub last_receipt: Option<ReceiptOutcome>,
    pub decisions: Vec<Option<DecisionOutcome>>,
    pub last_sweep: Option<SweepResult>,
}

#[derive(Debug)]
pub struct PaymentSystem {
    pub db_path: String,
    pub api: TestFlowApi,
    pub notifier: RecordingNotifier,
}

impl PaymentWorld {
    pub fn api(&self) -> &TestFlowApi {
        &self.system.as_ref().expect("PaymentFlowApi not initialised").api
    }

    pub fn notifier(&self) -> &RecordingNotifier {
        &self.system.as_ref().expect("PaymentFlowApi not initialised").notifier
    }

    pub fn last_order_id(&self) -> OrderId {
        self.last_order.as_ref().expect("No order has been placed").order_id
    }

    pub fn last_subscription_id(&self) -> SubscriptionId {
        self.last_subscription.as_ref().expect("No subscription has been requested").subscription_id
    }
}

impl PaymentSystem {
    pub async fn new() -> Self {
        let db_path = random_db_path();
        let db = prepare_test_env(&db_path).await;
        debug!("Created database: {db_path}");
        let notifier = RecordingNotifier::default();
        let api = PaymentFlowApi::new(db, MemorySessionStore::default(), notifier.clone(), FlowConfig::default());
        Self { db_path, api, notifier }
    }
}

pub fn buyer(id: i64) -> BuyerId {
    BuyerId::new(id).expect("Buyer ids in scenarios must be positive")
}
