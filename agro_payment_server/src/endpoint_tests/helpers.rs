use actix_web::{http::StatusCode, test, test::TestRequest, web, App};
use agro_payment_engine::{
    db_types::BuyerId,
    session::MemorySessionStore,
    test_utils::RecordingNotifier,
    FlowConfig,
    PaymentFlowApi,
};
use log::debug;

use super::mocks::MockLedger;
use crate::{
    config::BotOptions,
    routes::configure_routes,
    server::{json_config, query_config},
};

pub type TestApi = PaymentFlowApi<MockLedger, MemorySessionStore, RecordingNotifier>;

pub const ADMIN_ID: i64 = 1000;
pub const MINI_APP_URL: &str = "https://agro.example";

pub fn buyer(id: i64) -> BuyerId {
    BuyerId::new(id).unwrap()
}

/// Wraps `ledger` in a workflow engine with in-memory sessions and a recording notifier. The returned notifier shares
/// its records with the one inside the engine.
pub fn test_api(ledger: MockLedger) -> (web::Data<TestApi>, RecordingNotifier) {
    let notifier = RecordingNotifier::default();
    let api = PaymentFlowApi::new(ledger, MemorySessionStore::default(), notifier.clone(), FlowConfig::default());
    (web::Data::new(api), notifier)
}

pub fn bot_options(secret: Option<&str>) -> BotOptions {
    BotOptions {
        admin_id: Some(buyer(ADMIN_ID)),
        mini_app_url: MINI_APP_URL.to_string(),
        webhook_secret: secret.map(|s| agro_common::Secret::new(s.to_string())),
    }
}

pub async fn send_request(api: web::Data<TestApi>, options: BotOptions, req: TestRequest) -> (StatusCode, String) {
    let app = App::new()
        .app_data(json_config())
        .app_data(query_config())
        .app_data(api)
        .app_data(web::Data::new(options))
        .configure(configure_routes::<MockLedger, MemorySessionStore, RecordingNotifier>);
    let service = test::init_service(app).await;
    debug!("Making request");
    let res = test::call_service(&service, req.to_request()).await;
    let status = res.status();
    let body = test::read_body(res).await;
    (status, String::from_utf8_lossy(&body).into_owned())
}

pub fn json(body: &str) -> serde_json::Value {
    serde_json::from_str(body).unwrap_or_else(|e| panic!("Response is not JSON ({e}): {body}"))
}
