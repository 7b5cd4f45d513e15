use actix_web::{http::StatusCode, test::TestRequest};
use agro_common::Tenge;
use agro_payment_engine::{
    db_types::{SubscriptionId, UserSubscriptionStatus},
    notify::Recipient,
    session::{PaymentRequest, SessionStore},
};
use chrono::{Duration, Utc};
use serde_json::json as j;

use super::{
    helpers::{bot_options, buyer, json, send_request, test_api},
    mocks::{pending_subscription, store, user_profile, MockLedger},
};

#[actix_web::test]
async fn subscription_invoice_is_recorded() {
    let _ = env_logger::try_init().ok();
    let mut ledger = MockLedger::new();
    ledger
        .expect_insert_subscription_request()
        .withf(|b, phone, amount| b.value() == 42 && phone == "+77001112233" && *amount == Tenge::from(3000))
        .times(1)
        .returning(|b, phone, amount| Ok(pending_subscription(8, b, phone, amount)));
    let (api, notifier) = test_api(ledger);
    let body = j!({"telegram_id": 42, "phone": "  +77001112233 "});
    let req = TestRequest::post().uri("/api/subscribe/request-invoice").set_json(body);
    let (status, body) = send_request(api.clone(), bot_options(None), req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body), j!({"status": "ok"}));
    let session = api.sessions().fetch_session(buyer(42)).await.unwrap().unwrap();
    assert_eq!(session.active_request, Some(PaymentRequest::Subscription(SubscriptionId(8))));
    assert_eq!(notifier.messages_for(Recipient::Admin).len(), 1);
    assert_eq!(notifier.messages_for(Recipient::Buyer(buyer(42))).len(), 1);
}

#[actix_web::test]
async fn subscription_invoice_needs_a_phone() {
    let _ = env_logger::try_init().ok();
    let (api, _) = test_api(MockLedger::new());
    let req = TestRequest::post().uri("/api/subscribe/request-invoice").set_json(j!({"telegram_id": "42", "phone": " "}));
    let (status, body) = send_request(api, bot_options(None), req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json(&body), j!({"error": "telegram_id and phone are required"}));
}

#[actix_web::test]
async fn subscription_status_from_the_header() {
    let _ = env_logger::try_init().ok();
    let until = Utc::now() + Duration::days(10);
    let mut ledger = MockLedger::new();
    ledger.expect_fetch_user().times(1).returning(move |b| {
        let mut user = user_profile(b, UserSubscriptionStatus::Active, Some(until));
        user.selected_store = Some("ALM-1".to_string());
        Ok(Some(user))
    });
    ledger.expect_fetch_active_subscription_until().times(0);
    ledger.expect_fetch_store().times(1).returning(|_| Ok(Some(store("ALM-1", "Green Market", "Tole bi 5"))));
    let (api, _) = test_api(ledger);
    let req = TestRequest::get().uri("/api/user/subscription-status").insert_header(("X-Telegram-Id", "42"));
    let (status, body) = send_request(api, bot_options(None), req).await;
    assert_eq!(status, StatusCode::OK);
    let expected = j!({
        "active": true,
        "until": until.format("%Y-%m-%d").to_string(),
        "store_code": "ALM-1",
        "store_name": "Green Market",
        "store_address": "Tole bi 5"
    });
    assert_eq!(json(&body), expected);
}

#[actix_web::test]
async fn subscription_status_for_a_stranger() {
    let _ = env_logger::try_init().ok();
    let mut ledger = MockLedger::new();
    ledger.expect_fetch_user().times(1).returning(|_| Ok(None));
    ledger.expect_fetch_active_subscription_until().times(1).returning(|_, _| Ok(None));
    let (api, _) = test_api(ledger);
    let req = TestRequest::get().uri("/api/user/subscription-status?telegram_id=77");
    let (status, body) = send_request(api, bot_options(None), req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json(&body),
        j!({"active": false, "until": "", "store_code": "", "store_name": "", "store_address": ""})
    );
}

#[actix_web::test]
async fn subscription_status_needs_an_id() {
    let _ = env_logger::try_init().ok();
    let (api, _) = test_api(MockLedger::new());
    let req = TestRequest::get().uri("/api/user/subscription-status?telegram_id=abc");
    let (status, body) = send_request(api, bot_options(None), req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json(&body), j!({"error": "telegram_id is required"}));
}

#[actix_web::test]
async fn selecting_a_store() {
    let _ = env_logger::try_init().ok();
    let mut ledger = MockLedger::new();
    ledger
        .expect_select_store()
        .withf(|b, s| b.value() == 42 && s == "Green Market")
        .times(1)
        .returning(|_, _| Ok(Some(store("ALM-1", "Green Market", "Tole bi 5"))));
    let (api, _) = test_api(ledger);
    let req = TestRequest::post().uri("/api/user/set-store").set_json(j!({"telegram_id": 42, "store": " Green Market "}));
    let (status, body) = send_request(api, bot_options(None), req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body), j!({"status": "ok"}));
}

#[actix_web::test]
async fn selecting_an_unknown_store() {
    let _ = env_logger::try_init().ok();
    let mut ledger = MockLedger::new();
    ledger.expect_select_store().times(1).returning(|_, _| Ok(None));
    let (api, _) = test_api(ledger);
    let req = TestRequest::post().uri("/api/user/set-store").set_json(j!({"telegram_id": 42, "store": "Nowhere"}));
    let (status, body) = send_request(api, bot_options(None), req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json(&body), j!({"error": "store not found"}));
}

#[actix_web::test]
async fn selecting_a_store_needs_a_store() {
    let _ = env_logger::try_init().ok();
    let (api, _) = test_api(MockLedger::new());
    let req = TestRequest::post().uri("/api/user/set-store").set_json(j!({"telegram_id": 42}));
    let (status, body) = send_request(api, bot_options(None), req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json(&body), j!({"error": "telegram_id and store are required"}));
}

#[actix_web::test]
async fn delivery_price() {
    let _ = env_logger::try_init().ok();
    let (api, _) = test_api(MockLedger::new());
    let req = TestRequest::get().uri("/api/delivery/price");
    let (status, body) = send_request(api, bot_options(None), req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body), j!({"price": 1000, "currency": "KZT"}));
}

#[actix_web::test]
async fn health() {
    let (api, _) = test_api(MockLedger::new());
    let (status, body) = send_request(api, bot_options(None), TestRequest::get().uri("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "👍️\n");
}
