use actix_web::{http::StatusCode, test::TestRequest};
use agro_common::Tenge;
use agro_payment_engine::{
    db_types::PaymentMethod,
    notify::Recipient,
    session::{PaymentRequest, SessionStore},
};
use serde_json::json as j;

use super::{
    helpers::{bot_options, buyer, json, send_request, test_api},
    mocks::{saved_order, MockLedger, MockLedgerError},
};

fn rice(qty: f64) -> serde_json::Value {
    j!({"product_id": 1, "name": "Rice", "unit": "kg", "qty": qty, "price": 450})
}

#[actix_web::test]
async fn confirm_order_with_home_delivery() {
    let _ = env_logger::try_init().ok();
    let mut ledger = MockLedger::new();
    ledger.expect_fetch_selected_store_code().times(1).returning(|_| Ok(None));
    ledger
        .expect_insert_order()
        .withf(|r| r.items.len() == 2 && r.total_amount == Tenge::from(1900) && r.buyer_id.value() == 42)
        .times(1)
        .returning(|r| Ok(saved_order(17, &r)));
    let (api, notifier) = test_api(ledger);
    let body = j!({
        "telegram_id": " 42 ",
        "items": [rice(2.0)],
        "delivery": {"type": "Delivery", "address": "Abay 10", "phone": "+77001234567"},
        "payment_method": "kaspi_transfer"
    });
    let req = TestRequest::post().uri("/api/orders/confirm").set_json(body);
    let (status, body) = send_request(api.clone(), bot_options(None), req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json(&body),
        j!({"status": "ok", "order_id": 17, "goods_total": 900, "delivery_price": 1000, "total": 1900})
    );
    assert_eq!(notifier.messages_for(Recipient::Admin).len(), 1);
    assert_eq!(notifier.messages_for(Recipient::Buyer(buyer(42))).len(), 1);
    let session = api.sessions().fetch_session(buyer(42)).await.unwrap().unwrap();
    assert!(session.is_awaiting_payment());
    assert_eq!(session.payment_method, PaymentMethod::KaspiTransfer);
    assert_eq!(session.contact, "+77001234567");
    assert_eq!(session.active_request, Some(PaymentRequest::Order(agro_payment_engine::db_types::OrderId(17))));
}

#[actix_web::test]
async fn confirm_order_requires_a_buyer() {
    let _ = env_logger::try_init().ok();
    let (api, notifier) = test_api(MockLedger::new());
    let req = TestRequest::post().uri("/api/orders/confirm").set_json(j!({"items": [rice(1.0)]}));
    let (status, body) = send_request(api, bot_options(None), req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json(&body), j!({"error": "telegram_id and items are required"}));
    assert!(notifier.records().is_empty());
}

#[actix_web::test]
async fn confirm_order_rejects_bad_quantities() {
    let _ = env_logger::try_init().ok();
    let (api, _) = test_api(MockLedger::new());
    let req = TestRequest::post().uri("/api/orders/confirm").set_json(j!({"telegram_id": 42, "items": [rice(0.0)]}));
    let (status, body) = send_request(api, bot_options(None), req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json(&body), j!({"error": "bad item qty/price"}));
}

#[actix_web::test]
async fn confirm_order_rejects_totals_out_of_range() {
    let _ = env_logger::try_init().ok();
    let (api, notifier) = test_api(MockLedger::new());
    let grain = j!({"product_id": 2, "name": "Grain", "unit": "t", "qty": 1e18, "price": 1_000_000_000});
    let body = j!({"telegram_id": 42, "items": [grain.clone(), grain]});
    let req = TestRequest::post().uri("/api/orders/confirm").set_json(body);
    let (status, body) = send_request(api, bot_options(None), req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json(&body), j!({"error": "bad item qty/price"}));
    assert!(notifier.records().is_empty());
}

#[actix_web::test]
async fn confirm_order_rejects_unknown_payment_methods() {
    let _ = env_logger::try_init().ok();
    let (api, _) = test_api(MockLedger::new());
    let body = j!({"telegram_id": 42, "items": [rice(1.0)], "payment_method": "bitcoin"});
    let req = TestRequest::post().uri("/api/orders/confirm").set_json(body);
    let (status, body) = send_request(api, bot_options(None), req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json(&body), j!({"error": "unknown payment_method"}));
}

#[actix_web::test]
async fn malformed_json_gets_a_json_error() {
    let _ = env_logger::try_init().ok();
    let (api, _) = test_api(MockLedger::new());
    let req = TestRequest::post()
        .uri("/api/orders/confirm")
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json");
    let (status, body) = send_request(api, bot_options(None), req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json(&body), j!({"error": "invalid json"}));
}

#[actix_web::test]
async fn database_failures_are_not_leaked() {
    let _ = env_logger::try_init().ok();
    let mut ledger = MockLedger::new();
    ledger.expect_fetch_selected_store_code().returning(|_| Ok(None));
    ledger.expect_insert_order().times(1).returning(|_| Err(MockLedgerError("disk I/O error".into())));
    let (api, notifier) = test_api(ledger);
    let req = TestRequest::post().uri("/api/orders/confirm").set_json(j!({"telegram_id": 42, "items": [rice(1.0)]}));
    let (status, body) = send_request(api, bot_options(None), req).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json(&body), j!({"error": "db error"}));
    assert!(notifier.records().is_empty());
}

#[actix_web::test]
async fn basic_order_truncates_fractional_amounts() {
    let _ = env_logger::try_init().ok();
    let mut ledger = MockLedger::new();
    ledger.expect_fetch_selected_store_code().returning(|_| Ok(None));
    ledger
        .expect_insert_order()
        .withf(|r| r.items.len() == 1 && r.total_amount == Tenge::from(1498))
        .times(1)
        .returning(|r| Ok(saved_order(5, &r)));
    let (api, _) = test_api(ledger);
    let item = j!({"product_id": 3, "name": "Flour", "unit": "kg", "qty": 1.5, "price": 999});
    let req = TestRequest::post().uri("/api/orders/create").set_json(j!({"telegram_id": "42", "items": [item]}));
    let (status, body) = send_request(api.clone(), bot_options(None), req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body), j!({"status": "ok", "order_id": 5, "total": 1498}));
    assert!(api.sessions().fetch_session(buyer(42)).await.unwrap().is_none());
}

#[actix_web::test]
async fn basic_order_requires_items() {
    let _ = env_logger::try_init().ok();
    let (api, _) = test_api(MockLedger::new());
    let req = TestRequest::post().uri("/api/orders/create").set_json(j!({"telegram_id": 42, "items": []}));
    let (status, body) = send_request(api, bot_options(None), req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json(&body), j!({"error": "telegram_id and items are required"}));
}
