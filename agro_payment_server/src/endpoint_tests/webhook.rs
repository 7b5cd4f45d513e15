use actix_web::{http::StatusCode, test::TestRequest};
use agro_common::Tenge;
use agro_payment_engine::{
    db_types::{BuyerId, Order, OrderId, OrderStatusType, PaymentMethod},
    notify::{LinkButton, Recipient},
    session::{BuyerSession, PaymentRequest, SessionStore},
    test_utils::NotificationRecord,
    DecisionOutcome,
};
use chrono::Utc;
use serde_json::{json as j, Value};

use super::{
    helpers::{bot_options, buyer, send_request, test_api, ADMIN_ID, MINI_APP_URL},
    mocks::MockLedger,
};
use crate::telegram::{GREETING, OPEN_ADMIN, OPEN_MINI_APP};

const WEBHOOK: &str = "/telegram/webhook";

fn text_update(from: i64, text: &str) -> Value {
    j!({
        "update_id": 1,
        "message": {"message_id": 10, "from": {"id": from, "first_name": "Aru"}, "chat": {"id": from}, "text": text}
    })
}

fn document_update(from: i64) -> Value {
    j!({
        "update_id": 2,
        "message": {
            "message_id": 11,
            "from": {"id": from, "first_name": "Aru", "username": "aru_kz"},
            "chat": {"id": from},
            "document": {"file_id": "BQACAgIAAx", "file_name": "receipt.pdf"}
        }
    })
}

fn callback_update(from: i64, data: &str) -> Value {
    j!({
        "update_id": 3,
        "callback_query": {"id": "cb-1", "from": {"id": from, "first_name": "Admin"}, "data": data}
    })
}

fn paid_order(id: OrderId, owner: BuyerId) -> Order {
    let now = Utc::now();
    Order {
        id,
        user_id: owner,
        store_code: None,
        total_amount: Tenge::from(5000),
        status: OrderStatusType::Paid,
        created_at: now,
        updated_at: now,
    }
}

#[actix_web::test]
async fn webhook_rejects_a_wrong_secret() {
    let _ = env_logger::try_init().ok();
    let (api, notifier) = test_api(MockLedger::new());
    let req = TestRequest::post()
        .uri(WEBHOOK)
        .insert_header(("X-Telegram-Bot-Api-Secret-Token", "guess"))
        .set_json(text_update(42, "/start"));
    let (status, _) = send_request(api, bot_options(Some("s3cret")), req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(notifier.records().is_empty());
}

#[actix_web::test]
async fn start_greets_a_buyer() {
    let _ = env_logger::try_init().ok();
    let (api, notifier) = test_api(MockLedger::new());
    let req = TestRequest::post()
        .uri(WEBHOOK)
        .insert_header(("X-Telegram-Bot-Api-Secret-Token", "s3cret"))
        .set_json(text_update(42, "/start"));
    let (status, _) = send_request(api, bot_options(Some("s3cret")), req).await;
    assert_eq!(status, StatusCode::OK);
    let records = notifier.records();
    assert_eq!(records.len(), 1);
    match &records[0] {
        NotificationRecord::Message { recipient, message } => {
            assert_eq!(*recipient, Recipient::Buyer(buyer(42)));
            assert_eq!(message.text, GREETING);
            assert_eq!(message.buttons, vec![LinkButton::web_app(OPEN_MINI_APP, MINI_APP_URL)]);
        },
        other => panic!("Expected a greeting, got {other:?}"),
    }
}

#[actix_web::test]
async fn the_administrator_gets_an_admin_button() {
    let _ = env_logger::try_init().ok();
    let (api, notifier) = test_api(MockLedger::new());
    let req = TestRequest::post().uri(WEBHOOK).set_json(text_update(ADMIN_ID, "hello"));
    let (status, _) = send_request(api, bot_options(None), req).await;
    assert_eq!(status, StatusCode::OK);
    let records = notifier.records();
    let NotificationRecord::Message { message, .. } = &records[0] else {
        panic!("Expected a greeting, got {records:?}");
    };
    assert_eq!(message.buttons.len(), 2);
    assert_eq!(message.buttons[1], LinkButton::web_app(OPEN_ADMIN, "https://agro.example/admin-show-catalog"));
}

#[actix_web::test]
async fn admin_confirms_an_order_payment() {
    let _ = env_logger::try_init().ok();
    let mut ledger = MockLedger::new();
    ledger.expect_mark_order_paid().withf(|id| *id == OrderId(5)).times(1).returning(|_| Ok(DecisionOutcome::Applied));
    ledger.expect_fetch_order().times(1).returning(|id| Ok(Some(paid_order(id, buyer(42)))));
    let (api, notifier) = test_api(ledger);
    let req = TestRequest::post().uri(WEBHOOK).set_json(callback_update(ADMIN_ID, "pay_ok:5:42"));
    let (status, _) = send_request(api.clone(), bot_options(None), req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(notifier.acknowledgements(), vec!["Order payment confirmed ✅".to_string()]);
    assert_eq!(notifier.messages_for(Recipient::Buyer(buyer(42))).len(), 1);
    let session = api.sessions().fetch_session(buyer(42)).await.unwrap().unwrap();
    assert!(session.is_paid);
    assert!(!session.is_awaiting_payment());
}

#[actix_web::test]
async fn order_confirmation_goes_to_the_order_owner() {
    let _ = env_logger::try_init().ok();
    let mut ledger = MockLedger::new();
    ledger.expect_mark_order_paid().times(1).returning(|_| Ok(DecisionOutcome::Applied));
    ledger
        .expect_fetch_order()
        .withf(|id| *id == OrderId(5))
        .times(1)
        .returning(|id| Ok(Some(paid_order(id, buyer(42)))));
    let (api, notifier) = test_api(ledger);
    let req = TestRequest::post().uri(WEBHOOK).set_json(callback_update(ADMIN_ID, "pay_ok:5:77"));
    let (status, _) = send_request(api.clone(), bot_options(None), req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(notifier.messages_for(Recipient::Buyer(buyer(42))).len(), 1);
    assert!(notifier.messages_for(Recipient::Buyer(buyer(77))).is_empty());
    assert!(api.sessions().fetch_session(buyer(77)).await.unwrap().is_none());
    assert!(api.sessions().fetch_session(buyer(42)).await.unwrap().unwrap().is_paid);
}

#[actix_web::test]
async fn webhook_rejects_a_secret_with_a_matching_prefix() {
    let _ = env_logger::try_init().ok();
    let (api, notifier) = test_api(MockLedger::new());
    let req = TestRequest::post()
        .uri(WEBHOOK)
        .insert_header(("X-Telegram-Bot-Api-Secret-Token", "s3cret-and-more"))
        .set_json(text_update(42, "/start"));
    let (status, _) = send_request(api, bot_options(Some("s3cret")), req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(notifier.records().is_empty());
}

#[actix_web::test]
async fn button_presses_from_strangers_are_ignored() {
    let _ = env_logger::try_init().ok();
    let (api, notifier) = test_api(MockLedger::new());
    let req = TestRequest::post().uri(WEBHOOK).set_json(callback_update(42, "pay_ok:5:42"));
    let (status, _) = send_request(api, bot_options(None), req).await;
    assert_eq!(status, StatusCode::OK);
    assert!(notifier.records().is_empty());
}

#[actix_web::test]
async fn a_receipt_is_forwarded_to_the_administrator() {
    let _ = env_logger::try_init().ok();
    let mut ledger = MockLedger::new();
    ledger.expect_fetch_order().withf(|id| *id == OrderId(9)).times(1).returning(|_| Ok(None));
    ledger.expect_fetch_order_items().times(1).returning(|_| Ok(Vec::new()));
    let (api, notifier) = test_api(ledger);
    let session = BuyerSession::awaiting_payment(PaymentRequest::Order(OrderId(9)), PaymentMethod::KaspiLink, "+7700");
    api.sessions().save_session(buyer(42), &session).await.unwrap();
    let req = TestRequest::post().uri(WEBHOOK).set_json(document_update(42));
    let (status, _) = send_request(api, bot_options(None), req).await;
    assert_eq!(status, StatusCode::OK);
    let forwards = notifier.forwards();
    assert_eq!(forwards.len(), 1);
    let (document, _caption, actions) = &forwards[0];
    assert_eq!(document.chat_id, 42);
    assert_eq!(document.message_id, 11);
    assert_eq!(document.sender_username.as_deref(), Some("aru_kz"));
    assert_eq!(actions[0].token, "pay_ok:9:42");
    assert_eq!(actions[1].token, "pay_reject:9:42");
    assert_eq!(notifier.messages_for(Recipient::Buyer(buyer(42))).len(), 1);
}

#[actix_web::test]
async fn a_document_without_a_pending_payment_gets_the_greeting() {
    let _ = env_logger::try_init().ok();
    let (api, notifier) = test_api(MockLedger::new());
    let req = TestRequest::post().uri(WEBHOOK).set_json(document_update(42));
    let (status, _) = send_request(api, bot_options(None), req).await;
    assert_eq!(status, StatusCode::OK);
    assert!(notifier.forwards().is_empty());
    assert_eq!(notifier.messages_for(Recipient::Buyer(buyer(42))), vec![GREETING.to_string()]);
}

#[actix_web::test]
async fn webhook_failures_still_answer_ok() {
    let _ = env_logger::try_init().ok();
    let mut ledger = MockLedger::new();
    ledger
        .expect_mark_order_paid()
        .times(1)
        .returning(|_| Err(super::mocks::MockLedgerError("database is locked".into())));
    let (api, notifier) = test_api(ledger);
    let req = TestRequest::post().uri(WEBHOOK).set_json(callback_update(ADMIN_ID, "pay_ok:5:42"));
    let (status, _) = send_request(api, bot_options(None), req).await;
    assert_eq!(status, StatusCode::OK);
    assert!(notifier.acknowledgements().is_empty());
}
