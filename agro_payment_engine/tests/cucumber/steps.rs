use agro_payment_engine::{
    db_types::{Delivery, DeliveryKind, NewOrder, NewOrderItem, PaymentMethod, Tenge},
    flow_api::ReceiptOutcome,
    notify::{DocumentRef, Recipient},
    session::SessionStore,
    DecisionOutcome,
    OrderManagement,
    SubscriptionManagement,
};
use chrono::{Duration, Utc};
use cucumber::{gherkin::Step, given, then, when};

use crate::cucumber::{payment_world::buyer, PaymentWorld};

fn items_from_table(step: &Step) -> Vec<NewOrderItem> {
    let table = step.table.as_ref().expect("The step needs a table of items");
    table
        .rows
        .iter()
        .skip(1)
        .map(|row| {
            let qty = row[2].parse::<f64>().expect("qty must be a number");
            let price = row[3].parse::<i64>().expect("price must be an integer");
            NewOrderItem::new(1, row[0].as_str(), row[1].as_str(), qty, Tenge::from(price))
        })
        .collect()
}

#[when(expr = "buyer {int} places a {word} order paying by {word} with items:")]
async fn place_order(world: &mut PaymentWorld, buyer_id: i64, kind: String, method: String, step: &Step) {
    let kind = kind.parse::<DeliveryKind>().expect("Invalid delivery kind");
    let method = method.parse::<PaymentMethod>().expect("Invalid payment method");
    let delivery = Delivery { kind, address: "Abay ave 10".into(), phone: "+77001234567".into(), lat: None, lng: None };
    let order = NewOrder::new(buyer(buyer_id), items_from_table(step)).with_delivery(delivery).with_payment_method(method);
    let created = world.api().create_order(order).await.expect("Error creating order");
    world.last_order = Some(created);
}

#[when(expr = "buyer {int} places a basic order with items:")]
async fn place_basic_order(world: &mut PaymentWorld, buyer_id: i64, step: &Step) {
    let items = items_from_table(step);
    let created = world.api().create_basic_order(buyer(buyer_id), items).await.expect("Error creating order");
    world.last_order = Some(created);
}

#[when(expr = "buyer {int} requests a subscription with phone {string}")]
async fn request_subscription(world: &mut PaymentWorld, buyer_id: i64, phone: String) {
    let invoice =
        world.api().request_subscription_invoice(buyer(buyer_id), &phone).await.expect("Error requesting subscription");
    world.last_subscription = Some(invoice);
}

#[when(expr = "buyer {int} selects the store {string}")]
async fn select_store(world: &mut PaymentWorld, buyer_id: i64, store: String) {
    world.api().select_store(buyer(buyer_id), &store).await.expect("Error selecting store");
}

#[when(expr = "buyer {int} sends a payment receipt")]
async fn send_receipt(world: &mut PaymentWorld, buyer_id: i64) {
    let document = DocumentRef { chat_id: buyer_id, message_id: 100, sender_username: Some("farmer".into()) };
    let outcome =
        world.api().confirm_payment_document(buyer(buyer_id), document).await.expect("Error handling the receipt");
    world.last_receipt = Some(outcome);
}

#[when(expr = "the administrator presses {word} on the last order of buyer {int}")]
async fn decide_on_order(world: &mut PaymentWorld, verb: String, buyer_id: i64) {
    let token = format!("{verb}:{}:{buyer_id}", world.last_order_id());
    let outcome = world.api().handle_admin_decision("callback", &token).await.expect("Error handling decision");
    world.decisions.push(outcome);
}

#[when(expr = "the administrator presses {word} on the last subscription of buyer {int}")]
async fn decide_on_subscription(world: &mut PaymentWorld, verb: String, buyer_id: i64) {
    let token = format!("{verb}:{}:{buyer_id}", world.last_subscription_id());
    let outcome = world.api().handle_admin_decision("callback", &token).await.expect("Error handling decision");
    world.decisions.push(outcome);
}

#[given(expr = "buyer {int} has an active subscription that lapsed yesterday")]
async fn lapsed_subscription(world: &mut PaymentWorld, buyer_id: i64) {
    let yesterday = Utc::now() - Duration::days(1);
    let pool = world.api().db().pool();
    sqlx::query("INSERT INTO subscriptions (user_id, phone, status, amount, valid_until) VALUES ($1, '+7', 'active', 3000, $2)")
        .bind(buyer_id)
        .bind(yesterday)
        .execute(pool)
        .await
        .expect("Error seeding subscription");
    sqlx::query("INSERT INTO users (user_id, sub_status, sub_until) VALUES ($1, 'active', $2)")
        .bind(buyer_id)
        .bind(yesterday)
        .execute(pool)
        .await
        .expect("Error seeding user");
}

#[when("the expiry sweep runs")]
async fn run_sweep(world: &mut PaymentWorld) {
    let result = world.api().sweep_expired_subscriptions().await;
    world.last_sweep = Some(result);
}

#[then(expr = "the goods total is {int} tenge")]
async fn check_goods_total(world: &mut PaymentWorld, total: i64) {
    let order = world.last_order.expect("No order has been placed");
    assert_eq!(order.goods_total, Tenge::from(total), "Goods total is incorrect");
}

#[then(expr = "the order total is {int} tenge")]
async fn check_order_total(world: &mut PaymentWorld, total: i64) {
    let order = world.last_order.expect("No order has been placed");
    assert_eq!(order.total, Tenge::from(total), "Order total is incorrect");
    let saved = world.api().db().fetch_order(order.order_id).await.expect("Error fetching order").expect("No order");
    assert_eq!(saved.total_amount, Tenge::from(total), "Stored total is incorrect");
}

#[then(expr = "the order has {int} line item(s)")]
async fn check_line_items(world: &mut PaymentWorld, count: usize) {
    let items = world.api().db().fetch_order_items(world.last_order_id()).await.expect("Error fetching items");
    assert_eq!(items.len(), count, "Unexpected number of line items");
}

#[then(expr = "the order status is {word}")]
async fn check_order_status(world: &mut PaymentWorld, status: String) {
    let order =
        world.api().db().fetch_order(world.last_order_id()).await.expect("Error fetching order").expect("No order");
    assert_eq!(order.status.to_string(), status, "Order status is incorrect");
}

#[then(expr = "the order was placed at store {string}")]
async fn check_order_store(world: &mut PaymentWorld, code: String) {
    let order =
        world.api().db().fetch_order(world.last_order_id()).await.expect("Error fetching order").expect("No order");
    assert_eq!(order.store_code, Some(code));
}

#[then(expr = "the subscription status is {word}")]
async fn check_subscription_status(world: &mut PaymentWorld, status: String) {
    let id = world.last_subscription_id();
    let sub = world.api().db().fetch_subscription(id).await.expect("Error fetching subscription").expect("None");
    assert_eq!(sub.status.to_string(), status, "Subscription status is incorrect");
}

#[then(expr = "the subscription of buyer {int} is {word}")]
async fn check_user_status(world: &mut PaymentWorld, buyer_id: i64, status: String) {
    let user = world.api().db().fetch_user(buyer(buyer_id)).await.expect("Error fetching user").expect("No user");
    assert_eq!(user.sub_status.to_string(), status, "User subscription status is incorrect");
    let reported = world.api().subscription_status(buyer(buyer_id)).await.expect("Error fetching status");
    assert_eq!(reported.active, status == "active");
}

#[then(expr = "buyer {int} is awaiting payment")]
async fn check_awaiting_payment(world: &mut PaymentWorld, buyer_id: i64) {
    let session = world.api().sessions().fetch_session(buyer(buyer_id)).await.expect("Error fetching session");
    assert!(session.is_some_and(|s| s.is_awaiting_payment()), "Buyer should be waiting for a payment");
}

#[then(expr = "buyer {int} is not awaiting payment")]
async fn check_not_awaiting_payment(world: &mut PaymentWorld, buyer_id: i64) {
    let session = world.api().sessions().fetch_session(buyer(buyer_id)).await.expect("Error fetching session");
    assert!(!session.is_some_and(|s| s.is_awaiting_payment()), "Buyer should not be waiting for a payment");
}

#[then("the receipt was forwarded for the subscription")]
async fn check_receipt_subscription(world: &mut PaymentWorld) {
    let expected = ReceiptOutcome::Subscription(world.last_subscription_id());
    assert_eq!(world.last_receipt, Some(expected));
    assert!(!world.notifier().forwards().is_empty());
}

#[then("the receipt was forwarded for the order")]
async fn check_receipt_order(world: &mut PaymentWorld) {
    let expected = ReceiptOutcome::Order(world.last_order_id());
    assert_eq!(world.last_receipt, Some(expected));
    assert!(!world.notifier().forwards().is_empty());
}

#[then("the document was not treated as a receipt")]
async fn check_not_a_receipt(world: &mut PaymentWorld) {
    assert_eq!(world.last_receipt, Some(ReceiptOutcome::NotAwaitingPayment));
}

#[then(expr = "the decision outcomes are {string}")]
async fn check_decisions(world: &mut PaymentWorld, expected: String) {
    let outcomes = world
        .decisions
        .iter()
        .map(|d| match d {
            Some(DecisionOutcome::Applied) => "applied",
            Some(DecisionOutcome::AlreadyHandled) => "already handled",
            Some(DecisionOutcome::NotFound) => "not found",
            None => "ignored",
        })
        .collect::<Vec<_>>()
        .join(", ");
    assert_eq!(outcomes, expected);
}

#[then(expr = "the administrator saw {string}")]
async fn check_acknowledgement(world: &mut PaymentWorld, text: String) {
    let acks = world.notifier().acknowledgements();
    assert_eq!(acks.last(), Some(&text), "Unexpected acknowledgements: {acks:?}");
}

#[then(expr = "buyer {int} was told {string}")]
async fn check_buyer_message(world: &mut PaymentWorld, buyer_id: i64, fragment: String) {
    let messages = world.notifier().messages_for(Recipient::Buyer(buyer(buyer_id)));
    assert!(messages.iter().any(|m| m.contains(&fragment)), "No message contains '{fragment}': {messages:?}");
}

#[then(expr = "buyer {int} received {int} message(s) containing {string}")]
async fn count_buyer_messages(world: &mut PaymentWorld, buyer_id: i64, count: usize, fragment: String) {
    let messages = world.notifier().messages_for(Recipient::Buyer(buyer(buyer_id)));
    let matching = messages.iter().filter(|m| m.contains(&fragment)).count();
    assert_eq!(matching, count, "Unexpected messages: {messages:?}");
}

#[then(expr = "the sweep expired {int} subscription(s) and {int} user(s)")]
async fn check_sweep(world: &mut PaymentWorld, subscriptions: u64, users: u64) {
    let result = world.last_sweep.expect("The sweep has not run");
    assert_eq!(result.expired_subscriptions, subscriptions);
    assert_eq!(result.expired_users, users);
    assert_eq!(result.failed_steps, 0);
}

#[then("the sweep changed nothing")]
async fn check_sweep_noop(world: &mut PaymentWorld) {
    let result = world.last_sweep.expect("The sweep has not run");
    assert_eq!(result.total_changes(), 0, "Sweep was not idempotent: {result:?}");
}
