use std::fmt::Write;

use agro_common::Tenge;
use chrono::{DateTime, Utc};

use crate::{
    db_types::{BuyerId, Delivery, NewOrderItem, Order, OrderId, OrderItem, PaymentMethod, Store, Subscription},
    flow_api::FlowConfig,
    notify::{LinkButton, OutboundMessage},
};

pub const CLUB_NAME: &str = "AGRO Wholesale Price Club";

pub struct OrderSummary<'a> {
    pub buyer_id: BuyerId,
    pub order_id: OrderId,
    pub store: Option<&'a Store>,
    pub method: PaymentMethod,
    pub delivery: Option<&'a Delivery>,
    pub items: &'a [NewOrderItem],
    pub total: Tenge,
}

fn write_store(text: &mut String, store: Option<&Store>) {
    if let Some(store) = store {
        let _ = writeln!(text, "🏪 Store: {}", store.name);
        if let Some(address) = store.address.as_deref().filter(|a| !a.trim().is_empty()) {
            let _ = writeln!(text, "📍 Store address: {address}");
        }
    }
}

pub fn new_order_for_admin(summary: &OrderSummary<'_>, confirmed: bool) -> String {
    let mut text = String::new();
    if confirmed {
        let _ = writeln!(text, "🧾 New order #{} (confirmed)\n", summary.order_id);
    } else {
        let _ = writeln!(text, "🧾 New order #{}\n", summary.order_id);
    }
    let _ = writeln!(text, "👤 Telegram ID: {}", summary.buyer_id);
    write_store(&mut text, summary.store);
    if confirmed {
        let _ = writeln!(text, "💳 Payment method: {}", summary.method.label());
        match summary.delivery {
            Some(d) if d.is_delivery() => {
                let _ = writeln!(text, "🚚 Home delivery");
                if !d.address.trim().is_empty() {
                    let _ = writeln!(text, "📬 Customer address: {}", d.address);
                }
            },
            _ => {
                let _ = writeln!(text, "🏃 Pickup");
            },
        }
        if let Some(phone) = summary.delivery.map(|d| d.phone.trim()).filter(|p| !p.is_empty()) {
            let _ = writeln!(text, "📞 Customer phone: {phone}");
        }
    }
    let _ = writeln!(text, "\n🛒 Items:");
    for item in summary.items {
        let _ = writeln!(text, "• {} — {:.2} ({}) × {}", item.name, item.qty, item.unit, item.price);
    }
    let _ = write!(text, "💰 Total: {}", summary.total);
    text
}

/// The buyer's itemized receipt, followed by the instructions for the chosen payment method.
pub fn order_receipt(summary: &OrderSummary<'_>, config: &FlowConfig) -> OutboundMessage {
    let mut text = String::new();
    let _ = writeln!(text, "✅ Order #{} accepted!\n", summary.order_id);
    write_store(&mut text, summary.store);
    let _ = writeln!(text, "💳 Payment method: {}\n", summary.method.label());
    let _ = writeln!(text, "🛒 Items:");
    let mut total = Tenge::default();
    for item in summary.items {
        let amount = item.amount().unwrap_or_default();
        total = total.checked_add(amount).unwrap_or(total);
        let _ = writeln!(text, "• {} — {:.2} {} × {} = {amount}", item.name, item.qty, item.unit, item.price);
    }
    if total.value() == 0 {
        total = summary.total;
    }
    let _ = writeln!(text, "\n💰 Amount due: {total}");
    match summary.method {
        PaymentMethod::KaspiLink => {
            OutboundMessage::text(text).with_button(LinkButton::url("💳 Pay with Kaspi", &config.kaspi_pay_url))
        },
        PaymentMethod::KaspiTransfer => {
            let _ = writeln!(text, "\n📌 Kaspi Gold transfer details:");
            let _ = writeln!(text, "Card number: {}", config.card_number);
            let _ = writeln!(text, "Recipient: {}\n", config.card_holder);
            let _ = writeln!(text, "After paying, please send the PDF or a screenshot of the receipt here so we can confirm it ✅.");
            OutboundMessage::text(text)
        },
        PaymentMethod::Cash => {
            let _ = writeln!(text, "\n💵 Pay in cash when you receive the order.");
            OutboundMessage::text(text)
        },
    }
}

pub fn subscription_request_for_admin(buyer_id: BuyerId, phone: &str, fee: Tenge) -> String {
    format!(
        "🧾 Subscription request\n\n👤 Telegram ID: {buyer_id}\n📞 Phone: {phone}\nAmount: {fee}\n\nThe customer has \
         received the Kaspi Pay link and should send a receipt. Confirm the subscription once it arrives."
    )
}

pub fn subscription_invoice(fee: Tenge, config: &FlowConfig) -> OutboundMessage {
    let text = format!(
        "💳 {CLUB_NAME} subscription: {fee} per month.\n\nFollow the Kaspi Pay link to pay for the subscription, then \
         send the receipt here (PDF or screenshot) so the administrator can confirm the payment.\n"
    );
    OutboundMessage::text(text).with_button(LinkButton::url("💳 Pay for subscription", &config.kaspi_pay_url))
}

fn sender(username: Option<&str>) -> String {
    username.map(|u| format!("@{u}")).unwrap_or_else(|| "(no username)".to_string())
}

pub fn subscription_receipt_caption(sub: &Subscription, buyer_id: BuyerId, username: Option<&str>) -> String {
    format!(
        "💳 SUBSCRIPTION payment confirmation\n\n👤 Customer: {} (ID: {buyer_id})\n📞 Phone (from subscription): {}\n💰 \
         Amount: {}\n📌 Status: {}\n\nCheck the receipt, then activate or reject the subscription.\n",
        sender(username),
        sub.phone,
        sub.amount,
        sub.status
    )
}

pub struct OrderReceiptDetails<'a> {
    pub order_id: OrderId,
    pub buyer_id: BuyerId,
    pub username: Option<&'a str>,
    pub contact: &'a str,
    pub method: PaymentMethod,
    pub order: Option<&'a Order>,
    pub items: &'a [OrderItem],
}

pub fn order_receipt_caption(details: &OrderReceiptDetails<'_>) -> String {
    let mut text = String::new();
    let _ = writeln!(text, "💳 Payment confirmation for order #{}\n", details.order_id);
    let _ = writeln!(text, "👤 Customer: {} (ID: {})", sender(details.username), details.buyer_id);
    let _ = writeln!(text, "📞 Phone: {}", details.contact);
    match details.order {
        Some(order) => {
            let _ = writeln!(text, "💰 Order total: {}", order.total_amount);
        },
        None => {
            let _ = writeln!(text, "💰 Order total: unknown (order not found)");
        },
    }
    let _ = writeln!(text, "💳 Payment method: {}\n", details.method.label());
    let _ = writeln!(text, "Check the receipt, then confirm or reject the payment.");
    if !details.items.is_empty() {
        let _ = writeln!(text, "\n🛒 Order items:");
        for item in details.items {
            let _ = writeln!(
                text,
                "• {} — {:.2} {} × {} = {}",
                item.name, item.qty, item.unit, item.price, item.amount
            );
        }
        let sum = details.items.iter().map(|i| i.amount).sum::<Tenge>();
        let _ = writeln!(text, "💰 Sum of items: {sum}");
    }
    text
}

pub const SUBSCRIPTION_RECEIPT_FORWARDED: &str =
    "✅ Your subscription receipt was sent to the administrator. We will check the payment and let you know.";
pub const ORDER_RECEIPT_FORWARDED: &str =
    "✅ Your receipt was sent to the administrator. We will check the payment and let you know.";

pub const ACK_ORDER_PAID: &str = "Order payment confirmed ✅";
pub const ACK_ORDER_REJECTED: &str = "Order payment rejected ❌";
pub const ACK_SUBSCRIPTION_ACTIVE: &str = "Subscription activated ✅";
pub const ACK_SUBSCRIPTION_REJECTED: &str = "Subscription payment rejected ❌";
pub const ACK_ALREADY_HANDLED: &str = "Already handled";
pub const ACK_ORDER_NOT_FOUND: &str = "Order not found";
pub const ACK_SUBSCRIPTION_NOT_FOUND: &str = "Subscription not found";

pub fn order_paid(order_id: OrderId) -> String {
    format!("✅ Your payment for order #{order_id} is confirmed! Thank you for your order.")
}

pub fn order_payment_rejected(order_id: OrderId) -> String {
    format!(
        "❌ The payment for order #{order_id} did not pass review.\nPlease contact the administrator or send a \
         correct receipt again."
    )
}

pub fn subscription_active(valid_until: DateTime<Utc>) -> String {
    format!(
        "✅ Your {CLUB_NAME} subscription is active!\nWholesale prices are available until {}.",
        valid_until.format("%Y-%m-%d")
    )
}

pub fn subscription_rejected() -> String {
    "❌ The subscription payment did not pass review.\nPlease contact the administrator or send a correct receipt \
     again."
        .to_string()
}
