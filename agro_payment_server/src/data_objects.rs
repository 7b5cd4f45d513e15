use agro_payment_engine::{
    db_types::{BuyerId, Delivery, DeliveryKind, NewOrder, NewOrderItem, OrderId, PaymentMethod, Tenge},
    flow_api::{OrderCreated, SubscriptionStatus},
};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::errors::ServerError;

pub const ITEMS_REQUIRED: &str = "telegram_id and items are required";
pub const PHONE_REQUIRED: &str = "telegram_id and phone are required";
pub const STORE_REQUIRED: &str = "telegram_id and store are required";
pub const TELEGRAM_ID_REQUIRED: &str = "telegram_id is required";

/// The mini-app sends `telegram_id` either as a JSON number or as a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TelegramId {
    Number(i64),
    Text(String),
}

impl TelegramId {
    pub fn buyer_id(&self) -> Option<BuyerId> {
        match self {
            TelegramId::Number(n) => BuyerId::new(*n).ok(),
            TelegramId::Text(s) => s.parse().ok(),
        }
    }
}

fn buyer_id_or(id: Option<&TelegramId>, reason: &str) -> Result<BuyerId, ServerError> {
    id.and_then(TelegramId::buyer_id).ok_or_else(|| {
        debug!("💻️ Rejecting request with telegram_id {id:?}");
        ServerError::BadRequest(reason.to_string())
    })
}

fn required_text(value: Option<&str>, reason: &str) -> Result<String, ServerError> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .ok_or_else(|| ServerError::BadRequest(reason.to_string()))
}

//----------------------------------------------   Orders  ----------------------------------------------------
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeliveryRequest {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

impl From<DeliveryRequest> for Delivery {
    fn from(d: DeliveryRequest) -> Self {
        let kind = d.kind.parse::<DeliveryKind>().unwrap_or_default();
        Delivery { kind, address: d.address.trim().to_string(), phone: d.phone.trim().to_string(), lat: d.lat, lng: d.lng }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfirmOrderRequest {
    pub telegram_id: Option<TelegramId>,
    #[serde(default)]
    pub items: Vec<NewOrderItem>,
    pub delivery: Option<DeliveryRequest>,
    pub payment_method: Option<String>,
}

impl ConfirmOrderRequest {
    pub fn into_new_order(self) -> Result<NewOrder, ServerError> {
        let buyer_id = buyer_id_or(self.telegram_id.as_ref(), ITEMS_REQUIRED)?;
        if self.items.is_empty() {
            return Err(ServerError::BadRequest(ITEMS_REQUIRED.to_string()));
        }
        let method = PaymentMethod::from_selection(self.payment_method.as_deref())
            .map_err(|_| ServerError::BadRequest("unknown payment_method".to_string()))?;
        let mut order = NewOrder::new(buyer_id, self.items).with_payment_method(method);
        if let Some(delivery) = self.delivery {
            order = order.with_delivery(delivery.into());
        }
        Ok(order)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateOrderRequest {
    pub telegram_id: Option<TelegramId>,
    #[serde(default)]
    pub items: Vec<NewOrderItem>,
}

impl CreateOrderRequest {
    pub fn buyer_id(&self) -> Result<BuyerId, ServerError> {
        if self.items.is_empty() {
            return Err(ServerError::BadRequest(ITEMS_REQUIRED.to_string()));
        }
        buyer_id_or(self.telegram_id.as_ref(), ITEMS_REQUIRED)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderConfirmedResponse {
    pub status: &'static str,
    pub order_id: OrderId,
    pub goods_total: Tenge,
    pub delivery_price: Tenge,
    pub total: Tenge,
}

impl From<OrderCreated> for OrderConfirmedResponse {
    fn from(o: OrderCreated) -> Self {
        Self {
            status: "ok",
            order_id: o.order_id,
            goods_total: o.goods_total,
            delivery_price: o.delivery_price,
            total: o.total,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderCreatedResponse {
    pub status: &'static str,
    pub order_id: OrderId,
    pub total: Tenge,
}

impl From<OrderCreated> for OrderCreatedResponse {
    fn from(o: OrderCreated) -> Self {
        Self { status: "ok", order_id: o.order_id, total: o.total }
    }
}

//----------------------------------------------   Subscriptions  ---------------------------------------------
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InvoiceRequest {
    pub telegram_id: Option<TelegramId>,
    pub phone: Option<String>,
}

impl InvoiceRequest {
    pub fn validate(&self) -> Result<(BuyerId, String), ServerError> {
        let buyer_id = buyer_id_or(self.telegram_id.as_ref(), PHONE_REQUIRED)?;
        let phone = required_text(self.phone.as_deref(), PHONE_REQUIRED)?;
        Ok((buyer_id, phone))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubscriptionStatusQuery {
    pub telegram_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionStatusResponse {
    pub active: bool,
    /// `YYYY-MM-DD`, empty when there is no active subscription.
    pub until: String,
    pub store_code: String,
    pub store_name: String,
    pub store_address: String,
}

impl From<SubscriptionStatus> for SubscriptionStatusResponse {
    fn from(s: SubscriptionStatus) -> Self {
        let until = s.until_text();
        let (store_name, store_address) = match s.store {
            Some(store) => (store.name, store.address.unwrap_or_default()),
            None => (String::new(), String::new()),
        };
        Self { active: s.active, until, store_code: s.store_code.unwrap_or_default(), store_name, store_address }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SetStoreRequest {
    pub telegram_id: Option<TelegramId>,
    pub store: Option<String>,
}

impl SetStoreRequest {
    pub fn validate(&self) -> Result<(BuyerId, String), ServerError> {
        let buyer_id = buyer_id_or(self.telegram_id.as_ref(), STORE_REQUIRED)?;
        let store = required_text(self.store.as_deref(), STORE_REQUIRED)?;
        Ok((buyer_id, store))
    }
}

//----------------------------------------------   Misc  ------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}

impl StatusResponse {
    pub fn ok() -> Self {
        Self { status: "ok".to_string() }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DeliveryPriceResponse {
    pub price: Tenge,
    pub currency: &'static str,
}
