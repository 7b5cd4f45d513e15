use std::{fmt::Display, str::FromStr};

pub use agro_common::Tenge;
use chrono::{DateTime, Utc};
use log::error;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("Conversion error: {0}")]
pub struct ConversionError(String);

//--------------------------------------       BuyerId        ---------------------------------------------------------
/// The buyer's stable external identity. For Telegram users this is the user id, which is also the id of their
/// private chat with the bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct BuyerId(i64);

impl BuyerId {
    pub fn new(id: i64) -> Result<Self, ConversionError> {
        if id > 0 {
            Ok(Self(id))
        } else {
            Err(ConversionError(format!("Buyer id must be positive, got {id}")))
        }
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl FromStr for BuyerId {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let id = s.parse::<i64>().map_err(|e| ConversionError(format!("Invalid buyer id '{s}': {e}")))?;
        Self::new(id)
    }
}

impl Display for BuyerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

//--------------------------------------   OrderId / SubscriptionId  --------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct OrderId(pub i64);

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct SubscriptionId(pub i64);

impl Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

//--------------------------------------   OrderStatusType     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatusType {
    /// Created, awaiting payment review.
    New,
    Checking,
    Invoiced,
    /// The administrator has confirmed payment.
    Paid,
    Preparing,
    Done,
    Cancelled,
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OrderStatusType::New => "new",
            OrderStatusType::Checking => "checking",
            OrderStatusType::Invoiced => "invoiced",
            OrderStatusType::Paid => "paid",
            OrderStatusType::Preparing => "preparing",
            OrderStatusType::Done => "done",
            OrderStatusType::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

impl FromStr for OrderStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(Self::New),
            "checking" => Ok(Self::Checking),
            "invoiced" => Ok(Self::Invoiced),
            "paid" => Ok(Self::Paid),
            "preparing" => Ok(Self::Preparing),
            "done" => Ok(Self::Done),
            "cancelled" => Ok(Self::Cancelled),
            s => Err(ConversionError(format!("Invalid order status: {s}"))),
        }
    }
}

impl From<String> for OrderStatusType {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid order status: {value}. But this conversion cannot fail. Defaulting to New");
            OrderStatusType::New
        })
    }
}

//--------------------------------------   SubscriptionStatusType   ----------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatusType {
    Pending,
    Active,
    Rejected,
    Expired,
}

impl Display for SubscriptionStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SubscriptionStatusType::Pending => "pending",
            SubscriptionStatusType::Active => "active",
            SubscriptionStatusType::Rejected => "rejected",
            SubscriptionStatusType::Expired => "expired",
        };
        f.write_str(s)
    }
}

impl FromStr for SubscriptionStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "active" => Ok(Self::Active),
            "rejected" => Ok(Self::Rejected),
            "expired" => Ok(Self::Expired),
            s => Err(ConversionError(format!("Invalid subscription status: {s}"))),
        }
    }
}

//--------------------------------------   UserSubscriptionStatus   ----------------------------------------------------
/// The denormalized subscription state kept on the user row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserSubscriptionStatus {
    #[default]
    Inactive,
    Pending,
    Active,
    Expired,
}

impl Display for UserSubscriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            UserSubscriptionStatus::Inactive => "inactive",
            UserSubscriptionStatus::Pending => "pending",
            UserSubscriptionStatus::Active => "active",
            UserSubscriptionStatus::Expired => "expired",
        };
        f.write_str(s)
    }
}

//--------------------------------------     PaymentMethod     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Pay through a Kaspi Pay invoice link.
    #[default]
    KaspiLink,
    /// Direct transfer to the Kaspi Gold card.
    KaspiTransfer,
    /// Cash on receipt of the goods.
    Cash,
}

impl PaymentMethod {
    /// A human-friendly label used in chat messages
    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::KaspiLink => "Kaspi Pay (link)",
            PaymentMethod::KaspiTransfer => "Kaspi Gold (transfer)",
            PaymentMethod::Cash => "Cash",
        }
    }

    /// Resolves an optional client selection. Blank input selects the default method.
    pub fn from_selection(selection: Option<&str>) -> Result<Self, ConversionError> {
        match selection.map(str::trim) {
            None | Some("") => Ok(Self::default()),
            Some(s) => s.parse(),
        }
    }
}

impl Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PaymentMethod::KaspiLink => "kaspi_link",
            PaymentMethod::KaspiTransfer => "kaspi_transfer",
            PaymentMethod::Cash => "cash",
        };
        f.write_str(s)
    }
}

impl FromStr for PaymentMethod {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "kaspi_link" => Ok(Self::KaspiLink),
            "kaspi_transfer" => Ok(Self::KaspiTransfer),
            "cash" => Ok(Self::Cash),
            _ => Err(ConversionError(format!("Unknown payment method: {s}"))),
        }
    }
}

//--------------------------------------       Delivery        ---------------------------------------------------------
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeliveryKind {
    Delivery,
    #[default]
    Pickup,
}

impl FromStr for DeliveryKind {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("delivery") {
            Ok(Self::Delivery)
        } else {
            Ok(Self::Pickup)
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Delivery {
    pub kind: DeliveryKind,
    pub address: String,
    pub phone: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

impl Delivery {
    pub fn is_delivery(&self) -> bool {
        self.kind == DeliveryKind::Delivery
    }
}

//--------------------------------------       NewOrder        ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOrderItem {
    #[serde(default)]
    pub product_id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub unit: String,
    pub qty: f64,
    pub price: Tenge,
}

impl NewOrderItem {
    pub fn new<S: Into<String>>(product_id: i64, name: S, unit: S, qty: f64, price: Tenge) -> Self {
        Self { product_id, name: name.into(), unit: unit.into(), qty, price }
    }

    /// `qty × price`, truncated to whole currency units. `None` if the amount is out of range.
    pub fn amount(&self) -> Option<Tenge> {
        Tenge::for_quantity(self.qty, self.price)
    }
}

/// An order as submitted by the buyer's client, before validation and pricing.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub buyer_id: BuyerId,
    pub items: Vec<NewOrderItem>,
    pub delivery: Option<Delivery>,
    pub payment_method: PaymentMethod,
}

impl NewOrder {
    pub fn new(buyer_id: BuyerId, items: Vec<NewOrderItem>) -> Self {
        Self { buyer_id, items, delivery: None, payment_method: PaymentMethod::default() }
    }

    pub fn with_delivery(mut self, delivery: Delivery) -> Self {
        self.delivery = Some(delivery);
        self
    }

    pub fn with_payment_method(mut self, method: PaymentMethod) -> Self {
        self.payment_method = method;
        self
    }
}

/// A priced order, ready to be written to the ledger. Item amounts and the total are fixed at this point.
#[derive(Debug, Clone)]
pub struct NewOrderRecord {
    pub buyer_id: BuyerId,
    pub store_code: Option<String>,
    pub total_amount: Tenge,
    pub items: Vec<NewOrderItem>,
}

//--------------------------------------        Order          ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: BuyerId,
    pub store_code: Option<String>,
    pub total_amount: Tenge,
    pub status: OrderStatusType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: OrderId,
    pub product_id: i64,
    pub name: String,
    pub unit: String,
    pub qty: f64,
    pub price: Tenge,
    pub amount: Tenge,
}

//--------------------------------------     Subscription      ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub user_id: BuyerId,
    pub phone: String,
    pub status: SubscriptionStatusType,
    pub amount: Tenge,
    pub valid_until: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

//--------------------------------------      UserProfile      ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserProfile {
    pub id: i64,
    pub user_id: BuyerId,
    pub nickname: String,
    pub phone: Option<String>,
    pub sub_status: UserSubscriptionStatus,
    pub sub_until: Option<DateTime<Utc>>,
    pub selected_store: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------         Store         ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Store {
    pub code: String,
    pub name: String,
    pub address: Option<String>,
}
