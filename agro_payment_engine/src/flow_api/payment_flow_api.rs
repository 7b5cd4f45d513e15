use std::fmt::Debug;

use agro_common::Tenge;
use chrono::Utc;
use log::*;

use crate::{
    db::traits::{DecisionOutcome, LedgerStore},
    db_types::{
        BuyerId,
        NewOrder,
        NewOrderItem,
        NewOrderRecord,
        Order,
        OrderId,
        OrderStatusType,
        PaymentMethod,
        Store,
        Subscription,
        SubscriptionId,
        SubscriptionStatusType,
        UserSubscriptionStatus,
    },
    flow_api::{
        decision_token::{one_month_after, DecisionToken, DecisionVerb},
        messages::{self, OrderReceiptDetails, OrderSummary},
        FlowConfig,
        FlowError,
        OrderCreated,
        ReceiptOutcome,
        SubscriptionInvoice,
        SubscriptionStatus,
        SweepResult,
    },
    notify::{ActionButton, DocumentRef, Notifier, OutboundMessage, Recipient},
    session::{BuyerSession, PaymentRequest, SessionStore},
};

const ITEMS_REQUIRED: &str = "telegram_id and items are required";
const BAD_ITEM: &str = "bad item qty/price";
const PHONE_REQUIRED: &str = "telegram_id and phone are required";
const STORE_REQUIRED: &str = "telegram_id and store are required";

/// The payment request a receipt was matched to.
enum ReceiptTarget {
    Subscription(Subscription),
    Order(OrderId),
}

struct PlacedOrder {
    order: Order,
    items: Vec<NewOrderItem>,
    goods_total: Tenge,
    delivery_price: Tenge,
    store: Option<Store>,
}

/// `PaymentFlowApi` drives orders and subscriptions from creation through the administrator's decision.
///
/// * `B` is the ledger, and the only durable source of truth.
/// * `S` holds the per-buyer sessions that route uploaded receipts.
/// * `N` delivers messages to the buyer and the administrator.
pub struct PaymentFlowApi<B, S, N> {
    db: B,
    sessions: S,
    notifier: N,
    config: FlowConfig,
}

impl<B, S, N> Debug for PaymentFlowApi<B, S, N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PaymentFlowApi")
    }
}

impl<B, S, N> PaymentFlowApi<B, S, N> {
    pub fn new(db: B, sessions: S, notifier: N, config: FlowConfig) -> Self {
        Self { db, sessions, notifier, config }
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    pub fn sessions(&self) -> &S {
        &self.sessions
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn config(&self) -> &FlowConfig {
        &self.config
    }

    /// The flat delivery rate.
    pub fn delivery_price(&self) -> Tenge {
        self.config.delivery_price
    }
}

impl<B, S, N> PaymentFlowApi<B, S, N>
where
    B: LedgerStore,
    S: SessionStore,
    N: Notifier,
{
    /// Places an order from the mini-app checkout.
    ///
    /// The order and its items (plus a "Delivery" line if home delivery was chosen) are written in one transaction.
    /// After that, the buyer's session is set to wait for a receipt for this order, the administrator gets the order
    /// details and the buyer gets an itemized receipt with payment instructions. None of those three steps can fail
    /// the order.
    pub async fn create_order(&self, order: NewOrder) -> Result<OrderCreated, FlowError> {
        let buyer_id = order.buyer_id;
        let method = order.payment_method;
        let placed = self.place_order(&order).await?;
        let order_id = placed.order.id;
        let contact = order.delivery.as_ref().map(|d| d.phone.trim().to_string()).unwrap_or_default();
        let session = BuyerSession::awaiting_payment(PaymentRequest::Order(order_id), method, contact);
        self.save_session(buyer_id, &session).await;
        let summary = OrderSummary {
            buyer_id,
            order_id,
            store: placed.store.as_ref(),
            method,
            delivery: order.delivery.as_ref(),
            items: &placed.items,
            total: placed.order.total_amount,
        };
        self.notify(Recipient::Admin, OutboundMessage::text(messages::new_order_for_admin(&summary, true))).await;
        self.notify(Recipient::Buyer(buyer_id), messages::order_receipt(&summary, &self.config)).await;
        debug!("🔄️📦️ Order #{order_id} for {buyer_id} created. Total {}", placed.order.total_amount);
        Ok(OrderCreated {
            order_id,
            goods_total: placed.goods_total,
            delivery_price: placed.delivery_price,
            total: placed.order.total_amount,
        })
    }

    /// Places an order without delivery options, using the default payment method. The buyer's session is not
    /// changed.
    pub async fn create_basic_order(
        &self,
        buyer_id: BuyerId,
        items: Vec<NewOrderItem>,
    ) -> Result<OrderCreated, FlowError> {
        let order = NewOrder::new(buyer_id, items);
        let placed = self.place_order(&order).await?;
        let summary = OrderSummary {
            buyer_id,
            order_id: placed.order.id,
            store: placed.store.as_ref(),
            method: PaymentMethod::default(),
            delivery: None,
            items: &placed.items,
            total: placed.order.total_amount,
        };
        self.notify(Recipient::Admin, OutboundMessage::text(messages::new_order_for_admin(&summary, false))).await;
        self.notify(Recipient::Buyer(buyer_id), messages::order_receipt(&summary, &self.config)).await;
        debug!("🔄️📦️ Basic order #{} for {buyer_id} created", placed.order.id);
        Ok(OrderCreated {
            order_id: placed.order.id,
            goods_total: placed.goods_total,
            delivery_price: placed.delivery_price,
            total: placed.order.total_amount,
        })
    }

    async fn place_order(&self, order: &NewOrder) -> Result<PlacedOrder, FlowError> {
        let goods_total = price_items(&order.items)?;
        let mut items = order.items.clone();
        let delivery_price = if order.delivery.as_ref().is_some_and(|d| d.is_delivery()) {
            let price = self.config.delivery_price;
            items.push(NewOrderItem::new(0, "Delivery", "service", 1.0, price));
            price
        } else {
            Tenge::default()
        };
        let store_code = match self.db.fetch_selected_store_code(order.buyer_id).await {
            Ok(code) => code,
            Err(e) => {
                warn!("🔄️📦️ Could not look up the selected store for {}. {e}", order.buyer_id);
                None
            },
        };
        let store = match &store_code {
            Some(code) => self.db.fetch_store(code).await.unwrap_or_else(|e| {
                warn!("🔄️📦️ Could not fetch store {code}. {e}");
                None
            }),
            None => None,
        };
        let total_amount =
            goods_total.checked_add(delivery_price).ok_or_else(|| FlowError::Validation(BAD_ITEM.to_string()))?;
        let record = NewOrderRecord { buyer_id: order.buyer_id, store_code, total_amount, items };
        let saved = self.db.insert_order(record.clone()).await.map_err(|e| {
            error!("🔄️📦️ Could not save the order for {}. {e}", order.buyer_id);
            FlowError::database(e)
        })?;
        Ok(PlacedOrder { order: saved, items: record.items, goods_total, delivery_price, store })
    }

    /// Records a subscription request and sends the buyer the payment link.
    pub async fn request_subscription_invoice(
        &self,
        buyer_id: BuyerId,
        phone: &str,
    ) -> Result<SubscriptionInvoice, FlowError> {
        let phone = phone.trim();
        if phone.is_empty() {
            return Err(FlowError::Validation(PHONE_REQUIRED.to_string()));
        }
        let fee = self.config.subscription_fee;
        let subscription = self.db.insert_subscription_request(buyer_id, phone, fee).await.map_err(|e| {
            error!("🔄️🎫️ Could not save the subscription request for {buyer_id}. {e}");
            FlowError::database(e)
        })?;
        let session = BuyerSession::awaiting_payment(
            PaymentRequest::Subscription(subscription.id),
            PaymentMethod::KaspiLink,
            phone,
        );
        self.save_session(buyer_id, &session).await;
        let admin_text = messages::subscription_request_for_admin(buyer_id, phone, fee);
        self.notify(Recipient::Admin, OutboundMessage::text(admin_text)).await;
        self.notify(Recipient::Buyer(buyer_id), messages::subscription_invoice(fee, &self.config)).await;
        debug!("🔄️🎫️ Subscription request #{} for {buyer_id} recorded", subscription.id);
        Ok(SubscriptionInvoice { status: "ok".to_string(), subscription_id: subscription.id, amount: fee })
    }

    /// Routes a document the buyer sent as proof of payment.
    ///
    /// Only buyers whose session is waiting for payment are considered. The document goes to the administrator with
    /// approve and reject buttons for the payment request recorded in the session, or, for sessions that carry no
    /// request, for the newest pending subscription or else the newest order.
    ///
    /// A forwarding failure is returned as [`FlowError::Notification`]. The buyer's acknowledgement is best-effort.
    pub async fn confirm_payment_document(
        &self,
        buyer_id: BuyerId,
        document: DocumentRef,
    ) -> Result<ReceiptOutcome, FlowError> {
        let session = self.fetch_session(buyer_id).await;
        let Some(session) = session.filter(BuyerSession::is_awaiting_payment) else {
            trace!("🔄️🧾️ {buyer_id} sent a document but is not waiting for a payment");
            return Ok(ReceiptOutcome::NotAwaitingPayment);
        };
        let username = document.sender_username.as_deref();
        match self.resolve_receipt_target(buyer_id, &session).await? {
            Some(ReceiptTarget::Subscription(sub)) => {
                let caption = messages::subscription_receipt_caption(&sub, buyer_id, username);
                let actions = [
                    ActionButton::new(
                        "✅ Activate subscription",
                        DecisionToken::new(DecisionVerb::SubOk, sub.id.0, buyer_id).to_string(),
                    ),
                    ActionButton::new(
                        "❌ Reject",
                        DecisionToken::new(DecisionVerb::SubReject, sub.id.0, buyer_id).to_string(),
                    ),
                ];
                self.forward_receipt(&document, &caption, actions).await?;
                self.notify(Recipient::Buyer(buyer_id), OutboundMessage::text(messages::SUBSCRIPTION_RECEIPT_FORWARDED))
                    .await;
                info!("🔄️🧾️ Subscription receipt from {buyer_id} forwarded for subscription #{}", sub.id);
                Ok(ReceiptOutcome::Subscription(sub.id))
            },
            Some(ReceiptTarget::Order(order_id)) => {
                let order = self.db.fetch_order(order_id).await.unwrap_or_else(|e| {
                    warn!("🔄️🧾️ Could not fetch order #{order_id}. {e}");
                    None
                });
                let items = self.db.fetch_order_items(order_id).await.unwrap_or_else(|e| {
                    warn!("🔄️🧾️ Could not fetch items for order #{order_id}. {e}");
                    Vec::new()
                });
                let details = OrderReceiptDetails {
                    order_id,
                    buyer_id,
                    username,
                    contact: &session.contact,
                    method: session.payment_method,
                    order: order.as_ref(),
                    items: &items,
                };
                let caption = messages::order_receipt_caption(&details);
                let actions = [
                    ActionButton::new(
                        "✅ Confirm payment",
                        DecisionToken::new(DecisionVerb::PayOk, order_id.0, buyer_id).to_string(),
                    ),
                    ActionButton::new(
                        "❌ Reject",
                        DecisionToken::new(DecisionVerb::PayReject, order_id.0, buyer_id).to_string(),
                    ),
                ];
                self.forward_receipt(&document, &caption, actions).await?;
                self.notify(Recipient::Buyer(buyer_id), OutboundMessage::text(messages::ORDER_RECEIPT_FORWARDED)).await;
                info!("🔄️🧾️ Order receipt from {buyer_id} forwarded for order #{order_id}");
                Ok(ReceiptOutcome::Order(order_id))
            },
            None => {
                debug!("🔄️🧾️ {buyer_id} is waiting for payment, but has no subscription or order to pay for");
                Ok(ReceiptOutcome::NotAwaitingPayment)
            },
        }
    }

    async fn resolve_receipt_target(
        &self,
        buyer_id: BuyerId,
        session: &BuyerSession,
    ) -> Result<Option<ReceiptTarget>, FlowError> {
        match session.active_request {
            Some(PaymentRequest::Order(order_id)) => return Ok(Some(ReceiptTarget::Order(order_id))),
            Some(PaymentRequest::Subscription(id)) => {
                let sub = self.db.fetch_subscription(id).await.map_err(FlowError::database)?;
                match sub {
                    Some(sub) if sub.status == SubscriptionStatusType::Pending && sub.user_id == buyer_id => {
                        return Ok(Some(ReceiptTarget::Subscription(sub)));
                    },
                    _ => debug!("🔄️🧾️ Subscription #{id} is no longer pending. Looking for another payment request"),
                }
            },
            None => {},
        }
        if let Some(sub) = self.db.fetch_latest_pending_subscription(buyer_id).await.map_err(FlowError::database)? {
            return Ok(Some(ReceiptTarget::Subscription(sub)));
        }
        let order = self.db.fetch_latest_order_for_buyer(buyer_id).await.map_err(FlowError::database)?;
        Ok(order.map(|o| ReceiptTarget::Order(o.id)))
    }

    async fn forward_receipt(
        &self,
        document: &DocumentRef,
        caption: &str,
        actions: [ActionButton; 2],
    ) -> Result<(), FlowError> {
        self.notifier.forward_document(document, caption, actions).await.map_err(|e| {
            error!("🔄️🧾️ Could not forward the receipt to the administrator. {e}");
            FlowError::Notification(e.to_string())
        })
    }

    /// Applies the administrator's decision carried in `token`.
    ///
    /// Every transition is check-and-set. A decision that was already applied is acknowledged as such, and the buyer
    /// is not messaged again. Returns `Ok(None)` for a malformed token, which is otherwise ignored.
    pub async fn handle_admin_decision(
        &self,
        callback_id: &str,
        token: &str,
    ) -> Result<Option<DecisionOutcome>, FlowError> {
        let token = match token.parse::<DecisionToken>() {
            Ok(t) => t,
            Err(e) => {
                debug!("🔄️✅️ Ignoring callback {callback_id}. {e}");
                return Ok(None);
            },
        };
        let buyer_id = token.buyer_id;
        let outcome = match token.verb {
            DecisionVerb::PayOk => self.confirm_order_payment(callback_id, OrderId(token.entity_id), buyer_id).await?,
            DecisionVerb::PayReject => {
                self.reject_order_payment(callback_id, OrderId(token.entity_id), buyer_id).await?
            },
            DecisionVerb::SubOk => {
                self.activate_subscription(callback_id, SubscriptionId(token.entity_id), buyer_id).await?
            },
            DecisionVerb::SubReject => {
                self.reject_subscription(callback_id, SubscriptionId(token.entity_id), buyer_id).await?
            },
        };
        info!("🔄️✅️ Decision {token}: {outcome:?}");
        Ok(Some(outcome))
    }

    async fn confirm_order_payment(
        &self,
        callback_id: &str,
        order_id: OrderId,
        token_buyer: BuyerId,
    ) -> Result<DecisionOutcome, FlowError> {
        let outcome = self.db.mark_order_paid(order_id).await.map_err(|e| {
            error!("🔄️✅️ Could not mark order #{order_id} as paid. {e}");
            FlowError::database(e)
        })?;
        match outcome {
            DecisionOutcome::Applied => {
                let buyer_id = self.order_owner(order_id, token_buyer).await;
                self.settle_session(buyer_id, true).await;
                self.acknowledge(callback_id, messages::ACK_ORDER_PAID).await;
                self.notify(Recipient::Buyer(buyer_id), OutboundMessage::text(messages::order_paid(order_id))).await;
            },
            DecisionOutcome::AlreadyHandled => self.acknowledge(callback_id, messages::ACK_ALREADY_HANDLED).await,
            DecisionOutcome::NotFound => self.acknowledge(callback_id, messages::ACK_ORDER_NOT_FOUND).await,
        }
        Ok(outcome)
    }

    /// The order status is not changed. The buyer's session keeps waiting, so a corrected receipt is routed again.
    async fn reject_order_payment(
        &self,
        callback_id: &str,
        order_id: OrderId,
        token_buyer: BuyerId,
    ) -> Result<DecisionOutcome, FlowError> {
        let order = self.db.fetch_order(order_id).await.map_err(FlowError::database)?;
        let (outcome, buyer_id) = match order {
            None => (DecisionOutcome::NotFound, token_buyer),
            Some(o) if o.status == OrderStatusType::Paid => (DecisionOutcome::AlreadyHandled, token_buyer),
            Some(o) => (DecisionOutcome::Applied, row_owner(o.user_id, token_buyer, "Order", order_id.0)),
        };
        match outcome {
            DecisionOutcome::Applied => {
                self.acknowledge(callback_id, messages::ACK_ORDER_REJECTED).await;
                let text = messages::order_payment_rejected(order_id);
                self.notify(Recipient::Buyer(buyer_id), OutboundMessage::text(text)).await;
            },
            DecisionOutcome::AlreadyHandled => self.acknowledge(callback_id, messages::ACK_ALREADY_HANDLED).await,
            DecisionOutcome::NotFound => self.acknowledge(callback_id, messages::ACK_ORDER_NOT_FOUND).await,
        }
        Ok(outcome)
    }

    async fn activate_subscription(
        &self,
        callback_id: &str,
        id: SubscriptionId,
        token_buyer: BuyerId,
    ) -> Result<DecisionOutcome, FlowError> {
        let now = Utc::now();
        let valid_until = one_month_after(now);
        let outcome = self.db.activate_subscription(id, valid_until, now).await.map_err(|e| {
            error!("🔄️✅️ Could not activate subscription #{id}. {e}");
            FlowError::database(e)
        })?;
        match outcome {
            DecisionOutcome::Applied => {
                let buyer_id = self.subscription_owner(id, token_buyer).await;
                self.settle_session(buyer_id, true).await;
                self.acknowledge(callback_id, messages::ACK_SUBSCRIPTION_ACTIVE).await;
                let text = messages::subscription_active(valid_until);
                self.notify(Recipient::Buyer(buyer_id), OutboundMessage::text(text)).await;
            },
            DecisionOutcome::AlreadyHandled => self.acknowledge(callback_id, messages::ACK_ALREADY_HANDLED).await,
            DecisionOutcome::NotFound => self.acknowledge(callback_id, messages::ACK_SUBSCRIPTION_NOT_FOUND).await,
        }
        Ok(outcome)
    }

    /// The user row is not touched, so a concurrent valid subscription stays visible.
    async fn reject_subscription(
        &self,
        callback_id: &str,
        id: SubscriptionId,
        token_buyer: BuyerId,
    ) -> Result<DecisionOutcome, FlowError> {
        let outcome = self.db.reject_subscription(id).await.map_err(|e| {
            error!("🔄️✅️ Could not reject subscription #{id}. {e}");
            FlowError::database(e)
        })?;
        match outcome {
            DecisionOutcome::Applied => {
                let buyer_id = self.subscription_owner(id, token_buyer).await;
                self.acknowledge(callback_id, messages::ACK_SUBSCRIPTION_REJECTED).await;
                let text = messages::subscription_rejected();
                self.notify(Recipient::Buyer(buyer_id), OutboundMessage::text(text)).await;
            },
            DecisionOutcome::AlreadyHandled => self.acknowledge(callback_id, messages::ACK_ALREADY_HANDLED).await,
            DecisionOutcome::NotFound => self.acknowledge(callback_id, messages::ACK_SUBSCRIPTION_NOT_FOUND).await,
        }
        Ok(outcome)
    }

    /// Expires stale subscriptions and user rows, then re-derives every user's subscription status.
    ///
    /// The three steps are independent. A failing step is logged and counted in [`SweepResult::failed_steps`]; it
    /// does not stop the others.
    pub async fn sweep_expired_subscriptions(&self) -> SweepResult {
        let now = Utc::now();
        let mut result = SweepResult::default();
        match self.db.expire_subscriptions(now).await {
            Ok(n) => result.expired_subscriptions = n,
            Err(e) => {
                error!("🔄️🎫️ Could not expire subscriptions. {e}");
                result.failed_steps += 1;
            },
        }
        match self.db.expire_user_subscriptions(now).await {
            Ok(n) => result.expired_users = n,
            Err(e) => {
                error!("🔄️🎫️ Could not expire user subscription statuses. {e}");
                result.failed_steps += 1;
            },
        }
        match self.db.reconcile_subscription_statuses(now).await {
            Ok(n) => result.reconciled_users = n,
            Err(e) => {
                error!("🔄️🎫️ Could not reconcile user subscription statuses. {e}");
                result.failed_steps += 1;
            },
        }
        result
    }

    /// Whether the buyer currently has wholesale access, and which store they picked.
    pub async fn subscription_status(&self, buyer_id: BuyerId) -> Result<SubscriptionStatus, FlowError> {
        let now = Utc::now();
        let user = self.db.fetch_user(buyer_id).await.map_err(FlowError::database)?;
        let mut until = user
            .as_ref()
            .filter(|u| u.sub_status == UserSubscriptionStatus::Active)
            .and_then(|u| u.sub_until)
            .filter(|until| *until > now);
        if until.is_none() {
            until = self.db.fetch_active_subscription_until(buyer_id, now).await.map_err(FlowError::database)?;
        }
        let store_code = user.and_then(|u| u.selected_store).filter(|c| !c.trim().is_empty());
        let store = match &store_code {
            Some(code) => self.db.fetch_store(code).await.map_err(FlowError::database)?,
            None => None,
        };
        Ok(SubscriptionStatus { active: until.is_some(), until: until.map(|u| u.date_naive()), store_code, store })
    }

    /// Saves the store, looked up by code or name, as the buyer's fulfillment location.
    pub async fn select_store(&self, buyer_id: BuyerId, store: &str) -> Result<Store, FlowError> {
        let store = store.trim();
        if store.is_empty() {
            return Err(FlowError::Validation(STORE_REQUIRED.to_string()));
        }
        match self.db.select_store(buyer_id, store).await.map_err(FlowError::database)? {
            Some(s) => Ok(s),
            None => Err(FlowError::StoreNotFound(store.to_string())),
        }
    }

    async fn fetch_session(&self, buyer_id: BuyerId) -> Option<BuyerSession> {
        match self.sessions.fetch_session(buyer_id).await {
            Ok(session) => session,
            Err(e) => {
                warn!("🧠️ Could not read the session for {buyer_id}. {e}");
                None
            },
        }
    }

    async fn save_session(&self, buyer_id: BuyerId, session: &BuyerSession) {
        if let Err(e) = self.sessions.save_session(buyer_id, session).await {
            warn!("🧠️ Could not save the session for {buyer_id}. {e}");
        }
    }

    /// Read-modify-write of the buyer's session after an approval. A missing session starts from the default.
    /// The buyer who owns the order. The ledger row wins over the buyer id carried in the decision token.
    async fn order_owner(&self, order_id: OrderId, token_buyer: BuyerId) -> BuyerId {
        match self.db.fetch_order(order_id).await {
            Ok(Some(order)) => row_owner(order.user_id, token_buyer, "Order", order_id.0),
            Ok(None) => token_buyer,
            Err(e) => {
                warn!("🔄️✅️ Could not fetch order #{order_id} to check its owner. {e}");
                token_buyer
            },
        }
    }

    async fn subscription_owner(&self, id: SubscriptionId, token_buyer: BuyerId) -> BuyerId {
        match self.db.fetch_subscription(id).await {
            Ok(Some(sub)) => row_owner(sub.user_id, token_buyer, "Subscription", id.0),
            Ok(None) => token_buyer,
            Err(e) => {
                warn!("🔄️✅️ Could not fetch subscription #{id} to check its owner. {e}");
                token_buyer
            },
        }
    }

    async fn settle_session(&self, buyer_id: BuyerId, paid: bool) {
        let mut session = self.fetch_session(buyer_id).await.unwrap_or_default();
        session.settle(paid);
        self.save_session(buyer_id, &session).await;
    }

    async fn notify(&self, recipient: Recipient, message: OutboundMessage) {
        if let Err(e) = self.notifier.send(recipient, message).await {
            warn!("📨️ Could not deliver a message to {recipient:?}. {e}");
        }
    }

    async fn acknowledge(&self, callback_id: &str, text: &str) {
        if let Err(e) = self.notifier.acknowledge(callback_id, text).await {
            warn!("📨️ Could not answer callback {callback_id}. {e}");
        }
    }
}

fn row_owner(owner: BuyerId, token_buyer: BuyerId, kind: &str, id: i64) -> BuyerId {
    if owner != token_buyer {
        warn!("🔄️✅️ {kind} #{id} belongs to {owner}, but the decision token names {token_buyer}. Using the owner.");
    }
    owner
}

/// Validates the items and returns the goods total, the sum of the truncated line amounts.
fn price_items(items: &[NewOrderItem]) -> Result<Tenge, FlowError> {
    if items.is_empty() {
        return Err(FlowError::Validation(ITEMS_REQUIRED.to_string()));
    }
    let bad_item = || FlowError::Validation(BAD_ITEM.to_string());
    items.iter().try_fold(Tenge::default(), |total, item| {
        if !item.qty.is_finite() || item.qty <= 0.0 || item.price.is_negative() {
            return Err(bad_item());
        }
        let amount = item.amount().ok_or_else(bad_item)?;
        total.checked_add(amount).ok_or_else(bad_item)
    })
}
