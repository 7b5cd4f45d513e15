//! Request handler definitions
//!
//! Define each route and its handler here. Every handler is generic over the ledger, session and notifier backends,
//! so that the endpoint tests can run them against mocks. Handlers that are more than a line or two of glue belong in
//! the engine, not here.
//!
//! Since each worker thread processes its requests sequentially, handlers must never block the current thread. All
//! I/O goes through async calls into the workflow engine.
use actix_web::{get, web, HttpRequest, HttpResponse, Responder};
use agro_common::TENGE_CURRENCY_CODE;
use agro_payment_engine::{db_types::BuyerId, notify::Notifier, session::SessionStore, LedgerStore, PaymentFlowApi};
use log::*;

use crate::{
    config::BotOptions,
    data_objects::{
        ConfirmOrderRequest,
        CreateOrderRequest,
        DeliveryPriceResponse,
        InvoiceRequest,
        OrderConfirmedResponse,
        OrderCreatedResponse,
        SetStoreRequest,
        StatusResponse,
        SubscriptionStatusQuery,
        SubscriptionStatusResponse,
        TELEGRAM_ID_REQUIRED,
    },
    errors::ServerError,
    telegram::{dispatch_update, types::Update},
};

pub const TELEGRAM_ID_HEADER: &str = "X-Telegram-Id";
pub const WEBHOOK_SECRET_HEADER: &str = "X-Telegram-Bot-Api-Secret-Token";

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

/// Registers the health check, the mini-app API under `/api` and the Telegram webhook.
pub fn configure_routes<B, S, N>(cfg: &mut web::ServiceConfig)
where
    B: LedgerStore + 'static,
    S: SessionStore + 'static,
    N: Notifier + 'static,
{
    cfg.service(health).service(TelegramWebhookRoute::<B, S, N>::new()).service(
        web::scope("/api")
            .service(ConfirmOrderRoute::<B, S, N>::new())
            .service(CreateOrderRoute::<B, S, N>::new())
            .service(RequestInvoiceRoute::<B, S, N>::new())
            .service(SubscriptionStatusRoute::<B, S, N>::new())
            .service(SetStoreRoute::<B, S, N>::new())
            .service(DeliveryPriceRoute::<B, S, N>::new()),
    );
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Orders  ----------------------------------------------------
route!(confirm_order => Post "/orders/confirm" impl LedgerStore, SessionStore, Notifier);
/// Checkout from the mini-app cart, with optional delivery details and a payment method.
///
/// The buyer receives an itemized receipt with payment instructions, and the administrator receives the order details.
pub async fn confirm_order<B, S, N>(
    api: web::Data<PaymentFlowApi<B, S, N>>,
    body: web::Json<ConfirmOrderRequest>,
) -> Result<HttpResponse, ServerError>
where
    B: LedgerStore,
    S: SessionStore,
    N: Notifier,
{
    trace!("💻️ Received order confirmation request");
    let order = body.into_inner().into_new_order()?;
    let buyer_id = order.buyer_id;
    let created = api.create_order(order).await?;
    info!("💻️ Order #{} placed by {buyer_id} for {}", created.order_id, created.total);
    Ok(HttpResponse::Ok().json(OrderConfirmedResponse::from(created)))
}

route!(create_order => Post "/orders/create" impl LedgerStore, SessionStore, Notifier);
/// The older checkout endpoint. It has no delivery options and always uses the default payment method.
pub async fn create_order<B, S, N>(
    api: web::Data<PaymentFlowApi<B, S, N>>,
    body: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, ServerError>
where
    B: LedgerStore,
    S: SessionStore,
    N: Notifier,
{
    trace!("💻️ Received basic order request");
    let request = body.into_inner();
    let buyer_id = request.buyer_id()?;
    let created = api.create_basic_order(buyer_id, request.items).await?;
    info!("💻️ Basic order #{} placed by {buyer_id}", created.order_id);
    Ok(HttpResponse::Ok().json(OrderCreatedResponse::from(created)))
}

//----------------------------------------------   Subscriptions  ---------------------------------------------
route!(request_invoice => Post "/subscribe/request-invoice" impl LedgerStore, SessionStore, Notifier);
pub async fn request_invoice<B, S, N>(
    api: web::Data<PaymentFlowApi<B, S, N>>,
    body: web::Json<InvoiceRequest>,
) -> Result<HttpResponse, ServerError>
where
    B: LedgerStore,
    S: SessionStore,
    N: Notifier,
{
    trace!("💻️ Received subscription invoice request");
    let (buyer_id, phone) = body.validate()?;
    let invoice = api.request_subscription_invoice(buyer_id, &phone).await?;
    info!("💻️ Subscription request #{} recorded for {buyer_id}", invoice.subscription_id);
    Ok(HttpResponse::Ok().json(StatusResponse::ok()))
}

route!(subscription_status => Get "/user/subscription-status" impl LedgerStore, SessionStore, Notifier);
/// The buyer is identified by the `telegram_id` query parameter or, failing that, the `X-Telegram-Id` header.
pub async fn subscription_status<B, S, N>(
    req: HttpRequest,
    api: web::Data<PaymentFlowApi<B, S, N>>,
    query: web::Query<SubscriptionStatusQuery>,
) -> Result<HttpResponse, ServerError>
where
    B: LedgerStore,
    S: SessionStore,
    N: Notifier,
{
    let from_header = || req.headers().get(TELEGRAM_ID_HEADER).and_then(|v| v.to_str().ok()).map(String::from);
    let raw = query.into_inner().telegram_id.filter(|s| !s.trim().is_empty()).or_else(from_header);
    let buyer_id = raw
        .as_deref()
        .and_then(|s| s.parse::<BuyerId>().ok())
        .ok_or_else(|| ServerError::BadRequest(TELEGRAM_ID_REQUIRED.to_string()))?;
    trace!("💻️ Received subscription status request for {buyer_id}");
    let status = api.subscription_status(buyer_id).await?;
    Ok(HttpResponse::Ok().json(SubscriptionStatusResponse::from(status)))
}

route!(set_store => Post "/user/set-store" impl LedgerStore, SessionStore, Notifier);
pub async fn set_store<B, S, N>(
    api: web::Data<PaymentFlowApi<B, S, N>>,
    body: web::Json<SetStoreRequest>,
) -> Result<HttpResponse, ServerError>
where
    B: LedgerStore,
    S: SessionStore,
    N: Notifier,
{
    let (buyer_id, store) = body.validate()?;
    trace!("💻️ {buyer_id} is selecting store '{store}'");
    let store = api.select_store(buyer_id, &store).await?;
    info!("💻️ {buyer_id} selected store {}", store.code);
    Ok(HttpResponse::Ok().json(StatusResponse::ok()))
}

route!(delivery_price => Get "/delivery/price" impl LedgerStore, SessionStore, Notifier);
pub async fn delivery_price<B, S, N>(api: web::Data<PaymentFlowApi<B, S, N>>) -> HttpResponse
where
    B: LedgerStore,
    S: SessionStore,
    N: Notifier,
{
    HttpResponse::Ok().json(DeliveryPriceResponse { price: api.delivery_price(), currency: TENGE_CURRENCY_CODE })
}

//----------------------------------------------   Telegram  --------------------------------------------------
route!(telegram_webhook => Post "/telegram/webhook" impl LedgerStore, SessionStore, Notifier);
/// Update intake for the bot.
///
/// Once the secret check passes, the webhook always answers 200, even if handling the update failed, so that Telegram
/// does not deliver the same update again.
pub async fn telegram_webhook<B, S, N>(
    req: HttpRequest,
    api: web::Data<PaymentFlowApi<B, S, N>>,
    options: web::Data<BotOptions>,
    body: web::Json<Update>,
) -> Result<HttpResponse, ServerError>
where
    B: LedgerStore,
    S: SessionStore,
    N: Notifier,
{
    if let Some(secret) = &options.webhook_secret {
        let supplied = req.headers().get(WEBHOOK_SECRET_HEADER).and_then(|v| v.to_str().ok());
        if !supplied.is_some_and(|s| secret.matches(s)) {
            warn!("💻️ Webhook call without a valid secret token was rejected");
            return Err(ServerError::Unauthorized);
        }
    }
    let update = body.into_inner();
    let update_id = update.update_id;
    match dispatch_update(api.get_ref(), options.get_ref(), update).await {
        Ok(handled) => debug!("💻️ Update {update_id} handled: {handled:?}"),
        Err(e) => warn!("💻️ Update {update_id} could not be handled. {e}"),
    }
    Ok(HttpResponse::Ok().finish())
}
