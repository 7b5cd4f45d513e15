use agro_payment_engine::{
    db_types::BuyerId,
    flow_api::ReceiptOutcome,
    notify::{DocumentRef, LinkButton, Notifier, OutboundMessage, Recipient},
    session::SessionStore,
    DecisionOutcome,
    FlowError,
    LedgerStore,
    PaymentFlowApi,
};
use log::*;

use crate::{
    config::BotOptions,
    telegram::types::{CallbackQuery, Message, Update},
};

pub const GREETING: &str = "👋 Hi! Welcome to the AGRO Wholesale Price Club.\nTap the button below to open the \
                            mini-app, see the wholesale prices, subscribe and place an order.";
pub const OPEN_MINI_APP: &str = "🚀 Open mini-app";
pub const OPEN_ADMIN: &str = "🛠 Admin";

/// What the bot did with an incoming update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateHandled {
    /// An administrator decision. `None` if the button payload was not a decision token.
    Decision(Option<DecisionOutcome>),
    Receipt(ReceiptOutcome),
    Greeting,
    Ignored,
}

pub fn greeting(options: &BotOptions, is_admin: bool) -> OutboundMessage {
    let mut message = OutboundMessage::text(GREETING);
    if options.mini_app_url.is_empty() {
        return message;
    }
    message = message.with_button(LinkButton::web_app(OPEN_MINI_APP, options.mini_app_url.as_str()));
    if is_admin {
        let admin_url = format!("{}/admin-show-catalog", options.mini_app_url);
        message = message.with_button(LinkButton::web_app(OPEN_ADMIN, admin_url));
    }
    message
}

/// Routes a Telegram update to the workflow engine.
pub async fn dispatch_update<B, S, N>(
    api: &PaymentFlowApi<B, S, N>,
    options: &BotOptions,
    update: Update,
) -> Result<UpdateHandled, FlowError>
where
    B: LedgerStore,
    S: SessionStore,
    N: Notifier,
{
    if let Some(query) = update.callback_query {
        return handle_callback(api, options, query).await;
    }
    match update.message {
        Some(message) => handle_message(api, options, message).await,
        None => {
            trace!("🤖️ Update {} carries nothing the bot handles", update.update_id);
            Ok(UpdateHandled::Ignored)
        },
    }
}

async fn handle_callback<B, S, N>(
    api: &PaymentFlowApi<B, S, N>,
    options: &BotOptions,
    query: CallbackQuery,
) -> Result<UpdateHandled, FlowError>
where
    B: LedgerStore,
    S: SessionStore,
    N: Notifier,
{
    if !options.is_admin(query.from.id) {
        warn!("🤖️ Ignoring a button press from {}, who is not the administrator", query.from.id);
        return Ok(UpdateHandled::Ignored);
    }
    let data = query.data.unwrap_or_default();
    let outcome = api.handle_admin_decision(&query.id, &data).await?;
    Ok(UpdateHandled::Decision(outcome))
}

async fn handle_message<B, S, N>(
    api: &PaymentFlowApi<B, S, N>,
    options: &BotOptions,
    message: Message,
) -> Result<UpdateHandled, FlowError>
where
    B: LedgerStore,
    S: SessionStore,
    N: Notifier,
{
    let Some(from) = message.from else {
        trace!("🤖️ Message {} has no sender", message.message_id);
        return Ok(UpdateHandled::Ignored);
    };
    let buyer_id = match BuyerId::new(from.id) {
        Ok(id) => id,
        Err(e) => {
            debug!("🤖️ Ignoring message {}. {e}", message.message_id);
            return Ok(UpdateHandled::Ignored);
        },
    };
    if message.document.is_some() {
        let document =
            DocumentRef { chat_id: message.chat.id, message_id: message.message_id, sender_username: from.username };
        match api.confirm_payment_document(buyer_id, document).await? {
            ReceiptOutcome::NotAwaitingPayment => {},
            outcome => return Ok(UpdateHandled::Receipt(outcome)),
        }
    }
    let is_admin = options.is_admin(from.id);
    if let Err(e) = api.notifier().send(Recipient::Buyer(buyer_id), greeting(options, is_admin)).await {
        warn!("🤖️ Could not greet {buyer_id}. {e}");
    }
    Ok(UpdateHandled::Greeting)
}
