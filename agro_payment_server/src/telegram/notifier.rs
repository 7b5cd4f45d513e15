use agro_payment_engine::notify::{
    ActionButton,
    ButtonTarget,
    DocumentRef,
    LinkButton,
    Notifier,
    OutboundMessage,
    Recipient,
};
use log::*;

use crate::telegram::{
    client::{TelegramBotClient, TelegramError},
    types::{InlineKeyboardButton, InlineKeyboardMarkup},
};

/// Delivers workflow notifications through the Bot API. Buyers are messaged in their private chat with the bot,
/// whose id is their user id.
#[derive(Clone)]
pub struct TelegramNotifier {
    client: TelegramBotClient,
    admin_chat: Option<i64>,
}

impl TelegramNotifier {
    pub fn new(client: TelegramBotClient, admin_chat: Option<i64>) -> Self {
        Self { client, admin_chat }
    }

    pub fn client(&self) -> &TelegramBotClient {
        &self.client
    }

    fn chat_for(&self, recipient: Recipient) -> Result<i64, TelegramError> {
        match recipient {
            Recipient::Buyer(id) => Ok(id.value()),
            Recipient::Admin => self.admin_chat.ok_or(TelegramError::AdminNotConfigured),
        }
    }
}

pub fn link_keyboard(buttons: &[LinkButton]) -> Option<InlineKeyboardMarkup> {
    if buttons.is_empty() {
        return None;
    }
    let row = buttons
        .iter()
        .map(|b| match &b.target {
            ButtonTarget::Url(url) => InlineKeyboardButton::url(b.label.as_str(), url.as_str()),
            ButtonTarget::WebApp(url) => InlineKeyboardButton::web_app(b.label.as_str(), url.as_str()),
        })
        .collect();
    Some(InlineKeyboardMarkup::single_row(row))
}

pub fn decision_keyboard(actions: &[ActionButton]) -> InlineKeyboardMarkup {
    let row = actions.iter().map(|a| InlineKeyboardButton::callback(a.label.as_str(), a.token.as_str())).collect();
    InlineKeyboardMarkup::single_row(row)
}

impl Notifier for TelegramNotifier {
    type Error = TelegramError;

    async fn send(&self, recipient: Recipient, message: OutboundMessage) -> Result<(), Self::Error> {
        let chat_id = self.chat_for(recipient)?;
        let keyboard = link_keyboard(&message.buttons);
        self.client.send_message(chat_id, &message.text, keyboard).await
    }

    async fn forward_document(
        &self,
        document: &DocumentRef,
        caption: &str,
        actions: [ActionButton; 2],
    ) -> Result<(), Self::Error> {
        let admin = self.chat_for(Recipient::Admin)?;
        let keyboard = decision_keyboard(&actions);
        self.client.copy_message(admin, document.chat_id, document.message_id, caption, Some(keyboard)).await?;
        debug!("📨️ Message {} from chat {} forwarded to the administrator", document.message_id, document.chat_id);
        Ok(())
    }

    async fn acknowledge(&self, callback_id: &str, text: &str) -> Result<(), Self::Error> {
        self.client.answer_callback_query(callback_id, text).await
    }
}
