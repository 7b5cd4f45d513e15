use std::sync::Arc;

use agro_common::Secret;
use log::*;
use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

use crate::telegram::types::{
    AnswerCallbackQuery,
    ApiResponse,
    CopyMessage,
    InlineKeyboardMarkup,
    SendMessage,
    User,
};

#[derive(Debug, Clone, Error)]
pub enum TelegramError {
    #[error("Could not create the Telegram client. {0}")]
    Initialization(String),
    #[error("Request to the Bot API failed. {0}")]
    Request(String),
    #[error("The Bot API returned error {code}: {description}")]
    Api { code: i64, description: String },
    #[error("Could not decode the Bot API response. {0}")]
    Json(String),
    #[error("The Bot API returned an empty result")]
    EmptyResponse,
    #[error("No administrator chat is configured")]
    AdminNotConfigured,
}

/// A thin client for the Telegram Bot API methods the bot uses.
#[derive(Clone)]
pub struct TelegramBotClient {
    api_url: String,
    token: Secret<String>,
    client: Arc<Client>,
}

impl TelegramBotClient {
    pub fn new(api_url: &str, token: Secret<String>) -> Result<Self, TelegramError> {
        if token.is_blank() {
            return Err(TelegramError::Initialization("The bot token is empty".to_string()));
        }
        let client = Client::builder().build().map_err(|e| TelegramError::Initialization(e.to_string()))?;
        Ok(Self { api_url: api_url.trim_end_matches('/').to_string(), token, client: Arc::new(client) })
    }

    // The token is part of the path, so this url must never be logged.
    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{method}", self.api_url, self.token.reveal())
    }

    async fn call<T: DeserializeOwned, B: Serialize>(&self, method: &str, body: &B) -> Result<T, TelegramError> {
        trace!("🤖️ Calling {method}");
        let response = self
            .client
            .post(self.method_url(method))
            .json(body)
            .send()
            .await
            // reqwest errors include the url, and with it the token
            .map_err(|e| TelegramError::Request(e.without_url().to_string()))?;
        let status = response.status();
        let result = response
            .json::<ApiResponse<T>>()
            .await
            .map_err(|e| TelegramError::Json(e.without_url().to_string()))?;
        if !result.ok {
            let code = result.error_code.unwrap_or_else(|| i64::from(status.as_u16()));
            let description = result.description.unwrap_or_default();
            debug!("🤖️ {method} failed. {code}: {description}");
            return Err(TelegramError::Api { code, description });
        }
        result.result.ok_or(TelegramError::EmptyResponse)
    }

    pub async fn get_me(&self) -> Result<User, TelegramError> {
        self.call::<User, _>("getMe", &serde_json::json!({})).await
    }

    pub async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        reply_markup: Option<InlineKeyboardMarkup>,
    ) -> Result<(), TelegramError> {
        let body = SendMessage { chat_id, text: text.to_string(), reply_markup };
        self.call::<serde_json::Value, _>("sendMessage", &body).await?;
        trace!("🤖️ Message sent to chat {chat_id}");
        Ok(())
    }

    /// Copies a message into another chat with a new caption.
    pub async fn copy_message(
        &self,
        chat_id: i64,
        from_chat_id: i64,
        message_id: i64,
        caption: &str,
        reply_markup: Option<InlineKeyboardMarkup>,
    ) -> Result<(), TelegramError> {
        let body = CopyMessage { chat_id, from_chat_id, message_id, caption: caption.to_string(), reply_markup };
        self.call::<serde_json::Value, _>("copyMessage", &body).await?;
        trace!("🤖️ Message {message_id} copied from chat {from_chat_id} to {chat_id}");
        Ok(())
    }

    pub async fn answer_callback_query(&self, callback_query_id: &str, text: &str) -> Result<(), TelegramError> {
        let body = AnswerCallbackQuery { callback_query_id: callback_query_id.to_string(), text: text.to_string() };
        self.call::<bool, _>("answerCallbackQuery", &body).await?;
        Ok(())
    }
}
