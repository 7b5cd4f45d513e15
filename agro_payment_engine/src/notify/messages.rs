use serde::{Deserialize, Serialize};

use crate::db_types::BuyerId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    Buyer(BuyerId),
    /// The single administrator. Notifier implementations know who that is.
    Admin,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ButtonTarget {
    Url(String),
    /// Opens the mini-app at the given address.
    WebApp(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkButton {
    pub label: String,
    pub target: ButtonTarget,
}

impl LinkButton {
    pub fn url<L: Into<String>, U: Into<String>>(label: L, url: U) -> Self {
        Self { label: label.into(), target: ButtonTarget::Url(url.into()) }
    }

    pub fn web_app<L: Into<String>, U: Into<String>>(label: L, url: U) -> Self {
        Self { label: label.into(), target: ButtonTarget::WebApp(url.into()) }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutboundMessage {
    pub text: String,
    /// Rendered as a single row.
    pub buttons: Vec<LinkButton>,
}

impl OutboundMessage {
    pub fn text<S: Into<String>>(text: S) -> Self {
        Self { text: text.into(), buttons: Vec::new() }
    }

    pub fn with_button(mut self, button: LinkButton) -> Self {
        self.buttons.push(button);
        self
    }
}

/// A file the buyer sent to the bot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRef {
    pub chat_id: i64,
    pub message_id: i64,
    pub sender_username: Option<String>,
}

/// A decision button on a forwarded receipt. Pressing it delivers `token` back to the workflow engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionButton {
    pub label: String,
    pub token: String,
}

impl ActionButton {
    pub fn new<L: Into<String>, T: Into<String>>(label: L, token: T) -> Self {
        Self { label: label.into(), token: token.into() }
    }
}
