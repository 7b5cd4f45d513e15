//! Outbound messages to the buyer and the administrator.
//!
//! The engine only knows about [`Notifier`]. The server crate implements it on top of the Telegram Bot API, and the
//! test utilities provide a recording implementation.
mod late_bound;
mod messages;

pub use late_bound::{LateBoundError, LateBoundNotifier};
pub use messages::{ActionButton, ButtonTarget, DocumentRef, LinkButton, OutboundMessage, Recipient};

#[allow(async_fn_in_trait)]
pub trait Notifier {
    type Error: std::error::Error;

    /// Sends a text message, with an optional row of link buttons.
    async fn send(&self, recipient: Recipient, message: OutboundMessage) -> Result<(), Self::Error>;

    /// Forwards a buyer-submitted document to the administrator with a caption and two decision buttons.
    async fn forward_document(
        &self,
        document: &DocumentRef,
        caption: &str,
        actions: [ActionButton; 2],
    ) -> Result<(), Self::Error>;

    /// Answers the administrator's button press.
    async fn acknowledge(&self, callback_id: &str, text: &str) -> Result<(), Self::Error>;
}
