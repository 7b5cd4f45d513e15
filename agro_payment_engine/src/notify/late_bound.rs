use std::sync::{Arc, OnceLock};

use log::debug;
use thiserror::Error;

use crate::notify::{ActionButton, DocumentRef, Notifier, OutboundMessage, Recipient};

#[derive(Debug, Error)]
pub enum LateBoundError<E: std::error::Error> {
    #[error("The messaging channel has not finished starting up")]
    NotReady,
    #[error("The messaging channel has already been bound")]
    AlreadyBound,
    #[error("{0}")]
    Channel(E),
}

/// A shareable single-assignment handle to a notifier.
///
/// The workflow engine is constructed with this handle before the messaging client is ready. Once the client is
/// available, [`LateBoundNotifier::bind`] installs it, and every clone of the handle starts delivering messages.
/// Until then, every call fails with [`LateBoundError::NotReady`].
pub struct LateBoundNotifier<N> {
    inner: Arc<OnceLock<N>>,
}

impl<N> Clone for LateBoundNotifier<N> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<N> Default for LateBoundNotifier<N> {
    fn default() -> Self {
        Self { inner: Arc::new(OnceLock::new()) }
    }
}

impl<N> LateBoundNotifier<N>
where N: Notifier
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&self, notifier: N) -> Result<(), LateBoundError<N::Error>> {
        self.inner.set(notifier).map_err(|_| LateBoundError::AlreadyBound)?;
        debug!("📨️ Messaging channel bound");
        Ok(())
    }

    pub fn is_bound(&self) -> bool {
        self.inner.get().is_some()
    }

    fn get(&self) -> Result<&N, LateBoundError<N::Error>> {
        self.inner.get().ok_or(LateBoundError::NotReady)
    }
}

impl<N> Notifier for LateBoundNotifier<N>
where N: Notifier
{
    type Error = LateBoundError<N::Error>;

    async fn send(&self, recipient: Recipient, message: OutboundMessage) -> Result<(), Self::Error> {
        self.get()?.send(recipient, message).await.map_err(LateBoundError::Channel)
    }

    async fn forward_document(
        &self,
        document: &DocumentRef,
        caption: &str,
        actions: [ActionButton; 2],
    ) -> Result<(), Self::Error> {
        self.get()?.forward_document(document, caption, actions).await.map_err(LateBoundError::Channel)
    }

    async fn acknowledge(&self, callback_id: &str, text: &str) -> Result<(), Self::Error> {
        self.get()?.acknowledge(callback_id, text).await.map_err(LateBoundError::Channel)
    }
}
