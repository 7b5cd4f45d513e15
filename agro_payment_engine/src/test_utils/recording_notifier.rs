use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
    Mutex,
};

use thiserror::Error;

use crate::notify::{ActionButton, DocumentRef, Notifier, OutboundMessage, Recipient};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationRecord {
    Message { recipient: Recipient, message: OutboundMessage },
    Forward { document: DocumentRef, caption: String, actions: [ActionButton; 2] },
    Acknowledge { callback_id: String, text: String },
}

#[derive(Debug, Clone, Error)]
#[error("Simulated delivery failure")]
pub struct RecordingNotifierError;

/// A [`Notifier`] that keeps every call in memory so tests can inspect what would have been sent.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    records: Arc<Mutex<Vec<NotificationRecord>>>,
    fail_sends: Arc<AtomicBool>,
    fail_forwards: Arc<AtomicBool>,
}

impl RecordingNotifier {
    /// Subsequent `send` calls fail (and are not recorded).
    pub fn fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::SeqCst);
    }

    /// Subsequent `forward_document` calls fail (and are not recorded).
    pub fn fail_forwards(&self, fail: bool) {
        self.fail_forwards.store(fail, Ordering::SeqCst);
    }

    pub fn records(&self) -> Vec<NotificationRecord> {
        self.records.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn clear(&self) {
        if let Ok(mut r) = self.records.lock() {
            r.clear();
        }
    }

    pub fn messages_for(&self, recipient: Recipient) -> Vec<String> {
        self.records()
            .into_iter()
            .filter_map(|r| match r {
                NotificationRecord::Message { recipient: to, message } if to == recipient => Some(message.text),
                _ => None,
            })
            .collect()
    }

    pub fn forwards(&self) -> Vec<(DocumentRef, String, [ActionButton; 2])> {
        self.records()
            .into_iter()
            .filter_map(|r| match r {
                NotificationRecord::Forward { document, caption, actions } => Some((document, caption, actions)),
                _ => None,
            })
            .collect()
    }

    pub fn acknowledgements(&self) -> Vec<String> {
        self.records()
            .into_iter()
            .filter_map(|r| match r {
                NotificationRecord::Acknowledge { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    fn push(&self, record: NotificationRecord) {
        if let Ok(mut r) = self.records.lock() {
            r.push(record);
        }
    }
}

impl Notifier for RecordingNotifier {
    type Error = RecordingNotifierError;

    async fn send(&self, recipient: Recipient, message: OutboundMessage) -> Result<(), Self::Error> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(RecordingNotifierError);
        }
        self.push(NotificationRecord::Message { recipient, message });
        Ok(())
    }

    async fn forward_document(
        &self,
        document: &DocumentRef,
        caption: &str,
        actions: [ActionButton; 2],
    ) -> Result<(), Self::Error> {
        if self.fail_forwards.load(Ordering::SeqCst) {
            return Err(RecordingNotifierError);
        }
        self.push(NotificationRecord::Forward { document: document.clone(), caption: caption.to_string(), actions });
        Ok(())
    }

    async fn acknowledge(&self, callback_id: &str, text: &str) -> Result<(), Self::Error> {
        self.push(NotificationRecord::Acknowledge { callback_id: callback_id.to_string(), text: text.to_string() });
        Ok(())
    }
}
