#[cfg(feature = "sqlite")]
pub mod prepare_env;
mod recording_notifier;

pub use recording_notifier::{NotificationRecord, RecordingNotifier, RecordingNotifierError};
