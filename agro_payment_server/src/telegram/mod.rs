//! Telegram Bot API plumbing: the HTTP client, the [`Notifier`](agro_payment_engine::notify::Notifier)
//! implementation, webhook dispatch, and the start-up task that binds the notifier once the bot is reachable.
mod client;
mod notifier;
pub mod types;
mod webhook;

use std::time::Duration;

pub use client::{TelegramBotClient, TelegramError};
use agro_payment_engine::notify::LateBoundNotifier;
use log::*;
pub use notifier::{decision_keyboard, link_keyboard, TelegramNotifier};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
pub use webhook::{dispatch_update, greeting, UpdateHandled, GREETING, OPEN_ADMIN, OPEN_MINI_APP};

const INITIAL_BACKOFF: Duration = Duration::from_secs(1);
const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// Polls `getMe` until the bot answers, then binds a [`TelegramNotifier`] to `handle`. Retries back off exponentially
/// up to one minute. The task exits early if `token` is cancelled.
pub fn start_notifier_binder(
    client: TelegramBotClient,
    admin_chat: Option<i64>,
    handle: LateBoundNotifier<TelegramNotifier>,
    token: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut backoff = INITIAL_BACKOFF;
        loop {
            match client.get_me().await {
                Ok(me) => {
                    info!("🤖️ Connected to Telegram as @{}", me.username.as_deref().unwrap_or(&me.first_name));
                    if let Err(e) = handle.bind(TelegramNotifier::new(client, admin_chat)) {
                        warn!("🤖️ {e}");
                    }
                    return;
                },
                Err(e) => warn!("🤖️ Telegram is not reachable yet. {e}. Retrying in {}s", backoff.as_secs()),
            }
            tokio::select! {
                _ = tokio::time::sleep(backoff) => {},
                _ = token.cancelled() => {
                    info!("🤖️ Shutdown requested before the bot connected");
                    return;
                },
            }
            backoff = (backoff * 2).min(MAX_BACKOFF);
        }
    })
}
