use std::{sync::Arc, time::Duration};

use log::*;
use tokio::{task::JoinHandle, time::MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::server::AgroFlowApi;

/// Starts the subscription expiry sweeper. The first sweep runs immediately, then once every `interval`, until `token`
/// is cancelled.
pub fn start_subscription_sweeper(
    api: Arc<AgroFlowApi>,
    interval: Duration,
    token: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut timer = tokio::time::interval(interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!("🕰️ Subscription expiry sweeper started. Sweeping every {}h", interval.as_secs() / 3600);
        loop {
            tokio::select! {
                _ = timer.tick() => {},
                _ = token.cancelled() => {
                    info!("🕰️ Subscription expiry sweeper stopped");
                    return;
                },
            }
            debug!("🕰️ Running subscription expiry sweep");
            let result = api.sweep_expired_subscriptions().await;
            if result.failed_steps > 0 {
                error!("🕰️ {} sweep step(s) failed. The next sweep will try again.", result.failed_steps);
            }
            info!(
                "🕰️ Sweep complete. {} subscription(s) expired, {} user(s) expired, {} user(s) reconciled",
                result.expired_subscriptions, result.expired_users, result.reconciled_users
            );
        }
    })
}
