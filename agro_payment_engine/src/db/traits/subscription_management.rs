use agro_common::Tenge;
use chrono::{DateTime, Utc};

use crate::{
    db::traits::DecisionOutcome,
    db_types::{BuyerId, Subscription, SubscriptionId, UserProfile},
};

/// Subscription lifecycle and the user-row projection of it.
///
/// The `users.sub_status`/`users.sub_until` pair is a materialized view over the `subscriptions` table. Backends
/// re-derive it with [`SubscriptionManagement::project_subscription_status`] after every approval, and the expiry
/// sweep reconciles every user, so a failed write is repaired on the next sweep rather than persisting.
#[allow(async_fn_in_trait)]
pub trait SubscriptionManagement {
    type Error: std::error::Error;

    /// Marks the buyer's user row as `pending` with the given contact phone (creating the row if necessary and
    /// keeping any existing nickname), and inserts a new `pending` subscription for `amount`.
    async fn insert_subscription_request(
        &self,
        buyer_id: BuyerId,
        phone: &str,
        amount: Tenge,
    ) -> Result<Subscription, Self::Error>;

    async fn fetch_subscription(&self, id: SubscriptionId) -> Result<Option<Subscription>, Self::Error>;

    /// The buyer's newest `pending` subscription by id.
    async fn fetch_latest_pending_subscription(&self, buyer_id: BuyerId) -> Result<Option<Subscription>, Self::Error>;

    /// The latest `valid_until` of the buyer's active subscriptions that is still in the future.
    async fn fetch_active_subscription_until(
        &self,
        buyer_id: BuyerId,
        now: DateTime<Utc>,
    ) -> Result<Option<DateTime<Utc>>, Self::Error>;

    async fn fetch_user(&self, buyer_id: BuyerId) -> Result<Option<UserProfile>, Self::Error>;

    /// `pending` → `active` with the given expiry, followed by a projection of the buyer's user row.
    async fn activate_subscription(
        &self,
        id: SubscriptionId,
        valid_until: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<DecisionOutcome, Self::Error>;

    /// `pending` → `rejected`. The user row is not touched.
    async fn reject_subscription(&self, id: SubscriptionId) -> Result<DecisionOutcome, Self::Error>;

    /// Re-derives the buyer's user-row status from their active and expired subscriptions. Returns true if the row
    /// changed.
    async fn project_subscription_status(&self, buyer_id: BuyerId, now: DateTime<Utc>) -> Result<bool, Self::Error>;

    /// `active` subscriptions whose `valid_until` is before `now` become `expired`. Returns the number of rows changed.
    async fn expire_subscriptions(&self, now: DateTime<Utc>) -> Result<u64, Self::Error>;

    /// Users marked `active` whose `sub_until` is before `now` become `expired` with no expiry date.
    async fn expire_user_subscriptions(&self, now: DateTime<Utc>) -> Result<u64, Self::Error>;

    /// Runs the projection for every buyer that has an active or expired subscription. Returns the number of user
    /// rows that changed.
    async fn reconcile_subscription_statuses(&self, now: DateTime<Utc>) -> Result<u64, Self::Error>;
}
