use agro_common::Tenge;
use chrono::{DateTime, Utc};
use log::{debug, info};
use sqlx::SqliteConnection;

use crate::{
    db::{sqlite::SqliteDatabaseError, traits::DecisionOutcome},
    db_types::{BuyerId, Subscription, SubscriptionId},
};

const SUBSCRIPTION_COLUMNS: &str = "id, user_id, phone, status, amount, valid_until, created_at";

pub async fn insert_pending_subscription(
    buyer_id: BuyerId,
    phone: &str,
    amount: Tenge,
    conn: &mut SqliteConnection,
) -> Result<Subscription, SqliteDatabaseError> {
    let sql = format!(
        "INSERT INTO subscriptions (user_id, phone, status, amount) VALUES ($1, $2, 'pending', $3) RETURNING \
         {SUBSCRIPTION_COLUMNS}"
    );
    let subscription =
        sqlx::query_as::<_, Subscription>(&sql).bind(buyer_id).bind(phone).bind(amount).fetch_one(conn).await?;
    Ok(subscription)
}

pub async fn fetch_subscription(
    id: SubscriptionId,
    conn: &mut SqliteConnection,
) -> Result<Option<Subscription>, SqliteDatabaseError> {
    let sql = format!("SELECT {SUBSCRIPTION_COLUMNS} FROM subscriptions WHERE id = $1");
    let subscription = sqlx::query_as::<_, Subscription>(&sql).bind(id).fetch_optional(conn).await?;
    Ok(subscription)
}

pub async fn fetch_latest_pending_subscription(
    buyer_id: BuyerId,
    conn: &mut SqliteConnection,
) -> Result<Option<Subscription>, SqliteDatabaseError> {
    let sql = format!(
        "SELECT {SUBSCRIPTION_COLUMNS} FROM subscriptions WHERE user_id = $1 AND status = 'pending' ORDER BY id DESC \
         LIMIT 1"
    );
    let subscription = sqlx::query_as::<_, Subscription>(&sql).bind(buyer_id).fetch_optional(conn).await?;
    Ok(subscription)
}

pub async fn fetch_active_subscription_until(
    buyer_id: BuyerId,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Option<DateTime<Utc>>, SqliteDatabaseError> {
    let expiries = sqlx::query_scalar::<_, DateTime<Utc>>(
        "SELECT valid_until FROM subscriptions WHERE user_id = $1 AND status = 'active' AND valid_until IS NOT NULL",
    )
    .bind(buyer_id)
    .fetch_all(conn)
    .await?;
    Ok(expiries.into_iter().filter(|until| *until > now).max())
}

async fn subscription_exists(id: SubscriptionId, conn: &mut SqliteConnection) -> Result<bool, SqliteDatabaseError> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM subscriptions WHERE id = $1")
        .bind(id)
        .fetch_one(conn)
        .await?;
    Ok(count > 0)
}

async fn outcome_for(
    id: SubscriptionId,
    rows_affected: u64,
    conn: &mut SqliteConnection,
) -> Result<DecisionOutcome, SqliteDatabaseError> {
    if rows_affected > 0 {
        Ok(DecisionOutcome::Applied)
    } else if subscription_exists(id, conn).await? {
        Ok(DecisionOutcome::AlreadyHandled)
    } else {
        Ok(DecisionOutcome::NotFound)
    }
}

/// Check-and-set: only a `pending` subscription can be activated.
pub async fn activate_subscription(
    id: SubscriptionId,
    valid_until: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<DecisionOutcome, SqliteDatabaseError> {
    let result = sqlx::query(
        r#"
            UPDATE subscriptions
            SET status = 'active', valid_until = $1, paid_at = CURRENT_TIMESTAMP
            WHERE id = $2 AND status = 'pending'
        "#,
    )
    .bind(valid_until)
    .bind(id)
    .execute(&mut *conn)
    .await?;
    let outcome = outcome_for(id, result.rows_affected(), conn).await?;
    debug!("🗃️ Activate subscription #{id} until {valid_until}: {outcome:?}");
    Ok(outcome)
}

/// Check-and-set: only a `pending` subscription can be rejected.
pub async fn reject_subscription(
    id: SubscriptionId,
    conn: &mut SqliteConnection,
) -> Result<DecisionOutcome, SqliteDatabaseError> {
    let result = sqlx::query("UPDATE subscriptions SET status = 'rejected' WHERE id = $1 AND status = 'pending'")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    let outcome = outcome_for(id, result.rows_affected(), conn).await?;
    debug!("🗃️ Reject subscription #{id}: {outcome:?}");
    Ok(outcome)
}

pub async fn expire_subscriptions(now: DateTime<Utc>, conn: &mut SqliteConnection) -> Result<u64, SqliteDatabaseError> {
    let result = sqlx::query(
        r#"
            UPDATE subscriptions
            SET status = 'expired'
            WHERE status = 'active'
              AND valid_until IS NOT NULL
              AND valid_until < $1
        "#,
    )
    .bind(now)
    .execute(conn)
    .await?;
    let count = result.rows_affected();
    if count > 0 {
        info!("🗃️ {count} subscriptions expired");
    }
    Ok(count)
}

/// Every buyer who has at least one `active` or `expired` subscription.
pub async fn buyers_with_settled_subscriptions(
    conn: &mut SqliteConnection,
) -> Result<Vec<BuyerId>, SqliteDatabaseError> {
    let buyers = sqlx::query_scalar::<_, BuyerId>(
        "SELECT DISTINCT user_id FROM subscriptions WHERE status IN ('active', 'expired') ORDER BY user_id",
    )
    .fetch_all(conn)
    .await?;
    Ok(buyers)
}
