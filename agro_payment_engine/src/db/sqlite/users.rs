use chrono::{DateTime, Utc};
use log::{debug, info, trace};
use sqlx::SqliteConnection;

use crate::{
    db::sqlite::SqliteDatabaseError,
    db_types::{BuyerId, SubscriptionStatusType, UserProfile, UserSubscriptionStatus},
};

pub async fn fetch_user(
    buyer_id: BuyerId,
    conn: &mut SqliteConnection,
) -> Result<Option<UserProfile>, SqliteDatabaseError> {
    let user = sqlx::query_as::<_, UserProfile>(
        r#"
            SELECT id, user_id, nickname, phone, sub_status, sub_until, selected_store, created_at, updated_at
            FROM users
            WHERE user_id = $1
        "#,
    )
    .bind(buyer_id)
    .fetch_optional(conn)
    .await?;
    Ok(user)
}

/// Creates the user row if necessary. An existing nickname is kept.
pub async fn upsert_pending_subscriber(
    buyer_id: BuyerId,
    phone: &str,
    conn: &mut SqliteConnection,
) -> Result<(), SqliteDatabaseError> {
    sqlx::query(
        r#"
            INSERT INTO users (user_id, phone, sub_status) VALUES ($1, $2, 'pending')
            ON CONFLICT(user_id) DO UPDATE SET
                phone = excluded.phone,
                sub_status = 'pending',
                updated_at = CURRENT_TIMESTAMP
        "#,
    )
    .bind(buyer_id)
    .bind(phone)
    .execute(conn)
    .await?;
    trace!("🗃️ User {buyer_id} marked as pending subscriber");
    Ok(())
}

pub async fn set_selected_store(
    buyer_id: BuyerId,
    store_code: &str,
    conn: &mut SqliteConnection,
) -> Result<(), SqliteDatabaseError> {
    sqlx::query(
        r#"
            INSERT INTO users (user_id, selected_store) VALUES ($1, $2)
            ON CONFLICT(user_id) DO UPDATE SET
                selected_store = excluded.selected_store,
                updated_at = CURRENT_TIMESTAMP
        "#,
    )
    .bind(buyer_id)
    .bind(store_code)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn fetch_selected_store_code(
    buyer_id: BuyerId,
    conn: &mut SqliteConnection,
) -> Result<Option<String>, SqliteDatabaseError> {
    let code = sqlx::query_scalar::<_, Option<String>>("SELECT selected_store FROM users WHERE user_id = $1")
        .bind(buyer_id)
        .fetch_optional(conn)
        .await?;
    Ok(code.flatten().filter(|c| !c.trim().is_empty()))
}

/// Derives `(sub_status, sub_until)` for the buyer from their active and expired subscriptions and writes it to the
/// user row when it differs from what is stored.
///
/// * An active subscription that is valid after `now` gives `active`, until the latest such expiry.
/// * Otherwise any active or expired subscription gives `expired`, with no expiry date. A `pending` user row is left
///   alone in this case, since a newer request is awaiting review.
/// * A buyer with neither is left untouched.
pub async fn project_subscription_status(
    buyer_id: BuyerId,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<bool, SqliteDatabaseError> {
    let rows = sqlx::query_as::<_, (SubscriptionStatusType, Option<DateTime<Utc>>)>(
        "SELECT status, valid_until FROM subscriptions WHERE user_id = $1 AND status IN ('active', 'expired')",
    )
    .bind(buyer_id)
    .fetch_all(&mut *conn)
    .await?;
    if rows.is_empty() {
        return Ok(false);
    }
    let active_until = rows
        .iter()
        .filter(|(status, _)| *status == SubscriptionStatusType::Active)
        .filter_map(|(_, until)| *until)
        .filter(|until| *until > now)
        .max();
    let (status, until) = match active_until {
        Some(until) => (UserSubscriptionStatus::Active, Some(until)),
        None => (UserSubscriptionStatus::Expired, None),
    };
    let current = sqlx::query_as::<_, (UserSubscriptionStatus, Option<DateTime<Utc>>)>(
        "SELECT sub_status, sub_until FROM users WHERE user_id = $1",
    )
    .bind(buyer_id)
    .fetch_optional(&mut *conn)
    .await?;
    match current {
        Some((s, u)) if s == status && u == until => return Ok(false),
        Some((UserSubscriptionStatus::Pending, _)) if status == UserSubscriptionStatus::Expired => return Ok(false),
        _ => {},
    }
    sqlx::query(
        r#"
            INSERT INTO users (user_id, sub_status, sub_until) VALUES ($1, $2, $3)
            ON CONFLICT(user_id) DO UPDATE SET
                sub_status = excluded.sub_status,
                sub_until = excluded.sub_until,
                updated_at = CURRENT_TIMESTAMP
        "#,
    )
    .bind(buyer_id)
    .bind(status)
    .bind(until)
    .execute(conn)
    .await?;
    debug!("🗃️ User {buyer_id} subscription status projected to {status} (until {until:?})");
    Ok(true)
}

pub async fn expire_user_subscriptions(
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<u64, SqliteDatabaseError> {
    let result = sqlx::query(
        r#"
            UPDATE users
            SET sub_status = 'expired',
                sub_until = NULL,
                updated_at = CURRENT_TIMESTAMP
            WHERE sub_status = 'active'
              AND sub_until IS NOT NULL
              AND sub_until < $1
        "#,
    )
    .bind(now)
    .execute(conn)
    .await?;
    let count = result.rows_affected();
    if count > 0 {
        info!("🗃️ {count} users' subscriptions expired");
    }
    Ok(count)
}
