use std::fmt::Debug;

use agro_common::Tenge;
use chrono::{DateTime, Utc};
use log::*;
use sqlx::SqlitePool;

use super::{new_pool, orders, stores, subscriptions, users, SqliteDatabaseError};
use crate::{
    db::traits::{DecisionOutcome, OrderManagement, OrderQueryFilter, StoreManagement, SubscriptionManagement},
    db_types::{BuyerId, NewOrderRecord, Order, OrderId, OrderItem, Store, Subscription, SubscriptionId, UserProfile},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SqliteDatabase ({})", self.url)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, SqliteDatabaseError> {
        let pool = new_pool(url, max_connections).await?;
        trace!("🗃️ Created new connection pool for {url}");
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Brings the schema up to date using the migrations embedded in this crate.
    pub async fn migrate(&self) -> Result<(), SqliteDatabaseError> {
        sqlx::migrate!("./src/db/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Database migrations complete");
        Ok(())
    }

    pub async fn close(&mut self) -> Result<(), SqliteDatabaseError> {
        self.pool.close().await;
        Ok(())
    }
}

impl OrderManagement for SqliteDatabase {
    type Error = SqliteDatabaseError;

    async fn insert_order(&self, order: NewOrderRecord) -> Result<Order, Self::Error> {
        let mut tx = self.pool.begin().await?;
        let saved = orders::insert_order(&order, &mut tx).await?;
        for item in &order.items {
            orders::insert_order_item(saved.id, item, &mut tx).await?;
        }
        tx.commit().await?;
        debug!("🗃️ Order #{} for buyer {} saved with {} items", saved.id, saved.user_id, order.items.len());
        Ok(saved)
    }

    async fn fetch_order(&self, id: OrderId) -> Result<Option<Order>, Self::Error> {
        let mut conn = self.pool.acquire().await?;
        orders::fetch_order(id, &mut conn).await
    }

    async fn fetch_order_items(&self, id: OrderId) -> Result<Vec<OrderItem>, Self::Error> {
        let mut conn = self.pool.acquire().await?;
        orders::fetch_order_items(id, &mut conn).await
    }

    async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, Self::Error> {
        let mut conn = self.pool.acquire().await?;
        orders::search_orders(query, &mut conn).await
    }

    async fn mark_order_paid(&self, id: OrderId) -> Result<DecisionOutcome, Self::Error> {
        let mut tx = self.pool.begin().await?;
        let outcome = orders::mark_order_paid(id, &mut tx).await?;
        tx.commit().await?;
        Ok(outcome)
    }
}

impl SubscriptionManagement for SqliteDatabase {
    type Error = SqliteDatabaseError;

    async fn insert_subscription_request(
        &self,
        buyer_id: BuyerId,
        phone: &str,
        amount: Tenge,
    ) -> Result<Subscription, Self::Error> {
        let mut tx = self.pool.begin().await?;
        users::upsert_pending_subscriber(buyer_id, phone, &mut tx).await?;
        let subscription = subscriptions::insert_pending_subscription(buyer_id, phone, amount, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Subscription request #{} saved for buyer {buyer_id}", subscription.id);
        Ok(subscription)
    }

    async fn fetch_subscription(&self, id: SubscriptionId) -> Result<Option<Subscription>, Self::Error> {
        let mut conn = self.pool.acquire().await?;
        subscriptions::fetch_subscription(id, &mut conn).await
    }

    async fn fetch_latest_pending_subscription(&self, buyer_id: BuyerId) -> Result<Option<Subscription>, Self::Error> {
        let mut conn = self.pool.acquire().await?;
        subscriptions::fetch_latest_pending_subscription(buyer_id, &mut conn).await
    }

    async fn fetch_active_subscription_until(
        &self,
        buyer_id: BuyerId,
        now: DateTime<Utc>,
    ) -> Result<Option<DateTime<Utc>>, Self::Error> {
        let mut conn = self.pool.acquire().await?;
        subscriptions::fetch_active_subscription_until(buyer_id, now, &mut conn).await
    }

    async fn fetch_user(&self, buyer_id: BuyerId) -> Result<Option<UserProfile>, Self::Error> {
        let mut conn = self.pool.acquire().await?;
        users::fetch_user(buyer_id, &mut conn).await
    }

    async fn activate_subscription(
        &self,
        id: SubscriptionId,
        valid_until: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<DecisionOutcome, Self::Error> {
        let mut tx = self.pool.begin().await?;
        let outcome = subscriptions::activate_subscription(id, valid_until, &mut tx).await?;
        if outcome.is_applied() {
            if let Some(sub) = subscriptions::fetch_subscription(id, &mut tx).await? {
                users::project_subscription_status(sub.user_id, now, &mut tx).await?;
            }
        }
        tx.commit().await?;
        Ok(outcome)
    }

    async fn reject_subscription(&self, id: SubscriptionId) -> Result<DecisionOutcome, Self::Error> {
        let mut tx = self.pool.begin().await?;
        let outcome = subscriptions::reject_subscription(id, &mut tx).await?;
        tx.commit().await?;
        Ok(outcome)
    }

    async fn project_subscription_status(&self, buyer_id: BuyerId, now: DateTime<Utc>) -> Result<bool, Self::Error> {
        let mut tx = self.pool.begin().await?;
        let changed = users::project_subscription_status(buyer_id, now, &mut tx).await?;
        tx.commit().await?;
        Ok(changed)
    }

    async fn expire_subscriptions(&self, now: DateTime<Utc>) -> Result<u64, Self::Error> {
        let mut conn = self.pool.acquire().await?;
        subscriptions::expire_subscriptions(now, &mut conn).await
    }

    async fn expire_user_subscriptions(&self, now: DateTime<Utc>) -> Result<u64, Self::Error> {
        let mut conn = self.pool.acquire().await?;
        users::expire_user_subscriptions(now, &mut conn).await
    }

    async fn reconcile_subscription_statuses(&self, now: DateTime<Utc>) -> Result<u64, Self::Error> {
        let buyers = {
            let mut conn = self.pool.acquire().await?;
            subscriptions::buyers_with_settled_subscriptions(&mut conn).await?
        };
        let mut changed = 0u64;
        for buyer_id in buyers {
            let mut tx = self.pool.begin().await?;
            if users::project_subscription_status(buyer_id, now, &mut tx).await? {
                changed += 1;
            }
            tx.commit().await?;
        }
        Ok(changed)
    }
}

impl StoreManagement for SqliteDatabase {
    type Error = SqliteDatabaseError;

    async fn fetch_store(&self, code: &str) -> Result<Option<Store>, Self::Error> {
        let mut conn = self.pool.acquire().await?;
        stores::fetch_store(code, &mut conn).await
    }

    async fn select_store(&self, buyer_id: BuyerId, store: &str) -> Result<Option<Store>, Self::Error> {
        let mut tx = self.pool.begin().await?;
        let found = stores::fetch_store_by_code_or_name(store, &mut tx).await?;
        if let Some(store) = &found {
            users::set_selected_store(buyer_id, &store.code, &mut tx).await?;
            debug!("🗃️ Buyer {buyer_id} selected store {}", store.code);
        }
        tx.commit().await?;
        Ok(found)
    }

    async fn fetch_selected_store_code(&self, buyer_id: BuyerId) -> Result<Option<String>, Self::Error> {
        let mut conn = self.pool.acquire().await?;
        users::fetch_selected_store_code(buyer_id, &mut conn).await
    }
}
