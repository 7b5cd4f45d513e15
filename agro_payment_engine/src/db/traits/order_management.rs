use crate::{
    db::traits::{DecisionOutcome, OrderQueryFilter},
    db_types::{BuyerId, NewOrderRecord, Order, OrderId, OrderItem},
};

/// The `OrderManagement` trait defines the behaviour for writing and querying orders in the ledger.
#[allow(async_fn_in_trait)]
pub trait OrderManagement {
    type Error: std::error::Error;

    /// Writes the order row and every item row as a single atomic unit. If any row fails, nothing is written.
    async fn insert_order(&self, order: NewOrderRecord) -> Result<Order, Self::Error>;

    async fn fetch_order(&self, id: OrderId) -> Result<Option<Order>, Self::Error>;

    /// Line items for the order, in insertion order.
    async fn fetch_order_items(&self, id: OrderId) -> Result<Vec<OrderItem>, Self::Error>;

    async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, Self::Error>;

    /// The buyer's most recent order by id, if any.
    async fn fetch_latest_order_for_buyer(&self, buyer_id: BuyerId) -> Result<Option<Order>, Self::Error> {
        let query = OrderQueryFilter::default().with_buyer_id(buyer_id).newest_first().with_limit(1);
        let orders = self.search_orders(query).await?;
        Ok(orders.into_iter().next())
    }

    /// Sets the order status to `paid`, unless it already is.
    async fn mark_order_paid(&self, id: OrderId) -> Result<DecisionOutcome, Self::Error>;
}
