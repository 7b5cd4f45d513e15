use log::{debug, trace};
use sqlx::{QueryBuilder, SqliteConnection};

use crate::{
    db::{
        sqlite::SqliteDatabaseError,
        traits::{DecisionOutcome, OrderQueryFilter},
    },
    db_types::{NewOrderItem, NewOrderRecord, Order, OrderId, OrderItem, OrderStatusType},
};

const ORDER_COLUMNS: &str = "id, user_id, store_code, total_amount, status, created_at, updated_at";

/// Inserts the order row only. This is not atomic with the item rows. Run it inside a transaction, together with
/// [`insert_order_item`], and pass `&mut *tx` as the connection argument.
pub async fn insert_order(order: &NewOrderRecord, conn: &mut SqliteConnection) -> Result<Order, SqliteDatabaseError> {
    let sql = format!(
        "INSERT INTO orders (user_id, store_code, total_amount, status) VALUES ($1, $2, $3, 'new') RETURNING \
         {ORDER_COLUMNS}"
    );
    let order = sqlx::query_as::<_, Order>(&sql)
        .bind(order.buyer_id)
        .bind(order.store_code.as_deref())
        .bind(order.total_amount)
        .fetch_one(conn)
        .await?;
    trace!("🗃️ Inserted order row #{}", order.id);
    Ok(order)
}

/// Inserts one line item. The stored `amount` is computed here and never recomputed afterwards.
pub async fn insert_order_item(
    order_id: OrderId,
    item: &NewOrderItem,
    conn: &mut SqliteConnection,
) -> Result<i64, SqliteDatabaseError> {
    let amount = item
        .amount()
        .ok_or_else(|| SqliteDatabaseError::QueryError(format!("The amount for '{}' is out of range", item.name)))?;
    let id = sqlx::query_scalar::<_, i64>(
        r#"
            INSERT INTO order_items (order_id, product_id, name, unit, qty, price, amount)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id;
        "#,
    )
    .bind(order_id)
    .bind(item.product_id)
    .bind(&item.name)
    .bind(&item.unit)
    .bind(item.qty)
    .bind(item.price)
    .bind(amount)
    .fetch_one(conn)
    .await?;
    Ok(id)
}

pub async fn fetch_order(id: OrderId, conn: &mut SqliteConnection) -> Result<Option<Order>, SqliteDatabaseError> {
    let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1");
    let order = sqlx::query_as::<_, Order>(&sql).bind(id).fetch_one(conn).await;
    match order {
        Err(sqlx::Error::RowNotFound) => Ok(None),
        Err(e) => Err(e.into()),
        Ok(o) => Ok(Some(o)),
    }
}

pub async fn fetch_order_items(
    id: OrderId,
    conn: &mut SqliteConnection,
) -> Result<Vec<OrderItem>, SqliteDatabaseError> {
    let items = sqlx::query_as::<_, OrderItem>(
        r#"
            SELECT id, order_id, product_id, name, unit, qty, price, amount
            FROM order_items
            WHERE order_id = $1
            ORDER BY id ASC
        "#,
    )
    .bind(id)
    .fetch_all(conn)
    .await?;
    Ok(items)
}

/// Fetches orders according to criteria specified in the `OrderQueryFilter`
///
/// Resulting orders are ordered by `id`, ascending unless `newest_first` is set.
pub async fn search_orders(
    query: OrderQueryFilter,
    conn: &mut SqliteConnection,
) -> Result<Vec<Order>, SqliteDatabaseError> {
    let mut builder = QueryBuilder::new(format!("SELECT {ORDER_COLUMNS} FROM orders"));
    if !query.is_empty() {
        builder.push(" WHERE ");
    }
    let mut where_clause = builder.separated(" AND ");
    if let Some(buyer_id) = query.buyer_id {
        where_clause.push("user_id = ");
        where_clause.push_bind_unseparated(buyer_id);
    }
    if !query.statuses.is_empty() {
        let statuses = query.statuses.iter().map(|s| format!("'{s}'")).collect::<Vec<String>>().join(",");
        where_clause.push(format!("status IN ({statuses})"));
    }
    if query.newest_first {
        builder.push(" ORDER BY id DESC");
    } else {
        builder.push(" ORDER BY id ASC");
    }
    if let Some(limit) = query.limit {
        builder.push(" LIMIT ");
        builder.push_bind(limit);
    }
    trace!("🗃️ Executing query: {}", builder.sql());
    let orders = builder.build_query_as::<Order>().fetch_all(conn).await?;
    trace!("🗃️ Result of search_orders: {}", orders.len());
    Ok(orders)
}

/// Check-and-set: the update only applies if the order is not already paid.
pub async fn mark_order_paid(id: OrderId, conn: &mut SqliteConnection) -> Result<DecisionOutcome, SqliteDatabaseError> {
    let paid = OrderStatusType::Paid.to_string();
    let result = sqlx::query("UPDATE orders SET status = $1 WHERE id = $2 AND status != $1")
        .bind(&paid)
        .bind(id)
        .execute(&mut *conn)
        .await?;
    if result.rows_affected() > 0 {
        debug!("🗃️ Order #{id} marked as paid");
        return Ok(DecisionOutcome::Applied);
    }
    let outcome = match fetch_order(id, conn).await? {
        Some(_) => DecisionOutcome::AlreadyHandled,
        None => DecisionOutcome::NotFound,
    };
    debug!("🗃️ Order #{id} was not updated to paid: {outcome:?}");
    Ok(outcome)
}
