use sqlx::SqliteConnection;

use crate::{db::sqlite::SqliteDatabaseError, db_types::Store};

pub async fn fetch_store(code: &str, conn: &mut SqliteConnection) -> Result<Option<Store>, SqliteDatabaseError> {
    let store = sqlx::query_as::<_, Store>("SELECT code, name, address FROM stores WHERE code = $1")
        .bind(code)
        .fetch_optional(conn)
        .await?;
    Ok(store)
}

/// Matches on the store code first, then on the display name.
pub async fn fetch_store_by_code_or_name(
    code_or_name: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Store>, SqliteDatabaseError> {
    let store = sqlx::query_as::<_, Store>(
        r#"
            SELECT code, name, address FROM stores
            WHERE code = $1 OR name = $1
            ORDER BY (code = $1) DESC, id ASC
            LIMIT 1
        "#,
    )
    .bind(code_or_name)
    .fetch_optional(conn)
    .await?;
    Ok(store)
}
