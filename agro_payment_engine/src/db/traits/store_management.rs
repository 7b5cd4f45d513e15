use crate::db_types::{BuyerId, Store};

#[allow(async_fn_in_trait)]
pub trait StoreManagement {
    type Error: std::error::Error;

    async fn fetch_store(&self, code: &str) -> Result<Option<Store>, Self::Error>;

    /// Saves the store (looked up by code or by name) as the buyer's fulfillment location. Returns `None`, and
    /// writes nothing, if there is no such store.
    async fn select_store(&self, buyer_id: BuyerId, store: &str) -> Result<Option<Store>, Self::Error>;

    /// The store code saved on the buyer's user row, if any. The store itself may since have been removed.
    async fn fetch_selected_store_code(&self, buyer_id: BuyerId) -> Result<Option<String>, Self::Error>;
}
