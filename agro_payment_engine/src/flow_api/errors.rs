use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum FlowError {
    /// The request was rejected before anything was written.
    #[error("{0}")]
    Validation(String),
    #[error("Database error: {0}")]
    Database(String),
    #[error("store not found")]
    StoreNotFound(String),
    #[error("Could not forward the receipt to the administrator: {0}")]
    Notification(String),
}

impl FlowError {
    pub fn database<E: std::error::Error>(e: E) -> Self {
        Self::Database(e.to_string())
    }
}
