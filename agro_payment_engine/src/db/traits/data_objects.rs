use serde::{Deserialize, Serialize};

use crate::db_types::{BuyerId, OrderStatusType};

/// The result of a check-and-set status transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecisionOutcome {
    /// The row was in the expected state and has been updated.
    Applied,
    /// The row exists, but a previous decision already moved it out of the expected state. Nothing was written.
    AlreadyHandled,
    /// There is no row with the given id.
    NotFound,
}

impl DecisionOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, DecisionOutcome::Applied)
    }
}

#[derive(Debug, Clone, Default)]
pub struct OrderQueryFilter {
    pub buyer_id: Option<BuyerId>,
    pub statuses: Vec<OrderStatusType>,
    pub limit: Option<i64>,
    pub newest_first: bool,
}

impl OrderQueryFilter {
    pub fn with_buyer_id(mut self, buyer_id: BuyerId) -> Self {
        self.buyer_id = Some(buyer_id);
        self
    }

    pub fn with_status(mut self, status: OrderStatusType) -> Self {
        self.statuses.push(status);
        self
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn newest_first(mut self) -> Self {
        self.newest_first = true;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.buyer_id.is_none() && self.statuses.is_empty()
    }
}
