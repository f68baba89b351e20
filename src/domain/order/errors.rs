use super::value_objects::ItemState;

// ============================================================================
// Order Business Rule Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OrderError {
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Item {item_id} not found in order {order_id}")]
    ItemNotFound { order_id: String, item_id: String },

    #[error("Item {item_id} cannot move from {from} to {to}")]
    ReverseTransition {
        item_id: String,
        from: ItemState,
        to: ItemState,
    },

    #[error("Invalid item state: {0}")]
    InvalidState(String),
}

impl OrderError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, OrderError::OrderNotFound(_) | OrderError::ItemNotFound { .. })
    }
}
