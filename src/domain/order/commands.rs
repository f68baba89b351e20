use serde::{Deserialize, Serialize};
use super::value_objects::ItemState;

// ============================================================================
// Order Commands - Validated user intent
// ============================================================================

/// One item as requested by the client, before the store assigns an id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewItem {
    pub name: String,
    pub price: f64,
    pub note: Option<String>,
    pub state: ItemState,
}

impl NewItem {
    pub fn new(name: impl Into<String>, price: f64) -> Self {
        Self {
            name: name.into(),
            price,
            note: None,
            state: ItemState::Pending,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// A normalized order creation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOrder {
    pub table: String,
    pub server_name: Option<String>,
    pub items: Vec<NewItem>,
    pub total: Option<f64>,
}

impl NewOrder {
    pub fn new(table: impl Into<String>, items: Vec<NewItem>) -> Self {
        Self {
            table: table.into(),
            server_name: None,
            items,
            total: None,
        }
    }

    pub fn with_total(mut self, total: f64) -> Self {
        self.total = Some(total);
        self
    }

    /// Sum of item prices
    pub fn items_total(&self) -> f64 {
        self.items.iter().map(|item| item.price).sum()
    }
}
