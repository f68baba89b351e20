use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use std::str::FromStr;

use super::errors::OrderError;

// ============================================================================
// Order Value Objects
// ============================================================================

/// Delivery progress of a single item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemState {
    #[default]
    #[serde(alias = "pendiente")]
    Pending,
    #[serde(alias = "entregado")]
    Delivered,
}

impl ItemState {
    /// Parse a state string, accepting the Spanish aliases used by the floor staff
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "pending" | "pendiente" => Some(ItemState::Pending),
            "delivered" | "entregado" => Some(ItemState::Delivered),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemState::Pending => "pending",
            ItemState::Delivered => "delivered",
        }
    }
}

impl std::fmt::Display for ItemState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemState {
    type Err = OrderError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        ItemState::parse(raw).ok_or_else(|| OrderError::InvalidState(raw.to_string()))
    }
}

/// Which item state changes the store accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum TransitionPolicy {
    /// pending -> delivered only; delivered is terminal
    #[default]
    ForwardOnly,
    /// Items may be toggled back to pending
    Reversible,
}

impl TransitionPolicy {
    pub fn allows(&self, from: ItemState, to: ItemState) -> bool {
        match (self, from, to) {
            (TransitionPolicy::ForwardOnly, ItemState::Delivered, ItemState::Pending) => false,
            _ => true,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Item {
    pub id: String,
    pub name: String,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default)]
    pub state: ItemState,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Order {
    pub id: String,
    pub table: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_name: Option<String>,
    pub items: Vec<Item>,
    pub total: f64,
    pub created_at: DateTime<Utc>,
}

impl Order {
    pub fn item(&self, item_id: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.id == item_id)
    }

    pub fn pending_count(&self) -> usize {
        self.items
            .iter()
            .filter(|item| item.state == ItemState::Pending)
            .count()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_state_parse_accepts_aliases() {
        assert_eq!(ItemState::parse("pending"), Some(ItemState::Pending));
        assert_eq!(ItemState::parse("pendiente"), Some(ItemState::Pending));
        assert_eq!(ItemState::parse("delivered"), Some(ItemState::Delivered));
        assert_eq!(ItemState::parse("entregado"), Some(ItemState::Delivered));
        assert_eq!(ItemState::parse("Delivered"), None);
        assert_eq!(ItemState::parse(""), None);

        assert_eq!("entregado".parse::<ItemState>(), Ok(ItemState::Delivered));
        assert_eq!(
            "served".parse::<ItemState>(),
            Err(OrderError::InvalidState("served".to_string()))
        );
    }

    #[test]
    fn test_item_state_serialization() {
        let json = serde_json::to_string(&ItemState::Delivered).unwrap();
        assert_eq!(json, "\"delivered\"");

        let parsed: ItemState = serde_json::from_str("\"pendiente\"").unwrap();
        assert_eq!(parsed, ItemState::Pending);
    }

    #[test]
    fn test_transition_policy() {
        let forward = TransitionPolicy::ForwardOnly;
        assert!(forward.allows(ItemState::Pending, ItemState::Delivered));
        assert!(forward.allows(ItemState::Delivered, ItemState::Delivered));
        assert!(!forward.allows(ItemState::Delivered, ItemState::Pending));

        let reversible = TransitionPolicy::Reversible;
        assert!(reversible.allows(ItemState::Delivered, ItemState::Pending));
    }

    #[test]
    fn test_order_serialization_omits_absent_fields() {
        let order = Order {
            id: "p-1".to_string(),
            table: "Mesa 3".to_string(),
            server_name: None,
            items: vec![Item {
                id: "i-1".to_string(),
                name: "Sopa del Día".to_string(),
                price: 5.25,
                note: None,
                state: ItemState::Pending,
            }],
            total: 5.25,
            created_at: Utc::now(),
        };

        let value = serde_json::to_value(&order).unwrap();
        assert!(value.get("server_name").is_none());
        assert!(value["items"][0].get("note").is_none());
        assert_eq!(value["items"][0]["state"], "pending");
        assert_eq!(order.pending_count(), 1);
        assert!(order.item("i-1").is_some());
        assert!(order.item("i-2").is_none());
    }
}
