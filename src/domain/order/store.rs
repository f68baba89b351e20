use std::collections::VecDeque;
use chrono::Utc;
use uuid::Uuid;

use super::commands::NewOrder;
use super::errors::OrderError;
use super::value_objects::{Item, ItemState, Order, TransitionPolicy};

// ============================================================================
// Order Store - In-memory collection of orders
// ============================================================================
//
// Newest order first. The store owns every Order and Item; callers get
// clones or shared references, never a mutable handle.
//
// ============================================================================

#[derive(Debug, Default)]
pub struct OrderStore {
    orders: VecDeque<Order>,
    policy: TransitionPolicy,
}

fn generate_id(prefix: &str) -> String {
    format!("{}{}", prefix, Uuid::new_v4())
}

impl OrderStore {
    pub fn new(policy: TransitionPolicy) -> Self {
        Self {
            orders: VecDeque::new(),
            policy,
        }
    }

    /// Store pre-populated with the two demo orders
    pub fn seeded(policy: TransitionPolicy) -> Self {
        let mut store = Self::new(policy);
        store.replace(seed_orders());
        store
    }

    pub fn policy(&self) -> TransitionPolicy {
        self.policy
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// All orders, most recently created first
    pub fn list(&self) -> Vec<Order> {
        self.orders.iter().cloned().collect()
    }

    pub fn get_by_id(&self, id: &str) -> Option<&Order> {
        self.orders.iter().find(|order| order.id == id)
    }

    /// Assign ids, compute the total when absent and insert at the front
    pub fn create(&mut self, input: NewOrder) -> Order {
        let total = input.total.unwrap_or_else(|| input.items_total());

        let items = input
            .items
            .into_iter()
            .map(|item| Item {
                id: generate_id("i-"),
                name: item.name,
                price: item.price,
                note: item.note,
                state: item.state,
            })
            .collect();

        let order = Order {
            id: generate_id("p-"),
            table: input.table,
            server_name: input.server_name,
            items,
            total,
            created_at: Utc::now(),
        };

        tracing::debug!(
            order_id = %order.id,
            table = %order.table,
            item_count = order.items.len(),
            total = order.total,
            "Order stored"
        );

        self.orders.push_front(order.clone());
        order
    }

    /// Set one item's state in place. The total is left untouched.
    pub fn update_item_state(
        &mut self,
        order_id: &str,
        item_id: &str,
        state: ItemState,
    ) -> Result<&Order, OrderError> {
        let policy = self.policy;

        let order = self
            .orders
            .iter_mut()
            .find(|order| order.id == order_id)
            .ok_or_else(|| OrderError::OrderNotFound(order_id.to_string()))?;

        let item = order
            .items
            .iter_mut()
            .find(|item| item.id == item_id)
            .ok_or_else(|| OrderError::ItemNotFound {
                order_id: order_id.to_string(),
                item_id: item_id.to_string(),
            })?;

        if !policy.allows(item.state, state) {
            return Err(OrderError::ReverseTransition {
                item_id: item_id.to_string(),
                from: item.state,
                to: state,
            });
        }

        item.state = state;
        Ok(&*order)
    }

    /// Debug only: drop every order
    pub fn clear(&mut self) {
        self.orders.clear();
    }

    /// Debug only: swap the whole collection, keeping the given order
    pub fn replace(&mut self, orders: Vec<Order>) {
        self.orders = orders.into();
    }
}

pub fn seed_orders() -> Vec<Order> {
    let now = Utc::now();

    vec![
        Order {
            id: "1".to_string(),
            table: "Mesa 1".to_string(),
            server_name: Some("Juan".to_string()),
            items: vec![
                Item {
                    id: "i-1".to_string(),
                    name: "Hamburguesa".to_string(),
                    price: 12000.0,
                    note: None,
                    state: ItemState::Pending,
                },
                Item {
                    id: "i-2".to_string(),
                    name: "Papas fritas".to_string(),
                    price: 8000.0,
                    note: None,
                    state: ItemState::Pending,
                },
            ],
            total: 20000.0,
            created_at: now,
        },
        Order {
            id: "2".to_string(),
            table: "Mesa 2".to_string(),
            server_name: Some("Maria".to_string()),
            items: vec![Item {
                id: "i-3".to_string(),
                name: "Ensalada".to_string(),
                price: 10000.0,
                note: None,
                state: ItemState::Delivered,
            }],
            total: 10000.0,
            created_at: now,
        },
    ]
}

// ============================================================================
// Unit Tests
// ============================================================================
