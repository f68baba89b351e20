use actix::prelude::*;
use std::sync::Arc;

use crate::domain::order::{ItemState, NewOrder, Order, OrderError, OrderStore};
use crate::metrics::Metrics;

// ============================================================================
// Actor Messages
// ============================================================================

#[derive(Message)]
#[rtype(result = "Vec<Order>")]
pub struct ListOrders;

#[derive(Message)]
#[rtype(result = "Option<Order>")]
pub struct GetOrder {
    pub order_id: String,
}

#[derive(Message)]
#[rtype(result = "Order")]
pub struct CreateOrder {
    pub order: NewOrder,
}

#[derive(Message)]
#[rtype(result = "Result<Order, OrderError>")]
pub struct UpdateItemState {
    pub order_id: String,
    pub item_id: String,
    pub state: ItemState,
}

/// Debug only
#[derive(Message)]
#[rtype(result = "()")]
pub struct ClearOrders;

/// Debug only
#[derive(Message)]
#[rtype(result = "()")]
pub struct ReplaceOrders {
    pub orders: Vec<Order>,
}

// ============================================================================
// Order Actor - Single owner of the order store
// ============================================================================
//
// Every read and write goes through this mailbox, so mutations are applied
// one at a time. Handlers are synchronous; the store never does I/O.
//
// ============================================================================

pub struct OrderActor {
    store: OrderStore,
    metrics: Arc<Metrics>,
}

impl OrderActor {
    pub fn new(store: OrderStore, metrics: Arc<Metrics>) -> Self {
        Self { store, metrics }
    }

    fn publish_size(&self) {
        self.metrics.set_orders_in_store(self.store.len());
    }
}

impl Actor for OrderActor {
    type Context = Context<Self>;

    fn started(&mut self, _ctx: &mut Self::Context) {
        tracing::info!(
            orders = self.store.len(),
            policy = ?self.store.policy(),
            "OrderActor started"
        );
        self.publish_size();
    }
}

// ============================================================================
// Message Handlers
// ============================================================================

impl Handler<ListOrders> for OrderActor {
    type Result = MessageResult<ListOrders>;

    fn handle(&mut self, _msg: ListOrders, _: &mut Self::Context) -> Self::Result {
        MessageResult(self.store.list())
    }
}

impl Handler<GetOrder> for OrderActor {
    type Result = Option<Order>;

    fn handle(&mut self, msg: GetOrder, _: &mut Self::Context) -> Self::Result {
        self.store.get_by_id(&msg.order_id).cloned()
    }
}

impl Handler<CreateOrder> for OrderActor {
    type Result = MessageResult<CreateOrder>;

    fn handle(&mut self, msg: CreateOrder, _: &mut Self::Context) -> Self::Result {
        let order = self.store.create(msg.order);

        tracing::info!(
            order_id = %order.id,
            table = %order.table,
            item_count = order.items.len(),
            "Created order"
        );

        self.publish_size();
        MessageResult(order)
    }
}

impl Handler<UpdateItemState> for OrderActor {
    type Result = Result<Order, OrderError>;

    fn handle(&mut self, msg: UpdateItemState, _: &mut Self::Context) -> Self::Result {
        let result = self
            .store
            .update_item_state(&msg.order_id, &msg.item_id, msg.state)
            .cloned();

        match &result {
            Ok(_) => {
                tracing::info!(
                    order_id = %msg.order_id,
                    item_id = %msg.item_id,
                    state = %msg.state,
                    "Updated item state"
                );
                self.metrics.record_item_state_update(msg.state, "updated");
            }
            Err(e) => {
                tracing::warn!(
                    order_id = %msg.order_id,
                    item_id = %msg.item_id,
                    state = %msg.state,
                    error = %e,
                    "Item state update refused"
                );
                let outcome = if e.is_not_found() { "not_found" } else { "refused" };
                self.metrics.record_item_state_update(msg.state, outcome);
            }
        }

        result
    }
}

impl Handler<ClearOrders> for OrderActor {
    type Result = ();

    fn handle(&mut self, _: ClearOrders, _: &mut Self::Context) {
        tracing::warn!(orders = self.store.len(), "Clearing all orders");
        self.store.clear();
        self.publish_size();
    }
}

impl Handler<ReplaceOrders> for OrderActor {
    type Result = ();

    fn handle(&mut self, msg: ReplaceOrders, _: &mut Self::Context) {
        tracing::warn!(orders = msg.orders.len(), "Replacing all orders");
        self.store.replace(msg.orders);
        self.publish_size();
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
