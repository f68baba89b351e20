use actix::prelude::*;
use serde_json::Value;
use std::sync::Arc;

use crate::actors::{
    CreateOrder, GetOrder, ListOrders, OrderActor, Revalidate, UpdateItemState, ViewCacheActor,
};
use crate::domain::order::{ItemState, Order, OrderStore, TransitionPolicy, Validator};
use crate::metrics::Metrics;

use super::error::ApiError;

// ============================================================================
// Application State - Shared by every handler
// ============================================================================
//
// Both mutation entry points (JSON API and form actions) go through
// create_order / update_item_state: validate, mutate through the order
// actor, then revalidate the affected views. Each entry point has its own
// validator.
//
// ============================================================================

/// Where a mutation came from; also the `entry_point` metrics label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryPoint {
    Api,
    Form,
}

impl EntryPoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryPoint::Api => "api",
            EntryPoint::Form => "form",
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub orders: Addr<OrderActor>,
    pub views: Addr<ViewCacheActor>,
    pub api_validator: Validator,
    pub form_validator: Validator,
    pub policy: TransitionPolicy,
    pub dev_routes: bool,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    /// Start the actors that own process state. Must run inside an actix system.
    pub fn start(
        store: OrderStore,
        api_validator: Validator,
        form_validator: Validator,
        dev_routes: bool,
        metrics: Arc<Metrics>,
    ) -> Self {
        let policy = store.policy();
        let orders = OrderActor::new(store, metrics.clone()).start();
        let views = ViewCacheActor::new(metrics.clone()).start();

        Self {
            orders,
            views,
            api_validator,
            form_validator,
            policy,
            dev_routes,
            metrics,
        }
    }

    pub async fn list_orders(&self) -> Result<Vec<Order>, ApiError> {
        Ok(self.orders.send(ListOrders).await?)
    }

    pub async fn get_order(&self, order_id: &str) -> Result<Option<Order>, ApiError> {
        Ok(self
            .orders
            .send(GetOrder {
                order_id: order_id.to_string(),
            })
            .await?)
    }

    /// Validate an untyped payload and store it. Rejections never reach the store.
    pub async fn create_order(&self, payload: &Value, entry_point: EntryPoint) -> Result<Order, ApiError> {
        let validator = match entry_point {
            EntryPoint::Api => &self.api_validator,
            EntryPoint::Form => &self.form_validator,
        };

        let new_order = validator.validate(payload).map_err(|failure| {
            tracing::info!(
                entry_point = entry_point.as_str(),
                mode = ?validator.mode(),
                reason = %failure.message,
                issues = failure.issues.len(),
                "Rejected order payload"
            );
            self.metrics.record_validation_failure(entry_point.as_str());
            ApiError::Validation(failure)
        })?;

        let order = self.orders.send(CreateOrder { order: new_order }).await?;
        self.metrics.record_order_created(entry_point.as_str());
        self.revalidate(&order.id).await;

        Ok(order)
    }

    pub async fn update_item_state(
        &self,
        order_id: &str,
        item_id: &str,
        state: ItemState,
    ) -> Result<Order, ApiError> {
        let order = self
            .orders
            .send(UpdateItemState {
                order_id: order_id.to_string(),
                item_id: item_id.to_string(),
                state,
            })
            .await??;

        self.revalidate(&order.id).await;
        Ok(order)
    }

    /// The mutation is already applied; a failed refresh only leaves a stale page
    async fn revalidate(&self, order_id: &str) {
        if let Err(e) = self.views.send(Revalidate::order(order_id)).await {
            tracing::warn!(order_id, error = %e, "Failed to revalidate views");
        }
    }

    pub async fn revalidate_all(&self) {
        if let Err(e) = self.views.send(Revalidate::all()).await {
            tracing::warn!(error = %e, "Failed to revalidate views");
        }
    }
}
