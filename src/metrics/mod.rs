// Private module declaration
mod server;

use prometheus::{IntCounterVec, IntGauge, Opts, Registry};

use crate::domain::order::ItemState;

// Re-export for public API
pub use server::configure;

// ============================================================================
// Metrics Module - Prometheus metrics for observability
// ============================================================================
//
// Provides metrics for:
// - Order creation per entry point
// - Validation rejections per entry point
// - Item state updates by outcome
// - View cache hits, misses and invalidations
// - Current store size
//
// All metrics are registered with Prometheus and can be scraped via /metrics
// ============================================================================

/// Central metrics registry for the entire application
pub struct Metrics {
    registry: Registry,

    pub orders_created: IntCounterVec,
    pub validation_failures: IntCounterVec,
    pub item_state_updates: IntCounterVec,
    pub view_cache_events: IntCounterVec,
    pub orders_in_store: IntGauge,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let orders_created = IntCounterVec::new(
            Opts::new("orders_created_total", "Total orders created"),
            &["entry_point"],
        )?;
        registry.register(Box::new(orders_created.clone()))?;

        let validation_failures = IntCounterVec::new(
            Opts::new("order_validation_failures_total", "Order payloads rejected by validation"),
            &["entry_point"],
        )?;
        registry.register(Box::new(validation_failures.clone()))?;

        let item_state_updates = IntCounterVec::new(
            Opts::new("item_state_updates_total", "Item state update attempts"),
            &["state", "outcome"],
        )?;
        registry.register(Box::new(item_state_updates.clone()))?;

        let view_cache_events = IntCounterVec::new(
            Opts::new("view_cache_events_total", "Rendered page cache events"),
            &["event"],
        )?;
        registry.register(Box::new(view_cache_events.clone()))?;

        let orders_in_store = IntGauge::new("orders_in_store", "Orders currently held in memory")?;
        registry.register(Box::new(orders_in_store.clone()))?;

        Ok(Self {
            registry,
            orders_created,
            validation_failures,
            item_state_updates,
            view_cache_events,
            orders_in_store,
        })
    }

    /// Get the Prometheus registry for exposing metrics via HTTP
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn record_order_created(&self, entry_point: &str) {
        self.orders_created.with_label_values(&[entry_point]).inc();
    }

    pub fn record_validation_failure(&self, entry_point: &str) {
        self.validation_failures.with_label_values(&[entry_point]).inc();
    }

    pub fn record_item_state_update(&self, state: ItemState, outcome: &str) {
        self.item_state_updates
            .with_label_values(&[state.as_str(), outcome])
            .inc();
    }

    pub fn record_view_cache_event(&self, event: &str) {
        self.view_cache_events.with_label_values(&[event]).inc();
    }

    pub fn set_orders_in_store(&self, count: usize) {
        self.orders_in_store.set(count as i64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new().unwrap();
        assert!(!metrics.registry.gather().is_empty());
    }

    #[test]
    fn test_record_order_created() {
        let metrics = Metrics::new().unwrap();
        metrics.record_order_created("api");
        metrics.record_order_created("api");
        metrics.record_order_created("form");

        let gathered = metrics.registry.gather();
        let created = gathered.iter().find(|m| m.name() == "orders_created_total").unwrap();
        assert_eq!(created.metric.len(), 2);
    }

    #[test]
    fn test_record_item_state_update() {
        let metrics = Metrics::new().unwrap();
        metrics.record_item_state_update(ItemState::Delivered, "updated");

        let gathered = metrics.registry.gather();
        let updates = gathered.iter().find(|m| m.name() == "item_state_updates_total").unwrap();
        assert_eq!(updates.metric[0].counter.value, Some(1.0));
    }

    #[test]
    fn test_orders_in_store_gauge() {
        let metrics = Metrics::new().unwrap();
        metrics.set_orders_in_store(3);

        let gathered = metrics.registry.gather();
        let gauge = gathered.iter().find(|m| m.name() == "orders_in_store").unwrap();
        assert_eq!(gauge.metric[0].gauge.value, Some(3.0));
    }
}
