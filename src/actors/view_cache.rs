use actix::prelude::*;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;

use crate::metrics::Metrics;

// ============================================================================
// View Cache Actor - Rendered pages keyed by request path
// ============================================================================
//
// Pages are rendered on a miss and stored here. Mutations send Revalidate
// with the paths they touched; the next request re-renders from the store.
//
// ============================================================================

pub const ORDERS_PATH: &str = "/orders";

/// Paths whose rendering depends on the given order
pub fn order_paths(order_id: &str) -> Vec<String> {
    vec![ORDERS_PATH.to_string(), format!("{}/{}", ORDERS_PATH, order_id)]
}

#[derive(Debug, Clone)]
struct CachedPage {
    html: String,
    rendered_at: DateTime<Utc>,
}

// ============================================================================
// Messages
// ============================================================================

/// Result of a cache lookup. `generation` must be passed back with the
/// rendered page so that a page rendered before a revalidation is dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheLookup {
    pub html: Option<String>,
    pub generation: u64,
}

#[derive(Message)]
#[rtype(result = "CacheLookup")]
pub struct GetCachedPage {
    pub path: String,
}

#[derive(Message)]
#[rtype(result = "bool")]
pub struct StorePage {
    pub path: String,
    pub html: String,
    pub generation: u64,
}

/// Refresh signal sent after a successful mutation
#[derive(Message, Debug, Clone)]
#[rtype(result = "usize")]
pub struct Revalidate {
    pub paths: Vec<String>,
}

impl Revalidate {
    pub fn order(order_id: &str) -> Self {
        Self {
            paths: order_paths(order_id),
        }
    }

    pub fn all() -> Self {
        Self { paths: Vec::new() }
    }
}

// ============================================================================
// View Cache Actor
// ============================================================================

pub struct ViewCacheActor {
    pages: HashMap<String, CachedPage>,
    generation: u64,
    metrics: Arc<Metrics>,
}

impl ViewCacheActor {
    pub fn new(metrics: Arc<Metrics>) -> Self {
        Self {
            pages: HashMap::new(),
            generation: 0,
            metrics,
        }
    }
}

impl Actor for ViewCacheActor {
    type Context = Context<Self>;

    fn started(&mut self, _ctx: &mut Self::Context) {
        tracing::info!("ViewCacheActor started");
    }
}

impl Handler<GetCachedPage> for ViewCacheActor {
    type Result = MessageResult<GetCachedPage>;

    fn handle(&mut self, msg: GetCachedPage, _: &mut Self::Context) -> Self::Result {
        let html = match self.pages.get(&msg.path) {
            Some(page) => {
                tracing::trace!(path = %msg.path, rendered_at = %page.rendered_at, "View cache hit");
                self.metrics.record_view_cache_event("hit");
                Some(page.html.clone())
            }
            None => {
                self.metrics.record_view_cache_event("miss");
                None
            }
        };

        MessageResult(CacheLookup {
            html,
            generation: self.generation,
        })
    }
}

impl Handler<StorePage> for ViewCacheActor {
    type Result = MessageResult<StorePage>;

    fn handle(&mut self, msg: StorePage, _: &mut Self::Context) -> Self::Result {
        if msg.generation != self.generation {
            tracing::debug!(path = %msg.path, "Discarding page rendered before revalidation");
            return MessageResult(false);
        }

        self.pages.insert(
            msg.path,
            CachedPage {
                html: msg.html,
                rendered_at: Utc::now(),
            },
        );
        MessageResult(true)
    }
}

impl Handler<Revalidate> for ViewCacheActor {
    type Result = MessageResult<Revalidate>;

    /// An empty path list drops every cached page
    fn handle(&mut self, msg: Revalidate, _: &mut Self::Context) -> Self::Result {
        self.generation += 1;

        let removed = if msg.paths.is_empty() {
            let count = self.pages.len();
            self.pages.clear();
            count
        } else {
            msg.paths
                .iter()
                .filter(|path| self.pages.remove(path.as_str()).is_some())
                .count()
        };

        tracing::debug!(paths = ?msg.paths, removed, "Revalidated views");
        self.metrics.record_view_cache_event("invalidated");
        MessageResult(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start() -> Addr<ViewCacheActor> {
        ViewCacheActor::new(Arc::new(Metrics::new().unwrap())).start()
    }

    async fn get(cache: &Addr<ViewCacheActor>, path: &str) -> CacheLookup {
        cache
            .send(GetCachedPage { path: path.to_string() })
            .await
            .unwrap()
    }

    async fn render_and_store(cache: &Addr<ViewCacheActor>, path: &str) -> bool {
        let lookup = get(cache, path).await;
        cache
            .send(StorePage {
                path: path.to_string(),
                html: format!("<p>{}</p>", path),
                generation: lookup.generation,
            })
            .await
            .unwrap()
    }

    #[actix_web::test]
    async fn test_revalidate_order_drops_list_and_detail() {
        let cache = start();
        render_and_store(&cache, "/orders").await;
        render_and_store(&cache, "/orders/1").await;
        render_and_store(&cache, "/orders/2").await;

        let removed = cache.send(Revalidate::order("1")).await.unwrap();

        assert_eq!(removed, 2);
        assert!(get(&cache, "/orders").await.html.is_none());
        assert!(get(&cache, "/orders/1").await.html.is_none());
        assert_eq!(
            get(&cache, "/orders/2").await.html.as_deref(),
            Some("<p>/orders/2</p>")
        );
    }

    #[actix_web::test]
    async fn test_revalidate_all() {
        let cache = start();
        render_and_store(&cache, "/orders").await;
        render_and_store(&cache, "/orders/2").await;

        assert_eq!(cache.send(Revalidate::all()).await.unwrap(), 2);
        assert!(get(&cache, "/orders/2").await.html.is_none());
    }

    #[actix_web::test]
    async fn test_stale_render_is_discarded() {
        let cache = start();
        let lookup = get(&cache, "/orders").await;
        assert!(lookup.html.is_none());

        cache.send(Revalidate::order("p-1")).await.unwrap();

        let stored = cache
            .send(StorePage {
                path: "/orders".to_string(),
                html: "<p>stale</p>".to_string(),
                generation: lookup.generation,
            })
            .await
            .unwrap();

        assert!(!stored);
        assert!(get(&cache, "/orders").await.html.is_none());
    }

    #[test]
    fn test_order_paths() {
        assert_eq!(order_paths("p-1"), vec!["/orders", "/orders/p-1"]);
    }
}
