// ============================================================================
// Actors Module
// ============================================================================
//
// Process-wide state lives behind actor mailboxes:
// - OrderActor     - sole owner of the order store
// - ViewCacheActor - rendered pages, invalidated by the refresh signal
//
// ============================================================================

mod order_actor;
mod view_cache;

pub use order_actor::{
    ClearOrders, CreateOrder, GetOrder, ListOrders, OrderActor, ReplaceOrders, UpdateItemState,
};
pub use view_cache::{
    CacheLookup, GetCachedPage, Revalidate, StorePage, ViewCacheActor, ORDERS_PATH,
};
