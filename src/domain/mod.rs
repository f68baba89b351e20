// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// Plain data and synchronous rules. Nothing here knows about actors or HTTP;
// the actors layer owns the store and the api layer talks to the actors.
//
// ============================================================================

pub mod order;
pub mod menu;
