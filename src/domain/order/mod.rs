// ============================================================================
// Order Domain - Restaurant orders and their items
// ============================================================================
//
// This module contains ALL Order-specific code:
// - Value objects (Order, Item, ItemState, TransitionPolicy)
// - Commands (NewOrder, NewItem)
// - Errors (OrderError enum)
// - Validation (OrderSchema, Validator)
// - Store (OrderStore, the in-memory collection)
//
// ============================================================================

pub mod value_objects;
pub mod commands;
pub mod errors;
pub mod validation;
pub mod store;

// Re-export for convenience
pub use value_objects::*;
pub use commands::*;
pub use errors::*;
pub use validation::*;
pub use store::*;
