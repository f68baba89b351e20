// ============================================================================
// API Module
// ============================================================================
//
// HTTP surface of the service:
// - rest    - JSON endpoints under /api
// - actions - form-bound mutations returning an ActionResponse
// - pages   - server-rendered order pages, cached by the ViewCacheActor
//
// Every mutation goes through AppState, which validates, mutates through the
// OrderActor and then revalidates the affected pages.
//
// ============================================================================

mod actions;
mod error;
mod pages;
mod render;
mod rest;
mod state;

use actix_web::web;

pub use state::AppState;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.configure(rest::configure)
        .configure(actions::configure)
        .configure(pages::configure);
}
