//! JSON endpoints under `/api`.

use actix_web::{http::header, web, HttpResponse};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::actors::{ClearOrders, ReplaceOrders};
use crate::domain::menu::MENU;
use crate::domain::order::{ItemState, Order};

use super::error::ApiError;
use super::state::{AppState, EntryPoint};

pub const MISSING_FIELDS: &str = "missing required fields";
pub const INVALID_JSON: &str = "request body must be valid JSON";

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/orders", web::get().to(list_orders))
            .route("/orders", web::post().to(create_order))
            .route("/orders", web::delete().to(clear_orders))
            .route("/orders", web::put().to(replace_orders))
            .route("/orders/{order_id}", web::get().to(get_order))
            .route(
                "/orders/{order_id}/items/{item_id}",
                web::patch().to(update_item_state),
            )
            .route("/menu", web::get().to(menu)),
    );
}

async fn list_orders(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let orders = state.list_orders().await?;
    Ok(HttpResponse::Ok().json(orders))
}

async fn get_order(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let order_id = path.into_inner();

    match state.get_order(&order_id).await? {
        Some(order) => Ok(HttpResponse::Ok().json(order)),
        None => Err(ApiError::NotFound(format!("Order not found: {}", order_id))),
    }
}

/// Bodies are read as raw bytes so that malformed JSON gets our error shape
fn parse_body<T: DeserializeOwned>(body: &web::Bytes) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| {
        tracing::debug!(error = %e, "Rejected malformed JSON body");
        ApiError::BadRequest(INVALID_JSON.to_string())
    })
}

async fn create_order(
    state: web::Data<AppState>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    let payload: Value = parse_body(&body)?;

    let order = state.create_order(&payload, EntryPoint::Api).await?;

    Ok(HttpResponse::Created()
        .insert_header((header::LOCATION, format!("/api/orders/{}", order.id)))
        .json(order))
}

#[derive(Debug, Deserialize)]
struct StatePatch {
    state: Option<String>,
}

async fn update_item_state(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    let (order_id, item_id) = path.into_inner();
    let patch: StatePatch = parse_body(&body)?;

    let raw_state = patch
        .state
        .ok_or_else(|| ApiError::BadRequest(MISSING_FIELDS.to_string()))?;
    let item_state: ItemState = raw_state.parse()?;

    let order = state.update_item_state(&order_id, &item_id, item_state).await?;
    Ok(HttpResponse::Ok().json(order))
}

/// Debug only, enabled with --dev-routes
async fn clear_orders(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    if !state.dev_routes {
        return Err(ApiError::NotFound("Not Found".to_string()));
    }

    state.orders.send(ClearOrders).await?;
    state.revalidate_all().await;
    Ok(HttpResponse::NoContent().finish())
}

/// Debug only, enabled with --dev-routes
async fn replace_orders(
    state: web::Data<AppState>,
    body: web::Json<Vec<Order>>,
) -> Result<HttpResponse, ApiError> {
    if !state.dev_routes {
        return Err(ApiError::NotFound("Not Found".to_string()));
    }

    let orders = body.into_inner();
    tracing::warn!(count = orders.len(), "Replacing order store contents");
    state.orders.send(ReplaceOrders { orders }).await?;
    state.revalidate_all().await;
    Ok(HttpResponse::NoContent().finish())
}

async fn menu() -> HttpResponse {
    HttpResponse::Ok().json(MENU)
}
