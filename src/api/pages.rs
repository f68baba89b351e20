use actix_web::{error::InternalError, http::header, http::StatusCode, web, HttpResponse};
use serde::Deserialize;

use crate::actors::{CacheLookup, GetCachedPage, StorePage, ORDERS_PATH};
use crate::domain::menu::MENU;

use super::actions::{
    create_order_action, update_item_state_action, ActionResponse, CreateOrderForm, ItemStateForm,
    FORM_PARSE_FAILED,
};
use super::error::ApiError;
use super::render;
use super::state::AppState;

// ============================================================================
// Pages - Server-rendered order list, detail and new-order form
// ============================================================================

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .service(
            web::resource("/orders")
                .app_data(form_config())
                .route(web::get().to(order_list))
                .route(web::post().to(submit_order)),
        )
        .route("/orders/new", web::get().to(new_order))
        .route("/orders/{order_id}", web::get().to(order_detail))
        .service(
            web::resource("/orders/{order_id}/items/{item_id}")
                .app_data(form_config())
                .route(web::post().to(submit_item_state)),
        );
}

/// Undecodable form bodies get an HTML error page
fn form_config() -> web::FormConfig {
    web::FormConfig::default().error_handler(|err, _req| {
        tracing::debug!(error = %err, "Rejected undecodable page form");
        let response = html(
            StatusCode::BAD_REQUEST,
            render::error_page("Formulario inválido", FORM_PARSE_FAILED),
        );
        InternalError::from_response(err, response).into()
    })
}

fn html(status: StatusCode, body: String) -> HttpResponse {
    HttpResponse::build(status)
        .content_type("text/html; charset=utf-8")
        .body(body)
}

fn see_other(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

fn error_page(e: ApiError) -> HttpResponse {
    use actix_web::ResponseError;

    if let ApiError::Internal(detail) = &e {
        tracing::error!(detail = %detail, "Page rendering failed");
    }
    html(e.status_code(), render::error_page("Error", &e.public_message()))
}

async fn index() -> HttpResponse {
    see_other(ORDERS_PATH)
}

/// Serve `path` from the view cache. On a miss the caller renders and hands
/// the page back through `store_page` with the returned generation.
async fn cached_page(state: &AppState, path: &str) -> Result<CacheLookup, ApiError> {
    Ok(state
        .views
        .send(GetCachedPage {
            path: path.to_string(),
        })
        .await?)
}

async fn store_page(state: &AppState, path: String, page: &str, generation: u64) -> Result<(), ApiError> {
    let stored = state
        .views
        .send(StorePage {
            path,
            html: page.to_string(),
            generation,
        })
        .await?;

    if !stored {
        tracing::debug!("Rendered page was stale, not cached");
    }
    Ok(())
}

async fn render_order_list(state: &AppState) -> Result<String, ApiError> {
    let lookup = cached_page(state, ORDERS_PATH).await?;
    if let Some(page) = lookup.html {
        return Ok(page);
    }

    let orders = state.list_orders().await?;
    let page = render::order_list(&orders);
    store_page(state, ORDERS_PATH.to_string(), &page, lookup.generation).await?;

    Ok(page)
}

async fn order_list(state: web::Data<AppState>) -> HttpResponse {
    match render_order_list(&state).await {
        Ok(page) => html(StatusCode::OK, page),
        Err(e) => error_page(e),
    }
}

async fn render_order_detail(state: &AppState, order_id: &str) -> Result<Option<String>, ApiError> {
    let path = format!("{}/{}", ORDERS_PATH, order_id);
    let lookup = cached_page(state, &path).await?;
    if let Some(page) = lookup.html {
        return Ok(Some(page));
    }

    let Some(order) = state.get_order(order_id).await? else {
        return Ok(None);
    };
    let page = render::order_detail(&order, state.policy);
    store_page(state, path, &page, lookup.generation).await?;

    Ok(Some(page))
}

async fn order_detail(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let order_id = path.into_inner();

    match render_order_detail(&state, &order_id).await {
        Ok(Some(page)) => html(StatusCode::OK, page),
        Ok(None) => {
            tracing::debug!(order_id = %order_id, "Order page requested for unknown id");
            html(
                StatusCode::NOT_FOUND,
                render::error_page("Pedido no encontrado", &format!("Order not found: {}", order_id)),
            )
        }
        Err(e) => error_page(e),
    }
}

async fn new_order() -> HttpResponse {
    html(StatusCode::OK, render::new_order_form(MENU, None, None))
}

async fn submit_order(state: web::Data<AppState>, form: web::Form<CreateOrderForm>) -> HttpResponse {
    let form = form.into_inner();

    match create_order_action(&state, &form).await {
        ActionResponse::Success(order) => see_other(&format!("{}/{}", ORDERS_PATH, order.id)),
        ActionResponse::Failure(failure) => html(
            failure.kind.status_code(),
            render::new_order_form(MENU, Some(&failure), Some(&form)),
        ),
    }
}

#[derive(Debug, Deserialize)]
struct StateField {
    state: Option<String>,
}

async fn submit_item_state(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
    form: web::Form<StateField>,
) -> HttpResponse {
    let (order_id, item_id) = path.into_inner();
    let form = ItemStateForm {
        order_id: Some(order_id.clone()),
        item_id: Some(item_id),
        state: form.into_inner().state,
    };

    match update_item_state_action(&state, &form).await {
        ActionResponse::Success(_) => see_other(&format!("{}/{}", ORDERS_PATH, order_id)),
        ActionResponse::Failure(failure) => html(
            failure.kind.status_code(),
            render::error_page("No se pudo actualizar el item", &failure.message),
        ),
    }
}
