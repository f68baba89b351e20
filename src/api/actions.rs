use actix_web::{error::InternalError, http::StatusCode, web, HttpResponse};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde::Deserialize;
use serde_json::{Map, Number, Value};

use crate::domain::order::{ItemState, Order, ValidationIssue};

use super::error::ApiError;
use super::rest::MISSING_FIELDS;
use super::state::{AppState, EntryPoint};

// ============================================================================
// Form Actions - Mutations bound to HTML forms
// ============================================================================
//
// Same pipeline as the JSON API, but the input arrives form-encoded with the
// item list serialized as JSON inside one field, and the outcome is a tagged
// ActionResponse instead of an HTTP error.
//
// ============================================================================

pub const FORM_PARSE_FAILED: &str = "could not parse the form data";
pub const INVALID_STATE: &str = "invalid state";
pub const NOT_FOUND: &str = "order or item not found";
pub const REVERSE_REFUSED: &str = "delivered items cannot go back to pending";
pub const CREATE_FAILED: &str = "internal error while creating the order";
pub const UPDATE_FAILED: &str = "internal error while updating the item state";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CreateOrderForm {
    pub table: Option<String>,
    pub server_name: Option<String>,
    /// JSON array of `{ name, price, note?, state? }`
    pub items: Option<String>,
    pub total: Option<String>,
}

impl CreateOrderForm {
    /// Decode the form into the JSON shape the validator reads
    pub fn to_payload(&self) -> Result<Value, serde_json::Error> {
        let mut payload = Map::new();

        payload.insert(
            "table".to_string(),
            Value::String(self.table.clone().unwrap_or_default()),
        );

        if let Some(server_name) = self.server_name.as_deref().filter(|s| !s.trim().is_empty()) {
            payload.insert("server_name".to_string(), Value::String(server_name.to_string()));
        }

        let raw_items = self
            .items
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or("[]");
        payload.insert("items".to_string(), serde_json::from_str(raw_items)?);

        if let Some(total) = self.total.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            // Unparseable totals stay strings so the validator decides
            let value = total
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number)
                .unwrap_or_else(|| Value::String(total.to_string()));
            payload.insert("total".to_string(), value);
        }

        Ok(Value::Object(payload))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ItemStateForm {
    pub order_id: Option<String>,
    pub item_id: Option<String>,
    pub state: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Invalid,
    NotFound,
    Conflict,
    Internal,
}

impl FailureKind {
    pub fn status_code(&self) -> StatusCode {
        match self {
            FailureKind::Invalid => StatusCode::BAD_REQUEST,
            FailureKind::NotFound => StatusCode::NOT_FOUND,
            FailureKind::Conflict => StatusCode::CONFLICT,
            FailureKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActionFailure {
    pub kind: FailureKind,
    pub message: String,
    pub errors: Vec<ValidationIssue>,
}

/// `{ success: true, order }` or `{ success: false, message, errors? }`
#[derive(Debug, Clone, PartialEq)]
pub enum ActionResponse {
    Success(Order),
    Failure(ActionFailure),
}

impl ActionResponse {
    pub fn failure(kind: FailureKind, message: impl Into<String>) -> Self {
        ActionResponse::Failure(ActionFailure {
            kind,
            message: message.into(),
            errors: Vec::new(),
        })
    }

    fn from_error(e: ApiError, internal_message: &str) -> Self {
        match e {
            ApiError::Validation(failure) => ActionResponse::Failure(ActionFailure {
                kind: FailureKind::Invalid,
                message: failure.message,
                errors: failure.issues,
            }),
            ApiError::BadRequest(message) => ActionResponse::failure(FailureKind::Invalid, message),
            ApiError::NotFound(_) => ActionResponse::failure(FailureKind::NotFound, NOT_FOUND),
            ApiError::Conflict(_) => ActionResponse::failure(FailureKind::Conflict, REVERSE_REFUSED),
            ApiError::Internal(detail) => {
                tracing::error!(detail = %detail, "Form action failed");
                ActionResponse::failure(FailureKind::Internal, internal_message)
            }
        }
    }
}

impl Serialize for ActionResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ActionResponse::Success(order) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("success", &true)?;
                map.serialize_entry("order", order)?;
                map.end()
            }
            ActionResponse::Failure(failure) => {
                let mut map = serializer.serialize_map(None)?;
                map.serialize_entry("success", &false)?;
                map.serialize_entry("message", &failure.message)?;
                if !failure.errors.is_empty() {
                    map.serialize_entry("errors", &failure.errors)?;
                }
                map.end()
            }
        }
    }
}

pub async fn create_order_action(state: &AppState, form: &CreateOrderForm) -> ActionResponse {
    let payload = match form.to_payload() {
        Ok(payload) => payload,
        Err(e) => {
            tracing::error!(error = %e, "Could not decode items field of order form");
            return ActionResponse::failure(FailureKind::Internal, FORM_PARSE_FAILED);
        }
    };

    match state.create_order(&payload, EntryPoint::Form).await {
        Ok(order) => ActionResponse::Success(order),
        Err(e) => ActionResponse::from_error(e, CREATE_FAILED),
    }
}

pub async fn update_item_state_action(state: &AppState, form: &ItemStateForm) -> ActionResponse {
    let present = |field: &Option<String>| {
        field
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    };

    let (Some(order_id), Some(item_id), Some(raw_state)) =
        (present(&form.order_id), present(&form.item_id), present(&form.state))
    else {
        return ActionResponse::failure(FailureKind::Invalid, MISSING_FIELDS);
    };

    let Ok(item_state) = raw_state.parse::<ItemState>() else {
        return ActionResponse::failure(FailureKind::Invalid, INVALID_STATE);
    };

    match state.update_item_state(&order_id, &item_id, item_state).await {
        Ok(order) => ActionResponse::Success(order),
        Err(e) => ActionResponse::from_error(e, UPDATE_FAILED),
    }
}

// ============================================================================
// HTTP binding - programmatic form submissions get the JSON result
// ============================================================================

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/actions")
            .app_data(form_config())
            .route("/create-order", web::post().to(create_order_handler))
            .route("/update-item-state", web::post().to(update_item_state_handler)),
    );
}

/// Undecodable form bodies still answer with the action failure shape
fn form_config() -> web::FormConfig {
    web::FormConfig::default().error_handler(|err, _req| {
        tracing::debug!(error = %err, "Rejected undecodable action form");
        let response = respond(ActionResponse::failure(FailureKind::Invalid, FORM_PARSE_FAILED));
        InternalError::from_response(err, response).into()
    })
}

fn respond(response: ActionResponse) -> HttpResponse {
    let status = match &response {
        ActionResponse::Success(_) => StatusCode::OK,
        ActionResponse::Failure(failure) => failure.kind.status_code(),
    };
    HttpResponse::build(status).json(response)
}

async fn create_order_handler(
    state: web::Data<AppState>,
    form: web::Form<CreateOrderForm>,
) -> HttpResponse {
    respond(create_order_action(&state, &form).await)
}

async fn update_item_state_handler(
    state: web::Data<AppState>,
    form: web::Form<ItemStateForm>,
) -> HttpResponse {
    respond(update_item_state_action(&state, &form).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::{OrderStore, TransitionPolicy, ValidationMode, Validator};
    use crate::metrics::Metrics;
    use serde_json::json;
    use std::sync::Arc;

    fn seeded_state(form_mode: ValidationMode, policy: TransitionPolicy) -> AppState {
        AppState::start(
            OrderStore::seeded(policy),
            Validator::new(ValidationMode::Lenient),
            Validator::new(form_mode),
            false,
            Arc::new(Metrics::new().unwrap()),
        )
    }

    fn form(table: &str, items: &str) -> CreateOrderForm {
        CreateOrderForm {
            table: Some(table.to_string()),
            items: Some(items.to_string()),
            ..Default::default()
        }
    }

    fn state_form(order_id: &str, item_id: &str, state: &str) -> ItemStateForm {
        ItemStateForm {
            order_id: Some(order_id.to_string()),
            item_id: Some(item_id.to_string()),
            state: Some(state.to_string()),
        }
    }

    #[test]
    fn test_form_payload_decoding() {
        let payload = CreateOrderForm {
            table: Some("Mesa 8".to_string()),
            server_name: Some("".to_string()),
            items: Some(r#"[{"name":"Té Verde","price":3}]"#.to_string()),
            total: Some(" 3 ".to_string()),
        }
        .to_payload()
        .unwrap();

        assert_eq!(
            payload,
            json!({ "table": "Mesa 8", "items": [{ "name": "Té Verde", "price": 3 }], "total": 3.0 })
        );

        let payload = CreateOrderForm::default().to_payload().unwrap();
        assert_eq!(payload, json!({ "table": "", "items": [] }));

        let payload = CreateOrderForm {
            total: Some("abc".to_string()),
            ..form("Mesa 1", "[]")
        }
        .to_payload()
        .unwrap();
        assert_eq!(payload["total"], "abc");
    }

    #[actix_web::test]
    async fn test_create_action_success() {
        let state = seeded_state(ValidationMode::Strict, TransitionPolicy::ForwardOnly);

        let response = create_order_action(
            &state,
            &CreateOrderForm {
                server_name: Some("Ana".to_string()),
                ..form("Mesa 5", r#"[{"name":"Pizza Margherita","price":12.5},{"name":"Agua Mineral","price":1.5}]"#)
            },
        )
        .await;

        let ActionResponse::Success(order) = response else {
            panic!("expected success");
        };
        assert_eq!(order.server_name.as_deref(), Some("Ana"));
        assert_eq!(order.total, 14.0);
        assert_eq!(state.list_orders().await.unwrap()[0].id, order.id);
    }

    #[actix_web::test]
    async fn test_create_action_malformed_items_is_generic_failure() {
        let state = seeded_state(ValidationMode::Strict, TransitionPolicy::ForwardOnly);

        let response = create_order_action(&state, &form("Mesa 5", "[{name: Pizza")).await;

        assert_eq!(response, ActionResponse::failure(FailureKind::Internal, FORM_PARSE_FAILED));
        assert_eq!(state.list_orders().await.unwrap().len(), 2);
    }

    #[actix_web::test]
    async fn test_create_action_validation_failure_carries_issues() {
        let state = seeded_state(ValidationMode::Strict, TransitionPolicy::ForwardOnly);

        let response = create_order_action(&state, &form("", "[]")).await;

        let ActionResponse::Failure(failure) = &response else {
            panic!("expected failure");
        };
        assert_eq!(failure.kind, FailureKind::Invalid);
        assert_eq!(failure.errors.len(), 2);

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["success"], false);
        assert_eq!(value["errors"][0]["path"], json!(["table"]));
        assert_eq!(state.list_orders().await.unwrap().len(), 2);
    }

    #[actix_web::test]
    async fn test_update_action() {
        let state = seeded_state(ValidationMode::Lenient, TransitionPolicy::ForwardOnly);

        let response = update_item_state_action(&state, &state_form("1", "i-1", "entregado")).await;
        let ActionResponse::Success(order) = &response else {
            panic!("expected success");
        };
        assert_eq!(order.item("i-1").unwrap().state, ItemState::Delivered);
        assert_eq!(order.item("i-2").unwrap().state, ItemState::Pending);

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["order"]["id"], "1");
    }

    #[actix_web::test]
    async fn test_update_action_failures() {
        let state = seeded_state(ValidationMode::Lenient, TransitionPolicy::ForwardOnly);

        let cases = [
            (state_form("1", " ", "delivered"), FailureKind::Invalid, MISSING_FIELDS),
            (ItemStateForm::default(), FailureKind::Invalid, MISSING_FIELDS),
            (state_form("1", "i-1", "served"), FailureKind::Invalid, INVALID_STATE),
            (state_form("7", "i-1", "delivered"), FailureKind::NotFound, NOT_FOUND),
            (state_form("2", "i-3", "pending"), FailureKind::Conflict, REVERSE_REFUSED),
        ];

        for (form, kind, message) in cases {
            let response = update_item_state_action(&state, &form).await;
            assert_eq!(response, ActionResponse::failure(kind, message));
        }
    }

    #[actix_web::test]
    async fn test_update_action_reversible_policy() {
        let state = seeded_state(ValidationMode::Lenient, TransitionPolicy::Reversible);

        let response = update_item_state_action(&state, &state_form("2", "i-3", "pending")).await;
        assert!(matches!(response, ActionResponse::Success(_)));
    }

    #[actix_web::test]
    async fn test_action_routes() {
        use actix_web::{test, App};

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(seeded_state(
                    ValidationMode::Lenient,
                    TransitionPolicy::ForwardOnly,
                )))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/actions/create-order")
            .set_form([("table", "Mesa 6"), ("items", r#"[{"name":"Sushi Roll","price":15.99}]"#)])
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["order"]["table"], "Mesa 6");

        let req = test::TestRequest::post()
            .uri("/actions/update-item-state")
            .set_form([("order_id", "1"), ("item_id", "i-1")])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], MISSING_FIELDS);
    }

    #[actix_web::test]
    async fn test_action_routes_reject_undecodable_forms() {
        use actix_web::{http::header, test, App};

        let state = seeded_state(ValidationMode::Strict, TransitionPolicy::ForwardOnly);
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state.clone()))
                .configure(configure),
        )
        .await;

        for uri in ["/actions/create-order", "/actions/update-item-state"] {
            let req = test::TestRequest::post()
                .uri(uri)
                .insert_header((header::CONTENT_TYPE, "application/json"))
                .set_payload(r#"{"table":"Mesa 1"}"#)
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{}", uri);

            let body: Value = test::read_body_json(resp).await;
            assert_eq!(body, json!({ "success": false, "message": FORM_PARSE_FAILED }));
        }

        assert_eq!(state.list_orders().await.unwrap().len(), 2);
    }

    #[actix_web::test]
    async fn test_create_action_rejects_empty_item_list() {
        let state = seeded_state(ValidationMode::Strict, TransitionPolicy::ForwardOnly);

        let response = create_order_action(&state, &form("Mesa 3", "[]")).await;

        let ActionResponse::Failure(failure) = &response else {
            panic!("expected failure");
        };
        assert_eq!(failure.kind, FailureKind::Invalid);
        assert_eq!(failure.errors.len(), 1);
        assert_eq!(failure.errors[0].path, vec!["items".to_string()]);
        assert_eq!(state.list_orders().await.unwrap().len(), 2);
    }
}
