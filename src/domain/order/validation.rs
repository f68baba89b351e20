use serde::Serialize;
use serde_json::{Map, Value};

use super::commands::{NewItem, NewOrder};
use super::value_objects::ItemState;

// ============================================================================
// Order Input Validation
// ============================================================================
//
// Turns an untyped JSON value (request body or decoded form) into a
// NewOrder. Both modes read the limits and field names from OrderSchema:
//
// - Lenient: first failing check wins, limits are not enforced, loosely
//   typed optional fields are dropped instead of rejected.
// - Strict: every issue is collected with a code and a field path, limits
//   and unknown keys are rejected.
//
// ============================================================================

/// Field names and limits shared by both validation modes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderSchema {
    pub order_fields: &'static [&'static str],
    pub item_fields: &'static [&'static str],
    pub table_max_len: usize,
    pub server_name_max_len: usize,
    pub min_items: usize,
    pub max_items: usize,
    pub item_name_max_len: usize,
    pub max_price: f64,
}

pub const ORDER_SCHEMA: OrderSchema = OrderSchema {
    order_fields: &["table", "server_name", "items", "total"],
    item_fields: &["name", "price", "note", "state"],
    table_max_len: 50,
    server_name_max_len: 100,
    min_items: 1,
    max_items: 50,
    item_name_max_len: 100,
    max_price: 1_000_000.0,
};

pub const TABLE_REQUIRED: &str = "table is required and must be text.";
pub const ITEMS_REQUIRED: &str = "items is required and must be an array.";
pub const STRICT_FAILURE: &str = "invalid order data";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ValidationMode {
    #[default]
    Lenient,
    Strict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    InvalidType,
    TooSmall,
    TooBig,
    InvalidEnumValue,
    UnrecognizedKeys,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationIssue {
    pub code: IssueCode,
    pub message: String,
    pub path: Vec<String>,
}

impl ValidationIssue {
    fn new(code: IssueCode, message: impl Into<String>, path: Vec<String>) -> Self {
        Self {
            code,
            message: message.into(),
            path,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[error("{message}")]
pub struct ValidationFailure {
    pub message: String,
    pub issues: Vec<ValidationIssue>,
}

impl ValidationFailure {
    fn single(code: IssueCode, message: impl Into<String>, path: Vec<String>) -> Self {
        let message = message.into();
        Self {
            issues: vec![ValidationIssue::new(code, message.clone(), path)],
            message,
        }
    }
}

fn field_path(segments: &[&str]) -> Vec<String> {
    segments.iter().map(|s| s.to_string()).collect()
}

fn item_path(index: usize, field: &str) -> Vec<String> {
    vec!["items".to_string(), index.to_string(), field.to_string()]
}

fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

/// Numbers pass through; strings are parsed after trimming
fn coerce_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) if !is_blank(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Validator {
    mode: ValidationMode,
    schema: OrderSchema,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(ValidationMode::default())
    }
}

impl Validator {
    pub fn new(mode: ValidationMode) -> Self {
        Self {
            mode,
            schema: ORDER_SCHEMA,
        }
    }

    pub fn mode(&self) -> ValidationMode {
        self.mode
    }

    pub fn validate(&self, input: &Value) -> Result<NewOrder, ValidationFailure> {
        match self.mode {
            ValidationMode::Lenient => self.validate_lenient(input),
            ValidationMode::Strict => self.validate_strict(input),
        }
    }

    // ------------------------------------------------------------------------
    // Lenient
    // ------------------------------------------------------------------------

    fn validate_lenient(&self, input: &Value) -> Result<NewOrder, ValidationFailure> {
        let table = input
            .get("table")
            .and_then(Value::as_str)
            .filter(|table| !is_blank(table))
            .ok_or_else(|| {
                ValidationFailure::single(IssueCode::InvalidType, TABLE_REQUIRED, field_path(&["table"]))
            })?;

        let raw_items = input.get("items").and_then(Value::as_array).ok_or_else(|| {
            ValidationFailure::single(IssueCode::InvalidType, ITEMS_REQUIRED, field_path(&["items"]))
        })?;

        let mut items = Vec::with_capacity(raw_items.len());
        for (index, raw) in raw_items.iter().enumerate() {
            items.push(Self::lenient_item(index, raw)?);
        }

        Ok(NewOrder {
            table: table.to_string(),
            server_name: input
                .get("server_name")
                .and_then(Value::as_str)
                .map(str::to_string),
            items,
            total: input.get("total").and_then(Value::as_f64),
        })
    }

    fn lenient_item(index: usize, raw: &Value) -> Result<NewItem, ValidationFailure> {
        let name = raw
            .get("name")
            .and_then(Value::as_str)
            .filter(|name| !is_blank(name))
            .ok_or_else(|| {
                ValidationFailure::single(
                    IssueCode::InvalidType,
                    format!("items[{}].name must be a non-empty string.", index),
                    item_path(index, "name"),
                )
            })?;

        let price = raw
            .get("price")
            .and_then(coerce_number)
            .filter(|price| *price >= 0.0)
            .ok_or_else(|| {
                ValidationFailure::single(
                    IssueCode::InvalidType,
                    format!("items[{}].price must be a number >= 0.", index),
                    item_path(index, "price"),
                )
            })?;

        // Anything but an explicit delivered state starts out pending
        let state = raw
            .get("state")
            .and_then(Value::as_str)
            .and_then(ItemState::parse)
            .unwrap_or_default();

        Ok(NewItem {
            name: name.to_string(),
            price,
            note: raw.get("note").and_then(Value::as_str).map(str::to_string),
            state,
        })
    }

    // ------------------------------------------------------------------------
    // Strict
    // ------------------------------------------------------------------------

    fn validate_strict(&self, input: &Value) -> Result<NewOrder, ValidationFailure> {
        let Some(object) = input.as_object() else {
            return Err(ValidationFailure {
                message: STRICT_FAILURE.to_string(),
                issues: vec![ValidationIssue::new(
                    IssueCode::InvalidType,
                    "order data must be an object",
                    Vec::new(),
                )],
            });
        };

        let mut issues = Vec::new();
        Self::check_keys(object, self.schema.order_fields, Vec::new(), &mut issues);

        let table = Self::check_text(
            object.get("table"),
            "table",
            self.schema.table_max_len,
            field_path(&["table"]),
            &mut issues,
        );

        let server_name = match object.get("server_name") {
            None => None,
            value => Self::check_text(
                value,
                "server_name",
                self.schema.server_name_max_len,
                field_path(&["server_name"]),
                &mut issues,
            ),
        };

        let items = match object.get("items") {
            Some(Value::Array(raw_items)) => {
                self.check_item_count(raw_items.len(), &mut issues);
                raw_items
                    .iter()
                    .enumerate()
                    .map(|(index, raw)| self.strict_item(index, raw, &mut issues))
                    .collect::<Vec<_>>()
                    .into_iter()
                    .collect::<Option<Vec<_>>>()
            }
            _ => {
                issues.push(ValidationIssue::new(
                    IssueCode::InvalidType,
                    ITEMS_REQUIRED,
                    field_path(&["items"]),
                ));
                None
            }
        };

        let total = match object.get("total") {
            None => None,
            Some(Value::Number(n)) => n.as_f64(),
            Some(_) => {
                issues.push(ValidationIssue::new(
                    IssueCode::InvalidType,
                    "total must be a number",
                    field_path(&["total"]),
                ));
                None
            }
        };

        match (table, items) {
            (Some(table), Some(items)) if issues.is_empty() => Ok(NewOrder {
                table,
                server_name,
                items,
                total,
            }),
            _ => Err(ValidationFailure {
                message: STRICT_FAILURE.to_string(),
                issues,
            }),
        }
    }

    fn strict_item(&self, index: usize, raw: &Value, issues: &mut Vec<ValidationIssue>) -> Option<NewItem> {
        let Some(object) = raw.as_object() else {
            issues.push(ValidationIssue::new(
                IssueCode::InvalidType,
                "each item must be an object",
                vec!["items".to_string(), index.to_string()],
            ));
            return None;
        };

        let issues_before = issues.len();
        Self::check_keys(
            object,
            self.schema.item_fields,
            vec!["items".to_string(), index.to_string()],
            issues,
        );

        let name = Self::check_text(
            object.get("name"),
            "name",
            self.schema.item_name_max_len,
            item_path(index, "name"),
            issues,
        );

        let price = match object.get("price") {
            Some(Value::Number(n)) => match n.as_f64() {
                Some(price) if price < 0.0 => {
                    issues.push(ValidationIssue::new(
                        IssueCode::TooSmall,
                        "price must be greater than or equal to 0",
                        item_path(index, "price"),
                    ));
                    None
                }
                Some(price) if price > self.schema.max_price => {
                    issues.push(ValidationIssue::new(
                        IssueCode::TooBig,
                        format!("price must not exceed {}", self.schema.max_price),
                        item_path(index, "price"),
                    ));
                    None
                }
                price => price,
            },
            _ => {
                issues.push(ValidationIssue::new(
                    IssueCode::InvalidType,
                    "price is required and must be a number",
                    item_path(index, "price"),
                ));
                None
            }
        };

        let note = match object.get("note") {
            None => None,
            Some(Value::String(note)) => Some(note.clone()),
            Some(_) => {
                issues.push(ValidationIssue::new(
                    IssueCode::InvalidType,
                    "note must be text",
                    item_path(index, "note"),
                ));
                None
            }
        };

        let state = match object.get("state") {
            None => ItemState::Pending,
            Some(value) => match value.as_str().and_then(ItemState::parse) {
                Some(state) => state,
                None => {
                    issues.push(ValidationIssue::new(
                        IssueCode::InvalidEnumValue,
                        "state must be 'pending' or 'delivered'",
                        item_path(index, "state"),
                    ));
                    ItemState::Pending
                }
            },
        };

        if issues.len() > issues_before {
            return None;
        }

        Some(NewItem {
            name: name?,
            price: price?,
            note,
            state,
        })
    }

    fn check_item_count(&self, count: usize, issues: &mut Vec<ValidationIssue>) {
        if count < self.schema.min_items {
            issues.push(ValidationIssue::new(
                IssueCode::TooSmall,
                format!("an order needs at least {} item", self.schema.min_items),
                field_path(&["items"]),
            ));
        } else if count > self.schema.max_items {
            issues.push(ValidationIssue::new(
                IssueCode::TooBig,
                format!("an order holds at most {} items", self.schema.max_items),
                field_path(&["items"]),
            ));
        }
    }

    fn check_text(
        value: Option<&Value>,
        field: &str,
        max_len: usize,
        path: Vec<String>,
        issues: &mut Vec<ValidationIssue>,
    ) -> Option<String> {
        match value {
            Some(Value::String(text)) if is_blank(text) => {
                issues.push(ValidationIssue::new(
                    IssueCode::TooSmall,
                    format!("{} must not be empty", field),
                    path,
                ));
                None
            }
            Some(Value::String(text)) if text.chars().count() > max_len => {
                issues.push(ValidationIssue::new(
                    IssueCode::TooBig,
                    format!("{} must be at most {} characters", field, max_len),
                    path,
                ));
                None
            }
            Some(Value::String(text)) => Some(text.clone()),
            _ => {
                issues.push(ValidationIssue::new(
                    IssueCode::InvalidType,
                    format!("{} is required and must be text", field),
                    path,
                ));
                None
            }
        }
    }

    fn check_keys(
        object: &Map<String, Value>,
        allowed: &[&str],
        path: Vec<String>,
        issues: &mut Vec<ValidationIssue>,
    ) {
        let unknown: Vec<&str> = object
            .keys()
            .map(String::as_str)
            .filter(|key| !allowed.contains(key))
            .collect();

        if !unknown.is_empty() {
            issues.push(ValidationIssue::new(
                IssueCode::UnrecognizedKeys,
                format!("unrecognized keys: {}", unknown.join(", ")),
                path,
            ));
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
