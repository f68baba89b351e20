//! Server-side HTML for the order pages.

use crate::domain::menu::MenuEntry;
use crate::domain::order::{Item, ItemState, Order, TransitionPolicy};

use super::actions::{ActionFailure, CreateOrderForm};

pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn money(amount: f64) -> String {
    format!("${:.2}", amount)
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"es\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{}</title>\n</head>\n<body>\n<nav><a href=\"/orders\">Pedidos</a> | \
         <a href=\"/orders/new\">Nuevo pedido</a></nav>\n<main>\n{}</main>\n</body>\n</html>\n",
        escape(title),
        body
    )
}

pub fn order_list(orders: &[Order]) -> String {
    let mut body = String::from("<h1>Pedidos</h1>\n");

    if orders.is_empty() {
        body.push_str("<p>No hay pedidos.</p>\n");
        return layout("Pedidos", &body);
    }

    body.push_str("<ul class=\"orders\">\n");
    for order in orders {
        body.push_str(&format!(
            "<li><a href=\"/orders/{id}\">{table}</a> {server} &middot; {count} items \
             ({pending} pendientes) &middot; {total}</li>\n",
            id = escape(&order.id),
            table = escape(&order.table),
            server = order
                .server_name
                .as_deref()
                .map(|name| format!("({})", escape(name)))
                .unwrap_or_default(),
            count = order.items.len(),
            pending = order.pending_count(),
            total = money(order.total),
        ));
    }
    body.push_str("</ul>\n");

    layout("Pedidos", &body)
}

fn item_row(order_id: &str, item: &Item, policy: TransitionPolicy) -> String {
    let next = match item.state {
        ItemState::Pending => Some((ItemState::Delivered, "Entregar")),
        ItemState::Delivered if policy == TransitionPolicy::Reversible => {
            Some((ItemState::Pending, "Marcar pendiente"))
        }
        ItemState::Delivered => None,
    };

    let button = next
        .map(|(state, label)| {
            format!(
                "<form method=\"post\" action=\"/orders/{}/items/{}\">\
                 <input type=\"hidden\" name=\"state\" value=\"{}\">\
                 <button type=\"submit\">{}</button></form>",
                escape(order_id),
                escape(&item.id),
                state,
                label
            )
        })
        .unwrap_or_default();

    let note = item
        .note
        .as_deref()
        .map(|note| format!(" <em>{}</em>", escape(note)))
        .unwrap_or_default();

    format!(
        "<li class=\"item {state}\">{name} &middot; {price}{note} &middot; {state}{button}</li>\n",
        state = item.state,
        name = escape(&item.name),
        price = money(item.price),
        note = note,
        button = button,
    )
}

pub fn order_detail(order: &Order, policy: TransitionPolicy) -> String {
    let mut body = String::from("<h1>Detalle del pedido</h1>\n");

    body.push_str(&format!("<p><strong>Mesa:</strong> {}</p>\n", escape(&order.table)));
    if let Some(server_name) = &order.server_name {
        body.push_str(&format!("<p><strong>Mesero:</strong> {}</p>\n", escape(server_name)));
    }
    body.push_str(&format!("<p><strong>Total:</strong> {}</p>\n", money(order.total)));
    body.push_str(&format!(
        "<p><strong>Creado:</strong> {}</p>\n",
        order.created_at.format("%Y-%m-%d %H:%M")
    ));

    body.push_str("<h2>Items</h2>\n<ul class=\"items\">\n");
    for item in &order.items {
        body.push_str(&item_row(&order.id, item, policy));
    }
    body.push_str("</ul>\n");

    layout(&format!("Pedido {}", order.table), &body)
}

const ITEM_PICKER_SCRIPT: &str = r#"<script>
(function () {
  var field = document.getElementById("items");
  var list = document.getElementById("selected");
  var items;
  try {
    items = JSON.parse(field.value || "[]");
  } catch (e) {
    items = [];
  }
  if (!Array.isArray(items)) {
    items = [];
  }
  function show(item) {
    var li = document.createElement("li");
    li.textContent = item.name + " - $" + Number(item.price).toFixed(2);
    list.appendChild(li);
  }
  items.forEach(show);
  document.querySelectorAll("button[data-name]").forEach(function (button) {
    button.addEventListener("click", function () {
      var item = { name: button.dataset.name, price: Number(button.dataset.price) };
      items.push(item);
      field.value = JSON.stringify(items);
      show(item);
    });
  });
})();
</script>
"#;

/// The form is re-rendered with the submitted values after a failed submit
pub fn new_order_form(
    menu: &[MenuEntry],
    failure: Option<&ActionFailure>,
    form: Option<&CreateOrderForm>,
) -> String {
    let mut body = String::from("<h1>Nuevo pedido</h1>\n");

    if let Some(failure) = failure {
        body.push_str(&format!("<p class=\"error\">{}</p>\n", escape(&failure.message)));
        if !failure.errors.is_empty() {
            body.push_str("<ul class=\"errors\">\n");
            for issue in &failure.errors {
                body.push_str(&format!(
                    "<li>{}: {}</li>\n",
                    escape(&issue.path.join(".")),
                    escape(&issue.message)
                ));
            }
            body.push_str("</ul>\n");
        }
    }

    let field = |value: Option<&String>| value.map(|v| escape(v)).unwrap_or_default();
    let table = field(form.and_then(|f| f.table.as_ref()));
    let server_name = field(form.and_then(|f| f.server_name.as_ref()));
    let items = form
        .and_then(|f| f.items.as_ref())
        .map(|v| escape(v))
        .unwrap_or_else(|| "[]".to_string());

    body.push_str(&format!(
        "<form method=\"post\" action=\"/orders\">\n\
         <input type=\"text\" name=\"table\" required placeholder=\"mesa\" value=\"{}\">\n\
         <input type=\"text\" name=\"server_name\" placeholder=\"mesero\" value=\"{}\">\n\
         <input type=\"hidden\" id=\"items\" name=\"items\" value=\"{}\">\n",
        table, server_name, items
    ));

    body.push_str("<div class=\"menu\">\n");
    for entry in menu {
        body.push_str(&format!(
            "<button type=\"button\" data-name=\"{name}\" data-price=\"{price}\">{name} - {label}</button>\n",
            name = escape(entry.name),
            price = entry.price,
            label = money(entry.price),
        ));
    }
    body.push_str("</div>\n<ul id=\"selected\"></ul>\n<button type=\"submit\">Crear</button>\n</form>\n");
    body.push_str(ITEM_PICKER_SCRIPT);

    layout("Nuevo pedido", &body)
}

pub fn error_page(title: &str, message: &str) -> String {
    layout(
        title,
        &format!("<h1>{}</h1>\n<p>{}</p>\n", escape(title), escape(message)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::actions::FailureKind;
    use crate::domain::menu::MENU;
    use crate::domain::order::{seed_orders, IssueCode, ValidationIssue};

    #[test]
    fn test_escape() {
        assert_eq!(escape("<b>\"Tom\" & 'Jerry'</b>"), "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;");
    }

    #[test]
    fn test_order_list() {
        let html = order_list(&seed_orders());
        assert!(html.contains("href=\"/orders/1\""));
        assert!(html.contains("Mesa 2"));
        assert!(html.contains("$20000.00"));

        assert!(order_list(&[]).contains("No hay pedidos"));
    }

    #[test]
    fn test_order_detail_buttons_follow_policy() {
        let orders = seed_orders();

        let html = order_detail(&orders[0], TransitionPolicy::ForwardOnly);
        assert_eq!(html.matches("value=\"delivered\"").count(), 2);

        let html = order_detail(&orders[1], TransitionPolicy::ForwardOnly);
        assert!(!html.contains("<form"));

        let html = order_detail(&orders[1], TransitionPolicy::Reversible);
        assert!(html.contains("action=\"/orders/2/items/i-3\""));
        assert!(html.contains("value=\"pending\""));
    }

    #[test]
    fn test_user_text_is_escaped() {
        let mut order = seed_orders().remove(0);
        order.table = "<script>alert(1)</script>".to_string();

        let html = order_detail(&order, TransitionPolicy::ForwardOnly);
        assert!(!html.contains("<script>alert"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_new_order_form_keeps_input_and_message() {
        let form = CreateOrderForm {
            table: Some("Mesa \"9\"".to_string()),
            items: Some(r#"[{"name":"Pizza","price":15}]"#.to_string()),
            ..Default::default()
        };
        let failure = ActionFailure {
            kind: FailureKind::Invalid,
            message: "invalid order data".to_string(),
            errors: vec![ValidationIssue {
                code: IssueCode::TooBig,
                message: "table must be at most 50 characters".to_string(),
                path: vec!["table".to_string()],
            }],
        };

        let html = new_order_form(MENU, Some(&failure), Some(&form));
        assert!(html.contains("<p class=\"error\">invalid order data</p>"));
        assert!(html.contains("<li>table: table must be at most 50 characters</li>"));
        assert!(html.contains("value=\"Mesa &quot;9&quot;\""));
        assert!(html.contains("value=\"[{&quot;name&quot;:&quot;Pizza&quot;,&quot;price&quot;:15}]\""));
        assert_eq!(html.matches("data-name=").count(), MENU.len());
    }

    #[test]
    fn test_item_picker_starts_from_submitted_items() {
        let html = new_order_form(MENU, None, None);
        assert!(html.contains("value=\"[]\""));
        assert!(html.contains("JSON.parse(field.value || \"[]\")"));
        assert!(html.contains("items.forEach(show)"));
    }
}
