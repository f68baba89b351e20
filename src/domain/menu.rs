use serde::Serialize;

/// A dish the new-order form can pick from
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MenuEntry {
    pub name: &'static str,
    pub price: f64,
}

pub const MENU: &[MenuEntry] = &[
    MenuEntry { name: "Hamburguesa Clásica", price: 8.99 },
    MenuEntry { name: "Pizza Margherita", price: 12.50 },
    MenuEntry { name: "Ensalada César", price: 7.75 },
    MenuEntry { name: "Pasta Carbonara", price: 10.25 },
    MenuEntry { name: "Sushi Roll", price: 15.99 },
    MenuEntry { name: "Tacos Mexicanos", price: 9.50 },
    MenuEntry { name: "Pollo a la Parrilla", price: 11.75 },
    MenuEntry { name: "Sándwich Club", price: 6.99 },
    MenuEntry { name: "Sopa del Día", price: 5.25 },
    MenuEntry { name: "Batido de Fresa", price: 4.50 },
    MenuEntry { name: "Café Espresso", price: 2.75 },
    MenuEntry { name: "Té Verde", price: 3.00 },
    MenuEntry { name: "Agua Mineral", price: 1.50 },
    MenuEntry { name: "Refresco Cola", price: 2.25 },
    MenuEntry { name: "Jugo Natural", price: 3.50 },
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::{Validator, ValidationMode};
    use serde_json::json;

    #[test]
    fn test_menu_entries_pass_strict_validation() {
        let items: Vec<_> = MENU
            .iter()
            .map(|entry| json!({ "name": entry.name, "price": entry.price }))
            .collect();

        let order = Validator::new(ValidationMode::Strict)
            .validate(&json!({ "table": "Mesa 9", "items": items }))
            .unwrap();

        assert_eq!(order.items.len(), MENU.len());
    }
}
