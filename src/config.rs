use clap::Parser;

use crate::domain::order::{OrderStore, TransitionPolicy, ValidationMode, Validator};

/// Command-line arguments for the order service.
/// Every flag can also be set through its `ORDERS_*` environment variable.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Address to bind the HTTP server to
    #[arg(long, env = "ORDERS_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to bind the HTTP server to
    #[arg(short, long, env = "ORDERS_PORT", default_value_t = 8080)]
    pub port: u16,

    /// How order payloads posted to /api/orders are validated
    #[arg(long, env = "ORDERS_VALIDATION", value_enum, default_value_t = ValidationMode::Lenient)]
    pub validation: ValidationMode,

    /// How the new-order form is validated
    #[arg(
        long,
        env = "ORDERS_FORM_VALIDATION",
        value_enum,
        default_value_t = ValidationMode::Strict
    )]
    pub form_validation: ValidationMode,

    /// Which item state transitions are allowed
    #[arg(
        long,
        env = "ORDERS_ITEM_TRANSITIONS",
        value_enum,
        default_value_t = TransitionPolicy::ForwardOnly
    )]
    pub item_transitions: TransitionPolicy,

    /// Start with an empty store instead of the sample orders
    #[arg(long, env = "ORDERS_NO_SEED")]
    pub no_seed: bool,

    /// Enable DELETE/PUT /api/orders
    #[arg(long, env = "ORDERS_DEV_ROUTES")]
    pub dev_routes: bool,

    /// Log filter used when RUST_LOG is not set
    #[arg(
        short,
        long,
        env = "ORDERS_LOG_LEVEL",
        default_value = "info,restaurant_orders=debug"
    )]
    pub log_level: String,
}

impl Config {
    pub fn store(&self) -> OrderStore {
        if self.no_seed {
            OrderStore::new(self.item_transitions)
        } else {
            OrderStore::seeded(self.item_transitions)
        }
    }

    pub fn api_validator(&self) -> Validator {
        Validator::new(self.validation)
    }

    pub fn form_validator(&self) -> Validator {
        Validator::new(self.form_validation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::try_parse_from(["restaurant_orders"]).unwrap();

        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.validation, ValidationMode::Lenient);
        assert_eq!(config.form_validator().mode(), ValidationMode::Strict);
        assert_eq!(config.item_transitions, TransitionPolicy::ForwardOnly);
        assert!(!config.dev_routes);
        assert_eq!(config.store().len(), 2);
    }

    #[test]
    fn test_flags() {
        let config = Config::try_parse_from([
            "restaurant_orders",
            "--port",
            "9000",
            "--validation",
            "strict",
            "--form-validation",
            "lenient",
            "--item-transitions",
            "reversible",
            "--no-seed",
            "--dev-routes",
        ])
        .unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.api_validator().mode(), ValidationMode::Strict);
        assert_eq!(config.form_validator().mode(), ValidationMode::Lenient);
        assert_eq!(config.store().policy(), TransitionPolicy::Reversible);
        assert!(config.store().is_empty());
        assert!(config.dev_routes);
    }

    #[test]
    fn test_rejects_unknown_mode() {
        assert!(Config::try_parse_from(["restaurant_orders", "--validation", "loose"]).is_err());
    }
}
