//! Order Config

use clap::Args;
use orebi::orders::OrderSettings;

/// Per-deployment order metadata.
#[derive(Debug, Args)]
pub struct OrderConfig {
    /// Channel recorded as the order source
    #[arg(long, env = "ORDER_SOURCE", default_value = "web", global = true)]
    pub order_source: String,

    /// Locale recorded on orders
    #[arg(long, env = "ORDER_LOCALE", default_value = "en-IN", global = true)]
    pub order_locale: String,

    /// ISO 4217 currency code for order amounts
    #[arg(long, env = "ORDER_CURRENCY", default_value = "INR", global = true)]
    pub order_currency: String,
}

impl OrderConfig {
    #[must_use]
    pub fn settings(&self) -> OrderSettings {
        OrderSettings {
            source: self.order_source.clone(),
            locale: self.order_locale.clone(),
            currency: self.order_currency.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[derive(Debug, Parser)]
    struct Cli {
        #[command(flatten)]
        orders: OrderConfig,
    }

    #[test]
    fn defaults_match_order_settings() {
        let cli = Cli::parse_from(["orebi"]);

        assert_eq!(cli.orders.settings(), OrderSettings::default());
    }

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::parse_from(["orebi", "--order-source", "app", "--order-currency", "USD"]);
        let settings = cli.orders.settings();

        assert_eq!(settings.source, "app");
        assert_eq!(settings.currency, "USD");
        assert_eq!(settings.locale, "en-IN");
    }
}
