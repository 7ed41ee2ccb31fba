use crate::error::ConfigError;
use crate::settings::Settings;
use config::builder::DefaultState;
use config::ConfigBuilder;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{AnalysisSettings, MarketDataSettings, ServerSettings};

/// Environment variables starting with this prefix override file settings,
/// e.g. `EQUITY_LENS__SERVER__PORT=8080`.
pub const ENV_PREFIX: &str = "EQUITY_LENS";

/// Loads the application configuration.
///
/// Sources are layered, later ones winning: built-in defaults, an optional `config.toml`
/// in the working directory, then `EQUITY_LENS__*` environment variables. The merged
/// result is deserialized into our strongly-typed `Settings` struct and validated.
pub fn load_settings() -> Result<Settings, ConfigError> {
    let builder = builder_with_defaults()?
        // Tells the builder to look for a file named `config.toml`, if present.
        .add_source(config::File::with_name("config").required(false))
        .add_source(environment());

    finish(builder)
}

/// The `EQUITY_LENS__SECTION__KEY` environment source. Values are parsed, so
/// `EQUITY_LENS__SERVER__PORT=8080` arrives as a number.
pub fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

/// The defaults reproduce the reference deployment: all interfaces on port 80,
/// Yahoo Finance as the data provider and the S&P 500 as the beta benchmark.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let builder = config::Config::builder()
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 80)?
        .set_default("market_data.chart_base_url", "https://query1.finance.yahoo.com")?
        .set_default("market_data.timeseries_base_url", "https://query2.finance.yahoo.com")?
        .set_default(
            "market_data.user_agent",
            "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36",
        )?
        .set_default("market_data.request_timeout", "10s")?
        .set_default("analysis.benchmark_symbol", "^GSPC")?
        .set_default("analysis.history_range", "1y")?
        .set_default("analysis.beta_alignment", "positional")?;

    Ok(builder)
}

/// Builds, deserializes and validates the layered configuration.
pub fn finish(builder: ConfigBuilder<DefaultState>) -> Result<Settings, ConfigError> {
    // Attempt to deserialize the entire configuration into our `Settings` struct
    let settings = builder.build()?.try_deserialize::<Settings>()?;
    settings.validate()?;

    tracing::debug!(?settings, "Configuration loaded.");
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::{File, FileFormat};
    use core_types::BetaAlignment;
    use std::collections::HashMap;
    use std::time::Duration;

    #[test]
    fn defaults_bind_all_interfaces_on_port_80() {
        let settings = finish(builder_with_defaults().unwrap()).unwrap();

        assert_eq!(settings.server.socket_addr().unwrap().to_string(), "0.0.0.0:80");
        assert_eq!(settings.analysis.benchmark_symbol, "^GSPC");
        assert_eq!(settings.analysis.history_range, "1y");
        assert_eq!(settings.analysis.beta_alignment, BetaAlignment::Positional);
        assert_eq!(settings.market_data.request_timeout, Duration::from_secs(10));
    }

    #[test]
    fn file_values_override_defaults() {
        let toml = r#"
            [server]
            host = "127.0.0.1"
            port = 8080

            [market_data]
            request_timeout = "2s 500ms"

            [analysis]
            benchmark_symbol = "^NDX"
            beta_alignment = "by_date"
        "#;
        let builder = builder_with_defaults()
            .unwrap()
            .add_source(File::from_str(toml, FileFormat::Toml));

        let settings = finish(builder).unwrap();

        assert_eq!(settings.server.socket_addr().unwrap().to_string(), "127.0.0.1:8080");
        assert_eq!(settings.market_data.request_timeout, Duration::from_millis(2500));
        assert_eq!(settings.analysis.benchmark_symbol, "^NDX");
        assert_eq!(settings.analysis.beta_alignment, BetaAlignment::ByDate);
        // Untouched keys keep their defaults.
        assert_eq!(settings.analysis.history_range, "1y");
    }

    #[test]
    fn environment_overrides_file_and_defaults() {
        let variables = HashMap::from([
            ("EQUITY_LENS__SERVER__PORT".to_string(), "8081".to_string()),
            ("EQUITY_LENS__MARKET_DATA__REQUEST_TIMEOUT".to_string(), "3s".to_string()),
            ("UNRELATED__SERVER__PORT".to_string(), "9999".to_string()),
        ]);
        let builder = builder_with_defaults()
            .unwrap()
            .add_source(File::from_str("[server]\nport = 8080\n", FileFormat::Toml))
            .add_source(environment().source(Some(variables)));

        let settings = finish(builder).unwrap();

        assert_eq!(settings.server.port, 8081);
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.market_data.request_timeout, Duration::from_secs(3));
    }

    #[test]
    fn empty_benchmark_is_rejected() {
        let builder = builder_with_defaults()
            .unwrap()
            .set_override("analysis.benchmark_symbol", "")
            .unwrap();

        assert!(matches!(finish(builder), Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn host_must_be_an_ip_address() {
        let builder = builder_with_defaults()
            .unwrap()
            .set_override("server.host", "not a host")
            .unwrap();

        assert!(matches!(finish(builder), Err(ConfigError::ValidationError(_))));
    }
}
