use std::path::Path;

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};

use crate::config::AppConfig;
use crate::error::ConfigError;

/// Prefix for nested overrides, e.g. `CHAIN_ETL_DATABASE__URL`.
pub const ENV_PREFIX: &str = "CHAIN_ETL_";

/// Environment variable holding the upstream API key.
pub const API_KEY_ENV: &str = "API_KEY";

/// Environment variable holding the database password.
pub const DB_PASSWORD_ENV: &str = "APP_DB_PASS";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads application configuration by merging TOML, prefixed environment
    /// variables and the two credential variables.
    ///
    /// A missing TOML file is not an error; every section has defaults.
    /// Credentials are not checked here, call `AppConfig::validate`.
    ///
    /// # Errors
    ///
    /// Returns an error if a source cannot be parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<AppConfig, ConfigError> {
        let config: AppConfig = Self::figment(path)
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .merge(Env::raw().only(&[API_KEY_ENV]).map(|_| "api.api_key".into()))
            .merge(
                Env::raw()
                    .only(&[DB_PASSWORD_ENV])
                    .map(|_| "database.password".into()),
            )
            .extract()?;

        tracing::debug!(tickers = ?config.tickers, "configuration loaded");

        Ok(config)
    }

    /// Loads configuration from the TOML file alone, ignoring the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be parsed.
    pub fn load_file(path: impl AsRef<Path>) -> Result<AppConfig, ConfigError> {
        Ok(Self::figment(path).extract()?)
    }

    fn figment(path: impl AsRef<Path>) -> Figment {
        Figment::new().merge(Toml::file(path.as_ref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LoadMode;
    use figment::Jail;
    use secrecy::ExposeSecret;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = ConfigLoader::load_file("does/not/exist/Config.toml").unwrap();
        assert_eq!(config.tickers, vec!["FB", "GOOG"]);
        assert!(config.api.api_key.is_none());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let file = write_config(
            r#"
tickers = ["AAPL", "MSFT", "BRK.B"]

[api]
api_key = "file-key"
window_days = 30

[database]
url = "postgresql://etl@db:5432/chains"
password = "secret"

[schedule]
cron = "0 0 * * * *"
retries = 3

[load]
mode = "batch"
"#,
        );

        let config = ConfigLoader::load_file(file.path()).unwrap();
        assert_eq!(config.tickers, vec!["AAPL", "MSFT", "BRK.B"]);
        assert_eq!(config.api.window_days, 30);
        assert_eq!(config.api.strike_count, 50);
        assert_eq!(config.database.url, "postgresql://etl@db:5432/chains");
        assert_eq!(config.schedule.cron, "0 0 * * * *");
        assert_eq!(config.schedule.retries, 3);
        assert_eq!(config.schedule.timezone, "America/New_York");
        assert_eq!(config.load.mode, LoadMode::Batch);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_malformed_file_is_error() {
        let file = write_config("tickers = 42\n");
        assert!(matches!(
            ConfigLoader::load_file(file.path()),
            Err(ConfigError::Load(_))
        ));
    }

    #[test]
    fn test_unknown_load_mode_is_error() {
        let file = write_config("[load]\nmode = \"bulk\"\n");
        assert!(ConfigLoader::load_file(file.path()).is_err());
    }

    // ==== Environment Tests ====

    const FILE_WITH_CREDENTIALS: &str = r#"
tickers = ["AAPL"]

[api]
api_key = "file-key"

[database]
url = "postgresql://etl@file-host:5432/chains"
password = "file-pass"
"#;

    #[test]
    fn test_credential_env_vars_override_file() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            jail.create_file("Config.toml", FILE_WITH_CREDENTIALS)?;
            jail.set_env("API_KEY", "env-key");
            jail.set_env("APP_DB_PASS", "env-pass");

            let config = ConfigLoader::load("Config.toml").map_err(|e| e.to_string())?;

            assert_eq!(config.api.api_key().unwrap().expose_secret(), "env-key");
            assert_eq!(config.database.password().unwrap().expose_secret(), "env-pass");
            assert_eq!(config.database.url, "postgresql://etl@file-host:5432/chains");
            assert!(config.validate().is_ok());
            Ok(())
        });
    }

    #[test]
    fn test_credentials_from_env_without_file() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            jail.set_env("API_KEY", "env-key");
            jail.set_env("APP_DB_PASS", "env-pass");

            let config = ConfigLoader::load("missing.toml").map_err(|e| e.to_string())?;

            assert_eq!(config.api.api_key.as_deref(), Some("env-key"));
            assert_eq!(config.database.password.as_deref(), Some("env-pass"));
            assert_eq!(config.tickers, vec!["FB", "GOOG"]);
            assert!(config.validate().is_ok());
            Ok(())
        });
    }

    #[test]
    fn test_prefixed_env_vars_override_nested_keys() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            jail.create_file("Config.toml", FILE_WITH_CREDENTIALS)?;
            jail.set_env("CHAIN_ETL_DATABASE__URL", "postgresql://etl@env-host/db");
            jail.set_env("CHAIN_ETL_SCHEDULE__RETRIES", 4);
            jail.set_env("CHAIN_ETL_LOAD__MODE", "batch");
            jail.set_env("CHAIN_ETL_TICKERS", "[\"MSFT\", \"BRK.B\"]");

            let config = ConfigLoader::load("Config.toml").map_err(|e| e.to_string())?;

            assert_eq!(config.database.url, "postgresql://etl@env-host/db");
            assert_eq!(config.schedule.retries, 4);
            assert_eq!(config.load.mode, LoadMode::Batch);
            assert_eq!(config.tickers, vec!["MSFT", "BRK.B"]);
            assert_eq!(config.api.api_key.as_deref(), Some("file-key"));
            Ok(())
        });
    }

    #[test]
    fn test_env_is_ignored_by_load_file() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            jail.set_env("API_KEY", "env-key");
            jail.set_env("CHAIN_ETL_DATABASE__URL", "postgresql://etl@env-host/db");

            let config = ConfigLoader::load_file("missing.toml").map_err(|e| e.to_string())?;

            assert!(config.api.api_key.is_none());
            assert_ne!(config.database.url, "postgresql://etl@env-host/db");
            Ok(())
        });
    }

    #[test]
    fn test_missing_credential_env_fails_validation() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            jail.set_env("API_KEY", "env-key");

            let config = ConfigLoader::load("missing.toml").map_err(|e| e.to_string())?;

            assert!(matches!(
                config.validate(),
                Err(ConfigError::MissingCredential("APP_DB_PASS"))
            ));
            Ok(())
        });
    }
}
