//! feedback-board/crates/configs/src/lib.rs
//!
//! Layered runtime settings. Sources, lowest precedence first:
//!
//! 1. built-in defaults
//! 2. `config/default.toml` (optional)
//! 3. `config/{FEEDBACK_ENV}.toml` (optional, `FEEDBACK_ENV` defaults to `development`)
//! 4. environment variables such as `FEEDBACK__SERVER__PORT=9000`
//!
//! A `.env` file in the working directory is loaded into the environment first.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File, FileFormat};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Not `Clone`: the JWT secret should have exactly one owner.
#[derive(Debug, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub auth: AuthSettings,
    pub logging: LoggingSettings,
    pub seed: SeedSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct AuthSettings {
    pub jwt_secret: SecretString,
    pub token_ttl_secs: u64,
    pub first_user_is_admin: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    /// `tracing_subscriber::EnvFilter` directive; `RUST_LOG` wins when set.
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SeedSettings {
    pub demo_data: bool,
}

impl Settings {
    /// Loads settings from files and the environment, then validates them.
    pub fn load() -> Result<Self, SettingsError> {
        dotenvy::dotenv().ok();
        let env = std::env::var("FEEDBACK_ENV").unwrap_or_else(|_| "development".into());
        let builder = defaults()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                Environment::with_prefix("FEEDBACK")
                    .prefix_separator("__")
                    .separator("__"),
            );
        Self::finish(builder)
    }

    /// Defaults overlaid with one TOML document; files and environment are ignored.
    pub fn from_toml(toml: &str) -> Result<Self, SettingsError> {
        Self::finish(defaults()?.add_source(File::from_str(toml, FileFormat::Toml)))
    }

    fn finish(builder: ConfigBuilder<DefaultState>) -> Result<Self, SettingsError> {
        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.auth.jwt_secret.expose_secret().trim().is_empty() {
            return Err(SettingsError::Invalid("auth.jwt_secret must be set".into()));
        }
        if self.auth.token_ttl_secs == 0 {
            return Err(SettingsError::Invalid(
                "auth.token_ttl_secs must be greater than zero".into(),
            ));
        }
        if self.server.port == 0 {
            return Err(SettingsError::Invalid("server.port must not be 0".into()));
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn defaults() -> Result<ConfigBuilder<DefaultState>, config::ConfigError> {
    Config::builder()
        .set_default("server.host", "127.0.0.1")?
        .set_default("server.port", 8000)?
        .set_default("auth.jwt_secret", "")?
        .set_default("auth.token_ttl_secs", 86_400)?
        .set_default("auth.first_user_is_admin", true)?
        .set_default("logging.level", "info")?
        .set_default("logging.format", "pretty")?
        .set_default("seed.demo_data", false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_under_a_minimal_document() {
        let settings = Settings::from_toml("[auth]\njwt_secret = \"dev\"").unwrap();
        assert_eq!(settings.bind_addr(), "127.0.0.1:8000");
        assert_eq!(settings.auth.token_ttl_secs, 86_400);
        assert!(settings.auth.first_user_is_admin);
        assert_eq!(settings.logging.format, LogFormat::Pretty);
        assert!(!settings.seed.demo_data);
    }

    #[test]
    fn documents_override_defaults() {
        let settings = Settings::from_toml(
            r#"
            [server]
            host = "0.0.0.0"
            port = 9000

            [auth]
            jwt_secret = "s3cret"
            token_ttl_secs = 60
            first_user_is_admin = false

            [logging]
            level = "debug"
            format = "json"

            [seed]
            demo_data = true
            "#,
        )
        .unwrap();
        assert_eq!(settings.bind_addr(), "0.0.0.0:9000");
        assert_eq!(settings.auth.jwt_secret.expose_secret(), "s3cret");
        assert_eq!(settings.logging.format, LogFormat::Json);
        assert!(settings.seed.demo_data);
    }

    #[test]
    fn empty_secret_is_rejected() {
        let err = Settings::from_toml("").unwrap_err();
        assert!(matches!(err, SettingsError::Invalid(msg) if msg.contains("jwt_secret")));
    }

    #[test]
    fn zero_ttl_and_zero_port_are_rejected() {
        assert!(Settings::from_toml("[auth]\njwt_secret = \"x\"\ntoken_ttl_secs = 0").is_err());
        assert!(Settings::from_toml("[auth]\njwt_secret = \"x\"\n[server]\nport = 0").is_err());
    }

    #[test]
    fn secrets_are_redacted_in_debug_output() {
        let settings = Settings::from_toml("[auth]\njwt_secret = \"hunter2\"").unwrap();
        assert!(!format!("{settings:?}").contains("hunter2"));
    }
}
