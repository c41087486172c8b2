use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use sqlx::postgres::{PgConnectOptions, PgSslMode};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use url::Url;
use validator::Validate;

use crate::error::{MigrationError, Result};

/// Raw view of the environment, one field per variable.
#[derive(Debug, Deserialize)]
struct EnvSettings {
    database_url: Secret<String>,
    #[serde(default = "default_ssl_mode")]
    database_ssl_mode: String,
    #[serde(default = "default_connect_timeout_secs")]
    database_connect_timeout_secs: u64,
    #[serde(default = "default_slow_statement_ms")]
    database_slow_statement_ms: u64,
    #[serde(default = "default_application_name")]
    database_application_name: String,
    migrations_dir: Option<PathBuf>,
}

fn default_ssl_mode() -> String {
    // TLS without server certificate verification
    "require".to_string()
}

fn default_connect_timeout_secs() -> u64 {
    30
}

fn default_slow_statement_ms() -> u64 {
    1000
}

fn default_application_name() -> String {
    env!("CARGO_PKG_NAME").to_string()
}

/// Fixed at build time, so installed binaries must set `MIGRATIONS_DIR`.
fn default_migrations_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("migrations")
}

#[derive(Debug, Clone, Validate)]
pub struct Settings {
    #[validate]
    pub database: DatabaseSettings,
    pub migrations_dir: PathBuf,
}

#[derive(Debug, Clone, Validate)]
#[validate(schema(function = "validate_database_url_settings"))]
pub struct DatabaseSettings {
    pub url: Secret<String>,
    #[validate(custom = "validate_ssl_mode")]
    pub ssl_mode: String,
    #[validate(range(min = 1))]
    pub connect_timeout_secs: u64,
    pub slow_statement_ms: u64,
    pub application_name: String,
}

impl Settings {
    /// Load settings from the process environment, reading `.env` first if present.
    ///
    /// `DATABASE_URL` is required. There is no built-in fallback target.
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_vars(std::env::vars())
    }

    /// Load settings from explicit `(name, value)` pairs.
    pub fn from_vars<I>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let env: EnvSettings = envy::from_iter(vars)?;

        let settings = Settings {
            database: DatabaseSettings {
                url: env.database_url,
                ssl_mode: env.database_ssl_mode.to_lowercase(),
                connect_timeout_secs: env.database_connect_timeout_secs,
                slow_statement_ms: env.database_slow_statement_ms,
                application_name: env.database_application_name,
            },
            migrations_dir: env.migrations_dir.unwrap_or_else(default_migrations_dir),
        };

        settings.validate_all()?;
        Ok(settings)
    }

    pub fn validate_all(&self) -> Result<(), validator::ValidationErrors> {
        self.validate()?;
        self.database.validate()?;
        Ok(())
    }
}

impl DatabaseSettings {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn slow_statement_threshold(&self) -> Duration {
        Duration::from_millis(self.slow_statement_ms)
    }

    /// Connection URL with the password masked, safe for logs.
    pub fn redacted_url(&self) -> String {
        let Ok(url) = Url::parse(self.url.expose_secret()) else {
            return "[invalid url]".to_string();
        };

        let rendered = url.to_string();
        match url.password() {
            Some(password) => rendered.replacen(&format!(":{}@", password), ":[HIDDEN]@", 1),
            None => rendered,
        }
    }

    pub fn connect_options(&self) -> Result<PgConnectOptions> {
        let ssl_mode = PgSslMode::from_str(&self.ssl_mode)
            .map_err(|e| MigrationError::Config(format!("DATABASE_SSL_MODE: {}", e)))?;

        let options = PgConnectOptions::from_str(self.url.expose_secret())
            .map_err(|e| MigrationError::Config(format!("DATABASE_URL: {}", e)))?
            .ssl_mode(ssl_mode)
            .application_name(&self.application_name);

        Ok(options)
    }
}

// Secret<String> is not Serialize, so the URL is checked at the struct level
fn validate_database_url_settings(
    settings: &DatabaseSettings,
) -> Result<(), validator::ValidationError> {
    validate_database_url(&settings.url)
}

fn validate_database_url(url: &Secret<String>) -> Result<(), validator::ValidationError> {
    let url = Url::parse(url.expose_secret())
        .map_err(|_| validator::ValidationError::new("invalid_url"))?;

    if !matches!(url.scheme(), "postgres" | "postgresql") {
        return Err(validator::ValidationError::new("unsupported_scheme"));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(validator::ValidationError::new("missing_host"));
    }

    Ok(())
}

fn validate_ssl_mode(mode: &str) -> Result<(), validator::ValidationError> {
    PgSslMode::from_str(mode)
        .map(|_| ())
        .map_err(|_| validator::ValidationError::new("invalid_ssl_mode"))
}
