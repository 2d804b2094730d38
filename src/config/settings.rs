//! Application settings loaded from config.toml
//!
//! Every section is optional and falls back to its defaults, so a missing
//! file yields a fully usable configuration. The token signing secret can be
//! supplied in the file or through the `JWT_SECRET` environment variable; the
//! environment wins when both are present.

use crate::core::withdrawal::LedgerMode;
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// HTTP listener settings
    pub server: ServerSettings,
    /// Token verification settings
    pub auth: AuthSettings,
    /// Withdrawal ledger behavior
    pub ledger: LedgerSettings,
    /// Defaults for list endpoints
    pub pagination: PaginationSettings,
    /// Admin account created on startup when missing
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

/// `[server]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Socket address to bind, e.g. `"0.0.0.0:8000"`
    pub bind: String,
    /// Upper bound for a single request, including its database work
    pub request_timeout_secs: u64,
    /// Origins allowed by CORS
    pub allowed_origins: Vec<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8000".to_string(),
            request_timeout_secs: 100,
            allowed_origins: vec!["http://localhost:5173".to_string()],
        }
    }
}

impl ServerSettings {
    /// Request timeout as a [`Duration`].
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// `[auth]` section
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    /// HS256 secret shared with the identity provider
    pub jwt_secret: Option<String>,
}

/// `[ledger]` section
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct LedgerSettings {
    pub mode: LedgerMode,
}

/// `[pagination]` section
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct PaginationSettings {
    pub default_per_page: u64,
    pub max_per_page: u64,
}

impl Default for PaginationSettings {
    fn default() -> Self {
        Self {
            default_per_page: 10,
            max_per_page: 100,
        }
    }
}

/// `[bootstrap_admin]` section
#[derive(Debug, Clone, Deserialize)]
pub struct BootstrapAdmin {
    pub username: String,
    pub email: String,
    #[serde(default = "default_admin_name")]
    pub first_name: String,
    #[serde(default = "default_admin_name")]
    pub last_name: String,
    #[serde(default)]
    pub phone: String,
}

fn default_admin_name() -> String {
    "Admin".to_string()
}

impl Settings {
    /// Returns the token secret, failing when none was configured.
    pub fn jwt_secret(&self) -> Result<&str> {
        self.auth
            .jwt_secret
            .as_deref()
            .filter(|secret| !secret.is_empty())
            .ok_or_else(|| Error::Config {
                message: "JWT secret is not configured (set JWT_SECRET or [auth] jwt_secret)"
                    .to_string(),
            })
    }
}

/// Parses settings from a TOML string.
///
/// # Errors
/// Returns an error if the TOML syntax is invalid or a field has the wrong type.
pub fn parse_settings(contents: &str) -> Result<Settings> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads settings from a TOML file, applying environment overrides.
///
/// A missing file is not an error: defaults are used instead.
///
/// # Errors
/// Returns an error if:
/// - The file exists but cannot be read
/// - The TOML syntax is invalid
/// - No JWT secret is available from the file or the environment
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path = path.as_ref();
    let mut settings = if path.exists() {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::Config {
            message: format!("Failed to read config file {}: {e}", path.display()),
        })?;
        parse_settings(&contents)?
    } else {
        tracing::info!(path = %path.display(), "No config file found, using defaults");
        Settings::default()
    };

    if let Ok(secret) = std::env::var("JWT_SECRET") {
        settings.auth.jwt_secret = Some(secret);
    }
    settings.jwt_secret()?;

    Ok(settings)
}

/// Loads settings from `FLEXCROW_CONFIG`, or `./config.toml` when unset.
///
/// # Errors
/// See [`load_settings`].
pub fn load_default_settings() -> Result<Settings> {
    let path = std::env::var("FLEXCROW_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
    load_settings(path)
}
