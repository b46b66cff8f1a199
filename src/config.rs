use std::time::Duration;

use anyhow::{ensure, Context, Result};
use chrono_tz::Tz;

// ---------------------------------------------------------------------------
// SiteConfig
// ---------------------------------------------------------------------------

/// Where the hub is installed. Drives the sunset lookup and every local
/// clock reading the service takes.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub latitude: f64,
    pub longitude: f64,
    /// IANA zone used for reading timestamps and the control clock.
    pub timezone: Tz,
    /// Base URL of the sunrise/sunset API, e.g. `https://api.sunrise-sunset.org/json`.
    pub sunset_api_url: String,
    /// Upper bound on a single sunset lookup.
    pub lookup_timeout: Duration,
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL URL. `None` runs the service on the in-memory store.
    pub database_url: Option<String>,
    pub server_host: String,
    pub server_port: u16,
    pub site: SiteConfig,
    /// Origins allowed by the CORS layer.
    /// Format: `"https://a.example,https://b.example"`.
    pub cors_allowed_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary variable source. `from_env` passes
    /// the process environment; tests pass a fixed map.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let optional = |key: &str, default: &str| var(key).unwrap_or_else(|| default.to_owned());

        let latitude: f64 = optional("SITE_LATITUDE", "17.97787")
            .parse()
            .context("SITE_LATITUDE must be a decimal number")?;
        ensure!(
            (-90.0..=90.0).contains(&latitude),
            "SITE_LATITUDE must be within -90..=90, got {latitude}"
        );

        let longitude: f64 = optional("SITE_LONGITUDE", "-76.77339")
            .parse()
            .context("SITE_LONGITUDE must be a decimal number")?;
        ensure!(
            (-180.0..=180.0).contains(&longitude),
            "SITE_LONGITUDE must be within -180..=180, got {longitude}"
        );

        let timeout_secs: u64 = optional("SUNSET_TIMEOUT_SECS", "5")
            .parse()
            .context("SUNSET_TIMEOUT_SECS must be a positive integer")?;
        ensure!(timeout_secs > 0, "SUNSET_TIMEOUT_SECS must be greater than zero");

        Ok(Self {
            database_url: var("DATABASE_URL").filter(|url| !url.trim().is_empty()),
            server_host: optional("SERVER_HOST", "0.0.0.0"),
            server_port: optional("SERVER_PORT", "8080")
                .parse()
                .context("SERVER_PORT must be a valid port number")?,
            site: SiteConfig {
                latitude,
                longitude,
                timezone: parse_timezone(&optional("SITE_TIMEZONE", "America/Jamaica"))?,
                sunset_api_url: optional("SUNSET_API_URL", "https://api.sunrise-sunset.org/json"),
                lookup_timeout: Duration::from_secs(timeout_secs),
            },
            cors_allowed_origins: parse_origins(&optional(
                "CORS_ALLOWED_ORIGINS",
                "https://simple-smart-hub-client.netlify.app",
            )),
        })
    }
}

fn parse_timezone(raw: &str) -> Result<Tz> {
    raw.trim()
        .parse::<Tz>()
        .map_err(|e| anyhow::anyhow!("SITE_TIMEZONE is not a known IANA zone ({raw:?}): {e}"))
}

/// Split a comma-separated origin list, dropping blanks and trailing slashes.
fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().trim_end_matches('/'))
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}
