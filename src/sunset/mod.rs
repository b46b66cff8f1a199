pub mod models;

use std::sync::Arc;

use anyhow::Context;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode, Url};
use tracing::debug;

use crate::{config::SiteConfig, control::window::SunsetLookup};

use self::models::{SunTimes, SunriseSunsetResponse};

#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("sunset lookup request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("sunset lookup returned HTTP {0}")]
    Status(StatusCode),

    #[error("sunset lookup response could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("sunset lookup API reported status {0:?}")]
    Api(String),
}

/// Client for the sunrise-sunset.org JSON API, pinned to one site.
///
/// Cheap to clone; the HTTP connection pool is shared.
#[derive(Debug, Clone)]
pub struct SunriseSunsetClient {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    http: Client,
    base_url: Url,
    latitude: f64,
    longitude: f64,
}

impl SunriseSunsetClient {
    pub fn new(site: &SiteConfig) -> anyhow::Result<Self> {
        let base_url = Url::parse(&site.sunset_api_url)
            .with_context(|| format!("SUNSET_API_URL is not a valid URL: {}", site.sunset_api_url))?;
        let http = Client::builder()
            .timeout(site.lookup_timeout)
            .build()
            .context("Failed to build sunrise/sunset HTTP client")?;

        Ok(Self {
            inner: Arc::new(Inner {
                http,
                base_url,
                latitude: site.latitude,
                longitude: site.longitude,
            }),
        })
    }

    /// Fetch today's sunrise and sunset for the configured site.
    ///
    /// Single attempt, bounded by the client timeout.
    pub async fn sun_times(&self) -> Result<SunTimes, LookupError> {
        let mut url = self.inner.base_url.clone();
        url.query_pairs_mut()
            .append_pair("lat", &self.inner.latitude.to_string())
            .append_pair("lng", &self.inner.longitude.to_string())
            .append_pair("formatted", "0");
        debug!(url = %url, "Requesting sunrise/sunset times");

        let resp = self
            .inner
            .http
            .get(url)
            .send()
            .await
            .map_err(LookupError::Request)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(LookupError::Status(status));
        }

        let bytes = resp.bytes().await.map_err(LookupError::Request)?;
        let times = serde_json::from_slice::<SunriseSunsetResponse>(&bytes)?.into_result()?;

        debug!(
            sunrise = %times.sunrise,
            sunset = %times.sunset,
            day_length = ?times.day_length,
            "Sunrise/sunset lookup succeeded"
        );
        Ok(times)
    }
}

impl SunsetLookup for SunriseSunsetClient {
    async fn sunset_utc(&self) -> Result<DateTime<Utc>, LookupError> {
        Ok(self.sun_times().await?.sunset)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
