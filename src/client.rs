//! USGS Earthquake API client.
//!
//! Provides blocking HTTP access to the three fixed USGS endpoints the
//! dashboard reads. Uses reqwest with rustls for TLS.

use std::time::Duration;

use reqwest::blocking::Client;
use tracing::{debug, instrument};

use crate::errors::QuakeviewError;
use crate::models::FeatureCollection;

/// Default request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// User agent string for API requests.
const USER_AGENT: &str = concat!("quakeview/", env!("CARGO_PKG_VERSION"));

/// USGS base URL for earthquake feeds.
pub const USGS_BASE_URL: &str = "https://earthquake.usgs.gov";

/// The endpoints the dashboard reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// Every event in the past day (map view)
    AllDay,
    /// Magnitude 2.5+ in the past day (charts)
    Mag25Day,
    /// Twenty largest events since 1900 (table)
    Largest,
}

impl Endpoint {
    /// Short name used on the command line and in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AllDay => "all_day",
            Self::Mag25Day => "2.5_day",
            Self::Largest => "largest",
        }
    }

    /// Path and query relative to the USGS base URL.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::AllDay => "/earthquakes/feed/v1.0/summary/all_day.geojson",
            Self::Mag25Day => "/earthquakes/feed/v1.0/summary/2.5_day.geojson",
            Self::Largest => {
                "/fdsnws/event/1/query?format=geojson&starttime=1900-01-01&minmagnitude=8&limit=20&orderby=magnitude"
            }
        }
    }
}

impl std::str::FromStr for Endpoint {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all_day" => Ok(Self::AllDay),
            "2.5_day" => Ok(Self::Mag25Day),
            "largest" => Ok(Self::Largest),
            _ => Err(format!("unknown feed: {s} (expected: all_day, 2.5_day, largest)")),
        }
    }
}

/// Anything that can produce a feature collection for an endpoint.
///
/// An empty collection is a successful fetch; callers decide what "no data"
/// means for them.
pub trait FeedSource: Send + Sync {
    /// Fetch and decode one endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    fn fetch(&self, endpoint: Endpoint) -> Result<FeatureCollection, QuakeviewError>;
}

/// Client for USGS earthquake API.
pub struct UsgsClient {
    client: Client,
    base_url: String,
}

impl UsgsClient {
    /// Create a new USGS client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new() -> Result<Self, QuakeviewError> {
        Self::with_base_url(USGS_BASE_URL)
    }

    /// Create a client that talks to another host serving the same paths.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn with_base_url(base_url: &str) -> Result<Self, QuakeviewError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Full URL for an endpoint.
    #[must_use]
    pub fn url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }
}

impl FeedSource for UsgsClient {
    #[instrument(skip(self), fields(feed = endpoint.as_str()))]
    fn fetch(&self, endpoint: Endpoint) -> Result<FeatureCollection, QuakeviewError> {
        let url = self.url(endpoint);

        debug!("fetching feed from {}", url);

        let response = self.client.get(&url).send()?;

        // Check status before parsing
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(QuakeviewError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let feed: FeatureCollection = response.json()?;
        feed.validate()?;

        if let Some(meta) = &feed.metadata {
            debug!(title = ?meta.title, count = ?meta.count, "feed metadata");
        }
        debug!("fetched {} events", feed.features.len());
        Ok(feed)
    }
}
