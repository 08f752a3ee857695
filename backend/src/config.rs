use std::{fmt, net::SocketAddr, time::Duration};

use clap::Args;
use reqwest::Client;

pub const DEFAULT_GEOCODER_URL: &str = "https://nominatim.openstreetmap.org/search";
pub const DEFAULT_DIRECTIONS_URL: &str = "https://maps.googleapis.com/maps/api/directions/json";
pub const DEFAULT_USER_AGENT: &str = "GoogleMapsToGPXConverter/1.0";

/// Directions provider credential. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Blank input means "no key".
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Settings shared by the server and the command line converter.
#[derive(Clone, Args)]
pub struct UpstreamConfig {
    /// Directions API key; without it routes are straight lines between waypoints
    #[arg(long, env = "GOOGLE_MAPS_API_KEY", hide_env_values = true)]
    pub google_maps_api_key: Option<String>,

    /// Nominatim-compatible search endpoint used to geocode place names
    #[arg(long, env = "GEOCODER_URL", default_value = DEFAULT_GEOCODER_URL)]
    pub geocoder_url: String,

    /// Google-compatible directions endpoint
    #[arg(long, env = "DIRECTIONS_URL", default_value = DEFAULT_DIRECTIONS_URL)]
    pub directions_url: String,

    /// User-Agent sent to the geocoder (Nominatim rejects anonymous clients)
    #[arg(long, env = "GEOCODER_USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Timeout applied to every outbound request, in seconds
    #[arg(long, env = "HTTP_TIMEOUT_SECS", default_value_t = 10)]
    pub http_timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            google_maps_api_key: None,
            geocoder_url: DEFAULT_GEOCODER_URL.to_string(),
            directions_url: DEFAULT_DIRECTIONS_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            http_timeout_secs: 10,
        }
    }
}

impl fmt::Debug for UpstreamConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpstreamConfig")
            .field("google_maps_api_key", &self.api_key())
            .field("geocoder_url", &self.geocoder_url)
            .field("directions_url", &self.directions_url)
            .field("user_agent", &self.user_agent)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .finish()
    }
}

impl UpstreamConfig {
    pub fn api_key(&self) -> Option<ApiKey> {
        self.google_maps_api_key.clone().and_then(ApiKey::new)
    }

    pub fn http_client(&self) -> Result<Client, reqwest::Error> {
        Client::builder()
            .timeout(Duration::from_secs(self.http_timeout_secs))
            .build()
    }
}

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about = "Serve Google Maps route links as downloadable GPX tracks"
)]
pub struct ServerConfig {
    /// Address the HTTP server listens on
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:8080")]
    pub bind: SocketAddr,

    #[command(flatten)]
    pub upstream: UpstreamConfig,
}
