use std::path::PathBuf;

use chrono::Duration;
use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Listings table read at startup and on reload
    #[serde(default = "default_listings_path")]
    pub listings_path: PathBuf,

    /// Append-only reservation log
    #[serde(default = "default_reservations_path")]
    pub reservations_path: PathBuf,

    /// JSON file with the static credential set
    #[serde(default = "default_credentials_path")]
    pub credentials_path: PathBuf,

    /// Unsplash access key; image lookup is disabled without it
    #[serde(default)]
    pub unsplash_access_key: Option<String>,

    /// Unsplash API base URL
    #[serde(default = "default_unsplash_api_url")]
    pub unsplash_api_url: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Hours a login stays valid
    #[serde(default = "default_session_ttl_hours")]
    pub session_ttl_hours: u32,
}

fn default_listings_path() -> PathBuf {
    PathBuf::from("listings.csv")
}

fn default_reservations_path() -> PathBuf {
    PathBuf::from("reservations.csv")
}

fn default_credentials_path() -> PathBuf {
    PathBuf::from("credentials.json")
}

fn default_unsplash_api_url() -> String {
    "https://api.unsplash.com".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_session_ttl_hours() -> u32 {
    7 * 24
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Address the HTTP server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::hours(i64::from(self.session_ttl_hours))
    }

    /// Access key with blank values treated as absent
    pub fn image_api_key(&self) -> Option<&str> {
        self.unsplash_access_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}
