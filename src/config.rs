use std::path::PathBuf;

use serde::Deserialize;

use crate::services::policy::{ContentPolicy, RatingBand};

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// TMDB v3 API key
    #[serde(default)]
    pub tmdb_api_key: String,

    /// TMDB API base URL
    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    /// Redis connection URL for the catalog response cache; caching is off when unset
    #[serde(default)]
    pub redis_url: Option<String>,

    /// Directory holding the profile and watchlist blobs; in-memory when unset
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Lowest vote average shown to kid profiles
    #[serde(default = "default_kid_min_rating")]
    pub kid_min_rating: f64,

    /// Highest vote average shown to kid profiles
    #[serde(default = "default_kid_max_rating")]
    pub kid_max_rating: f64,

    /// Consecutive wrong PINs before a profile locks; unlimited when unset
    #[serde(default)]
    pub max_pin_attempts: Option<u32>,
}

fn default_tmdb_api_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_kid_min_rating() -> f64 {
    5.0
}

fn default_kid_max_rating() -> f64 {
    8.0
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let config = envy::from_env::<Config>()
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.kid_min_rating > self.kid_max_rating {
            anyhow::bail!(
                "KID_MIN_RATING ({}) must not exceed KID_MAX_RATING ({})",
                self.kid_min_rating,
                self.kid_max_rating
            );
        }
        if self.max_pin_attempts == Some(0) {
            anyhow::bail!("MAX_PIN_ATTEMPTS must be at least 1");
        }
        Ok(())
    }

    /// Content policy with the configured rating band
    pub fn content_policy(&self) -> ContentPolicy {
        ContentPolicy::default().with_rating_band(RatingBand::new(
            Some(self.kid_min_rating),
            Some(self.kid_max_rating),
        ))
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
