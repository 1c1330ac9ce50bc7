use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::time::Duration;

use crate::tmdb::TmdbConfig;

/// Highest page number the listing endpoints will serve.
pub const MAX_LISTING_PAGES: u32 = 500;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub tmdb: TmdbConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    8080
}

/// Durable cache configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// SQLite file backing the cache. When unset, entries live in memory only.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Entry lifetime in days (default: 7)
    #[serde(default = "default_ttl_days")]
    pub ttl_days: u32,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            path: None,
            ttl_days: default_ttl_days(),
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> TimeDelta {
        TimeDelta::days(i64::from(self.ttl_days))
    }
}

fn default_ttl_days() -> u32 {
    7
}

/// Catalog ingestion configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IngestConfig {
    /// Number of listing pages to fetch per content type (default: 20)
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
    /// Pause between consecutive page requests (default: 100ms, 0 disables)
    #[serde(default = "default_page_delay_ms")]
    pub page_delay_ms: u64,
    /// Extra query parameters sent with every listing request
    #[serde(default)]
    pub extra_params: BTreeMap<String, String>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            max_pages: default_max_pages(),
            page_delay_ms: default_page_delay_ms(),
            extra_params: BTreeMap::new(),
        }
    }
}

impl IngestConfig {
    /// Page cap clamped to what the API serves.
    pub fn page_limit(&self) -> u32 {
        self.max_pages.clamp(1, MAX_LISTING_PAGES)
    }

    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }

    pub fn extra_params_list(&self) -> Vec<(String, String)> {
        self.extra_params
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

fn default_max_pages() -> u32 {
    20
}

fn default_page_delay_ms() -> u64 {
    100
}

/// Provider count aggregation configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProvidersConfig {
    /// Number of concurrent discover lookups (default: 8)
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Region used when a request does not name one
    #[serde(default = "default_region")]
    pub default_region: String,
    /// Pipe-separated monetization types passed to discover
    #[serde(default = "default_monetization_types")]
    pub monetization_types: String,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            default_region: default_region(),
            monetization_types: default_monetization_types(),
        }
    }
}

fn default_concurrency() -> usize {
    8
}

fn default_region() -> String {
    "US".to_string()
}

fn default_monetization_types() -> String {
    "flatrate|rent|buy|ads|free".to_string()
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub tmdb: SanitizedTmdbConfig,
    pub cache: CacheConfig,
    pub ingest: IngestConfig,
    pub providers: ProvidersConfig,
}

/// Sanitized TMDB config (API key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedTmdbConfig {
    pub api_key_configured: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_base_url: Option<String>,
    pub language: String,
    pub region: String,
    pub timeout_secs: u32,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            tmdb: SanitizedTmdbConfig {
                api_key_configured: !config.tmdb.api_key.is_empty(),
                base_url: config.tmdb.base_url.clone(),
                image_base_url: config.tmdb.image_base_url.clone(),
                language: config.tmdb.language.clone(),
                region: config.tmdb.region.clone(),
                timeout_secs: config.tmdb.timeout_secs,
            },
            cache: config.cache.clone(),
            ingest: config.ingest.clone(),
            providers: config.providers.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_empty_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host.to_string(), "0.0.0.0");
        assert_eq!(config.tmdb.language, "en-US");
        assert_eq!(config.tmdb.region, "US");
        assert_eq!(config.cache.ttl_days, 7);
        assert!(config.cache.path.is_none());
        assert_eq!(config.ingest.max_pages, 20);
        assert_eq!(config.ingest.page_delay_ms, 100);
        assert_eq!(config.providers.concurrency, 8);
        assert_eq!(config.providers.monetization_types, "flatrate|rent|buy|ads|free");
    }

    #[test]
    fn test_deserialize_full_config() {
        let toml = r#"
[server]
host = "127.0.0.1"
port = 9000

[tmdb]
api_key = "secret"
language = "de-DE"
region = "DE"
timeout_secs = 10

[cache]
path = "/data/cache.db"
ttl_days = 1

[ingest]
max_pages = 5
page_delay_ms = 0

[ingest.extra_params]
include_adult = "false"

[providers]
concurrency = 4
default_region = "DE"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.tmdb.api_key, "secret");
        assert_eq!(config.tmdb.region, "DE");
        assert_eq!(
            config.cache.path.as_deref().and_then(|p| p.to_str()),
            Some("/data/cache.db")
        );
        assert_eq!(config.cache.ttl(), TimeDelta::days(1));
        assert_eq!(config.ingest.page_limit(), 5);
        assert_eq!(config.ingest.page_delay(), Duration::ZERO);
        assert_eq!(
            config.ingest.extra_params_list(),
            vec![("include_adult".to_string(), "false".to_string())]
        );
        assert_eq!(config.providers.concurrency, 4);
    }

    #[test]
    fn test_cache_section_without_path_stays_in_memory() {
        let config: Config = toml::from_str("[cache]\nttl_days = 3\n").unwrap();
        assert!(config.cache.path.is_none());
        assert_eq!(config.cache.ttl(), TimeDelta::days(3));
    }

    #[test]
    fn test_page_limit_is_clamped() {
        let ingest = IngestConfig {
            max_pages: 10_000,
            ..IngestConfig::default()
        };
        assert_eq!(ingest.page_limit(), MAX_LISTING_PAGES);
    }

    #[test]
    fn test_sanitized_config_hides_api_key() {
        let mut config = Config::default();
        config.tmdb.api_key = "secret-key".to_string();

        let sanitized = SanitizedConfig::from(&config);
        assert!(sanitized.tmdb.api_key_configured);

        let json = serde_json::to_string(&sanitized).unwrap();
        assert!(!json.contains("secret-key"));
    }
}
