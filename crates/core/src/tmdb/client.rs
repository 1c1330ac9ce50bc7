//! TMDB (The Movie Database) API client.
//!
//! TMDB requires an API key for access.
//! Rate limits are generous (around 40 requests per second).

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::types::{
    ContentType, ImageSize, ListingPage, RawCatalogItem, RawMovie, RawPerson, RawShow,
    WatchProvider,
};
use super::{CatalogSource, GatewayError};
use crate::metrics::{UPSTREAM_REQUESTS, UPSTREAM_REQUEST_DURATION};

const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";
const DEFAULT_IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p";

/// TMDB API client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TmdbConfig {
    /// TMDB API key (required).
    #[serde(default)]
    pub api_key: String,
    /// Base URL (default: https://api.themoviedb.org/3).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Image base URL for posters/profiles.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_base_url: Option<String>,
    /// Default `language` parameter sent with every request.
    #[serde(default = "default_language")]
    pub language: String,
    /// Default `region` parameter sent with every request.
    #[serde(default = "default_region")]
    pub region: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: None,
            image_base_url: None,
            language: default_language(),
            region: default_region(),
            timeout_secs: default_timeout(),
        }
    }
}

impl TmdbConfig {
    /// Configured image base URL, or the public TMDB one.
    pub fn resolved_image_base_url(&self) -> String {
        self.image_base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_IMAGE_BASE_URL.to_string())
    }
}

fn default_language() -> String {
    "en-US".to_string()
}

fn default_region() -> String {
    "US".to_string()
}

fn default_timeout() -> u32 {
    30
}

/// Build an absolute image URL: `{base}/{size}{path}`.
///
/// Returns an empty string when there is no path.
pub fn image_url(base: &str, path: Option<&str>, size: ImageSize) -> String {
    match path {
        Some(p) if !p.is_empty() => format!("{}/{}{}", base.trim_end_matches('/'), size.as_str(), p),
        _ => String::new(),
    }
}

/// TMDB API client.
pub struct TmdbClient {
    client: Client,
    base_url: String,
    api_key: String,
    image_base_url: String,
    language: String,
    region: String,
}

impl TmdbClient {
    /// Create a new TMDB client.
    pub fn new(config: TmdbConfig) -> Result<Self, GatewayError> {
        if config.api_key.is_empty() {
            return Err(GatewayError::NotConfigured(
                "TMDB API key is not set".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()?;

        let image_base_url = config.resolved_image_base_url();

        let base_url = config
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(Self {
            client,
            base_url,
            api_key: config.api_key,
            image_base_url,
            language: config.language,
            region: config.region,
        })
    }

    /// Resolve an image path against the configured image base URL.
    pub fn image_url(&self, path: Option<&str>, size: ImageSize) -> String {
        image_url(&self.image_base_url, path, size)
    }

    /// Issue an authenticated GET request and decode the JSON body.
    ///
    /// `language` and `region` default to the configured values unless
    /// `params` overrides them.
    pub async fn request<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, GatewayError> {
        let url = format!("{}{}", self.base_url, path);
        let query = merge_params(
            vec![
                ("api_key", self.api_key.clone()),
                ("language", self.language.clone()),
                ("region", self.region.clone()),
            ],
            params,
        );

        debug!(path = %path, params = params.len(), "TMDB request");

        let started = Instant::now();
        let result = self.send::<T>(&url, &query).await;
        UPSTREAM_REQUEST_DURATION
            .with_label_values(&[path])
            .observe(started.elapsed().as_secs_f64());
        UPSTREAM_REQUESTS
            .with_label_values(&[path, if result.is_ok() { "success" } else { "error" }])
            .inc();

        result
    }

    async fn send<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, GatewayError> {
        let response = self.client.get(url).query(query).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Request {
                status: status.as_u16(),
                body,
            });
        }

        response.json().await.map_err(|e| {
            GatewayError::Parse(format!("Failed to parse response from {}: {}", url, e))
        })
    }
}

/// Overlay `overrides` onto `base`, replacing values for keys already present.
fn merge_params<'a>(
    mut base: Vec<(&'a str, String)>,
    overrides: &[(&'a str, String)],
) -> Vec<(&'a str, String)> {
    for (key, value) in overrides {
        match base.iter().position(|(existing, _)| *existing == *key) {
            Some(idx) => base[idx].1 = value.clone(),
            None => base.push((*key, value.clone())),
        }
    }
    base
}

#[async_trait]
impl CatalogSource for TmdbClient {
    async fn popular_page(
        &self,
        content_type: ContentType,
        page: u32,
        extra_params: &[(String, String)],
    ) -> Result<ListingPage, GatewayError> {
        let mut params: Vec<(&str, String)> = vec![
            ("page", page.to_string()),
            ("sort_by", "popularity.desc".to_string()),
        ];
        params.extend(extra_params.iter().map(|(k, v)| (k.as_str(), v.clone())));

        let path = content_type.listing_path();
        let listing = match content_type {
            ContentType::Movie => self
                .request::<TmdbPagedResponse<RawMovie>>(path, &params)
                .await?
                .into_listing(RawCatalogItem::Movie),
            ContentType::Tv => self
                .request::<TmdbPagedResponse<RawShow>>(path, &params)
                .await?
                .into_listing(RawCatalogItem::Tv),
            ContentType::Person => self
                .request::<TmdbPagedResponse<RawPerson>>(path, &params)
                .await?
                .into_listing(RawCatalogItem::Person),
        };

        Ok(listing)
    }

    async fn watch_providers(
        &self,
        content_type: ContentType,
    ) -> Result<Vec<WatchProvider>, GatewayError> {
        let path = content_type
            .providers_path()
            .ok_or(GatewayError::Unsupported(content_type))?;

        let response: TmdbProvidersResponse = self.request(path, &[]).await?;
        Ok(response.results)
    }

    async fn discover_total(
        &self,
        content_type: ContentType,
        provider_id: u32,
        region: &str,
        monetization_types: &str,
    ) -> Result<u64, GatewayError> {
        let path = content_type
            .discover_path()
            .ok_or(GatewayError::Unsupported(content_type))?;

        let params = [
            ("with_watch_providers", provider_id.to_string()),
            ("watch_region", region.to_string()),
            ("with_watch_monetization_types", monetization_types.to_string()),
            ("page", "1".to_string()),
        ];

        let response: TmdbDiscoverResponse = self.request(path, &params).await?;
        Ok(response.total_results)
    }
}

// ============================================================================
// TMDB API Response Types (private)
// ============================================================================

#[derive(Debug, Deserialize)]
struct TmdbPagedResponse<T> {
    #[serde(default)]
    page: u32,
    #[serde(default)]
    total_pages: u32,
    #[serde(default)]
    total_results: u64,
    #[serde(default = "Vec::new")]
    results: Vec<T>,
}

impl<T> TmdbPagedResponse<T> {
    fn into_listing(self, tag: impl Fn(T) -> RawCatalogItem) -> ListingPage {
        ListingPage {
            page: self.page,
            total_pages: self.total_pages,
            total_results: self.total_results,
            results: self.results.into_iter().map(tag).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TmdbProvidersResponse {
    #[serde(default)]
    results: Vec<WatchProvider>,
}

#[derive(Debug, Deserialize)]
struct TmdbDiscoverResponse {
    #[serde(default)]
    total_results: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_requires_api_key() {
        let result = TmdbClient::new(TmdbConfig::default());
        assert!(matches!(result, Err(GatewayError::NotConfigured(_))));
    }

    #[test]
    fn test_image_url() {
        assert_eq!(
            image_url("https://image.tmdb.org/t/p", Some("/abc.jpg"), ImageSize::W500),
            "https://image.tmdb.org/t/p/w500/abc.jpg"
        );
        assert_eq!(
            image_url("https://image.tmdb.org/t/p/", Some("/abc.jpg"), ImageSize::Original),
            "https://image.tmdb.org/t/p/original/abc.jpg"
        );
    }

    #[test]
    fn test_resolved_image_base_url_defaults_to_tmdb() {
        assert_eq!(
            TmdbConfig::default().resolved_image_base_url(),
            "https://image.tmdb.org/t/p"
        );
        let config = TmdbConfig {
            image_base_url: Some("http://cdn.local".to_string()),
            ..TmdbConfig::default()
        };
        assert_eq!(config.resolved_image_base_url(), "http://cdn.local");
    }

    #[test]
    fn test_image_url_missing_path_is_empty() {
        assert_eq!(image_url("https://x", None, ImageSize::W92), "");
        assert_eq!(image_url("https://x", Some(""), ImageSize::W92), "");
    }

    #[test]
    fn test_client_image_url_uses_configured_base() {
        let client = TmdbClient::new(TmdbConfig {
            api_key: "key".to_string(),
            image_base_url: Some("https://img.example".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(
            client.image_url(Some("/p.jpg"), ImageSize::W185),
            "https://img.example/w185/p.jpg"
        );
    }

    #[test]
    fn test_custom_base_url_keeps_default_image_base() {
        let client = TmdbClient::new(TmdbConfig {
            api_key: "key".to_string(),
            base_url: Some("http://localhost:9999/3".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(client.base_url, "http://localhost:9999/3");
        assert_eq!(
            client.image_url(Some("/p.jpg"), ImageSize::W92),
            format!("{}/w92/p.jpg", DEFAULT_IMAGE_BASE_URL)
        );
    }

    #[test]
    fn test_merge_params_overrides_defaults() {
        let merged = merge_params(
            vec![
                ("api_key", "k".to_string()),
                ("region", "US".to_string()),
            ],
            &[("region", "DE".to_string()), ("page", "2".to_string())],
        );
        assert_eq!(
            merged,
            vec![
                ("api_key", "k".to_string()),
                ("region", "DE".to_string()),
                ("page", "2".to_string()),
            ]
        );
    }

    #[test]
    fn test_paged_response_into_listing() {
        let json = r#"{
            "page": 1,
            "total_pages": 500,
            "total_results": 10000,
            "results": [
                {"id": 603, "title": "The Matrix", "release_date": "1999-03-30", "vote_average": 8.2, "popularity": 80.5}
            ]
        }"#;
        let response: TmdbPagedResponse<RawMovie> = serde_json::from_str(json).unwrap();
        let listing = response.into_listing(RawCatalogItem::Movie);
        assert_eq!(listing.total_pages, 500);
        assert_eq!(listing.results.len(), 1);
        match &listing.results[0] {
            RawCatalogItem::Movie(m) => assert_eq!(m.title.as_deref(), Some("The Matrix")),
            other => panic!("unexpected item: {:?}", other),
        }
    }

    #[test]
    fn test_discover_response_defaults_total() {
        let response: TmdbDiscoverResponse = serde_json::from_str(r#"{"results": []}"#).unwrap();
        assert_eq!(response.total_results, 0);
    }
}
