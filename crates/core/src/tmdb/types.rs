//! Types for TMDB API responses.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Content types
// ============================================================================

/// Kind of catalog content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Movie,
    Tv,
    Person,
}

impl ContentType {
    pub const ALL: [ContentType; 3] = [ContentType::Movie, ContentType::Tv, ContentType::Person];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Movie => "movie",
            ContentType::Tv => "tv",
            ContentType::Person => "person",
        }
    }

    /// Popularity-ordered listing endpoint.
    pub fn listing_path(&self) -> &'static str {
        match self {
            ContentType::Movie => "/movie/popular",
            ContentType::Tv => "/tv/popular",
            ContentType::Person => "/person/popular",
        }
    }

    /// Watch-provider catalog endpoint. People have none.
    pub fn providers_path(&self) -> Option<&'static str> {
        match self {
            ContentType::Movie => Some("/watch/providers/movie"),
            ContentType::Tv => Some("/watch/providers/tv"),
            ContentType::Person => None,
        }
    }

    /// Discover endpoint used for per-provider counts.
    pub fn discover_path(&self) -> Option<&'static str> {
        match self {
            ContentType::Movie => Some("/discover/movie"),
            ContentType::Tv => Some("/discover/tv"),
            ContentType::Person => None,
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("Unknown content type: {0}")]
pub struct UnknownContentType(pub String);

impl FromStr for ContentType {
    type Err = UnknownContentType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "movie" | "movies" => Ok(ContentType::Movie),
            "tv" => Ok(ContentType::Tv),
            "person" | "people" => Ok(ContentType::Person),
            other => Err(UnknownContentType(other.to_string())),
        }
    }
}

// ============================================================================
// Images
// ============================================================================

/// TMDB image size tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageSize {
    W92,
    W185,
    #[default]
    W342,
    W500,
    W1280,
    Original,
}

impl ImageSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageSize::W92 => "w92",
            ImageSize::W185 => "w185",
            ImageSize::W342 => "w342",
            ImageSize::W500 => "w500",
            ImageSize::W1280 => "w1280",
            ImageSize::Original => "original",
        }
    }
}

impl FromStr for ImageSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "w92" => Ok(ImageSize::W92),
            "w185" => Ok(ImageSize::W185),
            "w342" => Ok(ImageSize::W342),
            "w500" => Ok(ImageSize::W500),
            "w1280" => Ok(ImageSize::W1280),
            "original" => Ok(ImageSize::Original),
            other => Err(format!("Unknown image size: {}", other)),
        }
    }
}

// ============================================================================
// Listing results
// ============================================================================

/// A movie as returned by `/movie/popular`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct RawMovie {
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub original_title: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub vote_count: Option<u64>,
    #[serde(default)]
    pub popularity: Option<f64>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<u32>,
    #[serde(default)]
    pub original_language: Option<String>,
}

/// A TV show as returned by `/tv/popular`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct RawShow {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub original_name: Option<String>,
    #[serde(default)]
    pub first_air_date: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub vote_count: Option<u64>,
    #[serde(default)]
    pub popularity: Option<f64>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<u32>,
    #[serde(default)]
    pub original_language: Option<String>,
}

/// A person as returned by `/person/popular`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct RawPerson {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub original_name: Option<String>,
    #[serde(default)]
    pub popularity: Option<f64>,
    #[serde(default)]
    pub profile_path: Option<String>,
    #[serde(default)]
    pub known_for_department: Option<String>,
}

/// A listing result, tagged by the content type it was fetched for.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCatalogItem {
    Movie(RawMovie),
    Tv(RawShow),
    Person(RawPerson),
}

/// One page of a listing endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingPage {
    pub page: u32,
    pub total_pages: u32,
    pub total_results: u64,
    pub results: Vec<RawCatalogItem>,
}

// ============================================================================
// Watch providers
// ============================================================================

/// A streaming/watch provider from `/watch/providers/{type}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WatchProvider {
    pub provider_id: u32,
    #[serde(default)]
    pub provider_name: String,
    #[serde(default)]
    pub logo_path: Option<String>,
    #[serde(default)]
    pub display_priority: Option<u32>,
}
