//! Canonical catalog item shared by ingestion, the query pipeline and the API.

use serde::{Deserialize, Serialize};

use crate::tmdb::ContentType;

/// A catalog entry normalized from a movie, show or person listing result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogItem {
    /// TMDB ID.
    pub id: u64,
    /// Which listing this item came from.
    pub content_type: ContentType,
    /// Display title (movie title, show name, person name). Never empty: falls back to the
    /// original title, then to a placeholder.
    pub title: String,
    /// Primary date (YYYY-MM-DD): release date or first air date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Average vote (0-10); 0 when unrated.
    #[serde(default)]
    pub rating: f64,
    /// Number of votes.
    #[serde(default)]
    pub vote_count: u64,
    #[serde(default)]
    pub popularity: f64,
    /// Poster path for titles, profile path for people.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
    /// Known-for department (people only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<u32>,
    /// ISO 639-1 code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_language: Option<String>,
    /// Runtime in minutes. Listing endpoints never include it, so ingested items have
    /// `None` and a runtime minimum above 0 filters every one of them out.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime_minutes: Option<u32>,
    /// Keyword IDs. Listing endpoints never include them, so ingested items have none
    /// and any keyword filter matches nothing.
    #[serde(default)]
    pub keyword_ids: Vec<u32>,
}

impl CatalogItem {
    /// Year component of the primary date.
    pub fn year(&self) -> Option<u32> {
        self.date
            .as_ref()
            .and_then(|d| d.split('-').next())
            .and_then(|y| y.parse().ok())
    }
}
