//! Testing utilities and mock implementations.
//!
//! This module provides a mock [`CatalogSource`](crate::tmdb::CatalogSource),
//! a controllable clock for TTL tests and fixture builders, so that the
//! aggregator, ingestion and the HTTP API can be tested without the network.
//!
//! # Example
//!
//! ```rust,ignore
//! use marquee_core::testing::{fixtures, ManualClock, MockCatalogSource};
//!
//! let source = MockCatalogSource::new();
//! source.set_pages(ContentType::Movie, vec![fixtures::movie_page(1, 20)]).await;
//!
//! let clock = ManualClock::new();
//! clock.advance(TimeDelta::days(8));
//! ```

mod mock_catalog_source;

pub use mock_catalog_source::{MockCatalogSource, RecordedCatalogQuery};

use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, TimeDelta, TimeZone, Utc};

use crate::cache::Clock;

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: RwLock<DateTime<Utc>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    /// Start at 2024-01-01T00:00:00Z.
    pub fn new() -> Self {
        Self::at(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().unwrap_or_default())
    }

    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            now: RwLock::new(now),
        }
    }

    pub fn advance(&self, by: TimeDelta) {
        let mut now = self.now.write().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }

    pub fn set(&self, to: DateTime<Utc>) {
        *self.now.write().unwrap_or_else(PoisonError::into_inner) = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.read().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::catalog::CatalogItem;
    use crate::tmdb::{ContentType, RawCatalogItem, RawMovie, RawPerson, RawShow, WatchProvider};

    /// Create a raw movie listing result with reasonable defaults.
    pub fn raw_movie(id: u64, title: &str) -> RawCatalogItem {
        RawCatalogItem::Movie(RawMovie {
            id,
            title: Some(title.to_string()),
            original_title: None,
            release_date: Some("2020-06-15".to_string()),
            vote_average: Some(6.5),
            vote_count: Some(1000),
            popularity: Some(50.0),
            poster_path: Some(format!("/poster{}.jpg", id)),
            genre_ids: vec![18],
            original_language: Some("en".to_string()),
        })
    }

    /// Create a raw movie with a specific rating.
    pub fn rated_movie(id: u64, title: &str, vote_average: f64) -> RawCatalogItem {
        match raw_movie(id, title) {
            RawCatalogItem::Movie(m) => RawCatalogItem::Movie(RawMovie {
                vote_average: Some(vote_average),
                ..m
            }),
            other => other,
        }
    }

    /// Create a raw TV show listing result.
    pub fn raw_show(id: u64, name: &str) -> RawCatalogItem {
        RawCatalogItem::Tv(RawShow {
            id,
            name: Some(name.to_string()),
            original_name: None,
            first_air_date: Some("2019-09-01".to_string()),
            vote_average: Some(7.8),
            vote_count: Some(500),
            popularity: Some(80.0),
            poster_path: Some(format!("/show{}.jpg", id)),
            genre_ids: vec![18, 10765],
            original_language: Some("en".to_string()),
        })
    }

    /// Create a raw person listing result.
    pub fn raw_person(id: u64, name: &str) -> RawCatalogItem {
        RawCatalogItem::Person(RawPerson {
            id,
            name: Some(name.to_string()),
            original_name: None,
            popularity: Some(30.0),
            profile_path: Some(format!("/profile{}.jpg", id)),
            known_for_department: Some("Acting".to_string()),
        })
    }

    /// A page of `count` movies with sequential IDs starting at `first_id`.
    ///
    /// Ratings cycle through 5.0..=9.5 in half steps.
    pub fn movie_page(first_id: u64, count: u64) -> Vec<RawCatalogItem> {
        (first_id..first_id + count)
            .map(|id| rated_movie(id, &format!("Movie {}", id), 5.0 + (id % 10) as f64 * 0.5))
            .collect()
    }

    /// Create a provider with a logo and the given display priority.
    pub fn provider(id: u32, priority: u32) -> WatchProvider {
        WatchProvider {
            provider_id: id,
            provider_name: format!("Provider {}", id),
            logo_path: Some(format!("/logo{}.png", id)),
            display_priority: Some(priority),
        }
    }

    /// Create a normalized movie item.
    pub fn catalog_item(id: u64, title: &str) -> CatalogItem {
        CatalogItem {
            id,
            content_type: ContentType::Movie,
            title: title.to_string(),
            date: Some("2020-01-01".to_string()),
            rating: 5.0,
            vote_count: 100,
            popularity: 10.0,
            image_path: None,
            department: None,
            genre_ids: vec![],
            original_language: Some("en".to_string()),
            runtime_minutes: None,
            keyword_ids: vec![],
        }
    }
}
