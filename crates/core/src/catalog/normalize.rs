//! Per-variant mapping from raw listing results to [`CatalogItem`].

use super::CatalogItem;
use crate::tmdb::{ContentType, RawCatalogItem, RawMovie, RawPerson, RawShow};

/// Empty strings from the API mean "unknown".
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

const UNTITLED: &str = "Untitled";
const UNKNOWN_PERSON: &str = "Unknown";

fn title_or_original(
    primary: Option<String>,
    original: Option<String>,
    fallback: &str,
) -> String {
    non_empty(primary)
        .or_else(|| non_empty(original))
        .unwrap_or_else(|| fallback.to_string())
}

impl From<RawMovie> for CatalogItem {
    fn from(m: RawMovie) -> Self {
        Self {
            id: m.id,
            content_type: ContentType::Movie,
            title: title_or_original(m.title, m.original_title, UNTITLED),
            date: non_empty(m.release_date),
            rating: m.vote_average.unwrap_or(0.0),
            vote_count: m.vote_count.unwrap_or(0),
            popularity: m.popularity.unwrap_or(0.0),
            image_path: non_empty(m.poster_path),
            department: None,
            genre_ids: m.genre_ids,
            original_language: non_empty(m.original_language),
            runtime_minutes: None,
            keyword_ids: vec![],
        }
    }
}

impl From<RawShow> for CatalogItem {
    fn from(s: RawShow) -> Self {
        Self {
            id: s.id,
            content_type: ContentType::Tv,
            title: title_or_original(s.name, s.original_name, UNTITLED),
            date: non_empty(s.first_air_date),
            rating: s.vote_average.unwrap_or(0.0),
            vote_count: s.vote_count.unwrap_or(0),
            popularity: s.popularity.unwrap_or(0.0),
            image_path: non_empty(s.poster_path),
            department: None,
            genre_ids: s.genre_ids,
            original_language: non_empty(s.original_language),
            runtime_minutes: None,
            keyword_ids: vec![],
        }
    }
}

impl From<RawPerson> for CatalogItem {
    fn from(p: RawPerson) -> Self {
        Self {
            id: p.id,
            content_type: ContentType::Person,
            title: title_or_original(p.name, p.original_name, UNKNOWN_PERSON),
            date: None,
            rating: 0.0,
            vote_count: 0,
            popularity: p.popularity.unwrap_or(0.0),
            image_path: non_empty(p.profile_path),
            department: non_empty(p.known_for_department),
            genre_ids: vec![],
            original_language: None,
            runtime_minutes: None,
            keyword_ids: vec![],
        }
    }
}

impl From<RawCatalogItem> for CatalogItem {
    fn from(raw: RawCatalogItem) -> Self {
        match raw {
            RawCatalogItem::Movie(m) => m.into(),
            RawCatalogItem::Tv(s) => s.into(),
            RawCatalogItem::Person(p) => p.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movie_conversion() {
        let raw = RawMovie {
            id: 603,
            title: Some("The Matrix".to_string()),
            original_title: Some("The Matrix".to_string()),
            release_date: Some("1999-03-30".to_string()),
            vote_average: Some(8.2),
            vote_count: Some(25000),
            popularity: Some(80.5),
            poster_path: Some("/poster.jpg".to_string()),
            genre_ids: vec![28, 878],
            original_language: Some("en".to_string()),
        };

        let item: CatalogItem = raw.into();
        assert_eq!(item.id, 603);
        assert_eq!(item.content_type, ContentType::Movie);
        assert_eq!(item.title, "The Matrix");
        assert_eq!(item.year(), Some(1999));
        assert_eq!(item.rating, 8.2);
        assert_eq!(item.image_path.as_deref(), Some("/poster.jpg"));
        assert!(item.runtime_minutes.is_none()); // Not in listing results
    }

    #[test]
    fn test_movie_missing_title_uses_original() {
        let raw = RawMovie {
            id: 1,
            title: Some(String::new()),
            original_title: Some("Amélie".to_string()),
            release_date: Some(String::new()),
            ..Default::default()
        };

        let item: CatalogItem = raw.into();
        assert_eq!(item.title, "Amélie");
        assert!(item.date.is_none());
        assert_eq!(item.rating, 0.0);
    }

    #[test]
    fn test_missing_titles_fall_back_to_placeholder() {
        let movie: CatalogItem = RawMovie {
            id: 2,
            title: None,
            original_title: Some("  ".to_string()),
            ..Default::default()
        }
        .into();
        assert_eq!(movie.title, "Untitled");

        let show: CatalogItem = RawShow {
            id: 3,
            ..Default::default()
        }
        .into();
        assert_eq!(show.title, "Untitled");

        let person: CatalogItem = RawPerson {
            id: 4,
            ..Default::default()
        }
        .into();
        assert_eq!(person.title, "Unknown");
    }

    #[test]
    fn test_show_conversion() {
        let raw = RawShow {
            id: 1396,
            name: Some("Breaking Bad".to_string()),
            first_air_date: Some("2008-01-20".to_string()),
            vote_average: Some(8.9),
            popularity: Some(400.0),
            ..Default::default()
        };

        let item: CatalogItem = RawCatalogItem::Tv(raw).into();
        assert_eq!(item.content_type, ContentType::Tv);
        assert_eq!(item.title, "Breaking Bad");
        assert_eq!(item.date.as_deref(), Some("2008-01-20"));
    }

    #[test]
    fn test_person_conversion() {
        let raw = RawPerson {
            id: 287,
            name: Some("Brad Pitt".to_string()),
            popularity: Some(55.1),
            profile_path: Some("/brad.jpg".to_string()),
            known_for_department: Some("Acting".to_string()),
            ..Default::default()
        };

        let item: CatalogItem = RawCatalogItem::Person(raw).into();
        assert_eq!(item.content_type, ContentType::Person);
        assert_eq!(item.title, "Brad Pitt");
        assert!(item.date.is_none());
        assert_eq!(item.image_path.as_deref(), Some("/brad.jpg"));
        assert_eq!(item.department.as_deref(), Some("Acting"));
    }
}
