//! Filter criteria and their validation.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::FilterError;

pub const MIN_RATING: f64 = 0.0;
pub const MAX_RATING: f64 = 10.0;
pub const MAX_RUNTIME: u32 = 360;
pub const MAX_VOTES: u64 = 50_000;

/// Field a result list is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Popularity,
    VoteAverage,
    VoteCount,
    ReleaseDate,
    FirstAirDate,
    Title,
    Name,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Popularity => "popularity",
            SortKey::VoteAverage => "vote_average",
            SortKey::VoteCount => "vote_count",
            SortKey::ReleaseDate => "release_date",
            SortKey::FirstAirDate => "first_air_date",
            SortKey::Title => "title",
            SortKey::Name => "name",
        }
    }

    /// Parse a sort key. Unknown keys order by popularity.
    pub fn parse(s: &str) -> Self {
        match s {
            "vote_average" => SortKey::VoteAverage,
            "vote_count" => SortKey::VoteCount,
            "release_date" => SortKey::ReleaseDate,
            "first_air_date" => SortKey::FirstAirDate,
            "title" => SortKey::Title,
            "name" => SortKey::Name,
            _ => SortKey::Popularity,
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(format!("Unknown sort order: {}", other)),
        }
    }
}

/// A keyword selected for filtering. Only the ID takes part in matching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyword {
    pub id: u32,
    #[serde(default)]
    pub name: String,
}

impl Keyword {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// The user's current filter and sort selection.
///
/// Every default value means "no constraint".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub sort_by: SortKey,
    pub sort_order: SortOrder,
    /// Items must carry every listed genre.
    pub genres: Vec<u32>,
    pub min_rating: f64,
    pub max_rating: f64,
    pub min_runtime: u32,
    pub max_runtime: u32,
    pub min_votes: u64,
    pub max_votes: u64,
    /// ISO 639-1 original language.
    pub language: Option<String>,
    /// Inclusive YYYY-MM-DD bounds.
    pub release_date_from: Option<String>,
    pub release_date_to: Option<String>,
    /// Items must carry at least one listed keyword.
    pub keywords: Vec<Keyword>,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            sort_by: SortKey::default(),
            sort_order: SortOrder::default(),
            genres: Vec::new(),
            min_rating: MIN_RATING,
            max_rating: MAX_RATING,
            min_runtime: 0,
            max_runtime: MAX_RUNTIME,
            min_votes: 0,
            max_votes: MAX_VOTES,
            language: None,
            release_date_from: None,
            release_date_to: None,
            keywords: Vec::new(),
        }
    }
}

impl FilterCriteria {
    /// Check that every range is ordered and inside its domain.
    pub fn validate(&self) -> Result<(), FilterError> {
        if !(MIN_RATING..=MAX_RATING).contains(&self.min_rating) {
            return Err(FilterError::OutOfBounds {
                field: "minRating",
                value: self.min_rating.to_string(),
            });
        }
        if !(MIN_RATING..=MAX_RATING).contains(&self.max_rating) {
            return Err(FilterError::OutOfBounds {
                field: "maxRating",
                value: self.max_rating.to_string(),
            });
        }
        if self.min_rating > self.max_rating {
            return Err(FilterError::InvalidRange {
                field: "rating",
                min: self.min_rating.to_string(),
                max: self.max_rating.to_string(),
            });
        }

        if self.max_runtime > MAX_RUNTIME {
            return Err(FilterError::OutOfBounds {
                field: "maxRuntime",
                value: self.max_runtime.to_string(),
            });
        }
        if self.min_runtime > self.max_runtime {
            return Err(FilterError::InvalidRange {
                field: "runtime",
                min: self.min_runtime.to_string(),
                max: self.max_runtime.to_string(),
            });
        }

        if self.max_votes > MAX_VOTES {
            return Err(FilterError::OutOfBounds {
                field: "maxVotes",
                value: self.max_votes.to_string(),
            });
        }
        if self.min_votes > self.max_votes {
            return Err(FilterError::InvalidRange {
                field: "votes",
                min: self.min_votes.to_string(),
                max: self.max_votes.to_string(),
            });
        }

        let from = parse_bound(self.release_date_from.as_deref())?;
        let to = parse_bound(self.release_date_to.as_deref())?;
        if let (Some(from), Some(to)) = (from, to) {
            if from > to {
                return Err(FilterError::InvalidRange {
                    field: "releaseDate",
                    min: from.to_string(),
                    max: to.to_string(),
                });
            }
        }

        Ok(())
    }

    pub fn genres_active(&self) -> bool {
        !self.genres.is_empty()
    }

    pub fn rating_active(&self) -> bool {
        self.min_rating > MIN_RATING || self.max_rating < MAX_RATING
    }

    pub fn runtime_active(&self) -> bool {
        self.min_runtime > 0 || self.max_runtime < MAX_RUNTIME
    }

    pub fn votes_active(&self) -> bool {
        self.min_votes > 0 || self.max_votes < MAX_VOTES
    }

    pub fn language_active(&self) -> bool {
        self.language.is_some()
    }

    pub fn release_date_active(&self) -> bool {
        self.release_date_from.is_some() || self.release_date_to.is_some()
    }

    pub fn keywords_active(&self) -> bool {
        !self.keywords.is_empty()
    }

    pub fn sort_active(&self) -> bool {
        self.sort_by != SortKey::default() || self.sort_order != SortOrder::default()
    }

    /// Number of groups that deviate from their default.
    pub fn active_filter_count(&self) -> usize {
        [
            self.genres_active(),
            self.rating_active(),
            self.runtime_active(),
            self.votes_active(),
            self.language_active(),
            self.release_date_active(),
            self.keywords_active(),
            self.sort_active(),
        ]
        .into_iter()
        .filter(|active| *active)
        .count()
    }

    pub fn has_active_filters(&self) -> bool {
        self.active_filter_count() > 0
    }
}

fn parse_bound(value: Option<&str>) -> Result<Option<NaiveDate>, FilterError> {
    value
        .map(|v| {
            NaiveDate::parse_from_str(v, "%Y-%m-%d")
                .map_err(|_| FilterError::InvalidDate(v.to_string()))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_inactive() {
        let criteria = FilterCriteria::default();
        assert!(criteria.validate().is_ok());
        assert_eq!(criteria.active_filter_count(), 0);
        assert!(!criteria.has_active_filters());
    }

    #[test]
    fn test_sort_key_parse_unknown_is_popularity() {
        assert_eq!(SortKey::parse("vote_average"), SortKey::VoteAverage);
        assert_eq!(SortKey::parse("revenue"), SortKey::Popularity);
        assert_eq!(SortKey::parse(""), SortKey::Popularity);
    }

    #[test]
    fn test_validate_rejects_inverted_rating() {
        let criteria = FilterCriteria {
            min_rating: 8.0,
            max_rating: 6.0,
            ..FilterCriteria::default()
        };
        assert!(matches!(
            criteria.validate(),
            Err(FilterError::InvalidRange { field: "rating", .. })
        ));
    }

    #[test]
    fn test_validate_rejects_out_of_domain() {
        let criteria = FilterCriteria {
            max_rating: 11.0,
            ..FilterCriteria::default()
        };
        assert!(matches!(
            criteria.validate(),
            Err(FilterError::OutOfBounds { .. })
        ));

        let criteria = FilterCriteria {
            max_runtime: 400,
            ..FilterCriteria::default()
        };
        assert!(criteria.validate().is_err());

        let criteria = FilterCriteria {
            min_rating: f64::NAN,
            ..FilterCriteria::default()
        };
        assert!(criteria.validate().is_err());
    }

    #[test]
    fn test_validate_dates() {
        let criteria = FilterCriteria {
            release_date_from: Some("2021-01-01".to_string()),
            release_date_to: Some("2020-01-01".to_string()),
            ..FilterCriteria::default()
        };
        assert!(criteria.validate().is_err());

        let criteria = FilterCriteria {
            release_date_from: Some("yesterday".to_string()),
            ..FilterCriteria::default()
        };
        assert!(matches!(criteria.validate(), Err(FilterError::InvalidDate(_))));
    }

    #[test]
    fn test_active_filter_count_counts_groups() {
        let criteria = FilterCriteria {
            genres: vec![18, 35],
            min_rating: 7.0,
            max_rating: 9.0,
            language: Some("en".to_string()),
            sort_order: SortOrder::Asc,
            ..FilterCriteria::default()
        };
        // Two genres and both rating bounds still count once each.
        assert_eq!(criteria.active_filter_count(), 4);
    }
}
