//! Mutable filter selection owned by one view.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::criteria::{FilterCriteria, Keyword, SortKey, SortOrder};
use super::FilterError;

/// One independently clearable group of criteria.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterGroup {
    Genres,
    Rating,
    Runtime,
    Votes,
    Language,
    ReleaseDate,
    Keywords,
    Sort,
}

impl FilterGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterGroup::Genres => "genres",
            FilterGroup::Rating => "rating",
            FilterGroup::Runtime => "runtime",
            FilterGroup::Votes => "votes",
            FilterGroup::Language => "language",
            FilterGroup::ReleaseDate => "release_date",
            FilterGroup::Keywords => "keywords",
            FilterGroup::Sort => "sort",
        }
    }
}

impl fmt::Display for FilterGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterGroup {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "genres" => Ok(FilterGroup::Genres),
            "rating" => Ok(FilterGroup::Rating),
            "runtime" => Ok(FilterGroup::Runtime),
            "votes" => Ok(FilterGroup::Votes),
            "language" => Ok(FilterGroup::Language),
            "release_date" => Ok(FilterGroup::ReleaseDate),
            "keywords" => Ok(FilterGroup::Keywords),
            "sort" => Ok(FilterGroup::Sort),
            other => Err(FilterError::UnknownGroup(other.to_string())),
        }
    }
}

/// Partial update; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterPatch {
    pub sort_by: Option<SortKey>,
    pub sort_order: Option<SortOrder>,
    pub genres: Option<Vec<u32>>,
    pub min_rating: Option<f64>,
    pub max_rating: Option<f64>,
    pub min_runtime: Option<u32>,
    pub max_runtime: Option<u32>,
    pub min_votes: Option<u64>,
    pub max_votes: Option<u64>,
    /// `Some("")` clears the language.
    pub language: Option<String>,
    /// `Some("")` clears the bound.
    pub release_date_from: Option<String>,
    pub release_date_to: Option<String>,
    pub keywords: Option<Vec<Keyword>>,
}

fn non_empty(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}

impl FilterPatch {
    fn apply_to(self, criteria: &mut FilterCriteria) {
        if let Some(v) = self.sort_by {
            criteria.sort_by = v;
        }
        if let Some(v) = self.sort_order {
            criteria.sort_order = v;
        }
        if let Some(v) = self.genres {
            criteria.genres = v;
        }
        if let Some(v) = self.min_rating {
            criteria.min_rating = v;
        }
        if let Some(v) = self.max_rating {
            criteria.max_rating = v;
        }
        if let Some(v) = self.min_runtime {
            criteria.min_runtime = v;
        }
        if let Some(v) = self.max_runtime {
            criteria.max_runtime = v;
        }
        if let Some(v) = self.min_votes {
            criteria.min_votes = v;
        }
        if let Some(v) = self.max_votes {
            criteria.max_votes = v;
        }
        if let Some(v) = self.language {
            criteria.language = non_empty(v);
        }
        if let Some(v) = self.release_date_from {
            criteria.release_date_from = non_empty(v);
        }
        if let Some(v) = self.release_date_to {
            criteria.release_date_to = non_empty(v);
        }
        if let Some(v) = self.keywords {
            criteria.keywords = v;
        }
    }
}

/// The filter selection for one content list.
///
/// Updates are validated as a whole: a rejected update leaves the previous
/// criteria in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterState {
    criteria: FilterCriteria,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from criteria that were already validated (e.g. parsed from a
    /// query string).
    pub fn from_criteria(criteria: FilterCriteria) -> Result<Self, FilterError> {
        criteria.validate()?;
        Ok(Self { criteria })
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    /// Merge `patch` into the current criteria.
    pub fn update(&mut self, patch: FilterPatch) -> Result<(), FilterError> {
        let mut next = self.criteria.clone();
        patch.apply_to(&mut next);
        next.validate()?;
        self.criteria = next;
        Ok(())
    }

    pub fn set_genres(&mut self, genres: Vec<u32>) {
        self.criteria.genres = genres;
    }

    /// Add the genre if absent, remove it otherwise.
    pub fn toggle_genre(&mut self, genre_id: u32) {
        if let Some(pos) = self.criteria.genres.iter().position(|g| *g == genre_id) {
            self.criteria.genres.remove(pos);
        } else {
            self.criteria.genres.push(genre_id);
        }
    }

    pub fn set_rating_range(&mut self, min: f64, max: f64) -> Result<(), FilterError> {
        self.update(FilterPatch {
            min_rating: Some(min),
            max_rating: Some(max),
            ..FilterPatch::default()
        })
    }

    pub fn set_runtime_range(&mut self, min: u32, max: u32) -> Result<(), FilterError> {
        self.update(FilterPatch {
            min_runtime: Some(min),
            max_runtime: Some(max),
            ..FilterPatch::default()
        })
    }

    pub fn set_votes_range(&mut self, min: u64, max: u64) -> Result<(), FilterError> {
        self.update(FilterPatch {
            min_votes: Some(min),
            max_votes: Some(max),
            ..FilterPatch::default()
        })
    }

    /// An empty code clears the language filter.
    pub fn set_language(&mut self, language: &str) {
        self.criteria.language = non_empty(language.to_string());
    }

    /// Empty strings leave that side unbounded.
    pub fn set_release_dates(&mut self, from: &str, to: &str) -> Result<(), FilterError> {
        self.update(FilterPatch {
            release_date_from: Some(from.to_string()),
            release_date_to: Some(to.to_string()),
            ..FilterPatch::default()
        })
    }

    pub fn set_keywords(&mut self, keywords: Vec<Keyword>) {
        self.criteria.keywords = keywords;
    }

    pub fn set_sort(&mut self, sort_by: SortKey, sort_order: SortOrder) {
        self.criteria.sort_by = sort_by;
        self.criteria.sort_order = sort_order;
    }

    /// Restore every default.
    pub fn reset(&mut self) {
        self.criteria = FilterCriteria::default();
    }

    /// Reset one group and return the resulting query.
    pub fn clear_one(&mut self, group: FilterGroup) -> BTreeMap<String, String> {
        let defaults = FilterCriteria::default();
        let c = &mut self.criteria;

        match group {
            FilterGroup::Genres => c.genres = defaults.genres,
            FilterGroup::Rating => {
                c.min_rating = defaults.min_rating;
                c.max_rating = defaults.max_rating;
            }
            FilterGroup::Runtime => {
                c.min_runtime = defaults.min_runtime;
                c.max_runtime = defaults.max_runtime;
            }
            FilterGroup::Votes => {
                c.min_votes = defaults.min_votes;
                c.max_votes = defaults.max_votes;
            }
            FilterGroup::Language => c.language = defaults.language,
            FilterGroup::ReleaseDate => {
                c.release_date_from = defaults.release_date_from;
                c.release_date_to = defaults.release_date_to;
            }
            FilterGroup::Keywords => c.keywords = defaults.keywords,
            FilterGroup::Sort => {
                c.sort_by = defaults.sort_by;
                c.sort_order = defaults.sort_order;
            }
        }

        self.to_query()
    }

    pub fn to_query(&self) -> BTreeMap<String, String> {
        self.criteria.to_query()
    }

    pub fn to_query_string(&self) -> String {
        self.criteria.to_query_string()
    }

    pub fn active_filter_count(&self) -> usize {
        self.criteria.active_filter_count()
    }

    pub fn has_active_filters(&self) -> bool {
        self.criteria.has_active_filters()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_merges_fields() {
        let mut state = FilterState::new();
        state
            .update(FilterPatch {
                genres: Some(vec![18]),
                min_rating: Some(7.0),
                ..FilterPatch::default()
            })
            .unwrap();
        state
            .update(FilterPatch {
                language: Some("en".to_string()),
                ..FilterPatch::default()
            })
            .unwrap();

        let c = state.criteria();
        assert_eq!(c.genres, vec![18]);
        assert_eq!(c.min_rating, 7.0);
        assert_eq!(c.language.as_deref(), Some("en"));
    }

    #[test]
    fn test_invalid_update_leaves_state_unchanged() {
        let mut state = FilterState::new();
        state.set_rating_range(5.0, 8.0).unwrap();

        let err = state.set_rating_range(9.0, 3.0).unwrap_err();
        assert!(matches!(err, FilterError::InvalidRange { .. }));
        assert_eq!(state.criteria().min_rating, 5.0);
        assert_eq!(state.criteria().max_rating, 8.0);
    }

    #[test]
    fn test_toggle_genre() {
        let mut state = FilterState::new();
        state.toggle_genre(28);
        state.toggle_genre(35);
        state.toggle_genre(28);
        assert_eq!(state.criteria().genres, vec![35]);
    }

    #[test]
    fn test_release_dates_empty_is_unbounded() {
        let mut state = FilterState::new();
        state.set_release_dates("2020-01-01", "").unwrap();
        assert_eq!(
            state.criteria().release_date_from.as_deref(),
            Some("2020-01-01")
        );
        assert!(state.criteria().release_date_to.is_none());
    }

    #[test]
    fn test_clear_one_resets_only_that_group() {
        let mut state = FilterState::new();
        state.set_genres(vec![18, 35]);
        state.set_votes_range(100, 1000).unwrap();
        state.set_sort(SortKey::Title, SortOrder::Asc);

        let query = state.clear_one(FilterGroup::Votes);

        assert!(!query.contains_key("minVotes"));
        assert!(!query.contains_key("maxVotes"));
        assert_eq!(query.get("genres").map(String::as_str), Some("18,35"));
        assert_eq!(query.get("sortBy").map(String::as_str), Some("title"));
        assert_eq!(state.active_filter_count(), 2);
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut state = FilterState::new();
        state.set_language("fr");
        state.set_keywords(vec![Keyword::new(1, "heist")]);
        assert!(state.has_active_filters());

        state.reset();
        assert!(!state.has_active_filters());
        assert_eq!(state.to_query_string(), "");
    }

    #[test]
    fn test_filter_group_parse() {
        assert_eq!(
            "release_date".parse::<FilterGroup>().unwrap(),
            FilterGroup::ReleaseDate
        );
        assert!("providers".parse::<FilterGroup>().is_err());
    }
}
