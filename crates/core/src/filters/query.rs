//! Query-string representation of [`FilterCriteria`].
//!
//! Only non-default fields are emitted, so an unfiltered view serializes to
//! an empty query. List fields are comma-joined; keywords by ID.

use std::collections::BTreeMap;
use std::str::FromStr;

use super::criteria::{
    FilterCriteria, Keyword, SortKey, SortOrder, MAX_RATING, MAX_RUNTIME, MAX_VOTES, MIN_RATING,
};
use super::FilterError;

pub const GENRES: &str = "genres";
pub const MIN_RATING_KEY: &str = "minRating";
pub const MAX_RATING_KEY: &str = "maxRating";
pub const MIN_RUNTIME_KEY: &str = "minRuntime";
pub const MAX_RUNTIME_KEY: &str = "maxRuntime";
pub const MIN_VOTES_KEY: &str = "minVotes";
pub const MAX_VOTES_KEY: &str = "maxVotes";
pub const LANGUAGE: &str = "language";
pub const RELEASE_DATE_FROM: &str = "releaseDateFrom";
pub const RELEASE_DATE_TO: &str = "releaseDateTo";
pub const KEYWORDS: &str = "keywords";
pub const SORT_BY: &str = "sortBy";
pub const SORT_ORDER: &str = "sortOrder";

/// Every key understood by [`FilterCriteria::from_query`].
pub const FILTER_KEYS: [&str; 13] = [
    GENRES,
    MIN_RATING_KEY,
    MAX_RATING_KEY,
    MIN_RUNTIME_KEY,
    MAX_RUNTIME_KEY,
    MIN_VOTES_KEY,
    MAX_VOTES_KEY,
    LANGUAGE,
    RELEASE_DATE_FROM,
    RELEASE_DATE_TO,
    KEYWORDS,
    SORT_BY,
    SORT_ORDER,
];

fn join<T: ToString>(values: impl IntoIterator<Item = T>) -> String {
    values
        .into_iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

fn split_ids(value: &str) -> Vec<u32> {
    value
        .split(',')
        .filter_map(|part| part.trim().parse().ok())
        .collect()
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

impl FilterCriteria {
    /// Serialize the non-default fields.
    pub fn to_query(&self) -> BTreeMap<String, String> {
        let mut query = BTreeMap::new();
        let mut put = |key: &str, value: String| {
            query.insert(key.to_string(), value);
        };

        if !self.genres.is_empty() {
            put(GENRES, join(&self.genres));
        }
        if self.min_rating > MIN_RATING {
            put(MIN_RATING_KEY, self.min_rating.to_string());
        }
        if self.max_rating < MAX_RATING {
            put(MAX_RATING_KEY, self.max_rating.to_string());
        }
        if self.min_runtime > 0 {
            put(MIN_RUNTIME_KEY, self.min_runtime.to_string());
        }
        if self.max_runtime < MAX_RUNTIME {
            put(MAX_RUNTIME_KEY, self.max_runtime.to_string());
        }
        if self.min_votes > 0 {
            put(MIN_VOTES_KEY, self.min_votes.to_string());
        }
        if self.max_votes < MAX_VOTES {
            put(MAX_VOTES_KEY, self.max_votes.to_string());
        }
        if let Some(language) = &self.language {
            put(LANGUAGE, language.clone());
        }
        if let Some(from) = &self.release_date_from {
            put(RELEASE_DATE_FROM, from.clone());
        }
        if let Some(to) = &self.release_date_to {
            put(RELEASE_DATE_TO, to.clone());
        }
        if !self.keywords.is_empty() {
            put(KEYWORDS, join(self.keywords.iter().map(|k| k.id)));
        }
        if self.sort_by != SortKey::default() {
            put(SORT_BY, self.sort_by.to_string());
        }
        if self.sort_order != SortOrder::default() {
            put(SORT_ORDER, self.sort_order.as_str().to_string());
        }

        query
    }

    /// Percent-encoded `key=value&...` form of [`to_query`](Self::to_query).
    pub fn to_query_string(&self) -> String {
        self.to_query()
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Parse criteria from query pairs.
    ///
    /// Unknown keys and unparseable values are ignored and leave the field
    /// at its default. The result is validated, so well-formed but
    /// contradictory ranges are rejected.
    pub fn from_query<I, K, V>(pairs: I) -> Result<Self, FilterError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut criteria = FilterCriteria::default();

        for (key, value) in pairs {
            let value = value.as_ref();
            match key.as_ref() {
                GENRES => criteria.genres = split_ids(value),
                MIN_RATING_KEY => set_parsed(&mut criteria.min_rating, value),
                MAX_RATING_KEY => set_parsed(&mut criteria.max_rating, value),
                MIN_RUNTIME_KEY => set_parsed(&mut criteria.min_runtime, value),
                MAX_RUNTIME_KEY => set_parsed(&mut criteria.max_runtime, value),
                MIN_VOTES_KEY => set_parsed(&mut criteria.min_votes, value),
                MAX_VOTES_KEY => set_parsed(&mut criteria.max_votes, value),
                LANGUAGE => criteria.language = non_empty(value),
                RELEASE_DATE_FROM => criteria.release_date_from = non_empty(value),
                RELEASE_DATE_TO => criteria.release_date_to = non_empty(value),
                KEYWORDS => {
                    criteria.keywords = split_ids(value)
                        .into_iter()
                        .map(|id| Keyword::new(id, String::new()))
                        .collect()
                }
                SORT_BY => criteria.sort_by = SortKey::parse(value.trim()),
                SORT_ORDER => set_parsed(&mut criteria.sort_order, value),
                _ => {}
            }
        }

        criteria.validate()?;
        Ok(criteria)
    }
}

fn set_parsed<T: FromStr>(field: &mut T, value: &str) {
    if let Ok(parsed) = value.trim().parse() {
        *field = parsed;
    }
}
