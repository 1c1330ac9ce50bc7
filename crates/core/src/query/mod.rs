//! Filter, sort and paginate a locally cached item set.
//!
//! Everything here is pure: the same items, criteria and page always
//! produce the same [`QueryPage`].

use std::cmp::Ordering;

use chrono::NaiveDate;
use serde::Serialize;

use crate::catalog::CatalogItem;
use crate::filters::{FilterCriteria, SortKey, SortOrder};

/// Items per page.
pub const PAGE_SIZE: usize = 20;

/// One visible page of a filtered, sorted list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryPage {
    pub items: Vec<CatalogItem>,
    /// The page actually served, after clamping.
    pub page: usize,
    /// Never less than 1, even for an empty result.
    pub total_pages: usize,
    /// Number of items that passed the filters.
    pub total_results: usize,
}

/// Run the full pipeline over `items`.
///
/// `page` is 1-based and clamped to `[1, total_pages]`.
pub fn run_query(items: &[CatalogItem], criteria: &FilterCriteria, page: usize) -> QueryPage {
    let mut filtered: Vec<&CatalogItem> = items.iter().filter(|i| matches(i, criteria)).collect();
    sort_items(&mut filtered, criteria.sort_by, criteria.sort_order);

    let total_results = filtered.len();
    let total_pages = total_results.div_ceil(PAGE_SIZE).max(1);
    let page = page.clamp(1, total_pages);
    let start = (page - 1) * PAGE_SIZE;

    QueryPage {
        items: filtered
            .into_iter()
            .skip(start)
            .take(PAGE_SIZE)
            .cloned()
            .collect(),
        page,
        total_pages,
        total_results,
    }
}

/// Whether `item` satisfies every active criterion.
pub fn matches(item: &CatalogItem, criteria: &FilterCriteria) -> bool {
    if criteria.genres_active()
        && !criteria.genres.iter().all(|g| item.genre_ids.contains(g))
    {
        return false;
    }

    if criteria.rating_active()
        && !(criteria.min_rating..=criteria.max_rating).contains(&item.rating)
    {
        return false;
    }

    if criteria.runtime_active() {
        let runtime = item.runtime_minutes.unwrap_or(0);
        if !(criteria.min_runtime..=criteria.max_runtime).contains(&runtime) {
            return false;
        }
    }

    if criteria.votes_active()
        && !(criteria.min_votes..=criteria.max_votes).contains(&item.vote_count)
    {
        return false;
    }

    if let Some(language) = &criteria.language {
        if item.original_language.as_deref() != Some(language.as_str()) {
            return false;
        }
    }

    if criteria.release_date_active() {
        // ISO dates order correctly as strings.
        let Some(date) = item.date.as_deref() else {
            return false;
        };
        if let Some(from) = criteria.release_date_from.as_deref() {
            if date < from {
                return false;
            }
        }
        if let Some(to) = criteria.release_date_to.as_deref() {
            if date > to {
                return false;
            }
        }
    }

    if criteria.keywords_active()
        && !criteria
            .keywords
            .iter()
            .any(|k| item.keyword_ids.contains(&k.id))
    {
        return false;
    }

    true
}

/// Stable sort; equal keys keep their input order in both directions.
pub fn sort_items(items: &mut [&CatalogItem], key: SortKey, order: SortOrder) {
    items.sort_by(|a, b| {
        let ord = compare(a, b, key);
        match order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    });
}

fn compare(a: &CatalogItem, b: &CatalogItem, key: SortKey) -> Ordering {
    match key {
        SortKey::Popularity => a.popularity.total_cmp(&b.popularity),
        SortKey::VoteAverage => a.rating.total_cmp(&b.rating),
        SortKey::VoteCount => a.vote_count.cmp(&b.vote_count),
        SortKey::ReleaseDate | SortKey::FirstAirDate => sort_date(a).cmp(&sort_date(b)),
        SortKey::Title | SortKey::Name => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
    }
}

/// Missing or unparseable dates sort as 1900-01-01.
fn sort_date(item: &CatalogItem) -> NaiveDate {
    item.date
        .as_deref()
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
        .unwrap_or_else(fallback_date)
}

fn fallback_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1900, 1, 1).unwrap_or(NaiveDate::MIN)
}
