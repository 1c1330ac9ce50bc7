//! Filter and sort selection for content lists.
//!
//! [`FilterCriteria`] is the plain value consumed by the query pipeline;
//! [`FilterState`] owns one and guards every change with validation. The
//! query-string codec lets a selection survive a round trip through a URL.

mod criteria;
mod query;
mod state;

pub use criteria::*;
pub use query::FILTER_KEYS;
pub use state::{FilterGroup, FilterPatch, FilterState};

use thiserror::Error;

/// Errors from filter validation.
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("Invalid {field} range: {min} > {max}")]
    InvalidRange {
        field: &'static str,
        min: String,
        max: String,
    },

    #[error("{field} out of bounds: {value}")]
    OutOfBounds { field: &'static str, value: String },

    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Unknown filter group: {0}")]
    UnknownGroup(String),
}
