//! Local catalog items.
//!
//! Listing results arrive in three shapes (movie, show, person). They are
//! normalized into one [`CatalogItem`] so the query pipeline can treat every
//! content type the same way.

mod normalize;
mod types;

pub use types::*;
