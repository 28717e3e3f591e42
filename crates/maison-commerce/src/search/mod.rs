//! Search module.
//!
//! Contains product listing filters, sorting, and pagination.

mod filter;
mod query;
mod results;

pub use filter::ProductFilter;
pub use query::{ProductQuery, SortOption, DEFAULT_PER_PAGE, MAX_PER_PAGE};
pub use results::{Pagination, SearchResults};
