//! Search-engine adapter.
//!
//! A thin REST client for an Elasticsearch-compatible engine plus the
//! query builder used by the scoped search endpoints. Results come back as
//! a [`hits::HitSet`], which paginates with the same page math as the
//! document queryset.

pub mod client;
pub mod hits;
pub mod query;

pub use client::{SearchClient, SearchConfig};
pub use hits::{HitSet, PaginatedHits};
pub use query::{build_search_query, SearchError, SearchTerms};
