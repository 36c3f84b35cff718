//! Prismic content backend
//!
//! A thin client over the REST search API: predicate queries with page size
//! and field projection, lookup by uid, and following `next_page` pointers.

mod client;
mod predicate;

pub use client::{Document, PrismicClient, SearchResponse};
pub use predicate::{Predicate, Query};
