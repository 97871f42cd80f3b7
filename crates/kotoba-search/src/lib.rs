//! Runs a compiled query over one dictionary file, filling capped
//! relevance buckets that a consumer drains best-first.

mod search;

pub use kotoba_core::SearchError;
pub use search::{Caps, DEFAULT_CAP, Outcome, Search, SearchResult, SearchStatus};
