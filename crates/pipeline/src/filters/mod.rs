//! Filter implementations.
//!
//! Each filter queries one scoring service and turns its ranked lists into
//! relevance contributions.

pub mod search;

pub use search::{
    DEFAULT_PER_CRITERION_LIMIT, MULTI_SEARCH_PATH, SEARCH_SERVICE, SearchFilter, SubCriterion,
};
