//! Filtering, ordering and paging of record listings.
//!
//! Listing handlers describe what they want as a filter value, [`compose`] turns
//! it into an unexecuted sea-orm select, and [`pagination::paginate`] runs the
//! count and the slice query against it.

use sea_orm::DbErr;
use thiserror::Error;

pub mod compose;
pub mod filter;
pub mod pagination;

pub use filter::{AuthorFilter, CommentFilter, NewsFilter, SortKey, TagFilter};
pub use pagination::{
    paginate, ModelSource, PageRequest, PageResult, PageSource, SelectSource,
};

#[derive(Error, Debug)]
pub enum QueryError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error(transparent)]
    Store(#[from] DbErr),
}
