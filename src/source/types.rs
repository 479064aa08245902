//! Source types and traits

use crate::error::Result;
use futures::future::BoxFuture;
use std::sync::Arc;

/// Pending page returned by a strategy.
///
/// The future owns everything it needs so the paginator can spawn it.
pub type PageFuture<T> = BoxFuture<'static, Result<Vec<T>>>;

/// Core trait for fetch strategies
pub trait PageSource<T>: Send + Sync {
    /// Start loading the page after `existing` (`None` for the first page).
    ///
    /// `limit` is the requested page size, `SINGLE_PAGE_LIMIT` for a single
    /// unbounded request.
    fn load_page(&self, existing: Option<&[T]>, limit: usize) -> PageFuture<T>;
}

impl<T, S> PageSource<T> for Arc<S>
where
    S: PageSource<T> + ?Sized,
{
    fn load_page(&self, existing: Option<&[T]>, limit: usize) -> PageFuture<T> {
        (**self).load_page(existing, limit)
    }
}
