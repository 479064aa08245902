//! Fetch strategy implementations
//!
//! Each strategy turns the loaded items into the parameters of one request
//! and hands them to an injected fetch function.

use super::types::{PageFuture, PageSource};
use crate::error::Result;
use crate::types::SINGLE_PAGE_LIMIT;
use futures::FutureExt;
use std::future::Future;

// ============================================================================
// Offset Pagination
// ============================================================================

const ZERO_OFFSET: usize = 0;

/// Offset-based strategy (e.g., SQL-style `?offset=100&limit=50`)
///
/// The offset is the number of items already loaded, so local inserts and
/// removals shift it accordingly.
#[derive(Debug, Clone)]
pub struct OffsetSource<F> {
    fetch: F,
}

impl<F> OffsetSource<F> {
    /// Wrap a `(offset, limit)` fetch function
    pub fn new<T, Fut>(fetch: F) -> Self
    where
        F: Fn(usize, usize) -> Fut,
        Fut: Future<Output = Result<Vec<T>>>,
    {
        Self { fetch }
    }
}

impl<T, F, Fut> PageSource<T> for OffsetSource<F>
where
    F: Fn(usize, usize) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Vec<T>>> + Send + 'static,
{
    fn load_page(&self, existing: Option<&[T]>, limit: usize) -> PageFuture<T> {
        let offset = existing.map_or(ZERO_OFFSET, <[T]>::len);
        (self.fetch)(offset, limit).boxed()
    }
}

// ============================================================================
// Page Number Pagination
// ============================================================================

/// Page number strategy (e.g., `?page=2&per_page=50`)
///
/// The page index is `start_page + loaded / limit`; with the single-page
/// limit every request asks for the start page.
#[derive(Debug, Clone)]
pub struct PageNumberSource<F> {
    fetch: F,
    start_page: usize,
}

impl<F> PageNumberSource<F> {
    /// Wrap a `(page, limit)` fetch function, first page numbered 1
    pub fn new<T, Fut>(fetch: F) -> Self
    where
        F: Fn(usize, usize) -> Fut,
        Fut: Future<Output = Result<Vec<T>>>,
    {
        Self {
            fetch,
            start_page: 1,
        }
    }

    /// Change the number of the first page (usually 0 or 1)
    #[must_use]
    pub fn with_start_page(mut self, start_page: usize) -> Self {
        self.start_page = start_page;
        self
    }

    /// Page to request after `loaded` items
    pub fn page_for(&self, loaded: usize, limit: usize) -> usize {
        if limit == SINGLE_PAGE_LIMIT {
            self.start_page
        } else {
            self.start_page + loaded / limit
        }
    }
}

impl<T, F, Fut> PageSource<T> for PageNumberSource<F>
where
    F: Fn(usize, usize) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Vec<T>>> + Send + 'static,
{
    fn load_page(&self, existing: Option<&[T]>, limit: usize) -> PageFuture<T> {
        let loaded = existing.map_or(0, <[T]>::len);
        (self.fetch)(self.page_for(loaded, limit), limit).boxed()
    }
}

// ============================================================================
// Cursor Pagination
// ============================================================================

/// Cursor-based strategy (e.g., `?starting_after=obj_123`)
///
/// The cursor is the key of the last loaded item; the first page is
/// requested without one.
#[derive(Debug, Clone)]
pub struct CursorSource<F, K> {
    fetch: F,
    key: K,
}

impl<F, K> CursorSource<F, K> {
    /// Wrap a `(cursor, limit)` fetch function and a key extractor
    pub fn new<T, Fut>(fetch: F, key: K) -> Self
    where
        F: Fn(Option<String>, usize) -> Fut,
        K: Fn(&T) -> String,
        Fut: Future<Output = Result<Vec<T>>>,
    {
        Self { fetch, key }
    }
}

impl<T, F, K, Fut> PageSource<T> for CursorSource<F, K>
where
    F: Fn(Option<String>, usize) -> Fut + Send + Sync,
    K: Fn(&T) -> String + Send + Sync,
    Fut: Future<Output = Result<Vec<T>>> + Send + 'static,
{
    fn load_page(&self, existing: Option<&[T]>, limit: usize) -> PageFuture<T> {
        let cursor = existing.and_then(<[T]>::last).map(&self.key);
        (self.fetch)(cursor, limit).boxed()
    }
}
