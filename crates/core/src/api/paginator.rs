//! Eager collection of paginated list endpoints
//!
//! Two continuation styles exist in API v4:
//! - [`PageStyle::PageNumber`]: the `page` query parameter is incremented on
//!   the same path while the response carries a `next` link (leads, tasks,
//!   notes, catalogs).
//! - [`PageStyle::NextLink`]: the absolute `next` link is followed verbatim
//!   (contacts).
//!
//! Both are bounded by `max_pages` and fail fast when the cursor stops
//! advancing.

use std::sync::Arc;

use amocrm_domain::constants::{DEFAULT_MAX_PAGES, MAX_PAGE_SIZE};
use amocrm_domain::{AmoError, ListEnvelope, Result};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::ports::{RequestExecutor, RequestExecutorExt};
use super::request::ApiRequest;

/// How the next page of a collection is requested
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PageStyle {
    #[default]
    PageNumber,
    NextLink,
}

/// Options of one pagination loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationOptions {
    /// Used when the request does not set `limit` itself.
    pub page_size: u32,
    pub style: PageStyle,
    /// Upper bound on requests; `None` disables the cap.
    pub max_pages: Option<u32>,
}

impl Default for PaginationOptions {
    fn default() -> Self {
        Self {
            page_size: MAX_PAGE_SIZE,
            style: PageStyle::PageNumber,
            max_pages: Some(DEFAULT_MAX_PAGES),
        }
    }
}

impl PaginationOptions {
    #[must_use]
    pub fn next_link() -> Self {
        Self { style: PageStyle::NextLink, ..Self::default() }
    }

    #[must_use]
    pub const fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    #[must_use]
    pub const fn with_max_pages(mut self, max_pages: Option<u32>) -> Self {
        self.max_pages = max_pages;
        self
    }
}

/// Drives a [`RequestExecutor`] across every page of a collection
pub struct Paginator<E: ?Sized> {
    executor: Arc<E>,
}

impl<E: ?Sized> Clone for Paginator<E> {
    fn clone(&self) -> Self {
        Self { executor: Arc::clone(&self.executor) }
    }
}

impl<E> Paginator<E>
where
    E: RequestExecutor + ?Sized,
{
    pub fn new(executor: Arc<E>) -> Self {
        Self { executor }
    }

    /// Fetch every page and return the embedded `key` items in server order
    ///
    /// # Errors
    /// - Any error of the underlying executor, unchanged
    /// - `AmoError::Decode` if a page is not a collection of `T`
    /// - `AmoError::Pagination` if `max_pages` is exceeded or the cursor
    ///   stops advancing
    pub async fn collect<T>(
        &self,
        request: ApiRequest,
        key: &str,
        options: PaginationOptions,
    ) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let mut request = request;
        {
            let query = request.query_params_mut();
            if !query.has_limit() {
                *query = std::mem::take(query).limit(options.page_size);
            }
            if query.current_page().is_none() {
                query.set_page(1);
            }
        }

        let mut items = Vec::new();
        let mut fetched_pages: u32 = 0;

        loop {
            if let Some(max) = options.max_pages {
                if fetched_pages >= max {
                    warn!(key, max_pages = max, "pagination cap reached");
                    return Err(AmoError::Pagination(format!(
                        "'{key}' has more than {max} pages"
                    )));
                }
            }
            fetched_pages = fetched_pages.saturating_add(1);

            let Some(mut envelope) = self.executor.execute::<ListEnvelope>(&request).await? else {
                debug!(key, page = fetched_pages, "no content; collection exhausted");
                break;
            };

            let batch: Vec<T> = envelope.take_items(key)?;
            let batch_len = batch.len();
            items.extend(batch);
            debug!(key, page = fetched_pages, items = batch_len, total = items.len(), "page fetched");

            let Some(next) = envelope.links.next_href() else {
                break;
            };

            request = match options.style {
                PageStyle::PageNumber => {
                    let current = request.query_params().current_page().unwrap_or(1);
                    let next_page =
                        envelope.page.unwrap_or(current).checked_add(1).ok_or_else(|| {
                            AmoError::Pagination(format!("'{key}' page number out of range"))
                        })?;
                    if batch_len == 0 || next_page <= current {
                        return Err(stalled(key, &format!("page {current}")));
                    }
                    request.query_params_mut().set_page(next_page);
                    request
                }
                PageStyle::NextLink => {
                    let fetched = envelope.links.self_href().unwrap_or_else(|| request.target());
                    if next == fetched || next == request.target() {
                        return Err(stalled(key, next));
                    }
                    request.retarget(next)
                }
            };
        }

        Ok(items)
    }
}

fn stalled(key: &str, cursor: &str) -> AmoError {
    warn!(key, cursor, "pagination cursor did not advance");
    AmoError::Pagination(format!("'{key}' pagination stalled at {cursor}"))
}
