//! Pagination
//!
//! Walks cursor-paginated endpoints page by page until the server reports no
//! more records.

use crate::error::Result;
use std::future::Future;

/// One page of results from a cursor-paginated endpoint
pub trait Page {
    type Item;

    /// Cursor of the following page, or `None` on the last page
    fn next_cursor(&self) -> Option<String>;

    /// Consume the page, yielding its records
    fn into_items(self) -> Vec<Self::Item>;
}

/// Position of a page within a walk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page number
    pub number: u32,

    /// Cursor to request this page with
    pub cursor: String,
}

/// Sequential page walker
#[derive(Debug, Clone)]
pub struct Paginator {
    start: String,
    max_pages: Option<u32>,
}

impl Paginator {
    /// Start walking from `start` (QPS endpoints start from id "0")
    pub fn new(start: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            max_pages: None,
        }
    }

    /// Stop after `max_pages` pages even if more are available
    pub fn max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = Some(max_pages);
        self
    }

    /// Fetch pages one after another and collect every record
    ///
    /// The first error aborts the walk and is returned as is.
    pub async fn collect<P, F, Fut>(&self, mut fetch: F) -> Result<Vec<P::Item>>
    where
        P: Page,
        F: FnMut(PageRequest) -> Fut,
        Fut: Future<Output = Result<P>>,
    {
        let mut items = Vec::new();
        let mut cursor = self.start.clone();
        let mut number = 0u32;

        loop {
            if self.max_pages.is_some_and(|max| number >= max) {
                tracing::debug!(pages = number, "page limit reached");
                break;
            }
            number += 1;
            tracing::debug!(page = number, cursor = %cursor, "fetching page");

            let page = fetch(PageRequest {
                number,
                cursor: cursor.clone(),
            })
            .await?;

            let next = page.next_cursor();
            items.extend(page.into_items());

            match next {
                Some(next) if next == cursor => {
                    tracing::warn!(cursor = %cursor, "server repeated the same cursor, stopping");
                    break;
                }
                Some(next) => cursor = next,
                None => break,
            }
        }

        tracing::debug!(pages = number, records = items.len(), "pagination complete");
        Ok(items)
    }
}
