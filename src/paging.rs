//! Limit/offset pagination flattening.
//!
//! Spotify hands out collections one page at a time. [`fetch_all`] keeps
//! requesting pages, in increasing offset order, until a page comes back
//! with fewer items than the page limit, and returns every item in the
//! order the API produced them.
//!
//! A collection of `n` items read with page size `l` costs `ceil(n / l)`
//! requests, or one more when `n` is an exact multiple of `l` since only
//! a short (possibly empty) page signals the end.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::error::{SyncError, TransportError};

/// One page of a limit/offset paginated collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub limit: u32,
    pub offset: u32,
    #[serde(default)]
    pub total: Option<u32>,
    #[serde(default)]
    pub next: Option<String>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, limit: u32, offset: u32) -> Self {
        Self {
            items,
            limit,
            offset,
            total: None,
            next: None,
        }
    }

    /// Converts every item, keeping the page shape (and so its length) intact.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            limit: self.limit,
            offset: self.offset,
            total: self.total,
            next: self.next,
        }
    }
}

/// Paging parameters for a single request. `None` leaves the choice to the remote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageWindow {
    pub offset: Option<u32>,
    pub limit: Option<u32>,
}

impl PageWindow {
    pub fn new(offset: u32, limit: u32) -> Self {
        Self {
            offset: Some(offset),
            limit: Some(limit),
        }
    }
}

/// Anything that can fetch a single page of a collection.
pub trait PageSource {
    type Item;

    fn fetch_page(
        &self,
        window: PageWindow,
    ) -> impl Future<Output = Result<Page<Self::Item>, TransportError>>;
}

/// Reads a whole collection through `fetch`, one page at a time.
///
/// The first request carries the caller's `limit` and `offset` as given.
/// Whatever the caller left out is taken from the first page the remote
/// returns. Every following request asks for the next `limit` items.
///
/// # Errors
///
/// - [`SyncError::Transport`] as soon as any page fails; nothing fetched
///   so far is returned.
/// - [`SyncError::ProtocolViolation`] if the page limit is zero or a page
///   holds more items than the limit.
pub async fn fetch_all<T, F, Fut>(
    mut fetch: F,
    limit: Option<u32>,
    offset: Option<u32>,
) -> Result<Vec<T>, SyncError>
where
    F: FnMut(PageWindow) -> Fut,
    Fut: Future<Output = Result<Page<T>, TransportError>>,
{
    let first = fetch(PageWindow { offset, limit }).await?;

    let limit = limit.unwrap_or(first.limit);
    let mut offset = offset.unwrap_or(first.offset);
    if limit == 0 {
        return Err(SyncError::ProtocolViolation(
            "page limit must be positive".to_string(),
        ));
    }

    let mut fetched = checked_len(&first, limit)?;
    let mut items = first.items;

    while fetched == limit {
        offset = offset.checked_add(limit).ok_or_else(|| {
            SyncError::ProtocolViolation(format!("offset overflow after {} items", items.len()))
        })?;

        let page = fetch(PageWindow::new(offset, limit)).await?;
        fetched = checked_len(&page, limit)?;
        items.extend(page.items);
    }

    Ok(items)
}

/// [`fetch_all`] over a [`PageSource`].
pub async fn fetch_all_from<S: PageSource>(
    source: &S,
    limit: Option<u32>,
    offset: Option<u32>,
) -> Result<Vec<S::Item>, SyncError> {
    fetch_all(move |window| source.fetch_page(window), limit, offset).await
}

fn checked_len<T>(page: &Page<T>, limit: u32) -> Result<u32, SyncError> {
    match u32::try_from(page.items.len()) {
        Ok(len) if len <= limit => Ok(len),
        _ => Err(SyncError::ProtocolViolation(format!(
            "page at offset {} holds {} items, limit is {}",
            page.offset,
            page.items.len(),
            limit
        ))),
    }
}
