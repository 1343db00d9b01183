//! Cursor pagination
//!
//! Listing calls return one [`Page`] at a time plus an opaque cursor for the
//! next one. [`Paginator`] turns a page-fetch closure into either a lazy
//! stream or a fully materialized `Vec`.
//!
//! The fetch closure is `Fn`, so every call to [`Paginator::pages`] or
//! [`Paginator::items`] starts over from the first page.
//!
//! Collection is all-or-nothing: the first failing page aborts the walk and
//! whatever was gathered so far is dropped. A provider whose cursor chain
//! never ends will never let `collect` return.
//!
//! ```rust,ignore
//! let paginator = Paginator::new(|page| async move {
//!     client.list_instances(&compartment, None, page.as_deref()).await
//! });
//! let instances = paginator.collect().await?;
//! ```

use std::future::Future;

use futures::stream::{self, Stream, TryStreamExt};
use tracing::trace;

use crate::error::{CoreError, Result};
use crate::model::Page;

/// Walks a cursor-paginated listing
pub struct Paginator<F> {
    fetch: F,
}

impl<F, Fut, T> Paginator<F>
where
    F: Fn(Option<String>) -> Fut,
    Fut: Future<Output = Result<Page<T>>>,
{
    pub fn new(fetch: F) -> Self {
        Self { fetch }
    }

    /// Lazy stream of pages in provider order
    pub fn pages(&self) -> impl Stream<Item = Result<Page<T>>> + '_ {
        // `None` = exhausted, `Some(cursor)` = next page to fetch
        stream::try_unfold(Some(None::<String>), move |state| async move {
            let Some(cursor) = state else {
                return Ok::<_, CoreError>(None);
            };
            trace!(cursor = ?cursor, "Fetching page");
            let page = (self.fetch)(cursor).await?;
            let next = page.next_page.clone().map(Some);
            Ok(Some((page, next)))
        })
    }

    /// Lazy stream of items in page-then-item order
    pub fn items(&self) -> impl Stream<Item = Result<T>> + '_ {
        self.pages()
            .map_ok(|page| stream::iter(page.items.into_iter().map(Ok::<T, CoreError>)))
            .try_flatten()
    }

    /// Fetch every page and return all items
    pub async fn collect(&self) -> Result<Vec<T>> {
        self.collect_where(|_| true).await
    }

    /// Fetch every page and keep the items matching `keep`
    pub async fn collect_where<P>(&self, keep: P) -> Result<Vec<T>>
    where
        P: Fn(&T) -> bool,
    {
        let mut out = Vec::new();
        let mut pages = std::pin::pin!(self.pages());
        let mut fetched = 0usize;
        while let Some(page) = pages.try_next().await? {
            fetched += 1;
            out.extend(page.items.into_iter().filter(|item| keep(item)));
        }
        trace!(pages = fetched, items = out.len(), "Pagination complete");
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn three_pages(cursor: Option<String>) -> Result<Page<u32>> {
        match cursor.as_deref() {
            None => Ok(Page::new(vec![1, 2], Some("p2".to_string()))),
            Some("p2") => Ok(Page::new(vec![3, 4, 5], Some("p3".to_string()))),
            Some("p3") => Ok(Page::last(vec![6])),
            Some(other) => Err(CoreError::remote(format!("bad cursor {other}"))),
        }
    }

    #[tokio::test]
    async fn test_collect_preserves_order() {
        let paginator = Paginator::new(|cursor| async move { three_pages(cursor) });
        let items = paginator.collect().await.unwrap();
        assert_eq!(items, vec![1, 2, 3, 4, 5, 6]);
    }

    #[tokio::test]
    async fn test_collect_where_filters_client_side() {
        let paginator = Paginator::new(|cursor| async move { three_pages(cursor) });
        let evens = paginator.collect_where(|n| n % 2 == 0).await.unwrap();
        assert_eq!(evens, vec![2, 4, 6]);
    }

    #[tokio::test]
    async fn test_items_stream_is_restartable() {
        let calls = AtomicUsize::new(0);
        let paginator = Paginator::new(|cursor| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move { three_pages(cursor) }
        });

        let first: Vec<u32> = paginator.items().try_collect().await.unwrap();
        let second: Vec<u32> = paginator.items().try_collect().await.unwrap();
        assert_eq!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 6);
    }

    #[tokio::test]
    async fn test_lazy_stream_stops_early() {
        let calls = AtomicUsize::new(0);
        let paginator = Paginator::new(|cursor| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move { three_pages(cursor) }
        });

        let first_three: Vec<u32> = paginator
            .items()
            .take(3)
            .try_collect()
            .await
            .unwrap();
        assert_eq!(first_three, vec![1, 2, 3]);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_empty_first_page() {
        let paginator =
            Paginator::new(|_cursor| async move { Ok(Page::<u32>::last(Vec::new())) });
        assert!(paginator.collect().await.unwrap().is_empty());
    }
}
