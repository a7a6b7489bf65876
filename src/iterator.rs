use crate::types::{Cursor, Page};
use crate::Result;

use async_trait::async_trait;
use futures::future::LocalBoxFuture;
use std::collections::VecDeque;

/// Async iterator trait for cursor-paginated remote listings.
///
/// This trait provides a common interface for walking channel lists, channel
/// history and playlist listings. Pages are fetched lazily: nothing is requested
/// until the first call to [`next`](Self::next), and a further page is only
/// requested once the previous one has been handed out completely.
#[async_trait(?Send)]
pub trait AsyncPaginatedIterator<T> {
    /// Fetch the next item from the iterator.
    ///
    /// This method automatically handles pagination, fetching new pages as needed.
    /// Returns `None` when there are no more items available.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(item))` - Next item in the sequence
    /// - `Ok(None)` - No more items available
    /// - `Err(...)` - A page fetch failed; the sequence ends here
    async fn next(&mut self) -> Result<Option<T>>;

    /// Collect all remaining items into a Vec.
    ///
    /// **Warning**: This method will fetch ALL remaining pages, which for a
    /// channel history can be the whole lifetime of the channel. Prefer
    /// [`find`](Self::find) or item-by-item processing.
    async fn collect_all(&mut self) -> Result<Vec<T>> {
        let mut items = Vec::new();
        while let Some(item) = self.next().await? {
            items.push(item);
        }
        Ok(items)
    }

    /// Return the first item matching `predicate`, fetching no further pages
    /// than needed to find it.
    async fn find<P>(&mut self, predicate: P) -> Result<Option<T>>
    where
        P: Fn(&T) -> bool,
    {
        while let Some(item) = self.next().await? {
            if predicate(&item) {
                return Ok(Some(item));
            }
        }
        Ok(None)
    }

    /// Number of pages fetched so far.
    fn pages_fetched(&self) -> u32;
}

/// Future returned by a page fetch function.
pub type PageFuture<'a, T> = LocalBoxFuture<'a, Result<Page<T>>>;

/// The one cursor-pagination loop, parametrized by the page fetch function.
///
/// The fetch function receives the cursor to request (empty for the first
/// page) and returns the page's items together with the next cursor. Iteration
/// ends after the page that reports an empty next cursor.
///
/// # Examples
///
/// ```rust
/// use futures::FutureExt;
/// use spotctl::{AsyncPaginatedIterator, Cursor, CursorIterator, Page};
///
/// # tokio_test::block_on(async {
/// let mut numbers = CursorIterator::new(|cursor: Cursor| {
///     async move {
///         Ok(match cursor.as_str() {
///             "" => Page::new(vec![1, 2], "page-2"),
///             _ => Page::last(vec![3]),
///         })
///     }
///     .boxed_local()
/// });
///
/// assert_eq!(numbers.collect_all().await?, vec![1, 2, 3]);
/// assert_eq!(numbers.pages_fetched(), 2);
/// # Ok::<(), spotctl::ScrapeError>(())
/// # });
/// ```
pub struct CursorIterator<'a, T> {
    fetch: Box<dyn FnMut(Cursor) -> PageFuture<'a, T> + 'a>,
    cursor: Cursor,
    buffer: VecDeque<T>,
    pages_fetched: u32,
    finished: bool,
}

impl<'a, T> CursorIterator<'a, T> {
    pub fn new<F>(fetch: F) -> Self
    where
        F: FnMut(Cursor) -> PageFuture<'a, T> + 'a,
    {
        Self {
            fetch: Box::new(fetch),
            cursor: Cursor::start(),
            buffer: VecDeque::new(),
            pages_fetched: 0,
            finished: false,
        }
    }

    /// Fetch the next page into the buffer.
    ///
    /// A failed fetch finishes the iterator so the error is reported once and
    /// the sequence does not silently resume.
    async fn fetch_next_page(&mut self) -> Result<()> {
        log::debug!(
            "Fetching page {} (cursor: {:?})",
            self.pages_fetched + 1,
            self.cursor.as_str()
        );

        let page = match (self.fetch)(self.cursor.clone()).await {
            Ok(page) => page,
            Err(e) => {
                self.finished = true;
                return Err(e);
            }
        };

        self.pages_fetched += 1;
        self.finished = page.next_cursor.is_end();
        self.cursor = page.next_cursor;
        self.buffer.extend(page.items);
        Ok(())
    }
}

#[async_trait(?Send)]
impl<'a, T> AsyncPaginatedIterator<T> for CursorIterator<'a, T> {
    async fn next(&mut self) -> Result<Option<T>> {
        // Pages may legitimately be empty while more follow.
        while self.buffer.is_empty() && !self.finished {
            self.fetch_next_page().await?;
        }
        Ok(self.buffer.pop_front())
    }

    fn pages_fetched(&self) -> u32 {
        self.pages_fetched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ScrapeError;
    use futures::FutureExt;
    use std::cell::RefCell;

    /// Serves canned pages keyed by the cursor that requests them.
    fn pages<'a>(
        pages: Vec<(&'static str, Result<Page<u32>>)>,
        requested: &'a RefCell<Vec<String>>,
    ) -> CursorIterator<'a, u32> {
        let pages = RefCell::new(pages);
        CursorIterator::new(move |cursor: Cursor| {
            requested.borrow_mut().push(cursor.as_str().to_string());
            let mut pages = pages.borrow_mut();
            let position = pages
                .iter()
                .position(|(c, _)| *c == cursor.as_str())
                .expect("unexpected cursor");
            let (_, page) = pages.remove(position);
            async move { page }.boxed_local()
        })
    }

    #[tokio::test]
    async fn test_walks_cursor_chain_in_order() {
        let requested = RefCell::new(Vec::new());
        let mut iter = pages(
            vec![
                ("", Ok(Page::new(vec![1, 2], "b"))),
                ("b", Ok(Page::new(vec![], "c"))),
                ("c", Ok(Page::last(vec![3]))),
            ],
            &requested,
        );

        assert_eq!(iter.collect_all().await.unwrap(), vec![1, 2, 3]);
        assert_eq!(*requested.borrow(), vec!["", "b", "c"]);
        assert_eq!(iter.pages_fetched(), 3);
        assert_eq!(iter.next().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_is_lazy() {
        let requested = RefCell::new(Vec::new());
        let mut iter = pages(
            vec![
                ("", Ok(Page::new(vec![1], "b"))),
                ("b", Ok(Page::last(vec![2]))),
            ],
            &requested,
        );

        assert!(requested.borrow().is_empty());
        assert_eq!(iter.next().await.unwrap(), Some(1));
        assert_eq!(*requested.borrow(), vec![""]);
    }

    #[tokio::test]
    async fn test_find_stops_at_first_match() {
        let requested = RefCell::new(Vec::new());
        let mut iter = pages(
            vec![
                ("", Ok(Page::new(vec![1, 2], "b"))),
                ("b", Ok(Page::new(vec![3, 4], "c"))),
                ("c", Ok(Page::last(vec![5]))),
            ],
            &requested,
        );

        assert_eq!(iter.find(|n| *n == 3).await.unwrap(), Some(3));
        assert_eq!(*requested.borrow(), vec!["", "b"]);
    }

    #[tokio::test]
    async fn test_fetch_error_ends_the_sequence() {
        let requested = RefCell::new(Vec::new());
        let mut iter = pages(
            vec![
                ("", Ok(Page::new(vec![1], "b"))),
                ("b", Err(ScrapeError::Transport("connection reset".to_string()))),
            ],
            &requested,
        );

        assert_eq!(iter.next().await.unwrap(), Some(1));
        assert!(matches!(iter.next().await, Err(ScrapeError::Transport(_))));
        assert_eq!(iter.next().await.unwrap(), None);
        assert_eq!(requested.borrow().len(), 2);
    }
}
