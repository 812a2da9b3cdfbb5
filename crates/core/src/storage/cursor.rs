//! Lazy page-by-page listing.

use tracing::debug;

use super::error::StorageError;
use super::traits::ObjectStore;
use super::types::ObjectPage;

/// Starts a fresh listing of `store`.
///
/// Nothing is fetched until [`PageCursor::next_page`] is awaited. Each call
/// returns a new cursor positioned before the first page.
pub fn list_pages(store: &dyn ObjectStore) -> PageCursor<'_> {
    PageCursor {
        store,
        next_token: None,
        exhausted: false,
        pages_fetched: 0,
    }
}

/// Cursor over the pages of one listing.
pub struct PageCursor<'a> {
    store: &'a dyn ObjectStore,
    next_token: Option<String>,
    exhausted: bool,
    pages_fetched: usize,
}

impl<'a> PageCursor<'a> {
    /// Fetches the next page.
    ///
    /// Returns `None` once the last page has been yielded. After an error the
    /// cursor is exhausted; start a new listing to retry.
    pub async fn next_page(&mut self) -> Option<Result<ObjectPage, StorageError>> {
        if self.exhausted {
            return None;
        }

        match self.store.list_page(self.next_token.take()).await {
            Ok(page) => {
                self.pages_fetched += 1;
                debug!(
                    store = self.store.name(),
                    page = self.pages_fetched,
                    objects = page.objects.len(),
                    more = page.has_more(),
                    "Fetched listing page"
                );
                match &page.continuation {
                    Some(token) => self.next_token = Some(token.clone()),
                    None => self.exhausted = true,
                }
                Some(Ok(page))
            }
            Err(e) => {
                self.exhausted = true;
                Some(Err(e))
            }
        }
    }

    /// Number of pages fetched so far.
    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }
}
