//! Pagination cursors
//!
//! `PageController` is pure arithmetic over a virtual list of
//! `source_length` elements. `PageStacks` keeps a stack of controllers per
//! view so nested paginated contexts (an outer list with an inner list open
//! on top of it) can coexist and be found again by title.

use std::collections::HashMap;
use std::ops::Range;
use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;

use super::{RoutingError, ViewKey};

/// Pagination cursor over a fixed-size list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageController {
    source_length: usize,
    page_size: usize,
    offset: usize,
    title: Option<String>,
}

impl PageController {
    pub fn new(
        source_length: usize,
        page_size: usize,
        title: Option<String>,
    ) -> Result<Self, RoutingError> {
        if page_size == 0 {
            return Err(RoutingError::InvalidPageSize);
        }
        Ok(Self {
            source_length,
            page_size,
            offset: 0,
            title,
        })
    }

    pub fn source_length(&self) -> usize {
        self.source_length
    }

    /// Update the list length (elements added or removed under the cursor)
    pub fn set_source_length(&mut self, source_length: usize) {
        self.source_length = source_length;
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn pages_count(&self) -> usize {
        self.source_length.div_ceil(self.page_size)
    }

    /// 1-based number of the current page
    pub fn current_page(&self) -> usize {
        self.offset / self.page_size + 1
    }

    /// Number of the previous page, `None` on the first page
    pub fn previous_page(&self) -> Option<usize> {
        self.offset
            .checked_sub(self.page_size)
            .map(|offset| offset / self.page_size + 1)
    }

    /// Number of the next page, `None` on the last page
    pub fn next_page(&self) -> Option<usize> {
        let offset = self.offset + self.page_size;
        (offset < self.source_length).then(|| offset / self.page_size + 1)
    }

    /// Element indices shown on the current page
    pub fn range(&self) -> Range<usize> {
        let start = self.offset.min(self.source_length);
        let end = (self.offset + self.page_size).min(self.source_length);
        start..end
    }

    /// Advance one page. Returns false (and stays put) on the last page.
    pub fn move_next(&mut self) -> bool {
        if self.next_page().is_none() {
            return false;
        }
        self.offset += self.page_size;
        true
    }

    /// Go back one page. Returns false (and stays put) on the first page.
    pub fn move_back(&mut self) -> bool {
        if self.previous_page().is_none() {
            return false;
        }
        self.offset -= self.page_size;
        true
    }

    /// Jump to a 1-based page.
    ///
    /// Returns `Ok(false)` without moving when the page starts past the end
    /// of the list. A page starting exactly at the end is accepted.
    pub fn move_to(&mut self, page: usize) -> Result<bool, RoutingError> {
        if page < 1 {
            return Err(RoutingError::InvalidPage { page });
        }
        let shift = (page - 1) * self.page_size;
        if shift > self.source_length {
            return Ok(false);
        }
        self.offset = shift;
        Ok(true)
    }
}

/// A page controller shared between concurrent events on the same view
pub type SharedPage = Arc<Mutex<PageController>>;

/// Stacks of page controllers keyed by view
#[derive(Debug, Default)]
pub struct PageStacks {
    stacks: Mutex<HashMap<ViewKey, Vec<SharedPage>>>,
}

impl PageStacks {
    pub fn new() -> Self {
        Self::default()
    }

    fn stacks(&self) -> MutexGuard<'_, HashMap<ViewKey, Vec<SharedPage>>> {
        self.stacks.lock()
    }

    /// Push a new controller on top of the view's stack
    pub fn create_page(
        &self,
        key: ViewKey,
        source_length: usize,
        page_size: usize,
        title: Option<&str>,
    ) -> Result<SharedPage, RoutingError> {
        let page = Arc::new(Mutex::new(PageController::new(
            source_length,
            page_size,
            title.map(str::to_string),
        )?));
        self.stacks().entry(key).or_default().push(page.clone());
        tracing::trace!(%key, source_length, page_size, ?title, "page controller created");
        Ok(page)
    }

    /// Topmost controller of the view
    pub fn get_page(&self, key: ViewKey) -> Option<SharedPage> {
        self.stacks().get(&key).and_then(|stack| stack.last().cloned())
    }

    /// First controller with the given title, scanning from the top
    pub fn get_page_titled(&self, key: ViewKey, title: &str) -> Option<SharedPage> {
        self.stacks().get(&key).and_then(|stack| {
            stack
                .iter()
                .rev()
                .find(|page| lock_page(page).title() == Some(title))
                .cloned()
        })
    }

    /// Run `f` against a controller while holding its lock, so a
    /// read-then-move sequence cannot interleave with another event.
    pub fn with_page<R>(
        &self,
        key: ViewKey,
        title: Option<&str>,
        f: impl FnOnce(&mut PageController) -> R,
    ) -> Option<R> {
        let page = match title {
            Some(title) => self.get_page_titled(key, title),
            None => self.get_page(key),
        }?;
        let mut guard = lock_page(&page);
        Some(f(&mut guard))
    }

    /// Discard the topmost controller of the view
    pub fn pop(&self, key: ViewKey) -> Option<SharedPage> {
        let mut stacks = self.stacks();
        let stack = stacks.get_mut(&key)?;
        let page = stack.pop();
        if stack.is_empty() {
            stacks.remove(&key);
        }
        page
    }

    pub fn depth(&self, key: ViewKey) -> usize {
        self.stacks().get(&key).map_or(0, Vec::len)
    }

    /// Drop every controller of the view
    pub fn remove_stack(&self, key: ViewKey) {
        self.stacks().remove(&key);
    }

    /// Number of views holding at least one controller
    pub fn len(&self) -> usize {
        self.stacks().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Lock a shared controller
pub fn lock_page(page: &SharedPage) -> MutexGuard<'_, PageController> {
    page.lock()
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: ViewKey = ViewKey::new(42, 7);

    #[test]
    fn test_page_arithmetic_ten_by_three() {
        let mut page = PageController::new(10, 3, None).unwrap();
        assert_eq!(page.pages_count(), 4);
        assert_eq!(page.current_page(), 1);
        assert_eq!(page.previous_page(), None);

        let mut next_pages = vec![page.next_page()];
        while page.move_next() {
            next_pages.push(page.next_page());
        }
        assert_eq!(next_pages, vec![Some(2), Some(3), Some(4), None]);
        assert_eq!(page.current_page(), 4);
        assert_eq!(page.range(), 9..10);
    }

    #[test]
    fn test_move_back_on_first_page() {
        let mut page = PageController::new(10, 3, None).unwrap();
        assert!(!page.move_back());
        assert_eq!(page.offset(), 0);

        assert!(page.move_next());
        assert_eq!(page.previous_page(), Some(1));
        assert!(page.move_back());
        assert_eq!(page.offset(), 0);
    }

    #[test]
    fn test_move_to() {
        let mut page = PageController::new(10, 3, None).unwrap();
        assert_eq!(page.move_to(0), Err(RoutingError::InvalidPage { page: 0 }));

        assert_eq!(page.move_to(3), Ok(true));
        assert_eq!(page.current_page(), 3);
        assert_eq!(page.offset(), 6);

        // Page 5 would start at offset 12, past the end: no mutation
        assert_eq!(page.move_to(5), Ok(false));
        assert_eq!(page.offset(), 6);
    }

    #[test]
    fn test_zero_page_size_rejected() {
        assert_eq!(
            PageController::new(10, 0, None),
            Err(RoutingError::InvalidPageSize)
        );
    }

    #[test]
    fn test_empty_source() {
        let page = PageController::new(0, 5, None).unwrap();
        assert_eq!(page.pages_count(), 0);
        assert_eq!(page.current_page(), 1);
        assert_eq!(page.next_page(), None);
        assert_eq!(page.range(), 0..0);
    }

    #[test]
    fn test_stack_top_and_titled_lookup() {
        let stacks = PageStacks::new();
        stacks.create_page(KEY, 30, 5, Some("outer")).unwrap();
        stacks.create_page(KEY, 8, 4, Some("inner")).unwrap();

        let top = stacks.get_page(KEY).unwrap();
        assert_eq!(lock_page(&top).title(), Some("inner"));

        let outer = stacks.get_page_titled(KEY, "outer").unwrap();
        assert_eq!(lock_page(&outer).source_length(), 30);
        assert!(stacks.get_page_titled(KEY, "missing").is_none());
    }

    #[test]
    fn test_titled_lookup_prefers_topmost_match() {
        let stacks = PageStacks::new();
        stacks.create_page(KEY, 10, 2, Some("list")).unwrap();
        stacks.create_page(KEY, 99, 2, Some("list")).unwrap();

        let found = stacks.get_page_titled(KEY, "list").unwrap();
        assert_eq!(lock_page(&found).source_length(), 99);
    }

    #[test]
    fn test_with_page_mutates_shared_controller() {
        let stacks = PageStacks::new();
        let page = stacks.create_page(KEY, 10, 3, None).unwrap();

        let moved = stacks.with_page(KEY, None, |p| p.move_next());
        assert_eq!(moved, Some(true));
        assert_eq!(lock_page(&page).current_page(), 2);

        assert_eq!(stacks.with_page(ViewKey::new(1, 1), None, |p| p.move_next()), None);
    }

    #[test]
    fn test_pop_and_remove_stack() {
        let stacks = PageStacks::new();
        stacks.create_page(KEY, 10, 3, Some("a")).unwrap();
        stacks.create_page(KEY, 10, 3, Some("b")).unwrap();
        assert_eq!(stacks.depth(KEY), 2);

        stacks.pop(KEY);
        assert_eq!(stacks.depth(KEY), 1);

        stacks.remove_stack(KEY);
        assert_eq!(stacks.depth(KEY), 0);
        assert!(stacks.get_page(KEY).is_none());
        assert!(stacks.is_empty());
    }

    #[test]
    fn test_create_page_propagates_invalid_size() {
        let stacks = PageStacks::new();
        assert!(stacks.create_page(KEY, 10, 0, None).is_err());
        assert_eq!(stacks.depth(KEY), 0);
    }
}
