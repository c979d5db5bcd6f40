/// Reported by [`RefreshCursor::advance`] when the cursor wraps back to 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleEnd {
    /// True only for the very first wrap: the cache now covers the whole
    /// tracked universe for the first time.
    pub first: bool,
}

/// Sliding-window position for the next fetch over a fixed universe of
/// `total` coins. Private to the refresh loop; single writer, no locking.
#[derive(Debug)]
pub struct RefreshCursor {
    next_offset: usize,
    total: usize,
    page_size: usize,
    first_cycle_complete: bool,
}

impl RefreshCursor {
    /// `total` and `page_size` must both be positive.
    pub fn new(total: usize, page_size: usize) -> Self {
        assert!(total > 0, "tracked universe must be non-empty");
        assert!(page_size > 0, "page size must be positive");
        Self {
            next_offset: 0,
            total,
            page_size,
            first_cycle_complete: false,
        }
    }

    /// The next unfetched window: `(offset, size)`, where size is clipped
    /// at the universe boundary. Pure read.
    pub fn next_window(&self) -> (usize, usize) {
        let size = self.page_size.min(self.total - self.next_offset);
        (self.next_offset, size)
    }

    /// Consume `window` fetched coins. Returns `Some(CycleEnd)` on every
    /// wrap; `CycleEnd::first` is true exactly once, on the first wrap.
    pub fn advance(&mut self, window: usize) -> Option<CycleEnd> {
        self.next_offset += window;
        if self.next_offset < self.total {
            return None;
        }
        self.next_offset = 0;
        let first = !self.first_cycle_complete;
        self.first_cycle_complete = true;
        Some(CycleEnd { first })
    }

    pub fn first_cycle_complete(&self) -> bool {
        self.first_cycle_complete
    }
}
