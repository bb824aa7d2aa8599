// Scroll state shared by the list-like widgets
//
// Each widget owns its scroll state. Auto-follow keeps streaming content
// pinned to the bottom until the user scrolls up.

/// Scroll position over `total` lines shown `viewport` at a time
#[derive(Debug, Clone)]
pub struct ScrollState {
    /// Line index at the top of the viewport
    offset: usize,
    total: usize,
    viewport: usize,

    /// New content keeps the view at the bottom.
    /// Scrolling up disables this; scrolling back to the bottom re-enables it.
    pub auto_follow: bool,
}

impl ScrollState {
    /// Auto-follow enabled
    pub fn new() -> Self {
        Self {
            offset: 0,
            total: 0,
            viewport: 0,
            auto_follow: true,
        }
    }

    /// Auto-follow disabled, starts at the top
    pub fn manual() -> Self {
        Self {
            auto_follow: false,
            ..Self::new()
        }
    }

    /// Call whenever content or viewport size may have changed
    pub fn update_dimensions(&mut self, total: usize, viewport: usize) {
        self.total = total;
        self.viewport = viewport;

        if self.auto_follow {
            self.offset = self.max_offset();
        } else {
            self.offset = self.offset.min(self.max_offset());
        }
    }

    pub fn scroll_up(&mut self) -> bool {
        if self.offset == 0 {
            return false;
        }
        self.offset -= 1;
        self.auto_follow = false;
        true
    }

    pub fn scroll_down(&mut self) -> bool {
        if self.offset >= self.max_offset() {
            return false;
        }
        self.offset += 1;
        if self.offset >= self.max_offset() {
            self.auto_follow = true;
        }
        true
    }

    pub fn page_up(&mut self) -> bool {
        let before = self.offset;
        self.offset = self.offset.saturating_sub(self.viewport.max(1));
        if self.offset != before {
            self.auto_follow = false;
        }
        self.offset != before
    }

    pub fn page_down(&mut self) -> bool {
        let before = self.offset;
        self.offset = (self.offset + self.viewport.max(1)).min(self.max_offset());
        if self.offset >= self.max_offset() {
            self.auto_follow = true;
        }
        self.offset != before
    }

    pub fn scroll_to_top(&mut self) {
        self.offset = 0;
        self.auto_follow = false;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.offset = self.max_offset();
        self.auto_follow = true;
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Visible range as (start, end), end exclusive
    pub fn visible_range(&self) -> (usize, usize) {
        let end = (self.offset + self.viewport).min(self.total);
        (self.offset.min(end), end)
    }

    /// Content overflows the viewport
    pub fn overflows(&self) -> bool {
        self.total > self.viewport
    }

    fn max_offset(&self) -> usize {
        self.total.saturating_sub(self.viewport)
    }
}

impl Default for ScrollState {
    fn default() -> Self {
        Self::new()
    }
}
