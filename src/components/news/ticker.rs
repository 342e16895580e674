use super::models::NewsItem;

/// Rotating window over the feed items
#[derive(Debug, Clone, Copy)]
pub struct NewsTicker {
    offset: usize,
    display: usize,
}

impl NewsTicker {
    pub fn new(display: usize) -> Self {
        Self {
            offset: 0,
            display: display.max(1),
        }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Start again from the first item
    pub fn reset(&mut self) {
        self.offset = 0;
    }

    /// Move forward by one window, wrapping around `len` items
    pub fn advance(&mut self, len: usize) {
        if len == 0 {
            self.offset = 0;
            return;
        }
        self.offset = (self.offset + self.display) % len;
    }

    /// Items in the current window; wraps, never repeats an item
    pub fn batch(&self, items: &[NewsItem]) -> Vec<NewsItem> {
        let len = items.len();
        (0..self.display.min(len))
            .map(|i| items[(self.offset + i) % len].clone())
            .collect()
    }
}
