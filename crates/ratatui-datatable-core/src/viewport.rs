/// Scroll position of a viewport over a larger content area, in cells.
#[derive(Clone, Copy, Debug, Default)]
pub struct ViewportState {
    pub x: u32,
    pub y: u32,
    pub viewport_w: u16,
    pub viewport_h: u16,
    pub content_w: u32,
    pub content_h: u32,
}

impl ViewportState {
    pub fn set_viewport(&mut self, w: u16, h: u16) {
        self.viewport_w = w;
        self.viewport_h = h;
        self.clamp();
    }

    pub fn set_content(&mut self, w: u32, h: u32) {
        self.content_w = w;
        self.content_h = h;
        self.clamp();
    }

    pub fn clamp(&mut self) {
        self.y = self.y.min(self.max_y());
        self.x = self.x.min(self.max_x());
    }

    /// Scrolls vertically the least amount that shows `[start, start + len)`.
    pub fn ensure_visible_y(&mut self, start: u32, len: u32) {
        let end = start.saturating_add(len);
        if start < self.y {
            self.y = start;
        } else if end > self.y.saturating_add(self.viewport_h as u32) {
            self.y = end.saturating_sub(self.viewport_h as u32);
        }
        self.clamp();
    }

    /// Scrolls horizontally the least amount that shows `[start, start + len)`.
    pub fn ensure_visible_x(&mut self, start: u32, len: u32) {
        let end = start.saturating_add(len);
        if start < self.x {
            self.x = start;
        } else if end > self.x.saturating_add(self.viewport_w as u32) {
            self.x = end.saturating_sub(self.viewport_w as u32).min(start);
        }
        self.clamp();
    }

    fn max_y(&self) -> u32 {
        self.content_h.saturating_sub(self.viewport_h as u32)
    }

    fn max_x(&self) -> u32 {
        self.content_w.saturating_sub(self.viewport_w as u32)
    }
}
