//! Scroll follow state for the transcript view.
//!
//! The rendering layer reports viewport metrics; this module decides whether
//! the view keeps following new turns and whether the "new messages"
//! indicator is shown.

use serde::{Deserialize, Serialize};

/// Scroll metrics of the transcript view, in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    /// Offset of the visible area from the top of the content.
    pub scroll_top: u32,
    /// Height of the visible area.
    pub client_height: u32,
    /// Total height of the content.
    pub scroll_height: u32,
}

impl Viewport {
    pub fn new(scroll_top: u32, client_height: u32, scroll_height: u32) -> Self {
        Self {
            scroll_top,
            client_height,
            scroll_height,
        }
    }

    /// Returns true if the visible area reaches (or passes) the end of the content.
    pub fn is_at_bottom(&self) -> bool {
        self.scroll_top.saturating_add(self.client_height) >= self.scroll_height
    }

    /// Returns true if the content is taller than the visible area.
    pub fn overflows(&self) -> bool {
        self.scroll_height > self.client_height
    }

    /// Returns true if there's content below the visible area.
    pub fn has_content_below(&self) -> bool {
        self.overflows() && !self.is_at_bottom()
    }
}

/// Derived scroll state for the transcript view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrollState {
    auto_scroll: bool,
    show_indicator: bool,
    /// Last metrics reported by the rendering layer.
    viewport: Viewport,
}

impl Default for ScrollState {
    fn default() -> Self {
        Self {
            auto_scroll: true,
            show_indicator: false,
            viewport: Viewport::default(),
        }
    }
}

impl ScrollState {
    /// Returns true if the view follows new content.
    pub fn auto_scroll(&self) -> bool {
        self.auto_scroll
    }

    pub fn show_indicator(&self) -> bool {
        self.show_indicator
    }

    /// Recomputes the indicator from the last known viewport.
    ///
    /// Returns true if its visibility changed.
    pub fn recompute_indicator(&mut self) -> bool {
        self.set_indicator(self.viewport.has_content_below())
    }

    /// Handles a scroll initiated by the user.
    ///
    /// Reaching the bottom turns following back on; anything else turns it off.
    /// Returns true if the indicator visibility changed.
    pub fn on_user_scroll(&mut self, viewport: Viewport) -> bool {
        self.viewport = viewport;
        if viewport.is_at_bottom() {
            self.auto_scroll = true;
            self.set_indicator(false)
        } else {
            self.auto_scroll = false;
            self.recompute_indicator()
        }
    }

    /// Stores fresh metrics after layout without touching the follow mode.
    pub fn on_measured(&mut self, viewport: Viewport) -> bool {
        self.viewport = viewport;
        if self.auto_scroll {
            false
        } else {
            self.recompute_indicator()
        }
    }

    /// The user clicked the indicator: the view jumps down and it disappears.
    pub fn indicator_clicked(&mut self) -> bool {
        self.set_indicator(false)
    }

    /// Resets to follow mode (e.g., after clearing the transcript).
    pub fn reset(&mut self) -> bool {
        self.auto_scroll = true;
        self.set_indicator(false)
    }

    fn set_indicator(&mut self, visible: bool) -> bool {
        let changed = self.show_indicator != visible;
        self.show_indicator = visible;
        changed
    }
}
