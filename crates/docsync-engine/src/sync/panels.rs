//! Capabilities the sync controller needs from the two panel widgets.
//!
//! Widgets are plain event sources and scroll targets; nothing here depends
//! on how the page image or the editor is actually drawn.

/// Scroll geometry of a panel, in that panel's own pixel units.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollMetrics {
    pub scroll_top: f64,
    pub scroll_height: f64,
    pub client_height: f64,
}

impl ScrollMetrics {
    pub fn new(scroll_top: f64, scroll_height: f64, client_height: f64) -> Self {
        Self {
            scroll_top,
            scroll_height,
            client_height,
        }
    }

    /// Distance the panel can scroll; zero when content fits.
    pub fn scroll_range(&self) -> f64 {
        (self.scroll_height - self.client_height).max(0.0)
    }

    /// Fraction of the scroll range travelled, `0.0` when nothing scrolls.
    pub fn ratio(&self) -> f64 {
        if self.scroll_height <= self.client_height {
            return 0.0;
        }
        (self.scroll_top / self.scroll_range()).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBehavior {
    Instant,
    Smooth,
}

/// Rendered element the editor produced for a block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementHandle {
    /// Top of the element in the editor's scroll coordinates.
    pub offset_top: f64,
    pub height: f64,
}

pub trait ScrollPanel {
    fn metrics(&self) -> ScrollMetrics;
    fn scroll_to(&mut self, scroll_top: f64, behavior: ScrollBehavior);
}

/// Panel A: the page image with block overlays.
pub trait ImagePanel: ScrollPanel {}

/// Panel B: the text editor holding the content buffer.
pub trait EditorPanel: ScrollPanel {
    /// Element the editor rendered for `block_id`, if it has one.
    fn locate_element_for_block(&self, block_id: &str) -> Option<ElementHandle>;

    /// Content offset shown at the top of the viewport, when the widget can
    /// tell. Editor scrolls without it fall back to ratio sync.
    fn offset_at_viewport_top(&self) -> Option<usize> {
        None
    }
}
