//! Overlay virtualization for the image panel.
//!
//! Pages with many blocks only render the overlays that intersect the visible
//! area plus an overscan margin. Small pages, and any page before the first
//! viewport measurement, always render everything.

use crate::models::{BBox, LayoutBlock};

pub const DEFAULT_VIRTUALIZATION_THRESHOLD: usize = 50;
pub const DEFAULT_OVERSCAN_PX: f64 = 200.0;

/// Visible area of the image panel in scaled pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
}

impl Viewport {
    pub fn from_scroll(scroll_top: f64, scroll_left: f64, width: f64, height: f64) -> Self {
        Self {
            top: scroll_top,
            bottom: scroll_top + height,
            left: scroll_left,
            right: scroll_left + width,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CullerOptions {
    /// Block counts at or below this render in full.
    pub virtualization_threshold: usize,
    pub overscan_px: f64,
}

impl Default for CullerOptions {
    fn default() -> Self {
        Self {
            virtualization_threshold: DEFAULT_VIRTUALIZATION_THRESHOLD,
            overscan_px: DEFAULT_OVERSCAN_PX,
        }
    }
}

/// Whether `bbox` at `scale` comes within `overscan` of `viewport`.
pub fn is_visible(bbox: &BBox, viewport: &Viewport, scale: f64, overscan: f64) -> bool {
    let b = bbox.scaled(scale);
    !(b.right < viewport.left - overscan
        || b.left > viewport.right + overscan
        || b.bottom < viewport.top - overscan
        || b.top > viewport.bottom + overscan)
}

#[derive(Debug, Clone)]
pub struct ViewportCuller {
    options: CullerOptions,
    viewport: Option<Viewport>,
    zoom_percent: f64,
    frame_pending: bool,
    frame_block_count: usize,
    visible: Vec<usize>,
}

impl Default for ViewportCuller {
    fn default() -> Self {
        Self::new(CullerOptions::default())
    }
}

impl ViewportCuller {
    pub fn new(options: CullerOptions) -> Self {
        Self {
            options,
            viewport: None,
            zoom_percent: 100.0,
            frame_pending: true,
            frame_block_count: 0,
            visible: Vec::new(),
        }
    }

    pub fn options(&self) -> CullerOptions {
        self.options
    }

    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    pub fn scale(&self) -> f64 {
        self.zoom_percent / 100.0
    }

    /// Record a scroll or resize. Recomputation waits for the next frame.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        if self.viewport != Some(viewport) {
            self.viewport = Some(viewport);
            self.frame_pending = true;
        }
    }

    pub fn set_zoom(&mut self, zoom_percent: f64) {
        if self.zoom_percent != zoom_percent {
            self.zoom_percent = zoom_percent;
            self.frame_pending = true;
        }
    }

    /// Forget cached results, e.g. after a new document load.
    pub fn invalidate(&mut self) {
        self.frame_pending = true;
    }

    /// Blocks to render for the current viewport and zoom.
    pub fn visible<'a>(&self, blocks: &'a [LayoutBlock]) -> Vec<&'a LayoutBlock> {
        let Some(viewport) = self.viewport_if_virtualized(blocks.len()) else {
            return blocks.iter().collect();
        };
        let scale = self.scale();
        blocks
            .iter()
            .filter(|b| is_visible(&b.bbox, &viewport, scale, self.options.overscan_px))
            .collect()
    }

    /// Indices of visible blocks, recomputed at most once per frame.
    ///
    /// Scroll, resize and zoom changes between two frames are coalesced into
    /// one pass.
    pub fn frame(&mut self, blocks: &[LayoutBlock]) -> &[usize] {
        if self.frame_pending || self.frame_block_count != blocks.len() {
            let scale = self.scale();
            let overscan = self.options.overscan_px;
            self.visible = match self.viewport_if_virtualized(blocks.len()) {
                None => (0..blocks.len()).collect(),
                Some(viewport) => blocks
                    .iter()
                    .enumerate()
                    .filter(|(_, b)| is_visible(&b.bbox, &viewport, scale, overscan))
                    .map(|(i, _)| i)
                    .collect(),
            };
            log::trace!(
                "culled {} of {} overlays",
                blocks.len() - self.visible.len(),
                blocks.len()
            );
            self.frame_pending = false;
            self.frame_block_count = blocks.len();
        }
        &self.visible
    }

    fn viewport_if_virtualized(&self, block_count: usize) -> Option<Viewport> {
        if block_count <= self.options.virtualization_threshold {
            return None;
        }
        self.viewport
    }
}
