//! Terminal renditions of the page image and the content editor.
//!
//! The image panel scrolls in scaled page pixels, one terminal row covering
//! [`PX_PER_ROW`] of them. The editor panel scrolls in whole lines.

use std::collections::HashMap;

use docsync_engine::content::ContentBuffer;
use docsync_engine::sync::{
    EditorPanel, ElementHandle, ImagePanel, ScrollBehavior, ScrollMetrics, ScrollPanel,
};

/// Scaled image pixels covered by one terminal row.
pub const PX_PER_ROW: f64 = 20.0;

#[derive(Debug, Default)]
pub struct TermImagePanel {
    metrics: ScrollMetrics,
    width_px: f64,
}

impl TermImagePanel {
    pub fn resize(&mut self, page_width: f64, page_height: f64, scale: f64, rows: u16) {
        self.width_px = page_width * scale;
        self.metrics.scroll_height = page_height * scale;
        self.metrics.client_height = f64::from(rows) * PX_PER_ROW;
        self.clamp();
    }

    pub fn scroll_by(&mut self, delta: f64) {
        self.metrics.scroll_top += delta;
        self.clamp();
    }

    pub fn reset(&mut self) {
        self.metrics.scroll_top = 0.0;
    }

    pub fn width_px(&self) -> f64 {
        self.width_px
    }

    fn clamp(&mut self) {
        self.metrics.scroll_top = self
            .metrics
            .scroll_top
            .clamp(0.0, self.metrics.scroll_range());
    }
}

impl ScrollPanel for TermImagePanel {
    fn metrics(&self) -> ScrollMetrics {
        self.metrics
    }

    fn scroll_to(&mut self, scroll_top: f64, _behavior: ScrollBehavior) {
        self.metrics.scroll_top = scroll_top;
        self.clamp();
    }
}

impl ImagePanel for TermImagePanel {}

#[derive(Debug, Default)]
pub struct TermEditorPanel {
    metrics: ScrollMetrics,
    lines: Vec<String>,
    line_starts: Vec<usize>,
    /// First line and line count of each block's section.
    sections: HashMap<String, (usize, usize)>,
}

impl TermEditorPanel {
    pub fn set_content(&mut self, content: &ContentBuffer) {
        self.lines.clear();
        self.line_starts.clear();
        let mut offset = 0;
        for line in content.text().split('\n') {
            self.line_starts.push(offset);
            self.lines.push(line.to_string());
            offset += line.chars().count() + 1;
        }

        self.sections.clear();
        let anchors = content.anchors();
        for (i, anchor) in anchors.iter().enumerate() {
            let first = self.line_at(anchor.position);
            let end = anchors
                .get(i + 1)
                .map(|next| self.line_at(next.position))
                .unwrap_or(self.lines.len());
            self.sections
                .entry(anchor.block_id.clone())
                .or_insert((first, end.saturating_sub(first).max(1)));
        }

        self.metrics.scroll_height = self.lines.len() as f64;
        self.clamp();
    }

    pub fn resize(&mut self, rows: u16) {
        self.metrics.client_height = f64::from(rows);
        self.clamp();
    }

    pub fn scroll_by(&mut self, delta: f64) {
        self.metrics.scroll_top += delta;
        self.clamp();
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn first_visible_line(&self) -> usize {
        self.metrics.scroll_top as usize
    }

    /// Scroll the least distance that brings `line` into view.
    pub fn reveal_line(&mut self, line: usize) {
        let line = line as f64;
        let rows = self.metrics.client_height.max(1.0);
        if line < self.metrics.scroll_top {
            self.metrics.scroll_top = line;
        } else if line >= self.metrics.scroll_top + rows {
            self.metrics.scroll_top = line - rows + 1.0;
        }
        self.clamp();
    }

    fn line_at(&self, offset: usize) -> usize {
        self.line_starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1)
    }

    fn clamp(&mut self) {
        self.metrics.scroll_top = self
            .metrics
            .scroll_top
            .round()
            .clamp(0.0, self.metrics.scroll_range());
    }
}

impl ScrollPanel for TermEditorPanel {
    fn metrics(&self) -> ScrollMetrics {
        self.metrics
    }

    fn scroll_to(&mut self, scroll_top: f64, _behavior: ScrollBehavior) {
        self.metrics.scroll_top = scroll_top;
        self.clamp();
    }
}

impl EditorPanel for TermEditorPanel {
    fn locate_element_for_block(&self, block_id: &str) -> Option<ElementHandle> {
        let &(first, count) = self.sections.get(block_id)?;
        Some(ElementHandle {
            offset_top: first as f64,
            height: count as f64,
        })
    }

    fn offset_at_viewport_top(&self) -> Option<usize> {
        self.line_starts.get(self.first_visible_line()).copied()
    }
}
