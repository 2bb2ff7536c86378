use std::time::{Duration, Instant};

use super::panels::{EditorPanel, ImagePanel, ScrollBehavior, ScrollMetrics};
use super::state::{ActiveSource, Panel, SettleGuard, SyncState};
use crate::anchors::{Anchor, PositionIndex};
use crate::models::{BBox, DocumentLayout, LayoutBlock};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(50);
pub const DEFAULT_SETTLE_EXTRA: Duration = Duration::from_millis(100);

/// Added to the largest anchor position when estimating editor scroll
/// proportionally, so a single anchor at offset 0 does not divide by zero.
const PROPORTIONAL_EPSILON: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOptions {
    pub debounce: Duration,
    /// Extra hold after a sync is applied, on top of `debounce`.
    pub settle_extra: Duration,
    pub start_enabled: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            settle_extra: DEFAULT_SETTLE_EXTRA,
            start_enabled: true,
        }
    }
}

impl SyncOptions {
    pub fn settle_delay(&self) -> Duration {
        self.debounce + self.settle_extra
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SyncError {
    #[error("Sync controller used after teardown")]
    TornDown,
}

/// What the controller did with an incoming panel event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    /// Debounce timer started or restarted.
    Scheduled,
    Ignored(IgnoreReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    Disabled,
    /// The other panel is mid-sync; accepting would ping-pong.
    LoopGuard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelEvent {
    Scroll,
    Cursor(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    /// Resolved through an anchor and its block.
    Anchor,
    /// Proportional mirroring of scroll position.
    Ratio,
}

/// A sync that was applied to the target panel.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncOutcome {
    pub source: Panel,
    pub mode: SyncMode,
    pub block_id: Option<String>,
    pub target_scroll_top: f64,
}

#[derive(Debug, Clone, Copy)]
struct PendingSync {
    source: Panel,
    event: PanelEvent,
    fire_at: Instant,
}

/// Keeps the image panel and the editor panel positionally aligned.
///
/// The controller is driven entirely by its caller: panel events and
/// [`poll`](Self::poll) carry the current time, and nothing runs in the
/// background. Panels are owned by the controller and dropped on teardown.
pub struct SyncController<A: ImagePanel, B: EditorPanel> {
    options: SyncOptions,
    state: SyncState,
    layout: DocumentLayout,
    page: u32,
    index: PositionIndex,
    zoom_percent: f64,
    hovered_block_id: Option<String>,
    pending: Option<PendingSync>,
    settle_until: Option<Instant>,
    image: Option<A>,
    editor: Option<B>,
    torn_down: bool,
}

impl<A: ImagePanel, B: EditorPanel> SyncController<A, B> {
    pub fn new(options: SyncOptions) -> Self {
        Self {
            options,
            state: SyncState::new(options.start_enabled),
            layout: DocumentLayout::default(),
            page: 1,
            index: PositionIndex::default(),
            zoom_percent: 100.0,
            hovered_block_id: None,
            pending: None,
            settle_until: None,
            image: None,
            editor: None,
            torn_down: false,
        }
    }

    pub fn options(&self) -> SyncOptions {
        self.options
    }

    pub fn state(&self) -> &SyncState {
        &self.state
    }

    pub fn index(&self) -> &PositionIndex {
        &self.index
    }

    pub fn layout(&self) -> &DocumentLayout {
        &self.layout
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn active_block_id(&self) -> Option<&str> {
        self.state.current_block_id.as_deref()
    }

    pub fn hovered_block_id(&self) -> Option<&str> {
        self.hovered_block_id.as_deref()
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    pub fn image_panel(&self) -> Option<&A> {
        self.image.as_ref()
    }

    pub fn image_panel_mut(&mut self) -> Option<&mut A> {
        self.image.as_mut()
    }

    pub fn editor_panel(&self) -> Option<&B> {
        self.editor.as_ref()
    }

    pub fn editor_panel_mut(&mut self) -> Option<&mut B> {
        self.editor.as_mut()
    }

    /// Earliest instant at which [`poll`](Self::poll) has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        let pending = self.pending.map(|p| p.fire_at);
        match (pending, self.settle_until) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    pub fn mount_image(&mut self, panel: A) -> Result<(), SyncError> {
        self.ensure_live()?;
        self.image = Some(panel);
        Ok(())
    }

    pub fn mount_editor(&mut self, panel: B) -> Result<(), SyncError> {
        self.ensure_live()?;
        self.editor = Some(panel);
        Ok(())
    }

    pub fn unmount_image(&mut self) -> Option<A> {
        self.image.take()
    }

    pub fn unmount_editor(&mut self) -> Option<B> {
        self.editor.take()
    }

    /// Replace the layout and content snapshot for a newly loaded document.
    pub fn load_document(&mut self, layout: DocumentLayout, content: &str) -> Result<(), SyncError> {
        self.ensure_live()?;
        self.page = layout.page_numbers().first().copied().unwrap_or(1);
        self.layout = layout;
        self.index = PositionIndex::from_content(content);
        self.pending = None;
        self.settle_until = None;
        self.hovered_block_id = None;
        self.state.active_source = ActiveSource::Idle;
        self.state.current_block_id = None;
        log::debug!(
            "loaded {} blocks, {} anchors",
            self.layout.blocks.len(),
            self.index.len()
        );
        Ok(())
    }

    /// Content-mutation hook: re-decode anchors after any edit.
    pub fn on_content_changed(&mut self, content: &str) -> Result<(), SyncError> {
        self.ensure_live()?;
        self.index = PositionIndex::from_content(content);
        Ok(())
    }

    pub fn set_page(&mut self, page: u32) -> Result<(), SyncError> {
        self.ensure_live()?;
        if self.page != page {
            self.page = page;
            self.pending = None;
            self.state.current_block_id = None;
        }
        Ok(())
    }

    pub fn set_zoom(&mut self, zoom_percent: f64) -> Result<(), SyncError> {
        self.ensure_live()?;
        self.zoom_percent = zoom_percent;
        Ok(())
    }

    pub fn scale(&self) -> f64 {
        self.zoom_percent / 100.0
    }

    pub fn hover_block(&mut self, block_id: Option<&str>) -> Result<(), SyncError> {
        self.ensure_live()?;
        self.hovered_block_id = block_id.map(str::to_string);
        Ok(())
    }

    /// Flip sync on or off, returning the new setting.
    ///
    /// Turning sync off drops any pending timer; turning it back on does not
    /// replay events missed in between.
    pub fn toggle_sync(&mut self) -> Result<bool, SyncError> {
        let enabled = !self.state.enabled;
        self.set_enabled(enabled)?;
        Ok(enabled)
    }

    pub fn set_enabled(&mut self, enabled: bool) -> Result<(), SyncError> {
        self.ensure_live()?;
        self.state.enabled = enabled;
        if !enabled {
            self.pending = None;
        }
        Ok(())
    }

    pub fn on_image_scroll(&mut self, now: Instant) -> Result<EventOutcome, SyncError> {
        self.handle_event(Panel::Image, PanelEvent::Scroll, now)
    }

    pub fn on_editor_scroll(&mut self, now: Instant) -> Result<EventOutcome, SyncError> {
        self.handle_event(Panel::Editor, PanelEvent::Scroll, now)
    }

    pub fn on_editor_cursor(
        &mut self,
        cursor_offset: usize,
        now: Instant,
    ) -> Result<EventOutcome, SyncError> {
        self.handle_event(Panel::Editor, PanelEvent::Cursor(cursor_offset), now)
    }

    fn handle_event(
        &mut self,
        source: Panel,
        event: PanelEvent,
        now: Instant,
    ) -> Result<EventOutcome, SyncError> {
        self.ensure_live()?;
        self.release_if_settled(now);

        if !self.state.enabled {
            return Ok(EventOutcome::Ignored(IgnoreReason::Disabled));
        }
        if self.state.blocks_events_from(source) {
            log::debug!("dropping {source:?} {event:?} while the other panel syncs");
            return Ok(EventOutcome::Ignored(IgnoreReason::LoopGuard));
        }

        // One slot for both panels: the latest event replaces any pending one
        self.pending = Some(PendingSync {
            source,
            event,
            fire_at: now + self.options.debounce,
        });
        Ok(EventOutcome::Scheduled)
    }

    /// Advance timers to `now`: fire a due debounce and release an expired
    /// settle window.
    pub fn poll(&mut self, now: Instant) -> Result<Option<SyncOutcome>, SyncError> {
        self.ensure_live()?;
        self.release_if_settled(now);

        let Some(pending) = self.pending.filter(|p| p.fire_at <= now) else {
            return Ok(None);
        };
        self.pending = None;

        if !self.state.enabled || self.state.blocks_events_from(pending.source) {
            return Ok(None);
        }

        let outcome = match pending.source {
            Panel::Image => self.sync_editor_from_image(now),
            Panel::Editor => self.sync_image_from_editor(pending.event, now),
        };
        if let Some(outcome) = &outcome {
            log::debug!(
                "synced from {:?} via {:?} to {:.1} (block {:?})",
                outcome.source,
                outcome.mode,
                outcome.target_scroll_top,
                outcome.block_id
            );
        }
        Ok(outcome)
    }

    /// Centre block `block_id` in the image panel.
    ///
    /// Returns `false` without side effects when the block is unknown or the
    /// image panel is not mounted.
    pub fn sync_to_block(&mut self, block_id: &str, now: Instant) -> Result<bool, SyncError> {
        self.ensure_live()?;
        let Some(bbox) = self.page_blocks().find(|b| b.id == block_id).map(|b| b.bbox) else {
            log::warn!("sync_to_block: no block {block_id:?} on page {}", self.page);
            return Ok(false);
        };
        let Some(metrics) = self.image.as_ref().map(|p| p.metrics()) else {
            return Ok(false);
        };

        let target = self.image_target_for(&bbox, &metrics);
        self.pending = None;
        let release_at = now + self.options.settle_delay();
        let guard = SettleGuard::begin(
            &mut self.state,
            &mut self.settle_until,
            Panel::Editor,
            release_at,
        );
        guard.state.current_block_id = Some(block_id.to_string());
        if let Some(image) = self.image.as_mut() {
            image.scroll_to(target, ScrollBehavior::Smooth);
        }
        drop(guard);
        Ok(true)
    }

    /// Bring the content for `block_id` into view in the editor.
    ///
    /// Uses the editor's element for the block when it has one, otherwise a
    /// proportional estimate from the anchor position.
    pub fn sync_to_anchor(&mut self, block_id: &str, now: Instant) -> Result<bool, SyncError> {
        self.ensure_live()?;
        let Some(anchor) = self.index.get(block_id).cloned() else {
            log::warn!("sync_to_anchor: no anchor for block {block_id:?}");
            return Ok(false);
        };
        let Some(target) = self.editor_target_for(&anchor) else {
            return Ok(false);
        };

        self.pending = None;
        let release_at = now + self.options.settle_delay();
        let guard = SettleGuard::begin(
            &mut self.state,
            &mut self.settle_until,
            Panel::Image,
            release_at,
        );
        guard.state.current_block_id = Some(anchor.block_id.clone());
        if let Some(editor) = self.editor.as_mut() {
            editor.scroll_to(target, ScrollBehavior::Smooth);
        }
        drop(guard);
        Ok(true)
    }

    /// Clear timers, drop both panels and reset state. Every later call
    /// returns [`SyncError::TornDown`].
    pub fn teardown(&mut self) {
        self.pending = None;
        self.settle_until = None;
        self.image = None;
        self.editor = None;
        self.hovered_block_id = None;
        self.state = SyncState::new(false);
        self.torn_down = true;
    }

    fn ensure_live(&self) -> Result<(), SyncError> {
        if self.torn_down {
            return Err(SyncError::TornDown);
        }
        Ok(())
    }

    fn release_if_settled(&mut self, now: Instant) {
        if let Some(until) = self.settle_until
            && until <= now
        {
            self.settle_until = None;
            self.state.active_source = ActiveSource::Idle;
        }
    }

    fn page_blocks(&self) -> impl Iterator<Item = &LayoutBlock> {
        let page = self.page;
        self.layout.blocks.iter().filter(move |b| b.page_num == page)
    }

    /// Block under the vertical centre of the image viewport, or the nearest
    /// one above it.
    fn block_at_image_centre(&self, metrics: &ScrollMetrics) -> Option<&LayoutBlock> {
        let scale = self.scale();
        if scale <= 0.0 {
            return None;
        }
        let centre = (metrics.scroll_top + metrics.client_height / 2.0) / scale;
        self.page_blocks().find(|b| b.bbox.contains_y(centre)).or_else(|| {
            self.page_blocks()
                .filter(|b| f64::from(b.bbox.y) <= centre)
                .max_by_key(|b| b.bbox.y)
        })
    }

    fn image_target_for(&self, bbox: &BBox, metrics: &ScrollMetrics) -> f64 {
        let scale = self.scale();
        let target = f64::from(bbox.y) * scale - metrics.client_height / 2.0
            + f64::from(bbox.height) * scale / 2.0;
        target.max(0.0)
    }

    /// Editor scroll offset that shows `anchor`, or `None` without an editor.
    fn editor_target_for(&self, anchor: &Anchor) -> Option<f64> {
        let editor = self.editor.as_ref()?;
        let metrics = editor.metrics();
        if let Some(element) = editor.locate_element_for_block(&anchor.block_id) {
            let target =
                element.offset_top - metrics.client_height / 2.0 + element.height / 2.0;
            return Some(target.max(0.0));
        }
        let max_position = self.index.max_position().unwrap_or(0) as f64;
        let ratio = anchor.position as f64 / (max_position + PROPORTIONAL_EPSILON);
        Some(ratio * metrics.scroll_range())
    }

    fn sync_editor_from_image(&mut self, now: Instant) -> Option<SyncOutcome> {
        let image_metrics = self.image.as_ref()?.metrics();
        let editor_metrics = self.editor.as_ref()?.metrics();

        let anchored = self
            .block_at_image_centre(&image_metrics)
            .and_then(|block| self.index.get(&block.id))
            .cloned()
            .and_then(|anchor| Some((self.editor_target_for(&anchor)?, anchor)));

        let outcome = match anchored {
            Some((target, anchor)) => SyncOutcome {
                source: Panel::Image,
                mode: SyncMode::Anchor,
                block_id: Some(anchor.block_id),
                target_scroll_top: target,
            },
            None => SyncOutcome {
                source: Panel::Image,
                mode: SyncMode::Ratio,
                block_id: None,
                target_scroll_top: image_metrics.ratio() * editor_metrics.scroll_range(),
            },
        };
        self.apply(outcome, now)
    }

    fn sync_image_from_editor(&mut self, event: PanelEvent, now: Instant) -> Option<SyncOutcome> {
        let editor = self.editor.as_ref()?;
        let editor_metrics = editor.metrics();
        let image_metrics = self.image.as_ref()?.metrics();

        let offset = match event {
            PanelEvent::Cursor(offset) => Some(offset),
            PanelEvent::Scroll => editor.offset_at_viewport_top(),
        };
        let anchored = offset
            .and_then(|o| self.index.nearest_at_or_before(o))
            .and_then(|anchor| Some((self.anchor_bbox_on_page(anchor)?, anchor)));

        let outcome = match anchored {
            Some((bbox, anchor)) => SyncOutcome {
                source: Panel::Editor,
                mode: SyncMode::Anchor,
                block_id: Some(anchor.block_id.clone()),
                target_scroll_top: self.image_target_for(&bbox, &image_metrics),
            },
            None => SyncOutcome {
                source: Panel::Editor,
                mode: SyncMode::Ratio,
                block_id: None,
                target_scroll_top: editor_metrics.ratio() * image_metrics.scroll_range(),
            },
        };
        self.apply(outcome, now)
    }

    /// Box to centre for `anchor` on the current page.
    ///
    /// A block known on another page cannot be shown here. Anchors without any
    /// layout block use the coordinates stored in the marker.
    fn anchor_bbox_on_page(&self, anchor: &Anchor) -> Option<BBox> {
        match self.layout.find_block(&anchor.block_id) {
            Some(block) if block.page_num == self.page => Some(block.bbox),
            Some(_) => None,
            None => Some(anchor.coords),
        }
    }

    fn apply(&mut self, outcome: SyncOutcome, now: Instant) -> Option<SyncOutcome> {
        let release_at = now + self.options.settle_delay();
        let guard = SettleGuard::begin(
            &mut self.state,
            &mut self.settle_until,
            outcome.source,
            release_at,
        );
        if outcome.block_id.is_some() {
            guard.state.current_block_id = outcome.block_id.clone();
        }
        match outcome.source {
            Panel::Image => {
                if let Some(editor) = self.editor.as_mut() {
                    editor.scroll_to(outcome.target_scroll_top, ScrollBehavior::Instant);
                }
            }
            Panel::Editor => {
                if let Some(image) = self.image.as_mut() {
                    image.scroll_to(outcome.target_scroll_top, ScrollBehavior::Instant);
                }
            }
        }
        drop(guard);
        Some(outcome)
    }
}
