/*!
 * # Image/Text Position Sync
 *
 * Two independently scrollable panels, the page image (A) and the editor (B),
 * are kept aligned by a single [`SyncController`].
 *
 * ## State machine
 *
 * ```text
 *            event on A (debounced)              settle elapsed
 *   Idle ───────────────────────────▶ SyncingFrom(A) ───────────▶ Idle
 *     │                                     │ events on B dropped
 *     │      event on B (debounced)         │
 *     └─────────────────────────────▶ SyncingFrom(B) ───────────▶ Idle
 *                                           │ events on A dropped
 * ```
 *
 * Dropping events from the panel that is being driven is the only thing that
 * stops the two panels scrolling each other forever.
 *
 * ## Resolution
 *
 * Positions are resolved through anchors when possible: the block under the
 * image viewport maps to its anchor in the content, and a cursor offset maps
 * to the nearest anchor at or before it. When no anchor applies, the scroll
 * ratio of the source panel is mirrored onto the target.
 */

pub mod controller;
pub mod panels;
pub mod state;

pub use controller::{
    DEFAULT_DEBOUNCE, DEFAULT_SETTLE_EXTRA, EventOutcome, IgnoreReason, PanelEvent,
    SyncController, SyncError, SyncMode, SyncOptions, SyncOutcome,
};
pub use panels::{
    EditorPanel, ElementHandle, ImagePanel, ScrollBehavior, ScrollMetrics, ScrollPanel,
};
pub use state::{ActiveSource, Panel, SyncState};
