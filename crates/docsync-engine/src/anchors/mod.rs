/*!
 * # Anchors
 *
 * Anchors tie a character offset in the editable content to the bounding box
 * of the layout block the text came from. They live inside the content itself
 * as HTML comments so they survive storage round trips and hand edits:
 *
 * ```text
 * <!-- @block:p1-b4 40,112,680,96 -->
 * Paragraph text extracted from the block...
 * ```
 *
 * - **`codec`**: the marker grammar (`encode`, `decode`, `strip`)
 * - **`index`**: nearest-anchor lookup from a cursor offset
 *
 * Anchors are never edited in place. Any change to the content re-decodes the
 * whole list, which is always kept sorted by `position`.
 */

pub mod codec;
pub mod index;

pub use codec::{decode, encode, marker_spans, strip};
pub use index::PositionIndex;

use crate::models::BBox;

/// Position marker decoded from content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    pub block_id: String,
    pub coords: BBox,
    /// Character offset of the marker start in the content.
    pub position: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum AnchorError {
    #[error("Block id must be non-empty and contain no whitespace: {0:?}")]
    InvalidBlockId(String),
}
