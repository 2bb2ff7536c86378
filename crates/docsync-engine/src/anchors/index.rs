use super::{Anchor, decode};

/// Sorted anchor list answering "which block is this cursor in?".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PositionIndex {
    anchors: Vec<Anchor>,
}

impl PositionIndex {
    /// Build an index from anchors in any order. Sorting is stable, so
    /// anchors sharing a position keep their relative order.
    pub fn new(mut anchors: Vec<Anchor>) -> Self {
        anchors.sort_by_key(|a| a.position);
        Self { anchors }
    }

    pub fn from_content(content: &str) -> Self {
        Self::new(decode(content))
    }

    /// Anchor with the greatest position not exceeding `offset`.
    ///
    /// Ties resolve to the last anchor at that position. The scan stops at the
    /// first anchor past `offset`.
    pub fn nearest_at_or_before(&self, offset: usize) -> Option<&Anchor> {
        let mut nearest = None;
        for anchor in &self.anchors {
            if anchor.position > offset {
                break;
            }
            nearest = Some(anchor);
        }
        nearest
    }

    pub fn get(&self, block_id: &str) -> Option<&Anchor> {
        self.anchors.iter().find(|a| a.block_id == block_id)
    }

    /// Character offset of the marker for `block_id`.
    pub fn position_of(&self, block_id: &str) -> Option<usize> {
        self.get(block_id).map(|a| a.position)
    }

    pub fn max_position(&self) -> Option<usize> {
        self.anchors.last().map(|a| a.position)
    }

    pub fn anchors(&self) -> &[Anchor] {
        &self.anchors
    }

    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }
}
