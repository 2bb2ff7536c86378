pub mod generate;

pub use generate::generate_content;

use crate::anchors::{Anchor, PositionIndex, strip};

/// Editable content together with the anchors decoded from it.
///
/// The anchor list is a snapshot: every change to the text goes through
/// [`ContentBuffer::replace`], which re-decodes it wholesale.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentBuffer {
    text: String,
    index: PositionIndex,
}

impl ContentBuffer {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let index = PositionIndex::from_content(&text);
        Self { text, index }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn index(&self) -> &PositionIndex {
        &self.index
    }

    pub fn anchors(&self) -> &[Anchor] {
        self.index.anchors()
    }

    /// Swap in edited text and rebuild the anchors.
    pub fn replace(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.index = PositionIndex::from_content(&self.text);
    }

    /// Human-visible text with every marker removed.
    pub fn visible_text(&self) -> String {
        strip(&self.text)
    }

    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Zero-based line containing character `offset`. Offsets past the end
    /// land on the last line.
    pub fn line_of_offset(&self, offset: usize) -> usize {
        self.text
            .chars()
            .take(offset)
            .filter(|c| *c == '\n')
            .count()
    }

    /// Character offset at which zero-based `line` starts, clamped to the end
    /// of the content.
    pub fn offset_of_line(&self, line: usize) -> usize {
        if line == 0 {
            return 0;
        }
        let mut seen = 0;
        for (i, c) in self.text.chars().enumerate() {
            if c == '\n' {
                seen += 1;
                if seen == line {
                    return i + 1;
                }
            }
        }
        self.char_len()
    }

    /// Character range from a block's marker up to the next marker.
    pub fn block_section(&self, block_id: &str) -> Option<std::ops::Range<usize>> {
        let anchors = self.index.anchors();
        let i = anchors.iter().position(|a| a.block_id == block_id)?;
        let end = anchors
            .get(i + 1)
            .map(|next| next.position)
            .unwrap_or_else(|| self.char_len());
        Some(anchors[i].position..end)
    }
}
