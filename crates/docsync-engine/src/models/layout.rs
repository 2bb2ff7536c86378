use serde::{Deserialize, Serialize};

/// Axis-aligned box in image pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct BBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BBox {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Project the box into scaled (zoomed) pixel space.
    pub fn scaled(&self, scale: f64) -> ScaledRect {
        let left = f64::from(self.x) * scale;
        let top = f64::from(self.y) * scale;
        ScaledRect {
            left,
            top,
            right: left + f64::from(self.width) * scale,
            bottom: top + f64::from(self.height) * scale,
        }
    }

    /// Whether image-space `y` falls inside the vertical extent of the box.
    pub fn contains_y(&self, y: f64) -> bool {
        let top = f64::from(self.y);
        y >= top && y <= top + f64::from(self.height)
    }
}

/// Block bounds after zoom has been applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaledRect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

/// Structural classification assigned by the layout collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockType {
    Title,
    Text,
    Table,
    Figure,
    List,
    Reference,
}

impl BlockType {
    pub fn label(&self) -> &'static str {
        match self {
            BlockType::Title => "title",
            BlockType::Text => "text",
            BlockType::Table => "table",
            BlockType::Figure => "figure",
            BlockType::List => "list",
            BlockType::Reference => "reference",
        }
    }
}

/// One classified region of a page, as produced by layout analysis.
///
/// Read-only for the sync core; a new document load replaces the whole list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutBlock {
    pub id: String,
    #[serde(rename = "type")]
    pub block_type: BlockType,
    pub bbox: BBox,
    pub confidence: f64,
    pub page_num: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl LayoutBlock {
    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }
}

/// Rendered size of one page image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSize {
    pub page_num: u32,
    pub width: u32,
    pub height: u32,
}

/// Everything the layout collaborator hands over for one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentLayout {
    #[serde(default)]
    pub pages: Vec<PageSize>,
    #[serde(default)]
    pub blocks: Vec<LayoutBlock>,
}

impl DocumentLayout {
    pub fn new(pages: Vec<PageSize>, blocks: Vec<LayoutBlock>) -> Self {
        Self { pages, blocks }
    }

    pub fn find_block(&self, id: &str) -> Option<&LayoutBlock> {
        self.blocks.iter().find(|b| b.id == id)
    }

    pub fn page_size(&self, page_num: u32) -> Option<PageSize> {
        self.pages.iter().copied().find(|p| p.page_num == page_num)
    }

    /// Blocks of a single page. Each page is its own coordinate space.
    pub fn page_blocks(&self, page_num: u32) -> Vec<LayoutBlock> {
        self.blocks
            .iter()
            .filter(|b| b.page_num == page_num)
            .cloned()
            .collect()
    }

    /// Page numbers present in the layout, ascending and deduplicated.
    pub fn page_numbers(&self) -> Vec<u32> {
        let mut pages: Vec<u32> = self
            .pages
            .iter()
            .map(|p| p.page_num)
            .chain(self.blocks.iter().map(|b| b.page_num))
            .collect();
        pages.sort_unstable();
        pages.dedup();
        pages
    }

    /// Blocks in reading order: page, then top edge, then left edge.
    pub fn reading_order(&self) -> Vec<&LayoutBlock> {
        let mut ordered: Vec<&LayoutBlock> = self.blocks.iter().collect();
        ordered.sort_by_key(|b| (b.page_num, b.bbox.y, b.bbox.x));
        ordered
    }
}
