#![allow(dead_code)]

use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::{Duration, Instant};

use docsync_engine::models::{BBox, BlockType, DocumentLayout, LayoutBlock, PageSize};
use docsync_engine::sync::{
    EditorPanel, ElementHandle, ImagePanel, ScrollBehavior, ScrollMetrics, ScrollPanel,
    SyncController, SyncOptions,
};

pub type Controller = SyncController<MockImage, MockEditor>;

/// Image panel that records every scroll it is asked to perform.
#[derive(Debug, Default)]
pub struct MockImage {
    pub metrics: ScrollMetrics,
    pub scrolls: Vec<(f64, ScrollBehavior)>,
    pub scroll_count: Rc<Cell<usize>>,
    pub panic_on_scroll: bool,
}

impl MockImage {
    pub fn new(scroll_height: f64, client_height: f64) -> Self {
        Self {
            metrics: ScrollMetrics::new(0.0, scroll_height, client_height),
            ..Self::default()
        }
    }
}

impl ScrollPanel for MockImage {
    fn metrics(&self) -> ScrollMetrics {
        self.metrics
    }

    fn scroll_to(&mut self, scroll_top: f64, behavior: ScrollBehavior) {
        if self.panic_on_scroll {
            panic!("image widget failed to scroll");
        }
        self.metrics.scroll_top = scroll_top;
        self.scrolls.push((scroll_top, behavior));
        self.scroll_count.set(self.scroll_count.get() + 1);
    }
}

impl ImagePanel for MockImage {}

/// Editor panel with optional per-block elements and a viewport-top offset.
#[derive(Debug, Default)]
pub struct MockEditor {
    pub metrics: ScrollMetrics,
    pub scrolls: Vec<(f64, ScrollBehavior)>,
    pub elements: HashMap<String, ElementHandle>,
    pub top_offset: Option<usize>,
    pub scroll_count: Rc<Cell<usize>>,
}

impl MockEditor {
    pub fn new(scroll_height: f64, client_height: f64) -> Self {
        Self {
            metrics: ScrollMetrics::new(0.0, scroll_height, client_height),
            ..Self::default()
        }
    }
}

impl ScrollPanel for MockEditor {
    fn metrics(&self) -> ScrollMetrics {
        self.metrics
    }

    fn scroll_to(&mut self, scroll_top: f64, behavior: ScrollBehavior) {
        self.metrics.scroll_top = scroll_top;
        self.scrolls.push((scroll_top, behavior));
        self.scroll_count.set(self.scroll_count.get() + 1);
    }
}

impl EditorPanel for MockEditor {
    fn locate_element_for_block(&self, block_id: &str) -> Option<ElementHandle> {
        self.elements.get(block_id).copied()
    }

    fn offset_at_viewport_top(&self) -> Option<usize> {
        self.top_offset
    }
}

pub fn block(id: &str, block_type: BlockType, page: u32, bbox: BBox, text: &str) -> LayoutBlock {
    LayoutBlock {
        id: id.to_string(),
        block_type,
        bbox,
        confidence: 0.92,
        page_num: page,
        text: Some(text.to_string()),
    }
}

/// Single page with title (y 30..90), paragraph (y 120..300) and table
/// (y 340..640).
pub fn sample_layout() -> DocumentLayout {
    DocumentLayout::new(
        vec![PageSize {
            page_num: 1,
            width: 800,
            height: 1100,
        }],
        vec![
            block("title", BlockType::Title, 1, BBox::new(40, 30, 600, 60), "Invoice 42"),
            block(
                "para",
                BlockType::Text,
                1,
                BBox::new(40, 120, 700, 180),
                "Payment due within 30 days.",
            ),
            block(
                "items",
                BlockType::Table,
                1,
                BBox::new(40, 340, 700, 300),
                "<table><tr><th>Item</th><th>Qty</th></tr><tr><td>Bolt</td><td>4</td></tr></table>",
            ),
        ],
    )
}

pub fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

/// Controller with both panels mounted and `layout`/`content` loaded.
pub fn controller_with(
    layout: DocumentLayout,
    content: &str,
    image: MockImage,
    editor: MockEditor,
) -> Controller {
    let mut controller = Controller::new(SyncOptions::default());
    controller.mount_image(image).unwrap();
    controller.mount_editor(editor).unwrap();
    controller.load_document(layout, content).unwrap();
    controller
}

pub fn start() -> Instant {
    Instant::now()
}
