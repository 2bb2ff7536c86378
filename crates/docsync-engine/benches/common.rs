// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
use docsync_engine::models::{BBox, BlockType, LayoutBlock};

/// Blocks stacked down a single tall page, 40px apart.
#[allow(dead_code)]
pub fn generate_blocks(count: usize) -> Vec<LayoutBlock> {
    (0..count)
        .map(|i| LayoutBlock {
            id: format!("b{i}"),
            block_type: if i % 10 == 0 {
                BlockType::Title
            } else {
                BlockType::Text
            },
            bbox: BBox::new(40, (i as u32) * 40, 700, 32),
            confidence: 0.5 + (i % 50) as f64 / 100.0,
            page_num: 1,
            text: Some(format!("Line {i} of the scanned page.")),
        })
        .collect()
}

/// Content with one marker per block followed by a short paragraph.
#[allow(dead_code)]
pub fn generate_anchored_content(count: usize) -> String {
    let mut content = String::new();
    for i in 0..count {
        content.push_str(&format!(
            "<!-- @block:b{i} 40,{},700,32 -->\nParagraph {i} with some recognised text.\n\n",
            i * 40
        ));
    }
    content
}
