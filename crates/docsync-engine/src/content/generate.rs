use crate::anchors::encode;
use crate::models::{BlockType, DocumentLayout, LayoutBlock};
use crate::tables::serialize_table;

/// Build the initial content buffer for a freshly analysed document.
///
/// Each block, in reading order, becomes its anchor marker on one line
/// followed by the block body. Blocks are separated by a blank line.
pub fn generate_content(layout: &DocumentLayout) -> String {
    let sections: Vec<String> = layout
        .reading_order()
        .into_iter()
        .map(render_section)
        .collect();
    sections.join("\n\n")
}

fn render_section(block: &LayoutBlock) -> String {
    let body = render_body(block);
    match encode(&block.id, block.bbox) {
        Ok(marker) if body.is_empty() => marker,
        Ok(marker) => format!("{marker}\n{body}"),
        Err(e) => {
            log::warn!("emitting block without anchor: {e}");
            body
        }
    }
}

fn render_body(block: &LayoutBlock) -> String {
    let text = block.text().trim();
    match block.block_type {
        BlockType::Title if text.is_empty() => String::new(),
        BlockType::Title => format!("# {}", text.replace('\n', " ")),
        BlockType::Table => serialize_table(text),
        BlockType::Figure if text.is_empty() => format!("![figure]({})", block.id),
        BlockType::Figure => format!("![figure]({})\n{text}", block.id),
        BlockType::Text | BlockType::List | BlockType::Reference => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchors::{decode, strip};
    use crate::models::{BBox, PageSize};
    use pretty_assertions::assert_eq;

    fn block(id: &str, block_type: BlockType, y: u32, text: Option<&str>) -> LayoutBlock {
        LayoutBlock {
            id: id.to_string(),
            block_type,
            bbox: BBox::new(40, y, 700, 50),
            confidence: 0.93,
            page_num: 1,
            text: text.map(str::to_string),
        }
    }

    fn layout(blocks: Vec<LayoutBlock>) -> DocumentLayout {
        DocumentLayout::new(
            vec![PageSize {
                page_num: 1,
                width: 800,
                height: 1100,
            }],
            blocks,
        )
    }

    #[test]
    fn test_generates_marked_sections_in_reading_order() {
        let layout = layout(vec![
            block("p1", BlockType::Text, 200, Some("Body text.")),
            block("t1", BlockType::Title, 40, Some("Annual Report")),
            block(
                "tab1",
                BlockType::Table,
                400,
                Some("<table><tr><th>k</th><th>v</th></tr><tr><td>a</td><td>1</td></tr></table>"),
            ),
            block("fig1", BlockType::Figure, 700, None),
        ]);

        insta::assert_snapshot!(generate_content(&layout), @r"
        <!-- @block:t1 40,40,700,50 -->
        # Annual Report

        <!-- @block:p1 40,200,700,50 -->
        Body text.

        <!-- @block:tab1 40,400,700,50 -->
        | k | v |
        | --- | --- |
        | a | 1 |

        <!-- @block:fig1 40,700,700,50 -->
        ![figure](fig1)
        ");
    }

    #[test]
    fn test_complex_table_kept_as_html() {
        let html = r#"<table><tr><td rowspan="2">x</td><td>y</td></tr><tr><td>z</td></tr></table>"#;
        let content = generate_content(&layout(vec![block("tab", BlockType::Table, 0, Some(html))]));
        assert!(content.ends_with(html));
    }

    #[test]
    fn test_every_block_gets_an_anchor_even_when_empty() {
        let layout = layout(vec![
            block("a", BlockType::Text, 0, None),
            block("b", BlockType::Title, 100, Some("  ")),
            block("c", BlockType::List, 200, Some("- one\n- two")),
        ]);
        let content = generate_content(&layout);
        let ids: Vec<String> = decode(&content).into_iter().map(|a| a.block_id).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(strip(&content), "- one\n- two");
    }

    #[test]
    fn test_block_with_unencodable_id_keeps_body() {
        let content = generate_content(&layout(vec![block("bad id", BlockType::Text, 0, Some("hi"))]));
        assert_eq!(content, "hi");
        assert!(decode(&content).is_empty());
    }

    #[test]
    fn test_empty_layout() {
        assert_eq!(generate_content(&DocumentLayout::default()), "");
    }
}
