mod common;

use common::*;
use docsync_engine::anchors::strip;
use docsync_engine::content::{ContentBuffer, generate_content};
use docsync_engine::io::{self, LAYOUT_FILE};
use docsync_engine::sync::{Panel, SyncMode};
use pretty_assertions::assert_eq;

fn block_ids(buffer: &ContentBuffer) -> Vec<&str> {
    buffer
        .anchors()
        .iter()
        .map(|a| a.block_id.as_str())
        .collect()
}

#[test]
fn generated_content_anchors_every_block_with_its_coordinates() {
    let layout = sample_layout();
    let buffer = ContentBuffer::new(generate_content(&layout));

    assert_eq!(block_ids(&buffer), vec!["title", "para", "items"]);
    for anchor in buffer.anchors() {
        let block = layout.find_block(&anchor.block_id).unwrap();
        assert_eq!(anchor.coords, block.bbox);
    }
    assert_eq!(
        strip(buffer.text()),
        "# Invoice 42\n\nPayment due within 30 days.\n\n| Item | Qty |\n| --- | --- |\n| Bolt | 4 |"
    );
}

#[test]
fn edits_shift_positions_but_keep_block_ids() {
    let mut buffer = ContentBuffer::new(generate_content(&sample_layout()));
    let before = buffer.index().position_of("items").unwrap();

    let edited = buffer
        .text()
        .replacen("Payment due", "Payment (net, no discount) due", 1);
    buffer.replace(edited);

    assert_eq!(block_ids(&buffer), vec!["title", "para", "items"]);
    assert_eq!(
        buffer.index().position_of("items").unwrap(),
        before + "(net, no discount) ".chars().count()
    );
}

#[test]
fn cursor_in_edited_section_still_centres_its_block() {
    let mut buffer = ContentBuffer::new(generate_content(&sample_layout()));
    let t0 = start();
    let mut c = controller_with(
        sample_layout(),
        buffer.text(),
        MockImage::new(2000.0, 600.0),
        MockEditor::new(3000.0, 500.0),
    );

    let edited = buffer.text().replacen("# Invoice 42", "# Invoice 42 (copy)", 1);
    buffer.replace(edited);
    c.on_content_changed(buffer.text()).unwrap();

    let section = buffer.block_section("items").unwrap();
    c.on_editor_cursor(section.start + 5, t0).unwrap();
    let outcome = c.poll(t0 + ms(50)).unwrap().unwrap();

    assert_eq!(outcome.source, Panel::Editor);
    assert_eq!(outcome.mode, SyncMode::Anchor);
    assert_eq!(outcome.block_id.as_deref(), Some("items"));
    // 340 - 600/2 + 300/2
    assert_eq!(outcome.target_scroll_top, 190.0);
}

#[test]
fn saved_content_is_loaded_instead_of_regenerated() {
    let root = tempfile::tempdir().unwrap();
    let dir = root.path().join("invoice");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join(LAYOUT_FILE),
        serde_json::to_string_pretty(&sample_layout()).unwrap(),
    )
    .unwrap();

    let fresh = io::load_document(&dir).unwrap();
    assert!(fresh.generated);

    let edited = fresh.content.text().replace("Bolt", "Nut");
    io::write_content(&dir, &edited).unwrap();

    let reloaded = io::load_document(&dir).unwrap();
    assert!(!reloaded.generated);
    assert_eq!(reloaded.content.text(), edited);
    assert_eq!(reloaded.layout, fresh.layout);
    assert_eq!(block_ids(&reloaded.content), vec!["title", "para", "items"]);
}
