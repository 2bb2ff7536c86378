use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// One page: a title, a paragraph and a simple table.
pub const SAMPLE_LAYOUT_JSON: &str = r#"{
  "pages": [{ "page_num": 1, "width": 800, "height": 1100 }],
  "blocks": [
    { "id": "title", "type": "title", "bbox": { "x": 40, "y": 30, "width": 600, "height": 60 },
      "confidence": 0.97, "page_num": 1, "text": "Invoice 42" },
    { "id": "para", "type": "text", "bbox": { "x": 40, "y": 120, "width": 700, "height": 180 },
      "confidence": 0.84, "page_num": 1, "text": "Payment due within 30 days." },
    { "id": "items", "type": "table", "bbox": { "x": 40, "y": 340, "width": 700, "height": 300 },
      "confidence": 0.71, "page_num": 1,
      "text": "<table><tr><th>Item</th><th>Qty</th></tr><tr><td>Bolt</td><td>4</td></tr></table>" }
  ]
}"#;

/// Create a temporary root for document directories
pub fn create_test_root() -> TempDir {
    tempfile::tempdir().unwrap()
}

/// Create a document directory with a layout and optional saved content
pub fn create_test_document(
    root: &TempDir,
    name: &str,
    layout_json: &str,
    content: Option<&str>,
) -> PathBuf {
    let dir = root.path().join(name);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("blocks.json"), layout_json).unwrap();
    if let Some(content) = content {
        fs::write(dir.join("content.md"), content).unwrap();
    }
    dir
}
