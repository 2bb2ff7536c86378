use crate::content::{ContentBuffer, generate_content};
use crate::models::DocumentLayout;
use std::fs;
use std::path::{Path, PathBuf};

pub const LAYOUT_FILE: &str = "blocks.json";
pub const CONTENT_FILE: &str = "content.md";

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid document directory: {0}")]
    InvalidDocumentDir(String),
    #[error("Failed to parse layout at {path}: {source}")]
    LayoutParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A document directory loaded from disk.
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    pub dir: PathBuf,
    pub layout: DocumentLayout,
    pub content: ContentBuffer,
    /// True when `content.md` was missing and content came from the layout.
    pub generated: bool,
}

/// Read `blocks.json` from a document directory.
pub fn read_layout(document_dir: &Path) -> Result<DocumentLayout, IoError> {
    let path = document_dir.join(LAYOUT_FILE);
    if !path.exists() {
        return Err(IoError::NotFound(path));
    }
    let raw = fs::read_to_string(&path).map_err(IoError::Io)?;
    serde_json::from_str(&raw).map_err(|source| IoError::LayoutParse { path, source })
}

/// Read `content.md`, or `None` if the document has no saved content yet.
pub fn read_content(document_dir: &Path) -> Result<Option<String>, IoError> {
    let path = document_dir.join(CONTENT_FILE);
    if !path.exists() {
        return Ok(None);
    }
    fs::read_to_string(&path).map(Some).map_err(IoError::Io)
}

/// Write `content.md`, creating the document directory if needed.
pub fn write_content(document_dir: &Path, content: &str) -> Result<(), IoError> {
    fs::create_dir_all(document_dir).map_err(IoError::Io)?;
    fs::write(document_dir.join(CONTENT_FILE), content).map_err(IoError::Io)
}

/// Load layout and content, generating content when none was saved.
pub fn load_document(document_dir: &Path) -> Result<LoadedDocument, IoError> {
    validate_document_dir(document_dir)?;
    let layout = read_layout(document_dir)?;
    let (text, generated) = match read_content(document_dir)? {
        Some(text) => (text, false),
        None => (generate_content(&layout), true),
    };
    log::debug!(
        "loaded {} ({} blocks, generated content: {generated})",
        document_dir.display(),
        layout.blocks.len()
    );
    Ok(LoadedDocument {
        dir: document_dir.to_path_buf(),
        layout,
        content: ContentBuffer::new(text),
        generated,
    })
}

/// Find document directories (those holding `blocks.json`) under `root`.
pub fn scan_documents(root: &Path) -> Result<Vec<PathBuf>, IoError> {
    if !root.exists() {
        return Err(IoError::InvalidDocumentDir(
            "documents directory not found".to_string(),
        ));
    }

    let mut documents = Vec::new();
    scan_directory_recursive(root, &mut documents)?;
    documents.sort();
    Ok(documents)
}

fn scan_directory_recursive(dir: &Path, documents: &mut Vec<PathBuf>) -> Result<(), IoError> {
    if dir.join(LAYOUT_FILE).is_file() {
        documents.push(dir.to_path_buf());
    }

    for entry in fs::read_dir(dir).map_err(IoError::Io)? {
        let path = entry.map_err(IoError::Io)?.path();
        if path.is_dir() {
            scan_directory_recursive(&path, documents)?;
        }
    }

    Ok(())
}

pub fn validate_document_dir(path: &Path) -> Result<(), IoError> {
    if !path.exists() || !path.is_dir() {
        return Err(IoError::InvalidDocumentDir(
            "Directory does not exist".to_string(),
        ));
    }

    Ok(())
}
