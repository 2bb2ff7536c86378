pub mod anchors;
pub mod confidence;
pub mod content;
pub mod io;
pub mod models;
pub mod sync;
pub mod tables;
pub mod viewport;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use anchors::{Anchor, AnchorError, PositionIndex};
pub use confidence::{ConfidenceTier, TierStyle};
pub use content::{ContentBuffer, generate_content};
pub use io::{IoError, LoadedDocument};
pub use models::*;
pub use sync::{
    EditorPanel, ElementHandle, ImagePanel, ScrollBehavior, ScrollMetrics, ScrollPanel,
    SyncController, SyncError, SyncOptions,
};
pub use tables::{Table, TableCell, TableFormat};
pub use viewport::{CullerOptions, Viewport, ViewportCuller};
