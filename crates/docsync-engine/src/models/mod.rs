pub mod layout;

pub use layout::{BBox, BlockType, DocumentLayout, LayoutBlock, PageSize, ScaledRect};
