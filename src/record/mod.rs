//! The fixed-shape inventory row and its column schema.

pub mod normalize;
pub mod schema;

pub use normalize::{FileFact, InventoryRecord, normalize};
