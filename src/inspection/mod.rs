//! Adapters around the external identification tools.

pub mod mapping;
pub mod media;
pub mod signature;
pub mod style;
pub mod tool;

use serde::Serialize;

pub use media::{MediaAdapter, MediaTrackInfo, TrackType};
pub use signature::{SignatureAdapter, SignatureIndex, SignatureResult};
pub use tool::{Tool, ToolError, ToolOutput};

/// How a tool invocation turned out for one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolStatus {
    /// The tool produced a usable, non-empty answer.
    Ok,
    /// The tool ran and reported nothing conclusive.
    Empty,
    /// The tool could not be run or its output could not be read.
    Failed,
}
