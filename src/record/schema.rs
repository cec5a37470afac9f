//! Canonical column names and their presentation order.

use crate::inspection::mapping::{RAW_MEDIA_COLUMN, media_columns};

pub const FILE_NAME: &str = "File Name";
pub const FILE_SIZE: &str = "File Size";
pub const FOLDER: &str = "Folder";
pub const CREATED_ON: &str = "Created On";
pub const LAST_MODIFIED_ON: &str = "Last Modified On";

pub const SIGNATURE_FORMAT: &str = "File Format (Siegfried)";
pub const SIGNATURE_RAW: &str = "Full Siegfried Output";
pub const SIGNATURE_ERRORS: &str = "Siegfried Error Messages";

/// Columns every run produces, whatever the configuration.
pub const BASE_COLUMNS: &[&str] = &[
    FILE_NAME,
    FILE_SIZE,
    SIGNATURE_FORMAT,
    FOLDER,
    CREATED_ON,
    LAST_MODIFIED_ON,
    SIGNATURE_RAW,
    SIGNATURE_ERRORS,
];

/// Preferred left-to-right order of every known column.
pub const HEADER_ORDER: &[&str] = &[
    FILE_NAME,
    FILE_SIZE,
    SIGNATURE_FORMAT,
    FOLDER,
    CREATED_ON,
    LAST_MODIFIED_ON,
    "File Format (MediaInfo)",
    "Format term",
    "Duration",
    "Format Profile",
    "Sample Rate",
    "Bit Depth",
    "Bitrate",
    "Channels",
    "Frame rate",
    "Width",
    "Height",
    "CodecID",
    "Aspect ratio",
    "Audio Channels",
    SIGNATURE_RAW,
    SIGNATURE_ERRORS,
    RAW_MEDIA_COLUMN,
];

/// The full key set of every record in a run.
pub fn canonical_columns(media_enabled: bool) -> Vec<&'static str> {
    let mut columns = BASE_COLUMNS.to_vec();
    if media_enabled {
        columns.extend(media_columns());
        columns.push(RAW_MEDIA_COLUMN);
    }
    columns
}

/// `HEADER_ORDER` filtered to the columns a record actually carries.
pub fn header_for(present: impl Fn(&str) -> bool) -> Vec<&'static str> {
    HEADER_ORDER
        .iter()
        .copied()
        .filter(|column| present(column))
        .collect()
}
