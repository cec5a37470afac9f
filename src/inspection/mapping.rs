//! Static mapping from MediaInfo report keys to inventory columns.
//!
//! Adding a media column means adding an entry here; extraction and the record
//! schema both read these tables and nothing else.

/// Where in a MediaInfo report a column's value lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackScope {
    /// The track whose `@type` matches the file's classification.
    Classified,
    /// The container-level `General` track.
    General,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldPath {
    pub scope: TrackScope,
    pub key: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaField {
    pub column: &'static str,
    pub path: FieldPath,
    /// Overrides `path` for files classified as video, whose audio properties
    /// live outside the video track.
    pub video_path: Option<FieldPath>,
}

const fn classified(column: &'static str, key: &'static str) -> MediaField {
    MediaField {
        column,
        path: FieldPath {
            scope: TrackScope::Classified,
            key,
        },
        video_path: None,
    }
}

pub const MEDIA_FIELDS: &[MediaField] = &[
    classified("File Format (MediaInfo)", "Format"),
    classified("Format term", "Format_String"),
    classified("Duration", "Duration_String"),
    classified("Format Profile", "Format_Profile"),
    classified("Sample Rate", "SamplingRate_String"),
    classified("Bit Depth", "BitDepth_String"),
    classified("Bitrate", "BitRate_String"),
    classified("Channels", "Channels"),
    classified("Frame rate", "FrameRate_String"),
    classified("Width", "Width_String"),
    classified("Height", "Height_String"),
    classified("CodecID", "CodecID"),
    classified("Aspect ratio", "DisplayAspectRatio_String"),
    MediaField {
        column: "Audio Channels",
        path: FieldPath {
            scope: TrackScope::Classified,
            key: "AudioCount",
        },
        video_path: Some(FieldPath {
            scope: TrackScope::General,
            key: "AudioCount",
        }),
    },
];

/// Column carrying the media tool's raw report.
pub const RAW_MEDIA_COLUMN: &str = "Full Mediainfo Output";

/// Every column name the media stage can populate, in table order.
pub fn media_columns() -> impl Iterator<Item = &'static str> {
    MEDIA_FIELDS.iter().map(|field| field.column)
}


impl MediaField {
    /// The path to query for a file with the given classification.
    pub fn path_for(&self, is_video: bool) -> FieldPath {
        match (is_video, self.video_path) {
            (true, Some(path)) => path,
            _ => self.path,
        }
    }
}
