//! Technical metadata through MediaInfo (`mediainfo -f --Output=JSON`).

use std::{collections::BTreeMap, ffi::OsStr, fmt, path::Path};

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::{
    mapping::{FieldPath, MEDIA_FIELDS, TrackScope},
    tool::Tool,
};

/// Classification of a file by the streams its General track declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackType {
    Video,
    Audio,
    Image,
    NotAv,
    Unknown,
}

impl TrackType {
    /// The `@type` of the track holding this classification's properties.
    fn track_name(self) -> Option<&'static str> {
        match self {
            TrackType::Video => Some("Video"),
            TrackType::Audio => Some("Audio"),
            TrackType::Image => Some("Image"),
            TrackType::NotAv | TrackType::Unknown => None,
        }
    }
}

impl fmt::Display for TrackType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TrackType::Video => "video",
            TrackType::Audio => "audio",
            TrackType::Image => "image",
            TrackType::NotAv => "not_av",
            TrackType::Unknown => "unknown",
        };
        write!(f, "{s}")
    }
}

/// Media properties of one file, keyed by inventory column.
///
/// Columns the report did not mention are absent from `fields`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaTrackInfo {
    pub track_type: TrackType,
    pub fields: BTreeMap<&'static str, String>,
    pub raw_output: String,
}

impl MediaTrackInfo {
    pub fn unknown(raw_output: impl Into<String>) -> Self {
        Self {
            track_type: TrackType::Unknown,
            fields: BTreeMap::new(),
            raw_output: raw_output.into(),
        }
    }
}

pub struct MediaAdapter {
    tool: Tool,
}

impl MediaAdapter {
    pub fn new(tool: Tool) -> Self {
        Self { tool }
    }

    /// Inspect a single file. Never fails: an unusable report yields `unknown`.
    pub async fn inspect(&self, path: &Path) -> MediaTrackInfo {
        let args = [OsStr::new("-f"), OsStr::new("--Output=JSON"), path.as_os_str()];

        match self.tool.run(args).await {
            Ok(output) => {
                let info = parse_report(&output.stdout);
                if info.track_type == TrackType::Unknown {
                    warn!(
                        path = %path.display(),
                        tool = %self.tool.program(),
                        status = %output.status,
                        stderr = %output.stderr.trim(),
                        "media report unusable"
                    );
                } else {
                    debug!(path = %path.display(), track_type = %info.track_type, "media inspected");
                }
                info
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "media inspection failed");
                MediaTrackInfo::unknown(err.to_string())
            }
        }
    }
}

/// Parse a MediaInfo JSON report into a classification and mapped fields.
pub fn parse_report(stdout: &str) -> MediaTrackInfo {
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        return MediaTrackInfo::unknown(stdout);
    }

    let Ok(report) = serde_json::from_str::<Value>(trimmed) else {
        return MediaTrackInfo::unknown(stdout);
    };

    let tracks = track_list(&report);
    let Some(general) = find_track(&tracks, "General") else {
        return MediaTrackInfo::unknown(stdout);
    };

    let track_type = classify(general);
    let mut fields = BTreeMap::new();

    if let Some(name) = track_type.track_name() {
        let classified = find_track(&tracks, name);
        let is_video = track_type == TrackType::Video;

        for field in MEDIA_FIELDS {
            let FieldPath { scope, key } = field.path_for(is_video);
            let track = match scope {
                TrackScope::Classified => classified,
                TrackScope::General => Some(general),
            };
            if let Some(value) = track.and_then(|t| t.get(key)).and_then(scalar_text) {
                fields.insert(field.column, value);
            }
        }
    }

    MediaTrackInfo {
        track_type,
        fields,
        raw_output: stdout.to_string(),
    }
}

/// Classify by the first positive stream count: video, then audio, then image.
fn classify(general: &Value) -> TrackType {
    let positive = |key: &str| count(general, key) > 0;

    if positive("VideoCount") {
        TrackType::Video
    } else if positive("AudioCount") {
        TrackType::Audio
    } else if positive("ImageCount") {
        TrackType::Image
    } else {
        TrackType::NotAv
    }
}

fn count(track: &Value, key: &str) -> u64 {
    match track.get(key) {
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        Some(Value::Number(n)) => n.as_u64().unwrap_or(0),
        _ => 0,
    }
}

/// `media.track` is normally an array, but tolerate a single object.
fn track_list(report: &Value) -> Vec<&Value> {
    match report.get("media").and_then(|m| m.get("track")) {
        Some(Value::Array(tracks)) => tracks.iter().collect(),
        Some(track @ Value::Object(_)) => vec![track],
        _ => Vec::new(),
    }
}

fn find_track<'a>(tracks: &[&'a Value], kind: &str) -> Option<&'a Value> {
    tracks
        .iter()
        .copied()
        .find(|t| t.get("@type").and_then(Value::as_str) == Some(kind))
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
