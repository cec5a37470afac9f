//! Folding filesystem facts and tool results into fixed-shape records.

use std::{
    collections::BTreeMap,
    fs::Metadata,
    io,
    path::{Path, PathBuf},
};

use crate::{
    inspection::{
        MediaTrackInfo, SignatureResult,
        mapping::{RAW_MEDIA_COLUMN, media_columns},
    },
    utils::humanize::{human_size, local_timestamp},
};

use super::schema::{
    CREATED_ON, FILE_NAME, FILE_SIZE, FOLDER, LAST_MODIFIED_ON, SIGNATURE_ERRORS,
    SIGNATURE_FORMAT, SIGNATURE_RAW,
};

/// What the filesystem says about one file, captured from a single stat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFact {
    pub path: PathBuf,
    pub folder: String,
    pub name: String,
    pub size: u64,
    pub human_size: String,
    /// Empty when the platform does not record creation time.
    pub created: String,
    pub modified: String,
}

impl FileFact {
    pub async fn stat(path: &Path) -> io::Result<Self> {
        let metadata = tokio::fs::metadata(path).await?;
        Ok(Self::from_metadata(path, &metadata))
    }

    pub fn from_metadata(path: &Path, metadata: &Metadata) -> Self {
        let size = metadata.len();
        Self {
            size,
            human_size: human_size(size),
            created: metadata.created().map(local_timestamp).unwrap_or_default(),
            modified: metadata.modified().map(local_timestamp).unwrap_or_default(),
            ..Self::unreadable(path)
        }
    }

    /// Facts for a file that could not be stat-ed: names only.
    pub fn unreadable(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            folder: path
                .parent()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            size: 0,
            human_size: String::new(),
            created: String::new(),
            modified: String::new(),
        }
    }
}

/// One output row: canonical column name to text value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryRecord {
    values: BTreeMap<&'static str, String>,
}

impl InventoryRecord {
    pub fn get(&self, column: &str) -> Option<&str> {
        self.values.get(column).map(String::as_str)
    }

}

/// Merge the three sources for one file into a record.
///
/// `media` is `None` when media inspection is off for the run; when it is
/// `Some`, every media column is present, empty if the report lacked it.
/// Each source owns a disjoint set of columns, so no value is overwritten.
pub fn normalize(
    fact: FileFact,
    signature: SignatureResult,
    media: Option<MediaTrackInfo>,
) -> InventoryRecord {
    let mut values = BTreeMap::new();

    values.insert(FILE_NAME, fact.name);
    values.insert(FOLDER, fact.folder);
    values.insert(FILE_SIZE, fact.human_size);
    values.insert(CREATED_ON, fact.created);
    values.insert(LAST_MODIFIED_ON, fact.modified);

    values.insert(SIGNATURE_FORMAT, signature.format);
    values.insert(SIGNATURE_RAW, signature.raw_output);
    values.insert(SIGNATURE_ERRORS, signature.errors);

    if let Some(mut media) = media {
        for column in media_columns() {
            let value = media.fields.remove(column).unwrap_or_default();
            values.insert(column, value);
        }
        values.insert(RAW_MEDIA_COLUMN, media.raw_output);
    }

    InventoryRecord { values }
}
