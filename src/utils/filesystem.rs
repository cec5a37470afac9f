use std::{ffi::OsStr, path::Path};

use tokio::fs::create_dir_all;

use crate::error::InventoryError;

/// Create `dir` and any missing parents.
pub async fn ensure_dir_exists(dir: &Path) -> Result<(), InventoryError> {
    create_dir_all(dir)
        .await
        .map_err(|e| InventoryError::write(dir, e))
}

/// Dot-prefixed names are hidden.
pub fn is_hidden(name: &OsStr) -> bool {
    name.as_encoded_bytes().first() == Some(&b'.')
}
