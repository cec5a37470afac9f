//! Signature identification through siegfried (`sf -json`).

use std::{
    collections::HashMap,
    ffi::OsStr,
    path::{Path, PathBuf},
};

use serde_json::Value;
use tracing::{debug, warn};

use super::{
    ToolStatus,
    tool::{Tool, ToolError, ToolOutput},
};

/// Format identity of one file as reported by the signature tool.
///
/// `format` may be empty or carry the tool's warning text; neither case is an
/// error for the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureResult {
    pub status: ToolStatus,
    pub format: String,
    pub raw_output: String,
    pub errors: String,
}

impl SignatureResult {
    /// Result for a file the tool could not be run against at all.
    pub fn failed(errors: impl Into<String>) -> Self {
        Self {
            status: ToolStatus::Failed,
            format: String::new(),
            raw_output: String::new(),
            errors: errors.into(),
        }
    }
}

pub struct SignatureAdapter {
    tool: Tool,
}

impl SignatureAdapter {
    pub fn new(tool: Tool) -> Self {
        Self { tool }
    }

    /// Identify a single file. Never fails: tool problems end up in the result.
    pub async fn identify(&self, path: &Path) -> SignatureResult {
        let result = match self.tool.run([OsStr::new("-json"), path.as_os_str()]).await {
            Ok(output) => parse_output(&output),
            Err(err) => SignatureResult::failed(err.to_string()),
        };

        if result.status == ToolStatus::Failed {
            warn!(
                path = %path.display(),
                tool = %self.tool.program(),
                errors = %result.errors.trim(),
                "signature identification failed"
            );
        }

        result
    }

    /// Identify every file under `root` with a single tool run.
    ///
    /// Returns an error only when the tool could not be run or its report could
    /// not be parsed at all; individual entries are indexed by their path.
    pub async fn identify_batch(&self, root: &Path) -> Result<SignatureIndex, BatchError> {
        let output = self
            .tool
            .run([OsStr::new("-json"), root.as_os_str()])
            .await?;

        let report: Value = serde_json::from_str(output.stdout.trim())
            .map_err(|e| BatchError::Unparsable(e.to_string()))?;

        let entries = report
            .get("files")
            .and_then(Value::as_array)
            .ok_or_else(|| BatchError::Unparsable("report has no files list".to_string()))?;

        let mut by_path = HashMap::with_capacity(entries.len());
        for entry in entries {
            let Some(filename) = entry.get("filename").and_then(Value::as_str) else {
                continue;
            };
            let raw_output = serde_json::to_string(entry).unwrap_or_default();
            let format = format_label(entry);
            let status = if format.is_empty() {
                ToolStatus::Empty
            } else {
                ToolStatus::Ok
            };
            by_path.insert(
                normalize_path(Path::new(filename)),
                SignatureResult {
                    status,
                    format,
                    raw_output,
                    errors: entry_errors(entry).to_string(),
                },
            );
        }

        debug!(entries = by_path.len(), root = %root.display(), "indexed batch signature report");

        Ok(SignatureIndex { by_path })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error(transparent)]
    Tool(#[from] ToolError),
    #[error("unparsable batch report: {0}")]
    Unparsable(String),
}

/// Per-file results from one batch run, keyed by normalized path.
#[derive(Debug, Default)]
pub struct SignatureIndex {
    by_path: HashMap<PathBuf, SignatureResult>,
}

impl SignatureIndex {
    pub fn get(&self, path: &Path) -> Option<&SignatureResult> {
        self.by_path.get(&normalize_path(path))
    }

    /// Number of files the report described.
    pub fn entry_count(&self) -> usize {
        self.by_path.len()
    }
}

fn normalize_path(path: &Path) -> PathBuf {
    path.components().collect()
}

/// Turn one captured `sf -json` run into a result.
pub fn parse_output(output: &ToolOutput) -> SignatureResult {
    let mut result = parse_report(&output.stdout, &output.stderr);
    if !output.status.success() && result.errors.trim().is_empty() {
        result.errors = format!("sf exited with {}", output.status);
    }
    result
}

/// Parse the signature tool's JSON report for a single file.
pub fn parse_report(stdout: &str, stderr: &str) -> SignatureResult {
    let mut result = SignatureResult {
        status: ToolStatus::Failed,
        format: String::new(),
        raw_output: stdout.to_string(),
        errors: stderr.to_string(),
    };

    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        return result;
    }

    let Ok(report) = serde_json::from_str::<Value>(trimmed) else {
        return result;
    };

    let first_file = report
        .get("files")
        .and_then(Value::as_array)
        .and_then(|files| files.first());

    let Some(entry) = first_file else {
        result.status = ToolStatus::Empty;
        return result;
    };

    result.format = format_label(entry);
    result.status = if result.format.is_empty() {
        ToolStatus::Empty
    } else {
        ToolStatus::Ok
    };

    let file_errors = entry_errors(entry);
    if !file_errors.is_empty() {
        if !result.errors.is_empty() && !result.errors.ends_with('\n') {
            result.errors.push('\n');
        }
        result.errors.push_str(file_errors);
    }

    result
}

/// Label for the first match: its format name, else its identifier, else its warning.
fn format_label(entry: &Value) -> String {
    let Some(first_match) = entry
        .get("matches")
        .and_then(Value::as_array)
        .and_then(|m| m.first())
    else {
        return String::new();
    };

    ["format", "id", "warning"]
        .iter()
        .filter_map(|key| first_match.get(*key).and_then(Value::as_str))
        .find(|value| !value.is_empty())
        .unwrap_or_default()
        .to_string()
}

fn entry_errors(entry: &Value) -> &str {
    entry
        .get("errors")
        .and_then(Value::as_str)
        .unwrap_or_default()
}
