//! The inventory command: validate inputs, run the harvest, report the result.

use std::{
    io::{self, IsTerminal, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::{
    Cli, OutputFormat,
    error::InventoryError,
    inspection::{
        Tool,
        style::{dim, header, label, value, warn as warn_style},
    },
    pipeline::{Harvest, HarvestConfig, HarvestSummary},
    utils::filesystem::ensure_dir_exists,
};

const FALLBACK_NAME: &str = "inventory";

pub async fn run(cli: Cli) -> Result<()> {
    let root = validate_root(&cli.inventory_path).await?;

    let out_dir = cli.out_path.clone().unwrap_or_else(default_out_dir);
    ensure_dir_exists(&out_dir).await?;
    let destination = out_dir.join(format!("{}.csv", output_name(&root).await));

    let timeout = cli.tool_timeout();
    let config = HarvestConfig {
        jobs: cli.jobs(),
        signature_tool: Tool::new(&cli.sf_path, timeout),
        media_tool: cli
            .mediainfo
            .then(|| Tool::new(&cli.mediainfo_path, timeout)),
        batch_signatures: cli.sf_batch,
    };

    info!(
        root = %root.display(),
        output = %destination.display(),
        jobs = config.jobs,
        mediainfo = cli.mediainfo,
        "starting inventory"
    );

    let cancel = CancellationToken::new();
    let interrupt = tokio::spawn(cancel_on_interrupt(cancel.clone()));

    let result = Harvest::new(config)
        .execute(&root, &destination, cancel)
        .await;
    interrupt.abort();

    let summary = result.with_context(|| format!("failed to inventory {}", root.display()))?;

    let mut out = io::stdout();
    if cli.format.resolves_to_json() {
        writeln!(out, "{}", serde_json::to_string(&summary)?)?;
    } else {
        let styled = out.is_terminal();
        render_text(&summary, &mut out, styled)?;
    }
    out.flush()?;

    Ok(())
}

async fn validate_root(path: &Path) -> Result<PathBuf, InventoryError> {
    match tokio::fs::metadata(path).await {
        Ok(metadata) if metadata.is_dir() => Ok(path.to_path_buf()),
        _ => Err(InventoryError::InvalidRoot {
            path: path.to_path_buf(),
        }),
    }
}

fn default_out_dir() -> PathBuf {
    dirs::desktop_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Base name of the inventory file for `root`.
///
/// Paths without a final name (`.`, `..`) are resolved first; a root with no
/// name at all, such as `/`, falls back to `inventory`.
async fn output_name(root: &Path) -> String {
    if let Some(name) = root.file_name() {
        return name.to_string_lossy().into_owned();
    }

    tokio::fs::canonicalize(root)
        .await
        .ok()
        .and_then(|resolved| {
            resolved
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| FALLBACK_NAME.to_string())
}

async fn cancel_on_interrupt(cancel: CancellationToken) {
    if tokio::signal::ctrl_c().await.is_ok() {
        warn!("interrupted, stopping inventory");
        cancel.cancel();
    }
}

/// Plain text unless `styled`, so redirected output carries no escape codes.
fn render_text(summary: &HarvestSummary, out: &mut impl Write, styled: bool) -> io::Result<()> {
    let paint = |style: fn(String) -> String, text: String| if styled { style(text) } else { text };

    writeln!(
        out,
        "{} {}",
        paint(header, "Inventory written to".to_string()),
        paint(value, summary.output.display().to_string())
    )?;
    writeln!(out, "  {} {}", paint(label, "Files:".to_string()), summary.files)?;

    let failure_style: fn(String) -> String = if summary.signature_failures > 0 {
        warn_style
    } else {
        dim
    };
    writeln!(
        out,
        "  {} {}",
        paint(label, "Identification failures:".to_string()),
        paint(failure_style, summary.signature_failures.to_string())
    )?;

    if let Some(track_types) = &summary.track_types {
        for (track_type, count) in track_types {
            writeln!(out, "  {} {}", paint(label, format!("{track_type}:")), count)?;
        }
    }

    Ok(())
}
