pub mod commands;
pub mod error;
pub mod inspection;
pub mod pipeline;
pub mod record;
pub mod sinks;
pub mod system;
pub mod utils;

use clap::{Parser, ValueEnum, builder::ValueHint};
use std::{path::PathBuf, time::Duration};

/// Parse a usize that must be at least 1.
fn parse_at_least_one(s: &str) -> Result<usize, String> {
    let n: usize = s.parse().map_err(|e| format!("{e}"))?;
    if n == 0 {
        Err("value must be at least 1".into())
    } else {
        Ok(n)
    }
}

/// Build a CSV inventory of a directory tree.
///
/// Every non-hidden file under the inventory path gets one row with its size,
/// timestamps and the format reported by siegfried (`sf`). With --mediainfo,
/// audio, video and image files also get their technical metadata from
/// MediaInfo.
#[derive(Parser, Debug)]
#[command(name = "file-reporter", version, about, verbatim_doc_comment)]
pub struct Cli {
    /// Directory to inventory.
    #[arg(short = 'p', long, alias = "inventory_path", value_hint = ValueHint::DirPath)]
    pub inventory_path: PathBuf,

    /// Directory the inventory is written to, as `<inventory name>.csv`.
    ///
    /// Defaults to the desktop folder, then the home directory. Created if missing.
    #[arg(short = 'o', long, alias = "out_path", value_hint = ValueHint::DirPath)]
    pub out_path: Option<PathBuf>,

    /// Also collect technical metadata with MediaInfo.
    #[arg(short = 'm', long)]
    pub mediainfo: bool,

    /// Number of files inspected concurrently. Defaults to the number of CPU cores.
    #[arg(short = 'j', long, value_parser = parse_at_least_one)]
    pub jobs: Option<usize>,

    /// siegfried executable.
    #[arg(long, env = "SF_PATH", default_value = "sf", value_hint = ValueHint::ExecutablePath)]
    pub sf_path: PathBuf,

    /// MediaInfo executable.
    #[arg(
        long,
        env = "MEDIAINFO_PATH",
        default_value = "mediainfo",
        value_hint = ValueHint::ExecutablePath
    )]
    pub mediainfo_path: PathBuf,

    /// Seconds a single tool invocation may run before it is killed.
    #[arg(long, value_name = "SECS", default_value_t = 300, value_parser = parse_at_least_one)]
    pub tool_timeout: usize,

    /// Identify the whole tree with a single siegfried run.
    ///
    /// Files missing from its report, or every file if the run fails, are
    /// identified one at a time instead.
    #[arg(long)]
    pub sf_batch: bool,

    /// Format of the summary printed when the inventory is complete.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Only log warnings and errors.
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    pub fn tool_timeout(&self) -> Duration {
        Duration::from_secs(self.tool_timeout as u64)
    }

    pub fn jobs(&self) -> usize {
        self.jobs.unwrap_or_else(system::get_available_cpu_cores)
    }
}

/// Output format for the run summary
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[value(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output
    Json,
}

impl OutputFormat {
    pub fn resolves_to_json(&self) -> bool {
        match self {
            OutputFormat::Text => false,
            OutputFormat::Json => true,
        }
    }
}
