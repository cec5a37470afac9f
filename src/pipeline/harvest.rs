//! Inventory orchestration: enumerate, inspect in parallel, write in order.
//!
//! Files are numbered in enumeration order. A fixed pool of workers claims
//! numbers from a shared counter and runs the external tools for that file,
//! while a single blocking writer restores enumeration order before rows reach
//! the CSV. The number of finished-but-unwritten records is bounded, so one
//! slow file cannot make the others pile up in memory.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use serde::Serialize;
use tokio::{
    sync::{OwnedSemaphorePermit, Semaphore, mpsc},
    task::JoinSet,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::walk::list_files;
use crate::{
    error::InventoryError,
    inspection::{MediaAdapter, SignatureAdapter, SignatureIndex, Tool, ToolStatus, TrackType},
    record::{FileFact, InventoryRecord, normalize, schema::canonical_columns},
    sinks::{CsvFileSink, RecordSink},
    utils::{first_error::FirstError, reorder::ReorderBuffer},
};

/// Finished records allowed to wait for an earlier one, per worker.
const WINDOW_PER_JOB: usize = 16;

/// `jobs * per_job`, kept within what tokio's semaphores accept.
fn bounded_capacity(jobs: usize, per_job: usize) -> usize {
    jobs.saturating_mul(per_job).clamp(1, Semaphore::MAX_PERMITS)
}

pub struct HarvestConfig {
    /// Number of files inspected concurrently.
    pub jobs: usize,
    pub signature_tool: Tool,
    /// `None` disables media inspection and its columns.
    pub media_tool: Option<Tool>,
    /// Identify the whole tree with one signature tool run.
    pub batch_signatures: bool,
}

/// What a finished run produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HarvestSummary {
    pub output: PathBuf,
    pub files: u64,
    pub signature_failures: u64,
    /// Files per media classification; absent when media inspection was off.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track_types: Option<BTreeMap<TrackType, u64>>,
}

pub struct Harvest {
    config: HarvestConfig,
}

impl Harvest {
    pub fn new(config: HarvestConfig) -> Self {
        Self { config }
    }

    /// Inventory `root` into the CSV file at `destination`.
    ///
    /// Per-file tool failures end up in that file's row. The run only fails if
    /// the output cannot be written or `cancel` fires before every row was
    /// written; in both cases nothing is left at `destination`.
    pub async fn execute(
        self,
        root: &Path,
        destination: &Path,
        cancel: CancellationToken,
    ) -> Result<HarvestSummary, InventoryError> {
        let sink = {
            let destination = destination.to_path_buf();
            let columns = canonical_columns(self.config.media_tool.is_some());
            tokio::task::spawn_blocking(move || CsvFileSink::create(&destination, &columns))
                .await??
        };

        self.execute_into(root, sink, cancel).await
    }

    /// Inventory `root` into an already created sink.
    pub async fn execute_into<S>(
        self,
        root: &Path,
        sink: S,
        cancel: CancellationToken,
    ) -> Result<HarvestSummary, InventoryError>
    where
        S: RecordSink + Send + 'static,
    {
        let first_error = Arc::new(FirstError::new(cancel.clone()));
        let media_enabled = self.config.media_tool.is_some();

        let files: Arc<[PathBuf]> = {
            let root = root.to_path_buf();
            tokio::task::spawn_blocking(move || list_files(&root))
                .await?
                .into()
        };
        let total = files.len();
        info!(root = %root.display(), files = total, "enumerated files");

        // More workers than files would only sit idle.
        let jobs = self.config.jobs.clamp(1, total.max(1));

        let inspectors = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(InventoryError::Cancelled),
            inspectors = self.inspectors(root) => Arc::new(inspectors),
        };

        let (tx, rx) = mpsc::channel(bounded_capacity(jobs, 2));

        let writer = {
            let first_error = Arc::clone(&first_error);
            tokio::task::spawn_blocking(move || {
                match write_in_order(rx, sink, total, media_enabled) {
                    Ok(summary) => Some(summary),
                    Err(err) => {
                        first_error.set(err);
                        None
                    }
                }
            })
        };

        let window = Arc::new(Semaphore::new(bounded_capacity(jobs, WINDOW_PER_JOB)));
        let next = Arc::new(AtomicUsize::new(0));
        let mut workers = JoinSet::new();

        for _ in 0..jobs.min(total) {
            workers.spawn(work(
                Arc::clone(&files),
                Arc::clone(&next),
                Arc::clone(&window),
                Arc::clone(&inspectors),
                tx.clone(),
                cancel.clone(),
            ));
        }
        drop(tx);

        while let Some(joined) = workers.join_next().await {
            if let Err(err) = joined {
                first_error.set(err.into());
            }
        }

        let summary = writer.await?;

        if let Some(err) = first_error.take() {
            return Err(err);
        }

        summary.ok_or(InventoryError::Cancelled)
    }

    async fn inspectors(&self, root: &Path) -> Inspectors {
        let signature = SignatureAdapter::new(self.config.signature_tool.clone());

        let batch = if self.config.batch_signatures {
            match signature.identify_batch(root).await {
                Ok(index) => {
                    info!(entries = index.entry_count(), "batch signature identification complete");
                    Some(index)
                }
                Err(err) => {
                    warn!(
                        error = %err,
                        "batch signature identification failed, identifying files one at a time"
                    );
                    None
                }
            }
        } else {
            None
        };

        Inspectors {
            signature,
            media: self.config.media_tool.clone().map(MediaAdapter::new),
            batch,
        }
    }
}

/// The adapters shared by every worker for one run.
struct Inspectors {
    signature: SignatureAdapter,
    media: Option<MediaAdapter>,
    batch: Option<SignatureIndex>,
}

impl Inspectors {
    async fn inspect(&self, path: &Path) -> FileOutcome {
        let fact = match FileFact::stat(path).await {
            Ok(fact) => fact,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to stat file");
                FileFact::unreadable(path)
            }
        };

        let signature = match self.batch.as_ref().and_then(|index| index.get(path)) {
            Some(result) => result.clone(),
            None => self.signature.identify(path).await,
        };

        let media = match &self.media {
            Some(adapter) => Some(adapter.inspect(path).await),
            None => None,
        };

        FileOutcome {
            signature_status: signature.status,
            track_type: media.as_ref().map(|info| info.track_type),
            record: normalize(fact, signature, media),
        }
    }
}

struct FileOutcome {
    record: InventoryRecord,
    signature_status: ToolStatus,
    track_type: Option<TrackType>,
}

struct Harvested {
    index: usize,
    outcome: FileOutcome,
    /// Released once the record is written.
    _slot: OwnedSemaphorePermit,
}

async fn work(
    files: Arc<[PathBuf]>,
    next: Arc<AtomicUsize>,
    window: Arc<Semaphore>,
    inspectors: Arc<Inspectors>,
    tx: mpsc::Sender<Harvested>,
    cancel: CancellationToken,
) {
    loop {
        // The slot is taken before the index so that the file the writer is
        // waiting for always belongs to a worker that can finish it.
        let slot = tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            slot = Arc::clone(&window).acquire_owned() => match slot {
                Ok(slot) => slot,
                Err(_) => return,
            },
        };

        let index = next.fetch_add(1, Ordering::Relaxed);
        let Some(path) = files.get(index) else {
            return;
        };

        info!(path = %path.display(), "inventorying file");

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            outcome = inspectors.inspect(path) => outcome,
        };

        let harvested = Harvested {
            index,
            outcome,
            _slot: slot,
        };

        if tx.send(harvested).await.is_err() {
            return;
        }
    }
}

fn write_in_order<S: RecordSink>(
    mut rx: mpsc::Receiver<Harvested>,
    mut sink: S,
    total: usize,
    media_enabled: bool,
) -> Result<HarvestSummary, InventoryError> {
    let mut pending = ReorderBuffer::new();
    let mut tally = Tally::new(media_enabled);

    while let Some(harvested) = rx.blocking_recv() {
        let index = harvested.index;
        if pending.insert(index, harvested).is_err() {
            warn!(index, "ignoring out-of-sequence record");
            continue;
        }

        for harvested in pending.drain_ready() {
            sink.write_record(&harvested.outcome.record)?;
            tally.count(&harvested.outcome);
        }
    }

    if pending.next_index() < total {
        debug!(
            written = pending.next_index(),
            total, "inventory incomplete, discarding output"
        );
        return Err(InventoryError::Cancelled);
    }

    let result = sink.finish()?;

    Ok(HarvestSummary {
        output: result.file_written,
        files: result.rows_written,
        signature_failures: tally.signature_failures,
        track_types: tally.track_types,
    })
}

struct Tally {
    signature_failures: u64,
    track_types: Option<BTreeMap<TrackType, u64>>,
}

impl Tally {
    fn new(media_enabled: bool) -> Self {
        Self {
            signature_failures: 0,
            track_types: media_enabled.then(BTreeMap::new),
        }
    }

    fn count(&mut self, outcome: &FileOutcome) {
        if outcome.signature_status == ToolStatus::Failed {
            self.signature_failures += 1;
        }

        if let (Some(counts), Some(track_type)) = (self.track_types.as_mut(), outcome.track_type)
        {
            *counts.entry(track_type).or_default() += 1;
        }
    }
}
