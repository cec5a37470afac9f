//! CSV output for inventory records.
//!
//! Rows go to a temporary file next to the destination; the destination name
//! only appears once every row has been written and synced, so a file at the
//! final path is always a complete inventory.

use std::{
    fs::File,
    path::{Path, PathBuf},
};

use csv::{QuoteStyle, Writer, WriterBuilder};
use tempfile::NamedTempFile;
use tracing::debug;

use super::record_sink::{RecordSink, SinkResult};
use crate::{error::InventoryError, record::InventoryRecord, record::schema::header_for};

pub struct CsvFileSink {
    destination: PathBuf,
    header: Vec<&'static str>,
    writer: Option<Writer<NamedTempFile>>,
    rows_written: u64,
}

impl CsvFileSink {
    /// Create the sink and write the header row.
    ///
    /// `columns` is the run's canonical column set; the header is the preferred
    /// column order restricted to it.
    pub fn create(destination: &Path, columns: &[&str]) -> Result<Self, InventoryError> {
        let directory = destination
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let temp = NamedTempFile::new_in(directory)
            .map_err(|e| InventoryError::write(destination, e))?;

        let mut writer = WriterBuilder::new()
            .quote_style(QuoteStyle::Necessary)
            .from_writer(temp);

        let header = header_for(|column| columns.iter().any(|c| *c == column));
        writer
            .write_record(&header)
            .map_err(|e| InventoryError::write(destination, e))?;

        Ok(Self {
            destination: destination.to_path_buf(),
            header,
            writer: Some(writer),
            rows_written: 0,
        })
    }

    fn writer(&mut self) -> Result<&mut Writer<NamedTempFile>, InventoryError> {
        let destination = &self.destination;
        self.writer.as_mut().ok_or_else(|| {
            InventoryError::write(
                destination,
                std::io::Error::other("sink already finished"),
            )
        })
    }
}

impl RecordSink for CsvFileSink {
    fn write_record(&mut self, record: &InventoryRecord) -> Result<(), InventoryError> {
        let row: Vec<&str> = self
            .header
            .iter()
            .map(|column| record.get(column).unwrap_or_default())
            .collect();

        let destination = self.destination.clone();
        self.writer()?
            .write_record(&row)
            .map_err(|e| InventoryError::write(&destination, e))?;
        self.rows_written += 1;

        Ok(())
    }

    fn finish(&mut self) -> Result<SinkResult, InventoryError> {
        let destination = self.destination.clone();
        let writer = self.writer.take().ok_or_else(|| {
            InventoryError::write(&destination, std::io::Error::other("sink already finished"))
        })?;

        let temp = writer
            .into_inner()
            .map_err(|e| InventoryError::write(&destination, e.into_error()))?;
        temp.as_file()
            .sync_all()
            .map_err(|e| InventoryError::write(&destination, e))?;

        let file: File = temp
            .persist(&destination)
            .map_err(|e| InventoryError::write(&destination, e))?;
        drop(file);

        debug!(path = %destination.display(), rows = self.rows_written, "inventory persisted");

        Ok(SinkResult {
            file_written: destination,
            rows_written: self.rows_written,
        })
    }
}
